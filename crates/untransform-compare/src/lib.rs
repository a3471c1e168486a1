//! Visual equivalence check for flattened SVGs.
//!
//! Both documents are rasterised with resvg at the same width and scored with
//! a structural similarity index. Flattening only moves coordinates between
//! attributes, so a faithful result renders (nearly) the same pixels.

use camino::Utf8Path;
use image::{GrayImage, imageops};
use std::fs;

/// Width in pixels both documents are rendered at.
pub const RENDER_WIDTH: u32 = 256;

/// MSSIM score at or above which two renders count as the same picture.
/// Anti-aliasing along rounded coordinates stays well above this.
pub const SIMILARITY_THRESHOLD: f64 = 0.98;

/// Result of comparing an original and its flattened rendering
#[derive(Debug, Clone)]
pub enum CompareResult {
    /// Renders match within [`SIMILARITY_THRESHOLD`]
    Match { score: f64 },
    /// Renders differ
    Mismatch { score: f64 },
    /// One of the documents could not be rendered
    RenderError { details: String },
}

impl CompareResult {
    pub fn is_match(&self) -> bool {
        matches!(self, CompareResult::Match { .. })
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            CompareResult::Match { score } | CompareResult::Mismatch { score } => Some(*score),
            CompareResult::RenderError { .. } => None,
        }
    }
}

fn render_pixmap(svg: &str, target_width: u32) -> Result<tiny_skia::Pixmap, String> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| format!("usvg: {e}"))?;

    let svg_size = tree.size();
    let scale = target_width as f32 / svg_size.width();
    let width = (svg_size.width() * scale).ceil() as u32;
    let height = (svg_size.height() * scale).ceil() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| format!("cannot allocate a {width}x{height} pixmap"))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let transform = tiny_skia::Transform::from_scale(scale, scale);
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Render `svg` to PNG bytes on a white background.
pub fn render_png(svg: &str, target_width: u32) -> Result<Vec<u8>, String> {
    render_pixmap(svg, target_width)?
        .encode_png()
        .map_err(|e| format!("png: {e}"))
}

fn render_gray(svg: &str, target_width: u32) -> Result<GrayImage, String> {
    let png = render_png(svg, target_width)?;
    let image = image::load_from_memory(&png).map_err(|e| format!("decode: {e}"))?;
    Ok(image.to_luma8())
}

/// Render both documents and score their similarity.
pub fn compare_rendered(original: &str, flattened: &str) -> CompareResult {
    let before = match render_gray(original, RENDER_WIDTH) {
        Ok(image) => image,
        Err(details) => {
            return CompareResult::RenderError {
                details: format!("original: {details}"),
            };
        }
    };
    let after = match render_gray(flattened, RENDER_WIDTH) {
        Ok(image) => image,
        Err(details) => {
            return CompareResult::RenderError {
                details: format!("flattened: {details}"),
            };
        }
    };

    // Flattening keeps width/height, but guard against a changed viewport.
    let after = if after.dimensions() != before.dimensions() {
        imageops::resize(&after, before.width(), before.height(), imageops::Lanczos3)
    } else {
        after
    };

    let score = match image_compare::gray_similarity_structure(
        &image_compare::Algorithm::MSSIMSimple,
        &before,
        &after,
    ) {
        Ok(similarity) => (similarity.score * 10000.0).round() / 10000.0,
        Err(e) => {
            return CompareResult::RenderError {
                details: format!("compare: {e}"),
            };
        }
    };

    if score >= SIMILARITY_THRESHOLD {
        CompareResult::Match { score }
    } else {
        CompareResult::Mismatch { score }
    }
}

/// Write `{name}-original.png` and `{name}-flattened.png` into `debug_dir`
/// so a mismatch can be inspected.
pub fn write_debug_pngs(debug_dir: &Utf8Path, name: &str, original: &str, flattened: &str) {
    fs::create_dir_all(debug_dir).ok();

    for (suffix, svg) in [("original", original), ("flattened", flattened)] {
        let file = debug_dir.join(format!("{name}-{suffix}.png"));
        match render_png(svg, RENDER_WIDTH) {
            Ok(png) => {
                if let Err(e) = fs::write(&file, png) {
                    eprintln!("Warning: Failed to write {file}: {e}");
                }
            }
            Err(e) => eprintln!("Warning: Failed to render {file}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINAL: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="40">
        <g transform="translate(10,10) scale(2)"><rect width="5" height="5" fill="black"/></g>
    </svg>"#;

    #[test]
    fn same_picture_matches() {
        let flattened = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="40">
            <g><rect width="10" height="10" fill="black" x="10" y="10"/></g>
        </svg>"#;
        let result = compare_rendered(ORIGINAL, flattened);
        assert!(result.is_match(), "{result:?}");
    }

    #[test]
    fn moved_shape_mismatches() {
        let moved = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="40">
            <rect width="10" height="10" fill="black" x="25" y="25"/>
        </svg>"#;
        let result = compare_rendered(ORIGINAL, moved);
        assert!(!result.is_match(), "{result:?}");
        assert!(result.score().is_some());
    }

    #[test]
    fn garbage_is_a_render_error() {
        let result = compare_rendered("not svg", ORIGINAL);
        assert!(matches!(result, CompareResult::RenderError { .. }));
    }
}
