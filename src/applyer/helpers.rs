//! Attribute rewrites shared by the shape applyers.

use glam::{DVec2, dvec2};

use crate::dom::Attributes;
use crate::errors::{FlattenCause, ParseError};
use crate::matrix::{AffineMatrix, Axis};
use crate::parse;
use crate::path::PathData;
use crate::style::{Style, StyleProperty};
use crate::types::{Length, fmt_num};

/// Presentation attributes that hold scale-sensitive lengths.
const SCALED_PRESENTATION: [&str; 3] = ["stroke-width", "stroke-dasharray", "font-size"];

/// One element's attributes plus the matrix being baked into them.
pub(crate) struct Rewriter<'a> {
    element: &'a mut dyn Attributes,
    matrix: &'a AffineMatrix,
    precision: usize,
}

impl<'a> Rewriter<'a> {
    pub(crate) fn new(
        element: &'a mut dyn Attributes,
        matrix: &'a AffineMatrix,
        precision: usize,
    ) -> Self {
        Self {
            element,
            matrix,
            precision,
        }
    }

    pub(crate) fn element(&self) -> &dyn Attributes {
        &*self.element
    }

    fn length(&self, name: &str) -> Result<Option<Length>, ParseError> {
        self.element
            .attribute(name)
            .map(|value| parse::length(name, value))
            .transpose()
    }

    fn lengths(&self, name: &str) -> Result<Vec<Length>, ParseError> {
        match self.element.attribute(name) {
            Some(value) => parse::length_list(name, value),
            None => Ok(Vec::new()),
        }
    }

    fn set_length(&mut self, name: &str, length: &Length) {
        self.element
            .set_attribute(name, length.encode(self.precision));
    }

    fn set_lengths(&mut self, name: &str, lengths: &[Length]) {
        let text = lengths
            .iter()
            .map(|l| l.encode(self.precision))
            .collect::<Vec<_>>()
            .join(" ");
        self.element.set_attribute(name, text);
    }

    /// Map `x`/`y` as a point. A missing coordinate is `0`.
    pub(crate) fn point(&mut self, x: &str, y: &str) -> Result<DVec2, FlattenCause> {
        let lx = self.length(x)?.unwrap_or_default();
        let ly = self.length(y)?.unwrap_or_default();
        let p = self.matrix.apply_to_point(dvec2(lx.value, ly.value));
        self.set_length(x, &lx.with_value(p.x));
        self.set_length(y, &ly.with_value(p.y));
        Ok(p)
    }

    /// Map space-separated coordinate lists pairwise, as text `x`/`y` allow.
    ///
    /// The shorter list is padded with its last entry, since later glyphs
    /// stay on the same baseline or column. An absent list counts as `0` for
    /// the mapping; with `keep_absent` it is not written back, so the element
    /// keeps following the current text position on that axis.
    pub(crate) fn point_lists(
        &mut self,
        x: &str,
        y: &str,
        keep_absent: bool,
    ) -> Result<(), FlattenCause> {
        let write_x = !keep_absent || self.element.attribute(x).is_some();
        let write_y = !keep_absent || self.element.attribute(y).is_some();
        if !write_x && !write_y {
            return Ok(());
        }

        let xs = self.lengths(x)?;
        let ys = self.lengths(y)?;
        let count = xs.len().max(ys.len()).max(1);

        let mut out_x = Vec::with_capacity(count);
        let mut out_y = Vec::with_capacity(count);
        for i in 0..count {
            let lx = xs.get(i).or(xs.last()).cloned().unwrap_or_default();
            let ly = ys.get(i).or(ys.last()).cloned().unwrap_or_default();
            let p = self.matrix.apply_to_point(dvec2(lx.value, ly.value));
            out_x.push(lx.with_value(p.x));
            out_y.push(ly.with_value(p.y));
        }
        if write_x {
            self.set_lengths(x, &out_x);
        }
        if write_y {
            self.set_lengths(y, &out_y);
        }
        Ok(())
    }

    /// Map each entry of a single-axis offset list (`dx`, `dy`). Absent
    /// attributes stay absent.
    pub(crate) fn length_diffs(&mut self, name: &str, axis: Axis) -> Result<(), FlattenCause> {
        if self.element.attribute(name).is_none() {
            return Ok(());
        }
        let mapped: Vec<Length> = self
            .lengths(name)?
            .iter()
            .map(|l| l.with_value(self.matrix.apply_to_length_diff(l.value, axis)))
            .collect();
        self.set_lengths(name, &mapped);
        Ok(())
    }

    /// Circle radius: the first norm of the length pair `(r, r)`.
    pub(crate) fn radius(&mut self, name: &str) -> Result<(), FlattenCause> {
        let r = self.length(name)?.unwrap_or_default();
        let mapped = self.matrix.apply_to_length_pair(dvec2(r.value, r.value));
        self.set_length(name, &r.with_value(mapped.x));
        Ok(())
    }

    /// Ellipse-style radius pair. A missing radius takes the other's value;
    /// both missing means `0`.
    pub(crate) fn radii(&mut self, rx: &str, ry: &str) -> Result<(), FlattenCause> {
        let (lx, ly) = match (self.length(rx)?, self.length(ry)?) {
            (Some(lx), Some(ly)) => (lx, ly),
            (Some(lx), None) => (lx.clone(), lx),
            (None, Some(ly)) => (ly.clone(), ly),
            (None, None) => (Length::default(), Length::default()),
        };
        let mapped = self.matrix.apply_to_length_pair(dvec2(lx.value, ly.value));
        self.set_length(rx, &lx.with_value(mapped.x));
        self.set_length(ry, &ly.with_value(mapped.y));
        Ok(())
    }

    /// Whether either radius attribute is present.
    pub(crate) fn has_any(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.element.attribute(name).is_some())
    }

    /// `x`, `y`, `width`, `height` as a positioned box.
    ///
    /// The corner maps as a point and the sizes as length diffs. A size that
    /// comes out negative moves the corner by that amount and is stored
    /// positive. Absent sizes stay absent.
    pub(crate) fn rect_area(&mut self) -> Result<(), FlattenCause> {
        let lx = self.length("x")?.unwrap_or_default();
        let ly = self.length("y")?.unwrap_or_default();
        let mut corner = self.matrix.apply_to_point(dvec2(lx.value, ly.value));

        for (name, axis) in [("width", Axis::X), ("height", Axis::Y)] {
            let Some(size) = self.length(name)? else {
                continue;
            };
            let mut mapped = self.matrix.apply_to_length_diff(size.value, axis);
            if mapped < 0.0 {
                match axis {
                    Axis::X => corner.x += mapped,
                    Axis::Y => corner.y += mapped,
                }
                mapped = -mapped;
            }
            self.set_length(name, &size.with_value(mapped));
        }

        self.set_length("x", &lx.with_value(corner.x));
        self.set_length("y", &ly.with_value(corner.y));
        Ok(())
    }

    /// Rewrite a `points` list through the path codec.
    pub(crate) fn points(&mut self, name: &str) -> Result<(), FlattenCause> {
        let Some(text) = self.element.attribute(name) else {
            return Ok(());
        };
        let path = PathData::from_points(parse::point_list(text)?);
        let mapped = path.transform(self.matrix)?;
        let text = mapped
            .points()
            .iter()
            .map(|p| {
                format!(
                    "{},{}",
                    fmt_num(p.x, self.precision),
                    fmt_num(p.y, self.precision)
                )
            })
            .collect::<Vec<_>>()
            .join(" ");
        self.element.set_attribute(name, text);
        Ok(())
    }

    /// Rewrite path data.
    pub(crate) fn path(&mut self, name: &str) -> Result<(), FlattenCause> {
        let Some(text) = self.element.attribute(name) else {
            return Ok(());
        };
        let mapped = parse::path_data(text)?.transform(self.matrix)?;
        self.element.set_attribute(name, mapped.encode(self.precision));
        Ok(())
    }

    /// Scale the inline style and the scale-sensitive presentation attributes.
    pub(crate) fn style(&mut self) -> Result<(), FlattenCause> {
        if let Some(text) = self.element.attribute("style") {
            let mut style = Style::decode(text);
            style.apply(self.matrix);
            self.element
                .set_attribute("style", style.encode(self.precision));
        }

        for key in SCALED_PRESENTATION {
            let Some(value) = self.element.attribute(key) else {
                continue;
            };
            let mut property = StyleProperty::decode(key, value);
            property.apply(self.matrix);
            self.element
                .set_attribute(key, property.encode_value(self.precision));
        }
        Ok(())
    }
}
