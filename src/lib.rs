//! Bake SVG `transform` attributes into element geometry.
//!
//! ```
//! let svg = r#"<svg><rect width="2" height="1" transform="translate(5,0) scale(2)"/></svg>"#;
//! let flat = svg_untransform::flatten_str(svg, &Default::default()).unwrap();
//! assert!(flat.contains(r#"<rect width="4" height="2" x="5" y="0"/>"#));
//! ```

use pest_derive::Parser;

pub mod applyer;
pub mod dom;
pub mod errors;
pub mod flatten;
pub mod log;
pub mod matrix;
pub mod parse;
pub mod path;
pub mod style;
pub mod transform;
pub mod types;

pub use dom::{Attributes, Document, ElementTree, NodeId};
pub use errors::FlattenError;
pub use flatten::{FlattenOptions, FlattenReport, Flattener};
pub use matrix::AffineMatrix;
pub use transform::{TransformKind, TransformOp};

#[derive(Parser)]
#[grammar = "svg.pest"]
pub struct SvgParser;

/// Load an SVG document, flatten it, and serialise it with 2-space indentation.
pub fn flatten_str(source: &str, options: &FlattenOptions) -> Result<String, FlattenError> {
    let mut document = Document::parse(source)?;
    Flattener::new(&mut document, *options).flatten()?;
    Ok(document.to_string_pretty()?)
}
