//! Per-element transform applyers.
//!
//! Each supported element kind has a fixed policy: which transform functions
//! its geometry can absorb, and which attributes to rewrite. Dispatch is a
//! closed table from local tag name to an [`Applyer`] variant.

mod helpers;
mod shapes;

use enum_dispatch::enum_dispatch;

use crate::dom::Attributes;
use crate::errors::{ApplyError, FlattenCause};
use crate::flatten::FlattenOptions;
use crate::matrix::AffineMatrix;
use crate::transform::TransformOp;

pub use shapes::{
    CircleApplyer, EllipseApplyer, ImageApplyer, LineApplyer, MaskApplyer, PathApplyer,
    PolyApplyer, RectApplyer, TextApplyer, UseApplyer,
};

/// Elements whose subtree is left untouched: non-rendering content, other
/// namespaces, and paint servers with their own coordinate systems.
pub const SKIP_SUBTREE: &[&str] = &[
    "metadata",
    "namedview",
    "script",
    "style",
    "foreignObject",
    "linearGradient",
    "radialGradient",
    "pattern",
    "marker",
    "symbol",
    "filter",
];

/// Containers and descriptive elements: they hold no geometry, so their
/// transform simply passes to their children.
pub const IGNORABLE: &[&str] = &[
    "svg", "g", "defs", "title", "desc", "clipPath", "a", "switch",
];

/// Rewrites one element's geometry in its parent's coordinate space.
#[enum_dispatch]
pub trait TransformApplyer {
    /// Whether this element's geometry can absorb `op`.
    fn can_apply(&self, op: &TransformOp) -> bool;

    /// Bake `matrix` into the element's attributes and style.
    fn apply(
        &self,
        element: &mut dyn Attributes,
        matrix: &AffineMatrix,
        options: &FlattenOptions,
    ) -> Result<(), FlattenCause>;
}

/// Every element kind with a geometry rewrite.
#[enum_dispatch(TransformApplyer)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applyer {
    CircleApplyer,
    EllipseApplyer,
    RectApplyer,
    LineApplyer,
    PolyApplyer,
    PathApplyer,
    TextApplyer,
    MaskApplyer,
    ImageApplyer,
    UseApplyer,
}

impl Applyer {
    /// Look up the applyer for a local tag name.
    pub fn for_element(local_name: &str) -> Result<Applyer, ApplyError> {
        let applyer = match local_name {
            "circle" => CircleApplyer.into(),
            "ellipse" => EllipseApplyer.into(),
            "rect" => RectApplyer.into(),
            "line" => LineApplyer.into(),
            "polygon" | "polyline" => PolyApplyer.into(),
            "path" => PathApplyer.into(),
            "text" | "tspan" => TextApplyer.into(),
            "mask" => MaskApplyer.into(),
            "image" => ImageApplyer.into(),
            "use" => UseApplyer.into(),
            _ => {
                return Err(ApplyError::UnsupportedElement {
                    name: local_name.to_string(),
                });
            }
        };
        Ok(applyer)
    }
}

/// How the flattener treats an element.
#[derive(Debug)]
pub enum ElementRole {
    /// Leave the element and its descendants alone.
    Skip,
    /// No geometry of its own; pass the transform to the children.
    Ignorable,
    Shape(Applyer),
    /// Unknown kind: left as written; the children are still flattened.
    Unsupported(ApplyError),
}

impl ElementRole {
    pub fn of(local_name: &str) -> ElementRole {
        if SKIP_SUBTREE.contains(&local_name) {
            return ElementRole::Skip;
        }
        if IGNORABLE.contains(&local_name) {
            return ElementRole::Ignorable;
        }
        match Applyer::for_element(local_name) {
            Ok(applyer) => ElementRole::Shape(applyer),
            Err(err) => ElementRole::Unsupported(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::transform_list;

    /// The functions of `list` that `element` accepts, as written.
    fn accepted(element: &str, list: &str) -> Vec<String> {
        let applyer = Applyer::for_element(element).unwrap();
        transform_list(list)
            .unwrap()
            .iter()
            .filter(|op| applyer.can_apply(op))
            .map(|op| op.encode(6))
            .collect()
    }

    const EVERY_KIND: &str = "matrix(2,0,0,3,1,1) translate(1) scale(2) rotate(30) skewX(10) skewY(10)";

    #[test]
    fn capability_table() {
        let axis_aligned = ["matrix(2,0,0,3,1,1)", "translate(1)", "scale(2)"];
        assert_eq!(accepted("circle", EVERY_KIND), [&axis_aligned[..], &["rotate(30)"][..]].concat());
        assert_eq!(accepted("ellipse", EVERY_KIND), axis_aligned);
        assert_eq!(accepted("rect", EVERY_KIND), axis_aligned);
        assert_eq!(accepted("tspan", EVERY_KIND), axis_aligned);
        assert_eq!(accepted("image", EVERY_KIND), axis_aligned);
        assert_eq!(accepted("path", EVERY_KIND).len(), 6);
        assert_eq!(accepted("polyline", EVERY_KIND).len(), 6);
        assert_eq!(accepted("line", EVERY_KIND).len(), 6);
        assert_eq!(accepted("use", EVERY_KIND), ["translate(1)"]);
    }

    #[test]
    fn rotating_matrix_is_not_axis_aligned() {
        let quarter = "matrix(0,1,-1,0,0,0)";
        assert!(accepted("rect", quarter).is_empty());
        assert!(accepted("ellipse", quarter).is_empty());
        assert!(accepted("text", "matrix(1,0,0.5,1,0,0)").is_empty());
        // a circle only cares that the matrix is a similarity
        assert_eq!(accepted("circle", quarter), [quarter]);
        assert!(accepted("circle", "matrix(1,0,0.5,1,0,0)").is_empty());
    }

    #[test]
    fn roles() {
        assert!(matches!(ElementRole::of("namedview"), ElementRole::Skip));
        assert!(matches!(ElementRole::of("g"), ElementRole::Ignorable));
        assert!(matches!(
            ElementRole::of("rect"),
            ElementRole::Shape(Applyer::RectApplyer(_))
        ));
        match ElementRole::of("feGaussianBlur") {
            ElementRole::Unsupported(err) => {
                assert_eq!(err.to_string(), "<feGaussianBlur> has no transform applyer")
            }
            other => panic!("unexpected role: {other:?}"),
        }
    }
}
