//! Shape policies
//!
//! Each applyer composes the [`Rewriter`] primitives for its attributes and
//! always finishes with the style rewrite.

use super::TransformApplyer;
use super::helpers::Rewriter;
use crate::dom::Attributes;
use crate::errors::FlattenCause;
use crate::flatten::FlattenOptions;
use crate::log::debug;
use crate::matrix::{AffineMatrix, Axis};
use crate::parse;
use crate::transform::{TransformKind, TransformOp};

/// Whether `op` keeps axis-aligned boxes and ellipses axis-aligned. A
/// `matrix()` only qualifies without rotation or skew terms.
fn keeps_axes(op: &TransformOp) -> bool {
    match op.kind {
        TransformKind::Translate | TransformKind::Scale => true,
        TransformKind::Matrix => op.to_matrix().is_ok_and(|m| m.keeps_axes()),
        TransformKind::Rotate | TransformKind::SkewX | TransformKind::SkewY => false,
    }
}

/// A circle is invariant under rotation about its center, so rotations and
/// rotating similarity matrices are fine too.
fn keeps_circles(op: &TransformOp) -> bool {
    match op.kind {
        TransformKind::Rotate => true,
        TransformKind::Matrix => op.to_matrix().is_ok_and(|m| {
            let [a, b, c, d, ..] = m.coefficients();
            m.keeps_axes() || (a == d && b == -c) || (a == -d && b == c)
        }),
        _ => keeps_axes(op),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CircleApplyer;

impl TransformApplyer for CircleApplyer {
    fn can_apply(&self, op: &TransformOp) -> bool {
        keeps_circles(op)
    }

    fn apply(
        &self,
        element: &mut dyn Attributes,
        matrix: &AffineMatrix,
        options: &FlattenOptions,
    ) -> Result<(), FlattenCause> {
        let mut rw = Rewriter::new(element, matrix, options.precision);
        rw.point("cx", "cy")?;
        rw.radius("r")?;
        rw.style()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EllipseApplyer;

impl TransformApplyer for EllipseApplyer {
    fn can_apply(&self, op: &TransformOp) -> bool {
        keeps_axes(op)
    }

    fn apply(
        &self,
        element: &mut dyn Attributes,
        matrix: &AffineMatrix,
        options: &FlattenOptions,
    ) -> Result<(), FlattenCause> {
        let mut rw = Rewriter::new(element, matrix, options.precision);
        rw.point("cx", "cy")?;
        rw.radii("rx", "ry")?;
        rw.style()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RectApplyer;

impl TransformApplyer for RectApplyer {
    fn can_apply(&self, op: &TransformOp) -> bool {
        keeps_axes(op)
    }

    fn apply(
        &self,
        element: &mut dyn Attributes,
        matrix: &AffineMatrix,
        options: &FlattenOptions,
    ) -> Result<(), FlattenCause> {
        let mut rw = Rewriter::new(element, matrix, options.precision);
        rw.rect_area()?;
        // Square corners stay square; don't add rx="0" ry="0".
        if rw.has_any(&["rx", "ry"]) {
            rw.radii("rx", "ry")?;
        }
        rw.style()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineApplyer;

impl TransformApplyer for LineApplyer {
    fn can_apply(&self, _op: &TransformOp) -> bool {
        true
    }

    fn apply(
        &self,
        element: &mut dyn Attributes,
        matrix: &AffineMatrix,
        options: &FlattenOptions,
    ) -> Result<(), FlattenCause> {
        let mut rw = Rewriter::new(element, matrix, options.precision);
        rw.point("x1", "y1")?;
        rw.point("x2", "y2")?;
        rw.style()
    }
}

/// `polygon` and `polyline`: the points list runs through the path codec as
/// one moveto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PolyApplyer;

impl TransformApplyer for PolyApplyer {
    fn can_apply(&self, _op: &TransformOp) -> bool {
        true
    }

    fn apply(
        &self,
        element: &mut dyn Attributes,
        matrix: &AffineMatrix,
        options: &FlattenOptions,
    ) -> Result<(), FlattenCause> {
        let mut rw = Rewriter::new(element, matrix, options.precision);
        rw.points("points")?;
        rw.style()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PathApplyer;

impl TransformApplyer for PathApplyer {
    fn can_apply(&self, _op: &TransformOp) -> bool {
        true
    }

    fn apply(
        &self,
        element: &mut dyn Attributes,
        matrix: &AffineMatrix,
        options: &FlattenOptions,
    ) -> Result<(), FlattenCause> {
        let mut rw = Rewriter::new(element, matrix, options.precision);
        rw.path("d")?;
        rw.style()
    }
}

/// `text` and `tspan`: absolute positions are points, `dx`/`dy` are offsets
/// along one axis. Glyphs can't be skewed or rotated through attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextApplyer;

impl TransformApplyer for TextApplyer {
    fn can_apply(&self, op: &TransformOp) -> bool {
        keeps_axes(op)
    }

    fn apply(
        &self,
        element: &mut dyn Attributes,
        matrix: &AffineMatrix,
        options: &FlattenOptions,
    ) -> Result<(), FlattenCause> {
        // A tspan without a position continues where the previous text ended.
        let continues = element.local_name() == "tspan";
        let mut rw = Rewriter::new(element, matrix, options.precision);
        rw.point_lists("x", "y", continues)?;
        rw.length_diffs("dx", Axis::X)?;
        rw.length_diffs("dy", Axis::Y)?;
        rw.style()
    }
}

/// `mask` region.
///
/// Only a region given in user space with plain numbers is rewritten. With
/// `maskUnits` set, or any percentage or missing bound, the region is left
/// as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaskApplyer;

impl MaskApplyer {
    fn region_is_numeric(element: &dyn Attributes) -> bool {
        ["x", "y", "width", "height"].iter().all(|name| {
            element
                .attribute(name)
                .and_then(|value| parse::length(name, value).ok())
                .is_some_and(|length| !length.is_percentage())
        })
    }
}

impl TransformApplyer for MaskApplyer {
    fn can_apply(&self, op: &TransformOp) -> bool {
        keeps_axes(op)
    }

    fn apply(
        &self,
        element: &mut dyn Attributes,
        matrix: &AffineMatrix,
        options: &FlattenOptions,
    ) -> Result<(), FlattenCause> {
        let mut rw = Rewriter::new(element, matrix, options.precision);
        let element = rw.element();
        if element.attribute("maskUnits").is_some() || !Self::region_is_numeric(element) {
            debug!("mask region left as written");
        } else {
            rw.rect_area()?;
        }
        rw.style()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageApplyer;

impl TransformApplyer for ImageApplyer {
    fn can_apply(&self, op: &TransformOp) -> bool {
        keeps_axes(op)
    }

    fn apply(
        &self,
        element: &mut dyn Attributes,
        matrix: &AffineMatrix,
        options: &FlattenOptions,
    ) -> Result<(), FlattenCause> {
        let mut rw = Rewriter::new(element, matrix, options.precision);
        rw.rect_area()?;
        rw.style()
    }
}

/// `use`: only the anchor moves, the referenced content is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UseApplyer;

impl TransformApplyer for UseApplyer {
    fn can_apply(&self, op: &TransformOp) -> bool {
        op.kind == TransformKind::Translate
    }

    fn apply(
        &self,
        element: &mut dyn Attributes,
        matrix: &AffineMatrix,
        options: &FlattenOptions,
    ) -> Result<(), FlattenCause> {
        let mut rw = Rewriter::new(element, matrix, options.precision);
        rw.point("x", "y")?;
        rw.style()
    }
}
