//! Transform-list values: the parsed `transform` attribute and the matrices
//! its functions stand for.
//!
//! Parsing lives in [`crate::parse::transform_list`]; this module turns
//! [`TransformOp`]s into [`AffineMatrix`]es and back into attribute text.

use std::fmt;

use glam::dvec2;

use crate::errors::TransformError;
use crate::matrix::AffineMatrix;
use crate::types::{DEFAULT_PRECISION, fmt_num};

/// The six SVG 1.1 transform functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Matrix,
    Translate,
    Scale,
    Rotate,
    SkewX,
    SkewY,
}

impl TransformKind {
    pub const ALL: [TransformKind; 6] = [
        TransformKind::Matrix,
        TransformKind::Translate,
        TransformKind::Scale,
        TransformKind::Rotate,
        TransformKind::SkewX,
        TransformKind::SkewY,
    ];

    /// Function name as written in the attribute.
    pub fn name(self) -> &'static str {
        match self {
            TransformKind::Matrix => "matrix",
            TransformKind::Translate => "translate",
            TransformKind::Scale => "scale",
            TransformKind::Rotate => "rotate",
            TransformKind::SkewX => "skewX",
            TransformKind::SkewY => "skewY",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Argument counts the grammar accepts.
    pub fn arities(self) -> &'static [usize] {
        match self {
            TransformKind::Matrix => &[6],
            TransformKind::Translate | TransformKind::Scale => &[1, 2],
            TransformKind::Rotate => &[1, 3],
            TransformKind::SkewX | TransformKind::SkewY => &[1],
        }
    }

    /// Human-readable form of [`TransformKind::arities`] for diagnostics.
    pub fn arity_label(self) -> &'static str {
        match self {
            TransformKind::Matrix => "6",
            TransformKind::Translate | TransformKind::Scale => "1 or 2",
            TransformKind::Rotate => "1 or 3",
            TransformKind::SkewX | TransformKind::SkewY => "1",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One function of a transform list, e.g. `rotate(30, 5, 5)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOp {
    pub kind: TransformKind,
    pub args: Vec<f64>,
}

impl TransformOp {
    pub fn new(kind: TransformKind, args: impl Into<Vec<f64>>) -> Self {
        Self {
            kind,
            args: args.into(),
        }
    }

    fn arg(&self, index: usize) -> Result<f64, TransformError> {
        self.args
            .get(index)
            .copied()
            .ok_or(TransformError::MissingArgument {
                name: self.kind.name(),
                index,
            })
    }

    fn arg_or(&self, index: usize, default: f64) -> f64 {
        self.args.get(index).copied().unwrap_or(default)
    }

    /// The matrix this function denotes. Angles are in degrees.
    pub fn to_matrix(&self) -> Result<AffineMatrix, TransformError> {
        let matrix = match self.kind {
            TransformKind::Matrix => AffineMatrix::from_columns(
                dvec2(self.arg(0)?, self.arg(1)?),
                dvec2(self.arg(2)?, self.arg(3)?),
                dvec2(self.arg(4)?, self.arg(5)?),
            ),
            TransformKind::Translate => AffineMatrix::translation(self.arg(0)?, self.arg_or(1, 0.0)),
            TransformKind::Scale => {
                let sx = self.arg(0)?;
                AffineMatrix::scale(sx, self.arg_or(1, sx))
            }
            TransformKind::Rotate => {
                let angle = self.arg(0)?.to_radians();
                let (cx, cy) = (self.arg_or(1, 0.0), self.arg_or(2, 0.0));
                AffineMatrix::translation(cx, cy)
                    * AffineMatrix::rotation(angle)
                    * AffineMatrix::translation(-cx, -cy)
            }
            TransformKind::SkewX => AffineMatrix::shear(self.arg(0)?.to_radians().tan(), 0.0),
            TransformKind::SkewY => AffineMatrix::shear(0.0, self.arg(0)?.to_radians().tan()),
        };
        Ok(matrix)
    }

    /// `name(a,b,...)` with `precision` significant figures.
    pub fn encode(&self, precision: usize) -> String {
        let args: Vec<String> = self.args.iter().map(|v| fmt_num(*v, precision)).collect();
        format!("{}({})", self.kind.name(), args.join(","))
    }
}

impl fmt::Display for TransformOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode(DEFAULT_PRECISION))
    }
}

/// Multiply the ops' matrices left to right in textual order.
///
/// The result maps a point the way the whole list does: the rightmost op
/// touches the point first.
pub fn compose(ops: &[TransformOp]) -> Result<AffineMatrix, TransformError> {
    let mut matrix = AffineMatrix::IDENTITY;
    for op in ops {
        matrix = matrix * op.to_matrix()?;
    }
    Ok(matrix)
}

/// Serialise a list back into `transform` attribute text.
pub fn encode_list(ops: &[TransformOp], precision: usize) -> String {
    ops.iter()
        .map(|op| op.encode(precision))
        .collect::<Vec<_>>()
        .join(" ")
}
