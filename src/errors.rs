//! Error types with rich diagnostics using miette
//!
//! Attribute-value errors carry the attribute text as their source so the
//! report points at the offending character.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::Rule;

/// Source context for error reporting
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Name of the source (the attribute or style property the text came from)
    pub name: String,
    /// The full attribute text
    pub source: String,
}

impl SourceContext {
    /// Create a new source context
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Create a NamedSource for miette
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }

    /// Convert a pest failure on this source into a [`ParseError::Syntax`].
    pub fn syntax_error(&self, err: pest::error::Error<Rule>) -> ParseError {
        let span = match err.location {
            pest::error::InputLocation::Pos(pos) => SourceSpan::from((pos, 0)),
            pest::error::InputLocation::Span((start, end)) => {
                SourceSpan::from((start, end - start))
            }
        };
        ParseError::Syntax {
            message: err.variant.message().into_owned(),
            src: self.named_source(),
            span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Errors that occur while parsing attribute values
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("syntax error: {message}")]
    #[diagnostic(code(svg_untransform::parse::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("invalid number: {message}")]
    #[diagnostic(code(svg_untransform::parse::invalid_number))]
    InvalidNumber {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("invalid number")]
        span: SourceSpan,
    },

    #[error("unknown transform function: {name}")]
    #[diagnostic(
        code(svg_untransform::parse::unknown_transform),
        help("expected one of matrix, translate, scale, rotate, skewX, skewY")
    )]
    UnknownTransform {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("unknown function")]
        span: SourceSpan,
    },

    #[error("{name}() takes {expected} arguments, got {got}")]
    #[diagnostic(code(svg_untransform::parse::argument_count))]
    ArgumentCount {
        name: String,
        expected: &'static str,
        got: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("wrong number of arguments")]
        span: SourceSpan,
    },

    #[error("'{command}' takes numbers in groups of {arity}, got {got}")]
    #[diagnostic(code(svg_untransform::parse::argument_grouping))]
    ArgumentGrouping {
        command: char,
        arity: usize,
        got: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("incomplete argument group")]
        span: SourceSpan,
    },

    #[error("points list has an odd number of coordinates ({got})")]
    #[diagnostic(code(svg_untransform::parse::odd_points))]
    OddPoints {
        got: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("missing a y coordinate")]
        span: SourceSpan,
    },
}

// ============================================================================
// Transform Errors
// ============================================================================

/// Errors building a matrix from an already-parsed transform op
#[derive(Error, Diagnostic, Debug, PartialEq)]
pub enum TransformError {
    #[error("{name}() is missing required argument #{index}")]
    #[diagnostic(code(svg_untransform::transform::missing_argument))]
    MissingArgument { name: &'static str, index: usize },
}

// ============================================================================
// Geometry Errors
// ============================================================================

/// Errors that occur while re-expressing geometry
#[derive(Error, Diagnostic, Debug)]
pub enum GeometryError {
    #[error("arc radii ({rx}, {ry}) are too small for the chord from {start:?} to {end:?}")]
    #[diagnostic(code(svg_untransform::geometry::arc_radii))]
    ArcRadiiTooSmall {
        rx: f64,
        ry: f64,
        start: [f64; 2],
        end: [f64; 2],
        #[help]
        details: Option<String>,
    },

    #[error("absolute {command} needs the pen position; resolve the path to absolute first")]
    #[diagnostic(code(svg_untransform::geometry::unresolved_axis_line))]
    UnresolvedAxisLine { command: char },
}

// ============================================================================
// Applyer Errors
// ============================================================================

/// Errors raised by the per-element applyers
#[derive(Error, Diagnostic, Debug)]
pub enum ApplyError {
    #[error("<{name}> has no transform applyer")]
    #[diagnostic(code(svg_untransform::apply::unsupported_element))]
    UnsupportedElement { name: String },

    #[error("transform {ops} cannot be applied to <{element}>")]
    #[diagnostic(
        code(svg_untransform::apply::disabled_transform),
        help("run without strict mode to keep these as a residual transform attribute")
    )]
    DisabledTransform { element: String, ops: String },
}

// ============================================================================
// Document Errors
// ============================================================================

/// Errors reading or writing the XML document
#[derive(Error, Diagnostic, Debug)]
pub enum DocumentError {
    #[error("malformed XML: {0}")]
    #[diagnostic(code(svg_untransform::document::xml))]
    Xml(#[from] quick_xml::Error),

    #[error("document has no root element")]
    #[diagnostic(code(svg_untransform::document::empty))]
    Empty,

    #[error("element <{0}> is not properly closed")]
    #[diagnostic(code(svg_untransform::document::unbalanced))]
    Unbalanced(String),

    #[error("serialized document is not UTF-8")]
    #[diagnostic(code(svg_untransform::document::encoding))]
    Encoding(#[from] std::string::FromUtf8Error),
}

// ============================================================================
// Flatten Errors
// ============================================================================

/// What went wrong on a particular element
#[derive(Error, Diagnostic, Debug)]
pub enum FlattenCause {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Apply(#[from] ApplyError),
}

/// Top-level error of a flatten run
#[derive(Error, Diagnostic, Debug)]
pub enum FlattenError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Document(#[from] DocumentError),

    #[error("failed to flatten {element}")]
    #[diagnostic(code(svg_untransform::flatten))]
    Element {
        element: String,
        #[source]
        #[diagnostic_source]
        cause: FlattenCause,
    },
}

impl FlattenError {
    /// The underlying cause, if the failure happened on an element.
    pub fn cause(&self) -> Option<&FlattenCause> {
        match self {
            FlattenError::Element { cause, .. } => Some(cause),
            FlattenError::Document(_) => None,
        }
    }
}
