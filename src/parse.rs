//! Parse pest pairs into attribute values
//!
//! Every entry point takes the raw attribute text and returns typed values or
//! a [`ParseError`] whose source is that text, so diagnostics point into the
//! attribute itself.

use glam::{DVec2, dvec2};
use miette::SourceSpan;
use pest::Parser;
use pest::iterators::Pair;

use crate::errors::{ParseError, SourceContext};
use crate::path::{Command, PathData, PathInstruction};
use crate::transform::{TransformKind, TransformOp};
use crate::types::Length;
use crate::{Rule, SvgParser};

fn span_of(pair: &Pair<Rule>) -> SourceSpan {
    let span = pair.as_span();
    SourceSpan::from((span.start(), span.end() - span.start()))
}

fn parse_number(pair: &Pair<Rule>, ctx: &SourceContext) -> Result<f64, ParseError> {
    pair.as_str()
        .parse::<f64>()
        .map_err(|e| ParseError::InvalidNumber {
            message: e.to_string(),
            src: ctx.named_source(),
            span: span_of(pair),
        })
}

/// Parse a `transform` attribute into its ops, in textual order.
///
/// An empty or whitespace-only attribute yields an empty list.
pub fn transform_list(source: &str) -> Result<Vec<TransformOp>, ParseError> {
    let ctx = SourceContext::new("transform", source);
    let pairs =
        SvgParser::parse(Rule::transform_list, source).map_err(|e| ctx.syntax_error(e))?;

    let mut ops = Vec::new();
    for pair in pairs {
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::transform {
                ops.push(parse_transform(inner, &ctx)?);
            }
        }
    }
    Ok(ops)
}

fn parse_transform(pair: Pair<Rule>, ctx: &SourceContext) -> Result<TransformOp, ParseError> {
    let span = span_of(&pair);
    let mut name = None;
    let mut args = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::transform_name => name = Some(inner),
            Rule::number => args.push(parse_number(&inner, ctx)?),
            _ => {}
        }
    }

    let Some(name) = name else {
        return Err(ParseError::Syntax {
            message: "expected a transform function name".to_string(),
            src: ctx.named_source(),
            span,
        });
    };
    let kind =
        TransformKind::from_name(name.as_str()).ok_or_else(|| ParseError::UnknownTransform {
            name: name.as_str().to_string(),
            src: ctx.named_source(),
            span: span_of(&name),
        })?;

    if !kind.arities().contains(&args.len()) {
        return Err(ParseError::ArgumentCount {
            name: kind.name().to_string(),
            expected: kind.arity_label(),
            got: args.len(),
            src: ctx.named_source(),
            span,
        });
    }
    Ok(TransformOp::new(kind, args))
}

/// Parse a `d` attribute into instructions, grouping each command's numbers
/// by its arity.
pub fn path_data(source: &str) -> Result<PathData, ParseError> {
    let ctx = SourceContext::new("d", source);
    let pairs = SvgParser::parse(Rule::path_data, source).map_err(|e| ctx.syntax_error(e))?;

    let mut instructions = Vec::new();
    for pair in pairs {
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::path_segment {
                instructions.push(parse_segment(inner, &ctx)?);
            }
        }
    }
    Ok(PathData::new(instructions))
}

fn parse_segment(pair: Pair<Rule>, ctx: &SourceContext) -> Result<PathInstruction, ParseError> {
    let span = span_of(&pair);
    let mut letter = None;
    let mut numbers = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::path_command => letter = inner.as_str().chars().next(),
            Rule::number => numbers.push(parse_number(&inner, ctx)?),
            _ => {}
        }
    }

    let Some((letter, (command, relative))) =
        letter.and_then(|c| Command::from_letter(c).map(|parsed| (c, parsed)))
    else {
        return Err(ParseError::Syntax {
            message: "expected a path command".to_string(),
            src: ctx.named_source(),
            span,
        });
    };

    let arity = command.arity();
    let grouped = if arity == 0 {
        numbers.is_empty()
    } else {
        !numbers.is_empty() && numbers.len() % arity == 0
    };
    if !grouped {
        return Err(ParseError::ArgumentGrouping {
            command: letter,
            arity,
            got: numbers.len(),
            src: ctx.named_source(),
            span,
        });
    }

    Ok(PathInstruction::from_numbers(command, relative, &numbers))
}

/// Parse a `points` attribute (polygon, polyline) into coordinate pairs.
pub fn point_list(source: &str) -> Result<Vec<DVec2>, ParseError> {
    let ctx = SourceContext::new("points", source);
    let pairs = SvgParser::parse(Rule::point_list, source).map_err(|e| ctx.syntax_error(e))?;

    let mut numbers = Vec::new();
    let mut last_span = SourceSpan::from((0, source.len()));
    for pair in pairs {
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::number {
                last_span = span_of(&inner);
                numbers.push(parse_number(&inner, &ctx)?);
            }
        }
    }

    if numbers.len() % 2 != 0 {
        return Err(ParseError::OddPoints {
            got: numbers.len(),
            src: ctx.named_source(),
            span: last_span,
        });
    }
    Ok(numbers.chunks_exact(2).map(|c| dvec2(c[0], c[1])).collect())
}

/// Parse a single number with an optional unit suffix, e.g. `12.5px` or `50%`.
///
/// `name` is the attribute or style property the text came from.
pub fn length(name: &str, source: &str) -> Result<Length, ParseError> {
    let ctx = SourceContext::new(name, source);
    let pairs = SvgParser::parse(Rule::length, source).map_err(|e| ctx.syntax_error(e))?;

    let mut value = 0.0;
    let mut unit = "";
    for pair in pairs {
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::number => value = parse_number(&inner, &ctx)?,
                Rule::unit => unit = inner.as_str(),
                _ => {}
            }
        }
    }
    Ok(Length::new(value, unit))
}

/// Parse a comma- or whitespace-separated list of lengths
/// (`stroke-dasharray`, multi-valued text `x`).
pub fn length_list(name: &str, source: &str) -> Result<Vec<Length>, ParseError> {
    source
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| length(name, token))
        .collect()
}
