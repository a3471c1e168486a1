//! Inline `style` attribute codec.
//!
//! Only lengths that scale with the coordinate system are interpreted;
//! everything else passes through as written.

use crate::matrix::AffineMatrix;
use crate::parse;
use crate::types::Length;

/// One `key:value` declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleProperty {
    Generic { key: String, value: String },
    StrokeWidth(Length),
    StrokeDashArray(Vec<Length>),
    FontSize(Length),
}

impl StyleProperty {
    /// Interpret a declaration. Values that don't parse stay generic
    /// (`stroke-width:inherit`, `stroke-dasharray:none`).
    pub fn decode(key: &str, value: &str) -> Self {
        let specialised = match key {
            "stroke-width" => parse::length(key, value).ok().map(StyleProperty::StrokeWidth),
            "font-size" => parse::length(key, value).ok().map(StyleProperty::FontSize),
            "stroke-dasharray" => parse::length_list(key, value)
                .ok()
                .filter(|list| !list.is_empty())
                .map(StyleProperty::StrokeDashArray),
            _ => None,
        };
        specialised.unwrap_or_else(|| StyleProperty::Generic {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    pub fn key(&self) -> &str {
        match self {
            StyleProperty::Generic { key, .. } => key,
            StyleProperty::StrokeWidth(_) => "stroke-width",
            StyleProperty::StrokeDashArray(_) => "stroke-dasharray",
            StyleProperty::FontSize(_) => "font-size",
        }
    }

    /// Scale length-valued properties by `sqrt(|det|)` of `matrix`.
    ///
    /// Relative lengths (`em`, `ex`, `%`) follow a value that is scaled
    /// where it is declared, so they are left alone.
    pub fn apply(&mut self, matrix: &AffineMatrix) {
        let factor = matrix.length_scale();
        let scale = |length: &mut Length| {
            if length.is_absolute() {
                *length = length.scaled(factor);
            }
        };
        match self {
            StyleProperty::Generic { .. } => {}
            StyleProperty::StrokeWidth(length) | StyleProperty::FontSize(length) => scale(length),
            StyleProperty::StrokeDashArray(list) => list.iter_mut().for_each(scale),
        }
    }

    /// The value as it should be written back.
    ///
    /// A dash array that holds a single value is written as `none`.
    pub fn encode_value(&self, precision: usize) -> String {
        match self {
            StyleProperty::Generic { value, .. } => value.clone(),
            StyleProperty::StrokeWidth(length) | StyleProperty::FontSize(length) => {
                length.encode(precision)
            }
            StyleProperty::StrokeDashArray(list) if list.len() == 1 => "none".to_string(),
            StyleProperty::StrokeDashArray(list) => list
                .iter()
                .map(|l| l.encode(precision))
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// `key:value;`
    pub fn encode(&self, precision: usize) -> String {
        match self {
            StyleProperty::Generic { key, value } if value.is_empty() => format!("{key};"),
            _ => format!("{}:{};", self.key(), self.encode_value(precision)),
        }
    }

    /// The declared value if this is a generic property.
    pub fn value(&self) -> Option<&str> {
        match self {
            StyleProperty::Generic { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// A decoded `style` attribute, declarations in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    pub properties: Vec<StyleProperty>,
}

impl Style {
    /// Split on `;` then on the first `:`. Empty declarations are dropped.
    pub fn decode(text: &str) -> Self {
        let properties = text
            .split(';')
            .map(str::trim)
            .filter(|decl| !decl.is_empty())
            .map(|decl| match decl.split_once(':') {
                Some((key, value)) => StyleProperty::decode(key.trim(), value.trim()),
                None => StyleProperty::Generic {
                    key: decl.to_string(),
                    value: String::new(),
                },
            })
            .collect();
        Self { properties }
    }

    pub fn apply(&mut self, matrix: &AffineMatrix) {
        for property in &mut self.properties {
            property.apply(matrix);
        }
    }

    pub fn encode(&self, precision: usize) -> String {
        self.properties.iter().map(|p| p.encode(precision)).collect()
    }

    /// Value of a pass-through property such as `clip-path`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.key() == key)
            .and_then(StyleProperty::value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_pass_through() {
        let style = Style::decode("fill:#ff0000; stroke : blue ;;opacity:0.5");
        insta::assert_snapshot!(style.encode(6), @"fill:#ff0000;stroke:blue;opacity:0.5;");
        assert_eq!(style.get("stroke"), Some("blue"));
    }

    #[test]
    fn stroke_width_scales_by_root_determinant() {
        let matrix = AffineMatrix::scale(2.0, 8.0);
        let mut style = Style::decode("stroke-width:1");
        style.apply(&matrix);
        assert_eq!(style.encode(6), "stroke-width:4;");
    }

    #[test]
    fn stroke_width_keeps_unit() {
        let mut style = Style::decode("stroke-width:1.5px;fill:none");
        style.apply(&AffineMatrix::scale(2.0, 2.0));
        assert_eq!(style.encode(6), "stroke-width:3px;fill:none;");
    }

    #[test]
    fn reflection_uses_absolute_determinant() {
        let mut style = Style::decode("stroke-width:2");
        style.apply(&AffineMatrix::scale(-3.0, 3.0));
        assert_eq!(style.encode(6), "stroke-width:6;");
    }

    #[test]
    fn dasharray_scales_each_entry() {
        let mut style = Style::decode("stroke-dasharray:4, 2");
        style.apply(&AffineMatrix::scale(0.5, 0.5));
        assert_eq!(style.encode(6), "stroke-dasharray:2,1;");
    }

    #[test]
    fn single_dash_becomes_none() {
        let mut style = Style::decode("stroke-dasharray:4");
        style.apply(&AffineMatrix::scale(2.0, 2.0));
        assert_eq!(style.encode(6), "stroke-dasharray:none;");
    }

    #[test]
    fn uninterpretable_values_stay_generic() {
        let mut style = Style::decode("stroke-width:inherit;stroke-dasharray:none;font-size:large");
        style.apply(&AffineMatrix::scale(2.0, 2.0));
        insta::assert_snapshot!(
            style.encode(6),
            @"stroke-width:inherit;stroke-dasharray:none;font-size:large;"
        );
    }

    #[test]
    fn relative_lengths_are_not_scaled() {
        let mut style = Style::decode("font-size:1.5em;stroke-width:2%;stroke-dasharray:1ex,2");
        style.apply(&AffineMatrix::scale(2.0, 2.0));
        assert_eq!(style.encode(6), "font-size:1.5em;stroke-width:2%;stroke-dasharray:1ex,4;");

        let mut style = Style::decode("font-size:10PT");
        style.apply(&AffineMatrix::scale(2.0, 2.0));
        assert_eq!(style.encode(6), "font-size:20PT;");
    }

    #[test]
    fn font_size_scales() {
        let mut style = Style::decode("font-size:12px");
        style.apply(&AffineMatrix::scale(1.5, 1.5));
        assert_eq!(style.encode(6), "font-size:18px;");
    }
}
