//! Numeric primitives shared by the attribute codecs.
//!
//! SVG lengths are a number plus an optional unit suffix (`12`, `1.5px`,
//! `2em`). Transforms only ever touch the number; the suffix rides along.

use std::fmt;

/// Default number of significant figures used when re-serialising numbers.
pub const DEFAULT_PRECISION: usize = 6;

/// Magnitudes below this are written as `0` (trigonometric noise from rotations).
const ZERO_SNAP: f64 = 1e-9;

const ABSOLUTE_UNITS: [&str; 7] = ["", "px", "pt", "pc", "mm", "cm", "in"];

/// A numeric attribute value with its unit suffix preserved.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Length {
    pub value: f64,
    /// Unit suffix exactly as written (`""` when unitless).
    pub unit: String,
}

impl Length {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    /// A unitless length.
    pub fn unitless(value: f64) -> Self {
        Self::new(value, "")
    }

    /// Same unit, new value.
    pub fn with_value(&self, value: f64) -> Self {
        Self::new(value, self.unit.clone())
    }

    /// Multiply the value, keeping the unit.
    pub fn scaled(&self, factor: f64) -> Self {
        self.with_value(self.value * factor)
    }

    pub fn is_percentage(&self) -> bool {
        self.unit == "%"
    }

    /// Unitless or an absolute unit. `em`, `ex` and `%` resolve against
    /// something else and are not.
    pub fn is_absolute(&self) -> bool {
        ABSOLUTE_UNITS
            .iter()
            .any(|unit| self.unit.eq_ignore_ascii_case(unit))
    }

    /// Format with `precision` significant figures.
    pub fn encode(&self, precision: usize) -> String {
        format!("{}{}", fmt_num(self.value, precision), self.unit)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode(DEFAULT_PRECISION))
    }
}

/// Format a number with `sig_figs` significant figures, trailing zeros trimmed.
///
/// `-0` and values closer to zero than `1e-9` come out as `0`.
pub fn fmt_num(value: f64, sig_figs: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value.abs() < ZERO_SNAP {
        return "0".to_string();
    }

    let sig_figs = sig_figs.max(1) as i32;
    let abs_val = value.abs();
    let magnitude = abs_val.log10().floor() as i32;
    let scale = 10_f64.powi(sig_figs - 1 - magnitude);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 {
        return "0".to_string();
    }

    let decimals = (sig_figs - 1 - magnitude).max(0) as usize;
    let s = format!("{:.prec$}", rounded, prec = decimals);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s.as_str()
    };
    s.to_string()
}
