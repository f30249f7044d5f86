//! Marked numeric values
//!
//! A [`Statistic`] is either a finite number or an explicit
//! [`Undefined`] marker carrying the reason. Analyzers never report an
//! undefined quantity as `0.0` or as a bare NaN.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a statistic has no value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Undefined {
    /// Input series (or window) has zero variance
    ZeroVariance,
    /// Denominator was exactly zero
    DivisionByZero,
    /// At least one contributing observation is missing
    MissingInput,
    /// Not enough preceding periods to fill the window
    InsufficientHistory,
    /// Too few observations for the estimator
    InsufficientObservations,
    /// Computation overflowed or produced NaN
    NonFinite,
}

impl fmt::Display for Undefined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ZeroVariance => "zero variance",
            Self::DivisionByZero => "division by zero",
            Self::MissingInput => "missing input",
            Self::InsufficientHistory => "insufficient history",
            Self::InsufficientObservations => "insufficient observations",
            Self::NonFinite => "non-finite result",
        };
        f.write_str(text)
    }
}

/// A numeric result that may be explicitly undefined
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Statistic {
    Value(f64),
    Undefined(Undefined),
}

impl Statistic {
    /// Wrap a computed number, marking NaN and infinities as [`Undefined::NonFinite`]
    pub fn from_f64(value: f64) -> Self {
        Self::checked(value, Undefined::NonFinite)
    }

    /// Wrap a computed number, marking non-finite values with `reason`
    pub fn checked(value: f64, reason: Undefined) -> Self {
        if value.is_finite() {
            Self::Value(value)
        } else {
            Self::Undefined(reason)
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Undefined(_) => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Self::Value(_))
    }

    pub fn is_undefined(self) -> bool {
        !self.is_defined()
    }

    /// Reason for an undefined value, if any
    pub fn reason(self) -> Option<Undefined> {
        match self {
            Self::Value(_) => None,
            Self::Undefined(reason) => Some(reason),
        }
    }

    /// Flatten into a float for plotting layers that expect NaN gaps
    pub fn to_f64_or_nan(self) -> f64 {
        self.value().unwrap_or(f64::NAN)
    }

    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Self::Value(v) => Self::from_f64(f(v)),
            undefined @ Self::Undefined(_) => undefined,
        }
    }
}

impl From<f64> for Statistic {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}"),
                None => write!(f, "{v}"),
            },
            Self::Undefined(_) => f.write_str("nan"),
        }
    }
}
