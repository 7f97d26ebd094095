use anyhow::{anyhow, bail, ensure, Result};
use core::fmt;
use logos::{Lexer, Logos};
use std::str::FromStr;
use thiserror::Error;

/// A dimensionless value in the unit interval `[0, 1]`.
///
/// Thresholds (the carrier-sensing TAU, the minimum packet delivery
/// ratio) and computed delivery ratios are all [`Ratio`]s. Parsing
/// accepts both plain (`0.9`) and percent (`90%`) notation:
///
/// ```
/// # use wtopo_core::Ratio;
/// let tau: Ratio = "0.9".parse().unwrap();
/// assert_eq!(tau, "90%".parse().unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

/// A value outside `[0, 1]` was used where a [`Ratio`] is expected.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("{value} is outside the unit interval [0, 1]")]
pub struct RatioOutOfRange {
    pub value: f64,
}

impl Ratio {
    pub const ZERO: Self = Self(0.0);
    pub const ONE: Self = Self(1.0);

    pub fn new(value: f64) -> Result<Self, RatioOutOfRange> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatioOutOfRange { value })
        }
    }

    /// build a [`Ratio`] from a whole percentage, for compile-time
    /// constants
    ///
    /// # Panics
    ///
    /// Panics (at compile time, for constants) when `percent` exceeds 100.
    pub const fn from_percent(percent: u64) -> Self {
        assert!(percent <= 100, "a ratio cannot exceed 100%");
        Self(percent as f64 / 100.0)
    }

    /// force `value` into the unit interval
    ///
    /// Measured ratios can overshoot (a sniffer counting duplicated
    /// frames reports more than was sent); for verdict purposes anything
    /// above 1 is as good as 1.
    pub(crate) fn clamped(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    #[inline]
    pub fn into_f64(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")] // Ignore this regex pattern between tokens
enum RatioToken {
    #[token("%")]
    Percent,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Value,
}

impl FromStr for Ratio {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Lexer::<'_, RatioToken>::new(s);

        let Some(Ok(RatioToken::Value)) = lex.next() else {
            bail!("Expecting to parse a number")
        };
        let mut value: f64 = lex.slice().parse()?;

        match lex.next() {
            Some(Ok(RatioToken::Percent)) => {
                value /= 100.0;
                ensure!(
                    lex.next().is_none(),
                    "Not expecting any other tokens after `%'"
                );
            }
            Some(_) => bail!("Unexpected trailing input parsing a ratio"),
            None => (),
        }

        Self::new(value).map_err(|error| anyhow!("{error}"))
    }
}
