use anyhow::{bail, ensure};
use logos::{Lexer, Logos};
use std::{fmt::Display, str::FromStr};

/// A radio transmit (PHY) rate.
///
/// Stored in bits per second; radio rates use decimal units, so
/// `12mbps` is 12,000,000 bps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxRate(
    /// bits per seconds
    u64,
);

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")] // Ignore this regex pattern between tokens
enum TxRateToken {
    #[regex("bps")]
    Bps,
    #[regex("kbps")]
    Kbps,
    #[regex("mbps")]
    Mbps,
    #[regex("gbps")]
    Gbps,

    #[regex("[0-9]+")]
    Value,
}

impl TxRate {
    pub const fn from_bps(bps: u64) -> Self {
        Self(bps)
    }

    pub const fn from_mbps(mbps: u64) -> Self {
        Self(mbps * 1_000 * 1_000)
    }

    pub fn into_bps(self) -> u64 {
        self.0
    }
}

const K: u64 = 1_000;
const M: u64 = 1_000 * 1_000;
const G: u64 = 1_000 * 1_000 * 1_000;

impl Display for TxRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let v = self.0;
        let k = self.0 / K;
        let m = self.0 / M;
        let g = self.0 / G;

        let v_r = self.0 % K;
        let k_r = self.0 % M;
        let m_r = self.0 % G;

        if v < K || v_r != 0 {
            write!(f, "{v}bps")
        } else if v < M || k_r != 0 {
            write!(f, "{k}kbps")
        } else if v < G || m_r != 0 {
            write!(f, "{m}mbps")
        } else {
            write!(f, "{g}gbps")
        }
    }
}

impl FromStr for TxRate {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Lexer::<'_, TxRateToken>::new(s);

        let Some(Ok(TxRateToken::Value)) = lex.next() else {
            bail!("Expecting to parse a number")
        };
        let number: u64 = lex.slice().parse()?;
        let Some(Ok(token)) = lex.next() else {
            bail!("Expecting to parse a unit")
        };
        let bps = match token {
            TxRateToken::Bps => number,
            TxRateToken::Kbps => number * K,
            TxRateToken::Mbps => number * M,
            TxRateToken::Gbps => number * G,
            TxRateToken::Value => bail!("Expecting to parse a unit (bps, kbps, ...)"),
        };

        ensure!(
            lex.next().is_none(),
            "Not expecting any other tokens to parse a rate"
        );

        Ok(Self(bps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rate() {
        macro_rules! assert_rate {
            ($string:literal == $value:expr) => {
                assert_eq!($string.parse::<TxRate>().unwrap(), TxRate($value));
            };
        }

        assert_rate!("0bps" == 0);
        assert_rate!("54bps" == 54);
        assert_rate!("54kbps" == 54 * 1_000);
        assert_rate!("12mbps" == 12 * 1_000 * 1_000);
        assert_rate!("1gbps" == 1_000 * 1_000 * 1_000);
    }

    #[test]
    fn print_rate() {
        macro_rules! assert_rate {
            (($rate:expr) == $string:literal) => {
                assert_eq!(TxRate($rate).to_string(), $string);
            };
        }

        assert_rate!((0) == "0bps");
        assert_rate!((54) == "54bps");
        assert_rate!((54 * K) == "54kbps");
        assert_rate!((12 * M) == "12mbps");
        assert_rate!((2 * G) == "2gbps");

        assert_rate!((12_345) == "12345bps");
        assert_rate!((12_345 * K) == "12345kbps");
    }

    #[test]
    fn reject_garbage() {
        assert!("mbps".parse::<TxRate>().is_err());
        assert!("12".parse::<TxRate>().is_err());
        assert!("12mbps extra".parse::<TxRate>().is_err());
    }
}
