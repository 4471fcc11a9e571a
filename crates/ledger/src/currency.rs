use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// ISO-like currency code carried by every account.
///
/// Each account is single-currency; the ledger never converts between
/// currencies and rejects transfers whose endpoints disagree. Monetary values
/// are stored as an `i64` number of **minor units** (see [`Money`]).
///
/// [`Money`]: crate::Money
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Eur | Currency::Usd | Currency::Gbp => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            "GBP" => Ok(Currency::Gbp),
            other => Err(LedgerError::Validation(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Currency::try_from("eur").unwrap(), Currency::Eur);
        assert_eq!(Currency::try_from(" USD ").unwrap(), Currency::Usd);
        assert!(Currency::try_from("JPY").is_err());
    }
}
