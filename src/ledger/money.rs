//! Monetary input parsing
//!
//! Amounts arrive either as JSON numbers or as strings typed into a form
//! field ("2.50", "2,50", " 3 "). Both are parsed into plain `f64`; no
//! rounding is applied.

use crate::error::{LedgerError, Result};
use serde::{Deserialize, Deserializer};

/// Parse a user-supplied decimal, accepting `,` as decimal separator.
pub fn parse_amount(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::validation("amount is required"));
    }

    let normalized = trimmed.replace(',', ".");
    let value = normalized
        .parse::<f64>()
        .map_err(|_| LedgerError::validation(format!("invalid amount: {trimmed}")))?;

    if !value.is_finite() {
        return Err(LedgerError::validation(format!("invalid amount: {trimmed}")));
    }

    Ok(value)
}

/// Require a finite amount strictly greater than zero.
pub fn ensure_positive(amount: f64) -> Result<f64> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(LedgerError::validation("amount must be greater than zero"))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    fn into_amount(self) -> Result<f64> {
        match self {
            RawAmount::Number(v) if v.is_finite() => Ok(v),
            RawAmount::Number(_) => Err(LedgerError::validation("invalid amount")),
            RawAmount::Text(s) => parse_amount(&s),
        }
    }
}

/// `#[serde(deserialize_with = "...")]` helper for a single amount.
pub fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    RawAmount::deserialize(deserializer)?
        .into_amount()
        .map_err(serde::de::Error::custom)
}

/// Same as [`deserialize_amount`] for a `name -> amount` map.
pub fn deserialize_amount_map<'de, D>(
    deserializer: D,
) -> std::result::Result<std::collections::BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = std::collections::BTreeMap::<String, RawAmount>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(name, amount)| {
            amount
                .into_amount()
                .map(|v| (name, v))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Deserialize)]
    struct Payload {
        #[serde(deserialize_with = "deserialize_amount")]
        amount: f64,
    }

    #[derive(Deserialize)]
    struct Prices {
        #[serde(deserialize_with = "deserialize_amount_map")]
        prices: BTreeMap<String, f64>,
    }

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount("2.50").unwrap(), 2.5);
        assert_eq!(parse_amount(" 2,50 ").unwrap(), 2.5);
        assert_eq!(parse_amount("-1").unwrap(), -1.0);
        assert!(parse_amount("").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("inf").is_err());
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive(0.01).is_ok());
        assert!(ensure_positive(0.0).is_err());
        assert!(ensure_positive(-5.0).is_err());
        assert!(ensure_positive(f64::NAN).is_err());
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let a: Payload = serde_json::from_str(r#"{"amount": 4}"#).unwrap();
        assert_eq!(a.amount, 4.0);
        let b: Payload = serde_json::from_str(r#"{"amount": "4,25"}"#).unwrap();
        assert_eq!(b.amount, 4.25);
        assert!(serde_json::from_str::<Payload>(r#"{"amount": "four"}"#).is_err());

        let p: Prices =
            serde_json::from_str(r#"{"prices": {"bier": "1.5", "kurze": 0.5}}"#).unwrap();
        assert_eq!(p.prices["bier"], 1.5);
        assert_eq!(p.prices["kurze"], 0.5);
    }
}
