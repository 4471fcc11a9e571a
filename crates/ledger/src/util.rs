use uuid::Uuid;

use crate::{Currency, LedgerError, ResultLedger, accounts};

/// Parses a persisted id column back into a [`Uuid`].
///
/// A malformed id in the database is a data corruption, reported as
/// [`LedgerError::Validation`] rather than a missing record.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultLedger<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| LedgerError::Validation(format!("malformed {label} id: {value}")))
}

/// Trims a user-supplied optional text field, mapping whitespace-only input
/// to `None`.
pub(crate) fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Trims a required name field, rejecting empty input.
pub(crate) fn normalize_required_name(value: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation("name must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Rejects a transfer whose endpoints carry different currencies.
pub(crate) fn ensure_same_currency(
    from: &accounts::Model,
    to: &accounts::Model,
) -> ResultLedger<Currency> {
    let from_currency = Currency::try_from(from.currency.as_str())?;
    let to_currency = Currency::try_from(to.currency.as_str())?;
    if from_currency != to_currency {
        return Err(LedgerError::Validation(format!(
            "currency mismatch: {from_currency} vs {to_currency}"
        )));
    }
    Ok(from_currency)
}
