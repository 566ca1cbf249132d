//! Column encoding shared by the repositories.
//!
//! Identifiers are stored as UUID text and timestamps as fixed-width RFC 3339
//! text (microseconds, `Z` suffix), so lexical order is chronological order.

use core::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use shopdesk_core::DomainError;

use crate::error::{LedgerError, LedgerResult};

/// Current time at the precision the store keeps.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_ts(
    table: &'static str,
    row: &SqliteRow,
    column: &str,
) -> LedgerResult<DateTime<Utc>> {
    let raw: String = row.try_get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| LedgerError::corrupt(table, format!("{column}: {e}")))
}

/// Decode a TEXT column into anything parsed with `FromStr` (ids, enums).
pub(crate) fn decode<T>(table: &'static str, row: &SqliteRow, column: &str) -> LedgerResult<T>
where
    T: FromStr<Err = DomainError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse()
        .map_err(|e: DomainError| LedgerError::corrupt(table, format!("{column}: {e}")))
}

pub(crate) fn decode_opt<T>(
    table: &'static str,
    row: &SqliteRow,
    column: &str,
) -> LedgerResult<Option<T>>
where
    T: FromStr<Err = DomainError>,
{
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| {
        s.parse()
            .map_err(|e: DomainError| LedgerError::corrupt(table, format!("{column}: {e}")))
    })
    .transpose()
}
