//! Row decoding helpers shared by the query modules.

use std::{fmt::Display, str::FromStr};

use jiff::Timestamp;
use rusqlite::{Row, types::Type};

/// Reads an integer ID column.
pub(crate) fn id_column(row: &Row, idx: usize) -> rusqlite::Result<u64> {
    Ok(row.get::<_, i64>(idx)? as u64)
}

/// Reads a nullable integer ID column.
pub(crate) fn optional_id_column(row: &Row, idx: usize) -> rusqlite::Result<Option<u64>> {
    Ok(row.get::<_, Option<i64>>(idx)?.map(|id| id as u64))
}

/// Reads a percentage column, clamped to `0..=100`.
pub(crate) fn percent_column(row: &Row, idx: usize) -> rusqlite::Result<u8> {
    Ok(row.get::<_, i64>(idx)?.clamp(0, 100) as u8)
}

/// Parses an RFC 3339 timestamp column.
pub(crate) fn timestamp_column(row: &Row, idx: usize) -> rusqlite::Result<Timestamp> {
    row.get::<_, String>(idx)?
        .parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Parses a nullable RFC 3339 timestamp column.
pub(crate) fn optional_timestamp_column(
    row: &Row,
    idx: usize,
) -> rusqlite::Result<Option<Timestamp>> {
    row.get::<_, Option<String>>(idx)?
        .map(|s| {
            s.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
        })
        .transpose()
}

/// Parses a text column through [`FromStr`], e.g. a status enum.
pub(crate) fn parsed_column<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.to_string().into())
    })
}

/// Decodes a JSON text column.
pub(crate) fn json_column<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
