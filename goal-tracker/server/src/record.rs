//! Identifier handling shared by the goal and task services.
//!
//! Callers hand identifiers over as raw text (path segments, JSON values).
//! An identifier that cannot be a storage key is reported the same way as a
//! key with no row behind it, so callers only ever see "not found".

use sea_orm::{ConnectionTrait, DbErr, EntityTrait, PrimaryKeyTrait};
use serde::Deserialize;

/// Parses a raw identifier into a storage key.
pub fn parse_id(raw: &str) -> Option<i32> {
    raw.parse::<i32>().ok()
}

/// Looks up a row by a raw, caller-supplied identifier.
///
/// Returns `Ok(None)` both for malformed identifiers and for well-formed
/// identifiers with no matching row.
#[tracing::instrument(skip(conn))]
pub async fn find_by_raw_id<E, C>(conn: &C, raw_id: &str) -> Result<Option<E::Model>, DbErr>
where
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
    C: ConnectionTrait,
{
    match parse_id(raw_id) {
        Some(id) => E::find_by_id(id).one(conn).await,
        None => Ok(None),
    }
}

/// An identifier embedded in a JSON body, either as a number or as text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
    Number(i64),
    Text(String),
}

impl RecordKey {
    /// Returns the identifier in the raw form accepted by [`find_by_raw_id`].
    pub fn to_raw(&self) -> String {
        match self {
            RecordKey::Number(number) => number.to_string(),
            RecordKey::Text(text) => text.clone(),
        }
    }
}
