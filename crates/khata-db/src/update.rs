//! # Partial Update Builder
//!
//! Turns a sparse set of changed fields into a safe parameterized UPDATE.
//!
//! ## How It Works
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                Partial Update Construction                       │
//! │                                                                  │
//! │  Caller supplies: [("amount_received", 20000), ("status", paid)] │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  UPDATE sales SET amount_received = ?, payment_status = ?        │
//! │  WHERE id = ?                                                    │
//! │  RETURNING *                                                     │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  args: [Integer(20000), Text("paid"), Text("<id>")]              │
//! │                                                                  │
//! │  • Every value is BOUND, never interpolated                      │
//! │  • Each supplied column appears exactly once                     │
//! │  • Unsupplied columns are never touched                          │
//! │  • Empty field set is a caller error, not a silent no-op         │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `RETURNING *` makes absence observable as an empty row set, which the
//! stores surface as `Ok(None)` for callers to map to 404.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value as JsonValue;
use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

use khata_core::{
    AttendanceStatus, Money, PaymentStatus, Quantity, SalaryType, StockType, ValidationError,
};

use crate::error::{DbError, DbResult};

// =============================================================================
// Dynamic Argument Values
// =============================================================================

/// A dynamically-typed SQL argument.
///
/// SQLite only needs three storage classes here: TEXT, INTEGER and NULL.
/// Money and Quantity bind as their integer minor units; dates, enums and
/// opaque JSON bind as text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Text(String),
}

impl SqlValue {
    /// Binds this value onto a plain query.
    pub(crate) fn bind_to<'q>(
        self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Integer(i) => query.bind(i),
            SqlValue::Text(s) => query.bind(s),
        }
    }

    /// Binds this value onto a row-mapping query.
    pub(crate) fn bind_to_as<'q, O>(
        self,
        query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    ) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
        match self {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Integer(i) => query.bind(i),
            SqlValue::Text(s) => query.bind(s),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Integer(v as i64)
    }
}

impl From<Money> for SqlValue {
    fn from(v: Money) -> Self {
        SqlValue::Integer(v.paise())
    }
}

impl From<Quantity> for SqlValue {
    fn from(v: Quantity) -> Self {
        SqlValue::Integer(v.milli())
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        // ISO-8601, same encoding sqlx uses for NaiveDate columns.
        SqlValue::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Text(v.to_rfc3339())
    }
}

impl From<PaymentStatus> for SqlValue {
    fn from(v: PaymentStatus) -> Self {
        SqlValue::Text(v.as_str().to_string())
    }
}

impl From<StockType> for SqlValue {
    fn from(v: StockType) -> Self {
        SqlValue::Text(v.as_str().to_string())
    }
}

impl From<SalaryType> for SqlValue {
    fn from(v: SalaryType) -> Self {
        SqlValue::Text(v.as_str().to_string())
    }
}

impl From<AttendanceStatus> for SqlValue {
    fn from(v: AttendanceStatus) -> Self {
        SqlValue::Text(v.as_str().to_string())
    }
}

/// Opaque JSON payloads (sale/order `items`) persist as their compact
/// serialization; the core never looks inside.
impl From<&JsonValue> for SqlValue {
    fn from(v: &JsonValue) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<JsonValue> for SqlValue {
    fn from(v: JsonValue) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => SqlValue::Null,
        }
    }
}

// =============================================================================
// Update Builder
// =============================================================================

/// A built update: the parameterized statement plus its positional
/// arguments (SET values first, then key values).
#[derive(Debug, Clone)]
pub struct BuiltUpdate {
    pub sql: String,
    pub args: Vec<SqlValue>,
}

/// Builds a "set only what changed" UPDATE statement.
///
/// ## Usage
/// ```rust,ignore
/// let mut builder = UpdateBuilder::new("customers");
/// builder.set_if("name", patch.name);
/// builder.set_if("mobile", patch.mobile);
/// let built = builder.build(&[("id", id.into())])?;
/// ```
#[derive(Debug)]
pub struct UpdateBuilder {
    table: &'static str,
    fields: Vec<(&'static str, SqlValue)>,
}

impl UpdateBuilder {
    /// Creates a builder for the given table.
    pub fn new(table: &'static str) -> Self {
        UpdateBuilder {
            table,
            fields: Vec::new(),
        }
    }

    /// Supplies a column value.
    ///
    /// Setting the same column twice keeps the last value, so the built
    /// statement references each supplied column exactly once.
    pub fn set(&mut self, column: &'static str, value: impl Into<SqlValue>) -> &mut Self {
        let value = value.into();
        if let Some(existing) = self.fields.iter_mut().find(|(c, _)| *c == column) {
            existing.1 = value;
        } else {
            self.fields.push((column, value));
        }
        self
    }

    /// Supplies a column value only when the caller actually sent one.
    pub fn set_if<T: Into<SqlValue>>(&mut self, column: &'static str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.set(column, v);
        }
        self
    }

    /// True when no fields have been supplied.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds the parameterized statement, terminated by the key predicate.
    ///
    /// ## Errors
    /// Returns [`ValidationError::NoFieldsToUpdate`] when the supplied
    /// field set is empty: silently returning the unmodified row would
    /// mask client bugs.
    pub fn build(self, key: &[(&'static str, SqlValue)]) -> DbResult<BuiltUpdate> {
        if self.fields.is_empty() {
            return Err(DbError::Validation(ValidationError::NoFieldsToUpdate));
        }

        let assignments: Vec<String> = self
            .fields
            .iter()
            .map(|(column, _)| format!("{} = ?", column))
            .collect();

        let predicate: Vec<String> = key
            .iter()
            .map(|(column, _)| format!("{} = ?", column))
            .collect();

        let sql = format!(
            "UPDATE {} SET {} WHERE {} RETURNING *",
            self.table,
            assignments.join(", "),
            predicate.join(" AND ")
        );

        let mut args: Vec<SqlValue> = self.fields.into_iter().map(|(_, v)| v).collect();
        args.extend(key.iter().map(|(_, v)| v.clone()));

        Ok(BuiltUpdate { sql, args })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
