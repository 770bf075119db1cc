//! # Partial Update Inputs
//!
//! Sparse field sets for the per-entity partial-update path.
//!
//! A `*Patch` struct mirrors the mutable columns of its entity; a field is
//! `Some` only when the caller explicitly supplied it. The database layer
//! turns a patch into a parameterized update that touches exactly the
//! supplied columns; an all-`None` patch is a caller error
//! ([`ValidationError::NoFieldsToUpdate`](crate::error::ValidationError)),
//! never a silent no-op.
//!
//! Deliberately absent: a way to set a nullable column back to NULL. The
//! callers of this core never clear fields, they overwrite them.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::money::{Money, Quantity};
use crate::types::{AttendanceStatus, PaymentStatus, SalaryType};

/// Partial update for [`Customer`](crate::types::Customer).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub place: Option<String>,
}

/// Partial update for [`Product`](crate::types::Product).
///
/// `active` is settable here so a deactivated product can be manually
/// restored; routine deactivation goes through the dedicated soft-delete.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub active: Option<bool>,
}

/// Partial update for [`Sale`](crate::types::Sale).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalePatch {
    pub date: Option<NaiveDate>,
    pub customer_id: Option<String>,
    pub discount: Option<Money>,
    pub total: Option<Money>,
    pub payment_status: Option<PaymentStatus>,
    pub amount_received: Option<Money>,
    pub items: Option<JsonValue>,
    pub buy_type: Option<String>,
}

/// Partial update for [`Order`](crate::types::Order).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderPatch {
    pub booking_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub customer_id: Option<String>,
    pub status: Option<String>,
    pub discount: Option<Money>,
    pub total: Option<Money>,
    pub payment_status: Option<PaymentStatus>,
    pub amount_received: Option<Money>,
    pub items: Option<JsonValue>,
}

/// Partial update for [`Expense`](crate::types::Expense).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpensePatch {
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub material_name: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<Quantity>,
    pub amount: Option<Money>,
    pub notes: Option<String>,
}

/// Partial update for [`Production`](crate::types::Production).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductionPatch {
    pub date: Option<NaiveDate>,
    pub item: Option<String>,
    pub qty: Option<Quantity>,
    pub unit: Option<String>,
    pub batch_number: Option<String>,
    pub packed_qty: Option<Quantity>,
}

/// Partial update for [`Employee`](crate::types::Employee).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub salary_type: Option<SalaryType>,
    pub daily_salary: Option<Money>,
    pub mobile: Option<String>,
    pub area: Option<String>,
    pub active: Option<bool>,
}

/// Partial update for [`Attendance`](crate::types::Attendance) by primary id.
///
/// The usual mutation path is the register's upsert keyed on
/// `(employee_id, date)`; this patch exists for direct corrections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendancePatch {
    pub date: Option<NaiveDate>,
    pub employee_id: Option<String>,
    pub status: Option<AttendanceStatus>,
    pub custom_salary: Option<Money>,
}

/// Partial update for [`RawMaterialPurchase`](crate::types::RawMaterialPurchase).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMaterialPurchasePatch {
    pub date: Option<NaiveDate>,
    pub material_name: Option<String>,
    pub qty: Option<Quantity>,
    pub cost: Option<Money>,
}

/// Partial update for [`RawMaterialUsage`](crate::types::RawMaterialUsage).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMaterialUsagePatch {
    pub date: Option<NaiveDate>,
    pub material_name: Option<String>,
    pub quantity_used: Option<Quantity>,
    pub unit: Option<String>,
    pub notes: Option<String>,
    pub cost: Option<Money>,
}

/// Partial update for [`RawMaterialPrice`](crate::types::RawMaterialPrice).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMaterialPricePatch {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub price_per_unit: Option<Money>,
}
