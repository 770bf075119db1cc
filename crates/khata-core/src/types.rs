//! # Domain Types
//!
//! Core domain types for the khata ledger.
//!
//! ## Entity Families
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                             │
//! │                                                                  │
//! │  Parties:       Customer, Employee                               │
//! │  Transactions:  Sale, Order, Expense, Production                 │
//! │  Inventory:     Product, StockItem (composite key)               │
//! │  Payroll:       Attendance (one row per employee per day)        │
//! │  Raw material:  Purchase, Usage, Price                           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Naming Boundary
//! Struct fields are `snake_case` and map 1:1 onto database columns;
//! serde renames everything to `camelCase` for the API surface. That
//! translation is the entire boundary between the core and its callers.
//!
//! ## Dual-Key Identity
//! - `id`: UUID v4 string, immutable, used for relations
//! - Stock uses a composite business key `(type, name)` instead
//! - Attendance is additionally keyed by business rule on
//!   `(employee_id, date)` (at most one row per pair)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::money::{Money, Quantity};

// =============================================================================
// Payment Status
// =============================================================================

/// Payment state of a sale or order.
///
/// The only transition is `not_paid → paid`, driven either by allocation
/// reaching a zero balance or by an explicit mark-fully-paid write-off.
/// There is no transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    NotPaid,
}

impl PaymentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::NotPaid => "not_paid",
        }
    }
}

// =============================================================================
// Stock Type
// =============================================================================

/// The two stock buckets: finished products and raw materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum StockType {
    Product,
    RawMaterial,
}

impl StockType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StockType::Product => "product",
            StockType::RawMaterial => "raw_material",
        }
    }
}

// =============================================================================
// Salary Type
// =============================================================================

/// How an employee is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SalaryType {
    Daily,
    Monthly,
}

impl SalaryType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SalaryType::Daily => "daily",
            SalaryType::Monthly => "monthly",
        }
    }
}

// =============================================================================
// Attendance Status
// =============================================================================

/// Daily attendance outcome for an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
}

impl AttendanceStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::HalfDay => "half_day",
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer of the business. Sales and orders reference customers by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    /// Display name; must be non-empty.
    pub name: String,
    pub mobile: Option<String>,
    pub place: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a customer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalogue.
///
/// Products are never hard-deleted: sale and order line items embed product
/// names as free text rather than foreign keys, so deletion would orphan
/// history. Delete is a soft deactivate (`active = false`) instead, and
/// name uniqueness is only enforced among active products.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    /// Unit of measure (e.g. "kg", "pcs").
    pub unit: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub unit: String,
}

// =============================================================================
// Sale
// =============================================================================

/// A sale transaction.
///
/// `items` is an opaque JSON list of line items: the core persists and
/// returns it untouched and never interprets its internal structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub date: NaiveDate,
    pub customer_id: String,
    pub discount: Money,
    pub total: Money,
    pub payment_status: PaymentStatus,
    pub amount_received: Money,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub items: JsonValue,
    pub buy_type: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a sale.
///
/// Server-assigned defaults: `payment_status` is `paid` when absent; a paid
/// sale with no explicit `amount_received` is considered received in full.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub date: NaiveDate,
    pub customer_id: String,
    #[serde(default)]
    pub discount: Money,
    pub total: Money,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub amount_received: Option<Money>,
    pub items: JsonValue,
    #[serde(default)]
    pub buy_type: Option<String>,
}

// =============================================================================
// Order
// =============================================================================

/// A customer order booked for later delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub booking_date: NaiveDate,
    /// Must not precede `booking_date` (application invariant).
    pub due_date: NaiveDate,
    pub customer_id: String,
    /// Free-form workflow status (e.g. "pending", "delivered").
    pub status: String,
    pub discount: Money,
    pub total: Money,
    pub payment_status: PaymentStatus,
    pub amount_received: Money,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub items: JsonValue,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an order. Orders default to `not_paid`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub booking_date: NaiveDate,
    pub due_date: NaiveDate,
    pub customer_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub discount: Money,
    pub total: Money,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub amount_received: Option<Money>,
    pub items: JsonValue,
}

// =============================================================================
// Expense
// =============================================================================

/// A business expense.
///
/// The material fields superseded an older `description`/`qty` pair; the
/// schema manager migrates legacy databases on boot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub date: NaiveDate,
    pub category: String,
    pub material_name: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<Quantity>,
    pub amount: Money,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an expense. `amount` is required.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub date: NaiveDate,
    pub category: String,
    #[serde(default)]
    pub material_name: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    pub amount: Money,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Production
// =============================================================================

/// A production run for a finished item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Production {
    pub id: String,
    pub date: NaiveDate,
    pub item: String,
    pub qty: Quantity,
    pub unit: String,
    pub batch_number: Option<String>,
    /// Quantity packed so far; should not exceed `qty`
    /// (application invariant, not enforced).
    pub packed_qty: Quantity,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a production record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduction {
    pub date: NaiveDate,
    pub item: String,
    pub qty: Quantity,
    pub unit: String,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub packed_qty: Quantity,
}

// =============================================================================
// Stock
// =============================================================================

/// A stock row, keyed by the composite `(type, name)`.
///
/// `qty` is adjusted only via delta-upsert on the creation path, never a
/// blind overwrite; manual correction goes through a distinct absolute-set
/// operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub stock_type: StockType,
    pub name: String,
    pub qty: Quantity,
    pub unit: Option<String>,
}

/// Stock rows partitioned into the two type buckets for presentation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockByType {
    pub products: Vec<StockItem>,
    pub raw_materials: Vec<StockItem>,
}

// =============================================================================
// Employee
// =============================================================================

/// An employee on the payroll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub salary_type: SalaryType,
    pub daily_salary: Money,
    pub mobile: Option<String>,
    pub area: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an employee.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub name: String,
    pub salary_type: SalaryType,
    pub daily_salary: Money,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
}

// =============================================================================
// Attendance
// =============================================================================

/// A daily attendance record: **at most one row per (employee_id, date)**.
///
/// The register resolves a submission to update-in-place when a row for the
/// pair exists (last write wins), insert otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: String,
    pub date: NaiveDate,
    pub employee_id: String,
    pub status: AttendanceStatus,
    /// Per-day salary override (e.g. half-day or overtime rate).
    pub custom_salary: Option<Money>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording attendance.
///
/// `id` is client-generated; it is only used when the submission turns out
/// to be an insert. When a row for `(employee_id, date)` already exists,
/// its primary id is kept and only status/custom_salary change.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendance {
    #[serde(default)]
    pub id: Option<String>,
    pub date: NaiveDate,
    pub employee_id: String,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub custom_salary: Option<Money>,
}

// =============================================================================
// Raw Material
// =============================================================================

/// A purchase of raw material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialPurchase {
    pub id: String,
    pub date: NaiveDate,
    pub material_name: String,
    pub qty: Quantity,
    pub cost: Money,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a raw material purchase.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRawMaterialPurchase {
    pub date: NaiveDate,
    pub material_name: String,
    pub qty: Quantity,
    pub cost: Money,
}

/// Raw material consumed by production.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialUsage {
    pub id: String,
    pub date: NaiveDate,
    pub material_name: String,
    pub quantity_used: Quantity,
    pub unit: String,
    pub notes: Option<String>,
    pub cost: Money,
    pub created_at: DateTime<Utc>,
}

/// Input for recording raw material usage.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRawMaterialUsage {
    pub date: NaiveDate,
    pub material_name: String,
    pub quantity_used: Quantity,
    pub unit: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub cost: Money,
}

/// Reference price per unit for a raw material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialPrice {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub price_per_unit: Money,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a raw material price entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRawMaterialPrice {
    pub name: String,
    pub unit: String,
    pub price_per_unit: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_values() {
        assert_eq!(PaymentStatus::NotPaid.as_str(), "not_paid");
        assert_eq!(StockType::RawMaterial.as_str(), "raw_material");
        assert_eq!(AttendanceStatus::HalfDay.as_str(), "half_day");
        assert_eq!(SalaryType::Daily.as_str(), "daily");
    }

    #[test]
    fn test_enum_serde_matches_as_str() {
        let json = serde_json::to_string(&PaymentStatus::NotPaid).unwrap();
        assert_eq!(json, "\"not_paid\"");
        let back: PaymentStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PaymentStatus::NotPaid);
    }

    #[test]
    fn test_camel_case_boundary() {
        let new_sale: NewSale = serde_json::from_value(serde_json::json!({
            "date": "2026-01-15",
            "customerId": "c-1",
            "total": 20000,
            "items": [{"product": "Bread", "qty": 2}]
        }))
        .unwrap();

        assert_eq!(new_sale.customer_id, "c-1");
        assert_eq!(new_sale.total.paise(), 20000);
        assert!(new_sale.payment_status.is_none());
        // Items stay opaque JSON.
        assert_eq!(new_sale.items[0]["product"], "Bread");
    }

    #[test]
    fn test_stock_item_serializes_type_field() {
        let item = StockItem {
            stock_type: StockType::RawMaterial,
            name: "Flour".to_string(),
            qty: Quantity::from_whole(25),
            unit: Some("kg".to_string()),
        };
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["type"], "raw_material");
        assert_eq!(v["qty"], 25000);
    }
}
