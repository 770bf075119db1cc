//! # Attendance Register
//!
//! At most one attendance row per `(employee_id, date)`, enforced by a
//! check-then-act upsert rather than a schema constraint.
//!
//! ## Submission Resolution
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                 record(employee, date, status)                    │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  SELECT row for (employee_id, date)                              │
//! │       ├── found:  UPDATE status + custom_salary in place         │
//! │       │           (primary id kept, last write wins)             │
//! │       └── absent: INSERT with the submitted id                   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The read and the write are separate statements. Two truly simultaneous
//! submissions for the same pair can both observe "absent" and insert twice;
//! with a single operator at one counter that window is accepted, and the
//! duplicate stays visible in listings instead of silently corrupting data.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use khata_core::{Attendance, AttendancePatch, NewAttendance};

use super::{new_id, EntityStore, HardDelete, PatchFields, Record};
use crate::error::{DbError, DbResult};
use crate::update::SqlValue;

impl Record for Attendance {
    const ENTITY: &'static str = "Attendance";
    const TABLE: &'static str = "attendance";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "id",
        "date",
        "employee_id",
        "status",
        "custom_salary",
        "created_at",
    ];
    const ORDER_BY: &'static str = "date DESC, rowid DESC";

    type New = NewAttendance;
    type Patch = AttendancePatch;

    fn from_new(new: NewAttendance) -> Self {
        Attendance {
            id: new.id.unwrap_or_else(new_id),
            date: new.date,
            employee_id: new.employee_id,
            status: new.status,
            custom_salary: new.custom_salary,
            created_at: Utc::now(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_values(&self) -> Vec<SqlValue> {
        vec![
            self.id.as_str().into(),
            self.date.into(),
            self.employee_id.as_str().into(),
            self.status.into(),
            self.custom_salary.into(),
            self.created_at.into(),
        ]
    }
}

impl HardDelete for Attendance {}

impl PatchFields for AttendancePatch {
    fn into_fields(self) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(date) = self.date {
            fields.push(("date", date.into()));
        }
        if let Some(employee_id) = self.employee_id {
            fields.push(("employee_id", employee_id.into()));
        }
        if let Some(status) = self.status {
            fields.push(("status", status.into()));
        }
        if let Some(custom_salary) = self.custom_salary {
            fields.push(("custom_salary", custom_salary.into()));
        }
        fields
    }
}

/// Persistence for daily attendance, wrapping the generic store with the
/// day-upsert rule.
#[derive(Clone)]
pub struct AttendanceRegister {
    store: EntityStore<Attendance>,
}

impl AttendanceRegister {
    pub fn new(pool: SqlitePool) -> Self {
        AttendanceRegister {
            store: EntityStore::new(pool),
        }
    }

    /// Records attendance for an employee-day.
    ///
    /// Resolves to an in-place update when a row for the pair already
    /// exists (its primary id and created_at survive; status and
    /// custom_salary take the submitted values, including clearing the
    /// override back to NULL), insert otherwise.
    pub async fn record(&self, new: NewAttendance) -> DbResult<Attendance> {
        let existing = self.find(&new.employee_id, new.date).await?;

        match existing {
            Some(current) => {
                let updated = sqlx::query_as::<_, Attendance>(
                    "UPDATE attendance SET status = ?, custom_salary = ?
                     WHERE id = ? RETURNING *",
                )
                .bind(new.status)
                .bind(new.custom_salary)
                .bind(&current.id)
                .fetch_optional(self.store.pool())
                .await?
                // The row was just read; losing it here means a concurrent
                // delete won the race, which must fail loudly.
                .ok_or_else(|| DbError::not_found("Attendance", &current.id))?;

                debug!(
                    employee_id = updated.employee_id.as_str(),
                    date = %updated.date,
                    "Attendance updated in place"
                );
                Ok(updated)
            }
            None => self.store.create(new).await,
        }
    }

    /// The row for one employee-day, if any.
    pub async fn find(&self, employee_id: &str, date: NaiveDate) -> DbResult<Option<Attendance>> {
        let row = sqlx::query_as::<_, Attendance>(
            "SELECT * FROM attendance WHERE employee_id = ? AND date = ?",
        )
        .bind(employee_id)
        .bind(date)
        .fetch_optional(self.store.pool())
        .await?;
        Ok(row)
    }

    /// All rows for one calendar day.
    pub async fn list_for_date(&self, date: NaiveDate) -> DbResult<Vec<Attendance>> {
        let rows = sqlx::query_as::<_, Attendance>(
            "SELECT * FROM attendance WHERE date = ? ORDER BY rowid ASC",
        )
        .bind(date)
        .fetch_all(self.store.pool())
        .await?;
        Ok(rows)
    }

    pub async fn list_all(&self) -> DbResult<Vec<Attendance>> {
        self.store.list_all().await
    }

    /// Direct correction by primary id, bypassing the day-upsert.
    pub async fn update(&self, id: &str, patch: AttendancePatch) -> DbResult<Option<Attendance>> {
        self.store.update(id, patch).await
    }

    pub async fn delete(&self, id: &str) -> DbResult<Option<Attendance>> {
        self.store.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    use khata_core::{AttendanceStatus, Employee, Money, NewEmployee, SalaryType};

    use super::*;
    use crate::schema;

    async fn setup() -> (AttendanceRegister, Employee) {
        let pool: SqlitePool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        schema::reconcile(&pool).await.unwrap();

        let employee = EntityStore::<Employee>::new(pool.clone())
            .create(NewEmployee {
                name: "Rashid".to_string(),
                salary_type: SalaryType::Daily,
                daily_salary: Money::from_rupees(800),
                mobile: None,
                area: None,
            })
            .await
            .unwrap();

        (AttendanceRegister::new(pool), employee)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    fn submission(employee_id: &str, d: u32, status: AttendanceStatus) -> NewAttendance {
        NewAttendance {
            id: Some(uuid::Uuid::new_v4().to_string()),
            date: day(d),
            employee_id: employee_id.to_string(),
            status,
            custom_salary: None,
        }
    }

    #[tokio::test]
    async fn test_first_submission_inserts() {
        let (register, employee) = setup().await;

        let row = register
            .record(submission(&employee.id, 1, AttendanceStatus::Present))
            .await
            .unwrap();
        assert_eq!(row.status, AttendanceStatus::Present);
        assert_eq!(register.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resubmission_updates_in_place() {
        let (register, employee) = setup().await;

        let first = register
            .record(submission(&employee.id, 1, AttendanceStatus::Present))
            .await
            .unwrap();

        let mut correction = submission(&employee.id, 1, AttendanceStatus::HalfDay);
        correction.custom_salary = Some(Money::from_rupees(400));
        let second = register.record(correction).await.unwrap();

        // Primary id survives; the submitted id is discarded.
        assert_eq!(second.id, first.id);
        assert_eq!(second.status, AttendanceStatus::HalfDay);
        assert_eq!(second.custom_salary, Some(Money::from_rupees(400)));
        assert_eq!(register.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resubmission_clears_salary_override() {
        let (register, employee) = setup().await;

        let mut with_override = submission(&employee.id, 2, AttendanceStatus::HalfDay);
        with_override.custom_salary = Some(Money::from_rupees(400));
        register.record(with_override).await.unwrap();

        // Last write wins: a submission without the override removes it.
        let plain = register
            .record(submission(&employee.id, 2, AttendanceStatus::Present))
            .await
            .unwrap();
        assert!(plain.custom_salary.is_none());
    }

    #[tokio::test]
    async fn test_distinct_days_get_distinct_rows() {
        let (register, employee) = setup().await;

        register
            .record(submission(&employee.id, 1, AttendanceStatus::Present))
            .await
            .unwrap();
        register
            .record(submission(&employee.id, 2, AttendanceStatus::Absent))
            .await
            .unwrap();

        assert_eq!(register.list_all().await.unwrap().len(), 2);
        assert_eq!(register.list_for_date(day(2)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_attendance_requires_existing_employee() {
        let (register, _) = setup().await;

        let result = register
            .record(submission("no-such-employee", 1, AttendanceStatus::Present))
            .await;
        assert!(result.is_err());
    }
}
