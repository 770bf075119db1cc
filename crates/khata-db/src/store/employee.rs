//! Employee persistence.

use chrono::Utc;

use khata_core::validation::validate_name;
use khata_core::{Employee, EmployeePatch, NewEmployee, ValidationError};

use super::{new_id, HardDelete, PatchFields, Record};
use crate::update::SqlValue;

impl Record for Employee {
    const ENTITY: &'static str = "Employee";
    const TABLE: &'static str = "employees";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "salary_type",
        "daily_salary",
        "mobile",
        "area",
        "active",
        "created_at",
    ];
    const ORDER_BY: &'static str = "name ASC";

    type New = NewEmployee;
    type Patch = EmployeePatch;

    fn validate(new: &NewEmployee) -> Result<(), ValidationError> {
        validate_name(&new.name)
    }

    fn from_new(new: NewEmployee) -> Self {
        Employee {
            id: new_id(),
            name: new.name,
            salary_type: new.salary_type,
            daily_salary: new.daily_salary,
            mobile: new.mobile,
            area: new.area,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_values(&self) -> Vec<SqlValue> {
        vec![
            self.id.as_str().into(),
            self.name.as_str().into(),
            self.salary_type.into(),
            self.daily_salary.into(),
            self.mobile.clone().into(),
            self.area.clone().into(),
            self.active.into(),
            self.created_at.into(),
        ]
    }
}

impl HardDelete for Employee {}

impl PatchFields for EmployeePatch {
    fn into_fields(self) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(name) = self.name {
            fields.push(("name", name.into()));
        }
        if let Some(salary_type) = self.salary_type {
            fields.push(("salary_type", salary_type.into()));
        }
        if let Some(daily_salary) = self.daily_salary {
            fields.push(("daily_salary", daily_salary.into()));
        }
        if let Some(mobile) = self.mobile {
            fields.push(("mobile", mobile.into()));
        }
        if let Some(area) = self.area {
            fields.push(("area", area.into()));
        }
        if let Some(active) = self.active {
            fields.push(("active", active.into()));
        }
        fields
    }
}
