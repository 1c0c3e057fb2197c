use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::periods::DateRange;
use crate::models::TenantKind;

/// Errors raised when a contract record is malformed.
///
/// Contracts are validated once, at the boundary where they enter the
/// system. Downstream computations assume well-formed contracts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContractError {
    #[error("invalid contract: start date {start} must be before end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid contract: monthly rent must be non-negative, got {0}")]
    NegativeRent(Decimal),

    #[error("invalid contract: tenant name is empty")]
    MissingTenantName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentSchedule {
    #[default]
    Monthly,
    Quarterly,
}

impl PaymentSchedule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            _ => None,
        }
    }

    /// Months between two consecutive payments.
    pub fn months(&self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Monthly => "Ежемесячно",
            Self::Quarterly => "Ежеквартально",
        }
    }
}

/// A lease contract. Start and end dates are inclusive calendar days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: i64,
    pub property_id: i64,
    pub tenant_name: String,
    pub tenant_kind: Option<TenantKind>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rent: Decimal,
    pub payment_schedule: PaymentSchedule,
    pub is_active: bool,
}

impl Contract {
    /// Tenant kind, with a missing value read as a private person.
    pub fn tenant_kind_or_default(&self) -> TenantKind {
        self.tenant_kind.unwrap_or_default()
    }

    /// The lease term as a date range.
    pub fn term(&self) -> DateRange {
        DateRange::new_unchecked(self.start_date, self.end_date)
    }

    /// Days of the lease term that fall inside `range`, if any.
    pub fn overlap(
        &self,
        range: &DateRange,
    ) -> Option<DateRange> {
        self.term().intersect(range)
    }

    pub fn validate(&self) -> Result<(), ContractError> {
        validate_fields(
            &self.tenant_name,
            self.start_date,
            self.end_date,
            self.monthly_rent,
        )
    }
}

/// For creating new contracts (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContract {
    pub property_id: i64,
    pub tenant_name: String,
    pub tenant_kind: Option<TenantKind>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rent: Decimal,
    pub payment_schedule: PaymentSchedule,
    pub is_active: bool,
}

impl NewContract {
    /// # Errors
    ///
    /// Returns [`ContractError`] when the date range is empty or reversed,
    /// the rent is negative, or the tenant name is blank.
    pub fn validate(&self) -> Result<(), ContractError> {
        validate_fields(
            &self.tenant_name,
            self.start_date,
            self.end_date,
            self.monthly_rent,
        )
    }

    /// Validates the record and assigns it an id.
    pub fn into_contract(self, id: i64) -> Result<Contract, ContractError> {
        self.validate()?;
        Ok(Contract {
            id,
            property_id: self.property_id,
            tenant_name: self.tenant_name,
            tenant_kind: self.tenant_kind,
            start_date: self.start_date,
            end_date: self.end_date,
            monthly_rent: self.monthly_rent,
            payment_schedule: self.payment_schedule,
            is_active: self.is_active,
        })
    }
}

fn validate_fields(
    tenant_name: &str,
    start: NaiveDate,
    end: NaiveDate,
    monthly_rent: Decimal,
) -> Result<(), ContractError> {
    if start >= end {
        return Err(ContractError::InvalidDateRange { start, end });
    }
    if monthly_rent < Decimal::ZERO {
        return Err(ContractError::NegativeRent(monthly_rent));
    }
    if tenant_name.trim().is_empty() {
        return Err(ContractError::MissingTenantName);
    }
    Ok(())
}
