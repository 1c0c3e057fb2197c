//! CSV import of properties, lease contracts and expenses.
//!
//! Headers are matched by name, so column order does not matter. Values are
//! trimmed. Optional cells may be left empty. Dates are ISO `YYYY-MM-DD` and
//! amounts are plain decimals (`30000`, `30000.50`).
//!
//! ### properties.csv
//!
//! | Column        | Required | Notes                                          |
//! |---------------|----------|------------------------------------------------|
//! | `id`          | yes      | Referenced by `property_id` in the other files |
//! | `name`        | yes      |                                                |
//! | `address`     | no       |                                                |
//! | `kind`        | no       | `apartment` (default), `house`, `room`, `commercial` |
//! | `area`        | no       | Square metres                                  |
//! | `rooms`       | no       |                                                |
//! | `description` | no       |                                                |
//!
//! ### contracts.csv
//!
//! | Column             | Required | Notes                                  |
//! |--------------------|----------|----------------------------------------|
//! | `id`               | yes      |                                        |
//! | `property_id`      | yes      |                                        |
//! | `tenant_name`      | yes      |                                        |
//! | `tenant_kind`      | no       | `physical` or `legal`; empty = unknown |
//! | `start_date`       | yes      |                                        |
//! | `end_date`         | yes      | After `start_date`                     |
//! | `monthly_rent`     | yes      | Non-negative                           |
//! | `payment_schedule` | no       | `monthly` (default) or `quarterly`     |
//! | `is_active`        | no       | `true` (default) or `false`            |
//!
//! ### expenses.csv
//!
//! ```csv
//! property_id,amount,description,date
//! 1,4500.75,Коммунальные платежи,2025-03-10
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use rent_core::{
    Contract, ContractError, Expense, NewContract, NewExpense, NewProperty, PaymentSchedule,
    Property, PropertyKind, RentalRepository, RepositoryError, TenantKind,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct PropertyRow {
    id: i64,
    name: String,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    area: Option<Decimal>,
    #[serde(default)]
    rooms: Option<u32>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContractRow {
    id: i64,
    property_id: i64,
    tenant_name: String,
    #[serde(default)]
    tenant_kind: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    monthly_rent: Decimal,
    #[serde(default)]
    payment_schedule: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ExpenseRow {
    #[serde(default)]
    id: Option<i64>,
    property_id: i64,
    amount: Decimal,
    #[serde(default)]
    description: Option<String>,
    date: NaiveDate,
}

/// Errors raised while reading or importing ledger CSV files.
///
/// Row numbers are 1-based and do not count the header.
#[derive(Debug, Error)]
pub enum CsvImportError {
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("unrecognised {column} '{value}' on row {row}")]
    InvalidValue {
        column: &'static str,
        value: String,
        row: usize,
    },

    #[error("row {row}: {source}")]
    InvalidContract { row: usize, source: ContractError },

    #[error("row {row}: amount must be non-negative, got {amount}")]
    NegativeAmount { row: usize, amount: Decimal },

    #[error("{record} refers to unknown property {property_id}")]
    UnknownProperty { record: String, property_id: i64 },

    #[error("duplicate {record} id {id}")]
    DuplicateId { record: &'static str, id: i64 },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

fn reader(input: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes())
}

/// Blank optional text cells read as `None`.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn convert_property(
    row: PropertyRow,
    row_number: usize,
) -> Result<Property, CsvImportError> {
    let kind = match non_blank(row.kind) {
        None => PropertyKind::default(),
        Some(kind) => PropertyKind::parse(&kind).ok_or(CsvImportError::InvalidValue {
            column: "kind",
            value: kind,
            row: row_number,
        })?,
    };

    Ok(Property {
        id: row.id,
        name: row.name,
        address: row.address.unwrap_or_default(),
        kind,
        area: row.area,
        rooms: row.rooms,
        description: non_blank(row.description),
    })
}

fn convert_contract(
    row: ContractRow,
    row_number: usize,
) -> Result<Contract, CsvImportError> {
    let tenant_kind = match non_blank(row.tenant_kind) {
        None => None,
        Some(kind) => Some(TenantKind::parse(&kind).ok_or(CsvImportError::InvalidValue {
            column: "tenant_kind",
            value: kind,
            row: row_number,
        })?),
    };
    let payment_schedule = match non_blank(row.payment_schedule) {
        None => PaymentSchedule::default(),
        Some(schedule) => {
            PaymentSchedule::parse(&schedule).ok_or(CsvImportError::InvalidValue {
                column: "payment_schedule",
                value: schedule,
                row: row_number,
            })?
        }
    };

    let contract = Contract {
        id: row.id,
        property_id: row.property_id,
        tenant_name: row.tenant_name,
        tenant_kind,
        start_date: row.start_date,
        end_date: row.end_date,
        monthly_rent: row.monthly_rent,
        payment_schedule,
        is_active: row.is_active.unwrap_or(true),
    };
    contract
        .validate()
        .map_err(|source| CsvImportError::InvalidContract {
            row: row_number,
            source,
        })?;
    Ok(contract)
}

fn convert_expense(
    row: ExpenseRow,
    row_number: usize,
) -> Result<Expense, CsvImportError> {
    if row.amount < Decimal::ZERO {
        return Err(CsvImportError::NegativeAmount {
            row: row_number,
            amount: row.amount,
        });
    }
    Ok(Expense {
        id: row.id.unwrap_or(row_number as i64),
        property_id: row.property_id,
        amount: row.amount,
        description: non_blank(row.description),
        date: row.date,
    })
}

/// Parse properties CSV text. Rows are returned in file order.
pub fn properties_from_str(input: &str) -> Result<Vec<Property>, CsvImportError> {
    reader(input)
        .deserialize::<PropertyRow>()
        .enumerate()
        .map(|(idx, result)| convert_property(result?, idx + 1))
        .collect()
}

/// Parse contracts CSV text. Every contract is validated.
pub fn contracts_from_str(input: &str) -> Result<Vec<Contract>, CsvImportError> {
    reader(input)
        .deserialize::<ContractRow>()
        .enumerate()
        .map(|(idx, result)| convert_contract(result?, idx + 1))
        .collect()
}

/// Parse expenses CSV text. A missing `id` column numbers expenses by row.
pub fn expenses_from_str(input: &str) -> Result<Vec<Expense>, CsvImportError> {
    reader(input)
        .deserialize::<ExpenseRow>()
        .enumerate()
        .map(|(idx, result)| convert_expense(result?, idx + 1))
        .collect()
}

fn read_file(path: &Path) -> Result<String, CsvImportError> {
    std::fs::read_to_string(path).map_err(|source| CsvImportError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn properties_from_file(path: &Path) -> Result<Vec<Property>, CsvImportError> {
    properties_from_str(&read_file(path)?)
}

pub fn contracts_from_file(path: &Path) -> Result<Vec<Contract>, CsvImportError> {
    contracts_from_str(&read_file(path)?)
}

pub fn expenses_from_file(path: &Path) -> Result<Vec<Expense>, CsvImportError> {
    expenses_from_str(&read_file(path)?)
}

/// Everything read from one set of ledger CSV files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    pub properties: Vec<Property>,
    pub contracts: Vec<Contract>,
    pub expenses: Vec<Expense>,
}

impl Ledger {
    /// Checks that property and contract ids are unique and that every
    /// contract and expense names a listed property.
    pub fn check_references(&self) -> Result<(), CsvImportError> {
        unique_ids("property", self.properties.iter().map(|p| p.id))?;
        unique_ids("contract", self.contracts.iter().map(|c| c.id))?;

        let known: Vec<i64> = self.properties.iter().map(|p| p.id).collect();
        for contract in &self.contracts {
            if !known.contains(&contract.property_id) {
                return Err(CsvImportError::UnknownProperty {
                    record: format!("contract {}", contract.id),
                    property_id: contract.property_id,
                });
            }
        }
        for expense in &self.expenses {
            if !known.contains(&expense.property_id) {
                return Err(CsvImportError::UnknownProperty {
                    record: format!("expense {}", expense.id),
                    property_id: expense.property_id,
                });
            }
        }
        Ok(())
    }
}

fn unique_ids(
    record: &'static str,
    ids: impl Iterator<Item = i64>,
) -> Result<(), CsvImportError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CsvImportError::DuplicateId { record, id });
        }
    }
    Ok(())
}

/// How many records [`import_ledger`] stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub properties: usize,
    pub contracts: usize,
    pub expenses: usize,
}

async fn write_ledger(
    repo: &dyn RentalRepository,
    ledger: &Ledger,
    stored_properties: &mut Vec<i64>,
) -> Result<(), CsvImportError> {
    let mut property_ids: HashMap<i64, i64> = HashMap::new();
    for property in &ledger.properties {
        let stored = repo
            .create_property(NewProperty {
                name: property.name.clone(),
                address: property.address.clone(),
                kind: property.kind,
                area: property.area,
                rooms: property.rooms,
                description: property.description.clone(),
            })
            .await?;
        debug!(csv_id = property.id, id = stored.id, "imported property");
        stored_properties.push(stored.id);
        property_ids.insert(property.id, stored.id);
    }

    let remap = |record: String, property_id: i64| {
        property_ids
            .get(&property_id)
            .copied()
            .ok_or(CsvImportError::UnknownProperty {
                record,
                property_id,
            })
    };

    for contract in &ledger.contracts {
        let property_id = remap(format!("contract {}", contract.id), contract.property_id)?;
        repo.create_contract(NewContract {
            property_id,
            tenant_name: contract.tenant_name.clone(),
            tenant_kind: contract.tenant_kind,
            start_date: contract.start_date,
            end_date: contract.end_date,
            monthly_rent: contract.monthly_rent,
            payment_schedule: contract.payment_schedule,
            is_active: contract.is_active,
        })
        .await?;
    }

    for expense in &ledger.expenses {
        let property_id = remap(format!("expense {}", expense.id), expense.property_id)?;
        repo.create_expense(NewExpense {
            property_id,
            amount: expense.amount,
            description: expense.description.clone(),
            date: expense.date,
        })
        .await?;
    }
    Ok(())
}

/// Stores a ledger through any repository backend.
///
/// The store assigns fresh ids, so CSV property ids are remapped before
/// contracts and expenses are written. References are checked up front and
/// nothing is written when one is dangling. When a write fails partway,
/// the properties already stored are deleted again, taking their contracts
/// and expenses with them.
pub async fn import_ledger(
    repo: &dyn RentalRepository,
    ledger: &Ledger,
) -> Result<ImportSummary, CsvImportError> {
    ledger.check_references()?;

    let mut stored_properties = Vec::new();
    if let Err(err) = write_ledger(repo, ledger, &mut stored_properties).await {
        warn!(error = %err, properties = stored_properties.len(), "import failed, rolling back");
        for id in stored_properties {
            if let Err(cleanup) = repo.delete_property(id).await {
                warn!(id, error = %cleanup, "could not remove imported property");
            }
        }
        return Err(err);
    }

    let summary = ImportSummary {
        properties: ledger.properties.len(),
        contracts: ledger.contracts.len(),
        expenses: ledger.expenses.len(),
    };
    info!(
        properties = summary.properties,
        contracts = summary.contracts,
        expenses = summary.expenses,
        "imported ledger"
    );
    Ok(summary)
}
