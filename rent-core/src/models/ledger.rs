use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rent received against a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub contract_id: i64,
    pub amount: Decimal,
    pub date: NaiveDate,
}

/// For creating new payments (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    pub contract_id: i64,
    pub amount: Decimal,
    pub date: NaiveDate,
}

/// Money spent on a property (mortgage, utilities, repairs...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub property_id: i64,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
}

/// For creating new expenses (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub property_id: i64,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
}
