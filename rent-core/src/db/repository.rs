use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Contract, ContractError, Expense, NewContract, NewExpense, NewPayment, NewProperty, Payment,
    Property,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl From<ContractError> for RepositoryError {
    fn from(err: ContractError) -> Self {
        Self::InvalidRecord(err.to_string())
    }
}

/// Storage for properties, lease contracts and their ledgers.
///
/// Deletes cascade: removing a contract removes its payments, removing a
/// property removes its contracts, their payments and the property's
/// expenses.
#[async_trait]
pub trait RentalRepository: Send + Sync {
    // Properties
    async fn create_property(&self, property: NewProperty) -> Result<Property, RepositoryError>;
    async fn get_property(&self, id: i64) -> Result<Property, RepositoryError>;
    async fn list_properties(&self) -> Result<Vec<Property>, RepositoryError>;
    async fn update_property(&self, property: &Property) -> Result<(), RepositoryError>;
    async fn delete_property(&self, id: i64) -> Result<(), RepositoryError>;

    // Contracts
    async fn create_contract(&self, contract: NewContract) -> Result<Contract, RepositoryError>;
    async fn get_contract(&self, id: i64) -> Result<Contract, RepositoryError>;
    async fn list_contracts(
        &self,
        property_id: Option<i64>,
    ) -> Result<Vec<Contract>, RepositoryError>;
    async fn list_active_contracts(&self) -> Result<Vec<Contract>, RepositoryError>;
    async fn update_contract(&self, contract: &Contract) -> Result<(), RepositoryError>;
    async fn delete_contract(&self, id: i64) -> Result<(), RepositoryError>;

    // Payments
    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, RepositoryError>;
    async fn list_payments(
        &self,
        contract_id: Option<i64>,
    ) -> Result<Vec<Payment>, RepositoryError>;
    async fn delete_payment(&self, id: i64) -> Result<(), RepositoryError>;

    // Expenses
    async fn create_expense(&self, expense: NewExpense) -> Result<Expense, RepositoryError>;
    async fn list_expenses(
        &self,
        property_id: Option<i64>,
    ) -> Result<Vec<Expense>, RepositoryError>;
    async fn delete_expense(&self, id: i64) -> Result<(), RepositoryError>;
}
