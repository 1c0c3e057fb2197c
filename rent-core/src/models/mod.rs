mod contract;
mod ledger;
mod property;
mod regime;

pub use contract::{Contract, ContractError, NewContract, PaymentSchedule};
pub use ledger::{Expense, NewExpense, NewPayment, Payment};
pub use property::{NewProperty, Property, PropertyKind};
pub use regime::{
    IndividualDeduction, LandlordProfile, LandlordRegime, SoleProprietorScheme, TaxRegime,
    TenantKind,
};
