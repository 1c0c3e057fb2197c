//! Rental tax and income calculations.
//!
//! [`tax_rules`] decides how much tax a landlord owes, [`periods`] splits a
//! reporting period into buckets, and [`aggregator`] prorates contract rent
//! into those buckets.

pub mod aggregator;
pub mod calculator;
pub mod common;
pub mod periods;
pub mod tax_rules;

pub use aggregator::{
    Bucket, PeriodAggregator, PeriodTotals, aggregate, aggregate_range, period_totals,
    prorated_income,
};
pub use calculator::{
    CalculatorError, RentalCalculator, RentalCalculatorInput, RentalCalculatorResult,
};
pub use periods::{BucketRange, DateRange, Granularity, PeriodError, ReportPeriod, split_period};
pub use tax_rules::{
    IncomeFacts, TaxResult, TaxRuleEngine, TaxRuleError, compute_tax, compute_tax_for_profile,
    contract_tax, rate_for_contract,
};
