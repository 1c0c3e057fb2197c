//! Rental tax calculator for a single set of monthly or yearly figures.
//!
//! The calculator adds up rent and other income, adds up the four expense
//! lines, applies the landlord's [`TaxRegime`] and reports what is left:
//!
//! | Line | Description |
//! |------|-------------|
//! | 1 | Rent income |
//! | 2 | Additional income |
//! | 3 | Total income: Line 1 + Line 2 |
//! | 4 | Mortgage, utilities, maintenance and other expenses |
//! | 5 | Total expenses: sum of Line 4 |
//! | 6 | Tax under the regime, see [`TaxRuleEngine`] |
//! | 7 | Net profit: Line 3 − Line 5 − Line 6 |
//!
//! Expenses always reduce net profit, even under regimes where they do not
//! reduce the tax base.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use rent_core::calculations::{RentalCalculator, RentalCalculatorInput};
//! use rent_core::{IndividualDeduction, TaxRegime};
//!
//! let calculator =
//!     RentalCalculator::new(TaxRegime::Individual(IndividualDeduction::StandardDeduction20Pct));
//! let input = RentalCalculatorInput {
//!     rent_income: dec!(50000),
//!     utilities_expense: dec!(4000),
//!     ..RentalCalculatorInput::default()
//! };
//!
//! let result = calculator.calculate(&input).unwrap();
//!
//! assert_eq!(result.tax.amount, dec!(5200.00));
//! assert_eq!(result.net_profit, dec!(40800.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::round_half_up;
use crate::calculations::tax_rules::{IncomeFacts, TaxResult, TaxRuleEngine};
use crate::models::{TaxRegime, TenantKind};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculatorError {
    #[error("{field} must be non-negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },
}

/// Figures entered into the calculator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RentalCalculatorInput {
    pub rent_income: Decimal,
    #[serde(default)]
    pub additional_income: Decimal,
    #[serde(default)]
    pub mortgage_expense: Decimal,
    #[serde(default)]
    pub utilities_expense: Decimal,
    #[serde(default)]
    pub maintenance_expense: Decimal,
    #[serde(default)]
    pub other_expenses: Decimal,
    /// Only matters for self-employed landlords.
    #[serde(default)]
    pub tenant_kind: TenantKind,
}

impl RentalCalculatorInput {
    fn validate(&self) -> Result<(), CalculatorError> {
        let fields = [
            ("rent_income", self.rent_income),
            ("additional_income", self.additional_income),
            ("mortgage_expense", self.mortgage_expense),
            ("utilities_expense", self.utilities_expense),
            ("maintenance_expense", self.maintenance_expense),
            ("other_expenses", self.other_expenses),
        ];
        for (field, value) in fields {
            if value < Decimal::ZERO {
                return Err(CalculatorError::NegativeAmount { field, value });
            }
        }
        Ok(())
    }
}

/// Calculator output. Money is rounded to kopecks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalCalculatorResult {
    /// Line 3.
    pub total_income: Decimal,
    /// Line 5.
    pub total_expenses: Decimal,
    /// Line 6.
    pub tax: TaxResult,
    /// Line 7. Negative when expenses and tax exceed income.
    pub net_profit: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct RentalCalculator {
    engine: TaxRuleEngine,
}

impl RentalCalculator {
    pub fn new(regime: TaxRegime) -> Self {
        Self {
            engine: TaxRuleEngine::new(regime),
        }
    }

    /// # Errors
    ///
    /// Returns [`CalculatorError::NegativeAmount`] naming the first negative
    /// input field.
    pub fn calculate(
        &self,
        input: &RentalCalculatorInput,
    ) -> Result<RentalCalculatorResult, CalculatorError> {
        input.validate()?;

        let total_income = self.calculate_total_income(input);
        let total_expenses = self.calculate_total_expenses(input);
        let tax = self.calculate_tax(input.tenant_kind, total_income, total_expenses);
        let net_profit = total_income - total_expenses - tax.amount;

        debug!(
            total_income = %total_income,
            total_expenses = %total_expenses,
            tax = %tax.amount,
            net_profit = %net_profit,
            "calculated rental tax"
        );

        Ok(RentalCalculatorResult {
            total_income: round_half_up(total_income),
            total_expenses: round_half_up(total_expenses),
            tax,
            net_profit: round_half_up(net_profit),
        })
    }

    /// Line 3.
    fn calculate_total_income(
        &self,
        input: &RentalCalculatorInput,
    ) -> Decimal {
        input.rent_income + input.additional_income
    }

    /// Line 5.
    fn calculate_total_expenses(
        &self,
        input: &RentalCalculatorInput,
    ) -> Decimal {
        input.mortgage_expense
            + input.utilities_expense
            + input.maintenance_expense
            + input.other_expenses
    }

    /// Line 6, with the amount rounded to kopecks.
    fn calculate_tax(
        &self,
        tenant: TenantKind,
        income: Decimal,
        expenses: Decimal,
    ) -> TaxResult {
        let result = self
            .engine
            .compute(&IncomeFacts::from_tenant(tenant, income, expenses));
        TaxResult {
            amount: round_half_up(result.amount),
            ..result
        }
    }
}
