use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::{
    Bucket, DateRange, IncomeFacts, PeriodAggregator, TaxResult, compute_tax, prorated_income,
};
use crate::models::{Contract, Expense, Property, TaxRegime};

/// Income and expenses of one property over the report range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyBreakdown {
    pub property_id: i64,
    pub name: String,
    pub income: Decimal,
    pub expenses: Decimal,
    /// Income minus expenses, before tax.
    pub profit: Decimal,
}

/// Income, expenses and tax over a period, with per-property and
/// per-bucket detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub range: DateRange,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub tax: TaxResult,
    pub net_profit: Decimal,
    pub by_property: Vec<PropertyBreakdown>,
    pub by_bucket: Vec<Bucket>,
}

impl FinancialSummary {
    /// Builds the summary from active contracts overlapping `range` and the
    /// expenses dated inside it.
    ///
    /// Tax is computed once over the whole period, so regimes that deduct
    /// expenses see all of them.
    pub fn build(
        range: &DateRange,
        regime: TaxRegime,
        properties: &[Property],
        contracts: &[Contract],
        expenses: &[Expense],
    ) -> Self {
        let mut facts = IncomeFacts::default();
        for contract in contracts.iter().filter(|c| c.is_active) {
            facts.add_income(
                contract.tenant_kind_or_default(),
                prorated_income(contract, range),
            );
        }

        let in_range: Vec<&Expense> = expenses.iter().filter(|e| range.contains(e.date)).collect();
        facts.expenses = in_range.iter().map(|e| e.amount).sum();

        let tax = compute_tax(regime, &facts);
        let total_income = facts.total_income();
        let net_profit = total_income - facts.expenses - tax.amount;

        let by_property = properties
            .iter()
            .filter_map(|property| {
                let income: Decimal = contracts
                    .iter()
                    .filter(|c| c.is_active && c.property_id == property.id)
                    .map(|c| prorated_income(c, range))
                    .sum();
                let spent: Decimal = in_range
                    .iter()
                    .filter(|e| e.property_id == property.id)
                    .map(|e| e.amount)
                    .sum();
                if income.is_zero() && spent.is_zero() {
                    return None;
                }
                Some(PropertyBreakdown {
                    property_id: property.id,
                    name: property.name.clone(),
                    income,
                    expenses: spent,
                    profit: income - spent,
                })
            })
            .collect();

        debug!(
            start = %range.start(),
            end = %range.end(),
            income = %total_income,
            expenses = %facts.expenses,
            tax = %tax.amount,
            "built financial summary"
        );

        Self {
            range: *range,
            total_income,
            total_expenses: facts.expenses,
            tax,
            net_profit,
            by_property,
            by_bucket: PeriodAggregator::new(regime).aggregate_range(range, contracts),
        }
    }
}
