use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::{DateRange, IncomeFacts, ReportPeriod, compute_tax, prorated_income};
use crate::models::{Contract, Expense, IndividualDeduction, SoleProprietorScheme, TaxRegime};

/// When the tax for a period falls due.
pub const PAYMENT_DEADLINE_NOTE: &str = "До 28 числа следующего месяца";

/// Tax owed for a period, with the labels a printed report needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxReport {
    pub regime: TaxRegime,
    pub regime_name: String,
    pub regime_short_name: String,
    pub period_label: String,
    pub taxable_income: Decimal,
    pub deductible_expenses: Decimal,
    pub base: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
    pub details: String,
}

impl TaxReport {
    /// Builds the report for `range`, which must be `period` resolved.
    pub fn build(
        period: &ReportPeriod,
        range: &DateRange,
        regime: TaxRegime,
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
        facts.expenses = expenses
            .iter()
            .filter(|e| range.contains(e.date))
            .map(|e| e.amount)
            .sum();

        let result = compute_tax(regime, &facts);
        let landlord = regime.landlord_regime();

        Self {
            regime,
            regime_name: landlord.display_name().to_string(),
            regime_short_name: landlord.short_name().to_string(),
            period_label: period_label(period, range),
            taxable_income: facts.total_income(),
            deductible_expenses: facts.expenses,
            base: result.base,
            rate: result.rate,
            amount: result.amount,
            details: regime_details(regime).to_string(),
        }
    }
}

/// Human-readable period title: the preset name, or the dates of a custom
/// period.
pub fn period_label(
    period: &ReportPeriod,
    range: &DateRange,
) -> String {
    match period {
        ReportPeriod::Custom { .. } => format!(
            "{} - {}",
            range.start().format("%d.%m.%Y"),
            range.end().format("%d.%m.%Y")
        ),
        _ => period.display_name().to_string(),
    }
}

/// One-line description of how the regime taxes rent.
pub fn regime_details(regime: TaxRegime) -> &'static str {
    match regime {
        TaxRegime::SelfEmployed => "Налог на профессиональный доход (4% - физлица, 6% - юрлица)",
        TaxRegime::SoleProprietor(SoleProprietorScheme::GrossIncome) => {
            "Упрощенная система налогообложения (6% с доходов)"
        }
        TaxRegime::SoleProprietor(SoleProprietorScheme::IncomeMinusExpenses) => {
            "Упрощенная система налогообложения (15% с доходов минус расходы)"
        }
        TaxRegime::Individual(IndividualDeduction::ActualExpenses) => {
            "Налог на доходы физических лиц (13% с доходов минус фактические расходы)"
        }
        TaxRegime::Individual(IndividualDeduction::StandardDeduction20Pct) => {
            "Налог на доходы физических лиц (13% с учетом вычета 20%)"
        }
    }
}
