use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::percentage;
use crate::calculations::{DateRange, PeriodAggregator, prorated_income};
use crate::format::{OTHER_PROPERTIES_LABEL, truncate_label};
use crate::models::{Contract, Property, TaxRegime};

/// Properties shown individually in a revenue breakdown.
pub const TOP_PROPERTIES: usize = 8;

/// Longest property label shown in a revenue breakdown.
pub const PROPERTY_LABEL_MAX_CHARS: usize = 25;

/// Headline figures for the analytics page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsStats {
    pub income: Decimal,
    pub tax: Decimal,
    pub profit: Decimal,
    pub active_contracts: usize,
    /// Profit as a percentage of income.
    pub margin_pct: Decimal,
    /// Tax as a percentage of income.
    pub tax_burden_pct: Decimal,
}

impl AnalyticsStats {
    pub fn compute(
        range: &DateRange,
        contracts: &[Contract],
        regime: TaxRegime,
    ) -> Self {
        let totals = PeriodAggregator::new(regime).period_totals(range, contracts);
        Self {
            income: totals.income,
            tax: totals.tax,
            profit: totals.profit,
            active_contracts: totals.contracts,
            margin_pct: percentage(totals.profit, totals.income),
            tax_burden_pct: percentage(totals.tax, totals.income),
        }
    }
}

/// One slice of the revenue-by-property chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRevenue {
    pub label: String,
    pub revenue: Decimal,
}

/// Prorated revenue of each property over `range`, largest first.
///
/// Properties that earned nothing are left out. Past the first
/// [`TOP_PROPERTIES`] entries the rest are summed into a single
/// "Прочие объекты" slice.
pub fn property_revenue(
    properties: &[Property],
    contracts: &[Contract],
    range: &DateRange,
) -> Vec<PropertyRevenue> {
    let mut revenues: Vec<(&str, Decimal)> = properties
        .iter()
        .map(|property| {
            let revenue = contracts
                .iter()
                .filter(|c| c.is_active && c.property_id == property.id)
                .map(|c| prorated_income(c, range))
                .sum::<Decimal>();
            (property.name.as_str(), revenue)
        })
        .filter(|(_, revenue)| *revenue > Decimal::ZERO)
        .collect();

    revenues.sort_by(|a, b| b.1.cmp(&a.1));

    let other: Decimal = revenues
        .iter()
        .skip(TOP_PROPERTIES)
        .map(|(_, revenue)| *revenue)
        .sum();

    let mut slices: Vec<PropertyRevenue> = revenues
        .into_iter()
        .take(TOP_PROPERTIES)
        .map(|(name, revenue)| PropertyRevenue {
            label: truncate_label(name, PROPERTY_LABEL_MAX_CHARS),
            revenue,
        })
        .collect();

    if other > Decimal::ZERO {
        slices.push(PropertyRevenue {
            label: OTHER_PROPERTIES_LABEL.to_string(),
            revenue: other,
        });
    }
    slices
}
