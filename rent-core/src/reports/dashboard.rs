use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::TaxRuleEngine;
use crate::calculations::common::round_to_ruble;
use crate::models::{Contract, Property, TaxRegime};

/// Figures shown on the dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Sum of monthly rents across active contracts.
    pub monthly_rent: Decimal,
    pub property_count: usize,
    /// Tax on one month of rent from every active contract, in whole rubles.
    pub next_tax: Decimal,
    pub active_contracts: usize,
}

impl DashboardStats {
    pub fn compute(
        properties: &[Property],
        contracts: &[Contract],
        regime: TaxRegime,
    ) -> Self {
        let engine = TaxRuleEngine::new(regime);
        let active: Vec<&Contract> = contracts.iter().filter(|c| c.is_active).collect();

        let next_tax = active
            .iter()
            .map(|c| {
                engine
                    .contract_tax(c.tenant_kind_or_default(), c.monthly_rent)
                    .amount
            })
            .sum();

        Self {
            monthly_rent: active.iter().map(|c| c.monthly_rent).sum(),
            property_count: properties.len(),
            next_tax: round_to_ruble(next_tax),
            active_contracts: active.len(),
        }
    }
}
