//! Prorated rent income, tax and profit per reporting bucket.
//!
//! Each active contract contributes `monthly_rent / 30.44` per day of
//! overlap with a bucket, both boundary days included. Tax on that
//! contribution uses the contract's tenant kind, so self-employed totals are
//! always the sum of per-contract taxes. Bucket tax applies the nominal rate
//! to the prorated income, with no deduction.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::calculations::common::prorate;
use crate::calculations::periods::{DateRange, PeriodError, ReportPeriod, split_period};
use crate::calculations::tax_rules::TaxRuleEngine;
use crate::models::{Contract, TaxRegime};

/// Money attributed to one bucket of a reporting period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub income: Decimal,
    pub tax: Decimal,
    pub profit: Decimal,
}

/// Totals over a whole period, computed without bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub income: Decimal,
    pub tax: Decimal,
    pub profit: Decimal,
    /// Active contracts with at least one day inside the period.
    pub contracts: usize,
}

/// Rent earned by `contract` over the days it shares with `range`.
///
/// Inactive contracts still earn here; callers decide whether to include
/// them.
pub fn prorated_income(
    contract: &Contract,
    range: &DateRange,
) -> Decimal {
    contract
        .overlap(range)
        .map(|overlap| prorate(contract.monthly_rent, overlap.days()))
        .unwrap_or(Decimal::ZERO)
}

/// Buckets contract income over reporting periods for one tax regime.
#[derive(Debug, Clone, Copy)]
pub struct PeriodAggregator {
    engine: TaxRuleEngine,
}

impl PeriodAggregator {
    pub fn new(regime: TaxRegime) -> Self {
        Self {
            engine: TaxRuleEngine::new(regime),
        }
    }

    /// Resolves `period` against `today` and buckets `contracts` over it.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::InvalidPeriod`] when a custom period does not
    /// start before it ends.
    pub fn aggregate(
        &self,
        period: &ReportPeriod,
        contracts: &[Contract],
        today: NaiveDate,
    ) -> Result<Vec<Bucket>, PeriodError> {
        let range = period.resolve(today)?;
        Ok(self.aggregate_range(&range, contracts))
    }

    /// Buckets `contracts` over an already resolved range.
    ///
    /// Every bucket of the split is returned, including those no contract
    /// touches.
    pub fn aggregate_range(
        &self,
        range: &DateRange,
        contracts: &[Contract],
    ) -> Vec<Bucket> {
        debug!(
            start = %range.start(),
            end = %range.end(),
            contracts = contracts.len(),
            "aggregating period"
        );

        split_period(range)
            .into_iter()
            .map(|bucket| {
                let totals = self.totals_for(&bucket.range(), contracts);
                Bucket {
                    label: bucket.label,
                    start: bucket.start,
                    end: bucket.end,
                    income: totals.income,
                    tax: totals.tax,
                    profit: totals.profit,
                }
            })
            .collect()
    }

    /// Income, tax and profit over the whole range in one pass.
    pub fn period_totals(
        &self,
        range: &DateRange,
        contracts: &[Contract],
    ) -> PeriodTotals {
        self.totals_for(range, contracts)
    }

    fn totals_for(
        &self,
        range: &DateRange,
        contracts: &[Contract],
    ) -> PeriodTotals {
        let mut totals = PeriodTotals::default();

        for contract in contracts.iter().filter(|c| c.is_active) {
            let Some(overlap) = contract.overlap(range) else {
                trace!(contract_id = contract.id, "contract outside range");
                continue;
            };

            let income = prorate(contract.monthly_rent, overlap.days());
            let tax = self
                .engine
                .contract_tax(contract.tenant_kind_or_default(), income)
                .amount;

            totals.income += income;
            totals.tax += tax;
            totals.contracts += 1;
        }

        totals.profit = totals.income - totals.tax;
        totals
    }
}

/// Buckets `contracts` over `period` resolved against `today`.
///
/// # Errors
///
/// Returns [`PeriodError::InvalidPeriod`] when the period is empty or
/// reversed.
pub fn aggregate(
    period: &ReportPeriod,
    contracts: &[Contract],
    regime: TaxRegime,
    today: NaiveDate,
) -> Result<Vec<Bucket>, PeriodError> {
    PeriodAggregator::new(regime).aggregate(period, contracts, today)
}

pub fn aggregate_range(
    range: &DateRange,
    contracts: &[Contract],
    regime: TaxRegime,
) -> Vec<Bucket> {
    PeriodAggregator::new(regime).aggregate_range(range, contracts)
}

pub fn period_totals(
    range: &DateRange,
    contracts: &[Contract],
    regime: TaxRegime,
) -> PeriodTotals {
    PeriodAggregator::new(regime).period_totals(range, contracts)
}
