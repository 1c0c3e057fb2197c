//! Tax rules for rental income under the Russian landlord regimes.
//!
//! # Rate Table
//!
//! | Regime | Sub-choice | Rate | Base |
//! |--------|------------|------|------|
//! | Self-employed (НПД) | tenant is a person | 4% | gross income |
//! | Self-employed (НПД) | tenant is an organization | 6% | gross income |
//! | Sole proprietor (УСН) | gross income | 6% | gross income |
//! | Sole proprietor (УСН) | income minus expenses | 15% | max(0, income − expenses) |
//! | Individual (НДФЛ) | actual expenses | 13% | max(0, income − expenses) |
//! | Individual (НДФЛ) | 20% standard deduction | 13% | income × 0.8 |
//!
//! Self-employed landlords cannot deduct expenses, and their tax is the sum
//! of the per-tenant-kind taxes rather than one blended rate applied to the
//! total.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use rent_core::calculations::{IncomeFacts, TaxRuleEngine};
//! use rent_core::{SoleProprietorScheme, TaxRegime};
//!
//! let engine = TaxRuleEngine::new(TaxRegime::SoleProprietor(
//!     SoleProprietorScheme::IncomeMinusExpenses,
//! ));
//! let result = engine.compute(&IncomeFacts::new(dec!(100000), dec!(40000)));
//!
//! assert_eq!(result.base, dec!(60000));
//! assert_eq!(result.amount, dec!(9000));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::max;
use crate::models::{
    IndividualDeduction, LandlordProfile, SoleProprietorScheme, TaxRegime, TenantKind,
};

/// НПД rate when renting to a private person.
pub const SELF_EMPLOYED_PERSON_RATE: Decimal = Decimal::from_parts(4, 0, 0, false, 2);
/// НПД rate when renting to an organization.
pub const SELF_EMPLOYED_ORGANIZATION_RATE: Decimal = Decimal::from_parts(6, 0, 0, false, 2);
/// УСН rate on gross income.
pub const SOLE_PROPRIETOR_GROSS_RATE: Decimal = Decimal::from_parts(6, 0, 0, false, 2);
/// УСН rate on income minus expenses.
pub const SOLE_PROPRIETOR_NET_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);
/// НДФЛ rate.
pub const INDIVIDUAL_RATE: Decimal = Decimal::from_parts(13, 0, 0, false, 2);
/// Share of income that stays taxable under the 20% standard deduction.
pub const STANDARD_DEDUCTION_TAXABLE_SHARE: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// Errors raised while resolving tax rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxRuleError {
    /// A landlord profile field holds a code that names no known regime or
    /// sub-choice.
    #[error("invalid regime: unrecognised {field} '{value}'")]
    InvalidRegime { field: &'static str, value: String },
}

impl TaxRuleError {
    pub(crate) fn invalid_regime(
        field: &'static str,
        value: &str,
    ) -> Self {
        Self::InvalidRegime {
            field,
            value: value.to_string(),
        }
    }
}

/// Income and expense facts for one tax computation.
///
/// Income is split by tenant kind because the self-employed rate depends on
/// it. Other regimes only look at the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IncomeFacts {
    pub person_income: Decimal,
    pub organization_income: Decimal,
    pub expenses: Decimal,
}

impl IncomeFacts {
    /// Facts with all income received from private persons.
    pub fn new(
        income: Decimal,
        expenses: Decimal,
    ) -> Self {
        Self::from_tenant(TenantKind::Person, income, expenses)
    }

    pub fn from_tenant(
        tenant: TenantKind,
        income: Decimal,
        expenses: Decimal,
    ) -> Self {
        let mut facts = Self {
            expenses,
            ..Self::default()
        };
        facts.add_income(tenant, income);
        facts
    }

    pub fn add_income(
        &mut self,
        tenant: TenantKind,
        amount: Decimal,
    ) {
        match tenant {
            TenantKind::Person => self.person_income += amount,
            TenantKind::Organization => self.organization_income += amount,
        }
    }

    pub fn total_income(&self) -> Decimal {
        self.person_income + self.organization_income
    }
}

/// Outcome of a tax computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    /// Rate applied to `base`. For self-employed income this is the
    /// effective rate `amount / base`, or zero when there is no income.
    pub rate: Decimal,
    /// Taxable base after any deductions.
    pub base: Decimal,
    /// Tax owed. Not rounded.
    pub amount: Decimal,
}

impl TaxResult {
    fn at_rate(
        rate: Decimal,
        base: Decimal,
    ) -> Self {
        Self {
            rate,
            base,
            amount: base * rate,
        }
    }
}

/// Pure tax calculator for a fixed [`TaxRegime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxRuleEngine {
    regime: TaxRegime,
}

impl TaxRuleEngine {
    pub fn new(regime: TaxRegime) -> Self {
        Self { regime }
    }

    /// # Errors
    ///
    /// Returns [`TaxRuleError::InvalidRegime`] if the profile names an
    /// unknown regime or sub-choice.
    pub fn from_profile(profile: &LandlordProfile) -> Result<Self, TaxRuleError> {
        TaxRegime::from_profile(profile).map(Self::new)
    }

    pub fn regime(&self) -> TaxRegime {
        self.regime
    }

    /// Nominal rate for income from a tenant of the given kind.
    pub fn rate_for(
        &self,
        tenant: TenantKind,
    ) -> Decimal {
        match self.regime {
            TaxRegime::SelfEmployed => match tenant {
                TenantKind::Person => SELF_EMPLOYED_PERSON_RATE,
                TenantKind::Organization => SELF_EMPLOYED_ORGANIZATION_RATE,
            },
            TaxRegime::SoleProprietor(SoleProprietorScheme::GrossIncome) => {
                SOLE_PROPRIETOR_GROSS_RATE
            }
            TaxRegime::SoleProprietor(SoleProprietorScheme::IncomeMinusExpenses) => {
                SOLE_PROPRIETOR_NET_RATE
            }
            TaxRegime::Individual(_) => INDIVIDUAL_RATE,
        }
    }

    /// Computes the tax owed for the given facts.
    ///
    /// Negative amounts are treated as zero and logged.
    pub fn compute(
        &self,
        facts: &IncomeFacts,
    ) -> TaxResult {
        let person_income = non_negative("person_income", facts.person_income);
        let organization_income = non_negative("organization_income", facts.organization_income);
        let expenses = non_negative("expenses", facts.expenses);
        let income = person_income + organization_income;

        let result = match self.regime {
            TaxRegime::SelfEmployed => {
                let amount = person_income * SELF_EMPLOYED_PERSON_RATE
                    + organization_income * SELF_EMPLOYED_ORGANIZATION_RATE;
                let rate = if income.is_zero() {
                    Decimal::ZERO
                } else {
                    amount / income
                };
                TaxResult {
                    rate,
                    base: income,
                    amount,
                }
            }
            TaxRegime::SoleProprietor(SoleProprietorScheme::GrossIncome) => {
                TaxResult::at_rate(SOLE_PROPRIETOR_GROSS_RATE, income)
            }
            TaxRegime::SoleProprietor(SoleProprietorScheme::IncomeMinusExpenses) => {
                TaxResult::at_rate(
                    SOLE_PROPRIETOR_NET_RATE,
                    max(Decimal::ZERO, income - expenses),
                )
            }
            TaxRegime::Individual(IndividualDeduction::ActualExpenses) => {
                TaxResult::at_rate(INDIVIDUAL_RATE, max(Decimal::ZERO, income - expenses))
            }
            TaxRegime::Individual(IndividualDeduction::StandardDeduction20Pct) => {
                TaxResult::at_rate(INDIVIDUAL_RATE, income * STANDARD_DEDUCTION_TAXABLE_SHARE)
            }
        };

        debug!(
            regime = ?self.regime,
            income = %income,
            expenses = %expenses,
            base = %result.base,
            amount = %result.amount,
            "computed tax"
        );

        result
    }

    /// Tax on one contract's income at the nominal rate for its tenant.
    ///
    /// Deductions are not applied here, the 20% standard deduction
    /// included. They only enter through [`TaxRuleEngine::compute`] over a
    /// whole period.
    pub fn contract_tax(
        &self,
        tenant: TenantKind,
        income: Decimal,
    ) -> TaxResult {
        TaxResult::at_rate(self.rate_for(tenant), non_negative("income", income))
    }
}

/// Computes the tax owed under `regime` for `facts`.
pub fn compute_tax(
    regime: TaxRegime,
    facts: &IncomeFacts,
) -> TaxResult {
    TaxRuleEngine::new(regime).compute(facts)
}

/// Resolves `profile` and computes the tax owed for `facts`.
///
/// # Errors
///
/// Returns [`TaxRuleError::InvalidRegime`] for an unrecognised profile.
pub fn compute_tax_for_profile(
    profile: &LandlordProfile,
    facts: &IncomeFacts,
) -> Result<TaxResult, TaxRuleError> {
    TaxRuleEngine::from_profile(profile).map(|engine| engine.compute(facts))
}

/// Nominal rate for a contract with the given tenant kind.
pub fn rate_for_contract(
    regime: TaxRegime,
    tenant: TenantKind,
) -> Decimal {
    TaxRuleEngine::new(regime).rate_for(tenant)
}

/// Tax on a single contract's income at the nominal rate.
pub fn contract_tax(
    regime: TaxRegime,
    tenant: TenantKind,
    income: Decimal,
) -> TaxResult {
    TaxRuleEngine::new(regime).contract_tax(tenant, income)
}

fn non_negative(
    field: &'static str,
    value: Decimal,
) -> Decimal {
    if value < Decimal::ZERO {
        warn!(field, value = %value, "negative amount treated as zero");
        return Decimal::ZERO;
    }
    value
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;

    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn engine(regime: TaxRegime) -> TaxRuleEngine {
        TaxRuleEngine::new(regime)
    }

    // =========================================================================
    // Rate selection
    // =========================================================================

    #[test]
    fn self_employed_rate_depends_on_tenant() {
        let engine = engine(TaxRegime::SelfEmployed);

        assert_eq!(engine.rate_for(TenantKind::Person), dec!(0.04));
        assert_eq!(engine.rate_for(TenantKind::Organization), dec!(0.06));
    }

    #[test]
    fn sole_proprietor_rates() {
        assert_eq!(
            rate_for_contract(
                TaxRegime::SoleProprietor(SoleProprietorScheme::GrossIncome),
                TenantKind::Organization
            ),
            dec!(0.06)
        );
        assert_eq!(
            rate_for_contract(
                TaxRegime::SoleProprietor(SoleProprietorScheme::IncomeMinusExpenses),
                TenantKind::Person
            ),
            dec!(0.15)
        );
    }

    #[test]
    fn individual_rate_ignores_tenant() {
        let engine = engine(TaxRegime::Individual(IndividualDeduction::ActualExpenses));

        assert_eq!(engine.rate_for(TenantKind::Person), dec!(0.13));
        assert_eq!(engine.rate_for(TenantKind::Organization), dec!(0.13));
    }

    // =========================================================================
    // Self-employed
    // =========================================================================

    #[test]
    fn self_employed_person_pays_four_percent() {
        let result = engine(TaxRegime::SelfEmployed).compute(&IncomeFacts::new(dec!(30000), dec!(0)));

        assert_eq!(result.amount, dec!(1200));
        assert_eq!(result.rate, dec!(0.04));
        assert_eq!(result.base, dec!(30000));
    }

    #[test]
    fn self_employed_ignores_expenses() {
        let result =
            engine(TaxRegime::SelfEmployed).compute(&IncomeFacts::new(dec!(30000), dec!(25000)));

        assert_eq!(result.amount, dec!(1200));
    }

    #[test]
    fn self_employed_mixed_tenants_sum_per_kind() {
        let facts = IncomeFacts {
            person_income: dec!(50000),
            organization_income: dec!(100000),
            expenses: dec!(0),
        };

        let result = engine(TaxRegime::SelfEmployed).compute(&facts);

        assert_eq!(result.amount, dec!(8000)); // 2000 + 6000
        assert_eq!(result.base, dec!(150000));
        assert_eq!(result.rate, dec!(8000) / dec!(150000));
    }

    #[test]
    fn self_employed_organization_only_reports_six_percent() {
        let facts = IncomeFacts::from_tenant(TenantKind::Organization, dec!(10000), dec!(0));

        let result = engine(TaxRegime::SelfEmployed).compute(&facts);

        assert_eq!(result.rate, dec!(0.06));
        assert_eq!(result.amount, dec!(600));
    }

    // =========================================================================
    // Sole proprietor
    // =========================================================================

    #[test]
    fn sole_proprietor_gross_income() {
        let result = engine(TaxRegime::SoleProprietor(SoleProprietorScheme::GrossIncome))
            .compute(&IncomeFacts::new(dec!(100000), dec!(40000)));

        assert_eq!(result.amount, dec!(6000));
    }

    #[test]
    fn sole_proprietor_income_minus_expenses() {
        let result = engine(TaxRegime::SoleProprietor(SoleProprietorScheme::IncomeMinusExpenses))
            .compute(&IncomeFacts::new(dec!(100000), dec!(40000)));

        assert_eq!(result.base, dec!(60000));
        assert_eq!(result.amount, dec!(9000));
    }

    #[test]
    fn sole_proprietor_loss_clamps_base_to_zero() {
        let result = engine(TaxRegime::SoleProprietor(SoleProprietorScheme::IncomeMinusExpenses))
            .compute(&IncomeFacts::new(dec!(10000), dec!(40000)));

        assert_eq!(result.base, dec!(0));
        assert_eq!(result.amount, dec!(0));
    }

    // =========================================================================
    // Individual
    // =========================================================================

    #[test]
    fn individual_standard_deduction() {
        let result = engine(TaxRegime::Individual(IndividualDeduction::StandardDeduction20Pct))
            .compute(&IncomeFacts::new(dec!(50000), dec!(0)));

        assert_eq!(result.base, dec!(40000));
        assert_eq!(result.amount, dec!(5200));
    }

    #[test]
    fn individual_standard_deduction_ignores_actual_expenses() {
        let result = engine(TaxRegime::Individual(IndividualDeduction::StandardDeduction20Pct))
            .compute(&IncomeFacts::new(dec!(50000), dec!(45000)));

        assert_eq!(result.amount, dec!(5200));
    }

    #[test]
    fn individual_actual_expenses() {
        let result = engine(TaxRegime::Individual(IndividualDeduction::ActualExpenses))
            .compute(&IncomeFacts::new(dec!(50000), dec!(20000)));

        assert_eq!(result.base, dec!(30000));
        assert_eq!(result.amount, dec!(3900));
    }

    // =========================================================================
    // Edge cases
    // =========================================================================

    #[test]
    fn negative_income_is_treated_as_zero() {
        let _guard = init_test_tracing();

        let result = engine(TaxRegime::SelfEmployed).compute(&IncomeFacts::new(dec!(-500), dec!(0)));

        assert_eq!(result.amount, dec!(0));
        assert_eq!(result.base, dec!(0));
    }

    #[test]
    fn self_employed_zero_income_has_zero_rate() {
        let result = engine(TaxRegime::SelfEmployed).compute(&IncomeFacts::default());

        assert_eq!(result.rate, dec!(0));
        assert_eq!(result.amount, dec!(0));
    }

    #[test]
    fn zero_income_pays_nothing() {
        let result = engine(TaxRegime::Individual(IndividualDeduction::ActualExpenses))
            .compute(&IncomeFacts::default());

        assert_eq!(result.amount, dec!(0));
    }

    #[test]
    fn contract_tax_uses_tenant_rate() {
        let result = contract_tax(TaxRegime::SelfEmployed, TenantKind::Organization, dec!(20000));

        assert_eq!(result.amount, dec!(1200));
    }

    #[test]
    fn contract_tax_ignores_standard_deduction() {
        let result = contract_tax(
            TaxRegime::Individual(IndividualDeduction::StandardDeduction20Pct),
            TenantKind::Person,
            dec!(3100),
        );

        assert_eq!(result.rate, dec!(0.13));
        assert_eq!(result.base, dec!(3100));
        assert_eq!(result.amount, dec!(403));
    }

    #[test]
    fn compute_tax_for_profile_rejects_unknown_regime() {
        let profile = LandlordProfile {
            regime: "llc".to_string(),
            sole_proprietor_scheme: None,
            individual_deduction: None,
        };

        let result = compute_tax_for_profile(&profile, &IncomeFacts::new(dec!(1000), dec!(0)));

        assert_eq!(
            result,
            Err(TaxRuleError::InvalidRegime {
                field: "regime",
                value: "llc".to_string(),
            })
        );
    }

    #[test]
    fn compute_tax_for_profile_computes_with_valid_profile() {
        let profile = LandlordProfile {
            regime: "individual".to_string(),
            sole_proprietor_scheme: None,
            individual_deduction: Some("professional".to_string()),
        };

        let result = compute_tax_for_profile(&profile, &IncomeFacts::new(dec!(50000), dec!(0)));

        assert_eq!(result.map(|r| r.amount), Ok(dec!(5200)));
    }
}
