use serde::{Deserialize, Serialize};

use crate::calculations::tax_rules::TaxRuleError;

/// The tax regime a landlord has elected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandlordRegime {
    /// Professional income tax (НПД).
    #[serde(rename = "self_employed")]
    SelfEmployed,
    /// Simplified taxation system for a sole proprietor (УСН).
    #[serde(rename = "individual_entrepreneur")]
    SoleProprietor,
    /// Personal income tax (НДФЛ).
    #[serde(rename = "individual")]
    Individual,
}

impl LandlordRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfEmployed => "self_employed",
            Self::SoleProprietor => "individual_entrepreneur",
            Self::Individual => "individual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "self_employed" => Some(Self::SelfEmployed),
            "individual_entrepreneur" => Some(Self::SoleProprietor),
            "individual" => Some(Self::Individual),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SelfEmployed => "Самозанятый (НПД)",
            Self::SoleProprietor => "Индивидуальный предприниматель (УСН)",
            Self::Individual => "Физическое лицо (НДФЛ)",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Self::SelfEmployed => "НПД",
            Self::SoleProprietor => "УСН",
            Self::Individual => "НДФЛ",
        }
    }
}

/// Tax base selection for a sole proprietor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SoleProprietorScheme {
    #[default]
    #[serde(rename = "income")]
    GrossIncome,
    #[serde(rename = "income_minus_expenses")]
    IncomeMinusExpenses,
}

impl SoleProprietorScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GrossIncome => "income",
            Self::IncomeMinusExpenses => "income_minus_expenses",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(Self::GrossIncome),
            "income_minus_expenses" => Some(Self::IncomeMinusExpenses),
            _ => None,
        }
    }
}

/// Deduction applied by an individual taxpayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndividualDeduction {
    #[default]
    #[serde(rename = "actual")]
    ActualExpenses,
    #[serde(rename = "professional")]
    StandardDeduction20Pct,
}

impl IndividualDeduction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ActualExpenses => "actual",
            Self::StandardDeduction20Pct => "professional",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "actual" => Some(Self::ActualExpenses),
            "professional" => Some(Self::StandardDeduction20Pct),
            _ => None,
        }
    }
}

/// Who rents the property. Only affects the self-employed rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TenantKind {
    #[default]
    #[serde(rename = "physical")]
    Person,
    #[serde(rename = "legal")]
    Organization,
}

impl TenantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "physical",
            Self::Organization => "legal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "physical" => Some(Self::Person),
            "legal" => Some(Self::Organization),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Person => "Физлицо",
            Self::Organization => "Юрлицо",
        }
    }
}

/// A fully resolved tax regime, sub-choice included.
///
/// Each variant carries exactly the option that is meaningful for it, so a
/// sole proprietor without a scheme or a self-employed landlord with a
/// deduction cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxRegime {
    SelfEmployed,
    SoleProprietor(SoleProprietorScheme),
    Individual(IndividualDeduction),
}

impl TaxRegime {
    pub fn landlord_regime(&self) -> LandlordRegime {
        match self {
            Self::SelfEmployed => LandlordRegime::SelfEmployed,
            Self::SoleProprietor(_) => LandlordRegime::SoleProprietor,
            Self::Individual(_) => LandlordRegime::Individual,
        }
    }

    /// Resolves a landlord profile as stored by the UI or a config file.
    ///
    /// A missing sub-choice falls back to gross income (sole proprietor) or
    /// actual expenses (individual). A present but unrecognised value of any
    /// field is an error.
    ///
    /// # Errors
    ///
    /// Returns [`TaxRuleError::InvalidRegime`] naming the offending field.
    pub fn from_profile(profile: &LandlordProfile) -> Result<Self, TaxRuleError> {
        let regime = LandlordRegime::parse(profile.regime.trim())
            .ok_or_else(|| TaxRuleError::invalid_regime("regime", &profile.regime))?;

        match regime {
            LandlordRegime::SelfEmployed => Ok(Self::SelfEmployed),
            LandlordRegime::SoleProprietor => {
                let scheme = match profile.sole_proprietor_scheme.as_deref() {
                    None => SoleProprietorScheme::default(),
                    Some(code) => SoleProprietorScheme::parse(code.trim()).ok_or_else(|| {
                        TaxRuleError::invalid_regime("sole_proprietor_scheme", code)
                    })?,
                };
                Ok(Self::SoleProprietor(scheme))
            }
            LandlordRegime::Individual => {
                let deduction = match profile.individual_deduction.as_deref() {
                    None => IndividualDeduction::default(),
                    Some(code) => IndividualDeduction::parse(code.trim()).ok_or_else(|| {
                        TaxRuleError::invalid_regime("individual_deduction", code)
                    })?,
                };
                Ok(Self::Individual(deduction))
            }
        }
    }
}

/// Landlord profile in its raw, string-coded form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandlordProfile {
    pub regime: String,
    #[serde(default)]
    pub sole_proprietor_scheme: Option<String>,
    #[serde(default)]
    pub individual_deduction: Option<String>,
}

impl From<TaxRegime> for LandlordProfile {
    fn from(regime: TaxRegime) -> Self {
        let (sole_proprietor_scheme, individual_deduction) = match regime {
            TaxRegime::SelfEmployed => (None, None),
            TaxRegime::SoleProprietor(scheme) => (Some(scheme.as_str().to_string()), None),
            TaxRegime::Individual(deduction) => (None, Some(deduction.as_str().to_string())),
        };
        Self {
            regime: regime.landlord_regime().as_str().to_string(),
            sole_proprietor_scheme,
            individual_deduction,
        }
    }
}
