use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::DateRange;
use crate::models::{Contract, PaymentSchedule, Property, TaxRegime, TenantKind};

/// Shown when a contract refers to a property that is not in the list.
pub const UNKNOWN_PROPERTY: &str = "Неизвестно";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Active,
    Completed,
}

impl ContractStatus {
    /// A contract stays active up to and including its end date.
    pub fn on(
        contract: &Contract,
        today: NaiveDate,
    ) -> Self {
        if contract.end_date >= today {
            Self::Active
        } else {
            Self::Completed
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Active => "Активен",
            Self::Completed => "Завершен",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub contract_id: i64,
    pub tenant_name: String,
    pub property_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_payment: Decimal,
    pub payment_schedule: PaymentSchedule,
    /// Listed only for self-employed landlords, whose rate depends on it.
    /// A contract without a kind is listed as the person it is taxed as.
    pub tenant_kind: Option<TenantKind>,
    pub status: ContractStatus,
}

/// Active contracts overlapping a period, one row each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentScheduleReport {
    pub rows: Vec<ScheduleRow>,
    pub contract_count: usize,
    /// Sum of monthly rents across the listed contracts.
    pub total_monthly: Decimal,
}

impl PaymentScheduleReport {
    pub fn build(
        range: &DateRange,
        regime: TaxRegime,
        properties: &[Property],
        contracts: &[Contract],
        today: NaiveDate,
    ) -> Self {
        let show_tenant_kind = matches!(regime, TaxRegime::SelfEmployed);

        let rows: Vec<ScheduleRow> = contracts
            .iter()
            .filter(|c| c.is_active && c.overlap(range).is_some())
            .map(|c| ScheduleRow {
                contract_id: c.id,
                tenant_name: c.tenant_name.clone(),
                property_name: properties
                    .iter()
                    .find(|p| p.id == c.property_id)
                    .map_or_else(|| UNKNOWN_PROPERTY.to_string(), |p| p.name.clone()),
                start_date: c.start_date,
                end_date: c.end_date,
                monthly_payment: c.monthly_rent,
                payment_schedule: c.payment_schedule,
                tenant_kind: show_tenant_kind.then(|| c.tenant_kind_or_default()),
                status: ContractStatus::on(c, today),
            })
            .collect();

        Self {
            contract_count: rows.len(),
            total_monthly: rows.iter().map(|r| r.monthly_payment).sum(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{IndividualDeduction, PropertyKind};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contract(id: i64, property_id: i64, start: NaiveDate, end: NaiveDate) -> Contract {
        Contract {
            id,
            property_id,
            tenant_name: format!("Арендатор {id}"),
            tenant_kind: None,
            start_date: start,
            end_date: end,
            monthly_rent: dec!(25000),
            payment_schedule: PaymentSchedule::Monthly,
            is_active: true,
        }
    }

    fn properties() -> Vec<Property> {
        vec![Property {
            id: 1,
            name: "Студия на Арбате".to_string(),
            address: "ул. Арбат, 1".to_string(),
            kind: PropertyKind::Apartment,
            area: None,
            rooms: Some(1),
            description: None,
        }]
    }

    fn q1() -> DateRange {
        DateRange::new(date(2025, 1, 1), date(2025, 3, 31)).unwrap()
    }

    #[test]
    fn lists_overlapping_active_contracts_with_totals() {
        let mut inactive = contract(3, 1, date(2025, 1, 1), date(2025, 12, 31));
        inactive.is_active = false;
        let contracts = vec![
            contract(1, 1, date(2024, 6, 1), date(2025, 2, 15)),
            contract(2, 9, date(2025, 3, 1), date(2026, 2, 28)),
            inactive,
            contract(4, 1, date(2025, 4, 1), date(2025, 9, 30)),
        ];

        let report = PaymentScheduleReport::build(
            &q1(),
            TaxRegime::SelfEmployed,
            &properties(),
            &contracts,
            date(2025, 3, 1),
        );

        assert_eq!(report.contract_count, 2);
        assert_eq!(report.total_monthly, dec!(50000));
        assert_eq!(report.rows[0].property_name, "Студия на Арбате");
        assert_eq!(report.rows[0].status, ContractStatus::Completed);
        assert_eq!(report.rows[1].property_name, UNKNOWN_PROPERTY);
        assert_eq!(report.rows[1].status, ContractStatus::Active);
    }

    #[test]
    fn tenant_kind_only_listed_for_self_employed() {
        let contracts = vec![contract(1, 1, date(2025, 1, 1), date(2025, 12, 31))];

        let self_employed = PaymentScheduleReport::build(
            &q1(),
            TaxRegime::SelfEmployed,
            &[],
            &contracts,
            date(2025, 1, 1),
        );
        let individual = PaymentScheduleReport::build(
            &q1(),
            TaxRegime::Individual(IndividualDeduction::ActualExpenses),
            &[],
            &contracts,
            date(2025, 1, 1),
        );

        assert_eq!(self_employed.rows[0].tenant_kind, Some(TenantKind::Person));
        assert_eq!(individual.rows[0].tenant_kind, None);
    }

    #[test]
    fn contract_ending_today_is_active() {
        let c = contract(1, 1, date(2025, 1, 1), date(2025, 3, 31));

        assert_eq!(ContractStatus::on(&c, date(2025, 3, 31)), ContractStatus::Active);
        assert_eq!(ContractStatus::on(&c, date(2025, 4, 1)), ContractStatus::Completed);
    }

    #[test]
    fn missing_tenant_kind_listed_as_taxed() {
        let contracts = vec![contract(1, 1, date(2025, 1, 1), date(2025, 12, 31))];
        assert_eq!(contracts[0].tenant_kind, None);

        let report = PaymentScheduleReport::build(
            &q1(),
            TaxRegime::SelfEmployed,
            &[],
            &contracts,
            date(2025, 1, 1),
        );

        assert_eq!(report.rows[0].tenant_kind, Some(contracts[0].tenant_kind_or_default()));
        assert_eq!(report.rows[0].tenant_kind.map(|k| k.display_name()), Some("Физлицо"));
    }
}
