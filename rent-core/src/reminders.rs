//! Upcoming payments, expiring contracts and tax deadlines.
//!
//! Every check is a pure function of the contracts and `today`. Callers
//! decide how often to run them and how to deliver the results.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::format::format_rub;
use crate::models::Contract;

/// How far ahead a rent payment is announced.
pub const PAYMENT_NOTICE_DAYS: u64 = 7;
/// How far ahead a contract expiry is announced.
pub const EXPIRY_NOTICE_DAYS: u64 = 30;
/// How far ahead the monthly tax deadline is announced.
pub const TAX_NOTICE_DAYS: i64 = 7;
/// Day of the month by which the self-employed tax is paid.
pub const TAX_DEADLINE_DAY: u32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    Payment,
    ContractExpiry,
    TaxDeadline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

/// What the user is offered when they open a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderAction {
    ViewContract(i64),
    RenewContract(i64),
    ViewTaxCalculator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub kind: ReminderKind,
    pub priority: Priority,
    pub title: String,
    pub message: String,
    pub due: NaiveDate,
    pub days_left: i64,
    pub action: ReminderAction,
}

/// First scheduled payment date strictly after `today`.
///
/// Payments fall on the contract's start day, every month or every three
/// months. A contract that has not started yet is first paid on its start
/// date.
pub fn next_payment_date(
    contract: &Contract,
    today: NaiveDate,
) -> NaiveDate {
    let step = contract.payment_schedule.months();
    let mut periods = 0;
    let mut next = contract.start_date;
    while next <= today {
        periods += 1;
        next = contract.start_date + Months::new(step * periods);
    }
    next
}

/// Rent payments due within the next week.
pub fn upcoming_payments(
    contracts: &[Contract],
    today: NaiveDate,
) -> Vec<Reminder> {
    let horizon = today + Days::new(PAYMENT_NOTICE_DAYS);

    contracts
        .iter()
        .filter(|c| c.is_active)
        .filter_map(|c| {
            let due = next_payment_date(c, today);
            if due > horizon {
                return None;
            }
            let days_left = (due - today).num_days();
            Some(Reminder {
                kind: ReminderKind::Payment,
                priority: Priority::High,
                title: "Предстоящий платеж".to_string(),
                message: format!(
                    "Платеж по договору с {} через {} дн. ({})",
                    c.tenant_name,
                    days_left,
                    format_rub(c.monthly_rent)
                ),
                due,
                days_left,
                action: ReminderAction::ViewContract(c.id),
            })
        })
        .collect()
}

/// Contracts ending within the next 30 days, today included.
pub fn expiring_contracts(
    contracts: &[Contract],
    today: NaiveDate,
) -> Vec<Reminder> {
    let horizon = today + Days::new(EXPIRY_NOTICE_DAYS);

    contracts
        .iter()
        .filter(|c| c.is_active && c.end_date >= today && c.end_date <= horizon)
        .map(|c| {
            let days_left = (c.end_date - today).num_days();
            Reminder {
                kind: ReminderKind::ContractExpiry,
                priority: Priority::Medium,
                title: "Завершение договора".to_string(),
                message: format!("Договор с {} истекает через {} дн.", c.tenant_name, days_left),
                due: c.end_date,
                days_left,
                action: ReminderAction::RenewContract(c.id),
            }
        })
        .collect()
}

/// The monthly tax deadline, if it is at most a week away.
pub fn tax_deadline(today: NaiveDate) -> Option<Reminder> {
    let deadline = today.with_day(TAX_DEADLINE_DAY)?;
    let days_left = (deadline - today).num_days();
    if !(0..=TAX_NOTICE_DAYS).contains(&days_left) {
        return None;
    }
    Some(Reminder {
        kind: ReminderKind::TaxDeadline,
        priority: Priority::High,
        title: "Срок уплаты налога".to_string(),
        message: format!("До уплаты налога осталось {days_left} дн."),
        due: deadline,
        days_left,
        action: ReminderAction::ViewTaxCalculator,
    })
}

/// Runs every check: payments first, then the tax deadline, then expiring
/// contracts.
pub fn collect_reminders(
    contracts: &[Contract],
    today: NaiveDate,
) -> Vec<Reminder> {
    let mut reminders = upcoming_payments(contracts, today);
    reminders.extend(tax_deadline(today));
    reminders.extend(expiring_contracts(contracts, today));
    debug!(%today, count = reminders.len(), "collected reminders");
    reminders
}
