//! Report data for the analytics page, printable reports and the dashboard.
//!
//! Reports are plain data. Rendering them is up to the caller.

pub mod analytics;
pub mod dashboard;
pub mod financial;
pub mod schedule;
pub mod tax_report;

pub use analytics::{AnalyticsStats, PropertyRevenue, property_revenue};
pub use dashboard::DashboardStats;
pub use financial::{FinancialSummary, PropertyBreakdown};
pub use schedule::{ContractStatus, PaymentScheduleReport, ScheduleRow};
pub use tax_report::{TaxReport, period_label, regime_details};
