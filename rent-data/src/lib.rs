//! Data loading, configuration and logging for the `rent-ledger` binary.

pub mod config;
pub mod csv_import;
pub mod logging;

pub use config::{ConfigError, LedgerConfig, PeriodPreset};
pub use csv_import::{
    CsvImportError, ImportSummary, Ledger, contracts_from_file, contracts_from_str,
    expenses_from_file, expenses_from_str, import_ledger, properties_from_file,
    properties_from_str,
};
