use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tracing::{debug, info};

use rent_core::calculations::common::round_half_up;
use rent_core::calculations::{
    Bucket, DateRange, PeriodAggregator, RentalCalculator, RentalCalculatorInput, ReportPeriod,
};
use rent_core::db::{DbConfig, RepositoryRegistry};
use rent_core::format::{format_percent, format_rub, parse_amount};
use rent_core::reminders::collect_reminders;
use rent_core::reports::tax_report::PAYMENT_DEADLINE_NOTE;
use rent_core::reports::{
    AnalyticsStats, DashboardStats, FinancialSummary, PaymentScheduleReport, TaxReport,
    property_revenue,
};
use rent_core::{RentalRepository, TaxRegime, TenantKind};
use rent_data::{Ledger, LedgerConfig, PeriodPreset, csv_import, import_ledger, logging};
use rent_db_sqlite::SqliteRepositoryFactory;

const DEFAULT_CONFIG_FILE: &str = "rent-ledger.toml";

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Rental income ledger: prorated income, tax and reports for Russian
/// landlords (self-employed, sole proprietor or individual).
///
/// Data comes from CSV files when `--contracts` is given, otherwise from the
/// configured database.
#[derive(Debug, Parser)]
#[command(name = "rent-ledger", version, about, long_about = None)]
struct Cli {
    /// TOML config with the landlord profile and defaults.
    /// `rent-ledger.toml` in the working directory is used when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database: a file path (e.g. `rent.db`) or `:memory:`.
    /// Overrides the config file and RENT_LEDGER_DB.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Date treated as today (YYYY-MM-DD). Defaults to the local date.
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import properties, contracts and expenses from CSV into the database.
    Import {
        #[arg(long)]
        properties: PathBuf,
        #[arg(long)]
        contracts: PathBuf,
        #[arg(long)]
        expenses: Option<PathBuf>,
    },
    /// Income, tax and profit for each bucket of a period.
    Buckets {
        #[command(flatten)]
        period: PeriodArgs,
        #[command(flatten)]
        data: DataArgs,
        /// Also write the buckets to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Report data for a period.
    Report {
        #[arg(value_enum, default_value_t = ReportKind::Financial)]
        kind: ReportKind,
        #[command(flatten)]
        period: PeriodArgs,
        #[command(flatten)]
        data: DataArgs,
    },
    /// One-off tax calculation from entered figures.
    Calc {
        #[arg(long, value_parser = parse_money)]
        rent_income: Decimal,
        #[arg(long, value_parser = parse_money, default_value = "0")]
        additional_income: Decimal,
        #[arg(long, value_parser = parse_money, default_value = "0")]
        mortgage: Decimal,
        #[arg(long, value_parser = parse_money, default_value = "0")]
        utilities: Decimal,
        #[arg(long, value_parser = parse_money, default_value = "0")]
        maintenance: Decimal,
        /// Other expenses.
        #[arg(long, value_parser = parse_money, default_value = "0")]
        expenses: Decimal,
        /// Tenant type; only affects self-employed landlords.
        #[arg(long, value_enum, default_value_t = TenantArg::Physical)]
        tenant: TenantArg,
    },
    /// Upcoming payments, expiring contracts and the tax deadline.
    Reminders {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Headline figures: monthly rent, next tax, active contracts.
    Dashboard {
        #[command(flatten)]
        data: DataArgs,
    },
}

#[derive(Debug, Args)]
struct PeriodArgs {
    /// Reporting period. Defaults to the config's `default_period`.
    #[arg(long, value_enum)]
    period: Option<PeriodPreset>,
    /// First day of a custom period.
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day of a custom period.
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Debug, Args)]
struct DataArgs {
    #[arg(long)]
    properties: Option<PathBuf>,
    #[arg(long)]
    contracts: Option<PathBuf>,
    #[arg(long)]
    expenses: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportKind {
    Financial,
    Tax,
    Schedule,
    Analytics,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TenantArg {
    Physical,
    Legal,
}

impl From<TenantArg> for TenantKind {
    fn from(arg: TenantArg) -> Self {
        match arg {
            TenantArg::Physical => TenantKind::Person,
            TenantArg::Legal => TenantKind::Organization,
        }
    }
}

fn parse_money(s: &str) -> Result<Decimal, String> {
    parse_amount(s).map_err(|e| e.to_string())
}

impl PeriodArgs {
    fn period(
        &self,
        config: &LedgerConfig,
    ) -> Result<ReportPeriod> {
        Ok(config.select_period(self.period, self.from, self.to)?)
    }
}

// ─── data sources ────────────────────────────────────────────────────────────

async fn open_repository(db: &DbConfig) -> Result<Box<dyn RentalRepository>> {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));

    debug!("connecting to {} backend", db.backend);
    registry
        .create(db)
        .await
        .with_context(|| format!("Failed to open database: {}", db.connection_string))
}

async fn load_ledger(
    data: &DataArgs,
    db: Option<&DbConfig>,
) -> Result<Ledger> {
    if let Some(contracts) = &data.contracts {
        let properties = match &data.properties {
            Some(path) => csv_import::properties_from_file(path)
                .with_context(|| format!("Failed to load properties: {}", path.display()))?,
            None => Vec::new(),
        };
        let expenses = match &data.expenses {
            Some(path) => csv_import::expenses_from_file(path)
                .with_context(|| format!("Failed to load expenses: {}", path.display()))?,
            None => Vec::new(),
        };
        let ledger = Ledger {
            properties,
            contracts: csv_import::contracts_from_file(contracts)
                .with_context(|| format!("Failed to load contracts: {}", contracts.display()))?,
            expenses,
        };
        if data.properties.is_some() {
            ledger.check_references()?;
        }
        return Ok(ledger);
    }

    let Some(db) = db else {
        bail!("no data source: pass --contracts FILE or configure a database with --db");
    };
    let repo = open_repository(db).await?;
    Ok(Ledger {
        properties: repo.list_properties().await?,
        contracts: repo.list_contracts(None).await?,
        expenses: repo.list_expenses(None).await?,
    })
}

// ─── output ──────────────────────────────────────────────────────────────────

fn print_buckets(buckets: &[Bucket]) {
    println!("{:<14} {:>16} {:>14} {:>16}", "Период", "Доход", "Налог", "Прибыль");
    for b in buckets {
        println!(
            "{:<14} {:>16} {:>14} {:>16}",
            b.label,
            format_rub(b.income),
            format_rub(b.tax),
            format_rub(b.profit)
        );
    }
    let income: Decimal = buckets.iter().map(|b| b.income).sum();
    let tax: Decimal = buckets.iter().map(|b| b.tax).sum();
    let profit: Decimal = buckets.iter().map(|b| b.profit).sum();
    println!(
        "{:<14} {:>16} {:>14} {:>16}",
        "Итого",
        format_rub(income),
        format_rub(tax),
        format_rub(profit)
    );
}

fn write_buckets_csv(
    path: &Path,
    buckets: &[Bucket],
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create: {}", path.display()))?;
    for b in buckets {
        writer.serialize(Bucket {
            income: round_half_up(b.income),
            tax: round_half_up(b.tax),
            profit: round_half_up(b.profit),
            ..b.clone()
        })?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = buckets.len(), "wrote buckets");
    Ok(())
}

fn print_financial(summary: &FinancialSummary) {
    println!("Доходы:        {}", format_rub(summary.total_income));
    println!("Расходы:       {}", format_rub(summary.total_expenses));
    println!("Налог:         {}", format_rub(summary.tax.amount));
    println!("Чистая прибыль: {}", format_rub(summary.net_profit));
    println!();
    for p in &summary.by_property {
        println!(
            "{:<30} {:>16} {:>14} {:>16}",
            p.name,
            format_rub(p.income),
            format_rub(p.expenses),
            format_rub(p.profit)
        );
    }
    println!();
    print_buckets(&summary.by_bucket);
}

fn print_tax(report: &TaxReport) {
    println!("{} ({})", report.regime_name, report.regime_short_name);
    println!("Период:             {}", report.period_label);
    println!("Доход:              {}", format_rub(report.taxable_income));
    println!("Расходы к вычету:   {}", format_rub(report.deductible_expenses));
    println!("Налоговая база:     {}", format_rub(report.base));
    println!(
        "Ставка:             {}",
        format_percent(report.rate * Decimal::ONE_HUNDRED)
    );
    println!("Налог к уплате:     {}", format_rub(report.amount));
    println!("{}", report.details);
    println!("Срок уплаты: {}", PAYMENT_DEADLINE_NOTE);
}

fn print_schedule(report: &PaymentScheduleReport) {
    for row in &report.rows {
        let tenant_kind = row
            .tenant_kind
            .map(|k| format!(" ({})", k.display_name()))
            .unwrap_or_default();
        println!(
            "{}{} | {} | {} - {} | {} {} | {}",
            row.tenant_name,
            tenant_kind,
            row.property_name,
            row.start_date.format("%d.%m.%Y"),
            row.end_date.format("%d.%m.%Y"),
            format_rub(row.monthly_payment),
            row.payment_schedule.display_name(),
            row.status.display_name()
        );
    }
    println!(
        "Договоров: {}, в месяц: {}",
        report.contract_count,
        format_rub(report.total_monthly)
    );
}

fn print_analytics(
    stats: &AnalyticsStats,
    ledger: &Ledger,
    range: &DateRange,
) {
    println!("Доход:            {}", format_rub(stats.income));
    println!("Налог:            {}", format_rub(stats.tax));
    println!("Прибыль:          {}", format_rub(stats.profit));
    println!("Активных договоров: {}", stats.active_contracts);
    println!("Рентабельность:   {}", format_percent(stats.margin_pct));
    println!("Налоговая нагрузка: {}", format_percent(stats.tax_burden_pct));
    println!();
    for slice in property_revenue(&ledger.properties, &ledger.contracts, range) {
        println!("{:<28} {:>16}", slice.label, format_rub(slice.revenue));
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = match &cli.config {
        Some(path) => LedgerConfig::load(path, true)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => LedgerConfig::load(Path::new(DEFAULT_CONFIG_FILE), false)
            .with_context(|| format!("Failed to load config: {}", DEFAULT_CONFIG_FILE))?,
    }
    .with_database_override(cli.db.clone());

    let regime: TaxRegime = config.regime().context("Invalid landlord profile")?;
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let db = config.db_config();
    debug!(?regime, %today, "starting");

    match cli.command {
        Command::Import {
            properties,
            contracts,
            expenses,
        } => {
            let Some(db) = db else {
                bail!("import needs a database: pass --db or set RENT_LEDGER_DB");
            };
            let ledger = Ledger {
                properties: csv_import::properties_from_file(&properties).with_context(|| {
                    format!("Failed to load properties: {}", properties.display())
                })?,
                contracts: csv_import::contracts_from_file(&contracts)
                    .with_context(|| format!("Failed to load contracts: {}", contracts.display()))?,
                expenses: match &expenses {
                    Some(path) => csv_import::expenses_from_file(path)
                        .with_context(|| format!("Failed to load expenses: {}", path.display()))?,
                    None => Vec::new(),
                },
            };
            let repo = open_repository(&db).await?;
            let summary = import_ledger(repo.as_ref(), &ledger)
                .await
                .context("Failed to import ledger into database")?;
            println!(
                "Imported {} properties, {} contracts, {} expenses.",
                summary.properties, summary.contracts, summary.expenses
            );
        }
        Command::Buckets { period, data, csv } => {
            let period = period.period(&config)?;
            let ledger = load_ledger(&data, db.as_ref()).await?;
            let buckets = PeriodAggregator::new(regime).aggregate(&period, &ledger.contracts, today)?;
            print_buckets(&buckets);
            if let Some(path) = csv {
                write_buckets_csv(&path, &buckets)?;
            }
        }
        Command::Report { kind, period, data } => {
            let period = period.period(&config)?;
            let range = period.resolve(today)?;
            let ledger = load_ledger(&data, db.as_ref()).await?;
            match kind {
                ReportKind::Financial => print_financial(&FinancialSummary::build(
                    &range,
                    regime,
                    &ledger.properties,
                    &ledger.contracts,
                    &ledger.expenses,
                )),
                ReportKind::Tax => print_tax(&TaxReport::build(
                    &period,
                    &range,
                    regime,
                    &ledger.contracts,
                    &ledger.expenses,
                )),
                ReportKind::Schedule => print_schedule(&PaymentScheduleReport::build(
                    &range,
                    regime,
                    &ledger.properties,
                    &ledger.contracts,
                    today,
                )),
                ReportKind::Analytics => print_analytics(
                    &AnalyticsStats::compute(&range, &ledger.contracts, regime),
                    &ledger,
                    &range,
                ),
            }
        }
        Command::Calc {
            rent_income,
            additional_income,
            mortgage,
            utilities,
            maintenance,
            expenses,
            tenant,
        } => {
            let input = RentalCalculatorInput {
                rent_income,
                additional_income,
                mortgage_expense: mortgage,
                utilities_expense: utilities,
                maintenance_expense: maintenance,
                other_expenses: expenses,
                tenant_kind: tenant.into(),
            };
            let result = RentalCalculator::new(regime).calculate(&input)?;
            println!("Доход:          {}", format_rub(result.total_income));
            println!("Расходы:        {}", format_rub(result.total_expenses));
            println!("Налоговая база: {}", format_rub(result.tax.base));
            println!(
                "Налог ({}):  {}",
                format_percent(result.tax.rate * Decimal::ONE_HUNDRED),
                format_rub(result.tax.amount)
            );
            println!("Чистая прибыль: {}", format_rub(result.net_profit));
        }
        Command::Reminders { data } => {
            let ledger = load_ledger(&data, db.as_ref()).await?;
            let reminders = collect_reminders(&ledger.contracts, today);
            if reminders.is_empty() {
                println!("Нет напоминаний.");
            }
            for r in reminders {
                println!(
                    "[{:?}] {}: {} ({})",
                    r.priority,
                    r.title,
                    r.message,
                    r.due.format("%d.%m.%Y")
                );
            }
        }
        Command::Dashboard { data } => {
            let ledger = load_ledger(&data, db.as_ref()).await?;
            let stats = DashboardStats::compute(&ledger.properties, &ledger.contracts, regime);
            println!("Объектов:            {}", stats.property_count);
            println!("Активных договоров:  {}", stats.active_contracts);
            println!("Аренда в месяц:      {}", format_rub(stats.monthly_rent));
            println!("Налог за месяц:      {}", format_rub(stats.next_tax));
        }
    }

    Ok(())
}
