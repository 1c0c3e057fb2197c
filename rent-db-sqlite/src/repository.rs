use std::str::FromStr;

use async_trait::async_trait;
use rent_core::{
    Contract, Expense, NewContract, NewExpense, NewPayment, NewProperty, Payment, PaymentSchedule,
    Property, PropertyKind, RentalRepository, RepositoryError, TenantKind,
};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use crate::decimal::{date_to_text, decimal_to_text, get_date, get_decimal, get_optional_decimal};

const PROPERTY_COLUMNS: &str = "id, name, address, kind, area, rooms, description";
const CONTRACT_COLUMNS: &str = "id, property_id, tenant_name, tenant_kind, start_date, end_date, \
                                monthly_rent, payment_schedule, is_active";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open (creating if needed) the database at `database_url`.
    ///
    /// Accepts a bare file path, a `sqlite:` URL, or `:memory:`. An
    /// in-memory database lives in a single pooled connection that is
    /// never recycled.
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| RepositoryError::Configuration(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = database_url.contains(":memory:");
        let mut pool_options = SqlitePoolOptions::new();
        if in_memory {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        info!(database_url, "opened sqlite database");
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

/// Foreign-key violations on insert mean the caller pointed at a parent
/// row that does not exist.
fn write_error(
    e: sqlx::Error,
    parent: &str,
    parent_id: i64,
) -> RepositoryError {
    let is_fk_violation = e
        .as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation());
    if is_fk_violation {
        RepositoryError::InvalidRecord(format!("{} {} does not exist", parent, parent_id))
    } else {
        db_error(e)
    }
}

fn ensure_non_negative(
    what: &str,
    amount: Decimal,
) -> Result<(), RepositoryError> {
    if amount < Decimal::ZERO {
        return Err(RepositoryError::InvalidRecord(format!(
            "{} amount must be non-negative, got {}",
            what, amount
        )));
    }
    Ok(())
}

fn row_to_property(row: &SqliteRow) -> Result<Property, RepositoryError> {
    let kind: String = row.try_get("kind").map_err(db_error)?;
    let kind = PropertyKind::parse(&kind)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid property kind: {}", kind)))?;
    let rooms = row
        .try_get::<Option<i64>, _>("rooms")
        .map_err(db_error)?
        .map(u32::try_from)
        .transpose()
        .map_err(|e| RepositoryError::Database(format!("Invalid room count: {}", e)))?;

    Ok(Property {
        id: row.try_get("id").map_err(db_error)?,
        name: row.try_get("name").map_err(db_error)?,
        address: row.try_get("address").map_err(db_error)?,
        kind,
        area: get_optional_decimal(row, "area")?,
        rooms,
        description: row.try_get("description").map_err(db_error)?,
    })
}

fn row_to_contract(row: &SqliteRow) -> Result<Contract, RepositoryError> {
    let tenant_kind = row
        .try_get::<Option<String>, _>("tenant_kind")
        .map_err(db_error)?
        .map(|kind| {
            TenantKind::parse(&kind)
                .ok_or_else(|| RepositoryError::Database(format!("Invalid tenant kind: {}", kind)))
        })
        .transpose()?;
    let schedule: String = row.try_get("payment_schedule").map_err(db_error)?;
    let payment_schedule = PaymentSchedule::parse(&schedule).ok_or_else(|| {
        RepositoryError::Database(format!("Invalid payment schedule: {}", schedule))
    })?;

    Ok(Contract {
        id: row.try_get("id").map_err(db_error)?,
        property_id: row.try_get("property_id").map_err(db_error)?,
        tenant_name: row.try_get("tenant_name").map_err(db_error)?,
        tenant_kind,
        start_date: get_date(row, "start_date")?,
        end_date: get_date(row, "end_date")?,
        monthly_rent: get_decimal(row, "monthly_rent")?,
        payment_schedule,
        is_active: row.try_get("is_active").map_err(db_error)?,
    })
}

fn row_to_payment(row: &SqliteRow) -> Result<Payment, RepositoryError> {
    Ok(Payment {
        id: row.try_get("id").map_err(db_error)?,
        contract_id: row.try_get("contract_id").map_err(db_error)?,
        amount: get_decimal(row, "amount")?,
        date: get_date(row, "date")?,
    })
}

fn row_to_expense(row: &SqliteRow) -> Result<Expense, RepositoryError> {
    Ok(Expense {
        id: row.try_get("id").map_err(db_error)?,
        property_id: row.try_get("property_id").map_err(db_error)?,
        amount: get_decimal(row, "amount")?,
        description: row.try_get("description").map_err(db_error)?,
        date: get_date(row, "date")?,
    })
}

#[async_trait]
impl RentalRepository for SqliteRepository {
    async fn create_property(
        &self,
        property: NewProperty,
    ) -> Result<Property, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO properties (name, address, kind, area, rooms, description)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&property.name)
        .bind(&property.address)
        .bind(property.kind.as_str())
        .bind(property.area.map(decimal_to_text))
        .bind(property.rooms.map(i64::from))
        .bind(property.description.as_deref())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let id = result.last_insert_rowid();
        debug!(id, name = %property.name, "created property");
        Ok(property.into_property(id))
    }

    async fn get_property(
        &self,
        id: i64,
    ) -> Result<Property, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM properties WHERE id = ?",
            PROPERTY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_property(&row)
    }

    async fn list_properties(&self) -> Result<Vec<Property>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM properties ORDER BY id",
            PROPERTY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_property).collect()
    }

    async fn update_property(
        &self,
        property: &Property,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE properties SET
                name = ?, address = ?, kind = ?, area = ?, rooms = ?, description = ?
             WHERE id = ?",
        )
        .bind(&property.name)
        .bind(&property.address)
        .bind(property.kind.as_str())
        .bind(property.area.map(decimal_to_text))
        .bind(property.rooms.map(i64::from))
        .bind(property.description.as_deref())
        .bind(property.id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_property(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM properties WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        debug!(id, "deleted property with its contracts and expenses");
        Ok(())
    }

    async fn create_contract(
        &self,
        contract: NewContract,
    ) -> Result<Contract, RepositoryError> {
        contract.validate()?;

        let result = sqlx::query(
            "INSERT INTO contracts (
                property_id, tenant_name, tenant_kind, start_date, end_date,
                monthly_rent, payment_schedule, is_active
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(contract.property_id)
        .bind(&contract.tenant_name)
        .bind(contract.tenant_kind.map(|k| k.as_str()))
        .bind(date_to_text(contract.start_date))
        .bind(date_to_text(contract.end_date))
        .bind(decimal_to_text(contract.monthly_rent))
        .bind(contract.payment_schedule.as_str())
        .bind(contract.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "property", contract.property_id))?;

        let id = result.last_insert_rowid();
        debug!(id, property_id = contract.property_id, "created contract");
        Ok(contract.into_contract(id)?)
    }

    async fn get_contract(
        &self,
        id: i64,
    ) -> Result<Contract, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM contracts WHERE id = ?",
            CONTRACT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_contract(&row)
    }

    async fn list_contracts(
        &self,
        property_id: Option<i64>,
    ) -> Result<Vec<Contract>, RepositoryError> {
        let rows = match property_id {
            Some(property_id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM contracts WHERE property_id = ? ORDER BY start_date, id",
                    CONTRACT_COLUMNS
                ))
                .bind(property_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM contracts ORDER BY start_date, id",
                    CONTRACT_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_error)?;

        rows.iter().map(row_to_contract).collect()
    }

    async fn list_active_contracts(&self) -> Result<Vec<Contract>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM contracts WHERE is_active = 1 ORDER BY start_date, id",
            CONTRACT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_contract).collect()
    }

    async fn update_contract(
        &self,
        contract: &Contract,
    ) -> Result<(), RepositoryError> {
        contract.validate()?;

        let result = sqlx::query(
            "UPDATE contracts SET
                property_id = ?, tenant_name = ?, tenant_kind = ?, start_date = ?,
                end_date = ?, monthly_rent = ?, payment_schedule = ?, is_active = ?
             WHERE id = ?",
        )
        .bind(contract.property_id)
        .bind(&contract.tenant_name)
        .bind(contract.tenant_kind.map(|k| k.as_str()))
        .bind(date_to_text(contract.start_date))
        .bind(date_to_text(contract.end_date))
        .bind(decimal_to_text(contract.monthly_rent))
        .bind(contract.payment_schedule.as_str())
        .bind(contract.is_active)
        .bind(contract.id)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "property", contract.property_id))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_contract(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM contracts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        debug!(id, "deleted contract with its payments");
        Ok(())
    }

    async fn create_payment(
        &self,
        payment: NewPayment,
    ) -> Result<Payment, RepositoryError> {
        ensure_non_negative("payment", payment.amount)?;

        let result = sqlx::query("INSERT INTO payments (contract_id, amount, date) VALUES (?, ?, ?)")
            .bind(payment.contract_id)
            .bind(decimal_to_text(payment.amount))
            .bind(date_to_text(payment.date))
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(e, "contract", payment.contract_id))?;

        Ok(Payment {
            id: result.last_insert_rowid(),
            contract_id: payment.contract_id,
            amount: payment.amount,
            date: payment.date,
        })
    }

    async fn list_payments(
        &self,
        contract_id: Option<i64>,
    ) -> Result<Vec<Payment>, RepositoryError> {
        const BASE_QUERY: &str = "SELECT id, contract_id, amount, date FROM payments";

        let rows = match contract_id {
            Some(contract_id) => {
                sqlx::query(&format!(
                    "{} WHERE contract_id = ? ORDER BY date, id",
                    BASE_QUERY
                ))
                .bind(contract_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("{} ORDER BY date, id", BASE_QUERY))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(db_error)?;

        rows.iter().map(row_to_payment).collect()
    }

    async fn delete_payment(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn create_expense(
        &self,
        expense: NewExpense,
    ) -> Result<Expense, RepositoryError> {
        ensure_non_negative("expense", expense.amount)?;

        let result = sqlx::query(
            "INSERT INTO expenses (property_id, amount, description, date) VALUES (?, ?, ?, ?)",
        )
        .bind(expense.property_id)
        .bind(decimal_to_text(expense.amount))
        .bind(expense.description.as_deref())
        .bind(date_to_text(expense.date))
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "property", expense.property_id))?;

        Ok(Expense {
            id: result.last_insert_rowid(),
            property_id: expense.property_id,
            amount: expense.amount,
            description: expense.description,
            date: expense.date,
        })
    }

    async fn list_expenses(
        &self,
        property_id: Option<i64>,
    ) -> Result<Vec<Expense>, RepositoryError> {
        const BASE_QUERY: &str = "SELECT id, property_id, amount, description, date FROM expenses";

        let rows = match property_id {
            Some(property_id) => {
                sqlx::query(&format!(
                    "{} WHERE property_id = ? ORDER BY date, id",
                    BASE_QUERY
                ))
                .bind(property_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("{} ORDER BY date, id", BASE_QUERY))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(db_error)?;

        rows.iter().map(row_to_expense).collect()
    }

    async fn delete_expense(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let repo = SqliteRepository::new("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_property(name: &str) -> NewProperty {
        NewProperty {
            name: name.to_string(),
            address: "Москва, ул. Ленина, 1".to_string(),
            kind: PropertyKind::Apartment,
            area: Some(dec!(54.3)),
            rooms: Some(2),
            description: None,
        }
    }

    fn new_contract(property_id: i64) -> NewContract {
        NewContract {
            property_id,
            tenant_name: "Иванов И.И.".to_string(),
            tenant_kind: Some(TenantKind::Person),
            start_date: date(2025, 1, 1),
            end_date: date(2025, 12, 31),
            monthly_rent: dec!(30000),
            payment_schedule: PaymentSchedule::Monthly,
            is_active: true,
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    #[tokio::test]
    async fn test_create_and_get_property() {
        let repo = setup_test_db().await;

        let created = repo
            .create_property(new_property("Квартира на Ленина"))
            .await
            .expect("Should create property");
        let fetched = repo
            .get_property(created.id)
            .await
            .expect("Should find property");

        assert_eq!(fetched, created);
        assert_eq!(fetched.area, Some(dec!(54.3)));
        assert_eq!(fetched.rooms, Some(2));
    }

    #[tokio::test]
    async fn test_get_property_not_found() {
        let repo = setup_test_db().await;

        let result = repo.get_property(999).await;

        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_update_property() {
        let repo = setup_test_db().await;
        let mut property = repo
            .create_property(new_property("Дача"))
            .await
            .expect("Should create property");

        property.kind = PropertyKind::House;
        property.description = Some("С баней".to_string());
        repo.update_property(&property)
            .await
            .expect("Should update property");

        let fetched = repo.get_property(property.id).await.unwrap();
        assert_eq!(fetched.kind, PropertyKind::House);
        assert_eq!(fetched.description.as_deref(), Some("С баней"));
    }

    #[tokio::test]
    async fn test_update_missing_property() {
        let repo = setup_test_db().await;
        let property = new_property("Нет такой").into_property(42);

        let result = repo.update_property(&property).await;

        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_properties_in_insertion_order() {
        let repo = setup_test_db().await;
        repo.create_property(new_property("Первая")).await.unwrap();
        repo.create_property(new_property("Вторая")).await.unwrap();

        let names: Vec<String> = repo
            .list_properties()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(names, vec!["Первая".to_string(), "Вторая".to_string()]);
    }

    // =========================================================================
    // Contracts
    // =========================================================================

    #[tokio::test]
    async fn test_create_and_get_contract() {
        let repo = setup_test_db().await;
        let property = repo.create_property(new_property("Студия")).await.unwrap();

        let created = repo
            .create_contract(new_contract(property.id))
            .await
            .expect("Should create contract");
        let fetched = repo.get_contract(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.monthly_rent, dec!(30000));
        assert_eq!(fetched.start_date, date(2025, 1, 1));
    }

    #[tokio::test]
    async fn test_contract_without_tenant_kind_round_trips() {
        let repo = setup_test_db().await;
        let property = repo.create_property(new_property("Студия")).await.unwrap();
        let mut contract = new_contract(property.id);
        contract.tenant_kind = None;

        let created = repo.create_contract(contract).await.unwrap();
        let fetched = repo.get_contract(created.id).await.unwrap();

        assert_eq!(fetched.tenant_kind, None);
        assert_eq!(fetched.tenant_kind_or_default(), TenantKind::Person);
    }

    #[tokio::test]
    async fn test_create_contract_rejects_reversed_dates() {
        let repo = setup_test_db().await;
        let property = repo.create_property(new_property("Студия")).await.unwrap();
        let mut contract = new_contract(property.id);
        contract.end_date = date(2024, 12, 1);

        let result = repo.create_contract(contract).await;

        assert!(matches!(result, Err(RepositoryError::InvalidRecord(_))));
        assert!(repo.list_contracts(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_contract_for_missing_property() {
        let repo = setup_test_db().await;

        let result = repo.create_contract(new_contract(77)).await;

        assert_eq!(
            result,
            Err(RepositoryError::InvalidRecord(
                "property 77 does not exist".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_list_contracts_filters_by_property() {
        let repo = setup_test_db().await;
        let first = repo.create_property(new_property("Первая")).await.unwrap();
        let second = repo.create_property(new_property("Вторая")).await.unwrap();
        repo.create_contract(new_contract(first.id)).await.unwrap();
        repo.create_contract(new_contract(second.id)).await.unwrap();
        repo.create_contract(new_contract(second.id)).await.unwrap();

        let all = repo.list_contracts(None).await.unwrap();
        let filtered = repo.list_contracts(Some(second.id)).await.unwrap();

        assert_eq!(all.len(), 3);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|c| c.property_id == second.id));
    }

    #[tokio::test]
    async fn test_list_active_contracts() {
        let repo = setup_test_db().await;
        let property = repo.create_property(new_property("Студия")).await.unwrap();
        let mut finished = new_contract(property.id);
        finished.is_active = false;
        repo.create_contract(finished).await.unwrap();
        let active = repo.create_contract(new_contract(property.id)).await.unwrap();

        let contracts = repo.list_active_contracts().await.unwrap();

        assert_eq!(contracts, vec![active]);
    }

    #[tokio::test]
    async fn test_update_contract() {
        let repo = setup_test_db().await;
        let property = repo.create_property(new_property("Студия")).await.unwrap();
        let mut contract = repo.create_contract(new_contract(property.id)).await.unwrap();

        contract.monthly_rent = dec!(32500.50);
        contract.payment_schedule = PaymentSchedule::Quarterly;
        contract.tenant_kind = Some(TenantKind::Organization);
        repo.update_contract(&contract).await.unwrap();

        assert_eq!(repo.get_contract(contract.id).await.unwrap(), contract);
    }

    #[tokio::test]
    async fn test_update_contract_rejects_negative_rent() {
        let repo = setup_test_db().await;
        let property = repo.create_property(new_property("Студия")).await.unwrap();
        let mut contract = repo.create_contract(new_contract(property.id)).await.unwrap();

        contract.monthly_rent = dec!(-1);
        let result = repo.update_contract(&contract).await;

        assert!(matches!(result, Err(RepositoryError::InvalidRecord(_))));
        assert_eq!(
            repo.get_contract(contract.id).await.unwrap().monthly_rent,
            dec!(30000)
        );
    }

    // =========================================================================
    // Payments and expenses
    // =========================================================================

    #[tokio::test]
    async fn test_payments_for_contract() {
        let repo = setup_test_db().await;
        let property = repo.create_property(new_property("Студия")).await.unwrap();
        let contract = repo.create_contract(new_contract(property.id)).await.unwrap();

        let later = repo
            .create_payment(NewPayment {
                contract_id: contract.id,
                amount: dec!(30000),
                date: date(2025, 2, 1),
            })
            .await
            .unwrap();
        let earlier = repo
            .create_payment(NewPayment {
                contract_id: contract.id,
                amount: dec!(30000),
                date: date(2025, 1, 1),
            })
            .await
            .unwrap();

        let payments = repo.list_payments(Some(contract.id)).await.unwrap();

        assert_eq!(payments, vec![earlier, later]);
    }

    #[tokio::test]
    async fn test_negative_payment_rejected() {
        let repo = setup_test_db().await;
        let property = repo.create_property(new_property("Студия")).await.unwrap();
        let contract = repo.create_contract(new_contract(property.id)).await.unwrap();

        let result = repo
            .create_payment(NewPayment {
                contract_id: contract.id,
                amount: dec!(-100),
                date: date(2025, 1, 1),
            })
            .await;

        assert_eq!(
            result,
            Err(RepositoryError::InvalidRecord(
                "payment amount must be non-negative, got -100".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_expenses_for_property() {
        let repo = setup_test_db().await;
        let property = repo.create_property(new_property("Студия")).await.unwrap();

        let expense = repo
            .create_expense(NewExpense {
                property_id: property.id,
                amount: dec!(4500.75),
                description: Some("Коммунальные платежи".to_string()),
                date: date(2025, 3, 10),
            })
            .await
            .unwrap();

        assert_eq!(repo.list_expenses(Some(property.id)).await.unwrap(), vec![expense]);
        assert!(repo.list_expenses(Some(property.id + 1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_expense() {
        let repo = setup_test_db().await;

        assert_eq!(repo.delete_expense(5).await, Err(RepositoryError::NotFound));
        assert_eq!(repo.delete_payment(5).await, Err(RepositoryError::NotFound));
    }

    // =========================================================================
    // Cascading deletes
    // =========================================================================

    #[tokio::test]
    async fn test_delete_contract_removes_payments() {
        let repo = setup_test_db().await;
        let property = repo.create_property(new_property("Студия")).await.unwrap();
        let contract = repo.create_contract(new_contract(property.id)).await.unwrap();
        repo.create_payment(NewPayment {
            contract_id: contract.id,
            amount: dec!(30000),
            date: date(2025, 1, 1),
        })
        .await
        .unwrap();

        repo.delete_contract(contract.id).await.unwrap();

        assert!(repo.list_payments(None).await.unwrap().is_empty());
        assert_eq!(
            repo.get_contract(contract.id).await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_delete_property_cascades() {
        let repo = setup_test_db().await;
        let property = repo.create_property(new_property("Студия")).await.unwrap();
        let other = repo.create_property(new_property("Дом")).await.unwrap();
        let contract = repo.create_contract(new_contract(property.id)).await.unwrap();
        let kept = repo.create_contract(new_contract(other.id)).await.unwrap();
        repo.create_payment(NewPayment {
            contract_id: contract.id,
            amount: dec!(30000),
            date: date(2025, 1, 1),
        })
        .await
        .unwrap();
        repo.create_expense(NewExpense {
            property_id: property.id,
            amount: dec!(1000),
            description: None,
            date: date(2025, 1, 5),
        })
        .await
        .unwrap();

        repo.delete_property(property.id).await.unwrap();

        assert_eq!(repo.list_contracts(None).await.unwrap(), vec![kept]);
        assert!(repo.list_payments(None).await.unwrap().is_empty());
        assert!(repo.list_expenses(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_property() {
        let repo = setup_test_db().await;

        assert_eq!(repo.delete_property(1).await, Err(RepositoryError::NotFound));
    }
}
