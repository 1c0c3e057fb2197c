use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::repository::{RentalRepository, RepositoryError};

/// Backend-agnostic connection configuration.
///
/// `backend` must match the [`RepositoryFactory::backend_name`] of a
/// registered factory. `connection_string` is handed to that factory as is.
///
/// | backend    | connection_string examples                 |
/// |------------|--------------------------------------------|
/// | `sqlite`   | `rent.db`, `sqlite://rent.db`, `:memory:`  |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"sqlite"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method.
    pub connection_string: String,
}

impl DbConfig {
    pub fn sqlite(connection_string: impl Into<String>) -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: connection_string.into(),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::sqlite(":memory:")
    }
}

/// One implementation per storage backend, registered with a
/// [`RepositoryRegistry`] at startup.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Opens (or creates) the store and returns a ready repository.
    /// Implementations may run migrations here.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn RentalRepository>, RepositoryError>;
}

/// Registry of [`RepositoryFactory`] instances, keyed by backend name.
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers a backend factory, replacing any previous factory with the
    /// same name.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Creates a repository with the factory named by `config.backend`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] if no factory is registered for
    ///   the requested backend.
    /// * Any error the chosen factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn RentalRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use crate::models::{
        Contract, Expense, NewContract, NewExpense, NewPayment, NewProperty, Payment, Property,
    };

    use super::{DbConfig, RentalRepository, RepositoryError, RepositoryFactory, RepositoryRegistry};

    // Routing tests never touch the repository itself.
    struct StubRepository;

    #[async_trait]
    impl RentalRepository for StubRepository {
        async fn create_property(&self, _property: NewProperty) -> Result<Property, RepositoryError> {
            unimplemented!()
        }
        async fn get_property(&self, _id: i64) -> Result<Property, RepositoryError> {
            unimplemented!()
        }
        async fn list_properties(&self) -> Result<Vec<Property>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn update_property(&self, _property: &Property) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn delete_property(&self, _id: i64) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn create_contract(&self, _contract: NewContract) -> Result<Contract, RepositoryError> {
            unimplemented!()
        }
        async fn get_contract(&self, _id: i64) -> Result<Contract, RepositoryError> {
            unimplemented!()
        }
        async fn list_contracts(
            &self,
            _property_id: Option<i64>,
        ) -> Result<Vec<Contract>, RepositoryError> {
            unimplemented!()
        }
        async fn list_active_contracts(&self) -> Result<Vec<Contract>, RepositoryError> {
            unimplemented!()
        }
        async fn update_contract(&self, _contract: &Contract) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn delete_contract(&self, _id: i64) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn create_payment(&self, _payment: NewPayment) -> Result<Payment, RepositoryError> {
            unimplemented!()
        }
        async fn list_payments(
            &self,
            _contract_id: Option<i64>,
        ) -> Result<Vec<Payment>, RepositoryError> {
            unimplemented!()
        }
        async fn delete_payment(&self, _id: i64) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn create_expense(&self, _expense: NewExpense) -> Result<Expense, RepositoryError> {
            unimplemented!()
        }
        async fn list_expenses(
            &self,
            _property_id: Option<i64>,
        ) -> Result<Vec<Expense>, RepositoryError> {
            unimplemented!()
        }
        async fn delete_expense(&self, _id: i64) -> Result<(), RepositoryError> {
            unimplemented!()
        }
    }

    /// Flips `called` when `create` runs.
    struct StubFactory {
        name: &'static str,
        called: Arc<AtomicBool>,
    }

    #[async_trait]
    impl RepositoryFactory for StubFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn RentalRepository>, RepositoryError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(Box::new(StubRepository))
        }
    }

    struct FailingFactory;

    #[async_trait]
    impl RepositoryFactory for FailingFactory {
        fn backend_name(&self) -> &'static str {
            "failing"
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn RentalRepository>, RepositoryError> {
            Err(RepositoryError::Connection("intentional failure".to_string()))
        }
    }

    fn stub_factory(name: &'static str) -> (Box<dyn RepositoryFactory>, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        (
            Box::new(StubFactory {
                name,
                called: flag.clone(),
            }),
            flag,
        )
    }

    // ── DbConfig ─────────────────────────────────────────────────────────
    #[test]
    fn dbconfig_default_is_sqlite_memory() {
        let cfg = DbConfig::default();
        assert_eq!(cfg.backend, "sqlite");
        assert_eq!(cfg.connection_string, ":memory:");
    }

    #[test]
    fn dbconfig_sqlite_keeps_connection_string() {
        let cfg = DbConfig::sqlite("rent.db");
        assert_eq!(cfg, DbConfig {
            backend: "sqlite".to_string(),
            connection_string: "rent.db".to_string(),
        });
    }

    // ── registration ─────────────────────────────────────────────────────
    #[test]
    fn new_registry_has_no_backends() {
        assert!(RepositoryRegistry::new().available_backends().is_empty());
    }

    #[test]
    fn available_backends_is_sorted() {
        let mut reg = RepositoryRegistry::new();
        let (f1, _) = stub_factory("sqlite");
        let (f2, _) = stub_factory("memory");
        reg.register(f1);
        reg.register(f2);
        assert_eq!(reg.available_backends(), vec!["memory", "sqlite"]);
    }

    #[test]
    fn duplicate_registration_replaces_previous() {
        let mut reg = RepositoryRegistry::new();
        let (old, _) = stub_factory("sqlite");
        let (new, _) = stub_factory("sqlite");
        reg.register(old);
        reg.register(new);
        assert_eq!(reg.available_backends(), vec!["sqlite"]);
    }

    // ── dispatch ─────────────────────────────────────────────────────────
    #[tokio::test]
    async fn create_calls_matching_factory_only() {
        let mut reg = RepositoryRegistry::new();
        let (sqlite_factory, sqlite_called) = stub_factory("sqlite");
        let (memory_factory, memory_called) = stub_factory("memory");
        reg.register(sqlite_factory);
        reg.register(memory_factory);

        let repo = reg.create(&DbConfig::sqlite(":memory:")).await.unwrap();

        assert!(sqlite_called.load(Ordering::SeqCst));
        assert!(!memory_called.load(Ordering::SeqCst));
        assert!(repo.list_properties().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn configuration_error_names_requested_and_available_backends() {
        let mut reg = RepositoryRegistry::new();
        let (f, _) = stub_factory("sqlite");
        reg.register(f);

        let config = DbConfig {
            backend: "indexeddb".to_string(),
            connection_string: "x".to_string(),
        };

        match reg.create(&config).await {
            Err(RepositoryError::Configuration(msg)) => {
                assert!(msg.contains("indexeddb"), "error should name the requested backend");
                assert!(msg.contains("sqlite"), "error should list available backends");
            }
            Err(other) => panic!("expected Configuration error, got {other:?}"),
            Ok(_) => panic!("expected Configuration error, got a repository"),
        }
    }

    #[tokio::test]
    async fn create_propagates_factory_error() {
        let mut reg = RepositoryRegistry::new();
        reg.register(Box::new(FailingFactory));

        let config = DbConfig {
            backend: "failing".to_string(),
            connection_string: "x".to_string(),
        };

        assert!(matches!(
            reg.create(&config).await,
            Err(RepositoryError::Connection(msg)) if msg == "intentional failure"
        ));
    }
}
