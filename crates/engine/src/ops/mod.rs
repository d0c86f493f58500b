use std::{future::Future, time::Duration};

use sea_orm::DatabaseConnection;

use crate::{AdminCode, EngineError, ResultEngine};

mod categories;
mod lock;
mod open;
mod splits;
mod status;
mod sync;
mod unlock;

pub use categories::CategoryStat;
pub use lock::{BalanceCheck, LockReceipt};
pub use open::OpenedTransaction;
pub use splits::SplitsAdded;
pub use status::{
    Health, HistoryEntry, OpenTransactionDetail, SplitView, SystemStatus, TransactionSummary,
};
pub use sync::SyncReceipt;

/// Default bound on a single engine operation.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a block inside a DB transaction, committing on success and rolling back
/// on error. The whole unit is bounded by the engine's operation timeout.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        $self
            .bounded(async {
                let $tx = $self.database.begin().await?;
                let result: $crate::ResultEngine<_> = $body;
                match result {
                    Ok(value) => {
                        $tx.commit().await?;
                        Ok(value)
                    }
                    Err(err) => Err(err),
                }
            })
            .await
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    admin_code: AdminCode,
    operation_timeout: Duration,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Awaits `operation`, giving up after the operation timeout.
    ///
    /// Dropping the future drops its uncommitted DB transaction, which rolls
    /// it back.
    async fn bounded<T, F>(&self, operation: F) -> ResultEngine<T>
    where
        F: Future<Output = ResultEngine<T>>,
    {
        match tokio::time::timeout(self.operation_timeout, operation).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.operation_timeout.as_millis() as u64,
                    "engine operation timed out"
                );
                Err(EngineError::Timeout)
            }
        }
    }
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: Option<DatabaseConnection>,
    admin_code: AdminCode,
    operation_timeout: Duration,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: None,
            admin_code: AdminCode::default(),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = Some(db);
        self
    }

    /// Code required by force unlock. Without one, force unlock is disabled.
    pub fn admin_code(mut self, code: Option<String>) -> EngineBuilder {
        self.admin_code = AdminCode::new(code);
        self
    }

    pub fn operation_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.operation_timeout = timeout;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let Some(database) = self.database else {
            return Err(EngineError::Validation(
                "database connection is required".to_string(),
            ));
        };
        if self.operation_timeout.is_zero() {
            return Err(EngineError::Validation(
                "operation timeout must be positive".to_string(),
            ));
        }
        if !self.admin_code.is_configured() {
            tracing::warn!("no admin code configured, force unlock is disabled");
        }
        Ok(Engine {
            database,
            admin_code: self.admin_code,
            operation_timeout: self.operation_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stalled_operation_times_out() {
        let engine = Engine::builder()
            .database(DatabaseConnection::default())
            .operation_timeout(Duration::from_millis(20))
            .build()
            .await
            .unwrap();
        let result = engine
            .bounded(std::future::pending::<ResultEngine<()>>())
            .await;
        assert_eq!(result, Err(EngineError::Timeout));
    }

    #[tokio::test]
    async fn zero_timeout_is_rejected() {
        let result = Engine::builder()
            .database(DatabaseConnection::default())
            .operation_timeout(Duration::ZERO)
            .build()
            .await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn missing_database_is_rejected() {
        let result = Engine::builder()
            .admin_code(Some("letmein".to_string()))
            .build()
            .await;
        assert_eq!(
            result.err(),
            Some(EngineError::Validation(
                "database connection is required".to_string()
            ))
        );
    }

    #[test]
    fn optional_text_is_trimmed_to_none() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(Some(" a ")), Some("a".to_string()));
        assert!(normalize_required_text(" ", "reason").is_err());
    }
}
