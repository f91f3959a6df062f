//! Employee repository backed by the relational store.
//!
//! Reads always return the whole `Employee` table as flat records; the tree is
//! assembled in memory by [`crate::hierarchy`]. Every statement borrows one pooled
//! connection and hands it back when the statement finishes, success or not.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::ServiceError;
use crate::schema::{bit_to_bool, EmployeeRecord};

const SELECT_ALL_EMPLOYEES: &str = "SELECT ID, Name, ManagerID, Enable FROM Employee ORDER BY ID";

// SQLite has no bitwise XOR; this is the same single-statement flip as `Enable ^ 1`.
const TOGGLE_ENABLE: &str =
    "UPDATE Employee SET Enable = CASE WHEN Enable = 0 THEN 1 ELSE 0 END WHERE ID = ?1";

/// Storage operations the service needs.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Load every employee row, in id order.
    async fn load_all_employees(&self) -> Result<Vec<EmployeeRecord>, ServiceError>;

    /// Flip the enabled bit of one employee. Returns `false` when no row has that id.
    async fn toggle_enabled(&self, id: i64) -> Result<bool, ServiceError>;
}

/// SQL implementation of [`EmployeeRepository`].
#[derive(Clone)]
pub struct SqlEmployeeRepository {
    pool: SqlitePool,
}

impl SqlEmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool against `config.url`.
    ///
    /// The database file must already exist and hold the `Employee` table.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, ServiceError> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        info!(
            "Database pool ready: {} (max_connections={})",
            config.url, config.max_connections
        );
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl EmployeeRepository for SqlEmployeeRepository {
    async fn load_all_employees(&self) -> Result<Vec<EmployeeRecord>, ServiceError> {
        let rows = sqlx::query(SELECT_ALL_EMPLOYEES)
            .fetch_all(&self.pool)
            .await?;

        let employees = rows
            .iter()
            .map(employee_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Loaded {} employee rows", employees.len());
        Ok(employees)
    }

    async fn toggle_enabled(&self, id: i64) -> Result<bool, ServiceError> {
        let result = sqlx::query(TOGGLE_ENABLE)
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!("Toggle for employee {} affected {} rows", id, result.rows_affected());
        Ok(result.rows_affected() > 0)
    }
}

/// Map a row positionally: ID, Name, ManagerID, Enable.
fn employee_from_row(row: &SqliteRow) -> Result<EmployeeRecord, sqlx::Error> {
    Ok(EmployeeRecord {
        id: row.try_get(0)?,
        name: row.try_get(1)?,
        manager_id: row.try_get(2)?,
        enabled: bit_to_bool(row.try_get(3)?),
    })
}
