//! Gateway - main entry point tying access policy to the CRUD engine
//!
//! Owns the connection pool and configuration, constructed once at process
//! start and passed explicitly to callers. Every operation validates the
//! requested schema against the caller's permitted set before touching the
//! catalog or the engine.

use std::collections::BTreeSet;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, warn};

use crate::catalog::CatalogReader;
use crate::config::GatewayConfig;
use crate::engine::CrudEngine;
use crate::error::{GatewayError, Result};
use crate::sql::ddl::create_schema_sql;
use crate::tenant::{AccessDecision, Principal, check_access, private_schema_for};
use crate::types::{CreateTableOutcome, CreateTableRequest, Row, TableStructure};

/// Multi-tenant gateway over a live PostgreSQL database
///
/// Reads span the caller's private schema plus the registry-listed public
/// schemas; mutations are confined to the caller's private schema.
pub struct Gateway {
    /// Database connection pool
    pool: PgPool,
    /// Gateway configuration
    config: GatewayConfig,
}

impl Gateway {
    /// Connect to the database and construct a gateway
    pub async fn new(config: GatewayConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .map_err(|e| {
                GatewayError::Connection(format!("Database connection failed: {}", e))
            })?;

        Ok(Self { pool, config })
    }

    /// Construct a gateway over an existing pool
    ///
    /// Use this when the pool is shared with other components.
    pub fn from_pool(pool: PgPool, config: GatewayConfig) -> Self {
        Self { pool, config }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Name of the private schema owned by a principal
    pub fn private_schema(&self, principal: &Principal) -> String {
        private_schema_for(&self.config.private_schema_prefix, principal.id)
    }

    // =========================================================================
    // Schema browsing
    // =========================================================================

    /// Names of the publicly browsable schemas, from the registry table
    pub async fn public_schemas(&self) -> Result<BTreeSet<String>> {
        CatalogReader::new(&self.pool)
            .public_schema_names(&self.config.registry_schema, &self.config.registry_table)
            .await
    }

    /// List the tables of a schema the principal may read
    ///
    /// Empty when the schema exists but holds no tables; `NotFound` when the
    /// schema is absent from the live catalog.
    pub async fn list_tables(&self, principal: &Principal, schema: &str) -> Result<Vec<String>> {
        debug!(schema, "listing tables");
        self.require_readable(principal, schema).await?;

        let catalog = CatalogReader::new(&self.pool);
        if !catalog.schema_exists(schema).await? {
            return Err(GatewayError::not_found(format!(
                "Schema '{}' not found",
                schema
            )));
        }

        catalog.list_tables(schema).await
    }

    /// Project a table's structure for a principal with read access
    pub async fn table_structure(
        &self,
        principal: &Principal,
        schema: &str,
        table: &str,
    ) -> Result<TableStructure> {
        debug!(schema, table, "fetching table structure");
        self.require_readable(principal, schema).await?;
        CrudEngine::new(&self.pool).table_structure(schema, table).await
    }

    // =========================================================================
    // Row operations
    // =========================================================================

    /// Read rows: full scan, or filter-column equality when a filter value
    /// is given; optionally capped to `limit` rows
    pub async fn read_rows(
        &self,
        principal: &Principal,
        schema: &str,
        table: &str,
        filter_value: Option<&serde_json::Value>,
        limit: Option<i64>,
    ) -> Result<Vec<Row>> {
        debug!(schema, table, "reading rows");
        self.require_readable(principal, schema).await?;
        CrudEngine::new(&self.pool)
            .select_rows(schema, table, filter_value, limit)
            .await
    }

    /// Insert one or many rows into a table in the caller's private schema
    pub async fn write_rows(
        &self,
        principal: &Principal,
        schema: &str,
        table: &str,
        rows: &[Row],
    ) -> Result<u64> {
        debug!(schema, table, rows = rows.len(), "writing rows");
        self.require_private(principal, schema)?;
        CrudEngine::new(&self.pool).insert_rows(schema, table, rows).await
    }

    /// Update rows matching the filter value in the caller's private schema
    pub async fn update_rows(
        &self,
        principal: &Principal,
        schema: &str,
        table: &str,
        filter_value: &serde_json::Value,
        patch: &Row,
    ) -> Result<u64> {
        debug!(schema, table, "updating rows");
        self.require_private(principal, schema)?;
        CrudEngine::new(&self.pool)
            .update_rows(schema, table, filter_value, patch)
            .await
    }

    // =========================================================================
    // Table provisioning
    // =========================================================================

    /// Create a table in the caller's private schema, idempotently
    pub async fn create_table(
        &self,
        principal: &Principal,
        schema: &str,
        request: &CreateTableRequest,
    ) -> Result<CreateTableOutcome> {
        debug!(schema, table = %request.table_name, "creating table");
        self.require_private(principal, schema)?;
        CrudEngine::new(&self.pool).create_table(schema, request).await
    }

    /// Drop a table in the caller's private schema
    pub async fn drop_table(
        &self,
        principal: &Principal,
        schema: &str,
        table: &str,
    ) -> Result<()> {
        debug!(schema, table, "dropping table");
        self.require_private(principal, schema)?;
        CrudEngine::new(&self.pool).drop_table(schema, table).await
    }

    /// Provision the caller's private schema if it does not exist yet
    ///
    /// Called once per principal at account creation; safe to repeat.
    pub async fn ensure_private_schema(&self, principal: &Principal) -> Result<()> {
        let schema = self.private_schema(principal);
        debug!(schema, "ensuring private schema");

        let sql = create_schema_sql(&schema);
        sqlx::query(&sql).execute(&self.pool).await.map_err(|e| {
            GatewayError::write(format!("Error creating user schema '{}'", schema), e)
        })?;

        Ok(())
    }

    // =========================================================================
    // Access enforcement
    // =========================================================================

    /// Permit reads on the registry-listed public schemas plus the caller's
    /// private schema
    async fn require_readable(&self, principal: &Principal, schema: &str) -> Result<()> {
        let mut permitted = self.public_schemas().await?;
        permitted.insert(self.private_schema(principal));

        match check_access(schema, &permitted) {
            AccessDecision::Allowed => Ok(()),
            AccessDecision::Denied => {
                warn!(schema, principal = principal.id, "read access denied");
                Err(GatewayError::denied(schema))
            }
        }
    }

    /// Permit mutations only on the caller's own private schema
    fn require_private(&self, principal: &Principal, schema: &str) -> Result<()> {
        let private = self.private_schema(principal);
        let permitted = BTreeSet::from([private]);

        match check_access(schema, &permitted) {
            AccessDecision::Allowed => Ok(()),
            AccessDecision::Denied => {
                warn!(schema, principal = principal.id, "write access denied");
                Err(GatewayError::denied(schema))
            }
        }
    }
}
