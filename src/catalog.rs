//! Live catalog introspection
//!
//! Every call queries `information_schema` directly and reflects current
//! database state. Nothing is cached: the catalog is shared mutable state and
//! another request may provision or drop tables between calls.

use std::collections::BTreeSet;

use sqlx::{PgPool, Row as _};

use crate::error::{GatewayError, Result};
use crate::sql::sanitize::qualified_name;
use crate::types::{ColumnDescriptor, TableDescriptor};

/// Stateless reader over the database's live metadata
pub struct CatalogReader<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogReader<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Enumerate schema names, excluding the engine's internal namespaces
    pub async fn list_schemas(&self) -> Result<BTreeSet<String>> {
        // Catalog identifier domains are cast to concrete text types so the
        // driver decodes them uniformly.
        let sql = r#"
            SELECT schema_name::text
            FROM information_schema.schemata
            WHERE schema_name NOT LIKE 'pg\_%'
              AND schema_name <> 'information_schema'
            "#;

        let names: Vec<String> = sqlx::query_scalar(sql)
            .fetch_all(self.pool)
            .await
            .map_err(|e| GatewayError::catalog("Error listing schemas", e))?;

        Ok(names.into_iter().collect())
    }

    /// Whether a schema exists in the live catalog
    pub async fn schema_exists(&self, schema: &str) -> Result<bool> {
        let sql = r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.schemata
                WHERE schema_name = $1
            )
            "#;

        sqlx::query_scalar(sql)
            .bind(schema)
            .fetch_one(self.pool)
            .await
            .map_err(|e| GatewayError::catalog(format!("Error checking schema '{}'", schema), e))
    }

    /// Base tables of a schema in name order; empty when the schema has none
    pub async fn list_tables(&self, schema: &str) -> Result<Vec<String>> {
        let sql = r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = $1
              AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#;

        sqlx::query_scalar(sql)
            .bind(schema)
            .fetch_all(self.pool)
            .await
            .map_err(|e| {
                GatewayError::catalog(format!("Error listing tables in schema '{}'", schema), e)
            })
    }

    /// Whether a base table exists in a schema at call time
    pub async fn table_exists(&self, schema: &str, table: &str) -> Result<bool> {
        let sql = r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = $1
                  AND table_name = $2
                  AND table_type = 'BASE TABLE'
            )
            "#;

        sqlx::query_scalar(sql)
            .bind(schema)
            .bind(table)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                GatewayError::catalog(format!("Error checking table '{}.{}'", schema, table), e)
            })
    }

    /// Fetch a table's column descriptors in catalog declaration order
    ///
    /// Fails with `NotFound` when the table is absent at call time.
    pub async fn describe_table(&self, schema: &str, table: &str) -> Result<TableDescriptor> {
        let columns_sql = r#"
            SELECT
                column_name::text AS column_name,
                data_type::text AS data_type,
                character_maximum_length::int AS max_length
            FROM information_schema.columns
            WHERE table_schema = $1
              AND table_name = $2
            ORDER BY ordinal_position
            "#;

        let rows = sqlx::query(columns_sql)
            .bind(schema)
            .bind(table)
            .fetch_all(self.pool)
            .await
            .map_err(|e| {
                GatewayError::catalog(format!("Error describing table '{}.{}'", schema, table), e)
            })?;

        if rows.is_empty() && !self.table_exists(schema, table).await? {
            return Err(GatewayError::not_found(format!(
                "Table '{}' not found in schema '{}'",
                table, schema
            )));
        }

        let pk_columns = self.primary_key_columns(schema, table).await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row
                .try_get("column_name")
                .map_err(|e| GatewayError::catalog("Error decoding column metadata", e))?;
            let data_type: String = row
                .try_get("data_type")
                .map_err(|e| GatewayError::catalog("Error decoding column metadata", e))?;
            let max_length: Option<i32> = row
                .try_get("max_length")
                .map_err(|e| GatewayError::catalog("Error decoding column metadata", e))?;

            let primary_key = pk_columns.contains(&name);
            columns.push(ColumnDescriptor {
                name,
                data_type,
                max_length,
                primary_key,
            });
        }

        Ok(TableDescriptor {
            schema: schema.to_string(),
            name: table.to_string(),
            columns,
        })
    }

    /// Names of schemas listed as publicly browsable in the registry table
    ///
    /// The registry gates all public access decisions, so a missing registry
    /// or a failed read surfaces as a catalog failure, never as an empty set.
    pub async fn public_schema_names(
        &self,
        registry_schema: &str,
        registry_table: &str,
    ) -> Result<BTreeSet<String>> {
        let sql = format!(
            "SELECT schema_name::text FROM {}",
            qualified_name(registry_schema, registry_table)
        );

        let names: Vec<String> = sqlx::query_scalar(&sql)
            .fetch_all(self.pool)
            .await
            .map_err(|e| GatewayError::catalog("Error fetching visible schemas", e))?;

        Ok(names.into_iter().collect())
    }

    /// Declared primary-key column names in key ordinal order
    async fn primary_key_columns(&self, schema: &str, table: &str) -> Result<BTreeSet<String>> {
        let sql = r#"
            SELECT kcu.column_name::text
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON tc.constraint_name = kcu.constraint_name
             AND tc.constraint_schema = kcu.constraint_schema
            WHERE tc.constraint_type = 'PRIMARY KEY'
              AND tc.table_schema = $1
              AND tc.table_name = $2
            ORDER BY kcu.ordinal_position
            "#;

        let names: Vec<String> = sqlx::query_scalar(sql)
            .bind(schema)
            .bind(table)
            .fetch_all(self.pool)
            .await
            .map_err(|e| {
                GatewayError::catalog(
                    format!("Error fetching primary key for table '{}.{}'", schema, table),
                    e,
                )
            })?;

        Ok(names.into_iter().collect())
    }
}
