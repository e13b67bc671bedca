//! Generic CRUD engine over runtime-discovered tables
//!
//! No table shape is known at compile time: every operation re-reads the
//! table's descriptor from the live catalog, validates client-supplied
//! column names against it, and builds parameterized SQL with quoted
//! identifiers. Values bind and decode by the column's catalog type.

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{PgPool, Postgres, Row as _};

use crate::catalog::CatalogReader;
use crate::error::{GatewayError, Result};
use crate::sql::ddl::{create_table_sql, drop_table_sql};
use crate::sql::sanitize::{qualified_name, quote_identifier, validate_identifier};
use crate::types::{
    ColumnDescriptor, CreateTableOutcome, CreateTableRequest, Row, TableDescriptor, TableStructure,
};

/// Executes generic operations against tables it has never seen a schema
/// for ahead of time
///
/// Schema and table names are assumed to have passed the access policy;
/// everything else is validated here against the freshly fetched descriptor.
pub struct CrudEngine<'a> {
    pool: &'a PgPool,
}

impl<'a> CrudEngine<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    fn catalog(&self) -> CatalogReader<'a> {
        CatalogReader::new(self.pool)
    }

    /// Read rows: full scan, or equality on the filter column when a filter
    /// value is given; optionally capped to `limit` rows
    ///
    /// The filter column is the declared primary key, falling back to the
    /// first column in catalog order. An empty result is an empty vec, never
    /// an error.
    pub async fn select_rows(
        &self,
        schema: &str,
        table: &str,
        filter_value: Option<&serde_json::Value>,
        limit: Option<i64>,
    ) -> Result<Vec<Row>> {
        if let Some(n) = limit {
            if n <= 0 {
                return Err(GatewayError::validation(format!(
                    "Limit must be greater than zero, got {}",
                    n
                )));
            }
        }

        let descriptor = self.catalog().describe_table(schema, table).await?;
        let filter_column = descriptor.filter_column().ok_or_else(|| {
            GatewayError::schema(format!(
                "No primary key or suitable column found for table '{}' in schema '{}'",
                table, schema
            ))
        })?;

        let select_list: Vec<String> = descriptor
            .columns
            .iter()
            .map(|c| quote_identifier(&c.name))
            .collect();

        let mut sql = format!(
            "SELECT {} FROM {}",
            select_list.join(", "),
            qualified_name(schema, table)
        );

        let mut param_idx = 1;
        if filter_value.is_some() {
            sql.push_str(&format!(
                " WHERE {} = ${}",
                quote_identifier(&filter_column.name),
                param_idx
            ));
            param_idx += 1;
        }
        if limit.is_some() {
            sql.push_str(&format!(" LIMIT ${}", param_idx));
        }

        let mut query = sqlx::query(&sql);
        if let Some(value) = filter_value {
            query = bind_json_value(query, filter_column, value)?;
        }
        if let Some(n) = limit {
            query = query.bind(n);
        }

        let rows = query.fetch_all(self.pool).await.map_err(|e| {
            GatewayError::catalog(
                format!(
                    "Error fetching data from table '{}' in schema '{}'",
                    table, schema
                ),
                e,
            )
        })?;

        Ok(rows
            .iter()
            .map(|row| decode_row(row, &descriptor))
            .collect())
    }

    /// Insert one or many rows within a single transaction
    ///
    /// Every key in every row must name an existing column. Any failure
    /// rolls back the entire batch; no partial insert is observable.
    pub async fn insert_rows(&self, schema: &str, table: &str, rows: &[Row]) -> Result<u64> {
        if rows.is_empty() {
            return Err(GatewayError::validation("Insert requires at least one row"));
        }

        let descriptor = self.catalog().describe_table(schema, table).await?;

        for row in rows {
            for key in row.keys() {
                if descriptor.column(key).is_none() {
                    return Err(GatewayError::validation(format!(
                        "Column '{}' not found in table '{}'",
                        key, table
                    )));
                }
            }
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            GatewayError::write(format!("Error starting transaction on table '{}'", table), e)
        })?;

        for row in rows {
            // Column order follows the descriptor so statement text is
            // deterministic for a given key set.
            let present: Vec<&ColumnDescriptor> = descriptor
                .columns
                .iter()
                .filter(|c| row.contains_key(&c.name))
                .collect();

            let column_list: Vec<String> =
                present.iter().map(|c| quote_identifier(&c.name)).collect();
            let placeholders: Vec<String> =
                (1..=present.len()).map(|i| format!("${}", i)).collect();

            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                qualified_name(schema, table),
                column_list.join(", "),
                placeholders.join(", ")
            );

            let mut query = sqlx::query(&sql);
            for col in &present {
                if let Some(value) = row.get(&col.name) {
                    query = bind_json_value(query, col, value)?;
                }
            }

            query.execute(&mut *tx).await.map_err(|e| {
                GatewayError::write(format!("Error inserting data into table '{}'", table), e)
            })?;
        }

        tx.commit().await.map_err(|e| {
            GatewayError::write(format!("Error committing insert into table '{}'", table), e)
        })?;

        Ok(rows.len() as u64)
    }

    /// Apply a patch to every row whose filter column equals `filter_value`
    ///
    /// Executed as a single statement, so either all matching rows are
    /// updated or none are. Returns the number of rows affected.
    pub async fn update_rows(
        &self,
        schema: &str,
        table: &str,
        filter_value: &serde_json::Value,
        patch: &Row,
    ) -> Result<u64> {
        if patch.is_empty() {
            return Err(GatewayError::validation(
                "Update requires at least one column to set",
            ));
        }

        let descriptor = self.catalog().describe_table(schema, table).await?;
        let filter_column = descriptor.filter_column().ok_or_else(|| {
            GatewayError::schema(format!(
                "No primary key or suitable column found for table '{}' in schema '{}'",
                table, schema
            ))
        })?;

        for key in patch.keys() {
            if descriptor.column(key).is_none() {
                return Err(GatewayError::validation(format!(
                    "Column '{}' not found in table '{}'",
                    key, table
                )));
            }
        }

        let present: Vec<&ColumnDescriptor> = descriptor
            .columns
            .iter()
            .filter(|c| patch.contains_key(&c.name))
            .collect();

        let set_clauses: Vec<String> = present
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} = ${}", quote_identifier(&c.name), i + 1))
            .collect();

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ${}",
            qualified_name(schema, table),
            set_clauses.join(", "),
            quote_identifier(&filter_column.name),
            present.len() + 1
        );

        let mut query = sqlx::query(&sql);
        for col in &present {
            if let Some(value) = patch.get(&col.name) {
                query = bind_json_value(query, col, value)?;
            }
        }
        query = bind_json_value(query, filter_column, filter_value)?;

        let result = query.execute(self.pool).await.map_err(|e| {
            GatewayError::write(format!("Error updating data in table '{}'", table), e)
        })?;

        Ok(result.rows_affected())
    }

    /// Provision a table from abstract column specs, idempotently
    ///
    /// The existence check is delegated to the storage engine's conditional
    /// create, so two concurrent calls cannot both create the table; an
    /// existing table is reported as such and left untouched.
    pub async fn create_table(
        &self,
        schema: &str,
        request: &CreateTableRequest,
    ) -> Result<CreateTableOutcome> {
        validate_identifier(&request.table_name)?;

        if request.columns.is_empty() {
            return Err(GatewayError::validation(
                "Table requires at least one column",
            ));
        }

        let mut resolved = Vec::with_capacity(request.columns.len());
        for spec in &request.columns {
            validate_identifier(&spec.name)?;
            if resolved.iter().any(|(name, _)| name == &spec.name) {
                return Err(GatewayError::validation(format!(
                    "Duplicate column name '{}'",
                    spec.name
                )));
            }
            resolved.push((spec.name.clone(), spec.resolve()?));
        }

        if let Some(pk) = &request.primary_key {
            if !resolved.iter().any(|(name, _)| name == pk) {
                return Err(GatewayError::validation(format!(
                    "Primary key column '{}' is not among the specified columns",
                    pk
                )));
            }
        }

        let existed = self
            .catalog()
            .table_exists(schema, &request.table_name)
            .await?;

        let sql = create_table_sql(
            schema,
            &request.table_name,
            &resolved,
            request.primary_key.as_deref(),
        );

        sqlx::query(&sql).execute(self.pool).await.map_err(|e| {
            GatewayError::write(
                format!("Error creating table '{}'", request.table_name),
                e,
            )
        })?;

        if existed {
            Ok(CreateTableOutcome::AlreadyExists)
        } else {
            Ok(CreateTableOutcome::Created)
        }
    }

    /// Drop a table; `NotFound` if it is absent at call time
    pub async fn drop_table(&self, schema: &str, table: &str) -> Result<()> {
        if !self.catalog().table_exists(schema, table).await? {
            return Err(GatewayError::not_found(format!(
                "Table '{}' not found in schema '{}'",
                table, schema
            )));
        }

        let sql = drop_table_sql(schema, table);
        sqlx::query(&sql).execute(self.pool).await.map_err(|e| {
            GatewayError::write(format!("Error dropping table '{}'", table), e)
        })?;

        Ok(())
    }

    /// Project a table's structure for clients: ordered column → type label
    /// plus the primary key name
    pub async fn table_structure(&self, schema: &str, table: &str) -> Result<TableStructure> {
        let descriptor = self.catalog().describe_table(schema, table).await?;
        Ok(TableStructure::from(&descriptor))
    }
}

// ============================================================================
// Dynamic value binding and row decoding
// ============================================================================

/// Bind a JSON value as a query parameter typed by the target column
///
/// String coercions mirror what declarative clients conventionally send:
/// quoted numbers for numeric columns, "true"/"1"/"yes" for booleans,
/// ISO dates and RFC 3339 timestamps as strings.
fn bind_json_value<'q>(
    query: sqlx::query::Query<'q, Postgres, PgArguments>,
    column: &ColumnDescriptor,
    value: &'q serde_json::Value,
) -> Result<sqlx::query::Query<'q, Postgres, PgArguments>> {
    let type_error = |expected: &str| {
        GatewayError::validation(format!(
            "Column '{}' expected {}, got {}",
            column.name, expected, value
        ))
    };

    Ok(match column.data_type.as_str() {
        "smallint" | "integer" | "bigint" => {
            if value.is_null() {
                query.bind(None::<i64>)
            } else {
                let int_val = value
                    .as_i64()
                    .or_else(|| value.as_str().and_then(|s| s.parse::<i64>().ok()))
                    .ok_or_else(|| type_error("an integer"))?;
                query.bind(int_val)
            }
        }
        "real" | "double precision" => {
            if value.is_null() {
                query.bind(None::<f64>)
            } else {
                let float_val = value
                    .as_f64()
                    .or_else(|| value.as_str().and_then(|s| s.parse::<f64>().ok()))
                    .ok_or_else(|| type_error("a number"))?;
                query.bind(float_val)
            }
        }
        "numeric" => {
            if value.is_null() {
                query.bind(None::<rust_decimal::Decimal>)
            } else {
                let text = match value {
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::String(s) => s.clone(),
                    _ => return Err(type_error("a number")),
                };
                let dec_val = text
                    .parse::<rust_decimal::Decimal>()
                    .map_err(|_| type_error("a number"))?;
                query.bind(dec_val)
            }
        }
        "boolean" => {
            if value.is_null() {
                query.bind(None::<bool>)
            } else {
                let bool_val = value
                    .as_bool()
                    .or_else(|| {
                        value.as_str().and_then(|s| match s.to_lowercase().as_str() {
                            "true" | "1" | "yes" => Some(true),
                            "false" | "0" | "no" => Some(false),
                            _ => None,
                        })
                    })
                    .ok_or_else(|| type_error("a boolean"))?;
                query.bind(bool_val)
            }
        }
        "date" => {
            if value.is_null() {
                query.bind(None::<chrono::NaiveDate>)
            } else {
                let s = value.as_str().ok_or_else(|| type_error("a date string"))?;
                let date = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|_| type_error("a date in YYYY-MM-DD form"))?;
                query.bind(date)
            }
        }
        "timestamp with time zone" => {
            if value.is_null() {
                query.bind(None::<chrono::DateTime<chrono::Utc>>)
            } else {
                let s = value
                    .as_str()
                    .ok_or_else(|| type_error("a timestamp string"))?;
                let ts = chrono::DateTime::parse_from_rfc3339(s)
                    .map_err(|_| type_error("an RFC 3339 timestamp"))?
                    .with_timezone(&chrono::Utc);
                query.bind(ts)
            }
        }
        "timestamp without time zone" => {
            if value.is_null() {
                query.bind(None::<chrono::NaiveDateTime>)
            } else {
                let s = value
                    .as_str()
                    .ok_or_else(|| type_error("a timestamp string"))?;
                let ts = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .or_else(|_| {
                        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                    })
                    .map_err(|_| type_error("an ISO 8601 timestamp"))?;
                query.bind(ts)
            }
        }
        "json" | "jsonb" => query.bind(value),
        "text" | "character varying" | "character" | "char" => {
            if value.is_null() {
                query.bind(None::<String>)
            } else {
                query.bind(value.as_str().ok_or_else(|| type_error("a string"))?)
            }
        }
        // Types outside the decode set accept string values verbatim and let
        // the storage engine judge them.
        _ => {
            if value.is_null() {
                query.bind(None::<String>)
            } else {
                query.bind(value.as_str().ok_or_else(|| type_error("a string"))?)
            }
        }
    })
}

/// Decode one database row into an ordered column-name → value mapping
///
/// Columns appear in catalog declaration order; NULL decodes to JSON null;
/// types outside the decode set fall back to text, else null.
fn decode_row(row: &PgRow, descriptor: &TableDescriptor) -> Row {
    let mut out = Row::new();
    for col in &descriptor.columns {
        out.insert(col.name.clone(), decode_column(row, col));
    }
    out
}

fn decode_column(row: &PgRow, col: &ColumnDescriptor) -> serde_json::Value {
    use serde_json::Value;

    let name = col.name.as_str();
    match col.data_type.as_str() {
        "smallint" => row
            .try_get::<Option<i16>, _>(name)
            .ok()
            .flatten()
            .map(|v| Value::Number(v.into()))
            .unwrap_or(Value::Null),
        "integer" => row
            .try_get::<Option<i32>, _>(name)
            .ok()
            .flatten()
            .map(|v| Value::Number(v.into()))
            .unwrap_or(Value::Null),
        "bigint" => row
            .try_get::<Option<i64>, _>(name)
            .ok()
            .flatten()
            .map(|v| Value::Number(v.into()))
            .unwrap_or(Value::Null),
        "real" => row
            .try_get::<Option<f32>, _>(name)
            .ok()
            .flatten()
            .and_then(|v| serde_json::Number::from_f64(f64::from(v)))
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "double precision" => row
            .try_get::<Option<f64>, _>(name)
            .ok()
            .flatten()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "numeric" => {
            use rust_decimal::prelude::ToPrimitive;
            row.try_get::<Option<rust_decimal::Decimal>, _>(name)
                .ok()
                .flatten()
                .and_then(|d| d.to_f64())
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }
        "boolean" => row
            .try_get::<Option<bool>, _>(name)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        "date" => row
            .try_get::<Option<chrono::NaiveDate>, _>(name)
            .ok()
            .flatten()
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
        "timestamp with time zone" => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name)
            .ok()
            .flatten()
            .map(|ts| Value::String(ts.to_rfc3339()))
            .unwrap_or(Value::Null),
        "timestamp without time zone" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(name)
            .ok()
            .flatten()
            .map(|ts| Value::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
            .unwrap_or(Value::Null),
        "json" | "jsonb" => row
            .try_get::<Option<Value>, _>(name)
            .ok()
            .flatten()
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<Option<String>, _>(name)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}
