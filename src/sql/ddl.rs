//! DDL generation for tenant-provisioned tables
//!
//! Generates the PostgreSQL statements behind table provisioning and drop.
//! Identifiers are validated by the caller; everything here is quoted.

use crate::sql::sanitize::{qualified_name, quote_identifier};
use crate::types::ColumnType;

/// Generate a conditional CREATE TABLE statement
///
/// `columns` are (name, resolved type) pairs in declaration order. The
/// `IF NOT EXISTS` form delegates the existence check to the storage engine
/// so two concurrent provisioning calls cannot both create the table.
pub fn create_table_sql(
    schema: &str,
    table: &str,
    columns: &[(String, ColumnType)],
    primary_key: Option<&str>,
) -> String {
    let column_defs: Vec<String> = columns
        .iter()
        .map(|(name, column_type)| {
            let mut def = format!("{} {}", quote_identifier(name), column_type.to_sql_type());
            if primary_key == Some(name.as_str()) {
                def.push_str(" PRIMARY KEY");
            }
            def
        })
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        qualified_name(schema, table),
        column_defs.join(", ")
    )
}

/// Generate a DROP TABLE statement
pub fn drop_table_sql(schema: &str, table: &str) -> String {
    format!("DROP TABLE {} CASCADE", qualified_name(schema, table))
}

/// Generate a conditional CREATE SCHEMA statement for a tenant's private
/// schema
pub fn create_schema_sql(schema: &str) -> String {
    format!("CREATE SCHEMA IF NOT EXISTS {}", quote_identifier(schema))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_table_sql() {
        let columns = vec![
            ("id".to_string(), ColumnType::Integer),
            (
                "text".to_string(),
                ColumnType::String {
                    max_length: Some(256),
                },
            ),
        ];

        let sql = create_table_sql("user_own_data_7", "notes", &columns, Some("id"));

        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"user_own_data_7\".\"notes\" \
             (\"id\" BIGINT PRIMARY KEY, \"text\" VARCHAR(256))"
        );
    }

    #[test]
    fn test_create_table_sql_without_primary_key() {
        let columns = vec![
            ("name".to_string(), ColumnType::String { max_length: None }),
            ("value".to_string(), ColumnType::Float),
        ];

        let sql = create_table_sql("user_own_data_7", "readings", &columns, None);

        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS"));
        assert!(sql.contains("\"name\" TEXT"));
        assert!(sql.contains("\"value\" DOUBLE PRECISION"));
        assert!(!sql.contains("PRIMARY KEY"));
    }

    #[test]
    fn test_create_table_sql_all_types() {
        let columns = vec![
            ("a".to_string(), ColumnType::Integer),
            ("b".to_string(), ColumnType::String { max_length: None }),
            ("c".to_string(), ColumnType::Float),
            ("d".to_string(), ColumnType::Date),
            ("e".to_string(), ColumnType::Boolean),
        ];

        let sql = create_table_sql("s", "t", &columns, None);

        assert!(sql.contains("\"a\" BIGINT"));
        assert!(sql.contains("\"b\" TEXT"));
        assert!(sql.contains("\"c\" DOUBLE PRECISION"));
        assert!(sql.contains("\"d\" DATE"));
        assert!(sql.contains("\"e\" BOOLEAN"));
    }

    #[test]
    fn test_create_table_sql_preserves_column_order() {
        let columns = vec![
            ("zeta".to_string(), ColumnType::Integer),
            ("alpha".to_string(), ColumnType::Integer),
        ];

        let sql = create_table_sql("s", "t", &columns, None);

        let zeta = sql.find("\"zeta\"").unwrap();
        let alpha = sql.find("\"alpha\"").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn test_drop_table_sql() {
        assert_eq!(
            drop_table_sql("user_own_data_7", "notes"),
            "DROP TABLE \"user_own_data_7\".\"notes\" CASCADE"
        );
    }

    #[test]
    fn test_create_schema_sql() {
        assert_eq!(
            create_schema_sql("user_own_data_42"),
            "CREATE SCHEMA IF NOT EXISTS \"user_own_data_42\""
        );
    }
}
