//! Core type definitions for the gateway
//!
//! Includes the abstract column-type resolver, column specs for table
//! provisioning, and the descriptors produced by catalog introspection.

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};

/// A row returned by the engine: an ordered mapping from column name to
/// value, in catalog column order (`serde_json` is built with
/// `preserve_order`).
pub type Row = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// Abstract column types (client-facing type descriptors)
// ============================================================================

/// Abstract column type resolved from a client-supplied descriptor
///
/// The set is deliberately small: clients declare types by name, so only
/// names with an obvious storage mapping are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnType {
    /// Integer field (maps to BIGINT for 64-bit range)
    Integer,

    /// Variable-length text, optionally bounded (maps to VARCHAR(n) or TEXT)
    String { max_length: Option<u32> },

    /// Floating-point field (maps to DOUBLE PRECISION)
    Float,

    /// Calendar date without time of day (maps to DATE)
    Date,

    /// Boolean field (maps to BOOLEAN)
    Boolean,
}

impl ColumnType {
    /// Resolve an abstract type descriptor into a concrete column type
    ///
    /// `type_name` is matched case-insensitively. The length parameter, when
    /// given, must be a positive integer; it bounds `String` columns and is
    /// ignored by the other types.
    pub fn resolve(type_name: &str, length: Option<i64>) -> Result<Self> {
        if let Some(n) = length {
            if n <= 0 {
                return Err(GatewayError::validation(format!(
                    "Length parameter for type '{}' must be a positive integer, got {}",
                    type_name, n
                )));
            }
            if n > i64::from(u32::MAX) {
                return Err(GatewayError::validation(format!(
                    "Length parameter for type '{}' is out of range: {}",
                    type_name, n
                )));
            }
        }

        match type_name.to_ascii_lowercase().as_str() {
            "integer" => Ok(ColumnType::Integer),
            "string" => Ok(ColumnType::String {
                max_length: length.map(|n| n as u32),
            }),
            "float" => Ok(ColumnType::Float),
            "date" => Ok(ColumnType::Date),
            "boolean" => Ok(ColumnType::Boolean),
            _ => Err(GatewayError::unsupported_type(type_name)),
        }
    }

    /// Convert to the PostgreSQL type string used in DDL
    pub fn to_sql_type(&self) -> String {
        match self {
            ColumnType::Integer => "BIGINT".to_string(),
            ColumnType::String {
                max_length: Some(n),
            } => format!("VARCHAR({})", n),
            ColumnType::String { max_length: None } => "TEXT".to_string(),
            ColumnType::Float => "DOUBLE PRECISION".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
        }
    }

    /// Map a catalog type name back to an abstract type, if one covers it
    ///
    /// Catalog types outside the abstract set (numeric, timestamps, json,
    /// ...) return `None` and are reported under their PostgreSQL name.
    pub fn from_catalog(data_type: &str, max_length: Option<i32>) -> Option<Self> {
        match data_type {
            "smallint" | "integer" | "bigint" => Some(ColumnType::Integer),
            "character varying" | "varchar" => Some(ColumnType::String {
                max_length: max_length.and_then(|n| u32::try_from(n).ok()),
            }),
            "text" | "character" | "char" => Some(ColumnType::String { max_length: None }),
            "real" | "double precision" => Some(ColumnType::Float),
            "date" => Some(ColumnType::Date),
            "boolean" => Some(ColumnType::Boolean),
            _ => None,
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "Integer"),
            ColumnType::String {
                max_length: Some(n),
            } => write!(f, "String({})", n),
            ColumnType::String { max_length: None } => write!(f, "String"),
            ColumnType::Float => write!(f, "Float"),
            ColumnType::Date => write!(f, "Date"),
            ColumnType::Boolean => write!(f, "Boolean"),
        }
    }
}

// ============================================================================
// Table provisioning requests
// ============================================================================

/// A single column in a table-creation request: name plus abstract type
/// descriptor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnSpec {
    /// Column name (must be a valid identifier)
    pub name: String,
    /// Abstract type name, e.g. "Integer" or "String"
    #[serde(rename = "type")]
    pub type_name: String,
    /// Optional length parameter for bounded text columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<i64>,
}

impl ColumnSpec {
    /// Create a new column spec with a name and abstract type name
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            length: None,
        }
    }

    /// Set the length parameter
    pub fn with_length(mut self, length: i64) -> Self {
        self.length = Some(length);
        self
    }

    /// Resolve this spec's type descriptor into a concrete column type
    pub fn resolve(&self) -> Result<ColumnType> {
        ColumnType::resolve(&self.type_name, self.length)
    }
}

/// Request to create a table in the caller's private schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTableRequest {
    /// Table name (must be a valid identifier)
    #[serde(rename = "tableName")]
    pub table_name: String,
    /// Ordered column specs; order becomes catalog declaration order
    pub columns: Vec<ColumnSpec>,
    /// Optional primary key; must name one of `columns`
    #[serde(rename = "primaryKey", skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
}

impl CreateTableRequest {
    /// Create a new request with a table name and columns
    pub fn new(table_name: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
            primary_key: None,
        }
    }

    /// Set the primary key column
    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }
}

/// Outcome of an idempotent table-creation call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CreateTableOutcome {
    /// The table did not exist and was created
    Created,
    /// The table already existed; it was left untouched
    AlreadyExists,
}

// ============================================================================
// Catalog descriptors (fetched fresh per call, never cached)
// ============================================================================

/// A column as discovered in the live catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDescriptor {
    /// Column name (unique within the table)
    pub name: String,
    /// Catalog type name, e.g. "bigint" or "character varying"
    #[serde(rename = "dataType")]
    pub data_type: String,
    /// Declared maximum length for bounded text columns
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i32>,
    /// Whether the column is part of the declared primary key
    #[serde(rename = "primaryKey")]
    pub primary_key: bool,
}

impl ColumnDescriptor {
    /// Human-readable type label: the abstract name where one covers the
    /// catalog type, the raw catalog name otherwise
    pub fn type_label(&self) -> String {
        match ColumnType::from_catalog(&self.data_type, self.max_length) {
            Some(t) => t.to_string(),
            None => self.data_type.clone(),
        }
    }
}

/// A table as discovered in the live catalog
///
/// Column order is catalog declaration order; it determines the fallback
/// filter column for tables without a declared primary key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Owning schema name
    pub schema: String,
    /// Table name
    pub name: String,
    /// Columns in catalog declaration order
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// First declared primary-key column in column order, if any
    ///
    /// Composite keys are not supported: when the catalog marks several
    /// columns as primary key, only the first one is used.
    pub fn primary_key_column(&self) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// The column used for single-column lookups: the primary key if
    /// declared, else the first column in catalog order
    pub fn filter_column(&self) -> Option<&ColumnDescriptor> {
        self.primary_key_column().or_else(|| self.columns.first())
    }
}

/// Structure projection of a table for clients: ordered column-name →
/// type-label mapping plus the primary key name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStructure {
    /// Table name
    #[serde(rename = "tableName")]
    pub table_name: String,
    /// Column name → type label, in catalog column order
    pub columns: serde_json::Map<String, serde_json::Value>,
    /// Primary key column name, if one is declared
    #[serde(rename = "primaryKey", skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
}

impl From<&TableDescriptor> for TableStructure {
    fn from(table: &TableDescriptor) -> Self {
        let mut columns = serde_json::Map::new();
        for col in &table.columns {
            columns.insert(
                col.name.clone(),
                serde_json::Value::String(col.type_label()),
            );
        }
        Self {
            table_name: table.name.clone(),
            columns,
            primary_key: table.primary_key_column().map(|c| c.name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Type Resolution Tests
    // =========================================================================

    #[test]
    fn test_resolve_integer() {
        assert_eq!(
            ColumnType::resolve("Integer", None).unwrap(),
            ColumnType::Integer
        );
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        assert_eq!(
            ColumnType::resolve("integer", None).unwrap(),
            ColumnType::Integer
        );
        assert_eq!(
            ColumnType::resolve("BOOLEAN", None).unwrap(),
            ColumnType::Boolean
        );
        assert_eq!(ColumnType::resolve("float", None).unwrap(), ColumnType::Float);
    }

    #[test]
    fn test_resolve_string_with_length() {
        assert_eq!(
            ColumnType::resolve("String", Some(256)).unwrap(),
            ColumnType::String {
                max_length: Some(256)
            }
        );
    }

    #[test]
    fn test_resolve_string_without_length() {
        assert_eq!(
            ColumnType::resolve("String", None).unwrap(),
            ColumnType::String { max_length: None }
        );
    }

    #[test]
    fn test_resolve_unknown_type() {
        let err = ColumnType::resolve("Blob", None).unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedType(_)));

        assert!(ColumnType::resolve("", None).is_err());
        assert!(ColumnType::resolve("int64", None).is_err());
    }

    #[test]
    fn test_resolve_rejects_non_positive_length() {
        let err = ColumnType::resolve("String", Some(0)).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));

        assert!(ColumnType::resolve("String", Some(-5)).is_err());
    }

    #[test]
    fn test_resolve_validates_length_for_any_type() {
        // A bad length is rejected even when the type would ignore it
        assert!(ColumnType::resolve("Integer", Some(-1)).is_err());
        assert!(ColumnType::resolve("Integer", Some(10)).is_ok());
    }

    // =========================================================================
    // SQL Type Mapping Tests
    // =========================================================================

    #[test]
    fn test_sql_types() {
        assert_eq!(ColumnType::Integer.to_sql_type(), "BIGINT");
        assert_eq!(ColumnType::Float.to_sql_type(), "DOUBLE PRECISION");
        assert_eq!(ColumnType::Date.to_sql_type(), "DATE");
        assert_eq!(ColumnType::Boolean.to_sql_type(), "BOOLEAN");
    }

    #[test]
    fn test_sql_type_string() {
        assert_eq!(
            ColumnType::String { max_length: None }.to_sql_type(),
            "TEXT"
        );
        assert_eq!(
            ColumnType::String {
                max_length: Some(256)
            }
            .to_sql_type(),
            "VARCHAR(256)"
        );
    }

    // =========================================================================
    // Display / Label Tests
    // =========================================================================

    #[test]
    fn test_display_labels() {
        assert_eq!(ColumnType::Integer.to_string(), "Integer");
        assert_eq!(
            ColumnType::String {
                max_length: Some(256)
            }
            .to_string(),
            "String(256)"
        );
        assert_eq!(
            ColumnType::String { max_length: None }.to_string(),
            "String"
        );
        assert_eq!(ColumnType::Float.to_string(), "Float");
        assert_eq!(ColumnType::Date.to_string(), "Date");
        assert_eq!(ColumnType::Boolean.to_string(), "Boolean");
    }

    #[test]
    fn test_from_catalog_known_types() {
        assert_eq!(
            ColumnType::from_catalog("bigint", None),
            Some(ColumnType::Integer)
        );
        assert_eq!(
            ColumnType::from_catalog("integer", None),
            Some(ColumnType::Integer)
        );
        assert_eq!(
            ColumnType::from_catalog("character varying", Some(64)),
            Some(ColumnType::String {
                max_length: Some(64)
            })
        );
        assert_eq!(
            ColumnType::from_catalog("text", None),
            Some(ColumnType::String { max_length: None })
        );
        assert_eq!(
            ColumnType::from_catalog("double precision", None),
            Some(ColumnType::Float)
        );
        assert_eq!(
            ColumnType::from_catalog("date", None),
            Some(ColumnType::Date)
        );
        assert_eq!(
            ColumnType::from_catalog("boolean", None),
            Some(ColumnType::Boolean)
        );
    }

    #[test]
    fn test_from_catalog_unknown_types() {
        assert_eq!(ColumnType::from_catalog("numeric", None), None);
        assert_eq!(
            ColumnType::from_catalog("timestamp with time zone", None),
            None
        );
        assert_eq!(ColumnType::from_catalog("jsonb", None), None);
        assert_eq!(ColumnType::from_catalog("uuid", None), None);
    }

    #[test]
    fn test_column_descriptor_type_label() {
        let col = ColumnDescriptor {
            name: "value".to_string(),
            data_type: "double precision".to_string(),
            max_length: None,
            primary_key: false,
        };
        assert_eq!(col.type_label(), "Float");

        let col = ColumnDescriptor {
            name: "payload".to_string(),
            data_type: "jsonb".to_string(),
            max_length: None,
            primary_key: false,
        };
        assert_eq!(col.type_label(), "jsonb");
    }

    // =========================================================================
    // ColumnSpec / CreateTableRequest Tests
    // =========================================================================

    #[test]
    fn test_column_spec_builder() {
        let spec = ColumnSpec::new("text", "String").with_length(256);
        assert_eq!(spec.name, "text");
        assert_eq!(spec.type_name, "String");
        assert_eq!(spec.length, Some(256));
        assert_eq!(
            spec.resolve().unwrap(),
            ColumnType::String {
                max_length: Some(256)
            }
        );
    }

    #[test]
    fn test_create_table_request_builder() {
        let request = CreateTableRequest::new(
            "notes",
            vec![
                ColumnSpec::new("id", "Integer"),
                ColumnSpec::new("text", "String").with_length(256),
            ],
        )
        .with_primary_key("id");

        assert_eq!(request.table_name, "notes");
        assert_eq!(request.columns.len(), 2);
        assert_eq!(request.primary_key, Some("id".to_string()));
    }

    #[test]
    fn test_column_spec_serialization() {
        let spec = ColumnSpec::new("text", "String").with_length(64);
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"name\":\"text\""));
        assert!(json.contains("\"type\":\"String\""));
        assert!(json.contains("\"length\":64"));
    }

    #[test]
    fn test_column_spec_deserialization() {
        let json = r#"{"name":"id","type":"Integer"}"#;
        let spec: ColumnSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.name, "id");
        assert_eq!(spec.type_name, "Integer");
        assert!(spec.length.is_none());
    }

    // =========================================================================
    // TableDescriptor Tests
    // =========================================================================

    fn descriptor(columns: Vec<ColumnDescriptor>) -> TableDescriptor {
        TableDescriptor {
            schema: "public".to_string(),
            name: "sensor".to_string(),
            columns,
        }
    }

    fn col(name: &str, data_type: &str, primary_key: bool) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            data_type: data_type.to_string(),
            max_length: None,
            primary_key,
        }
    }

    #[test]
    fn test_filter_column_prefers_primary_key() {
        let table = descriptor(vec![
            col("name", "text", false),
            col("id", "bigint", true),
        ]);

        assert_eq!(table.filter_column().unwrap().name, "id");
    }

    #[test]
    fn test_filter_column_falls_back_to_first_column() {
        let table = descriptor(vec![
            col("name", "text", false),
            col("value", "double precision", false),
        ]);

        assert_eq!(table.filter_column().unwrap().name, "name");
    }

    #[test]
    fn test_filter_column_none_for_empty_table() {
        let table = descriptor(vec![]);
        assert!(table.filter_column().is_none());
    }

    #[test]
    fn test_multiple_primary_keys_first_wins() {
        // Composite keys are unsupported; the first in column order is used
        let table = descriptor(vec![
            col("a", "bigint", false),
            col("b", "bigint", true),
            col("c", "bigint", true),
        ]);

        assert_eq!(table.primary_key_column().unwrap().name, "b");
        assert_eq!(table.filter_column().unwrap().name, "b");
    }

    #[test]
    fn test_table_structure_projection() {
        let table = descriptor(vec![
            col("id", "bigint", true),
            col("text", "character varying", false),
        ]);

        let structure = TableStructure::from(&table);
        assert_eq!(structure.table_name, "sensor");
        assert_eq!(structure.primary_key, Some("id".to_string()));
        assert_eq!(
            structure.columns.get("id").unwrap(),
            &serde_json::Value::String("Integer".to_string())
        );

        // Column order is preserved in the projection
        let keys: Vec<&String> = structure.columns.keys().collect();
        assert_eq!(keys, vec!["id", "text"]);
    }
}
