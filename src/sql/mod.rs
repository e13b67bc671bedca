//! SQL utilities for the gateway
//!
//! Provides identifier sanitization and DDL generation.

pub mod ddl;
pub mod sanitize;

pub use ddl::{create_schema_sql, create_table_sql, drop_table_sql};
pub use sanitize::{POSTGRES_RESERVED_WORDS, qualified_name, quote_identifier, validate_identifier};
