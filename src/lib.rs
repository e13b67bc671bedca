//! # ground-data-gateway
//!
//! A multi-tenant dynamic PostgreSQL data gateway.
//!
//! This crate exposes generic CRUD over a live PostgreSQL database with no
//! compile-time knowledge of table shapes. Schemas and tables are discovered
//! from the catalog at request time, and a per-principal access model keeps
//! tenants inside their own private schema plus a whitelisted set of public
//! schemas.
//!
//! ## Features
//!
//! - **Runtime Introspection**: schemas, tables, columns, and primary keys
//!   are read fresh from the live catalog on every call
//! - **Tenant Isolation**: one private schema per principal, named
//!   deterministically from its id; public schemas are whitelisted through a
//!   registry table
//! - **Generic CRUD**: select, filter, insert, and update against tables the
//!   gateway has never seen before, with values bound by catalog type
//! - **Dynamic Provisioning**: tenants create and drop their own tables from
//!   abstract column-type descriptors, idempotently
//! - **SQL Injection Prevention**: all identifiers are validated and quoted;
//!   all values are bound as parameters
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ground_data_gateway::{
//!     ColumnSpec, CreateTableRequest, Gateway, GatewayConfig, Principal,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig::builder("postgres://localhost/grounddb").build();
//!     let gateway = Gateway::new(config).await?;
//!
//!     let principal = Principal::new(7, "Student/Researcher");
//!     gateway.ensure_private_schema(&principal).await?;
//!     let schema = gateway.private_schema(&principal);
//!
//!     // Provision a table from abstract type descriptors
//!     let request = CreateTableRequest::new(
//!         "notes",
//!         vec![
//!             ColumnSpec::new("id", "Integer"),
//!             ColumnSpec::new("text", "String").with_length(256),
//!         ],
//!     )
//!     .with_primary_key("id");
//!     gateway.create_table(&principal, &schema, &request).await?;
//!
//!     // Insert and read back
//!     let row = serde_json::json!({"id": 1, "text": "hello"});
//!     let rows = vec![row.as_object().unwrap().clone()];
//!     gateway.write_rows(&principal, &schema, "notes", &rows).await?;
//!
//!     let found = gateway
//!         .read_rows(&principal, &schema, "notes", Some(&serde_json::json!(1)), None)
//!         .await?;
//!     println!("{:?}", found);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Access Model
//!
//! Read operations are permitted on the union of the registry-listed public
//! schemas and the caller's private schema. Mutating operations (insert,
//! update, create table, drop table) are confined to the caller's private
//! schema. A denied schema is reported as denied, never as not found.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod sql;
pub mod tenant;
pub mod types;

// Re-export main types for convenience
pub use catalog::CatalogReader;
pub use config::{GatewayConfig, GatewayConfigBuilder};
pub use engine::CrudEngine;
pub use error::{GatewayError, Result};
pub use gateway::Gateway;
pub use tenant::{AccessDecision, Principal, check_access, private_schema_for};
pub use types::{
    ColumnDescriptor, ColumnSpec, ColumnType, CreateTableOutcome, CreateTableRequest, Row,
    TableDescriptor, TableStructure,
};

// Re-export SQL utilities for advanced users
pub use sql::sanitize::{qualified_name, quote_identifier, validate_identifier};
