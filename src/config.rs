//! Configuration for the gateway
//!
//! Provides a builder pattern for configuring the data gateway.

/// Configuration for the data gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// PostgreSQL database URL
    pub database_url: String,
    /// Schema holding the public-schema registry table (default: "public")
    pub registry_schema: String,
    /// Name of the registry table listing publicly browsable schemas
    /// (default: "ground_data_schema_dictionary")
    pub registry_table: String,
    /// Prefix for per-principal private schema names
    /// (default: "user_own_data_")
    pub private_schema_prefix: String,
    /// Maximum number of pooled connections (default: 5)
    pub max_connections: u32,
}

impl GatewayConfig {
    /// Create a new configuration builder
    pub fn builder(database_url: impl Into<String>) -> GatewayConfigBuilder {
        GatewayConfigBuilder::new(database_url)
    }
}

/// Builder for GatewayConfig
#[derive(Debug)]
pub struct GatewayConfigBuilder {
    database_url: String,
    registry_schema: String,
    registry_table: String,
    private_schema_prefix: String,
    max_connections: u32,
}

impl GatewayConfigBuilder {
    /// Create a new builder with the database URL
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            registry_schema: "public".to_string(),
            registry_table: "ground_data_schema_dictionary".to_string(),
            private_schema_prefix: "user_own_data_".to_string(),
            max_connections: 5,
        }
    }

    /// Set the schema holding the registry table (default: "public")
    pub fn registry_schema(mut self, name: impl Into<String>) -> Self {
        self.registry_schema = name.into();
        self
    }

    /// Set the registry table name (default: "ground_data_schema_dictionary")
    pub fn registry_table(mut self, name: impl Into<String>) -> Self {
        self.registry_table = name.into();
        self
    }

    /// Set the private schema prefix (default: "user_own_data_")
    pub fn private_schema_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.private_schema_prefix = prefix.into();
        self
    }

    /// Set the maximum number of pooled connections (default: 5)
    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    /// Build the configuration
    pub fn build(self) -> GatewayConfig {
        GatewayConfig {
            database_url: self.database_url,
            registry_schema: self.registry_schema,
            registry_table: self.registry_table,
            private_schema_prefix: self.private_schema_prefix,
            max_connections: self.max_connections,
        }
    }
}
