//! Tenant access policy
//!
//! Every principal owns exactly one private schema, named deterministically
//! from its id; public schemas are whitelisted through the registry table.
//! Access decisions are pure functions over the permitted-schema set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// An authenticated identity making requests
///
/// Supplied by the identity layer; validation of credentials is not this
/// crate's concern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    /// Unique, stable user id
    pub id: i64,
    /// Privilege tier, opaque to the gateway
    pub privilege: String,
}

impl Principal {
    /// Create a new principal
    pub fn new(id: i64, privilege: impl Into<String>) -> Self {
        Self {
            id,
            privilege: privilege.into(),
        }
    }
}

/// Result of a schema access check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied,
}

/// Name of the private schema owned by a principal
///
/// Pure: the mapping needs no lookup table and never changes for a given id.
pub fn private_schema_for(prefix: &str, principal_id: i64) -> String {
    format!("{}{}", prefix, principal_id)
}

/// Decide whether a schema is accessible given a permitted set
///
/// `Denied` maps to a forbidden outcome at the gateway surface, never to a
/// not-found one: callers learn that the schema is off-limits rather than
/// absent.
pub fn check_access(schema: &str, permitted: &BTreeSet<String>) -> AccessDecision {
    if permitted.contains(schema) {
        AccessDecision::Allowed
    } else {
        AccessDecision::Denied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permitted(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_private_schema_for_is_deterministic() {
        assert_eq!(private_schema_for("user_own_data_", 7), "user_own_data_7");
        assert_eq!(
            private_schema_for("user_own_data_", 7),
            private_schema_for("user_own_data_", 7)
        );
        assert_eq!(private_schema_for("tenant_", 42), "tenant_42");
    }

    #[test]
    fn test_private_schemas_are_distinct_per_principal() {
        assert_ne!(
            private_schema_for("user_own_data_", 1),
            private_schema_for("user_own_data_", 2)
        );
    }

    #[test]
    fn test_check_access_allowed() {
        let set = permitted(&["soil", "weather", "user_own_data_7"]);

        assert_eq!(check_access("soil", &set), AccessDecision::Allowed);
        assert_eq!(
            check_access("user_own_data_7", &set),
            AccessDecision::Allowed
        );
    }

    #[test]
    fn test_check_access_denied() {
        let set = permitted(&["soil", "weather"]);

        assert_eq!(check_access("account", &set), AccessDecision::Denied);
        assert_eq!(
            check_access("user_own_data_8", &set),
            AccessDecision::Denied
        );
    }

    #[test]
    fn test_check_access_empty_permitted_set() {
        let set = permitted(&[]);
        assert_eq!(check_access("anything", &set), AccessDecision::Denied);
    }

    #[test]
    fn test_check_access_is_exact_match() {
        let set = permitted(&["soil"]);

        assert_eq!(check_access("soil_data", &set), AccessDecision::Denied);
        assert_eq!(check_access("Soil", &set), AccessDecision::Denied);
    }

    #[test]
    fn test_principal_builder() {
        let p = Principal::new(7, "Free");
        assert_eq!(p.id, 7);
        assert_eq!(p.privilege, "Free");
    }
}
