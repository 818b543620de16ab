//! Schema oracle.
//!
//! The schema describing which parameter names are legal for which resource
//! agent types is external to the engine; the parser consumes it only as a
//! name-normalization and validation oracle. The query is pure and
//! side-effect-free.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

/// External source of truth for legal parameter names per agent type.
pub trait Schema {
    /// Is `name` a known parameter of agent `agent_type`?
    ///
    /// `agent_type` is the bare type portion of the agent spec (`Xen` for
    /// `ocf:heartbeat:Xen`).
    fn is_known_parameter(&self, agent_type: &str, name: &str) -> bool;
}

/// A schema backed by a static table. The built-in default covers the agents
/// the shell is commonly pointed at; tests build their own tables.
#[derive(Debug, Default, Clone)]
pub struct StaticSchema {
    params: HashMap<String, HashSet<String>>,
}

impl StaticSchema {
    pub fn new() -> Self {
        StaticSchema::default()
    }

    /// Build a schema from `(agent_type, [param, ...])` entries.
    pub fn with_entries(entries: &[(&str, &[&str])]) -> Self {
        let mut params: HashMap<String, HashSet<String>> = HashMap::new();
        for (agent, names) in entries {
            let set = params.entry((*agent).to_string()).or_default();
            for name in *names {
                set.insert((*name).to_string());
            }
        }
        StaticSchema { params }
    }
}

impl Schema for StaticSchema {
    fn is_known_parameter(&self, agent_type: &str, name: &str) -> bool {
        self.params
            .get(agent_type)
            .map(|set| set.contains(name))
            .unwrap_or(false)
    }
}

/// A schema that recognizes nothing; parameter names pass through verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSchema;

impl Schema for NullSchema {
    fn is_known_parameter(&self, _agent_type: &str, _name: &str) -> bool {
        false
    }
}

static DEFAULT_SCHEMA: Lazy<StaticSchema> = Lazy::new(|| {
    StaticSchema::with_entries(&[
        (
            "Xen",
            &[
                "xmfile",
                "name",
                "shutdown_timeout",
                "allow_mem_management",
                "node_ip_attribute",
            ],
        ),
        ("Dummy", &["state", "fake"]),
        ("IPaddr2", &["ip", "nic", "cidr_netmask", "broadcast"]),
        ("Filesystem", &["device", "directory", "fstype", "options"]),
        ("apache", &["configfile", "httpd", "port", "statusurl"]),
    ])
});

/// The built-in parameter table.
pub fn default_schema() -> &'static StaticSchema {
    &DEFAULT_SCHEMA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_schema_lookup() {
        let schema = StaticSchema::with_entries(&[("Xen", &["shutdown_timeout"])]);
        assert!(schema.is_known_parameter("Xen", "shutdown_timeout"));
        assert!(!schema.is_known_parameter("Xen", "shutdown-timeout"));
        assert!(!schema.is_known_parameter("Dummy", "shutdown_timeout"));
    }

    #[test]
    fn test_null_schema_knows_nothing() {
        assert!(!NullSchema.is_known_parameter("Xen", "shutdown_timeout"));
    }

    #[test]
    fn test_default_schema_has_xen() {
        assert!(default_schema().is_known_parameter("Xen", "shutdown_timeout"));
    }
}
