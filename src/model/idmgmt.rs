//! Identifier registry.
//!
//! Tracks every identifier in the document. Explicit identifiers are saved
//! and never silently duplicated; missing identifiers are generated from a
//! structural base so that repeated elements get distinct, stable,
//! reproducible names across serialize/deserialize cycles.

use std::collections::BTreeSet;

use crate::error::{Result, ShellError};

#[derive(Debug, Default, Clone)]
pub struct IdRegistry {
    ids: BTreeSet<String>,
}

impl IdRegistry {
    pub fn new() -> Self {
        IdRegistry::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Register an author-assigned identifier. Duplicates are a semantic
    /// error; an existing object must be explicitly deleted first.
    pub fn save(&mut self, id: &str) -> Result<()> {
        if !self.ids.insert(id.to_string()) {
            return Err(ShellError::Semantic(format!(
                "identifier already in use: {}",
                id
            )));
        }
        tracing::debug!(id, "registered identifier");
        Ok(())
    }

    /// Generate and register an identifier from a structural base: the base
    /// itself if free, otherwise `base-0`, `base-1`, ...
    pub fn generate(&mut self, base: &str) -> String {
        if self.ids.insert(base.to_string()) {
            tracing::debug!(id = base, "generated identifier");
            return base.to_string();
        }
        let mut n = 0usize;
        loop {
            let candidate = format!("{}-{}", base, n);
            if self.ids.insert(candidate.clone()) {
                tracing::debug!(id = %candidate, "generated identifier");
                return candidate;
            }
            n += 1;
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.ids.remove(id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
