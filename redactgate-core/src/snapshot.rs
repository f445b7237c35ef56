//! Shared, swappable holder for the current rule snapshot.
//!
//! Requests call [`RuleStore::snapshot`] once and keep the returned `Arc` for their whole
//! lifetime, so the input and output filters of one request always see the same rules.
//! Administration replaces the snapshot wholesale; in-flight requests are unaffected.

use anyhow::{Context, Result};
use log::info;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::config::RuleConfig;
use crate::sanitizers::compiler::{compile_rules, RuleSnapshot};
use crate::validators::ValidatorRegistry;

#[derive(Debug)]
pub struct RuleStore {
    current: RwLock<Arc<RuleSnapshot>>,
    registry: ValidatorRegistry,
    generation: AtomicU64,
}

impl RuleStore {
    /// Compiles `config` against the built-in validators.
    pub fn new(config: &RuleConfig) -> Result<Self> {
        Self::with_registry(config, ValidatorRegistry::with_builtins())
    }

    pub fn with_registry(config: &RuleConfig, registry: ValidatorRegistry) -> Result<Self> {
        let mut snapshot = compile_rules(config, &registry).context("Failed to compile initial rule set")?;
        snapshot.generation = 1;
        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
            registry,
            generation: AtomicU64::new(1),
        })
    }

    /// The snapshot to use for one request.
    pub fn snapshot(&self) -> Arc<RuleSnapshot> {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Compiles `config` and makes it current. On error the previous snapshot stays in place.
    ///
    /// Compilation happens before the write lock is taken.
    pub fn replace(&self, config: &RuleConfig) -> Result<Arc<RuleSnapshot>> {
        let mut snapshot = compile_rules(config, &self.registry).context("Failed to compile replacement rule set")?;
        snapshot.generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Arc::new(snapshot);

        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::clone(&snapshot);
        drop(guard);

        info!(
            "Rule snapshot replaced: generation {} with {} rules.",
            snapshot.generation,
            snapshot.len()
        );
        Ok(snapshot)
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectionRule;

    fn config_with(pattern: &str) -> RuleConfig {
        RuleConfig {
            rules: vec![DetectionRule {
                name: "r".to_string(),
                pattern: Some(pattern.to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn held_snapshot_survives_replacement() {
        let store = RuleStore::new(&config_with("old")).unwrap();
        let held = store.snapshot();
        store.replace(&config_with("new")).unwrap();

        assert_eq!(held.rules[0].regex.as_str(), "old");
        assert_eq!(store.snapshot().rules[0].regex.as_str(), "new");
        assert_eq!(store.snapshot().generation, held.generation + 1);
    }

    #[test]
    fn failed_replacement_keeps_previous_rules() {
        let store = RuleStore::new(&config_with("ok")).unwrap();
        assert!(store.replace(&config_with("(unclosed")).is_err());
        assert_eq!(store.snapshot().rules[0].regex.as_str(), "ok");
    }
}
