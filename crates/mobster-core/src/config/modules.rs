//! Feature module configuration.
//!
//! Only module bootstrap reads this section. The hook dispatcher itself is
//! configuration-free.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Settings shared by every feature module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModulesConfig {
    /// Whether modules without an explicit `enabled` flag are loaded.
    #[serde(default = "default_true")]
    pub enabled_by_default: bool,
    /// Per-module overrides keyed by module id.
    #[serde(default)]
    pub modules: HashMap<String, ModuleSettings>,
}

/// Overrides for a single module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleSettings {
    /// Explicit enable/disable flag. Falls back to `enabled_by_default`.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Added to every priority the module requests.
    #[serde(default)]
    pub priority_offset: i32,
    /// Module-specific options (fee percentages, markups, ...).
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ModulesConfig {
    /// Returns the settings for a module, if any were configured.
    pub fn settings(&self, module_id: &str) -> Option<&ModuleSettings> {
        self.modules.get(module_id)
    }

    /// Returns whether the given module should be bootstrapped.
    pub fn is_enabled(&self, module_id: &str) -> bool {
        self.settings(module_id)
            .and_then(|s| s.enabled)
            .unwrap_or(self.enabled_by_default)
    }

    /// Returns the priority offset for a module (0 if unset).
    pub fn priority_offset(&self, module_id: &str) -> i32 {
        self.settings(module_id)
            .map(|s| s.priority_offset)
            .unwrap_or(0)
    }

    /// Reads a module-specific integer option.
    pub fn setting_i64(&self, module_id: &str, key: &str) -> Option<i64> {
        self.settings(module_id)
            .and_then(|s| s.extra.get(key))
            .and_then(|v| v.as_i64())
    }

    /// Sets the enabled flag for a module, creating its entry if needed.
    pub fn set_enabled(&mut self, module_id: &str, enabled: bool) {
        self.modules
            .entry(module_id.to_string())
            .or_default()
            .enabled = Some(enabled);
    }
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            enabled_by_default: true,
            modules: HashMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_module_follows_default() {
        let mut config = ModulesConfig::default();
        assert!(config.is_enabled("casino"));
        config.enabled_by_default = false;
        assert!(!config.is_enabled("casino"));
    }

    #[test]
    fn test_set_enabled_overrides_default() {
        let mut config = ModulesConfig::default();
        config.set_enabled("jail", false);
        assert!(!config.is_enabled("jail"));
        assert_eq!(config.priority_offset("jail"), 0);
        assert_eq!(config.setting_i64("jail", "bail"), None);
    }
}
