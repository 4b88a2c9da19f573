//! Plugin contract and registry

use std::collections::BTreeMap;

use crate::config::ConfigGroup;
use crate::events::ClientEvent;
use crate::host::PluginContext;

// =============================================================================
// Plugin Contract
// =============================================================================

/// Static metadata describing a plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginDescriptor {
    /// Registry name, unique per plugin
    pub name: &'static str,

    /// One-line description for the plugin list
    pub description: &'static str,

    /// Search tags
    pub tags: &'static [&'static str],
}

/// A client plugin
///
/// The host calls the lifecycle hooks and delivers every [`ClientEvent`]
/// serially on its dispatch thread. Implementations hold no locks and do no
/// threading of their own.
pub trait Plugin {
    /// Metadata shown in the plugin list
    fn descriptor(&self) -> &PluginDescriptor;

    /// Settings this plugin persists, if any
    fn config_schema(&self) -> Option<&'static ConfigGroup> {
        None
    }

    /// Called when the plugin becomes active
    fn start_up(&mut self, _ctx: &mut PluginContext<'_>) {}

    /// Called when the plugin is deactivated
    fn shut_down(&mut self, _ctx: &mut PluginContext<'_>) {}

    /// Called for every client event while the plugin is enabled
    fn on_event(&mut self, ctx: &mut PluginContext<'_>, event: &ClientEvent);
}

// =============================================================================
// Registry
// =============================================================================

/// Enable/disable state for registered plugins
///
/// Only registered names can change state; unknown names always read as
/// disabled.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    entries: BTreeMap<String, bool>,
}

impl PluginRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin name, enabled
    pub fn register(&mut self, name: &str) {
        self.entries.insert(name.to_string(), true);
    }

    /// Whether a plugin is registered and enabled
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.entries.get(name).copied().unwrap_or(false)
    }

    /// Set a plugin's enable state
    ///
    /// Returns true if the state actually changed; unknown names are ignored.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) if *entry != enabled => {
                *entry = enabled;
                true
            }
            _ => false,
        }
    }

    /// Registered plugin names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

// =============================================================================
// Tests
// =============================================================================
