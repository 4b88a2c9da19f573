//! Serial event dispatch harness
//!
//! Owns the host services and the registered plugins, and delivers every
//! event to each enabled plugin in registration order, on the caller's
//! thread. Register a plugin's dependencies before the plugin itself:
//! start-up hooks may consult the registry.

use crate::chat::{ChatMessageQueue, QueuedMessage};
use crate::config::{ConfigGroup, ConfigStore};
use crate::events::ClientEvent;
use crate::party::PartyService;
use crate::plugins::{Plugin, PluginRegistry};

// =============================================================================
// Plugin Context
// =============================================================================

/// Borrowed view of the host services handed to every plugin call
pub struct PluginContext<'a> {
    /// Party subsystem: membership query and rejoin dispatch
    pub party: &'a dyn PartyService,

    /// Shared configuration store
    pub config: &'a mut ConfigStore,

    /// Plugin enable/disable state
    pub registry: &'a mut PluginRegistry,

    /// Outbound chat messages
    pub chat: &'a mut ChatMessageQueue,
}

// =============================================================================
// Host
// =============================================================================

/// Event dispatch harness wiring plugins to the host services
pub struct Host {
    config: ConfigStore,
    registry: PluginRegistry,
    chat: ChatMessageQueue,
    party: Box<dyn PartyService>,
    plugins: Vec<Box<dyn Plugin>>,
    schemas: Vec<&'static ConfigGroup>,
}

impl Host {
    /// Create a host around a config store and a party service
    #[must_use]
    pub fn new(config: ConfigStore, party: Box<dyn PartyService>) -> Self {
        Self {
            config,
            registry: PluginRegistry::new(),
            chat: ChatMessageQueue::new(),
            party,
            plugins: Vec::new(),
            schemas: Vec::new(),
        }
    }

    /// Register a plugin, enabled, and run its start-up hook
    ///
    /// A plugin that disables itself during start-up has its shut-down hook
    /// run immediately, so the hook pair stays balanced on every path.
    pub fn register(&mut self, mut plugin: Box<dyn Plugin>) {
        let name = plugin.descriptor().name;
        self.registry.register(name);
        if let Some(schema) = plugin.config_schema() {
            self.schemas.push(schema);
        }

        let mut ctx = PluginContext {
            party: self.party.as_ref(),
            config: &mut self.config,
            registry: &mut self.registry,
            chat: &mut self.chat,
        };
        plugin.start_up(&mut ctx);

        if !self.registry.is_enabled(name) {
            log::debug!("plugin {} disabled itself during start-up", name);
            let mut ctx = PluginContext {
                party: self.party.as_ref(),
                config: &mut self.config,
                registry: &mut self.registry,
                chat: &mut self.chat,
            };
            plugin.shut_down(&mut ctx);
        }

        self.plugins.push(plugin);
    }

    /// Deliver an event to every enabled plugin, in registration order
    ///
    /// Enable state is read at delivery time, so a plugin disabled earlier in
    /// the same dispatch does not receive the event. Plugins whose enable
    /// state changed during the dispatch get the matching lifecycle hook
    /// afterwards.
    pub fn dispatch(&mut self, event: ClientEvent) {
        let enabled_before = self.enabled_snapshot();

        for plugin in &mut self.plugins {
            let name = plugin.descriptor().name;
            if !self.registry.is_enabled(name) {
                continue;
            }
            let mut ctx = PluginContext {
                party: self.party.as_ref(),
                config: &mut self.config,
                registry: &mut self.registry,
                chat: &mut self.chat,
            };
            plugin.on_event(&mut ctx, &event);
        }

        self.run_state_transitions(&enabled_before);
    }

    /// Enable or disable a plugin, running its lifecycle hook and notifying
    /// the other plugins with a [`ClientEvent::PluginChanged`]
    pub fn set_plugin_enabled(&mut self, name: &str, enabled: bool) {
        if !self.registry.set_enabled(name, enabled) {
            return;
        }
        log::debug!(
            "plugin {} {}",
            name,
            if enabled { "enabled" } else { "disabled" }
        );

        for plugin in &mut self.plugins {
            if plugin.descriptor().name != name {
                continue;
            }
            if enabled {
                {
                    let mut ctx = PluginContext {
                        party: self.party.as_ref(),
                        config: &mut self.config,
                        registry: &mut self.registry,
                        chat: &mut self.chat,
                    };
                    plugin.start_up(&mut ctx);
                }
                // Start-up may have refused activation
                if !self.registry.is_enabled(name) {
                    let mut ctx = PluginContext {
                        party: self.party.as_ref(),
                        config: &mut self.config,
                        registry: &mut self.registry,
                        chat: &mut self.chat,
                    };
                    plugin.shut_down(&mut ctx);
                }
            } else {
                let mut ctx = PluginContext {
                    party: self.party.as_ref(),
                    config: &mut self.config,
                    registry: &mut self.registry,
                    chat: &mut self.chat,
                };
                plugin.shut_down(&mut ctx);
            }
            break;
        }

        self.dispatch(ClientEvent::PluginChanged {
            name: name.to_string(),
            enabled,
        });
    }

    /// Persist the config store on client exit
    ///
    /// Plugins are not deactivated here: their shut-down hooks run only when
    /// a plugin is disabled, so persisted plugin state survives restarts.
    pub fn shutdown(&mut self) {
        if let Err(e) = self.config.save() {
            log::warn!("failed to save config: {}", e);
        }
    }

    /// Whether a plugin is currently enabled
    #[must_use]
    pub fn is_plugin_enabled(&self, name: &str) -> bool {
        self.registry.is_enabled(name)
    }

    /// The configuration store
    #[must_use]
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// The configuration store, mutable
    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    /// Settings schemas of the registered plugins, for the settings UI
    #[must_use]
    pub fn settings_groups(&self) -> &[&'static ConfigGroup] {
        &self.schemas
    }

    /// Take all queued chat messages, oldest first
    pub fn drain_chat(&mut self) -> Vec<QueuedMessage> {
        self.chat.drain()
    }

    /// Enable state of each registered plugin, in registration order
    fn enabled_snapshot(&self) -> Vec<bool> {
        self.plugins
            .iter()
            .map(|plugin| self.registry.is_enabled(plugin.descriptor().name))
            .collect()
    }

    /// Run lifecycle hooks for enable-state changes made during a dispatch
    fn run_state_transitions(&mut self, enabled_before: &[bool]) {
        for (index, plugin) in self.plugins.iter_mut().enumerate() {
            let name = plugin.descriptor().name;
            let enabled = self.registry.is_enabled(name);
            if enabled == enabled_before[index] {
                continue;
            }
            log::debug!(
                "plugin {} {} during dispatch",
                name,
                if enabled { "enabled" } else { "disabled" }
            );
            let mut ctx = PluginContext {
                party: self.party.as_ref(),
                config: &mut self.config,
                registry: &mut self.registry,
                chat: &mut self.chat,
            };
            if enabled {
                plugin.start_up(&mut ctx);
            } else {
                plugin.shut_down(&mut ctx);
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
