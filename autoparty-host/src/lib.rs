//! Auto Party Host Contract
//!
//! The services a client host provides to its plugins: typed client events,
//! a key/value configuration store with a declarative settings schema, a chat
//! message queue, a plugin registry, the party service seam, and a serial
//! event dispatcher wiring them together.

pub mod chat;
pub mod config;
pub mod events;
pub mod host;
pub mod party;
pub mod plugins;

pub use chat::{ChatColor, ChatMessageBuilder, ChatMessageQueue, ChatMessageType, QueuedMessage};
pub use config::{ConfigError, ConfigGroup, ConfigItem, ConfigStore};
pub use events::{ClientEvent, GameState};
pub use host::{Host, PluginContext};
pub use party::PartyService;
pub use plugins::{Plugin, PluginDescriptor, PluginRegistry};
