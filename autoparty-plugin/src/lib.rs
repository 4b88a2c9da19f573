//! Auto Party Plugin
//!
//! Automatically rejoins the last-used party when the user logs in. The
//! peer party plugin caches the id of the last party it joined; this plugin
//! tracks whether the user was still in a party through a persisted flag and,
//! on the first login of a run, asks the party service to switch back to the
//! cached id.

pub mod config;
pub mod plugin;

pub use plugin::{AutoPartyPlugin, PARTY_PLUGIN, PLUGIN_NAME};
