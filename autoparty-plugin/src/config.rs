//! Persisted Auto Party settings
//!
//! Two booleans stored in the shared config store under the `autoparty`
//! group: `showPassphrase` is a user-facing toggle, `joinedParty` is internal
//! bookkeeping hidden from the settings UI. Keys are stable; they name
//! entries in the durable store.

use autoparty_host::{ConfigGroup, ConfigItem, ConfigStore};

/// Config group owned by this plugin
pub const CONFIG_GROUP: &str = "autoparty";

/// Key for the passphrase visibility toggle
pub const SHOW_PASSPHRASE_KEY: &str = "showPassphrase";

/// Key for the membership tracking flag
pub const JOINED_PARTY_KEY: &str = "joinedParty";

/// Settings schema registered with the host settings UI
pub static AUTO_PARTY_SCHEMA: ConfigGroup = ConfigGroup {
    group: CONFIG_GROUP,
    items: &[
        ConfigItem {
            key: SHOW_PASSPHRASE_KEY,
            label: "Show passphrase on login",
            description: "Shows the party passphrase in the chat when the user logs in.",
            hidden: false,
        },
        ConfigItem {
            key: JOINED_PARTY_KEY,
            label: "Joined party",
            description: "Whether the user joined a party while the plugin was enabled.",
            hidden: true,
        },
    ],
};

/// Whether rejoin notifications should include the raw passphrase
#[must_use]
pub fn show_passphrase(config: &ConfigStore) -> bool {
    config.get_bool(CONFIG_GROUP, SHOW_PASSPHRASE_KEY)
}

/// Whether the user is believed to be in a party
#[must_use]
pub fn joined_party(config: &ConfigStore) -> bool {
    config.get_bool(CONFIG_GROUP, JOINED_PARTY_KEY)
}

/// Record whether the user is currently in a party
pub fn set_joined_party(config: &mut ConfigStore, joined: bool) {
    config.set_bool(CONFIG_GROUP, JOINED_PARTY_KEY, joined);
}

// =============================================================================
// Tests
// =============================================================================
