//! Rejoin controller
//!
//! Waits for the logged-in state, then rejoins the previously used party at
//! most once per run. Membership is tracked through the persisted
//! `joinedParty` flag so an explicit leave suppresses future auto-rejoins,
//! and the peer party plugin is checked before every attempt since the
//! rejoin request goes through its subsystem.

use autoparty_host::{
    ChatColor, ChatMessageBuilder, ChatMessageType, ClientEvent, ConfigGroup, GameState, Plugin,
    PluginContext, PluginDescriptor,
};

use crate::config;

/// Registry name of this plugin
pub const PLUGIN_NAME: &str = "Auto Party";

/// Registry name of the peer party plugin this plugin depends on
pub const PARTY_PLUGIN: &str = "Party";

/// Config group of the peer party plugin
const PARTY_CONFIG_GROUP: &str = "party";

/// Key under which the party plugin caches the last-used party id
const PARTY_PREVIOUS_ID_KEY: &str = "previousPartyId";

static DESCRIPTOR: PluginDescriptor = PluginDescriptor {
    name: PLUGIN_NAME,
    description: "Automatically rejoins the last party upon login.",
    tags: &["party", "automatic", "rejoin", "group"],
};

/// Auto Party rejoin controller
#[derive(Debug, Default)]
pub struct AutoPartyPlugin {
    /// Latch: at most one automatic rejoin per run; never persisted
    attempted_rejoin: bool,
}

impl AutoPartyPlugin {
    /// Create a controller that has not yet attempted a rejoin
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the peer party plugin is currently enabled
    fn party_plugin_enabled(ctx: &PluginContext<'_>) -> bool {
        ctx.registry.is_enabled(PARTY_PLUGIN)
    }

    /// Last-used party id cached by the peer party plugin, if any
    fn last_party_id(ctx: &PluginContext<'_>) -> Option<String> {
        ctx.config
            .get(PARTY_CONFIG_GROUP, PARTY_PREVIOUS_ID_KEY)
            .map(str::to_owned)
    }

    /// Attempt the rejoin once the player reaches the logged-in state
    fn handle_game_state(&mut self, ctx: &mut PluginContext<'_>, state: GameState) {
        if state != GameState::LoggedIn {
            return;
        }

        if ctx.party.is_in_party() || self.attempted_rejoin || !config::joined_party(ctx.config) {
            return;
        }

        if !Self::party_plugin_enabled(ctx) {
            log::debug!("party plugin is not enabled, cannot rejoin party");
            return;
        }

        let Some(party_id) = Self::last_party_id(ctx) else {
            // No known prior party; nothing to rejoin until the user joins one
            config::set_joined_party(ctx.config, false);
            return;
        };

        // Fire-and-forget: the party service dispatches the switch on its own
        // thread and the outcome is never reported back
        ctx.party.change_party(&party_id);
        log::debug!("attempting to rejoin last used party: {}", party_id);
        Self::send_rejoined_message(ctx, &party_id);
        self.attempted_rejoin = true;
    }

    /// Track joins and explicit leaves in the persisted membership flag
    fn handle_party_changed(&mut self, ctx: &mut PluginContext<'_>, party_id: Option<&str>) {
        if party_id.is_some() {
            // Joined or created a party; eligible for auto-rejoin next run
            config::set_joined_party(ctx.config, true);
        } else if !ctx.party.is_in_party() {
            config::set_joined_party(ctx.config, false);
            log::debug!("user left the party, will not auto-rejoin next login");
        }
        // A missing id while the host still reports membership is transient
    }

    /// Dependency health check: this plugin is useless without the peer
    fn handle_plugin_changed(&mut self, ctx: &mut PluginContext<'_>, name: &str, enabled: bool) {
        if name == PARTY_PLUGIN && !enabled && ctx.registry.is_enabled(PLUGIN_NAME) {
            log::info!("party plugin was disabled, disabling auto party");
            ctx.registry.set_enabled(PLUGIN_NAME, false);
        }
    }

    /// Queue the one-line rejoin notification, with the passphrase appended
    /// when the user opted in
    fn send_rejoined_message(ctx: &mut PluginContext<'_>, party_id: &str) {
        let mut builder = ChatMessageBuilder::new()
            .append(ChatColor::Highlight, "Auto Party: Last party rejoined.");

        if config::show_passphrase(ctx.config) {
            builder = builder
                .append(ChatColor::Normal, "\n")
                .append(ChatColor::Highlight, format!("Passphrase: {}", party_id));
        }

        ctx.chat.queue(ChatMessageType::Console, builder.build());
    }
}

impl Plugin for AutoPartyPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &DESCRIPTOR
    }

    fn config_schema(&self) -> Option<&'static ConfigGroup> {
        Some(&config::AUTO_PARTY_SCHEMA)
    }

    fn start_up(&mut self, ctx: &mut PluginContext<'_>) {
        log::debug!("auto party started");
        if !Self::party_plugin_enabled(ctx) {
            log::info!("party plugin is not enabled, disabling auto party");
            ctx.registry.set_enabled(PLUGIN_NAME, false);
        }
    }

    fn shut_down(&mut self, ctx: &mut PluginContext<'_>) {
        // Membership cannot be tracked while inactive; never auto-rejoin
        // from a stale flag on the next activation
        config::set_joined_party(ctx.config, false);
        log::debug!("auto party stopped");
    }

    fn on_event(&mut self, ctx: &mut PluginContext<'_>, event: &ClientEvent) {
        match event {
            ClientEvent::GameStateChanged { state } => self.handle_game_state(ctx, *state),
            ClientEvent::PartyChanged { party_id } => {
                self.handle_party_changed(ctx, party_id.as_deref());
            }
            ClientEvent::PluginChanged { name, enabled } => {
                self.handle_plugin_changed(ctx, name, *enabled);
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use autoparty_host::{ChatMessageQueue, ConfigStore, PartyService, PluginRegistry};

    use super::*;
    use crate::config::{CONFIG_GROUP, SHOW_PASSPHRASE_KEY};

    #[derive(Default)]
    struct FakePartyService {
        in_party: Cell<bool>,
        requests: RefCell<Vec<String>>,
    }

    impl PartyService for FakePartyService {
        fn is_in_party(&self) -> bool {
            self.in_party.get()
        }

        fn change_party(&self, party_id: &str) {
            self.requests.borrow_mut().push(party_id.to_string());
        }
    }

    struct Harness {
        party: FakePartyService,
        config: ConfigStore,
        registry: PluginRegistry,
        chat: ChatMessageQueue,
    }

    impl Harness {
        /// Both plugins registered and enabled, empty config store
        fn new() -> Self {
            let mut registry = PluginRegistry::new();
            registry.register(PARTY_PLUGIN);
            registry.register(PLUGIN_NAME);

            Self {
                party: FakePartyService::default(),
                config: ConfigStore::in_memory(),
                registry,
                chat: ChatMessageQueue::new(),
            }
        }

        /// Eligible for rejoin: joined flag set and a cached party id
        fn rejoin_ready(id: &str) -> Self {
            let mut harness = Self::new();
            config::set_joined_party(&mut harness.config, true);
            harness
                .config
                .set(PARTY_CONFIG_GROUP, PARTY_PREVIOUS_ID_KEY, id);
            harness
        }

        fn ctx(&mut self) -> PluginContext<'_> {
            PluginContext {
                party: &self.party,
                config: &mut self.config,
                registry: &mut self.registry,
                chat: &mut self.chat,
            }
        }

        fn requests(&self) -> Vec<String> {
            self.party.requests.borrow().clone()
        }
    }

    fn login(plugin: &mut AutoPartyPlugin, harness: &mut Harness) {
        plugin.on_event(
            &mut harness.ctx(),
            &ClientEvent::GameStateChanged {
                state: GameState::LoggedIn,
            },
        );
    }

    fn party_changed(plugin: &mut AutoPartyPlugin, harness: &mut Harness, id: Option<&str>) {
        plugin.on_event(
            &mut harness.ctx(),
            &ClientEvent::PartyChanged {
                party_id: id.map(str::to_owned),
            },
        );
    }

    #[test]
    fn test_descriptor() {
        let plugin = AutoPartyPlugin::new();
        assert_eq!(plugin.descriptor().name, "Auto Party");
        assert!(plugin.descriptor().tags.contains(&"rejoin"));
        assert_eq!(
            plugin.config_schema().map(|schema| schema.group),
            Some("autoparty")
        );
    }

    #[test]
    fn test_no_rejoin_when_never_joined() {
        let mut harness = Harness::new();
        harness
            .config
            .set(PARTY_CONFIG_GROUP, PARTY_PREVIOUS_ID_KEY, "party-42");
        let mut plugin = AutoPartyPlugin::new();

        login(&mut plugin, &mut harness);
        login(&mut plugin, &mut harness);

        assert!(harness.requests().is_empty());
        assert!(harness.chat.is_empty());
    }

    #[test]
    fn test_rejoins_last_party() {
        let mut harness = Harness::rejoin_ready("party-42");
        let mut plugin = AutoPartyPlugin::new();

        login(&mut plugin, &mut harness);

        assert_eq!(harness.requests(), vec!["party-42"]);
        assert_eq!(harness.chat.len(), 1);
    }

    #[test]
    fn test_rejoins_at_most_once_per_run() {
        let mut harness = Harness::rejoin_ready("party-42");
        let mut plugin = AutoPartyPlugin::new();

        login(&mut plugin, &mut harness);
        assert_eq!(harness.requests().len(), 1);

        // Membership changes in between do not re-arm the latch
        harness.party.in_party.set(true);
        party_changed(&mut plugin, &mut harness, Some("party-42"));
        harness.party.in_party.set(false);
        party_changed(&mut plugin, &mut harness, None);
        party_changed(&mut plugin, &mut harness, Some("party-43"));

        login(&mut plugin, &mut harness);
        login(&mut plugin, &mut harness);

        assert_eq!(harness.requests().len(), 1);
    }

    #[test]
    fn test_fresh_controller_rejoins_again() {
        let mut harness = Harness::rejoin_ready("party-42");
        let mut plugin = AutoPartyPlugin::new();
        login(&mut plugin, &mut harness);

        // A new controller models a client restart: the latch is not persisted
        let mut restarted = AutoPartyPlugin::new();
        login(&mut restarted, &mut harness);

        assert_eq!(harness.requests().len(), 2);
    }

    #[test]
    fn test_membership_tracking() {
        let mut harness = Harness::new();
        let mut plugin = AutoPartyPlugin::new();

        party_changed(&mut plugin, &mut harness, Some("abc"));
        assert!(config::joined_party(&harness.config));

        harness.party.in_party.set(false);
        party_changed(&mut plugin, &mut harness, None);
        assert!(!config::joined_party(&harness.config));
    }

    #[test]
    fn test_membership_null_while_still_in_party_ignored() {
        let mut harness = Harness::new();
        let mut plugin = AutoPartyPlugin::new();

        party_changed(&mut plugin, &mut harness, Some("abc"));
        harness.party.in_party.set(true);
        party_changed(&mut plugin, &mut harness, None);

        assert!(config::joined_party(&harness.config));
    }

    #[test]
    fn test_shut_down_resets_joined_party() {
        let mut harness = Harness::new();
        config::set_joined_party(&mut harness.config, true);
        let mut plugin = AutoPartyPlugin::new();

        plugin.shut_down(&mut harness.ctx());

        assert!(!config::joined_party(&harness.config));
    }

    #[test]
    fn test_peer_disabled_skips_rejoin_without_latching() {
        let mut harness = Harness::rejoin_ready("party-42");
        harness.registry.set_enabled(PARTY_PLUGIN, false);
        let mut plugin = AutoPartyPlugin::new();

        login(&mut plugin, &mut harness);

        assert!(harness.requests().is_empty());
        assert!(harness.chat.is_empty());
        assert!(config::joined_party(&harness.config));

        // The latch was not set, so the rejoin happens once the peer is back
        harness.registry.set_enabled(PARTY_PLUGIN, true);
        login(&mut plugin, &mut harness);

        assert_eq!(harness.requests(), vec!["party-42"]);
    }

    #[test]
    fn test_missing_stored_id_resets_flag_without_latching() {
        let mut harness = Harness::new();
        config::set_joined_party(&mut harness.config, true);
        let mut plugin = AutoPartyPlugin::new();

        login(&mut plugin, &mut harness);

        assert!(harness.requests().is_empty());
        assert!(harness.chat.is_empty());
        assert!(!config::joined_party(&harness.config));

        // Once the peer has cached an id again, the rejoin still happens
        config::set_joined_party(&mut harness.config, true);
        harness
            .config
            .set(PARTY_CONFIG_GROUP, PARTY_PREVIOUS_ID_KEY, "party-42");
        login(&mut plugin, &mut harness);

        assert_eq!(harness.requests(), vec!["party-42"]);
    }

    #[test]
    fn test_no_rejoin_while_already_in_party() {
        let mut harness = Harness::rejoin_ready("party-42");
        harness.party.in_party.set(true);
        let mut plugin = AutoPartyPlugin::new();

        login(&mut plugin, &mut harness);

        assert!(harness.requests().is_empty());
    }

    #[test]
    fn test_only_logged_in_state_triggers() {
        let mut harness = Harness::rejoin_ready("party-42");
        let mut plugin = AutoPartyPlugin::new();

        for state in [
            GameState::LoginScreen,
            GameState::LoggingIn,
            GameState::Loading,
            GameState::Hopping,
            GameState::ConnectionLost,
        ] {
            plugin.on_event(
                &mut harness.ctx(),
                &ClientEvent::GameStateChanged { state },
            );
        }

        assert!(harness.requests().is_empty());
        assert!(harness.chat.is_empty());
    }

    #[test]
    fn test_rejoin_message_with_passphrase() {
        let mut harness = Harness::rejoin_ready("party-42");
        harness.config.set(CONFIG_GROUP, SHOW_PASSPHRASE_KEY, "true");
        let mut plugin = AutoPartyPlugin::new();

        login(&mut plugin, &mut harness);

        let messages: Vec<_> = harness.chat.drain();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_type, ChatMessageType::Console);
        assert!(messages[0].message.contains("Last party rejoined."));
        assert!(messages[0].message.contains("Passphrase: party-42"));
    }

    #[test]
    fn test_rejoin_message_without_passphrase() {
        let mut harness = Harness::rejoin_ready("party-42");
        let mut plugin = AutoPartyPlugin::new();

        login(&mut plugin, &mut harness);

        let messages: Vec<_> = harness.chat.drain();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].message.contains("Last party rejoined."));
        assert!(!messages[0].message.contains("Passphrase:"));
    }

    #[test]
    fn test_start_up_disables_self_without_peer() {
        let mut harness = Harness::new();
        harness.registry.set_enabled(PARTY_PLUGIN, false);
        let mut plugin = AutoPartyPlugin::new();

        plugin.start_up(&mut harness.ctx());

        assert!(!harness.registry.is_enabled(PLUGIN_NAME));
    }

    #[test]
    fn test_start_up_keeps_enabled_with_peer() {
        let mut harness = Harness::new();
        let mut plugin = AutoPartyPlugin::new();

        plugin.start_up(&mut harness.ctx());

        assert!(harness.registry.is_enabled(PLUGIN_NAME));
    }

    #[test]
    fn test_peer_disable_event_disables_self() {
        let mut harness = Harness::new();
        let mut plugin = AutoPartyPlugin::new();

        plugin.on_event(
            &mut harness.ctx(),
            &ClientEvent::PluginChanged {
                name: PARTY_PLUGIN.to_string(),
                enabled: false,
            },
        );

        assert!(!harness.registry.is_enabled(PLUGIN_NAME));
    }

    #[test]
    fn test_peer_enable_event_does_not_reenable() {
        let mut harness = Harness::new();
        harness.registry.set_enabled(PLUGIN_NAME, false);
        let mut plugin = AutoPartyPlugin::new();

        plugin.on_event(
            &mut harness.ctx(),
            &ClientEvent::PluginChanged {
                name: PARTY_PLUGIN.to_string(),
                enabled: true,
            },
        );

        assert!(!harness.registry.is_enabled(PLUGIN_NAME));
    }

    #[test]
    fn test_unrelated_plugin_change_ignored() {
        let mut harness = Harness::new();
        let mut plugin = AutoPartyPlugin::new();

        plugin.on_event(
            &mut harness.ctx(),
            &ClientEvent::PluginChanged {
                name: "Screenshot".to_string(),
                enabled: false,
            },
        );

        assert!(harness.registry.is_enabled(PLUGIN_NAME));
    }
}
