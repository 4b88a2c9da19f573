//! Client events delivered to plugins
//!
//! The host dispatches every event serially on its own thread; plugins match
//! on [`ClientEvent`] and ignore the variants they do not care about.

use std::fmt;

// =============================================================================
// Game State
// =============================================================================

/// Client lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Sitting at the login screen
    LoginScreen,
    /// Authentication in progress
    LoggingIn,
    /// Logged in and playing
    LoggedIn,
    /// Loading a new scene
    Loading,
    /// Switching worlds
    Hopping,
    /// Connection to the server was lost
    ConnectionLost,
}

impl GameState {
    /// String representation for logging
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::LoginScreen => "login_screen",
            GameState::LoggingIn => "logging_in",
            GameState::LoggedIn => "logged_in",
            GameState::Loading => "loading",
            GameState::Hopping => "hopping",
            GameState::ConnectionLost => "connection_lost",
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Events
// =============================================================================

/// Events the host delivers to plugins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The client lifecycle state changed
    GameStateChanged {
        /// The new state
        state: GameState,
    },

    /// Party membership changed
    PartyChanged {
        /// The joined or created party id; `None` means no party
        party_id: Option<String>,
    },

    /// A plugin was enabled or disabled
    PluginChanged {
        /// Registry name of the plugin
        name: String,
        /// Its new enable state
        enabled: bool,
    },
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_state_as_str() {
        assert_eq!(GameState::LoggedIn.as_str(), "logged_in");
        assert_eq!(GameState::LoginScreen.as_str(), "login_screen");
        assert_eq!(GameState::ConnectionLost.as_str(), "connection_lost");
    }

    #[test]
    fn test_game_state_display() {
        assert_eq!(format!("{}", GameState::Hopping), "hopping");
    }

    #[test]
    fn test_party_changed_equality() {
        let joined = ClientEvent::PartyChanged {
            party_id: Some("abc".to_string()),
        };
        let left = ClientEvent::PartyChanged { party_id: None };

        assert_eq!(
            joined,
            ClientEvent::PartyChanged {
                party_id: Some("abc".to_string()),
            }
        );
        assert_ne!(joined, left);
    }
}
