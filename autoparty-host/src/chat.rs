//! Chat message formatting and queueing
//!
//! Plugins build formatted messages with [`ChatMessageBuilder`] and push them
//! onto the host's [`ChatMessageQueue`]; the host drains the queue on its
//! render pass.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

// =============================================================================
// Message Types
// =============================================================================

/// Category tag for queued messages (determines the rendering channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatMessageType {
    /// Console output, not attributed to any player
    #[default]
    Console,
    /// Regular game message
    GameMessage,
}

/// Color applied to one message segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatColor {
    /// Default chat color
    Normal,
    /// Highlight color for emphasis
    Highlight,
}

impl ChatColor {
    /// Inline tag understood by the chat renderer
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            ChatColor::Normal => "<colNORM>",
            ChatColor::Highlight => "<colHIGHLIGHT>",
        }
    }
}

// =============================================================================
// Message Builder
// =============================================================================

/// Builder for formatted chat messages
///
/// Segments are rendered in append order, each prefixed with its color tag.
#[derive(Debug, Default)]
pub struct ChatMessageBuilder {
    segments: Vec<(ChatColor, String)>,
}

impl ChatMessageBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a colored text segment
    #[must_use]
    pub fn append(mut self, color: ChatColor, text: impl Into<String>) -> Self {
        self.segments.push((color, text.into()));
        self
    }

    /// Render the message with inline color tags
    #[must_use]
    pub fn build(self) -> String {
        let mut message = String::new();
        for (color, text) in &self.segments {
            message.push_str(color.tag());
            message.push_str(text);
        }
        message
    }
}

// =============================================================================
// Message Queue
// =============================================================================

/// A formatted message waiting to be rendered by the host
#[derive(Debug, Clone)]
pub struct QueuedMessage {
    /// Rendering channel
    pub message_type: ChatMessageType,
    /// Formatted message text, including color tags
    pub message: String,
    /// When the message was queued
    pub timestamp: DateTime<Local>,
}

/// FIFO of messages plugins have queued for display
#[derive(Debug, Default)]
pub struct ChatMessageQueue {
    messages: VecDeque<QueuedMessage>,
}

impl ChatMessageQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message for display
    pub fn queue(&mut self, message_type: ChatMessageType, message: impl Into<String>) {
        self.messages.push_back(QueuedMessage {
            message_type,
            message: message.into(),
            timestamp: Local::now(),
        });
    }

    /// Take all queued messages, oldest first
    pub fn drain(&mut self) -> Vec<QueuedMessage> {
        self.messages.drain(..).collect()
    }

    /// Iterate over queued messages without removing them
    pub fn messages(&self) -> impl Iterator<Item = &QueuedMessage> {
        self.messages.iter()
    }

    /// Number of queued messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
