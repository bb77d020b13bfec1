//! Typed conversation records.
//!
//! Upstream data arrives as loosely shaped JSON: a record with a `title` and an
//! ordered `messages` array, each message carrying a `role` tag and text
//! `content`. Either message field may be missing in the wild, so both are
//! optional here and the formatter decides what to do with the gaps.
//!
//! ```json
//! {
//!   "title": "\"Trip planning\"",
//!   "messages": [
//!     { "role": "user", "content": "Where should I go?" },
//!     { "role": "assistant", "content": "Lisbon.\u001c[1] travel-guide" }
//!   ]
//! }
//! ```
use crate::error::{FormatError, value_kind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Display role of a message. Only `"user"` is distinguished; every other tag,
/// including a missing one, is shown as the assistant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("user") => Role::User,
            _ => Role::Assistant,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::User => "**User:**",
            Role::Assistant => "**Assistant:**",
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            content: Some(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    pub fn role(&self) -> Role {
        Role::from_tag(self.role.as_deref())
    }

    /// Read one entry of a `messages` array.
    ///
    /// Entries that are not records read as an empty message. A non-string role
    /// reads as absent. Content must be a string or null; anything else is an
    /// error because it cannot be rendered as text.
    pub fn from_value(value: &Value, index: usize) -> Result<Self, FormatError> {
        let Value::Object(fields) = value else {
            return Ok(Self::default());
        };

        let role = fields
            .get("role")
            .and_then(Value::as_str)
            .map(str::to_string);

        let content = match fields.get("content") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                return Err(FormatError::Unexpected(format!(
                    "content of message {} is {}, expected text",
                    index,
                    value_kind(other)
                )));
            }
        };

        Ok(Self { role, content })
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            messages: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}

impl From<&Message> for Value {
    fn from(message: &Message) -> Self {
        let mut fields = Map::new();
        if let Some(role) = &message.role {
            fields.insert("role".into(), Value::String(role.clone()));
        }
        if let Some(content) = &message.content {
            fields.insert("content".into(), Value::String(content.clone()));
        }
        Value::Object(fields)
    }
}

impl From<&Conversation> for Value {
    fn from(conversation: &Conversation) -> Self {
        let mut fields = Map::new();
        fields.insert("title".into(), Value::String(conversation.title.clone()));
        fields.insert(
            "messages".into(),
            Value::Array(conversation.messages.iter().map(Value::from).collect()),
        );
        Value::Object(fields)
    }
}
