//! # chat-archive
//!
//! A CLI tool and library that exports AI chat conversations to a zip archive of
//! Markdown documents.
//!
//! ## What it does
//!
//! Each conversation record is a title plus an ordered list of role-tagged
//! messages. The formatter turns one record into a Markdown document:
//!
//! ```text
//! ## Conversation: Trip planning
//!
//! **User:**
//! > Where should I go?
//!
//! **Assistant:**
//! > Lisbon.
//! ```
//!
//! Surrounding quotes are stripped from the title. Message content is trimmed,
//! cut at the first citation marker (`U+001C`) and quoted line by line. Messages
//! with no usable content are dropped, or kept as a placeholder with
//! `--keep-invalid`.
//!
//! Formatting never fails from the caller's point of view: a record that does
//! not have the shape of a conversation is logged and renders as an empty
//! document.
//!
//! ## Usage
//!
//! ```sh
//! # Export every record in a directory of .json/.yaml files
//! chat-archive ~/chats -o ~/backup/chats.zip
//!
//! # Only a few conversations, keeping blank messages
//! chat-archive ~/chats --id 4f1c,9a02 --keep-invalid
//! ```
//!
//! Preferences can be persisted in `~/.config/chat-archive/config.toml`.
//!
//! ## Library
//!
//! ```
//! use chat_archive::diagnostics::LogDiagnostics;
//! use chat_archive::formatter::Formatter;
//! use serde_json::json;
//!
//! let diagnostics = LogDiagnostics;
//! let doc = Formatter::new(&diagnostics).format(&json!({
//!     "title": "\"Hi\"",
//!     "messages": [{"role": "user", "content": "Ohi"}]
//! }));
//! assert_eq!(doc, "## Conversation: Hi\n\n**User:**\n> Ohi\n\n");
//! ```

pub mod archive;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod formatter;
pub mod model;
pub mod source;
pub mod utils;
pub mod validator;

pub use diagnostics::{Diagnostics, LogDiagnostics, MemoryDiagnostics};
pub use error::{FormatError, MessageIssue, ValidationError};
pub use formatter::{FormatOptions, Formatter, format};
pub use model::{Conversation, Message, Role};
