use crate::diagnostics::Diagnostics;
use crate::error::{FormatError, MessageIssue};
use crate::model::{Conversation, Message};
use crate::validator;
use serde_json::Value;
use std::fmt::Write;

/// Control character that upstream uses to append citation metadata to a message.
pub const CITATION_MARKER: char = '\u{1c}';

/// Stand-in text for messages with missing or blank content when they are kept.
pub const INVALID_CONTENT_PLACEHOLDER: &str = "(The message contains invalid content)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Drop messages with missing or blank content instead of rendering the placeholder.
    pub remove_invalid: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            remove_invalid: true,
        }
    }
}

/// Renders conversation records as Markdown documents.
///
/// `format` never fails: a conversation that cannot be rendered is reported on
/// the diagnostics sink and comes back as an empty string.
pub struct Formatter<'a> {
    diagnostics: &'a dyn Diagnostics,
    options: FormatOptions,
}

impl<'a> Formatter<'a> {
    pub fn new(diagnostics: &'a dyn Diagnostics) -> Self {
        Self::with_options(diagnostics, FormatOptions::default())
    }

    pub fn with_options(diagnostics: &'a dyn Diagnostics, options: FormatOptions) -> Self {
        Self {
            diagnostics,
            options,
        }
    }

    pub fn options(&self) -> FormatOptions {
        self.options
    }

    pub fn format(&self, value: &Value) -> String {
        match self.try_format(value) {
            Ok(document) => document,
            Err(e) => {
                self.diagnostics
                    .error(&format!("Failed to format conversation: {}", e));
                String::new()
            }
        }
    }

    pub fn format_conversation(&self, conversation: &Conversation) -> String {
        self.format(&Value::from(conversation))
    }

    /// Validate and render, surfacing the failure instead of swallowing it.
    pub fn try_format(&self, value: &Value) -> Result<String, FormatError> {
        let parts = validator::check_structure(value)?;
        validator::check_messages(parts.title, parts.messages, self.diagnostics);

        let mut document = String::new();
        write!(document, "## Conversation: {}\n\n", clean_title(parts.title))?;

        for (index, entry) in parts.messages.iter().enumerate() {
            let message = Message::from_value(entry, index)?;
            let Some(content) = self.message_content(&message, parts.title, index) else {
                continue;
            };
            write!(
                document,
                "{}\n{}\n\n",
                message.role().label(),
                blockquote(&content)
            )?;
        }

        Ok(document)
    }

    fn message_content(&self, message: &Message, title: &str, index: usize) -> Option<String> {
        if let Some(content) = message.content.as_deref() {
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                return Some(strip_citation(trimmed).trim().to_string());
            }
        }

        let issue = MessageIssue::InvalidContent {
            title: title.to_string(),
            index,
        };
        self.diagnostics.warn(&issue.to_string());

        if self.options.remove_invalid {
            None
        } else {
            Some(INVALID_CONTENT_PLACEHOLDER.to_string())
        }
    }
}

/// Render with a one-off [`Formatter`].
pub fn format(value: &Value, options: FormatOptions, diagnostics: &dyn Diagnostics) -> String {
    Formatter::with_options(diagnostics, options).format(value)
}

/// Drop one surrounding pair of double quotes (each side independently), then trim.
pub fn clean_title(title: &str) -> String {
    let title = title.strip_prefix('"').unwrap_or(title);
    let title = title.strip_suffix('"').unwrap_or(title);
    title.trim().to_string()
}

/// Cut `content` at the first citation marker.
pub fn strip_citation(content: &str) -> &str {
    match content.find(CITATION_MARKER) {
        Some(pos) => &content[..pos],
        None => content,
    }
}

/// Prefix every line, blank ones included, with `> `.
pub fn blockquote(content: &str) -> String {
    content
        .split('\n')
        .map(|line| format!("> {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemoryDiagnostics;
    use serde_json::json;

    #[test]
    fn clean_title_strips_one_quote_each_side() {
        assert_eq!(clean_title("\"Hi\""), "Hi");
        assert_eq!(clean_title("\"\"Hi\"\""), "\"Hi\"");
        assert_eq!(clean_title("\"Hi"), "Hi");
        assert_eq!(clean_title("Hi\""), "Hi");
        assert_eq!(clean_title("\""), "");
        assert_eq!(clean_title("  Hi  "), "Hi");
    }

    #[test]
    fn clean_title_quotes_are_only_stripped_at_the_edges() {
        assert_eq!(clean_title("\" spaced \""), "spaced");
        assert_eq!(clean_title(" \"quoted\" "), "\"quoted\"");
        assert_eq!(clean_title("say \"hi\" now"), "say \"hi\" now");
    }

    #[test]
    fn clean_title_is_idempotent_on_ordinary_titles() {
        for title in ["\"Trip planning\"", "Rust lifetimes", "  padded  ", "\"x\""] {
            let once = clean_title(title);
            assert_eq!(clean_title(&once), once);
        }
    }

    #[test]
    fn strip_citation_cuts_at_first_marker() {
        assert_eq!(strip_citation("Hello\u{1c}world"), "Hello");
        assert_eq!(strip_citation("a\u{1c}b\u{1c}c"), "a");
        assert_eq!(strip_citation("\u{1c}all gone"), "");
        assert_eq!(strip_citation("no marker"), "no marker");
    }

    #[test]
    fn blockquote_prefixes_every_line() {
        assert_eq!(blockquote("line1\nline2"), "> line1\n> line2");
        assert_eq!(blockquote("a\n\nb"), "> a\n> \n> b");
        assert_eq!(blockquote(""), "> ");
    }

    #[test]
    fn marker_only_content_keeps_an_empty_quote() {
        let diagnostics = MemoryDiagnostics::new();
        let out = Formatter::new(&diagnostics).format(&json!({
            "title": "T",
            "messages": [{"role": "assistant", "content": "\u{1c}[1] source"}]
        }));
        assert_eq!(out, "## Conversation: T\n\n**Assistant:**\n> \n\n");
        assert!(diagnostics.warnings().is_empty());
    }

    #[test]
    fn content_is_trimmed_around_the_marker() {
        let diagnostics = MemoryDiagnostics::new();
        let out = Formatter::new(&diagnostics).format(&json!({
            "title": "T",
            "messages": [{"role": "user", "content": "  Hello \u{1c} cite  "}]
        }));
        assert_eq!(out, "## Conversation: T\n\n**User:**\n> Hello\n\n");
    }

    #[test]
    fn blank_content_is_invalid() {
        let diagnostics = MemoryDiagnostics::new();
        let formatter = Formatter::with_options(
            &diagnostics,
            FormatOptions {
                remove_invalid: false,
            },
        );
        let out = formatter.format(&json!({
            "title": "T",
            "messages": [{"role": "user", "content": " \n\t "}]
        }));
        assert_eq!(
            out,
            "## Conversation: T\n\n**User:**\n> (The message contains invalid content)\n\n"
        );
        assert_eq!(
            diagnostics.warnings(),
            vec!["Message 0 in conversation \"T\" has invalid content"]
        );
    }

    #[test]
    fn non_text_content_yields_empty_document_and_error() {
        let diagnostics = MemoryDiagnostics::new();
        let formatter = Formatter::new(&diagnostics);
        let value = json!({
            "title": "T",
            "messages": [
                {"role": "user", "content": "fine"},
                {"role": "assistant", "content": 42}
            ]
        });

        assert_eq!(formatter.format(&value), "");
        assert_eq!(
            diagnostics.errors(),
            vec!["Failed to format conversation: Unexpected formatting failure: content of message 1 is a number, expected text"]
        );

        let err = formatter.try_format(&value).unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn try_format_surfaces_validation_errors() {
        let diagnostics = MemoryDiagnostics::new();
        let err = Formatter::new(&diagnostics)
            .try_format(&Value::Null)
            .unwrap_err();
        assert!(err.is_recoverable());
        assert!(diagnostics.errors().is_empty());
    }

    #[test]
    fn format_conversation_matches_value_path() {
        let diagnostics = MemoryDiagnostics::new();
        let conv = Conversation::new("\"Hi\"").with_message(Message::user("Ohi"));
        assert_eq!(
            Formatter::new(&diagnostics).format_conversation(&conv),
            "## Conversation: Hi\n\n**User:**\n> Ohi\n\n"
        );
    }

    #[test]
    fn default_options_remove_invalid() {
        assert!(FormatOptions::default().remove_invalid);
    }
}
