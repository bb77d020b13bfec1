//! Shape checks for candidate conversation records.
//!
//! Two passes. [`check_structure`] is strict and stops at the first violated
//! precondition. [`check_messages`] is lenient: it only reports message entries
//! that lack `role` or `content` and leaves them in place for the formatter.

use crate::diagnostics::Diagnostics;
use crate::error::{MessageIssue, ValidationError, value_kind};
use serde_json::Value;

/// Borrowed view of a structurally valid conversation.
#[derive(Debug, Clone, Copy)]
pub struct ConversationParts<'a> {
    pub title: &'a str,
    pub messages: &'a [Value],
}

/// Run both validation passes.
pub fn validate(value: &Value, diagnostics: &dyn Diagnostics) -> Result<(), ValidationError> {
    let parts = check_structure(value)?;
    check_messages(parts.title, parts.messages, diagnostics);
    Ok(())
}

/// Strict pass: presence, record shape, title, messages array, in that order.
pub fn check_structure(value: &Value) -> Result<ConversationParts<'_>, ValidationError> {
    let fields = match value {
        Value::Null => return Err(ValidationError::Missing),
        Value::Object(fields) => fields,
        other => {
            return Err(ValidationError::NotARecord {
                found: value_kind(other),
            });
        }
    };

    let title = match fields.get("title") {
        Some(Value::String(title)) if !title.is_empty() => title.as_str(),
        _ => return Err(ValidationError::InvalidTitle),
    };

    let messages = match fields.get("messages") {
        Some(Value::Array(messages)) => messages.as_slice(),
        _ => return Err(ValidationError::InvalidMessages),
    };

    Ok(ConversationParts { title, messages })
}

/// Lenient pass: warn about every malformed entry, never fail.
///
/// Returns the number of malformed entries found.
pub fn check_messages(title: &str, messages: &[Value], diagnostics: &dyn Diagnostics) -> usize {
    let mut malformed = 0;
    for (index, message) in messages.iter().enumerate() {
        let well_formed = message
            .as_object()
            .is_some_and(|m| m.contains_key("role") && m.contains_key("content"));
        if !well_formed {
            malformed += 1;
            let issue = MessageIssue::Malformed {
                title: title.to_string(),
                index,
            };
            diagnostics.warn(&issue.to_string());
        }
    }
    malformed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemoryDiagnostics;
    use serde_json::json;

    fn check(value: Value) -> Result<(), ValidationError> {
        validate(&value, &MemoryDiagnostics::new())
    }

    #[test]
    fn accepts_minimal_conversation() {
        assert_eq!(check(json!({"title": "Hi", "messages": []})), Ok(()));
    }

    #[test]
    fn rejects_null() {
        assert_eq!(check(Value::Null), Err(ValidationError::Missing));
    }

    #[test]
    fn rejects_arrays_and_scalars() {
        assert_eq!(
            check(json!([{"title": "Hi", "messages": []}])),
            Err(ValidationError::NotARecord { found: "an array" })
        );
        assert_eq!(
            check(json!("Hi")),
            Err(ValidationError::NotARecord { found: "a string" })
        );
    }

    #[test]
    fn rejects_bad_titles() {
        for value in [
            json!({"messages": []}),
            json!({"title": "", "messages": []}),
            json!({"title": 12, "messages": []}),
            json!({"title": null, "messages": []}),
        ] {
            assert_eq!(check(value), Err(ValidationError::InvalidTitle));
        }
    }

    #[test]
    fn whitespace_title_passes_validation() {
        assert_eq!(check(json!({"title": "   ", "messages": []})), Ok(()));
    }

    #[test]
    fn rejects_bad_messages() {
        for value in [
            json!({"title": "Hi"}),
            json!({"title": "Hi", "messages": {}}),
            json!({"title": "Hi", "messages": {"0": {"role": "user"}}}),
            json!({"title": "Hi", "messages": "hello"}),
        ] {
            assert_eq!(check(value), Err(ValidationError::InvalidMessages));
        }
    }

    #[test]
    fn title_is_checked_before_messages() {
        assert_eq!(
            check(json!({"title": "", "messages": {}})),
            Err(ValidationError::InvalidTitle)
        );
    }

    #[test]
    fn malformed_messages_warn_but_pass() {
        let diagnostics = MemoryDiagnostics::new();
        let value = json!({
            "title": "Notes",
            "messages": [
                {"role": "user", "content": "ok"},
                {"role": "user"},
                "loose string",
                {"content": "no role"},
                null
            ]
        });

        assert_eq!(validate(&value, &diagnostics), Ok(()));
        assert_eq!(
            diagnostics.warnings(),
            vec![
                "Message 1 in conversation \"Notes\" is malformed (missing role or content)",
                "Message 2 in conversation \"Notes\" is malformed (missing role or content)",
                "Message 3 in conversation \"Notes\" is malformed (missing role or content)",
                "Message 4 in conversation \"Notes\" is malformed (missing role or content)",
            ]
        );
    }

    #[test]
    fn fields_present_with_null_values_count_as_present() {
        let diagnostics = MemoryDiagnostics::new();
        let messages = [json!({"role": null, "content": null})];
        assert_eq!(check_messages("T", &messages, &diagnostics), 0);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn structural_failure_skips_message_pass() {
        let diagnostics = MemoryDiagnostics::new();
        let value = json!({"title": "", "messages": [{}]});
        assert!(validate(&value, &diagnostics).is_err());
        assert!(diagnostics.is_empty());
    }
}
