//! Assertion helpers for workflow testing.

use super::{CollectingLogger, Journal, ScriptedTransport};
use crate::context::{SessionContext, WorkflowResponse};
use crate::observability::LogLevel;

/// Asserts that the journal recorded exactly `expected`, in order.
///
/// # Panics
///
/// Panics if the entries differ.
pub fn assert_journal(journal: &Journal, expected: &[&str]) {
    let entries = journal.entries();
    let actual: Vec<&str> = entries.iter().map(String::as_str).collect();
    assert_eq!(actual, expected, "Unexpected step execution order");
}

/// Asserts that the jar holds `name` with `value`.
///
/// # Panics
///
/// Panics if the cookie is missing or has another value.
pub fn assert_cookie<R: WorkflowResponse>(ctx: &SessionContext<R>, name: &str, value: &str) {
    match ctx.cookies().get(name) {
        Some(actual) => assert_eq!(actual, value, "Cookie '{name}' has the wrong value"),
        None => panic!("Cookie '{name}' not found in jar"),
    }
}

/// Asserts that a message containing `needle` was logged at `level`.
///
/// # Panics
///
/// Panics if no such message exists.
pub fn assert_logged(logger: &CollectingLogger, level: LogLevel, needle: &str) {
    let messages = logger.messages_at(level);
    assert!(
        messages.iter().any(|m| m.contains(needle)),
        "No {level} message containing '{needle}', got: {messages:?}"
    );
}

/// Asserts that nothing was sent.
///
/// # Panics
///
/// Panics if the transport saw any request.
pub fn assert_no_requests(transport: &ScriptedTransport) {
    let urls = transport.urls();
    assert!(urls.is_empty(), "Expected no requests, got: {urls:?}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_journal_passes() {
        let journal = Journal::new();
        journal.record("a");
        journal.record("b");
        assert_journal(&journal, &["a", "b"]);
    }

    #[test]
    #[should_panic(expected = "Unexpected step execution order")]
    fn test_assert_journal_fails() {
        let journal = Journal::new();
        journal.record("b");
        assert_journal(&journal, &["a"]);
    }

    #[test]
    #[should_panic(expected = "No info message")]
    fn test_assert_logged_fails() {
        let logger = CollectingLogger::new();
        assert_logged(&logger, LogLevel::Info, "missing");
    }
}
