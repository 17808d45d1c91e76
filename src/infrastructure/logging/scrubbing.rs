//! Secret scrubbing for log and error output.
//!
//! Provider errors can echo request bodies and headers, so anything
//! derived from a provider response is passed through the scanner's
//! scrub before it is logged or printed.

use std::sync::OnceLock;

use crate::services::SecretScanner;

fn scanner() -> &'static SecretScanner {
    static SCANNER: OnceLock<SecretScanner> = OnceLock::new();
    SCANNER.get_or_init(SecretScanner::new)
}

/// Scrub a message destined for logs or the terminal.
pub fn scrub_for_log(message: &str) -> String {
    scanner().scrub(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrubs_bearer_tokens() {
        let scrubbed = scrub_for_log("request failed: Authorization: Bearer abc123def456");
        assert!(!scrubbed.contains("abc123def456"));
        assert!(scrubbed.contains("[REDACTED]"));
    }

    #[test]
    fn test_plain_messages_untouched() {
        let message = "connection refused";
        assert_eq!(scrub_for_log(message), message);
    }
}
