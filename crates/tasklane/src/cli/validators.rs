//! CLI input validation functions.
//!
//! Used by clap's `value_parser` attribute so bad input is rejected at parse
//! time with a specific message.

/// Maximum accepted length of a task or board identifier
pub const MAX_ID_LENGTH: usize = 128;

/// Validate a task ID: non-empty after trimming, no inner whitespace.
pub fn validate_task_id(s: &str) -> Result<String, String> {
    validate_id("Task ID", s)
}

/// Validate a board ID with the same rules as task IDs.
pub fn validate_board_id(s: &str) -> Result<String, String> {
    validate_id("Board ID", s)
}

fn validate_id(kind: &str, s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err(format!("{kind} cannot be empty"));
    }
    if s.len() > MAX_ID_LENGTH {
        return Err(format!("{kind} cannot exceed {MAX_ID_LENGTH} characters"));
    }
    if s.chars().any(char::is_whitespace) {
        return Err(format!("{kind} cannot contain whitespace: '{s}'"));
    }

    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::simple("t-1", "t-1")]
    #[case::trimmed("  api-42 ", "api-42")]
    #[case::dotted("web.login", "web.login")]
    fn test_validate_task_id_valid(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate_task_id(input).unwrap(), expected);
    }

    #[rstest]
    #[case::empty("", "cannot be empty")]
    #[case::blank("   ", "cannot be empty")]
    #[case::inner_space("a b", "whitespace")]
    #[case::too_long(&"x".repeat(129), "cannot exceed")]
    fn test_validate_task_id_invalid(#[case] input: &str, #[case] expected_error: &str) {
        let err = validate_task_id(input).unwrap_err();
        assert!(
            err.contains(expected_error),
            "Expected error to contain '{expected_error}', got: '{err}'"
        );
    }

    #[test]
    fn test_board_message_names_board() {
        assert_eq!(validate_board_id("").unwrap_err(), "Board ID cannot be empty");
    }
}
