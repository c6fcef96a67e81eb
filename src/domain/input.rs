//! Free-text input rules
//!
//! Titles, descriptions, operations and addresses are typed by hand at a
//! prompt. These helpers reject control characters and split operation lists.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("{0} contains invalid characters")]
    InvalidCharacters(String),

    #[error("Input is not valid UTF-8")]
    InvalidEncoding,
}

/// Returns true if `s` has no ASCII control characters (including DEL)
pub fn is_valid_input(s: &str) -> bool {
    !s.chars().any(|c| c < ' ' || c == '\u{7f}')
}

/// Validates an optional free-text field
pub fn check_field(field: &'static str, value: &str) -> Result<(), InputError> {
    if is_valid_input(value) {
        Ok(())
    } else {
        Err(InputError::InvalidCharacters(field.to_string()))
    }
}

/// Validates a title: trimmed, non-empty, printable
pub fn check_title(title: &str) -> Result<&str, InputError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(InputError::Empty("Title"));
    }
    check_field("Title", title)?;
    Ok(title)
}

/// Splits a comma-separated operation list
///
/// Entries are trimmed, empty entries dropped, and every remaining entry must
/// be printable.
pub fn parse_operations(input: &str) -> Result<Vec<String>, InputError> {
    let mut operations = Vec::new();

    for op in input.split(',').map(str::trim).filter(|op| !op.is_empty()) {
        if !is_valid_input(op) {
            return Err(InputError::InvalidCharacters(format!("Operation '{}'", op)));
        }
        operations.push(op.to_string());
    }

    Ok(operations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_printable_text() {
        assert!(is_valid_input("Site/Area/Line 3"));
        assert!(is_valid_input("Fräse Ü-7 ✓"));
        assert!(is_valid_input(""));
    }

    #[test]
    fn rejects_control_characters() {
        assert!(!is_valid_input("tab\there"));
        assert!(!is_valid_input("bell\u{7}"));
        assert!(!is_valid_input("del\u{7f}"));
        assert!(!is_valid_input("esc\u{1b}[31m"));
    }

    #[test]
    fn title_is_trimmed_and_required() {
        assert_eq!(check_title("  Pump A "), Ok("Pump A"));
        assert_eq!(check_title("   "), Err(InputError::Empty("Title")));
        assert_eq!(
            check_title("bad\u{1}"),
            Err(InputError::InvalidCharacters("Title".to_string()))
        );
    }

    #[test]
    fn operations_are_split_and_cleaned() {
        let ops = parse_operations(" cut, weld ,, paint ,").unwrap();
        assert_eq!(ops, vec!["cut", "weld", "paint"]);

        assert!(parse_operations("").unwrap().is_empty());
        assert!(parse_operations(" , ,").unwrap().is_empty());
    }

    #[test]
    fn operations_reject_control_characters() {
        let err = parse_operations("cut, we\u{8}ld").unwrap_err();
        assert_eq!(err.to_string(), "Operation 'we\u{8}ld' contains invalid characters");
    }
}
