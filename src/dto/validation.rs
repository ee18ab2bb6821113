//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest group or player name accepted.
pub const MAX_NAME_LEN: usize = 64;

/// Validates that a display name has visible characters and fits [`MAX_NAME_LEN`].
///
/// # Examples
///
/// ```ignore
/// validate_name("Morning four") // Ok
/// validate_name("   ")          // Err - blank
/// ```
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("name_blank");
        err.message = Some("Name must not be blank".into());
        return Err(err);
    }

    let length = trimmed.chars().count();
    if length > MAX_NAME_LEN {
        let mut err = ValidationError::new("name_length");
        err.message = Some(
            format!("Name must be at most {MAX_NAME_LEN} characters (got {length})").into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_regular_names() {
        assert!(validate_name("Flight A").is_ok());
        assert!(validate_name("  Zoé  ").is_ok());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn rejects_blank_names() {
        assert!(validate_name("").is_err());
        assert!(validate_name(" \t ").is_err());
    }

    #[test]
    fn rejects_long_names() {
        let err = validate_name(&"x".repeat(MAX_NAME_LEN + 1)).unwrap_err();
        assert_eq!(err.code, "name_length");
    }
}
