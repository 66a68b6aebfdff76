//! Input validation
//!
//! Front ends call these checks before submitting, and the review and comment
//! services call them again so invalid input never reaches the database.

use crate::error::{LuminaError, Result};

/// Longest accepted review title, in characters
pub const MAX_REVIEW_TITLE_CHARS: usize = 120;

/// Longest accepted review body, in characters
pub const MAX_REVIEW_TEXT_CHARS: usize = 5000;

/// Longest accepted comment, in characters
pub const MAX_COMMENT_CHARS: usize = 1000;

/// Reviews shorter than this are accepted with a warning
const SHORT_REVIEW_CHARS: usize = 20;

/// Outcome of validating a piece of user input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResponse {
    pub valid: bool,
    /// Blocking problems
    pub errors: Vec<String>,
    /// Non-blocking remarks
    pub warnings: Vec<String>,
}

impl ValidationResponse {
    fn from_parts(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Turn a failed validation into `InvalidInput`
    pub fn into_result(self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(LuminaError::InvalidInput(self.errors.join("; ")))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationService;

impl ValidationService {
    pub fn new() -> Self {
        Self
    }

    /// Check a review before it is submitted
    pub fn validate_review(&self, title: &str, text: &str, rating: f64) -> ValidationResponse {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let title_chars = title.trim().chars().count();
        if title_chars == 0 {
            errors.push("Review title cannot be empty".to_string());
        } else if title_chars > MAX_REVIEW_TITLE_CHARS {
            errors.push(format!(
                "Review title is too long: {} characters (max {})",
                title_chars, MAX_REVIEW_TITLE_CHARS
            ));
        }

        let text_chars = text.trim().chars().count();
        if text_chars == 0 {
            errors.push("Review text cannot be empty".to_string());
        } else if text_chars > MAX_REVIEW_TEXT_CHARS {
            errors.push(format!(
                "Review text is too long: {} characters (max {})",
                text_chars, MAX_REVIEW_TEXT_CHARS
            ));
        } else if text_chars < SHORT_REVIEW_CHARS {
            warnings.push("Review text is very short".to_string());
        }

        if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
            errors.push(format!("Rating must be between 0 and 5, got {}", rating));
        }

        ValidationResponse::from_parts(errors, warnings)
    }

    /// Check a comment before it is submitted
    pub fn validate_comment(&self, text: &str) -> ValidationResponse {
        let mut errors = Vec::new();

        let chars = text.trim().chars().count();
        if chars == 0 {
            errors.push("Comment cannot be empty".to_string());
        } else if chars > MAX_COMMENT_CHARS {
            errors.push(format!(
                "Comment is too long: {} characters (max {})",
                chars, MAX_COMMENT_CHARS
            ));
        }

        ValidationResponse::from_parts(errors, Vec::new())
    }

    /// Parse a page number typed by the user
    ///
    /// Only whole numbers are accepted. Negative values parse successfully;
    /// the shelf treats them as a no-op.
    pub fn parse_page(&self, input: &str) -> Result<i64> {
        let trimmed = input.trim();
        trimmed.parse::<i64>().map_err(|_| {
            LuminaError::InvalidInput(format!("'{}' is not a page number", trimmed))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_review() {
        let service = ValidationService::new();
        let response = service.validate_review("Obra-prima", "Um livro que marca a gente.", 5.0);
        assert!(response.valid);
        assert!(response.warnings.is_empty());
    }

    #[test]
    fn test_empty_review_body_rejected() {
        let service = ValidationService::new();
        let response = service.validate_review("Título", "   ", 4.0);
        assert!(!response.valid);
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].contains("text"));
    }

    #[test]
    fn test_review_rating_out_of_range() {
        let service = ValidationService::new();
        assert!(!service.validate_review("T", "Texto bem longo para passar.", 5.5).valid);
        assert!(!service.validate_review("T", "Texto bem longo para passar.", f64::NAN).valid);
        assert!(service.validate_review("T", "Texto bem longo para passar.", 0.0).valid);
    }

    #[test]
    fn test_short_review_warns() {
        let service = ValidationService::new();
        let response = service.validate_review("T", "Bom.", 3.0);
        assert!(response.valid);
        assert_eq!(response.warnings.len(), 1);
    }

    #[test]
    fn test_comment_limits() {
        let service = ValidationService::new();
        assert!(service.validate_comment("Concordo!").valid);
        assert!(!service.validate_comment("").valid);
        assert!(!service.validate_comment(&"a".repeat(MAX_COMMENT_CHARS + 1)).valid);
    }

    #[test]
    fn test_into_result() {
        let service = ValidationService::new();
        let result = service.validate_comment(" ").into_result();
        assert!(matches!(result, Err(LuminaError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_page() {
        let service = ValidationService::new();
        assert_eq!(service.parse_page(" 120 ").unwrap(), 120);
        assert_eq!(service.parse_page("-5").unwrap(), -5);
        assert!(service.parse_page("twelve").is_err());
        assert!(service.parse_page("12.5").is_err());
        assert!(service.parse_page("").is_err());
    }
}
