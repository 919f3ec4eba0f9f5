//! Validation helpers for DTOs.

use indexmap::IndexMap;
use validator::ValidationError;

/// Longest accepted free-text answer, in characters.
pub const MAX_ANSWER_CHARS: usize = 4000;

/// Validates that a community handle only uses letters, digits, `_`, `.` and `-`.
///
/// # Examples
///
/// ```ignore
/// validate_handle("night_owl") // Ok
/// validate_handle("night owl") // Err - space
/// ```
pub fn validate_handle(handle: &str) -> Result<(), ValidationError> {
    if !handle
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        let mut err = ValidationError::new("handle_format");
        err.message = Some("Handle may only contain letters, digits, `_`, `.` and `-`".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that at least one question was answered and that no answer is
/// blank or longer than [`MAX_ANSWER_CHARS`].
pub fn validate_answers(answers: &IndexMap<String, String>) -> Result<(), ValidationError> {
    if answers.is_empty() {
        let mut err = ValidationError::new("answers_empty");
        err.message = Some("At least one answer is required".into());
        return Err(err);
    }

    for (question, answer) in answers {
        if question.trim().is_empty() || answer.trim().is_empty() {
            let mut err = ValidationError::new("answer_blank");
            err.message = Some("Questions and answers must not be blank".into());
            return Err(err);
        }
        let length = answer.chars().count();
        if length > MAX_ANSWER_CHARS {
            let mut err = ValidationError::new("answer_length");
            err.message = Some(
                format!("Answers are limited to {MAX_ANSWER_CHARS} characters (got {length})")
                    .into(),
            );
            return Err(err);
        }
    }

    Ok(())
}
