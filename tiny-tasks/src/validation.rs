//! Input validation shared by create and patch.

use crate::error::TaskError;

pub fn validate_title(title: &str) -> Result<String, TaskError> {
    let trimmed = title.trim();
    if trimmed.len() < 3 {
        return Err(TaskError::InvalidTitle);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_trimmed_title() {
        assert_eq!(validate_title("  buy milk  ").unwrap(), "buy milk");
    }

    #[test]
    fn rejects_titles_under_three_chars() {
        assert!(matches!(validate_title("hi"), Err(TaskError::InvalidTitle)));
    }

    #[test]
    fn whitespace_only_title_is_rejected() {
        assert!(matches!(validate_title("   "), Err(TaskError::InvalidTitle)));
    }
}
