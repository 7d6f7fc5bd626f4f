//! Result type alias for starsync

use super::errors::StarsyncError;

/// Result type alias for starsync operations
///
/// # Examples
///
/// ```
/// use starsync::domain::result::Result;
/// use starsync::domain::errors::StarsyncError;
///
/// fn failing_function() -> Result<()> {
///     Err(StarsyncError::Validation("Invalid input".to_string()))
/// }
///
/// assert!(failing_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, StarsyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
