//! Result type alias for scadex

use super::errors::ScadexError;

/// Result type alias for scadex operations
///
/// # Examples
///
/// ```
/// use scadex::domain::result::Result;
/// use scadex::domain::errors::ScadexError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ScadexError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ScadexError>;
