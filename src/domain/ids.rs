//! Module name identifier

use std::fmt;
use std::str::FromStr;

/// Name of an exportable geometry module
///
/// Restricted to ASCII letters, digits, `_` and `-` so it is safe to use as
/// both an invocation target and an output/temp file name component.
///
/// # Examples
///
/// ```
/// use scadex::domain::ids::ModuleName;
/// use std::str::FromStr;
///
/// let name = ModuleName::from_str("bracket_v2").unwrap();
/// assert_eq!(name.as_str(), "bracket_v2");
/// assert!(ModuleName::from_str("not a name").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleName(String);

impl ModuleName {
    /// Creates a new ModuleName, validating its characters
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.is_empty() {
            return Err("Module name cannot be empty".to_string());
        }
        if let Some(bad) = name.chars().find(|c| !is_name_char(*c)) {
            return Err(format!(
                "Invalid module name '{name}': unexpected character '{bad}'"
            ));
        }
        Ok(Self(name))
    }

    /// Returns the module name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Characters allowed in a module name
pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ModuleName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ModuleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("mycyl" ; "plain")]
    #[test_case("Part_2" ; "underscore and digit")]
    #[test_case("lid-top" ; "hyphen")]
    #[test_case("9lives" ; "leading digit")]
    fn test_module_name_valid(name: &str) {
        let parsed = ModuleName::new(name).unwrap();
        assert_eq!(parsed.as_str(), name);
        assert_eq!(parsed.to_string(), name);
    }

    #[test_case("" ; "empty")]
    #[test_case("two words" ; "space")]
    #[test_case("a/b" ; "path separator")]
    #[test_case("foo()" ; "parentheses")]
    fn test_module_name_invalid(name: &str) {
        assert!(ModuleName::new(name).is_err());
    }
}
