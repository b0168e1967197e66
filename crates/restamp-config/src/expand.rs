//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Strings without `${` are returned unchanged, so bare `$` in file names
/// survives.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        std::env::var(var).map(Some).map_err(|_| LookupError {
            var_name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.var_name),
    })
}

/// Lookup failure for an unset variable.
struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_set_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("RESTAMP_TEST_OUT", "build");
        }
        let result = expand_env("${RESTAMP_TEST_OUT}/web", "output.dir").unwrap();
        assert_eq!(result, "build/web");
        unsafe {
            std::env::remove_var("RESTAMP_TEST_OUT");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("RESTAMP_TEST_UNSET");
        }
        let result = expand_env("${RESTAMP_TEST_UNSET:-dist}", "output.dir").unwrap();
        assert_eq!(result, "dist");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("RESTAMP_TEST_MISSING");
        }
        let err = expand_env("${RESTAMP_TEST_MISSING}", "output.dir").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("RESTAMP_TEST_MISSING"));
        assert!(err.to_string().contains("output.dir"));
    }

    #[test]
    fn test_literal_with_dollar_unchanged() {
        let result = expand_env("dist/$legacy", "output.dir").unwrap();
        assert_eq!(result, "dist/$legacy");
    }
}
