//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Only the braced form is expanded; bare `$VAR` is kept as written. An unset
/// variable without a default is an error naming `field`.
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
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Environment lookup failure.
struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expand_with_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("CONFMARK_TEST_SET", "alice@example.com");
            std::env::remove_var("CONFMARK_TEST_UNSET");
        }
        assert_eq!(
            expand_env("${CONFMARK_TEST_SET:-nobody}", "confluence.email").unwrap(),
            "alice@example.com"
        );
        assert_eq!(
            expand_env("${CONFMARK_TEST_UNSET:-nobody}", "confluence.email").unwrap(),
            "nobody"
        );
        unsafe {
            std::env::remove_var("CONFMARK_TEST_SET");
        }
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("CONFMARK_TEST_SITE", "acme");
        }
        let result = expand_env("https://${CONFMARK_TEST_SITE}.atlassian.net", "url").unwrap();
        assert_eq!(result, "https://acme.atlassian.net");
        unsafe {
            std::env::remove_var("CONFMARK_TEST_SITE");
        }
    }

    #[test]
    fn test_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("CONFMARK_TEST_MISSING");
        }
        let err = expand_env("${CONFMARK_TEST_MISSING}", "confluence.api_token").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("CONFMARK_TEST_MISSING"));
        assert!(err.to_string().contains("confluence.api_token"));
    }

    #[test]
    fn test_literals_unchanged() {
        assert_eq!(expand_env("plain", "f").unwrap(), "plain");
        assert_eq!(expand_env("$HOME/x", "f").unwrap(), "$HOME/x");
    }
}
