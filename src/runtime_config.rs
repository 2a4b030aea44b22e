//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the dispatcher's runtime
//! behavior.
//!
//! ## Environment Variables
//!
//! ### `SWB_BASE_PATH`
//!
//! A path prefix stripped from every incoming request path before route
//! matching (e.g. `/api/v1`). Useful when the service is mounted behind a
//! gateway that does not rewrite paths.
//!
//! Default: empty (no prefix stripping).
//!
//! Values are sanitized: a missing leading `/` is added and trailing slashes
//! are removed, so `api/v1/` and `/api/v1` configure the same prefix.
//!
//! ## Usage
//!
//! ```rust
//! use switchboard::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Base path: {:?}", config.base_path);
//! ```

use std::env;

/// Runtime configuration loaded from environment variables.
///
/// Load this at startup using [`RuntimeConfig::from_env()`] and hand it to
/// the dispatcher via `set_config`.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Path prefix stripped before route matching (default: empty)
    pub base_path: String,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let base_path = match env::var("SWB_BASE_PATH") {
            Ok(val) => Self::sanitize_base_path(&val),
            Err(_) => String::new(),
        };
        RuntimeConfig { base_path }
    }

    /// Build a configuration with an explicit base path.
    pub fn with_base_path(base_path: &str) -> Self {
        RuntimeConfig {
            base_path: Self::sanitize_base_path(base_path),
        }
    }

    fn sanitize_base_path(raw: &str) -> String {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return String::new();
        }
        if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RuntimeConfig;

    #[test]
    fn test_base_path_is_sanitized() {
        assert_eq!(RuntimeConfig::with_base_path("/api/v1").base_path, "/api/v1");
        assert_eq!(RuntimeConfig::with_base_path("api/v1/").base_path, "/api/v1");
        assert_eq!(RuntimeConfig::with_base_path("/").base_path, "");
        assert_eq!(RuntimeConfig::with_base_path("").base_path, "");
    }
}
