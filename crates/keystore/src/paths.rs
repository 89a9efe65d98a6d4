//! Cross-platform path utilities

use std::path::{Path, PathBuf};

/// Expand a leading `~` to the user's home directory. Paths without a
/// leading `~` are returned unchanged.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            let rest = rest.strip_prefix('/').unwrap_or(rest);
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// `~/.shardnet/keys` (or the platform config dir equivalent), created
/// lazily by callers that need to write into it.
pub fn default_keystore_dir() -> PathBuf {
    default_config_dir().join("keys")
}

/// `~/.shardnet` (or the platform config dir equivalent).
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir().map(|d| d.join("shardnet")).unwrap_or_else(|| Path::new(".shardnet").to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_without_tilde_is_unchanged() {
        assert_eq!(expand_path("/etc/shardnet"), PathBuf::from("/etc/shardnet"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/shardnet"), home.join("shardnet"));
        }
    }

    #[test]
    fn test_default_keystore_dir_is_under_config_dir() {
        assert!(default_keystore_dir().ends_with("keys"));
    }
}
