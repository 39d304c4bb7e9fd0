//! Input checks applied before any collaborator is called.

use xpanel_core::constants::MAX_LOG_LINES;
use xpanel_core::error::{PanelError, Result};

/// Returns true if `s` is non-empty and only contains `[A-Za-z0-9_.-]`.
pub fn is_safe_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
}

/// Rejects download file names that could break out of a header or a path.
pub fn validate_filename(filename: &str) -> Result<()> {
    if is_safe_name(filename) && filename != "." && filename != ".." {
        Ok(())
    } else {
        Err(PanelError::InvalidFilename(filename.to_string()))
    }
}

/// Rejects version identifiers that are unsafe to put into a release URL.
pub fn validate_version(version: &str) -> Result<()> {
    if is_safe_name(version) && !version.starts_with('.') {
        Ok(())
    } else {
        Err(PanelError::ValidationError(format!("invalid version '{version}'")))
    }
}

/// Rejects log tail sizes outside `1..=MAX_LOG_LINES`.
pub fn validate_log_count(count: usize) -> Result<()> {
    if (1..=MAX_LOG_LINES).contains(&count) {
        Ok(())
    } else {
        Err(PanelError::ValidationError(format!(
            "log count must be between 1 and {MAX_LOG_LINES}, got {count}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("x-ui.db" ; "default export name")]
    #[test_case("backup_2024-06-01.db" ; "dated backup")]
    #[test_case("DB" ; "no extension")]
    fn test_valid_filenames(name: &str) {
        assert!(validate_filename(name).is_ok());
    }

    #[test_case("" ; "empty")]
    #[test_case("../x-ui.db" ; "traversal")]
    #[test_case("x-ui.db;rm" ; "semicolon")]
    #[test_case("a/b.db" ; "slash")]
    #[test_case("x-ui.db\r\nSet-Cookie: a" ; "header injection")]
    #[test_case("my db" ; "space")]
    #[test_case(".." ; "parent dir")]
    fn test_invalid_filenames(name: &str) {
        assert!(matches!(validate_filename(name), Err(PanelError::InvalidFilename(_))));
    }

    #[test_case("v1.8.0", true ; "tagged engine")]
    #[test_case("202406010000", true ; "dated geo release")]
    #[test_case("v1.8.0/../../x", false ; "path in version")]
    #[test_case(".hidden", false ; "leading dot")]
    #[test_case("", false ; "empty")]
    fn test_versions(version: &str, ok: bool) {
        assert_eq!(validate_version(version).is_ok(), ok);
    }

    #[test]
    fn test_log_count_bounds() {
        assert!(validate_log_count(0).is_err());
        assert!(validate_log_count(1).is_ok());
        assert!(validate_log_count(MAX_LOG_LINES).is_ok());
        assert!(validate_log_count(MAX_LOG_LINES + 1).is_err());
    }
}
