//! Administrative Domain (ADOM) helpers.

use crate::error::CoreError;

/// ADOM used when none is configured or requested.
pub const DEFAULT_ADOM: &str = "root";

/// Longest ADOM name FortiManager accepts.
const MAX_ADOM_NAME_LEN: usize = 64;

/// Check that `name` is safe to splice into a FortiManager URL path.
///
/// Accepts 1-64 characters drawn from ASCII alphanumerics, `_`, `-` and `.`.
pub fn validate_adom_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::Validation("ADOM name must not be empty".into()));
    }
    if name.len() > MAX_ADOM_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "ADOM name must be at most {MAX_ADOM_NAME_LEN} characters"
        )));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(CoreError::Validation(format!(
            "ADOM name contains invalid character '{bad}'"
        )));
    }
    if name == "." || name == ".." {
        return Err(CoreError::Validation("ADOM name is reserved".into()));
    }
    Ok(())
}

/// Check a device, package or object name before it becomes a URL path
/// segment. `kind` names the value in the error message.
pub fn validate_object_name(kind: &str, name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(format!("{kind} name must not be empty")));
    }
    if name == "." || name == ".." {
        return Err(CoreError::Validation(format!("{kind} name is reserved")));
    }
    if name.contains('/') || name.chars().any(char::is_control) {
        return Err(CoreError::Validation(format!(
            "{kind} name contains invalid characters"
        )));
    }
    Ok(())
}

/// Validate a `folder/package` path segment by segment.
pub fn validate_package_path(path: &str) -> Result<(), CoreError> {
    path.split('/')
        .try_for_each(|segment| validate_object_name("Policy package", segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn accepts_typical_names() {
        for name in ["root", "branch-offices", "DC_01", "fgt.v7"] {
            assert!(validate_adom_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_empty_and_long_names() {
        assert_matches!(validate_adom_name(""), Err(CoreError::Validation(_)));
        let long = "a".repeat(65);
        assert_matches!(validate_adom_name(&long), Err(CoreError::Validation(_)));
        assert!(validate_adom_name(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn rejects_path_characters() {
        assert_matches!(validate_adom_name("root/device"), Err(CoreError::Validation(msg)) if msg.contains('/'));
        assert_matches!(validate_adom_name("a b"), Err(CoreError::Validation(_)));
        assert_matches!(validate_adom_name(".."), Err(CoreError::Validation(_)));
    }

    #[test]
    fn object_names() {
        assert!(validate_object_name("Device", "FGT-HQ 01").is_ok());
        assert_matches!(validate_object_name("Device", "a/b"), Err(CoreError::Validation(_)));
        assert_matches!(validate_object_name("Device", " "), Err(CoreError::Validation(_)));
        assert_matches!(validate_object_name("Device", ".."), Err(CoreError::Validation(_)));
    }

    #[test]
    fn package_paths() {
        assert!(validate_package_path("default").is_ok());
        assert!(validate_package_path("branch/standard").is_ok());
        assert_matches!(validate_package_path("branch//x"), Err(CoreError::Validation(_)));
        assert_matches!(validate_package_path("../x"), Err(CoreError::Validation(_)));
    }
}
