use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::errors::{BitError, Result};
use std::path::PathBuf;
use std::sync::LazyLock;

pub const REF_PREFIX: &str = "refs/heads/";

static INVALID_BRANCH_NAME: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(INVALID_BRANCH_NAME_REGEX).expect("branch name regex is valid")
});

/// Validated branch name (the part after `refs/heads/`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> Result<Self> {
        if name.is_empty() || INVALID_BRANCH_NAME.is_match(&name) {
            return Err(BitError::InvalidBranchName(name));
        }

        Ok(Self(name))
    }

    /// Parse the target of a symbolic ref such as `refs/heads/main`
    pub fn try_parse_sym_ref(sym_ref: &str) -> Result<Self> {
        match sym_ref.strip_prefix(REF_PREFIX) {
            Some(name) => Self::try_parse(name.to_string()),
            None => Err(BitError::InvalidBranchName(sym_ref.to_string())),
        }
    }

    /// Symbolic ref form, e.g. `refs/heads/main`
    pub fn to_sym_ref(&self) -> String {
        format!("{}{}", REF_PREFIX, self.0)
    }

    /// Path of the ref file relative to the metadata directory
    pub fn to_ref_path(&self) -> PathBuf {
        PathBuf::from(self.to_sym_ref())
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::proptest;

    proptest! {
        #[test]
        fn test_is_valid_branch_name_with_valid_branch_name(
            branch_name in "[a-zA-Z0-9_-]+"
        ) {
            // Valid names: alphanumeric, underscore, hyphen
            assert!(BranchName::try_parse(branch_name).is_ok());
        }

        #[test]
        fn test_is_valid_branch_name_with_slashes(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            let branch_name = format!("{}/{}", prefix, suffix);
            assert!(BranchName::try_parse(branch_name).is_ok());
        }

        #[test]
        fn test_is_invalid_branch_name_starting_with_dot(
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            let branch_name = format!(".{}", suffix);
            assert!(BranchName::try_parse(branch_name).is_err());
        }

        #[test]
        fn test_is_invalid_branch_name_ending_with_lock(
            prefix in "[a-zA-Z0-9_-]+"
        ) {
            let branch_name = format!("{}.lock", prefix);
            assert!(BranchName::try_parse(branch_name).is_err());
        }

        #[test]
        fn test_is_invalid_branch_name_with_consecutive_dots(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            let branch_name = format!("{}..{}", prefix, suffix);
            assert!(BranchName::try_parse(branch_name).is_err());
        }

        #[test]
        fn test_is_invalid_branch_name_with_special_chars(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+",
            special_char in r"[\*:\?\[\\^~ ]"
        ) {
            let branch_name = format!("{}{}{}", prefix, special_char, suffix);
            assert!(BranchName::try_parse(branch_name).is_err());
        }
    }

    #[test]
    fn test_is_invalid_branch_name_empty() {
        assert!(BranchName::try_parse("".to_string()).is_err());
    }

    #[test]
    fn test_is_invalid_branch_name_with_slash_edges() {
        assert!(BranchName::try_parse("/topic".to_string()).is_err());
        assert!(BranchName::try_parse("topic/".to_string()).is_err());
        assert!(BranchName::try_parse("topic/.hidden".to_string()).is_err());
    }

    #[test]
    fn sym_ref_round_trips_through_the_branch_name() {
        let name = BranchName::try_parse("feature/login".to_string()).unwrap();

        assert_eq!(name.to_sym_ref(), "refs/heads/feature/login");
        assert_eq!(BranchName::try_parse_sym_ref(&name.to_sym_ref()).unwrap(), name);
        assert!(BranchName::try_parse_sym_ref("refs/tags/v1").is_err());
    }
}
