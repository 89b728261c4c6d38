//! Repository configuration
//!
//! Configuration is an explicit value handed to [`Repository::open`](crate::areas::repository::Repository::open).
//! The binary builds it from the environment; tests build it directly.

use crate::artifacts::objects::commit::Author;
use crate::errors::Result;

/// Name of the metadata directory under the repository root
pub const METADATA_DIR: &str = ".bit";

/// Branch HEAD points at after `init` unless overridden
pub const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub default_branch: String,
    pub author_name: String,
    pub author_email: String,
    /// Fixed commit timestamp; the current local time is used when absent
    pub author_date: Option<chrono::DateTime<chrono::FixedOffset>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_branch: DEFAULT_BRANCH.to_string(),
            author_name: "unknown".to_string(),
            author_email: "unknown@localhost".to_string(),
            author_date: None,
        }
    }
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Reads `GIT_AUTHOR_NAME`, `GIT_AUTHOR_EMAIL`, `GIT_AUTHOR_DATE` and
    /// `BIT_DEFAULT_BRANCH`. Missing author details fall back to `USER`.
    pub fn from_env() -> Self {
        let author_name = std::env::var("GIT_AUTHOR_NAME")
            .or_else(|_| std::env::var("USER"))
            .unwrap_or_else(|_| "unknown".to_string());
        let author_email = std::env::var("GIT_AUTHOR_EMAIL")
            .unwrap_or_else(|_| format!("{}@localhost", author_name));
        let author_date = std::env::var("GIT_AUTHOR_DATE")
            .ok()
            .and_then(|date_str| parse_author_date(&date_str));
        let default_branch =
            std::env::var("BIT_DEFAULT_BRANCH").unwrap_or_else(|_| DEFAULT_BRANCH.to_string());

        Config {
            default_branch,
            author_name,
            author_email,
            author_date,
        }
    }

    pub fn with_default_branch(mut self, name: impl Into<String>) -> Self {
        self.default_branch = name.into();
        self
    }

    pub fn with_author_date(mut self, date: chrono::DateTime<chrono::FixedOffset>) -> Self {
        self.author_date = Some(date);
        self
    }

    /// Author stamped on the next commit
    ///
    /// Fails with `InvalidAuthor` for a name or email that cannot be recorded.
    pub fn author(&self) -> Result<Author> {
        match self.author_date {
            Some(timestamp) => Author::new_with_timestamp(
                self.author_name.clone(),
                self.author_email.clone(),
                timestamp,
            ),
            None => Author::new(self.author_name.clone(), self.author_email.clone()),
        }
    }
}

/// Accepts RFC 2822 or `%Y-%m-%d %H:%M:%S %z`
pub fn parse_author_date(date_str: &str) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    chrono::DateTime::parse_from_rfc2822(date_str)
        .or_else(|_| chrono::DateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S %z"))
        .ok()
}
