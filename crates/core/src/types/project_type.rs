//! Project platform type.

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ProjectType`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("project type must be 'web' or 'mobile' (got '{0}')")]
pub struct ProjectTypeError(String);

/// Platform a portfolio project targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    #[default]
    Web,
    Mobile,
}

impl ProjectType {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Mobile => "mobile",
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectType {
    type Err = ProjectTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "web" => Ok(Self::Web),
            "mobile" => Ok(Self::Mobile),
            _ => Err(ProjectTypeError(s.to_owned())),
        }
    }
}
