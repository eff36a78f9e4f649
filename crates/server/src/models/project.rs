//! Portfolio project types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::{ProjectId, ProjectType};

use super::{ValidationError, optional, required};

/// A persisted portfolio project.
///
/// `images` is never empty and `images[0]` is always the cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub project_type: ProjectType,
    pub demo_link: Option<String>,
    pub repo_link: Option<String>,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// URL of the cover image.
    #[must_use]
    pub fn cover(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Gallery image URLs, in display order, excluding the cover.
    #[must_use]
    pub fn gallery(&self) -> &[String] {
        self.images.get(1..).unwrap_or_default()
    }
}

/// Raw project fields as submitted by the create form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub project_type: String,
    #[serde(default)]
    pub demo_link: Option<String>,
    #[serde(default)]
    pub repo_link: Option<String>,
    #[serde(default)]
    pub tags: String,
}

impl ProjectDraft {
    /// Check the text fields without consuming the draft.
    ///
    /// Run before any asset is uploaded so an invalid form never leaves
    /// blobs behind.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the title or description is blank or the
    /// project type is unknown.
    pub fn validate(&self) -> Result<(), ValidationError> {
        required(&self.title, "Title is required.")?;
        required(&self.description, "Description is required.")?;
        self.parsed_type()?;
        Ok(())
    }

    /// Combine the draft with uploaded image URLs into an insertable record.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any text field is invalid or `images` is
    /// empty.
    pub fn into_new_project(self, images: Vec<String>) -> Result<NewProject, ValidationError> {
        let project_type = self.parsed_type()?;
        let title = required(&self.title, "Title is required.")?;
        let description = required(&self.description, "Description is required.")?;

        if images.is_empty() {
            return Err(ValidationError::new("A cover image is required."));
        }

        Ok(NewProject {
            title,
            description,
            project_type,
            demo_link: optional(self.demo_link.as_deref()),
            repo_link: optional(self.repo_link.as_deref()),
            tags: parse_tags(&self.tags),
            images,
        })
    }

    /// Blank means the default (`web`), matching the form's preselected option.
    fn parsed_type(&self) -> Result<ProjectType, ValidationError> {
        if self.project_type.trim().is_empty() {
            return Ok(ProjectType::default());
        }
        self.project_type
            .parse()
            .map_err(|e: folio_core::ProjectTypeError| ValidationError::new(e.to_string()))
    }
}

/// A validated project ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub project_type: ProjectType,
    pub demo_link: Option<String>,
    pub repo_link: Option<String>,
    pub tags: Vec<String>,
    pub images: Vec<String>,
}

/// Parse a comma-separated tag list.
///
/// Tokens are trimmed and empty tokens dropped; order and duplicates are kept.
#[must_use]
pub fn parse_tags(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}
