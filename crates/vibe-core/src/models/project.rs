use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::storage_types::StorageProvider;

/// Editor mode a project belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "project_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    MagicClipper,
    AiRemix,
    VibeEditor,
    PptConverter,
    MotionGraphics,
}

impl FromStr for ProjectType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "magic_clipper" => Ok(ProjectType::MagicClipper),
            "ai_remix" => Ok(ProjectType::AiRemix),
            "vibe_editor" => Ok(ProjectType::VibeEditor),
            "ppt_converter" => Ok(ProjectType::PptConverter),
            "motion_graphics" => Ok(ProjectType::MotionGraphics),
            _ => Err(anyhow::anyhow!("Invalid project type: {}", s)),
        }
    }
}

impl Display for ProjectType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            ProjectType::MagicClipper => "magic_clipper",
            ProjectType::AiRemix => "ai_remix",
            ProjectType::VibeEditor => "vibe_editor",
            ProjectType::PptConverter => "ppt_converter",
            ProjectType::MotionGraphics => "motion_graphics",
        };
        write!(f, "{}", name)
    }
}

/// Editor project with its free-form editor document
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub user_id: i64,
    pub project_name: String,
    pub project_type: ProjectType,
    pub project_data: serde_json::Value,
    pub storage_provider: Option<StorageProvider>,
    pub file_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateProjectRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "Project name must be at most 255 characters"))]
    pub project_name: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "Project name must be between 1 and 255 characters"
    ))]
    pub project_name: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub project_data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectSummary {
    pub id: i64,
    pub project_name: String,
    pub project_type: ProjectType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectDetail {
    pub id: i64,
    pub project_name: String,
    pub project_type: ProjectType,
    pub project_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<Project> for ProjectSummary {
    fn from(project: Project) -> Self {
        ProjectSummary {
            id: project.id,
            project_name: project.project_name,
            project_type: project.project_type,
            created_at: project.created_at,
        }
    }
}

impl From<Project> for ProjectDetail {
    fn from(project: Project) -> Self {
        ProjectDetail {
            id: project.id,
            project_name: project.project_name,
            project_type: project.project_type,
            project_data: project.project_data,
            created_at: project.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_type_round_trips_through_text() {
        for name in [
            "magic_clipper",
            "ai_remix",
            "vibe_editor",
            "ppt_converter",
            "motion_graphics",
        ] {
            let parsed: ProjectType = name.parse().unwrap();
            assert_eq!(parsed.to_string(), name);
        }
    }

    #[test]
    fn test_project_type_rejects_unknown() {
        assert!("slideshow".parse::<ProjectType>().is_err());
        assert!("MagicClipper".parse::<ProjectType>().is_err());
    }
}
