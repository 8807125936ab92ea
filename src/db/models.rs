//! Database Models - structs representing database tables (used by sqlx/serde).
//!
//! Two independent domains share this module: the DevStudio playground
//! (users, projects, files, chat messages) and the CreativePort portfolio
//! builder (portfolio users, portfolios, pages, sections, media).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Playground domain
// ============================================================================

/// Playground user
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// New playground user for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// Project model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub template: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New project for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub user_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub template: String,
}

/// Partial project update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub template: Option<String>,
}

/// File or folder within a project. `kind` is `"file"` or `"folder"`;
/// `path` is unique within the owning project.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub id: i32,
    pub project_id: i32,
    pub parent_id: Option<i32>,
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New file for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFile {
    pub project_id: i32,
    pub parent_id: Option<i32>,
    pub name: String,
    pub path: String,
    pub kind: String,
    pub content: String,
}

/// Partial file update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFile {
    pub name: Option<String>,
    pub path: Option<String>,
    pub content: Option<String>,
}

/// Chat message. `role` is `"user"` or `"assistant"`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i32,
    pub project_id: i32,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// New chat message for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChatMessage {
    pub project_id: i32,
    pub role: String,
    pub content: String,
}

// ============================================================================
// Portfolio domain
// ============================================================================

/// Portfolio user (independent of the playground user table)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioUser {
    pub id: i32,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Portfolio model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub domain: Option<String>,
    pub template: String,
    pub theme: serde_json::Value,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New portfolio for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    pub user_id: i32,
    pub title: String,
    pub domain: Option<String>,
    pub template: String,
    pub theme: serde_json::Value,
    pub is_published: bool,
}

/// Partial portfolio update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePortfolio {
    pub title: Option<String>,
    pub domain: Option<String>,
    pub template: Option<String>,
    pub theme: Option<serde_json::Value>,
    pub is_published: Option<bool>,
}

/// Page within a portfolio. `(portfolio_id, order)` determines render
/// sequence.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: i32,
    pub portfolio_id: i32,
    pub title: String,
    pub slug: String,
    pub is_home_page: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New page for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPage {
    pub portfolio_id: i32,
    pub title: String,
    pub slug: String,
    pub is_home_page: bool,
    pub order: i32,
}

/// Typed content block within a page. `kind` is one of
/// hero/gallery/text/contact/video; `order` determines in-page stacking.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: i32,
    pub page_id: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: serde_json::Value,
    pub styles: serde_json::Value,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New section for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSection {
    pub page_id: i32,
    pub kind: String,
    pub content: serde_json::Value,
    pub styles: serde_json::Value,
    pub order: i32,
}

/// Partial section update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSection {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub content: Option<serde_json::Value>,
    pub styles: Option<serde_json::Value>,
    pub order: Option<i32>,
}

/// Uploaded media record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: i32,
    pub user_id: i32,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// New media record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedia {
    pub user_id: i32,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub url: String,
}
