//! Storage adapters for both domains.
//!
//! Route handlers talk to `PlaygroundStore` / `PortfolioStore` trait objects
//! so the in-memory adapter (tests, databaseless dev) and the Postgres
//! adapter are interchangeable. Cascading deletes are handled by foreign-key
//! constraints in the Postgres adapter; the in-memory adapter deletes only
//! the addressed row.

pub mod memory;
pub mod postgres;

pub use memory::MemStorage;
pub use postgres::PgStorage;

use async_trait::async_trait;
use thiserror::Error;

use crate::db::models::{
    ChatMessage, Media, NewChatMessage, NewFile, NewMedia, NewPage, NewPortfolio, NewProject,
    NewSection, NewUser, Page, Portfolio, PortfolioUser, Project, ProjectFile, Section,
    UpdateFile, UpdatePortfolio, UpdateProject, UpdateSection, User,
};

#[derive(Debug, Error)]
pub enum StorageError {
    /// Unique-constraint violation, e.g. a duplicate file path within a
    /// project or a duplicate portfolio domain.
    #[error("duplicate key: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// DevStudio playground storage: users, projects, files, chat messages.
#[async_trait]
pub trait PlaygroundStore: Send + Sync {
    async fn get_user(&self, id: i32) -> StorageResult<Option<User>>;
    async fn create_user(&self, user: NewUser) -> StorageResult<User>;

    async fn get_project(&self, id: i32) -> StorageResult<Option<Project>>;
    async fn projects_by_user(&self, user_id: i32) -> StorageResult<Vec<Project>>;
    async fn create_project(&self, project: NewProject) -> StorageResult<Project>;
    async fn update_project(&self, id: i32, updates: UpdateProject)
        -> StorageResult<Option<Project>>;
    async fn delete_project(&self, id: i32) -> StorageResult<bool>;

    async fn get_file(&self, id: i32) -> StorageResult<Option<ProjectFile>>;
    async fn files_by_project(&self, project_id: i32) -> StorageResult<Vec<ProjectFile>>;
    /// Fails with `Conflict` when the path already exists within the project.
    async fn create_file(&self, file: NewFile) -> StorageResult<ProjectFile>;
    async fn update_file(&self, id: i32, updates: UpdateFile)
        -> StorageResult<Option<ProjectFile>>;
    async fn delete_file(&self, id: i32) -> StorageResult<bool>;

    /// Messages in creation order.
    async fn chat_messages_by_project(&self, project_id: i32) -> StorageResult<Vec<ChatMessage>>;
    async fn create_chat_message(&self, message: NewChatMessage) -> StorageResult<ChatMessage>;
}

/// CreativePort portfolio storage: portfolio users, portfolios, pages,
/// sections, media.
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    async fn get_portfolio_user(&self, id: i32) -> StorageResult<Option<PortfolioUser>>;

    async fn get_portfolio(&self, id: i32) -> StorageResult<Option<Portfolio>>;
    async fn get_portfolio_by_domain(&self, domain: &str) -> StorageResult<Option<Portfolio>>;
    async fn portfolios_by_user(&self, user_id: i32) -> StorageResult<Vec<Portfolio>>;
    async fn create_portfolio(&self, portfolio: NewPortfolio) -> StorageResult<Portfolio>;
    async fn update_portfolio(
        &self,
        id: i32,
        updates: UpdatePortfolio,
    ) -> StorageResult<Option<Portfolio>>;
    async fn delete_portfolio(&self, id: i32) -> StorageResult<bool>;

    async fn get_page(&self, id: i32) -> StorageResult<Option<Page>>;
    /// Pages ordered by their `order` field.
    async fn pages_by_portfolio(&self, portfolio_id: i32) -> StorageResult<Vec<Page>>;
    async fn create_page(&self, page: NewPage) -> StorageResult<Page>;

    async fn get_section(&self, id: i32) -> StorageResult<Option<Section>>;
    /// Sections ordered by their `order` field.
    async fn sections_by_page(&self, page_id: i32) -> StorageResult<Vec<Section>>;
    async fn create_section(&self, section: NewSection) -> StorageResult<Section>;
    async fn update_section(
        &self,
        id: i32,
        updates: UpdateSection,
    ) -> StorageResult<Option<Section>>;
    async fn delete_section(&self, id: i32) -> StorageResult<bool>;
    /// Rewrite each listed section's `order` to its positional index.
    /// Sequential per-row updates, deliberately not transactional; sections
    /// outside `page_id` are left untouched.
    async fn reorder_sections(&self, page_id: i32, section_ids: &[i32]) -> StorageResult<()>;

    async fn get_media(&self, id: i32) -> StorageResult<Option<Media>>;
    /// Newest first.
    async fn media_by_user(&self, user_id: i32) -> StorageResult<Vec<Media>>;
    async fn create_media(&self, media: NewMedia) -> StorageResult<Media>;
    async fn delete_media(&self, id: i32) -> StorageResult<bool>;
}
