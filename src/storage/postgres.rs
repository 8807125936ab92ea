//! Postgres storage adapter.
//!
//! Thin sqlx layer over the schemas created in `db::run_migrations`.
//! Partial updates use `COALESCE` so absent fields keep their stored value;
//! cascading deletes are handled by the foreign-key constraints.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use super::{PlaygroundStore, PortfolioStore, StorageError, StorageResult};
use crate::db::models::{
    ChatMessage, Media, NewChatMessage, NewFile, NewMedia, NewPage, NewPortfolio, NewProject,
    NewSection, NewUser, Page, Portfolio, PortfolioUser, Project, ProjectFile, Section,
    UpdateFile, UpdatePortfolio, UpdateProject, UpdateSection, User,
};

pub struct PgStorage {
    pool: Arc<PgPool>,
}

impl PgStorage {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn map_db_err(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StorageError::Conflict(db.message().to_string())
        }
        _ => StorageError::Database(e),
    }
}

const PROJECT_COLS: &str = "id, user_id, name, description, template, created_at, updated_at";
const FILE_COLS: &str =
    "id, project_id, parent_id, name, path, kind, content, created_at, updated_at";
const PORTFOLIO_COLS: &str =
    "id, user_id, title, domain, template, theme, is_published, created_at, updated_at";
const PAGE_COLS: &str =
    r#"id, portfolio_id, title, slug, is_home_page, "order", created_at, updated_at"#;
const SECTION_COLS: &str =
    r#"id, page_id, kind, content, styles, "order", created_at, updated_at"#;
const MEDIA_COLS: &str = "id, user_id, filename, original_name, mime_type, size, url, created_at";

#[async_trait]
impl PlaygroundStore for PgStorage {
    async fn get_user(&self, id: i32) -> StorageResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password, name, email, avatar FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn create_user(&self, user: NewUser) -> StorageResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, name, email, avatar)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, password, name, email, avatar
            "#,
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.avatar)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn get_project(&self, id: i32) -> StorageResult<Option<Project>> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE id = $1",
            PROJECT_COLS
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn projects_by_user(&self, user_id: i32) -> StorageResult<Vec<Project>> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE user_id = $1 ORDER BY id",
            PROJECT_COLS
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn create_project(&self, project: NewProject) -> StorageResult<Project> {
        sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (user_id, name, description, template)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            PROJECT_COLS
        ))
        .bind(project.user_id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.template)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn update_project(
        &self,
        id: i32,
        updates: UpdateProject,
    ) -> StorageResult<Option<Project>> {
        sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE projects
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                template = COALESCE($3, template),
                updated_at = now()
            WHERE id = $4
            RETURNING {}
            "#,
            PROJECT_COLS
        ))
        .bind(&updates.name)
        .bind(&updates.description)
        .bind(&updates.template)
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn delete_project(&self, id: i32) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_file(&self, id: i32) -> StorageResult<Option<ProjectFile>> {
        sqlx::query_as::<_, ProjectFile>(&format!("SELECT {} FROM files WHERE id = $1", FILE_COLS))
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(map_db_err)
    }

    async fn files_by_project(&self, project_id: i32) -> StorageResult<Vec<ProjectFile>> {
        sqlx::query_as::<_, ProjectFile>(&format!(
            "SELECT {} FROM files WHERE project_id = $1 ORDER BY id",
            FILE_COLS
        ))
        .bind(project_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn create_file(&self, file: NewFile) -> StorageResult<ProjectFile> {
        sqlx::query_as::<_, ProjectFile>(&format!(
            r#"
            INSERT INTO files (project_id, parent_id, name, path, kind, content)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            FILE_COLS
        ))
        .bind(file.project_id)
        .bind(file.parent_id)
        .bind(&file.name)
        .bind(&file.path)
        .bind(&file.kind)
        .bind(&file.content)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn update_file(
        &self,
        id: i32,
        updates: UpdateFile,
    ) -> StorageResult<Option<ProjectFile>> {
        sqlx::query_as::<_, ProjectFile>(&format!(
            r#"
            UPDATE files
            SET name = COALESCE($1, name),
                path = COALESCE($2, path),
                content = COALESCE($3, content),
                updated_at = now()
            WHERE id = $4
            RETURNING {}
            "#,
            FILE_COLS
        ))
        .bind(&updates.name)
        .bind(&updates.path)
        .bind(&updates.content)
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn delete_file(&self, id: i32) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn chat_messages_by_project(&self, project_id: i32) -> StorageResult<Vec<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, project_id, role, content, created_at
            FROM chat_messages
            WHERE project_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(project_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn create_chat_message(&self, message: NewChatMessage) -> StorageResult<ChatMessage> {
        sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (project_id, role, content)
            VALUES ($1, $2, $3)
            RETURNING id, project_id, role, content, created_at
            "#,
        )
        .bind(message.project_id)
        .bind(&message.role)
        .bind(&message.content)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }
}

#[async_trait]
impl PortfolioStore for PgStorage {
    async fn get_portfolio_user(&self, id: i32) -> StorageResult<Option<PortfolioUser>> {
        sqlx::query_as::<_, PortfolioUser>(
            r#"
            SELECT id, email, first_name, last_name, avatar, created_at, updated_at
            FROM portfolio_users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn get_portfolio(&self, id: i32) -> StorageResult<Option<Portfolio>> {
        sqlx::query_as::<_, Portfolio>(&format!(
            "SELECT {} FROM portfolios WHERE id = $1",
            PORTFOLIO_COLS
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn get_portfolio_by_domain(&self, domain: &str) -> StorageResult<Option<Portfolio>> {
        sqlx::query_as::<_, Portfolio>(&format!(
            "SELECT {} FROM portfolios WHERE domain = $1",
            PORTFOLIO_COLS
        ))
        .bind(domain)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn portfolios_by_user(&self, user_id: i32) -> StorageResult<Vec<Portfolio>> {
        sqlx::query_as::<_, Portfolio>(&format!(
            "SELECT {} FROM portfolios WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            PORTFOLIO_COLS
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn create_portfolio(&self, portfolio: NewPortfolio) -> StorageResult<Portfolio> {
        sqlx::query_as::<_, Portfolio>(&format!(
            r#"
            INSERT INTO portfolios (user_id, title, domain, template, theme, is_published)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PORTFOLIO_COLS
        ))
        .bind(portfolio.user_id)
        .bind(&portfolio.title)
        .bind(&portfolio.domain)
        .bind(&portfolio.template)
        .bind(&portfolio.theme)
        .bind(portfolio.is_published)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn update_portfolio(
        &self,
        id: i32,
        updates: UpdatePortfolio,
    ) -> StorageResult<Option<Portfolio>> {
        sqlx::query_as::<_, Portfolio>(&format!(
            r#"
            UPDATE portfolios
            SET title = COALESCE($1, title),
                domain = COALESCE($2, domain),
                template = COALESCE($3, template),
                theme = COALESCE($4, theme),
                is_published = COALESCE($5, is_published),
                updated_at = now()
            WHERE id = $6
            RETURNING {}
            "#,
            PORTFOLIO_COLS
        ))
        .bind(&updates.title)
        .bind(&updates.domain)
        .bind(&updates.template)
        .bind(&updates.theme)
        .bind(updates.is_published)
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn delete_portfolio(&self, id: i32) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM portfolios WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_page(&self, id: i32) -> StorageResult<Option<Page>> {
        sqlx::query_as::<_, Page>(&format!("SELECT {} FROM pages WHERE id = $1", PAGE_COLS))
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(map_db_err)
    }

    async fn pages_by_portfolio(&self, portfolio_id: i32) -> StorageResult<Vec<Page>> {
        sqlx::query_as::<_, Page>(&format!(
            r#"SELECT {} FROM pages WHERE portfolio_id = $1 ORDER BY "order", id"#,
            PAGE_COLS
        ))
        .bind(portfolio_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn create_page(&self, page: NewPage) -> StorageResult<Page> {
        sqlx::query_as::<_, Page>(&format!(
            r#"
            INSERT INTO pages (portfolio_id, title, slug, is_home_page, "order")
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PAGE_COLS
        ))
        .bind(page.portfolio_id)
        .bind(&page.title)
        .bind(&page.slug)
        .bind(page.is_home_page)
        .bind(page.order)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn get_section(&self, id: i32) -> StorageResult<Option<Section>> {
        sqlx::query_as::<_, Section>(&format!(
            "SELECT {} FROM sections WHERE id = $1",
            SECTION_COLS
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn sections_by_page(&self, page_id: i32) -> StorageResult<Vec<Section>> {
        sqlx::query_as::<_, Section>(&format!(
            r#"SELECT {} FROM sections WHERE page_id = $1 ORDER BY "order", id"#,
            SECTION_COLS
        ))
        .bind(page_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn create_section(&self, section: NewSection) -> StorageResult<Section> {
        sqlx::query_as::<_, Section>(&format!(
            r#"
            INSERT INTO sections (page_id, kind, content, styles, "order")
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            SECTION_COLS
        ))
        .bind(section.page_id)
        .bind(&section.kind)
        .bind(&section.content)
        .bind(&section.styles)
        .bind(section.order)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn update_section(
        &self,
        id: i32,
        updates: UpdateSection,
    ) -> StorageResult<Option<Section>> {
        sqlx::query_as::<_, Section>(&format!(
            r#"
            UPDATE sections
            SET kind = COALESCE($1, kind),
                content = COALESCE($2, content),
                styles = COALESCE($3, styles),
                "order" = COALESCE($4, "order"),
                updated_at = now()
            WHERE id = $5
            RETURNING {}
            "#,
            SECTION_COLS
        ))
        .bind(&updates.kind)
        .bind(&updates.content)
        .bind(&updates.styles)
        .bind(updates.order)
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn delete_section(&self, id: i32) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM sections WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn reorder_sections(&self, page_id: i32, section_ids: &[i32]) -> StorageResult<()> {
        for (position, section_id) in section_ids.iter().enumerate() {
            sqlx::query(r#"UPDATE sections SET "order" = $1 WHERE id = $2 AND page_id = $3"#)
                .bind(position as i32)
                .bind(section_id)
                .bind(page_id)
                .execute(self.pool.as_ref())
                .await
                .map_err(map_db_err)?;
        }
        Ok(())
    }

    async fn get_media(&self, id: i32) -> StorageResult<Option<Media>> {
        sqlx::query_as::<_, Media>(&format!("SELECT {} FROM media WHERE id = $1", MEDIA_COLS))
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(map_db_err)
    }

    async fn media_by_user(&self, user_id: i32) -> StorageResult<Vec<Media>> {
        sqlx::query_as::<_, Media>(&format!(
            "SELECT {} FROM media WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            MEDIA_COLS
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn create_media(&self, media: NewMedia) -> StorageResult<Media> {
        sqlx::query_as::<_, Media>(&format!(
            r#"
            INSERT INTO media (user_id, filename, original_name, mime_type, size, url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            MEDIA_COLS
        ))
        .bind(media.user_id)
        .bind(&media.filename)
        .bind(&media.original_name)
        .bind(&media.mime_type)
        .bind(media.size)
        .bind(&media.url)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_db_err)
    }

    async fn delete_media(&self, id: i32) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }
}
