//! In-memory storage adapter.
//!
//! Backs both domains with maps behind a single `RwLock`. Seeds the demo
//! identity on construction so the service works without a database. Does
//! not cascade deletes.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{PlaygroundStore, PortfolioStore, StorageError, StorageResult};
use crate::db::models::{
    ChatMessage, Media, NewChatMessage, NewFile, NewMedia, NewPage, NewPortfolio, NewProject,
    NewSection, NewUser, Page, Portfolio, PortfolioUser, Project, ProjectFile, Section,
    UpdateFile, UpdatePortfolio, UpdateProject, UpdateSection, User,
};

#[derive(Default)]
struct MemState {
    users: HashMap<i32, User>,
    projects: HashMap<i32, Project>,
    files: HashMap<i32, ProjectFile>,
    chat_messages: HashMap<i32, ChatMessage>,
    portfolio_users: HashMap<i32, PortfolioUser>,
    portfolios: HashMap<i32, Portfolio>,
    pages: HashMap<i32, Page>,
    sections: HashMap<i32, Section>,
    media: HashMap<i32, Media>,
    next_user_id: i32,
    next_project_id: i32,
    next_file_id: i32,
    next_chat_id: i32,
    next_portfolio_user_id: i32,
    next_portfolio_id: i32,
    next_page_id: i32,
    next_section_id: i32,
    next_media_id: i32,
}

impl MemState {
    fn new() -> Self {
        Self {
            next_user_id: 1,
            next_project_id: 1,
            next_file_id: 1,
            next_chat_id: 1,
            next_portfolio_user_id: 1,
            next_portfolio_id: 1,
            next_page_id: 1,
            next_section_id: 1,
            next_media_id: 1,
            ..Default::default()
        }
    }
}

pub struct MemStorage {
    state: RwLock<MemState>,
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStorage {
    /// Create an empty store seeded with the demo user in both domains.
    pub fn new() -> Self {
        let mut state = MemState::new();

        let user_id = state.next_user_id;
        state.next_user_id += 1;
        state.users.insert(
            user_id,
            User {
                id: user_id,
                username: "demo".to_string(),
                password: "demo".to_string(),
                name: "Demo User".to_string(),
                email: "demo@example.com".to_string(),
                avatar: None,
            },
        );

        let now = Utc::now();
        let pf_user_id = state.next_portfolio_user_id;
        state.next_portfolio_user_id += 1;
        state.portfolio_users.insert(
            pf_user_id,
            PortfolioUser {
                id: pf_user_id,
                email: "demo@example.com".to_string(),
                first_name: Some("Demo".to_string()),
                last_name: Some("User".to_string()),
                avatar: None,
                created_at: now,
                updated_at: now,
            },
        );

        Self {
            state: RwLock::new(state),
        }
    }
}

#[async_trait]
impl PlaygroundStore for MemStorage {
    async fn get_user(&self, id: i32) -> StorageResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(StorageError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        let id = state.next_user_id;
        state.next_user_id += 1;
        let user = User {
            id,
            username: user.username,
            password: user.password,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_project(&self, id: i32) -> StorageResult<Option<Project>> {
        Ok(self.state.read().await.projects.get(&id).cloned())
    }

    async fn projects_by_user(&self, user_id: i32) -> StorageResult<Vec<Project>> {
        let state = self.state.read().await;
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        projects.sort_by_key(|p| p.id);
        Ok(projects)
    }

    async fn create_project(&self, project: NewProject) -> StorageResult<Project> {
        let mut state = self.state.write().await;
        let id = state.next_project_id;
        state.next_project_id += 1;
        let now = Utc::now();
        let project = Project {
            id,
            user_id: project.user_id,
            name: project.name,
            description: project.description,
            template: project.template,
            created_at: now,
            updated_at: now,
        };
        state.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        id: i32,
        updates: UpdateProject,
    ) -> StorageResult<Option<Project>> {
        let mut state = self.state.write().await;
        let Some(project) = state.projects.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = updates.name {
            project.name = name;
        }
        if let Some(description) = updates.description {
            project.description = Some(description);
        }
        if let Some(template) = updates.template {
            project.template = template;
        }
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: i32) -> StorageResult<bool> {
        // No cascade: files and chat messages of the project are left behind.
        Ok(self.state.write().await.projects.remove(&id).is_some())
    }

    async fn get_file(&self, id: i32) -> StorageResult<Option<ProjectFile>> {
        Ok(self.state.read().await.files.get(&id).cloned())
    }

    async fn files_by_project(&self, project_id: i32) -> StorageResult<Vec<ProjectFile>> {
        let state = self.state.read().await;
        let mut files: Vec<ProjectFile> = state
            .files
            .values()
            .filter(|f| f.project_id == project_id)
            .cloned()
            .collect();
        files.sort_by_key(|f| f.id);
        Ok(files)
    }

    async fn create_file(&self, file: NewFile) -> StorageResult<ProjectFile> {
        let mut state = self.state.write().await;
        if state
            .files
            .values()
            .any(|f| f.project_id == file.project_id && f.path == file.path)
        {
            return Err(StorageError::Conflict(format!(
                "path '{}' already exists in project {}",
                file.path, file.project_id
            )));
        }
        let id = state.next_file_id;
        state.next_file_id += 1;
        let now = Utc::now();
        let file = ProjectFile {
            id,
            project_id: file.project_id,
            parent_id: file.parent_id,
            name: file.name,
            path: file.path,
            kind: file.kind,
            content: file.content,
            created_at: now,
            updated_at: now,
        };
        state.files.insert(id, file.clone());
        Ok(file)
    }

    async fn update_file(
        &self,
        id: i32,
        updates: UpdateFile,
    ) -> StorageResult<Option<ProjectFile>> {
        let mut state = self.state.write().await;
        let Some(current) = state.files.get(&id) else {
            return Ok(None);
        };
        if let Some(ref path) = updates.path {
            let project_id = current.project_id;
            if state
                .files
                .values()
                .any(|f| f.id != id && f.project_id == project_id && &f.path == path)
            {
                return Err(StorageError::Conflict(format!(
                    "path '{}' already exists in project {}",
                    path, project_id
                )));
            }
        }
        let Some(file) = state.files.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = updates.name {
            file.name = name;
        }
        if let Some(path) = updates.path {
            file.path = path;
        }
        if let Some(content) = updates.content {
            file.content = content;
        }
        file.updated_at = Utc::now();
        Ok(Some(file.clone()))
    }

    async fn delete_file(&self, id: i32) -> StorageResult<bool> {
        Ok(self.state.write().await.files.remove(&id).is_some())
    }

    async fn chat_messages_by_project(&self, project_id: i32) -> StorageResult<Vec<ChatMessage>> {
        let state = self.state.read().await;
        let mut messages: Vec<ChatMessage> = state
            .chat_messages
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.id);
        Ok(messages)
    }

    async fn create_chat_message(&self, message: NewChatMessage) -> StorageResult<ChatMessage> {
        let mut state = self.state.write().await;
        let id = state.next_chat_id;
        state.next_chat_id += 1;
        let message = ChatMessage {
            id,
            project_id: message.project_id,
            role: message.role,
            content: message.content,
            created_at: Utc::now(),
        };
        state.chat_messages.insert(id, message.clone());
        Ok(message)
    }
}

#[async_trait]
impl PortfolioStore for MemStorage {
    async fn get_portfolio_user(&self, id: i32) -> StorageResult<Option<PortfolioUser>> {
        Ok(self.state.read().await.portfolio_users.get(&id).cloned())
    }

    async fn get_portfolio(&self, id: i32) -> StorageResult<Option<Portfolio>> {
        Ok(self.state.read().await.portfolios.get(&id).cloned())
    }

    async fn get_portfolio_by_domain(&self, domain: &str) -> StorageResult<Option<Portfolio>> {
        let state = self.state.read().await;
        Ok(state
            .portfolios
            .values()
            .find(|p| p.domain.as_deref() == Some(domain))
            .cloned())
    }

    async fn portfolios_by_user(&self, user_id: i32) -> StorageResult<Vec<Portfolio>> {
        let state = self.state.read().await;
        let mut portfolios: Vec<Portfolio> = state
            .portfolios
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        portfolios.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(portfolios)
    }

    async fn create_portfolio(&self, portfolio: NewPortfolio) -> StorageResult<Portfolio> {
        let mut state = self.state.write().await;
        if let Some(ref domain) = portfolio.domain {
            if state
                .portfolios
                .values()
                .any(|p| p.domain.as_deref() == Some(domain.as_str()))
            {
                return Err(StorageError::Conflict(format!(
                    "domain '{}' already exists",
                    domain
                )));
            }
        }
        let id = state.next_portfolio_id;
        state.next_portfolio_id += 1;
        let now = Utc::now();
        let portfolio = Portfolio {
            id,
            user_id: portfolio.user_id,
            title: portfolio.title,
            domain: portfolio.domain,
            template: portfolio.template,
            theme: portfolio.theme,
            is_published: portfolio.is_published,
            created_at: now,
            updated_at: now,
        };
        state.portfolios.insert(id, portfolio.clone());
        Ok(portfolio)
    }

    async fn update_portfolio(
        &self,
        id: i32,
        updates: UpdatePortfolio,
    ) -> StorageResult<Option<Portfolio>> {
        let mut state = self.state.write().await;
        if let Some(ref domain) = updates.domain {
            if state
                .portfolios
                .values()
                .any(|p| p.id != id && p.domain.as_deref() == Some(domain.as_str()))
            {
                return Err(StorageError::Conflict(format!(
                    "domain '{}' already exists",
                    domain
                )));
            }
        }
        let Some(portfolio) = state.portfolios.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = updates.title {
            portfolio.title = title;
        }
        if let Some(domain) = updates.domain {
            portfolio.domain = Some(domain);
        }
        if let Some(template) = updates.template {
            portfolio.template = template;
        }
        if let Some(theme) = updates.theme {
            portfolio.theme = theme;
        }
        if let Some(is_published) = updates.is_published {
            portfolio.is_published = is_published;
        }
        portfolio.updated_at = Utc::now();
        Ok(Some(portfolio.clone()))
    }

    async fn delete_portfolio(&self, id: i32) -> StorageResult<bool> {
        // No cascade: pages and sections of the portfolio are left behind.
        Ok(self.state.write().await.portfolios.remove(&id).is_some())
    }

    async fn get_page(&self, id: i32) -> StorageResult<Option<Page>> {
        Ok(self.state.read().await.pages.get(&id).cloned())
    }

    async fn pages_by_portfolio(&self, portfolio_id: i32) -> StorageResult<Vec<Page>> {
        let state = self.state.read().await;
        let mut pages: Vec<Page> = state
            .pages
            .values()
            .filter(|p| p.portfolio_id == portfolio_id)
            .cloned()
            .collect();
        pages.sort_by_key(|p| (p.order, p.id));
        Ok(pages)
    }

    async fn create_page(&self, page: NewPage) -> StorageResult<Page> {
        let mut state = self.state.write().await;
        let id = state.next_page_id;
        state.next_page_id += 1;
        let now = Utc::now();
        let page = Page {
            id,
            portfolio_id: page.portfolio_id,
            title: page.title,
            slug: page.slug,
            is_home_page: page.is_home_page,
            order: page.order,
            created_at: now,
            updated_at: now,
        };
        state.pages.insert(id, page.clone());
        Ok(page)
    }

    async fn get_section(&self, id: i32) -> StorageResult<Option<Section>> {
        Ok(self.state.read().await.sections.get(&id).cloned())
    }

    async fn sections_by_page(&self, page_id: i32) -> StorageResult<Vec<Section>> {
        let state = self.state.read().await;
        let mut sections: Vec<Section> = state
            .sections
            .values()
            .filter(|s| s.page_id == page_id)
            .cloned()
            .collect();
        sections.sort_by_key(|s| (s.order, s.id));
        Ok(sections)
    }

    async fn create_section(&self, section: NewSection) -> StorageResult<Section> {
        let mut state = self.state.write().await;
        let id = state.next_section_id;
        state.next_section_id += 1;
        let now = Utc::now();
        let section = Section {
            id,
            page_id: section.page_id,
            kind: section.kind,
            content: section.content,
            styles: section.styles,
            order: section.order,
            created_at: now,
            updated_at: now,
        };
        state.sections.insert(id, section.clone());
        Ok(section)
    }

    async fn update_section(
        &self,
        id: i32,
        updates: UpdateSection,
    ) -> StorageResult<Option<Section>> {
        let mut state = self.state.write().await;
        let Some(section) = state.sections.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(kind) = updates.kind {
            section.kind = kind;
        }
        if let Some(content) = updates.content {
            section.content = content;
        }
        if let Some(styles) = updates.styles {
            section.styles = styles;
        }
        if let Some(order) = updates.order {
            section.order = order;
        }
        section.updated_at = Utc::now();
        Ok(Some(section.clone()))
    }

    async fn delete_section(&self, id: i32) -> StorageResult<bool> {
        Ok(self.state.write().await.sections.remove(&id).is_some())
    }

    async fn reorder_sections(&self, page_id: i32, section_ids: &[i32]) -> StorageResult<()> {
        let mut state = self.state.write().await;
        for (position, section_id) in section_ids.iter().enumerate() {
            if let Some(section) = state.sections.get_mut(section_id) {
                if section.page_id == page_id {
                    section.order = position as i32;
                }
            }
        }
        Ok(())
    }

    async fn get_media(&self, id: i32) -> StorageResult<Option<Media>> {
        Ok(self.state.read().await.media.get(&id).cloned())
    }

    async fn media_by_user(&self, user_id: i32) -> StorageResult<Vec<Media>> {
        let state = self.state.read().await;
        let mut media: Vec<Media> = state
            .media
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        media.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(media)
    }

    async fn create_media(&self, media: NewMedia) -> StorageResult<Media> {
        let mut state = self.state.write().await;
        let id = state.next_media_id;
        state.next_media_id += 1;
        let media = Media {
            id,
            user_id: media.user_id,
            filename: media.filename,
            original_name: media.original_name,
            mime_type: media.mime_type,
            size: media.size,
            url: media.url,
            created_at: Utc::now(),
        };
        state.media.insert(id, media.clone());
        Ok(media)
    }

    async fn delete_media(&self, id: i32) -> StorageResult<bool> {
        Ok(self.state.write().await.media.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_file(project_id: i32, path: &str) -> NewFile {
        NewFile {
            project_id,
            parent_id: None,
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            kind: "file".to_string(),
            content: String::new(),
        }
    }

    #[tokio::test]
    async fn test_seeds_demo_users() {
        let store = MemStorage::new();
        let user = PlaygroundStore::get_user(&store, 1).await.unwrap().unwrap();
        assert_eq!(user.username, "demo");
        let pf_user = store.get_portfolio_user(1).await.unwrap().unwrap();
        assert_eq!(pf_user.email, "demo@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_file_path_conflicts() {
        let store = MemStorage::new();
        let project = store
            .create_project(NewProject {
                user_id: 1,
                name: "p".to_string(),
                description: None,
                template: "React App".to_string(),
            })
            .await
            .unwrap();

        store.create_file(new_file(project.id, "/a.js")).await.unwrap();
        let err = store.create_file(new_file(project.id, "/a.js")).await;
        assert!(matches!(err, Err(StorageError::Conflict(_))));

        // Same path in a different project is fine.
        let other = store
            .create_project(NewProject {
                user_id: 1,
                name: "q".to_string(),
                description: None,
                template: "React App".to_string(),
            })
            .await
            .unwrap();
        assert!(store.create_file(new_file(other.id, "/a.js")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_file_restamps_updated_at() {
        let store = MemStorage::new();
        let project = store
            .create_project(NewProject {
                user_id: 1,
                name: "p".to_string(),
                description: None,
                template: "React App".to_string(),
            })
            .await
            .unwrap();
        let file = store.create_file(new_file(project.id, "/a.js")).await.unwrap();

        let updated = store
            .update_file(
                file.id,
                UpdateFile {
                    content: Some("console.log(1)".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.content, "console.log(1)");
        assert!(updated.updated_at >= file.updated_at);
    }

    #[tokio::test]
    async fn test_delete_project_does_not_cascade() {
        let store = MemStorage::new();
        let project = store
            .create_project(NewProject {
                user_id: 1,
                name: "p".to_string(),
                description: None,
                template: "React App".to_string(),
            })
            .await
            .unwrap();
        store.create_file(new_file(project.id, "/a.js")).await.unwrap();

        assert!(store.delete_project(project.id).await.unwrap());
        assert!(!store.delete_project(project.id).await.unwrap());
        // Orphaned file survives the project delete.
        assert_eq!(store.files_by_project(project.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_chat_messages_listed_in_creation_order() {
        let store = MemStorage::new();
        for i in 0..3 {
            store
                .create_chat_message(NewChatMessage {
                    project_id: 7,
                    role: if i % 2 == 0 { "user" } else { "assistant" }.to_string(),
                    content: format!("m{}", i),
                })
                .await
                .unwrap();
        }
        let messages = store.chat_messages_by_project(7).await.unwrap();
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m0", "m1", "m2"]);
    }

    #[tokio::test]
    async fn test_reorder_sections_all_permutations() {
        let store = MemStorage::new();
        let mut ids = Vec::new();
        for i in 0..3 {
            let section = store
                .create_section(NewSection {
                    page_id: 1,
                    kind: "text".to_string(),
                    content: serde_json::json!({}),
                    styles: serde_json::json!({}),
                    order: i,
                })
                .await
                .unwrap();
            ids.push(section.id);
        }

        let permutations = [
            [ids[0], ids[1], ids[2]],
            [ids[0], ids[2], ids[1]],
            [ids[1], ids[0], ids[2]],
            [ids[1], ids[2], ids[0]],
            [ids[2], ids[0], ids[1]],
            [ids[2], ids[1], ids[0]],
        ];
        for perm in permutations {
            store.reorder_sections(1, &perm).await.unwrap();
            for (position, id) in perm.iter().enumerate() {
                let section = store.get_section(*id).await.unwrap().unwrap();
                assert_eq!(section.order, position as i32);
            }
            let listed: Vec<i32> = store
                .sections_by_page(1)
                .await
                .unwrap()
                .iter()
                .map(|s| s.id)
                .collect();
            assert_eq!(listed, perm.to_vec());
        }
    }

    #[tokio::test]
    async fn test_reorder_skips_sections_of_other_pages() {
        let store = MemStorage::new();
        let mine = store
            .create_section(NewSection {
                page_id: 1,
                kind: "text".to_string(),
                content: serde_json::json!({}),
                styles: serde_json::json!({}),
                order: 0,
            })
            .await
            .unwrap();
        let foreign = store
            .create_section(NewSection {
                page_id: 2,
                kind: "text".to_string(),
                content: serde_json::json!({}),
                styles: serde_json::json!({}),
                order: 5,
            })
            .await
            .unwrap();

        store
            .reorder_sections(1, &[foreign.id, mine.id])
            .await
            .unwrap();
        assert_eq!(store.get_section(foreign.id).await.unwrap().unwrap().order, 5);
        assert_eq!(store.get_section(mine.id).await.unwrap().unwrap().order, 1);
    }

    #[tokio::test]
    async fn test_portfolio_domain_unique() {
        let store = MemStorage::new();
        let new = |domain: Option<&str>| NewPortfolio {
            user_id: 1,
            title: "t".to_string(),
            domain: domain.map(str::to_string),
            template: "minimal".to_string(),
            theme: serde_json::json!({}),
            is_published: false,
        };
        store.create_portfolio(new(Some("me.dev"))).await.unwrap();
        assert!(matches!(
            store.create_portfolio(new(Some("me.dev"))).await,
            Err(StorageError::Conflict(_))
        ));
        // Domainless portfolios never conflict.
        store.create_portfolio(new(None)).await.unwrap();
        store.create_portfolio(new(None)).await.unwrap();
    }

    #[tokio::test]
    async fn test_media_listed_newest_first() {
        let store = MemStorage::new();
        for i in 0..3 {
            store
                .create_media(NewMedia {
                    user_id: 1,
                    filename: format!("f{}.png", i),
                    original_name: format!("o{}.png", i),
                    mime_type: "image/png".to_string(),
                    size: 10,
                    url: format!("/uploads/f{}.png", i),
                })
                .await
                .unwrap();
        }
        let media = store.media_by_user(1).await.unwrap();
        let names: Vec<_> = media.iter().map(|m| m.filename.as_str()).collect();
        assert_eq!(names, vec!["f2.png", "f1.png", "f0.png"]);
    }
}
