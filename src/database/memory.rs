//! In-memory backend with the same semantics as the PostgreSQL repositories,
//! except that note search does not stem words (see `search`).
//!
//! Every operation takes the single lock for its whole duration, so a delete
//! and its cascade are applied together.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{Folder, NewUser, Note, NoteDraft, NoteFilter, Tag, UserRecord};
use crate::database::search::{words, WebQuery};
use crate::database::repository::{
    CascadeReport, FolderRepository, NoteRepository, RepositoryError, RepositoryResult, TagRepository,
    UserRepository,
};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, UserRecord>,
    folders: HashMap<Uuid, Folder>,
    tags: HashMap<Uuid, Tag>,
    notes: HashMap<Uuid, Note>,
}

impl Collections {
    fn folder_name_taken(&self, owner: Uuid, name: &str, except: Option<Uuid>) -> bool {
        self.folders
            .values()
            .any(|f| f.user_id == owner && f.name == name && Some(f.id) != except)
    }

    fn tag_name_taken(&self, owner: Uuid, name: &str, except: Option<Uuid>) -> bool {
        self.tags
            .values()
            .any(|t| t.user_id == owner && t.name == name && Some(t.id) != except)
    }

    fn check_references(&self, owner: Uuid, draft: &NoteDraft) -> RepositoryResult<()> {
        if let Some(folder_id) = draft.folder_id {
            match self.folders.get(&folder_id) {
                Some(folder) if folder.user_id == owner => {}
                _ => return Err(RepositoryError::invalid_folder()),
            }
        }

        let all_owned = draft
            .tag_ids
            .iter()
            .all(|id| self.tags.get(id).is_some_and(|t| t.user_id == owner));
        if !all_owned {
            return Err(RepositoryError::invalid_tags());
        }

        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_folders(mut folders: Vec<Folder>) -> Vec<Folder> {
    folders.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    folders
}

fn sort_tags(mut tags: Vec<Tag>) -> Vec<Tag> {
    tags.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    tags
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: NewUser) -> RepositoryResult<UserRecord> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::DuplicateUsername);
        }

        let record = UserRecord {
            id: Uuid::now_v7(),
            username: user.username,
            password_hash: user.password_hash,
            fullname: user.fullname,
            created_at: Utc::now(),
        };
        inner.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<UserRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl FolderRepository for MemoryStore {
    async fn list(&self, owner: Uuid) -> RepositoryResult<Vec<Folder>> {
        let inner = self.inner.read().await;
        let folders = inner.folders.values().filter(|f| f.user_id == owner).cloned().collect();
        Ok(sort_folders(folders))
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> RepositoryResult<Folder> {
        let inner = self.inner.read().await;
        inner
            .folders
            .get(&id)
            .filter(|f| f.user_id == owner)
            .cloned()
            .ok_or(RepositoryError::NotFound("Folder"))
    }

    async fn create(&self, owner: Uuid, name: String) -> RepositoryResult<Folder> {
        let mut inner = self.inner.write().await;
        if inner.folder_name_taken(owner, &name, None) {
            return Err(RepositoryError::DuplicateName("folder"));
        }

        let folder = Folder { id: Uuid::now_v7(), name, user_id: owner };
        inner.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn update(&self, owner: Uuid, id: Uuid, name: String) -> RepositoryResult<Folder> {
        let mut inner = self.inner.write().await;
        if !inner.folders.get(&id).is_some_and(|f| f.user_id == owner) {
            return Err(RepositoryError::NotFound("Folder"));
        }
        if inner.folder_name_taken(owner, &name, Some(id)) {
            return Err(RepositoryError::DuplicateName("folder"));
        }

        let folder = inner.folders.get_mut(&id).ok_or(RepositoryError::NotFound("Folder"))?;
        folder.name = name;
        Ok(folder.clone())
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> RepositoryResult<CascadeReport> {
        let mut inner = self.inner.write().await;
        if !inner.folders.get(&id).is_some_and(|f| f.user_id == owner) {
            return Err(RepositoryError::NotFound("Folder"));
        }
        inner.folders.remove(&id);

        let mut report = CascadeReport::default();
        for note in inner.notes.values_mut() {
            if note.user_id == owner && note.folder_id == Some(id) {
                note.folder_id = None;
                report.notes_updated += 1;
            }
        }
        Ok(report)
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn list(&self, owner: Uuid) -> RepositoryResult<Vec<Tag>> {
        let inner = self.inner.read().await;
        let tags = inner.tags.values().filter(|t| t.user_id == owner).cloned().collect();
        Ok(sort_tags(tags))
    }

    async fn find_many(&self, owner: Uuid, ids: &[Uuid]) -> RepositoryResult<Vec<Tag>> {
        let inner = self.inner.read().await;
        let tags = ids
            .iter()
            .filter_map(|id| inner.tags.get(id))
            .filter(|t| t.user_id == owner)
            .cloned()
            .collect();
        Ok(sort_tags(tags))
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> RepositoryResult<Tag> {
        let inner = self.inner.read().await;
        inner
            .tags
            .get(&id)
            .filter(|t| t.user_id == owner)
            .cloned()
            .ok_or(RepositoryError::NotFound("Tag"))
    }

    async fn create(&self, owner: Uuid, name: String) -> RepositoryResult<Tag> {
        let mut inner = self.inner.write().await;
        if inner.tag_name_taken(owner, &name, None) {
            return Err(RepositoryError::DuplicateName("tag"));
        }

        let tag = Tag { id: Uuid::now_v7(), name, user_id: owner };
        inner.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn update(&self, owner: Uuid, id: Uuid, name: String) -> RepositoryResult<Tag> {
        let mut inner = self.inner.write().await;
        if !inner.tags.get(&id).is_some_and(|t| t.user_id == owner) {
            return Err(RepositoryError::NotFound("Tag"));
        }
        if inner.tag_name_taken(owner, &name, Some(id)) {
            return Err(RepositoryError::DuplicateName("tag"));
        }

        let tag = inner.tags.get_mut(&id).ok_or(RepositoryError::NotFound("Tag"))?;
        tag.name = name;
        Ok(tag.clone())
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> RepositoryResult<CascadeReport> {
        let mut inner = self.inner.write().await;
        if !inner.tags.get(&id).is_some_and(|t| t.user_id == owner) {
            return Err(RepositoryError::NotFound("Tag"));
        }
        inner.tags.remove(&id);

        let mut report = CascadeReport::default();
        for note in inner.notes.values_mut() {
            if note.user_id == owner && note.tag_ids.contains(&id) {
                note.tag_ids.retain(|t| *t != id);
                report.notes_updated += 1;
            }
        }
        Ok(report)
    }
}

#[async_trait]
impl NoteRepository for MemoryStore {
    async fn list(&self, owner: Uuid, filter: &NoteFilter) -> RepositoryResult<Vec<Note>> {
        let inner = self.inner.read().await;

        let query = filter.search_term.as_deref().map(WebQuery::parse);

        let mut matches: Vec<(usize, Note)> = inner
            .notes
            .values()
            .filter(|n| n.user_id == owner)
            .filter(|n| filter.folder_id.map_or(true, |f| n.folder_id == Some(f)))
            .filter(|n| filter.tag_id.map_or(true, |t| n.tag_ids.contains(&t)))
            .filter_map(|n| match &query {
                Some(query) => {
                    let title = words(&n.title);
                    let content = words(n.content.as_deref().unwrap_or_default());
                    query
                        .matches(&title, &content)
                        .then(|| (query.score(&title, &content), n.clone()))
                }
                None => Some((0, n.clone())),
            })
            .collect();

        // Highest score first, then creation order (ids are time-ordered).
        matches.sort_by(|(sa, a), (sb, b)| {
            sb.cmp(sa)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(matches.into_iter().map(|(_, note)| note).collect())
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> RepositoryResult<Note> {
        let inner = self.inner.read().await;
        inner
            .notes
            .get(&id)
            .filter(|n| n.user_id == owner)
            .cloned()
            .ok_or(RepositoryError::NotFound("Note"))
    }

    async fn create(&self, owner: Uuid, draft: NoteDraft) -> RepositoryResult<Note> {
        let mut inner = self.inner.write().await;
        inner.check_references(owner, &draft)?;

        let note = Note {
            id: Uuid::now_v7(),
            user_id: owner,
            folder_id: draft.folder_id,
            title: draft.title,
            content: draft.content,
            tag_ids: draft.tag_ids,
            created_at: Utc::now(),
        };
        inner.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update(&self, owner: Uuid, id: Uuid, draft: NoteDraft) -> RepositoryResult<Note> {
        let mut inner = self.inner.write().await;
        if !inner.notes.get(&id).is_some_and(|n| n.user_id == owner) {
            return Err(RepositoryError::NotFound("Note"));
        }
        inner.check_references(owner, &draft)?;

        let note = inner.notes.get_mut(&id).ok_or(RepositoryError::NotFound("Note"))?;
        note.title = draft.title;
        note.content = draft.content;
        note.folder_id = draft.folder_id;
        note.tag_ids = draft.tag_ids;
        Ok(note.clone())
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> RepositoryResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.notes.get(&id).is_some_and(|n| n.user_id == owner) {
            return Err(RepositoryError::NotFound("Note"));
        }
        inner.notes.remove(&id);
        Ok(())
    }
}
