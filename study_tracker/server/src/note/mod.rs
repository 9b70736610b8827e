use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::{Collection, ResourceFile, Storage, read_records};
use crate::timestamp;

pub mod api;

/// Subject assigned to notes created without one.
pub const DEFAULT_SUBJECT: &str = "General";

/// A freeform text note with an optional subject tag.
#[derive(Debug, PartialEq, Clone, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(with = "crate::timestamp")]
    pub updated_at: DateTime<Utc>,
}

fn default_subject() -> String {
    DEFAULT_SUBJECT.to_string()
}

/// Editable fields of a note, as submitted by a client.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct NoteDraft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub subject: Option<String>,
}

impl NoteDraft {
    /// Resolves the draft into `(title, content, subject)`, applying defaults.
    ///
    /// An empty or missing title is rejected. Empty or missing content becomes
    /// an empty string and an empty or missing subject becomes "General".
    fn resolve(self) -> Result<(String, String, String), NoteServiceError> {
        let title = self
            .title
            .filter(|title| !title.is_empty())
            .ok_or(NoteServiceError::TitleRequired)?;
        let content = self.content.unwrap_or_default();
        let subject = self
            .subject
            .filter(|subject| !subject.is_empty())
            .unwrap_or_else(default_subject);
        Ok((title, content, subject))
    }
}

/// Error type for NoteService operations.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NoteServiceError {
    /// Represents a note without a title.
    #[error("Title is required")]
    TitleRequired,
    /// Represents a note id that does not exist.
    #[error("Note with ID {0} not found")]
    NoteNotFound(String),
}

pub struct NoteService<'a> {
    storage: &'a dyn Storage,
}

impl NoteService<'_> {
    pub fn new(storage: &dyn Storage) -> NoteService<'_> {
        NoteService { storage }
    }

    /// Retrieves every note in stored order. Display ordering is left to clients.
    #[tracing::instrument(skip(self))]
    pub fn get_all_notes(&self) -> Vec<Note> {
        read_records(self.storage, ResourceFile::Notes)
    }

    /// Looks up a single note by its ID.
    #[tracing::instrument(skip(self))]
    pub fn get_note_by_id(&self, id: &str) -> Result<Note, NoteServiceError> {
        self.get_all_notes()
            .into_iter()
            .find(|note| note.id == id)
            .ok_or_else(|| NoteServiceError::NoteNotFound(id.to_string()))
    }

    /// Creates a new note.
    ///
    /// # Arguments
    ///
    /// * `draft` - The submitted fields. The title must not be empty.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Note`, or `TitleRequired` if the title is missing.
    #[tracing::instrument(skip(self))]
    pub fn create_note(&self, draft: NoteDraft) -> Result<Note, NoteServiceError> {
        let (title, content, subject) = draft.resolve()?;

        let mut notes = Collection::load(self.storage, ResourceFile::Notes);
        let note = Note {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            content,
            subject,
            updated_at: timestamp::now(),
        };
        notes.push(note.clone());
        notes.save(self.storage);
        Ok(note)
    }

    /// Replaces the title, content and subject of a note.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the note to replace.
    /// * `draft` - The new fields, resolved with the same defaults as on creation.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Note`, `NoteNotFound` if the ID is unknown,
    /// or `TitleRequired` if the new title is missing.
    #[tracing::instrument(skip(self))]
    pub fn update_note(&self, id: &str, draft: NoteDraft) -> Result<Note, NoteServiceError> {
        let mut notes: Collection<Note> = Collection::load(self.storage, ResourceFile::Notes);
        let note = notes
            .records_mut()
            .find(|note| note.id == id)
            .ok_or_else(|| NoteServiceError::NoteNotFound(id.to_string()))?;

        let (title, content, subject) = draft.resolve()?;
        note.title = title;
        note.content = content;
        note.subject = subject;
        note.updated_at = timestamp::now();

        let updated = note.clone();
        notes.save(self.storage);
        Ok(updated)
    }

    /// Deletes a note by its ID.
    ///
    /// # Returns
    ///
    /// A `Result` containing the deleted `Note`, or `NoteNotFound` if the ID is unknown.
    #[tracing::instrument(skip(self))]
    pub fn delete_note_by_id(&self, id: &str) -> Result<Note, NoteServiceError> {
        let mut notes: Collection<Note> = Collection::load(self.storage, ResourceFile::Notes);
        let deleted = notes
            .remove_first(|note| note.id == id)
            .ok_or_else(|| NoteServiceError::NoteNotFound(id.to_string()))?;
        notes.save(self.storage);
        Ok(deleted)
    }
}
