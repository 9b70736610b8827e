use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::{Collection, ResourceFile, Storage, read_records};
use crate::timestamp;

pub mod api;

/// A unit of study work.
#[derive(Debug, PartialEq, Clone, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task
    pub id: String,
    /// Subject the task belongs to, e.g. "Math"
    pub subject: String,
    pub title: String,
    pub is_completed: bool,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TaskServiceError {
    /// Represents a create request without a subject or title.
    #[error("Missing fields")]
    MissingFields,
    /// Represents a task id that does not exist.
    #[error("Task with ID {0} not found")]
    TaskNotFound(String),
}

pub struct TaskService<'a> {
    storage: &'a dyn Storage,
}

impl TaskService<'_> {
    pub fn new(storage: &dyn Storage) -> TaskService<'_> {
        TaskService { storage }
    }

    /// Retrieves every task, in insertion order.
    #[tracing::instrument(skip(self))]
    pub fn get_all_tasks(&self) -> Vec<Task> {
        read_records(self.storage, ResourceFile::Tasks)
    }

    /// Looks up a single task by its ID.
    #[tracing::instrument(skip(self))]
    pub fn get_task_by_id(&self, id: &str) -> Option<Task> {
        self.get_all_tasks().into_iter().find(|task| task.id == id)
    }

    /// Creates a new, not yet completed task.
    ///
    /// # Arguments
    ///
    /// * `subject` - The subject the task belongs to. Must not be empty.
    /// * `title` - The title of the task. Must not be empty.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task`, or `MissingFields` if either argument is empty.
    #[tracing::instrument(skip(self))]
    pub fn create_task(&self, subject: &str, title: &str) -> Result<Task, TaskServiceError> {
        if subject.is_empty() || title.is_empty() {
            return Err(TaskServiceError::MissingFields);
        }

        let mut tasks = Collection::load(self.storage, ResourceFile::Tasks);
        let task = Task {
            id: uuid::Uuid::new_v4().to_string(),
            subject: subject.to_string(),
            title: title.to_string(),
            is_completed: false,
            created_at: timestamp::now(),
        };
        tasks.push(task.clone());
        tasks.save(self.storage);
        Ok(task)
    }

    /// Updates the completion flag of a task. Other fields cannot be changed.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to update.
    /// * `is_completed` - The new completion state, or `None` to leave it unchanged.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task`, or `TaskNotFound` if the ID is unknown.
    #[tracing::instrument(skip(self))]
    pub fn update_task(
        &self,
        id: &str,
        is_completed: Option<bool>,
    ) -> Result<Task, TaskServiceError> {
        let mut tasks: Collection<Task> = Collection::load(self.storage, ResourceFile::Tasks);
        let task = tasks
            .records_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| TaskServiceError::TaskNotFound(id.to_string()))?;

        if let Some(is_completed) = is_completed {
            task.is_completed = is_completed;
        }
        let updated = task.clone();
        tasks.save(self.storage);
        Ok(updated)
    }
}
