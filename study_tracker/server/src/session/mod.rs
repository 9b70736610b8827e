use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::storage::{Collection, ResourceFile, Storage, read_records};
use crate::task::TaskService;
use crate::timestamp;

pub mod api;

/// Title recorded for sessions whose task cannot be found.
pub const UNKNOWN_TASK_TITLE: &str = "Unknown Task";

/// A logged interval of focused study time. Immutable once created.
#[derive(Debug, PartialEq, Clone, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    /// ID of the task the session was spent on. Not checked against the task list.
    pub task_id: String,
    /// Title of the task at the time the session was logged
    pub task_title: String,
    pub minutes: u32,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Restricts which sessions are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    /// Sessions logged on the current UTC calendar day.
    Today,
}

impl DateFilter {
    /// Parses the `date` query value. Only `today` is recognized.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "today" => Some(DateFilter::Today),
            _ => None,
        }
    }

    fn matches(&self, session: &Session) -> bool {
        match self {
            DateFilter::Today => session.timestamp.date_naive() == timestamp::today(),
        }
    }
}

/// Error type for SessionService operations.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SessionServiceError {
    /// Represents a create request without a task ID or minutes.
    #[error("Missing fields")]
    MissingFields,
    /// Represents minutes that do not coerce to a positive integer.
    #[error("Minutes must be a positive integer")]
    InvalidMinutes,
}

pub struct SessionService<'a> {
    storage: &'a dyn Storage,
}

impl SessionService<'_> {
    pub fn new(storage: &dyn Storage) -> SessionService<'_> {
        SessionService { storage }
    }

    /// Retrieves all sessions, optionally restricted by a date filter.
    #[tracing::instrument(skip(self))]
    pub fn get_sessions(&self, filter: Option<DateFilter>) -> Vec<Session> {
        let sessions: Vec<Session> = read_records(self.storage, ResourceFile::Sessions);
        match filter {
            Some(filter) => sessions
                .into_iter()
                .filter(|session| filter.matches(session))
                .collect(),
            None => sessions,
        }
    }

    /// Logs a new session against a task.
    ///
    /// # Arguments
    ///
    /// * `task_id` - The ID of the task the time was spent on. Must not be empty.
    /// * `minutes` - The raw minutes value from the request, coerced to an integer.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Session`. The task title is copied from the
    /// referenced task, or set to "Unknown Task" if no task has that ID.
    #[tracing::instrument(skip(self))]
    pub fn create_session(
        &self,
        task_id: &str,
        minutes: Option<&Value>,
    ) -> Result<Session, SessionServiceError> {
        let minutes = match minutes {
            Some(minutes) if !task_id.is_empty() && is_truthy(minutes) => minutes,
            _ => return Err(SessionServiceError::MissingFields),
        };
        let minutes = coerce_minutes(minutes)
            .and_then(|minutes| u32::try_from(minutes).ok())
            .filter(|minutes| *minutes > 0)
            .ok_or(SessionServiceError::InvalidMinutes)?;

        let mut sessions = Collection::load(self.storage, ResourceFile::Sessions);
        let task_title = TaskService::new(self.storage)
            .get_task_by_id(task_id)
            .map(|task| task.title)
            .unwrap_or_else(|| {
                tracing::warn!("Logging session for unknown task {}", task_id);
                UNKNOWN_TASK_TITLE.to_string()
            });

        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            task_id: task_id.to_string(),
            task_title,
            minutes,
            timestamp: timestamp::now(),
        };
        sessions.push(session.clone());
        sessions.save(self.storage);
        Ok(session)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Coerces a JSON number or numeric string to an integer.
///
/// Numbers are truncated toward zero. Strings are read up to the first
/// character that is not part of a leading integer, so `"25 min"` is 25.
fn coerce_minutes(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|n| n.is_finite())
                .map(|n| n.trunc() as i64)
        }),
        Value::String(text) => leading_integer(text),
        _ => None,
    }
}

fn leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}
