use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::records::{OdooRecord, Project, Task};

/// Record categories reachable through the unified search and fetch tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Project,
    Task,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Project, DocumentKind::Task];

    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Project => "project",
            DocumentKind::Task => "task",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Project => "Project",
            DocumentKind::Task => "Task",
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            DocumentKind::Project => Project::MODEL,
            DocumentKind::Task => Task::MODEL,
        }
    }

    /// Query tokens (English and Spanish) that select this category.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            DocumentKind::Project => &["proyecto", "proyectos", "project", "projects"],
            DocumentKind::Task => &["tarea", "tareas", "task", "tasks"],
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.prefix() == prefix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentIdError {
    #[error("Invalid id format. Use 'project:<id>' or 'task:<id>'.")]
    Format,
    #[error("Invalid numeric id.")]
    Numeric,
    #[error("Unknown kind '{0}'. Use 'project' or 'task'.")]
    UnknownKind(String),
}

/// A composite `"<kind>:<id>"` document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentId {
    pub kind: DocumentKind,
    pub id: i64,
}

impl DocumentId {
    pub fn new(kind: DocumentKind, id: i64) -> Self {
        Self { kind, id }
    }
}

impl FromStr for DocumentId {
    type Err = DocumentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, raw_id) = s.split_once(':').ok_or(DocumentIdError::Format)?;
        let id = raw_id
            .trim()
            .parse::<i64>()
            .map_err(|_| DocumentIdError::Numeric)?;
        let kind = DocumentKind::from_prefix(kind)
            .ok_or_else(|| DocumentIdError::UnknownKind(kind.to_string()))?;
        Ok(Self { kind, id })
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.prefix(), self.id)
    }
}
