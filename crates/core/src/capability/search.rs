//! Narrowing file search: exact name, then partial name, then recent files.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ToolError;

/// A file returned by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    /// Backend-specific type, e.g. a MIME type.
    pub kind: String,
}

/// A storage backend that can list files matching a filter expression.
#[async_trait]
pub trait FileSearch: Send + Sync {
    async fn list_files(&self, filter: &str, max_results: usize)
        -> Result<Vec<FileEntry>, ToolError>;
}

/// Stages of a narrowing search, in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStage {
    Exact,
    Partial,
    /// Unfiltered listing; only a diagnostic aid, never a match.
    Recent,
}

impl SearchStage {
    pub const ALL: [SearchStage; 3] = [Self::Exact, Self::Partial, Self::Recent];

    /// The filter expression for this stage.
    pub fn filter(self, name: &str) -> String {
        match self {
            Self::Exact => format!(
                "name = '{}' and trashed = false",
                escape_query_literal(name)
            ),
            Self::Partial => format!(
                "name contains '{}' and trashed = false",
                escape_query_literal(name)
            ),
            Self::Recent => "trashed = false".to_string(),
        }
    }

    pub fn max_results(self) -> usize {
        match self {
            Self::Exact => 5,
            Self::Partial | Self::Recent => 10,
        }
    }
}

impl std::fmt::Display for SearchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Partial => write!(f, "partial"),
            Self::Recent => write!(f, "recent"),
        }
    }
}

/// Result of a narrowing search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// The stage that produced `files`, or `None` if every stage was empty.
    pub stage: Option<SearchStage>,
    pub attempted: Vec<SearchStage>,
    pub files: Vec<FileEntry>,
}

impl SearchOutcome {
    /// True when `files` matched the requested name.
    pub fn is_match(&self) -> bool {
        matches!(self.stage, Some(SearchStage::Exact | SearchStage::Partial))
    }
}

/// Escapes a string for use inside a single-quoted filter literal.
pub fn escape_query_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Searches for `name`, widening the filter only while nothing is found.
///
/// The first stage returning files ends the search; its files and name are
/// reported as-is.
pub async fn narrowing_search(
    service: &dyn FileSearch,
    name: &str,
) -> Result<SearchOutcome, ToolError> {
    let mut attempted = Vec::with_capacity(SearchStage::ALL.len());

    for stage in SearchStage::ALL {
        attempted.push(stage);
        let filter = stage.filter(name);
        let files = service.list_files(&filter, stage.max_results()).await?;

        tracing::debug!(%stage, %filter, found = files.len(), "file search stage");

        if !files.is_empty() {
            return Ok(SearchOutcome {
                stage: Some(stage),
                attempted,
                files,
            });
        }
    }

    Ok(SearchOutcome {
        stage: None,
        attempted,
        files: Vec::new(),
    })
}
