use crate::core::types::{DatasetId, LabelCounts, Scope, SourceType};
use crate::error::{LoadError, PipelineError, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Name of the column every dataset must carry
pub const COMMENT_COLUMN: &str = "Comment";

/// Result of the most recent theme search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeMatch {
    pub theme: String,
    pub keywords: Vec<String>,
    /// One flag per row, aligned with row order
    pub flags: Vec<bool>,
}

impl ThemeMatch {
    pub fn match_count(&self) -> usize {
        self.flags.iter().filter(|f| **f).count()
    }
}

/// Derived values owned by one scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeResults {
    /// One entry per row when classification has run for this scope
    labels: Option<Vec<Option<String>>>,
    summary: Option<String>,
}

impl ScopeResults {
    pub fn has_labels(&self) -> bool {
        self.labels.is_some()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }
}

/// In-memory comment table plus the columns derived from it.
///
/// Source cells are held as text. Derived columns are kept per scope so that
/// results for all comments and for theme comments never overwrite each other.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub id: DatasetId,
    pub name: String,
    pub source_type: SourceType,
    pub source_path: Option<PathBuf>,
    pub loaded_at: DateTime<Utc>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    comment_index: usize,
    theme: Option<ThemeMatch>,
    all_comments: ScopeResults,
    theme_matched: ScopeResults,
}

impl Dataset {
    /// Build a dataset from a header row and text records.
    ///
    /// Fails when no `Comment` header exists, when a record is wider or
    /// narrower than the header, or when any comment is blank.
    pub fn from_records(
        source_path: &Path,
        source_type: SourceType,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Result<Self, LoadError> {
        let headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();
        let comment_index = headers
            .iter()
            .position(|h| h == COMMENT_COLUMN)
            .ok_or_else(|| LoadError::MissingCommentColumn { path: source_path.to_path_buf() })?;

        for (idx, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(LoadError::Parse {
                    path: source_path.to_path_buf(),
                    message: format!(
                        "row {} has {} fields, expected {}",
                        idx + 1,
                        row.len(),
                        headers.len()
                    ),
                });
            }
            if row[comment_index].trim().is_empty() {
                return Err(LoadError::EmptyComment { path: source_path.to_path_buf(), row: idx + 1 });
            }
        }

        let name = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();

        Ok(Self {
            id: DatasetId::new(),
            name,
            source_type,
            source_path: Some(source_path.to_path_buf()),
            loaded_at: Utc::now(),
            headers,
            rows,
            comment_index,
            theme: None,
            all_comments: ScopeResults::default(),
            theme_matched: ScopeResults::default(),
        })
    }

    /// Single-column dataset, handy for callers that already hold the comments
    pub fn from_comments<S: AsRef<str>>(comments: &[S]) -> Result<Self, LoadError> {
        let rows = comments.iter().map(|c| vec![c.as_ref().to_string()]).collect();
        let mut ds = Self::from_records(
            Path::new("comments"),
            SourceType::Csv,
            vec![COMMENT_COLUMN.to_string()],
            rows,
        )?;
        ds.source_path = None;
        Ok(ds)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn comment(&self, row: usize) -> Option<&str> {
        self.rows.get(row).map(|r| r[self.comment_index].as_str())
    }

    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |r| r[self.comment_index].as_str())
    }

    /// Source columns that are not shadowed by a derived column, with their index
    pub fn passthrough_columns(&self) -> Vec<(usize, &str)> {
        let derived: Vec<&str> = Scope::ALL.iter().flat_map(|s| s.derived_columns()).collect();
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !derived.contains(&h.as_str()))
            .map(|(i, h)| (i, h.as_str()))
            .collect()
    }

    pub fn theme(&self) -> Option<&ThemeMatch> {
        self.theme.as_ref()
    }

    pub fn set_theme(&mut self, theme: ThemeMatch) {
        self.theme = Some(theme);
    }

    pub fn is_theme_matched(&self, row: usize) -> bool {
        self.theme
            .as_ref()
            .and_then(|t| t.flags.get(row).copied())
            .unwrap_or(false)
    }

    /// Row indices selected by `scope`, in original order
    pub fn scope_rows(&self, scope: Scope) -> Result<Vec<usize>> {
        match scope {
            Scope::AllComments => Ok((0..self.rows.len()).collect()),
            Scope::ThemeMatched => {
                let theme = self.theme.as_ref().ok_or_else(PipelineError::theme_not_applied)?;
                Ok(theme
                    .flags
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| **m)
                    .map(|(i, _)| i)
                    .collect())
            }
        }
    }

    /// Comments selected by `scope`, in original order
    pub fn scope_comments(&self, scope: Scope) -> Result<Vec<&str>> {
        Ok(self
            .scope_rows(scope)?
            .into_iter()
            .map(|i| self.rows[i][self.comment_index].as_str())
            .collect())
    }

    pub fn results(&self, scope: Scope) -> &ScopeResults {
        match scope {
            Scope::AllComments => &self.all_comments,
            Scope::ThemeMatched => &self.theme_matched,
        }
    }

    fn results_mut(&mut self, scope: Scope) -> &mut ScopeResults {
        match scope {
            Scope::AllComments => &mut self.all_comments,
            Scope::ThemeMatched => &mut self.theme_matched,
        }
    }

    /// Replace the label column of `scope`. `labels` must hold one entry per row.
    pub fn set_labels(&mut self, scope: Scope, labels: Vec<Option<String>>) {
        debug_assert_eq!(labels.len(), self.rows.len());
        self.results_mut(scope).labels = Some(labels);
    }

    pub fn label(&self, scope: Scope, row: usize) -> Option<&str> {
        self.results(scope)
            .labels
            .as_ref()
            .and_then(|l| l.get(row))
            .and_then(|l| l.as_deref())
    }

    pub fn set_summary(&mut self, scope: Scope, summary: String) {
        self.results_mut(scope).summary = Some(summary);
    }

    pub fn summary(&self, scope: Scope) -> Option<&str> {
        self.results(scope).summary()
    }

    /// Counts computed fresh from the label column of `scope`; unlabeled rows are skipped
    pub fn label_counts(&self, scope: Scope) -> Result<LabelCounts> {
        let rows = self.scope_rows(scope)?;
        Ok(LabelCounts::from_labels(rows.into_iter().filter_map(|i| self.label(scope, i))))
    }
}
