use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a loaded dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId(Uuid);

impl DatasetId {
    /// Create a new unique dataset ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the ID as a string
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for DatasetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DatasetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s).map_err(|e| e.to_string())?))
    }
}

/// Source type for loaded comment files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    Csv,
    Excel,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
        }
    }

    /// Guess the source type from a file extension. Unknown extensions are read as delimited text.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" => Self::Excel,
            _ => Self::Csv,
        }
    }
}

impl FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "excel" => Ok(Self::Excel),
            _ => Err(format!("Unknown source type: {}", s)),
        }
    }
}

/// CSV import options
#[derive(Debug, Clone)]
pub struct CsvImportOptions {
    pub has_header: bool,
    pub delimiter: char,
    pub quote_char: Option<char>,
}

impl Default for CsvImportOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: ',',
            quote_char: Some('"'),
        }
    }
}

impl CsvImportOptions {
    /// Defaults for a given path: tab separated for `.tsv`, comma otherwise
    pub fn for_path(path: &Path) -> Self {
        let is_tsv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
        Self {
            delimiter: if is_tsv { '\t' } else { ',' },
            ..Self::default()
        }
    }
}

/// Column and sheet names owned by one scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeColumns {
    pub label_column: &'static str,
    pub summary_column: &'static str,
    pub rows_sheet: &'static str,
    pub breakdown_sheet: &'static str,
    pub summary_sheet: &'static str,
    pub summary_header: &'static str,
}

/// Which rows a pipeline stage operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Scope {
    #[strum(to_string = "all comments")]
    AllComments,
    #[strum(to_string = "theme comments")]
    ThemeMatched,
}

pub const THEME_MATCH_COLUMN: &str = "Theme_Match";

const ALL_COMMENTS_COLUMNS: ScopeColumns = ScopeColumns {
    label_column: "Sentiment",
    summary_column: "Summary",
    rows_sheet: "All Comments",
    breakdown_sheet: "Sentiment Breakdown",
    summary_sheet: "All Comments Summary",
    summary_header: "Overall Summary",
};

const THEME_MATCHED_COLUMNS: ScopeColumns = ScopeColumns {
    label_column: "Theme_Sentiment",
    summary_column: "Theme_Summary",
    rows_sheet: "Theme Comments",
    breakdown_sheet: "Theme Sentiment Breakdown",
    summary_sheet: "Theme Summary",
    summary_header: "Theme Summary",
};

impl Scope {
    pub const ALL: [Scope; 2] = [Scope::AllComments, Scope::ThemeMatched];

    pub fn columns(&self) -> &'static ScopeColumns {
        match self {
            Self::AllComments => &ALL_COMMENTS_COLUMNS,
            Self::ThemeMatched => &THEME_MATCHED_COLUMNS,
        }
    }

    /// Names of derived columns written by this scope, in export order
    pub fn derived_columns(&self) -> Vec<&'static str> {
        let cols = self.columns();
        match self {
            Self::AllComments => vec![cols.label_column, cols.summary_column],
            Self::ThemeMatched => vec![THEME_MATCH_COLUMN, cols.label_column, cols.summary_column],
        }
    }
}

/// Occurrence count per sentiment label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCounts(BTreeMap<String, usize>);

impl LabelCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts = Self::new();
        for label in labels {
            counts.add(label);
        }
        counts
    }

    pub fn add(&mut self, label: &str) {
        *self.0.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, label: &str) -> usize {
        self.0.get(label).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Entries ordered by count descending, ties broken by label
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self.0.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

impl fmt::Display for LabelCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self
            .sorted()
            .iter()
            .map(|(label, count)| format!("{label:?}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{{body}}}")
    }
}
