//! Keyword theme search over the comment column

use crate::core::{Session, ThemeMatch};
use crate::error::Result;
use tracing::info;

/// Outcome of a theme search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeReport {
    pub theme: String,
    pub match_count: usize,
}

impl ThemeReport {
    pub fn message(&self) -> String {
        format!("{}: Found in {} comments!", self.theme, self.match_count)
    }
}

/// Service for theme searches
pub struct ThemeService;

impl ThemeService {
    /// Split a comma-separated keyword list, trimming and lower-casing each
    /// entry. Blank entries are dropped.
    pub fn parse_keywords(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect()
    }

    /// A comment matches when its lower-cased text contains any keyword as a substring
    pub fn matches(comment: &str, keywords: &[String]) -> bool {
        let lowered = comment.to_lowercase();
        keywords.iter().any(|kw| lowered.contains(kw.as_str()))
    }

    /// Recompute the theme match flag for every row and return the match count
    pub fn apply(session: &mut Session, theme: &str, keywords: &str) -> Result<ThemeReport> {
        let dataset = session.dataset_mut()?;
        let keywords = Self::parse_keywords(keywords);
        let flags: Vec<bool> = dataset.comments().map(|c| Self::matches(c, &keywords)).collect();

        let theme_match = ThemeMatch {
            theme: theme.to_string(),
            keywords,
            flags,
        };
        let match_count = theme_match.match_count();
        info!(
            "Theme '{}' ({:?}) matched {} of {} comments",
            theme,
            theme_match.keywords,
            match_count,
            dataset.row_count()
        );
        dataset.set_theme(theme_match);

        Ok(ThemeReport {
            theme: theme.to_string(),
            match_count,
        })
    }
}
