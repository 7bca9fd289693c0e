//! Multi-sheet spreadsheet export of an enriched dataset.
//!
//! Each scope contributes three sheets: the row table, a label/count
//! breakdown and a one-row summary table. Only columns belonging to the
//! exported scope are read.

use crate::core::{Dataset, Scope, Session};
use crate::error::{ExportError, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};
use tracing::info;

/// Written in the summary sheet when no summary was generated for the scope
pub const SUMMARY_MISSING: &str = "No Summary Available";

const COUNT_HEADER: &str = "Count";

/// One cell of the exported row table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Text(String),
    Bool(bool),
}

/// Logical content exported for one scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeExport {
    pub scope: Scope,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Label and count, ordered by count descending
    pub breakdown: Vec<(String, usize)>,
    pub summary: String,
}

impl ScopeExport {
    /// Collect the three sections for `scope` from the current dataset state
    pub fn collect(dataset: &Dataset, scope: Scope) -> Result<Self> {
        let rows_in_scope = dataset.scope_rows(scope)?;
        let passthrough = dataset.passthrough_columns();
        let summary = dataset.summary(scope);

        let headers: Vec<String> = passthrough
            .iter()
            .map(|(_, h)| h.to_string())
            .chain(scope.derived_columns().into_iter().map(String::from))
            .collect();

        let rows = rows_in_scope
            .iter()
            .map(|&row| {
                let source = &dataset.rows()[row];
                let mut cells: Vec<Cell> = passthrough
                    .iter()
                    .map(|(idx, _)| Cell::Text(source[*idx].clone()))
                    .collect();
                if scope == Scope::ThemeMatched {
                    cells.push(Cell::Bool(dataset.is_theme_matched(row)));
                }
                cells.push(text_or_empty(dataset.label(scope, row)));
                cells.push(text_or_empty(summary));
                cells
            })
            .collect();

        let breakdown = dataset
            .label_counts(scope)?
            .sorted()
            .into_iter()
            .map(|(label, count)| (label.to_string(), count))
            .collect();

        Ok(Self {
            scope,
            headers,
            rows,
            breakdown,
            summary: summary.unwrap_or(SUMMARY_MISSING).to_string(),
        })
    }

    fn write_to(&self, workbook: &mut Workbook, header_format: &Format) -> Result<(), XlsxError> {
        let cols = self.scope.columns();

        let sheet = workbook.add_worksheet();
        sheet.set_name(cols.rows_sheet)?;
        write_header(sheet, &self.headers, header_format)?;
        for (r, row) in self.rows.iter().enumerate() {
            let r = (r + 1) as u32;
            for (c, cell) in row.iter().enumerate() {
                let c = c as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) => {
                        sheet.write_string(r, c, s)?;
                    }
                    Cell::Bool(b) => {
                        sheet.write_boolean(r, c, *b)?;
                    }
                }
            }
        }

        let sheet = workbook.add_worksheet();
        sheet.set_name(cols.breakdown_sheet)?;
        write_header(sheet, &[cols.label_column, COUNT_HEADER], header_format)?;
        for (r, (label, count)) in self.breakdown.iter().enumerate() {
            let r = (r + 1) as u32;
            sheet.write_string(r, 0, label)?;
            sheet.write_number(r, 1, *count as f64)?;
        }

        let sheet = workbook.add_worksheet();
        sheet.set_name(cols.summary_sheet)?;
        write_header(sheet, &[cols.summary_header], header_format)?;
        sheet.write_string(1, 0, &self.summary)?;

        Ok(())
    }
}

fn text_or_empty(value: Option<&str>) -> Cell {
    match value {
        Some(s) => Cell::Text(s.to_string()),
        None => Cell::Empty,
    }
}

fn write_header<S: AsRef<str>>(sheet: &mut Worksheet, headers: &[S], format: &Format) -> Result<(), XlsxError> {
    for (c, h) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, c as u16, h.as_ref(), format)?;
    }
    Ok(())
}

/// Outcome of an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub scopes: Vec<Scope>,
}

impl ExportReport {
    pub fn message(&self) -> String {
        format!("Results exported successfully to {}!", self.path.display())
    }
}

/// Service writing enriched datasets to `.xlsx` workbooks
pub struct ExportService;

impl ExportService {
    /// Export one scope as three sheets
    pub fn export(session: &Session, scope: Scope, path: &Path) -> Result<ExportReport> {
        Self::export_scopes(session, &[scope], path)
    }

    /// Export all comments and, when a theme search has run, theme comments into one workbook
    pub fn export_both(session: &Session, path: &Path) -> Result<ExportReport> {
        let dataset = session.dataset()?;
        if dataset.theme().is_some() {
            Self::export_scopes(session, &Scope::ALL, path)
        } else {
            Self::export_scopes(session, &[Scope::AllComments], path)
        }
    }

    /// Collect every requested scope first so precondition failures write nothing
    pub fn export_scopes(session: &Session, scopes: &[Scope], path: &Path) -> Result<ExportReport> {
        let dataset = session.dataset()?;
        let sections = scopes
            .iter()
            .map(|s| ScopeExport::collect(dataset, *s))
            .collect::<Result<Vec<_>>>()?;

        Self::write_workbook(&sections, path)?;
        info!(
            "Exported {} ({:?}) to {}",
            dataset.name,
            scopes,
            path.display()
        );
        Ok(ExportReport {
            path: path.to_path_buf(),
            scopes: scopes.to_vec(),
        })
    }

    fn write_workbook(sections: &[ScopeExport], path: &Path) -> Result<(), ExportError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let workbook_err = |source: XlsxError| ExportError::Workbook {
            path: path.to_path_buf(),
            source,
        };

        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        for section in sections {
            section.write_to(&mut workbook, &header_format).map_err(workbook_err)?;
        }
        workbook.save(path).map_err(workbook_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Dataset, ThemeMatch};
    use pretty_assertions::assert_eq;
    use std::path::Path as StdPath;

    fn enriched() -> Dataset {
        let mut ds = Dataset::from_records(
            StdPath::new("hotel.csv"),
            crate::core::SourceType::Csv,
            vec!["id".into(), "Comment".into()],
            vec![
                vec!["1".into(), "great service".into()],
                vec!["2".into(), "bad wifi".into()],
                vec!["3".into(), "great food".into()],
            ],
        )
        .unwrap();
        ds.set_theme(ThemeMatch {
            theme: "Praise".into(),
            keywords: vec!["great".into()],
            flags: vec![true, false, true],
        });
        ds.set_labels(
            Scope::AllComments,
            vec![Some("POSITIVE".into()), Some("NEGATIVE".into()), Some("POSITIVE".into())],
        );
        ds.set_summary(Scope::AllComments, "Mostly positive.".into());
        ds
    }

    #[test]
    fn test_collect_all_comments_excludes_theme_columns() {
        let export = ScopeExport::collect(&enriched(), Scope::AllComments).unwrap();

        assert_eq!(export.headers, vec!["id", "Comment", "Sentiment", "Summary"]);
        assert_eq!(export.rows.len(), 3);
        assert_eq!(
            export.rows[1],
            vec![
                Cell::Text("2".into()),
                Cell::Text("bad wifi".into()),
                Cell::Text("NEGATIVE".into()),
                Cell::Text("Mostly positive.".into()),
            ]
        );
        assert_eq!(export.breakdown, vec![("POSITIVE".to_string(), 2), ("NEGATIVE".to_string(), 1)]);
        assert_eq!(export.summary, "Mostly positive.");
    }

    #[test]
    fn test_collect_theme_scope_degrades_without_results() {
        let export = ScopeExport::collect(&enriched(), Scope::ThemeMatched).unwrap();

        assert_eq!(
            export.headers,
            vec!["id", "Comment", "Theme_Match", "Theme_Sentiment", "Theme_Summary"]
        );
        assert_eq!(export.rows.len(), 2);
        assert_eq!(
            export.rows[1],
            vec![
                Cell::Text("3".into()),
                Cell::Text("great food".into()),
                Cell::Bool(true),
                Cell::Empty,
                Cell::Empty,
            ]
        );
        assert!(export.breakdown.is_empty());
        assert_eq!(export.summary, SUMMARY_MISSING);
    }

    #[test]
    fn test_collect_is_repeatable() {
        let ds = enriched();
        assert_eq!(
            ScopeExport::collect(&ds, Scope::AllComments).unwrap(),
            ScopeExport::collect(&ds, Scope::AllComments).unwrap()
        );
    }

    #[test]
    fn test_export_theme_without_search_writes_nothing() {
        let mut session = Session::new();
        session.replace(Dataset::from_comments(&["a"]).unwrap());
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");

        let err = ExportService::export(&session, Scope::ThemeMatched, &path).unwrap_err();
        assert!(matches!(err, crate::error::PipelineError::Precondition(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_report_message() {
        let report = ExportReport {
            path: PathBuf::from("out/results.xlsx"),
            scopes: vec![Scope::AllComments],
        };
        assert_eq!(report.message(), "Results exported successfully to out/results.xlsx!");
    }
}
