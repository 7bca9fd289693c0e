use crate::core::{
    types::{CsvImportOptions, SourceType},
    Dataset,
};
use crate::error::LoadError;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::{debug, info};

/// DataService reads comment files into a [`Dataset`]
///
/// This service is responsible for:
/// - Reading delimited text (CSV/TSV) with the `csv` crate
/// - Reading the first worksheet of Excel workbooks with `calamine`
/// - Validating the `Comment` column via [`Dataset::from_records`]
pub struct DataService;

impl DataService {
    /// Load a file, choosing the reader from its extension
    pub fn load(path: &Path) -> Result<Dataset, LoadError> {
        match SourceType::from_path(path) {
            SourceType::Excel => Self::load_excel(path),
            SourceType::Csv => Self::load_csv(path, &CsvImportOptions::for_path(path)),
        }
    }

    /// Load a delimited text file
    pub fn load_csv(path: &Path, options: &CsvImportOptions) -> Result<Dataset, LoadError> {
        let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(options.has_header)
            .delimiter(options.delimiter as u8)
            .flexible(true);
        match options.quote_char {
            Some(q) => {
                builder.quote(q as u8);
            }
            None => {
                builder.quoting(false);
            }
        }
        let mut reader = builder.from_reader(file);

        let parse_err = |e: csv::Error| LoadError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(parse_err)?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        let headers: Vec<String> = if options.has_header {
            reader.headers().map_err(parse_err)?.iter().map(|s| s.to_string()).collect()
        } else {
            // Without a header row the first column is taken as the comment text
            let width = rows.first().map(|r| r.len()).unwrap_or(1);
            std::iter::once(crate::core::dataset::COMMENT_COLUMN.to_string())
                .chain((1..width).map(|i| format!("column_{}", i + 1)))
                .collect()
        };

        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(LoadError::Parse {
                path: path.to_path_buf(),
                message: "file has no header row".to_string(),
            });
        }

        debug!("Read {} records from {}", rows.len(), path.display());
        let dataset = Dataset::from_records(path, SourceType::Csv, headers, rows)?;
        info!("Loaded {} comments from {}", dataset.row_count(), path.display());
        Ok(dataset)
    }

    /// Load the first worksheet of an Excel workbook; its first row is the header
    pub fn load_excel(path: &Path) -> Result<Dataset, LoadError> {
        let parse_err = |message: String| LoadError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| parse_err(e.to_string()))?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| parse_err("workbook has no worksheets".to_string()))?;
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| parse_err(e.to_string()))?;

        let mut iter = range.rows();
        let headers: Vec<String> = iter
            .next()
            .ok_or_else(|| parse_err(format!("worksheet '{sheet_name}' is empty")))?
            .iter()
            .map(cell_to_string)
            .collect();
        let rows: Vec<Vec<String>> = iter.map(|row| row.iter().map(cell_to_string).collect()).collect();

        let dataset = Dataset::from_records(path, SourceType::Excel, headers, rows)?;
        info!(
            "Loaded {} comments from {} (sheet '{}')",
            dataset.row_count(),
            path.display(),
            sheet_name
        );
        Ok(dataset)
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(d) => d.as_f64().to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("ERROR: {e:?}"),
    }
}
