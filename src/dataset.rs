//! Tabular datasets for drift comparison
//!
//! Reference and current datasets arrive as CSV files with a header row and
//! are read through arrow's CSV reader into record batches. Every column is
//! read as UTF-8 and typed afterwards: a column is numeric when every
//! non-missing cell parses as a float, otherwise it is kept as text and
//! skipped by the detectors.

use arrow::array::{Array, StringArray};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while loading or slicing a dataset
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Dataset file not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ArrowError),

    #[error("Dataset has no header row")]
    MissingHeader,

    #[error("Column '{0}' was not read as UTF-8")]
    UnexpectedType(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column '{name}' has {actual} values, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// Result type for dataset operations
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Cell spellings treated as missing values
const MISSING_MARKERS: &[&str] = &["", "na", "nan", "null", "none", "n/a"];

/// Values of a single column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Every non-missing cell is a float
    Numeric(Vec<Option<f64>>),
    /// At least one cell is not a float
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Numeric(_))
    }

    /// Render a cell back to text (used for duplicate-row detection)
    fn cell_key(&self, row: usize) -> String {
        match self {
            ColumnData::Numeric(values) => match values[row] {
                Some(v) => v.to_string(),
                None => String::new(),
            },
            ColumnData::Text(values) => values[row].clone().unwrap_or_default(),
        }
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values.into_iter().map(Some).collect()),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<&str>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values.into_iter().map(|v| Some(v.to_string())).collect()),
        }
    }

    /// Number of missing cells
    pub fn missing_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(values) => values.iter().filter(|v| v.is_none()).count(),
            ColumnData::Text(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }
}

/// Ordered collection of equally long named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Build a dataset from columns, checking names are unique and lengths agree
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        for (i, column) in columns.iter().enumerate() {
            if column.data.len() != rows {
                return Err(DatasetError::LengthMismatch {
                    name: column.name.clone(),
                    expected: rows,
                    actual: column.data.len(),
                });
            }
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(DatasetError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Load a dataset from a CSV file
    ///
    /// # Errors
    /// Returns `DatasetError::FileNotFound` when the path does not exist; this
    /// is fatal for a drift run.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DatasetError::FileNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let dataset = Self::from_csv_str(&content)?;
        tracing::info!(
            "Loaded {} rows, {} columns from {}",
            dataset.len(),
            dataset.columns.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Parse CSV text with a header row
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let format = Format::default().with_header(true);
        let (inferred, _) = format.infer_schema(content.as_bytes(), Some(0))?;
        let names: Vec<String> = inferred
            .fields()
            .iter()
            .map(|f| f.name().trim().to_string())
            .collect();
        if names.iter().all(|n| n.is_empty()) {
            return Err(DatasetError::MissingHeader);
        }

        let schema = Schema::new(
            names
                .iter()
                .map(|n| Field::new(n.as_str(), DataType::Utf8, true))
                .collect::<Vec<_>>(),
        );
        let reader = ReaderBuilder::new(Arc::new(schema))
            .with_header(true)
            .build(content.as_bytes())?;

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
        for batch in reader {
            append_batch(&mut cells, &names, &batch?)?;
        }

        let columns = names
            .into_iter()
            .zip(cells)
            .map(|(name, raw)| Column {
                name,
                data: infer_column(raw),
            })
            .collect();
        Self::from_columns(columns)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Raw numeric cells of a column, `None` if absent or non-numeric
    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        match &self.column(name)?.data {
            ColumnData::Numeric(values) => Some(values),
            ColumnData::Text(_) => None,
        }
    }

    /// Non-missing numeric values of a column
    pub fn numeric_values(&self, name: &str) -> Option<Vec<f64>> {
        self.numeric(name)
            .map(|values| values.iter().flatten().copied().collect())
    }

    /// Copy of the dataset with one column removed (no-op if absent)
    pub fn without_column(&self, name: &str) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .filter(|c| c.name != name)
                .cloned()
                .collect(),
            rows: self.rows,
        }
    }

    /// Number of rows that exactly repeat an earlier row
    pub fn duplicate_rows(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        (0..self.rows)
            .filter(|&row| {
                let key: Vec<String> = self.columns.iter().map(|c| c.data.cell_key(row)).collect();
                !seen.insert(key)
            })
            .count()
    }
}

fn is_missing(cell: &str) -> bool {
    let trimmed = cell.trim();
    MISSING_MARKERS
        .iter()
        .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

/// Append the cells of one record batch to the per-column buffers
fn append_batch(
    cells: &mut [Vec<Option<String>>],
    names: &[String],
    batch: &RecordBatch,
) -> Result<()> {
    for (i, (column, name)) in cells.iter_mut().zip(names).enumerate() {
        let array = batch
            .column(i)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| DatasetError::UnexpectedType(name.clone()))?;
        column.extend(array.iter().map(|cell| cell.map(str::to_string)));
    }
    Ok(())
}

/// Type a raw column: numeric if every non-missing cell parses as f64
fn infer_column(raw: Vec<Option<String>>) -> ColumnData {
    let parsed: Option<Vec<Option<f64>>> = raw
        .iter()
        .map(|cell| match cell.as_deref() {
            Some(text) if !is_missing(text) => text.trim().parse::<f64>().ok().map(Some),
            _ => Some(None),
        })
        .collect();

    match parsed {
        Some(values) => ColumnData::Numeric(values),
        None => ColumnData::Text(
            raw.into_iter()
                .map(|cell| cell.filter(|text| !is_missing(text)))
                .collect(),
        ),
    }
}
