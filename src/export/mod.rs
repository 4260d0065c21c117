//! Tabular export of a filtered submission set: a multi-sheet workbook or a
//! single flat CSV table, both built from the same [`table::Workbook`].

pub mod delimited;
pub mod spreadsheet;
pub mod table;

pub use table::{build_workbook, Cell, Sheet, Workbook};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet write failed: {0}")]
    Spreadsheet(String),
}

/// Output formats offered for download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    /// `sales-export-<unix-millis>.<ext>`
    pub fn file_name(self, unix_millis: i64) -> String {
        format!("sales-export-{unix_millis}.{}", self.extension())
    }

    pub fn render(self, workbook: &Workbook) -> Result<Vec<u8>, ExportError> {
        match self {
            ExportFormat::Xlsx => spreadsheet::render(workbook),
            ExportFormat::Csv => delimited::render(&workbook.submissions),
        }
    }
}
