// Module declarations
pub(crate) mod csv_parser;
pub(crate) mod imports_errors;
pub(crate) mod imports_model;
pub(crate) mod imports_service;

// Re-export the public interface
pub use csv_parser::{detect_delimiter, extract_rows, parse_amount, parse_date, sanitize_payee};
pub use imports_errors::ImportError;
pub use imports_model::{
    CsvPreviewResponse, CsvPreviewRow, CsvUploadRequest, CsvUploadResponse, ImportFailure,
    RawCsvRow,
};
pub use imports_service::ImportService;
