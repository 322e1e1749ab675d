use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One structurally valid CSV line, ready for materialization. The sign
/// is decided here, from which amount column was populated, and carried
/// forward so later steps never re-read the raw line.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCsvRow {
    /// 1-based physical line number in the uploaded file, header included
    pub row_number: usize,
    pub date_text: String,
    pub payee_text: String,
    pub amount_text: String,
    pub is_income: bool,
    pub original_line: String,
}

/// A row that could not be imported, with enough context to correct and
/// resubmit it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    pub row_number: usize,
    pub message: String,
    pub raw_data: String,
}

/// Parameters of a CSV upload call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvUploadRequest {
    pub account_id: String,
    pub default_category_id: String,
    pub skip_header: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    /// Per-row category assignment, keyed by physical row number.
    /// Rows absent from the map fall back to the default category.
    #[serde(default)]
    pub category_overrides: HashMap<usize, String>,
}

/// Outcome of a CSV upload call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvUploadResponse {
    pub success: bool,
    pub total_rows: usize,
    pub successful_imports: usize,
    pub failed_imports: usize,
    pub errors: Vec<ImportFailure>,
    pub imported_transaction_ids: Vec<String>,
    pub message: String,
}

/// One annotated sample row from a preview call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvPreviewRow {
    pub row_number: usize,
    pub date_text: String,
    pub payee: String,
    pub parsed_date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub is_income: Option<bool>,
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Outcome of a preview call: a bounded sample of annotated rows plus
/// what the parser detected about the file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvPreviewResponse {
    pub delimiter: char,
    pub total_rows: usize,
    pub rows: Vec<CsvPreviewRow>,
}
