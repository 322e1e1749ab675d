use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use crate::accounts::{AccountError, AccountRepository};
use crate::constants::{DEFAULT_DATE_FORMAT, PREVIEW_ROW_LIMIT};
use crate::db::DbTransactionExecutor;
use crate::errors::{Error, Result};
use crate::transactions::{NewTransaction, TransactionError, TransactionRepository};

use super::csv_parser::{detect_delimiter, extract_rows, parse_amount, parse_date};
use super::imports_errors::ImportError;
use super::imports_model::{
    CsvPreviewResponse, CsvPreviewRow, CsvUploadRequest, CsvUploadResponse, ImportFailure,
};

/// Service for importing bank-exported CSV/TSV files into an account
pub struct ImportService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl ImportService {
    /// Creates a new ImportService instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Imports a CSV file into the requested account.
    ///
    /// The target account and every referenced category are validated up
    /// front; a missing reference aborts the whole call. After that, each
    /// row stands on its own: a row that fails to parse is reported in
    /// the response while the rest of the batch goes through. Only an
    /// unexpected storage failure rolls the batch back.
    pub fn import_csv(
        &self,
        file_content: &str,
        request: CsvUploadRequest,
    ) -> Result<CsvUploadResponse> {
        let account_repo = AccountRepository::new(self.pool.clone());
        account_repo
            .get_active(&request.account_id)
            .map_err(|e| match e {
                AccountError::NotFound(_) => {
                    Error::Import(ImportError::AccountNotFound(request.account_id.clone()))
                }
                other => Error::Account(other),
            })?;

        let transaction_repo = TransactionRepository::new(self.pool.clone());
        if !transaction_repo.category_exists(&request.default_category_id)? {
            return Err(Error::Import(ImportError::CategoryNotFound(
                request.default_category_id.clone(),
            )));
        }
        for category_id in request.category_overrides.values() {
            if !transaction_repo.category_exists(category_id)? {
                return Err(Error::Import(ImportError::CategoryNotFound(
                    category_id.clone(),
                )));
            }
        }

        let delimiter = detect_delimiter(file_content);
        let (rows, mut failures) = extract_rows(file_content, delimiter, request.skip_header);
        let total_rows = rows.len() + failures.len();

        let date_format = request
            .date_format
            .clone()
            .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string());

        let (imported_ids, row_failures) =
            self.pool
                .execute(|conn| -> Result<(Vec<String>, Vec<ImportFailure>)> {
                    let mut imported_ids = Vec::new();
                    let mut row_failures = Vec::new();

                    for row in &rows {
                        let Some(date) = parse_date(&row.date_text, &date_format) else {
                            row_failures.push(ImportFailure {
                                row_number: row.row_number,
                                message: format!("Unparseable date '{}'", row.date_text),
                                raw_data: row.original_line.clone(),
                            });
                            continue;
                        };

                        let Some(parsed_amount) = parse_amount(&row.amount_text) else {
                            row_failures.push(ImportFailure {
                                row_number: row.row_number,
                                message: format!("Unparseable amount '{}'", row.amount_text),
                                raw_data: row.original_line.clone(),
                            });
                            continue;
                        };

                        // The populated column decides the sign, whatever
                        // the source text carried
                        let amount = if row.is_income {
                            parsed_amount.abs()
                        } else {
                            -parsed_amount.abs()
                        };

                        let category_id = request
                            .category_overrides
                            .get(&row.row_number)
                            .cloned()
                            .unwrap_or_else(|| request.default_category_id.clone());

                        let new_transaction = NewTransaction {
                            id: None,
                            amount,
                            payee: row.payee_text.clone(),
                            notes: None,
                            transaction_date: date,
                            is_income: row.is_income,
                            account_id: request.account_id.clone(),
                            category_id,
                            recurring_transaction_id: None,
                        };

                        match TransactionRepository::insert_with_conn(conn, new_transaction) {
                            Ok(transaction) => imported_ids.push(transaction.id),
                            Err(TransactionError::DatabaseError(msg)) => {
                                return Err(Error::Import(ImportError::DatabaseError(msg)));
                            }
                            Err(e) => {
                                row_failures.push(ImportFailure {
                                    row_number: row.row_number,
                                    message: e.to_string(),
                                    raw_data: row.original_line.clone(),
                                });
                            }
                        }
                    }

                    Ok((imported_ids, row_failures))
                })?;

        failures.extend(row_failures);
        failures.sort_by_key(|f| f.row_number);

        if !imported_ids.is_empty() {
            account_repo.recalculate_balance(&request.account_id)?;
        }

        let successful_imports = imported_ids.len();
        let failed_imports = failures.len();

        debug!(
            "Imported {} of {} rows into account {}",
            successful_imports, total_rows, request.account_id
        );

        Ok(CsvUploadResponse {
            success: failures.is_empty(),
            total_rows,
            successful_imports,
            failed_imports,
            message: format!(
                "Processed {} rows: {} imported, {} failed",
                total_rows, successful_imports, failed_imports
            ),
            errors: failures,
            imported_transaction_ids: imported_ids,
        })
    }

    /// Annotates a bounded sample of the file without touching the store
    pub fn preview_csv(
        &self,
        file_content: &str,
        skip_header: bool,
        date_format: Option<&str>,
    ) -> Result<CsvPreviewResponse> {
        let delimiter = detect_delimiter(file_content);
        let (rows, failures) = extract_rows(file_content, delimiter, skip_header);
        let total_rows = rows.len() + failures.len();

        let format = date_format.unwrap_or(DEFAULT_DATE_FORMAT);

        let mut preview: Vec<CsvPreviewRow> = Vec::new();

        for row in rows {
            let parsed_date = parse_date(&row.date_text, format);
            let parsed_amount = parse_amount(&row.amount_text);

            let mut errors = Vec::new();
            if parsed_date.is_none() {
                errors.push(format!("Unparseable date '{}'", row.date_text));
            }
            if parsed_amount.is_none() {
                errors.push(format!("Unparseable amount '{}'", row.amount_text));
            }

            let amount = parsed_amount.map(|a| if row.is_income { a.abs() } else { -a.abs() });

            preview.push(CsvPreviewRow {
                row_number: row.row_number,
                date_text: row.date_text,
                payee: row.payee_text,
                parsed_date,
                amount,
                is_income: Some(row.is_income),
                is_valid: errors.is_empty(),
                errors,
            });
        }

        for failure in failures {
            preview.push(CsvPreviewRow {
                row_number: failure.row_number,
                date_text: String::new(),
                payee: String::new(),
                parsed_date: None,
                amount: None,
                is_income: None,
                is_valid: false,
                errors: vec![failure.message],
            });
        }

        preview.sort_by_key(|r| r.row_number);
        preview.truncate(PREVIEW_ROW_LIMIT);

        Ok(CsvPreviewResponse {
            delimiter,
            total_rows,
            rows: preview,
        })
    }
}
