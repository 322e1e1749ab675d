/// Category used for both legs of an account-to-account transfer
pub const TRANSFER_CATEGORY_NAME: &str = "Transfer";

/// Date format tried first when an import supplies none
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of leading characters inspected when detecting a delimiter
pub const DELIMITER_SAMPLE_LEN: usize = 1000;

/// Minimum columns a CSV row must carry: date, payee, expense, income, card number
pub const MIN_CSV_COLUMNS: usize = 5;

/// Rows returned by an import preview
pub const PREVIEW_ROW_LIMIT: usize = 10;

/// Progress percentage at which a goal counts as near completion
pub const NEAR_COMPLETION_THRESHOLD: f64 = 90.0;
