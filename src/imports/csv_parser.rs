use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use crate::constants::{DELIMITER_SAMPLE_LEN, MIN_CSV_COLUMNS};

use super::imports_model::{ImportFailure, RawCsvRow};

/// Delimiters tried during detection, in tie-breaking order
const CANDIDATE_DELIMITERS: [char; 4] = ['\t', ',', ';', '|'];

/// Date formats tried after the caller-supplied format fails
const FALLBACK_DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d", "%m-%d-%Y", "%d-%m-%Y",
];

lazy_static! {
    // Card-number shapes, longest first so partial overlaps cannot
    // leave digits behind
    static ref CARD_16_DIGITS: Regex =
        Regex::new(r"\b\d{4}[\s-]*\d{4}[\s-]*\d{4}[\s-]*\d{4}\b").unwrap();
    static ref CARD_15_DIGITS: Regex =
        Regex::new(r"\b\d{4}[\s-]*\d{6}[\s-]*\d{5}\b").unwrap();
    static ref CARD_12_DIGITS: Regex =
        Regex::new(r"\b\d{4}[\s-]*\d{4}[\s-]*\d{4}\b").unwrap();
    static ref MASKED_CARD: Regex = Regex::new(r"\b\d{4}\*{8,12}\d{4}\b").unwrap();
    static ref CARD_PLACEHOLDER: Regex = Regex::new(r"(?i)<cc_number>").unwrap();
    static ref MASK_RUN: Regex = Regex::new(r"\*{4,}").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Picks the field delimiter by counting candidate characters in the
/// leading slice of the file. Ties resolve to the first-seen maximum, so
/// the result is deterministic even for empty content.
pub fn detect_delimiter(content: &str) -> char {
    let sample: String = content.chars().take(DELIMITER_SAMPLE_LEN).collect();

    let mut best = CANDIDATE_DELIMITERS[0];
    let mut best_count = 0;
    for candidate in CANDIDATE_DELIMITERS {
        let count = sample.matches(candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Strips card-number-like substrings from payee text and normalizes the
/// remaining whitespace
pub fn sanitize_payee(payee: &str) -> String {
    let mut cleaned = payee.to_string();
    for pattern in [
        &*CARD_16_DIGITS,
        &*CARD_15_DIGITS,
        &*CARD_12_DIGITS,
        &*MASKED_CARD,
        &*CARD_PLACEHOLDER,
        &*MASK_RUN,
    ] {
        cleaned = pattern.replace_all(&cleaned, "").to_string();
    }
    WHITESPACE_RUN.replace_all(&cleaned, " ").trim().to_string()
}

/// Parses a date, trying the caller-supplied format first and then a
/// fixed list of common formats
pub fn parse_date(text: &str, preferred_format: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, preferred_format) {
        return Some(date);
    }
    FALLBACK_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Parses a free-form currency string into an exact decimal by dropping
/// everything except digits, the decimal point and the minus sign
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let filtered: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if filtered.is_empty() {
        return None;
    }
    filtered.parse().ok()
}

/// Splits raw file content into candidate rows and structural failures.
///
/// Row numbers are 1-based physical line numbers, counting the header
/// when one is skipped, so failure messages point at the original file.
/// Each valid row must carry at least five columns (date, payee,
/// expense, income, spare) with exactly one of the two amount columns
/// populated; that column decides the row's sign.
pub fn extract_rows(
    content: &str,
    delimiter: char,
    skip_header: bool,
) -> (Vec<RawCsvRow>, Vec<ImportFailure>) {
    let mut rows = Vec::new();
    let mut failures = Vec::new();

    let mut saw_line = false;
    for (index, line) in content.lines().enumerate() {
        saw_line = true;
        let row_number = index + 1;

        if skip_header && index == 0 {
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
        if fields.len() < MIN_CSV_COLUMNS {
            failures.push(ImportFailure {
                row_number,
                message: format!(
                    "Expected at least {} columns, found {}",
                    MIN_CSV_COLUMNS,
                    fields.len()
                ),
                raw_data: line.to_string(),
            });
            continue;
        }

        let date_text = fields[0].to_string();
        let expense_text = fields[2];
        let income_text = fields[3];

        if date_text.is_empty() {
            failures.push(ImportFailure {
                row_number,
                message: "Date column is empty".to_string(),
                raw_data: line.to_string(),
            });
            continue;
        }

        let (amount_text, is_income) = match (expense_text.is_empty(), income_text.is_empty()) {
            (false, true) => (expense_text.to_string(), false),
            (true, false) => (income_text.to_string(), true),
            (false, false) => {
                failures.push(ImportFailure {
                    row_number,
                    message: "Both expense and income columns are populated".to_string(),
                    raw_data: line.to_string(),
                });
                continue;
            }
            (true, true) => {
                failures.push(ImportFailure {
                    row_number,
                    message: "Neither expense nor income column is populated".to_string(),
                    raw_data: line.to_string(),
                });
                continue;
            }
        };

        let payee_text = sanitize_payee(fields[1]);
        if payee_text.is_empty() {
            failures.push(ImportFailure {
                row_number,
                message: "Payee is empty after sanitization".to_string(),
                raw_data: line.to_string(),
            });
            continue;
        }

        rows.push(RawCsvRow {
            row_number,
            date_text,
            payee_text,
            amount_text,
            is_income,
            original_line: line.to_string(),
        });
    }

    if !saw_line {
        failures.push(ImportFailure {
            row_number: 0,
            message: "CSV file is empty".to_string(),
            raw_data: String::new(),
        });
    }

    (rows, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn detects_the_dominant_delimiter() {
        assert_eq!(detect_delimiter("a\tb\tc\nd\te\tf"), '\t');
        assert_eq!(detect_delimiter("a,b,c\nd,e,f"), ',');
        assert_eq!(detect_delimiter("a;b;c"), ';');
        assert_eq!(detect_delimiter("a|b|c"), '|');
        // no candidate present falls back to the first-seen maximum
        assert_eq!(detect_delimiter("plain text"), '\t');
    }

    #[test]
    fn sanitize_strips_card_numbers_and_collapses_whitespace() {
        assert_eq!(
            sanitize_payee("Payment to 4500-1234-5678-9012 Store"),
            "Payment to Store"
        );
        assert_eq!(
            sanitize_payee("Amex 3712 123456 12345 charge"),
            "Amex charge"
        );
        assert_eq!(sanitize_payee("Card 1234********5678 shop"), "Card shop");
        assert_eq!(sanitize_payee("Shop <CC_NUMBER> refund"), "Shop refund");
        assert_eq!(sanitize_payee("Masked **** payee"), "Masked payee");
        assert_eq!(sanitize_payee("  Plain   payee  "), "Plain payee");
    }

    #[test]
    fn date_parsing_falls_back_through_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("2024-01-15", "%Y-%m-%d"), Some(expected));
        // fails the preferred format but succeeds via the fallback list
        assert_eq!(parse_date("15/01/2024", "%Y-%m-%d"), Some(expected));
        assert_eq!(parse_date("not a date", "%Y-%m-%d"), None);
    }

    #[test]
    fn amount_parsing_keeps_only_numeric_characters() {
        assert_eq!(parse_amount("$1,234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_amount("-42.10 USD"), Some(dec!(-42.10)));
        assert_eq!(parse_amount("free"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn extraction_decides_sign_from_the_populated_amount_column() {
        let content = "2024-01-15,Grocery Store,45.50,,x\n2024-01-16,Employer,,2000.00,x";
        let (rows, failures) = extract_rows(content, ',', false);

        assert!(failures.is_empty());
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].is_income);
        assert_eq!(rows[0].amount_text, "45.50");
        assert!(rows[1].is_income);
        assert_eq!(rows[1].amount_text, "2000.00");
    }

    #[test]
    fn extraction_counts_physical_lines_including_the_header() {
        let content = "date,payee,expense,income,card\n2024-01-15,Store,10.00,,x\nbad line";
        let (rows, failures) = extract_rows(content, ',', true);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].row_number, 3);
    }

    #[test]
    fn extraction_rejects_ambiguous_amount_columns() {
        let content = "2024-01-15,Store,10.00,20.00,x\n2024-01-16,Store,,,x";
        let (rows, failures) = extract_rows(content, ',', false);

        assert!(rows.is_empty());
        assert_eq!(failures.len(), 2);
        assert!(failures[0].message.contains("Both"));
        assert!(failures[1].message.contains("Neither"));
    }

    #[test]
    fn empty_file_reports_a_single_failure() {
        let (rows, failures) = extract_rows("", ',', false);
        assert!(rows.is_empty());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].row_number, 0);
    }
}
