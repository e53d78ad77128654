//! Semantic type classification of raw cell text
//!
//! Rules are evaluated top to bottom and the first match wins. The order is
//! load-bearing: a year must be tested before a plain integer, a currency
//! symbol before any number parsing.

use crate::grid::CellValue;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Semantic type assigned to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataType {
    Empty,
    Year,
    Integer,
    Float,
    Percentage,
    Scientific,
    Date,
    Time,
    Currency,
    Email,
    Others,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Empty => "Empty",
            DataType::Year => "Year",
            DataType::Integer => "Integer",
            DataType::Float => "Float",
            DataType::Percentage => "Percentage",
            DataType::Scientific => "Scientific",
            DataType::Date => "Date",
            DataType::Time => "Time",
            DataType::Currency => "Currency",
            DataType::Email => "Email",
            DataType::Others => "Others",
        }
    }

    /// Numeric-looking types (used by table heuristics)
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Year
                | DataType::Integer
                | DataType::Float
                | DataType::Percentage
                | DataType::Scientific
                | DataType::Currency
        )
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the ordered rule chain
struct TypeRule {
    data_type: DataType,
    matches: fn(&str) -> bool,
}

const RULES: &[TypeRule] = &[
    TypeRule {
        data_type: DataType::Empty,
        matches: is_empty,
    },
    TypeRule {
        data_type: DataType::Year,
        matches: is_year,
    },
    TypeRule {
        data_type: DataType::Currency,
        matches: is_currency,
    },
    TypeRule {
        data_type: DataType::Percentage,
        matches: is_percentage,
    },
    TypeRule {
        data_type: DataType::Scientific,
        matches: is_scientific,
    },
    TypeRule {
        data_type: DataType::Date,
        matches: is_date,
    },
    TypeRule {
        data_type: DataType::Time,
        matches: is_time,
    },
    TypeRule {
        data_type: DataType::Integer,
        matches: is_integer,
    },
    TypeRule {
        data_type: DataType::Float,
        matches: is_float,
    },
    TypeRule {
        data_type: DataType::Email,
        matches: is_email,
    },
];

/// Classify raw cell text. Total and deterministic.
pub fn classify(text: &str) -> DataType {
    let text = text.trim();
    RULES
        .iter()
        .find(|rule| (rule.matches)(text))
        .map_or(DataType::Others, |rule| rule.data_type)
}

/// Classify a loaded value through its text rendering
pub fn classify_value(value: &CellValue) -> DataType {
    if value.is_empty() {
        return DataType::Empty;
    }
    classify(&value.as_text())
}

// Digits with optional thousands separators, no sign.
const GROUPED_DIGITS: &str = r"(?:\d{1,3}(?:,\d{3})+|\d+)";

fn regex(cell: &'static OnceLock<Regex>, pattern: impl FnOnce() -> String) -> &'static Regex {
    cell.get_or_init(|| Regex::new(&pattern()).unwrap())
}

fn is_empty(text: &str) -> bool {
    text.is_empty() || text.eq_ignore_ascii_case("nan")
}

fn is_year(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, || r"^(?:19|20)\d{2}$".to_string()).is_match(text)
}

fn is_currency(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, || {
        let body = format!(r"{GROUPED_DIGITS}(?:\.\d+)?");
        format!(r"^(?:[-+]?[$€£¥₹]\s?[-+]?{body}|[-+]?{body}\s?[$€£¥₹])$")
    })
    .is_match(text)
}

fn is_percentage(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, || format!(r"^[-+]?{GROUPED_DIGITS}(?:\.\d+)?\s?%$")).is_match(text)
}

fn is_scientific(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, || r"^[-+]?\d+(?:\.\d+)?[eE][-+]?\d+$".to_string()).is_match(text)
}

fn is_date(text: &str) -> bool {
    static NUMERIC: OnceLock<Regex> = OnceLock::new();
    static NAMED: OnceLock<Regex> = OnceLock::new();
    // 2023-01-15, 2023/01/15, 01/15/2023, 15-01-23 (day/month order left unresolved)
    let numeric = regex(&NUMERIC, || {
        r"^(?:\d{4}[-/]\d{1,2}[-/]\d{1,2}|\d{1,2}[-/]\d{1,2}[-/](?:\d{4}|\d{2}))$".to_string()
    });
    // 1-Jan-2023, 15 December 2023, Jan 15, 2023, Jan-2023
    let named = regex(&NAMED, || {
        let month = r"(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?";
        format!(
            r"(?i)^(?:\d{{1,2}}[-\s/]{month}[-\s/,]+\d{{2,4}}|{month}\s\d{{1,2}}(?:st|nd|rd|th)?,?\s\d{{4}}|{month}[-\s]\d{{4}})$"
        )
    });
    numeric.is_match(text) || named.is_match(text)
}

fn is_time(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, || {
        [
            r"(?:[01]?\d|2[0-3]):[0-5]\d(?::[0-5]\d)?",
            r"(?:0?[1-9]|1[0-2]):[0-5]\d(?::[0-5]\d)?\s?[AaPp][Mm]",
        ]
        .map(|p| format!("^{p}$"))
        .join("|")
    })
    .is_match(text)
}

fn is_integer(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, || format!(r"^[-+]?{GROUPED_DIGITS}$")).is_match(text)
}

fn is_float(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, || format!(r"^[-+]?(?:{GROUPED_DIGITS}\.\d+|\.\d+)$")).is_match(text)
}

fn is_email(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, || {
        r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$".to_string()
    })
    .is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_all(values: &[&str], expected: DataType) {
        for value in values {
            assert_eq!(classify(value), expected, "value {value:?}");
        }
    }

    #[test]
    fn test_classify_empty_values() {
        assert_all(&["", " ", "\t", "nan", "NaN"], DataType::Empty);
        assert_eq!(classify_value(&CellValue::Empty), DataType::Empty);
        assert_eq!(classify_value(&CellValue::Number(f64::NAN)), DataType::Empty);
    }

    #[test]
    fn test_classify_year() {
        assert_all(&["2023", "1999", "2000", "2024", "1900", "2099"], DataType::Year);
        for value in ["1800", "3000", "23", "202", "20231"] {
            assert_ne!(classify(value), DataType::Year, "value {value:?}");
        }
        assert_eq!(classify("1800"), DataType::Integer);
        assert_eq!(classify_value(&CellValue::Number(2023.0)), DataType::Year);
    }

    #[test]
    fn test_classify_integer() {
        assert_all(&["123", "0", "-456", "1,000", "999,999", "+12"], DataType::Integer);
        assert_eq!(classify_value(&CellValue::Number(100.0)), DataType::Integer);
    }

    #[test]
    fn test_classify_float() {
        assert_all(&["123.45", "0.0", "-456.78", "1,000.50", ".5"], DataType::Float);
        assert_eq!(classify_value(&CellValue::Number(2.5)), DataType::Float);
    }

    #[test]
    fn test_classify_percentage() {
        assert_all(&["50%", "100%", "0.5%", "-25%"], DataType::Percentage);
    }

    #[test]
    fn test_classify_scientific() {
        assert_all(&["1.23e10", "4.56E-3", "-7.89e+5", "2E10"], DataType::Scientific);
    }

    #[test]
    fn test_classify_date() {
        assert_all(
            &[
                "2023-01-15",
                "01/15/2023",
                "15/01/2023",
                "1-Jan-2023",
                "15-Dec-2023",
                "Jan 15, 2023",
                "15 January 2023",
            ],
            DataType::Date,
        );
        assert_ne!(classify("2023-13"), DataType::Date);
    }

    #[test]
    fn test_classify_time() {
        assert_all(&["12:30", "09:15:30", "3:45 PM", "11:59 AM"], DataType::Time);
        assert_ne!(classify("25:00"), DataType::Time);
    }

    #[test]
    fn test_classify_currency() {
        assert_all(
            &["$100", "€50", "£25", "¥1000", "₹500", "$1,234.56", "100€", "-$5"],
            DataType::Currency,
        );
    }

    #[test]
    fn test_classify_email() {
        assert_all(
            &["test@example.com", "user.name@domain.co.uk", "info@company.org"],
            DataType::Email,
        );
        for value in ["notanemail", "@domain.com", "user@", "user@domain"] {
            assert_ne!(classify(value), DataType::Email, "value {value:?}");
        }
    }

    #[test]
    fn test_classify_others() {
        assert_all(
            &["Hello World", "Product Name", "ABC123", "Text Data", "1,00"],
            DataType::Others,
        );
        assert_eq!(classify_value(&CellValue::Boolean(true)), DataType::Others);
    }

    #[test]
    fn test_classification_is_deterministic() {
        for value in ["2023", "$5", "x@y.io", "12:00", "free text", ""] {
            assert_eq!(classify(value), classify(value));
        }
    }
}
