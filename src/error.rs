use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid calendar date for {field}: month={month}, day={day}")]
    InvalidMonthDay {
        field: &'static str,
        month: u32,
        day: u32,
    },
    #[error("terms out of order: {0}")]
    TermOrder(String),
    #[error("{field} must be within [0, 1], got {value}")]
    FractionOutOfRange { field: &'static str, value: f64 },
    #[error("{field} range is inverted: min={min}, max={max}")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{field} must not be negative, got {value}")]
    NegativeValue { field: &'static str, value: i64 },
    #[error("catalog has {available} modules for term {term}, need {required}")]
    CatalogTooSmall {
        term: u8,
        available: usize,
        required: usize,
    },
    #[error("program list is empty")]
    NoPrograms,
}
