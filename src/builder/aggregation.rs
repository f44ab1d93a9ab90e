use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::flux::is_identifier;
use crate::selection::toggle;

/// Period value meaning "let the executor pick the window"
pub const AGG_WINDOW_AUTO: &str = "auto";

/// Window periods offered by the period picker
pub const WINDOW_PERIODS: &[&str] = &[
    AGG_WINDOW_AUTO,
    "5s",
    "15s",
    "1m",
    "5m",
    "15m",
    "1h",
    "6h",
    "12h",
    "24h",
    "2d",
    "7d",
    "30d",
];

/// Aggregate functions offered by the function list
pub const AGGREGATE_FUNCTIONS: &[&str] = &[
    "mean", "median", "max", "min", "sum", "count", "first", "last", "spread", "stddev",
];

/// Aggregation window period
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AggregationPeriod {
    #[default]
    Auto,
    /// A duration literal such as `13s`; validated by the executor
    Custom(String),
}

impl AggregationPeriod {
    /// Expression used as `every:` in the aggregate stage
    pub fn every(&self) -> &str {
        match self {
            AggregationPeriod::Auto => "v.windowPeriod",
            AggregationPeriod::Custom(duration) => duration,
        }
    }
}

impl From<String> for AggregationPeriod {
    fn from(value: String) -> Self {
        let value = value.trim();
        if value.is_empty() || value == AGG_WINDOW_AUTO {
            AggregationPeriod::Auto
        } else {
            AggregationPeriod::Custom(value.to_string())
        }
    }
}

impl From<AggregationPeriod> for String {
    fn from(period: AggregationPeriod) -> Self {
        period.to_string()
    }
}

impl fmt::Display for AggregationPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationPeriod::Auto => f.write_str(AGG_WINDOW_AUTO),
            AggregationPeriod::Custom(duration) => f.write_str(duration),
        }
    }
}

/// State of the aggregation card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AggregationSelectorState {
    pub period: AggregationPeriod,
    /// Create empty windows for missing data
    pub fill_missing: bool,
    /// Selected function names, in selection order
    pub selected_functions: Vec<String>,
}

impl Default for AggregationSelectorState {
    fn default() -> Self {
        Self {
            period: AggregationPeriod::Auto,
            fill_missing: false,
            selected_functions: vec!["mean".to_string()],
        }
    }
}

impl AggregationSelectorState {
    /// Sets the window period. Blank input is ignored and returns false.
    pub fn set_period(&mut self, value: &str) -> bool {
        if value.trim().is_empty() {
            return false;
        }
        self.period = AggregationPeriod::from(value.to_string());
        true
    }

    pub fn toggle_fill_missing(&mut self) {
        self.fill_missing = !self.fill_missing;
    }

    /// Toggles a function. Names that are not Flux identifiers are rejected
    /// and return false.
    pub fn toggle_function(&mut self, name: &str) -> bool {
        let name = name.trim();
        if !is_identifier(name) {
            return false;
        }
        self.selected_functions = toggle(&self.selected_functions, name);
        true
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected_functions.iter().any(|f| f == name)
    }

    /// Functions to emit, falling back to `default` when none is selected
    pub fn functions_or<'a>(&'a self, default: &'a str) -> Vec<&'a str> {
        if self.selected_functions.is_empty() {
            vec![default]
        } else {
            self.selected_functions.iter().map(String::as_str).collect()
        }
    }
}
