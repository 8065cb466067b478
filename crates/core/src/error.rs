use serde::Serialize;
use thiserror::Error;

/// Broad category of an allocation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A single field is malformed or out of range.
    InvalidInput,
    /// The cap and asset count together cannot reach 100%.
    InfeasibleConstraint,
}

/// Errors returned by the allocation engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocationError {
    /// A request field is missing, non-finite, or out of range.
    #[error("invalid {field}{}: {value} ({reason})", symbol_suffix(.symbol))]
    InvalidInput {
        /// Request field the value came from.
        field: &'static str,
        /// Symbol of the offending asset, when the field belongs to one.
        symbol: Option<String>,
        /// Offending value as received.
        value: String,
        /// What the value violated.
        reason: &'static str,
    },

    /// `asset_cap * asset_count < 1`, so no capped allocation sums to 100%.
    #[error(
        "asset cap {asset_cap} cannot be satisfied with {asset_count} assets: \
         cap x asset count must be at least 1"
    )]
    InfeasibleConstraint { asset_cap: f64, asset_count: usize },
}

fn symbol_suffix(symbol: &Option<String>) -> String {
    symbol
        .as_ref()
        .map_or_else(String::new, |s| format!(" for {s}"))
}

impl AllocationError {
    pub(crate) fn invalid(field: &'static str, value: impl ToString, reason: &'static str) -> Self {
        Self::InvalidInput {
            field,
            symbol: None,
            value: value.to_string(),
            reason,
        }
    }

    pub(crate) fn invalid_asset(
        field: &'static str,
        symbol: &str,
        value: impl ToString,
        reason: &'static str,
    ) -> Self {
        Self::InvalidInput {
            field,
            symbol: Some(symbol.to_string()),
            value: value.to_string(),
            reason,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::InfeasibleConstraint { .. } => ErrorKind::InfeasibleConstraint,
        }
    }
}
