use crate::error::CorrelationError;
use crate::pairwise::{join_on_timestamps, pearson};
use chrono::{DateTime, Utc};
use core_types::ReturnSeries;
use serde::{Deserialize, Serialize};

/// A trailing-window correlation series between two assets.
///
/// `values[i]` covers the window ending at `timestamps[i]`; the first
/// `window - 1` entries are `None` because too few paired observations
/// precede them. Individual later entries may also be `None` when a window
/// has zero variance on either side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingCorrelation {
    pub symbol_a: String,
    pub symbol_b: String,
    pub window: usize,
    pub timestamps: Vec<DateTime<Utc>>,
    pub values: Vec<Option<f64>>,
}

/// Computes the rolling correlation of two return series over their
/// timestamp overlap.
pub fn rolling(
    a: &ReturnSeries,
    b: &ReturnSeries,
    window: usize,
) -> Result<RollingCorrelation, CorrelationError> {
    if window < 2 {
        return Err(CorrelationError::InvalidParameter {
            name: "window".to_string(),
            reason: format!("must be at least 2, got {}", window),
        });
    }

    let (timestamps, xs, ys) = join_on_timestamps(a, b);
    let values = (0..timestamps.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                pearson(&xs[i + 1 - window..=i], &ys[i + 1 - window..=i])
            }
        })
        .collect();

    Ok(RollingCorrelation {
        symbol_a: a.symbol.clone(),
        symbol_b: b.symbol.clone(),
        window,
        timestamps,
        values,
    })
}
