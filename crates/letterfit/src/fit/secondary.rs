//! Secondary Fit Adjuster — sizes a subordinate block (the P.S. line) relative
//! to the primary block's resolved size.
//!
//! # Cascade, not binary search
//! The secondary block is short (a sentence or two) and visual consistency
//! with the primary block matters more than pixel-perfect fill. A fixed ratio
//! cascade (100%/90%/80%/70% by default) is cheap and predictable: the first
//! non-overflowing ratio wins, and the last ratio is accepted unconditionally
//! rather than shrinking into unreadable text.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::FitError;
use crate::fit::measure::MeasurementPort;
use crate::fit::solver::CancelFlag;

/// One adjustment attempt for a secondary block. Consumed once per render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondaryFitRequest {
    /// The secondary text, a single logical unit.
    pub content: String,
    /// Dimensions of the reserved sub-region.
    pub container_width: f64,
    pub container_height: f64,
    /// The primary block's resolved size — the cascade starts from here.
    pub base_size: f64,
    pub line_height_ratio: f64,
    /// Multipliers tried in order; first non-overflowing wins, the last is the
    /// unconditional floor.
    pub step_down_ratios: Vec<f64>,
}

impl SecondaryFitRequest {
    pub fn validate(&self) -> Result<(), FitError> {
        if !(self.base_size > 0.0) {
            return Err(FitError::InvalidRequest(format!(
                "base_size must be positive, got {}",
                self.base_size
            )));
        }
        if self.step_down_ratios.is_empty() {
            return Err(FitError::InvalidRequest(
                "step_down_ratios must not be empty".to_string(),
            ));
        }
        for window in self.step_down_ratios.windows(2) {
            if window[1] > window[0] {
                return Err(FitError::InvalidRequest(format!(
                    "step_down_ratios must be non-increasing, got {} after {}",
                    window[1], window[0]
                )));
            }
        }
        if self
            .step_down_ratios
            .iter()
            .any(|r| !(*r > 0.0) || *r > 1.0)
        {
            return Err(FitError::InvalidRequest(format!(
                "step_down_ratios must lie in (0, 1], got {:?}",
                self.step_down_ratios
            )));
        }
        if self.container_width < 0.0 || self.container_height < 0.0 {
            return Err(FitError::InvalidRequest(format!(
                "container dimensions must be non-negative, got {}×{}",
                self.container_width, self.container_height
            )));
        }
        if !(self.line_height_ratio > 0.0) {
            return Err(FitError::InvalidRequest(format!(
                "line_height_ratio must be positive, got {}",
                self.line_height_ratio
            )));
        }
        Ok(())
    }
}

/// Resolves the secondary block's font size.
///
/// Returns `base_size * ratios[i]` for the smallest `i` whose measured height
/// fits, or the last ratio's size if none fit. Uses at most `ratios.len()`
/// measurement calls. Blank content returns `base_size` with zero calls.
pub async fn adjust(
    request: &SecondaryFitRequest,
    port: &dyn MeasurementPort,
    cancel: &CancelFlag,
) -> Result<f64, FitError> {
    request.validate()?;

    if request.content.trim().is_empty() {
        return Ok(request.base_size);
    }

    let content = [request.content.clone()];
    let mut floor = request.base_size;

    for (step, ratio) in request.step_down_ratios.iter().enumerate() {
        let candidate = request.base_size * ratio;
        floor = candidate;

        if cancel.is_cancelled() {
            return Ok(candidate);
        }

        let height = port
            .measure(
                &content,
                candidate,
                request.line_height_ratio,
                request.container_width,
            )
            .await?;

        if height <= request.container_height {
            debug!(step, candidate, "secondary block fits");
            return Ok(candidate);
        }
    }

    // All ratios exhausted: accept the floor, overflow and all.
    warn!(
        floor,
        base_size = request.base_size,
        "secondary block overflows at every cascade step, accepting floor size"
    );
    Ok(floor)
}
