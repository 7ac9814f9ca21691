//! Fit Solver — binary search for the largest font size that keeps a text
//! block inside its container.
//!
//! # Algorithm
//! - Blank content short-circuits to `min_size` with zero measurement calls.
//! - Otherwise: classic sequential binary search over `[min_size, max_size]`,
//!   one `MeasurementPort` call per iteration, keeping the largest size whose
//!   measured height fits. Measurement calls are assumed expensive (a real
//!   layout pass), so the search is capped at `MAX_ATTEMPTS` and exits early
//!   once the bracket is narrower than `precision`.
//! - If even the floor overflows, the solver still returns `min_size` with
//!   `fits = false` — overflow policy (clip, truncate) is the caller's call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::FitError;
use crate::fit::measure::{is_blank, MeasurementPort};

/// Hard cap on binary-search iterations. 25 halvings converge well past any
/// realistic `precision` on any realistic size range.
pub const MAX_ATTEMPTS: u32 = 25;

// ────────────────────────────────────────────────────────────────────────────
// Request / result types
// ────────────────────────────────────────────────────────────────────────────

/// One fit attempt for a primary text block. Constructed fresh per document
/// render, consumed once, discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitRequest {
    /// Ordered paragraphs; each may contain embedded single-line breaks.
    pub content: Vec<String>,
    /// Container dimensions, in whatever unit the measurement backend speaks.
    pub container_width: f64,
    pub container_height: f64,
    /// Inclusive font-size bounds, in points.
    pub min_size: f64,
    pub max_size: f64,
    /// Leading multiplier: line spacing = font size × this ratio.
    pub line_height_ratio: f64,
    /// Minimum size delta at which the search may stop (e.g. 0.1pt).
    pub precision: f64,
}

impl FitRequest {
    /// Rejects malformed requests before any measurement call. Never clamps.
    pub fn validate(&self) -> Result<(), FitError> {
        if !(self.min_size < self.max_size) {
            return Err(FitError::InvalidRequest(format!(
                "min_size ({}) must be strictly below max_size ({})",
                self.min_size, self.max_size
            )));
        }
        if self.min_size <= 0.0 {
            return Err(FitError::InvalidRequest(format!(
                "min_size must be positive, got {}",
                self.min_size
            )));
        }
        if !(self.precision > 0.0) {
            return Err(FitError::InvalidRequest(format!(
                "precision must be positive, got {}",
                self.precision
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

/// Outcome of a fit attempt.
///
/// `resolved_size` is always within `[min_size, max_size]`. `fits` is false
/// when even `min_size` overflows the container, or when a solve is cancelled
/// before any probe has fit (no candidate exists to vouch for).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub resolved_size: f64,
    pub fits: bool,
    /// Number of `MeasurementPort` calls the search issued.
    pub measurements: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Cancellation
// ────────────────────────────────────────────────────────────────────────────

/// Cooperative cancellation flag, checked between measurement calls only
/// (never mid-measurement). A cancelled solve returns the best candidate found
/// so far instead of an error, so completed measurement work is not wasted.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Solver
// ────────────────────────────────────────────────────────────────────────────

/// Finds the largest font size in `[min_size, max_size]` at which `content`
/// fits into the container, to within `precision`.
///
/// Measurement errors propagate verbatim — a guessed height would corrupt the
/// search, so there is no retry or fallback here.
pub async fn solve(
    request: &FitRequest,
    port: &dyn MeasurementPort,
    cancel: &CancelFlag,
) -> Result<FitResult, FitError> {
    request.validate()?;

    // Blank content needs no search: a fixed minimal result, not an error.
    if is_blank(&request.content) {
        return Ok(FitResult {
            resolved_size: request.min_size,
            fits: true,
            measurements: 0,
        });
    }

    let mut low = request.min_size;
    let mut high = request.max_size;
    let mut best: Option<f64> = None;
    let mut measurements = 0u32;
    let mut cancelled = false;

    for attempt in 0..MAX_ATTEMPTS {
        if (high - low) < request.precision {
            break;
        }
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        let mid = (low + high) / 2.0;
        let height = port
            .measure(
                &request.content,
                mid,
                request.line_height_ratio,
                request.container_width,
            )
            .await?;
        measurements += 1;

        if height <= request.container_height {
            // Fits — record it and search upward. We want the LARGEST fitting
            // size, not the smallest.
            best = Some(mid);
            low = mid;
        } else {
            high = mid;
        }

        debug!(
            attempt,
            candidate = mid,
            height,
            container_height = request.container_height,
            "fit probe"
        );
    }

    match best {
        Some(size) => Ok(FitResult {
            resolved_size: size,
            fits: true,
            measurements,
        }),
        None if cancelled => Ok(FitResult {
            resolved_size: request.min_size,
            fits: false,
            measurements,
        }),
        None => {
            // No probe fit. Confirm the floor directly: the true best fit may
            // still sit inside [min_size, min_size + precision).
            let floor_height = port
                .measure(
                    &request.content,
                    request.min_size,
                    request.line_height_ratio,
                    request.container_width,
                )
                .await?;
            measurements += 1;
            let fits = floor_height <= request.container_height;
            if !fits {
                warn!(
                    min_size = request.min_size,
                    floor_height,
                    container_height = request.container_height,
                    "content overflows container even at minimum font size"
                );
            }
            Ok(FitResult {
                resolved_size: request.min_size,
                fits,
                measurements,
            })
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
