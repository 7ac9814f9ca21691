//! Document fitting pipeline — policy resolution wired to the two solvers.
//!
//! One call per document render: resolve the policy for the body, binary-search
//! its size, then cascade the P.S. block from the resolved size. Name fields go
//! through the discrete tier lookup instead. Both resolved sizes are plain
//! numbers the external render/export step applies however it likes.
//!
//! Concurrent renders are independent: every request is self-contained and the
//! pipeline holds no state, so documents may be fit on separate tasks as long
//! as each owns its measurement backend session.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::FitError;
use crate::fit::measure::{is_blank, MeasurementPort};
use crate::fit::policy::{DocumentType, FieldKind, FontFamily, PolicySet};
use crate::fit::secondary;
use crate::fit::solver::{self, CancelFlag, FitResult};

// ────────────────────────────────────────────────────────────────────────────
// Request / result types
// ────────────────────────────────────────────────────────────────────────────

/// A rectangular text region, in the measurement backend's units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub width: f64,
    pub height: f64,
}

/// Everything needed to fit one document's text blocks. Built fresh per
/// render from the merged order data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFitRequest {
    pub document_type: DocumentType,
    pub font_family: FontFamily,
    /// Primary block paragraphs (the letter body).
    pub body: Vec<String>,
    pub body_region: Region,
    /// Optional P.S. line with its reserved sub-region.
    pub postscript: Option<String>,
    pub postscript_region: Option<Region>,
}

/// Resolved sizes for one document, handed to the external render step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFit {
    pub body: FitResult,
    /// Present when the request carried a postscript block.
    pub postscript_size: Option<f64>,
}

// ────────────────────────────────────────────────────────────────────────────
// Operations
// ────────────────────────────────────────────────────────────────────────────

/// Fits a document's primary and secondary blocks under the given policies.
///
/// A postscript without a reserved region is a malformed request; a region
/// without postscript text is simply unused.
pub async fn fit_document(
    request: &DocumentFitRequest,
    policies: &PolicySet,
    port: &dyn MeasurementPort,
    cancel: &CancelFlag,
) -> Result<DocumentFit, FitError> {
    if request.postscript.is_some() && request.postscript_region.is_none() {
        return Err(FitError::InvalidRequest(
            "postscript block requires a postscript region".to_string(),
        ));
    }

    let body_policy = policies.resolve(
        request.document_type,
        request.font_family,
        FieldKind::Body,
    );
    let body_request = body_policy.fit_request(
        request.body.clone(),
        request.body_region.width,
        request.body_region.height,
    );
    let body = solver::solve(&body_request, port, cancel).await?;

    debug!(
        document_type = ?request.document_type,
        font_family = ?request.font_family,
        resolved_size = body.resolved_size,
        fits = body.fits,
        "body block fitted"
    );

    let postscript_size = match (&request.postscript, &request.postscript_region) {
        (Some(text), Some(region)) => {
            let ps_policy = policies.resolve(
                request.document_type,
                request.font_family,
                FieldKind::Postscript,
            );
            let ps_request = ps_policy.secondary_request(
                text.clone(),
                region.width,
                region.height,
                body.resolved_size,
            );
            Some(secondary::adjust(&ps_request, port, cancel).await?)
        }
        _ => None,
    };

    Ok(DocumentFit {
        body,
        postscript_size,
    })
}

/// Sizes a single-line identity field (a name on an envelope or label) via
/// the discrete tier table.
///
/// The wrapped-line count comes from the measurement backend at the policy's
/// start size: `lines = height / (size × leading)`, the same trick the
/// rendered templates use. Policies without a discrete table fall back to
/// their start size unchanged.
pub async fn fit_name(
    name: &str,
    document_type: DocumentType,
    font_family: FontFamily,
    policies: &PolicySet,
    port: &dyn MeasurementPort,
    container_width: f64,
) -> Result<f64, FitError> {
    let policy = policies.resolve(document_type, font_family, FieldKind::Name);
    let table = match &policy.discrete {
        Some(table) => table,
        None => return Ok(policy.start_size),
    };

    let content = [name.to_string()];
    let wrapped_lines = if is_blank(&content) {
        1
    } else {
        let height = port
            .measure(
                &content,
                policy.start_size,
                policy.line_height_ratio,
                container_width,
            )
            .await?;
        let lines = (height / (policy.start_size * policy.line_height_ratio)).round() as u32;
        lines.max(1)
    };

    let char_count = name.chars().count();
    let size = table.size_for(char_count, wrapped_lines);

    debug!(
        document_type = ?document_type,
        char_count,
        wrapped_lines,
        size,
        "name field sized"
    );
    Ok(size)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
