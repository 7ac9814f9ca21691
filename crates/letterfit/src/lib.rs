//! letterfit — dynamic text-fitting for personalized printed documents.
//!
//! Given a block of personalized text and a fixed physical container, pick the
//! largest font size that fills the container without overflowing, then size a
//! subordinate P.S. block against the result. Rendering, template merge, and
//! PDF export live elsewhere; this crate only needs a [`MeasurementPort`] that
//! can report rendered height for text at a candidate size.

pub mod errors;
pub mod fit;
pub mod fonts;

pub use errors::FitError;
pub use fit::{
    adjust, fit_document, fit_name, solve, CancelFlag, DocumentFit, DocumentFitRequest,
    DocumentType, FieldKind, FitRequest, FitResult, FontFamily, LayoutPolicy, MeasurementPort,
    PolicySet, Region, SecondaryFitRequest,
};
pub use fonts::WrapMeasurer;
