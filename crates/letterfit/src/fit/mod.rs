// Text-fitting engine: policy-driven binary search for body blocks, ratio
// cascade for P.S. blocks, discrete tiers for name fields. All height
// questions go through the MeasurementPort trait.

pub mod measure;
pub mod pipeline;
pub mod policy;
pub mod secondary;
pub mod solver;

// Re-export the public API consumed by the rendering/export layer.
pub use measure::MeasurementPort;
pub use pipeline::{fit_document, fit_name, DocumentFit, DocumentFitRequest, Region};
pub use policy::{
    DiscreteRule, DiscreteTable, DocumentType, FieldKind, FontFamily, LayoutPolicy, PolicySet,
};
pub use secondary::{adjust, SecondaryFitRequest};
pub use solver::{solve, CancelFlag, FitRequest, FitResult, MAX_ATTEMPTS};
