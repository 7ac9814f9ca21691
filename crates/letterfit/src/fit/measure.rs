//! Measurement Port — the single external capability the fitting core consumes.
//!
//! ARCHITECTURAL RULE: the solver and adjuster never inspect glyphs, wrap text,
//! or talk to a rendering engine directly. All height questions go through
//! `MeasurementPort`. Backends may be a real layout engine page, a text-shaping
//! library, or the word-wrap approximation in `fonts::WrapMeasurer`.

use async_trait::async_trait;

use crate::errors::FitError;

/// Reports the rendered height of a text block at a candidate font size.
///
/// Contract:
/// - Deterministic: identical inputs always yield the identical height. The
///   binary search relies on this plus monotonicity (height non-decreasing as
///   font size increases at fixed width).
/// - `line_height_ratio` is the leading multiplier; line spacing is
///   `font_size * line_height_ratio` in the backend's own layout.
/// - Height and width share one unit system chosen by the caller.
///
/// Held as `&dyn MeasurementPort`; a backend may be internally async (e.g. it
/// awaits a layout pass), which is why the trait is async. Calls are strictly
/// sequential from the solver's point of view.
#[async_trait]
pub trait MeasurementPort: Send + Sync {
    async fn measure(
        &self,
        content: &[String],
        font_size: f64,
        line_height_ratio: f64,
        container_width: f64,
    ) -> Result<f64, FitError>;
}

/// Returns true when the block carries no visible text at all — no paragraphs,
/// or only whitespace across every paragraph. Such blocks skip the search
/// entirely (zero measurement calls).
pub fn is_blank(content: &[String]) -> bool {
    content.iter().all(|p| p.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank_empty_slice() {
        assert!(is_blank(&[]));
    }

    #[test]
    fn test_is_blank_whitespace_only_paragraphs() {
        let content = vec!["   ".to_string(), "\n\t".to_string(), String::new()];
        assert!(is_blank(&content));
    }

    #[test]
    fn test_is_blank_false_with_text() {
        let content = vec![String::new(), "Dear Emma,".to_string()];
        assert!(!is_blank(&content), "one non-blank paragraph is enough");
    }
}
