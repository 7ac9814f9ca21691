//! Static glyph-width tables for the two production faces, plus the built-in
//! word-wrap measurement backend.
//!
//! Character widths are in em units (relative to font size). Static tables are
//! an intentional approximation: a real layout engine knows exact glyph shapes,
//! but em tables land within a line or two of the rendered result, and the
//! solver's precision bound absorbs the residual error. Tables cover ASCII
//! 0x20..=0x7E (95 printable characters); index = (char as usize) - 32.

use async_trait::async_trait;

use crate::errors::FitError;
use crate::fit::measure::MeasurementPort;
use crate::fit::policy::FontFamily;

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one face.
///
/// `widths[i]` = width of ASCII character `(i + 32)` in em units at 1em.
/// Non-ASCII codepoints fall back to `average_char_width`.
pub struct FontMetricTable {
    pub family: FontFamily,
    widths: [f64; 95],
    pub average_char_width: f64,
    pub space_width: f64,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f64 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Counts the printed lines one unbroken text segment occupies when
    /// greedily word-wrapped at `container_width` physical units and the given
    /// font size. An empty segment still occupies one line slot (a rendered
    /// paragraph break).
    pub fn wrapped_lines(&self, segment: &str, font_size: f64, container_width: f64) -> u32 {
        let words: Vec<&str> = segment.split_whitespace().collect();
        if words.is_empty() {
            return 1;
        }

        let space_w = self.space_width * font_size;
        let mut lines = 1u32;
        let mut current_width = 0.0_f64;
        let mut first_on_line = true;

        for word in &words {
            let word_w = self.measure_str(word) * font_size;

            if !first_on_line && current_width + space_w + word_w > container_width {
                lines += 1;
                current_width = word_w;
            } else {
                let lead = if first_on_line { 0.0 } else { space_w };
                current_width += lead + word_w;
                first_on_line = false;
            }
        }
        lines
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

/// Griffiths — upright serif, used by "Block" letters and label messages.
static GRIFFITHS_TABLE: FontMetricTable = FontMetricTable {
    family: FontFamily::Griffiths,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.33, 0.41, 0.60, 0.55, 0.82, 0.71, 0.22, 0.38, 0.38, 0.47, 0.64, 0.27, 0.37, 0.27, 0.47,
        // 0     1     2     3     4     5     6     7     8     9
        0.55, 0.55, 0.55, 0.55, 0.55, 0.55, 0.55, 0.55, 0.55, 0.55,
        // :     ;     <     =     >     ?     @
        0.30, 0.30, 0.64, 0.64, 0.64, 0.48, 0.93,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.70, 0.70, 0.72, 0.77, 0.68, 0.62, 0.78, 0.83, 0.38, 0.51, 0.78, 0.64, 0.95,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.83, 0.79, 0.64, 0.79, 0.73, 0.60, 0.64, 0.78, 0.70, 0.98, 0.70, 0.66, 0.60,
        // [     \     ]     ^     _     `
        0.38, 0.47, 0.38, 0.64, 0.55, 0.55,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.50, 0.55, 0.46, 0.55, 0.50, 0.34, 0.51, 0.57, 0.28, 0.28, 0.54, 0.28, 0.88,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.58, 0.54, 0.56, 0.55, 0.41, 0.44, 0.35, 0.57, 0.50, 0.75, 0.50, 0.50, 0.45,
        // {     |     }     ~
        0.43, 0.38, 0.43, 0.64,
    ],
    average_char_width: 0.52,
    space_width: 0.25,
};

/// LilyWang — wide script face, used by "Fancy" letters, names, and addresses.
/// Capitals carry broad swashes, so the upper rows run much wider than the
/// serif table.
static LILY_WANG_TABLE: FontMetricTable = FontMetricTable {
    family: FontFamily::LilyWang,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.28, 0.30, 0.36, 0.62, 0.58, 0.90, 0.80, 0.20, 0.40, 0.40, 0.50, 0.62, 0.26, 0.40, 0.26, 0.50,
        // 0     1     2     3     4     5     6     7     8     9
        0.58, 0.58, 0.58, 0.58, 0.58, 0.58, 0.58, 0.58, 0.58, 0.58,
        // :     ;     <     =     >     ?     @
        0.30, 0.30, 0.62, 0.62, 0.62, 0.52, 1.00,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.92, 0.85, 0.80, 0.90, 0.78, 0.76, 0.88, 0.95, 0.52, 0.68, 0.92, 0.82, 1.15,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.98, 0.88, 0.80, 0.92, 0.86, 0.74, 0.78, 0.92, 0.85, 1.18, 0.86, 0.84, 0.80,
        // [     \     ]     ^     _     `
        0.40, 0.50, 0.40, 0.60, 0.58, 0.40,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.54, 0.52, 0.46, 0.56, 0.48, 0.42, 0.55, 0.56, 0.30, 0.34, 0.54, 0.34, 0.86,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.58, 0.52, 0.56, 0.56, 0.40, 0.44, 0.38, 0.58, 0.50, 0.78, 0.52, 0.56, 0.50,
        // {     |     }     ~
        0.42, 0.34, 0.42, 0.62,
    ],
    average_char_width: 0.58,
    space_width: 0.28,
};

/// Returns the static metric table for a face.
pub fn metrics_for(family: FontFamily) -> &'static FontMetricTable {
    match family {
        FontFamily::Griffiths => &GRIFFITHS_TABLE,
        FontFamily::LilyWang => &LILY_WANG_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WrapMeasurer — the built-in MeasurementPort backend
// ────────────────────────────────────────────────────────────────────────────

/// Synthetic line-wrap measurement backend.
///
/// Height = wrapped line count × font size × line-height ratio. Deterministic
/// and monotone in font size, which is exactly what the solver's binary search
/// requires. Paragraphs and embedded `\n` each start a new line; a blank
/// paragraph still consumes one line slot, matching the rendered blocks of the
/// letter templates.
///
/// Heavier backends (a headless browser page, a shaping library) implement the
/// same trait; the solver cannot tell the difference.
#[derive(Debug, Clone, Copy)]
pub struct WrapMeasurer {
    family: FontFamily,
}

impl WrapMeasurer {
    pub fn new(family: FontFamily) -> Self {
        Self { family }
    }

    fn line_count(&self, content: &[String], font_size: f64, container_width: f64) -> u32 {
        let table = metrics_for(self.family);
        content
            .iter()
            .flat_map(|paragraph| paragraph.split('\n'))
            .map(|segment| table.wrapped_lines(segment, font_size, container_width))
            .sum()
    }
}

#[async_trait]
impl MeasurementPort for WrapMeasurer {
    async fn measure(
        &self,
        content: &[String],
        font_size: f64,
        line_height_ratio: f64,
        container_width: f64,
    ) -> Result<f64, FitError> {
        let lines = self.line_count(content, font_size, container_width);
        Ok(lines as f64 * font_size * line_height_ratio)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraphs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    // ── measure_str ─────────────────────────────────────────────────────────

    #[test]
    fn test_measure_str_empty_is_zero() {
        assert_eq!(metrics_for(FontFamily::Griffiths).measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_sums_glyph_widths() {
        let table = metrics_for(FontFamily::Griffiths);
        // "Santa" = S(0.60) + a(0.50) + n(0.58) + t(0.35) + a(0.50) = 2.53
        let width = table.measure_str("Santa");
        assert!(
            (width - 2.53).abs() < 1e-9,
            "Santa should be 2.53em, got {width}"
        );
    }

    #[test]
    fn test_measure_str_non_ascii_uses_average() {
        let table = metrics_for(FontFamily::LilyWang);
        let width = table.measure_str("é");
        assert!((width - table.average_char_width).abs() < 1e-9);
    }

    #[test]
    fn test_script_face_wider_than_serif() {
        let name = "Emma Wilkinson";
        let script = metrics_for(FontFamily::LilyWang).measure_str(name);
        let serif = metrics_for(FontFamily::Griffiths).measure_str(name);
        assert!(
            script > serif,
            "script {script} should out-measure serif {serif}"
        );
    }

    // ── wrapped_lines ───────────────────────────────────────────────────────

    #[test]
    fn test_wrapped_lines_empty_segment_is_one_slot() {
        let table = metrics_for(FontFamily::Griffiths);
        assert_eq!(table.wrapped_lines("", 12.0, 400.0), 1);
        assert_eq!(table.wrapped_lines("   ", 12.0, 400.0), 1);
    }

    #[test]
    fn test_wrapped_lines_short_text_single_line() {
        let table = metrics_for(FontFamily::Griffiths);
        assert_eq!(table.wrapped_lines("Dear Emma,", 12.0, 400.0), 1);
    }

    #[test]
    fn test_wrapped_lines_grows_with_text_length() {
        let table = metrics_for(FontFamily::Griffiths);
        let short = table.wrapped_lines("ho ho ho", 12.0, 200.0);
        let long = table.wrapped_lines(&"ho ".repeat(60), 12.0, 200.0);
        assert!(long > short, "60 words must wrap past {short} lines");
    }

    #[test]
    fn test_wrapped_lines_grows_with_font_size() {
        let table = metrics_for(FontFamily::Griffiths);
        let text = "I heard you built a snow fort taller than your dad this year";
        let small = table.wrapped_lines(text, 10.0, 300.0);
        let big = table.wrapped_lines(text, 30.0, 300.0);
        assert!(big >= small, "larger glyphs can never need fewer lines");
        assert!(big > 1, "at 30pt this sentence must wrap in 300 units");
    }

    // ── WrapMeasurer ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_measure_single_line_height() {
        let measurer = WrapMeasurer::new(FontFamily::Griffiths);
        let height = measurer
            .measure(&paragraphs(&["Dear Emma,"]), 12.0, 1.3, 400.0)
            .await
            .unwrap();
        assert!((height - 15.6).abs() < 1e-9, "1 line × 12 × 1.3 = 15.6");
    }

    #[tokio::test]
    async fn test_measure_counts_paragraphs_and_breaks() {
        let measurer = WrapMeasurer::new(FontFamily::Griffiths);
        // Two paragraphs, the second holding an embedded line break → 3 lines.
        let content = paragraphs(&["Dear Emma,", "Be good.\nSee you soon."]);
        let height = measurer.measure(&content, 10.0, 1.0, 400.0).await.unwrap();
        assert!((height - 30.0).abs() < 1e-9, "expected 3 lines × 10pt");
    }

    #[tokio::test]
    async fn test_measure_blank_paragraph_keeps_its_slot() {
        let measurer = WrapMeasurer::new(FontFamily::Griffiths);
        let with_gap = paragraphs(&["Dear Emma,", "", "Love, Santa"]);
        let without = paragraphs(&["Dear Emma,", "Love, Santa"]);

        let tall = measurer.measure(&with_gap, 10.0, 1.0, 400.0).await.unwrap();
        let short = measurer.measure(&without, 10.0, 1.0, 400.0).await.unwrap();
        assert!(
            (tall - short - 10.0).abs() < 1e-9,
            "the blank paragraph is worth exactly one line"
        );
    }

    #[tokio::test]
    async fn test_measure_monotone_in_font_size() {
        let measurer = WrapMeasurer::new(FontFamily::LilyWang);
        let content = paragraphs(&[
            "Dear Emma, I heard from my elves that you have been especially kind this year.",
            "Keep looking after your little brother.",
        ]);

        let mut previous = 0.0;
        for size in [8.0, 12.0, 16.0, 24.0, 32.0, 45.0] {
            let height = measurer.measure(&content, size, 1.15, 510.0).await.unwrap();
            assert!(
                height >= previous,
                "height must be non-decreasing in font size ({size}pt gave {height} after {previous})"
            );
            previous = height;
        }
    }

    #[tokio::test]
    async fn test_measure_deterministic() {
        let measurer = WrapMeasurer::new(FontFamily::Griffiths);
        let content = paragraphs(&["Dear Emma,", "Merry Christmas!"]);
        let a = measurer.measure(&content, 14.0, 1.3, 510.0).await.unwrap();
        let b = measurer.measure(&content, 14.0, 1.3, 510.0).await.unwrap();
        assert_eq!(a, b);
    }
}
