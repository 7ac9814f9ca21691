//! Layout Policy — static per-document-type tuning for the fitting engine.
//!
//! Every number the solver and adjuster need (bounds, leading, cascade
//! ratios, discrete name tiers) lives here as data, keyed by
//! `(DocumentType, FontFamily, FieldKind)`. Adding a document type or font is
//! a policy entry, never a branch in the search algorithm. Old per-template
//! hacks ("add 2pt for this one template") become extra entries the same way.
//!
//! Resolution is stateless and never fails: exact key → any-font key for the
//! same document and field → global default.

use serde::{Deserialize, Serialize};

use crate::fit::secondary::SecondaryFitRequest;
use crate::fit::solver::FitRequest;

// ────────────────────────────────────────────────────────────────────────────
// Policy keys
// ────────────────────────────────────────────────────────────────────────────

/// The personalized document kinds produced by the print pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Letter,
    Envelope,
    GiftLabel,
    BellyBand,
}

/// The two production faces. Griffiths is the upright serif used by "Block"
/// letters; LilyWang is the script face used by "Fancy" letters, names, and
/// addresses. Script leading runs tighter than block leading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    Griffiths,
    LilyWang,
}

/// Which text region of the document a policy tunes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free-flowing multi-paragraph body — binary-search fitted.
    Body,
    /// The P.S. line — cascade fitted against the body's resolved size.
    Postscript,
    /// Single-line identity field — discrete threshold tiers.
    Name,
}

// ────────────────────────────────────────────────────────────────────────────
// Discrete threshold sizing
// ────────────────────────────────────────────────────────────────────────────

/// One tier of a discrete sizing table. A rule matches when the field stays
/// within every bound it sets; unset bounds don't constrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chars: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<u32>,
    pub size: f64,
}

impl DiscreteRule {
    fn matches(&self, char_count: usize, wrapped_lines: u32) -> bool {
        self.max_chars.map_or(true, |max| char_count <= max)
            && self.max_lines.map_or(true, |max| wrapped_lines <= max)
    }
}

/// Ordered tier table for single-line fields (names on envelopes and labels).
/// Evaluated top-down, first match wins, falling through to `default_size`.
/// "Good enough" readable tiers, deliberately simpler than the body search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteTable {
    pub rules: Vec<DiscreteRule>,
    pub default_size: f64,
}

impl DiscreteTable {
    /// Resolves a size from the field's character count and wrapped line count.
    pub fn size_for(&self, char_count: usize, wrapped_lines: u32) -> f64 {
        self.rules
            .iter()
            .find(|rule| rule.matches(char_count, wrapped_lines))
            .map(|rule| rule.size)
            .unwrap_or(self.default_size)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout policy
// ────────────────────────────────────────────────────────────────────────────

/// Tuning parameters for one (document, font, field) combination. Loaded once
/// at startup (or compiled in) and read-only thereafter — the only persistent
/// configuration state in the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPolicy {
    /// First size a renderer applies before any fitting runs.
    pub start_size: f64,
    pub min_size: f64,
    pub max_size: f64,
    pub line_height_ratio: f64,
    pub precision: f64,
    /// Cascade multipliers for subordinate blocks tied to this policy.
    pub step_down_ratios: Vec<f64>,
    /// Present only for discrete-tier fields; `None` means binary-search fit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discrete: Option<DiscreteTable>,
}

impl LayoutPolicy {
    /// Builds a solver request for a primary block under this policy.
    pub fn fit_request(
        &self,
        content: Vec<String>,
        container_width: f64,
        container_height: f64,
    ) -> FitRequest {
        FitRequest {
            content,
            container_width,
            container_height,
            min_size: self.min_size,
            max_size: self.max_size,
            line_height_ratio: self.line_height_ratio,
            precision: self.precision,
        }
    }

    /// Builds an adjuster request for a secondary block, seeded with the
    /// primary block's resolved size.
    pub fn secondary_request(
        &self,
        content: String,
        container_width: f64,
        container_height: f64,
        base_size: f64,
    ) -> SecondaryFitRequest {
        SecondaryFitRequest {
            content,
            container_width,
            container_height,
            base_size,
            line_height_ratio: self.line_height_ratio,
            step_down_ratios: self.step_down_ratios.clone(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Policy set + resolution
// ────────────────────────────────────────────────────────────────────────────

/// One keyed entry in a policy set. `font_family: None` matches any font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub document_type: DocumentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,
    pub field_kind: FieldKind,
    pub policy: LayoutPolicy,
}

/// The full operator-facing policy surface: entries plus a global default.
/// Exposed as data (JSON-loadable), not code — tuning a document type never
/// touches the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySet {
    pub entries: Vec<PolicyEntry>,
    pub default: LayoutPolicy,
}

impl PolicySet {
    /// Parses an operator-supplied policy document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Looks up the policy for a document/font/field combination.
    ///
    /// Falls back from the exact key to an any-font entry for the same
    /// document and field, then to the global default. Absence of specific
    /// tuning is not an error condition.
    pub fn resolve(
        &self,
        document_type: DocumentType,
        font_family: FontFamily,
        field_kind: FieldKind,
    ) -> &LayoutPolicy {
        let exact = self.entries.iter().find(|e| {
            e.document_type == document_type
                && e.field_kind == field_kind
                && e.font_family == Some(font_family)
        });
        if let Some(entry) = exact {
            return &entry.policy;
        }

        let any_font = self.entries.iter().find(|e| {
            e.document_type == document_type
                && e.field_kind == field_kind
                && e.font_family.is_none()
        });
        match any_font {
            Some(entry) => &entry.policy,
            None => &self.default,
        }
    }
}

impl Default for PolicySet {
    /// The compiled-in production policy set, lifted from the live templates.
    fn default() -> Self {
        PolicySet {
            entries: vec![
                // Letter body, Fancy (LilyWang script): tighter leading, a
                // touch smaller start.
                PolicyEntry {
                    document_type: DocumentType::Letter,
                    font_family: Some(FontFamily::LilyWang),
                    field_kind: FieldKind::Body,
                    policy: LayoutPolicy {
                        start_size: 28.0,
                        min_size: 10.8,
                        max_size: 45.0,
                        line_height_ratio: 1.15,
                        precision: 0.1,
                        step_down_ratios: vec![1.0, 0.9, 0.8, 0.7],
                        discrete: None,
                    },
                },
                // Letter body, Block (Griffiths serif).
                PolicyEntry {
                    document_type: DocumentType::Letter,
                    font_family: Some(FontFamily::Griffiths),
                    field_kind: FieldKind::Body,
                    policy: LayoutPolicy {
                        start_size: 30.0,
                        min_size: 10.8,
                        max_size: 45.0,
                        line_height_ratio: 1.3,
                        precision: 0.1,
                        step_down_ratios: vec![1.0, 0.9, 0.8, 0.7],
                        discrete: None,
                    },
                },
                // P.S. line: very tight leading, same cascade for both faces.
                PolicyEntry {
                    document_type: DocumentType::Letter,
                    font_family: None,
                    field_kind: FieldKind::Postscript,
                    policy: LayoutPolicy {
                        start_size: 28.0,
                        min_size: 10.8,
                        max_size: 45.0,
                        line_height_ratio: 1.05,
                        precision: 0.1,
                        step_down_ratios: vec![1.0, 0.9, 0.8, 0.7],
                        discrete: None,
                    },
                },
                // Envelope name tiers: readable steps down as names get long
                // or wrap. The address block reuses the same face untouched.
                PolicyEntry {
                    document_type: DocumentType::Envelope,
                    font_family: None,
                    field_kind: FieldKind::Name,
                    policy: LayoutPolicy {
                        start_size: 30.0,
                        min_size: 26.0,
                        max_size: 30.0,
                        line_height_ratio: 1.2,
                        precision: 0.1,
                        step_down_ratios: vec![1.0],
                        discrete: Some(DiscreteTable {
                            rules: vec![
                                DiscreteRule {
                                    max_chars: Some(50),
                                    max_lines: Some(1),
                                    size: 30.0,
                                },
                                DiscreteRule {
                                    max_chars: Some(70),
                                    max_lines: Some(1),
                                    size: 29.0,
                                },
                                DiscreteRule {
                                    max_chars: Some(90),
                                    max_lines: Some(2),
                                    size: 28.0,
                                },
                            ],
                            default_size: 26.0,
                        }),
                    },
                },
                // Gift label name tiers (label units are millimetres; the
                // policy is unit-agnostic).
                PolicyEntry {
                    document_type: DocumentType::GiftLabel,
                    font_family: None,
                    field_kind: FieldKind::Name,
                    policy: LayoutPolicy {
                        start_size: 14.0,
                        min_size: 9.0,
                        max_size: 14.0,
                        line_height_ratio: 1.0,
                        precision: 0.1,
                        step_down_ratios: vec![1.0],
                        discrete: Some(DiscreteTable {
                            rules: vec![
                                DiscreteRule {
                                    max_chars: Some(10),
                                    max_lines: None,
                                    size: 14.0,
                                },
                                DiscreteRule {
                                    max_chars: Some(15),
                                    max_lines: None,
                                    size: 11.0,
                                },
                            ],
                            default_size: 9.0,
                        }),
                    },
                },
                // Belly band name: fixed 16pt, expressed as a one-tier table.
                PolicyEntry {
                    document_type: DocumentType::BellyBand,
                    font_family: None,
                    field_kind: FieldKind::Name,
                    policy: LayoutPolicy {
                        start_size: 16.0,
                        min_size: 16.0,
                        max_size: 16.0,
                        line_height_ratio: 1.2,
                        precision: 0.1,
                        step_down_ratios: vec![1.0],
                        discrete: Some(DiscreteTable {
                            rules: vec![],
                            default_size: 16.0,
                        }),
                    },
                },
            ],
            // Global fallback: the Block letter-body tuning.
            default: LayoutPolicy {
                start_size: 30.0,
                min_size: 10.8,
                max_size: 45.0,
                line_height_ratio: 1.3,
                precision: 0.1,
                step_down_ratios: vec![1.0, 0.9, 0.8, 0.7],
                discrete: None,
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_name_table() -> DiscreteTable {
        // Character-only tier table: ≤50 → 30pt, ≤70 → 29pt, ≤90 → 28pt, else 26pt.
        DiscreteTable {
            rules: vec![
                DiscreteRule {
                    max_chars: Some(50),
                    max_lines: None,
                    size: 30.0,
                },
                DiscreteRule {
                    max_chars: Some(70),
                    max_lines: None,
                    size: 29.0,
                },
                DiscreteRule {
                    max_chars: Some(90),
                    max_lines: None,
                    size: 28.0,
                },
            ],
            default_size: 26.0,
        }
    }

    // ── discrete tiers ──────────────────────────────────────────────────────

    #[test]
    fn test_short_name_gets_top_tier() {
        let table = make_name_table();
        assert_eq!(table.size_for(40, 1), 30.0);
    }

    #[test]
    fn test_pathologically_long_name_falls_through() {
        let table = make_name_table();
        assert_eq!(table.size_for(95, 1), 26.0);
    }

    #[test]
    fn test_tiers_evaluated_top_down_first_match_wins() {
        let table = make_name_table();
        // 60 chars matches both the ≤70 and ≤90 rules; the first wins.
        assert_eq!(table.size_for(60, 1), 29.0);
        assert_eq!(table.size_for(75, 1), 28.0);
    }

    #[test]
    fn test_line_count_constrains_envelope_tiers() {
        let set = PolicySet::default();
        let policy = set.resolve(
            DocumentType::Envelope,
            FontFamily::LilyWang,
            FieldKind::Name,
        );
        let table = policy.discrete.as_ref().expect("envelope name is discrete");

        // Short but pre-wrapped to two lines: skips the single-line tiers.
        assert_eq!(table.size_for(40, 2), 28.0);
        // Three wrapped lines exceed every tier.
        assert_eq!(table.size_for(40, 3), 26.0);
    }

    #[test]
    fn test_gift_label_name_tiers() {
        let set = PolicySet::default();
        let policy = set.resolve(
            DocumentType::GiftLabel,
            FontFamily::LilyWang,
            FieldKind::Name,
        );
        let table = policy.discrete.as_ref().expect("label name is discrete");

        assert_eq!(table.size_for(4, 1), 14.0);
        assert_eq!(table.size_for(12, 1), 11.0);
        assert_eq!(table.size_for(20, 1), 9.0);
    }

    #[test]
    fn test_empty_rule_table_uses_default_size() {
        let set = PolicySet::default();
        let policy = set.resolve(
            DocumentType::BellyBand,
            FontFamily::Griffiths,
            FieldKind::Name,
        );
        let table = policy.discrete.as_ref().expect("belly band is discrete");
        assert_eq!(table.size_for(0, 0), 16.0);
        assert_eq!(table.size_for(200, 5), 16.0);
    }

    // ── resolution fallback chain ───────────────────────────────────────────

    #[test]
    fn test_resolve_exact_font_entry() {
        let set = PolicySet::default();
        let fancy = set.resolve(DocumentType::Letter, FontFamily::LilyWang, FieldKind::Body);
        let block = set.resolve(DocumentType::Letter, FontFamily::Griffiths, FieldKind::Body);

        assert_eq!(fancy.line_height_ratio, 1.15);
        assert_eq!(block.line_height_ratio, 1.3);
        assert!(fancy.start_size < block.start_size);
    }

    #[test]
    fn test_resolve_any_font_entry() {
        let set = PolicySet::default();
        // No font-specific postscript entry exists; both faces share it.
        let a = set.resolve(
            DocumentType::Letter,
            FontFamily::LilyWang,
            FieldKind::Postscript,
        );
        let b = set.resolve(
            DocumentType::Letter,
            FontFamily::Griffiths,
            FieldKind::Postscript,
        );
        assert_eq!(a, b);
        assert_eq!(a.line_height_ratio, 1.05);
        assert_eq!(a.step_down_ratios, vec![1.0, 0.9, 0.8, 0.7]);
    }

    #[test]
    fn test_unknown_combination_falls_back_to_default() {
        let set = PolicySet::default();
        // No Body entry exists for envelopes.
        let policy = set.resolve(
            DocumentType::Envelope,
            FontFamily::Griffiths,
            FieldKind::Body,
        );
        assert_eq!(policy, &set.default);
    }

    // ── request builders ────────────────────────────────────────────────────

    #[test]
    fn test_fit_request_carries_policy_bounds() {
        let set = PolicySet::default();
        let policy = set.resolve(DocumentType::Letter, FontFamily::Griffiths, FieldKind::Body);
        let request = policy.fit_request(vec!["Dear Emma,".to_string()], 510.0, 640.0);

        assert_eq!(request.min_size, 10.8);
        assert_eq!(request.max_size, 45.0);
        assert_eq!(request.precision, 0.1);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_secondary_request_seeds_base_size() {
        let set = PolicySet::default();
        let policy = set.resolve(
            DocumentType::Letter,
            FontFamily::Griffiths,
            FieldKind::Postscript,
        );
        let request =
            policy.secondary_request("P.S. Be good!".to_string(), 510.0, 80.0, 31.5);

        assert_eq!(request.base_size, 31.5);
        assert_eq!(request.line_height_ratio, 1.05);
        assert!(request.validate().is_ok());
    }

    // ── operator data surface ───────────────────────────────────────────────

    #[test]
    fn test_policy_set_json_round_trip() {
        let set = PolicySet::default();
        let json = serde_json::to_string(&set).expect("serialize");
        let parsed = PolicySet::from_json(&json).expect("parse back");
        assert_eq!(parsed, set);
    }

    #[test]
    fn test_operator_override_from_json() {
        // An operator bumps one template's floor by 2pt — data, not code.
        let json = r#"{
            "entries": [
                {
                    "document_type": "letter",
                    "font_family": "lily_wang",
                    "field_kind": "body",
                    "policy": {
                        "start_size": 28.0,
                        "min_size": 12.8,
                        "max_size": 45.0,
                        "line_height_ratio": 1.15,
                        "precision": 0.1,
                        "step_down_ratios": [1.0, 0.9, 0.8, 0.7]
                    }
                }
            ],
            "default": {
                "start_size": 30.0,
                "min_size": 10.8,
                "max_size": 45.0,
                "line_height_ratio": 1.3,
                "precision": 0.1,
                "step_down_ratios": [1.0, 0.9, 0.8, 0.7]
            }
        }"#;

        let set = PolicySet::from_json(json).expect("valid policy document");
        let policy = set.resolve(DocumentType::Letter, FontFamily::LilyWang, FieldKind::Body);
        assert_eq!(policy.min_size, 12.8);

        // Anything else falls back to the supplied default.
        let other = set.resolve(DocumentType::Envelope, FontFamily::LilyWang, FieldKind::Name);
        assert_eq!(other, &set.default);
    }
}
