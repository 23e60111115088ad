//! Embed URL derivation
//!
//! Report providers serve a full-page viewer and an embeddable variant of
//! the same report under different path segments. [`EmbedRule`] rewrites the
//! former into the latter.

use thiserror::Error;

/// Viewer → embed rewrite rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedRule {
    viewer_segment: String,
    embed_segment: String,
    embed_marker: String,
}

/// Rejected rule definitions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmbedRuleError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("embed segment '{segment}' does not contain embed marker '{marker}'")]
    MarkerNotInSegment { segment: String, marker: String },
}

impl Default for EmbedRule {
    fn default() -> Self {
        Self {
            viewer_segment: "/reporting/".to_string(),
            embed_segment: "/embed/reporting/".to_string(),
            embed_marker: "/embed/".to_string(),
        }
    }
}

impl EmbedRule {
    /// Build a rule
    ///
    /// The embed segment must contain the marker, otherwise a rewritten link
    /// would be rewritten again.
    pub fn new(
        viewer_segment: &str,
        embed_segment: &str,
        embed_marker: &str,
    ) -> Result<Self, EmbedRuleError> {
        if viewer_segment.is_empty() {
            return Err(EmbedRuleError::Empty("viewer segment"));
        }
        if embed_segment.is_empty() {
            return Err(EmbedRuleError::Empty("embed segment"));
        }
        if embed_marker.is_empty() {
            return Err(EmbedRuleError::Empty("embed marker"));
        }
        if !embed_segment.contains(embed_marker) {
            return Err(EmbedRuleError::MarkerNotInSegment {
                segment: embed_segment.to_string(),
                marker: embed_marker.to_string(),
            });
        }

        Ok(Self {
            viewer_segment: viewer_segment.to_string(),
            embed_segment: embed_segment.to_string(),
            embed_marker: embed_marker.to_string(),
        })
    }

    pub fn viewer_segment(&self) -> &str {
        &self.viewer_segment
    }

    pub fn embed_segment(&self) -> &str {
        &self.embed_segment
    }

    /// Whether the link is already in embeddable form
    pub fn is_embed_url(&self, link: &str) -> bool {
        link.contains(&self.embed_marker)
    }

    /// Derive the embeddable URL for a dashboard link
    ///
    /// Links already carrying the embed marker, and links without the viewer
    /// segment, come back unchanged.
    pub fn embed_url(&self, link: &str) -> String {
        if self.is_embed_url(link) {
            return link.to_string();
        }
        link.replacen(&self.viewer_segment, &self.embed_segment, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rewrites_viewer_segment() {
        let rule = EmbedRule::default();
        assert_eq!(
            rule.embed_url("https://x/reporting/r1"),
            "https://x/embed/reporting/r1"
        );
        assert_eq!(
            rule.embed_url("https://lookerstudio.google.com/reporting/abc/page/p_1"),
            "https://lookerstudio.google.com/embed/reporting/abc/page/p_1"
        );
    }

    #[test]
    fn test_only_first_occurrence_rewritten() {
        let rule = EmbedRule::default();
        assert_eq!(
            rule.embed_url("https://x/reporting/a/reporting/b"),
            "https://x/embed/reporting/a/reporting/b"
        );
    }

    #[test]
    fn test_embed_link_passes_through() {
        let rule = EmbedRule::default();
        let link = "https://x/embed/reporting/r1";
        assert_eq!(rule.embed_url(link), link);
    }

    #[test]
    fn test_unknown_link_unchanged() {
        let rule = EmbedRule::default();
        assert_eq!(rule.embed_url("https://x/u/0/r1"), "https://x/u/0/r1");
        assert_eq!(rule.embed_url(""), "");
    }

    #[test]
    fn test_custom_rule() {
        let rule = EmbedRule::new("/view/", "/embedded/view/", "/embedded/").unwrap();
        assert_eq!(rule.embed_url("https://bi/view/9"), "https://bi/embedded/view/9");
    }

    #[test]
    fn test_rejects_inconsistent_rule() {
        assert!(matches!(
            EmbedRule::new("/reporting/", "/frame/reporting/", "/embed/"),
            Err(EmbedRuleError::MarkerNotInSegment { .. })
        ));
        assert_eq!(
            EmbedRule::new("", "/embed/", "/embed/"),
            Err(EmbedRuleError::Empty("viewer segment"))
        );
    }

    proptest! {
        #[test]
        fn embed_url_is_idempotent(path in "[a-z/]{0,20}", with_viewer in any::<bool>()) {
            let rule = EmbedRule::default();
            let link = if with_viewer {
                format!("https://host/{}/reporting/{}", path, path)
            } else {
                format!("https://host/{}", path)
            };
            let once = rule.embed_url(&link);
            prop_assert_eq!(rule.embed_url(&once), once);
        }

        #[test]
        fn link_without_viewer_is_unchanged(link in "https://[a-z]{1,8}/[a-z0-9/]{0,20}") {
            prop_assume!(!link.contains("/reporting/"));
            let rule = EmbedRule::default();
            let derived = rule.embed_url(&link);
            prop_assert!(!derived.is_empty());
            prop_assert_eq!(derived, link);
        }
    }
}
