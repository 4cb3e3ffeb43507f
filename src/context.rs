//! Organization profile captured by the wizard.
//!
//! The profile conditions the response generator through
//! [`OrgContext::summary`]. The uploaded document is an opaque file name;
//! nothing here opens or reads it.

use serde::{Deserialize, Serialize};

/// Who the user is and where they want to go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgContext {
    #[serde(default)]
    pub org_name: String,
    /// Organization type tag, e.g. `"startup"`, `"sme"`, `"government"`.
    #[serde(default)]
    pub org_type: String,
    #[serde(default)]
    pub target_region: String,
    #[serde(default)]
    pub industry_tags: Vec<String>,
    /// Free-text mission statement, possibly refined.
    #[serde(default)]
    pub mission: Option<String>,
    /// File name of an uploaded briefing document.
    #[serde(default)]
    pub document: Option<String>,
}

impl OrgContext {
    /// Render the context summary handed to the response generator.
    ///
    /// One `Key: value` line per populated field, in a fixed order.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        if !self.org_name.is_empty() {
            lines.push(format!("Organization: {}", self.org_name));
        }
        if !self.org_type.is_empty() {
            lines.push(format!("Organization type: {}", self.org_type));
        }
        if !self.target_region.is_empty() {
            lines.push(format!("Target region: {}", self.target_region));
        }
        if !self.industry_tags.is_empty() {
            lines.push(format!("Industries: {}", self.industry_tags.join(", ")));
        }
        if let Some(mission) = self.mission.as_deref().filter(|m| !m.trim().is_empty()) {
            lines.push(format!("Mission: {}", mission.trim()));
        }
        if let Some(document) = &self.document {
            lines.push(format!("Attached document: {}", document));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_includes_populated_fields_in_order() {
        let ctx = OrgContext {
            org_name: "Acme".into(),
            org_type: "sme".into(),
            target_region: "ASEAN".into(),
            industry_tags: vec!["logistics".into(), "agritech".into()],
            mission: Some("  Feed the region  ".into()),
            document: Some("plan.pdf".into()),
        };
        assert_eq!(
            ctx.summary(),
            "Organization: Acme\n\
             Organization type: sme\n\
             Target region: ASEAN\n\
             Industries: logistics, agritech\n\
             Mission: Feed the region\n\
             Attached document: plan.pdf"
        );
    }

    #[test]
    fn test_summary_skips_empty_fields() {
        let ctx = OrgContext {
            target_region: "EU".into(),
            mission: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(ctx.summary(), "Target region: EU");
        assert_eq!(OrgContext::default().summary(), "");
    }

    #[test]
    fn test_deserialize_partial() {
        let ctx: OrgContext = serde_json::from_str(r#"{"org_type":"startup"}"#).unwrap();
        assert_eq!(ctx.org_type, "startup");
        assert!(ctx.industry_tags.is_empty());
    }
}
