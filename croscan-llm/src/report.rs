//! Typed view of the reply shape the prompt asks for.
//!
//! Nothing on the response path depends on this; the raw text is always what
//! callers receive. It only exists so tools can summarise a reply when it
//! happens to be well-formed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageAnalysis {
    pub page_summary: String,
    pub primary_goal: String,
    pub elements: Vec<PageElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub html_tag: String,
    pub selector_hint: String,
    pub section: String,
    pub order_on_page: u32,
    pub above_the_fold: bool,
    pub testability_score: f64,
    pub notes: String,
}

impl PageAnalysis {
    /// Parse a model reply, tolerating Markdown code fences and chatter around
    /// the JSON object.
    pub fn from_model_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_body(text))
    }

    pub fn above_the_fold(&self) -> impl Iterator<Item = &PageElement> {
        self.elements.iter().filter(|e| e.above_the_fold)
    }

    /// Elements ordered by descending testability score.
    pub fn ranked(&self) -> Vec<&PageElement> {
        let mut ranked: Vec<&PageElement> = self.elements.iter().collect();
        ranked.sort_by(|a, b| b.testability_score.total_cmp(&a.testability_score));
        ranked
    }
}

fn json_body(text: &str) -> &str {
    let trimmed = text.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"{
  "page_summary": "Project management SaaS landing page",
  "primary_goal": "Start a free trial",
  "elements": [
    {"id": "el_1", "type": "headline", "text": "Ship faster", "html_tag": "h1",
     "selector_hint": "header h1", "section": "hero", "order_on_page": 1,
     "above_the_fold": true, "testability_score": 9, "notes": "Main value prop"},
    {"id": "el_2", "type": "cta", "text": "Start free trial", "html_tag": "a",
     "selector_hint": "a.btn-primary", "section": "hero", "order_on_page": 2,
     "above_the_fold": true, "testability_score": 10, "notes": ""},
    {"id": "el_3", "type": "testimonial", "text": "Loved it", "html_tag": "blockquote",
     "selector_hint": "", "section": "social proof", "order_on_page": 3,
     "above_the_fold": false, "testability_score": 6.5, "notes": ""}
  ]
}"#;

    #[test]
    fn parses_the_requested_shape() {
        let analysis = PageAnalysis::from_model_text(REPLY).unwrap();
        assert_eq!(analysis.primary_goal, "Start a free trial");
        assert_eq!(analysis.elements.len(), 3);
        assert_eq!(analysis.elements[1].kind, "cta");
        assert_eq!(analysis.above_the_fold().count(), 2);
    }

    #[test]
    fn ranks_by_testability() {
        let analysis = PageAnalysis::from_model_text(REPLY).unwrap();
        let ids: Vec<&str> = analysis.ranked().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["el_2", "el_1", "el_3"]);
    }

    #[test]
    fn tolerates_code_fences() {
        let fenced = format!("Here is the analysis:\n```json\n{REPLY}\n```\n");
        let analysis = PageAnalysis::from_model_text(&fenced).unwrap();
        assert_eq!(analysis.elements.len(), 3);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let analysis = PageAnalysis::from_model_text(r#"{"elements":[{"id":"el_1"}]}"#).unwrap();
        assert_eq!(analysis.page_summary, "");
        assert!(!analysis.elements[0].above_the_fold);
    }

    #[test]
    fn prose_is_an_error() {
        assert!(PageAnalysis::from_model_text("I could not analyse this page.").is_err());
    }
}
