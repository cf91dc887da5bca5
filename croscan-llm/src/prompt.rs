//! The CRO analysis prompt.
//!
//! The cleaned HTML is always the last section, directly after
//! [`HTML_MARKER`], so the page can be recovered from the prompt with
//! [`html_segment`].

/// Line that introduces the embedded page.
pub const HTML_MARKER: &str = "HTML:\n";

const CRO_INSTRUCTIONS: &str = r#"You are an expert Conversion Rate Optimization (CRO) and landing page analyst.

You will receive the raw HTML of ANY webpage (SaaS, eCommerce, blog, tools, agencies, documentation pages, mixed layouts, etc).

Your tasks:
1. Understand the page's purpose, offer/value, target audience, and conversion goal.
2. Identify ONLY meaningful, high-impact conversion elements that could be A/B tested.

Return ONLY valid JSON:

{
  "page_summary": "",
  "primary_goal": "",
  "elements": [
    {
      "id": "el_1",
      "type": "",
      "text": "",
      "html_tag": "",
      "selector_hint": "",
      "section": "",
      "order_on_page": 1,
      "above_the_fold": false,
      "testability_score": 1,
      "notes": ""
    }
  ]
}

Rules:
- Ignore scripts, comments, boilerplate, and legal/footer noise unless it carries trust signals (reviews, guarantees, security badges, customer logos).
- Number elements sequentially: "el_1", "el_2", "el_3", ...
- Estimate "above_the_fold" from the element's structural position in the document.
- Omit element types that are not present on the page; never invent elements.
"#;

/// Build the single user message sent to the model.
///
/// ```
/// use croscan_llm::prompt::{build_prompt, html_segment};
///
/// let prompt = build_prompt("<h1>Buy Now</h1>");
/// assert!(prompt.starts_with("You are an expert Conversion Rate Optimization"));
/// assert_eq!(html_segment(&prompt), Some("<h1>Buy Now</h1>"));
/// ```
pub fn build_prompt(cleaned_html: &str) -> String {
    let mut prompt = String::with_capacity(CRO_INSTRUCTIONS.len() + cleaned_html.len() + 8);
    prompt.push_str(CRO_INSTRUCTIONS);
    prompt.push('\n');
    prompt.push_str(HTML_MARKER);
    prompt.push_str(cleaned_html);
    prompt
}

/// The page embedded in a prompt produced by [`build_prompt`].
pub fn html_segment(prompt: &str) -> Option<&str> {
    prompt
        .rfind(HTML_MARKER)
        .map(|idx| &prompt[idx + HTML_MARKER.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lists_every_element_field() {
        let prompt = build_prompt("");
        for field in [
            "page_summary",
            "primary_goal",
            "elements",
            "\"id\"",
            "\"type\"",
            "\"text\"",
            "html_tag",
            "selector_hint",
            "\"section\"",
            "order_on_page",
            "above_the_fold",
            "testability_score",
            "\"notes\"",
        ] {
            assert!(prompt.contains(field), "missing {field}");
        }
    }

    #[test]
    fn html_is_appended_verbatim_at_the_end() {
        let html = "<section><a href=\"/signup\">Start {free} trial</a></section>";
        let prompt = build_prompt(html);
        assert!(prompt.ends_with(html));
        assert_eq!(html_segment(&prompt), Some(html));
    }

    #[test]
    fn marker_inside_uncleaned_page_wins() {
        // Cleaned HTML has no newlines, so only uncleaned input can hit this.
        let html = "<pre>HTML:\nexample</pre>";
        let prompt = build_prompt(html);
        assert!(prompt.ends_with(html));
        assert_eq!(html_segment(&prompt), Some("example</pre>"));
    }

    #[test]
    fn extraction_rules_are_present() {
        let prompt = build_prompt("<p/>");
        assert!(prompt.contains("trust signals"));
        assert!(prompt.contains("\"el_1\", \"el_2\""));
        assert!(prompt.contains("structural position"));
        assert!(prompt.contains("Omit element types"));
    }
}
