//! Best-effort textual stripping of non-content markup.
//!
//! This is a handful of regex substitutions, not an HTML parser: nested or
//! malformed tags can survive partially.

use regex::Regex;
use std::sync::LazyLock;

static RE_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<script[\s\S]*?</script>").unwrap());
static RE_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<style[\s\S]*?</style>").unwrap());
static RE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--[\s\S]*?-->").unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Remove `<script>`/`<style>` blocks and comments, collapse whitespace, trim.
///
/// ```
/// use croscan_web::sanitize::clean;
///
/// let html = "<p>Hi</p><script>alert(1)</script><!-- note --> <style>.a{}</style>  Bye";
/// assert_eq!(clean(html), "<p>Hi</p> Bye");
/// ```
pub fn clean(html: &str) -> String {
    let html = RE_SCRIPT.replace_all(html, "");
    let html = RE_STYLE.replace_all(&html, "");
    let html = RE_COMMENT.replace_all(&html, "");
    let html = RE_WHITESPACE.replace_all(&html, " ");
    html.trim().to_string()
}
