//! HTML-to-text normalization for article bodies.
//!
//! The detail endpoint returns article bodies as raw HTML. [`normalize`]
//! reduces that markup to clean plain text with a small set of guarantees:
//!
//! - no tags remain in the output;
//! - script/style/caption/embed elements are removed entirely, content
//!   included, not just unwrapped;
//! - hyperlinks are unwrapped to their visible text, hrefs discarded;
//! - all other visible text survives exactly once, including text outside
//!   any block element;
//! - empty paragraphs are dropped;
//! - paragraphs are separated by single newlines, runs of 3+ newlines
//!   collapse to exactly 2, horizontal whitespace runs collapse to one
//!   space, and the ends are trimmed.
//!
//! Pure and total: empty input yields empty output, and malformed markup
//! degrades to whatever text the parser can recover rather than erroring.

use ego_tree::NodeRef;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{node::Node, Html};

/// Elements removed entirely, descendants included.
const STRIP_TAGS: &[&str] = &[
    "script",
    "style",
    "figure",
    "figcaption",
    "iframe",
    "noscript",
    "aside",
    "video",
    "audio",
    "embed",
    "object",
];

/// Paragraph-level elements that form one output line each. Their full
/// descendant text is collected as a single line, so a block nested inside
/// another contributes its text once.
const BLOCK_TAGS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "li"];

static HORIZONTAL_WS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\S\n]+").expect("valid horizontal whitespace regex"));
static NEWLINE_PADDING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" ?\n ?").expect("valid newline padding regex"));
static NEWLINE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline run regex"));

/// Normalize raw article markup to clean plain text.
///
/// One pass over the parse tree: each block element becomes one output
/// line, and text between or outside blocks is flushed as its own line at
/// the next block boundary, so nothing visible is lost. Documents without
/// any block structure keep their existing newlines.
///
/// # Arguments
///
/// * `raw_html` - Raw markup, possibly empty or malformed
///
/// # Returns
///
/// Cleaned plain text. Empty input yields an empty string.
pub fn normalize(raw_html: &str) -> String {
    if raw_html.trim().is_empty() {
        return String::new();
    }

    let document = Html::parse_fragment(raw_html);

    let mut lines = Vec::new();
    let mut pending = String::new();
    walk(&document.tree.root(), &mut lines, &mut pending);
    flush_pending(&mut lines, &mut pending);

    cleanup(&lines.join("\n"))
}

/// One traversal step: text accumulates, stripped elements vanish, block
/// elements emit their whole descendant text as one line.
fn walk(node: &NodeRef<'_, Node>, lines: &mut Vec<String>, pending: &mut String) {
    match node.value() {
        Node::Text(text) => pending.push_str(text),
        Node::Element(element) => {
            let name = element.name();
            if STRIP_TAGS.contains(&name) {
                return;
            }
            if BLOCK_TAGS.contains(&name) {
                flush_pending(lines, pending);
                let mut buf = String::new();
                collect_text(node, &mut buf);
                let line = squash_inline(&buf);
                if !line.is_empty() {
                    lines.push(line);
                }
                return;
            }
            for child in node.children() {
                walk(&child, lines, pending);
            }
        }
        _ => {
            for child in node.children() {
                walk(&child, lines, pending);
            }
        }
    }
}

/// Emit accumulated non-block text as its own line, keeping its newlines.
fn flush_pending(lines: &mut Vec<String>, pending: &mut String) {
    let text = std::mem::take(pending);
    let cleaned = cleanup(&text);
    if !cleaned.is_empty() {
        lines.push(cleaned);
    }
}

/// Collect descendant text, skipping stripped elements entirely.
fn collect_text(node: &NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) => {
            if STRIP_TAGS.contains(&element.name()) {
                return;
            }
            for child in node.children() {
                collect_text(&child, out);
            }
        }
        _ => {
            for child in node.children() {
                collect_text(&child, out);
            }
        }
    }
}

/// Collapse all whitespace inside one block to single spaces.
fn squash_inline(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_was_space && !out.is_empty() {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out.trim_end().to_string()
}

/// Apply the output whitespace discipline, preserving newline structure.
fn cleanup(input: &str) -> String {
    let spaced = HORIZONTAL_WS.replace_all(input, " ");
    let padded = NEWLINE_PADDING.replace_all(&spaced, "\n");
    let collapsed = NEWLINE_RUNS.replace_all(&padded, "\n\n");
    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n  "), "");
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let html = "<p>First paragraph.</p><p>Second paragraph.</p>";
        assert_eq!(normalize(html), "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn test_links_unwrapped_to_text() {
        let html = r#"<p>Read the <a href="https://example.com/bulletin">official bulletin</a> now.</p>"#;
        assert_eq!(normalize(html), "Read the official bulletin now.");
    }

    #[test]
    fn test_text_outside_blocks_survives() {
        let html = "<div>Intro outside any paragraph.</div><p>Body paragraph.</p>";
        assert_eq!(
            normalize(html),
            "Intro outside any paragraph.\nBody paragraph."
        );
    }

    #[test]
    fn test_loose_text_between_blocks_survives() {
        let html = "<p>First.</p>Loose fragment.<p>Second.</p>";
        assert_eq!(normalize(html), "First.\nLoose fragment.\nSecond.");
    }

    #[test]
    fn test_nested_blocks_emit_text_once() {
        let html = "<ul><li><p>Only once.</p></li></ul>";
        assert_eq!(normalize(html), "Only once.");
    }

    #[test]
    fn test_captions_removed_entirely() {
        let html = concat!(
            "<figure><img src=\"quake.jpg\">",
            "<figcaption>Rescuers search the rubble. Photo by AP</figcaption>",
            "</figure>",
            "<p>The quake struck before dawn.</p>",
        );
        let text = normalize(html);
        assert_eq!(text, "The quake struck before dawn.");
        assert!(!text.contains("Rescuers"));
        assert!(!text.contains("Photo by"));
    }

    #[test]
    fn test_scripts_and_styles_removed() {
        let html = concat!(
            "<p>Before.</p>",
            "<script>var tracking = true;</script>",
            "<style>p { color: red; }</style>",
            "<p>After.</p>",
        );
        let text = normalize(html);
        assert_eq!(text, "Before.\nAfter.");
        assert!(!text.contains("tracking"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_embedded_video_removed() {
        let html = "<p>Watch:</p><iframe src=\"https://video.example.com/embed/1\">fallback text</iframe><p>Story continues.</p>";
        let text = normalize(html);
        assert!(!text.contains("fallback"));
        assert_eq!(text, "Watch:\nStory continues.");
    }

    #[test]
    fn test_empty_paragraphs_dropped() {
        let html = "<p>One.</p><p></p><p>  </p><p>Two.</p>";
        assert_eq!(normalize(html), "One.\nTwo.");
    }

    #[test]
    fn test_inline_whitespace_collapsed() {
        let html = "<p>Too   many\t spaces\n  here.</p>";
        assert_eq!(normalize(html), "Too many spaces here.");
    }

    #[test]
    fn test_plain_text_passthrough() {
        let text = "Line one.\nLine two.";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_idempotent_on_clean_text() {
        let html = "<p>First.</p><p>Second.</p><p>Third.</p>";
        let once = normalize(html);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_newline_runs_collapse_to_two() {
        let text = "Para one.\n\n\n\nPara two.";
        assert_eq!(normalize(text), "Para one.\n\nPara two.");
    }

    #[test]
    fn test_malformed_markup_degrades_gracefully() {
        let html = "<p>Unclosed paragraph <b>bold never closed";
        let text = normalize(html);
        assert!(text.contains("Unclosed paragraph"));
    }

    #[test]
    fn test_entities_decoded() {
        let html = "<p>Signal No. 3 &amp; rising</p>";
        assert_eq!(normalize(html), "Signal No. 3 & rising");
    }
}
