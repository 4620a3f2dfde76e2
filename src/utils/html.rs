// HTML to plain text for rendered Jira fields

use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;

static BLOCK_END_PATTERN: OnceLock<Regex> = OnceLock::new();
static LIST_ITEM_PATTERN: OnceLock<Regex> = OnceLock::new();
static BLANK_RUN_PATTERN: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn get_block_end_pattern() -> &'static Regex {
    BLOCK_END_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)<(br|/p|/div|/li|/ul|/ol|/tr|/h[1-6]|/td|/th)[^>]*>").unwrap()
    })
}

fn get_list_item_pattern() -> &'static Regex {
    LIST_ITEM_PATTERN.get_or_init(|| Regex::new(r"(?i)<li[^>]*>").unwrap())
}

fn get_blank_run_pattern() -> &'static Regex {
    BLANK_RUN_PATTERN.get_or_init(|| Regex::new(r"\n{3,}").unwrap())
}

fn get_whitespace_pattern() -> &'static Regex {
    WHITESPACE_PATTERN.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Convert rendered HTML into readable plain text.
///
/// Block-level boundaries become line breaks and list items become `- ` bullets,
/// so acceptance criteria lists keep their shape. Entities are decoded,
/// whitespace inside each line is collapsed, and runs of blank lines are
/// limited to one.
pub fn strip_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let with_newlines = get_block_end_pattern().replace_all(html, "\n");
    let with_bullets = get_list_item_pattern().replace_all(&with_newlines, "\n- ");

    let fragment = Html::parse_fragment(&with_bullets);
    let text: String = fragment.root_element().text().collect();

    let normalized = text.replace("\r\n", "\n");
    let normalized = get_blank_run_pattern().replace_all(&normalized, "\n\n");

    normalized
        .split('\n')
        .map(|line| get_whitespace_pattern().replace_all(line, " ").trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
