//! Structured content extraction from assistant replies.
//!
//! A reply is scanned through two independent channels:
//!
//! 1. **Custom markers** - a payload wrapped in [`START_MARKER`] and
//!    [`END_MARKER`]. Only the first occurrence of each token counts.
//! 2. **Fenced blocks** - markdown code fences. Every tagged fence is
//!    collected into the block catalog; the first untagged or allow-listed
//!    fence is the fallback primary content when no marker payload exists.
//!
//! Extraction never fails. A reply without structure simply yields an
//! empty [`ExtractionResult`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Token that opens a custom-marker payload.
pub const START_MARKER: &str = "@@>>>@@@";

/// Token that closes a custom-marker payload.
pub const END_MARKER: &str = "@@@<<<@@@";

/// Fence tags accepted by the primary-content fallback (case-insensitive).
///
/// An untagged fence is accepted as well.
pub const FALLBACK_TAGS: &[&str] = &[
    "json", "xml", "csv", "swift", "javascript", "python", "html", "css", "yaml", "toml", "ini",
    "sql", "bash", "shell", "markdown", "text",
];

/// Tagged fence: three backticks, a word tag, newline, body, newline, three backticks.
static TAGGED_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(\w+)\n(.*?)\n```").expect("tagged fence pattern is valid")
});

/// Fence with an optional allow-listed tag.
static FALLBACK_FENCE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"(?s)```(?i:{})?\n(.*?)\n```", FALLBACK_TAGS.join("|"));
    Regex::new(&pattern).expect("fallback fence pattern is valid")
});

/// A fenced code block found in a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Language tag exactly as written after the opening fence.
    pub language_tag: String,
    /// Block body, trimmed of surrounding whitespace.
    pub content: String,
}

impl CodeBlock {
    /// Creates a code block, trimming both tag and content.
    pub fn new(language_tag: impl AsRef<str>, content: impl AsRef<str>) -> Self {
        Self {
            language_tag: language_tag.as_ref().trim().to_string(),
            content: content.as_ref().trim().to_string(),
        }
    }

    /// Returns true if the tag contains `needle`, ignoring ASCII case.
    pub fn tag_contains_ignore_case(&self, needle: &str) -> bool {
        self.language_tag
            .to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
    }
}

/// Which channel produced the primary content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    /// Payload between the custom start and end markers.
    CustomMarkers,
    /// First untagged or allow-listed fenced block.
    FencedFallback,
    /// No primary content was found.
    None,
}

/// Result of scanning one reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Best-guess payload for downstream save workflows.
    pub primary_content: Option<String>,
    /// Every tagged fenced block, in order of appearance.
    pub code_blocks: Vec<CodeBlock>,
    /// Channel that produced `primary_content`.
    pub source: ExtractionSource,
}

impl ExtractionResult {
    /// A result with nothing extracted.
    pub fn empty() -> Self {
        Self {
            primary_content: None,
            code_blocks: Vec::new(),
            source: ExtractionSource::None,
        }
    }

    /// True iff a primary payload was found.
    pub fn has_structured_content(&self) -> bool {
        self.primary_content.is_some()
    }
}

impl Default for ExtractionResult {
    fn default() -> Self {
        Self::empty()
    }
}

/// Scans replies for custom-marker payloads and fenced code blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeBlockExtractor;

impl CodeBlockExtractor {
    /// Creates a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Runs both passes over `text`.
    ///
    /// The block catalog is always built. Primary content comes from the
    /// custom markers when present, otherwise from the fenced fallback.
    pub fn extract(&self, text: &str) -> ExtractionResult {
        let code_blocks = self.code_blocks(text);

        let (primary_content, source) = match self.custom_marker_content(text) {
            Some(content) => (Some(content), ExtractionSource::CustomMarkers),
            None => match self.fenced_fallback_content(text) {
                Some(content) => (Some(content), ExtractionSource::FencedFallback),
                None => (None, ExtractionSource::None),
            },
        };

        ExtractionResult {
            primary_content,
            code_blocks,
            source,
        }
    }

    /// Content strictly between the first start marker and the first end marker.
    ///
    /// Returns `None` when either marker is missing or the start marker does
    /// not end before the end marker begins.
    pub fn custom_marker_content(&self, text: &str) -> Option<String> {
        let start = text.find(START_MARKER)? + START_MARKER.len();
        let end = text.find(END_MARKER)?;

        if start >= end {
            return None;
        }

        Some(text[start..end].trim().to_string())
    }

    /// Every tagged fenced block in order of appearance.
    pub fn code_blocks(&self, text: &str) -> Vec<CodeBlock> {
        TAGGED_FENCE
            .captures_iter(text)
            .map(|caps| CodeBlock::new(&caps[1], &caps[2]))
            .collect()
    }

    /// Trimmed body of the first untagged or allow-listed fence.
    pub fn fenced_fallback_content(&self, text: &str) -> Option<String> {
        FALLBACK_FENCE
            .captures(text)
            .map(|caps| caps[1].trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn extract(text: &str) -> ExtractionResult {
        CodeBlockExtractor::new().extract(text)
    }

    mod custom_markers {
        use super::*;

        #[test]
        fn marker_payload_is_primary_content() {
            let result = extract("@@>>>@@@\nhello\n@@@<<<@@@");

            assert_eq!(result.primary_content.as_deref(), Some("hello"));
            assert!(result.has_structured_content());
            assert_eq!(result.source, ExtractionSource::CustomMarkers);
        }

        #[test]
        fn markers_take_precedence_over_fences() {
            let text = "```javascript\nignored()\n```\n@@>>>@@@ payload @@@<<<@@@";
            let result = extract(text);

            assert_eq!(result.primary_content.as_deref(), Some("payload"));
            assert_eq!(result.source, ExtractionSource::CustomMarkers);
            // The catalog is still built.
            assert_eq!(result.code_blocks, vec![CodeBlock::new("javascript", "ignored()")]);
        }

        #[test]
        fn reversed_markers_fall_through_to_fences() {
            let text = "@@@<<<@@@ nope @@>>>@@@\n```json\n{\"a\": 1}\n```";
            let result = extract(text);

            assert_eq!(result.primary_content.as_deref(), Some("{\"a\": 1}"));
            assert_eq!(result.source, ExtractionSource::FencedFallback);
        }

        #[test]
        fn only_first_occurrence_of_each_marker_counts() {
            // First end marker precedes first start marker, even though a
            // valid pair follows.
            let text = "@@@<<<@@@ @@>>>@@@ second @@@<<<@@@";
            assert_eq!(CodeBlockExtractor::new().custom_marker_content(text), None);
        }

        #[test]
        fn missing_end_marker_yields_nothing() {
            let result = extract("@@>>>@@@ dangling payload");
            assert_eq!(result, ExtractionResult::empty());
        }

        #[test]
        fn payload_is_trimmed_of_newlines_and_spaces() {
            let text = "intro @@>>>@@@\n\n  let x = 1;\n  \n@@@<<<@@@ outro";
            assert_eq!(
                CodeBlockExtractor::new().custom_marker_content(text).as_deref(),
                Some("let x = 1;")
            );
        }

        #[test]
        fn adjacent_markers_yield_nothing() {
            let text = format!("{}{}", START_MARKER, END_MARKER);
            assert_eq!(CodeBlockExtractor::new().custom_marker_content(&text), None);
        }
    }

    mod fenced_blocks {
        use super::*;

        #[test]
        fn allow_listed_tag_feeds_catalog_and_primary() {
            let result = extract("```javascript\nconsole.log(1)\n```");

            assert_eq!(
                result.code_blocks,
                vec![CodeBlock::new("javascript", "console.log(1)")]
            );
            assert_eq!(result.primary_content.as_deref(), Some("console.log(1)"));
            assert_eq!(result.source, ExtractionSource::FencedFallback);
        }

        #[test]
        fn unknown_tag_is_catalogued_but_not_primary() {
            let result = extract("```weirdtag\nfoo\n```");

            assert_eq!(result.code_blocks, vec![CodeBlock::new("weirdtag", "foo")]);
            assert_eq!(result.primary_content, None);
            assert!(!result.has_structured_content());
        }

        #[test]
        fn untagged_fence_is_primary_but_not_catalogued() {
            let result = extract("Here you go:\n```\nplain\n```");

            assert!(result.code_blocks.is_empty());
            assert_eq!(result.primary_content.as_deref(), Some("plain"));
        }

        #[test]
        fn catalog_preserves_order_of_appearance() {
            let text = "First:\n```json\n{\"k\": true}\n```\nThen:\n```javascript\nrun();\n```";
            let result = extract(text);

            assert_eq!(
                result.code_blocks,
                vec![
                    CodeBlock::new("json", "{\"k\": true}"),
                    CodeBlock::new("javascript", "run();"),
                ]
            );
            assert_eq!(result.primary_content.as_deref(), Some("{\"k\": true}"));
        }

        #[test]
        fn tag_case_is_preserved_but_allow_list_ignores_case() {
            let result = extract("```JSON\n{}\n```");

            assert_eq!(result.code_blocks[0].language_tag, "JSON");
            assert_eq!(result.primary_content.as_deref(), Some("{}"));
        }

        #[test]
        fn empty_block_body_is_valid() {
            let result = extract("```css\n\n```");

            assert_eq!(result.code_blocks, vec![CodeBlock::new("css", "")]);
            assert_eq!(result.primary_content.as_deref(), Some(""));
        }

        #[test]
        fn multiline_body_is_trimmed() {
            let result = extract("```python\n\n  def f():\n      return 1\n\n```");
            assert_eq!(result.code_blocks[0].content, "def f():\n      return 1");
        }

        #[test]
        fn nested_fences_corrupt_extraction() {
            // Known limitation: matching is textual and non-greedy, so the
            // inner fence terminates the outer block and is itself lost.
            let text = "```markdown\nOuter\n```js\ninner()\n```\nafter\n```";
            let result = extract(text);

            assert_eq!(result.code_blocks, vec![CodeBlock::new("markdown", "Outer")]);
        }

        #[test]
        fn closing_fence_of_unlisted_block_reads_as_untagged_opener() {
            // Known limitation: the fallback pass skips the `rust` opener,
            // then treats its closing fence as an untagged block start.
            let text = "```rust\nfn a(){}\n```\nThen:\n```json\n{}\n```";
            let result = extract(text);

            assert_eq!(result.primary_content.as_deref(), Some("Then:"));
            assert_eq!(
                result.code_blocks,
                vec![CodeBlock::new("rust", "fn a(){}"), CodeBlock::new("json", "{}")]
            );
        }

        #[test]
        fn tag_matching_helper_ignores_case() {
            let block = CodeBlock::new("JavaScript", "x");
            assert!(block.tag_contains_ignore_case("javascript"));
            assert!(block.tag_contains_ignore_case("JS"));
            assert!(!block.tag_contains_ignore_case("python"));
        }
    }

    mod no_structure {
        use super::*;

        #[test]
        fn plain_text_yields_empty_result() {
            let result = extract("Just a friendly reply with no code.");
            assert_eq!(result, ExtractionResult::empty());
            assert_eq!(result.source, ExtractionSource::None);
        }

        #[test]
        fn unterminated_fence_yields_nothing() {
            let result = extract("```json\n{\"open\": true}");
            assert_eq!(result, ExtractionResult::empty());
        }
    }

    proptest! {
        #[test]
        fn text_without_markers_or_fences_is_unstructured(text in "[a-zA-Z0-9 .,!?\n]{0,200}") {
            let result = extract(&text);
            prop_assert_eq!(result, ExtractionResult::empty());
        }

        #[test]
        fn valid_marker_pair_yields_trimmed_payload(
            prefix in "[a-z \n]{0,40}",
            payload in "[a-zA-Z0-9 \n]{1,80}",
            suffix in "[a-z \n]{0,40}",
        ) {
            let text = format!("{prefix}{START_MARKER}{payload}{END_MARKER}{suffix}");
            let result = extract(&text);

            let expected = payload.trim().to_string();
            prop_assert_eq!(result.primary_content, Some(expected));
            prop_assert_eq!(result.source, ExtractionSource::CustomMarkers);
        }

        #[test]
        fn reversed_markers_never_yield_marker_payload(
            payload in "[a-zA-Z0-9 \n]{0,80}",
        ) {
            let text = format!("{END_MARKER}{payload}{START_MARKER}");
            let result = extract(&text);

            prop_assert_eq!(result.source, ExtractionSource::None);
            prop_assert!(!result.has_structured_content());
        }

        #[test]
        fn extraction_is_idempotent(text in "(?s).{0,300}") {
            prop_assert_eq!(extract(&text), extract(&text));
        }
    }
}
