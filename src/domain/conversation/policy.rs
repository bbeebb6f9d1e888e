//! Post-reply policies.
//!
//! Both checks look at the raw reply text, independently of the entry
//! that was appended for it.

use super::extractor::{CodeBlock, CodeBlockExtractor};

/// Tag fragments that mark a block as a script artifact.
const SCRIPT_TAG_FRAGMENTS: [&str; 2] = ["javascript", "js"];

/// Content offered for saving when a tool reported a generated widget but
/// no script block came with the reply.
pub const WIDGET_PLACEHOLDER: &str =
    "// Widget generated by an external tool.\n// Paste or regenerate its source here.\n";

/// Returns the first script block in the reply, if any.
///
/// A block qualifies when its tag contains `javascript` or `js`, ignoring
/// case. This also matches tags such as `json` and `jsx`.
pub fn detect_script_artifact(reply: &str) -> Option<CodeBlock> {
    CodeBlockExtractor::new()
        .code_blocks(reply)
        .into_iter()
        .find(|block| {
            SCRIPT_TAG_FRAGMENTS
                .iter()
                .any(|fragment| block.tag_contains_ignore_case(fragment))
        })
}

/// Keyword heuristic for "an external tool produced a widget file".
///
/// Literal, case-sensitive substring checks: the reply mentions `widget`
/// and either `created` or `generated`. It fires on any reply that merely
/// talks about widgets in the past tense.
pub fn reply_signals_generated_widget(reply: &str) -> bool {
    reply.contains("widget") && (reply.contains("created") || reply.contains("generated"))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod script_artifact {
        use super::*;

        #[test]
        fn picks_first_script_block() {
            let reply = "```html\n<div/>\n```\n```javascript\nfirst()\n```\n```js\nsecond()\n```";
            let block = detect_script_artifact(reply).unwrap();

            assert_eq!(block.language_tag, "javascript");
            assert_eq!(block.content, "first()");
        }

        #[test]
        fn matches_tag_case_insensitively() {
            let block = detect_script_artifact("```JS\nx()\n```").unwrap();
            assert_eq!(block.content, "x()");
        }

        #[test]
        fn json_blocks_also_match() {
            // "json" contains "js"; kept as-is.
            let block = detect_script_artifact("```json\n{\"a\":1}\n```").unwrap();
            assert_eq!(block.language_tag, "json");
        }

        #[test]
        fn ignores_untagged_and_other_blocks() {
            assert!(detect_script_artifact("```\nx\n```\n```python\ny\n```").is_none());
        }

        #[test]
        fn ignores_marker_payloads() {
            assert!(detect_script_artifact("@@>>>@@@ alert(1) @@@<<<@@@").is_none());
        }
    }

    mod widget_heuristic {
        use super::*;

        #[test]
        fn fires_on_created_widget() {
            assert!(reply_signals_generated_widget("I created the widget for you."));
        }

        #[test]
        fn fires_on_generated_widget() {
            assert!(reply_signals_generated_widget("The widget was generated."));
        }

        #[test]
        fn needs_both_keywords() {
            assert!(!reply_signals_generated_widget("Here is a widget."));
            assert!(!reply_signals_generated_widget("I created a file."));
        }

        #[test]
        fn is_case_sensitive() {
            assert!(!reply_signals_generated_widget("Widget Created"));
        }

        #[test]
        fn false_positive_on_discussion() {
            // Known misfire: talking about widgets in the past tense.
            assert!(reply_signals_generated_widget(
                "Historically, widget toolkits were generated from XML."
            ));
        }
    }
}
