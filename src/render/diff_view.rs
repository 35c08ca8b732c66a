use maud::{html, Markup};

use crate::diff::{DiffSummary, DiffTag, DiffToken, WordDiff};

/// Shown in place of an empty token sequence.
pub const EMPTY_DIFF_MESSAGE: &str = "Both texts are empty. Nothing to compare.";

fn render_token(token: &DiffToken) -> Markup {
    html! {
        @match token.tag {
            DiffTag::Equal => { (token.left_text) }
            DiffTag::Delete => { del class="diff-delete" { (token.left_text) } }
            DiffTag::Insert => { ins class="diff-insert" { (token.right_text) } }
            DiffTag::Replace => {
                del class="diff-delete" { (token.left_text) }
                ins class="diff-insert" { (token.right_text) }
            }
        }
    }
}

/// Tokens in order, separated by single spaces.
pub fn render_tokens(tokens: &[DiffToken]) -> Markup {
    html! {
        @if tokens.is_empty() {
            p class="diff-empty" { (EMPTY_DIFF_MESSAGE) }
        } @else {
            div class="diff-output" {
                @for (index, token) in tokens.iter().enumerate() {
                    @if index > 0 { " " }
                    (render_token(token))
                }
            }
        }
    }
}

pub fn render_summary(summary: &DiffSummary) -> Markup {
    html! {
        p class="diff-summary" {
            @if summary.is_identical() {
                "The texts are identical. "
            }
            (summary.equal_words) " unchanged, "
            (summary.deleted_words) " removed, "
            (summary.inserted_words) " added words. Similarity "
            (format!("{:.1}%", summary.ratio * 100.0))
        }
    }
}

pub fn render_diff(diff: &WordDiff) -> Markup {
    html! {
        div class="diff-result" {
            (render_tokens(&diff.tokens))
            (render_summary(&diff.summary))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::WordDiffEngine;

    #[test]
    fn test_replace_renders_adjacent_del_ins() {
        let tokens = crate::diff::diff("the quick fox", "the slow fox");
        let html = render_tokens(&tokens).into_string();
        assert_eq!(
            html,
            r#"<div class="diff-output">the <del class="diff-delete">quick</del><ins class="diff-insert">slow</ins> fox</div>"#
        );
    }

    #[test]
    fn test_insert_only() {
        let html = render_tokens(&crate::diff::diff("", "hello world")).into_string();
        assert_eq!(
            html,
            r#"<div class="diff-output"><ins class="diff-insert">hello world</ins></div>"#
        );
    }

    #[test]
    fn test_empty_placeholder() {
        let html = render_tokens(&[]).into_string();
        assert!(html.contains(EMPTY_DIFF_MESSAGE));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render_tokens(&crate::diff::diff("<b>", "<i>")).into_string();
        assert!(html.contains("&lt;b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_summary_for_identical_texts() {
        let diff = WordDiffEngine::new().compare("same words", "same  words");
        let html = render_summary(&diff.summary).into_string();
        assert!(html.contains("The texts are identical."));
        assert!(html.contains("Similarity 100.0%"));
    }
}
