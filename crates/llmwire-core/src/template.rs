//! Prompt templates
//!
//! Builds [`Task`] values from a prompt template and a previously selected
//! text range. Two placeholders are recognised:
//! - `[Range]` is replaced by the selected text
//! - `[FIM]` marks where the before-caret text goes in a fill-in-middle prefix

use crate::error::{ClientError, ClientResult};
use crate::task::Task;

/// Placeholder replaced by the selected text
pub const RANGE_PLACEHOLDER: &str = "[Range]";

/// Placeholder replaced by the text before the caret in FIM mode
pub const FIM_PLACEHOLDER: &str = "[FIM]";

/// Default template for prompt tasks
pub const DEFAULT_PROMPT_TEMPLATE: &str =
    "Explain the code in one concise line (to be used in a comment).\n\n[Range]";

/// Default template stored in fresh settings
pub const DEFAULT_SETTINGS_PROMPT: &str = "Look at the following code and implement missing parts, \
     add documentation if it is missing.\n\n[Range]";

/// A selected piece of text and its position in the surrounding document.
///
/// Offsets count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRange {
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl SelectionRange {
    pub fn new(text: impl Into<String>, start_offset: usize, end_offset: usize) -> Self {
        Self {
            text: text.into(),
            start_offset,
            end_offset,
        }
    }

    /// Split the selection at an absolute caret offset
    fn split_at_caret(&self, caret_offset: usize) -> ClientResult<(String, String)> {
        let char_len = self.text.chars().count();
        let offset_in_range = caret_offset
            .checked_sub(self.start_offset)
            .filter(|offset| *offset <= char_len)
            .ok_or_else(|| {
                ClientError::config(format!(
                    "Caret-offset {} not in previous range [{}, {}]",
                    caret_offset, self.start_offset, self.end_offset
                ))
            })?;

        let byte_idx = self
            .text
            .char_indices()
            .nth(offset_in_range)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len());
        let (before, after) = self.text.split_at(byte_idx);
        Ok((before.to_string(), after.to_string()))
    }
}

/// Normalise a system prompt: trimmed, `None` when blank
fn normalize_system_prompt(system_prompt: &str) -> Option<String> {
    let trimmed = system_prompt.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Expand `[Range]` with the selected text. Without a selection the
/// template is returned unchanged.
pub fn expand_prompt(template: &str, range: Option<&SelectionRange>) -> String {
    match range {
        Some(range) => template.replace(RANGE_PLACEHOLDER, &range.text),
        None => template.to_string(),
    }
}

/// Build a prompt task from a template
pub fn prompt_task(system_prompt: &str, template: &str, range: Option<&SelectionRange>) -> Task {
    Task::prompt(
        normalize_system_prompt(system_prompt),
        expand_prompt(template, range),
    )
}

/// Build a fill-in-middle task from a template, a selection and the caret.
///
/// If the template contains `[FIM]`, the prefix becomes the template with
/// `[FIM]` replaced by the text before the caret and no extra prompt is sent.
/// Otherwise the template minus `[Range]` becomes the optional prompt.
pub fn fill_in_middle_task(
    system_prompt: &str,
    template: &str,
    range: Option<&SelectionRange>,
    caret_offset: usize,
) -> ClientResult<Task> {
    let range =
        range.ok_or_else(|| ClientError::config("Fill-in-Middle needs a marked range"))?;
    let (mut prefix, suffix) = range.split_at_caret(caret_offset)?;

    let mut prompt = None;
    if template.contains(FIM_PLACEHOLDER) {
        prefix = template.replace(FIM_PLACEHOLDER, &prefix);
    } else {
        let suggestion = template.replace(RANGE_PLACEHOLDER, "");
        let suggestion = suggestion.trim();
        if !suggestion.is_empty() {
            prompt = Some(suggestion.to_string());
        }
    }

    Ok(Task::fill_in_middle(
        normalize_system_prompt(system_prompt),
        prefix,
        suffix,
        prompt,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskKind;

    #[test]
    fn test_expand_prompt_with_range() {
        let range = SelectionRange::new("let x = 1;", 10, 20);
        let prompt = expand_prompt(DEFAULT_PROMPT_TEMPLATE, Some(&range));
        assert!(prompt.ends_with("let x = 1;"));
        assert!(!prompt.contains(RANGE_PLACEHOLDER));
    }

    #[test]
    fn test_expand_prompt_without_range() {
        assert_eq!(expand_prompt("Hello [Range]", None), "Hello [Range]");
    }

    #[test]
    fn test_prompt_task_blank_system_prompt() {
        let task = prompt_task("   ", "Hi", None);
        assert_eq!(task.kind(), TaskKind::Prompt);
        assert_eq!(task.system_prompt(), None);
        assert_eq!(task.prompt_text(), Some("Hi"));
    }

    #[test]
    fn test_fim_split_at_caret() {
        let range = SelectionRange::new("fn add(a, b) { a + b }", 100, 122);
        let task = fill_in_middle_task("", "[Range]", Some(&range), 114).unwrap();
        assert_eq!(task.fim_prefix(), Some("fn add(a, b) {"));
        assert_eq!(task.fim_suffix(), Some(" a + b }"));
        assert_eq!(task.prompt_text(), None);
    }

    #[test]
    fn test_fim_with_placeholder_wraps_prefix() {
        let range = SelectionRange::new("abcdef", 0, 6);
        let task = fill_in_middle_task("", "// rust\n[FIM]", Some(&range), 3).unwrap();
        assert_eq!(task.fim_prefix(), Some("// rust\nabc"));
        assert_eq!(task.fim_suffix(), Some("def"));
        assert_eq!(task.prompt_text(), None);
    }

    #[test]
    fn test_fim_instruction_from_template() {
        let range = SelectionRange::new("abcdef", 0, 6);
        let task =
            fill_in_middle_task("sys", "Complete the loop.\n\n[Range]", Some(&range), 2).unwrap();
        assert_eq!(task.prompt_text(), Some("Complete the loop."));
        assert_eq!(task.system_prompt(), Some("sys"));
    }

    #[test]
    fn test_fim_multibyte_split() {
        let range = SelectionRange::new("äöü", 5, 8);
        let task = fill_in_middle_task("", "", Some(&range), 6).unwrap();
        assert_eq!(task.fim_prefix(), Some("ä"));
        assert_eq!(task.fim_suffix(), Some("öü"));
    }

    #[test]
    fn test_fim_requires_range() {
        let err = fill_in_middle_task("", "[Range]", None, 0).unwrap_err();
        assert!(err.message().contains("marked range"));
    }

    #[test]
    fn test_fim_caret_outside_range() {
        let range = SelectionRange::new("abc", 10, 13);
        assert!(fill_in_middle_task("", "", Some(&range), 14).is_err());
        assert!(fill_in_middle_task("", "", Some(&range), 9).is_err());
        assert!(fill_in_middle_task("", "", Some(&range), 13).is_ok());
    }
}
