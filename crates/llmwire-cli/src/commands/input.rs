//! Resolution of text arguments

use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Literal text, `@path` for a file's content, or `-` for stdin
pub fn resolve_text(value: &str) -> Result<String> {
    if value == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    match value.strip_prefix('@') {
        Some(path) => read_file(Path::new(path)),
        None => Ok(value.to_string()),
    }
}

pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Trimmed system prompt, `None` when blank
pub fn system_prompt(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_literal_text() {
        assert_eq!(resolve_text("fn main() {").unwrap(), "fn main() {");
    }

    #[test]
    fn test_at_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "let x = 1;\n").unwrap();
        let arg = format!("@{}", file.path().display());
        assert_eq!(resolve_text(&arg).unwrap(), "let x = 1;\n");
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = resolve_text("@/definitely/not/here.rs").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.rs"));
    }

    #[test]
    fn test_system_prompt_blank_is_none() {
        assert_eq!(system_prompt(Some("  ")), None);
        assert_eq!(system_prompt(Some(" terse ")).as_deref(), Some("terse"));
        assert_eq!(system_prompt(None), None);
    }
}
