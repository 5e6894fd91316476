//! Plain-text search, for logs that are not structured JSONL.

use anyhow::Context;
use regex::RegexBuilder;

/// One matching line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub line: usize,
    pub text: String,
}

/// Return every line of `text` matching `pattern`, with 1-based line numbers.
pub fn search_text(text: &str, pattern: &str, ignore_case: bool) -> anyhow::Result<Vec<SearchHit>> {
    let re = RegexBuilder::new(pattern)
        .case_insensitive(ignore_case)
        .build()
        .with_context(|| format!("bad search pattern {:?}", pattern))?;

    Ok(text
        .lines()
        .enumerate()
        .filter(|(_, line)| re.is_match(line))
        .map(|(lineno, line)| SearchHit {
            line: lineno + 1,
            text: line.trim_end().to_string(),
        })
        .collect())
}
