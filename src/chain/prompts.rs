//! Prompt list parsing.

use std::io::Read;

/// One prompt per non-blank line, trimmed, in order.
pub fn split_prompts(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a prompt list from `reader` and split it.
pub fn read_prompts<R: Read>(mut reader: R) -> std::io::Result<Vec<String>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(split_prompts(&text))
}
