//! Greedy word wrapping against measured glyph widths

use serde::Serialize;

use crate::fonts::TextMeasure;

/// Line-broken form of one input string for one font and width.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WrappedText {
    lines: Vec<String>,
}

impl WrappedText {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Indices of lines wider than `max_width`. Only single-word lines can
    /// end up here.
    pub fn overflowing<M: TextMeasure + ?Sized>(&self, metrics: &M, max_width: u32) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| metrics.measure(line).width > max_width)
            .map(|(i, _)| i)
            .collect()
    }
}

impl From<Vec<String>> for WrappedText {
    fn from(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

/// Break `text` into lines no wider than `max_width`.
///
/// Words are whitespace-delimited and never split. A word is always accepted
/// onto an empty line, so a word wider than `max_width` ends up alone on its
/// own overflowing line.
pub fn wrap_text<M: TextMeasure + ?Sized>(text: &str, metrics: &M, max_width: u32) -> WrappedText {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if current.is_empty() || metrics.measure(&candidate).width <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    WrappedText { lines }
}
