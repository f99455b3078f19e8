//! Polybar-style status line
//!
//! `<count>  <sep> entry <sep> entry <sep> entry +N`

use super::theme::Palette;
use super::Renderer;
use crate::store::{Notification, Urgency};

/// At most this many entries are shown; the rest are counted as `+N`
pub const MAX_ENTRIES: usize = 3;

pub const DEFAULT_MAX_ENTRY_CHARS: usize = 40;

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone)]
pub struct StatusBarFormatter {
    palette: Palette,
    separator_glyph: String,
    max_entry_chars: usize,
}

impl StatusBarFormatter {
    pub fn new(palette: Palette, separator_glyph: impl Into<String>, max_entry_chars: usize) -> Self {
        Self {
            palette,
            separator_glyph: separator_glyph.into(),
            max_entry_chars,
        }
    }

    fn separator(&self) -> String {
        format!(
            " %{{F{}}}%{{T2}}{}%{{F{}}}%{{T-}} ",
            self.palette.background, self.separator_glyph, self.palette.text
        )
    }

    fn entry(&self, notification: &Notification) -> String {
        let text = truncate(&notification.summary_line(), self.max_entry_chars);
        match notification.urgency {
            Urgency::High => format!(
                "%{{F{}}}{}%{{F{}}}",
                self.palette.urgent, text, self.palette.text
            ),
            _ => text,
        }
    }
}

impl Renderer for StatusBarFormatter {
    fn render(&self, snapshot: &[Notification]) -> String {
        let mut line = format!("{} ", snapshot.len());
        if snapshot.is_empty() {
            line.push('\n');
            return line;
        }

        let separator = self.separator();
        for notification in snapshot.iter().take(MAX_ENTRIES) {
            line.push_str(&separator);
            line.push_str(&self.entry(notification));
        }

        if snapshot.len() > MAX_ENTRIES {
            line.push_str(&format!(" +{}", snapshot.len() - MAX_ENTRIES));
        }
        line.push('\n');
        line
    }
}

/// Cut `text` to `max_chars` characters, ending in `...` when shortened
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
