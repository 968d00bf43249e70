//! Page content → terminal rows.
//!
//! Formatting only.  Every page renders to one header row plus one row
//! per line record, whether or not annotations are shown, so toggling
//! annotations never changes node heights.

use ratatui::text::{Line, Span};

use crate::core::page::{LineRecord, PageContent, PageNumber};

use super::theme::Theme;

const COLUMN_GAP: &str = "    ";
const SETUMA_GAP: &str = "   ";

/// Hebrew cantillation marks and vowel points.
fn is_mark(c: char) -> bool {
    matches!(c,
        '\u{0591}'..='\u{05BD}'
        | '\u{05BF}'
        | '\u{05C1}'..='\u{05C2}'
        | '\u{05C4}'..='\u{05C5}'
        | '\u{05C7}')
}

/// Annotated text keeps its marks; plain text drops them.
pub fn filter_text(text: &str, annotated: bool) -> String {
    if annotated {
        text.to_string()
    } else {
        text.chars().filter(|&c| !is_mark(c)).collect()
    }
}

/// `"1:1"`, `"1:1–1:4"`, or empty.
pub fn display_range(labels: &[String]) -> String {
    match labels {
        [] => String::new(),
        [only] => only.clone(),
        [first, .., last] => format!("{first}–{last}"),
    }
}

fn line_row(line: &LineRecord, annotated: bool) -> Line<'static> {
    let mut spans = Vec::new();
    let style = if line.is_petucha {
        Theme::petucha_style()
    } else {
        Theme::text_style()
    };

    for (i, column) in line.text.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(COLUMN_GAP));
        }
        let gap = if column.len() > 1 { SETUMA_GAP } else { " " };
        let fragments: Vec<String> = column
            .iter()
            .map(|fragment| filter_text(fragment, annotated))
            .collect();
        spans.push(Span::styled(fragments.join(gap), style));
    }

    if annotated {
        for labels in [&line.verses, &line.aliyot] {
            let range = display_range(labels);
            if !range.is_empty() {
                spans.push(Span::styled(format!("  [{range}]"), Theme::indicator_style()));
            }
        }
    }

    Line::from(spans)
}

/// Full replacement row set for one page node.
pub fn page_rows(page: PageNumber, content: &PageContent, annotated: bool) -> Vec<Line<'static>> {
    let mut rows = Vec::with_capacity(content.lines.len() + 1);
    rows.push(Line::from(Span::styled(
        format!("── {page} ──"),
        Theme::page_header_style(),
    )));
    rows.extend(content.lines.iter().map(|line| line_row(line, annotated)));
    rows
}
