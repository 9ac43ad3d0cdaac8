//! Source excerpts for diagnostics

use crate::syntax::Span;

/// The span's source line followed by a caret under its column, or an empty
/// string when the span is synthetic or out of range
///
/// ```text
///  5 | await load(context);
///    |            ^
/// ```
pub fn source_excerpt(source: &str, span: &Span) -> String {
    if span.is_synthetic() {
        return String::new();
    }
    let Some(line) = source_line(source, span.line) else {
        return String::new();
    };
    let number = span.line.to_string();
    let padding = " ".repeat(number.len());
    format!(
        " {} | {}\n {} | {}\n",
        number,
        line,
        padding,
        caret(line, span.col)
    )
}

/// Line `line` (1-based) without its terminator
pub fn source_line(source: &str, line: u32) -> Option<&str> {
    if line == 0 {
        return None;
    }
    source.lines().nth(line as usize - 1)
}

/// Spaces up to column `col` (1-based) followed by `^`. Tabs count as four
/// columns.
pub fn caret(line: &str, col: u32) -> String {
    let col = col as usize;
    if col <= 1 {
        return "^".to_string();
    }
    let width: usize = line
        .chars()
        .take(col - 1)
        .map(|ch| if ch == '\t' { 4 } else { 1 })
        .sum();
    // Columns past the end of the line still get a caret.
    let overhang = (col - 1).saturating_sub(line.chars().count());
    format!("{}^", " ".repeat(width + overhang))
}
