//! Field-level CSV primitives: escaping, the quote-aware field splitter and
//! the line splitter that feeds it.

use std::borrow::Cow;
use std::ops::Range;

/// Byte-order mark some spreadsheet tools put in front of exported CSV.
pub const UTF8_BOM: char = '\u{feff}';

/// Returns true if `field` has to be quoted to survive a round trip.
///
/// Only comma, double quote and newline trigger quoting. Carriage returns and
/// surrounding whitespace are written verbatim.
#[inline]
pub fn needs_quoting(field: &str) -> bool {
    field.contains([',', '"', '\n'])
}

/// Escapes a single field for CSV output.
///
/// A field containing a comma, a double quote or a newline is wrapped in
/// double quotes with every inner quote doubled; any other field is returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use voter_registry::csv_handler::escape_field;
///
/// assert_eq!(escape_field("a,b"), "\"a,b\"");
/// assert_eq!(escape_field("He said \"hi\""), "\"He said \"\"hi\"\"\"");
/// assert_eq!(escape_field("Smith42"), "Smith42");
/// ```
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if needs_quoting(field) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Splits one CSV line into fields.
///
/// Scans left to right tracking whether the cursor is inside quotes. A `"`
/// toggles the quoted state, except that `""` inside quotes yields one
/// literal `"`. A `,` outside quotes ends the current field. Everything else,
/// including newlines inside quotes, is appended to the current field. The
/// accumulated field is emitted at the end of the line, so the result always
/// has at least one element.
///
/// Unbalanced quotes are not an error: the rest of the line simply belongs to
/// the open field.
///
/// # Examples
///
/// ```
/// use voter_registry::csv_handler::split_fields;
///
/// assert_eq!(
///     split_fields("John,\"Doe, Jr.\",30"),
///     vec!["John", "Doe, Jr.", "30"]
/// );
/// ```
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// A logical CSV line together with the physical line number it starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based physical line number of the first character.
    pub number: u64,
    /// Line content without the terminating `\n` or trailing `\r`.
    pub text: &'a str,
}

/// Splits CSV text into logical lines.
///
/// Lines end at `\n`, except where the newline sits inside a quoted field, so
/// quoted newlines written by [`escape_field`] stay within their record. A
/// quote only carries a line over when it opened a field and the quoted field
/// closes cleanly on a later line, before a comma or the end of that line.
/// A stray quote that never closes, or closes mid-field, joins nothing: the
/// line it sits on stands alone and every following line is split on its own.
///
/// A single trailing `\r` is removed from every line, and a leading
/// byte-order mark is dropped from the input.
pub fn split_lines(text: &str) -> Vec<Line<'_>> {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    let physical = physical_lines(text);
    let mut lines = Vec::with_capacity(physical.len());
    let mut first = 0;

    while first < physical.len() {
        let last = quoted_continuation_end(text, &physical, first).unwrap_or(first);
        lines.push(Line {
            number: first as u64 + 1,
            text: trim_cr(&text[physical[first].start..physical[last].end]),
        });
        first = last + 1;
    }
    lines
}

/// Byte ranges of the `\n`-separated lines, without the separators. A
/// trailing newline does not start another line.
fn physical_lines(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for (i, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            ranges.push(start..i);
            start = i + 1;
        }
    }
    if start < text.len() {
        ranges.push(start..text.len());
    }
    ranges
}

/// Index of the last physical line of a record whose quoted field opens on
/// line `first` and spans further lines, or `None` if line `first` stands
/// alone.
fn quoted_continuation_end(text: &str, physical: &[Range<usize>], first: usize) -> Option<usize> {
    let mut scan = QuoteScan::default();
    if scan.feed(&text[physical[first].clone()], true) != LineEnd::OpenField {
        return None;
    }
    for (offset, range) in physical[first + 1..].iter().enumerate() {
        match scan.feed(&text[range.clone()], false) {
            LineEnd::Closed => return Some(first + 1 + offset),
            LineEnd::OpenField => {}
            LineEnd::Malformed => return None,
        }
    }
    None
}

/// How a physical line ends with respect to quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineEnd {
    /// Outside quotes, with every quoted field closed before a comma or the
    /// end of the line.
    Closed,
    /// Inside a quoted field that opened at the start of a field.
    OpenField,
    /// Inside a quote opened mid-field, or a quote closed mid-field.
    Malformed,
}

/// Quote state carried from one physical line to the next, with the same
/// toggling rules as [`split_fields`].
#[derive(Debug, Default)]
struct QuoteScan {
    in_quotes: bool,
    opened_at_field_start: bool,
}

impl QuoteScan {
    fn feed(&mut self, line: &str, at_field_start: bool) -> LineEnd {
        let bytes = line.as_bytes();
        let mut field_start = at_field_start;
        let mut just_closed = false;
        let mut malformed = false;
        let mut i = 0;

        while i < bytes.len() {
            let byte = bytes[i];
            if self.in_quotes {
                if byte == b'"' {
                    if bytes.get(i + 1) == Some(&b'"') {
                        i += 2;
                        continue;
                    }
                    self.in_quotes = false;
                    just_closed = true;
                }
            } else {
                if just_closed && !matches!(byte, b',' | b'\r') {
                    malformed = true;
                }
                just_closed = false;
                if byte == b'"' {
                    self.in_quotes = true;
                    self.opened_at_field_start = field_start;
                }
                field_start = byte == b',';
            }
            i += 1;
        }

        match (self.in_quotes, self.opened_at_field_start) {
            (true, true) => LineEnd::OpenField,
            (true, false) => LineEnd::Malformed,
            (false, _) if malformed => LineEnd::Malformed,
            (false, _) => LineEnd::Closed,
        }
    }
}

fn trim_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}
