//! Logical-line reader for template files.
//!
//! Comments (`#` to end of line, `\#` for a literal hash) are stripped,
//! each physical line is trimmed, blank lines are skipped and lines ending
//! in `\` are joined with the next one.

use std::fmt;

/// One logical line and the physical lines it came from (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub text: String,
    pub first: usize,
    pub last: usize,
}

impl LogicalLine {
    /// `line N` or `lines N-M` for joined lines.
    pub fn location(&self) -> LineSpan {
        LineSpan {
            first: self.first,
            last: self.last,
        }
    }
}

/// Printable physical line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    first: usize,
    last: usize,
}

impl fmt::Display for LineSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "line {}", self.first)
        } else {
            write!(f, "lines {}-{}", self.first, self.last)
        }
    }
}

/// Iterator over the logical lines of a template.
pub struct TemplateReader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> TemplateReader<'a> {
    pub fn new(contents: &'a str) -> Self {
        TemplateReader {
            lines: contents.lines().enumerate(),
        }
    }
}

/// Drop a trailing comment, honoring `\#` escapes.
///
/// Returns `None` when the line held nothing but a comment.
fn strip_comment(line: &str) -> Option<String> {
    match line.find('#') {
        None => Some(line.to_string()),
        Some(pos) if pos == 0 || !line[..pos].ends_with('\\') => {
            let kept = &line[..pos];
            if kept.trim().is_empty() {
                None
            } else {
                Some(kept.to_string())
            }
        }
        Some(_) => Some(line.replace("\\#", "#")),
    }
}

impl Iterator for TemplateReader<'_> {
    type Item = LogicalLine;

    fn next(&mut self) -> Option<LogicalLine> {
        // (text, first line, last line) of a pending continuation
        let mut buildup: Option<(String, usize, usize)> = None;

        loop {
            let Some((idx, raw)) = self.lines.next() else {
                if let Some((text, first, last)) = buildup {
                    tracing::warn!("continuation line immediately precedes end-of-file");
                    return Some(LogicalLine { text, first, last });
                }
                return None;
            };
            let number = idx + 1;

            let Some(stripped) = strip_comment(raw) else {
                continue;
            };

            let (mut line, first) = match buildup.take() {
                Some((mut text, first, _)) => {
                    text.push_str(stripped.trim_start());
                    (text, first)
                }
                None => (stripped, number),
            };
            line = line.trim().to_string();

            if line.is_empty() {
                continue;
            }

            if let Some(joined) = line.strip_suffix('\\') {
                buildup = Some((joined.to_string(), first, number));
                continue;
            }

            return Some(LogicalLine {
                text: line,
                first,
                last: number,
            });
        }
    }
}
