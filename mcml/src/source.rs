use std::collections::VecDeque;
use std::ops::Range;

/// Where something sits in the source: 1-based line number plus the byte
/// span of that line's trimmed text (for codespan-reporting labels).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub line: usize,
    pub span: Range<usize>,
}

/// A single trimmed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub span: Range<usize>,
    pub text: String,
}

impl Line {
    pub fn location(&self) -> Location {
        Location {
            line: self.number,
            span: self.span.clone(),
        }
    }

    /// Blank lines and `#` / `//` comments carry no content.
    pub fn is_meaningful(&self) -> bool {
        !(self.text.is_empty() || self.text.starts_with('#') || self.text.starts_with("//"))
    }
}

/// A forward-only cursor over numbered lines.
///
/// Tags must be isolated in the order they appear; nothing is ever pushed
/// back. `eof` is where end-of-stream errors are reported: the last line of
/// a file, or the closing tag of an isolated block.
#[derive(Debug, Clone)]
pub struct LineStream {
    lines: VecDeque<Line>,
    eof: Location,
}

impl LineStream {
    /// Split source text into trimmed, 1-indexed lines.
    pub fn from_source(source: &str) -> Self {
        let mut lines = VecDeque::new();
        let mut offset = 0;
        for (index, raw) in source.split_inclusive('\n').enumerate() {
            let content = raw.trim_end_matches(['\n', '\r']);
            let leading = content.len() - content.trim_start().len();
            let text = content.trim();
            let start = offset + leading;
            lines.push_back(Line {
                number: index + 1,
                span: start..start + text.len(),
                text: text.to_string(),
            });
            offset += raw.len();
        }
        let eof = lines
            .back()
            .map(Line::location)
            .unwrap_or_default();
        LineStream { lines, eof }
    }

    pub fn from_lines(lines: Vec<Line>, eof: Location) -> Self {
        LineStream {
            lines: lines.into(),
            eof,
        }
    }

    /// Next raw line, comments and blanks included.
    pub fn next_line(&mut self) -> Option<Line> {
        self.lines.pop_front()
    }

    /// Next line that is neither blank nor a comment.
    pub fn next_meaningful(&mut self) -> Option<Line> {
        while let Some(line) = self.lines.pop_front() {
            if line.is_meaningful() {
                return Some(line);
            }
        }
        None
    }

    /// Drop leading comments and blanks, then report whether anything is left.
    pub fn at_end(&mut self) -> bool {
        while self.lines.front().is_some_and(|line| !line.is_meaningful()) {
            self.lines.pop_front();
        }
        self.lines.is_empty()
    }

    pub fn eof(&self) -> &Location {
        &self.eof
    }
}

impl Iterator for LineStream {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        self.next_meaningful()
    }
}
