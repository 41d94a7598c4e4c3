/// A byte offset range into an input file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Span of the character at 1-based `line`/`column`, clamped to `source`.
    pub fn at_line_col(source: &str, line: usize, column: usize) -> Self {
        let mut offset = 0;
        for (i, text) in source.split_inclusive('\n').enumerate() {
            if i + 1 == line {
                let col = column.saturating_sub(1).min(text.len());
                let start = offset + col;
                return Self::new(start, (start + 1).min(source.len()));
            }
            offset += text.len();
        }
        Self::new(source.len(), source.len())
    }
}
