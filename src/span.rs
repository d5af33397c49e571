use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: (usize, usize),
    pub end: (usize, usize),
}

impl Span {
    pub fn new(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            start: (start_line, start_col),
            end: (end_line, end_col),
        }
    }

    pub fn new_from_range(start: Span, end: Span) -> Span {
        Self {
            start: start.start,
            end: end.end,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start.0, self.start.1)
    }
}

#[cfg(test)]
mod tests {
    use super::Span;

    #[test]
    fn range_keeps_outer_bounds() {
        let span = Span::new_from_range(Span::new(1, 4, 1, 8), Span::new(3, 2, 3, 9));
        assert_eq!(span, Span::new(1, 4, 3, 9));
        assert_eq!(span.to_string(), "1:4");
    }
}
