use std::cell::Cell;

/// Where an alternative stopped matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub pos: usize,
}

/// Outcome of a grammar rule: the produced value plus the position just past
/// it, or the position where matching failed.
pub type Parsed<T> = Result<(T, usize), Mismatch>;

/// Read-only view over route-document text.
///
/// Rules never move the cursor; they take a byte offset and hand back the
/// offset after what they consumed, so backtracking is simply reusing an
/// earlier offset. The furthest offset any rule failed at is kept for error
/// reporting.
pub struct Cursor<'src> {
    source: &'src str,
    furthest: Cell<usize>,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            furthest: Cell::new(0),
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Character at `pos`, if any.
    pub fn peek(&self, pos: usize) -> Option<char> {
        self.source.get(pos..)?.chars().next()
    }

    pub fn is_eof(&self, pos: usize) -> bool {
        pos >= self.source.len()
    }

    /// Records a failure at `pos` and returns it.
    pub fn mismatch(&self, pos: usize) -> Mismatch {
        if pos > self.furthest.get() {
            self.furthest.set(pos);
        }
        Mismatch { pos }
    }

    /// Furthest position any rule has failed at so far.
    pub fn furthest(&self) -> usize {
        self.furthest.get()
    }

    /// Matches exactly `expected`.
    pub fn char(&self, pos: usize, expected: char) -> Result<usize, Mismatch> {
        match self.peek(pos) {
            Some(c) if c == expected => Ok(pos + c.len_utf8()),
            _ => Err(self.mismatch(pos)),
        }
    }

    /// Matches any one of `set`.
    pub fn char_in(&self, pos: usize, set: &[char]) -> Parsed<char> {
        match self.peek(pos) {
            Some(c) if set.contains(&c) => Ok((c, pos + c.len_utf8())),
            _ => Err(self.mismatch(pos)),
        }
    }

    /// Matches `literal` ignoring ASCII case.
    pub fn literal_ignore_case(&self, pos: usize, literal: &str) -> Result<usize, Mismatch> {
        let end = pos + literal.len();
        match self.source.get(pos..end) {
            Some(text) if text.eq_ignore_ascii_case(literal) => Ok(end),
            _ => Err(self.mismatch(pos)),
        }
    }

    /// Skips spaces and tabs.
    pub fn inline_ws(&self, pos: usize) -> usize {
        self.skip_while(pos, |c| c == ' ' || c == '\t')
    }

    /// Skips any whitespace, newlines included.
    pub fn ws(&self, pos: usize) -> usize {
        self.skip_while(pos, char::is_whitespace)
    }

    /// At least one whitespace character.
    pub fn ws1(&self, pos: usize) -> Result<usize, Mismatch> {
        match self.ws(pos) {
            end if end > pos => Ok(end),
            _ => Err(self.mismatch(pos)),
        }
    }

    /// One or more ASCII decimal digits.
    pub fn digits(&self, pos: usize) -> Parsed<&'src str> {
        let end = self.skip_while(pos, |c| c.is_ascii_digit());
        if end == pos {
            return Err(self.mismatch(pos));
        }
        Ok((&self.source[pos..end], end))
    }

    /// Exactly `count` hex digits, as a number.
    pub fn hex_digits(&self, pos: usize, count: usize) -> Parsed<u32> {
        let end = pos + count;
        match self.source.get(pos..end) {
            Some(text) if text.chars().all(|c| c.is_ascii_hexdigit()) => {
                u32::from_str_radix(text, 16)
                    .map(|value| (value, end))
                    .map_err(|_| self.mismatch(pos))
            }
            _ => Err(self.mismatch(pos)),
        }
    }

    /// 1-based line and column of a byte offset.
    pub fn line_col(&self, pos: usize) -> (usize, usize) {
        let before = &self.source[..pos.min(self.source.len())];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map(|tail| tail.chars().count())
            .unwrap_or(0)
            + 1;
        (line, column)
    }

    fn skip_while(&self, pos: usize, predicate: impl Fn(char) -> bool) -> usize {
        let Some(rest) = self.source.get(pos..) else {
            return pos;
        };
        let skipped: usize = rest
            .chars()
            .take_while(|c| predicate(*c))
            .map(char::len_utf8)
            .sum();
        pos + skipped
    }
}
