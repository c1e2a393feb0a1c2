/// A cursor for byte-by-byte scanning of markup with position tracking.
///
/// Markup syntax is ASCII, so the cursor only ever stops on ASCII bytes and the slices
/// it hands out stay on char boundaries.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The input being scanned.
    pub s: &'a str,
    /// Current byte index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    /// Current byte position
    pub fn pos(&self) -> usize {
        self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Checks if the remaining input starts with the given byte pattern.
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes()[self.i.min(self.s.len())..].starts_with(pat)
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    /// Advances by `n` bytes, stopping at the end of input.
    pub fn bump_n(&mut self, n: usize) {
        self.i = (self.i + n).min(self.s.len());
    }

    /// Absolute index of the next occurrence of `pat` at or after the cursor
    pub fn find(&self, pat: &str) -> Option<usize> {
        self.s.get(self.i..)?.find(pat).map(|at| self.i + at)
    }

    /// Consume and return everything up to (not including) the next `stop` byte, or the
    /// rest of the input
    pub fn take_until(&mut self, stop: u8) -> &'a str {
        let start = self.i;
        while let Some(b) = self.peek()
            && b != stop
        {
            self.i += 1;
        }
        &self.s[start..self.i]
    }
}
