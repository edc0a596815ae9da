//! Position-tracked cursor over the input bytes.
//!
//! The scanner never copies; decoders borrow slices of the input through it.
//! Offsets are always relative to the start of the original buffer.

/// Cursor over an immutable byte buffer.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Start scanning `input` at offset 0.
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Current byte offset from the start of the input.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// True once every byte has been consumed.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Peek at the current byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Peek `n` bytes past the current one.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.pos
            .checked_add(n)
            .and_then(|i| self.input.get(i))
            .copied()
    }

    /// Consume one byte.
    pub fn bump(&mut self) {
        if self.pos < self.input.len() {
            self.pos += 1;
        }
    }

    /// Consume bytes while `pred` holds.
    pub fn skip_while(&mut self, pred: impl Fn(u8) -> bool) {
        while let Some(b) = self.peek() {
            if !pred(b) {
                break;
            }
            self.pos += 1;
        }
    }

    /// Skip space, tab, newline and carriage return.
    pub fn skip_whitespace(&mut self) {
        self.skip_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'));
    }

    /// Consume `literal` if the remaining input starts with it.
    pub fn eat(&mut self, literal: &[u8]) -> bool {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Unconsumed input.
    pub fn rest(&self) -> &'a [u8] {
        self.input.get(self.pos..).unwrap_or_default()
    }

    /// Bytes between two offsets.
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        self.input.get(start..end).unwrap_or_default()
    }

    /// Up to 20 bytes of upcoming input, for error messages.
    pub fn snippet(&self) -> String {
        let rest = self.rest();
        String::from_utf8_lossy(&rest[..rest.len().min(20)]).into_owned()
    }
}
