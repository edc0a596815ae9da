//! Bounded growable text buffer.
//!
//! Shared by the string unescaper and the encoder. Growth past the configured
//! bound, or a length computation that would overflow, is reported instead of
//! truncating or wrapping.

/// The buffer would have grown past its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityExceeded {
    /// Configured bound in bytes.
    pub limit: usize,
}

/// A `String` that refuses to grow past `limit` bytes.
#[derive(Debug, Clone)]
pub struct Buffer {
    text: String,
    limit: usize,
}

impl Buffer {
    /// Empty buffer bounded at `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            text: String::new(),
            limit,
        }
    }

    /// Current length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Configured bound.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Contents written so far.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Drop the contents, keeping the allocation for reuse.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    fn grow(&mut self, additional: usize) -> Result<(), CapacityExceeded> {
        match self.text.len().checked_add(additional) {
            Some(needed) if needed <= self.limit => Ok(()),
            _ => Err(CapacityExceeded { limit: self.limit }),
        }
    }

    /// Append a string slice.
    pub fn push_str(&mut self, s: &str) -> Result<(), CapacityExceeded> {
        self.grow(s.len())?;
        self.text.push_str(s);
        Ok(())
    }

    /// Append one character.
    pub fn push(&mut self, ch: char) -> Result<(), CapacityExceeded> {
        self.grow(ch.len_utf8())?;
        self.text.push(ch);
        Ok(())
    }

    /// Copy the contents out and clear, keeping the allocation.
    pub fn take_string(&mut self) -> String {
        let text = self.text.clone();
        self.text.clear();
        text
    }

    /// Consume the buffer.
    pub fn into_string(self) -> String {
        self.text
    }
}
