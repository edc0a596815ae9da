//! Resource limits and decode options.
//!
//! Limits bound recursion depth and the size of text the codec will
//! materialize. They are plain values passed into every call; nothing here is
//! process-wide.

/// Default nesting limit for arrays/objects.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Largest length a Rust `String` can represent.
pub const MAX_REPRESENTABLE_LEN: usize = isize::MAX as usize;

/// Bounds applied by the decoder and encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum container nesting depth (decode and encode).
    pub max_depth: usize,
    /// Maximum length in bytes of a single decoded string literal.
    pub max_string_length: usize,
    /// Maximum length in bytes of encoded output.
    pub max_output_length: usize,
}

impl Limits {
    /// Limits for general use: depth 512, text bounded only by what is representable.
    pub const fn standard() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_string_length: MAX_REPRESENTABLE_LEN,
            max_output_length: MAX_REPRESENTABLE_LEN,
        }
    }

    /// Tight limits for untrusted input.
    pub const fn strict() -> Self {
        Self {
            max_depth: 32,                  // 32 levels
            max_string_length: 64 * 1024,   // 64 KiB
            max_output_length: 1024 * 1024, // 1 MiB
        }
    }

    /// Replace the nesting limit.
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Replace the string literal limit.
    pub const fn with_max_string_length(mut self, max_string_length: usize) -> Self {
        self.max_string_length = max_string_length;
        self
    }

    /// Replace the encoded output limit.
    pub const fn with_max_output_length(mut self, max_output_length: usize) -> Self {
        self.max_output_length = max_output_length;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::standard()
    }
}

/// Options for [`decode_with_options`](crate::decode_with_options).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Tag every decoded string as unicode, even pure ASCII literals without escapes.
    pub all_unicode: bool,
    /// Resource limits.
    pub limits: Limits,
}

impl DecodeOptions {
    /// Default options: plain strings where possible, standard limits.
    pub const fn new() -> Self {
        Self {
            all_unicode: false,
            limits: Limits::standard(),
        }
    }

    /// Set the `all_unicode` flag.
    pub const fn with_all_unicode(mut self, all_unicode: bool) -> Self {
        self.all_unicode = all_unicode;
        self
    }

    /// Replace the limits.
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}
