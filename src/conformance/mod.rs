//! Conformance testing: a JSON corpus of expected outcomes and a
//! differential harness against `serde_json`.
//!
//! Both codecs decode the same input; accepted documents are re-encoded with
//! this crate's encoder and compared byte for byte, so structural differences
//! show up as a first differing byte in a [`ReproBundle`]. Inputs that only
//! this crate accepts are classified by the extension they rely on instead of
//! being reported as mismatches.

pub mod corpus;
mod harness;
mod repro;
mod runner;

pub use corpus::{Corpus, CorpusResults, CorpusRunner, Expected, ExpectedError, TestResult, TestVector};
pub use harness::{BatchResult, DiffResult, DiffTestHarness};
pub use repro::ReproBundle;
pub use runner::{from_serde_value, CjsonRunner, CodecOutput, CodecRunner, SerdeJsonRunner};

/// Result type for conformance operations.
pub type ConformanceResult<T> = Result<T, ConformanceError>;

/// Errors that can occur during conformance testing.
#[derive(Debug)]
pub enum ConformanceError {
    /// I/O error
    IoError(String),
    /// Corpus file is not valid
    CorpusParseError(String),
    /// A value could not be converted or re-encoded
    CodecError(String),
}

impl std::fmt::Display for ConformanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(msg) => write!(f, "I/O error: {}", msg),
            Self::CorpusParseError(msg) => write!(f, "Failed to parse corpus: {}", msg),
            Self::CodecError(msg) => write!(f, "Codec error: {}", msg),
        }
    }
}

impl std::error::Error for ConformanceError {}

/// Index of the first byte where `a` and `b` differ, if any.
pub(crate) fn first_diff(a: &[u8], b: &[u8]) -> Option<usize> {
    match a.iter().zip(b).position(|(x, y)| x != y) {
        Some(i) => Some(i),
        None if a.len() != b.len() => Some(a.len().min(b.len())),
        None => None,
    }
}
