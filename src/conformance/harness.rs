//! Differential test harness comparing this crate with `serde_json`.

use super::repro::ReproBundle;
use super::runner::{CjsonRunner, CodecOutput, CodecRunner, SerdeJsonRunner};
use super::{ConformanceError, ConformanceResult};
use crate::limits::DecodeOptions;

/// Result of a differential test.
#[derive(Debug)]
pub enum DiffResult {
    /// Both codecs accepted the input and produced the same document.
    Agree {
        /// The encoded document.
        value: String,
    },
    /// Both codecs rejected the input.
    BothRejected {
        /// This crate's error.
        ours: String,
        /// The reference error.
        reference: String,
    },
    /// Only this crate accepted the input, because of a known extension.
    OursOnly {
        /// The encoded document.
        value: String,
        /// Which extension the input relies on.
        extension: &'static str,
    },
    /// The codecs disagree.
    Mismatch {
        /// Outcome from this crate.
        ours: CodecOutput,
        /// Outcome from the reference codec.
        reference: CodecOutput,
        /// Repro bundle for debugging.
        repro: ReproBundle,
    },
}

impl DiffResult {
    /// Check if the result is an agreement (accepted or rejected by both).
    pub fn is_agreement(&self) -> bool {
        matches!(self, Self::Agree { .. } | Self::BothRejected { .. })
    }

    /// Check if the result is a mismatch.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch { .. })
    }
}

/// Differential test harness for comparing decoders.
pub struct DiffTestHarness {
    ours: CjsonRunner,
    reference: SerdeJsonRunner,
}

impl DiffTestHarness {
    /// Harness with default decode options.
    pub fn new() -> Self {
        Self::with_options(DecodeOptions::default())
    }

    /// Harness decoding with explicit options on this crate's side.
    pub fn with_options(options: DecodeOptions) -> Self {
        Self {
            ours: CjsonRunner::with_options(options),
            reference: SerdeJsonRunner::new(),
        }
    }

    /// Decode `input` with both codecs and classify the outcome.
    pub fn compare(&self, test_name: &str, input: &[u8]) -> ConformanceResult<DiffResult> {
        let ours = self.ours.decode(input)?;
        let reference = self.reference.decode(input)?;

        let result = match (ours, reference) {
            (CodecOutput::Ok(a), CodecOutput::Ok(b)) if a == b => DiffResult::Agree { value: a },
            (CodecOutput::Err(ours), CodecOutput::Err(reference)) => {
                DiffResult::BothRejected { ours, reference }
            }
            (CodecOutput::Ok(value), CodecOutput::Err(reference)) => {
                match extension_used(input, &reference) {
                    Some(extension) => DiffResult::OursOnly { value, extension },
                    None => mismatch(test_name, input, CodecOutput::Ok(value), CodecOutput::Err(reference)),
                }
            }
            (ours, reference) => mismatch(test_name, input, ours, reference),
        };
        Ok(result)
    }

    /// Run a batch of differential tests.
    pub fn compare_batch<'a>(&self, tests: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> BatchResult {
        let mut results = BatchResult::new();

        for (name, input) in tests {
            match self.compare(name, input) {
                Ok(DiffResult::Agree { .. } | DiffResult::BothRejected { .. }) => {
                    results.record_pass(name);
                }
                Ok(DiffResult::OursOnly { extension, .. }) => {
                    results.record_extension(name, extension);
                }
                Ok(DiffResult::Mismatch { repro, .. }) => {
                    results.record_fail(repro);
                }
                Err(e) => {
                    results.record_error(name, e);
                }
            }
        }

        results
    }
}

impl Default for DiffTestHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn mismatch(test_name: &str, input: &[u8], ours: CodecOutput, reference: CodecOutput) -> DiffResult {
    let repro = ReproBundle::new(test_name.to_string(), input, ours.clone(), reference.clone());
    DiffResult::Mismatch {
        ours,
        reference,
        repro,
    }
}

/// Name the extension an input accepted only by this crate relies on.
fn extension_used(input: &[u8], reference_error: &str) -> Option<&'static str> {
    if reference_error.starts_with("recursion limit exceeded") {
        return Some("nesting deeper than the reference recursion limit");
    }

    let mut in_string = false;
    let mut i = 0;
    while i < input.len() {
        let b = input[i];
        if in_string {
            match b {
                b'"' => in_string = false,
                b'\\' if input.get(i + 1) == Some(&b'u') => {
                    if is_lone_surrogate(input, i) {
                        return Some("lone surrogate escape");
                    }
                    i += 1;
                }
                b'\\' => i += 1,
                0x00..=0x1F => return Some("raw control character in string"),
                _ => {}
            }
        } else {
            match b {
                b'"' => in_string = true,
                b'N' => return Some("NaN literal"),
                b'I' => return Some("Infinity literal"),
                b'+' => return Some("leading plus sign"),
                _ => {}
            }
        }
        i += 1;
    }
    None
}

fn hex_unit(input: &[u8], at: usize) -> Option<u16> {
    let digits = std::str::from_utf8(input.get(at..at + 4)?).ok()?;
    u16::from_str_radix(digits, 16).ok()
}

// `at` is the offset of a backslash starting a `\u` escape.
fn is_lone_surrogate(input: &[u8], at: usize) -> bool {
    let is_low = |i: usize| {
        input.get(i..i + 2) == Some(b"\\u".as_slice())
            && matches!(hex_unit(input, i + 2), Some(0xDC00..=0xDFFF))
    };
    let preceded_by_high = at >= 6
        && input.get(at - 6..at - 4) == Some(b"\\u".as_slice())
        && matches!(hex_unit(input, at - 4), Some(0xD800..=0xDBFF));
    match hex_unit(input, at + 2) {
        Some(0xD800..=0xDBFF) => !is_low(at + 6),
        Some(0xDC00..=0xDFFF) => !preceded_by_high,
        _ => false,
    }
}

/// Results from running a batch of differential tests.
#[derive(Debug)]
pub struct BatchResult {
    /// Number of inputs both codecs agreed on.
    pub passed: usize,
    /// Number of inputs the codecs disagreed on.
    pub failed: usize,
    /// Number of inputs accepted only through an extension.
    pub extensions: usize,
    /// Number of tests that errored.
    pub errors: usize,
    /// Repro bundles of the mismatches.
    pub failures: Vec<ReproBundle>,
    /// Details of errors.
    pub error_details: Vec<ErrorDetail>,
}

/// Details about a test error.
#[derive(Debug)]
pub struct ErrorDetail {
    /// Test name.
    pub name: String,
    /// Error that occurred.
    pub error: ConformanceError,
}

impl BatchResult {
    /// Create a new empty batch result.
    pub fn new() -> Self {
        Self {
            passed: 0,
            failed: 0,
            extensions: 0,
            errors: 0,
            failures: Vec::new(),
            error_details: Vec::new(),
        }
    }

    /// Record an agreement.
    pub fn record_pass(&mut self, _name: &str) {
        self.passed += 1;
    }

    /// Record a mismatch.
    pub fn record_fail(&mut self, repro: ReproBundle) {
        self.failed += 1;
        self.failures.push(repro);
    }

    /// Record an input accepted only through an extension.
    pub fn record_extension(&mut self, _name: &str, _extension: &str) {
        self.extensions += 1;
    }

    /// Record a test error.
    pub fn record_error(&mut self, name: &str, error: ConformanceError) {
        self.errors += 1;
        self.error_details.push(ErrorDetail {
            name: name.to_string(),
            error,
        });
    }

    /// Check if every input agreed or was explained by an extension.
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }

    /// Get total number of tests run.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.extensions + self.errors
    }

    /// Format a summary string.
    pub fn summary(&self) -> String {
        format!(
            "{} agreed, {} mismatched, {} extension-only, {} errors (total: {})",
            self.passed,
            self.failed,
            self.extensions,
            self.errors,
            self.total()
        )
    }
}

impl Default for BatchResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agree() {
        let harness = DiffTestHarness::new();
        let result = harness.compare("obj", br#"{"a": [1, 2.5, null]}"#).unwrap();
        match result {
            DiffResult::Agree { value } => assert_eq!(value, r#"{"a": [1, 2.5, null]}"#),
            other => panic!("expected agreement, got {other:?}"),
        }
    }

    #[test]
    fn test_both_rejected() {
        let harness = DiffTestHarness::new();
        assert!(harness.compare("trailing", b"[1,]").unwrap().is_agreement());
        assert!(harness.compare("empty", b"").unwrap().is_agreement());
    }

    #[test]
    fn test_extensions_classified() {
        let harness = DiffTestHarness::new();
        let cases: [(&[u8], &str); 5] = [
            (b"[NaN]", "NaN literal"),
            (b"-Infinity", "Infinity literal"),
            (b"+5", "leading plus sign"),
            (b"\"a\x01\"", "raw control character in string"),
            (b"\"\\ud800\"", "lone surrogate escape"),
        ];
        for (input, expected) in cases {
            match harness.compare("ext", input).unwrap() {
                DiffResult::OursOnly { extension, .. } => assert_eq!(extension, expected),
                other => panic!("expected extension for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_surrogate_pair_is_not_lone() {
        assert!(!is_lone_surrogate(b"\\ud83d\\ude00", 0));
        assert!(!is_lone_surrogate(b"\\ud83d\\ude00", 6));
        assert!(is_lone_surrogate(b"\\ude00", 0));
        assert!(is_lone_surrogate(b"\\ud83dx", 0));
    }

    #[test]
    fn test_batch_result() {
        let harness = DiffTestHarness::new();
        let inputs: Vec<(&str, &[u8])> = vec![
            ("a", &b"1"[..]),
            ("b", &b"[true, false]"[..]),
            ("c", &b"NaN"[..]),
            ("d", &b"{"[..]),
        ];
        let result = harness.compare_batch(inputs);
        assert_eq!(result.passed, 3);
        assert_eq!(result.extensions, 1);
        assert_eq!(result.total(), 4);
        assert!(result.all_passed(), "{}", result.summary());
    }
}
