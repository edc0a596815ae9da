//! Corpus-based conformance testing.
//!
//! Loads test vectors from a corpus file and runs them against the codec.
//! Each vector names an operation, an input document and the expected
//! outcome: the exact encoded text on success, or the error kind and byte
//! offset on failure.
//!
//! ```json
//! {
//!   "manifest": {"format_version": "1", "version": "...", "description": "..."},
//!   "vectors": [
//!     {"id": "array-basic", "op": "decode", "input": "[1,2]", "expected": {"ok": "[1, 2]"}},
//!     {"id": "array-open", "op": "decode", "input": "[1,", "expected": {"err": {"kind": "UnterminatedArray", "offset": 0}}}
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{ConformanceError, ConformanceResult};
use crate::error::{DecodeError, ErrorKind};
use crate::limits::{DecodeOptions, Limits};
use crate::value::Value;
use crate::{decode_with_options, encode};

/// Corpus manifest with metadata.
#[derive(Debug, Deserialize)]
pub struct CorpusManifest {
    /// Format version of the corpus file.
    pub format_version: String,
    /// Corpus version.
    pub version: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// A corpus containing test vectors.
#[derive(Debug, Deserialize)]
pub struct Corpus {
    /// Corpus metadata.
    pub manifest: CorpusManifest,
    /// List of test vectors.
    pub vectors: Vec<TestVector>,
}

/// A single test vector.
#[derive(Debug, Deserialize)]
pub struct TestVector {
    /// Unique identifier for the test.
    pub id: String,
    /// Operation to test: `decode` or `roundtrip`.
    pub op: String,
    /// Input document.
    pub input: String,
    /// Decode with the `all_unicode` flag.
    #[serde(default)]
    pub all_unicode: bool,
    /// Override the nesting limit.
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Expected result (success or error).
    pub expected: Expected,
}

/// Expected outcome of a vector.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expected {
    /// Decoding succeeds and the value encodes to exactly this text.
    Ok(String),
    /// Decoding fails.
    Err(ExpectedError),
}

/// Expected decode failure.
#[derive(Debug, Deserialize)]
pub struct ExpectedError {
    /// [`ErrorKind`] name, e.g. `"MissingColon"`.
    pub kind: String,
    /// Byte offset, when the vector pins it.
    #[serde(default)]
    pub offset: Option<usize>,
}

/// Result of running a single test vector.
#[derive(Debug)]
pub enum TestResult {
    /// Test passed.
    Pass,
    /// Test failed with mismatch.
    Fail {
        /// Expected result from the corpus.
        expected: String,
        /// Actual result from the codec.
        actual: String,
    },
    /// Test was skipped (operation not implemented).
    Skip {
        /// Reason for skipping.
        reason: String,
    },
    /// Test errored during execution.
    Error {
        /// Error message.
        message: String,
    },
}

impl TestResult {
    /// Returns true if this is a passing result.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns true if this is a failing result.
    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }
}

/// Results from running the corpus.
#[derive(Debug, Default)]
pub struct CorpusResults {
    /// Number of tests that passed.
    pub passed: usize,
    /// Number of tests that failed.
    pub failed: usize,
    /// Number of tests that were skipped.
    pub skipped: usize,
    /// Number of tests that errored.
    pub errors: usize,
    /// Detailed results for each test.
    pub details: Vec<(String, TestResult)>,
}

impl CorpusResults {
    /// Create a new empty results container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a test result.
    pub fn record(&mut self, id: &str, result: TestResult) {
        match &result {
            TestResult::Pass => self.passed += 1,
            TestResult::Fail { .. } => self.failed += 1,
            TestResult::Skip { .. } => self.skipped += 1,
            TestResult::Error { .. } => self.errors += 1,
        }
        self.details.push((id.to_string(), result));
    }

    /// Get total number of tests run.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped + self.errors
    }

    /// Returns true if all tests passed (no failures or errors).
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }

    /// Get a summary string of the results.
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} skipped, {} errors (total: {})",
            self.passed,
            self.failed,
            self.skipped,
            self.errors,
            self.total()
        )
    }

    /// Get failures only.
    pub fn failures(&self) -> Vec<&(String, TestResult)> {
        self.details
            .iter()
            .filter(|(_, r)| matches!(r, TestResult::Fail { .. }))
            .collect()
    }

    /// Get errors only.
    pub fn error_details(&self) -> Vec<&(String, TestResult)> {
        self.details
            .iter()
            .filter(|(_, r)| matches!(r, TestResult::Error { .. }))
            .collect()
    }
}

/// Corpus runner that executes test vectors.
pub struct CorpusRunner {
    corpus: Corpus,
}

impl CorpusRunner {
    /// Load corpus from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> ConformanceResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ConformanceError::IoError(format!("Failed to read corpus file: {}", e))
        })?;
        Self::from_json(&content)
    }

    /// Parse a corpus from JSON text.
    pub fn from_json(content: &str) -> ConformanceResult<Self> {
        let corpus: Corpus = serde_json::from_str(content)
            .map_err(|e| ConformanceError::CorpusParseError(e.to_string()))?;
        Ok(Self { corpus })
    }

    /// Get the corpus manifest.
    pub fn manifest(&self) -> &CorpusManifest {
        &self.corpus.manifest
    }

    /// Get the number of test vectors.
    pub fn vector_count(&self) -> usize {
        self.corpus.vectors.len()
    }

    /// Run all test vectors and return results.
    pub fn run_all(&self) -> CorpusResults {
        let mut results = CorpusResults::new();

        for vector in &self.corpus.vectors {
            let result = self.run_vector(vector);
            results.record(&vector.id, result);
        }

        results
    }

    /// Run a single test vector.
    fn run_vector(&self, vector: &TestVector) -> TestResult {
        match vector.op.as_str() {
            "decode" => self.run_decode(vector),
            "roundtrip" => self.run_roundtrip(vector),
            _ => TestResult::Skip {
                reason: format!("Unknown operation: {}", vector.op),
            },
        }
    }

    fn options(vector: &TestVector) -> DecodeOptions {
        let mut limits = Limits::standard();
        if let Some(depth) = vector.max_depth {
            limits = limits.with_max_depth(depth);
        }
        DecodeOptions::new()
            .with_all_unicode(vector.all_unicode)
            .with_limits(limits)
    }

    /// Decode, then compare the encoded text or the error.
    fn run_decode(&self, vector: &TestVector) -> TestResult {
        let result = decode_with_options(&vector.input, &Self::options(vector));
        match (&vector.expected, result) {
            (Expected::Ok(expected), Ok(value)) => compare_text(expected, &value),
            (Expected::Ok(expected), Err(e)) => TestResult::Fail {
                expected: format!("ok: {}", expected),
                actual: format!("err: {}", describe(&e)),
            },
            (Expected::Err(expected), Ok(value)) => TestResult::Fail {
                expected: format!("err: {}", expected.kind),
                actual: format!("ok: {}", encode(&value).unwrap_or_default()),
            },
            (Expected::Err(expected), Err(e)) => compare_error(expected, &e),
        }
    }

    /// Decode, encode and decode again; both values must be equal and the
    /// text must match.
    fn run_roundtrip(&self, vector: &TestVector) -> TestResult {
        let Expected::Ok(expected) = &vector.expected else {
            return TestResult::Error {
                message: "Expected 'ok' result for roundtrip".to_string(),
            };
        };
        let options = Self::options(vector);
        let first = match decode_with_options(&vector.input, &options) {
            Ok(v) => v,
            Err(e) => {
                return TestResult::Fail {
                    expected: format!("ok: {}", expected),
                    actual: format!("err: {}", describe(&e)),
                }
            }
        };
        let text = match encode(&first) {
            Ok(t) => t,
            Err(e) => {
                return TestResult::Error {
                    message: format!("encode failed: {}", e),
                }
            }
        };
        let second = match decode_with_options(&text, &options) {
            Ok(v) => v,
            Err(e) => {
                return TestResult::Fail {
                    expected: format!("decodable output {}", text),
                    actual: format!("err: {}", describe(&e)),
                }
            }
        };
        // floats compare by bits, so NaN survives this check
        if first != second {
            return TestResult::Fail {
                expected: format!("{:?}", first),
                actual: format!("{:?}", second),
            };
        }
        compare_text(expected, &second)
    }
}

fn describe(e: &DecodeError) -> String {
    format!("{} at {}", e.kind(), e.offset())
}

fn compare_text(expected: &str, value: &Value) -> TestResult {
    match encode(value) {
        Ok(actual) if actual == expected => TestResult::Pass,
        Ok(actual) => TestResult::Fail {
            expected: expected.to_string(),
            actual,
        },
        Err(e) => TestResult::Error {
            message: format!("encode failed: {}", e),
        },
    }
}

fn compare_error(expected: &ExpectedError, actual: &DecodeError) -> TestResult {
    let Some(kind) = ErrorKind::from_name(&expected.kind) else {
        return TestResult::Error {
            message: format!("Unknown error kind: {}", expected.kind),
        };
    };
    let offset_matches = expected.offset.map_or(true, |o| o == actual.offset());
    if actual.kind() == kind && offset_matches {
        TestResult::Pass
    } else {
        let expected_offset = expected
            .offset
            .map_or_else(|| "any".to_string(), |o| o.to_string());
        TestResult::Fail {
            expected: format!("{} at {}", expected.kind, expected_offset),
            actual: describe(actual),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "manifest": {"format_version": "1", "version": "test"},
        "vectors": [
            {"id": "ok", "op": "decode", "input": "[1,2]", "expected": {"ok": "[1, 2]"}},
            {"id": "err", "op": "decode", "input": "[1,", "expected": {"err": {"kind": "UnterminatedArray", "offset": 0}}},
            {"id": "any-offset", "op": "decode", "input": "@", "expected": {"err": {"kind": "UnexpectedToken"}}},
            {"id": "rt", "op": "roundtrip", "input": " {\"a\" : NaN} ", "expected": {"ok": "{\"a\": NaN}"}},
            {"id": "depth", "op": "decode", "input": "[[1]]", "max_depth": 1, "expected": {"err": {"kind": "MaxDepthExceeded", "offset": 1}}},
            {"id": "wrong", "op": "decode", "input": "1.0", "expected": {"ok": "1"}},
            {"id": "unknown", "op": "sort", "input": "[]", "expected": {"ok": "[]"}}
        ]
    }"#;

    #[test]
    fn test_run_sample_corpus() {
        let runner = CorpusRunner::from_json(SAMPLE).unwrap();
        assert_eq!(runner.vector_count(), 7);
        assert_eq!(runner.manifest().version, "test");

        let results = runner.run_all();
        assert_eq!(results.passed, 5, "{:?}", results.details);
        assert_eq!(results.failed, 1);
        assert_eq!(results.skipped, 1);
        assert!(!results.all_passed());
        assert_eq!(results.failures()[0].0, "wrong");
    }

    #[test]
    fn test_unknown_kind_is_error() {
        let json = r#"{
            "manifest": {"format_version": "1", "version": "test"},
            "vectors": [{"id": "x", "op": "decode", "input": "[", "expected": {"err": {"kind": "Bogus"}}}]
        }"#;
        let results = CorpusRunner::from_json(json).unwrap().run_all();
        assert_eq!(results.errors, 1);
        assert_eq!(results.error_details().len(), 1);
    }

    #[test]
    fn test_invalid_corpus() {
        assert!(matches!(
            CorpusRunner::from_json("{}"),
            Err(ConformanceError::CorpusParseError(_))
        ));
    }

    #[test]
    fn test_corpus_results() {
        let mut results = CorpusResults::new();
        results.record("test1", TestResult::Pass);
        results.record("test2", TestResult::Pass);
        results.record(
            "test3",
            TestResult::Fail {
                expected: "a".to_string(),
                actual: "b".to_string(),
            },
        );
        results.record(
            "test4",
            TestResult::Skip {
                reason: "not implemented".to_string(),
            },
        );

        assert_eq!(results.passed, 2);
        assert_eq!(results.failed, 1);
        assert_eq!(results.skipped, 1);
        assert_eq!(results.total(), 4);
        assert!(!results.all_passed());
    }
}
