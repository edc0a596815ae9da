//! Reproduction bundle for debugging conformance mismatches.

use std::path::Path;

use super::runner::CodecOutput;
use super::{first_diff, ConformanceError, ConformanceResult};
use crate::encode;
use crate::value::{Object, Value};

/// A bundle of information for reproducing a conformance mismatch.
#[derive(Debug, Clone)]
pub struct ReproBundle {
    /// Test name that failed.
    pub test_name: String,
    /// Input document, lossily decoded for display.
    pub input: String,
    /// Outcome from this crate.
    pub ours: CodecOutput,
    /// Outcome from the reference codec.
    pub reference: CodecOutput,
}

impl ReproBundle {
    /// Create a new repro bundle.
    pub fn new(test_name: String, input: &[u8], ours: CodecOutput, reference: CodecOutput) -> Self {
        Self {
            test_name,
            input: String::from_utf8_lossy(input).into_owned(),
            ours,
            reference,
        }
    }

    /// First byte where the two outputs differ.
    pub fn first_diff(&self) -> Option<usize> {
        first_diff(
            self.ours.as_string().as_bytes(),
            self.reference.as_string().as_bytes(),
        )
    }

    /// Format as a human-readable report.
    pub fn to_report(&self) -> String {
        let diff = match self.first_diff() {
            Some(i) => i.to_string(),
            None => "none".to_string(),
        };
        format!(
            r#"=== Conformance Mismatch Report ===
Test: {}
Input: {}

cjson:      {:?}
serde_json: {:?}
First differing byte: {}

To reproduce:
  cjson diff <file containing the input>
"#,
            self.test_name, self.input, self.ours, self.reference, diff,
        )
    }

    /// Save the report to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        std::fs::write(path, self.to_report())
    }

    /// Format as JSON for machine parsing.
    pub fn to_json(&self) -> ConformanceResult<String> {
        let bundle = Object::new();
        bundle.insert("test_name", Value::from(self.test_name.as_str()));
        bundle.insert("input", Value::from(self.input.as_str()));
        bundle.insert("ours", output_value(&self.ours));
        bundle.insert("reference", output_value(&self.reference));
        bundle.insert(
            "first_diff",
            self.first_diff().map_or(Value::Null, Value::from),
        );
        encode(&Value::Object(bundle)).map_err(|e| ConformanceError::CodecError(e.to_string()))
    }
}

fn output_value(output: &CodecOutput) -> Value {
    let envelope = Object::new();
    match output {
        CodecOutput::Ok(text) => envelope.insert("ok", Value::from(text.as_str())),
        CodecOutput::Err(message) => envelope.insert("err", Value::from(message.as_str())),
    };
    Value::Object(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> ReproBundle {
        ReproBundle::new(
            "test_basic".to_string(),
            b"[1.0]",
            CodecOutput::Ok("[1.0]".to_string()),
            CodecOutput::Ok("[1]".to_string()),
        )
    }

    #[test]
    fn test_repro_bundle_report() {
        let report = bundle().to_report();
        assert!(report.contains("test_basic"));
        assert!(report.contains("Input: [1.0]"));
        assert!(report.contains("First differing byte: 2"));
    }

    #[test]
    fn test_repro_bundle_json() {
        let json = bundle().to_json().unwrap();
        assert_eq!(
            json,
            r#"{"test_name": "test_basic", "input": "[1.0]", "ours": {"ok": "[1.0]"}, "reference": {"ok": "[1]"}, "first_diff": 2}"#
        );
        let value = crate::decode(&json).unwrap();
        assert_eq!(value.get("first_diff"), Some(Value::from(2)));
    }

    #[test]
    fn test_repro_bundle_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repro.txt");
        bundle().save(&path).unwrap();
        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.starts_with("=== Conformance Mismatch Report ==="));
    }
}
