//! cjson CLI.
//!
//! Decodes JSON from a file or stdin and prints the re-encoded document, or a
//! JSON error envelope naming the failure kind and byte offset.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use cjson::conformance::{CorpusRunner, DiffResult, DiffTestHarness, TestResult};
use cjson::{decode_with_options, encode, DecodeOptions, Error, Limits, Object, Value};
use tracing_subscriber::EnvFilter;

const EXIT_IO: u8 = 2;

#[derive(Parser)]
#[command(name = "cjson")]
#[command(about = "Fast JSON codec with exact integers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a document and print it re-encoded
    Decode {
        #[command(flatten)]
        input: InputArgs,

        /// Mark every decoded string as unicode
        #[arg(long)]
        all_unicode: bool,
    },

    /// Validate a document and print the type of its root value
    Check {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Compare decoding against serde_json
    Diff {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Run a corpus of test vectors
    Corpus {
        /// Path to the corpus JSON file
        path: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct InputArgs {
    /// Input file (stdin when omitted)
    file: Option<PathBuf>,

    /// Maximum container nesting depth
    #[arg(long)]
    max_depth: Option<usize>,
}

impl InputArgs {
    fn options(&self) -> DecodeOptions {
        let mut limits = Limits::standard();
        if let Some(depth) = self.max_depth {
            limits = limits.with_max_depth(depth);
        }
        DecodeOptions::new().with_limits(limits)
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_input(file: Option<&Path>) -> std::io::Result<Vec<u8>> {
    match file {
        Some(path) => std::fs::read(path),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// `{"err": {"code": .., "kind": .., "message": .., "offset": ..}}`
fn error_envelope(error: &Error) -> Value {
    let detail = Object::new();
    detail.insert("code", Value::from(error.kind().code()));
    detail.insert("kind", Value::from(error.kind().name()));
    match error {
        Error::Decode(e) => {
            detail.insert("message", Value::from(e.message()));
            detail.insert("offset", Value::from(e.offset()));
        }
        Error::Encode(e) => {
            detail.insert("message", Value::from(e.message()));
            detail.insert("subject", Value::from(e.subject()));
        }
    }
    let envelope = Object::new();
    envelope.insert("err", Value::Object(detail));
    Value::Object(envelope)
}

fn ok_envelope(fields: Vec<(&str, Value)>) -> Value {
    let envelope = Object::new();
    envelope.insert("ok", Value::Object(fields.into_iter().collect()));
    Value::Object(envelope)
}

fn print_value(value: &Value) -> ExitCode {
    match encode(value) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&Error::from(e)),
    }
}

fn fail(error: &Error) -> ExitCode {
    // the envelope holds only strings and integers
    match encode(&error_envelope(error)) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("error: {}", e),
    }
    ExitCode::FAILURE
}

fn io_failure(what: &str, e: &std::io::Error) -> ExitCode {
    eprintln!("error: failed to read {}: {}", what, e);
    ExitCode::from(EXIT_IO)
}

fn run_decode(input: &InputArgs, all_unicode: bool) -> ExitCode {
    let bytes = match read_input(input.file.as_deref()) {
        Ok(b) => b,
        Err(e) => return io_failure("input", &e),
    };
    let options = input.options().with_all_unicode(all_unicode);
    match decode_with_options(&bytes, &options) {
        Ok(value) => print_value(&value),
        Err(e) => fail(&Error::from(e)),
    }
}

fn run_check(input: &InputArgs) -> ExitCode {
    let bytes = match read_input(input.file.as_deref()) {
        Ok(b) => b,
        Err(e) => return io_failure("input", &e),
    };
    match decode_with_options(&bytes, &input.options()) {
        Ok(value) => print_value(&ok_envelope(vec![("type", Value::from(value.type_name()))])),
        Err(e) => fail(&Error::from(e)),
    }
}

fn run_diff(file: Option<&Path>) -> ExitCode {
    let bytes = match read_input(file) {
        Ok(b) => b,
        Err(e) => return io_failure("input", &e),
    };
    let name = file.map_or_else(|| "stdin".to_string(), |p| p.display().to_string());
    let harness = DiffTestHarness::new();
    match harness.compare(&name, &bytes) {
        Ok(DiffResult::Agree { value }) => print_value(&ok_envelope(vec![
            ("outcome", Value::from("agree")),
            ("value", Value::from(value)),
        ])),
        Ok(DiffResult::BothRejected { ours, reference }) => print_value(&ok_envelope(vec![
            ("outcome", Value::from("both_rejected")),
            ("cjson", Value::from(ours)),
            ("serde_json", Value::from(reference)),
        ])),
        Ok(DiffResult::OursOnly { value, extension }) => print_value(&ok_envelope(vec![
            ("outcome", Value::from("extension")),
            ("extension", Value::from(extension)),
            ("value", Value::from(value)),
        ])),
        Ok(DiffResult::Mismatch { repro, .. }) => {
            print!("{}", repro.to_report());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_corpus(path: &Path) -> ExitCode {
    let runner = match CorpusRunner::load(path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_IO);
        }
    };
    let results = runner.run_all();
    for (id, result) in &results.details {
        match result {
            TestResult::Fail { expected, actual } => {
                println!("FAIL {}: expected {}, got {}", id, expected, actual);
            }
            TestResult::Error { message } => println!("ERROR {}: {}", id, message),
            TestResult::Skip { reason } => println!("SKIP {}: {}", id, reason),
            TestResult::Pass => {}
        }
    }
    println!("{}", results.summary());
    if results.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Decode { input, all_unicode }) => run_decode(&input, all_unicode),
        Some(Commands::Check { input }) => run_check(&input),
        Some(Commands::Diff { file }) => run_diff(file.as_deref()),
        Some(Commands::Corpus { path }) => run_corpus(&path),
        Some(Commands::Version) => {
            println!("cjson v{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        None => {
            println!("cjson v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
            ExitCode::SUCCESS
        }
    }
}
