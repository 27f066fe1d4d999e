//! verbcheck - HTTP verb analyzer for ASP.NET controllers.
//!
//! Flags public controller methods that declare no HTTP verb attribute and
//! offers fixes that add `[HttpGet]` or `[HttpPost]`.
//!
//! # Architecture
//!
//! - `rule`: the rule itself, independent of any syntax tree
//! - `host`: tree-sitter C# front end and source edits
//! - `runner`: orchestrates parsing, evaluation, suppression and fixes
//! - `config`: YAML config schema
//! - `report`: output formatting (pretty, JSON, SARIF)

pub mod cli;
pub mod config;
pub mod host;
pub mod report;
pub mod rule;
pub mod runner;

pub use config::Config;
pub use host::{HostError, TypeIndex};
pub use rule::{
    DetectionResult, Diagnostic, FixEngine, FixError, FixResult, MethodDescriptor, RuleEvaluator,
    VerbChoice,
};
pub use runner::{FixOutcome, Runner};
