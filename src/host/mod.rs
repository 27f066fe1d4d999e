//! C# host: turns source files into method descriptors for the rule and
//! renders fixes back into source text.
//!
//! - `csharp`: tree-sitter parsing and per-file fact extraction
//! - `framework`: attribute base tables for ASP.NET Core and MVC 5
//! - `index`: compilation-wide type ancestry
//! - `edit`: fix location and text edits

mod csharp;
mod edit;
mod framework;
mod index;

pub use csharp::{
    extract_facts, method_node_at, normalize_type_name, parse_file, parse_source, DeclaredType,
    FileFacts, ParsedFile, TypeKind,
};
pub use edit::{apply_edits, locate_method, plan_fix, TextEdit};
pub use framework::{attribute_class_candidates, Framework};
pub use index::TypeIndex;

use thiserror::Error;

/// Errors that can occur while reading or parsing a source file.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("failed to parse {0}")]
    Parse(String),
    #[error("failed to load C# grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
