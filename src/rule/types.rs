//! Core types shared by the rule evaluator, the fix engine and the host.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a diagnostic. The rule reports at warning level only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Source location of a method identifier.
///
/// Lines and columns are 1-indexed; byte offsets are 0-indexed with an
/// exclusive end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Declared accessibility of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    NonPublic,
}

/// Method kind. Constructors, accessors, operators, destructors and explicit
/// interface implementations are all `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    Ordinary,
    Other,
}

/// An annotation (attribute) attached to a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationDescriptor {
    /// Annotation name as written, without qualification (e.g. "HttpGet").
    pub name: String,
    /// Base types of the annotation class, nearest first. Empty when the
    /// class could not be resolved.
    #[serde(default)]
    pub ancestry: Vec<String>,
}

impl AnnotationDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ancestry: Vec::new(),
        }
    }

    pub fn with_ancestry<I, S>(mut self, ancestry: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ancestry = ancestry.into_iter().map(Into::into).collect();
        self
    }

    /// Immediate base type of the annotation class.
    pub fn base_type_name(&self) -> Option<&str> {
        self.ancestry.first().map(String::as_str)
    }
}

impl fmt::Display for AnnotationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One syntactic annotation group, e.g. `[HandleError, Authorize]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationList {
    pub annotations: Vec<AnnotationDescriptor>,
}

impl AnnotationList {
    pub fn single(annotation: AnnotationDescriptor) -> Self {
        Self {
            annotations: vec![annotation],
        }
    }
}

impl fmt::Display for AnnotationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.annotations.iter().map(|a| a.name.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Semantic view of one method, produced by the host for each analysis pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub visibility: Visibility,
    pub kind: MethodKind,
    /// Base types of the containing type, nearest first.
    #[serde(default)]
    pub containing_ancestry: Vec<String>,
    #[serde(default)]
    pub annotation_lists: Vec<AnnotationList>,
    /// Span of the method identifier.
    pub location: Location,
}

impl MethodDescriptor {
    /// All attached annotations in source order, across groups.
    pub fn annotations(&self) -> impl Iterator<Item = &AnnotationDescriptor> {
        self.annotation_lists.iter().flat_map(|l| l.annotations.iter())
    }
}

/// A reported rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule_id: String,
    pub method_name: String,
    pub message: String,
    pub location: Location,
    pub severity: Severity,
}

/// A diagnostic hidden by a `#pragma warning disable` region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressedDiagnostic {
    pub diagnostic: Diagnostic,
    /// Line of the pragma that opened the region.
    pub pragma_line: usize,
}

/// Results of a detection pass over a set of files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    pub diagnostics: Vec<Diagnostic>,
    #[serde(default)]
    pub suppressed: Vec<SuppressedDiagnostic>,
    /// Number of files scanned
    pub scanned: usize,
}

impl DetectionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: DetectionResult) {
        self.diagnostics.extend(other.diagnostics);
        self.suppressed.extend(other.suppressed);
        self.scanned += other.scanned;
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn suppressed_count(&self) -> usize {
        self.suppressed.len()
    }

    /// Sort diagnostics by file, line, then column.
    pub fn sort(&mut self) {
        let by_position = |l: &Location| (l.file.clone(), l.line, l.column);
        self.diagnostics.sort_by_key(|d| by_position(&d.location));
        self.suppressed
            .sort_by_key(|s| by_position(&s.diagnostic.location));
    }
}
