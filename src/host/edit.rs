//! Maps diagnostics back to method declarations and renders fixes as text
//! edits.

use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use super::csharp::{method_node_at, ParsedFile};
use crate::rule::{Diagnostic, FixEngine, FixError, MethodDescriptor, VerbChoice};

/// Replace `start_byte..end_byte` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub start_byte: usize,
    pub end_byte: usize,
    pub replacement: String,
}

impl TextEdit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            start_byte: at,
            end_byte: at,
            replacement: text.into(),
        }
    }
}

/// Find the method declaration a diagnostic points at in the current tree.
///
/// Fails with `NoApplicableTarget` when the tree has changed since the
/// diagnostic was produced.
pub fn locate_method<'a>(
    parsed: &'a ParsedFile,
    diagnostic: &Diagnostic,
) -> Result<Node<'a>, FixError> {
    if diagnostic.location.file != parsed.path {
        return Err(FixError::no_target(diagnostic));
    }

    let node = method_node_at(parsed, diagnostic.location.start_byte)
        .ok_or_else(|| FixError::no_target(diagnostic))?;

    let name = node
        .child_by_field_name("name")
        .map(|n| parsed.node_text(n))
        .unwrap_or("");
    if name != diagnostic.method_name {
        return Err(FixError::no_target(diagnostic));
    }

    Ok(node)
}

/// Leading whitespace of the line containing `byte`.
fn line_indent(source: &str, byte: usize) -> &str {
    let line_start = source[..byte].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = &source[line_start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Line ending of the line containing `byte`, or of the first line when
/// that line has none.
fn line_ending(source: &str, byte: usize) -> &'static str {
    let end = source[byte..]
        .find('\n')
        .map(|i| byte + i)
        .or_else(|| source.find('\n'));
    match end {
        Some(i) if source[..i].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

/// Plan the edit that applies `verb` to the method a diagnostic flags.
///
/// `methods` are the resolved descriptors for the same tree. The new
/// attribute list goes on its own line after the method's existing lists,
/// indented like the declaration and ended like the file's lines.
pub fn plan_fix(
    parsed: &ParsedFile,
    methods: &[MethodDescriptor],
    diagnostic: &Diagnostic,
    verb: VerbChoice,
    engine: &FixEngine,
) -> Result<TextEdit, FixError> {
    let node = locate_method(parsed, diagnostic)?;
    let method = methods
        .iter()
        .find(|m| m.location.start_byte == diagnostic.location.start_byte)
        .ok_or_else(|| FixError::no_target(diagnostic))?;

    let result = engine.apply_for(diagnostic, method, verb)?;
    let appended = result
        .appended()
        .ok_or_else(|| FixError::no_target(diagnostic))?;

    let insert_at = node
        .children(&mut node.walk())
        .find(|c| c.kind() != "attribute_list")
        .map(|c| c.start_byte())
        .unwrap_or_else(|| node.start_byte());
    let indent = line_indent(&parsed.source, node.start_byte());
    let newline = line_ending(&parsed.source, insert_at);

    Ok(TextEdit::insert(insert_at, format!("{}{}{}", appended, newline, indent)))
}

/// Apply edits to `source`, back to front so earlier offsets stay valid.
/// Edits that do not fall on character boundaries are skipped.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> String {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.start_byte.cmp(&a.start_byte));

    let mut out = source.to_string();
    for edit in ordered {
        let valid = edit.start_byte <= edit.end_byte
            && edit.end_byte <= out.len()
            && out.is_char_boundary(edit.start_byte)
            && out.is_char_boundary(edit.end_byte);
        if !valid {
            tracing::warn!(
                start = edit.start_byte,
                end = edit.end_byte,
                "skipping edit outside source bounds"
            );
            continue;
        }
        out.replace_range(edit.start_byte..edit.end_byte, &edit.replacement);
    }
    out
}
