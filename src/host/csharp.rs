//! C# front end using tree-sitter.
//!
//! Extracts using directives, declared classes and method descriptors from
//! one source file. Attribute ancestry is left empty here and filled in by
//! `TypeIndex`, which sees every scanned file.

use std::path::Path;

use tree_sitter::{Language, Node, Parser, Tree};

use super::HostError;
use crate::rule::{
    AnnotationDescriptor, AnnotationList, Location, MethodDescriptor, MethodKind, Visibility,
};

/// Holds a parsed tree and the source it was parsed from.
pub struct ParsedFile {
    pub tree: Tree,
    pub source: String,
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Location of `node`, with columns counted in characters.
    pub fn location_of(&self, node: Node) -> Location {
        let start = node.start_position();
        let end = node.end_position();
        Location {
            file: self.path.clone(),
            line: start.row + 1,
            column: self.char_column(node.start_byte(), start.column),
            end_line: end.row + 1,
            end_column: self.char_column(node.end_byte(), end.column),
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
        }
    }

    fn char_column(&self, byte: usize, byte_column: usize) -> usize {
        let line_start = byte.saturating_sub(byte_column);
        self.source
            .get(line_start..byte)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(byte_column)
            + 1
    }
}

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Record,
    Struct,
    Interface,
}

impl TypeKind {
    fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(TypeKind::Class),
            "record_declaration" => Some(TypeKind::Record),
            "struct_declaration" | "record_struct_declaration" => Some(TypeKind::Struct),
            "interface_declaration" => Some(TypeKind::Interface),
            _ => None,
        }
    }

    /// Whether the first base-list entry is a base class.
    fn has_base_class(&self) -> bool {
        matches!(self, TypeKind::Class | TypeKind::Record)
    }
}

/// A type declared in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredType {
    pub name: String,
    pub kind: TypeKind,
    /// First base-list entry, unqualified. `None` for structs, interfaces
    /// and classes without a base list. It may name an interface, which
    /// only `TypeIndex` can tell.
    pub base: Option<String>,
    pub line: usize,
}

/// Facts extracted from one C# file.
#[derive(Debug, Clone, Default)]
pub struct FileFacts {
    pub path: String,
    /// Namespaces imported with `using`.
    pub usings: Vec<String>,
    pub types: Vec<DeclaredType>,
    /// Methods with containing base and annotation names filled in, but no
    /// attribute ancestry yet.
    pub methods: Vec<MethodDescriptor>,
    /// Name of the class or record declaring each entry of `methods`.
    pub containers: Vec<Option<String>>,
}

fn language() -> Language {
    tree_sitter_c_sharp::LANGUAGE.into()
}

/// Parse C# source. Syntax errors still produce a tree.
pub fn parse_source(path: &str, source: &str) -> Result<ParsedFile, HostError> {
    let mut parser = Parser::new();
    parser.set_language(&language())?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| HostError::Parse(path.to_string()))?;

    if tree.root_node().has_error() {
        tracing::debug!(file = path, "source contains syntax errors");
    }

    Ok(ParsedFile {
        tree,
        source: source.to_string(),
        path: path.to_string(),
    })
}

/// Read and parse a C# file from disk.
pub fn parse_file(path: &Path) -> Result<ParsedFile, HostError> {
    let source = std::fs::read_to_string(path)?;
    parse_source(&path.to_string_lossy(), &source)
}

/// Strip qualification and generic arguments from a type name.
///
/// `global::Microsoft.AspNetCore.Mvc.Controller` becomes `Controller`,
/// `ControllerBase<TModel>` becomes `ControllerBase`.
pub fn normalize_type_name(text: &str) -> String {
    let without_generics = text.split('<').next().unwrap_or(text);
    let without_args = without_generics.split('(').next().unwrap_or(without_generics);
    without_args
        .rsplit(|c| c == '.' || c == ':')
        .next()
        .unwrap_or(without_args)
        .trim()
        .trim_end_matches('?')
        .to_string()
}

/// Extract usings, declared types and methods from a parsed file.
pub fn extract_facts(parsed: &ParsedFile) -> FileFacts {
    let mut facts = FileFacts {
        path: parsed.path.clone(),
        ..Default::default()
    };
    walk(parsed, parsed.tree.root_node(), None, &mut facts);
    facts
}

/// Containing type of the nodes being walked.
struct Scope {
    kind: TypeKind,
    name: Option<String>,
    base: Option<String>,
}

fn walk(parsed: &ParsedFile, node: Node, scope: Option<&Scope>, facts: &mut FileFacts) {
    let kind = node.kind();

    if kind == "using_directive" {
        if let Some(ns) = using_namespace(parsed, node) {
            facts.usings.push(ns);
        }
        return;
    }

    if let Some(type_kind) = TypeKind::from_node_kind(kind) {
        let declared = declared_type(parsed, node, type_kind);
        let inner = Scope {
            kind: type_kind,
            name: declared.as_ref().map(|t| t.name.clone()),
            base: declared.as_ref().and_then(|t| t.base.clone()),
        };
        if let Some(t) = declared {
            facts.types.push(t);
        }
        for child in node.children(&mut node.walk()) {
            walk(parsed, child, Some(&inner), facts);
        }
        return;
    }

    if kind == "method_declaration" {
        if let Some(scope) = scope {
            if let Some(method) = method_descriptor(parsed, node, scope) {
                facts.methods.push(method);
                facts.containers.push(match scope.kind {
                    TypeKind::Class | TypeKind::Record => scope.name.clone(),
                    TypeKind::Struct | TypeKind::Interface => None,
                });
            }
        }
        return;
    }

    for child in node.children(&mut node.walk()) {
        walk(parsed, child, scope, facts);
    }
}

fn using_namespace(parsed: &ParsedFile, node: Node) -> Option<String> {
    // `using A = B.C;` names the alias first; the target is the last name.
    node.named_children(&mut node.walk())
        .filter(|c| matches!(c.kind(), "qualified_name" | "identifier"))
        .last()
        .map(|c| parsed.node_text(c).split_whitespace().collect::<String>())
}

fn declared_type(parsed: &ParsedFile, node: Node, kind: TypeKind) -> Option<DeclaredType> {
    let name = node.child_by_field_name("name")?;
    let base = if kind.has_base_class() {
        first_base(parsed, node)
    } else {
        None
    };
    Some(DeclaredType {
        name: parsed.node_text(name).to_string(),
        kind,
        base,
        line: name.start_position().row + 1,
    })
}

fn first_base(parsed: &ParsedFile, node: Node) -> Option<String> {
    let base_list = node
        .children(&mut node.walk())
        .find(|c| c.kind() == "base_list")?;
    let first = base_list.named_children(&mut base_list.walk()).next()?;
    let name = normalize_type_name(parsed.node_text(first));
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn method_descriptor(parsed: &ParsedFile, node: Node, scope: &Scope) -> Option<MethodDescriptor> {
    let name_node = node.child_by_field_name("name")?;

    let mut is_public = false;
    let mut explicit_interface = false;
    let mut annotation_lists = Vec::new();

    for child in node.children(&mut node.walk()) {
        match child.kind() {
            "modifier" | "public" => {
                if parsed.node_text(child) == "public" {
                    is_public = true;
                }
            }
            "explicit_interface_specifier" => explicit_interface = true,
            "attribute_list" => {
                if let Some(list) = annotation_list(parsed, child) {
                    annotation_lists.push(list);
                }
            }
            _ => {}
        }
    }

    Some(MethodDescriptor {
        name: parsed.node_text(name_node).to_string(),
        visibility: if is_public {
            Visibility::Public
        } else {
            Visibility::NonPublic
        },
        kind: if explicit_interface {
            MethodKind::Other
        } else {
            MethodKind::Ordinary
        },
        containing_ancestry: match scope.kind {
            TypeKind::Class | TypeKind::Record => scope.base.iter().cloned().collect(),
            TypeKind::Struct | TypeKind::Interface => Vec::new(),
        },
        annotation_lists,
        location: parsed.location_of(name_node),
    })
}

/// Attribute names in one `[...]` list. Lists targeting something other
/// than the method itself (`[return: X]`, `[param: X]`) are skipped.
fn annotation_list(parsed: &ParsedFile, node: Node) -> Option<AnnotationList> {
    let mut annotations = Vec::new();

    for child in node.named_children(&mut node.walk()) {
        match child.kind() {
            "attribute_target_specifier" => {
                let target = parsed.node_text(child).trim_end_matches(':').trim();
                if target != "method" {
                    return None;
                }
            }
            "attribute" => {
                let name = child
                    .child_by_field_name("name")
                    .or_else(|| child.named_child(0))
                    .map(|n| normalize_type_name(parsed.node_text(n)))
                    .unwrap_or_default();
                if !name.is_empty() {
                    annotations.push(AnnotationDescriptor::new(name));
                }
            }
            _ => {}
        }
    }

    Some(AnnotationList { annotations })
}

/// The `method_declaration` node whose name identifier starts at
/// `start_byte`, if any.
pub fn method_node_at(parsed: &ParsedFile, start_byte: usize) -> Option<Node<'_>> {
    let mut node = parsed
        .tree
        .root_node()
        .descendant_for_byte_range(start_byte, start_byte)?;
    loop {
        if node.kind() == "method_declaration" {
            let name = node.child_by_field_name("name")?;
            return (name.start_byte() == start_byte).then_some(node);
        }
        node = node.parent()?;
    }
}
