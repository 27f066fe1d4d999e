//! Compilation-wide index of type ancestry.
//!
//! Resolves the base chain of attribute classes and containing types from,
//! in order: classes declared in any scanned file, configured
//! `attribute_bases`, and the framework tables.

use std::collections::{HashMap, HashSet};

use super::csharp::{FileFacts, TypeKind};
use super::framework::{attribute_class_candidates, Framework};
use crate::rule::MethodDescriptor;

/// Guards against runaway chains in malformed sources.
const MAX_ANCESTRY_DEPTH: usize = 16;

#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    /// Declared class name -> first base-list entry (None when no part of
    /// the class has a base list).
    declared: HashMap<String, Option<String>>,
    /// Interfaces declared in any scanned file.
    interfaces: HashSet<String>,
    configured: HashMap<String, String>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add configured attribute bases (class name -> immediate base).
    pub fn with_configured(mut self, bases: &HashMap<String, String>) -> Self {
        for (class, base) in bases {
            self.configured.insert(class.clone(), base.clone());
        }
        self
    }

    /// Record the types declared in a file. Parts of a partial class share
    /// one entry; the first part with a base list sets its base.
    pub fn add_file(&mut self, facts: &FileFacts) {
        for t in &facts.types {
            match t.kind {
                TypeKind::Class | TypeKind::Record => {
                    let base = self.declared.entry(t.name.clone()).or_insert(None);
                    if base.is_none() {
                        *base = t.base.clone();
                    }
                }
                TypeKind::Interface => {
                    self.interfaces.insert(t.name.clone());
                }
                TypeKind::Struct => {}
            }
        }
    }

    /// Number of declared classes indexed.
    pub(crate) fn len(&self) -> usize {
        self.declared.len()
    }

    /// `name` as a base class. A base-list entry naming a declared interface
    /// leaves the class with no base class.
    fn base_class(&self, name: &str) -> Option<String> {
        if self.interfaces.contains(name) && !self.declared.contains_key(name) {
            None
        } else {
            Some(name.to_string())
        }
    }

    fn knows(&self, class: &str, frameworks: &[Framework]) -> bool {
        self.declared.contains_key(class)
            || self.configured.contains_key(class)
            || frameworks.iter().any(|f| f.attribute_base(class).is_some())
    }

    /// Immediate base of `class`, if known.
    pub fn base_of(&self, class: &str, frameworks: &[Framework]) -> Option<String> {
        if let Some(base) = self.declared.get(class) {
            return base.as_deref().and_then(|b| self.base_class(b));
        }
        if let Some(base) = self.configured.get(class) {
            return Some(base.clone());
        }
        frameworks
            .iter()
            .find_map(|f| f.attribute_base(class))
            .map(str::to_string)
    }

    /// Base chain of `class`, nearest first, excluding `class` itself.
    pub fn ancestry(&self, class: &str, frameworks: &[Framework]) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(class.to_string());

        let mut current = class.to_string();
        while chain.len() < MAX_ANCESTRY_DEPTH {
            match self.base_of(&current, frameworks) {
                Some(base) if seen.insert(base.clone()) => {
                    chain.push(base.clone());
                    current = base;
                }
                _ => break,
            }
        }
        chain
    }

    /// Ancestry of the class an attribute usage binds to. Empty when the
    /// class is unknown.
    pub fn resolve_attribute(&self, written: &str, frameworks: &[Framework]) -> Vec<String> {
        attribute_class_candidates(written)
            .into_iter()
            .find(|candidate| self.knows(candidate, frameworks))
            .map(|class| self.ancestry(&class, frameworks))
            .unwrap_or_default()
    }

    /// Fill in containing-type and attribute ancestry for a file's methods.
    ///
    /// A method whose declaring part has no base list takes the base of
    /// another part of the same class.
    pub fn resolve(&self, facts: &FileFacts) -> Vec<MethodDescriptor> {
        let frameworks = Framework::for_usings(&facts.usings);

        facts
            .methods
            .iter()
            .enumerate()
            .map(|(i, method)| {
                let mut method = method.clone();
                let written = method.containing_ancestry.first().cloned().or_else(|| {
                    let container = facts.containers.get(i)?.as_deref()?;
                    self.declared.get(container).cloned().flatten()
                });
                method.containing_ancestry = match written.and_then(|b| self.base_class(&b)) {
                    Some(base) => {
                        let mut chain = vec![base.clone()];
                        chain.extend(self.ancestry(&base, &frameworks));
                        chain
                    }
                    None => Vec::new(),
                };
                for list in &mut method.annotation_lists {
                    for annotation in &mut list.annotations {
                        annotation.ancestry = self.resolve_attribute(&annotation.name, &frameworks);
                    }
                }
                method
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::csharp::{extract_facts, parse_source};

    fn facts(source: &str) -> FileFacts {
        extract_facts(&parse_source("Test.cs", source).unwrap())
    }

    #[test]
    fn test_framework_attribute_resolution() {
        let index = TypeIndex::new();
        let core = vec![Framework::AspNetCore];
        assert_eq!(
            index.resolve_attribute("HttpGet", &core),
            vec!["HttpMethodAttribute", "Attribute"]
        );
        assert!(index.resolve_attribute("Unknown", &core).is_empty());
    }

    #[test]
    fn test_declared_class_wins_over_framework() {
        let mut index = TypeIndex::new();
        index.add_file(&facts("public class HttpGetAttribute : Attribute { }"));
        assert_eq!(
            index.resolve_attribute("HttpGet", &[Framework::AspNetCore]),
            vec!["Attribute"]
        );
    }

    #[test]
    fn test_configured_bases() {
        let mut bases = HashMap::new();
        bases.insert("FetchAttribute".to_string(), "HttpMethodAttribute".to_string());
        let index = TypeIndex::new().with_configured(&bases);
        assert_eq!(
            index.resolve_attribute("Fetch", &[Framework::AspNetCore]),
            vec!["HttpMethodAttribute", "Attribute"]
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let mut index = TypeIndex::new();
        index.add_file(&facts("class A : B { } class B : A { }"));
        assert_eq!(index.ancestry("A", &[]), vec!["B"]);
    }

    #[test]
    fn test_partial_parts_share_base() {
        let mut index = TypeIndex::new();
        let part = facts("public partial class HomeController { public void About() { } }");
        index.add_file(&part);
        index.add_file(&facts("public partial class HomeController : Controller { }"));

        assert_eq!(index.base_of("HomeController", &[]).as_deref(), Some("Controller"));
        let methods = index.resolve(&part);
        assert_eq!(methods[0].containing_ancestry, vec!["Controller"]);
    }

    #[test]
    fn test_declared_interface_is_not_a_base_class() {
        let mut index = TypeIndex::new();
        index.add_file(&facts("public interface IApiController { }"));
        let f = facts("public class ReportsController : IApiController { public void Run() { } }");
        index.add_file(&f);

        assert_eq!(index.base_of("ReportsController", &[]), None);
        let methods = index.resolve(&f);
        assert!(methods[0].containing_ancestry.is_empty());
    }

    #[test]
    fn test_resolve_fills_ancestry() {
        let mut index = TypeIndex::new();
        let base = facts("public abstract class BaseController : Controller { }");
        index.add_file(&base);

        let f = facts(
            r#"
using Microsoft.AspNetCore.Mvc;
public class HomeController : BaseController
{
    [HttpGet]
    public IActionResult Index() { return View(); }
}
"#,
        );
        index.add_file(&f);

        let methods = index.resolve(&f);
        assert_eq!(
            methods[0].containing_ancestry,
            vec!["BaseController", "Controller"]
        );
        let get = methods[0].annotations().next().unwrap();
        assert_eq!(get.base_type_name(), Some("HttpMethodAttribute"));
    }
}
