//! Fix engine for the controller verb rule.
//!
//! A fix appends one single-entry annotation list holding the chosen verb
//! attribute after the method's existing lists. Existing lists are never
//! removed or reordered, and the input method is never mutated.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::evaluator::{MARKER_BASE_TYPES, RULE_ID};
use super::{AnnotationDescriptor, AnnotationList, Diagnostic, MethodDescriptor};

/// HTTP verb selectable for a fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbChoice {
    Get,
    Post,
}

/// Maps a verb to the attribute the fix inserts.
struct VerbEntry {
    verb: VerbChoice,
    key: &'static str,
    attribute: &'static str,
}

/// Verbs offered as fixes, in the order they are presented.
static VERB_TABLE: &[VerbEntry] = &[
    VerbEntry {
        verb: VerbChoice::Get,
        key: "get",
        attribute: "HttpGet",
    },
    VerbEntry {
        verb: VerbChoice::Post,
        key: "post",
        attribute: "HttpPost",
    },
];

impl VerbChoice {
    fn entry(&self) -> &'static VerbEntry {
        // Every variant has a row in VERB_TABLE.
        VERB_TABLE
            .iter()
            .find(|e| e.verb == *self)
            .unwrap_or(&VERB_TABLE[0])
    }

    /// All verbs, in presentation order.
    pub fn all() -> impl Iterator<Item = VerbChoice> {
        VERB_TABLE.iter().map(|e| e.verb)
    }

    /// Canonical attribute name, e.g. "HttpGet".
    pub fn attribute_name(&self) -> &'static str {
        self.entry().attribute
    }

    pub fn as_str(&self) -> &'static str {
        self.entry().key
    }

    /// Title of the fix action, e.g. "Add [HttpGet] Attribute".
    pub fn fix_title(&self) -> String {
        format!("Add [{}] Attribute", self.attribute_name())
    }
}

impl fmt::Display for VerbChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VerbChoice {
    type Err = String;

    /// Accepts "get", "GET", "HttpGet" and similar spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        VERB_TABLE
            .iter()
            .find(|e| e.key == lowered || e.attribute.to_lowercase() == lowered)
            .map(|e| e.verb)
            .ok_or_else(|| format!("unknown verb: {}", s))
    }
}

/// A named, independently selectable fix for one diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixAction {
    pub title: String,
    pub verb: VerbChoice,
}

/// Fix actions offered for a diagnostic: one per verb, none for diagnostics
/// of other rules.
pub fn fix_actions(diagnostic: &Diagnostic) -> Vec<FixAction> {
    if diagnostic.rule_id != RULE_ID {
        return Vec::new();
    }
    VerbChoice::all()
        .map(|verb| FixAction {
            title: verb.fix_title(),
            verb,
        })
        .collect()
}

/// Errors raised while applying a fix.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FixError {
    /// The diagnostic no longer maps to a method declaration.
    #[error("no applicable target for fix at {file}:{line}:{column}")]
    NoApplicableTarget {
        file: String,
        line: usize,
        column: usize,
    },
    /// The diagnostic belongs to a rule this engine does not fix.
    #[error("diagnostic {0} is not fixable")]
    NotFixable(String),
}

impl FixError {
    pub fn no_target(diagnostic: &Diagnostic) -> Self {
        FixError::NoApplicableTarget {
            file: diagnostic.location.file.clone(),
            line: diagnostic.location.line,
            column: diagnostic.location.column,
        }
    }
}

/// Outcome of a fix: the method's new annotation lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixResult {
    pub method_name: String,
    pub verb: VerbChoice,
    pub annotation_lists: Vec<AnnotationList>,
}

impl FixResult {
    /// All annotations in order, across lists.
    pub fn annotations(&self) -> impl Iterator<Item = &AnnotationDescriptor> {
        self.annotation_lists.iter().flat_map(|l| l.annotations.iter())
    }

    /// The list added by the fix.
    pub fn appended(&self) -> Option<&AnnotationList> {
        self.annotation_lists.last()
    }

    /// Copy of `original` carrying the fixed annotation lists.
    pub fn to_method(&self, original: &MethodDescriptor) -> MethodDescriptor {
        MethodDescriptor {
            annotation_lists: self.annotation_lists.clone(),
            ..original.clone()
        }
    }
}

/// Stateless fix engine.
#[derive(Debug, Clone)]
pub struct FixEngine {
    /// Immediate base recorded on inserted attributes.
    verb_base: String,
}

impl Default for FixEngine {
    fn default() -> Self {
        Self {
            verb_base: MARKER_BASE_TYPES[0].to_string(),
        }
    }
}

impl FixEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `base` as the immediate base of inserted attributes, e.g.
    /// `ActionMethodSelectorAttribute` for ASP.NET MVC sources.
    pub fn with_verb_base(mut self, base: impl Into<String>) -> Self {
        self.verb_base = base.into();
        self
    }

    /// The annotation the fix inserts for `verb`.
    pub fn verb_annotation(&self, verb: VerbChoice) -> AnnotationDescriptor {
        AnnotationDescriptor::new(verb.attribute_name())
            .with_ancestry([self.verb_base.as_str(), "Attribute"])
    }

    /// Append the verb attribute as a new list after the existing ones.
    pub fn apply_fix(&self, method: &MethodDescriptor, verb: VerbChoice) -> FixResult {
        let mut annotation_lists = method.annotation_lists.clone();
        annotation_lists.push(AnnotationList::single(self.verb_annotation(verb)));

        FixResult {
            method_name: method.name.clone(),
            verb,
            annotation_lists,
        }
    }

    /// Apply the fix for a diagnostic, checking that it still targets
    /// `method`.
    pub fn apply_for(
        &self,
        diagnostic: &Diagnostic,
        method: &MethodDescriptor,
        verb: VerbChoice,
    ) -> Result<FixResult, FixError> {
        if diagnostic.rule_id != RULE_ID {
            return Err(FixError::NotFixable(diagnostic.rule_id.clone()));
        }
        if method.name != diagnostic.method_name
            || method.location.start_byte != diagnostic.location.start_byte
        {
            return Err(FixError::no_target(diagnostic));
        }
        Ok(self.apply_fix(method, verb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Location, MethodKind, RuleEvaluator, Visibility};

    fn method(annotations: Vec<&str>) -> MethodDescriptor {
        MethodDescriptor {
            name: "Index".to_string(),
            visibility: Visibility::Public,
            kind: MethodKind::Ordinary,
            containing_ancestry: vec!["Controller".to_string()],
            annotation_lists: annotations
                .into_iter()
                .map(|n| {
                    AnnotationList::single(
                        AnnotationDescriptor::new(n).with_ancestry(["FilterAttribute"]),
                    )
                })
                .collect(),
            location: Location {
                file: "HomeController.cs".to_string(),
                line: 8,
                column: 24,
                end_line: 8,
                end_column: 29,
                start_byte: 140,
                end_byte: 145,
            },
        }
    }

    fn names(result: &FixResult) -> Vec<&str> {
        result.annotations().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_fix_titles() {
        let titles: Vec<String> = VerbChoice::all().map(|v| v.fix_title()).collect();
        assert_eq!(
            titles,
            vec!["Add [HttpGet] Attribute", "Add [HttpPost] Attribute"]
        );
    }

    #[test]
    fn test_parse_verb() {
        assert_eq!("get".parse::<VerbChoice>().unwrap(), VerbChoice::Get);
        assert_eq!("POST".parse::<VerbChoice>().unwrap(), VerbChoice::Post);
        assert_eq!("HttpPost".parse::<VerbChoice>().unwrap(), VerbChoice::Post);
        assert!("patch".parse::<VerbChoice>().is_err());
    }

    #[test]
    fn test_post_fix_on_bare_method() {
        let engine = FixEngine::new();
        let original = method(vec![]);
        let result = engine.apply_fix(&original, VerbChoice::Post);

        assert_eq!(names(&result), vec!["HttpPost"]);
        assert!(original.annotation_lists.is_empty());

        let evaluator = RuleEvaluator::new();
        assert!(evaluator.evaluate(&original).is_some());
        assert!(evaluator.evaluate(&result.to_method(&original)).is_none());
    }

    #[test]
    fn test_fix_appends_after_existing_annotations() {
        let engine = FixEngine::new();
        let result = engine.apply_fix(&method(vec!["A", "B"]), VerbChoice::Get);

        assert_eq!(names(&result), vec!["A", "B", "HttpGet"]);
        assert_eq!(result.annotation_lists.len(), 3);
        assert_eq!(result.appended().unwrap().to_string(), "[HttpGet]");
    }

    #[test]
    fn test_handle_error_then_get() {
        let engine = FixEngine::new();
        let original = method(vec!["HandleError"]);
        assert!(RuleEvaluator::new().evaluate(&original).is_some());

        let result = engine.apply_fix(&original, VerbChoice::Get);
        assert_eq!(names(&result), vec!["HandleError", "HttpGet"]);
    }

    #[test]
    fn test_existing_groups_are_preserved() {
        let mut original = method(vec![]);
        original.annotation_lists.push(AnnotationList {
            annotations: vec![
                AnnotationDescriptor::new("Authorize"),
                AnnotationDescriptor::new("HandleError"),
            ],
        });

        let result = FixEngine::new().apply_fix(&original, VerbChoice::Get);
        assert_eq!(result.annotation_lists[0], original.annotation_lists[0]);
        assert_eq!(result.annotation_lists[1].annotations.len(), 1);
    }

    #[test]
    fn test_fixes_are_independent() {
        let engine = FixEngine::new();
        let original = method(vec!["A"]);
        let get = engine.apply_fix(&original, VerbChoice::Get);
        let post = engine.apply_fix(&original, VerbChoice::Post);

        assert_eq!(names(&get), vec!["A", "HttpGet"]);
        assert_eq!(names(&post), vec!["A", "HttpPost"]);
    }

    #[test]
    fn test_repeated_fix_appends_again() {
        let engine = FixEngine::new();
        let original = method(vec![]);
        let once = engine.apply_fix(&original, VerbChoice::Get);
        let twice = engine.apply_fix(&once.to_method(&original), VerbChoice::Get);
        assert_eq!(names(&twice), vec!["HttpGet", "HttpGet"]);
    }

    #[test]
    fn test_mvc_verb_base() {
        let engine = FixEngine::new().with_verb_base("ActionMethodSelectorAttribute");
        let annotation = engine.verb_annotation(VerbChoice::Get);
        assert_eq!(
            annotation.base_type_name(),
            Some("ActionMethodSelectorAttribute")
        );
    }

    #[test]
    fn test_fix_actions_for_diagnostic() {
        let original = method(vec![]);
        let diagnostic = RuleEvaluator::new().evaluate(&original).unwrap();
        let actions = fix_actions(&diagnostic);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].verb, VerbChoice::Get);
        assert_eq!(actions[1].title, "Add [HttpPost] Attribute");

        let mut foreign = diagnostic.clone();
        foreign.rule_id = "Other".to_string();
        assert!(fix_actions(&foreign).is_empty());
    }

    #[test]
    fn test_stale_diagnostic_is_rejected() {
        let engine = FixEngine::new();
        let original = method(vec![]);
        let diagnostic = RuleEvaluator::new().evaluate(&original).unwrap();

        let mut moved = original.clone();
        moved.location.start_byte += 12;
        let err = engine
            .apply_for(&diagnostic, &moved, VerbChoice::Get)
            .unwrap_err();
        assert_eq!(
            err,
            FixError::NoApplicableTarget {
                file: "HomeController.cs".to_string(),
                line: 8,
                column: 24,
            }
        );

        assert!(engine
            .apply_for(&diagnostic, &original, VerbChoice::Get)
            .is_ok());
    }
}
