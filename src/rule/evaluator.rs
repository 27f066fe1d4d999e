//! Controller HTTP verb rule.
//!
//! A public, ordinary method declared in a type whose immediate base type
//! name ends in `Controller` must carry at least one attribute whose
//! immediate base type is `HttpMethodAttribute` (ASP.NET Core) or
//! `ActionMethodSelectorAttribute` (ASP.NET MVC).
//!
//! Both checks are plain name comparisons. A class merely named
//! `*Controller`, or a verb attribute that derives from a marker through an
//! intermediate class, is classified by name alone. Only one level of
//! attribute ancestry is inspected.

use super::lookup::{DescriptorLookup, SymbolLookup};
use super::{Diagnostic, MethodDescriptor, MethodKind, Severity, Visibility};

/// Rule identifier reported on every diagnostic.
pub const RULE_ID: &str = "ControllerHttpAttributeAnalyzer";

/// Short rule title.
pub const RULE_TITLE: &str = "Controller method does not specify a HTTP verb attribute";

/// Longer rule description for report metadata.
pub const RULE_DESCRIPTION: &str = "Public action methods on controllers should declare the HTTP verbs they accept with an attribute such as [HttpGet] or [HttpPost].";

/// Rule category.
pub const RULE_CATEGORY: &str = "Attributes";

/// Message template; `{0}` is replaced with the method name.
pub const MESSAGE_FORMAT: &str = "Controller method '{0}' does not specify a HTTP verb attribute";

const CONTROLLER_BASE_TYPE_SUFFIX: &str = "Controller";
const ASPNET_CORE_ATTRIBUTE_BASE_TYPE_NAME: &str = "HttpMethodAttribute";
const ASPNET_MVC_ATTRIBUTE_BASE_TYPE_NAME: &str = "ActionMethodSelectorAttribute";

/// Base type names that mark an attribute as an HTTP verb attribute.
pub const MARKER_BASE_TYPES: [&str; 2] = [
    ASPNET_CORE_ATTRIBUTE_BASE_TYPE_NAME,
    ASPNET_MVC_ATTRIBUTE_BASE_TYPE_NAME,
];

/// Substitute the method name into the message template.
pub fn format_message(method_name: &str) -> String {
    MESSAGE_FORMAT.replace("{0}", method_name)
}

/// Returns true if `name` is an unqualified controller base type name.
pub fn is_controller_base(name: &str) -> bool {
    name.ends_with(CONTROLLER_BASE_TYPE_SUFFIX)
}

/// Returns true if `name` is one of the verb marker base types.
pub fn is_marker_base(name: &str) -> bool {
    MARKER_BASE_TYPES.contains(&name)
}

/// Stateless evaluator for the controller verb rule.
#[derive(Debug, Clone, Default)]
pub struct RuleEvaluator<L = DescriptorLookup> {
    lookup: L,
}

impl RuleEvaluator<DescriptorLookup> {
    /// Evaluator that reads facts directly from method descriptors.
    pub fn new() -> Self {
        Self {
            lookup: DescriptorLookup,
        }
    }
}

impl<L: SymbolLookup> RuleEvaluator<L> {
    /// Evaluator backed by a custom symbol lookup.
    pub fn with_lookup(lookup: L) -> Self {
        Self { lookup }
    }

    /// Whether the method is subject to the rule at all.
    pub fn is_candidate(&self, method: &MethodDescriptor) -> bool {
        method.visibility == Visibility::Public
            && method.kind == MethodKind::Ordinary
            && self
                .lookup
                .containing_base_type_name(method)
                .is_some_and(is_controller_base)
    }

    /// Whether any attached annotation derives directly from a marker base.
    pub fn has_verb_annotation(&self, method: &MethodDescriptor) -> bool {
        self.lookup.attached_annotations(method).any(|annotation| {
            self.lookup
                .annotation_base_type_name(annotation)
                .is_some_and(is_marker_base)
        })
    }

    /// Evaluate one method. Returns a diagnostic only for a candidate
    /// without a verb annotation.
    pub fn evaluate(&self, method: &MethodDescriptor) -> Option<Diagnostic> {
        if !self.is_candidate(method) || self.has_verb_annotation(method) {
            return None;
        }

        Some(Diagnostic {
            rule_id: RULE_ID.to_string(),
            method_name: method.name.clone(),
            message: format_message(&method.name),
            location: method.location.clone(),
            severity: Severity::Warning,
        })
    }

    /// Evaluate a batch of methods, in order.
    pub fn evaluate_all<'a, I>(&self, methods: I) -> Vec<Diagnostic>
    where
        I: IntoIterator<Item = &'a MethodDescriptor>,
    {
        methods.into_iter().filter_map(|m| self.evaluate(m)).collect()
    }
}
