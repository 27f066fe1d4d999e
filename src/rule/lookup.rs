//! Read-only symbol lookup used by the rule evaluator.
//!
//! The evaluator never walks a concrete syntax tree. It asks a
//! `SymbolLookup` for the three facts it needs, so any front end that can
//! answer them can drive the rule.

use super::{AnnotationDescriptor, MethodDescriptor};

/// Symbol facts the rule depends on.
pub trait SymbolLookup: Send + Sync {
    /// Immediate base type name of the method's containing type.
    /// `None` when the type declares no base.
    fn containing_base_type_name<'a>(&'a self, method: &'a MethodDescriptor) -> Option<&'a str>;

    /// Annotations attached to the method, in source order.
    fn attached_annotations<'a>(
        &'a self,
        method: &'a MethodDescriptor,
    ) -> Box<dyn Iterator<Item = &'a AnnotationDescriptor> + 'a>;

    /// Immediate base type name of the annotation's class.
    /// `None` when the class metadata is unavailable.
    fn annotation_base_type_name<'a>(
        &'a self,
        annotation: &'a AnnotationDescriptor,
    ) -> Option<&'a str>;
}

/// Lookup that answers straight from the descriptor fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorLookup;

impl SymbolLookup for DescriptorLookup {
    fn containing_base_type_name<'a>(&'a self, method: &'a MethodDescriptor) -> Option<&'a str> {
        method.containing_ancestry.first().map(String::as_str)
    }

    fn attached_annotations<'a>(
        &'a self,
        method: &'a MethodDescriptor,
    ) -> Box<dyn Iterator<Item = &'a AnnotationDescriptor> + 'a> {
        Box::new(method.annotations())
    }

    fn annotation_base_type_name<'a>(
        &'a self,
        annotation: &'a AnnotationDescriptor,
    ) -> Option<&'a str> {
        annotation.base_type_name()
    }
}
