//! The controller HTTP verb rule: evaluation, fixes and suppression.
//!
//! Nothing in this module touches a concrete syntax tree. Front ends hand
//! in `MethodDescriptor`s and receive `Diagnostic`s and `FixResult`s back.

mod evaluator;
mod fix;
mod lookup;
mod suppress;
mod types;

pub use evaluator::{
    format_message, is_controller_base, is_marker_base, RuleEvaluator, MARKER_BASE_TYPES,
    MESSAGE_FORMAT, RULE_CATEGORY, RULE_DESCRIPTION, RULE_ID, RULE_TITLE,
};
pub use fix::{fix_actions, FixAction, FixEngine, FixError, FixResult, VerbChoice};
pub use lookup::{DescriptorLookup, SymbolLookup};
pub use suppress::{filter_suppressed, parse_pragmas, SuppressionRegion};
pub use types::{
    AnnotationDescriptor, AnnotationList, DetectionResult, Diagnostic, Location, MethodDescriptor,
    MethodKind, Severity, SuppressedDiagnostic, Visibility,
};
