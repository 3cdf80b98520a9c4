//! Class-scoped rule resolution.
//!
//! Given a graph of rule declarations (`class → predicate → command or
//! template invocation`), this crate resolves the full set of
//! executable commands per class:
//!
//! - directly declared commands parse and wrap as they are;
//! - template invocations expand across the template's ancestor
//!   closure, one independently argument-checked candidate per
//!   ancestor;
//! - eligible commands get the `?this a ?targetClass .` scoping clause
//!   spliced into their pattern unless the command opted out, scoping
//!   is off, or `?this` only occurs in nested groups.
//!
//! Design goals:
//! - resolution is one read-only pass; the result is freshly owned and
//!   callers may run resolutions concurrently over shared graphs;
//! - skips are silent and local, parse faults are recorded and local;
//!   nothing short of a poisoned graph store aborts a scan;
//! - map order is reproducible: classes in discovery order, wrappers
//!   in declaration then ancestor order.

mod label;
pub mod model;
pub mod resolver;
pub mod rule_map;
pub mod template;
pub mod vocab;
mod wrapper;

pub use model::{
    CommandWrapper, RawCommandKind, Resolution, ResolveOptions, ResolvedCommand, RuleDeclaration,
    RuleFault,
};
pub use resolver::class_rule_map;
pub use rule_map::ClassRuleMap;
pub use template::{templates_in, ArgumentDecl, TemplateDefinition};
pub use vocab::RuleVocab;
