//! In-memory RDF term model and indexed graph store.
//!
//! This crate is the substrate the rest of the workspace reads rule and
//! template definitions from:
//!
//! - [`Term`] is the owned RDF value type (IRI, blank node, literal).
//! - [`TermPool`] interns terms into compact [`TermId`]s.
//! - [`Graph`] is an append-only statement store with predicate, (subject,
//!   predicate) and `rdf:type` indexes, plus the `rdfs:subClassOf` closure
//!   walks the resolver depends on.
//! - [`load`] parses Turtle, N-Triples and RDF/XML inputs into a [`Graph`].
//!
//! Design goals:
//! - Insertion order is observable: statement enumeration and object lists
//!   come back in the order triples were asserted.
//! - Reads never allocate identities: lookups are by value and absent terms
//!   yield empty results, not errors.
//! - No reasoning beyond the explicit `rdfs:subClassOf` closure.

pub mod graph;
pub mod load;
pub mod pool;
pub mod term;
pub mod vocab;

pub use graph::{Graph, Statement};
pub use load::{graph_from_turtle, load_bytes, load_path, load_str, GraphLoadError, RdfFormat};
pub use pool::{TermId, TermPool};
pub use term::{local_name, Literal, Term};
