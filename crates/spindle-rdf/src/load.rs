//! RDF concrete-syntax loading (interop boundary).
//!
//! Parses common RDF serializations into a [`Graph`] using Sophia:
//!
//! - N-Triples (`.nt`)
//! - Turtle (`.ttl`)
//! - RDF/XML (`.rdf`, `.owl`, `.xml`)
//!
//! Quad formats are out: the store is a single graph with no named-graph
//! dimension.

use crate::graph::Graph;
use crate::term::{Literal, Term};
use crate::vocab;
use sophia::api::prelude::*;
use sophia::api::term::{Term as SourceTerm, TermKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    NTriples,
    Turtle,
    RdfXml,
}

impl RdfFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "nt" | "ntriples" => Some(Self::NTriples),
            "ttl" | "turtle" => Some(Self::Turtle),
            "rdf" | "owl" | "xml" => Some(Self::RdfXml),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::NTriples => "N-Triples",
            Self::Turtle => "Turtle",
            Self::RdfXml => "RDF/XML",
        }
    }
}

#[derive(Debug, Error)]
pub enum GraphLoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported RDF extension: {}", .path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error("failed to parse {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

#[derive(Debug, Error)]
#[error("{message}")]
struct TermSinkError {
    message: String,
}

impl TermSinkError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Convert a parsed term into an owned [`Term`].
///
/// Literals typed `xsd:string` come out as plain literals, so Turtle and
/// N-Triples spellings of the same value compare equal.
fn convert_term<T: SourceTerm>(term: T) -> Result<Term, TermSinkError> {
    match term.kind() {
        TermKind::Iri => {
            let iri = term
                .iri()
                .ok_or_else(|| TermSinkError::new("IRI term without a value"))?;
            Ok(Term::Iri(iri.as_str().to_string()))
        }
        TermKind::BlankNode => {
            let id = term
                .bnode_id()
                .ok_or_else(|| TermSinkError::new("blank node without a label"))?;
            Ok(Term::Blank(id.as_str().to_string()))
        }
        TermKind::Literal => {
            let lexical = term
                .lexical_form()
                .ok_or_else(|| TermSinkError::new("literal without a lexical form"))?
                .to_string();
            if let Some(tag) = term.language_tag() {
                return Ok(Term::Literal(Literal {
                    lexical,
                    datatype: None,
                    language: Some(tag.as_str().to_string()),
                }));
            }
            let datatype = term
                .datatype()
                .map(|dt| dt.as_str().to_string())
                .filter(|dt| dt.as_str() != vocab::xsd::STRING);
            Ok(Term::Literal(Literal {
                lexical,
                datatype,
                language: None,
            }))
        }
        kind => Err(TermSinkError::new(format!(
            "unsupported RDF term kind: {kind:?}"
        ))),
    }
}

fn insert_triple<T: Triple>(graph: &mut Graph, triple: &T) -> Result<(), TermSinkError> {
    let subject = convert_term(triple.s())?;
    let predicate = convert_term(triple.p())?;
    // Non-IRI predicates carry no meaning here; drop the triple.
    if !matches!(predicate, Term::Iri(_)) {
        return Ok(());
    }
    let object = convert_term(triple.o())?;
    graph.insert(subject, predicate, object);
    Ok(())
}

/// Parse `bytes` as `format` and append every triple to `graph`.
pub fn load_bytes(
    graph: &mut Graph,
    bytes: &[u8],
    format: RdfFormat,
) -> Result<(), GraphLoadError> {
    let cursor = std::io::Cursor::new(bytes);
    let reader = std::io::BufReader::new(cursor);

    match format {
        RdfFormat::NTriples => {
            let mut parser = sophia::turtle::parser::nt::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| insert_triple(graph, &t))
                .map_err(|e| GraphLoadError::Parse {
                    format: format.label(),
                    message: e.to_string(),
                })?;
        }
        RdfFormat::Turtle => {
            let mut parser = sophia::turtle::parser::turtle::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| insert_triple(graph, &t))
                .map_err(|e| GraphLoadError::Parse {
                    format: format.label(),
                    message: e.to_string(),
                })?;
        }
        RdfFormat::RdfXml => {
            let mut parser = sophia::xml::parser::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| insert_triple(graph, &t))
                .map_err(|e| GraphLoadError::Parse {
                    format: format.label(),
                    message: e.to_string(),
                })?;
        }
    }
    Ok(())
}

pub fn load_str(graph: &mut Graph, text: &str, format: RdfFormat) -> Result<(), GraphLoadError> {
    load_bytes(graph, text.as_bytes(), format)
}

/// Load a file, picking the format from its extension.
pub fn load_path(graph: &mut Graph, path: &Path) -> Result<(), GraphLoadError> {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let format =
        RdfFormat::from_extension(ext).ok_or_else(|| GraphLoadError::UnsupportedExtension {
            path: path.to_path_buf(),
        })?;
    let bytes = std::fs::read(path).map_err(|source| GraphLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_bytes(graph, &bytes, format)
}

/// Fresh graph from a Turtle document.
pub fn graph_from_turtle(text: &str) -> Result<Graph, GraphLoadError> {
    let mut graph = Graph::new();
    load_str(&mut graph, text, RdfFormat::Turtle)?;
    Ok(graph)
}
