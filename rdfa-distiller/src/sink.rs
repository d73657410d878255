//! Where distilled triples and processor diagnostics go.

use oxrdf::{BlankNode, Dataset, Graph, GraphName, LiteralRef, QuadRef, Triple, TripleRef};

use crate::vocab;

/// Receives triples as they are produced.
///
/// The distiller only ever appends; it never reads a sink back. Triples arrive
/// in document order, with list triples after the subtree that owns the list.
/// Duplicates are not filtered.
pub trait TripleSink {
    fn emit(&mut self, triple: TripleRef<'_>);
}

impl<S: TripleSink + ?Sized> TripleSink for &mut S {
    fn emit(&mut self, triple: TripleRef<'_>) {
        (**self).emit(triple)
    }
}

impl TripleSink for Graph {
    fn emit(&mut self, triple: TripleRef<'_>) {
        self.insert(triple);
    }
}

/// Keeps every triple in emission order, duplicates included.
impl TripleSink for Vec<Triple> {
    fn emit(&mut self, triple: TripleRef<'_>) {
        self.push(triple.into_owned());
    }
}

/// Writes into one graph of a [`Dataset`].
pub struct NamedGraph<'d> {
    dataset: &'d mut Dataset,
    graph_name: GraphName,
}

impl<'d> NamedGraph<'d> {
    pub fn new(dataset: &'d mut Dataset, graph_name: impl Into<GraphName>) -> Self {
        Self {
            dataset,
            graph_name: graph_name.into(),
        }
    }
}

impl TripleSink for NamedGraph<'_> {
    fn emit(&mut self, triple: TripleRef<'_>) {
        self.dataset.insert(QuadRef::new(
            triple.subject,
            triple.predicate,
            triple.object,
            self.graph_name.as_ref(),
        ));
    }
}

/// Discards everything; useful when the processor graph is not wanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl TripleSink for Discard {
    fn emit(&mut self, _triple: TripleRef<'_>) {}
}

/// Classes of the RDFa processor graph vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Error,
    Warning,
    DocumentError,
    UnresolvedCurie,
    UnresolvedTerm,
    PrefixRedefinition,
    /// A literal whose lexical form does not match its datatype.
    MalformedLiteral,
}

impl DiagnosticKind {
    /// The general class (`rdfa:Error` or `rdfa:Warning`) this kind belongs to.
    pub fn base_class(self) -> oxrdf::NamedNodeRef<'static> {
        match self {
            DiagnosticKind::Error | DiagnosticKind::DocumentError => vocab::rdfa::ERROR,
            DiagnosticKind::Warning
            | DiagnosticKind::UnresolvedCurie
            | DiagnosticKind::UnresolvedTerm
            | DiagnosticKind::PrefixRedefinition
            | DiagnosticKind::MalformedLiteral => vocab::rdfa::WARNING,
        }
    }

    /// The specific class, when the vocabulary has one.
    pub fn class(self) -> Option<oxrdf::NamedNodeRef<'static>> {
        match self {
            DiagnosticKind::Error | DiagnosticKind::Warning | DiagnosticKind::MalformedLiteral => {
                None
            }
            DiagnosticKind::DocumentError => Some(vocab::rdfa::DOCUMENT_ERROR),
            DiagnosticKind::UnresolvedCurie => Some(vocab::rdfa::UNRESOLVED_CURIE),
            DiagnosticKind::UnresolvedTerm => Some(vocab::rdfa::UNRESOLVED_TERM),
            DiagnosticKind::PrefixRedefinition => Some(vocab::rdfa::PREFIX_REDEFINITION),
        }
    }
}

/// A recoverable problem found while distilling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Path of the element being processed, if any.
    pub element: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            element: None,
        }
    }

    pub fn description(&self) -> String {
        match &self.element {
            Some(element) => format!("[In element '{element}'] {}", self.message),
            None => self.message.clone(),
        }
    }
}

/// Writes diagnostics into a processor graph sink, one blank node per entry.
pub(crate) struct ProcessorGraph<S> {
    sink: S,
    label_prefix: String,
    next_id: usize,
}

impl<S: TripleSink> ProcessorGraph<S> {
    pub fn new(sink: S, label_prefix: impl Into<String>) -> Self {
        Self {
            sink,
            label_prefix: label_prefix.into(),
            next_id: 0,
        }
    }

    pub fn emit(&mut self, diagnostic: &Diagnostic) {
        let node = BlankNode::new_unchecked(format!("{}pg{}", self.label_prefix, self.next_id));
        self.next_id += 1;

        // new bnode is-a PGClass
        self.sink.emit(TripleRef::new(
            &node,
            oxrdf::vocab::rdf::TYPE,
            diagnostic.kind.base_class(),
        ));
        if let Some(class) = diagnostic.kind.class() {
            self.sink
                .emit(TripleRef::new(&node, oxrdf::vocab::rdf::TYPE, class));
        }

        // add description
        let description = diagnostic.description();
        self.sink.emit(TripleRef::new(
            &node,
            vocab::dc::DESCRIPTION,
            LiteralRef::new_simple_literal(&description),
        ));
    }
}

#[cfg(test)]
mod tests {
    use oxrdf::{NamedNodeRef, TermRef};

    use super::*;

    #[test]
    fn vec_keeps_order_and_duplicates() {
        let s = NamedNodeRef::new_unchecked("http://example.org/s");
        let p = NamedNodeRef::new_unchecked("http://example.org/p");
        let mut out: Vec<Triple> = Vec::new();
        out.emit(TripleRef::new(s, p, LiteralRef::new_simple_literal("b")));
        out.emit(TripleRef::new(s, p, LiteralRef::new_simple_literal("a")));
        out.emit(TripleRef::new(s, p, LiteralRef::new_simple_literal("a")));

        let values: Vec<_> = out
            .iter()
            .map(|t| match t.object.as_ref() {
                TermRef::Literal(l) => l.value().to_string(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(values, ["b", "a", "a"]);
    }

    #[test]
    fn named_graph_sink() {
        let s = NamedNodeRef::new_unchecked("http://example.org/s");
        let g = oxrdf::NamedNode::new_unchecked("http://example.org/g");
        let mut dataset = Dataset::new();
        NamedGraph::new(&mut dataset, g.clone()).emit(TripleRef::new(s, s, s));

        assert_eq!(dataset.len(), 1);
        assert!(dataset.contains(QuadRef::new(s, s, s, g.as_ref())));
    }

    #[test]
    fn processor_graph_entry() {
        let mut graph = Graph::new();
        let mut pg = ProcessorGraph::new(&mut graph, "");
        let mut diagnostic = Diagnostic::new(DiagnosticKind::UnresolvedTerm, "Unknown term: foo");
        diagnostic.element = Some("html>body>p".to_string());
        pg.emit(&diagnostic);

        let node = BlankNode::new_unchecked("pg0");
        assert!(graph.contains(TripleRef::new(
            &node,
            oxrdf::vocab::rdf::TYPE,
            vocab::rdfa::WARNING
        )));
        assert!(graph.contains(TripleRef::new(
            &node,
            oxrdf::vocab::rdf::TYPE,
            vocab::rdfa::UNRESOLVED_TERM
        )));
        assert!(graph.contains(TripleRef::new(
            &node,
            vocab::dc::DESCRIPTION,
            LiteralRef::new_simple_literal("[In element 'html>body>p'] Unknown term: foo")
        )));
    }
}
