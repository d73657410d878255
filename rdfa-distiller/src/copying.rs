//! Property copying ([html-rdfa] 3.5): `rdfa:copy` pulls in the properties of an `rdfa:Pattern`.

use oxrdf::vocab::rdf;
use oxrdf::{Graph, NamedOrBlankNodeRef, TermRef, Triple, TripleRef};
use tracing::trace;

use crate::vocab::rdfa;

fn as_resource(term: TermRef<'_>) -> Option<NamedOrBlankNodeRef<'_>> {
    match term {
        TermRef::NamedNode(n) => Some(n.into()),
        TermRef::BlankNode(n) => Some(n.into()),
        _ => None,
    }
}

fn is_pattern(graph: &Graph, node: NamedOrBlankNodeRef<'_>) -> bool {
    graph.contains(TripleRef::new(node, rdf::TYPE, rdfa::PATTERN))
}

/// Expands every `rdfa:copy` that refers to an `rdfa:Pattern`, then removes
/// the copy triples and the referenced patterns.
///
/// Patterns may themselves copy other patterns; copying repeats until
/// nothing new is added.
pub fn copy_properties(graph: &mut Graph) {
    loop {
        let mut additions: Vec<Triple> = Vec::new();
        for copy in graph.triples_for_predicate(rdfa::COPY) {
            let Some(pattern) = as_resource(copy.object) else {
                continue;
            };
            if !is_pattern(graph, pattern) {
                continue;
            }

            for triple in graph.triples_for_subject(pattern) {
                // the copy is not itself a pattern
                if triple.predicate == rdf::TYPE && triple.object == TermRef::from(rdfa::PATTERN) {
                    continue;
                }
                additions.push(Triple::new(
                    copy.subject.into_owned(),
                    triple.predicate.into_owned(),
                    triple.object.into_owned(),
                ));
            }
        }

        let mut added_any = false;
        for triple in &additions {
            added_any |= graph.insert(triple);
        }
        if !added_any {
            break;
        }
    }

    let mut removals: Vec<Triple> = Vec::new();
    for copy in graph.triples_for_predicate(rdfa::COPY) {
        removals.push(copy.into_owned());
        let Some(pattern) = as_resource(copy.object) else {
            continue;
        };
        if is_pattern(graph, pattern) {
            removals.extend(graph.triples_for_subject(pattern).map(TripleRef::into_owned));
        }
    }

    trace!("- removing {} pattern triples", removals.len());
    for triple in &removals {
        graph.remove(triple);
    }
}
