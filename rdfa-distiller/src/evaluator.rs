use std::rc::Rc;

use itertools::Itertools;
use oxrdf::vocab::rdf;
use oxrdf::{NamedOrBlankNode, TripleRef};
use tracing::{debug, trace};

use crate::context::{EvaluationContext, Session};
use crate::dom::DocumentNode;
use crate::embedded;
use crate::interpret::{ListOwner, interpret};
use crate::sink::{ProcessorGraph, TripleSink};
use crate::Error;

enum Frame<N> {
    Visit(N, Rc<EvaluationContext>),
    // after the owning element's subtree
    Flush(ListOwner),
}

/// Walks the tree below `root` (inclusive) in document order.
///
/// The walk uses an explicit stack, so deeply nested documents cannot
/// overflow the call stack.
pub(crate) fn evaluate<N: DocumentNode>(
    session: &Session,
    root: &N,
    context: EvaluationContext,
    output: &mut impl TripleSink,
    processor: &mut impl TripleSink,
) -> Result<(), Error> {
    let mut processor = ProcessorGraph::new(processor, session.label_prefix());
    let mut stack = vec![Frame::Visit(root.clone(), Rc::new(context))];
    let mut visited = 0usize;

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Visit(element, ctx) => {
                visited += 1;
                let path = element.path();
                trace!("{path} {}", describe_attributes(&element));
                session.enter_element(path);

                if session.embedded_turtle && embedded::is_turtle_script(&element) {
                    for triple in embedded::script_triples(session, &element, &ctx) {
                        output.emit(triple.as_ref());
                    }
                    for diagnostic in session.take_diagnostics() {
                        processor.emit(&diagnostic);
                    }
                    continue;
                }

                let interpretation = interpret(session, &element, &ctx);
                for triple in &interpretation.triples {
                    trace!("- Emitting output triple: {triple}");
                    output.emit(triple.as_ref());
                }

                for diagnostic in session.take_diagnostics() {
                    processor.emit(&diagnostic);
                }

                if let Some(owner) = interpretation.list_owner {
                    stack.push(Frame::Flush(owner));
                }

                let child_context = Rc::new(interpretation.child_context);
                for child in element.element_children().into_iter().rev() {
                    let points_back = child
                        .parent_element()
                        .is_some_and(|parent| parent.is_same_element(&element));
                    if !points_back {
                        return Err(Error::StructuralViolation {
                            parent: element.path(),
                            child: child.name().to_string(),
                        });
                    }

                    stack.push(Frame::Visit(child, child_context.clone()));
                }
            }
            Frame::Flush(owner) => flush_lists(session, &owner, output),
        }
    }

    // anything recorded outside of an element
    for diagnostic in session.take_diagnostics() {
        processor.emit(&diagnostic);
    }

    debug!(elements = visited, "finished document");
    Ok(())
}

// 14.
// “Finally, if there is one or more mapping in the local list mapping,
//  list triples are generated as follows:
fn flush_lists(session: &Session, owner: &ListOwner, output: &mut impl TripleSink) {
    let lists = owner.lists.borrow();
    for (predicate, list) in lists.iter() {
        let items = list.borrow();
        trace!("- Flushing list ({predicate}) with {} items", items.len());

        // “Create a new 'bnode' array containing newly created bnodes, one for each item in the list
        let nodes: Vec<NamedOrBlankNode> = items
            .iter()
            .map(|_| session.fresh_blank_node().into())
            .collect();

        for (i, (node, item)) in nodes.iter().zip(items.iter()).enumerate() {
            output.emit(TripleRef::new(node, rdf::FIRST, item.as_ref()));
            match nodes.get(i + 1) {
                Some(next) => output.emit(TripleRef::new(node, rdf::REST, next)),
                None => output.emit(TripleRef::new(node, rdf::REST, rdf::NIL)),
            }
        }

        // “If there are zero items in the list associated with the IRI, generate the following triple:
        //   subject = current subject, predicate = full IRI, object = rdf:nil
        match nodes.first() {
            Some(head) => output.emit(TripleRef::new(owner.subject.as_ref(), predicate, head)),
            None => output.emit(TripleRef::new(owner.subject.as_ref(), predicate, rdf::NIL)),
        }
    }
}

fn describe_attributes<N: DocumentNode>(element: &N) -> String {
    element
        .attrs()
        .iter()
        .map(|(n, v)| format!("@{n}='{v}'"))
        .sorted()
        .join(" ")
}
