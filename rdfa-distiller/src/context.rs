use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use curie::PrefixMapping;
use indexmap::IndexMap;
use oxiri::Iri;
use oxrdf::{BlankNode, NamedNode, NamedOrBlankNode, Term};
use tracing::trace;

use crate::options::{HostLanguage, Options, RdfaVersion};
use crate::sink::{Diagnostic, DiagnosticKind};
use crate::vocab;

pub(crate) type SharedList = RefCell<Vec<Rc<Term>>>;

/// Lists under construction, keyed by predicate, in the order they were started.
#[derive(Default, Clone, Debug)]
pub(crate) struct ListMapping {
    lists: IndexMap<NamedNode, Rc<SharedList>>,
}

impl ListMapping {
    /// Returns the list for `predicate`, starting an empty one if needed.
    pub fn ensure_list(&mut self, predicate: &NamedNode) -> Rc<SharedList> {
        if let Some(list) = self.lists.get(predicate) {
            return list.clone();
        }

        trace!(" - Created new list for predicate: {}", predicate);
        let shared_list: Rc<SharedList> = Default::default();
        self.lists.insert(predicate.clone(), shared_list.clone());
        shared_list
    }

    pub fn insert_value(&mut self, predicate: &NamedNode, term: Rc<Term>) {
        trace!(" - Inserting into list ({predicate}): {}", term);
        self.ensure_list(predicate).borrow_mut().push(term);
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NamedNode, &Rc<SharedList>)> {
        self.lists.iter()
    }
}

/// A predicate waiting for a descendant to supply the missing resource.
#[derive(Clone, Debug)]
pub(crate) enum IncompleteTriple {
    /// `@rel` with `@inlist`: the descendant's subject is appended to the list.
    List(Rc<SharedList>),
    /// `@rel`: `(parent subject, p, descendant subject)`.
    Forward(NamedNode),
    /// `@rev`: `(descendant subject, p, parent subject)`.
    Reverse(NamedNode),
}

/// Mints blank nodes for one document.
///
/// Labels are `{prefix}b0`, `{prefix}b1`, ... so that distilling the same
/// input twice with the same prefix gives the same output. Labels written in
/// the document (`_:name`) are mapped onto minted nodes, so they can never
/// collide with anonymous ones.
#[derive(Default, Debug)]
pub(crate) struct BlankNodeAllocator {
    prefix: String,
    next_id: usize,
    named: HashMap<String, BlankNode>,
    empty: Option<BlankNode>,
}

impl BlankNodeAllocator {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    pub fn fresh(&mut self) -> BlankNode {
        let node = BlankNode::new_unchecked(format!("{}b{}", self.prefix, self.next_id));
        self.next_id += 1;
        node
    }

    /// The node for a document label; the same label always gives the same node.
    pub fn named(&mut self, label: &str) -> BlankNode {
        if let Some(node) = self.named.get(label) {
            return node.clone();
        }

        let node = self.fresh();
        self.named.insert(label.to_string(), node.clone());
        node
    }

    /// The node for `_:`, which RDFa allows but Turtle cannot express.
    pub fn empty(&mut self) -> BlankNode {
        if let Some(node) = &self.empty {
            return node.clone();
        }

        let node = self.fresh();
        self.empty = Some(node.clone());
        node
    }
}

/// State shared by every element of one document.
pub(crate) struct Session {
    pub version: RdfaVersion,
    pub host: HostLanguage,
    /// Whether `<script type="text/turtle">` content is parsed into the output.
    pub embedded_turtle: bool,
    label_prefix: String,
    blank_nodes: RefCell<BlankNodeAllocator>,
    diagnostics: RefCell<Vec<Diagnostic>>,
    current_element: RefCell<Option<String>>,
}

impl Session {
    pub fn new(version: RdfaVersion, host: HostLanguage) -> Self {
        Self {
            version,
            host,
            embedded_turtle: false,
            label_prefix: String::new(),
            blank_nodes: Default::default(),
            diagnostics: Default::default(),
            current_element: Default::default(),
        }
    }

    /// Prefixes every blank node label minted for this document, including
    /// processor graph entries. The prefix must be valid at the start of a
    /// blank node label.
    pub fn with_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.label_prefix = prefix.clone();
        self.blank_nodes = RefCell::new(BlankNodeAllocator::with_prefix(prefix));
        self
    }

    pub fn with_embedded_turtle(mut self, enabled: bool) -> Self {
        self.embedded_turtle = enabled && self.host.accepts_embedded_turtle();
        self
    }

    pub fn label_prefix(&self) -> &str {
        &self.label_prefix
    }

    pub fn is_1_0(&self) -> bool {
        self.version == RdfaVersion::V1_0
    }

    pub fn fresh_blank_node(&self) -> BlankNode {
        self.blank_nodes.borrow_mut().fresh()
    }

    pub fn named_blank_node(&self, label: &str) -> BlankNode {
        if label.is_empty() {
            self.blank_nodes.borrow_mut().empty()
        } else {
            self.blank_nodes.borrow_mut().named(label)
        }
    }

    pub fn enter_element(&self, path: String) {
        *self.current_element.borrow_mut() = Some(path);
    }

    pub fn warn(&self, kind: DiagnosticKind, message: impl Into<String>) {
        let mut diagnostic = Diagnostic::new(kind, message);
        diagnostic.element = self.current_element.borrow().clone();
        tracing::warn!(kind = ?diagnostic.kind, "{}", diagnostic.description());
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }
}

// “During processing, each rule is applied using information provided by an evaluation context.
//  An initial context is created when processing begins. That context has the following members:
#[derive(Clone)]
pub(crate) struct EvaluationContext {
    // “The base. This will usually be the IRI of the document being processed,
    //  but it could be some other IRI, set by some other mechanism, such as the (X)HTML base element.
    pub base: Rc<Iri<String>>,

    // “The parent subject. The initial value will be the same as the initial value of base,
    //  but it will usually change during the course of processing.
    pub parent_subject: Rc<NamedOrBlankNode>,

    // “The parent object. In some situations the object of a statement becomes the subject
    //  of any nested statements, and this member is used to convey this value.
    // Only the root element sees `None`.
    pub parent_object: Option<Rc<NamedOrBlankNode>>,

    // “A list of current, in-scope IRI mappings.
    pub iri_mappings: Rc<PrefixMapping>,

    // “A list of incomplete triples.
    pub incomplete_triples: Vec<IncompleteTriple>,

    // “A list mapping that associates IRIs with lists.
    pub list_mapping: Rc<RefCell<ListMapping>>,

    // “The language. Note that there is no default language.
    pub language: Option<Rc<str>>,

    // “The term mappings, a list of terms and their associated IRIs.
    pub term_mappings: Rc<BTreeMap<String, NamedNode>>,

    // “The default vocabulary, a value to use as the prefix IRI when a term unknown to the RDFa Processor
    //  is used.
    pub default_vocab: Option<NamedNode>,
}

impl EvaluationContext {
    pub fn new(session: &Session, base: Iri<String>, options: &Options) -> Self {
        let mut iri_mappings = match session.version {
            RdfaVersion::V1_1 => vocab::initial_context_prefixes().clone(),
            RdfaVersion::V1_0 => vocab::rdfa_1_0_prefixes(),
        };
        for (prefix, iri) in &options.initial_prefixes {
            let prefix = match session.version {
                RdfaVersion::V1_1 => prefix.to_ascii_lowercase(),
                RdfaVersion::V1_0 => prefix.clone(),
            };
            if iri_mappings.add_prefix(&prefix, iri).is_err() {
                session.warn(
                    DiagnosticKind::PrefixRedefinition,
                    "The '_' prefix is reserved for blank nodes and cannot be mapped",
                );
            }
        }

        let mut term_mappings = match session.version {
            RdfaVersion::V1_1 => vocab::initial_context_terms().clone(),
            RdfaVersion::V1_0 => vocab::xhtml_reserved_terms().clone(),
        };
        term_mappings.extend(options.initial_terms.iter().cloned());

        // resolve the base to remove any fragment,
        // so that it can be used directly as the "empty CURIE" value
        let base = base.resolve("").unwrap_or(base);

        Self {
            parent_subject: Rc::new(NamedNode::new_unchecked(base.as_str()).into()),
            base: Rc::new(base),
            parent_object: None,
            iri_mappings: Rc::new(iri_mappings),
            incomplete_triples: Vec::new(),
            list_mapping: Default::default(),
            language: None,
            term_mappings: Rc::new(term_mappings),
            default_vocab: match session.version {
                RdfaVersion::V1_1 => options.default_vocabulary.clone(),
                RdfaVersion::V1_0 => None,
            },
        }
    }
}
