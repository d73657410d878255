//! One element's worth of RDFa processing (RDFa Core 7.5 steps 1-13).
//!
//! [`interpret`] looks at a single element and the evaluation context handed
//! down by its parent, and returns everything the evaluator needs: triples to
//! emit right away, the context for the children, and the list mapping the
//! element owns (if any). It never looks at other elements except through
//! the text and markup of its own subtree.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use curie::PrefixMapping;
use oxiri::Iri;
use oxrdf::vocab::rdf;
use oxrdf::{Literal, NamedNode, NamedOrBlankNode, Term, Triple};
use tracing::trace;
use vec1::{Size0Error, Vec1};

use crate::context::{EvaluationContext, IncompleteTriple, ListMapping, Session};
use crate::dom::DocumentNode;
use crate::literal::{self, DatatypeChoice};
use crate::resolver::{ReferenceKind, Resolver};
use crate::sink::DiagnosticKind;
use crate::vocab;

enum Attr<T> {
    Missing,
    Empty,
    Value(T),
}

impl<T> Attr<T> {
    fn map<U>(self, f: impl FnOnce(T) -> U) -> Attr<U> {
        match self {
            Attr::Missing => Attr::Missing,
            Attr::Empty => Attr::Empty,
            Attr::Value(v) => Attr::Value(f(v)),
        }
    }

    fn is_present(&self) -> bool {
        !matches!(self, Attr::Missing)
    }

    fn value(&self) -> Option<&T> {
        match self {
            Attr::Value(v) => Some(v),
            Attr::Missing | Attr::Empty => None,
        }
    }

    fn into_value(self) -> Option<T> {
        match self {
            Attr::Value(v) => Some(v),
            Attr::Missing | Attr::Empty => None,
        }
    }
}

enum Relation {
    Forward(NamedNode),
    Reverse(NamedNode),
    List(NamedNode),
}

/// A list mapping created on an element, to be flushed after its subtree.
pub(crate) struct ListOwner {
    pub subject: Rc<NamedOrBlankNode>,
    pub lists: Rc<RefCell<ListMapping>>,
}

/// The outcome of processing one element.
pub(crate) struct Interpretation {
    /// Triples to emit, in the order they were produced.
    pub triples: Vec<Triple>,
    pub new_subject: Option<Rc<NamedOrBlankNode>>,
    pub current_object: Option<Rc<NamedOrBlankNode>>,
    pub skip: bool,
    /// The evaluation context for the element's children.
    pub child_context: EvaluationContext,
    pub list_owner: Option<ListOwner>,
}

// “During the course of processing a number of locally scoped values are needed, as follows:
struct LocalScope {
    base: Rc<Iri<String>>,
    // “An initially empty list of IRI mappings, called the local list of IRI mappings.
    iri_mappings: Rc<PrefixMapping>,
    // “An initially empty list of incomplete triples, called the local list of incomplete triples.
    incomplete_triples: Vec<IncompleteTriple>,
    // “An initially empty language value.
    current_language: Option<Rc<str>>,
    // “A skip element flag, which indicates whether the current element can safely be ignored
    //  since it has no relevant RDFa attributes. Note that descendant elements will still be processed.
    skip_element: bool,
    // “A new subject value, which once calculated will set the parent subject in an evaluation context,
    //  as well as being used to complete any incomplete triples, as described in the next section.
    new_subject: Option<Rc<NamedOrBlankNode>>,
    // “A value for the current object resource, the resource to use when creating triples that have a resource object.
    current_object_resource: Option<Rc<NamedOrBlankNode>>,
    // “A value for the typed resource, the source for creating rdf:type relationships to types specified in @typeof.
    typed_resource: Option<Rc<NamedOrBlankNode>>,
    // “The local term mappings, a list of terms and their associated IRIs.
    term_mappings: Rc<BTreeMap<String, NamedNode>>,
    // “The local list mapping, mapping IRIs to lists
    list_mapping: Rc<RefCell<ListMapping>>,
    // “A local default vocabulary, an IRI to use as a prefix mapping when a term is used.
    default_vocab: Option<NamedNode>,
}

impl LocalScope {
    fn new(ctx: &EvaluationContext) -> Self {
        // “First, the local values are initialized, as follows:
        Self {
            base: ctx.base.clone(),
            // “the skip element flag is set to 'false';
            skip_element: false,
            // “new subject is set to null;
            new_subject: None,
            // “current object resource is set to null;
            current_object_resource: None,
            // “typed resource is set to null;
            typed_resource: None,
            // “the local list of IRI mappings is set to the list of IRI mappings from the evaluation context;
            iri_mappings: ctx.iri_mappings.clone(),
            // “the local list of incomplete triples is set to null;
            incomplete_triples: Vec::new(),
            // “the list mapping is set to (a reference of) the list mapping from the evaluation context;
            list_mapping: ctx.list_mapping.clone(),
            // “the current language value is set to the language value from the evaluation context.
            current_language: ctx.language.clone(),
            // “the local term mappings is set to the term mappings from the evaluation context.
            term_mappings: ctx.term_mappings.clone(),
            // “the local default vocabulary is set to the default vocabulary from the evaluation context.
            default_vocab: ctx.default_vocab.clone(),
        }
    }

    fn resolver<'a>(&'a self, session: &'a Session) -> Resolver<'a> {
        Resolver {
            session,
            base: &self.base,
            prefixes: &self.iri_mappings,
            terms: &self.term_mappings,
            vocab: self.default_vocab.as_ref(),
        }
    }

    fn empty_curie(&self) -> Rc<NamedOrBlankNode> {
        Rc::new(NamedNode::new_unchecked(self.base.as_str()).into())
    }
}

/// The RDFa attributes of an element, resolved.
struct Attributes<'n> {
    about: Attr<Rc<NamedOrBlankNode>>,
    /// `@resource`, `@href` or `@src` (`@resource` or `@href` in RDFa 1.0).
    resource: Option<Rc<NamedOrBlankNode>>,
    resource_present: bool,
    type_of: Attr<Vec1<NamedOrBlankNode>>,
    property: Attr<Vec1<NamedNode>>,
    relations: Option<Vec<Relation>>,
    datatype: Attr<NamedOrBlankNode>,
    content: Option<&'n str>,
    inlist: bool,
}

fn read_attr<N: DocumentNode, T>(
    element: &N,
    name: &str,
    proj: impl FnOnce(&str) -> Option<T>,
) -> Attr<T> {
    match element.attr(name) {
        None => Attr::Missing,
        Some(v) => match proj(v) {
            None => Attr::Empty,
            Some(v) => Attr::Value(v),
        },
    }
}

fn read_attr_many<N: DocumentNode, T>(
    element: &N,
    name: &str,
    proj: impl FnOnce(&str) -> Vec<T>,
) -> Attr<Vec1<T>> {
    match element.attr(name) {
        None => Attr::Missing,
        Some(v) => match Vec1::try_from_vec(proj(v)) {
            Err(Size0Error) => Attr::Empty,
            Ok(v) => Attr::Value(v),
        },
    }
}

fn to_predicate(session: &Session, name: &str, v: NamedOrBlankNode) -> Option<NamedNode> {
    match v {
        NamedOrBlankNode::NamedNode(x) => Some(x),
        NamedOrBlankNode::BlankNode(b) => {
            session.warn(
                DiagnosticKind::Warning,
                format!("@{name} cannot refer to a bnode: [{b}]"),
            );
            None
        }
    }
}

impl<'n> Attributes<'n> {
    fn read<N: DocumentNode>(session: &Session, element: &'n N, resolver: &Resolver<'_>) -> Self {
        let is_1_0 = session.is_1_0();

        // RDFa 1.0 has no terms (other than the reserved @rel/@rev values) and no absolute IRIs here
        let curie_kind = if is_1_0 {
            ReferenceKind::CurieOrAbsIri
        } else {
            ReferenceKind::TermOrCurieOrAbsIri
        };

        let predicates = |name: &str, kind: ReferenceKind| {
            read_attr_many(element, name, |v| {
                resolver
                    .resolve_all(v, kind)
                    .into_iter()
                    .filter_map(|v| to_predicate(session, name, v))
                    .collect()
            })
        };

        let property = predicates("property", curie_kind);

        let inlist = !is_1_0 && element.attr("inlist").is_some();
        let rel_dir = if inlist {
            Relation::List
        } else {
            Relation::Forward
        };

        let (rel, rev) = if property.is_present() && session.host.has_html_extensions() {
            // [html-rdfa] extension #7
            // > if the @property attribute and the @rel and/or @rev attribute exists
            // > on the same element, the non-CURIE and non-URI @rel and @rev values
            // > are ignored. If, after this, the value of @rel and/or @rev becomes empty,
            // > then the processor MUST act as if the respective attribute is not present.
            let rel = predicates("rel", ReferenceKind::CurieOrAbsIri).into_value();
            let rev = predicates("rev", ReferenceKind::CurieOrAbsIri).into_value();
            (
                rel.map(|v| v.into_iter().map(rel_dir).collect::<Vec<_>>()),
                rev.map(|v| v.into_iter().map(Relation::Reverse).collect::<Vec<_>>()),
            )
        } else {
            let as_relations = |attr: Attr<Vec1<NamedNode>>, dir: fn(NamedNode) -> Relation| match attr {
                Attr::Missing => None,
                Attr::Empty => Some(Vec::new()),
                Attr::Value(v) => Some(v.into_iter().map(dir).collect::<Vec<_>>()),
            };
            (
                as_relations(predicates("rel", ReferenceKind::TermOrCurieOrAbsIri), rel_dir),
                as_relations(predicates("rev", ReferenceKind::TermOrCurieOrAbsIri), Relation::Reverse),
            )
        };

        let relations = match (rel, rev) {
            (None, None) => None,
            (Some(rel), None) => Some(rel),
            (None, Some(rev)) => Some(rev),
            (Some(mut rel), Some(rev)) => {
                rel.extend(rev);
                Some(rel)
            }
        };

        let safe = |v: &str| resolver.resolve(v, ReferenceKind::SafeCurieOrCurieOrIri);
        let iri = |v: &str| resolver.resolve(v, ReferenceKind::Iri);

        let about = match read_attr(element, "about", safe) {
            // RDFa 1.0: @src names the subject, not the object
            Attr::Missing if is_1_0 => read_attr(element, "src", iri),
            about => about,
        }
        .map(Rc::new);

        let mut resource_attrs = vec![
            read_attr(element, "resource", safe),
            read_attr(element, "href", iri),
        ];
        if !is_1_0 {
            resource_attrs.push(read_attr(element, "src", iri));
        }
        let resource_present = resource_attrs.iter().any(Attr::is_present);
        let resource = resource_attrs
            .into_iter()
            .find_map(Attr::into_value)
            .map(Rc::new);

        let type_of = read_attr_many(element, "typeof", |v| resolver.resolve_all(v, curie_kind));

        let datatype = read_attr(element, "datatype", |v| {
            // an empty @datatype asks for a plain literal; it is not an error
            let v = v.trim();
            (!v.is_empty())
                .then(|| resolver.resolve(v, curie_kind))
                .flatten()
        });

        Attributes {
            about,
            resource,
            resource_present,
            type_of,
            property,
            relations,
            datatype,
            content: element.attr("content"),
            inlist,
        }
    }
}

/// Reads the `@prefix` attribute: `prefix: iri` pairs separated by whitespace.
fn parse_prefix_attribute<'v>(session: &Session, value: &'v str) -> Vec<(&'v str, &'v str)> {
    let mut declarations = Vec::new();
    let mut tokens = value.split_ascii_whitespace();
    while let Some(token) = tokens.next() {
        let Some(iri) = tokens.next() else {
            session.warn(
                DiagnosticKind::Warning,
                format!("Missing IRI in prefix declaration for '{token}' (in '{value}')"),
            );
            break;
        };

        match token.strip_suffix(':') {
            Some(prefix) => declarations.push((prefix, iri)),
            None => session.warn(
                DiagnosticKind::Warning,
                format!("Invalid prefix declaration '{token}' (in '{value}')"),
            ),
        }
    }
    declarations
}

// 3.
// “Next, the current element is examined for IRI mappings and these are added to the local list of IRI mappings.
//  Note that an IRI mapping will simply overwrite any current mapping in the list that has the same name;
fn update_prefixes<N: DocumentNode>(session: &Session, element: &N, mappings: &mut Rc<PrefixMapping>) {
    let mut xmlns: Vec<(String, &str)> = element
        .attrs()
        .into_iter()
        .filter_map(|(name, value)| Some((name.strip_prefix("xmlns:")?.to_string(), value)))
        .collect();
    // attribute order is not meaningful, but diagnostics should be stable
    xmlns.sort();

    let prefixes = match element.attr("prefix") {
        Some(value) if !session.is_1_0() => parse_prefix_attribute(session, value),
        _ => Vec::new(),
    };

    if xmlns.is_empty() && prefixes.is_empty() {
        return;
    }

    let mut updated = PrefixMapping::clone(mappings);
    // XMLNS first, so that @prefix overrides it
    let declarations = xmlns
        .iter()
        .map(|(prefix, iri)| (prefix.as_str(), *iri))
        .chain(prefixes);

    for (prefix, iri) in declarations {
        let prefix = if session.is_1_0() {
            prefix.to_string()
        } else {
            prefix.to_ascii_lowercase()
        };

        if prefix == "_" {
            session.warn(
                DiagnosticKind::PrefixRedefinition,
                "The '_' prefix is reserved for blank nodes and cannot be mapped",
            );
            continue;
        }

        // note that we never set_default:
        // a "no prefix" mapping is a MUST NOT in RDFa
        if prefix.is_empty() || rxml_validation::validate_ncname(&prefix).is_err() {
            session.warn(
                DiagnosticKind::Warning,
                format!("Invalid prefix declaration (must be an NCName): '{prefix}'"),
            );
            continue;
        }

        trace!("- prefix {prefix}: is now <{iri}>");
        if updated.add_prefix(&prefix, iri).is_err() {
            session.warn(
                DiagnosticKind::PrefixRedefinition,
                format!("The prefix '{prefix}' cannot be mapped"),
            );
        }
    }

    *mappings = Rc::new(updated);
}

// 4. Language
// “The current element is also parsed for any language information,
//  and if present, current language is set accordingly;
fn update_language<N: DocumentNode>(
    session: &Session,
    element: &N,
    language: &mut Option<Rc<str>>,
) {
    let lang = match element.attr("xml:lang") {
        Some(lang) => Some(lang),
        // plain XML only knows xml:lang
        None if !session.host.supports_xml_base() => element.attr("lang"),
        None => None,
    };

    let Some(lang) = lang else {
        return;
    };

    if lang.is_empty() {
        *language = None;
        return;
    }

    // any well-formed BCP 47 tag, including extensions, private use and
    // grandfathered tags; stored lowercased like RDF literals store it
    match Literal::new_language_tagged_literal("", lang) {
        Ok(literal) => {
            let lang = literal.language().unwrap_or(lang);
            trace!("- current language is now: {lang}");
            *language = Some(Rc::from(lang));
        }
        Err(e) => session.warn(
            DiagnosticKind::Warning,
            format!("Invalid language identifier ({lang}): {e}"),
        ),
    }
}

// [role-attribute]
// > If a Host Language contains the @role attribute, then an
// > RDFa processor processing a document written in that Host Language
// > according to the rules of that Host Language MAY generate additional
// > triples for role attributes.
fn role_triples<N: DocumentNode>(
    session: &Session,
    element: &N,
    resolver: &Resolver<'_>,
    triples: &mut Vec<Triple>,
) {
    let Some(role) = element.attr("role") else {
        return;
    };

    // > If @id is present, it is used to supply the subject by concatenating
    // > the document's 'base', a fragment separator '#', and the value of @id.
    // > Otherwise the subject is a unique newly created bnode.
    let role_subject: NamedOrBlankNode = match element
        .attr("id")
        .and_then(|id| NamedNode::new(format!("{}#{id}", resolver.base.as_str())).ok())
    {
        Some(iri) => iri.into(),
        None => session.fresh_blank_node().into(),
    };

    // > An RDFa Processor MUST behave as if there is an in-scope vocabulary
    // > of http://www.w3.org/1999/xhtml/vocab# for the value(s) of the @role attribute.
    let xhv = NamedNode::new_unchecked(vocab::xhv::NAMESPACE);
    let role_resolver = Resolver {
        vocab: Some(&xhv),
        ..*resolver
    };

    // > Remember that @role values are defined using the datatype TERMorCURIEorAbsIRIs.
    for role in role_resolver.resolve_all(role, ReferenceKind::TermOrCurieOrAbsIri) {
        triples.push(Triple::new(role_subject.clone(), vocab::xhv::ROLE, role));
    }
}

/// Processes one element. `ctx` is the evaluation context handed down by the
/// parent; the root element is recognised by having no parent object.
pub(crate) fn interpret<N: DocumentNode>(
    session: &Session,
    element: &N,
    ctx: &EvaluationContext,
) -> Interpretation {
    let is_root_element = ctx.parent_object.is_none();
    let is_1_0 = session.is_1_0();
    let mut triples: Vec<Triple> = Vec::new();

    // 1.
    let mut local = LocalScope::new(ctx);

    if session.host.supports_xml_base() {
        if let Some(xml_base) = element.attr("xml:base") {
            match local.base.resolve(xml_base) {
                Ok(base) => {
                    trace!("- xml:base is now: {base}");
                    let base = base.resolve("").unwrap_or(base);
                    local.base = Rc::new(base);
                }
                Err(err) => session.warn(
                    DiagnosticKind::Warning,
                    format!("Invalid xml:base <{xml_base}> ({err})"),
                ),
            }
        }
    }

    // [rdfa-core] 7.5: 2.
    // > Next the current element is examined for any change to the default vocabulary via @vocab.
    if let Some(vocab) = element.attr("vocab").filter(|_| !is_1_0) {
        if vocab.is_empty() {
            trace!("- @vocab is empty, resetting default vocabulary");
            // > If the value is empty, then the local default vocabulary
            // > MUST be reset to the Host Language defined default (if any).
            local.default_vocab = session.host.default_vocabulary();
        } else {
            let resolved = local.resolver(session).resolve_relative_iri(vocab);
            match resolved {
                Ok(vocab) => {
                    trace!("- default vocabulary is now: {vocab}");
                    // > The value of @vocab is used to generate a triple as follows:
                    triples.push(Triple::new(
                        // >   subject = base
                        NamedNode::new_unchecked(local.base.as_str()),
                        // >   predicate = http://www.w3.org/ns/rdfa#usesVocabulary
                        vocab::rdfa::USES_VOCABULARY,
                        // >   object = value from @vocab
                        vocab.clone(),
                    ));
                    local.default_vocab = Some(vocab);
                }
                Err(err) => session.warn(
                    DiagnosticKind::Warning,
                    format!("Invalid @vocab <{vocab}> ({err})"),
                ),
            }
        }
    }

    // 3.
    update_prefixes(session, element, &mut local.iri_mappings);

    // 4.
    update_language(session, element, &mut local.current_language);

    let Attributes {
        about,
        resource: resource_value,
        resource_present,
        type_of,
        property,
        relations,
        datatype,
        content,
        inlist,
    } = {
        let resolver = local.resolver(session);
        if session.host.supports_role() {
            role_triples(session, element, &resolver, &mut triples);
        }
        Attributes::read(session, element, &resolver)
    };

    // [html-rdfa] extension #8 (and RDFa 1.0, which treats them like the root)
    let is_head_or_body = (session.host.has_html_extensions() || is_1_0)
        && matches!(element.name(), "head" | "body");

    // 5.
    // “If the current element contains no @rel or @rev attribute,
    if relations.is_none() {
        // “then the next step is to establish a value for new subject.
        //  This step has two possible alternatives.
        //
        // 5.1
        // “If the current element contains the @property attribute, but does
        //  not contain either the @content or @datatype attributes, then
        if !is_1_0 && property.is_present() && content.is_none() && !datatype.is_present() {
            // > new subject is set to the resource obtained from the first match from the following rule:
            // >
            // > - by using the resource from @about, if present,
            if let Some(about) = about.value() {
                trace!("- Using @about as new subject");
                local.new_subject = Some(about.clone());
            }
            // > - otherwise, if the element is the root element of the document,
            // >   then act as if there is an empty @about present,
            else if is_root_element {
                trace!("- Using empty @about as new subject");
                local.new_subject = Some(local.empty_curie());
            }
            // > - otherwise, if parent object is present, new subject is set to the value of parent object.
            else if let Some(parent_object) = &ctx.parent_object {
                trace!("- Using parent object as new subject: {parent_object}");
                local.new_subject = Some(parent_object.clone());
            }

            // “If @typeof is present then typed resource is set to the resource obtained from
            //  the first match from the following rules:
            if type_of.is_present() {
                // “by using the resource from @about, if present,
                if let Some(about) = about.value() {
                    trace!("- Using @about as typed resource");
                    local.typed_resource = Some(about.clone());
                }
                // “otherwise, if the element is the root element of the document,
                else if is_root_element {
                    local.typed_resource = Some(local.empty_curie());
                }
                // “otherwise,
                else {
                    // “by using the resource from @resource, if present, [...]
                    //  otherwise, the value of typed resource is set to a newly created bnode.
                    let typed_resource = match &resource_value {
                        Some(resource) => resource.clone(),
                        None => {
                            trace!("- Using new blank node as typed resource");
                            Rc::new(session.fresh_blank_node().into())
                        }
                    };

                    // “The value of the current object resource is then set to the value of typed resource.
                    local.typed_resource = Some(typed_resource.clone());
                    local.current_object_resource = Some(typed_resource);
                }
            }
        }
        // 5.2: “otherwise:
        else {
            // > If the element contains an @about, @href, @src, or @resource attribute,
            // > new subject is set to the resource obtained as follows:
            if about.is_present() || resource_present {
                if let Some(about) = about.value() {
                    trace!("- Using @about as new subject");
                    local.new_subject = Some(about.clone());
                } else if let Some(resource) = &resource_value {
                    trace!("- Using @resource/@href/@src as new subject");
                    local.new_subject = Some(resource.clone());
                }
            }

            if local.new_subject.is_none() && is_head_or_body {
                // > if no IRI is provided by a resource attribute
                // > (e.g., @about, @href, @resource, or @src), then
                // > first check to see if the element is the head or
                // > body element. If it is, then set new subject to parent object.
                local.new_subject = ctx.parent_object.clone();
            }

            // > otherwise, if no resource is provided by a resource attribute,
            // > then the first match from the following rules will apply:
            if local.new_subject.is_none() {
                // > if the element is the root element of the document,
                if is_root_element {
                    local.new_subject = Some(local.empty_curie());
                    trace!("- Using empty CURIE as new subject (root element)");
                }
                // > otherwise, if @typeof is present,
                else if type_of.is_present() {
                    // > then new subject is set to be a newly created bnode;
                    local.new_subject = Some(Rc::new(session.fresh_blank_node().into()));
                    trace!("- Using blank node as new subject (@typeof present)");
                }
                // > otherwise, if parent object is present,
                else if let Some(parent_object) = &ctx.parent_object {
                    // “new subject is set to the value of parent object.
                    local.new_subject = Some(parent_object.clone());
                    trace!("- Using parent object as new subject: {parent_object}");

                    // “Additionally, if @property is not present then the skip element flag is set to 'true'.
                    if !property.is_present() {
                        trace!("- Skip element set to 'true' (no @property).");
                        local.skip_element = true;
                    }
                }
            }

            // “Finally, if @typeof is present, set the typed resource to the value of new subject.
            if type_of.is_present() {
                local.typed_resource = local.new_subject.clone();
            }
        }
    }
    // 6.
    else {
        // > If the current element does contain a @rel or @rev attribute,
        // > then the next step is to establish both a value for new subject
        // > and a value for current object resource:
        //
        // > new subject is set to the resource obtained from the first match from the following rules:
        // > by using the resource from @about, if present,
        if let Some(about) = about.value() {
            trace!("- Using @about as new subject: {about}");
            local.new_subject = Some(about.clone());
        }

        // “If no resource is provided then the first match from the following rules will apply:
        if local.new_subject.is_none() {
            if is_root_element || (is_1_0 && is_head_or_body) {
                // “if the element is the root element of the document
                //  then act as if there is an empty @about present,
                local.new_subject = Some(local.empty_curie());
                trace!("- Using empty CURIE as new subject (root element)");
            } else if is_1_0 && type_of.is_present() {
                // RDFa 1.0: @typeof always types the subject
                local.new_subject = Some(Rc::new(session.fresh_blank_node().into()));
            } else {
                // ”otherwise, if parent object is present, new subject is set to that.
                local.new_subject = ctx.parent_object.clone();
            }
        }

        // > Then the current object resource is set to the resource obtained from the first match from the following rules:
        if let Some(resource) = &resource_value {
            // “by using the resource from @resource, if present, [...]
            local.current_object_resource = Some(resource.clone());
            trace!("- Using @resource/@href/@src as current object resource: {resource}");
        }
        // “otherwise, if @typeof is present and @about is not, use a newly created bnode.
        else if !is_1_0 && type_of.is_present() && !about.is_present() {
            local.current_object_resource = Some(Rc::new(session.fresh_blank_node().into()));
            trace!("- Using blank node as current object resource (@typeof present)");
        }

        if type_of.is_present() {
            local.typed_resource = if !is_1_0 && !about.is_present() {
                // “If @typeof is present and @about is not, set typed resource to current object resource.
                local.current_object_resource.clone()
            } else {
                // “if the @typeof attribute is present, set typed resource to new subject.
                local.new_subject.clone()
            };
        }
    }

    // 7.
    // “If in any of the previous steps a typed resource was set to a non-null value,
    //  it is now used to provide a subject for type values;
    if let (Some(typed_resource), Some(type_of)) = (&local.typed_resource, type_of.value()) {
        for type_iri in type_of {
            triples.push(Triple::new(
                // subject = typed resource
                NamedOrBlankNode::clone(typed_resource),
                // predicate = http://www.w3.org/1999/02/22-rdf-syntax-ns#type
                rdf::TYPE,
                // object = current full IRI of 'type' from typed resource
                type_iri.clone(),
            ));
        }
    }

    // 8.
    // “If in any of the previous steps a new subject
    //  was set to a non-null value different from the parent object;
    let mut list_owner = None;
    if let Some(new_subject) = &local.new_subject {
        if Some(new_subject) != ctx.parent_object.as_ref() {
            // “The list mapping taken from the evaluation context is set to a new, empty mapping.
            trace!("- Setting new list mapping");
            local.list_mapping = Default::default();
            list_owner = Some(ListOwner {
                subject: new_subject.clone(),
                lists: local.list_mapping.clone(),
            });
        }
    }

    // 9.
    // “If in any of the previous steps a current object resource was set to a non-null value,
    //  it is now used to generate triples and add entries to the local list mapping:
    if let Some(current_object_resource) = &local.current_object_resource {
        if let (Some(relations), Some(new_subject)) = (&relations, &local.new_subject) {
            let term: Rc<Term> = Rc::new(NamedOrBlankNode::clone(current_object_resource).into());
            for relation in relations {
                match relation {
                    // > If the element contains both the @inlist and the @rel attributes [...]
                    // > add the current object resource to the list associated with the
                    // > resource in the local list mapping
                    Relation::List(predicate) => {
                        local
                            .list_mapping
                            .borrow_mut()
                            .insert_value(predicate, term.clone());
                    }
                    // > If present, @rel may contain one or more resources, [...]
                    // > each of which is used to generate a triple as follows:
                    Relation::Forward(predicate) => {
                        triples.push(Triple::new(
                            NamedOrBlankNode::clone(new_subject),
                            predicate.clone(),
                            NamedOrBlankNode::clone(current_object_resource),
                        ));
                    }
                    // “If present, @rev may contain one or more resources, [...]
                    //  each of which is used to generate a triple as follows:
                    Relation::Reverse(predicate) => {
                        triples.push(Triple::new(
                            NamedOrBlankNode::clone(current_object_resource),
                            predicate.clone(),
                            NamedOrBlankNode::clone(new_subject),
                        ));
                    }
                }
            }
        }
    }
    // [rdfa-core] 7.5: 10.
    // > If however current object resource was set to null, but there are predicates present,
    // > then they must be stored as incomplete triples, pending the discovery of a subject
    // > that can be used as the object.
    else if let Some(relations) = &relations {
        // > Also, current object resource should be set to a newly created bnode
        local.current_object_resource = Some(Rc::new(session.fresh_blank_node().into()));
        for relation in relations {
            let incomplete = match relation {
                // > If the element contains the @inlist attribute,
                // > then if the local list mapping does not contain a list associated with the IRI,
                // > instantiate a new list and add to local list mappings.
                Relation::List(p) => {
                    IncompleteTriple::List(local.list_mapping.borrow_mut().ensure_list(p))
                }
                Relation::Forward(p) => IncompleteTriple::Forward(p.clone()),
                Relation::Reverse(p) => IncompleteTriple::Reverse(p.clone()),
            };
            local.incomplete_triples.push(incomplete);
        }

        trace!("- incomplete triples: {:?}", local.incomplete_triples);
    }

    // 11.
    // “The next step of the iteration is to establish any current property value;
    if let Some(properties) = property.into_value() {
        let html_extensions = session.host.has_html_extensions();

        // the resource-valued alternatives only apply when nothing asks for a literal
        let resource_object = match &datatype {
            Attr::Missing
                if !is_1_0
                    && content.is_none()
                    && literal::lexical_value(element, None, html_extensions)
                        .1
                        .is_none() =>
            {
                // “otherwise, if the @rel, @rev, and @content attributes are not present,
                //  as a resource obtained from @resource, @href or @src
                if relations.is_none() && resource_value.is_some() {
                    resource_value.clone()
                }
                // “otherwise, if @typeof is present and @about is not, the value of typed resource.
                else if type_of.is_present() && !about.is_present() {
                    local.typed_resource.clone()
                } else {
                    None
                }
            }
            _ => None,
        };

        let current_property_value: Term = match resource_object {
            Some(resource) => NamedOrBlankNode::clone(&resource).into(),
            None => {
                let datatype = match &datatype {
                    Attr::Missing => DatatypeChoice::Absent,
                    Attr::Empty => DatatypeChoice::Plain,
                    Attr::Value(NamedOrBlankNode::NamedNode(datatype)) => {
                        DatatypeChoice::Typed(datatype)
                    }
                    Attr::Value(NamedOrBlankNode::BlankNode(b)) => {
                        session.warn(
                            DiagnosticKind::MalformedLiteral,
                            format!("@datatype cannot refer to a bnode: [{b}]"),
                        );
                        DatatypeChoice::Plain
                    }
                };
                literal::property_literal(
                    session,
                    element,
                    content,
                    datatype,
                    local.current_language.as_deref(),
                )
                .into()
            }
        };

        // “If the element also includes the @inlist attribute, the current property
        //  value is added to the local list mapping as follows:
        if inlist {
            let term: Rc<Term> = Rc::new(current_property_value);
            for property in properties {
                local
                    .list_mapping
                    .borrow_mut()
                    .insert_value(&property, term.clone());
            }
        } else if let Some(new_subject) = &local.new_subject {
            // “Otherwise the current property value is used to generate a triple as follows:
            for property in properties {
                triples.push(Triple::new(
                    NamedOrBlankNode::clone(new_subject),
                    property,
                    current_property_value.clone(),
                ));
            }
        }
    }

    // 12.
    // “If the skip element flag is 'false', and new subject was set to a non-null value,
    //  then any incomplete triples within the current context should be completed:
    if !local.skip_element {
        if let Some(new_subject) = &local.new_subject {
            for incomplete in &ctx.incomplete_triples {
                match incomplete {
                    // “If direction is 'none',
                    //  the new subject is added to the list from the iterated incomplete triple.
                    IncompleteTriple::List(list) => list
                        .borrow_mut()
                        .push(Rc::new(NamedOrBlankNode::clone(new_subject).into())),
                    // “If direction is 'forward' then the following triple is generated:
                    IncompleteTriple::Forward(predicate) => triples.push(Triple::new(
                        NamedOrBlankNode::clone(&ctx.parent_subject),
                        predicate.clone(),
                        NamedOrBlankNode::clone(new_subject),
                    )),
                    // “If direction is 'reverse' then this is the triple generated:
                    IncompleteTriple::Reverse(predicate) => triples.push(Triple::new(
                        NamedOrBlankNode::clone(new_subject),
                        predicate.clone(),
                        NamedOrBlankNode::clone(&ctx.parent_subject),
                    )),
                }
            }
        }
    }

    // 13.
    // “Next, all elements that are children of the current element are processed
    //  using the rules described here, using a new evaluation context, initialized as follows:
    let child_context = if local.skip_element {
        // “If the skip element flag is 'true' then the new evaluation context is a copy of the current
        //  context that was passed in to this level of processing, with the language and list of IRI
        //  mappings values replaced with the local values;
        EvaluationContext {
            base: local.base,
            language: local.current_language,
            iri_mappings: local.iri_mappings,
            // ERRATA: this also needs to be copied
            default_vocab: local.default_vocab,
            ..ctx.clone()
        }
    } else {
        // “ Otherwise, the values are:
        EvaluationContext {
            base: local.base,
            // “ the parent subject is set to the value of new subject, if non-null,
            //   or the value of the parent subject of the current evaluation context;
            parent_subject: local
                .new_subject
                .clone()
                .unwrap_or_else(|| ctx.parent_subject.clone()),
            // “ the parent object is set to value of current object resource, if non-null,
            //   or the value of new subject, if non-null, or the value of the parent subject
            //   of the current evaluation context;
            parent_object: Some(
                local
                    .current_object_resource
                    .as_ref()
                    .or(local.new_subject.as_ref())
                    .cloned()
                    .unwrap_or_else(|| ctx.parent_subject.clone()),
            ),
            iri_mappings: local.iri_mappings,
            incomplete_triples: local.incomplete_triples,
            list_mapping: local.list_mapping,
            language: local.current_language,
            default_vocab: local.default_vocab,
            term_mappings: local.term_mappings,
        }
    };

    Interpretation {
        triples,
        new_subject: local.new_subject,
        current_object: local.current_object_resource,
        skip: local.skip_element,
        child_context,
        list_owner,
    }
}
