//! An RDFa 1.1 distiller.
//!
//! The distiller walks a parsed document and turns its RDFa attributes into
//! RDF triples, following the processing rules of [RDFa Core 1.1] and the
//! additional rules of [HTML+RDFa 1.1]. RDFa 1.0 documents are handled by a
//! separate profile, selected by [`Options::version`] or the root `@version`.
//!
//! Triples go to a [`TripleSink`]; warnings and errors go to a second sink as
//! a processor graph (RDFa Core 7.6).
//!
//! ```
//! let mut output = oxrdf::Graph::new();
//! let mut processor = oxrdf::Graph::new();
//! rdfa_distiller::process_html(
//!     r#"<p about="http://example.com/" property="dc:title">Hello</p>"#,
//!     "http://example.org/",
//!     &rdfa_distiller::Options::default(),
//!     &mut output,
//!     &mut processor,
//! )?;
//! assert_eq!(output.len(), 1);
//! # Ok::<(), rdfa_distiller::Error>(())
//! ```
//!
//! [RDFa Core 1.1]: https://www.w3.org/TR/rdfa-core/
//! [HTML+RDFa 1.1]: https://www.w3.org/TR/html-rdfa/

use oxiri::Iri;
use oxrdf::{BlankNode, Graph};
use scraper::Html;
use tracing::debug;

mod context;
mod copying;
mod dom;
mod embedded;
mod evaluator;
mod interpret;
mod literal;
mod options;
mod resolver;
mod sink;
mod vocab;

pub use copying::copy_properties;
pub use dom::{DocumentNode, html_base_href};
pub use options::{HostLanguage, Options, RdfaVersion};
pub use sink::{Diagnostic, DiagnosticKind, Discard, NamedGraph, TripleSink};
pub use vocab::{initial_context_prefixes, initial_context_terms};

use context::{EvaluationContext, Session};

#[derive(derive_more::Error, derive_more::Display, Debug)]
pub enum Error {
    #[display("Invalid base IRI: `{iri}`")]
    InvalidBase {
        source: oxiri::IriParseError,
        iri: String,
    },

    #[display("Invalid blank node prefix: `{prefix}`")]
    InvalidBlankNodePrefix {
        source: oxrdf::BlankNodeIdParseError,
        prefix: String,
    },

    #[display("Malformed document: <{child}> is a child of '{parent}' but does not name it as its parent")]
    StructuralViolation { parent: String, child: String },
}

fn parse_base(base: &str) -> Result<Iri<String>, Error> {
    Iri::parse(base.to_string()).map_err(|source| Error::InvalidBase {
        source,
        iri: base.to_string(),
    })
}

fn label_prefix(options: &Options) -> Result<String, Error> {
    let Some(prefix) = &options.blank_node_prefix else {
        return Ok(format!("{}-", BlankNode::default().as_str()));
    };

    BlankNode::new(format!("{prefix}b0")).map_err(|source| Error::InvalidBlankNodePrefix {
        source,
        prefix: prefix.clone(),
    })?;
    Ok(prefix.clone())
}

fn new_session<N: DocumentNode>(root: &N, options: &Options) -> Result<Session, Error> {
    let version = options
        .version
        .or_else(|| {
            root.attr("version")
                .and_then(RdfaVersion::from_version_attribute)
        })
        .unwrap_or_default();
    Ok(Session::new(version, options.host_language)
        .with_label_prefix(label_prefix(options)?)
        .with_embedded_turtle(options.embedded_turtle))
}

fn run<N: DocumentNode>(
    session: &Session,
    root: &N,
    base: Iri<String>,
    options: &Options,
    output: &mut impl TripleSink,
    processor: &mut impl TripleSink,
) -> Result<(), Error> {
    debug!(version = ?session.version, host = ?session.host, %base, "distilling document");
    let context = EvaluationContext::new(session, base, options);
    evaluator::evaluate(session, root, context, output, processor)
}

/// Distills the tree rooted at `root`.
///
/// `base` is the document IRI, replaced by [`Options::base`] when set.
/// Triples are sent to `output` in document order; diagnostics are sent to
/// `processor` as a processor graph.
pub fn distill<N: DocumentNode>(
    root: &N,
    base: Iri<String>,
    options: &Options,
    output: &mut impl TripleSink,
    processor: &mut impl TripleSink,
) -> Result<(), Error> {
    let session = new_session(root, options)?;
    let base = options.base.clone().unwrap_or(base);
    run(&session, root, base, options, output, processor)
}

/// Parses `input` as HTML and distills it.
///
/// A `<base href>` in the document head overrides `base`, unless
/// [`Options::base`] is set.
pub fn distill_html(
    input: &str,
    base: &str,
    options: &Options,
    output: &mut impl TripleSink,
    processor: &mut impl TripleSink,
) -> Result<(), Error> {
    let mut base = parse_base(base)?;

    let doc = Html::parse_document(input);
    for err in &doc.errors {
        debug!("HTML parse error: {err}");
    }

    let root = doc.root_element();
    let session = new_session(&root, options)?;

    if let Some(base_override) = &options.base {
        base = base_override.clone();
    } else if let Some(href) = html_base_href(&doc) {
        match base.resolve(href) {
            Ok(resolved) => {
                debug!("<base> found: {resolved}");
                base = resolved;
            }
            Err(err) => session.warn(
                DiagnosticKind::Warning,
                format!("Invalid <base href=\"{href}\"> ({err}); using <{base}>"),
            ),
        }
    }

    run(&session, &root, base, options, output, processor)
}

/// Distills HTML into graphs, then applies property copying if
/// [`Options::property_copying`] is enabled.
pub fn process_html(
    input: &str,
    base: &str,
    options: &Options,
    output_graph: &mut Graph,
    processor_graph: &mut Graph,
) -> Result<(), Error> {
    distill_html(input, base, options, output_graph, processor_graph)?;
    if options.property_copying {
        copy_properties(output_graph);
    }

    Ok(())
}
