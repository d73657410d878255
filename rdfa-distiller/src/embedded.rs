//! Turtle embedded in HTML through `<script type="text/turtle">`.

use std::collections::HashMap;

use oxiri::Iri;
use oxrdf::{BlankNode, Subject, Term, Triple};
use oxttl::TurtleParser;
use tracing::trace;

use crate::context::{EvaluationContext, Session};
use crate::dom::DocumentNode;
use crate::sink::DiagnosticKind;

pub(crate) fn is_turtle_script<N: DocumentNode>(element: &N) -> bool {
    element.name().eq_ignore_ascii_case("script")
        && element
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("text/turtle"))
}

/// Parses the script's content against the base and prefixes in scope.
///
/// Either every triple of the script is returned or, when the content is not
/// valid Turtle, none is and an error is recorded.
pub(crate) fn script_triples<N: DocumentNode>(
    session: &Session,
    element: &N,
    ctx: &EvaluationContext,
) -> Vec<Triple> {
    // the HTML parser leaves CDATA markers inside <script> as text
    let content = element
        .text_content()
        .replace("<![CDATA[", "")
        .replace("]]>", "");

    let parser = TurtleParser::new()
        .with_base_iri(ctx.base.as_str())
        .and_then(|parser| {
            ctx.iri_mappings
                .mappings()
                .filter(|(_, iri)| Iri::parse(iri.as_str()).is_ok())
                .try_fold(parser, |parser, (prefix, iri)| {
                    parser.with_prefix(prefix.as_str(), iri.as_str())
                })
        });
    let parser = match parser {
        Ok(parser) => parser,
        Err(e) => {
            session.warn(
                DiagnosticKind::Error,
                format!("Embedded Turtle cannot be set up ({e}); ignored"),
            );
            return Vec::new();
        }
    };

    let parsed: Result<Vec<Triple>, _> = parser.for_slice(content.as_bytes()).collect();
    match parsed {
        Ok(triples) => {
            trace!("- Embedded Turtle gave {} triples", triples.len());
            relabel(session, triples)
        }
        Err(e) => {
            session.warn(
                DiagnosticKind::Error,
                format!("Embedded Turtle content could not be parsed ({e}); ignored"),
            );
            Vec::new()
        }
    }
}

// script labels are local to the script; map them onto the document's nodes
fn relabel(session: &Session, triples: Vec<Triple>) -> Vec<Triple> {
    let mut mapping: HashMap<BlankNode, BlankNode> = HashMap::new();
    let mut node = |b: BlankNode| {
        mapping
            .entry(b)
            .or_insert_with(|| session.fresh_blank_node())
            .clone()
    };

    triples
        .into_iter()
        .map(|triple| {
            let subject = match triple.subject {
                Subject::BlankNode(b) => Subject::from(node(b)),
                subject => subject,
            };
            let object = match triple.object {
                Term::BlankNode(b) => Term::from(node(b)),
                object => object,
            };
            Triple::new(subject, triple.predicate, object)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use oxrdf::{Literal, NamedNode};
    use scraper::{ElementRef, Html, Selector};

    use super::*;
    use crate::options::{HostLanguage, Options, RdfaVersion};

    fn with_script<T>(html: &str, f: impl FnOnce(ElementRef<'_>) -> T) -> T {
        let doc = Html::parse_document(html);
        let sel = Selector::parse("script").unwrap();
        f(doc.select(&sel).next().unwrap())
    }

    fn context(session: &Session) -> EvaluationContext {
        let base = Iri::parse("http://example.org/doc".to_string()).unwrap();
        EvaluationContext::new(session, base, &Options::default())
    }

    #[test]
    fn only_turtle_scripts_are_recognised() {
        assert!(with_script(r#"<script type="text/turtle"></script>"#, |s| is_turtle_script(&s)));
        assert!(with_script(r#"<script type=" Text/Turtle "></script>"#, |s| is_turtle_script(&s)));
        assert!(!with_script(r#"<script type="text/javascript"></script>"#, |s| is_turtle_script(&s)));
        assert!(!with_script(r#"<script></script>"#, |s| is_turtle_script(&s)));
    }

    #[test]
    fn uses_base_and_prefixes_in_scope() {
        let session = Session::new(RdfaVersion::V1_1, HostLanguage::Html);
        let ctx = context(&session);
        let triples = with_script(
            r#"<script type="text/turtle"><![CDATA[
                <#me> foaf:name "Me" ; foaf:knows [ foaf:name "You" ] .
            ]]></script>"#,
            |s| script_triples(&session, &s, &ctx),
        );

        let name = NamedNode::new_unchecked("http://xmlns.com/foaf/0.1/name");
        assert_eq!(triples.len(), 3);
        assert!(triples.contains(&Triple::new(
            NamedNode::new_unchecked("http://example.org/doc#me"),
            name.clone(),
            Literal::new_simple_literal("Me"),
        )));
        assert!(triples.contains(&Triple::new(
            BlankNode::new_unchecked("b0"),
            name,
            Literal::new_simple_literal("You"),
        )));
        assert!(session.take_diagnostics().is_empty());
    }

    #[test]
    fn invalid_content_is_dropped_whole() {
        let session = Session::new(RdfaVersion::V1_1, HostLanguage::Html);
        let ctx = context(&session);
        let triples = with_script(
            r#"<script type="text/turtle"><http://s> <http://p> "o" . this is not turtle</script>"#,
            |s| script_triples(&session, &s, &ctx),
        );

        assert!(triples.is_empty());
        let diagnostics = session.take_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Error);
    }
}
