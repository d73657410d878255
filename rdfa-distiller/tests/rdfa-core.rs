// Processing rules from: https://www.w3.org/TR/rdfa-core/
use oxrdf::{Literal, NamedNode, Triple};
use rdfa_distiller::{Discard, HostLanguage, Options, RdfaVersion, distill_html};
use rstest::rstest;

mod utils;

#[test]
fn chaining_through_incomplete_triples() {
    let html = r#"
    <div about="http://example.org/alice" rel="foaf:knows">
      <span about="http://example.org/bob" property="foaf:name">Bob</span>
      <span typeof="foaf:Person"><span property="foaf:name">Carol</span></span>
    </div>
    <div about="http://example.org/alice" rev="dc:creator" resource="http://example.org/book"></div>"#;

    let ttl = r#"
    @prefix foaf: <http://xmlns.com/foaf/0.1/> .
    <http://example.org/alice> foaf:knows <http://example.org/bob>, _:carol .
    <http://example.org/bob> foaf:name "Bob" .
    _:carol a foaf:Person ;
        foaf:name "Carol" .
    <http://example.org/book> <http://purl.org/dc/terms/creator> <http://example.org/alice> .
    "#;

    utils::assert_graph(html, ttl);
}

#[test]
fn typeof_with_property_creates_a_nested_resource() {
    let html = r#"
    <div vocab="http://schema.org/" about="http://example.org/post">
      <span property="author" typeof="Person"><span property="name">Ann</span></span>
    </div>"#;

    let ttl = r#"
    @prefix schema: <http://schema.org/> .
    <> <http://www.w3.org/ns/rdfa#usesVocabulary> schema: .
    <http://example.org/post> schema:author [ a schema:Person ; schema:name "Ann" ] .
    "#;

    utils::assert_graph(html, ttl);
}

#[test]
fn inlist_collects_values_in_document_order() {
    let html = r#"
    <p about="http://example.org/book">
      <span property="dc:creator" inlist>Ada</span>
      <span property="dc:creator" inlist>Charles</span>
      <a rel="dc:source" inlist href="http://example.org/a"></a>
    </p>
    <p about="http://example.org/empty" rel="dc:hasPart" inlist></p>"#;

    let ttl = r#"
    @prefix dc: <http://purl.org/dc/terms/> .
    <http://example.org/book> dc:creator ("Ada" "Charles") ;
        dc:source (<http://example.org/a>) .
    <http://example.org/empty> dc:hasPart () .
    "#;

    utils::assert_graph(html, ttl);
}

#[test]
fn rel_inlist_is_completed_by_descendants_in_order() {
    let html = r#"
    <div about="http://s/" prefix="ex: http://example.org/ns#" rel="ex:p" inlist="">
      <span resource="a"></span>
      <span><span resource="b"></span></span>
      <span resource="c"></span>
    </div>"#;

    let ttl = r#"
    <http://s/> <http://example.org/ns#p> (<a> <b> <c>) .
    "#;

    utils::assert_graph(html, ttl);
}

#[test]
fn property_with_dc_elements_prefix_gives_one_triple() {
    let options = Options::default()
        .with_prefix("dc", "http://purl.org/dc/elements/1.1/")
        .with_blank_node_prefix("");

    let mut triples: Vec<Triple> = Vec::new();
    distill_html(
        r#"<p about="http://s/" property="dc:title">Hello</p>"#,
        utils::BASE,
        &options,
        &mut triples,
        &mut Discard,
    )
    .unwrap();

    pretty_assertions::assert_eq!(
        triples,
        [Triple::new(
            NamedNode::new_unchecked("http://s/"),
            NamedNode::new_unchecked("http://purl.org/dc/elements/1.1/title"),
            Literal::new_simple_literal("Hello"),
        )]
    );
}

#[test]
fn terms_and_curies_resolve_differently() {
    let options = Options::default().with_term("ex", NamedNode::new_unchecked("http://example.org/terms/ex"));

    utils::assert_graph_with(
        r#"<p prefix="ex: http://example.org/ns#" about="http://example.org/s" property="ex ex:foo">v</p>"#,
        r#"
        <http://example.org/s> <http://example.org/terms/ex> "v" ;
            <http://example.org/ns#foo> "v" .
        "#,
        &options,
    );
}

#[test]
fn prefixes_are_scoped_to_the_subtree() {
    let html = r#"
    <div prefix="ex: http://example.org/one#">
      <p about="http://example.org/s" property="ex:p">1</p>
      <p prefix="EX: http://example.org/two#" about="http://example.org/s" property="ex:p">2</p>
    </div>
    <p about="http://example.org/s" property="ex:p">3</p>"#;

    // outside the div, "ex:p" is an IRI with the scheme "ex"
    let ttl = r#"
    <http://example.org/s> <http://example.org/one#p> "1" ;
        <http://example.org/two#p> "2" ;
        <ex:p> "3" .
    "#;

    utils::assert_graph(html, ttl);
}

#[test]
fn language_is_inherited_and_can_be_cleared() {
    let html = r#"
    <div lang="en">
      <p about="http://example.org/s" property="dc:title">Hi</p>
      <p about="http://example.org/t" property="dc:title" xml:lang="">No</p>
      <p about="http://example.org/u" property="dc:title" lang="de" datatype="xsd:string">typed</p>
      <p about="http://example.org/v" property="dc:title" lang="not a tag!">bad</p>
      <p about="http://example.org/w" property="dc:title" lang="en-x-foo">private</p>
      <p about="http://example.org/w" property="dc:title" lang="de-DE-u-co-phonebk">extension</p>
      <p about="http://example.org/w" property="dc:title" lang="i-klingon">grandfathered</p>
    </div>"#;

    let ttl = r#"
    @prefix dc: <http://purl.org/dc/terms/> .
    <http://example.org/s> dc:title "Hi"@en .
    <http://example.org/t> dc:title "No" .
    <http://example.org/u> dc:title "typed" .
    <http://example.org/v> dc:title "bad"@en .
    <http://example.org/w> dc:title "private"@en-x-foo ,
        "extension"@de-de-u-co-phonebk ,
        "grandfathered"@i-klingon .
    "#;

    utils::assert_graph(html, ttl);
}

#[rstest]
#[case::typed(r#"content="42" datatype="xsd:integer""#, r#""42"^^xsd:integer"#, 0)]
#[case::malformed(r#"datatype="xsd:integer""#, r#""forty-two""#, 1)]
#[case::empty_datatype(r#"datatype="""#, r#""forty-two""#, 0)]
#[case::unchecked_datatype(r#"datatype="xsd:token""#, r#""forty-two"^^xsd:token"#, 0)]
fn datatypes(#[case] attrs: &str, #[case] object: &str, #[case] warnings: usize) {
    let html = format!(
        r#"<p about="http://example.org/s" property="http://example.org/p" {attrs}>forty-two</p>"#
    );
    let ttl = format!(
        r#"
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
        <http://example.org/s> <http://example.org/p> {object} .
        "#
    );

    utils::assert_graph(&html, &ttl);

    let (_, processor_graph) = utils::distill(&html, &Options::default());
    let warning = NamedNode::new_unchecked("http://www.w3.org/ns/rdfa#Warning");
    assert_eq!(
        processor_graph
            .subjects_for_predicate_object(oxrdf::vocab::rdf::TYPE, warning.as_ref())
            .count(),
        warnings
    );
}

#[test]
fn output_is_deterministic() {
    let html = r#"
    <div typeof="foaf:Person" rel="foaf:knows">
      <span typeof="foaf:Person" property="foaf:name">Bo</span>
      <span property="foaf:nick" inlist>a</span>
      <span property="foaf:nick" inlist>b</span>
    </div>"#;

    let run = || {
        let mut triples: Vec<Triple> = Vec::new();
        let options = Options::default().with_blank_node_prefix("");
        distill_html(html, utils::BASE, &options, &mut triples, &mut Discard).unwrap();
        triples
    };

    let first = run();
    assert!(!first.is_empty());
    pretty_assertions::assert_eq!(first, run());
}

#[test]
fn rdfa_1_0_profile() {
    let html = r#"<html version="XHTML+RDFa 1.0" xmlns:foaf="http://xmlns.com/foaf/0.1/">
    <body>
      <div about="http://example.org/s" property="foaf:name">Jo <em>Doe</em></div>
      <img src="http://example.org/photo" rel="foaf:depicts" resource="http://example.org/s">
      <a rel="next" href="http://example.org/2">next</a>
      <div vocab="http://schema.org/" about="http://example.org/v" property="name">ignored</div>
    </body>
    </html>"#;

    let ttl = r#"
    @prefix foaf: <http://xmlns.com/foaf/0.1/> .
    <http://example.org/s> foaf:name
        "Jo <em>Doe</em>"^^<http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral> .
    <http://example.org/photo> foaf:depicts <http://example.org/s> .
    <> <http://www.w3.org/1999/xhtml/vocab#next> <http://example.org/2> .
    "#;

    utils::assert_graph(html, ttl);
}

#[test]
fn version_option_overrides_the_document() {
    let html = r#"<html version="XHTML+RDFa 1.0">
    <body><div vocab="http://schema.org/" about="http://example.org/v" property="name">kept</div></body>
    </html>"#;

    let ttl = r#"
    <> <http://www.w3.org/ns/rdfa#usesVocabulary> <http://schema.org/> .
    <http://example.org/v> <http://schema.org/name> "kept" .
    "#;

    utils::assert_graph_with(html, ttl, &Options::default().with_version(RdfaVersion::V1_1));
}

#[test]
fn xml_host_honours_xml_base() {
    let html = r#"
    <div xml:base="http://other.example/dir/">
      <p about="x" lang="en" property="http://example.org/p">T</p>
    </div>
    <p about="y" property="http://example.org/p">U</p>"#;

    // plain XML has no @lang
    let ttl = r#"
    <http://other.example/dir/x> <http://example.org/p> "T" .
    <http://example.org/y> <http://example.org/p> "U" .
    "#;

    utils::assert_graph_with(
        html,
        ttl,
        &Options::default().with_host_language(HostLanguage::Xml),
    );
}
