//! Building the literal value of `@property` (RDFa Core 7.5 step 11).

use std::borrow::Cow;
use std::str::FromStr;

use oxrdf::vocab::{rdf, xsd};
use oxrdf::{Literal, NamedNode, NamedNodeRef};

use crate::context::Session;
use crate::dom::DocumentNode;
use crate::sink::DiagnosticKind;
use crate::vocab;

/// How `@datatype` constrains the literal.
pub(crate) enum DatatypeChoice<'a> {
    /// No `@datatype` attribute.
    Absent,
    /// `@datatype=""`, or a value that resolved to nothing usable.
    Plain,
    Typed(&'a NamedNode),
}

/// The lexical value of the element: `@content`, then the HTML `@datetime`,
/// then the text of `<time>` or any other element.
///
/// The second value is the datatype inferred for HTML date/time values.
pub(crate) fn lexical_value<'n, N: DocumentNode>(
    element: &'n N,
    content: Option<&'n str>,
    html_extensions: bool,
) -> (Cow<'n, str>, Option<NamedNodeRef<'static>>) {
    if let Some(content) = content {
        return (content.into(), None);
    }

    if html_extensions {
        // [html-rdfa] extension #9 & #10
        let value = element.attr("datetime").map(Cow::Borrowed).or_else(|| {
            (element.name() == "time").then(|| Cow::Owned(element.text_content()))
        });

        if let Some(value) = value {
            let datatype = html_datetime_datatype(&value);
            return (value, datatype);
        }
    }

    (Cow::Owned(element.text_content()), None)
}

/// [html-rdfa] extension #9:
/// “if the value of @datetime lexically matches a valid xsd:date, xsd:time,
///  xsd:dateTime, xsd:duration, xsd:gYear, or xsd:gYearMonth a typed literal must be generated”
fn html_datetime_datatype(value: &str) -> Option<NamedNodeRef<'static>> {
    if oxsdatatypes::Duration::from_str(value).is_ok() {
        Some(xsd::DURATION)
    } else if oxsdatatypes::DateTime::from_str(value).is_ok() {
        Some(xsd::DATE_TIME)
    } else if oxsdatatypes::Date::from_str(value).is_ok() {
        Some(xsd::DATE)
    } else if oxsdatatypes::Time::from_str(value).is_ok() {
        Some(xsd::TIME)
    } else if oxsdatatypes::GYearMonth::from_str(value).is_ok() {
        Some(xsd::G_YEAR_MONTH)
    } else if oxsdatatypes::GYear::from_str(value).is_ok() {
        Some(xsd::G_YEAR)
    } else {
        None
    }
}

/// Whether `value` is a valid lexical form for `datatype`.
/// Datatypes without a checker are always accepted.
fn is_valid_lexical_form(value: &str, datatype: NamedNodeRef<'_>) -> bool {
    // whitespace collapses for all of the checked types
    let value = value.trim();
    match datatype {
        d if d == xsd::BOOLEAN => oxsdatatypes::Boolean::from_str(value).map(drop).is_ok(),
        d if d == xsd::INTEGER => oxsdatatypes::Integer::from_str(value).map(drop).is_ok(),
        d if d == xsd::DECIMAL => oxsdatatypes::Decimal::from_str(value).map(drop).is_ok(),
        d if d == xsd::DOUBLE => oxsdatatypes::Double::from_str(value).map(drop).is_ok(),
        d if d == xsd::FLOAT => oxsdatatypes::Float::from_str(value).map(drop).is_ok(),
        d if d == xsd::DATE => oxsdatatypes::Date::from_str(value).map(drop).is_ok(),
        d if d == xsd::DATE_TIME => oxsdatatypes::DateTime::from_str(value).map(drop).is_ok(),
        d if d == xsd::TIME => oxsdatatypes::Time::from_str(value).map(drop).is_ok(),
        d if d == xsd::DURATION => oxsdatatypes::Duration::from_str(value).map(drop).is_ok(),
        d if d == xsd::G_YEAR => oxsdatatypes::GYear::from_str(value).map(drop).is_ok(),
        d if d == xsd::G_YEAR_MONTH => {
            oxsdatatypes::GYearMonth::from_str(value).map(drop).is_ok()
        }
        _ => true,
    }
}

/// `language` has already been checked and normalized by the caller.
pub(crate) fn plain_literal(value: &str, language: Option<&str>) -> Literal {
    match language {
        Some(lang) => Literal::new_language_tagged_literal_unchecked(value, lang),
        None => Literal::new_simple_literal(value),
    }
}

/// The literal for `@property`. The caller has already handled the cases
/// where the value is a resource rather than a literal.
pub(crate) fn property_literal<N: DocumentNode>(
    session: &Session,
    element: &N,
    content: Option<&str>,
    datatype: DatatypeChoice<'_>,
    language: Option<&str>,
) -> Literal {
    let html_extensions = session.host.has_html_extensions();

    match datatype {
        // “otherwise, as a plain literal if @datatype is present but has an empty value
        //  according to the section on CURIE and IRI Processing.
        DatatypeChoice::Plain => {
            let (value, _) = lexical_value(element, content, html_extensions);
            plain_literal(&value, language)
        }
        DatatypeChoice::Typed(datatype)
            if content.is_none()
                && (datatype.as_ref() == rdf::XML_LITERAL || datatype.as_ref() == vocab::rdf::HTML) =>
        {
            // “The value of the XML literal is a string created by serializing to text,
            //  all nodes that are descendants of the current element, i.e., not including
            //  the element itself.
            // The markup is the host serialization, not exclusive canonical XML.
            Literal::new_typed_literal(element.inner_markup(), datatype.clone())
        }
        // “as a typed literal if @datatype is present, does not have an empty value according
        //  to the section on CURIE and IRI Processing, and is not set to XMLLiteral
        DatatypeChoice::Typed(datatype) => {
            let (value, _) = lexical_value(element, content, html_extensions);
            if is_valid_lexical_form(&value, datatype.as_ref()) {
                Literal::new_typed_literal(value, datatype.clone())
            } else {
                session.warn(
                    DiagnosticKind::MalformedLiteral,
                    format!("\"{value}\" is not a valid lexical form for <{}>; using a plain literal", datatype.as_str()),
                );
                plain_literal(&value, language)
            }
        }
        DatatypeChoice::Absent => {
            if session.is_1_0() && content.is_none() && element.has_element_children() {
                // RDFa 1.0: markup inside the element makes an XML literal
                return Literal::new_typed_literal(element.inner_markup(), rdf::XML_LITERAL);
            }

            let (value, inferred) = lexical_value(element, content, html_extensions);
            match inferred {
                Some(datatype) => Literal::new_typed_literal(value, datatype),
                None => plain_literal(&value, language),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use scraper::{ElementRef, Html, Selector};

    use super::*;
    use crate::options::{HostLanguage, RdfaVersion};

    fn with_element<T>(html: &str, f: impl FnOnce(ElementRef<'_>) -> T) -> T {
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse("[property]").unwrap();
        f(doc.select(&sel).next().unwrap())
    }

    #[rstest]
    #[case("2012-03-18", Some(xsd::DATE))]
    #[case("2012-03-18T00:00:00Z", Some(xsd::DATE_TIME))]
    #[case("00:00:00Z", Some(xsd::TIME))]
    #[case("P2011Y06M28DT00H00M00S", Some(xsd::DURATION))]
    #[case("2012", Some(xsd::G_YEAR))]
    #[case("2012-03", Some(xsd::G_YEAR_MONTH))]
    #[case("foo", None)]
    fn datetime_datatypes(#[case] value: &str, #[case] expected: Option<NamedNodeRef<'static>>) {
        assert_eq!(html_datetime_datatype(value), expected);
    }

    #[rstest]
    #[case("42", xsd::INTEGER, true)]
    #[case(" 42 ", xsd::INTEGER, true)]
    #[case("forty-two", xsd::INTEGER, false)]
    #[case("true", xsd::BOOLEAN, true)]
    #[case("yes", xsd::BOOLEAN, false)]
    #[case("2012-13-45", xsd::DATE, false)]
    #[case("anything", xsd::STRING, true)]
    fn lexical_forms(#[case] value: &str, #[case] datatype: NamedNodeRef<'static>, #[case] ok: bool) {
        assert_eq!(is_valid_lexical_form(value, datatype), ok);
    }

    #[test]
    fn content_wins_over_text() {
        let session = Session::new(RdfaVersion::V1_1, HostLanguage::Html);
        let lit = with_element(
            r#"<span property="p" content="from content">from text</span>"#,
            |el| property_literal(&session, &el, el.attr("content"), DatatypeChoice::Absent, None),
        );
        assert_eq!(lit, Literal::new_simple_literal("from content"));
    }

    #[test]
    fn malformed_typed_literal_falls_back_to_plain() {
        let session = Session::new(RdfaVersion::V1_1, HostLanguage::Html);
        let integer = xsd::INTEGER.into_owned();
        let lit = with_element(r#"<span property="p">many</span>"#, |el| {
            property_literal(&session, &el, None, DatatypeChoice::Typed(&integer), None)
        });
        assert_eq!(lit, Literal::new_simple_literal("many"));
        let diagnostics = session.take_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MalformedLiteral);
    }

    #[test]
    fn xml_literal_in_1_0_only() {
        let html = r#"<span property="p">a <em>b</em></span>"#;

        let session = Session::new(RdfaVersion::V1_0, HostLanguage::Xhtml);
        let lit = with_element(html, |el| {
            property_literal(&session, &el, None, DatatypeChoice::Absent, None)
        });
        assert_eq!(lit, Literal::new_typed_literal("a <em>b</em>", rdf::XML_LITERAL));

        let session = Session::new(RdfaVersion::V1_1, HostLanguage::Html);
        let lit = with_element(html, |el| {
            property_literal(&session, &el, None, DatatypeChoice::Absent, None)
        });
        assert_eq!(lit, Literal::new_simple_literal("a b"));
    }

    #[test]
    fn language_applies_to_plain_literals_only() {
        let session = Session::new(RdfaVersion::V1_1, HostLanguage::Html);
        let string = xsd::STRING.into_owned();

        let lit = with_element(r#"<span property="p">hi</span>"#, |el| {
            property_literal(&session, &el, None, DatatypeChoice::Absent, Some("en"))
        });
        assert_eq!(lit.language(), Some("en"));

        let lit = with_element(r#"<span property="p">hi</span>"#, |el| {
            property_literal(&session, &el, None, DatatypeChoice::Typed(&string), Some("en"))
        });
        assert_eq!(lit.language(), None);
        assert_eq!(lit.datatype(), xsd::STRING);
    }

    #[test]
    fn time_element_is_typed() {
        let session = Session::new(RdfaVersion::V1_1, HostLanguage::Html);
        let lit = with_element(r#"<time property="p">2012-03-18</time>"#, |el| {
            property_literal(&session, &el, None, DatatypeChoice::Absent, None)
        });
        assert_eq!(lit, Literal::new_typed_literal("2012-03-18", xsd::DATE));
    }
}
