//! Turning attribute values into IRIs and blank nodes (RDFa Core 7.4).

use std::collections::BTreeMap;

use curie::{Curie, ExpansionError, PrefixMapping};
use oxiri::{Iri, IriParseError};
use oxrdf::{NamedNode, NamedOrBlankNode};

use crate::context::Session;
use crate::sink::DiagnosticKind;

/// The datatype an attribute value is interpreted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReferenceKind {
    /// `@href`, `@src`, `@vocab`: a plain (possibly relative) IRI.
    Iri,
    /// `@about`, `@resource`.
    SafeCurieOrCurieOrIri,
    /// `@property`, `@typeof`, `@datatype`, `@rel`, `@rev`.
    TermOrCurieOrAbsIri,
    /// `@rel`/`@rev` alongside `@property` in HTML: terms are ignored.
    CurieOrAbsIri,
}

enum CurieError {
    Empty,
    InvalidIri(String),
    Expansion(ExpansionError),
}

struct NotCurie;
struct NotTerm;

/// Resolves references against one element's in-scope mappings.
pub(crate) struct Resolver<'a> {
    pub session: &'a Session,
    pub base: &'a Iri<String>,
    pub prefixes: &'a PrefixMapping,
    pub terms: &'a BTreeMap<String, NamedNode>,
    pub vocab: Option<&'a NamedNode>,
}

impl Resolver<'_> {
    /// Resolves a single token. `None` means the value must be ignored;
    /// a diagnostic has been recorded where RDFa asks for one.
    pub fn resolve(&self, value: &str, kind: ReferenceKind) -> Option<NamedOrBlankNode> {
        match kind {
            ReferenceKind::Iri => self.attribute_iri(value).map(Into::into),
            ReferenceKind::SafeCurieOrCurieOrIri => self.safecurie_or_curie_or_iri(value),
            ReferenceKind::TermOrCurieOrAbsIri => self.term_or_curie_or_absiri(value),
            ReferenceKind::CurieOrAbsIri => self.curie_or_absiri(value),
        }
    }

    /// Resolves each whitespace-separated token independently.
    pub fn resolve_all(&self, value: &str, kind: ReferenceKind) -> Vec<NamedOrBlankNode> {
        value
            .split_ascii_whitespace()
            .filter_map(|token| self.resolve(token, kind))
            .collect()
    }

    /// An empty CURIE resolves to the base.
    pub fn empty_curie(&self) -> NamedNode {
        NamedNode::new_unchecked(self.base.as_str())
    }

    /// Resolves an IRI against the base.
    pub fn resolve_relative_iri(&self, value: &str) -> Result<NamedNode, IriParseError> {
        // [rdfa-core] 7.4.2 [NOTE]
        // > Specifically, however, an empty attribute value is _never_ treated
        // > as a relative IRI by this specification.
        // The resolution of "" is still the base, which is what @about="" means.
        let iri = self.base.resolve(value)?;
        Ok(NamedNode::new_unchecked(iri.into_inner()))
    }

    fn attribute_iri(&self, value: &str) -> Option<NamedNode> {
        match self.resolve_relative_iri(value) {
            Ok(iri) => Some(iri),
            Err(err) => {
                self.report_invalid_iri(err, value);
                None
            }
        }
    }

    // [rdfa-core] 7.5.3
    // > term     ::=  NCNameStartChar termChar*
    // > termChar ::=  ( NameChar - ':' ) | '/'
    fn is_term(value: &str) -> bool {
        !value.is_empty()
            && !value.starts_with('/')
            && value
                .split('/')
                .all(|s| s.is_empty() || rxml_validation::validate_ncname(s).is_ok())
    }

    // When resolving a term, the outcome might be that it _must_ be ignored.
    // This is indicated by returning [`None`].
    fn resolve_term(&self, term: &str) -> Result<Option<NamedNode>, NotTerm> {
        if !Self::is_term(term) {
            return Err(NotTerm);
        }

        // > If there is a local default vocabulary the IRI is obtained
        // > by concatenating that value and the term.
        if let Some(vocab) = self.vocab {
            let iri = format!("{}{term}", vocab.as_str());
            return match NamedNode::new(iri) {
                Ok(iri) => Ok(Some(iri)),
                Err(err) => {
                    self.report_invalid_iri(err, term);
                    Ok(None)
                }
            };
        }

        // > Otherwise, check if the term matches an item in the list of local term mappings.
        // > First compare against the list case-sensitively,
        if let Some(iri) = self.terms.get(term) {
            return Ok(Some(iri.clone()));
        }

        // > and if there is no match then compare case-insensitively.
        if let Some(iri) = self
            .terms
            .iter()
            .find_map(|(key, iri)| key.eq_ignore_ascii_case(term).then(|| iri.clone()))
        {
            return Ok(Some(iri));
        }

        // > Otherwise, the term has no associated IRI and MUST be ignored.
        self.session.warn(
            DiagnosticKind::UnresolvedTerm,
            format!("Unresolved term: {term}"),
        );
        Ok(None)
    }

    /// Resolves a (non-safe) CURIE to an IRI or bnode.
    fn resolve_curie(&self, value: &str) -> Result<NamedOrBlankNode, CurieError> {
        if value.is_empty() {
            return Err(CurieError::Empty);
        }

        let Some((prefix, reference)) = value.split_once(':') else {
            // RDFa never sets a default (no-colon) prefix
            return Err(CurieError::Expansion(ExpansionError::MissingDefault));
        };

        if prefix == "_" {
            return Ok(self.session.named_blank_node(reference).into());
        }

        let prefix = if self.session.is_1_0() {
            prefix.to_string()
        } else {
            prefix.to_ascii_lowercase()
        };

        match self
            .prefixes
            .expand_curie(&Curie::new(Some(prefix.as_str()), reference))
        {
            Ok(iri) => {
                // A relative IRI is permitted (though not recommended) as a
                // prefix value, so the expansion is resolved against the base.
                self.resolve_relative_iri(&iri)
                    .map(Into::into)
                    .map_err(|_| CurieError::InvalidIri(iri))
            }
            Err(err) => Err(CurieError::Expansion(err)),
        }
    }

    /// Resolves a SafeCURIE or CURIE to an IRI or bnode.
    fn resolve_safecurie_or_curie(
        &self,
        value: &str,
    ) -> Result<Option<NamedOrBlankNode>, NotCurie> {
        if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            return match self.resolve_curie(inner) {
                Ok(iri) => Ok(Some(iri)),
                Err(err) => {
                    // a SafeCURIE that does not resolve MUST be ignored
                    match err {
                        CurieError::Empty => {}
                        CurieError::InvalidIri(iri) => self.session.warn(
                            DiagnosticKind::UnresolvedCurie,
                            format!("Invalid CURIE: {value} (expanded to invalid IRI value <{iri}>)"),
                        ),
                        CurieError::Expansion(_) => self.session.warn(
                            DiagnosticKind::UnresolvedCurie,
                            format!("Invalid CURIE: {value} (no such prefix defined)"),
                        ),
                    }
                    Ok(None)
                }
            };
        }

        self.resolve_curie(value).map(Some).map_err(|_| NotCurie)
    }

    fn safecurie_or_curie_or_iri(&self, value: &str) -> Option<NamedOrBlankNode> {
        match self.resolve_safecurie_or_curie(value) {
            Ok(val) => val,
            Err(NotCurie) => self.attribute_iri(value).map(Into::into),
        }
    }

    fn curie_or_absiri(&self, value: &str) -> Option<NamedOrBlankNode> {
        match self.resolve_curie(value) {
            Ok(val) => Some(val),
            // RDFa 1.0 has no absolute IRIs in these attributes
            Err(_) if self.session.is_1_0() => None,
            Err(_) => match NamedNode::new(value) {
                Ok(iri) => Some(iri.into()),
                Err(err) => {
                    self.report_invalid_iri(err, value);
                    None
                }
            },
        }
    }

    fn term_or_curie_or_absiri(&self, value: &str) -> Option<NamedOrBlankNode> {
        match self.resolve_term(value) {
            Ok(result) => result.map(Into::into),
            Err(NotTerm) => self.curie_or_absiri(value),
        }
    }

    fn report_invalid_iri(&self, err: IriParseError, value: &str) {
        self.session.warn(
            DiagnosticKind::Warning,
            format!("Invalid IRI: <{value}> ({err})"),
        );
    }
}
