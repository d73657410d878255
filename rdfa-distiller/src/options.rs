use oxiri::Iri;
use oxrdf::NamedNode;

/// Which revision of RDFa Core drives the processing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum RdfaVersion {
    /// XHTML+RDFa 1.0: no `@vocab`, `@prefix` or `@inlist`, `@src` is a subject,
    /// `@property` on markup produces an `rdf:XMLLiteral`.
    V1_0,
    #[default]
    V1_1,
}

impl RdfaVersion {
    /// Interprets the `@version` attribute of the root element,
    /// e.g. `XHTML+RDFa 1.0` or `HTML+RDFa 1.1`.
    pub fn from_version_attribute(value: &str) -> Option<Self> {
        let (_, version) = value.trim().rsplit_once("RDFa ")?;
        match version.trim() {
            "1.0" => Some(RdfaVersion::V1_0),
            "1.1" => Some(RdfaVersion::V1_1),
            _ => None,
        }
    }
}

/// The markup language hosting the RDFa attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HostLanguage {
    /// HTML+RDFa 1.1, including its additional processing rules.
    #[default]
    Html,
    /// XHTML+RDFa: `@role` is recognised but none of the HTML5 extensions apply.
    Xhtml,
    /// RDFa Core in arbitrary XML; `xml:base` is honoured on every element.
    Xml,
}

impl HostLanguage {
    pub(crate) fn has_html_extensions(self) -> bool {
        matches!(self, HostLanguage::Html)
    }

    pub(crate) fn supports_role(self) -> bool {
        matches!(self, HostLanguage::Html | HostLanguage::Xhtml)
    }

    pub(crate) fn accepts_embedded_turtle(self) -> bool {
        matches!(self, HostLanguage::Html | HostLanguage::Xhtml)
    }

    pub(crate) fn supports_xml_base(self) -> bool {
        matches!(self, HostLanguage::Xml)
    }

    // [HTML-RDFA] 3.1: “The default vocabulary URI is undefined.”
    pub(crate) fn default_vocabulary(self) -> Option<NamedNode> {
        None
    }
}

/// Settings recognised by the distiller.
#[derive(Debug, Clone)]
pub struct Options {
    /// Replaces the document base, including any `<base href>` in the document.
    pub base: Option<Iri<String>>,
    /// Default vocabulary in force at the root element.
    pub default_vocabulary: Option<NamedNode>,
    /// Prefix mappings added after the RDFa initial context.
    pub initial_prefixes: Vec<(String, String)>,
    /// Term mappings added after the RDFa initial context.
    pub initial_terms: Vec<(String, NamedNode)>,
    /// `None` detects the version from the root `@version` attribute.
    pub version: Option<RdfaVersion>,
    pub host_language: HostLanguage,
    /// Whether `rdfa:copy` patterns are expanded after distillation.
    pub property_copying: bool,
    /// Prepended to every minted blank node label.
    ///
    /// `None` picks a new random prefix for each document, so documents
    /// distilled into the same sink never share blank nodes. A fixed prefix
    /// (`""` included) makes the labels reproducible.
    pub blank_node_prefix: Option<String>,
    /// Whether `<script type="text/turtle">` content is added to the output
    /// (HTML and XHTML hosts only). The script is not processed as RDFa.
    pub embedded_turtle: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base: None,
            default_vocabulary: None,
            initial_prefixes: Vec::new(),
            initial_terms: Vec::new(),
            version: None,
            host_language: HostLanguage::default(),
            property_copying: true,
            blank_node_prefix: None,
            embedded_turtle: true,
        }
    }
}

impl Options {
    pub fn with_base(mut self, base: Iri<String>) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_default_vocabulary(mut self, vocab: NamedNode) -> Self {
        self.default_vocabulary = Some(vocab);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.initial_prefixes.push((prefix.into(), iri.into()));
        self
    }

    pub fn with_term(mut self, term: impl Into<String>, iri: NamedNode) -> Self {
        self.initial_terms.push((term.into(), iri));
        self
    }

    pub fn with_version(mut self, version: RdfaVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_host_language(mut self, host_language: HostLanguage) -> Self {
        self.host_language = host_language;
        self
    }

    pub fn with_property_copying(mut self, enabled: bool) -> Self {
        self.property_copying = enabled;
        self
    }

    pub fn with_embedded_turtle(mut self, enabled: bool) -> Self {
        self.embedded_turtle = enabled;
        self
    }

    pub fn with_blank_node_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.blank_node_prefix = Some(prefix.into());
        self
    }
}
