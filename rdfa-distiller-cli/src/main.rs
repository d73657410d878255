use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};
use itertools::Itertools;
use rdfa_distiller::{HostLanguage, Options, RdfaVersion};

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// An http(s) URL or a local file.
    #[arg(value_name = "URL|FILE")]
    target: String,

    /// Base IRI, overriding the document location and any `<base>` element.
    #[arg(long)]
    base: Option<String>,

    /// Default vocabulary in force at the root element.
    #[arg(long)]
    vocab: Option<String>,

    /// RDFa version; detected from the root `@version` when omitted.
    #[arg(long, value_enum)]
    rdfa_version: Option<Version>,

    #[arg(long, value_enum, default_value_t = Host::Html)]
    host: Host,

    /// Keep `rdfa:copy` and `rdfa:Pattern` triples as they are.
    #[arg(long)]
    no_copy: bool,

    /// Ignore `<script type="text/turtle">` content.
    #[arg(long)]
    no_embedded_turtle: bool,

    /// Also print the processor graph (to stderr).
    #[arg(long)]
    processor_graph: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Version {
    #[value(name = "1.0")]
    V1_0,
    #[value(name = "1.1")]
    V1_1,
}

#[derive(Clone, Copy, ValueEnum)]
enum Host {
    Html,
    Xhtml,
    Xml,
}

impl Args {
    fn options(&self) -> Result<Options, Box<dyn std::error::Error>> {
        let mut options = Options::default()
            .with_host_language(match self.host {
                Host::Html => HostLanguage::Html,
                Host::Xhtml => HostLanguage::Xhtml,
                Host::Xml => HostLanguage::Xml,
            })
            .with_property_copying(!self.no_copy)
            .with_embedded_turtle(!self.no_embedded_turtle);

        if let Some(version) = self.rdfa_version {
            options = options.with_version(match version {
                Version::V1_0 => RdfaVersion::V1_0,
                Version::V1_1 => RdfaVersion::V1_1,
            });
        }

        if let Some(base) = &self.base {
            options = options.with_base(oxiri::Iri::parse(base.clone())?);
        }

        if let Some(vocab) = &self.vocab {
            options = options.with_default_vocabulary(oxrdf::NamedNode::new(vocab.clone())?);
        }

        Ok(options)
    }
}

/// Reads the document, returning its content and location.
fn load(target: &str) -> Result<Option<(String, String)>, Box<dyn std::error::Error>> {
    match url::Url::parse(target) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            let client = reqwest::blocking::Client::new();
            let response = client.get(url.clone()).send()?.error_for_status()?;
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());

            if content_type.is_some_and(|ct| {
                !(ct.starts_with("text/html") || ct.starts_with("application/xhtml+xml"))
            }) {
                eprintln!("Error: content type is not HTML ({content_type:?}).");
                return Ok(None);
            }

            let location = response.url().to_string();
            Ok(Some((response.text()?, location)))
        }
        _ => {
            let path = std::fs::canonicalize(PathBuf::from(target))?;
            let location = url::Url::from_file_path(&path)
                .map_err(|()| format!("cannot make a file URL from {}", path.display()))?;
            Ok(Some((std::fs::read_to_string(&path)?, location.to_string())))
        }
    }
}

fn write_turtle(
    graph: &oxrdf::Graph,
    base: Option<&str>,
    out: impl std::io::Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut serializer = oxttl::TurtleSerializer::new();
    if let Some(base) = base {
        serializer = serializer.with_base_iri(base)?;
    }

    // use serializer with all known prefixes
    let serializer = rdfa_distiller::initial_context_prefixes()
        .mappings()
        .filter(|(prefix, _)| !prefix.is_empty())
        .try_fold(serializer, |serializer, (prefix, value)| {
            serializer.with_prefix(prefix, value)
        })?;

    let mut writer = serializer.for_writer(out);
    for triple in graph
        .iter()
        .sorted_by_cached_key(|t| (t.subject.to_string(), t.predicate.to_string()))
    {
        writer.serialize_triple(triple)?;
    }

    writer.finish()?;
    Ok(())
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let options = args.options()?;

    let Some((content, location)) = load(&args.target)? else {
        return Ok(ExitCode::FAILURE);
    };
    tracing::info!("loaded {} bytes from {location}", content.len());

    let mut output_graph = oxrdf::Graph::new();
    let mut processor_graph = oxrdf::Graph::new();
    rdfa_distiller::process_html(
        &content,
        &location,
        &options,
        &mut output_graph,
        &mut processor_graph,
    )?;

    if args.processor_graph && !processor_graph.is_empty() {
        // output any warnings/errors
        write_turtle(&processor_graph, None, std::io::stderr().lock())?;
    }

    let base = args.base.as_deref().unwrap_or(&location);
    write_turtle(&output_graph, Some(base), std::io::stdout().lock())?;

    Ok(ExitCode::SUCCESS)
}
