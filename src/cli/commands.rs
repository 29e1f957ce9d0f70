use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;

use node_docs::metadata::{load_metadata, METADATA_FILENAME};
use node_docs::{DocExtractor, Document, ExtractorConfig, MarkerSet, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "node-docs")]
#[command(about = "Extract documentation from Python node definitions and generate markdown")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Document a directory of nodes (writes ./<directory>.md)
    node-docs ./my_nodes

    # Choose the output file
    node-docs ./my_nodes -o docs/NODES.md

    # Emit JSON and include subdirectories
    node-docs ./my_nodes --format json --recursive
"#)]
pub struct Cli {
    /// Directory containing Python files to process
    pub directory: String,

    /// Output file (default: <directory_name>.md)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (markdown or json)
    #[arg(long, default_value = "markdown")]
    pub format: OutputFormat,

    /// Also scan subdirectories
    #[arg(long)]
    pub recursive: bool,

    /// Front-matter file, relative to the scanned directory
    #[arg(long, default_value = METADATA_FILENAME)]
    pub metadata: String,

    /// Decorator marking documented node classes
    #[arg(long, default_value = "invocation")]
    pub unit_marker: String,

    /// Decorator marking output definition classes
    #[arg(long, default_value = "invocation_output")]
    pub output_marker: String,
}

/// Strips trailing quotes and path separators left over from shell completion
pub fn normalize_directory(raw: &str) -> &str {
    raw.trim_end_matches(['"', '\'', '\\', '/'])
}

/// Name used for the document title and default output file
pub fn directory_name(directory: &Path) -> String {
    directory
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .or_else(|| {
            directory
                .canonicalize()
                .ok()
                .and_then(|path| path.file_name().map(|name| name.to_string_lossy().to_string()))
        })
        .unwrap_or_else(|| "docs".to_string())
}

/// Runs extraction and writes the document; returns the output path
pub fn generate(cli: &Cli) -> anyhow::Result<PathBuf> {
    let directory = PathBuf::from(normalize_directory(&cli.directory));
    if !directory.is_dir() {
        bail!("'{}' is not a directory", cli.directory);
    }

    let name = directory_name(&directory);
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.{}", name, cli.format.extension())));

    let config = ExtractorConfig {
        markers: MarkerSet {
            unit_of_work: cli.unit_marker.clone(),
            output_definition: cli.output_marker.clone(),
            ..MarkerSet::default()
        },
        recursive: cli.recursive,
    };

    let extraction = DocExtractor::new(config)
        .extract_directory(&directory)
        .with_context(|| format!("Failed to scan {}", directory.display()))?;
    tracing::info!(
        "Extracted {} nodes, {} functions, {} output definitions ({} modules skipped)",
        extraction.registry.units().len(),
        extraction.registry.functions().len(),
        extraction.registry.output_definitions().len(),
        extraction.skipped.len()
    );
    if extraction.registry.is_empty() {
        tracing::warn!("No documented nodes or functions found in {}", directory.display());
    }

    let metadata = load_metadata(&directory, &cli.metadata);
    if let Some(meta) = &metadata {
        tracing::debug!("Extracted metadata: {:?}", meta);
    }

    let content = Document::new(&name, metadata.as_ref(), &extraction.registry)
        .render(cli.format)
        .context("Failed to render document")?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&output, content)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(output)
}
