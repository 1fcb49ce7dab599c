//! Loading flow documents from disk and turning them into a registry.

use crate::error::DslError;
use crate::flow::ParsedDocument;
use crate::parse_and_validate;
use formflow_core::{FlowRegistry, FlowRegistryBuilder};
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions recognised as flow documents
pub const FLOW_FILE_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Read, parse and validate one flow file
pub fn load_file(path: impl AsRef<Path>) -> Result<ParsedDocument, DslError> {
    let path = path.as_ref();
    let yaml = fs::read_to_string(path).map_err(|source| DslError::IoError {
        path: path.display().to_string(),
        source,
    })?;

    let document = parse_and_validate(&yaml)?;
    tracing::debug!(
        path = %path.display(),
        flows = document.flows.len(),
        "Flow document loaded"
    );
    Ok(document)
}

/// Load every `*.yaml` / `*.yml` file of a directory, in file name order
pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<ParsedDocument>, DslError> {
    let dir = dir.as_ref();
    let io_error = |source| DslError::IoError {
        path: dir.display().to_string(),
        source,
    };

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && is_flow_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    paths.iter().map(|path| load_file(path)).collect()
}

/// Whether a path has a flow document extension
pub fn is_flow_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| FLOW_FILE_EXTENSIONS.contains(&ext))
}

/// Register every flow of the documents and freeze the registry.
///
/// Flow names must be unique across all documents.
pub fn build_registry<'a, I>(documents: I) -> Result<FlowRegistry, DslError>
where
    I: IntoIterator<Item = &'a ParsedDocument>,
{
    let mut builder = FlowRegistryBuilder::new();
    for document in documents {
        for flow in &document.flows {
            builder.register(flow.to_definition()?)?;
        }
    }

    let registry = builder.build();
    tracing::info!(flows = registry.len(), "Flow registry built");
    Ok(registry)
}
