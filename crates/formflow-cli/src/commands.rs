//! Subcommand implementations
//!
//! Each command writes its report to the given writer so it can be
//! exercised without a terminal.

use anyhow::{Context, Result};
use formflow_core::{
    FlowNavigator, FlowRegistry, ProgressionConfig, SessionId, StepValues, SubmissionData,
    SubmissionService,
};
use formflow_dsl::{build_registry, load_dir, load_file, ParsedDocument};
use formflow_state_inmemory::InMemoryStateStoreProvider;
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::generator::FlowScaffold;

/// One posted step in a simulation answers file
#[derive(Debug, Clone, Deserialize)]
pub struct Answer {
    pub step: String,
    #[serde(default)]
    pub values: StepValues,
}

/// Scaffold a new flow file
pub fn generate(
    out: &mut impl Write,
    scaffold: &FlowScaffold,
    output_dir: &Path,
    force: bool,
) -> Result<PathBuf> {
    let path = scaffold.write_to(output_dir, force)?;
    writeln!(out, "created {}", path.display())?;
    Ok(path)
}

/// Load and validate flow files or directories, then build one registry from all of them
pub fn check(out: &mut impl Write, paths: &[PathBuf]) -> Result<FlowRegistry> {
    let mut documents = Vec::new();
    for path in paths {
        documents.extend(load_documents(path)?);
    }

    let registry = build_registry(&documents).context("Failed to register flows")?;

    for flow_id in registry.flow_ids() {
        let flow = registry.lookup_flow(flow_id.as_str())?;
        writeln!(
            out,
            "ok {} ({} steps, {} transitions)",
            flow_id,
            flow.steps().len(),
            flow.transitions().len()
        )?;
    }
    info!(flow_count = registry.len(), "Flow files checked");
    Ok(registry)
}

/// Print the step that follows `step` for the given submission data
pub fn next(
    out: &mut impl Write,
    file: &Path,
    flow: &str,
    step: &str,
    data: Option<&str>,
) -> Result<()> {
    let registry = registry_from_file(file)?;
    let data = match data {
        Some(raw) => SubmissionData::from_json_str(raw).context("Invalid --data JSON")?,
        None => SubmissionData::new(),
    };

    let navigator = FlowNavigator::new(Arc::new(registry));
    let next_step = navigator.compute_next_step(flow, step, &data)?;
    writeln!(out, "{}", next_step)?;
    Ok(())
}

/// Drive one submission through a flow with an in-memory store
pub async fn simulate(
    out: &mut impl Write,
    file: &Path,
    flow: &str,
    answers: &[Answer],
    session: &str,
    config: ProgressionConfig,
) -> Result<()> {
    let registry = Arc::new(registry_from_file(file)?);
    let provider = InMemoryStateStoreProvider::new();
    let service = SubmissionService::new(registry, provider.create_repository(), config);
    let session_id = SessionId::from(session);

    service.show(&session_id, flow).await?;
    info!(flow_id = %flow, session_id = %session_id, "Simulation started");

    for answer in answers {
        let outcome = service
            .submit_step(&session_id, flow, &answer.step, answer.values.clone())
            .await
            .with_context(|| format!("Step '{}' was refused", answer.step))?;

        let line = serde_json::json!({
            "step": answer.step,
            "valid": outcome.validation.is_valid(),
            "errors": outcome.validation.errors(),
            "result": outcome.transition,
        });
        writeln!(out, "{}", line)?;
    }

    let submission = service.show(&session_id, flow).await?;
    writeln!(out, "{}", serde_json::to_string_pretty(&submission)?)?;
    Ok(())
}

/// Read a simulation answers file: a JSON array of `{ "step", "values" }` objects
pub fn read_answers(path: &Path) -> Result<Vec<Answer>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read answers file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid answers file {}", path.display()))
}

fn load_documents(path: &Path) -> Result<Vec<ParsedDocument>> {
    if path.is_dir() {
        load_dir(path).with_context(|| format!("Failed to load flows from {}", path.display()))
    } else {
        let document = load_file(path)
            .with_context(|| format!("Failed to load flow file {}", path.display()))?;
        Ok(vec![document])
    }
}

fn registry_from_file(file: &Path) -> Result<FlowRegistry> {
    let documents = load_documents(file)?;
    build_registry(&documents).context("Failed to register flows")
}
