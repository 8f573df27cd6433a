//! Loading of definitions and override tables from disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use procmap_hierarchy::definition::ProcessDefinition;
use procmap_hierarchy::resolve::OverrideTable;
use serde::Deserialize;

use crate::TRACING_TARGET_LOADER;

/// A definition file holds either one definition or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum DefinitionFile {
    Many(Vec<ProcessDefinition>),
    One(Box<ProcessDefinition>),
}

/// Loads every definition under the given paths, in path order.
///
/// Directories are scanned recursively for `*.json` files, sorted by path so
/// load order is reproducible.
pub fn load_definitions(paths: &[PathBuf]) -> anyhow::Result<Vec<ProcessDefinition>> {
    let mut files = Vec::new();
    for path in paths {
        collect_files(path, &mut files)?;
    }

    let mut definitions = Vec::new();
    for file in &files {
        let loaded = read_definitions(file)?;
        tracing::debug!(
            target: TRACING_TARGET_LOADER,
            path = %file.display(),
            definitions = loaded.len(),
            "loaded definition file"
        );
        definitions.extend(loaded);
    }

    tracing::info!(
        target: TRACING_TARGET_LOADER,
        files = files.len(),
        definitions = definitions.len(),
        "definitions loaded"
    );

    Ok(definitions)
}

/// Loads an override table.
pub fn load_overrides(path: &Path) -> anyhow::Result<OverrideTable> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let overrides: OverrideTable = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse override table {}", path.display()))?;

    tracing::info!(
        target: TRACING_TARGET_LOADER,
        path = %path.display(),
        overrides = overrides.len(),
        "override table loaded"
    );

    Ok(overrides)
}

fn collect_files(path: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let metadata =
        fs::metadata(path).with_context(|| format!("failed to access {}", path.display()))?;
    if !metadata.is_dir() {
        files.push(path.to_path_buf());
        return Ok(());
    }

    let mut entries = fs::read_dir(path)
        .with_context(|| format!("failed to read directory {}", path.display()))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to read directory {}", path.display()))?;
    entries.sort();

    for entry in entries {
        if entry.is_dir() {
            collect_files(&entry, files)?;
        } else if entry.extension().is_some_and(|ext| ext == "json") {
            files.push(entry);
        }
    }

    Ok(())
}

fn read_definitions(path: &Path) -> anyhow::Result<Vec<ProcessDefinition>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file: DefinitionFile = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse definitions in {}", path.display()))?;

    Ok(match file {
        DefinitionFile::Many(definitions) => definitions,
        DefinitionFile::One(definition) => vec![*definition],
    })
}
