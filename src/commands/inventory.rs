use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::{InventoryArgs, SourceKind};
use crate::model::{SourceEntry, SourceInventoryManifest};
use crate::util::{source_sha256, timestamp_now, write_json_pretty};

const QUIZ_DIRECTORY_PREFIX: &str = "quiz";

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.source_dir, args.kind)?;

    if args.dry_run {
        info!(
            source_count = manifest.source_count,
            source = %manifest.source_directory,
            kind = %manifest.source_kind,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args.manifest_path.unwrap_or_else(|| {
        args.source_dir
            .join(format!("{}_inventory.json", args.kind.as_str()))
    });

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(source_count = manifest.source_count, "inventory completed");

    Ok(())
}

pub fn build_manifest(source_dir: &Path, kind: SourceKind) -> Result<SourceInventoryManifest> {
    let paths = discover_sources(source_dir, kind)?;

    if paths.is_empty() {
        bail!(
            "no {} sources found in {}",
            kind.as_str(),
            source_dir.display()
        );
    }

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let size_bytes = fs::metadata(&path)
            .with_context(|| format!("failed to inspect {}", path.display()))?
            .len();
        let sha256 = source_sha256(&path)?;

        sources.push(SourceEntry {
            path: path.display().to_string(),
            size_bytes,
            sha256,
        });
    }

    Ok(SourceInventoryManifest {
        manifest_version: 1,
        generated_at: timestamp_now(),
        source_directory: source_dir.display().to_string(),
        source_kind: kind.as_str().to_string(),
        source_count: sources.len(),
        sources,
    })
}

/// Source files directly under `root` plus those one level down in quiz-named subdirectories,
/// sorted by path.
pub fn discover_sources(root: &Path, kind: SourceKind) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();

    let entries =
        fs::read_dir(root).with_context(|| format!("failed to read {}", root.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", root.display()))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?;

        if file_type.is_file() {
            if has_source_extension(&path, kind) {
                sources.push(path);
            }
        } else if file_type.is_dir() && is_quiz_directory(&path) {
            sources.extend(source_files_in(&path, kind)?);
        }
    }

    sources.sort();
    Ok(sources)
}

fn source_files_in(dir: &Path, kind: SourceKind) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let entries = fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        if has_source_extension(&path, kind) {
            files.push(path);
        }
    }

    Ok(files)
}

fn has_source_extension(path: &Path, kind: SourceKind) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            kind.extensions()
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
        .unwrap_or(false)
}

fn is_quiz_directory(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_lowercase().starts_with(QUIZ_DIRECTORY_PREFIX))
        .unwrap_or(false)
}
