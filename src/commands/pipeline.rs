use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info, warn};

use crate::cli::{Locale, RenderOutputArgs, SourceKind};
use crate::commands::inventory::discover_sources;
use crate::merge::{MergeOrder, merge_records};
use crate::model::{OutputOutcome, QuestionRecord, RunCounts, RunManifest, SourceOutcome};
use crate::render::{RenderConfig, write_pdf};
use crate::util::{run_id_at, source_sha256, timestamp_now, write_json_pretty};
use crate::vocabulary::Vocabulary;

pub(crate) const STATUS_OK: &str = "ok";
pub(crate) const STATUS_FAILED: &str = "failed";
const STATUS_SKIPPED: &str = "skipped";

/// Bookkeeping for one command invocation, turned into a run manifest at the end.
#[derive(Debug)]
pub struct RunContext {
    run_id: String,
    command: String,
    locale: Locale,
    started_at: String,
    sources: Vec<SourceOutcome>,
    pub counts: RunCounts,
    outputs: Vec<OutputOutcome>,
    warnings: Vec<String>,
}

impl RunContext {
    pub fn start(command: String, locale: Locale) -> Self {
        let run_id = run_id_at(Utc::now());
        info!(run_id = %run_id, locale = locale.as_str(), "starting run");
        Self {
            run_id,
            command,
            locale,
            started_at: timestamp_now(),
            sources: Vec::new(),
            counts: RunCounts::default(),
            outputs: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Records an output produced before the partitions are rendered.
    pub fn record_output(&mut self, outcome: OutputOutcome) {
        self.outputs.push(outcome);
    }

    /// Builds the manifest; outputs recorded during the run precede `outputs`.
    pub fn finish(mut self, outputs: Vec<OutputOutcome>) -> RunManifest {
        self.outputs.extend(outputs);
        RunManifest {
            manifest_version: 1,
            run_id: self.run_id,
            command: self.command,
            locale: self.locale.as_str().to_string(),
            started_at: self.started_at,
            finished_at: timestamp_now(),
            sources: self.sources,
            counts: self.counts,
            outputs: self.outputs,
            warnings: self.warnings,
        }
    }

    pub fn write_manifest(self, path: Option<&Path>, outputs: Vec<OutputOutcome>) -> Result<()> {
        let Some(path) = path else {
            return Ok(());
        };
        let manifest = self.finish(outputs);
        write_json_pretty(path, &manifest)?;
        info!(path = %path.display(), run_id = %manifest.run_id, "wrote run manifest");
        Ok(())
    }
}

/// Discovers sources, reporting a missing or unreadable directory instead of failing the run.
pub fn discover_or_report(root: &Path, kind: SourceKind, run: &mut RunContext) -> Vec<PathBuf> {
    match discover_sources(root, kind) {
        Ok(paths) => {
            if paths.is_empty() {
                warn!(path = %root.display(), kind = kind.as_str(), "no sources found");
                run.warn(format!("no {} sources found in {}", kind.as_str(), root.display()));
            }
            paths
        }
        Err(err) => {
            let reason = format!("{err:#}");
            error!(path = %root.display(), reason = %reason, "source directory unavailable");
            run.warn(reason);
            Vec::new()
        }
    }
}

/// Runs `extract` over every source in order; a failing source is logged and contributes nothing.
pub fn collect_records<F>(paths: &[PathBuf], run: &mut RunContext, mut extract: F) -> Vec<QuestionRecord>
where
    F: FnMut(&Path) -> Result<Vec<QuestionRecord>>,
{
    let mut records = Vec::new();

    for path in paths {
        run.counts.source_count += 1;
        let sha256 = source_sha256(path).ok();

        match extract(path) {
            Ok(extracted) => {
                info!(path = %path.display(), record_count = extracted.len(), "extracted records");
                run.sources.push(SourceOutcome {
                    path: path.display().to_string(),
                    sha256,
                    record_count: extracted.len(),
                    status: STATUS_OK.to_string(),
                    error: None,
                });
                records.extend(extracted);
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(path = %path.display(), reason = %reason, "skipping unreadable source");
                run.counts.failed_source_count += 1;
                run.sources.push(SourceOutcome {
                    path: path.display().to_string(),
                    sha256,
                    record_count: 0,
                    status: STATUS_FAILED.to_string(),
                    error: Some(reason),
                });
            }
        }
    }

    run.counts.raw_record_count = records.len();
    records
}

/// Merges the collected records and renders both partitions, then writes the optional run manifest.
pub fn publish(
    mut run: RunContext,
    records: Vec<QuestionRecord>,
    order: MergeOrder,
    args: &RenderOutputArgs,
) -> Result<()> {
    let vocabulary = args.locale.vocabulary();
    let config = RenderConfig::load_or_default(args.style_config.as_deref());

    let (corpus, stats) = merge_records(records, order);
    run.counts.empty_key_discarded = stats.empty_keys_discarded;
    run.counts.duplicates_discarded = stats.duplicates_discarded;
    run.counts.upgrades = stats.upgrades;
    run.counts.identified_count = corpus.identified.len();
    run.counts.unidentified_count = corpus.unidentified.len();
    info!(
        received = stats.received,
        unique = stats.inserted,
        upgrades = stats.upgrades,
        duplicates_discarded = stats.duplicates_discarded,
        empty_keys_discarded = stats.empty_keys_discarded,
        identified = corpus.identified.len(),
        unidentified = corpus.unidentified.len(),
        "merged question records"
    );

    let outputs = vec![
        render_partition(
            Partition::Identified,
            &args.identified_output,
            &corpus.identified,
            &vocabulary,
            &config,
            &mut run,
        ),
        render_partition(
            Partition::Unidentified,
            &args.unidentified_output,
            &corpus.unidentified,
            &vocabulary,
            &config,
            &mut run,
        ),
    ];

    run.write_manifest(args.manifest_path.as_deref(), outputs)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Partition {
    Identified,
    Unidentified,
}

impl Partition {
    fn as_str(self) -> &'static str {
        match self {
            Self::Identified => "identified",
            Self::Unidentified => "unidentified",
        }
    }
}

fn render_partition(
    partition: Partition,
    path: &Path,
    questions: &[QuestionRecord],
    vocabulary: &Vocabulary,
    config: &RenderConfig,
    run: &mut RunContext,
) -> OutputOutcome {
    let mut outcome = OutputOutcome {
        partition: partition.as_str().to_string(),
        path: path.display().to_string(),
        question_count: 0,
        status: STATUS_SKIPPED.to_string(),
        error: None,
    };

    if questions.is_empty() {
        warn!(partition = partition.as_str(), "partition is empty; document not written");
        run.warn(format!("{} partition is empty", partition.as_str()));
        return outcome;
    }

    let title = vocabulary.title_for(partition == Partition::Identified);
    match write_pdf(path, questions, title, vocabulary, config) {
        Ok(rendered) => {
            info!(
                partition = partition.as_str(),
                path = %path.display(),
                question_count = rendered,
                "wrote quiz document"
            );
            outcome.question_count = rendered;
            outcome.status = STATUS_OK.to_string();
        }
        Err(err) => {
            let reason = format!("{err:#}");
            error!(
                partition = partition.as_str(),
                path = %path.display(),
                reason = %reason,
                "failed to render quiz document"
            );
            outcome.status = STATUS_FAILED.to_string();
            outcome.error = Some(reason);
        }
    }
    outcome
}

/// Appends the shared rendering flags to a reconstructed command line.
pub fn push_render_output_flags(command: &mut Vec<String>, args: &RenderOutputArgs) {
    command.push("--identified-output".to_string());
    command.push(args.identified_output.display().to_string());
    command.push("--unidentified-output".to_string());
    command.push(args.unidentified_output.display().to_string());
    if let Some(path) = &args.style_config {
        command.push("--style-config".to_string());
        command.push(path.display().to_string());
    }
    command.push("--locale".to_string());
    command.push(args.locale.as_str().to_string());
    if let Some(path) = &args.manifest_path {
        command.push("--manifest-path".to_string());
        command.push(path.display().to_string());
    }
}
