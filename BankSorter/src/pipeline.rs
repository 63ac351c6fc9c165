//! Pipeline orchestration
//!
//! Runs decode → convert → group → rename for each selected partition.
//! Stages are sequential within a partition; partitions share nothing but the
//! event channel and the cancellation token, so they can run side by side.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::banks::{BankDictionary, DictionaryOptions, build_dictionary};
use crate::cancel::CancellationToken;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::knowledge::KnowledgeBase;
use crate::partition::Partition;
use crate::progress::{EventSink, Stage, StageContext};
use crate::stages::{
    GroupReport, RenameReport, ToolStageReport, convert_partition, decode_partition, find_sources,
    group_partition, rename_partition,
};
use crate::tools::{BankDecoder, Transcoder, VgmstreamTranscoder, WwiserDecoder};

/// What happened to one stage on one partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome<T> {
    /// The stage was not enabled
    Disabled,
    /// The stage ran to completion (per-item failures live in the report)
    Completed(T),
    /// The stage could not run or stopped on a stage-level error
    Aborted(String),
    /// Cancellation was requested before the stage started
    NotRun,
}

impl<T> StageOutcome<T> {
    #[must_use]
    pub fn report(&self) -> Option<&T> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }
}

/// Per-partition results
#[derive(Debug, Clone)]
pub struct PartitionSummary {
    pub partition: Partition,
    pub decode: StageOutcome<ToolStageReport>,
    pub convert: StageOutcome<ToolStageReport>,
    pub group: StageOutcome<GroupReport>,
    pub rename: StageOutcome<RenameReport>,
}

impl PartitionSummary {
    fn new(partition: Partition) -> Self {
        Self {
            partition,
            decode: StageOutcome::Disabled,
            convert: StageOutcome::Disabled,
            group: StageOutcome::Disabled,
            rename: StageOutcome::Disabled,
        }
    }

    /// Human-readable list of everything that was skipped, failed or aborted
    #[must_use]
    pub fn issues(&self) -> Vec<String> {
        let p = self.partition;
        let mut issues = Vec::new();

        for (stage, outcome) in [(Stage::Decode, &self.decode), (Stage::Convert, &self.convert)] {
            match outcome {
                StageOutcome::Aborted(reason) => {
                    issues.push(format!("{p}: {} aborted: {reason}", stage.as_str()));
                }
                StageOutcome::Completed(report) => {
                    for (path, reason) in &report.failed {
                        issues.push(format!("{p}: failed {}: {reason}", path.display()));
                    }
                    if report.not_attempted() > 0 {
                        issues.push(format!(
                            "{p}: {} files not attempted ({} cancelled)",
                            report.not_attempted(),
                            stage.as_str()
                        ));
                    }
                }
                _ => {}
            }
        }

        match &self.group {
            StageOutcome::Aborted(reason) => {
                issues.push(format!("{p}: {} aborted: {reason}", Stage::Group.as_str()));
            }
            StageOutcome::Completed(report) => {
                for (path, reason) in report.unreadable.iter().chain(&report.failed) {
                    issues.push(format!("{p}: {}: {reason}", path.display()));
                }
                if !report.skipped.is_empty() {
                    issues.push(format!(
                        "{p}: {} referenced IDs had no converted file to group",
                        report.skipped.len()
                    ));
                }
            }
            _ => {}
        }

        match &self.rename {
            StageOutcome::Aborted(reason) => {
                issues.push(format!("{p}: {} aborted: {reason}", Stage::Rename.as_str()));
            }
            StageOutcome::Completed(report) => {
                for folder in &report.unmapped {
                    issues.push(format!("{p}: no mappings found for {folder}"));
                }
                for path in &report.overwritten {
                    issues.push(format!("{p}: overwrote {}", path.display()));
                }
                for (path, reason) in &report.failed {
                    issues.push(format!("{p}: {}: {reason}", path.display()));
                }
            }
            _ => {}
        }

        issues
    }
}

/// Results of a whole run
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub partitions: Vec<PartitionSummary>,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl PipelineSummary {
    #[must_use]
    pub fn issues(&self) -> Vec<String> {
        self.partitions.iter().flat_map(PartitionSummary::issues).collect()
    }

    /// Whether any stage aborted
    #[must_use]
    pub fn has_aborts(&self) -> bool {
        self.partitions.iter().any(|p| {
            p.decode.is_aborted()
                || p.convert.is_aborted()
                || p.group.is_aborted()
                || p.rename.is_aborted()
        })
    }
}

/// Shared, read-only inputs prepared once per run
struct RunInputs {
    decode_blocked: Option<String>,
    convert_blocked: Option<String>,
    knowledge: std::result::Result<KnowledgeBase, String>,
}

/// The configured pipeline
pub struct Pipeline {
    config: PipelineConfig,
    decoder: Box<dyn BankDecoder>,
    transcoder: Box<dyn Transcoder>,
    events: EventSink,
    cancel: CancellationToken,
}

impl Pipeline {
    /// Build a pipeline driving the real `wwiser` and `vgmstream-cli`
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        let timeout = config.tool_timeout();
        let decoder = WwiserDecoder::new(&config.python, &config.wwiser_pyz).with_timeout(timeout);
        let transcoder = VgmstreamTranscoder::locate(&config.vgmstream_dir).with_timeout(timeout);
        Self::with_tools(config, Box::new(decoder), Box::new(transcoder))
    }

    /// Build a pipeline around custom tool implementations
    #[must_use]
    pub fn with_tools(
        config: PipelineConfig,
        decoder: Box<dyn BankDecoder>,
        transcoder: Box<dyn Transcoder>,
    ) -> Self {
        Self {
            config,
            decoder,
            transcoder,
            events: EventSink::disconnected(),
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// A token that cancels this pipeline's runs
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run every enabled stage on every selected partition.
    ///
    /// Only an unusable configuration is returned as an error; everything
    /// else ends up in the summary.
    pub fn run(&self) -> Result<PipelineSummary> {
        self.config.validate()?;
        let started = Instant::now();
        let inputs = self.prepare();
        let partitions = self.config.selected_partitions();

        tracing::info!(
            "Running pipeline on {} partition(s), stages: {:?}",
            partitions.len(),
            self.config.stages
        );

        let summaries = if self.config.parallel_partitions && partitions.len() > 1 {
            let inputs = &inputs;
            std::thread::scope(|scope| {
                let handles: Vec<_> = partitions
                    .iter()
                    .map(|&p| scope.spawn(move || self.run_partition(p, inputs)))
                    .collect();
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                    .collect()
            })
        } else {
            partitions
                .iter()
                .map(|&p| self.run_partition(p, &inputs))
                .collect()
        };

        let summary = PipelineSummary {
            partitions: summaries,
            cancelled: self.cancel.is_cancelled(),
            elapsed: started.elapsed(),
        };
        tracing::info!(
            "Pipeline finished in {:.1}s with {} issue(s)",
            summary.elapsed.as_secs_f64(),
            summary.issues().len()
        );
        Ok(summary)
    }

    /// Decode and index every bank of the selected partitions
    pub fn build_dictionary(&self) -> Result<BankDictionary> {
        self.config.validate()?;
        let options = DictionaryOptions::default()
            .with_partitions(self.config.selected_partitions())
            .with_descriptor_dir(self.config.xml_output_dir.clone())
            .with_workers(self.config.workers);
        let ctx = StageContext::new(Stage::Dictionary, &self.events, &self.cancel);
        build_dictionary(&self.config.unpacked_data, self.decoder.as_ref(), &options, ctx)
    }

    /// Check tools and load the knowledge base once, before any partition
    fn prepare(&self) -> RunInputs {
        let stages = self.config.stages;
        let blocked = |enabled: bool, check: Result<()>| -> Option<String> {
            match (enabled, check) {
                (true, Err(e)) => {
                    tracing::error!("{}", e);
                    Some(e.to_string())
                }
                _ => None,
            }
        };

        let decode_blocked = blocked(stages.decode, self.decoder.check_available());
        let convert_blocked = blocked(stages.convert, self.transcoder.check_available());

        let knowledge = if stages.rename {
            KnowledgeBase::load(&self.config.knowledge_base).map_err(|e| {
                tracing::error!("{}", e);
                e.to_string()
            })
        } else {
            Ok(KnowledgeBase::new())
        };

        RunInputs {
            decode_blocked,
            convert_blocked,
            knowledge,
        }
    }

    fn run_partition(&self, partition: Partition, inputs: &RunInputs) -> PartitionSummary {
        let config = &self.config;
        let stages = config.stages;
        let ctx = StageContext::new(Stage::Decode, &self.events, &self.cancel).for_partition(partition);
        let unpacked = config.unpacked_data.as_path();
        let fallback = Some(unpacked).filter(|p| p.is_dir());
        let mut summary = PartitionSummary::new(partition);

        summary.decode = self.stage(stages.decode, inputs.decode_blocked.as_deref(), ctx, |ctx| {
            let banks = find_sources(&partition.banks_source(unpacked), "bnk", fallback, partition)?;
            decode_partition(
                self.decoder.as_ref(),
                &banks,
                &config.banks_dir(partition),
                config.workers,
                ctx,
            )
        });

        let ctx = ctx.with_stage(Stage::Convert);
        summary.convert = self.stage(stages.convert, inputs.convert_blocked.as_deref(), ctx, |ctx| {
            let sounds = find_sources(&partition.sounds_source(unpacked), "wem", fallback, partition)?;
            convert_partition(
                self.transcoder.as_ref(),
                &sounds,
                &config.sounds_dir(partition),
                config.workers,
                ctx,
            )
        });

        let ctx = ctx.with_stage(Stage::Group);
        summary.group = self.stage(stages.group, None, ctx, |ctx| {
            group_partition(&config.banks_dir(partition), &config.sounds_dir(partition), ctx)
        });

        let ctx = ctx.with_stage(Stage::Rename);
        let knowledge_blocked = inputs.knowledge.as_ref().err().map(String::as_str);
        summary.rename = self.stage(stages.rename, knowledge_blocked, ctx, |ctx| match &inputs.knowledge {
            Ok(knowledge) => rename_partition(&config.sounds_dir(partition), knowledge, ctx),
            Err(_) => Ok(RenameReport::default()),
        });

        summary
    }

    /// Run one stage unless it is disabled, blocked, or cancelled
    fn stage<'a, T>(
        &self,
        enabled: bool,
        blocked: Option<&str>,
        ctx: StageContext<'a>,
        run: impl FnOnce(StageContext<'a>) -> Result<T>,
    ) -> StageOutcome<T> {
        if !enabled {
            return StageOutcome::Disabled;
        }
        if let Some(reason) = blocked {
            ctx.aborted(reason);
            return StageOutcome::Aborted(reason.to_string());
        }
        if ctx.is_cancelled() {
            return StageOutcome::NotRun;
        }
        match run(ctx) {
            Ok(report) => StageOutcome::Completed(report),
            Err(e) => {
                tracing::error!(
                    "{} aborted on {}: {}",
                    ctx.stage.as_str(),
                    display_partition(ctx.partition),
                    e
                );
                ctx.aborted(e.to_string());
                StageOutcome::Aborted(e.to_string())
            }
        }
    }
}

fn display_partition(partition: Option<Partition>) -> &'static str {
    partition.map_or("all partitions", Partition::as_str)
}

/// Group one partition directory outside a full run
pub fn group_directory(
    banks_dir: &Path,
    sounds_dir: &Path,
    events: &EventSink,
    cancel: &CancellationToken,
) -> Result<GroupReport> {
    let ctx = StageContext::new(Stage::Group, events, cancel);
    let ctx = match Partition::from_path(sounds_dir) {
        Some(p) => ctx.for_partition(p),
        None => ctx,
    };
    group_partition(banks_dir, sounds_dir, ctx)
}

/// Rename one grouped partition directory outside a full run
pub fn rename_directory(
    sounds_dir: &Path,
    knowledge: &KnowledgeBase,
    events: &EventSink,
    cancel: &CancellationToken,
) -> Result<RenameReport> {
    let ctx = StageContext::new(Stage::Rename, events, cancel);
    let ctx = match Partition::from_path(sounds_dir) {
        Some(p) => ctx.for_partition(p),
        None => ctx,
    };
    rename_partition(sounds_dir, knowledge, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageToggles;
    use crate::error::Error;
    use crate::progress::EventKind;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct MissingDecoder;

    impl BankDecoder for MissingDecoder {
        fn check_available(&self) -> Result<()> {
            Err(Error::ToolNotFound {
                tool: "wwiser",
                path: PathBuf::from("dependencies/wwiser.pyz"),
            })
        }

        fn decode(&self, _bank: &Path) -> Result<PathBuf> {
            unreachable!("decode must not run when the tool is missing")
        }
    }

    struct NoopTranscoder;

    impl Transcoder for NoopTranscoder {
        fn transcode(&self, _source: &Path, _dest: &Path) -> Result<()> {
            Ok(())
        }
    }

    fn config(root: &Path) -> PipelineConfig {
        PipelineConfig::default()
            .with_unpacked_data(root.join("UnpackedData"))
            .with_audio_converted(root.join("ConvertedAudio"))
            .with_banks_converted(root.join("ConvertedBanks"))
            .with_knowledge_base(root.join("wiki_data.json"))
    }

    #[test]
    fn test_missing_tool_aborts_stage_only() {
        let temp = TempDir::new().unwrap();
        let config = config(temp.path()).with_stages(StageToggles {
            decode: true,
            convert: false,
            group: true,
            rename: false,
        });

        let (sink, rx) = EventSink::channel();
        let pipeline = Pipeline::with_tools(config, Box::new(MissingDecoder), Box::new(NoopTranscoder))
            .with_events(sink);
        let summary = pipeline.run().unwrap();
        drop(pipeline);

        assert_eq!(summary.partitions.len(), 2);
        for partition in &summary.partitions {
            assert!(partition.decode.is_aborted());
            assert!(matches!(partition.group, StageOutcome::Completed(_)));
            assert_eq!(partition.rename, StageOutcome::Disabled);
        }
        assert!(summary.has_aborts());

        let aborts = rx
            .iter()
            .filter(|e| e.kind == EventKind::Aborted && e.stage == Stage::Decode)
            .count();
        assert_eq!(aborts, 2);
    }

    #[test]
    fn test_missing_knowledge_base_aborts_rename() {
        let temp = TempDir::new().unwrap();
        let config = config(temp.path())
            .with_partitions(vec![Partition::Shared])
            .with_stages(StageToggles::default());

        let pipeline =
            Pipeline::with_tools(config, Box::new(MissingDecoder), Box::new(NoopTranscoder));
        let summary = pipeline.run().unwrap();

        assert_eq!(summary.partitions.len(), 1);
        let shared = &summary.partitions[0];
        assert_eq!(shared.decode, StageOutcome::Disabled);
        assert!(shared.rename.is_aborted());
        assert!(summary.issues().iter().any(|i| i.contains("knowledge base not found")));
    }

    #[test]
    fn test_cancelled_run_skips_stages() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("wiki_data.json"), "{}").unwrap();
        let config = config(temp.path());

        let cancel = CancellationToken::new();
        cancel.cancel();
        let pipeline = Pipeline::with_tools(config, Box::new(MissingDecoder), Box::new(NoopTranscoder))
            .with_cancellation(cancel);
        let summary = pipeline.run().unwrap();

        assert!(summary.cancelled);
        for partition in &summary.partitions {
            assert_eq!(partition.group, StageOutcome::NotRun);
            assert_eq!(partition.rename, StageOutcome::NotRun);
        }
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let pipeline = Pipeline::with_tools(
            config(temp.path()).with_workers(0),
            Box::new(MissingDecoder),
            Box::new(NoopTranscoder),
        );
        assert!(matches!(pipeline.run(), Err(Error::InvalidConfig(_))));
    }
}
