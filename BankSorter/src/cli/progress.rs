//! CLI progress display utilities
//!
//! Renders the library's [`PipelineEvent`] stream as one progress bar per
//! stage and partition, with failures and notices printed above the bars.

use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use console::{Emoji, style};
use indicatif::{HumanDuration, MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::partition::Partition;
use crate::progress::{EventKind, EventSink, PipelineEvent, Stage};

// =============================================================================
// Emoji Constants (with ASCII fallbacks for terminals without emoji support)
// =============================================================================

/// Magnifying glass - for scanning operations
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Package - for bank decoding
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");
/// Speaker - for audio conversion
pub static SPEAKER: Emoji<'_, '_> = Emoji("🔊 ", "");
/// Folder - for grouping
pub static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
/// Label - for renaming
pub static LABEL: Emoji<'_, '_> = Emoji("🏷️  ", "");
/// Floppy disk - for writing/saving operations
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");
/// Warning sign - for failures and aborts
pub static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "! ");

/// Emoji for a pipeline stage
#[must_use]
pub fn stage_emoji(stage: Stage) -> Emoji<'static, 'static> {
    match stage {
        Stage::Decode => PACKAGE,
        Stage::Convert => SPEAKER,
        Stage::Group => FOLDER,
        Stage::Rename => LABEL,
        Stage::Dictionary => LOOKING_GLASS,
    }
}

// =============================================================================
// Step-Based Progress
// =============================================================================

/// Print a step indicator: `[1/3] 📦 Message...`
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    println!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// Print completion message: `✨ Done in 2s`
pub fn print_done(elapsed: Duration) {
    println!("{} Done in {}", SPARKLE, HumanDuration(elapsed));
}

// =============================================================================
// Progress Styles
// =============================================================================

/// Progress bar style for a stage on one partition
///
/// Format: `[Shared] 📁 Grouping files by bank [████░░░░] 50/100`
///
/// # Panics
/// Panics if the template string is invalid (this is a compile-time constant).
#[must_use]
pub fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix:.bold.dim} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
        .expect("valid template")
}

// =============================================================================
// Event Rendering
// =============================================================================

fn partition_prefix(partition: Option<Partition>) -> String {
    partition.map_or_else(|| "[all]".to_string(), |p| format!("[{p}]"))
}

/// Draws pipeline events onto a [`MultiProgress`]
pub struct EventRenderer {
    mp: MultiProgress,
    bars: HashMap<(Stage, Option<Partition>), ProgressBar>,
    quiet: bool,
}

impl EventRenderer {
    /// A renderer; `quiet` hides bars and notices but still prints failures
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let mp = MultiProgress::new();
        if quiet {
            mp.set_draw_target(ProgressDrawTarget::hidden());
        }
        Self {
            mp,
            bars: HashMap::new(),
            quiet,
        }
    }

    /// Consume events until every sender is dropped
    pub fn drain(mut self, events: Receiver<PipelineEvent>) {
        for event in events {
            self.handle(&event);
        }
        for (_, bar) in self.bars.drain() {
            bar.abandon();
        }
    }

    pub fn handle(&mut self, event: &PipelineEvent) {
        let key = (event.stage, event.partition);
        let prefix = partition_prefix(event.partition);

        match event.kind {
            EventKind::Started => {
                let bar = self.mp.add(ProgressBar::new(event.total as u64));
                bar.set_style(bar_style());
                bar.set_prefix(prefix);
                bar.set_message(format!("{}{}", stage_emoji(event.stage), event.stage.as_str()));
                self.bars.insert(key, bar);
            }
            EventKind::Progress => {
                if let Some(bar) = self.bars.get(&key) {
                    bar.set_length(event.total as u64);
                    bar.set_position(event.current as u64);
                }
            }
            EventKind::Notice | EventKind::Skipped => {
                if !self.quiet {
                    self.print(format!("{prefix} {}", style(&event.message).dim()));
                }
            }
            EventKind::Failed => {
                self.print(format!("{prefix} {WARNING}{}", style(&event.message).red()));
            }
            EventKind::Aborted => {
                if let Some(bar) = self.bars.remove(&key) {
                    bar.abandon();
                }
                self.print(format!(
                    "{prefix} {WARNING}{} aborted: {}",
                    event.stage.as_str(),
                    style(&event.message).red().bold()
                ));
            }
            EventKind::Cancelled => {
                if let Some(bar) = self.bars.remove(&key) {
                    bar.abandon();
                }
                self.print(format!("{prefix} {}", style(&event.message).yellow()));
            }
            EventKind::Finished => {
                if let Some(bar) = self.bars.remove(&key) {
                    bar.finish();
                }
                if !self.quiet {
                    self.print(format!(
                        "{prefix} {}{}: {}",
                        stage_emoji(event.stage),
                        event.stage.as_str(),
                        event.message
                    ));
                }
            }
        }
    }

    fn print(&self, line: String) {
        if self.quiet {
            eprintln!("{line}");
        } else {
            let _ = self.mp.println(line);
        }
    }
}

/// Run `work` with a connected [`EventSink`] while its events are drawn on a
/// separate thread.
///
/// `work` takes the sink by value; rendering ends once it (and every clone)
/// has been dropped.
pub fn with_renderer<T>(quiet: bool, work: impl FnOnce(EventSink) -> T) -> T {
    let (sink, events) = EventSink::channel();
    std::thread::scope(|scope| {
        let renderer = scope.spawn(move || EventRenderer::new(quiet).drain(events));
        let result = work(sink);
        let _ = renderer.join();
        result
    })
}
