//! Structured progress events
//!
//! Every stage reports through an [`EventSink`], which forwards
//! [`PipelineEvent`]s over an `mpsc` channel to whatever front end is
//! attached. The library itself never prints.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::cancel::CancellationToken;
use crate::partition::Partition;

/// Pipeline stage an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Decoding `.bnk` files into XML descriptors
    Decode,
    /// Transcoding `.wem` files into `.wav`
    Convert,
    /// Moving transcoded files into per-bank folders
    Group,
    /// Renaming grouped files to display names
    Rename,
    /// Building the bank dictionary JSON
    Dictionary,
}

impl Stage {
    /// Get a human-readable description of this stage
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Decode => "Decoding sound banks",
            Self::Convert => "Converting sound files",
            Self::Group => "Grouping files by bank",
            Self::Rename => "Renaming files",
            Self::Dictionary => "Building bank dictionary",
        }
    }
}

/// What an event reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A stage started on a partition; `total` holds the item count
    Started,
    /// One unit of work finished
    Progress,
    /// Informational message (e.g. no mapping found for a folder)
    Notice,
    /// An item was skipped without error
    Skipped,
    /// An item failed; the batch continues
    Failed,
    /// The whole stage stopped early (IO error or missing input)
    Aborted,
    /// The stage stopped because cancellation was requested
    Cancelled,
    /// A stage finished on a partition
    Finished,
}

/// One progress event
#[derive(Debug, Clone)]
pub struct PipelineEvent {
    pub stage: Stage,
    pub kind: EventKind,
    /// Partition being processed, if the stage is partition-scoped
    pub partition: Option<Partition>,
    /// Current item number (1-indexed, 0 before the first item)
    pub current: usize,
    /// Total number of items
    pub total: usize,
    pub message: String,
}

impl PipelineEvent {
    #[must_use]
    pub fn new(stage: Stage, kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind,
            partition: None,
            current: 0,
            total: 0,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_partition(mut self, partition: Option<Partition>) -> Self {
        self.partition = partition;
        self
    }

    #[must_use]
    pub fn with_counts(mut self, current: usize, total: usize) -> Self {
        self.current = current;
        self.total = total;
        self
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Sending half of the progress channel
///
/// A sink without a channel discards everything, which is what tests and
/// quiet callers want. A dropped receiver is not an error.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    sender: Option<Sender<PipelineEvent>>,
}

impl EventSink {
    /// Create a connected sink and its receiver
    #[must_use]
    pub fn channel() -> (Self, Receiver<PipelineEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { sender: Some(tx) }, rx)
    }

    /// A sink that drops every event
    #[must_use]
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = &self.sender {
            let _ = tx.send(event);
        }
    }
}

/// Everything a stage needs besides its inputs: where to report, when to
/// stop, and which partition it is working on.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub stage: Stage,
    pub partition: Option<Partition>,
    pub events: &'a EventSink,
    pub cancel: &'a CancellationToken,
}

impl<'a> StageContext<'a> {
    #[must_use]
    pub fn new(stage: Stage, events: &'a EventSink, cancel: &'a CancellationToken) -> Self {
        Self {
            stage,
            partition: None,
            events,
            cancel,
        }
    }

    #[must_use]
    pub fn for_partition(mut self, partition: Partition) -> Self {
        self.partition = Some(partition);
        self
    }

    #[must_use]
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn started(&self, total: usize, message: impl Into<String>) {
        self.send(EventKind::Started, 0, total, message);
    }

    pub fn progress(&self, current: usize, total: usize, message: impl Into<String>) {
        self.send(EventKind::Progress, current, total, message);
    }

    pub fn notice(&self, message: impl Into<String>) {
        self.send(EventKind::Notice, 0, 0, message);
    }

    pub fn skipped(&self, message: impl Into<String>) {
        self.send(EventKind::Skipped, 0, 0, message);
    }

    pub fn failed(&self, message: impl Into<String>) {
        self.send(EventKind::Failed, 0, 0, message);
    }

    pub fn aborted(&self, message: impl Into<String>) {
        self.send(EventKind::Aborted, 0, 0, message);
    }

    pub fn cancelled(&self) {
        let label = self.stage.as_str();
        self.send(EventKind::Cancelled, 0, 0, format!("{label} cancelled"));
    }

    pub fn finished(&self, total: usize, message: impl Into<String>) {
        self.send(EventKind::Finished, total, total, message);
    }

    fn send(&self, kind: EventKind, current: usize, total: usize, message: impl Into<String>) {
        self.events.emit(
            PipelineEvent::new(self.stage, kind, message)
                .with_partition(self.partition)
                .with_counts(current, total),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_tags_events() {
        let (sink, rx) = EventSink::channel();
        let cancel = CancellationToken::new();
        let ctx = StageContext::new(Stage::Group, &sink, &cancel).for_partition(Partition::SharedDev);

        ctx.progress(2, 4, "AMB_01");
        drop(sink);

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].stage, Stage::Group);
        assert_eq!(events[0].kind, EventKind::Progress);
        assert_eq!(events[0].partition, Some(Partition::SharedDev));
        assert!((events[0].percentage() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_disconnected_sink_is_silent() {
        let sink = EventSink::disconnected();
        sink.emit(PipelineEvent::new(Stage::Rename, EventKind::Notice, "ignored"));
    }
}
