//! # BankSorter
//!
//! Turns Baldur's Gate 3 Wwise sound data into a browsable folder tree:
//! every transcoded sound filed under the bank it belongs to and named after
//! the wiki's description of it.
//!
//! ## Pipeline
//!
//! For each partition (`Shared`, `SharedDev`):
//!
//! 1. **Decode** - run `wwiser` on every `.bnk`, filing each XML descriptor
//!    under `ConvertedBanks/<partition>/<bank>/`
//! 2. **Convert** - run `vgmstream-cli` on every `.wem`, writing
//!    `ConvertedAudio/<partition>/<id>.wem.wav`
//! 3. **Group** - move each `<id>.wem.wav` into the folder of the first bank
//!    (by name) that references it
//! 4. **Rename** - rename grouped files to `<display name>.wav` using the ID
//!    map of the matching knowledge base page
//!
//! ## Quick Start
//!
//! ```no_run
//! use banksorter::prelude::*;
//!
//! let config = PipelineConfig::default().with_stages(StageToggles::all());
//! let summary = Pipeline::new(config).run()?;
//! for issue in summary.issues() {
//!     println!("{issue}");
//! }
//! # Ok::<(), banksorter::Error>(())
//! ```
//!
//! ### Building an ID map
//!
//! ```
//! use banksorter::knowledge::build_id_map;
//!
//! let map = build_id_map("1\nFootsteps\n100, 101\n");
//! assert_eq!(map.get("101"), Some("Footsteps_1"));
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `banksorter` command-line binary

pub mod banks;
pub mod cancel;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod partition;
pub mod pipeline;
pub mod progress;
pub mod stages;
pub mod tools;
pub mod utils;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    pub use crate::banks::{
        BankDescriptor, BankDictionary, DictionaryOptions, SoundId, build_dictionary, scan_banks,
    };
    pub use crate::cancel::CancellationToken;
    pub use crate::config::{PipelineConfig, StageToggles};
    pub use crate::knowledge::{IdMap, KnowledgeBase, build_id_map};
    pub use crate::partition::Partition;
    pub use crate::pipeline::{
        PartitionSummary, Pipeline, PipelineSummary, StageOutcome, group_directory,
        rename_directory,
    };
    pub use crate::progress::{EventKind, EventSink, PipelineEvent, Stage, StageContext};
    pub use crate::stages::{GroupReport, RenameReport, ToolStageReport};
    pub use crate::tools::{BankDecoder, Transcoder, VgmstreamTranscoder, WwiserDecoder};
}

/// CLI module (only available with "cli" feature)
#[cfg(feature = "cli")]
pub mod cli;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
