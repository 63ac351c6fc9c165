//! External tools
//!
//! The pipeline never decodes Wwise data itself. Bank decoding goes through
//! `wwiser` and audio transcoding through `vgmstream-cli`, both behind small
//! traits so callers (and tests) can substitute their own implementations.

mod process;
mod vgmstream;
mod wwiser;

use std::path::{Path, PathBuf};

use crate::error::Result;

pub use vgmstream::{VgmstreamTranscoder, find_vgmstream_cli};
pub use wwiser::WwiserDecoder;

/// Turns a `.bnk` into a descriptor file
pub trait BankDecoder: Send + Sync {
    /// Check that the tool can be run at all
    fn check_available(&self) -> Result<()> {
        Ok(())
    }

    /// Decode `bank` and return the path of the descriptor it produced
    fn decode(&self, bank: &Path) -> Result<PathBuf>;
}

/// Turns a compressed `.wem` into a `.wav` at `dest`
pub trait Transcoder: Send + Sync {
    /// Check that the tool can be run at all
    fn check_available(&self) -> Result<()> {
        Ok(())
    }

    fn transcode(&self, source: &Path, dest: &Path) -> Result<()>;
}
