//! Bank decoding through `wwiser`
//!
//! `wwiser` is a Python zipapp; in `-d xsl` mode it writes `<bank>.bnk.xml`
//! next to the input bank.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use super::BankDecoder;
use super::process::run_tool;
use crate::error::{Error, Result};

const TOOL: &str = "wwiser";

/// Decoder shelling out to `python wwiser.pyz -d xsl <bank>`
#[derive(Debug, Clone)]
pub struct WwiserDecoder {
    python: PathBuf,
    wwiser_pyz: PathBuf,
    timeout: Option<Duration>,
}

impl WwiserDecoder {
    #[must_use]
    pub fn new(python: impl Into<PathBuf>, wwiser_pyz: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            wwiser_pyz: wwiser_pyz.into(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Where `wwiser` writes the descriptor for `bank`
    #[must_use]
    pub fn descriptor_path(bank: &Path) -> PathBuf {
        let mut path = bank.as_os_str().to_owned();
        path.push(".xml");
        PathBuf::from(path)
    }
}

impl BankDecoder for WwiserDecoder {
    fn check_available(&self) -> Result<()> {
        if self.wwiser_pyz.is_file() {
            Ok(())
        } else {
            Err(Error::ToolNotFound {
                tool: TOOL,
                path: self.wwiser_pyz.clone(),
            })
        }
    }

    fn decode(&self, bank: &Path) -> Result<PathBuf> {
        let mut command = Command::new(&self.python);
        command.arg(&self.wwiser_pyz).arg("-d").arg("xsl").arg(bank);
        run_tool(TOOL, command, bank, self.timeout)?;

        let expected = Self::descriptor_path(bank);
        if expected.is_file() {
            Ok(expected)
        } else {
            Err(Error::ToolOutputMissing {
                tool: TOOL,
                expected,
            })
        }
    }
}
