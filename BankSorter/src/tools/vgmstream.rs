//! WEM transcoding through `vgmstream-cli`

use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use super::Transcoder;
use super::process::run_tool;
use crate::error::{Error, Result};

const TOOL: &str = "vgmstream-cli";

/// Find vgmstream-cli: configured folder first, then next to our own
/// executable, then common install locations, then PATH.
#[must_use]
pub fn find_vgmstream_cli(vgmstream_dir: Option<&Path>) -> Option<PathBuf> {
    let exe_name = format!("{TOOL}{EXE_SUFFIX}");

    if let Some(dir) = vgmstream_dir {
        let configured = dir.join(&exe_name);
        if configured.is_file() {
            return Some(configured);
        }
    }

    if let Ok(exe) = std::env::current_exe()
        && let Some(parent) = exe.parent()
    {
        let bundled = parent.join(&exe_name);
        if bundled.is_file() {
            return Some(bundled);
        }
    }

    let common_paths = [
        "/opt/homebrew/bin/vgmstream-cli", // Apple Silicon
        "/usr/local/bin/vgmstream-cli",    // Intel Mac / manual installs
        "/usr/bin/vgmstream-cli",
    ];
    for path in common_paths {
        let p = PathBuf::from(path);
        if p.is_file() {
            return Some(p);
        }
    }

    let finder = if cfg!(windows) { "where" } else { "which" };
    if let Ok(output) = Command::new(finder).arg(TOOL).output()
        && output.status.success()
    {
        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Some(path) = stdout.lines().map(str::trim).find(|l| !l.is_empty()) {
            return Some(PathBuf::from(path));
        }
    }

    None
}

/// Transcoder shelling out to `vgmstream-cli -o <dest> <source>`
#[derive(Debug, Clone)]
pub struct VgmstreamTranscoder {
    executable: Option<PathBuf>,
    searched: PathBuf,
    timeout: Option<Duration>,
}

impl VgmstreamTranscoder {
    /// Locate `vgmstream-cli`, preferring the given folder
    #[must_use]
    pub fn locate(vgmstream_dir: &Path) -> Self {
        Self {
            executable: find_vgmstream_cli(Some(vgmstream_dir)),
            searched: vgmstream_dir.join(format!("{TOOL}{EXE_SUFFIX}")),
            timeout: None,
        }
    }

    /// Use an explicit executable
    #[must_use]
    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        let executable = executable.into();
        Self {
            searched: executable.clone(),
            executable: Some(executable),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }

    fn require_executable(&self) -> Result<&Path> {
        self.executable.as_deref().ok_or_else(|| Error::ToolNotFound {
            tool: TOOL,
            path: self.searched.clone(),
        })
    }
}

impl Transcoder for VgmstreamTranscoder {
    fn check_available(&self) -> Result<()> {
        self.require_executable().map(|_| ())
    }

    fn transcode(&self, source: &Path, dest: &Path) -> Result<()> {
        let executable = self.require_executable()?;
        // The working directory changes below, so relative paths must be resolved first
        let source = std::path::absolute(source)?;
        let dest = std::path::absolute(dest)?;
        let mut command = Command::new(executable);
        command.arg("-o").arg(&dest).arg(&source);
        if let Some(dir) = executable.parent().filter(|d| !d.as_os_str().is_empty()) {
            // Windows builds load their codec DLLs from the working directory
            command.current_dir(dir);
        }
        run_tool(TOOL, command, &source, self.timeout)?;

        if dest.is_file() {
            Ok(())
        } else {
            Err(Error::ToolOutputMissing {
                tool: TOOL,
                expected: dest,
            })
        }
    }
}
