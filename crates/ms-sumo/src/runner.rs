//! Blocking invocation of the SUMO simulator and the `duarouter` tool.
//!
//! Both stages sit behind a trait so the study driver can be exercised with
//! in-process fakes.  The real implementations spawn the binary, wait for it
//! and observe nothing but the exit status.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use serde::{Deserialize, Serialize};

use crate::{SumoError, SumoResult};

/// What to do when the simulator exits with a non-zero status.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitPolicy {
    /// Non-zero exit is an error.
    #[default]
    Check,
    /// Non-zero exit is logged and the run continues.
    Ignore,
}

// ── Traits ────────────────────────────────────────────────────────────────────

/// Runs one simulation for a prepared configuration file.
pub trait Simulator {
    fn run(&self, config: &Path) -> SumoResult<()>;
}

/// Turns a trip file into a routed vehicle file.
pub trait TripRouter {
    fn route(&self, net: &Path, trips: &Path, output: &Path) -> SumoResult<()>;
}

// ── SUMO ──────────────────────────────────────────────────────────────────────

/// `sumo -c <config>` as a child process.
#[derive(Clone, Debug)]
pub struct SumoProcess {
    pub binary: PathBuf,
    pub policy: ExitPolicy,
}

impl SumoProcess {
    pub fn new(binary: impl Into<PathBuf>, policy: ExitPolicy) -> Self {
        Self { binary: binary.into(), policy }
    }
}

impl Simulator for SumoProcess {
    fn run(&self, config: &Path) -> SumoResult<()> {
        log::debug!("{} -c {}", self.binary.display(), config.display());
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-c").arg(config);
        let status = wait(&self.binary, &mut cmd)?;

        if status.success() {
            return Ok(());
        }
        match self.policy {
            ExitPolicy::Check => Err(SumoError::ExitStatus {
                program: self.binary.clone(),
                code:    status.code(),
            }),
            ExitPolicy::Ignore => {
                log::warn!(
                    "{} exited with {status} for {}; continuing",
                    self.binary.display(),
                    config.display()
                );
                Ok(())
            }
        }
    }
}

// ── duarouter ─────────────────────────────────────────────────────────────────

/// `duarouter --net-file … --route-files … --output-file …`.  A non-zero exit
/// is always an error.
#[derive(Clone, Debug)]
pub struct Duarouter {
    pub binary: PathBuf,
}

impl Duarouter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }
}

impl TripRouter for Duarouter {
    fn route(&self, net: &Path, trips: &Path, output: &Path) -> SumoResult<()> {
        log::debug!(
            "{} --net-file {} --route-files {} --output-file {}",
            self.binary.display(),
            net.display(),
            trips.display(),
            output.display()
        );
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--net-file")
            .arg(net)
            .arg("--route-files")
            .arg(trips)
            .arg("--output-file")
            .arg(output);
        let status = wait(&self.binary, &mut cmd)?;
        if status.success() {
            Ok(())
        } else {
            Err(SumoError::ExitStatus {
                program: self.binary.clone(),
                code:    status.code(),
            })
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Location of a SUMO tool: `<sumo_home>/bin/<name>` when a SUMO installation
/// directory is given, else the bare name (looked up on `PATH`).
pub fn tool_path(name: &str, sumo_home: Option<&Path>) -> PathBuf {
    match sumo_home {
        Some(home) => home.join("bin").join(name),
        None => PathBuf::from(name),
    }
}

fn wait(program: &Path, cmd: &mut Command) -> SumoResult<ExitStatus> {
    cmd.status().map_err(|source| SumoError::Spawn {
        program: program.to_path_buf(),
        source,
    })
}
