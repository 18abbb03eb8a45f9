//! The external post-processing step of a sampler run.
//!
//! It turns the raw sampler output into weighted posterior samples and
//! reports the evidence, the information and the log prior volumes of the
//! saved levels.

use std::io;
use std::path::PathBuf;
use std::process::Command;

use serde::{Deserialize, Serialize};

/// What the post-processing step reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostprocessOutput {
    /// Log marginal likelihood.
    pub evidence: f64,
    /// Information (KL divergence from prior to posterior), in nats.
    pub information: f64,
    /// Log prior volume of each saved sample, for the diagnostic plot.
    #[serde(default)]
    pub logx_samples: Vec<f64>,
}

/// Runs the post-processing step; `diagnostic` asks it for its diagnostic
/// output as well.
pub trait Postprocessor {
    fn run(&mut self, diagnostic: bool) -> io::Result<PostprocessOutput>;
}

/// Runs an external command in the run directory and reads a JSON
/// [`PostprocessOutput`] from its standard output.
///
/// `--plot` is appended when the diagnostic is requested.
pub struct CommandPostprocessor {
    pub program: String,
    pub args: Vec<String>,
    pub run_dir: PathBuf,
}

impl CommandPostprocessor {
    /// Split a command line such as `"python -m kima.postprocess"` into the
    /// program and its leading arguments.
    pub fn from_command_line(command: &str, run_dir: PathBuf) -> io::Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_owned);
        let program = parts.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "empty post-processing command")
        })?;
        Ok(CommandPostprocessor {
            program,
            args: parts.collect(),
            run_dir,
        })
    }
}

impl Postprocessor for CommandPostprocessor {
    fn run(&mut self, diagnostic: bool) -> io::Result<PostprocessOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.run_dir);
        if diagnostic {
            cmd.arg("--plot");
        }
        log::info!("Running post-processing: {} {:?}", self.program, self.args);

        let output = cmd.output().map_err(|e| {
            io::Error::new(e.kind(), format!("could not run '{}': {e}", self.program))
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(io::Error::other(format!(
                "'{}' failed ({}): {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        serde_json::from_slice(&output.stdout).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("'{}' printed invalid output: {e}", self.program),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_parses_without_logx() {
        let out: PostprocessOutput =
            serde_json::from_str(r#"{"evidence": -123.4, "information": 5.6}"#).unwrap();
        assert_eq!(out.evidence, -123.4);
        assert!(out.logx_samples.is_empty());
    }

    #[test]
    fn missing_program_is_an_io_error() {
        let mut p = CommandPostprocessor::from_command_line(
            "definitely-not-a-kima-program --flag",
            PathBuf::from("."),
        )
        .unwrap();
        assert_eq!(p.args, vec!["--flag"]);
        let err = p.run(false).unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-kima-program"));
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(CommandPostprocessor::from_command_line("   ", PathBuf::from(".")).is_err());
    }
}
