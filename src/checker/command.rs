//! External engine bound as a subprocess.
//!
//! Protocol, one process per job:
//! - stdin:  the `CheckInput` as JSON (`render` is always false)
//! - stdout: a report JSON object, see [`CoreReport`]
//! - exit status 0 on success; anything else is an engine failure and stderr
//!   is kept as the message.

use crate::checker::{CheckError, CheckInput, Checker, CoreReport};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

#[derive(Debug, Clone)]
pub struct CommandChecker {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandChecker {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        CommandChecker {
            program: program.into(),
            args,
        }
    }
}

impl Checker for CommandChecker {
    type Report = CoreReport;

    fn check(&mut self, input: &CheckInput) -> Result<CoreReport, CheckError> {
        let payload = serde_json::to_vec(input)
            .map_err(|e| CheckError::InvalidInput(format!("encode check input: {e}")))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // A checker that exits without reading its input is not an error here;
            // its exit status decides.
            match stdin.write_all(&payload) {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => return Err(e.into()),
                _ => {}
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CheckError::Engine(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| CheckError::Protocol(format!("checker stdout is not a report: {e}")))
    }
}
