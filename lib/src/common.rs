//! Helpers for locating and running external programs

use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured result of a finished child process
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Check whether `name` is on PATH and marked as executable
pub fn is_executable(name: impl AsRef<OsStr>) -> bool {
    which::which(name).is_ok()
}

/// Return the first candidate that resolves on PATH
///
/// # Arguments
/// * `tool` - Human readable tool name used in the error message
/// * `candidates` - Binary names to try, in order of preference
pub fn find_executable(tool: &'static str, candidates: &[&str]) -> Result<PathBuf> {
    for name in candidates {
        if let Ok(path) = which::which(name) {
            log::debug!("Using `{}` for {tool}", path.display());
            return Ok(path);
        }
    }

    Err(Error::ExecutableNotFound {
        tool,
        candidates: candidates.join(", "),
    })
}

/// Run a program to completion, capturing stdout and stderr
///
/// The child is killed if it is still running once `timeout` has elapsed.
/// A non-zero exit status is NOT an error here; callers decide.
pub fn run_captured<S: AsRef<OsStr>>(
    program: &Path,
    args: &[S],
    timeout: Duration,
) -> Result<CommandOutput> {
    log::debug!(
        "Running {} {}",
        program.display(),
        args.iter()
            .map(|a| a.as_ref().to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| Error::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

    // Drain both pipes on their own threads so a chatty child can't block on a full pipe
    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());

    let status = wait_with_deadline(&mut child, program, timeout)?;

    Ok(CommandOutput {
        status,
        stdout: join_reader(stdout),
        stderr: join_reader(stderr),
    })
}

fn wait_with_deadline(child: &mut Child, program: &Path, timeout: Duration) -> Result<ExitStatus> {
    let deadline = Instant::now() + timeout;

    loop {
        let polled = child.try_wait().map_err(|source| Error::Spawn {
            program: program.to_path_buf(),
            source,
        })?;
        if let Some(status) = polled {
            return Ok(status);
        }

        if Instant::now() >= deadline {
            log::warn!("Killing {} after {}s", program.display(), timeout.as_secs());
            // Already-exited races are fine to ignore
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Timeout {
                program: program.to_path_buf(),
                timeout,
            });
        }

        thread::sleep(POLL_INTERVAL);
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn join_reader(handle: thread::JoinHandle<Vec<u8>>) -> String {
    let bytes = handle.join().unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}
