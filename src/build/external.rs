//! Subprocess bridge to an out-of-process CAD kernel.
//!
//! When the in-process kernel is disabled, STEP output can still come from a
//! real B-rep modeler running as a separate executable. The contract is a
//! JSON request file: we write the part description and the wanted output
//! path next to the target, invoke the program with the request path as its
//! single argument, and wait for it to produce the file.

use crate::config::{Hole, PartConfig};
use crate::errors::GenerateError;
use crate::float_types::Real;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long the `--version` probe may take before the kernel is declared
/// unavailable.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// How long one generation run may take before the process is killed.
const GENERATE_TIMEOUT: Duration = Duration::from_secs(30);
/// A produced file smaller than this is treated as a failed run.
const MIN_OUTPUT_BYTES: u64 = 100;

/// Request payload handed to the kernel executable. The schema string lets
/// the executable reject payloads from an incompatible caller.
#[derive(Debug, Serialize)]
pub struct KernelRequest<'a> {
    pub schema: &'static str,
    pub shape: crate::config::PlateShape,
    pub width: Real,
    pub height: Real,
    pub thickness: Real,
    pub material: &'a str,
    pub corner_radius: Real,
    pub custom_points: &'a [[Real; 2]],
    pub holes: &'a [Hole],
    pub output: &'a Path,
}

impl<'a> KernelRequest<'a> {
    pub fn new(config: &'a PartConfig, output: &'a Path) -> Self {
        KernelRequest {
            schema: "platecad-kernel/1",
            shape: config.shape,
            width: config.width,
            height: config.height,
            thickness: config.thickness,
            material: config.material.as_str(),
            corner_radius: config.corner_radius,
            custom_points: &config.custom_points,
            holes: &config.holes,
            output,
        }
    }
}

/// Handle to a probed kernel executable.
#[derive(Debug, Clone)]
pub struct ExternalKernel {
    program: PathBuf,
}

impl ExternalKernel {
    /// Run `<program> --version` and keep the handle only if it exits
    /// successfully within the probe timeout. Run once at startup; the
    /// result does not change while the process lives.
    pub fn probe(program: impl Into<PathBuf>) -> Option<ExternalKernel> {
        let program = program.into();
        let child = Command::new(&program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                debug!(program = %program.display(), error = %e, "kernel probe failed to spawn");
                return None;
            }
        };
        match wait_with_timeout(&mut child, PROBE_TIMEOUT) {
            Ok(status) if status.success() => {
                debug!(program = %program.display(), "external kernel available");
                Some(ExternalKernel { program })
            }
            Ok(status) => {
                debug!(program = %program.display(), %status, "kernel probe exited nonzero");
                None
            }
            Err(()) => {
                warn!(program = %program.display(), "kernel probe timed out");
                None
            }
        }
    }

    /// Generate a STEP file at `output`. Errors here are fatal for the
    /// request: a configured kernel that fails must surface, not silently
    /// degrade to the template writer.
    pub fn generate_step(&self, config: &PartConfig, output: &Path) -> Result<(), GenerateError> {
        let request_path = output.with_extension("request.json");
        let payload = serde_json::to_vec_pretty(&KernelRequest::new(config, output))
            .map_err(|e| GenerateError::Subprocess(format!("request encoding failed: {e}")))?;
        std::fs::write(&request_path, payload)
            .map_err(|e| GenerateError::encoding(&request_path, e))?;

        let result = self.run(&request_path, output);
        // the request file is scratch either way
        let _ = std::fs::remove_file(&request_path);
        result
    }

    fn run(&self, request_path: &Path, output: &Path) -> Result<(), GenerateError> {
        let mut child = Command::new(&self.program)
            .arg(request_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                GenerateError::Subprocess(format!(
                    "failed to start {}: {e}",
                    self.program.display()
                ))
            })?;

        // Drain stderr on its own thread. A kernel that writes more than
        // the pipe buffer holds would otherwise block mid-run and get
        // misreported as a timeout.
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = std::io::Read::read_to_string(&mut pipe, &mut buf);
                buf
            })
        });

        let status = wait_with_timeout(&mut child, GENERATE_TIMEOUT).map_err(|()| {
            GenerateError::Subprocess(format!(
                "{} timed out after {}s",
                self.program.display(),
                GENERATE_TIMEOUT.as_secs()
            ))
        })?;

        if !status.success() {
            let stderr = stderr_reader
                .and_then(|reader| reader.join().ok())
                .unwrap_or_default();
            return Err(GenerateError::Subprocess(format!(
                "kernel exited with {status}: {}",
                stderr.trim()
            )));
        }

        let size = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        if size < MIN_OUTPUT_BYTES {
            return Err(GenerateError::Subprocess(format!(
                "kernel produced no usable output at {} ({size} bytes)",
                output.display()
            )));
        }
        Ok(())
    }
}

/// Poll `try_wait` until exit or deadline, then kill. `Err(())` means the
/// deadline passed.
fn wait_with_timeout(
    child: &mut std::process::Child,
    timeout: Duration,
) -> Result<std::process::ExitStatus, ()> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(());
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_rejects_missing_program() {
        assert!(ExternalKernel::probe("/nonexistent/plate-kernel").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn wait_with_timeout_kills_an_overrunning_process() {
        let mut child = Command::new("sleep")
            .arg("5")
            .stdout(Stdio::null())
            .spawn()
            .unwrap();
        let started = Instant::now();
        assert_eq!(wait_with_timeout(&mut child, Duration::from_millis(100)), Err(()));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn chatty_stderr_surfaces_the_exit_error_not_a_timeout() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        // Floods stderr well past the pipe buffer, then fails.
        let script = dir.path().join("noisy-kernel.sh");
        std::fs::write(
            &script,
            "#!/bin/sh\n\
             [ \"$1\" = \"--version\" ] && exit 0\n\
             i=0\n\
             while [ $i -lt 20000 ]; do echo \"noise $i\" >&2; i=$((i+1)); done\n\
             echo 'solver diverged' >&2\n\
             exit 3\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let kernel = ExternalKernel::probe(&script).unwrap();
        let output = dir.path().join("out.step");
        let started = Instant::now();
        let err = kernel.generate_step(&PartConfig::default(), &output).unwrap_err();

        assert!(started.elapsed() < GENERATE_TIMEOUT);
        let message = err.to_string();
        assert!(message.contains("solver diverged"), "unexpected error: {message}");
        assert!(!message.contains("timed out"));
    }

    #[test]
    fn request_serializes_part_fields() {
        let config = PartConfig {
            holes: vec![Hole::new("h1", 20.0, 30.0, 8.0)],
            ..PartConfig::default()
        };
        let output = Path::new("/tmp/out.step");
        let json = serde_json::to_string(&KernelRequest::new(&config, output)).unwrap();
        assert!(json.contains("\"schema\":\"platecad-kernel/1\""));
        assert!(json.contains("\"material\":\"PE 500\""));
        assert!(json.contains("\"output\":\"/tmp/out.step\""));
        assert!(json.contains("\"diameter\":8.0"));
    }
}
