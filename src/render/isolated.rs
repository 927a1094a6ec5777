//! Rendering in a disposable worker process
//!
//! The plotting stack keeps process-wide state (font caches, backend
//! buffers), so every render runs in a fresh child process. The parent
//! writes a JSON [`RenderJob`] to the child's stdin; the child renders,
//! then writes the finished PNG to its stdout in one piece and exits. The
//! stdout pipe is the one-shot handoff: an image is accepted only when the
//! child exits successfully and the bytes carry a PNG signature.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Context;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use super::plot::{self, PlotArtifact, RenderSpec};
use crate::config::RenderConfig;
use crate::error::RenderError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Longest stderr excerpt carried in a [`RenderError::WorkerFailed`].
const STDERR_TAIL: usize = 2048;

// ---------------------------------------------------------------------------
// RenderBackend
// ---------------------------------------------------------------------------

/// Something that turns a difference series into an image.
pub trait RenderBackend {
    fn render(&self, series: &[f64], spec: &RenderSpec) -> Result<PlotArtifact, RenderError>;
}

/// Renders on the calling thread. Each call builds its own bitmap and chart,
/// nothing is kept between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct InProcessRenderer;

impl RenderBackend for InProcessRenderer {
    fn render(&self, series: &[f64], spec: &RenderSpec) -> Result<PlotArtifact, RenderError> {
        plot::render(series, spec)
    }
}

// ---------------------------------------------------------------------------
// RenderJob – parent → child wire format
// ---------------------------------------------------------------------------

/// One render request as sent to a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderJob {
    /// Series values; `None` stands for a non-finite value, which JSON
    /// cannot carry.
    values: Vec<Option<f64>>,
    pub spec: RenderSpec,
}

impl RenderJob {
    pub fn new(series: &[f64], spec: &RenderSpec) -> Self {
        Self {
            values: series
                .iter()
                .map(|&v| if v.is_finite() { Some(v) } else { None })
                .collect(),
            spec: spec.clone(),
        }
    }

    pub fn series(&self) -> Vec<f64> {
        self.values.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
    }
}

/// Child side: read one job from `input`, render it, and write the PNG to
/// `output`. Nothing is written unless rendering succeeds.
pub fn run_worker(input: impl Read, mut output: impl Write) -> anyhow::Result<()> {
    let job: RenderJob = serde_json::from_reader(input).context("reading render job")?;
    let series = job.series();
    debug!("worker rendering {} values", series.len());

    let artifact = plot::render(&series, &job.spec)?;
    output
        .write_all(artifact.as_bytes())
        .context("writing image")?;
    output.flush().context("flushing image")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// IsolatedRenderExecutor – parent side
// ---------------------------------------------------------------------------

/// Runs each render in its own short-lived worker process.
#[derive(Debug, Clone)]
pub struct IsolatedRenderExecutor {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Duration,
}

impl IsolatedRenderExecutor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: RenderConfig::default().timeout(),
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.worker_path()).with_timeout(config.timeout())
    }

    /// Extra arguments passed to the worker program.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Render `series` in a new worker process and wait for its image.
    ///
    /// Blocks until the worker exits or the timeout expires; a worker still
    /// running at the deadline is killed.
    pub fn render_isolated(
        &self,
        series: &[f64],
        spec: &RenderSpec,
    ) -> Result<PlotArtifact, RenderError> {
        let job = serde_json::to_vec(&RenderJob::new(series, spec))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RenderError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;
        let pid = child.id();
        debug!("render worker {pid} started for {} values", series.len());

        // Every pipe is serviced on its own thread so a stalled worker can
        // only ever block those threads, never the deadline below.
        let feeder = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || {
                if let Err(err) = stdin.write_all(&job) {
                    debug!("render worker {pid} did not take its job: {err}");
                }
            })
        });
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let started = Instant::now();
        let status = wait_until(&mut child, started + self.timeout).map_err(|source| {
            RenderError::Spawn {
                program: self.program.display().to_string(),
                source,
            }
        })?;

        let Some(status) = status else {
            if let Err(err) = child.kill() {
                warn!("could not kill render worker {pid}: {err}");
            }
            if let Err(err) = child.wait() {
                warn!("could not reap render worker {pid}: {err}");
            }
            error!("render worker {pid} timed out after {:?}", self.timeout);
            return Err(RenderError::Timeout {
                after: self.timeout,
            });
        };

        if let Some(feeder) = feeder {
            let _ = feeder.join();
        }
        let image = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        let artifact = PlotArtifact::from_bytes(image);
        if !status.success() || !artifact.is_png() {
            let mut message = tail(&stderr);
            if status.success() {
                message = format!("no image produced ({} bytes on stdout) {message}", artifact.len());
            }
            error!("render worker {pid} failed ({status}): {message}");
            return Err(RenderError::WorkerFailed {
                status,
                stderr: message,
            });
        }

        info!(
            "render worker {pid} produced {} bytes in {:?}",
            artifact.len(),
            started.elapsed()
        );
        Ok(artifact)
    }
}

impl RenderBackend for IsolatedRenderExecutor {
    fn render(&self, series: &[f64], spec: &RenderSpec) -> Result<PlotArtifact, RenderError> {
        self.render_isolated(series, spec)
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(err) = pipe.read_to_end(&mut buf) {
                debug!("reading worker pipe failed: {err}");
            }
        }
        buf
    })
}

/// `None` if the child is still running at `deadline`.
fn wait_until(child: &mut Child, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn tail(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    let start = text
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| text.len() - i <= STDERR_TAIL)
        .unwrap_or(text.len());
    text[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parameter::Parameter;

    fn spec() -> RenderSpec {
        RenderSpec::new("MUR", "ICOADS", Parameter::Sst, true).with_size(200, 150)
    }

    #[test]
    fn test_job_round_trip_keeps_non_finite_slots() {
        let job = RenderJob::new(&[1.0, f64::NAN, -2.5, f64::INFINITY], &spec());
        let wire = serde_json::to_string(&job).unwrap();
        let back: RenderJob = serde_json::from_str(&wire).unwrap();

        let series = back.series();
        assert_eq!(series.len(), 4);
        assert_eq!(series[0], 1.0);
        assert!(series[1].is_nan());
        assert_eq!(series[2], -2.5);
        assert!(series[3].is_nan());
        assert_eq!(back.spec, spec());
    }

    #[test]
    fn test_run_worker_writes_png() {
        let job = serde_json::to_vec(&RenderJob::new(&[0.1, 0.2, 0.4], &spec())).unwrap();
        let mut out = Vec::new();
        run_worker(job.as_slice(), &mut out).unwrap();

        let artifact = PlotArtifact::from_bytes(out);
        assert!(artifact.is_png());
        assert_eq!(artifact, InProcessRenderer.render(&[0.1, 0.2, 0.4], &spec()).unwrap());
    }

    #[test]
    fn test_run_worker_writes_nothing_on_bad_job() {
        let mut out = Vec::new();
        assert!(run_worker(&b"{\"values\": 3}"[..], &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let exec = IsolatedRenderExecutor::new("/nonexistent/matchup-histogram-worker");
        let err = exec.render_isolated(&[1.0], &spec()).unwrap_err();
        assert!(matches!(err, RenderError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_worker_without_output_is_failure() {
        let exec = IsolatedRenderExecutor::new("sh").with_args(["-c", "cat >/dev/null"]);
        let err = exec.render_isolated(&[1.0], &spec()).unwrap_err();
        match err {
            RenderError::WorkerFailed { status, stderr } => {
                assert!(status.success());
                assert!(stderr.contains("no image produced"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_crashing_worker_is_failure() {
        let exec = IsolatedRenderExecutor::new("sh")
            .with_args(["-c", "echo 'worker exploded' >&2; exit 3"]);
        let err = exec.render_isolated(&[1.0], &spec()).unwrap_err();
        match err {
            RenderError::WorkerFailed { status, stderr } => {
                assert_eq!(status.code(), Some(3));
                assert!(stderr.contains("worker exploded"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_hung_worker_times_out() {
        let exec = IsolatedRenderExecutor::new("sh")
            .with_args(["-c", "exec sleep 30"])
            .with_timeout(Duration::from_millis(200));
        let started = Instant::now();
        let err = exec.render_isolated(&[1.0], &spec()).unwrap_err();
        assert!(matches!(err, RenderError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_tail_keeps_end_of_long_output() {
        let long = "x".repeat(STDERR_TAIL * 2) + "END";
        let t = tail(long.as_bytes());
        assert_eq!(t.len(), STDERR_TAIL);
        assert!(t.ends_with("END"));
        assert_eq!(tail(b"  short \n"), "short");
    }
}
