//! External HTML-to-PDF rendering
//!
//! Rendering is the one stage that leaves the process. The contract is a
//! narrow trait so the pipeline can be exercised against fakes that
//! return synthetic documents, while production jobs shell out to the
//! real engine under a bounded timeout with its own virtual display.

use crate::error::{PipelineError, Result};
use bookpress_pdf::{BoxSize, constants::pt_to_mm, load_pdf};
use lopdf::Document;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// One render call: markup in, raw PDF out.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub html: &'a str,
    /// Page size of the raw (pre-trim) document, in points.
    pub page: BoxSize,
    /// Short name used for scratch files and diagnostics.
    pub label: &'a str,
}

/// The rendering contract the pipeline depends on.
///
/// Must be deterministic for identical input and fonts; page counts are
/// what the pagination plan is built from.
pub trait HtmlRenderer {
    fn render(
        &self,
        request: RenderRequest<'_>,
        scratch: &Path,
    ) -> impl Future<Output = Result<Document>> + Send;
}

/// Configuration for the subprocess renderer
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Renderer executable
    pub command: PathBuf,
    /// Extra arguments appended before input/output paths
    pub extra_args: Vec<String>,
    /// Wall-clock bound per render call; exceeding it kills the process
    pub timeout: Duration,
    /// Give the renderer its own headless display server
    pub virtual_display: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("wkhtmltopdf"),
            extra_args: Vec::new(),
            timeout: Duration::from_secs(120),
            virtual_display: false,
        }
    }
}

/// Subprocess renderer with per-job display isolation.
pub struct WkRenderer {
    config: RenderConfig,
    display: Option<VirtualDisplay>,
    calls: AtomicU32,
}

impl WkRenderer {
    /// Build a renderer for one job, acquiring a virtual display when the
    /// configuration asks for one. Dropping the renderer releases it.
    pub async fn spawn(config: RenderConfig) -> Result<Self> {
        let display = if config.virtual_display {
            Some(VirtualDisplay::acquire().await?)
        } else {
            None
        };
        Ok(Self {
            config,
            display,
            calls: AtomicU32::new(0),
        })
    }
}

impl HtmlRenderer for WkRenderer {
    async fn render(&self, request: RenderRequest<'_>, scratch: &Path) -> Result<Document> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let input = scratch.join(format!("{}-{call}.html", request.label));
        let output = scratch.join(format!("{}-{call}.pdf", request.label));

        tokio::fs::write(&input, request.html).await?;

        let mut cmd = Command::new(&self.config.command);
        cmd.arg("--quiet")
            .arg("--page-width")
            .arg(format!("{:.2}mm", pt_to_mm(request.page.width_pt)))
            .arg("--page-height")
            .arg(format!("{:.2}mm", pt_to_mm(request.page.height_pt)))
            .args(["--margin-top", "0", "--margin-bottom", "0"])
            .args(["--margin-left", "0", "--margin-right", "0"])
            .args(&self.config.extra_args)
            .arg(&input)
            .arg(&output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the child on timeout must take the process with it.
            .kill_on_drop(true);

        if let Some(display) = &self.display {
            cmd.env("DISPLAY", display.address());
        }

        debug!(label = request.label, input = %input.display(), "rendering");

        let child = cmd.spawn().map_err(|e| PipelineError::Render {
            message: format!("cannot launch {}: {e}", self.config.command.display()),
        })?;

        let out = match tokio::time::timeout(self.config.timeout, child.wait_with_output()).await {
            Ok(Ok(out)) => out,
            Ok(Err(e)) => {
                return Err(PipelineError::Render {
                    message: format!("renderer failed to run: {e}"),
                });
            }
            Err(_) => {
                warn!(label = request.label, "renderer timed out, killing");
                return Err(PipelineError::Tool {
                    message: format!(
                        "renderer timed out after {}s on {}",
                        self.config.timeout.as_secs(),
                        request.label
                    ),
                });
            }
        };

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(PipelineError::Render {
                message: format!(
                    "renderer exited with {:?} on {}: {}",
                    out.status.code(),
                    request.label,
                    stderr.trim()
                ),
            });
        }

        load_pdf(&output).await.map_err(|e| PipelineError::Render {
            message: format!("renderer produced unreadable output: {e}"),
        })
    }
}

static NEXT_DISPLAY: AtomicU32 = AtomicU32::new(90);

/// A headless X display owned by one job.
///
/// Jobs must not share a display server, so each acquires its own and the
/// server dies with this handle on every exit path.
pub struct VirtualDisplay {
    number: u32,
    child: Child,
}

impl VirtualDisplay {
    pub async fn acquire() -> Result<Self> {
        let number = NEXT_DISPLAY.fetch_add(1, Ordering::SeqCst);
        let child = Command::new("Xvfb")
            .arg(format!(":{number}"))
            .args(["-screen", "0", "1024x768x24", "-nolisten", "tcp"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PipelineError::Tool {
                message: format!("cannot launch Xvfb: {e}"),
            })?;

        // Give the server a moment to take the socket before first use.
        tokio::time::sleep(Duration::from_millis(250)).await;

        debug!(display = number, "virtual display up");
        Ok(Self { number, child })
    }

    pub fn address(&self) -> String {
        format!(":{}", self.number)
    }
}

impl Drop for VirtualDisplay {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
    }
}
