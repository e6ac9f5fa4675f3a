//! HTML to PDF through a headless Chrome binary.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::errors::AppError;

const RENDER_TIMEOUT: Duration = Duration::from_secs(60);

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str) -> Result<Vec<u8>, AppError>;
}

/// Runs `chrome --headless --print-to-pdf` over a temp copy of the page.
pub struct ChromePdfRenderer {
    chrome_path: String,
}

impl ChromePdfRenderer {
    pub fn new(chrome_path: String) -> Self {
        Self { chrome_path }
    }
}

#[async_trait]
impl PdfRenderer for ChromePdfRenderer {
    async fn render(&self, html: &str) -> Result<Vec<u8>, AppError> {
        let dir = tempfile::tempdir()
            .map_err(|e| AppError::Render(format!("Failed to create temp dir: {e}")))?;
        let input = dir.path().join("document.html");
        let output = dir.path().join("document.pdf");

        tokio::fs::write(&input, html)
            .await
            .map_err(|e| AppError::Render(format!("Failed to write HTML: {e}")))?;

        let mut command = Command::new(&self.chrome_path);
        command
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(format!("file://{}", input.display()))
            .kill_on_drop(true);

        debug!(chrome = %self.chrome_path, "Rendering PDF");
        let result = tokio::time::timeout(RENDER_TIMEOUT, command.output())
            .await
            .map_err(|_| AppError::Render("Chrome timed out".to_string()))?
            .map_err(|e| AppError::Render(format!("Failed to launch {}: {e}", self.chrome_path)))?;

        if !result.status.success() {
            return Err(AppError::Render(format!(
                "Chrome exited with {}: {}",
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        tokio::fs::read(&output)
            .await
            .map_err(|e| AppError::Render(format!("Chrome produced no PDF: {e}")))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Returns a fixed PDF without launching a browser.
    pub struct StaticPdfRenderer;

    #[async_trait]
    impl PdfRenderer for StaticPdfRenderer {
        async fn render(&self, _html: &str) -> Result<Vec<u8>, AppError> {
            Ok(b"%PDF-1.7 test".to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_render_error() {
        let renderer = ChromePdfRenderer::new("/nonexistent/chrome-binary".to_string());
        let err = renderer.render("<p>hi</p>").await.unwrap_err();
        assert!(matches!(err, AppError::Render(_)));
    }
}
