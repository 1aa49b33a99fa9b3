//! ImageMagick engine driven through `tokio::process`.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::{ImageEngine, TransformCommand};
use crate::config::EngineConfig;
use crate::error::EngineError;

/// Runs the `identify` and `convert` programs as child processes.
///
/// Each program is a command vector so ImageMagick 7's single `magick`
/// binary works too (`["magick", "identify"]`). Arguments are passed
/// directly, never through a shell.
#[derive(Debug, Clone)]
pub struct ImageMagick {
    identify: Vec<String>,
    convert: Vec<String>,
}

impl ImageMagick {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            identify: config.identify.clone(),
            convert: config.convert.clone(),
        }
    }

    /// Spawn `program` with `args`, wait for it, and return stdout on success.
    async fn run(program: &[String], args: Vec<String>) -> Result<Vec<u8>, EngineError> {
        let (bin, prefix) = program
            .split_first()
            .ok_or_else(|| EngineError::Rejected("empty engine command".to_string()))?;
        let command_line = program.join(" ");

        tracing::debug!("Running: {} {}", command_line, args.join(" "));

        let output = Command::new(bin)
            .args(prefix)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                program: command_line.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(EngineError::Exit {
                program: command_line,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

impl Default for ImageMagick {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

#[async_trait]
impl ImageEngine for ImageMagick {
    fn name(&self) -> &str {
        "imagemagick"
    }

    async fn version(&self) -> Result<String, EngineError> {
        let stdout = Self::run(&self.convert, vec!["-version".to_string()]).await?;
        let banner = String::from_utf8_lossy(&stdout);
        Ok(banner.lines().next().unwrap_or_default().trim().to_string())
    }

    async fn identify(&self, path: &Path, template: &str) -> Result<String, EngineError> {
        let args = vec![
            "-format".to_string(),
            template.to_string(),
            path.to_string_lossy().into_owned(),
        ];
        let stdout = Self::run(&self.identify, args).await?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    async fn convert(&self, command: &TransformCommand) -> Result<(), EngineError> {
        Self::run(&self.convert, command.to_args()).await?;
        Ok(())
    }
}
