//! Shared test utilities: a scripted stand-in for the external engine.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::engine::{ImageEngine, Resize, TransformCommand};
use crate::error::EngineError;
use crate::pipeline::probe::{parse_identify_output, QUALITY_TEMPLATE};
use crate::types::SizeCap;

type ConvertPredicate = Box<dyn Fn(&TransformCommand) -> bool + Send + Sync>;

/// An [`ImageEngine`] that answers from an in-memory table.
///
/// `identify` returns the registered frame lines for a path. `convert`
/// records the command, writes a few bytes to the output path, and registers
/// a plausible frame line for the output so the re-probe succeeds.
pub(crate) struct ScriptedEngine {
    frames: Mutex<HashMap<PathBuf, String>>,
    qualities: HashMap<PathBuf, u8>,
    fail_convert: Option<ConvertPredicate>,
    commands: Arc<Mutex<Vec<TransformCommand>>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            frames: Mutex::new(HashMap::new()),
            qualities: HashMap::new(),
            fail_convert: None,
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register inspection output (one line per frame) for `path`.
    pub fn with_source(self, path: impl Into<PathBuf>, lines: &str) -> Self {
        self.frames
            .lock()
            .unwrap()
            .insert(path.into(), lines.to_string());
        self
    }

    /// Register an embedded quality for `path`.
    pub fn with_quality(mut self, path: impl Into<PathBuf>, quality: u8) -> Self {
        self.qualities.insert(path.into(), quality);
        self
    }

    /// Make `convert` fail for every command matching `predicate`.
    pub fn failing_convert(
        mut self,
        predicate: impl Fn(&TransformCommand) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.fail_convert = Some(Box::new(predicate));
        self
    }

    /// Handle on the recorded transform commands.
    pub fn commands(&self) -> Arc<Mutex<Vec<TransformCommand>>> {
        self.commands.clone()
    }

    fn output_line(&self, command: &TransformCommand) -> String {
        let (width, height) = match (command.resize, command.crop) {
            (Some(Resize::Exact { width, height }), _) => (width, height),
            (_, Some(crop)) => (crop.size, crop.size),
            (resize, None) => {
                let source = self.frames.lock().unwrap().get(&command.input).cloned();
                let (w, h) = source
                    .and_then(|lines| parse_identify_output(&command.input, &lines).ok())
                    .map(|info| (info.width, info.height))
                    .unwrap_or((1, 1));
                match resize {
                    Some(Resize::Cap(cap)) => shrink_to(cap, w, h),
                    _ => (w, h),
                }
            }
        };
        let format = match extension(&command.output).as_str() {
            "jpg" | "jpeg" => "JPEG".to_string(),
            other => other.to_uppercase(),
        };
        let density = command.density.unwrap_or(72);
        format!("{format} {width} {height} 64B 8 {density} x {density}")
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase()
}

fn shrink_to(cap: SizeCap, w: u32, h: u32) -> (u32, u32) {
    match cap {
        SizeCap::Area { max_area } => {
            let area = u64::from(w) * u64::from(h);
            if area <= max_area {
                return (w, h);
            }
            let scale = (max_area as f64 / area as f64).sqrt();
            ((w as f64 * scale) as u32, (h as f64 * scale) as u32)
        }
        SizeCap::Dimensions {
            max_width,
            max_height,
        } => {
            if w <= max_width && h <= max_height {
                return (w, h);
            }
            let scale = (max_width as f64 / w as f64).min(max_height as f64 / h as f64);
            ((w as f64 * scale) as u32, (h as f64 * scale) as u32)
        }
    }
}

#[async_trait]
impl ImageEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn version(&self) -> Result<String, EngineError> {
        Ok("Scripted 1.0".to_string())
    }

    async fn identify(&self, path: &Path, template: &str) -> Result<String, EngineError> {
        if template == QUALITY_TEMPLATE {
            return self
                .qualities
                .get(path)
                .map(|q| format!("{q}\n"))
                .ok_or_else(|| EngineError::Rejected("no quality recorded".to_string()));
        }
        self.frames
            .lock()
            .unwrap()
            .get(path)
            .map(|lines| format!("{lines}\n"))
            .ok_or_else(|| {
                EngineError::Rejected(format!("unable to open image {}", path.display()))
            })
    }

    async fn convert(&self, command: &TransformCommand) -> Result<(), EngineError> {
        self.commands.lock().unwrap().push(command.clone());

        if self.fail_convert.as_ref().is_some_and(|fail| fail(command)) {
            return Err(EngineError::Rejected(format!(
                "convert: no encode delegate for {}",
                command.output.display()
            )));
        }

        std::fs::write(&command.output, b"converted").map_err(|source| EngineError::Spawn {
            program: "scripted".to_string(),
            source,
        })?;
        let line = self.output_line(command);
        self.frames
            .lock()
            .unwrap()
            .insert(command.output.clone(), line);
        Ok(())
    }
}
