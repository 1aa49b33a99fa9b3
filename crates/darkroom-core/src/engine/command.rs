//! Typed transform request and its argument rendering.

use std::path::PathBuf;

use crate::types::{CropBox, SizeCap};

/// How the output should be resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resize {
    /// Shrink to fit the cap, never enlarge
    Cap(SizeCap),
    /// Scale to exactly this box (applied after a square crop)
    Exact { width: u32, height: u32 },
}

impl Resize {
    /// Engine geometry string for `-resize`.
    pub fn geometry(&self) -> String {
        match self {
            Resize::Cap(SizeCap::Area { max_area }) => format!("{max_area}@>"),
            Resize::Cap(SizeCap::Dimensions {
                max_width,
                max_height,
            }) => format!("{max_width}x{max_height}>"),
            Resize::Exact { width, height } => format!("{width}x{height}"),
        }
    }
}

/// One transform invocation: a single input file to a single output file.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformCommand {
    pub input: PathBuf,
    /// Read only the first frame of the input
    pub first_frame_only: bool,
    /// Composite onto an opaque background (and collapse layers)
    pub flatten: bool,
    pub crop: Option<CropBox>,
    pub resize: Option<Resize>,
    pub quality: Option<u8>,
    pub density: Option<u32>,
    pub output: PathBuf,
}

impl TransformCommand {
    /// A bare `input -> output` command with no options.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            first_frame_only: false,
            flatten: false,
            crop: None,
            resize: None,
            quality: None,
            density: None,
            output: output.into(),
        }
    }

    /// Render the argument list: input first, flatten next, output last.
    pub fn to_args(&self) -> Vec<String> {
        let mut input = self.input.to_string_lossy().into_owned();
        if self.first_frame_only {
            input.push_str("[0]");
        }

        let mut args = vec![input];

        if self.flatten {
            args.extend(["-background", "white", "-flatten"].map(String::from));
        }

        if let Some(crop) = &self.crop {
            args.push("-crop".to_string());
            args.push(crop.to_string());
            // Drop the virtual canvas offset left behind by the crop
            args.push("+repage".to_string());
        }

        if let Some(resize) = &self.resize {
            args.push("-resize".to_string());
            args.push(resize.geometry());
        }

        if let Some(quality) = self.quality {
            args.push("-quality".to_string());
            args.push(quality.to_string());
        }

        if let Some(density) = self.density {
            args.push("-density".to_string());
            args.push(density.to_string());
        }

        args.push(self.output.to_string_lossy().into_owned());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_command() {
        let cmd = TransformCommand::new("/in/a.png", "/out/b.png");
        assert_eq!(cmd.to_args(), vec!["/in/a.png", "/out/b.png"]);
    }

    #[test]
    fn test_flatten_follows_first_frame_input() {
        let cmd = TransformCommand {
            first_frame_only: true,
            flatten: true,
            quality: Some(75),
            density: Some(72),
            ..TransformCommand::new("/in/anim.gif", "/out/still.jpg")
        };
        assert_eq!(
            cmd.to_args(),
            vec![
                "/in/anim.gif[0]",
                "-background",
                "white",
                "-flatten",
                "-quality",
                "75",
                "-density",
                "72",
                "/out/still.jpg",
            ]
        );
    }

    #[test]
    fn test_thumbnail_crop_then_resize() {
        let cmd = TransformCommand {
            crop: Some(CropBox::centered_square(800, 600)),
            resize: Some(Resize::Exact {
                width: 128,
                height: 128,
            }),
            ..TransformCommand::new("a.jpg", "t.jpg")
        };
        let args = cmd.to_args();
        let crop_at = args.iter().position(|a| a == "-crop").unwrap();
        let resize_at = args.iter().position(|a| a == "-resize").unwrap();
        assert!(crop_at < resize_at);
        assert_eq!(args[crop_at + 1], "600x600+100+0");
        assert_eq!(args[crop_at + 2], "+repage");
        assert_eq!(args[resize_at + 1], "128x128");
        assert_eq!(args.last().unwrap(), "t.jpg");
    }

    #[test]
    fn test_resize_geometry() {
        assert_eq!(
            Resize::Cap(SizeCap::Area { max_area: 480_000 }).geometry(),
            "480000@>"
        );
        assert_eq!(
            Resize::Cap(SizeCap::Dimensions {
                max_width: 1920,
                max_height: 1080
            })
            .geometry(),
            "1920x1080>"
        );
    }
}
