//! Loader setup: config overrides, engine check, context assembly.

use darkroom_core::{Config, ConversionOptions, PhotoLoader, SizeCap};

use super::writer::Destinations;
use super::LoadArgs;

/// Everything a batch needs, shared across load tasks.
pub(crate) struct LoadContext {
    pub loader: PhotoLoader,
    pub options: ConversionOptions,
    pub destinations: Destinations,
    pub remove_originals: bool,
    pub parallel: usize,
    pub supported_formats: Vec<String>,
}

/// Validate input, apply CLI overrides and make sure the engine runs.
pub(crate) async fn setup_loader(args: &LoadArgs, mut config: Config) -> anyhow::Result<LoadContext> {
    if !args.input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.input
        );
    }

    apply_overrides(&mut config, args);
    config.validate()?;

    let loader = PhotoLoader::from_config(&config);
    match loader.engine().version().await {
        Ok(version) => tracing::debug!("Engine: {version}"),
        Err(e) => anyhow::bail!(
            "Image engine is not usable: {e}\n\n  \
             Hint: Install ImageMagick or point [engine] at it in `darkroom config path`."
        ),
    }

    Ok(LoadContext {
        options: ConversionOptions::from_config(&config),
        destinations: Destinations {
            target_dir: config.target_dir(),
            thumbnail_dir: config.thumbnail_dir(),
        },
        remove_originals: config.output.remove_originals,
        parallel: config.processing.parallel_workers,
        supported_formats: config.processing.supported_formats.clone(),
        loader,
    })
}

/// Fold command-line flags into the loaded configuration.
pub(crate) fn apply_overrides(config: &mut Config, args: &LoadArgs) {
    if args.thumbnail {
        config.thumbnail.enabled = true;
    }
    if let Some(size) = args.thumbnail_size {
        config.thumbnail.resolution = size;
    }
    if let Some(format) = &args.thumbnail_format {
        config.thumbnail.format = Some(format.clone());
    }

    if let Some(format) = &args.format {
        config.conversion.format = Some(format.clone());
    }
    if let Some(quality) = args.quality {
        config.conversion.quality = quality;
    }
    if let Some(max_area) = args.max_area {
        config.conversion.size_cap = SizeCap::Area { max_area };
    }
    if let (Some(max_width), Some(max_height)) = (args.max_width, args.max_height) {
        config.conversion.size_cap = SizeCap::Dimensions {
            max_width,
            max_height,
        };
    }

    if let Some(dir) = &args.working_dir {
        config.output.working_dir = Some(dir.clone());
    }
    if let Some(dir) = &args.target_dir {
        config.output.target_dir = dir.clone();
    }
    if let Some(dir) = &args.thumbnail_dir {
        config.output.thumbnail_dir = dir.clone();
    }
    if args.remove_originals {
        config.output.remove_originals = true;
    }

    if let Some(parallel) = args.parallel {
        config.processing.parallel_workers = parallel;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_no_flags_leave_config_untouched() {
        let mut config = Config::default();
        apply_overrides(&mut config, &LoadArgs::default());
        assert_eq!(config.conversion.size_cap, SizeCap::default());
        assert!(!config.thumbnail.enabled);
        assert!(config.conversion.format.is_none());
        assert_eq!(config.processing.parallel_workers, 4);
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        let args = LoadArgs {
            thumbnail: true,
            thumbnail_size: Some(64),
            format: Some("jpg".to_string()),
            quality: Some(60),
            max_width: Some(1920),
            max_height: Some(1080),
            target_dir: Some(PathBuf::from("out")),
            remove_originals: true,
            parallel: Some(2),
            ..LoadArgs::default()
        };
        apply_overrides(&mut config, &args);

        assert!(config.thumbnail.enabled);
        assert_eq!(config.thumbnail.resolution, 64);
        assert_eq!(config.conversion.format.as_deref(), Some("jpg"));
        assert_eq!(config.conversion.quality, 60);
        assert_eq!(
            config.conversion.size_cap,
            SizeCap::Dimensions {
                max_width: 1920,
                max_height: 1080
            }
        );
        assert_eq!(config.output.target_dir, PathBuf::from("out"));
        assert!(config.output.remove_originals);
        assert_eq!(config.processing.parallel_workers, 2);
    }

    #[test]
    fn test_zero_parallel_fails_validation() {
        let mut config = Config::default();
        let args = LoadArgs {
            parallel: Some(0),
            ..LoadArgs::default()
        };
        apply_overrides(&mut config, &args);
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_missing_input_is_rejected() {
        let args = LoadArgs {
            input: PathBuf::from("/definitely/not/here.gif"),
            ..LoadArgs::default()
        };
        let err = setup_loader(&args, Config::default()).await.err().unwrap();
        assert!(err.to_string().contains("does not exist"));
    }
}
