//! Round trips through a real ImageMagick install.
//!
//! Each test returns early when `convert` is not on PATH.

use darkroom_core::{ConversionOptions, ImageEngine, ImageMagick, PhotoLoader, TransformCommand};
use std::path::Path;
use std::sync::Arc;

async fn engine_or_skip() -> Option<Arc<ImageMagick>> {
    let engine = Arc::new(ImageMagick::default());
    match engine.version().await {
        Ok(banner) => {
            eprintln!("Using {banner}");
            Some(engine)
        }
        Err(e) => {
            eprintln!("Skipping: ImageMagick not available ({e})");
            None
        }
    }
}

async fn make_image(engine: &ImageMagick, canvas: &str, dest: &Path) {
    let mut command = TransformCommand::new(canvas, dest);
    command.density = Some(72);
    engine.convert(&command).await.unwrap();
}

#[tokio::test]
async fn png_round_trip_keeps_dimensions() {
    let Some(engine) = engine_or_skip().await else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("red.png");
    // Solid-color pseudo image, scaled up from its 1x1 default
    let mut command = TransformCommand::new("xc:red", &source);
    command.resize = Some(darkroom_core::engine::Resize::Exact {
        width: 120,
        height: 80,
    });
    engine.convert(&command).await.unwrap();

    let loader = PhotoLoader::new(engine);
    let source_info = loader.probe(&source).await.unwrap();
    assert_eq!(source_info.format, "PNG");

    let photo = loader
        .load(&source, &ConversionOptions::default())
        .await
        .unwrap();
    assert_eq!(photo.target.info.format, "PNG");
    assert_eq!(
        (photo.target.info.width, photo.target.info.height),
        (source_info.width, source_info.height)
    );
    photo.cleaner.clean(false).await;
}

#[tokio::test]
async fn png_to_jpeg_with_square_thumbnail() {
    let Some(engine) = engine_or_skip().await else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("wide.png");
    make_image(&engine, "gradient:", &source).await;

    let loader = PhotoLoader::new(engine);
    let options = ConversionOptions {
        format: Some("jpg".to_string()),
        thumbnail: true,
        thumbnail_resolution: 32,
        thumbnail_format: Some("jpg".to_string()),
        ..Default::default()
    };
    let photo = loader.load(&source, &options).await.unwrap();

    assert_eq!(photo.target.info.format, "JPEG");
    let thumb = photo.thumbnail.as_ref().unwrap();
    assert_eq!((thumb.info.width, thumb.info.height), (32, 32));

    let temp_paths = photo.cleaner.files().to_vec();
    assert!(photo.cleaner.clean(false).await);
    assert!(temp_paths.iter().all(|p| !p.exists()));
}
