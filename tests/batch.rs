mod common;

use std::sync::Arc;

use common::{SQUARE_CENTERS, dot_image, scatter_centers, scratch_dir};
use dot_signature::SignatureError;
use dot_signature::batch::{extract_all, image_paths, rank};
use dot_signature::pipeline::{PipelineConfig, extract};
use image::{DynamicImage, Rgb, RgbImage};

#[tokio::test]
async fn batch_extraction_keeps_input_order() {
    let dir = scratch_dir("batch-order");
    let scatter = dot_image(180, 180, &scatter_centers(6, 60), 2);
    scatter.save(dir.join("a_scatter.png")).expect("save");
    dot_image(41, 41, &SQUARE_CENTERS, 2)
        .save(dir.join("b_square.png"))
        .expect("save");
    DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([200, 200, 200])))
        .save(dir.join("c_blank.png"))
        .expect("save");
    std::fs::write(dir.join("notes.txt"), "ignored").expect("write");

    let paths = image_paths(&dir).await.expect("list");
    let names: Vec<String> = paths
        .iter()
        .filter_map(|p| p.file_name()?.to_str().map(str::to_owned))
        .collect();
    assert_eq!(names, vec!["a_scatter.png", "b_square.png", "c_blank.png"]);

    let config = Arc::new(PipelineConfig {
        workers: 2,
        ..PipelineConfig::default()
    });
    let results = extract_all(paths.clone(), config).await;
    assert_eq!(results.len(), 3);
    assert_eq!(
        results.iter().map(|r| r.path.clone()).collect::<Vec<_>>(),
        paths
    );
    assert_eq!(results[0].result.as_ref().expect("scatter").len(), 4);
    assert_eq!(results[1].result.as_ref().expect("square").len(), 3);
    assert!(matches!(
        results[2].result,
        Err(SignatureError::InsufficientFeatures { found: 0 })
    ));
}

#[tokio::test]
async fn rank_puts_matching_layouts_first() {
    let dir = scratch_dir("batch-rank");
    let scatter = dot_image(180, 180, &scatter_centers(6, 60), 2);
    scatter.rotate180().save(dir.join("1_flipped.png")).expect("save");
    dot_image(41, 41, &SQUARE_CENTERS, 2)
        .save(dir.join("0_other.png"))
        .expect("save");
    scatter.rotate90().save(dir.join("2_rotated.png")).expect("save");
    DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([0, 0, 0])))
        .save(dir.join("3_blank.png"))
        .expect("save");

    let config = PipelineConfig::default();
    let reference = extract(&scatter, &config).expect("reference");
    let paths = image_paths(&dir).await.expect("list");
    let ranked = rank(&reference, paths, Arc::new(config)).await;

    // The blank image yields no signature and is dropped.
    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].score, 1.0);
    assert_eq!(ranked[1].score, 1.0);
    assert!(ranked[0].path.ends_with("1_flipped.png"));
    assert!(ranked[1].path.ends_with("2_rotated.png"));
    assert!(ranked[2].path.ends_with("0_other.png"));
    assert_eq!(ranked[2].score, 0.0);
}
