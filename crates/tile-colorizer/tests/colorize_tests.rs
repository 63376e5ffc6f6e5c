//! End-to-end tests: NetCDF tiles on disk to PNG images on disk.

use std::fs;
use std::path::PathBuf;

use pyramid_common::{discover_tiles, ScanOptions, TileAddress};
use tile_colorizer::{BatchRunner, ColorizeConfig, NormalizationPolicy, TileColorizer};
use test_utils::{
    build_pyramid, coords, constant_field, ramp_field, synthetic_surface, temp_test_dir,
    write_corrupt_tile, write_height_tile, write_tile_with_variable,
};
use renderer::Normalization;

fn decode(path: &std::path::Path) -> image::RgbImage {
    let bytes = fs::read(path).expect("read png");
    let img = image::load_from_memory(&bytes).expect("valid png");
    assert_eq!(img.color(), image::ColorType::Rgb8);
    img.to_rgb8()
}

#[test]
fn test_zero_tile_with_inferno_is_uniform() {
    let dir = temp_test_dir();
    let source = dir.path().join("0").join("0_0.nc");
    write_height_tile(&source, &constant_field(4, 4, 0.0), 4, 4);

    let config = ColorizeConfig::new(NormalizationPolicy::Identity).with_color_scale("inferno");
    let colorizer = TileColorizer::from_config(&config).unwrap();
    let output = colorizer
        .colorize_tile(&source, &Normalization::Identity)
        .unwrap();

    let img = decode(&output);
    assert_eq!(img.dimensions(), (4, 4));
    assert!(img.pixels().all(|p| p.0 == [0, 0, 4]));
}

#[test]
fn test_shape_and_orientation_preserved() {
    let dir = temp_test_dir();
    let source = dir.path().join("2").join("1_3.nc");
    // 5 wide, 3 tall ramp from 0.0 (top-left) to 1.0 (bottom-right)
    write_height_tile(&source, &ramp_field(5, 3), 5, 3);

    let config = ColorizeConfig::new(NormalizationPolicy::Identity).with_color_scale("gray");
    let colorizer = TileColorizer::from_config(&config).unwrap();
    let output = colorizer
        .colorize_tile(&source, &Normalization::Identity)
        .unwrap();

    assert_eq!(output, fs::canonicalize(dir.path().join("2").join("1_3.png")).unwrap());
    let img = decode(&output);
    assert_eq!(img.dimensions(), (5, 3));
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
    assert_eq!(img.get_pixel(4, 2).0, [255, 255, 255]);
}

#[test]
fn test_colorizing_twice_is_byte_identical() {
    let dir = temp_test_dir();
    let source = dir.path().join("5").join("2_2.nc");
    write_height_tile(&source, &synthetic_surface(32, 32, 9), 32, 32);

    let config = ColorizeConfig::new(NormalizationPolicy::PerTile).with_color_scale("viridis");
    let colorizer = TileColorizer::from_config(&config).unwrap();

    let output = colorizer
        .colorize_tile(&source, &Normalization::PerTile)
        .unwrap();
    let first = fs::read(&output).unwrap();
    colorizer
        .colorize_tile(&source, &Normalization::PerTile)
        .unwrap();
    assert_eq!(fs::read(&output).unwrap(), first);
}

#[test]
fn test_missing_variable_is_reported() {
    let dir = temp_test_dir();
    let source = dir.path().join("0").join("0_0.nc");
    write_tile_with_variable(&source, "elevation", &constant_field(2, 2, 1.0), 2, 2);

    let config = ColorizeConfig::new(NormalizationPolicy::PerTile);
    let colorizer = TileColorizer::from_config(&config).unwrap();
    let err = colorizer
        .colorize_tile(&source, &Normalization::PerTile)
        .unwrap_err();

    assert_eq!(err.kind(), "missing_variable");
    assert!(err.to_string().contains("elevation"));
}

#[test]
fn test_level_nine_quad_yields_four_images() {
    let dir = temp_test_dir();
    let sources = build_pyramid(dir.path(), 9, &coords::LEVEL_9_QUAD, 8, 8, |addr| {
        synthetic_surface(8, 8, addr.row * 2 + addr.column)
    });

    let config = ColorizeConfig::new(NormalizationPolicy::Global).with_workers(2);
    let report = BatchRunner::from_config(&config).unwrap().run(&sources);

    assert!(report.is_success());
    assert_eq!(report.converted, 4);

    let mut pngs: Vec<String> = fs::read_dir(dir.path().join("9"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|name| name.ends_with(".png"))
        .collect();
    pngs.sort();
    assert_eq!(pngs, vec!["0_0.png", "0_1.png", "1_0.png", "1_1.png"]);

    // Each output sits next to its own source
    for outcome in &report.tiles {
        let output = outcome.output.as_ref().unwrap();
        assert_eq!(
            TileAddress::from_path(output),
            TileAddress::from_path(&outcome.source)
        );
    }
}

#[test]
fn test_batch_with_one_corrupt_tile() {
    let dir = temp_test_dir();
    let mut sources = build_pyramid(dir.path(), 9, &coords::LEVEL_9_QUAD, 4, 4, |_| {
        ramp_field(4, 4)
    });
    write_corrupt_tile(&sources[2]);

    let config = ColorizeConfig::new(NormalizationPolicy::PerTile);
    // The duplicate must not produce a second outcome
    sources.push(sources[0].clone());
    let report = BatchRunner::from_config(&config).unwrap().run(&sources);

    assert_eq!(report.tiles.len(), 4);
    assert_eq!(report.converted, 3);
    assert_eq!(report.failed, 1);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].source, sources[2]);
    assert_eq!(failures[0].error_kind, Some("unreadable_source"));
    assert!(!sources[2].with_extension("png").exists());
}

#[test]
fn test_global_range_spans_all_tiles() {
    let dir = temp_test_dir();
    let sources = build_pyramid(dir.path(), 1, &[(0, 0), (0, 1)], 2, 2, |addr| {
        if addr.column == 0 {
            vec![0.0, 1.0, 2.0, 3.0]
        } else {
            vec![10.0, 11.0, 12.0, 20.0]
        }
    });

    let config = ColorizeConfig::new(NormalizationPolicy::Global).with_color_scale("gray");
    let runner = BatchRunner::from_config(&config).unwrap();
    let report = runner.run(&sources);

    let range = report.range.expect("global range is reported");
    assert_eq!((range.min, range.max), (0.0, 20.0));

    // 0.0 is black in the first tile, 20.0 white in the second
    let left = decode(report.tiles[0].output.as_ref().unwrap());
    let right = decode(report.tiles[1].output.as_ref().unwrap());
    assert_eq!(left.get_pixel(0, 0).0, [0, 0, 0]);
    assert_eq!(right.get_pixel(1, 1).0, [255, 255, 255]);
    // 10.0 normalizes to 0.5 -> gray entry 128
    assert_eq!(right.get_pixel(0, 0).0, [128, 128, 128]);
}

#[test]
fn test_scan_then_colorize() {
    let dir = temp_test_dir();
    build_pyramid(dir.path(), 0, &[(0, 0)], 2, 2, |_| ramp_field(2, 2));
    build_pyramid(dir.path(), 1, &coords::LEVEL_9_QUAD, 2, 2, |_| ramp_field(2, 2));

    let sources: Vec<PathBuf> = discover_tiles(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(sources.len(), 5);

    let config = ColorizeConfig::new(NormalizationPolicy::Fixed { min: 0.0, max: 1.0 });
    let report = BatchRunner::from_config(&config).unwrap().run(&sources);
    assert_eq!(report.converted, 5);

    // Rescanning for sources ignores the written images
    assert_eq!(
        discover_tiles(dir.path(), &ScanOptions::default()).unwrap(),
        sources
    );
}
