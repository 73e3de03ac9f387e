use std::io::Write;

use tempfile::NamedTempFile;

use viewcost_core::consts::{DEFAULT_CENTER_STEPS, DEFAULT_THRESHOLD};
use viewcost_core::error::ViewCostError;
use viewcost_core::frame::Resolution;
use viewcost_core::pipeline::config::{PreprocessConfig, StageSelection};

#[test]
fn test_defaults() {
    let config = PreprocessConfig::default();
    assert_eq!(config.resolution, Resolution::new(640, 320).unwrap());
    assert_eq!(config.threshold, DEFAULT_THRESHOLD);
    assert_eq!(config.viewport.center_steps, DEFAULT_CENTER_STEPS);
    assert_eq!(config.center_y(), 160);
    assert!(!config.stages.tables && !config.stages.matrices && !config.stages.clean);
    assert!(config.validate().is_ok());
}

#[test]
fn test_toml_round_trip() {
    let mut config = PreprocessConfig::default();
    config.threshold = 0.2;
    config.viewport.center_y = Some(100);
    config.stages.tables = true;
    config.threads = Some(4);

    let text = config.to_toml_string().unwrap();
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();

    let back = PreprocessConfig::from_toml_file(file.path()).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_partial_toml_uses_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "threshold = 0.05").unwrap();
    writeln!(file, "[resolution]").unwrap();
    writeln!(file, "width = 320").unwrap();
    writeln!(file, "height = 160").unwrap();

    let config = PreprocessConfig::from_toml_file(file.path()).unwrap();
    assert_eq!(config.threshold, 0.05);
    assert_eq!(config.resolution, Resolution::new(320, 160).unwrap());
    assert_eq!(config.center_y(), 80);
    assert_eq!(config.viewport.center_steps, DEFAULT_CENTER_STEPS);
    assert_eq!(config.stages, StageSelection::default());
}

#[test]
fn test_json_round_trip() {
    let config = PreprocessConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let back: PreprocessConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_malformed_toml_is_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "threshold = \"high\"").unwrap();
    assert!(matches!(
        PreprocessConfig::from_toml_file(file.path()),
        Err(ViewCostError::Config(_))
    ));
}

#[test]
fn test_validate_rejects_bad_values() {
    let base = PreprocessConfig::default();

    let mut c = base.clone();
    c.threshold = -1.0;
    assert!(matches!(c.validate(), Err(ViewCostError::InvalidThreshold(_))));

    let mut c = base.clone();
    c.resolution.width = 0;
    assert!(matches!(c.validate(), Err(ViewCostError::InvalidDimensions { .. })));

    let mut c = base.clone();
    c.viewport.fov.horizontal_deg = 400.0;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.viewport.fov.vertical_deg = 0.0;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.viewport.center_steps = 0;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.viewport.center_y = Some(320);
    assert!(c.validate().is_err());

    let mut c = base;
    c.threads = Some(0);
    assert!(c.validate().is_err());
}

#[test]
fn test_stage_selection_display() {
    assert_eq!(StageSelection::default().to_string(), "none");
    let stages = StageSelection {
        tables: true,
        matrices: true,
        clean: false,
    };
    assert_eq!(stages.to_string(), "tables + matrices");
}
