use std::path::{Path, PathBuf};
use tunekit_core::config::{AdapterType, Settings};
use tunekit_core::error::ConfigError;

fn resource(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("resources")
        .join(name)
}

#[test]
fn test_base_path() {
    let settings = Settings::load(resource("settings-min.json")).unwrap();
    assert_eq!(settings.base.path, "model");
}

#[test]
fn test_template_path() {
    let settings = Settings::load(resource("settings-min.json")).unwrap();
    assert_eq!(settings.template_path, Some(PathBuf::from("test.template")));
}

#[test]
fn test_fallback_template_path() {
    let settings = Settings::load(resource("settings-min.json")).unwrap();
    assert_eq!(
        settings.inference.template_path,
        Some(PathBuf::from("test.template"))
    );
    assert_eq!(
        settings.training.template_path,
        Some(PathBuf::from("test.template"))
    );
}

#[test]
fn test_explicit_template_path() {
    let settings = Settings::load(resource("settings.json")).unwrap();
    assert_eq!(
        settings.inference.template_path,
        Some(PathBuf::from("inference.template"))
    );
    assert_eq!(
        settings.training.template_path,
        Some(PathBuf::from("training.template"))
    );
    // ui names none of its own
    assert_eq!(settings.ui.template_path, Some(PathBuf::from("test.template")));
}

#[test]
fn test_fallback_output_path() {
    let path = resource("settings-min.json");
    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.training.output_path, path.with_extension(""));
    assert_eq!(settings.adapter.path, path.with_extension(""));
    assert!(settings
        .training
        .output_path
        .ends_with(Path::new("resources/settings-min")));
}

#[test]
fn test_section_parsing() {
    let settings = Settings::load(resource("settings.json")).unwrap();
    assert_eq!(settings.base.path, "mymodel");
    assert_eq!(settings.base.bits, 16);
    assert_eq!(settings.adapter.kind, AdapterType::LoRA);
    assert_eq!(settings.adapter.lora_r, 40);
    assert_eq!(settings.adapter.lora_alpha, 32);
    assert_eq!(settings.adapter.lora_modules, vec!["q_proj", "v_proj"]);
    assert_eq!(settings.training.cutoff, 1024);
    assert_eq!(settings.training.data_path, Some(PathBuf::from("data-basic.json")));
    assert_eq!(settings.inference.max_length, 2048);
    assert_eq!(settings.ui.title, "Test");
}

#[test]
fn test_missing_file() {
    let err = Settings::load(resource("nope.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn test_parse_error_names_file() {
    let err = Settings::load(resource("test.template")).unwrap_err();
    match err {
        ConfigError::Parse { path, .. } => assert!(path.ends_with("test.template")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_describe_lists_sections() {
    let settings = Settings::load(resource("settings.json")).unwrap();
    let text = settings.describe();
    for prefix in ["Base: ", "Adapter: ", "Training: ", "Inference: ", "UI: ", "templatePath: "] {
        assert!(
            text.lines().any(|line| line.starts_with(prefix)),
            "missing {prefix} in {text}"
        );
    }
    assert!(text.contains(r#""loraR":40"#));
    assert!(text.contains(r#""type":"LoRA""#));
    assert!(text.contains(r#""inputFields":"input""#));
}
