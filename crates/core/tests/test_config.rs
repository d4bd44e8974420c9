//! Tests for configuration parsing

use tempfile::TempDir;
use threatmap_core::config::CONFIG_FILE_NAME;
use threatmap_core::{ConfigError, DanglingPolicy, StrideCategory, ThreatmapConfig};

#[test]
fn test_default_config() {
    let config = ThreatmapConfig::default();
    assert!(!config.engine.score_datastores);
    assert_eq!(config.engine.weights.damage, 0.3);
    assert_eq!(config.engine.base_scores.repudiation, 2.0);
    assert_eq!(config.ingest.datastore_name_hints, vec!["Model", "DB"]);
    assert_eq!(config.ingest.dangling_flows, DanglingPolicy::Retain);
    assert_eq!(config.output.format, "terminal");
    assert_eq!(config.output.dir, "threatmap_output");
    assert_eq!(config.output.min_score, 0.0);
    assert!(config.engine.validate().is_ok());
}

#[test]
fn test_serialize_config() {
    let config = ThreatmapConfig::default();
    let toml_str = toml::to_string(&config).unwrap();
    assert!(toml_str.contains("score_datastores"));
    assert!(toml_str.contains("dangling_flows = \"retain\""));
}

#[test]
fn test_parse_engine_section() {
    let toml_str = r#"
[engine]
score_datastores = true

[engine.weights]
damage = 0.5
discoverability = 0.0

[engine.base_scores]
spoofing = 5.0

[engine.templates]
actor = ["Spoofing", "Repudiation"]
dataflow = ["Information Disclosure"]

[ingest]
datastore_name_hints = ["Repo"]
dangling_flows = "drop"

[output]
format = "json"
min_score = 5.5
"#;

    let config: ThreatmapConfig = toml::from_str(toml_str).unwrap();
    assert!(config.engine.score_datastores);
    assert_eq!(config.engine.weights.damage, 0.5);
    assert_eq!(config.engine.weights.reproducibility, 0.2);
    assert_eq!(config.engine.weights.discoverability, 0.0);
    assert_eq!(config.engine.base_scores.spoofing, 5.0);
    assert_eq!(config.engine.base_scores.tampering, 3.0);
    assert_eq!(
        config.engine.categories_for("actor"),
        &[StrideCategory::Spoofing, StrideCategory::Repudiation]
    );
    assert_eq!(config.engine.categories_for("api").len(), 6);
    assert_eq!(config.ingest.datastore_name_hints, vec!["Repo"]);
    assert_eq!(config.ingest.dangling_flows, DanglingPolicy::Drop);
    assert_eq!(config.output.format, "json");
    assert_eq!(config.output.dir, "threatmap_output");
    assert_eq!(config.output.min_score, 5.5);
    assert!(config.engine.validate().is_ok());
}

#[test]
fn test_unknown_category_in_template_rejected() {
    let toml_str = r#"
[engine.templates]
actor = ["Phishing"]
"#;
    let err = toml::from_str::<ThreatmapConfig>(toml_str).unwrap_err();
    assert!(err.to_string().contains("unknown STRIDE category 'Phishing'"));
}

#[test]
fn test_template_accepts_codes_and_snake_case() {
    let toml_str = r#"
[engine.templates]
actor = ["S", "denial_of_service", "information disclosure"]
"#;
    let config: ThreatmapConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(
        config.engine.categories_for("actor"),
        vec![
            StrideCategory::Spoofing,
            StrideCategory::DenialOfService,
            StrideCategory::InformationDisclosure,
        ]
    );
}

#[test]
fn test_validate_rejects_bad_weights_and_bases() {
    let mut config = ThreatmapConfig::default();
    config.engine.weights.affected_users = -0.1;
    assert_eq!(config.engine.validate(), Err(ConfigError::InvalidWeights));

    let mut config = ThreatmapConfig::default();
    config.engine.base_scores.denial_of_service = 11.0;
    assert_eq!(
        config.engine.validate(),
        Err(ConfigError::InvalidBaseScore(StrideCategory::DenialOfService))
    );

    let mut config = ThreatmapConfig::default();
    config.engine.templates.insert("actor".to_string(), Vec::new());
    assert_eq!(
        config.engine.validate(),
        Err(ConfigError::EmptyTemplate("actor".to_string()))
    );
}

#[test]
fn test_from_file_rejects_zero_weights() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "[engine.weights]\ndamage = 0.0\nreproducibility = 0.0\nexploitability = 0.0\naffected_users = 0.0\ndiscoverability = 0.0\n",
    )
    .unwrap();
    assert!(ThreatmapConfig::from_file(&path).is_err());
}

#[test]
fn test_save_and_find_from_nested_dir() {
    let dir = TempDir::new().unwrap();
    let mut config = ThreatmapConfig::default();
    config.output.min_score = 4.0;
    config.engine.score_datastores = true;
    config.save(&dir.path().join(CONFIG_FILE_NAME)).unwrap();

    let nested = dir.path().join("a").join("b");
    std::fs::create_dir_all(&nested).unwrap();
    let loaded = ThreatmapConfig::find_and_load(&nested).unwrap();
    assert_eq!(loaded, config);
}
