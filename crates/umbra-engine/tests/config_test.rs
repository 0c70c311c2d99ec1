use async_trait::async_trait;
use serde_json::Value;
use std::io::Write;
use std::sync::Mutex;
use umbra_engine::ShadowRootSearch;
use umbra_engine::backend::{BackendError, ScriptHost};
use umbra_engine::config::{ConfigError, ConfigLoader, UmbraConfig};
use umbra_engine::locator::Locator;

#[derive(Default)]
struct RecordingHost {
    scripts: Mutex<Vec<String>>,
}

#[async_trait]
impl ScriptHost for RecordingHost {
    async fn execute_script(&self, script: &str, _args: Vec<Value>) -> Result<Value, BackendError> {
        self.scripts.lock().unwrap().push(script.to_string());
        Ok(Value::Null)
    }
}

#[test]
fn test_default_config() {
    let config = UmbraConfig::default();
    assert!(config.search.annotate);
    assert!(!config.search.log_scripts);
    assert!(config.search.script_path.is_none());
}

#[tokio::test]
async fn test_load_from_yaml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "search:\n  annotate: false\n  log_scripts: true").unwrap();

    let config = ConfigLoader::load_from(file.path()).await.unwrap();

    assert!(!config.search.annotate);
    assert!(config.search.log_scripts);
    assert!(config.search.script_path.is_none());
}

#[tokio::test]
async fn test_load_from_empty_sections_uses_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "search: {{}}").unwrap();

    let config = ConfigLoader::load_from(file.path()).await.unwrap();

    assert!(config.search.annotate);
    assert!(!config.search.log_scripts);
}

#[tokio::test]
async fn test_load_from_invalid_yaml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "search:\n  annotate: [not, a, bool]").unwrap();

    let err = ConfigLoader::load_from(file.path()).await.unwrap_err();

    assert!(matches!(err, ConfigError::Parse(_)));
}

#[tokio::test]
async fn test_load_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    let err = ConfigLoader::load_from(&dir.path().join("absent.yaml"))
        .await
        .unwrap_err();

    assert!(matches!(err, ConfigError::Io(_)));
}

#[tokio::test]
async fn test_script_override_is_used_by_search() {
    let dir = tempfile::tempdir().unwrap();
    let script_path = dir.path().join("custom.js");
    std::fs::write(&script_path, "function findElements(root, s) { return []; }").unwrap();

    let mut config = UmbraConfig::default();
    config.search.script_path = Some(script_path);

    let search = ShadowRootSearch::from_config(RecordingHost::default(), &config)
        .await
        .unwrap();
    let found = search.find_elements(&Locator::css("a")).await.unwrap();

    assert!(found.is_empty());
    let scripts = search.host().scripts.lock().unwrap().clone();
    assert_eq!(
        scripts,
        vec!["function findElements(root, s) { return []; }\nreturn findElements(arguments[0], \"a\");"]
    );
}

#[tokio::test]
async fn test_missing_script_override_fails() {
    let mut config = UmbraConfig::default();
    config.search.script_path = Some("/nonexistent/umbra/custom.js".into());

    let err = ShadowRootSearch::from_config(RecordingHost::default(), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, ConfigError::Io(_)));
}
