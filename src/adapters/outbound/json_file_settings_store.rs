// Settings store backed by a JSON object on disk, written by the admin surface.
//
// Values are handed out as raw strings: JSON strings verbatim, anything else re-serialized,
// so `{"tv_show_ads_global": false}` and `{"tv_show_ads_global": "false"}` read the same.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::core::ports::{SettingsError, SettingsStore};

pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<Map<String, Value>, SettingsError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(error) => {
                return Err(SettingsError::Unavailable(format!(
                    "{}: {error}",
                    self.path.display()
                )));
            }
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(SettingsError::Decode(self.path.display().to_string())),
            Err(error) => Err(SettingsError::Decode(format!("{}: {error}", self.path.display()))),
        }
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        let mut map = self.load().await?;
        Ok(match map.remove(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => Some(raw),
            Some(other) => Some(other.to_string()),
        })
    }
}

#[cfg(test)]
mod json_file_settings_store_tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("queue-display-settings-{}.json", Uuid::now_v7()))
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_read_raw_values_from_the_file() {
        let path = temp_path();
        tokio::fs::write(
            &path,
            r#"{"tv_show_ads_global": false, "tv_selected_ad_ids": ["1", "3"], "theme": "dark"}"#,
        )
        .await
        .unwrap();
        let store = JsonFileSettingsStore::new(&path);

        assert_eq!(store.get("tv_show_ads_global").await.unwrap().as_deref(), Some("false"));
        assert_eq!(
            store.get("tv_selected_ad_ids").await.unwrap().as_deref(),
            Some(r#"["1","3"]"#)
        );
        assert_eq!(store.get("theme").await.unwrap().as_deref(), Some("dark"));
        assert_eq!(store.get("missing").await.unwrap(), None);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_treat_a_missing_file_as_empty() {
        let store = JsonFileSettingsStore::new(temp_path());
        assert_eq!(store.get("tv_show_ads_global").await.unwrap(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_file_that_is_not_an_object() {
        let path = temp_path();
        tokio::fs::write(&path, "[1, 2, 3]").await.unwrap();
        let store = JsonFileSettingsStore::new(&path);
        assert!(matches!(
            store.get("tv_show_ads_global").await,
            Err(SettingsError::Decode(_))
        ));
        tokio::fs::remove_file(&path).await.unwrap();
    }
}
