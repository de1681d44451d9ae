use crate::core::{SitterRecord, SitterStore};
use crate::utils::error::{AgentError, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_SITTER_DATA_PATH: &str = "data/pet-sitter.json";

/// Reads the sitter dataset from a JSON file on every call.
#[derive(Debug, Clone)]
pub struct JsonFileSitterStore {
    path: PathBuf,
}

impl JsonFileSitterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, reason: impl std::fmt::Display) -> AgentError {
        AgentError::DataUnavailable {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl SitterStore for JsonFileSitterStore {
    async fn load_sitters(&self) -> Result<Vec<SitterRecord>> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| self.unavailable(e))?;

        let records: Vec<SitterRecord> =
            serde_json::from_slice(&data).map_err(|e| self.unavailable(e))?;

        tracing::debug!(
            "Loaded {} sitters from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn loads_records_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":1,"location":"Miami","typeOfPets":["cats"],"services":["pet_sitting"],
                "daysAvailable":["Friday"],"hourlyRate":22,"specializations":[],
                "rating":4.4,"reviewCount":9}}]"#
        )
        .unwrap();

        let store = JsonFileSitterStore::new(file.path());
        let records = store.load_sitters().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hourly_rate, 22.0);
    }

    #[tokio::test]
    async fn missing_file_is_data_unavailable() {
        let store = JsonFileSitterStore::new("/nonexistent/pet-sitter.json");
        let err = store.load_sitters().await.unwrap_err();
        assert!(matches!(err, AgentError::DataUnavailable { .. }));
    }

    #[tokio::test]
    async fn corrupt_file_is_data_unavailable() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let store = JsonFileSitterStore::new(file.path());
        let err = store.load_sitters().await.unwrap_err();
        assert!(matches!(err, AgentError::DataUnavailable { .. }));
    }

    #[tokio::test]
    async fn shipped_dataset_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_SITTER_DATA_PATH);
        let records = JsonFileSitterStore::new(path).load_sitters().await.unwrap();
        assert!(records.len() >= 10);
    }
}
