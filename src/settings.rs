use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{BlurError, BlurResult};

pub const DEFAULT_THREADS: usize = 8;

/// Knobs for the convolution engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    /// Worker threads, which is also the number of column bands.
    pub threads: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
        }
    }
}

impl EngineSettings {
    pub fn with_threads(threads: usize) -> Self {
        Self { threads }
    }

    pub fn validate(&self) -> BlurResult<()> {
        if self.threads == 0 {
            return Err(BlurError::validation("engine 'threads' must be >= 1"));
        }
        Ok(())
    }

    pub fn from_json_str(s: &str) -> BlurResult<Self> {
        let settings: Self = serde_json::from_str(s)
            .map_err(|e| BlurError::config(format!("parse settings JSON: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: &Path) -> BlurResult<Self> {
        let f = File::open(path).map_err(|e| {
            BlurError::config(format!("open settings '{}': {e}", path.display()))
        })?;
        let settings: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            BlurError::config(format!("parse settings '{}': {e}", path.display()))
        })?;
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_eight_threads() {
        assert_eq!(EngineSettings::default().threads, 8);
        let parsed = EngineSettings::from_json_str("{}").unwrap();
        assert_eq!(parsed, EngineSettings::default());
    }

    #[test]
    fn parses_thread_override() {
        let parsed = EngineSettings::from_json_str(r#"{"threads": 3}"#).unwrap();
        assert_eq!(parsed.threads, 3);
    }

    #[test]
    fn rejects_zero_threads_and_unknown_fields() {
        assert!(matches!(
            EngineSettings::from_json_str(r#"{"threads": 0}"#),
            Err(BlurError::Validation(_))
        ));
        assert!(matches!(
            EngineSettings::from_json_str(r#"{"thread": 2}"#),
            Err(BlurError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = EngineSettings::from_path(Path::new("target/does-not-exist/gblur.json"))
            .unwrap_err();
        assert!(err.to_string().contains("config error:"));
    }
}
