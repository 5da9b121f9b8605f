// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Application script files
//!
//! A script plays the applicant's part in a wizard session: the answers to
//! type in, the documents to pick and the slot to book if one is offered.
//!
//! ```yaml
//! answers:
//!   Full Name: Asha
//!   category: OBC
//! documents:
//!   Photo: ./photo.jpg     # local file, relative to the script
//!   Aadhaar: saved         # reuse the profile's saved copy
//! slot:
//!   date: 12/12/2025
//!   time: 10AM
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const SAVED: &str = "saved";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationScript {
    #[serde(default)]
    answers: BTreeMap<String, serde_yaml::Value>,

    #[serde(default)]
    pub documents: BTreeMap<String, DocumentSource>,

    #[serde(default)]
    pub slot: Option<SlotChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum DocumentSource {
    /// Use the URL saved on the applicant's profile
    Saved,
    Local(PathBuf),
}

impl From<String> for DocumentSource {
    fn from(raw: String) -> Self {
        if raw.trim().eq_ignore_ascii_case(SAVED) {
            DocumentSource::Saved
        } else {
            DocumentSource::Local(PathBuf::from(raw))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlotChoice {
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
}

impl ApplicationScript {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {:?}", path))?;
        let mut script = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse script {:?}", path))?;

        if let Some(base) = path.parent() {
            script.resolve_paths(base);
        }
        Ok(script)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Answers as strings. YAML numbers and booleans are accepted as typed.
    pub fn answers(&self) -> Result<Vec<(String, String)>> {
        self.answers
            .iter()
            .map(|(label, value)| {
                let text = match value {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Null => String::new(),
                    _ => bail!("Answer for '{}' must be a plain value", label),
                };
                Ok((label.clone(), text))
            })
            .collect()
    }

    /// Make relative document paths relative to `base`.
    fn resolve_paths(&mut self, base: &Path) {
        for source in self.documents.values_mut() {
            if let DocumentSource::Local(path) = source {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
answers:
  Full Name: Asha
  category: OBC
  Age: 31
documents:
  Photo: ./photo.jpg
  Aadhaar: Saved
slot:
  date: 12/12/2025
"#;

    #[test]
    fn test_parse_script() {
        let script = ApplicationScript::from_yaml_str(SCRIPT).unwrap();

        let answers = script.answers().unwrap();
        assert!(answers.contains(&("Age".to_string(), "31".to_string())));
        assert!(answers.contains(&("category".to_string(), "OBC".to_string())));

        assert_eq!(script.documents["Aadhaar"], DocumentSource::Saved);
        assert_eq!(
            script.documents["Photo"],
            DocumentSource::Local(PathBuf::from("./photo.jpg"))
        );

        let slot = script.slot.unwrap();
        assert_eq!(slot.date, "12/12/2025");
        assert!(slot.time.is_none());
    }

    #[test]
    fn test_nested_answer_is_rejected() {
        let script = ApplicationScript::from_yaml_str("answers:\n  Address:\n    city: Pune\n").unwrap();
        assert!(script.answers().is_err());
    }

    #[test]
    fn test_paths_resolve_against_script_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apply.yaml");
        std::fs::write(&path, "documents:\n  Photo: photo.jpg\n  Id: /abs/id.pdf\n").unwrap();

        let script = ApplicationScript::from_yaml_file(&path).unwrap();
        assert_eq!(
            script.documents["Photo"],
            DocumentSource::Local(dir.path().join("photo.jpg"))
        );
        assert_eq!(
            script.documents["Id"],
            DocumentSource::Local(PathBuf::from("/abs/id.pdf"))
        );
    }
}
