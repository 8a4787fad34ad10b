use serde::{Deserialize, Serialize};

use crate::loaders::{LoaderError, PersistenceLoader, PickleLoader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    Pickle,
}

// Serializable, comparable, explicit defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub name: String,
    pub kind: LoaderKind,
}

impl LoaderConfig {
    pub fn v0() -> Self {
        Self {
            name: "cache".into(),
            kind: LoaderKind::Pickle,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, LoaderError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn build(&self) -> Box<dyn PersistenceLoader> {
        match self.kind {
            LoaderKind::Pickle => Box::new(PickleLoader::new(self.name.clone())),
        }
    }
}
