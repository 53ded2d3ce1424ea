//! Collaborators around the engine: background templates and headline sources.
//!
//! Both are injected into the builder as trait objects so hosts can back them
//! with a directory, memory, or a remote service without the engine knowing.

pub mod facts;
pub mod templates;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use facts::{FactSource, SampleFacts};
pub use templates::{DirectoryTemplates, StaticTemplates, TemplateStore};

/// Content category used to pick templates and sample headlines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Topic {
    #[default]
    General,
    RealEstate,
    Yachts,
}

impl Topic {
    pub fn all() -> &'static [Topic] {
        &[Topic::General, Topic::RealEstate, Topic::Yachts]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::General => "general",
            Topic::RealEstate => "real_estate",
            Topic::Yachts => "yachts",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown names map to `General`.
impl From<&str> for Topic {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "real_estate" => Topic::RealEstate,
            "yachts" => Topic::Yachts,
            _ => Topic::General,
        }
    }
}

impl From<String> for Topic {
    fn from(s: String) -> Self {
        Topic::from(s.as_str())
    }
}
