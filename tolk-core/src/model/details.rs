use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier issued by the room backend; numeric or textual depending on the table.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(untagged)]
pub enum EntityId {
    Num(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Num(n) => write!(f, "{}", n),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Language {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
}

impl Language {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_owned(),
            name: name.to_owned(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct LanguagePair {
    #[serde(default)]
    pub source: Language,
    #[serde(default)]
    pub target: Language,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Speaker {
    #[serde(default, alias = "user_id")]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub languages: Vec<Language>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Translator {
    #[serde(default, alias = "user_id")]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pairs: Vec<LanguagePair>,
}

/// Room document served by the room backend. Read-only for the signaling core.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RoomDetails {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
    #[serde(default)]
    pub translators: Vec<Translator>,
}

impl RoomDetails {
    /// Display name for a member id, looked up among speakers and translators.
    pub fn display_name(&self, id: &str) -> Option<&str> {
        let speakers = self
            .speakers
            .iter()
            .filter(|s| s.id.as_ref().is_some_and(|sid| sid.to_string() == id))
            .map(|s| s.name.as_str());
        let translators = self
            .translators
            .iter()
            .filter(|t| t.id.as_ref().is_some_and(|tid| tid.to_string() == id))
            .map(|t| t.name.as_str());
        speakers.chain(translators).next()
    }
}
