//! # Domain Types
//!
//! The app draft assembled in a room, the fields a user can edit, and the
//! per-room session holding both the draft and the people who worked on it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Editable configuration of the app being built.
/// Serialized as-is into the `configuration` parameter of `webappify/create`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfiguration {
    pub name: String,
    pub description: String,
    pub color: String,
    pub layout: String,
    pub style: String,
    pub code: String,
    pub load: String,
}

impl Default for AppConfiguration {
    fn default() -> Self {
        Self {
            name: "AppName".to_string(),
            description: "AppDescription".to_string(),
            color: "#FFFFFF".to_string(),
            layout: String::new(),
            style: String::new(),
            code: String::new(),
            load: String::new(),
        }
    }
}

impl AppConfiguration {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Description => &self.description,
            Field::Color => &self.color,
            Field::Layout => &self.layout,
            Field::Style => &self.style,
            Field::Code => &self.code,
            Field::Load => &self.load,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Description => &mut self.description,
            Field::Color => &mut self.color,
            Field::Layout => &mut self.layout,
            Field::Style => &mut self.style,
            Field::Code => &mut self.code,
            Field::Load => &mut self.load,
        };
        *slot = value;
    }
}

/// Work-in-progress application for one room.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppDraft {
    /// Template name. `None` until the template list has been fetched at least once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    pub configuration: AppConfiguration,
}

/// A configuration field settable through its own chat command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Description,
    Color,
    Layout,
    Style,
    Code,
    Load,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Description,
        Field::Color,
        Field::Layout,
        Field::Style,
        Field::Code,
        Field::Load,
    ];

    /// Command / wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Color => "color",
            Field::Layout => "layout",
            Field::Style => "style",
            Field::Code => "code",
            Field::Load => "load",
        }
    }

    /// Capitalized name used in replies ("Name updated.").
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Description => "Description",
            Field::Color => "Color",
            Field::Layout => "Layout",
            Field::Style => "Style",
            Field::Code => "Code",
            Field::Load => "Load",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field '{}'", self.0)
    }
}

impl std::error::Error for UnknownField {}

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// State for a single room while an app is being assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// User ids in the order they first contributed.
    pub participants: Vec<String>,
    pub draft: AppDraft,
}

impl Session {
    pub fn new(flavor: Option<String>) -> Self {
        Self {
            participants: Vec::new(),
            draft: AppDraft {
                flavor,
                configuration: AppConfiguration::default(),
            },
        }
    }

    /// Returns false when the user was already listed.
    pub fn add_participant(&mut self, user: &str) -> bool {
        if self.participants.iter().any(|p| p == user) {
            return false;
        }
        self.participants.push(user.to_string());
        true
    }
}
