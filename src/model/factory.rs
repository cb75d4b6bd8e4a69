use egui::Color32;
use serde::{Deserialize, Serialize};

use super::ids::FactoryId;

/// Closed set of factory kinds. Tasks may only move between factories of the
/// same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FactoryType {
    Manufacturing,
    Container,
    Packaging,
}

impl FactoryType {
    pub const ALL: [FactoryType; 3] = [
        FactoryType::Manufacturing,
        FactoryType::Container,
        FactoryType::Packaging,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FactoryType::Manufacturing => "manufacturing",
            FactoryType::Container => "container",
            FactoryType::Packaging => "packaging",
        }
    }
}

/// A named, typed lane on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factory {
    pub id: FactoryId,
    pub name: String,
    pub factory_type: FactoryType,
    /// Lane accent color (stored as RGBA).
    #[serde(with = "color_serde")]
    pub color: Color32,
}

impl Factory {
    pub fn new(name: impl Into<String>, factory_type: FactoryType) -> Self {
        Self {
            id: FactoryId::new(),
            name: name.into(),
            factory_type,
            color: default_color(factory_type),
        }
    }

    pub fn with_id(mut self, id: FactoryId) -> Self {
        self.id = id;
        self
    }
}

fn default_color(factory_type: FactoryType) -> Color32 {
    match factory_type {
        FactoryType::Manufacturing => Color32::from_rgb(70, 130, 180), // Steel blue
        FactoryType::Container => Color32::from_rgb(60, 179, 113),
        FactoryType::Packaging => Color32::from_rgb(255, 165, 0),
    }
}

/// Serde helper for `Color32`.
mod color_serde {
    use egui::Color32;
    use serde::{self, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let rgba = [color.r(), color.g(), color.b(), color.a()];
        rgba.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Color32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rgba: [u8; 4] = Deserialize::deserialize(deserializer)?;
        Ok(Color32::from_rgba_premultiplied(
            rgba[0], rgba[1], rgba[2], rgba[3],
        ))
    }
}
