//! Normalized card description
//!
//! A [`CardData`] is what the composition engine consumes. It is produced by
//! the normalization layer and is never mutated during a render.

use crate::error::CardError;
use serde::{Deserialize, Serialize};

/// Normalized input record describing one card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardData {
    /// Card title (required, non-empty)
    pub name: String,
    /// Category label, also the theme lookup key
    pub category: String,
    /// Collector number shown in the metadata line
    pub number: String,
    /// Tags, drawn as chips and used as icon keys
    pub tags: Vec<String>,
    /// First ability slot
    pub ability_slot1: Option<AbilitySlot>,
    /// Second ability slot
    pub ability_slot2: Option<AbilitySlot>,
    /// Artwork as a `data:image/...` URI, or empty
    pub art: String,
    /// Footer note
    pub note: Option<String>,
    /// Footer copyright line
    pub copyright: Option<String>,
}

impl CardData {
    /// Create a card with just a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the collector number
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = number.into();
        self
    }

    /// Append a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the artwork data URI
    pub fn with_art(mut self, art: impl Into<String>) -> Self {
        self.art = art.into();
        self
    }

    /// Set the first ability slot
    pub fn with_ability1(mut self, slot: AbilitySlot) -> Self {
        self.ability_slot1 = Some(slot);
        self
    }

    /// Set the second ability slot
    pub fn with_ability2(mut self, slot: AbilitySlot) -> Self {
        self.ability_slot2 = Some(slot);
        self
    }

    /// Set the footer note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Set the footer copyright
    pub fn with_copyright(mut self, copyright: impl Into<String>) -> Self {
        self.copyright = Some(copyright.into());
        self
    }

    /// Check required fields before any drawing happens
    pub fn validate(&self) -> Result<(), CardError> {
        if self.name.trim().is_empty() {
            return Err(CardError::Validation("missing required field: name".into()));
        }
        Ok(())
    }

    /// Populated ability slots, in slot order
    pub fn abilities(&self) -> impl Iterator<Item = &AbilitySlot> {
        [&self.ability_slot1, &self.ability_slot2]
            .into_iter()
            .flatten()
            .filter(|slot| slot.is_populated())
    }

    /// Footer text: note and copyright joined with the separator
    pub fn footer_text(&self) -> String {
        [self.note.as_deref(), self.copyright.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(FOOTER_SEPARATOR)
    }

    /// Metadata line: category and number joined with the separator
    pub fn metadata_text(&self) -> String {
        [self.category.as_str(), self.number.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(FOOTER_SEPARATOR)
    }
}

/// Separator used between joined footer and metadata fields
pub const FOOTER_SEPARATOR: &str = "  ·  ";

/// One ability block on the card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilitySlot {
    /// Trigger chance label
    pub chance: Option<String>,
    /// Icon key for the ability mode
    pub mode: Option<String>,
    /// Cost label
    pub cost: Option<String>,
    /// Ability text
    pub description: Option<String>,
    /// Follow-up effect drawn as a second row
    pub extra: Option<AbilityExtra>,
}

impl AbilitySlot {
    /// Whether any field carries content
    pub fn is_populated(&self) -> bool {
        [&self.chance, &self.mode, &self.cost, &self.description]
            .into_iter()
            .any(non_empty)
            || self.extra.as_ref().is_some_and(AbilityExtra::is_populated)
    }

    /// The extra row, when it has content
    pub fn populated_extra(&self) -> Option<&AbilityExtra> {
        self.extra.as_ref().filter(|e| e.is_populated())
    }
}

/// Follow-up effect attached to an ability slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityExtra {
    /// Icon key for the extra mode
    pub mode: Option<String>,
    /// Extra cost label
    pub cost: Option<String>,
    /// Extra ability text
    pub description: Option<String>,
}

impl AbilityExtra {
    /// Whether any field carries content
    pub fn is_populated(&self) -> bool {
        [&self.mode, &self.cost, &self.description]
            .into_iter()
            .any(non_empty)
    }
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}
