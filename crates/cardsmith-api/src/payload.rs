//! Raw payload normalization
//!
//! Request bodies arrive with several spellings for the same field. Each
//! canonical field is resolved once, here, through an ordered list of
//! candidate keys; the renderer only ever sees [`CardData`].

use cardsmith_core::{AbilityExtra, AbilitySlot, CardData};
use serde_json::{Map, Value};
use thiserror::Error;

/// Payload errors
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Payload must be a JSON object")]
    NotAnObject,
}

/// Category keywords accepted verbatim from the `type` field
const CATEGORY_KEYWORDS: [&str; 3] = ["忍术", "忍者", "状态"];

/// Form option values of the `type` field and the categories they stand for
const TYPE_OPTIONS: [(&str, &str); 3] = [
    ("option1", "忍术"),
    ("option2", "忍者"),
    ("option3", "状态"),
];

/// Parse and normalize a JSON request body
pub fn parse_card(body: &[u8]) -> Result<CardData, PayloadError> {
    let value: Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(PayloadError::NotAnObject);
    }
    Ok(normalize(&value))
}

/// Resolve a raw payload into canonical card fields
///
/// Unknown keys are ignored and non-object input yields an empty card,
/// which then fails validation on its empty name.
pub fn normalize(body: &Value) -> CardData {
    let empty = Map::new();
    let obj = body.as_object().unwrap_or(&empty);
    let form = obj.get("option1").and_then(Value::as_object).unwrap_or(&empty);

    CardData {
        name: text(obj, "name"),
        category: category(obj),
        number: first_of(obj, &["Nomber", "number"]),
        tags: tags(obj.get("tags")),
        ability_slot1: ability(obj, form, "abilitySlot1", 1),
        ability_slot2: ability(obj, form, "abilitySlot2", 2),
        art: text(obj, "art"),
        note: optional(first_of(obj, &["add", "note"])),
        copyright: optional(text(obj, "copyright")),
    }
}

fn category(obj: &Map<String, Value>) -> String {
    let explicit = text(obj, "category");
    if !explicit.is_empty() {
        return explicit;
    }

    let kind = text(obj, "type");
    if CATEGORY_KEYWORDS.contains(&kind.as_str()) {
        return kind;
    }
    if let Some((_, mapped)) = TYPE_OPTIONS.iter().find(|(option, _)| *option == kind) {
        return (*mapped).to_string();
    }

    first_of(obj, &["cardType", "kind"])
}

fn tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(scalar)
            .filter(|s| !s.is_empty())
            .collect(),
        Some(other) => scalar(other)
            .split([',', '，'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

/// Canonical slot object first, then the flattened form fields
fn ability(
    obj: &Map<String, Value>,
    form: &Map<String, Value>,
    canonical: &str,
    n: u8,
) -> Option<AbilitySlot> {
    if let Some(Value::Object(slot)) = obj.get(canonical) {
        return canonical_slot(slot);
    }

    let extra = AbilityExtra {
        mode: optional(text(form, &format!("extra_description_{n}_mode"))),
        cost: optional(text(form, &format!("cost_extra_{n}"))),
        description: optional(text(form, &format!("extra_description_{n}"))),
    };
    let slot = AbilitySlot {
        chance: optional(text(form, &format!("chance_{n}"))),
        mode: optional(text(form, &format!("description_mode_{n}"))),
        cost: optional(text(form, &format!("cost_{n}"))),
        description: optional(text(obj, &format!("description_{n}"))),
        extra: extra.is_populated().then_some(extra),
    };
    slot.is_populated().then_some(slot)
}

fn canonical_slot(slot: &Map<String, Value>) -> Option<AbilitySlot> {
    let extra = slot
        .get("extra")
        .and_then(Value::as_object)
        .map(|extra| AbilityExtra {
            mode: optional(text(extra, "mode")),
            cost: optional(text(extra, "cost")),
            description: optional(text(extra, "description")),
        })
        .filter(AbilityExtra::is_populated);

    let slot = AbilitySlot {
        chance: optional(text(slot, "chance")),
        mode: optional(text(slot, "mode")),
        cost: optional(text(slot, "cost")),
        description: optional(text(slot, "description")),
        extra,
    };
    slot.is_populated().then_some(slot)
}

/// First candidate key with a non-empty value
fn first_of(obj: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| text(obj, key))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn text(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key).map(scalar).unwrap_or_default()
}

/// Trimmed string form of a scalar; containers and null are empty
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn optional(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_precedence() {
        let card = normalize(&json!({"category": "状态", "type": "option1"}));
        assert_eq!(card.category, "状态");

        let card = normalize(&json!({"type": "忍者", "cardType": "x"}));
        assert_eq!(card.category, "忍者");

        let card = normalize(&json!({"type": "option1"}));
        assert_eq!(card.category, "忍术");

        let card = normalize(&json!({"type": "lexla", "cardType": "", "kind": "event"}));
        assert_eq!(card.category, "event");

        assert_eq!(normalize(&json!({})).category, "");
    }

    #[test]
    fn test_number_and_note_aliases() {
        let card = normalize(&json!({"Nomber": "A-01", "number": "B-02", "add": "", "note": "n"}));
        assert_eq!(card.number, "A-01");
        assert_eq!(card.note.as_deref(), Some("n"));

        let card = normalize(&json!({"number": 7}));
        assert_eq!(card.number, "7");
        assert_eq!(card.note, None);
    }

    #[test]
    fn test_tags_from_string_or_array() {
        let card = normalize(&json!({"tags": "fire, ice，,  wind "}));
        assert_eq!(card.tags, vec!["fire", "ice", "wind"]);

        let card = normalize(&json!({"tags": ["fire", "", null, " ice "]}));
        assert_eq!(card.tags, vec!["fire", "ice"]);

        assert!(normalize(&json!({"tags": null})).tags.is_empty());
    }

    #[test]
    fn test_form_fields_build_slots() {
        let card = normalize(&json!({
            "name": " Shadow Clone ",
            "description_1": "Split into two",
            "option1": {
                "chance_1": "30%",
                "description_mode_1": "attack",
                "cost_1": 2,
                "extra_description_1": "Then vanish",
                "cost_2": "1"
            }
        }));

        assert_eq!(card.name, "Shadow Clone");
        let slot = card.ability_slot1.unwrap();
        assert_eq!(slot.chance.as_deref(), Some("30%"));
        assert_eq!(slot.mode.as_deref(), Some("attack"));
        assert_eq!(slot.cost.as_deref(), Some("2"));
        assert_eq!(slot.description.as_deref(), Some("Split into two"));
        let extra = slot.extra.unwrap();
        assert_eq!(extra.description.as_deref(), Some("Then vanish"));
        assert_eq!(extra.mode, None);

        let slot2 = card.ability_slot2.unwrap();
        assert_eq!(slot2.cost.as_deref(), Some("1"));
        assert!(slot2.extra.is_none());
    }

    #[test]
    fn test_canonical_slot_wins_over_form() {
        let card = normalize(&json!({
            "abilitySlot1": {"description": "canonical", "extra": {"cost": ""}},
            "description_1": "form",
        }));
        let slot = card.ability_slot1.unwrap();
        assert_eq!(slot.description.as_deref(), Some("canonical"));
        assert!(slot.extra.is_none());
        assert!(card.ability_slot2.is_none());
    }

    #[test]
    fn test_empty_slots_are_absent() {
        let card = normalize(&json!({"option1": {"chance_1": "  "}, "abilitySlot2": {}}));
        assert!(card.ability_slot1.is_none());
        assert!(card.ability_slot2.is_none());
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(matches!(parse_card(b"{not json"), Err(PayloadError::Json(_))));
        assert!(matches!(parse_card(b"[1, 2]"), Err(PayloadError::NotAnObject)));

        let card = parse_card(br#"{"name": "x", "copyright": "c"}"#).unwrap();
        assert_eq!(card.copyright.as_deref(), Some("c"));
    }
}
