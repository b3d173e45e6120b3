//! Parsing of oracle replies.
//!
//! Replies are free text that should contain one JSON object. The object is
//! cut out of the surrounding prose, parsed, and mapped onto an
//! [`OracleResponse`] according to the kind of text that was requested.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use storytype_core::oracle::{
    AuxiliaryUpdates, OracleError, OracleResponse, PromptKind, note_keys,
};

/// The span from the first `{` to the last `}`, if any.
#[must_use]
pub fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (start < end).then(|| &content[start..=end])
}

/// Inserts the comma models tend to drop between the last option and the
/// `"dimension"` key.
fn repair_missing_comma(json: &str) -> Option<String> {
    let key = json.find("\"dimension\"")?;
    let before = json[..key].trim_end();
    if !before.ends_with('"') || json[before.len()..key].find('\n').is_none() {
        return None;
    }
    Some(format!("{before},\n  {}", &json[key..]))
}

fn parse_object(content: &str) -> Result<Map<String, Value>, OracleError> {
    let json = extract_json_object(content)
        .ok_or_else(|| OracleError::Malformed("no JSON object in reply".to_owned()))?;
    let value = serde_json::from_str::<Value>(json).or_else(|e| {
        repair_missing_comma(json)
            .and_then(|repaired| serde_json::from_str(&repaired).ok())
            .ok_or_else(|| OracleError::Malformed(format!("invalid JSON in reply: {e}")))
    })?;
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(OracleError::Malformed("reply JSON is not an object".to_owned())),
    }
}

fn text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn required(object: &Map<String, Value>, keys: &[&str]) -> Result<String, OracleError> {
    text(object, keys)
        .ok_or_else(|| OracleError::Malformed(format!("reply is missing {:?}", keys[0])))
}

fn impact_note(choice: &Value) -> Option<String> {
    match choice.get("progress_impact")? {
        Value::Number(n) => n.as_i64().map(|n| n.to_string()),
        Value::String(s) => Some(s.trim().to_owned()),
        _ => None,
    }
}

fn parse_question(object: &Map<String, Value>) -> Result<OracleResponse, OracleError> {
    Ok(OracleResponse {
        main_text: required(object, &["question"])?,
        choice_a: required(object, &["optionA", "option_a"])?,
        choice_b: required(object, &["optionB", "option_b"])?,
        dimension_tag: text(object, &["dimension"]),
        auxiliary: AuxiliaryUpdates::default(),
    })
}

fn parse_scene(object: &Map<String, Value>) -> Result<OracleResponse, OracleError> {
    let choices = object
        .get("choices")
        .and_then(Value::as_array)
        .filter(|choices| choices.len() >= 2)
        .ok_or_else(|| OracleError::Malformed("reply needs two choices".to_owned()))?;
    let label = |choice: &Value| {
        choice
            .get("text")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| OracleError::Malformed("choice without text".to_owned()))
    };

    let mut notes = BTreeMap::new();
    for (key, choice) in [(note_keys::IMPACT_A, &choices[0]), (note_keys::IMPACT_B, &choices[1])] {
        if let Some(impact) = impact_note(choice) {
            notes.insert(key.to_owned(), impact);
        }
    }
    let inventory = object
        .get("inventory_updates")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();
    let flags = object
        .get("flag_updates")
        .and_then(Value::as_object)
        .map(|flags| flags.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();

    Ok(OracleResponse {
        main_text: required(object, &["scene_text", "scene"])?,
        choice_a: label(&choices[0])?,
        choice_b: label(&choices[1])?,
        dimension_tag: text(object, &["question_dimension", "dimension"]),
        auxiliary: AuxiliaryUpdates {
            inventory,
            flags,
            notes,
        },
    })
}

fn parse_ending(object: &Map<String, Value>) -> Result<OracleResponse, OracleError> {
    let mut notes = BTreeMap::new();
    for (note, keys) in [
        (note_keys::ANALYSIS, &["mbti_analysis", "analysis"][..]),
        (note_keys::INSIGHTS, &["personality_insights"][..]),
        (note_keys::ACHIEVEMENT, &["achievement"][..]),
    ] {
        if let Some(value) = text(object, keys) {
            notes.insert(note.to_owned(), value);
        }
    }

    Ok(OracleResponse {
        main_text: required(object, &["ending_text"])?,
        choice_a: String::new(),
        choice_b: String::new(),
        dimension_tag: None,
        auxiliary: AuxiliaryUpdates {
            notes,
            ..AuxiliaryUpdates::default()
        },
    })
}

/// Parses the reply `content` to a prompt of `kind`.
///
/// # Errors
///
/// Returns `OracleError::Malformed` when no JSON object can be read or a
/// required field is missing.
pub fn parse_reply(kind: PromptKind, content: &str) -> Result<OracleResponse, OracleError> {
    let object = parse_object(content)?;
    match kind {
        PromptKind::Question => parse_question(&object),
        PromptKind::Scene => parse_scene(&object),
        PromptKind::Ending => parse_ending(&object),
    }
}
