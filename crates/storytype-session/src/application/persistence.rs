//! Conversion between the typed `Session` and its stored form.
//!
//! This is the only place nested session data crosses the storage boundary.
//! Reads are lenient: rows written by older releases may carry `:symbol`
//! keys, camelCase keys, legacy axis codes or stray values, and each is
//! recovered with a `warn!` rather than failing the load.

use serde_json::{Map, Value, json};
use storytype_core::axis::Axis;
use storytype_core::error::DomainError;
use storytype_core::record::{AnswerRecord, QuestionRecord};
use storytype_core::repository::StoredSession;
use tracing::warn;

use crate::domain::aggregates::Session;
use crate::domain::narrative_state::NarrativeState;
use crate::domain::story::{CustomStoryConfig, ModeKind, SessionMode, StoryMode};

/// Keys whose values are user data; their nested keys are kept verbatim.
const VERBATIM_KEYS: [&str; 1] = ["flags"];

fn canonical_key(key: &str) -> String {
    let key = key.strip_prefix(':').unwrap_or(key);
    let mixed_case = key.chars().any(char::is_uppercase) && key.chars().any(char::is_lowercase);
    if !mixed_case {
        return key.to_owned();
    }

    let mut out = String::with_capacity(key.len() + 4);
    let mut previous: Option<char> = None;
    for c in key.chars() {
        if c.is_uppercase() {
            if previous.is_some_and(|p| p != '_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        previous = Some(c);
    }
    out
}

/// Rewrites object keys into their canonical snake_case form.
///
/// Already-canonical keys win over converted duplicates. Values under
/// `flags` keep their keys as written.
#[must_use]
pub fn canonicalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let (canonical, converted): (Vec<_>, Vec<_>) = map
                .into_iter()
                .map(|(key, value)| (canonical_key(&key), key, value))
                .partition(|(canonical, original, _)| canonical == original);

            let mut out = Map::new();
            for (key, _, value) in canonical.into_iter().chain(converted) {
                if out.contains_key(&key) {
                    continue;
                }
                let value = if VERBATIM_KEYS.contains(&key.as_str()) {
                    value
                } else {
                    canonicalize_keys(value)
                };
                out.insert(key, value);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize_keys).collect()),
        other => other,
    }
}

fn encode<T: serde::Serialize>(what: &str, value: &T) -> Result<Value, DomainError> {
    serde_json::to_value(value)
        .map_err(|e| DomainError::DataFormat(format!("{what} serialization failed: {e}")))
}

/// Converts a session into its stored representation.
///
/// # Errors
///
/// Returns `DomainError::DataFormat` if a nested structure cannot be encoded.
pub fn to_stored_session(session: &Session) -> Result<StoredSession, DomainError> {
    let narrative_state = match &session.mode {
        SessionMode::GameMaster(state) => encode("narrative state", state)?,
        SessionMode::FixedTurn => json!({}),
    };
    let custom_story_config = match &session.custom_story {
        Some(config) => encode("custom story config", config)?,
        None => json!({}),
    };
    let current_index = i64::try_from(session.current_index())
        .map_err(|_| DomainError::DataFormat("current index out of range".to_owned()))?;

    Ok(StoredSession {
        session_id: session.id.clone(),
        mode: session.mode.kind().code().to_owned(),
        story_mode: session.story_mode.map(|mode| mode.code().to_owned()),
        questions: encode("questions", &session.questions())?,
        answers: encode("answers", &session.answers())?,
        current_index,
        completed: session.completed,
        narrative_state,
        custom_story_config,
        created_at: session.created_at,
        updated_at: session.updated_at,
    })
}

fn entries(what: &str, session_id: &str, value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => {
            warn!(session_id, field = what, kind = %json_kind(&other), "expected a list; treating as empty");
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn decode_question(session_id: &str, position: usize, entry: &Value) -> Option<QuestionRecord> {
    let object = entry.as_object()?;
    let (Some(question), Some(option_a), Some(option_b)) = (
        text_field(object, "question"),
        text_field(object, "option_a"),
        text_field(object, "option_b"),
    ) else {
        warn!(session_id, position, "dropping stored question missing text fields");
        return None;
    };

    let tag = object
        .get("dimension")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let dimension = tag
        .parse::<Axis>()
        .ok()
        .or_else(|| Axis::resolve_tag(tag))
        .unwrap_or_else(|| {
            let fallback = Axis::ALL[position % Axis::ALL.len()];
            warn!(session_id, position, tag, fallback = %fallback, "unrecognized question dimension");
            fallback
        });

    Some(QuestionRecord {
        question,
        option_a,
        option_b,
        dimension,
    })
}

fn decode_answer(session_id: &str, position: usize, entry: Value) -> Option<AnswerRecord> {
    if entry.is_null() {
        return None;
    }
    match serde_json::from_value(entry) {
        Ok(answer) => Some(answer),
        Err(e) => {
            warn!(session_id, position, error = %e, "treating malformed stored answer as skipped");
            None
        }
    }
}

fn decode_mode(session_id: &str, mode: &str, state: Value) -> SessionMode {
    let kind = mode.parse::<ModeKind>().unwrap_or_else(|_| {
        warn!(session_id, mode, "unknown stored mode; using fixed-turn");
        ModeKind::FixedTurn
    });
    match kind {
        ModeKind::FixedTurn => SessionMode::FixedTurn,
        ModeKind::GameMaster => {
            let state = match state {
                Value::Null => NarrativeState::default(),
                other => serde_json::from_value(other).unwrap_or_else(|e| {
                    warn!(session_id, error = %e, "malformed narrative state; starting over");
                    NarrativeState::default()
                }),
            };
            SessionMode::GameMaster(state)
        }
    }
}

fn decode_custom_story(session_id: &str, value: Value) -> Option<CustomStoryConfig> {
    if value.as_object().is_none_or(Map::is_empty) {
        return None;
    }
    match serde_json::from_value::<CustomStoryConfig>(value) {
        Ok(config) => Some(config.compact()).filter(|config| !config.is_empty()),
        Err(e) => {
            warn!(session_id, error = %e, "ignoring malformed custom story config");
            None
        }
    }
}

/// Rebuilds a typed session from its stored representation.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the stored id is blank. Every other
/// defect is recovered and logged.
pub fn reconstitute(stored: StoredSession) -> Result<Session, DomainError> {
    DomainError::ensure_session_id(&stored.session_id)?;
    let id = stored.session_id;

    let questions: Vec<Option<QuestionRecord>> =
        entries("questions", &id, canonicalize_keys(stored.questions))
            .iter()
            .enumerate()
            .map(|(position, entry)| decode_question(&id, position, entry))
            .collect();
    let answers: Vec<Option<AnswerRecord>> =
        entries("answers", &id, canonicalize_keys(stored.answers))
            .into_iter()
            .enumerate()
            .map(|(position, entry)| decode_answer(&id, position, entry))
            .collect();

    let current_index = if stored.current_index < 0 {
        warn!(session_id = %id, index = stored.current_index, "negative stored index; using 0");
        0
    } else {
        let index = usize::try_from(stored.current_index).unwrap_or(usize::MAX);
        if index > answers.len() {
            warn!(session_id = %id, index, answers = answers.len(), "stored index past answers; clamping");
        }
        index.min(answers.len())
    };

    let story_mode = stored.story_mode.as_deref().and_then(|code| {
        code.parse::<StoryMode>()
            .inspect_err(|_| warn!(session_id = %id, code, "unknown stored story mode"))
            .ok()
    });
    let mode = decode_mode(&id, &stored.mode, canonicalize_keys(stored.narrative_state));
    let custom_story = decode_custom_story(&id, canonicalize_keys(stored.custom_story_config));

    Ok(Session::from_parts(
        id,
        mode,
        story_mode,
        questions,
        answers,
        current_index,
        stored.completed,
        custom_story,
        stored.created_at,
        stored.updated_at,
    ))
}
