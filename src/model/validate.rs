//! Field-level validation of inbound JSON payloads.
//!
//! Payloads are checked by hand rather than through serde derives so that
//! every problem in a request is reported at once, keyed by field path
//! (e.g. `group.scientific_name`, `traits.0.name`).

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use super::types::{GroupInput, NewPet, PetPatch, Sex, TraitInput};

/// Maximum length of a pet name, in characters.
pub const MAX_NAME_LEN: usize = 50;

/// Accumulated validation errors, keyed by field path.
///
/// Serializes as a flat map of field path to a list of messages, which is
/// the body of every 400 response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Record a message against a field path.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// True when no errors have been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

const REQUIRED: &str = "This field is required.";
const NOT_A_STRING: &str = "Not a valid string.";
const BLANK: &str = "This field may not be blank.";
const NOT_AN_INTEGER: &str = "A valid integer is required.";
const NOT_A_NUMBER: &str = "A valid number is required.";
const EXPECTED_OBJECT: &str = "Invalid data. Expected an object.";
const EXPECTED_LIST: &str = "Expected a list of items.";

/// Validate a create payload.
///
/// All required fields are checked; `sex` falls back to
/// [`Sex::NotInformed`] when omitted.
pub fn parse_new_pet(body: &Value) -> Result<NewPet, FieldErrors> {
    let mut errors = FieldErrors::default();
    let Some(obj) = body.as_object() else {
        errors.push("non_field_errors", EXPECTED_OBJECT);
        return Err(errors);
    };

    let name = required(obj, "name", &mut errors).and_then(|v| parse_name(v, "name", &mut errors));
    let age = required(obj, "age", &mut errors).and_then(|v| parse_int(v, "age", &mut errors));
    let weight =
        required(obj, "weight", &mut errors).and_then(|v| parse_float(v, "weight", &mut errors));
    let sex = match present(obj, "sex") {
        None => Some(Sex::default()),
        Some(v) => parse_sex(v, &mut errors),
    };
    let group = required(obj, "group", &mut errors).and_then(|v| parse_group(v, &mut errors));
    let traits = required(obj, "traits", &mut errors).and_then(|v| parse_traits(v, &mut errors));

    match (name, age, weight, sex, group, traits) {
        (Some(name), Some(age), Some(weight), Some(sex), Some(group), Some(traits))
            if errors.is_empty() =>
        {
            Ok(NewPet {
                name,
                age,
                weight,
                sex,
                group,
                traits,
            })
        }
        _ => Err(errors),
    }
}

/// Validate a partial-update payload.
///
/// Only fields present in the body are checked; an explicit `null` is
/// treated the same as an absent field.
pub fn parse_pet_patch(body: &Value) -> Result<PetPatch, FieldErrors> {
    let mut errors = FieldErrors::default();
    let Some(obj) = body.as_object() else {
        errors.push("non_field_errors", EXPECTED_OBJECT);
        return Err(errors);
    };

    let mut patch = PetPatch::default();
    if let Some(v) = present(obj, "name") {
        patch.name = parse_name(v, "name", &mut errors);
    }
    if let Some(v) = present(obj, "age") {
        patch.age = parse_int(v, "age", &mut errors);
    }
    if let Some(v) = present(obj, "weight") {
        patch.weight = parse_float(v, "weight", &mut errors);
    }
    if let Some(v) = present(obj, "sex") {
        patch.sex = parse_sex(v, &mut errors);
    }
    if let Some(v) = present(obj, "group") {
        patch.group = parse_group(v, &mut errors);
    }
    if let Some(v) = present(obj, "traits") {
        patch.traits = parse_traits(v, &mut errors);
    }

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(errors)
    }
}

/// Get a field that must be present and non-null.
fn required<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<&'a Value> {
    match obj.get(field) {
        None | Some(Value::Null) => {
            errors.push(field, REQUIRED);
            None
        }
        Some(value) => Some(value),
    }
}

/// Get a field if it is present and non-null.
fn present<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    match obj.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

fn parse_string(value: &Value, field: &str, errors: &mut FieldErrors) -> Option<String> {
    match value.as_str() {
        Some(s) => Some(s.to_string()),
        None => {
            errors.push(field, NOT_A_STRING);
            None
        }
    }
}

/// Non-blank string capped at [`MAX_NAME_LEN`] characters.
fn parse_name(value: &Value, field: &str, errors: &mut FieldErrors) -> Option<String> {
    let s = parse_string(value, field, errors)?;
    if s.is_empty() {
        errors.push(field, BLANK);
        return None;
    }
    if s.chars().count() > MAX_NAME_LEN {
        errors.push(
            field,
            format!("Ensure this field has no more than {MAX_NAME_LEN} characters."),
        );
        return None;
    }
    Some(s)
}

fn parse_int(value: &Value, field: &str, errors: &mut FieldErrors) -> Option<i64> {
    match value.as_i64() {
        Some(n) => Some(n),
        None => {
            errors.push(field, NOT_AN_INTEGER);
            None
        }
    }
}

fn parse_float(value: &Value, field: &str, errors: &mut FieldErrors) -> Option<f64> {
    match value.as_f64() {
        Some(n) => Some(n),
        None => {
            errors.push(field, NOT_A_NUMBER);
            None
        }
    }
}

fn parse_sex(value: &Value, errors: &mut FieldErrors) -> Option<Sex> {
    let parsed = value.as_str().and_then(|raw| Sex::from_str(raw).ok());
    if parsed.is_none() {
        errors.push("sex", format!("{value} is not a valid choice."));
    }
    parsed
}

fn parse_group(value: &Value, errors: &mut FieldErrors) -> Option<GroupInput> {
    let Some(obj) = value.as_object() else {
        errors.push("group", EXPECTED_OBJECT);
        return None;
    };

    let scientific_name = match obj.get("scientific_name") {
        None | Some(Value::Null) => {
            errors.push("group.scientific_name", REQUIRED);
            None
        }
        Some(v) => parse_name(v, "group.scientific_name", errors),
    };
    let name = present(obj, "name").and_then(|v| parse_string(v, "group.name", errors));

    Some(GroupInput {
        scientific_name: scientific_name?,
        name,
    })
}

fn parse_traits(value: &Value, errors: &mut FieldErrors) -> Option<Vec<TraitInput>> {
    let Some(items) = value.as_array() else {
        errors.push("traits", EXPECTED_LIST);
        return None;
    };

    let mut out = Vec::with_capacity(items.len());
    let mut valid = true;
    for (i, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            errors.push(format!("traits.{i}"), EXPECTED_OBJECT);
            valid = false;
            continue;
        };
        let field = format!("traits.{i}.name");
        let name = match obj.get("name") {
            None | Some(Value::Null) => {
                errors.push(&field, REQUIRED);
                None
            }
            Some(v) => parse_name(v, &field, errors),
        };
        match name {
            Some(name) => out.push(TraitInput { name }),
            None => valid = false,
        }
    }

    valid.then_some(out)
}
