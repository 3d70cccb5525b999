//! Entity types for pets, groups, and traits.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Pet sex.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
pub enum Sex {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Sex not informed (default).
    #[serde(rename = "Not Informed")]
    #[strum(serialize = "Not Informed")]
    #[default]
    NotInformed,
}

/// Taxonomic group, keyed by a unique scientific name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Surrogate identifier.
    pub id: i64,
    /// Unique natural key (e.g. "Canis lupus familiaris").
    pub scientific_name: String,
    /// Optional display name (e.g. "dog").
    pub name: Option<String>,
}

/// Descriptive trait tag, unique by case-insensitive name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trait {
    /// Surrogate identifier.
    pub id: i64,
    /// Trait name, stored with its original case.
    pub name: String,
}

/// A pet record with its group and traits resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    /// Surrogate identifier.
    pub id: i64,
    /// Pet name.
    pub name: String,
    /// Age in years.
    pub age: i64,
    /// Weight in kilograms.
    pub weight: f64,
    /// Sex.
    pub sex: Sex,
    /// The pet's taxonomic group (always exactly one).
    pub group: Group,
    /// Zero-or-more descriptive traits.
    pub traits: Vec<Trait>,
}

/// Inbound group reference: resolved by scientific name, created with the
/// supplied display fields when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupInput {
    /// Natural key used for the lookup.
    pub scientific_name: String,
    /// Display name, only used when the group is created.
    pub name: Option<String>,
}

/// Inbound trait reference, matched case-insensitively by name.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitInput {
    /// Trait name; original case is preserved on creation.
    pub name: String,
}

/// Validated payload for creating a pet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPet {
    /// Pet name.
    pub name: String,
    /// Age in years.
    pub age: i64,
    /// Weight in kilograms.
    pub weight: f64,
    /// Sex, defaults to [`Sex::NotInformed`] when omitted.
    pub sex: Sex,
    /// Required group reference.
    pub group: GroupInput,
    /// Trait references; may be empty.
    pub traits: Vec<TraitInput>,
}

/// Validated partial-update payload; only supplied fields are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PetPatch {
    /// New pet name, if supplied.
    pub name: Option<String>,
    /// New age, if supplied.
    pub age: Option<i64>,
    /// New weight, if supplied.
    pub weight: Option<f64>,
    /// New sex, if supplied.
    pub sex: Option<Sex>,
    /// Group to reassign to, if supplied.
    pub group: Option<GroupInput>,
    /// Full replacement trait set, if supplied.
    pub traits: Option<Vec<TraitInput>>,
}
