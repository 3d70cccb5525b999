//! Entity types and inbound payload validation.
//!
//! This module handles:
//! - Entity types (pet, group, trait) and the sex enumeration
//! - Wire-input types for create and partial-update payloads
//! - Field-level validation of inbound JSON

pub mod types;
pub mod validate;

pub use types::{Group, GroupInput, NewPet, Pet, PetPatch, Sex, Trait, TraitInput};
pub use validate::{parse_new_pet, parse_pet_patch, FieldErrors, MAX_NAME_LEN};
