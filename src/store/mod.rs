//! SQLite-backed storage for pets, groups, and traits.
//!
//! A single async connection (tokio-rusqlite) serves all requests. The
//! get-or-create operations run their insert and select inside one
//! connection call, so two concurrent first references to the same
//! natural key cannot both create a row.

use std::path::Path;
use std::str::FromStr;

use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::error::ApiError;
use crate::model::{Group, GroupInput, Pet, Sex, Trait};

/// Resolved fields for inserting a pet row.
#[derive(Debug, Clone)]
pub struct CreatePet {
    /// Pet name.
    pub name: String,
    /// Age in years.
    pub age: i64,
    /// Weight in kilograms.
    pub weight: f64,
    /// Sex.
    pub sex: Sex,
    /// Resolved group id.
    pub group_id: i64,
    /// Resolved trait ids.
    pub trait_ids: Vec<i64>,
}

/// Changes to apply to an existing pet.
///
/// `None` fields are left untouched; a supplied `trait_ids` replaces the
/// pet's entire trait set.
#[derive(Debug, Clone, Default)]
pub struct PetChanges {
    /// New name.
    pub name: Option<String>,
    /// New age.
    pub age: Option<i64>,
    /// New weight.
    pub weight: Option<f64>,
    /// New sex.
    pub sex: Option<Sex>,
    /// Group to reassign to.
    pub group_id: Option<i64>,
    /// Replacement trait set.
    pub trait_ids: Option<Vec<i64>>,
}

/// Async SQLite store for pets, groups, and traits.
#[derive(Clone)]
pub struct PetStore {
    conn: Connection,
}

impl PetStore {
    /// Open (or create) a database at the given file path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, tokio_rusqlite::Error> {
        let conn = Connection::open(path.as_ref()).await?;
        let store = Self { conn };
        store.init_schema().await?;
        Ok(store)
    }

    /// Create a purely in-memory database (useful for tests).
    pub async fn open_in_memory() -> Result<Self, tokio_rusqlite::Error> {
        let conn = Connection::open_in_memory().await?;
        let store = Self { conn };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), tokio_rusqlite::Error> {
        self.conn
            .call(|conn| {
                conn.execute_batch(
                    "
                    PRAGMA foreign_keys = ON;

                    CREATE TABLE IF NOT EXISTS groups (
                        id              INTEGER PRIMARY KEY AUTOINCREMENT,
                        scientific_name TEXT NOT NULL UNIQUE,
                        name            TEXT
                    );

                    CREATE TABLE IF NOT EXISTS traits (
                        id   INTEGER PRIMARY KEY AUTOINCREMENT,
                        name TEXT NOT NULL COLLATE NOCASE UNIQUE
                    );

                    CREATE TABLE IF NOT EXISTS pets (
                        id       INTEGER PRIMARY KEY AUTOINCREMENT,
                        name     TEXT NOT NULL,
                        age      INTEGER NOT NULL,
                        weight   REAL NOT NULL,
                        sex      TEXT NOT NULL DEFAULT 'Not Informed',
                        group_id INTEGER NOT NULL REFERENCES groups(id) ON DELETE RESTRICT
                    );

                    CREATE INDEX IF NOT EXISTS idx_pets_group ON pets(group_id);

                    CREATE TABLE IF NOT EXISTS pet_traits (
                        pet_id   INTEGER NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
                        trait_id INTEGER NOT NULL REFERENCES traits(id) ON DELETE RESTRICT,
                        PRIMARY KEY (pet_id, trait_id)
                    );
                    ",
                )?;
                Ok(())
            })
            .await
    }

    // -----------------------------------------------------------------------
    // Get-or-create by natural key
    // -----------------------------------------------------------------------

    /// Resolve a group by scientific name, creating it when absent.
    ///
    /// Returns the group and whether this call created it. Display fields
    /// of an existing group are left untouched.
    pub async fn get_or_create_group(
        &self,
        input: &GroupInput,
    ) -> Result<(Group, bool), tokio_rusqlite::Error> {
        let scientific_name = input.scientific_name.clone();
        let display_name = input.name.clone();
        self.conn
            .call(move |conn| {
                let inserted = conn.execute(
                    "INSERT INTO groups (scientific_name, name) VALUES (?1, ?2)
                     ON CONFLICT(scientific_name) DO NOTHING",
                    rusqlite::params![scientific_name, display_name],
                )?;
                let group = conn.query_row(
                    "SELECT id, scientific_name, name FROM groups WHERE scientific_name = ?1",
                    rusqlite::params![scientific_name],
                    row_to_group,
                )?;
                Ok((group, inserted > 0))
            })
            .await
    }

    /// Resolve a trait by case-insensitive name, creating it when absent.
    ///
    /// The original case is stored on creation; an existing trait keeps
    /// the case it was created with.
    pub async fn get_or_create_trait(
        &self,
        name: &str,
    ) -> Result<(Trait, bool), tokio_rusqlite::Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| {
                let inserted = conn.execute(
                    "INSERT INTO traits (name) VALUES (?1)
                     ON CONFLICT(name) DO NOTHING",
                    rusqlite::params![name],
                )?;
                let tr = conn.query_row(
                    "SELECT id, name FROM traits WHERE name = ?1",
                    rusqlite::params![name],
                    row_to_trait,
                )?;
                Ok((tr, inserted > 0))
            })
            .await
    }

    // -----------------------------------------------------------------------
    // Pet CRUD
    // -----------------------------------------------------------------------

    /// Insert a pet row plus its trait links, returning the new id.
    pub async fn create_pet(&self, pet: CreatePet) -> Result<i64, tokio_rusqlite::Error> {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO pets (name, age, weight, sex, group_id)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![
                        pet.name,
                        pet.age,
                        pet.weight,
                        pet.sex.to_string(),
                        pet.group_id
                    ],
                )?;
                let pet_id = tx.last_insert_rowid();
                for trait_id in &pet.trait_ids {
                    tx.execute(
                        "INSERT OR IGNORE INTO pet_traits (pet_id, trait_id) VALUES (?1, ?2)",
                        rusqlite::params![pet_id, trait_id],
                    )?;
                }
                tx.commit()?;
                Ok(pet_id)
            })
            .await
    }

    /// Fetch a pet with its group and traits resolved.
    pub async fn get_pet(&self, id: i64) -> Result<Option<Pet>, tokio_rusqlite::Error> {
        self.conn
            .call(move |conn| {
                let pet = conn
                    .query_row(
                        "SELECT p.id, p.name, p.age, p.weight, p.sex,
                                g.id, g.scientific_name, g.name
                         FROM pets p
                         JOIN groups g ON g.id = p.group_id
                         WHERE p.id = ?1",
                        rusqlite::params![id],
                        row_to_pet,
                    )
                    .optional()?;
                match pet {
                    Some(mut pet) => {
                        pet.traits = load_traits(conn, pet.id)?;
                        Ok(Some(pet))
                    }
                    None => Ok(None),
                }
            })
            .await
    }

    /// List pets ordered by id ascending, optionally filtered by a
    /// case-insensitive trait name.
    pub async fn list_pets(
        &self,
        trait_filter: Option<String>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Pet>, tokio_rusqlite::Error> {
        self.conn
            .call(move |conn| {
                let mut pets = match &trait_filter {
                    Some(name) => {
                        let mut stmt = conn.prepare(
                            "SELECT DISTINCT p.id, p.name, p.age, p.weight, p.sex,
                                    g.id, g.scientific_name, g.name
                             FROM pets p
                             JOIN groups g ON g.id = p.group_id
                             JOIN pet_traits pt ON pt.pet_id = p.id
                             JOIN traits t ON t.id = pt.trait_id
                             WHERE t.name = ?1
                             ORDER BY p.id
                             LIMIT ?2 OFFSET ?3",
                        )?;
                        let rows =
                            stmt.query_map(rusqlite::params![name, limit, offset], row_to_pet)?;
                        rows.collect::<rusqlite::Result<Vec<_>>>()?
                    }
                    None => {
                        let mut stmt = conn.prepare(
                            "SELECT p.id, p.name, p.age, p.weight, p.sex,
                                    g.id, g.scientific_name, g.name
                             FROM pets p
                             JOIN groups g ON g.id = p.group_id
                             ORDER BY p.id
                             LIMIT ?1 OFFSET ?2",
                        )?;
                        let rows = stmt.query_map(rusqlite::params![limit, offset], row_to_pet)?;
                        rows.collect::<rusqlite::Result<Vec<_>>>()?
                    }
                };
                for pet in &mut pets {
                    pet.traits = load_traits(conn, pet.id)?;
                }
                Ok(pets)
            })
            .await
    }

    /// Count pets matching the optional trait filter.
    pub async fn count_pets(
        &self,
        trait_filter: Option<String>,
    ) -> Result<u64, tokio_rusqlite::Error> {
        self.conn
            .call(move |conn| {
                let count = match &trait_filter {
                    Some(name) => conn.query_row(
                        "SELECT COUNT(DISTINCT p.id)
                         FROM pets p
                         JOIN pet_traits pt ON pt.pet_id = p.id
                         JOIN traits t ON t.id = pt.trait_id
                         WHERE t.name = ?1",
                        rusqlite::params![name],
                        |row| row.get(0),
                    )?,
                    None => conn.query_row("SELECT COUNT(*) FROM pets", [], |row| row.get(0))?,
                };
                Ok(count)
            })
            .await
    }

    /// Apply partial changes to a pet in one transaction.
    pub async fn update_pet(
        &self,
        id: i64,
        changes: PetChanges,
    ) -> Result<(), tokio_rusqlite::Error> {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                if let Some(name) = &changes.name {
                    tx.execute(
                        "UPDATE pets SET name = ?1 WHERE id = ?2",
                        rusqlite::params![name, id],
                    )?;
                }
                if let Some(age) = changes.age {
                    tx.execute(
                        "UPDATE pets SET age = ?1 WHERE id = ?2",
                        rusqlite::params![age, id],
                    )?;
                }
                if let Some(weight) = changes.weight {
                    tx.execute(
                        "UPDATE pets SET weight = ?1 WHERE id = ?2",
                        rusqlite::params![weight, id],
                    )?;
                }
                if let Some(sex) = changes.sex {
                    tx.execute(
                        "UPDATE pets SET sex = ?1 WHERE id = ?2",
                        rusqlite::params![sex.to_string(), id],
                    )?;
                }
                if let Some(group_id) = changes.group_id {
                    tx.execute(
                        "UPDATE pets SET group_id = ?1 WHERE id = ?2",
                        rusqlite::params![group_id, id],
                    )?;
                }
                if let Some(trait_ids) = &changes.trait_ids {
                    tx.execute(
                        "DELETE FROM pet_traits WHERE pet_id = ?1",
                        rusqlite::params![id],
                    )?;
                    for trait_id in trait_ids {
                        tx.execute(
                            "INSERT OR IGNORE INTO pet_traits (pet_id, trait_id) VALUES (?1, ?2)",
                            rusqlite::params![id, trait_id],
                        )?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
    }

    /// Delete a pet, returning whether a row was removed.
    ///
    /// Trait links go with the pet; trait and group rows stay.
    pub async fn delete_pet(&self, id: i64) -> Result<bool, tokio_rusqlite::Error> {
        self.conn
            .call(move |conn| {
                let deleted = conn.execute("DELETE FROM pets WHERE id = ?1", rusqlite::params![id])?;
                Ok(deleted > 0)
            })
            .await
    }

    // -----------------------------------------------------------------------
    // Group lifecycle
    // -----------------------------------------------------------------------

    /// Delete a group, returning whether a row was removed.
    ///
    /// Fails with [`ApiError::Protected`] while any pet still references
    /// the group.
    pub async fn delete_group(&self, id: i64) -> crate::error::Result<bool> {
        let result = self
            .conn
            .call(move |conn| {
                let deleted =
                    conn.execute("DELETE FROM groups WHERE id = ?1", rusqlite::params![id])?;
                Ok(deleted > 0)
            })
            .await;

        match result {
            Err(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(err, _)))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(ApiError::Protected(
                    "Group is still referenced by pets.".to_string(),
                ))
            }
            other => Ok(other?),
        }
    }
}

// ---------------------------------------------------------------------------
// Row mapping helpers
// ---------------------------------------------------------------------------

fn row_to_group(row: &rusqlite::Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        id: row.get(0)?,
        scientific_name: row.get(1)?,
        name: row.get(2)?,
    })
}

fn row_to_trait(row: &rusqlite::Row<'_>) -> rusqlite::Result<Trait> {
    Ok(Trait {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn row_to_pet(row: &rusqlite::Row<'_>) -> rusqlite::Result<Pet> {
    let sex_raw: String = row.get(4)?;
    let sex = Sex::from_str(&sex_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Pet {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        weight: row.get(3)?,
        sex,
        group: Group {
            id: row.get(5)?,
            scientific_name: row.get(6)?,
            name: row.get(7)?,
        },
        traits: Vec::new(),
    })
}

fn load_traits(conn: &rusqlite::Connection, pet_id: i64) -> rusqlite::Result<Vec<Trait>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name FROM traits t
         JOIN pet_traits pt ON pt.trait_id = t.id
         WHERE pt.pet_id = ?1
         ORDER BY t.id",
    )?;
    let rows = stmt.query_map(rusqlite::params![pet_id], row_to_trait)?;
    rows.collect()
}
