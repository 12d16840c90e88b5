// Copyright 2023 Remi Bernotavicius

use derive_more::Display;
use thiserror::Error;

#[derive(Debug, Display, Copy, Clone, PartialEq, Eq)]
pub enum Entity {
    #[display("category")]
    Category,
    #[display("ingredient")]
    Ingredient,
    #[display("recipe")]
    Recipe,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} with id {id} does not exist")]
    NotFound { entity: Entity, id: i32 },

    #[error("{0} with this name already exists")]
    NameConflict(Entity),

    #[error("referenced {entity} with id {id} does not exist")]
    ReferenceNotFound { entity: Entity, id: i32 },

    #[error("this {0} is in use")]
    InUse(Entity),

    #[error("invalid ingredient amount {0}")]
    InvalidAmount(f64),

    #[error("'{0}' is a required field and cannot be set to null")]
    RequiredFieldNull(String),

    #[error("no valid edits specified")]
    NoValidEdits,

    #[error("names must be between 1 and 128 characters long, got {0}")]
    InvalidName(usize),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub fn not_found(entity: Entity, id: impl Into<i32>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn reference_not_found(entity: Entity, id: impl Into<i32>) -> Self {
        Self::ReferenceNotFound {
            entity,
            id: id.into(),
        }
    }
}

pub const MAX_NAME_LEN: usize = 128;

pub fn check_name(name: &str) -> StoreResult<()> {
    let len = name.chars().count();
    if (1..=MAX_NAME_LEN).contains(&len) {
        Ok(())
    } else {
        Err(StoreError::InvalidName(len))
    }
}

/// Unwraps one field of a partial edit: absent stays `None`, an explicit null
/// on a non-nullable field is `RequiredFieldNull`.
pub fn required<T: Clone>(field: &str, value: &Option<Option<T>>) -> StoreResult<Option<T>> {
    match value {
        None => Ok(None),
        Some(None) => Err(StoreError::RequiredFieldNull(field.into())),
        Some(Some(v)) => Ok(Some(v.clone())),
    }
}

#[test]
fn name_limits() {
    assert!(check_name("a").is_ok());
    assert!(check_name(&"ü".repeat(128)).is_ok());
    assert!(matches!(check_name(""), Err(StoreError::InvalidName(0))));
    assert!(matches!(
        check_name(&"a".repeat(129)),
        Err(StoreError::InvalidName(129))
    ));
}

#[test]
fn messages() {
    assert_eq!(
        StoreError::not_found(Entity::Recipe, 7).to_string(),
        "recipe with id 7 does not exist"
    );
    assert_eq!(
        StoreError::RequiredFieldNull("name".into()).to_string(),
        "'name' is a required field and cannot be set to null"
    );
}

#[test]
fn required_fields() {
    assert_eq!(required::<i32>("name", &None).unwrap(), None);
    assert_eq!(required("name", &Some(Some(3))).unwrap(), Some(3));
    assert!(matches!(
        required::<String>("instructions", &Some(None)),
        Err(StoreError::RequiredFieldNull(f)) if f == "instructions"
    ));
}
