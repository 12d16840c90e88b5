// Copyright 2023 Remi Bernotavicius

use diesel::prelude::OptionalExtension as _;
use diesel::Connection as _;
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;

use crate::database;
use crate::database::models::{
    Ingredient, IngredientChangeset, IngredientEdit, IngredientFilter, IngredientId,
    NewIngredient,
};
use crate::database::violation::{violation, Violation};
use crate::error::{check_name, required, Entity, StoreError, StoreResult};

pub struct Ingredients<'conn> {
    conn: &'conn mut database::Connection,
}

impl<'conn> Ingredients<'conn> {
    pub fn new(conn: &'conn mut database::Connection) -> Self {
        Self { conn }
    }

    pub fn exists(&mut self, ingredient_id: IngredientId) -> StoreResult<bool> {
        use database::schema::ingredients::dsl::*;

        Ok(
            diesel::select(diesel::dsl::exists(ingredients.find(ingredient_id)))
                .get_result(self.conn)?,
        )
    }

    pub fn get(&mut self, ingredient_id: IngredientId) -> StoreResult<Option<Ingredient>> {
        use database::schema::ingredients::dsl::*;

        Ok(ingredients
            .find(ingredient_id)
            .select(Ingredient::as_select())
            .first(self.conn)
            .optional()?)
    }

    pub fn get_all(&mut self, filter: IngredientFilter) -> StoreResult<Vec<Ingredient>> {
        use database::schema::ingredients::dsl::*;

        let mut query = ingredients
            .select(Ingredient::as_select())
            .order(id)
            .into_boxed();
        if let Some(alcoholic) = filter.contains_alcohol {
            query = query.filter(contains_alcohol.eq(alcoholic));
        }
        match filter.has_photo {
            Some(true) => query = query.filter(photo_url.is_not_null()),
            Some(false) => query = query.filter(photo_url.is_null()),
            None => {}
        }
        Ok(query.load(self.conn)?)
    }

    pub fn create(&mut self, new_ingredient: &NewIngredient) -> StoreResult<Ingredient> {
        use database::schema::ingredients::dsl::*;

        check_name(&new_ingredient.name)?;
        let created = self.conn.transaction(|conn| {
            diesel::insert_into(ingredients)
                .values(new_ingredient)
                .execute(conn)
                .map_err(|e| match violation(&e) {
                    Some(Violation::Unique) => StoreError::NameConflict(Entity::Ingredient),
                    _ => e.into(),
                })?;
            Ok::<_, StoreError>(
                ingredients
                    .filter(name.eq(new_ingredient.name.as_str()))
                    .select(Ingredient::as_select())
                    .get_result::<Ingredient>(conn)?,
            )
        })?;
        log::info!("created ingredient {}", created.id);
        Ok(created)
    }

    /// Returns `false` if there was nothing to delete.
    pub fn delete(&mut self, ingredient_id: IngredientId) -> StoreResult<bool> {
        use database::schema::ingredients::dsl::*;

        let deleted = diesel::delete(ingredients.find(ingredient_id))
            .execute(self.conn)
            .map_err(|e| match violation(&e) {
                Some(Violation::ForeignKey) => StoreError::InUse(Entity::Ingredient),
                _ => e.into(),
            })?;
        if deleted > 0 {
            log::info!("deleted ingredient {ingredient_id}");
        }
        Ok(deleted > 0)
    }

    /// Returns `None` if the ingredient doesn't exist.
    pub fn update(
        &mut self,
        ingredient_id: IngredientId,
        edit: &IngredientEdit,
    ) -> StoreResult<Option<Ingredient>> {
        use database::schema::ingredients::dsl::*;

        let changes = changeset(edit)?;
        if changes.is_empty() {
            return Err(StoreError::NoValidEdits);
        }

        let updated = diesel::update(ingredients.find(ingredient_id))
            .set(changes)
            .execute(self.conn)
            .map_err(|e| match violation(&e) {
                Some(Violation::Unique) => StoreError::NameConflict(Entity::Ingredient),
                Some(Violation::NotNull(column)) => StoreError::RequiredFieldNull(column),
                _ => e.into(),
            })?;
        if updated == 0 {
            return Ok(None);
        }
        self.get(ingredient_id)
    }
}

fn changeset(edit: &IngredientEdit) -> StoreResult<IngredientChangeset> {
    let changes = IngredientChangeset {
        name: required("name", &edit.name)?,
        description: required("description", &edit.description)?,
        contains_alcohol: required("contains_alcohol", &edit.contains_alcohol)?,
        photo_url: edit.photo_url.clone(),
    };
    if let Some(new_name) = &changes.name {
        check_name(new_name)?;
    }
    Ok(changes)
}

#[cfg(test)]
fn ingredient_ids(ingredients: &[Ingredient]) -> Vec<i32> {
    ingredients.iter().map(|i| i.id.into()).collect()
}

#[test]
fn get_all_filters() {
    let mut conn = database::test_connection();
    let mut store = Ingredients::new(&mut conn);

    let all = store.get_all(IngredientFilter::default()).unwrap();
    assert_eq!(ingredient_ids(&all), vec![1, 2, 3, 4]);
    assert!(all[0].contains_alcohol);
    assert!(!all[1].contains_alcohol);

    let alcoholic = store
        .get_all(IngredientFilter {
            contains_alcohol: Some(true),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(ingredient_ids(&alcoholic), vec![1, 4]);

    let with_photo = store
        .get_all(IngredientFilter {
            has_photo: Some(true),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(ingredient_ids(&with_photo), vec![1]);

    let both = store
        .get_all(IngredientFilter {
            contains_alcohol: Some(true),
            has_photo: Some(false),
        })
        .unwrap();
    assert_eq!(ingredient_ids(&both), vec![4]);
}

#[test]
fn create() {
    let mut conn = database::test_connection();
    let mut store = Ingredients::new(&mut conn);

    let created = store
        .create(&NewIngredient {
            name: "gin".into(),
            description: "juniper spirit".into(),
            contains_alcohol: true,
            photo_url: None,
        })
        .unwrap();
    assert_eq!(
        created,
        Ingredient {
            id: created.id,
            name: "gin".into(),
            description: "juniper spirit".into(),
            contains_alcohol: true,
            photo_url: None,
        }
    );
    assert_eq!(store.get(created.id).unwrap(), Some(created));

    let with_photo = store
        .create(&NewIngredient {
            name: "lime".into(),
            description: "sour".into(),
            contains_alcohol: false,
            photo_url: Some("https://example.com/lime.png".into()),
        })
        .unwrap();
    assert_eq!(
        with_photo.photo_url.as_deref(),
        Some("https://example.com/lime.png")
    );
    assert!(!with_photo.contains_alcohol);

    let err = store
        .create(&NewIngredient {
            name: "vodka".into(),
            description: "again".into(),
            contains_alcohol: true,
            photo_url: None,
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::NameConflict(Entity::Ingredient)));
}

#[test]
fn delete() {
    let mut conn = database::test_connection();
    let mut store = Ingredients::new(&mut conn);

    assert!(store.delete(4.into()).unwrap());
    assert!(!store.exists(4.into()).unwrap());
    assert!(!store.delete(4.into()).unwrap());

    let err = store.delete(1.into()).unwrap_err();
    assert!(matches!(err, StoreError::InUse(Entity::Ingredient)));
    assert!(store.exists(1.into()).unwrap());
}

#[test]
fn update() {
    let mut conn = database::test_connection();
    let mut store = Ingredients::new(&mut conn);

    let updated = store
        .update(
            1.into(),
            &IngredientEdit {
                description: Some(Some("potato spirit".into())),
                contains_alcohol: Some(Some(false)),
                photo_url: Some(None),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(
        updated,
        Ingredient {
            id: 1.into(),
            name: "vodka".into(),
            description: "potato spirit".into(),
            contains_alcohol: false,
            photo_url: None,
        }
    );
    assert_eq!(store.get(1.into()).unwrap(), Some(updated));

    let renamed = store
        .update(
            2.into(),
            &IngredientEdit {
                name: Some(Some("blood orange juice".into())),
                photo_url: Some(Some("https://example.com/oj.png".into())),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "blood orange juice");
    assert_eq!(
        renamed.photo_url.as_deref(),
        Some("https://example.com/oj.png")
    );

    let edit = IngredientEdit {
        name: Some(Some("ice".into())),
        ..Default::default()
    };
    assert!(store.update(42.into(), &edit).unwrap().is_none());
    let err = store.update(2.into(), &edit).unwrap_err();
    assert!(matches!(err, StoreError::NameConflict(Entity::Ingredient)));

    let err = store
        .update(
            2.into(),
            &IngredientEdit {
                contains_alcohol: Some(None),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::RequiredFieldNull(f) if f == "contains_alcohol"));

    let err = store.update(2.into(), &IngredientEdit::default()).unwrap_err();
    assert!(matches!(err, StoreError::NoValidEdits));

    assert_eq!(store.get(2.into()).unwrap(), Some(renamed));
}
