// Copyright 2023 Remi Bernotavicius

use diesel::prelude::OptionalExtension as _;
use diesel::Connection as _;
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;

use crate::database;
use crate::database::models::{Category, CategoryEdit, CategoryId, NewCategory};
use crate::database::violation::{violation, Violation};
use crate::error::{check_name, Entity, StoreError, StoreResult};

pub struct Categories<'conn> {
    conn: &'conn mut database::Connection,
}

impl<'conn> Categories<'conn> {
    pub fn new(conn: &'conn mut database::Connection) -> Self {
        Self { conn }
    }

    pub fn exists(&mut self, category_id: CategoryId) -> StoreResult<bool> {
        use database::schema::categories::dsl::*;

        Ok(diesel::select(diesel::dsl::exists(categories.find(category_id)))
            .get_result(self.conn)?)
    }

    pub fn get(&mut self, category_id: CategoryId) -> StoreResult<Option<Category>> {
        use database::schema::categories::dsl::*;

        Ok(categories
            .find(category_id)
            .select(Category::as_select())
            .first(self.conn)
            .optional()?)
    }

    pub fn get_all(&mut self) -> StoreResult<Vec<Category>> {
        use database::schema::categories::dsl::*;

        Ok(categories
            .select(Category::as_select())
            .order(id)
            .load(self.conn)?)
    }

    pub fn create(&mut self, new_category: &NewCategory) -> StoreResult<Category> {
        use database::schema::categories::dsl::*;

        check_name(&new_category.name)?;
        let created = self.conn.transaction(|conn| {
            diesel::insert_into(categories)
                .values(new_category)
                .execute(conn)
                .map_err(|e| match violation(&e) {
                    Some(Violation::Unique) => StoreError::NameConflict(Entity::Category),
                    _ => e.into(),
                })?;
            Ok::<_, StoreError>(
                categories
                    .filter(name.eq(new_category.name.as_str()))
                    .select(Category::as_select())
                    .get_result::<Category>(conn)?,
            )
        })?;
        log::info!("created category {}", created.id);
        Ok(created)
    }

    /// Returns `false` if there was nothing to delete.
    pub fn delete(&mut self, category_id: CategoryId) -> StoreResult<bool> {
        use database::schema::categories::dsl::*;

        let deleted = diesel::delete(categories.find(category_id))
            .execute(self.conn)
            .map_err(|e| match violation(&e) {
                Some(Violation::ForeignKey) => StoreError::InUse(Entity::Category),
                _ => e.into(),
            })?;
        if deleted > 0 {
            log::info!("deleted category {category_id}");
        }
        Ok(deleted > 0)
    }

    /// Returns `None` if the category doesn't exist.
    pub fn update(
        &mut self,
        category_id: CategoryId,
        edit: &CategoryEdit,
    ) -> StoreResult<Option<Category>> {
        use database::schema::categories::dsl::*;

        let new_name = match &edit.name {
            None => return Err(StoreError::NoValidEdits),
            Some(None) => return Err(StoreError::RequiredFieldNull("name".into())),
            Some(Some(new_name)) => new_name,
        };
        check_name(new_name)?;

        let updated = diesel::update(categories.find(category_id))
            .set(name.eq(new_name.as_str()))
            .execute(self.conn)
            .map_err(|e| match violation(&e) {
                Some(Violation::Unique) => StoreError::NameConflict(Entity::Category),
                _ => e.into(),
            })?;
        if updated == 0 {
            return Ok(None);
        }
        self.get(category_id)
    }
}

#[cfg(test)]
fn category(category_id: i32, category_name: &str) -> Category {
    Category {
        id: category_id.into(),
        name: category_name.into(),
    }
}

#[test]
fn get_all_and_get() {
    let mut conn = database::test_connection();
    let mut store = Categories::new(&mut conn);

    assert_eq!(
        store.get_all().unwrap(),
        vec![
            category(1, "test category 1"),
            category(2, "another test category"),
            category(3, "unused category"),
        ]
    );
    assert_eq!(
        store.get(2.into()).unwrap(),
        Some(category(2, "another test category"))
    );
    assert_eq!(store.get(42.into()).unwrap(), None);
    assert!(store.exists(1.into()).unwrap());
    assert!(!store.exists(42.into()).unwrap());
}

#[test]
fn create() {
    let mut conn = database::test_connection();
    let mut store = Categories::new(&mut conn);

    let created = store
        .create(&NewCategory {
            name: "a new category!".into(),
        })
        .unwrap();
    assert_eq!(created.name, "a new category!");
    assert_eq!(store.get(created.id).unwrap(), Some(created));

    let err = store
        .create(&NewCategory {
            name: "test category 1".into(),
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::NameConflict(Entity::Category)));

    let err = store.create(&NewCategory { name: "".into() }).unwrap_err();
    assert!(matches!(err, StoreError::InvalidName(0)));
    assert_eq!(store.get_all().unwrap().len(), 4);
}

#[test]
fn delete() {
    let mut conn = database::test_connection();
    let mut store = Categories::new(&mut conn);

    assert!(store.delete(3.into()).unwrap());
    assert_eq!(store.get(3.into()).unwrap(), None);
    assert!(!store.delete(3.into()).unwrap());

    let err = store.delete(2.into()).unwrap_err();
    assert!(matches!(err, StoreError::InUse(Entity::Category)));
    assert!(store.exists(2.into()).unwrap());
}

#[test]
fn update() {
    let mut conn = database::test_connection();
    let mut store = Categories::new(&mut conn);

    let rename = |new_name: Option<&str>| CategoryEdit {
        name: Some(new_name.map(Into::into)),
    };

    assert_eq!(
        store
            .update(1.into(), &rename(Some("a category with its name changed")))
            .unwrap(),
        Some(category(1, "a category with its name changed"))
    );
    assert_eq!(
        store.get(1.into()).unwrap(),
        Some(category(1, "a category with its name changed"))
    );

    assert_eq!(
        store
            .update(42.into(), &rename(Some("this should fail anyway")))
            .unwrap(),
        None
    );

    let err = store
        .update(1.into(), &rename(Some("another test category")))
        .unwrap_err();
    assert!(matches!(err, StoreError::NameConflict(Entity::Category)));

    let err = store.update(1.into(), &rename(None)).unwrap_err();
    assert!(matches!(err, StoreError::RequiredFieldNull(f) if f == "name"));

    let err = store.update(1.into(), &CategoryEdit::default()).unwrap_err();
    assert!(matches!(err, StoreError::NoValidEdits));

    assert_eq!(
        store.get(1.into()).unwrap(),
        Some(category(1, "a category with its name changed"))
    );
}
