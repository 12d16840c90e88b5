// Copyright 2023 Remi Bernotavicius

//! The recipe aggregate: a recipe row together with all of its
//! `recipe_contents` rows. Every multi-statement change runs in one
//! transaction so a failure part way through leaves nothing behind.

use diesel::prelude::OptionalExtension as _;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::Integer;
use diesel::sqlite::Sqlite;
use diesel::Connection as _;
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;

use crate::database;
use crate::database::models::{
    CategoryId, IngredientAmount, IngredientId, NewRecipe, Recipe, RecipeChangeset, RecipeEdit,
    RecipeFilter, RecipeId,
};
use crate::database::violation::{violation, Violation};
use crate::error::{check_name, required, Entity, StoreError, StoreResult};

pub struct Recipes<'conn> {
    conn: &'conn mut database::Connection,
}

impl<'conn> Recipes<'conn> {
    pub fn new(conn: &'conn mut database::Connection) -> Self {
        Self { conn }
    }

    pub fn exists(&mut self, recipe_id: RecipeId) -> StoreResult<bool> {
        exists(self.conn, recipe_id)
    }

    pub fn get(&mut self, recipe_id: RecipeId) -> StoreResult<Option<Recipe>> {
        get(self.conn, recipe_id)
    }

    pub fn get_all(&mut self, filter: RecipeFilter) -> StoreResult<Vec<Recipe>> {
        let (sql, binds) = filter_query(filter);
        log::debug!("{sql}");

        let mut query: BoxedSqlQuery<'_, Sqlite, SqlQuery> = diesel::sql_query(sql).into_boxed();
        for value in binds {
            query = query.bind::<Integer, _>(value);
        }
        Ok(query.load::<Recipe>(self.conn)?)
    }

    /// Only rows with a positive amount exist, so this never reports zeros.
    pub fn get_ingredients(&mut self, for_recipe: RecipeId) -> StoreResult<Vec<IngredientAmount>> {
        use database::schema::recipe_contents::dsl::*;

        Ok(recipe_contents
            .filter(recipe_id.eq(for_recipe))
            .select((ingredient_id, amount))
            .order(ingredient_id)
            .load(self.conn)?)
    }

    /// A recipe that doesn't use the ingredient reports an amount of 0. The
    /// caller is responsible for checking that both ids exist.
    pub fn get_ingredient(
        &mut self,
        for_recipe: RecipeId,
        for_ingredient: IngredientId,
    ) -> StoreResult<IngredientAmount> {
        use database::schema::recipe_contents::dsl::*;

        let found = recipe_contents
            .filter(recipe_id.eq(for_recipe))
            .filter(ingredient_id.eq(for_ingredient))
            .select((ingredient_id, amount))
            .get_result::<IngredientAmount>(self.conn)
            .optional()?;
        Ok(found.unwrap_or(IngredientAmount {
            id: for_ingredient,
            amount: 0.0,
        }))
    }

    /// Adds or replaces the ingredient's amount. An amount of 0 removes the
    /// ingredient instead. `for_recipe` must already exist.
    pub fn set_ingredient(
        &mut self,
        for_recipe: RecipeId,
        for_ingredient: IngredientId,
        new_amount: f64,
    ) -> StoreResult<IngredientAmount> {
        if !new_amount.is_finite() || new_amount < 0.0 {
            return Err(StoreError::InvalidAmount(new_amount));
        }
        if new_amount == 0.0 {
            self.remove_ingredient(for_recipe, for_ingredient)?;
            return Ok(IngredientAmount {
                id: for_ingredient,
                amount: 0.0,
            });
        }
        upsert_content(self.conn, for_recipe, for_ingredient, new_amount)?;
        Ok(IngredientAmount {
            id: for_ingredient,
            amount: new_amount,
        })
    }

    /// Succeeds whether or not the recipe used the ingredient.
    pub fn remove_ingredient(
        &mut self,
        for_recipe: RecipeId,
        for_ingredient: IngredientId,
    ) -> StoreResult<()> {
        use database::schema::recipe_contents::dsl::*;

        diesel::delete(
            recipe_contents
                .filter(recipe_id.eq(for_recipe))
                .filter(ingredient_id.eq(for_ingredient)),
        )
        .execute(self.conn)?;
        Ok(())
    }

    /// Returns the new recipe without its ingredients.
    pub fn create(&mut self, new_recipe: &NewRecipe) -> StoreResult<Recipe> {
        check_name(&new_recipe.name)?;
        let created = self.conn.transaction(|conn| {
            let created = insert_recipe(conn, new_recipe)?;
            if let Some(contents) = &new_recipe.ingredients {
                set_contents(conn, created.id, contents)?;
            }
            Ok::<_, StoreError>(created)
        })?;
        log::info!("created recipe {}", created.id);
        Ok(created)
    }

    /// Removes the recipe and all of its contents. Returns `false` if there was
    /// nothing to delete.
    pub fn delete(&mut self, delete_id: RecipeId) -> StoreResult<bool> {
        use database::schema::recipes::dsl::*;

        let deleted = self.conn.transaction(|conn| {
            clear_contents(conn, delete_id)?;
            Ok::<_, StoreError>(diesel::delete(recipes.find(delete_id)).execute(conn)?)
        })?;
        if deleted > 0 {
            log::info!("deleted recipe {delete_id}");
        }
        Ok(deleted > 0)
    }

    /// Applies a partial edit. A supplied ingredient list, even an empty one,
    /// replaces the recipe's contents entirely.
    pub fn update(&mut self, edit_id: RecipeId, edit: &RecipeEdit) -> StoreResult<Recipe> {
        self.conn.transaction(|conn| {
            // Checked up front: an ingredients-only edit never touches the
            // recipe row, so nothing else would notice a bad id.
            if !exists(conn, edit_id)? {
                return Err(StoreError::not_found(Entity::Recipe, edit_id));
            }

            if let Some(contents) = &edit.ingredients {
                clear_contents(conn, edit_id)?;
                set_contents(conn, edit_id, contents)?;
            }

            let changes = changeset(edit)?;
            if !changes.is_empty() {
                return update_recipe(conn, edit_id, changes);
            }
            if edit.ingredients.is_none() {
                return Err(StoreError::NoValidEdits);
            }
            get(conn, edit_id)?.ok_or_else(|| StoreError::not_found(Entity::Recipe, edit_id))
        })
    }
}

fn exists(conn: &mut database::Connection, recipe_id: RecipeId) -> StoreResult<bool> {
    use database::schema::recipes::dsl::*;

    Ok(diesel::select(diesel::dsl::exists(recipes.find(recipe_id))).get_result(conn)?)
}

fn get(conn: &mut database::Connection, recipe_id: RecipeId) -> StoreResult<Option<Recipe>> {
    use database::schema::recipes::dsl::*;

    Ok(recipes
        .find(recipe_id)
        .select(Recipe::as_select())
        .first(conn)
        .optional()?)
}

fn insert_recipe(conn: &mut database::Connection, new_recipe: &NewRecipe) -> StoreResult<Recipe> {
    use database::schema::recipes::dsl::*;

    diesel::insert_into(recipes)
        .values((
            name.eq(new_recipe.name.as_str()),
            category.eq(new_recipe.category_id),
            instructions.eq(new_recipe.instructions.as_str()),
        ))
        .execute(conn)
        .map_err(|e| match violation(&e) {
            Some(Violation::Unique) => StoreError::NameConflict(Entity::Recipe),
            Some(Violation::ForeignKey) => {
                StoreError::reference_not_found(Entity::Category, new_recipe.category_id)
            }
            _ => e.into(),
        })?;

    Ok(recipes
        .filter(name.eq(new_recipe.name.as_str()))
        .select(Recipe::as_select())
        .get_result(conn)?)
}

fn update_recipe(
    conn: &mut database::Connection,
    edit_id: RecipeId,
    changes: RecipeChangeset,
) -> StoreResult<Recipe> {
    use database::schema::recipes::dsl::*;

    let new_category = changes.category;
    let updated = diesel::update(recipes.find(edit_id))
        .set(changes)
        .execute(conn)
        .map_err(|e| match violation(&e) {
            Some(Violation::Unique) => StoreError::NameConflict(Entity::Recipe),
            Some(Violation::ForeignKey) => match new_category {
                Some(bad_category) => StoreError::reference_not_found(Entity::Category, bad_category),
                None => e.into(),
            },
            Some(Violation::NotNull(column)) => StoreError::RequiredFieldNull(column),
            None => e.into(),
        })?;
    if updated == 0 {
        return Err(StoreError::not_found(Entity::Recipe, edit_id));
    }
    get(conn, edit_id)?.ok_or_else(|| StoreError::not_found(Entity::Recipe, edit_id))
}

/// Turns the main-row part of an edit into a changeset. The API names
/// `category_id` the column called `category`.
fn changeset(edit: &RecipeEdit) -> StoreResult<RecipeChangeset> {
    let changes = RecipeChangeset {
        name: required("name", &edit.name)?,
        category: required("category_id", &edit.category_id)?,
        instructions: required("instructions", &edit.instructions)?,
    };
    if let Some(new_name) = &changes.name {
        check_name(new_name)?;
    }
    Ok(changes)
}

fn clear_contents(conn: &mut database::Connection, for_recipe: RecipeId) -> StoreResult<usize> {
    use database::schema::recipe_contents::dsl::*;

    Ok(diesel::delete(recipe_contents.filter(recipe_id.eq(for_recipe))).execute(conn)?)
}

/// Applies `contents` in order. The first bad entry fails the whole call; the
/// enclosing transaction throws away whatever was written before it.
fn set_contents(
    conn: &mut database::Connection,
    for_recipe: RecipeId,
    contents: &[IngredientAmount],
) -> StoreResult<()> {
    for content in contents {
        if !content.amount.is_finite() || content.amount <= 0.0 {
            return Err(StoreError::InvalidAmount(content.amount));
        }
        upsert_content(conn, for_recipe, content.id, content.amount)?;
    }
    Ok(())
}

fn upsert_content(
    conn: &mut database::Connection,
    for_recipe: RecipeId,
    for_ingredient: IngredientId,
    new_amount: f64,
) -> StoreResult<()> {
    use database::schema::recipe_contents::dsl::*;

    diesel::replace_into(recipe_contents)
        .values((
            recipe_id.eq(for_recipe),
            ingredient_id.eq(for_ingredient),
            amount.eq(new_amount),
        ))
        .execute(conn)
        .map_err(|e| match violation(&e) {
            Some(Violation::ForeignKey) => {
                StoreError::reference_not_found(Entity::Ingredient, for_ingredient)
            }
            _ => e.into(),
        })?;
    Ok(())
}

/// Builds the listing query. Category is a plain row filter; ingredient and
/// alcohol filters depend on the whole set of a recipe's contents, so they go
/// in a `HAVING` over the recipe's joined rows.
fn filter_query(filter: RecipeFilter) -> (String, Vec<i32>) {
    let mut binds = vec![];

    let mut where_clauses = vec![];
    if let Some(category_id) = filter.category_id {
        where_clauses.push("recipes.category = ?");
        binds.push(i32::from(category_id));
    }

    let mut having_clauses = vec![];
    if let Some(ingredient_id) = filter.ingredient_id {
        having_clauses.push(
            "SUM(CASE WHEN recipe_contents.ingredient_id = ? THEN 1 ELSE 0 END) > 0".to_owned(),
        );
        binds.push(i32::from(ingredient_id));
    }
    if let Some(alcoholic) = filter.contains_alcohol {
        let comparison = if alcoholic { ">" } else { "=" };
        having_clauses.push(format!(
            "SUM(CASE WHEN ingredients.contains_alcohol = 1 THEN 1 ELSE 0 END) {comparison} 0"
        ));
    }

    let where_sql = if where_clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_clauses.join(" AND "))
    };

    let sql = if having_clauses.is_empty() {
        format!("SELECT recipes.* FROM recipes{where_sql} ORDER BY recipes.id")
    } else {
        format!(
            "SELECT recipes.* FROM recipes \
             LEFT JOIN recipe_contents ON recipes.id = recipe_contents.recipe_id \
             LEFT JOIN ingredients ON ingredients.id = recipe_contents.ingredient_id\
             {where_sql} \
             GROUP BY recipes.id \
             HAVING {} \
             ORDER BY recipes.id",
            having_clauses.join(" AND ")
        )
    };
    (sql, binds)
}

#[cfg(test)]
fn amounts(contents: Vec<IngredientAmount>) -> std::collections::BTreeMap<IngredientId, f64> {
    contents.into_iter().map(|c| (c.id, c.amount)).collect()
}

#[cfg(test)]
fn content(id: i32, amount: f64) -> IngredientAmount {
    IngredientAmount {
        id: id.into(),
        amount,
    }
}

#[cfg(test)]
fn recipe_ids(recipes: &[Recipe]) -> Vec<i32> {
    recipes.iter().map(|r| r.id.into()).collect()
}

#[cfg(test)]
fn new_recipe(
    name: &str,
    category: i32,
    ingredients: Option<Vec<IngredientAmount>>,
) -> NewRecipe {
    NewRecipe {
        name: name.into(),
        category_id: category.into(),
        instructions: "stir".into(),
        ingredients,
    }
}

#[cfg(test)]
fn stored_contents(conn: &mut database::Connection) -> i64 {
    use database::schema::recipe_contents::dsl::*;
    recipe_contents.count().get_result(conn).unwrap()
}

#[test]
fn create_then_get() {
    let mut conn = database::test_connection();
    let mut store = Recipes::new(&mut conn);

    let created = store
        .create(&new_recipe(
            "vodka rocks",
            1,
            Some(vec![content(1, 60.0), content(3, 4.0)]),
        ))
        .unwrap();
    assert_eq!(
        store.get(created.id).unwrap(),
        Some(Recipe {
            id: created.id,
            name: "vodka rocks".into(),
            category: 1.into(),
            instructions: "stir".into(),
        })
    );
    assert_eq!(
        amounts(store.get_ingredients(created.id).unwrap()),
        maplit::btreemap! { 1.into() => 60.0, 3.into() => 4.0 }
    );

    let bare = store.create(&new_recipe("just ice", 2, None)).unwrap();
    assert!(store.get_ingredients(bare.id).unwrap().is_empty());
}

#[test]
fn create_conflicts() {
    let mut conn = database::test_connection();
    let mut store = Recipes::new(&mut conn);

    let err = store.create(&new_recipe("screwdriver", 2, None)).unwrap_err();
    assert!(matches!(err, StoreError::NameConflict(Entity::Recipe)));

    let err = store.create(&new_recipe("Y", 99, None)).unwrap_err();
    assert!(matches!(
        err,
        StoreError::ReferenceNotFound {
            entity: Entity::Category,
            id: 99
        }
    ));
}

#[test]
fn create_is_atomic() {
    let mut conn = database::test_connection();
    let before = stored_contents(&mut conn);
    let mut store = Recipes::new(&mut conn);

    let err = store
        .create(&new_recipe(
            "bad ingredient",
            1,
            Some(vec![content(1, 10.0), content(99, 10.0)]),
        ))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::ReferenceNotFound {
            entity: Entity::Ingredient,
            id: 99
        }
    ));

    let err = store
        .create(&new_recipe(
            "bad amount",
            1,
            Some(vec![content(1, 10.0), content(2, 0.0)]),
        ))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidAmount(a) if a == 0.0));

    let err = store
        .create(&new_recipe("negative", 1, Some(vec![content(2, -1.0)])))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidAmount(_)));

    let err = store
        .create(&new_recipe(
            "bottomless",
            1,
            Some(vec![content(1, f64::INFINITY)]),
        ))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidAmount(a) if a == f64::INFINITY));

    assert_eq!(recipe_ids(&store.get_all(RecipeFilter::default()).unwrap()), vec![1, 2]);
    assert_eq!(stored_contents(&mut conn), before);
}

#[test]
fn duplicate_ingredient_replaces_amount() {
    let mut conn = database::test_connection();
    let mut store = Recipes::new(&mut conn);

    let created = store
        .create(&new_recipe(
            "double vodka",
            1,
            Some(vec![content(1, 10.0), content(1, 20.0)]),
        ))
        .unwrap();
    assert_eq!(
        store.get_ingredients(created.id).unwrap(),
        vec![content(1, 20.0)]
    );
}

#[test]
fn delete_removes_contents() {
    let mut conn = database::test_connection();
    let mut store = Recipes::new(&mut conn);

    assert!(store.delete(2.into()).unwrap());
    assert!(!store.exists(2.into()).unwrap());
    assert!(store.get_ingredients(2.into()).unwrap().is_empty());
    assert!(!store.delete(2.into()).unwrap());

    // SQLite hands the highest id out again once it is freed
    let reused = store.create(&new_recipe("fresh start", 1, None)).unwrap();
    assert_eq!(reused.id, 2.into());
    assert!(store.get_ingredients(reused.id).unwrap().is_empty());

    assert_eq!(stored_contents(&mut conn), 3);
}

#[test]
fn ingredient_usage() {
    let mut conn = database::test_connection();
    let mut store = Recipes::new(&mut conn);

    assert_eq!(
        store.get_ingredient(1.into(), 1.into()).unwrap(),
        content(1, 50.0)
    );
    assert_eq!(
        store.get_ingredient(2.into(), 1.into()).unwrap(),
        content(1, 0.0)
    );

    assert_eq!(
        store.set_ingredient(2.into(), 4.into(), 5.0).unwrap(),
        content(4, 5.0)
    );
    assert_eq!(
        store.get_ingredient(2.into(), 4.into()).unwrap(),
        content(4, 5.0)
    );
    assert_eq!(
        store.set_ingredient(2.into(), 4.into(), 7.5).unwrap(),
        content(4, 7.5)
    );

    assert_eq!(
        store.set_ingredient(2.into(), 4.into(), 0.0).unwrap(),
        content(4, 0.0)
    );
    assert_eq!(
        store.get_ingredient(2.into(), 4.into()).unwrap(),
        content(4, 0.0)
    );
    assert_eq!(
        amounts(store.get_ingredients(2.into()).unwrap()),
        maplit::btreemap! { 2.into() => 150.0, 3.into() => 2.0 }
    );

    let err = store.set_ingredient(2.into(), 4.into(), -1.0).unwrap_err();
    assert!(matches!(err, StoreError::InvalidAmount(_)));
    let err = store
        .set_ingredient(2.into(), 4.into(), f64::INFINITY)
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidAmount(a) if a == f64::INFINITY));
    let err = store.set_ingredient(2.into(), 4.into(), f64::NAN).unwrap_err();
    assert!(matches!(err, StoreError::InvalidAmount(_)));
    assert_eq!(
        store.get_ingredient(2.into(), 4.into()).unwrap(),
        content(4, 0.0)
    );

    let err = store.set_ingredient(2.into(), 99.into(), 1.0).unwrap_err();
    assert!(matches!(
        err,
        StoreError::ReferenceNotFound {
            entity: Entity::Ingredient,
            id: 99
        }
    ));

    // setting a missing ingredient to 0 is just a removal
    assert_eq!(
        store.set_ingredient(2.into(), 99.into(), 0.0).unwrap(),
        content(99, 0.0)
    );
}

#[test]
fn remove_ingredient_is_idempotent() {
    let mut conn = database::test_connection();
    let mut store = Recipes::new(&mut conn);

    store.remove_ingredient(1.into(), 2.into()).unwrap();
    let after_first = store.get_ingredients(1.into()).unwrap();
    store.remove_ingredient(1.into(), 2.into()).unwrap();
    assert_eq!(store.get_ingredients(1.into()).unwrap(), after_first);
    assert_eq!(
        amounts(after_first),
        maplit::btreemap! { 1.into() => 50.0, 3.into() => 3.0 }
    );
}

#[test]
fn update_fields() {
    let mut conn = database::test_connection();
    let mut store = Recipes::new(&mut conn);

    let updated = store
        .update(
            1.into(),
            &RecipeEdit {
                name: Some(Some("harvey wallbanger".into())),
                category_id: Some(Some(2.into())),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(
        updated,
        Recipe {
            id: 1.into(),
            name: "harvey wallbanger".into(),
            category: 2.into(),
            instructions: "pour vodka over ice, top with juice".into(),
        }
    );
    assert_eq!(store.get(1.into()).unwrap(), Some(updated));
    // contents are untouched when no ingredient list is given
    assert_eq!(store.get_ingredients(1.into()).unwrap().len(), 3);
}

#[test]
fn update_replaces_ingredients() {
    let mut conn = database::test_connection();
    let mut store = Recipes::new(&mut conn);

    let updated = store
        .update(
            1.into(),
            &RecipeEdit {
                ingredients: Some(vec![content(4, 40.0), content(2, 80.0)]),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "screwdriver");
    assert_eq!(
        amounts(store.get_ingredients(1.into()).unwrap()),
        maplit::btreemap! { 2.into() => 80.0, 4.into() => 40.0 }
    );

    store
        .update(
            1.into(),
            &RecipeEdit {
                ingredients: Some(vec![]),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(store.get_ingredients(1.into()).unwrap().is_empty());
}

#[test]
fn update_is_atomic() {
    let mut conn = database::test_connection();
    let mut store = Recipes::new(&mut conn);
    let before = store.get_ingredients(1.into()).unwrap();

    let err = store
        .update(
            1.into(),
            &RecipeEdit {
                ingredients: Some(vec![content(4, 5.0), content(99, 5.0)]),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::ReferenceNotFound {
            entity: Entity::Ingredient,
            id: 99
        }
    ));
    assert_eq!(store.get_ingredients(1.into()).unwrap(), before);

    // a main-row failure also rolls back the ingredient replacement
    let err = store
        .update(
            1.into(),
            &RecipeEdit {
                name: Some(Some("virgin orange".into())),
                ingredients: Some(vec![content(4, 5.0)]),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::NameConflict(Entity::Recipe)));
    assert_eq!(store.get_ingredients(1.into()).unwrap(), before);
    assert_eq!(store.get(1.into()).unwrap().unwrap().name, "screwdriver");
}

#[test]
fn update_errors() {
    let mut conn = database::test_connection();
    let mut store = Recipes::new(&mut conn);

    let err = store.update(1.into(), &RecipeEdit::default()).unwrap_err();
    assert!(matches!(err, StoreError::NoValidEdits));

    let err = store
        .update(
            1.into(),
            &RecipeEdit {
                name: Some(None),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::RequiredFieldNull(f) if f == "name"));
    assert_eq!(store.get(1.into()).unwrap().unwrap().name, "screwdriver");

    let err = store
        .update(
            1.into(),
            &RecipeEdit {
                instructions: Some(None),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::RequiredFieldNull(f) if f == "instructions"));

    let err = store
        .update(
            1.into(),
            &RecipeEdit {
                category_id: Some(None),
                ingredients: Some(vec![content(4, 5.0)]),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::RequiredFieldNull(f) if f == "category_id"));
    assert_eq!(store.get(1.into()).unwrap().unwrap().category, 1.into());
    assert_eq!(store.get_ingredients(1.into()).unwrap().len(), 3);

    let err = store
        .update(
            1.into(),
            &RecipeEdit {
                category_id: Some(Some(99.into())),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::ReferenceNotFound {
            entity: Entity::Category,
            id: 99
        }
    ));

    let err = store
        .update(
            42.into(),
            &RecipeEdit {
                ingredients: Some(vec![content(1, 1.0)]),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            entity: Entity::Recipe,
            id: 42
        }
    ));

    let err = store
        .update(
            1.into(),
            &RecipeEdit {
                ingredients: Some(vec![content(2, 0.0)]),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidAmount(_)));

    let err = store
        .update(
            1.into(),
            &RecipeEdit {
                ingredients: Some(vec![content(2, f64::INFINITY)]),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidAmount(a) if a == f64::INFINITY));
    assert_eq!(store.get_ingredients(1.into()).unwrap().len(), 3);
}

#[test]
fn get_all_filters() {
    let mut conn = database::test_connection();
    let mut store = Recipes::new(&mut conn);
    store.create(&new_recipe("plain", 1, None)).unwrap();

    let list = |store: &mut Recipes<'_>, filter: RecipeFilter| {
        recipe_ids(&store.get_all(filter).unwrap())
    };

    assert_eq!(list(&mut store, RecipeFilter::default()), vec![1, 2, 3]);
    assert_eq!(
        list(
            &mut store,
            RecipeFilter {
                category_id: Some(1.into()),
                ..Default::default()
            }
        ),
        vec![1, 3]
    );
    assert_eq!(
        list(
            &mut store,
            RecipeFilter {
                contains_alcohol: Some(true),
                ..Default::default()
            }
        ),
        vec![1]
    );
    assert_eq!(
        list(
            &mut store,
            RecipeFilter {
                contains_alcohol: Some(false),
                ..Default::default()
            }
        ),
        vec![2, 3]
    );
    assert_eq!(
        list(
            &mut store,
            RecipeFilter {
                ingredient_id: Some(2.into()),
                ..Default::default()
            }
        ),
        vec![1, 2]
    );
    assert_eq!(
        list(
            &mut store,
            RecipeFilter {
                category_id: Some(2.into()),
                ingredient_id: Some(3.into()),
                contains_alcohol: Some(false),
            }
        ),
        vec![2]
    );
    assert_eq!(
        list(
            &mut store,
            RecipeFilter {
                category_id: Some(1.into()),
                contains_alcohol: Some(false),
                ..Default::default()
            }
        ),
        vec![3]
    );
    assert!(list(
        &mut store,
        RecipeFilter {
            ingredient_id: Some(4.into()),
            ..Default::default()
        }
    )
    .is_empty());
}

#[test]
fn filter_query_binds_in_order() {
    let (sql, binds) = filter_query(RecipeFilter {
        category_id: Some(CategoryId::from(5)),
        ingredient_id: Some(IngredientId::from(7)),
        contains_alcohol: None,
    });
    assert_eq!(binds, vec![5, 7]);
    assert!(sql.find("recipes.category = ?") < sql.find("recipe_contents.ingredient_id = ?"));
    assert!(sql.contains("GROUP BY recipes.id"));

    let (sql, binds) = filter_query(RecipeFilter::default());
    assert!(binds.is_empty());
    assert!(!sql.contains("JOIN"));
}
