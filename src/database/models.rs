// Copyright 2023 Remi Bernotavicius

use derive_more::{Display, From, Into};
use diesel::deserialize::{Queryable, QueryableByName};
use diesel::expression::Selectable;
use diesel::prelude::{AsChangeset, Identifiable, Insertable};
use diesel_derive_newtype::DieselNewType;
use serde::{Deserialize, Deserializer, Serialize};

use crate::database::schema::{categories, ingredients, recipes};

#[derive(
    DieselNewType,
    Debug,
    Display,
    From,
    Into,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Copy,
    Clone,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct CategoryId(i32);

#[derive(Queryable, Selectable, Identifiable, Clone, Debug, PartialEq, Eq, Serialize)]
#[diesel(table_name = categories)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = categories)]
pub struct NewCategory {
    pub name: String,
}

#[derive(Deserialize, Default, Debug)]
pub struct CategoryEdit {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
}

#[derive(
    DieselNewType,
    Debug,
    Display,
    From,
    Into,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Copy,
    Clone,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct IngredientId(i32);

/// The alcohol flag is stored as 0/1; diesel's `Bool` mapping turns it back
/// into a `bool` on every read.
#[derive(Queryable, Selectable, Identifiable, Clone, Debug, PartialEq, Eq, Serialize)]
#[diesel(table_name = ingredients)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub description: String,
    pub contains_alcohol: bool,
    pub photo_url: Option<String>,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = ingredients)]
pub struct NewIngredient {
    pub name: String,
    pub description: String,
    pub contains_alcohol: bool,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Deserialize, Default, Debug)]
pub struct IngredientEdit {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub contains_alcohol: Option<Option<bool>>,
    #[serde(default, deserialize_with = "nullable")]
    pub photo_url: Option<Option<String>>,
}

#[derive(Default, Debug, Clone, Copy)]
pub struct IngredientFilter {
    pub contains_alcohol: Option<bool>,
    pub has_photo: Option<bool>,
}

#[derive(
    DieselNewType,
    Debug,
    Display,
    From,
    Into,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Copy,
    Clone,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct RecipeId(i32);

#[derive(
    Queryable, QueryableByName, Selectable, Identifiable, Clone, Debug, PartialEq, Eq, Serialize,
)]
#[diesel(table_name = recipes)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub category: CategoryId,
    pub instructions: String,
}

/// One row of a recipe's contents, seen from the recipe's side. An amount of
/// 0 means the recipe does not use the ingredient.
#[derive(Queryable, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct IngredientAmount {
    pub id: IngredientId,
    pub amount: f64,
}

#[derive(Deserialize, Debug)]
pub struct NewRecipe {
    pub name: String,
    pub category_id: CategoryId,
    pub instructions: String,
    #[serde(default)]
    pub ingredients: Option<Vec<IngredientAmount>>,
}

#[derive(Deserialize, Default, Debug)]
pub struct RecipeEdit {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub category_id: Option<Option<CategoryId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub instructions: Option<Option<String>>,
    #[serde(default)]
    pub ingredients: Option<Vec<IngredientAmount>>,
}

#[derive(Default, Debug, Clone, Copy)]
pub struct RecipeFilter {
    pub category_id: Option<CategoryId>,
    pub ingredient_id: Option<IngredientId>,
    pub contains_alcohol: Option<bool>,
}

/// Main-row columns touched by a recipe edit. Fields left `None` are not
/// part of the generated `UPDATE`.
#[derive(AsChangeset, Default, Debug)]
#[diesel(table_name = recipes)]
pub struct RecipeChangeset {
    pub name: Option<String>,
    pub category: Option<CategoryId>,
    pub instructions: Option<String>,
}

impl RecipeChangeset {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none() && self.instructions.is_none()
    }
}

#[derive(AsChangeset, Default, Debug)]
#[diesel(table_name = ingredients)]
pub struct IngredientChangeset {
    pub name: Option<String>,
    pub description: Option<String>,
    pub contains_alcohol: Option<bool>,
    pub photo_url: Option<Option<String>>,
}

impl IngredientChangeset {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.contains_alcohol.is_none()
            && self.photo_url.is_none()
    }
}

/// Keeps "key present but null" (`Some(None)`) apart from "key absent"
/// (`None`, via `#[serde(default)]`).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[test]
fn edit_distinguishes_null_from_absent() {
    let edit: RecipeEdit = serde_json::from_str(r#"{"name": null}"#).unwrap();
    assert_eq!(edit.name, Some(None));
    assert_eq!(edit.instructions, None);
    assert!(edit.ingredients.is_none());

    let edit: RecipeEdit =
        serde_json::from_str(r#"{"category_id": 2, "ingredients": []}"#).unwrap();
    assert_eq!(edit.category_id, Some(Some(CategoryId::from(2))));
    assert_eq!(edit.ingredients.map(|i| i.len()), Some(0));

    let edit: IngredientEdit =
        serde_json::from_str(r#"{"photo_url": null, "bogus": 1}"#).unwrap();
    assert_eq!(edit.photo_url, Some(None));
    assert_eq!(edit.name, None);
}
