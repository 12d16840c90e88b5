// Copyright 2023 Remi Bernotavicius

//! Command line front end. Each subcommand maps onto one store operation,
//! takes JSON for anything with a body and prints JSON back.

use clap::Subcommand;
use serde::Serialize;

use crate::database;
use crate::database::models::{
    CategoryEdit, CategoryId, IngredientAmount, IngredientEdit, IngredientFilter, IngredientId,
    NewCategory, NewIngredient, NewRecipe, Recipe, RecipeEdit, RecipeFilter, RecipeId,
};
use crate::error::{Entity, StoreError};
use crate::store::{Categories, Ingredients, Recipes};
use crate::Result;

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(subcommand)]
    Categories(CategoryCommand),
    #[command(subcommand)]
    Ingredients(IngredientCommand),
    #[command(subcommand)]
    Recipes(RecipeCommand),
}

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    List,
    Get { id: i32 },
    Create { name: String },
    /// EDIT is a JSON object, e.g. `{"name": "sours"}`
    Update { id: i32, edit: String },
    Delete { id: i32 },
}

#[derive(Debug, Subcommand)]
pub enum IngredientCommand {
    List {
        #[arg(long)]
        contains_alcohol: Option<bool>,
        #[arg(long)]
        has_photo: Option<bool>,
    },
    Get {
        id: i32,
    },
    /// INGREDIENT is a JSON object with `name`, `description`,
    /// `contains_alcohol` and optionally `photo_url`
    Create {
        ingredient: String,
    },
    /// EDIT is a JSON object; omitted fields are left alone, `"photo_url": null`
    /// clears the photo
    Update {
        id: i32,
        edit: String,
    },
    Delete {
        id: i32,
    },
}

#[derive(Debug, Subcommand)]
pub enum RecipeCommand {
    List {
        #[arg(long)]
        category: Option<i32>,
        #[arg(long)]
        ingredient: Option<i32>,
        #[arg(long)]
        contains_alcohol: Option<bool>,
    },
    Get {
        id: i32,
    },
    /// RECIPE is a JSON object with `name`, `category_id`, `instructions` and
    /// optionally `ingredients: [{"id": .., "amount": ..}]`
    Create {
        recipe: String,
    },
    /// EDIT is a JSON object; omitted fields are left alone and a given
    /// `ingredients` list replaces the current one
    Update {
        id: i32,
        edit: String,
    },
    Delete {
        id: i32,
    },
    /// List the ingredients of a recipe
    Ingredients {
        id: i32,
    },
    /// Show how much of an ingredient a recipe uses (0 if none)
    Ingredient {
        recipe_id: i32,
        ingredient_id: i32,
    },
    /// Add, change or (with an amount of 0) remove an ingredient
    SetIngredient {
        recipe_id: i32,
        ingredient_id: i32,
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },
    RemoveIngredient {
        recipe_id: i32,
        ingredient_id: i32,
    },
}

/// A recipe as shown to the user, with its ingredients filled in.
#[derive(Serialize)]
struct RecipeView {
    id: RecipeId,
    name: String,
    category_id: CategoryId,
    instructions: String,
    ingredients: Vec<IngredientAmount>,
}

fn with_ingredients(store: &mut Recipes<'_>, recipe: Recipe) -> Result<RecipeView> {
    let ingredients = store.get_ingredients(recipe.id)?;
    Ok(RecipeView {
        id: recipe.id,
        name: recipe.name,
        category_id: recipe.category,
        instructions: recipe.instructions,
        ingredients,
    })
}

fn print(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn run(conn: &mut database::Connection, command: Commands) -> Result<()> {
    match command {
        Commands::Categories(c) => run_category(conn, c),
        Commands::Ingredients(c) => run_ingredient(conn, c),
        Commands::Recipes(c) => run_recipe(conn, c),
    }
}

fn run_category(conn: &mut database::Connection, command: CategoryCommand) -> Result<()> {
    let mut store = Categories::new(conn);
    match command {
        CategoryCommand::List => print(&store.get_all()?),
        CategoryCommand::Get { id } => {
            let category = store
                .get(id.into())?
                .ok_or(StoreError::not_found(Entity::Category, id))?;
            print(&category)
        }
        CategoryCommand::Create { name } => print(&store.create(&NewCategory { name })?),
        CategoryCommand::Update { id, edit } => {
            let edit: CategoryEdit = serde_json::from_str(&edit)?;
            let category = store
                .update(id.into(), &edit)?
                .ok_or(StoreError::not_found(Entity::Category, id))?;
            print(&category)
        }
        CategoryCommand::Delete { id } => {
            if !store.delete(id.into())? {
                return Err(StoreError::not_found(Entity::Category, id).into());
            }
            Ok(())
        }
    }
}

fn run_ingredient(conn: &mut database::Connection, command: IngredientCommand) -> Result<()> {
    let mut store = Ingredients::new(conn);
    match command {
        IngredientCommand::List {
            contains_alcohol,
            has_photo,
        } => print(&store.get_all(IngredientFilter {
            contains_alcohol,
            has_photo,
        })?),
        IngredientCommand::Get { id } => {
            let ingredient = store
                .get(id.into())?
                .ok_or(StoreError::not_found(Entity::Ingredient, id))?;
            print(&ingredient)
        }
        IngredientCommand::Create { ingredient } => {
            let new_ingredient: NewIngredient = serde_json::from_str(&ingredient)?;
            print(&store.create(&new_ingredient)?)
        }
        IngredientCommand::Update { id, edit } => {
            let edit: IngredientEdit = serde_json::from_str(&edit)?;
            let ingredient = store
                .update(id.into(), &edit)?
                .ok_or(StoreError::not_found(Entity::Ingredient, id))?;
            print(&ingredient)
        }
        IngredientCommand::Delete { id } => {
            if !store.delete(id.into())? {
                return Err(StoreError::not_found(Entity::Ingredient, id).into());
            }
            Ok(())
        }
    }
}

fn require_recipe(conn: &mut database::Connection, id: i32) -> Result<RecipeId> {
    if !Recipes::new(conn).exists(id.into())? {
        return Err(StoreError::not_found(Entity::Recipe, id).into());
    }
    Ok(id.into())
}

fn require_ingredient(conn: &mut database::Connection, id: i32) -> Result<IngredientId> {
    if !Ingredients::new(conn).exists(id.into())? {
        return Err(StoreError::not_found(Entity::Ingredient, id).into());
    }
    Ok(id.into())
}

fn run_recipe(conn: &mut database::Connection, command: RecipeCommand) -> Result<()> {
    match command {
        RecipeCommand::List {
            category,
            ingredient,
            contains_alcohol,
        } => {
            let mut store = Recipes::new(conn);
            let filter = RecipeFilter {
                category_id: category.map(Into::into),
                ingredient_id: ingredient.map(Into::into),
                contains_alcohol,
            };
            let views = store
                .get_all(filter)?
                .into_iter()
                .map(|recipe| with_ingredients(&mut store, recipe))
                .collect::<Result<Vec<_>>>()?;
            print(&views)
        }
        RecipeCommand::Get { id } => {
            let mut store = Recipes::new(conn);
            let recipe = store
                .get(id.into())?
                .ok_or(StoreError::not_found(Entity::Recipe, id))?;
            print(&with_ingredients(&mut store, recipe)?)
        }
        RecipeCommand::Create { recipe } => {
            let new_recipe: NewRecipe = serde_json::from_str(&recipe)?;
            let mut store = Recipes::new(conn);
            let created = store.create(&new_recipe)?;
            print(&with_ingredients(&mut store, created)?)
        }
        RecipeCommand::Update { id, edit } => {
            let edit: RecipeEdit = serde_json::from_str(&edit)?;
            let mut store = Recipes::new(conn);
            let updated = store.update(id.into(), &edit)?;
            print(&with_ingredients(&mut store, updated)?)
        }
        RecipeCommand::Delete { id } => {
            if !Recipes::new(conn).delete(id.into())? {
                return Err(StoreError::not_found(Entity::Recipe, id).into());
            }
            Ok(())
        }
        RecipeCommand::Ingredients { id } => {
            let recipe_id = require_recipe(conn, id)?;
            print(&Recipes::new(conn).get_ingredients(recipe_id)?)
        }
        RecipeCommand::Ingredient {
            recipe_id,
            ingredient_id,
        } => {
            let recipe_id = require_recipe(conn, recipe_id)?;
            let ingredient_id = require_ingredient(conn, ingredient_id)?;
            print(&Recipes::new(conn).get_ingredient(recipe_id, ingredient_id)?)
        }
        RecipeCommand::SetIngredient {
            recipe_id,
            ingredient_id,
            amount,
        } => {
            let recipe_id = require_recipe(conn, recipe_id)?;
            print(&Recipes::new(conn).set_ingredient(recipe_id, ingredient_id.into(), amount)?)
        }
        RecipeCommand::RemoveIngredient {
            recipe_id,
            ingredient_id,
        } => {
            let recipe_id = require_recipe(conn, recipe_id)?;
            let ingredient_id = require_ingredient(conn, ingredient_id)?;
            Recipes::new(conn).remove_ingredient(recipe_id, ingredient_id)?;
            Ok(())
        }
    }
}

/// Process exit status for a failed command, grouped the way an HTTP front
/// end would group status codes.
pub fn exit_code(error: &(dyn std::error::Error + 'static)) -> i32 {
    match error.downcast_ref::<StoreError>() {
        Some(StoreError::NotFound { .. } | StoreError::ReferenceNotFound { .. }) => 4,
        Some(StoreError::NameConflict(_) | StoreError::InUse(_)) => 9,
        Some(
            StoreError::InvalidAmount(_)
            | StoreError::RequiredFieldNull(_)
            | StoreError::NoValidEdits
            | StoreError::InvalidName(_),
        ) => 2,
        Some(StoreError::Database(_)) => 1,
        None if error.is::<serde_json::Error>() => 2,
        None => 1,
    }
}

#[test]
fn recipe_view_embeds_ingredients() {
    let mut conn = database::test_connection();
    let mut store = Recipes::new(&mut conn);
    let recipe = store.get(2.into()).unwrap().unwrap();
    let view = with_ingredients(&mut store, recipe).unwrap();

    assert_eq!(
        serde_json::to_value(&view).unwrap(),
        serde_json::json!({
            "id": 2,
            "name": "virgin orange",
            "category_id": 2,
            "instructions": "pour juice over ice",
            "ingredients": [
                {"id": 2, "amount": 150.0},
                {"id": 3, "amount": 2.0}
            ]
        })
    );
}

#[test]
fn exit_codes() {
    let not_found: crate::Error = StoreError::not_found(Entity::Recipe, 1).into();
    assert_eq!(exit_code(&*not_found), 4);

    let conflict: crate::Error = StoreError::InUse(Entity::Category).into();
    assert_eq!(exit_code(&*conflict), 9);

    let bad_json: crate::Error = serde_json::from_str::<RecipeEdit>("{")
        .unwrap_err()
        .into();
    assert_eq!(exit_code(&*bad_json), 2);

    let other: crate::Error = "something else".into();
    assert_eq!(exit_code(&*other), 1);
}

#[test]
fn recipe_ingredient_commands_check_ids() {
    let mut conn = database::test_connection();

    let err = run(
        &mut conn,
        Commands::Recipes(RecipeCommand::RemoveIngredient {
            recipe_id: 42,
            ingredient_id: 1,
        }),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::NotFound {
            entity: Entity::Recipe,
            id: 42
        })
    ));

    let err = run(
        &mut conn,
        Commands::Recipes(RecipeCommand::Ingredient {
            recipe_id: 1,
            ingredient_id: 42,
        }),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::NotFound {
            entity: Entity::Ingredient,
            id: 42
        })
    ));

    run(
        &mut conn,
        Commands::Recipes(RecipeCommand::SetIngredient {
            recipe_id: 2,
            ingredient_id: 4,
            amount: 5.0,
        }),
    )
    .unwrap();
    assert_eq!(
        Recipes::new(&mut conn)
            .get_ingredient(2.into(), 4.into())
            .unwrap()
            .amount,
        5.0
    );
}
