// Copyright 2023 Remi Bernotavicius

//! Stores over the three entity tables. Each one borrows the single connection
//! for as long as it is in use.

mod category;
mod ingredient;
mod recipe;

pub use category::Categories;
pub use ingredient::Ingredients;
pub use recipe::Recipes;
