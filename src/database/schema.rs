// Copyright 2023 Remi Bernotavicius

// Mirrors `migrations/`; update both together.

diesel::table! {
    categories (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    ingredients (id) {
        id -> Integer,
        name -> Text,
        description -> Text,
        contains_alcohol -> Bool,
        photo_url -> Nullable<Text>,
    }
}

diesel::table! {
    recipe_contents (recipe_id, ingredient_id) {
        recipe_id -> Integer,
        ingredient_id -> Integer,
        amount -> Double,
    }
}

diesel::table! {
    recipes (id) {
        id -> Integer,
        name -> Text,
        category -> Integer,
        instructions -> Text,
    }
}

diesel::joinable!(recipe_contents -> ingredients (ingredient_id));
diesel::joinable!(recipe_contents -> recipes (recipe_id));
diesel::joinable!(recipes -> categories (category));

diesel::allow_tables_to_appear_in_same_query!(
    categories,
    ingredients,
    recipe_contents,
    recipes,
);
