//! Price and weight computation for a single order line.
//!
//! An ingredient contributes a size-dependent weight (grams) and a price of
//! `price_per_gram * grams`. A line is one pizza at one size, carrying the
//! pizza's default ingredients plus any extras, scaled by quantity.

use bigdecimal::BigDecimal;

use crate::models::catalog::{Ingredient, PizzaSize};

/// Grams the ingredient adds for the given size name.
///
/// The size name is matched case-insensitively against the three stored
/// weight columns. A size name outside small/medium/big contributes zero
/// grams; this mirrors the per-size column model rather than raising an
/// error, and is relied upon by callers.
pub fn ingredient_weight_for(size_name: &str, ingredient: &Ingredient) -> i32 {
    match size_name.to_ascii_lowercase().as_str() {
        "small" => ingredient.weight_small,
        "medium" => ingredient.weight_medium,
        "big" => ingredient.weight_big,
        _ => 0,
    }
}

fn ingredient_price_for(size_name: &str, ingredient: &Ingredient) -> BigDecimal {
    &ingredient.price_per_gram * BigDecimal::from(ingredient_weight_for(size_name, ingredient))
}

/// Price of one unit: size base plus every default and extra ingredient
/// contribution.
pub fn unit_price(size: &PizzaSize, defaults: &[Ingredient], extras: &[Ingredient]) -> BigDecimal {
    let mut total = size.base_price.clone();
    for ingredient in defaults.iter().chain(extras.iter()) {
        total += ingredient_price_for(&size.name, ingredient);
    }
    total
}

/// Weight of one unit in grams, same shape as `unit_price`.
pub fn unit_weight(size: &PizzaSize, defaults: &[Ingredient], extras: &[Ingredient]) -> i32 {
    let mut total = size.base_weight;
    for ingredient in defaults.iter().chain(extras.iter()) {
        total += ingredient_weight_for(&size.name, ingredient);
    }
    total
}

/// Line totals: unit values scaled by quantity.
pub fn line_totals(
    size: &PizzaSize,
    defaults: &[Ingredient],
    extras: &[Ingredient],
    quantity: i32,
) -> (BigDecimal, i32) {
    let price = unit_price(size, defaults, extras) * BigDecimal::from(quantity);
    let weight = unit_weight(size, defaults, extras) * quantity;
    (price, weight)
}
