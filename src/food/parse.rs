//! Cleanup of model output: models are asked for bare JSON but regularly wrap
//! it in markdown fences or pad entries with blanks.

use log::{error, warn};
use serde_json::Value;

use crate::food::recipe::{coerce_u32, Category, Difficulty, NutritionInfo, RecipeDraft};

pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json\n", "")
        .replace("```json", "")
        .replace("```\n", "")
        .replace("```", "")
        .trim()
        .to_string()
}

pub fn parse_model_json(text: &str) -> Option<Value> {
    let clean = strip_code_fences(text);
    match serde_json::from_str(&clean) {
        Ok(value) => Some(value),
        Err(e) => {
            error!("JSON parse error: {}", e);
            error!("Raw text: {}", text);
            None
        }
    }
}

/// `None` when the payload has no `ingredients` array at all.
pub fn extract_ingredients(value: &Value) -> Option<Vec<String>> {
    let items = value.get("ingredients")?.as_array()?;
    Some(string_list(items))
}

pub fn dedupe_ingredients(ingredients: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(ingredients.len());
    for ingredient in ingredients {
        if !unique.contains(&ingredient) {
            unique.push(ingredient);
        }
    }
    unique
}

/// `None` when the payload has no `recipes` array; otherwise only the entries
/// that carry a name, a known type and non-empty ingredients and instructions.
pub fn extract_recipes(value: &Value) -> Option<Vec<RecipeDraft>> {
    let entries = value.get("recipes")?.as_array()?;
    let total = entries.len();
    let recipes: Vec<RecipeDraft> = entries.iter().filter_map(recipe_from_value).collect();

    if recipes.len() < total {
        warn!("Dropped {} malformed recipe(s) from model output", total - recipes.len());
    }
    Some(recipes)
}

fn recipe_from_value(value: &Value) -> Option<RecipeDraft> {
    let name = text_field(value, &["name"]).filter(|s| !s.is_empty())?;
    let category = text_field(value, &["type", "category"]).and_then(|s| Category::parse(&s))?;

    let ingredients = value
        .get("ingredients")
        .and_then(Value::as_array)
        .map(|items| string_list(items))
        .filter(|items| !items.is_empty())?;
    let instructions = value
        .get("instructions")
        .and_then(Value::as_array)
        .map(|items| string_list(items))
        .filter(|items| !items.is_empty())?;

    let nutrition_info = value
        .get("nutritionInfo")
        .or_else(|| value.get("nutrition_info"))
        .filter(|v| v.is_object())
        .map(|v| NutritionInfo {
            protein: text_field(v, &["protein"]),
            carbs: text_field(v, &["carbs"]),
            fiber: text_field(v, &["fiber"]),
            fat: text_field(v, &["fat"]),
        });

    Some(RecipeDraft {
        name,
        category,
        difficulty: text_field(value, &["difficulty"]).and_then(|s| Difficulty::parse(&s)),
        ingredients,
        instructions,
        prep_time: text_field(value, &["prepTime", "prep_time"]).unwrap_or_default(),
        calories: value.get("calories").map(coerce_u32).unwrap_or(0),
        servings: value.get("servings").map(coerce_u32).unwrap_or(0),
        tags: value
            .get("tags")
            .and_then(Value::as_array)
            .map(|items| string_list(items))
            .unwrap_or_default(),
        nutrition_info,
    })
}

/// First present key rendered as trimmed text; numbers are stringified.
fn text_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn string_list(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(
            strip_code_fences("```json\n{\"a\": 1}\n```"),
            "{\"a\": 1}"
        );
        assert_eq!(strip_code_fences("```\n[1, 2]\n```\n"), "[1, 2]");
        assert_eq!(strip_code_fences("  {\"plain\": true}  "), "{\"plain\": true}");
    }

    #[test]
    fn test_parse_model_json() {
        let value = parse_model_json("```json\n{\"ingredients\": [\"tomate\"]}\n```").unwrap();
        assert_eq!(value["ingredients"][0], "tomate");

        assert!(parse_model_json("Sorry, I can't see any food here.").is_none());
    }

    #[test]
    fn test_extract_ingredients() {
        let value = json!({ "ingredients": [" tomate maduro ", "", 42, "frango em cubos"] });
        assert_eq!(
            extract_ingredients(&value).unwrap(),
            vec!["tomate maduro", "frango em cubos"]
        );

        assert!(extract_ingredients(&json!({ "ingredients": "tomate" })).is_none());
        assert!(extract_ingredients(&json!({})).is_none());
        assert_eq!(extract_ingredients(&json!({ "ingredients": [] })).unwrap().len(), 0);
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let ingredients = vec!["ovo", "leite", "ovo", "farinha", "leite"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(dedupe_ingredients(ingredients), vec!["ovo", "leite", "farinha"]);
    }

    #[test]
    fn test_extract_recipes_filters_malformed_entries() {
        let value = json!({
            "recipes": [
                {
                    "name": "Frango grelhado com legumes",
                    "type": "salgado",
                    "difficulty": "médio",
                    "ingredients": ["200g de frango", "1 abobrinha"],
                    "instructions": ["Tempere", "Grelhe", "Sirva"],
                    "prepTime": "35 min",
                    "calories": 410,
                    "servings": 2,
                    "tags": ["proteico", "low-carb"],
                    "nutritionInfo": { "protein": "40g", "carbs": "12g", "fiber": "4g", "fat": "9g" }
                },
                { "name": "Sem instruções", "type": "doce", "ingredients": ["banana"], "instructions": [] },
                { "name": "", "type": "doce", "ingredients": ["banana"], "instructions": ["amasse"] },
                { "name": "Tipo estranho", "type": "bebida", "ingredients": ["água"], "instructions": ["sirva"] },
                { "name": "Só espaços", "type": "doce", "ingredients": ["  "], "instructions": ["amasse"] },
                "not even an object"
            ]
        });

        let recipes = extract_recipes(&value).unwrap();
        assert_eq!(recipes.len(), 1);

        let recipe = &recipes[0];
        assert_eq!(recipe.name, "Frango grelhado com legumes");
        assert_eq!(recipe.category, Category::Savory);
        assert_eq!(recipe.difficulty, Some(Difficulty::Medium));
        assert_eq!(recipe.prep_time, "35 min");
        assert_eq!(recipe.calories, 410);
        assert_eq!(recipe.tags, vec!["proteico", "low-carb"]);
        assert_eq!(
            recipe.nutrition_info.as_ref().and_then(|n| n.fiber.as_deref()),
            Some("4g")
        );
    }

    #[test]
    fn test_extract_recipes_requires_array() {
        assert!(extract_recipes(&json!({ "recipes": {} })).is_none());
        assert!(extract_recipes(&json!({ "receitas": [] })).is_none());
    }
}
