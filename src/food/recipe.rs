use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "doce", alias = "sweet")]
    Sweet,
    #[serde(rename = "salgado", alias = "savory", alias = "savoury")]
    Savory,
}

impl Category {
    /// Case- and accent-insensitive match on the values models tend to emit.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "doce" | "sweet" => Some(Category::Sweet),
            "salgado" | "salgada" | "savory" | "savoury" => Some(Category::Savory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "fácil", alias = "facil", alias = "easy")]
    Easy,
    #[serde(rename = "médio", alias = "medio", alias = "medium")]
    Medium,
    #[serde(rename = "difícil", alias = "dificil", alias = "hard")]
    Hard,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "fácil" | "facil" | "easy" => Some(Difficulty::Easy),
            "médio" | "medio" | "média" | "media" | "medium" => Some(Difficulty::Medium),
            "difícil" | "dificil" | "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<String>,
}

/// A recipe as generated or submitted, before the store assigns identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RecipeDraft {
    #[validate(length(min = 1, max = 300))]
    pub name: String,
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[validate(length(min = 1))]
    pub ingredients: Vec<String>,
    #[validate(length(min = 1))]
    pub instructions: Vec<String>,
    #[serde(default, alias = "prepTime", deserialize_with = "null_as_default")]
    pub prep_time: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub calories: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub servings: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, alias = "nutritionInfo", skip_serializing_if = "Option::is_none")]
    pub nutrition_info: Option<NutritionInfo>,
}

/// Insert payload for the recipe store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRecipe {
    pub user_id: String,
    #[serde(flatten)]
    pub draft: RecipeDraft,
    pub images: Vec<String>,
    pub detected_ingredients: Vec<String>,
}

/// A saved recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub draft: RecipeDraft,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub detected_ingredients: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Accepts `350`, `350.7`, `"350"` and `"350 kcal"`; anything else is 0.
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_u32(&value))
}

pub fn coerce_u32(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .map(|n| n.min(u32::MAX as u64) as u32)
            .unwrap_or(0),
        Value::String(s) => {
            let digits: String = s
                .trim()
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().unwrap_or(0)
        }
        _ => 0,
    }
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
