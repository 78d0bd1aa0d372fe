use serde::Serialize;

use crate::food::messages::{text, Locale, Message};
use crate::food::recipe::RecipeDraft;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub whatsapp_text: String,
    pub whatsapp_url: String,
}

pub fn share_payload(recipe: &RecipeDraft, locale: Locale) -> SharePayload {
    let whatsapp_text = whatsapp_text(recipe, locale);
    SharePayload {
        title: format!("🥗 {}", recipe.name),
        text: share_text(recipe, locale),
        whatsapp_url: whatsapp_url(&whatsapp_text),
        whatsapp_text,
    }
}

pub fn share_text(recipe: &RecipeDraft, locale: Locale) -> String {
    render(recipe, locale, false)
}

/// Same content with WhatsApp `*bold*` headings.
pub fn whatsapp_text(recipe: &RecipeDraft, locale: Locale) -> String {
    render(recipe, locale, true)
}

pub fn whatsapp_url(message: &str) -> String {
    format!("https://wa.me/?text={}", urlencoding::encode(message))
}

fn render(recipe: &RecipeDraft, locale: Locale, bold: bool) -> String {
    let heading = |label: &str| if bold { format!("*{}*", label) } else { label.to_string() };
    let section = |label: &str| if bold { format!("*{}:*", label) } else { format!("{}:", label) };

    let ingredients = recipe
        .ingredients
        .iter()
        .map(|i| format!("• {}", i))
        .collect::<Vec<_>>()
        .join("\n");
    let instructions = recipe
        .instructions
        .iter()
        .enumerate()
        .map(|(n, step)| format!("{}. {}", n + 1, step))
        .collect::<Vec<_>>()
        .join("\n");

    let nutrition = match &recipe.nutrition_info {
        Some(info) => {
            let value = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());
            let per_serving = match locale {
                Locale::PtBr => "por porção",
                Locale::En => "per serving",
            };
            format!(
                "\n\n📊 {} ({}):\n• {}: {}\n• {}: {}\n• {}: {}\n• {}: {}",
                heading(text(locale, Message::ShareNutrition)),
                per_serving,
                text(locale, Message::ShareProtein),
                value(&info.protein),
                text(locale, Message::ShareCarbs),
                value(&info.carbs),
                text(locale, Message::ShareFiber),
                value(&info.fiber),
                text(locale, Message::ShareFat),
                value(&info.fat),
            )
        }
        None => String::new(),
    };

    format!(
        "🥗 {name}\n\n📋 {ingredients_label}\n{ingredients}\n\n👨‍🍳 {preparation_label}\n{instructions}\n\n\
        ⏱️ {time_label}: {prep_time} | 🔥 {calories} kcal | 🍽️ {servings} {servings_label}{nutrition}\n\n✨ {signature}",
        name = heading(recipe.name.as_str()),
        ingredients_label = section(text(locale, Message::ShareIngredients)),
        preparation_label = section(text(locale, Message::SharePreparation)),
        time_label = text(locale, Message::ShareTime),
        prep_time = recipe.prep_time,
        calories = recipe.calories,
        servings = recipe.servings,
        servings_label = text(locale, Message::ShareServings),
        signature = text(locale, Message::ShareSignature),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::recipe::{Category, NutritionInfo};

    fn sample() -> RecipeDraft {
        RecipeDraft {
            name: "Panqueca de aveia".to_string(),
            category: Category::Sweet,
            difficulty: None,
            ingredients: vec!["1 banana".to_string(), "2 colheres de aveia".to_string()],
            instructions: vec!["Amasse a banana".to_string(), "Misture e grelhe".to_string()],
            prep_time: "15 min".to_string(),
            calories: 220,
            servings: 1,
            tags: vec![],
            nutrition_info: None,
        }
    }

    #[test]
    fn test_share_text_layout() {
        let text = share_text(&sample(), Locale::PtBr);
        assert_eq!(
            text,
            "🥗 Panqueca de aveia\n\n📋 Ingredientes:\n• 1 banana\n• 2 colheres de aveia\n\n\
            👨‍🍳 Modo de Preparo:\n1. Amasse a banana\n2. Misture e grelhe\n\n\
            ⏱️ Tempo: 15 min | 🔥 220 kcal | 🍽️ 1 porções\n\n✨ Receita saudável gerada por FitChef"
        );
    }

    #[test]
    fn test_nutrition_block_fills_missing_values() {
        let mut recipe = sample();
        recipe.nutrition_info = Some(NutritionInfo {
            protein: Some("8g".to_string()),
            ..Default::default()
        });

        let text = whatsapp_text(&recipe, Locale::PtBr);
        assert_eq!(
            text,
            "🥗 *Panqueca de aveia*\n\n📋 *Ingredientes:*\n• 1 banana\n• 2 colheres de aveia\n\n\
            👨‍🍳 *Modo de Preparo:*\n1. Amasse a banana\n2. Misture e grelhe\n\n\
            ⏱️ Tempo: 15 min | 🔥 220 kcal | 🍽️ 1 porções\n\n\
            📊 *Informações Nutricionais* (por porção):\n• Proteínas: 8g\n• Carboidratos: N/A\n• Fibras: N/A\n• Gorduras: N/A\n\n\
            ✨ Receita saudável gerada por FitChef"
        );

        let text = whatsapp_text(&recipe, Locale::En);
        assert!(text.contains("📋 *Ingredients:*\n"));
        assert!(text.contains("📊 *Nutrition Facts* (per serving):\n• Protein: 8g\n• Carbs: N/A"));
    }

    #[test]
    fn test_whatsapp_url_is_percent_encoded() {
        let url = whatsapp_url("Bolo & café\nok");
        assert_eq!(url, "https://wa.me/?text=Bolo%20%26%20caf%C3%A9%0Aok");
    }
}
