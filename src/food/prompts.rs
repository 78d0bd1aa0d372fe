use crate::food::messages::Locale;

pub fn vision_prompt(locale: Locale) -> String {
    format!(
        "Analyze the provided images and identify ALL visible foods/ingredients with professional precision.\n\n\
        Return ONLY valid JSON (no markdown, no explanations) in this format:\n\
        {{\n  \"ingredients\": [\"ingredient1\", \"ingredient2\", ...]\n}}\n\n\
        Important rules:\n\
        - Be specific and detailed (e.g. \"ripe tomato\", \"diced chicken\", \"mozzarella cheese\")\n\
        - List EVERY visible food, even small ones\n\
        - Identify the state/preparation when relevant (raw, cooked, chopped, etc)\n\
        - Include visible seasonings and condiments\n\
        - When in doubt, include it as a possibility\n\
        - Return AT LEAST 3 ingredients\n\
        - Write the ingredient names in {}",
        locale.language_name()
    )
}

pub fn simple_vision_system_prompt(locale: Locale) -> String {
    format!(
        "You are a food identification expert. Analyze the provided images and identify ALL visible foods. \
        Return ONLY a JSON list with the ingredient names in {}, without further explanation.",
        locale.language_name()
    )
}

pub fn simple_vision_prompt() -> String {
    "Identify all foods and ingredients visible in these images. List each ingredient clearly and specifically. \
    Return ONLY a JSON in the format: {\"ingredients\": [\"ingredient1\", \"ingredient2\", ...]}"
        .to_string()
}

pub fn healthy_chef_system_prompt() -> String {
    "You are a renowned chef specialized in creating HEALTHY, nutritious and balanced recipes.\n\
    Your recipes must be:\n\
    - HEALTHY and NUTRITIOUS (top priority)\n\
    - Low in refined sugar, saturated fat and sodium\n\
    - Rich in nutrients, fiber, vitamins and minerals\n\
    - Balanced in macronutrients (protein, complex carbs, good fats)\n\
    - Easy to follow for ordinary people\n\
    - Tasty, creative but realistic\n\
    - With clear, objective instructions and accurate nutrition information\n\n\
    AVOID: deep frying, excess sugar, refined flour, ultra-processed foods\n\
    PREFER: baked, grilled, steamed, whole and natural ingredients\n\n\
    ALWAYS return valid JSON without markdown."
        .to_string()
}

pub fn healthy_recipes_prompt(ingredients: &[String], locale: Locale) -> String {
    format!(
        "Based on these detected ingredients: {ingredients}\n\n\
        Create 4 HEALTHY, VARIED and NUTRITIOUS recipes (including sweet AND savory options when the ingredients allow).\n\n\
        Return ONLY valid JSON (no markdown, no explanations) in this format:\n\
        {{\n\
          \"recipes\": [\n\
            {{\n\
              \"name\": \"Appealing Healthy Recipe Name\",\n\
              \"type\": \"doce\" or \"salgado\",\n\
              \"difficulty\": \"fácil\" or \"médio\" or \"difícil\",\n\
              \"ingredients\": [\"ingredient with precise quantity\", ...],\n\
              \"instructions\": [\"detailed step 1\", \"detailed step 2\", ...],\n\
              \"prepTime\": \"time in minutes (e.g. 30 min)\",\n\
              \"calories\": approximate calories per serving as a number,\n\
              \"servings\": number of servings,\n\
              \"tags\": [\"tag1\", \"tag2\", \"tag3\"],\n\
              \"nutritionInfo\": {{\n\
                \"protein\": \"grams of protein\",\n\
                \"carbs\": \"grams of carbohydrates\",\n\
                \"fiber\": \"grams of fiber\",\n\
                \"fat\": \"grams of fat\"\n\
              }}\n\
            }}\n\
          ]\n\
        }}\n\n\
        CRITICAL rules:\n\
        1. ALL recipes must be HEALTHY and NUTRITIOUS\n\
        2. PRIORITIZE the detected ingredients as the main base\n\
        3. Replace unhealthy ingredients with healthy versions (e.g. sugar -> honey/dates, white flour -> whole wheat/oats)\n\
        4. Avoid frying - prefer baked, grilled, stewed\n\
        5. Be CREATIVE with healthy, tasty combinations\n\
        6. Estimate calories REALISTICALLY (consider all ingredients)\n\
        7. Include at least 1 healthy sweet recipe and 2-3 savory ones (if the ingredients allow)\n\
        8. Vary the difficulty: at least 2 easy, 1 medium\n\
        9. Tags should include benefits such as \"healthy\", \"high-protein\", \"low-carb\", \"high-fiber\", \"antioxidant\", \"vegetarian\"\n\
        10. Instructions must be CLEAR and DETAILED (at least 5 steps)\n\
        11. Recipe names must be APPEALING and highlight the healthy aspect\n\
        12. Each recipe must be UNIQUE and DIFFERENT from the others\n\
        13. MANDATORY: return exactly 4 recipes\n\
        14. Include detailed nutrition information (protein, carbs, fiber, fat)\n\
        15. Write all text in {language}, but keep the \"type\" and \"difficulty\" values exactly as listed above",
        ingredients = ingredients.join(", "),
        language = locale.language_name()
    )
}

pub fn simple_chef_system_prompt() -> String {
    "You are an expert chef who creates practical and delicious recipes. Always answer with valid JSON.".to_string()
}

pub fn simple_recipes_prompt(ingredients: &[String], locale: Locale) -> String {
    format!(
        "You are an expert chef. Using the following available ingredients, create 3 practical and delicious recipes:\n\n\
        Available ingredients: {ingredients}\n\n\
        IMPORTANT:\n\
        - Create recipes that use MAINLY the provided ingredients\n\
        - You may add common basics (salt, pepper, water, oil)\n\
        - Be creative and practical\n\
        - Mix sweet and savory recipes when possible\n\
        - Write all text in {language}\n\n\
        Return ONLY valid JSON in the following format (no markdown, no explanations):\n\
        {{\n\
          \"recipes\": [\n\
            {{\n\
              \"name\": \"Recipe Name\",\n\
              \"type\": \"doce\" or \"salgado\",\n\
              \"ingredients\": [\"ingredient 1 with quantity\", \"ingredient 2 with quantity\"],\n\
              \"instructions\": [\"step 1\", \"step 2\", \"step 3\"],\n\
              \"prepTime\": \"time in minutes (e.g. 30 min)\",\n\
              \"calories\": approximate calories as a number,\n\
              \"servings\": number of servings\n\
            }}\n\
          ]\n\
        }}",
        ingredients = ingredients.join(", "),
        language = locale.language_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_prompt_lists_ingredients_and_language() {
        let ingredients = vec!["tomate".to_string(), "ovo".to_string()];
        let prompt = healthy_recipes_prompt(&ingredients, Locale::PtBr);
        assert!(prompt.contains("Based on these detected ingredients: tomate, ovo"));
        assert!(prompt.contains("Brazilian Portuguese"));
        assert!(prompt.contains("exactly 4 recipes"));

        let simple = simple_recipes_prompt(&ingredients, Locale::En);
        assert!(simple.contains("Available ingredients: tomate, ovo"));
        assert!(simple.contains("in English"));
    }
}
