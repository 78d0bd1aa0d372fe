use std::sync::Arc;

use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::food::messages::Locale;
use crate::food::parse::{dedupe_ingredients, extract_ingredients, extract_recipes, parse_model_json};
use crate::food::prompts;
use crate::food::recipe::RecipeDraft;
use crate::providers::traits::{ChatMessage, ChatProvider, ChatRequest, ImageDetail, ProviderError};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("no images provided")]
    NoImages,
    #[error("no ingredients provided")]
    NoIngredientsGiven,
    #[error("model output did not contain an ingredient list")]
    IngredientsUnreadable,
    #[error("no ingredients detected in the images")]
    NoIngredients,
    #[error("model output did not contain a recipe list")]
    RecipesUnreadable,
    #[error("model returned no valid recipes")]
    NoValidRecipes,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub ingredients: Vec<String>,
    pub recipes: Vec<RecipeDraft>,
}

/// Drives the two model calls: ingredient detection, then recipe generation.
#[derive(Clone)]
pub struct Chef {
    provider: Arc<dyn ChatProvider>,
}

impl Chef {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn ChatProvider> {
        &self.provider
    }

    pub async fn analyze(&self, images: &[String], locale: Locale) -> Result<Analysis, AnalysisError> {
        if images.is_empty() {
            return Err(AnalysisError::NoImages);
        }
        self.provider.check_credentials()?;
        info!("Analyzing {} image(s) with {}", images.len(), self.provider.model());

        let vision = self
            .provider
            .complete(ChatRequest {
                messages: vec![ChatMessage::user_with_images(
                    prompts::vision_prompt(locale),
                    images,
                    Some(ImageDetail::High),
                )],
                max_tokens: 1500,
                temperature: 0.3,
            })
            .await?;

        let ingredients = parse_model_json(&vision)
            .and_then(|value| extract_ingredients(&value))
            .ok_or(AnalysisError::IngredientsUnreadable)?;

        if ingredients.is_empty() {
            return Err(AnalysisError::NoIngredients);
        }
        info!("Detected {} ingredient(s)", ingredients.len());

        let generated = self
            .provider
            .complete(ChatRequest {
                messages: vec![
                    ChatMessage::system(prompts::healthy_chef_system_prompt()),
                    ChatMessage::user(prompts::healthy_recipes_prompt(&ingredients, locale)),
                ],
                max_tokens: 4500,
                temperature: 0.8,
            })
            .await?;

        let recipes = parse_model_json(&generated)
            .and_then(|value| extract_recipes(&value))
            .ok_or(AnalysisError::RecipesUnreadable)?;

        if recipes.is_empty() {
            return Err(AnalysisError::NoValidRecipes);
        }
        info!("Generated {} recipe(s)", recipes.len());

        Ok(Analysis { ingredients, recipes })
    }

    /// Single-call ingredient detection used by the multipart upload path.
    pub async fn detect_ingredients(&self, images: &[String], locale: Locale) -> Result<Vec<String>, AnalysisError> {
        if images.is_empty() {
            return Err(AnalysisError::NoImages);
        }
        self.provider.check_credentials()?;

        let content = self
            .provider
            .complete(ChatRequest {
                messages: vec![
                    ChatMessage::system(prompts::simple_vision_system_prompt(locale)),
                    ChatMessage::user_with_images(prompts::simple_vision_prompt(), images, None),
                ],
                max_tokens: 1000,
                temperature: 0.3,
            })
            .await?;

        let ingredients = parse_model_json(&content)
            .and_then(|value| extract_ingredients(&value))
            .ok_or(AnalysisError::IngredientsUnreadable)?;

        Ok(dedupe_ingredients(ingredients))
    }

    /// Recipe generation from an ingredient list the caller already has.
    pub async fn suggest_recipes(&self, ingredients: &[String], locale: Locale) -> Result<Vec<RecipeDraft>, AnalysisError> {
        let ingredients: Vec<String> = ingredients
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();
        if ingredients.is_empty() {
            return Err(AnalysisError::NoIngredientsGiven);
        }
        self.provider.check_credentials()?;

        let content = self
            .provider
            .complete(ChatRequest {
                messages: vec![
                    ChatMessage::system(prompts::simple_chef_system_prompt()),
                    ChatMessage::user(prompts::simple_recipes_prompt(&ingredients, locale)),
                ],
                max_tokens: 2000,
                temperature: 0.8,
            })
            .await?;

        parse_model_json(&content)
            .and_then(|value| extract_recipes(&value))
            .ok_or(AnalysisError::RecipesUnreadable)
    }
}
