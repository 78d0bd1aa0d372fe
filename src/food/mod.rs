pub mod analysis;
pub mod images;
pub mod messages;
pub mod parse;
pub mod prompts;
pub mod recipe;
pub mod share;

// Re-export common types
pub use analysis::{Analysis, AnalysisError, Chef};
pub use messages::Locale;
pub use recipe::{Category, Difficulty, NewRecipe, NutritionInfo, Recipe, RecipeDraft};
