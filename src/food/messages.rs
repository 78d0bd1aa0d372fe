use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    PtBr,
    En,
}

impl Locale {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_lowercase();
        if tag.starts_with("pt") {
            Some(Locale::PtBr)
        } else if tag.starts_with("en") {
            Some(Locale::En)
        } else {
            None
        }
    }

    /// First supported language of an `Accept-Language` header, ignoring weights.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        header
            .split(',')
            .filter_map(|entry| entry.split(';').next())
            .find_map(Locale::from_tag)
    }

    /// Language name used inside model prompts.
    pub fn language_name(self) -> &'static str {
        match self {
            Locale::PtBr => "Brazilian Portuguese",
            Locale::En => "English",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    NoImages,
    NoIngredientsGiven,
    KeyMissing,
    KeyMissingDetails,
    KeyFormat,
    KeyFormatDetails,
    KeyInvalid,
    KeyInvalidDetails,
    RateLimited,
    RateLimitedDetails,
    AccessDenied,
    AccessDeniedDetails,
    IngredientsUnreadable,
    NoIngredientsDetected,
    RecipesUnreadable,
    NoValidRecipes,
    ProcessingFailed,
    UnknownError,
    LegacyKeyMissing,
    LegacyAnalyzeFailed,
    LegacyGenerateFailed,
    LegacyImagesInternal,
    LegacyRecipesInternal,
    KeyTestBadFormat,
    KeyTestInvalid,
    KeyTestFailed,
    KeyTestOk,
    ImageRejected,
    ImageTooLarge,
    InvalidRequest,
    RecipeNotFound,
    StorageFailed,
    Healthy,
    ShareIngredients,
    SharePreparation,
    ShareTime,
    ShareServings,
    ShareNutrition,
    ShareProtein,
    ShareCarbs,
    ShareFiber,
    ShareFat,
    ShareSignature,
}

pub fn text(locale: Locale, message: Message) -> &'static str {
    use Message::*;
    match locale {
        Locale::PtBr => match message {
            NoImages => "Nenhuma imagem fornecida",
            NoIngredientsGiven => "Nenhum ingrediente fornecido",
            KeyMissing => "Chave da API OpenAI não configurada.",
            KeyMissingDetails => "Configure a variável OPENAI_API_KEY nas configurações do projeto.",
            KeyFormat => "Chave da API OpenAI com formato inválido.",
            KeyFormatDetails => "A chave deve começar com 'sk-'. Verifique se copiou corretamente.",
            KeyInvalid => "Chave da API OpenAI inválida ou expirada.",
            KeyInvalidDetails => "Sua chave OPENAI_API_KEY não está funcionando. Possíveis causas: 1) Chave expirada, 2) Chave incorreta, 3) Sem créditos na conta OpenAI. Gere uma nova chave em https://platform.openai.com/api-keys",
            RateLimited => "Limite de requisições atingido",
            RateLimitedDetails => "Você atingiu o limite de uso da API OpenAI. Isso pode acontecer por:\n\n1. Limite de requisições por minuto excedido (aguarde 1 minuto)\n2. Cota mensal esgotada (verifique seu plano)\n3. Saldo de créditos insuficiente\n\nSoluções:\n• Aguarde alguns instantes e tente novamente\n• Verifique seu uso em: https://platform.openai.com/usage\n• Adicione créditos em: https://platform.openai.com/account/billing",
            AccessDenied => "Acesso negado pela OpenAI.",
            AccessDeniedDetails => "Sua conta OpenAI pode estar com problemas de pagamento ou restrições. Verifique em https://platform.openai.com/account/billing",
            IngredientsUnreadable => "Não foi possível identificar ingredientes nas imagens. Tente com fotos mais claras.",
            NoIngredientsDetected => "Nenhum ingrediente foi detectado nas imagens. Tente fotografar os alimentos mais de perto.",
            RecipesUnreadable => "Erro ao gerar receitas. Tente novamente.",
            NoValidRecipes => "Não foi possível gerar receitas válidas. Tente novamente.",
            ProcessingFailed => "Erro ao processar as imagens.",
            UnknownError => "Erro desconhecido. Tente novamente.",
            LegacyKeyMissing => "Chave da OpenAI não configurada. Configure nas variáveis de ambiente.",
            LegacyAnalyzeFailed => "Erro ao analisar imagens. Verifique sua chave da OpenAI.",
            LegacyGenerateFailed => "Erro ao gerar receitas. Verifique sua chave da OpenAI.",
            LegacyImagesInternal => "Erro interno ao processar imagens",
            LegacyRecipesInternal => "Erro interno ao processar receitas",
            KeyTestBadFormat => "Chave API inválida. Deve começar com 'sk-'",
            KeyTestInvalid => "Chave API inválida ou expirada",
            KeyTestFailed => "Erro ao validar chave API",
            KeyTestOk => "Chave API validada com sucesso!",
            ImageRejected => "Alguns arquivos foram ignorados.",
            ImageTooLarge => "Imagem muito grande.",
            InvalidRequest => "Requisição inválida.",
            RecipeNotFound => "Receita não encontrada.",
            StorageFailed => "Erro ao acessar as receitas salvas. Tente novamente.",
            Healthy => "Servidor em funcionamento",
            ShareIngredients => "Ingredientes",
            SharePreparation => "Modo de Preparo",
            ShareTime => "Tempo",
            ShareServings => "porções",
            ShareNutrition => "Informações Nutricionais",
            ShareProtein => "Proteínas",
            ShareCarbs => "Carboidratos",
            ShareFiber => "Fibras",
            ShareFat => "Gorduras",
            ShareSignature => "Receita saudável gerada por FitChef",
        },
        Locale::En => match message {
            NoImages => "No images provided",
            NoIngredientsGiven => "No ingredients provided",
            KeyMissing => "OpenAI API key is not configured.",
            KeyMissingDetails => "Set the OPENAI_API_KEY variable in the project settings.",
            KeyFormat => "OpenAI API key has an invalid format.",
            KeyFormatDetails => "The key must start with 'sk-'. Check that it was copied correctly.",
            KeyInvalid => "OpenAI API key is invalid or expired.",
            KeyInvalidDetails => "Your OPENAI_API_KEY is not working. Possible causes: 1) expired key, 2) wrong key, 3) no credits on the OpenAI account. Create a new key at https://platform.openai.com/api-keys",
            RateLimited => "Rate limit reached",
            RateLimitedDetails => "You hit the OpenAI API usage limit. This can happen because:\n\n1. Requests per minute exceeded (wait a minute)\n2. Monthly quota used up (check your plan)\n3. Not enough credit balance\n\nWhat to do:\n• Wait a moment and try again\n• Check your usage at: https://platform.openai.com/usage\n• Add credits at: https://platform.openai.com/account/billing",
            AccessDenied => "Access denied by OpenAI.",
            AccessDeniedDetails => "Your OpenAI account may have billing problems or restrictions. Check https://platform.openai.com/account/billing",
            IngredientsUnreadable => "Could not identify ingredients in the images. Try clearer photos.",
            NoIngredientsDetected => "No ingredients were detected in the images. Try photographing the food up close.",
            RecipesUnreadable => "Failed to generate recipes. Please try again.",
            NoValidRecipes => "Could not generate valid recipes. Please try again.",
            ProcessingFailed => "Failed to process the images.",
            UnknownError => "Unknown error. Please try again.",
            LegacyKeyMissing => "OpenAI key is not configured. Set it in the environment variables.",
            LegacyAnalyzeFailed => "Failed to analyze images. Check your OpenAI key.",
            LegacyGenerateFailed => "Failed to generate recipes. Check your OpenAI key.",
            LegacyImagesInternal => "Internal error while processing images",
            LegacyRecipesInternal => "Internal error while processing recipes",
            KeyTestBadFormat => "Invalid API key. It must start with 'sk-'",
            KeyTestInvalid => "API key is invalid or expired",
            KeyTestFailed => "Failed to validate API key",
            KeyTestOk => "API key validated successfully!",
            ImageRejected => "Some files were ignored.",
            ImageTooLarge => "Image too large.",
            InvalidRequest => "Invalid request.",
            RecipeNotFound => "Recipe not found.",
            StorageFailed => "Failed to access saved recipes. Please try again.",
            Healthy => "Server is running and healthy",
            ShareIngredients => "Ingredients",
            SharePreparation => "Preparation",
            ShareTime => "Time",
            ShareServings => "servings",
            ShareNutrition => "Nutrition Facts",
            ShareProtein => "Protein",
            ShareCarbs => "Carbs",
            ShareFiber => "Fiber",
            ShareFat => "Fat",
            ShareSignature => "Healthy recipe generated by FitChef",
        },
    }
}

/// Upload hint naming the configured per-image limit.
pub fn image_limit_hint(locale: Locale, max_bytes: usize) -> String {
    let size = format_size(max_bytes);
    match locale {
        Locale::PtBr => format!("Use apenas imagens menores que {}.", size),
        Locale::En => format!("Use only images smaller than {}.", size),
    }
}

fn format_size(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// The `{error, details?}` body every failing endpoint answers with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(locale: Locale, error: Message) -> Self {
        Self {
            error: text(locale, error).to_string(),
            details: None,
        }
    }

    pub fn with_details(locale: Locale, error: Message, details: Message) -> Self {
        Self {
            error: text(locale, error).to_string(),
            details: Some(text(locale, details).to_string()),
        }
    }

    /// Client-side rendering of the pair, as the UI shows it.
    pub fn display(&self) -> String {
        match &self.details {
            Some(details) => format!("{}\n\n{}", self.error, details),
            None => self.error.clone(),
        }
    }
}
