use anyhow::{anyhow, Context};
use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use log::{info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use fitchef::api::{self, error::ApiError};
use fitchef::config::AppConfig;
use fitchef::database::open_store;
use fitchef::food::images::to_data_url;
use fitchef::food::{Analysis, Chef, Locale, RecipeDraft};
use fitchef::providers::{ChatProvider, OpenAIProvider};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Turns food photos into healthy recipe ideas", long_about = None)]
struct Args {
    /// Serve the HTTP API instead of analyzing files
    #[arg(long)]
    api: bool,

    #[arg(long, default_value = "3000")]
    port: u16,

    /// Report whether an OpenAI key is configured and test it against the API
    #[arg(long)]
    check_key: bool,

    /// Response language (pt-BR or en)
    #[arg(long)]
    locale: Option<String>,

    /// Photos to analyze
    images: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    colored::control::set_override(true);

    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(tag) = &args.locale {
        config.locale = Locale::from_tag(tag).ok_or_else(|| anyhow!("Unsupported locale: {}", tag))?;
    }

    if args.api {
        run_api_server(&args, config).await
    } else {
        run_cli_mode(&args, config).await
    }
}

async fn run_api_server(args: &Args, config: AppConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting API server on {}", addr);

    let provider = OpenAIProvider::new(&config.provider);
    if !provider.has_key() {
        warn!("OPENAI_API_KEY is not set; analysis endpoints will answer with a configuration error");
    }

    let store = open_store(&config.store)
        .await
        .context("Failed to open recipe store")?;

    let chef = Chef::new(Arc::new(provider));
    let app = api::create_api(chef, store, config);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Server successfully bound to {}", addr);
    info!("Ready to accept connections!");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

async fn run_cli_mode(args: &Args, config: AppConfig) -> anyhow::Result<()> {
    let provider = Arc::new(OpenAIProvider::new(&config.provider));

    if args.check_key {
        return check_key(provider.as_ref(), &config).await;
    }

    if args.images.is_empty() {
        println!("{}", "Usage: fitchef <photo>... | fitchef --api [--port N] | fitchef --check-key".yellow());
        return Ok(());
    }

    let mut images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let data_url = to_data_url(&bytes, None, config.max_image_bytes)
            .with_context(|| format!("Cannot use {}", path.display()))?;
        images.push(data_url);
    }

    println!("{}", format!("📸 Analyzing {} photo(s)...", images.len()).cyan());

    let chef = Chef::new(provider);
    match chef.analyze(&images, config.locale).await {
        Ok(analysis) => {
            print_analysis(&analysis);
            Ok(())
        }
        Err(e) => {
            let error = ApiError::from_analysis(e, config.locale);
            println!("{}", error.body.display().red());
            Err(anyhow!("analysis failed with status {}", error.status))
        }
    }
}

async fn check_key(provider: &OpenAIProvider, config: &AppConfig) -> anyhow::Result<()> {
    if let Err(e) = provider.check_credentials() {
        println!("{} {}", "✗".red(), e);
        return Ok(());
    }
    println!("{} OPENAI_API_KEY is configured (model {})", "✓".green(), provider.model());

    let key = config.provider.api_key.as_deref().unwrap_or_default();
    match provider.validate_key(key).await {
        Ok(()) => println!("{} Key accepted by {}", "✓".green(), config.provider.api_url),
        Err(e) => println!("{} Key rejected: {}", "✗".red(), e),
    }
    Ok(())
}

fn print_analysis(analysis: &Analysis) {
    println!("\n{}", "🥕 Ingredients".bold().green());
    for ingredient in &analysis.ingredients {
        println!("  • {}", ingredient);
    }

    for (n, recipe) in analysis.recipes.iter().enumerate() {
        print_recipe(n + 1, recipe);
    }
}

fn print_recipe(n: usize, recipe: &RecipeDraft) {
    let category = serde_json::to_value(recipe.category)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    println!("\n{} {}", format!("{}.", n).bold(), recipe.name.bold().yellow());
    println!(
        "   {} · {} · {} kcal · {}x",
        category.cyan(),
        recipe.prep_time,
        recipe.calories,
        recipe.servings
    );
    if !recipe.tags.is_empty() {
        println!("   {}", recipe.tags.join(", ").dimmed());
    }
    for ingredient in &recipe.ingredients {
        println!("   • {}", ingredient);
    }
    for (step, instruction) in recipe.instructions.iter().enumerate() {
        println!("   {}. {}", step + 1, instruction);
    }
}
