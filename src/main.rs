mod config;
mod error;
mod handlers;
mod models;
mod server;
mod services;

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;

use config::Config;
use handlers::AnalysisPipeline;
use server::create_router;
use services::{GeminiService, ModelLoader, TextGenerator};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before the logger reads RUST_LOG
    dotenv().ok();

    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("🚀 Starting food image analyzer...");

    let config = Config::from_env()?;

    log::info!("⏳ Loading Model, Please Wait");
    let loader = ModelLoader::hugging_face(config.classifier.clone());
    let classifier = loader.load_classifier().await?;
    log::info!("✅ Classifier ready: {}", config.classifier.model);

    let gemini = GeminiService::new(&config.gemini)?;
    log::info!("✅ Gemini service initialized with model: {}", gemini.model());
    let generator = Arc::new(gemini) as Arc<dyn TextGenerator>;

    std::fs::create_dir_all(&config.upload_tmp_dir)?;
    let pipeline = Arc::new(AnalysisPipeline::new(
        classifier,
        generator,
        config.upload_tmp_dir.clone(),
    ));
    log::info!("✅ Analysis pipeline initialized");

    let app = create_router(pipeline, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("🌐 Server listening on http://{}", config.bind_addr);
    println!("\n📸 Open http://{} and upload a food photo", config.bind_addr);
    println!("🛑 Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("❌ Failed to listen for Ctrl+C: {}", e);
            }
        })
        .await?;

    log::info!("🛑 Shutting down...");

    Ok(())
}
