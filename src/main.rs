//! Visa Sherpa server binary.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use visa_sherpa::adapters::ai::{OpenAIConfig, OpenAIProvider};
use visa_sherpa::adapters::extraction::{ExtractionSettings, LlmCountryExtractor};
use visa_sherpa::adapters::http::{
    intake_router, with_service_layers, IntakeAppState, ServiceLayers, SessionCookieSigner,
};
use visa_sherpa::adapters::scope::LlmScopeResponder;
use visa_sherpa::adapters::session::{spawn_idle_sweep, InMemorySessionStore};
use visa_sherpa::adapters::visa::{EstimationSettings, TableVisaResolver, VisaTable};
use visa_sherpa::application::{AnalyzeMessageHandler, AnalyzeMessageSettings};
use visa_sherpa::config::{AppConfig, ServerConfig};
use visa_sherpa::domain::intake::ImageUploadPolicy;
use visa_sherpa::ports::AIProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    if config.server.uses_default_session_secret() {
        tracing::warn!("No session secret configured, using the development key");
    }

    let table = VisaTable::load(
        &config.intake.visa_table_path,
        &config.intake.country_names_path,
    )?;
    tracing::info!(passports = table.passport_count(), "Visa table loaded");

    // Validated above.
    let api_key = config.ai.openai_api_key.clone().unwrap_or_default();
    let mut openai = OpenAIConfig::new(api_key)
        .with_model(&config.ai.text_model)
        .with_timeout(config.ai.timeout())
        .with_max_retries(config.ai.max_retries);
    if let Some(base_url) = &config.ai.base_url {
        openai = openai.with_base_url(base_url);
    }
    let provider: Arc<dyn AIProvider> = Arc::new(OpenAIProvider::new(openai)?);

    let extractor = LlmCountryExtractor::new(
        provider.clone(),
        ExtractionSettings {
            text_model: config.ai.text_model.clone(),
            vision_model: config.ai.vision_model.clone(),
            timeout: config.ai.timeout(),
            ..Default::default()
        },
    );
    let resolver = TableVisaResolver::new(
        Arc::new(table),
        provider.clone(),
        EstimationSettings {
            model: config.ai.text_model.clone(),
            timeout: config.ai.timeout(),
            ..Default::default()
        },
    );
    let responder = LlmScopeResponder::new(
        provider.clone(),
        config.ai.text_model.clone(),
        config.ai.timeout(),
    );

    let sessions = Arc::new(InMemorySessionStore::new(config.intake.max_sessions));
    let _sweeper = spawn_idle_sweep(sessions.clone(), config.intake.session_idle());

    let handler = AnalyzeMessageHandler::new(
        Arc::new(extractor),
        Arc::new(resolver),
        Arc::new(responder),
        sessions,
        AnalyzeMessageSettings {
            call_timeout: config.ai.timeout(),
        },
    );

    let image_policy = ImageUploadPolicy {
        max_bytes: config.intake.max_image_bytes,
        allowed_extensions: config.intake.allowed_extensions(),
    };
    let signer = SessionCookieSigner::new(config.server.session_secret_or_default())?
        .with_secure(config.is_production());

    let app = with_service_layers(
        intake_router(IntakeAppState::new(Arc::new(handler), image_policy), signer),
        &ServiceLayers::from_config(&config.server),
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Visa Sherpa listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins over config.
fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let json = server.is_production();

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
