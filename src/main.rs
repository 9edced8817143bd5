use std::sync::Arc;

use intake_assist::cli;
use intake_assist::config::IntakeConfig;
use intake_assist::service::HttpSurveyService;
use intake_assist::session::InterviewController;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = IntakeConfig::from_env();

    eprintln!("🤖 Intake Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", config.api_base);
    eprintln!("   Enter로 상담 시작, /reset 처음부터, /quit 종료.\n");

    let service = Arc::new(HttpSurveyService::new(config.api_base.clone()));
    let controller = InterviewController::new(config, service)
        .with_caption_sink(Arc::new(|caption| eprintln!("⏳ {caption}")));

    cli::run(controller).await?;
    Ok(())
}
