use color_eyre::eyre::Result;

use questweaver::{GameConfig, app::App, headless, logging};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    if let Err(err) = logging::init() {
        eprintln!("Failed to initialize logging: {err}");
    }
    log::info!("questweaver start: {}", chrono::Local::now());

    let config = match GameConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if std::env::args().any(|arg| arg == "--headless") {
        return headless::run(config).await;
    }

    let mut app = App::new(config);
    app.run().await
}
