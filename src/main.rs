use log::*;
use service::{config::Config, logging::Logger};

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
        std::process::exit(1);
    }

    info!("Starting up chat hub...");

    let app_state = web::AppState::new(config);

    if let Err(e) = web::init_server(app_state).await {
        error!("Chat hub server stopped: {e}");
        std::process::exit(1);
    }
}
