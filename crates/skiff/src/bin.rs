use skiff::cli::{commands, parse_cli};
use skiff_utils::logging::{self, prelude::*};

#[tokio::main]
async fn main() {
    let cli = parse_cli();

    // Settings may fail to load before `run` configures the logger.
    if let Err(e) = logging::init("info") {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = commands::run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
