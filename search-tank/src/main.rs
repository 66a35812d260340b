use clap::Parser;
use tracing::error;

use search_tank::cli::{self, Cli};
use search_tank::logging::init_tracing;
use search_tank::Dependencies;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let result = match Dependencies::new(cli.api_url.clone()) {
        Ok(dependencies) => cli::run(cli, &dependencies.client).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        eprintln!("Error: {}", e);

        for cause in e.chain().skip(1) {
            eprintln!("  Caused by: {}", cause);
        }
        std::process::exit(1);
    }
}
