use clap::Parser;
use favicon_app::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = favicon_app::run(cli).await {
        eprintln!("favicon-fetcher error: {:#}", err);
        std::process::exit(1);
    }
}
