use clap::Parser;

use tagsmith::cli::{Cli, Commands};
use tagsmith::config::Config;
use tagsmith::{cli, server};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let args = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    match args.command {
        None | Some(Commands::Serve) => server::run(config).await,
        Some(Commands::Annotate { paths, out }) => {
            if let Err(e) = cli::handle_annotate(&config, &paths, &out).await {
                eprintln!("{}", e);
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
