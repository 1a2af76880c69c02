use callsync::cli::{handle_completions, handle_config_init, Cli, Commands, ConfigCommands};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => callsync::cli::serve::run_serve(args).await,
        Commands::Sync(args) => match callsync::cli::sync::run_sync(args).await {
            Ok(output) => {
                println!("{}", output);
                Ok(())
            }
            Err(e) => Err(e),
        },
        Commands::Relink(args) => match callsync::cli::sync::run_relink(args).await {
            Ok(output) => {
                println!("{}", output);
                Ok(())
            }
            Err(e) => Err(e),
        },
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Init(args) => {
                handle_config_init(&args).map_err(|e| anyhow::anyhow!(e.to_string()))
            }
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
