use clap::Parser;
use lifeline::cli::{
    handle_completions, handle_config_check, handle_config_init, predict, simulate, Cli, Commands,
    ConfigCommands,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => lifeline::cli::serve::run_serve(args).await,
        Commands::Predict(args) => predict::handle_predict(&args).await.map(|output| {
            println!("{}", output);
        }),
        Commands::Simulate(args) => simulate::handle_simulate(&args).map(|output| {
            println!("{}", output);
        }),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
            ConfigCommands::Check(args) => handle_config_check(&args),
        }
        .map(|output| println!("{}", output)),
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
