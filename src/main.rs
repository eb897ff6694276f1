use clap::Parser;
use nestegg::cli::{Cli, Command, run_allocate, run_project};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Serve(args) => nestegg::api::run_http_server(args.into())
            .await
            .map_err(|e| format!("Server error: {e}")),
        Command::Allocate(args) => run_allocate(args).map(|json| println!("{json}")),
        Command::Project(args) => run_project(args).map(|json| println!("{json}")),
    };

    if let Err(e) = outcome {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
