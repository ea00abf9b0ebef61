use clap::{Parser, Subcommand};
use studyboard_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod render;
mod session;

#[derive(Parser)]
#[command(name = "studyboard", version, about = "Studyboard CLI")]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Subject management
    Subject {
        #[command(subcommand)]
        action: commands::subject::SubjectAction,
    },
    /// Run the focus timer for a subject until Enter is pressed
    Focus {
        /// Subject ID
        id: String,
    },
    /// Dashboard statistics
    Stats,
    /// Backup export and import
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let configured = Config::load_or_default().log.level;
    let filter = EnvFilter::try_from_env("STUDYBOARD_LOG")
        .or_else(|_| EnvFilter::try_new(&configured))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Subject { action } => commands::subject::run(action, cli.json),
        Commands::Focus { id } => commands::focus::run(&id, cli.json),
        Commands::Stats => commands::stats::run(cli.json),
        Commands::Data { action } => commands::data::run(action, cli.json),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
