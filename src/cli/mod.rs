pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "timetracker-api")]
#[command(about = "Time tracking, time boxing and notes API server")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to bind, overrides API_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Mint a development token signed with SECURITY_JWT_SECRET")]
    Token {
        #[arg(long, help = "Subject (user id) to embed")]
        sub: String,
        #[arg(long, help = "Optional email claim")]
        email: Option<String>,
    },

    #[command(about = "Probe storage connectivity")]
    Health,
}

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config();

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(config, port).await,
        Commands::Migrate => commands::database::migrate(config).await,
        Commands::Token { sub, email } => commands::token::handle(config, sub, email, output_format),
        Commands::Health => commands::database::health(config, output_format).await,
    }
}
