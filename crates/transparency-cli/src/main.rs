//! transparency CLI: manage projects, members and scores, and view dashboards.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use transparency_store::{load_config_from, OutputFormat};

mod commands;

#[derive(Parser)]
#[command(
    name = "transparency",
    version,
    about = "Weighted project health scores and timelines"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and example seed file
    Init,

    /// Load seed data into an empty store
    Seed {
        /// Seed TOML file (defaults to the built-in demo data)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Validate a seed TOML file
    Validate {
        /// Path to the seed file
        #[arg(long)]
        seed: PathBuf,
    },

    /// List projects, newest first
    Projects {
        /// Output format: text, json, markdown
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// Create a project
    CreateProject {
        #[arg(long)]
        name: String,

        /// Link to the project's document
        #[arg(long)]
        document_url: String,
    },

    /// Show a project and its members
    ShowProject {
        #[arg(long)]
        project: u64,

        /// Output format: text, json, markdown
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// List a project's members with their latest scores
    Members {
        #[arg(long)]
        project: u64,

        /// Output format: text, json, markdown
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// Add a member to a project
    AddMember {
        #[arg(long)]
        project: u64,

        #[arg(long)]
        name: String,

        /// Role: PL, PM or Member
        #[arg(long)]
        role: String,

        #[arg(long)]
        email: Option<String>,
    },

    /// Submit a score (0-100) for a member
    SubmitScore {
        #[arg(long)]
        member: u64,

        #[arg(long, allow_negative_numbers = true)]
        score: f64,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Show a member's score history, oldest first
    Scores {
        #[arg(long)]
        member: u64,

        /// Output format: text, json, markdown
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// Show a project's dashboard
    Dashboard {
        #[arg(long)]
        project: u64,

        /// Output format: text, json, markdown
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Also save the dashboard as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Render a dashboard previously saved with `dashboard --output`
    Render {
        /// Saved dashboard JSON
        #[arg(long)]
        input: PathBuf,

        /// Output format: text, json, markdown
        #[arg(long)]
        format: Option<OutputFormat>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("transparency={}", config.log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let format = |f: Option<OutputFormat>| f.unwrap_or(config.default_format);

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Seed { file } => commands::seed::execute(&config, file).await,
        Commands::Validate { seed } => commands::validate::execute(seed),
        Commands::Projects { format: f } => commands::projects::list(&config, format(f)).await,
        Commands::CreateProject { name, document_url } => {
            commands::projects::create(&config, name, document_url).await
        }
        Commands::ShowProject { project, format: f } => {
            commands::projects::show(&config, project, format(f)).await
        }
        Commands::Members { project, format: f } => {
            commands::members::list(&config, project, format(f)).await
        }
        Commands::AddMember {
            project,
            name,
            role,
            email,
        } => commands::members::add(&config, project, name, role, email).await,
        Commands::SubmitScore {
            member,
            score,
            comment,
        } => commands::scores::submit(&config, member, score, comment).await,
        Commands::Scores { member, format: f } => {
            commands::scores::list(&config, member, format(f)).await
        }
        Commands::Dashboard {
            project,
            format: f,
            output,
        } => commands::dashboard::execute(&config, project, format(f), output).await,
        Commands::Render { input, format: f } => commands::dashboard::render(input, format(f)),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
