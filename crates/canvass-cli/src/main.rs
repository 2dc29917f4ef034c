//! Canvass CLI — command-line interface for the interview form platform.
//!
//! Reuses the same core domain logic (canvass-core) and server bootstrap
//! (canvass-server) that power the HTTP API.

mod commands;

use clap::{Parser, Subcommand};

/// Canvass CLI — conversational interview form platform
#[derive(Parser)]
#[command(
    name = "canvass",
    version,
    about = "Canvass CLI — conversational interview form platform"
)]
pub struct Cli {
    /// Path to the SQLite database file
    #[arg(long, env = "CANVASS_DB_PATH", default_value = "canvass.db")]
    db: String,

    /// User id that owns records created from the CLI
    #[arg(long, env = "CANVASS_USER_ID", default_value = "local")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Canvass HTTP backend server
    Server {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on
        #[arg(long, default_value_t = 3310)]
        port: u16,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Manage forms
    Form {
        #[command(subcommand)]
        action: FormAction,
    },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// List projects
    List,
    /// Create a new project
    Create {
        /// Project name
        #[arg(long)]
        name: String,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
enum FormAction {
    /// List forms in a project
    List {
        /// Project ID
        #[arg(long)]
        project_id: String,
    },
    /// Create a form and provision its interview workflow
    Create {
        /// Project ID the form belongs to
        #[arg(long)]
        project_id: String,
        /// Form name
        #[arg(long)]
        name: String,
        /// Interview topic the AI agent asks about
        #[arg(long)]
        topic: String,
        /// First question shown to respondents
        #[arg(long)]
        initial_question: Option<String>,
        /// Public form title (defaults to the form name)
        #[arg(long)]
        title: Option<String>,
        /// Public form description
        #[arg(long)]
        description: Option<String>,
        /// Persist as a draft without contacting the automation engine
        #[arg(long)]
        no_provision: bool,
    },
    /// Retry workflow provisioning for a form
    Activate {
        /// Form ID
        #[arg(long)]
        id: String,
    },
    /// Delete a form (removes its engine workflow first)
    Delete {
        /// Form ID
        #[arg(long)]
        id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "canvass_core=warn,canvass_server=warn,canvass_cli=info".into()),
        )
        .init();

    let result = match cli.command {
        Commands::Server { host, port } => commands::server::run(host, port, cli.db).await,

        Commands::Project { action } => {
            let state = commands::init_state(&cli.db);
            match action {
                ProjectAction::List => commands::project::list(&state, &cli.user).await,
                ProjectAction::Create { name, description } => {
                    commands::project::create(&state, &cli.user, &name, description.as_deref())
                        .await
                }
            }
        }

        Commands::Form { action } => {
            let state = commands::init_state(&cli.db);
            match action {
                FormAction::List { project_id } => {
                    commands::form::list(&state, &project_id).await
                }
                FormAction::Create {
                    project_id,
                    name,
                    topic,
                    initial_question,
                    title,
                    description,
                    no_provision,
                } => {
                    commands::form::create(
                        &state,
                        &cli.user,
                        &project_id,
                        commands::form::CreateArgs {
                            name,
                            topic,
                            initial_question,
                            title,
                            description,
                            no_provision,
                        },
                    )
                    .await
                }
                FormAction::Activate { id } => commands::form::activate(&state, &id).await,
                FormAction::Delete { id } => commands::form::delete(&state, &id).await,
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
