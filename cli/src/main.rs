use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;

use commands::{groups, health, rules};

/// DocSign CLI - inspect and evaluate access control
#[derive(Parser)]
#[command(name = "dsctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rule table for a role in declaration order
    Rules {
        /// Role to build the table for; omit for a user without a role
        #[arg(short, long)]
        role: Option<String>,

        #[command(flatten)]
        actor: rules::ActorArgs,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Evaluate a single permission query
    Can {
        #[arg(short, long)]
        role: Option<String>,

        /// Action name (e.g. read, create, update, manage)
        #[arg(short, long)]
        action: String,

        /// Resource kind (e.g. template, template_folder, settings)
        #[arg(long)]
        resource: String,

        #[command(flatten)]
        actor: rules::ActorArgs,

        #[command(flatten)]
        instance: rules::InstanceArgs,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the group to role mapping loaded from the environment
    Groups {
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Query a running server's health endpoint
    Health {
        /// Base URL of the server
        #[arg(long, env = "DOCSIGN_URL", default_value = "http://localhost:3030")]
        url: String,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Rules {
            role,
            actor,
            format,
        } => rules::print_rules(role.as_deref(), &actor, format)?,
        Commands::Can {
            role,
            action,
            resource,
            actor,
            instance,
            format,
        } => rules::check(role.as_deref(), &action, &resource, &actor, &instance, format)?,
        Commands::Groups { format } => groups::execute(format)?,
        Commands::Health { url, format } => health::execute(&url, format).await?,
    }

    Ok(())
}
