use crate::console::{
    run_provider_add, run_provider_edit, run_provider_list, run_provider_remove, run_screen,
    run_sources, ProviderFieldArgs, ProviderListArgs, ScreenArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use provider_risk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Provider Risk Console",
    about = "Manage provider records and run risk screenings from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// List the screening sources the risk API understands
    Sources,
    /// Browse and edit provider records
    Providers {
        #[command(subcommand)]
        command: ProvidersCommand,
    },
    /// Screen one provider against the chosen sources
    Screen(ScreenArgs),
}

#[derive(Subcommand, Debug)]
enum ProvidersCommand {
    /// Print one page of providers, newest first
    List(ProviderListArgs),
    /// Create a provider record
    Add(ProviderFieldArgs),
    /// Update fields of an existing provider record
    Edit {
        /// Provider to update
        #[arg(long)]
        id: u64,
        #[command(flatten)]
        fields: ProviderFieldArgs,
    },
    /// Delete a provider record
    Remove {
        /// Provider to delete
        #[arg(long)]
        id: u64,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Sources => run_sources(),
        Command::Providers { command } => match command {
            ProvidersCommand::List(args) => run_provider_list(args).await,
            ProvidersCommand::Add(fields) => run_provider_add(fields).await,
            ProvidersCommand::Edit { id, fields } => run_provider_edit(id, fields).await,
            ProvidersCommand::Remove { id } => run_provider_remove(id).await,
        },
        Command::Screen(args) => run_screen(args).await,
    }
}
