pub mod manage;
pub mod notion;
pub mod zoom;

pub use manage::ManageCommand;
pub use notion::NotionCommand;
pub use zoom::ZoomCommand;

use crate::output::Printer;
use anyhow::Result;
use clap::Subcommand;
use composio_sdk::ComposioClient;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Notion pages, databases, comments and users
    #[command(subcommand)]
    Notion(NotionCommand),
    /// Zoom meetings, recordings and summaries
    #[command(subcommand)]
    Zoom(ZoomCommand),
    /// Toolkits, auth configs, connected accounts and raw actions
    #[command(subcommand)]
    Manage(ManageCommand),
}

impl Command {
    pub async fn run(self, client: &ComposioClient, out: Printer) -> Result<()> {
        match self {
            Command::Notion(command) => notion::run(&client.notion()?, command, out).await,
            Command::Zoom(command) => zoom::run(&client.zoom()?, command, out).await,
            Command::Manage(command) => manage::run(&client.management(), command, out).await,
        }
    }
}
