use clap::Subcommand;
use color_eyre::Result;

use self::{create_tag::CreateTag, create_user::CreateUser, import_ingredients::ImportIngredients};

pub(crate) mod create_tag;
pub(crate) mod create_user;
pub(crate) mod import_ingredients;

#[derive(Subcommand)]
pub(crate) enum Command {
    Serve,
    CreateUser(CreateUser),
    CreateTag(CreateTag),
    ImportIngredients(ImportIngredients),
}

impl Default for Command {
    fn default() -> Self {
        Self::Serve
    }
}

impl Command {
    pub(crate) async fn run(&self) -> Result<()> {
        match &self {
            Command::Serve => crate::http_server::cmd::serve().await,
            Command::CreateUser(cmd) => cmd.run().await,
            Command::CreateTag(cmd) => cmd.run().await,
            Command::ImportIngredients(cmd) => cmd.run().await,
        }
    }
}
