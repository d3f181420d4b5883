use clap::Args;
use color_eyre::{eyre::WrapErr, Result};

use crate::state::store_from_env;

/// Create a user and print an API token for them.
#[derive(Args, Debug)]
pub struct CreateUser {
    pub username: String,
}

impl CreateUser {
    pub(crate) async fn run(&self) -> Result<()> {
        let store = store_from_env().await?;

        let user = store
            .create_user(&self.username)
            .await
            .wrap_err_with(|| format!("Failed to create user {}", self.username))?;
        let token = store.issue_token(user.user_id).await?;

        tracing::info!(user_id = %user.user_id, "Created user");
        println!("{} {}", user.user_id, token.token);

        Ok(())
    }
}
