use clap::Args;
use color_eyre::{eyre::WrapErr, Result};

use crate::state::store_from_env;

/// Tags have no write endpoint; this is how they get created.
#[derive(Args, Debug)]
pub struct CreateTag {
    pub name: String,

    /// Hex color shown next to the tag, e.g. `#E26C2D`
    #[arg(long)]
    pub color: Option<String>,
}

impl CreateTag {
    pub(crate) async fn run(&self) -> Result<()> {
        let store = store_from_env().await?;

        let tag = store
            .create_tag(&self.name, self.color.as_deref())
            .await
            .wrap_err_with(|| format!("Failed to create tag {}", self.name))?;

        tracing::info!(tag_id = %tag.tag_id, "Created tag");
        println!("{} {}", tag.tag_id, tag.name);

        Ok(())
    }
}
