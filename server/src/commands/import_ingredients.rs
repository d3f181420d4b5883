use std::path::PathBuf;

use clap::Args;
use color_eyre::{eyre::WrapErr, Result};
use db::Store;
use serde::Deserialize;

use crate::state::store_from_env;

/// Load ingredients from a JSON array of `{"name", "measurement_unit"}`.
#[derive(Args, Debug)]
pub struct ImportIngredients {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IngredientRecord {
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ImportSummary {
    pub created: usize,
    pub skipped: usize,
}

impl ImportIngredients {
    pub(crate) async fn run(&self) -> Result<()> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .wrap_err_with(|| format!("Failed to read {}", self.path.display()))?;
        let records: Vec<IngredientRecord> = serde_json::from_str(&raw)
            .wrap_err_with(|| format!("Failed to parse {}", self.path.display()))?;

        let store = store_from_env().await?;
        let summary = import(store.as_ref(), records).await?;

        tracing::info!(
            created = summary.created,
            skipped = summary.skipped,
            "Imported ingredients"
        );

        Ok(())
    }
}

/// Pairs that already exist, in the store or earlier in `records`, are skipped.
pub(crate) async fn import(
    store: &dyn Store,
    records: impl IntoIterator<Item = IngredientRecord>,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for record in records {
        let name = record.name.trim();
        let unit = record.measurement_unit.trim();
        if name.is_empty() || unit.is_empty() {
            tracing::warn!(?record, "Skipping ingredient with a blank field");
            summary.skipped += 1;
            continue;
        }

        if store.ingredient_by_name_and_unit(name, unit).await?.is_some() {
            summary.skipped += 1;
            continue;
        }

        store
            .create_ingredient(name, unit)
            .await
            .wrap_err_with(|| format!("Failed to create ingredient {name} ({unit})"))?;
        summary.created += 1;
    }

    Ok(summary)
}
