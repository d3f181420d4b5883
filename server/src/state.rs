use std::{path::PathBuf, sync::Arc};

use color_eyre::eyre::{bail, Context};
use db::{setup_db_pool, MemoryStore, PgStore, Store};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

pub const DEFAULT_PAGE_SIZE: u32 = 6;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub base_url: Url,
    pub page_size: u32,
    /// Where shopping list files are written before streaming. `None` means the OS temp dir.
    pub shopping_list_dir: Option<PathBuf>,
}

impl AppConfig {
    #[instrument(name = "AppConfig::from_env")]
    pub fn from_env() -> color_eyre::Result<Self> {
        let base_url = std::env::var("APP_BASE_URL")
            .wrap_err("Missing APP_BASE_URL, needed for app launch")?;
        let base_url = Url::parse(&base_url).wrap_err("Invalid APP_BASE_URL not parsable")?;

        let page_size = match std::env::var("PAGE_SIZE") {
            Ok(raw) => raw
                .parse::<u32>()
                .wrap_err_with(|| format!("Invalid PAGE_SIZE {raw}"))?,
            Err(_) => DEFAULT_PAGE_SIZE,
        };
        if page_size == 0 {
            bail!("PAGE_SIZE must be at least 1");
        }

        Ok(Self {
            base_url,
            page_size,
            shopping_list_dir: std::env::var("SHOPPING_LIST_DIR").ok().map(PathBuf::from),
        })
    }

    /// Absolute URL for `path` with the given query pairs.
    pub fn app_url<'a>(&self, path: &str, query: impl IntoIterator<Item = (&'a str, String)>) -> String {
        let mut url = self.base_url.clone();
        url.set_path(path);

        let mut pairs = query.into_iter().peekable();
        if pairs.peek().is_some() {
            let mut serializer = url.query_pairs_mut();
            for (key, value) in pairs {
                serializer.append_pair(key, &value);
            }
        }

        url.into()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    pub git_commit: Option<&'static str>,
}

impl VersionInfo {
    #[instrument(name = "VersionInfo::from_env")]
    pub(crate) fn from_env() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            git_commit: option_env!("GIT_SHA"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub app: AppConfig,
    pub store: Arc<dyn Store>,
    pub versions: VersionInfo,
}

impl AppState {
    #[instrument(name = "AppState::from_env", err)]
    pub async fn from_env() -> color_eyre::Result<Self> {
        let app_state = AppState {
            app: AppConfig::from_env()?,
            store: store_from_env().await?,
            versions: VersionInfo::from_env(),
        };

        Ok(app_state)
    }
}

/// `STORE=memory` runs without postgres; anything else connects via `DATABASE_URL`.
#[instrument(err)]
pub(crate) async fn store_from_env() -> color_eyre::Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match std::env::var("STORE").as_deref() {
        Ok("memory") => {
            tracing::warn!("Using the in-memory store, nothing will be persisted");
            Arc::new(MemoryStore::new())
        }
        _ => Arc::new(PgStore::new(setup_db_pool().await?)),
    };

    Ok(store)
}
