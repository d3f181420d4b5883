//! Turns a user's shopping cart into a downloadable ingredient list.
//!
//! Every ingredient line of every recipe in the cart is grouped by
//! (ingredient name, measurement unit) and the amounts are summed, so two
//! recipes that both call for salt in grams produce a single `salt (g)` line.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, Seek, Write},
    path::{Path, PathBuf},
};

use db::{
    cooking::{CartIngredientLine, RecipeCollection},
    users::User,
    Store,
};
use thiserror::Error;
use tracing::instrument;

pub(crate) const ATTACHMENT_FILENAME: &str = "shopping_list.txt";

pub(crate) const AUTHORIZATION_REQUIRED: &str =
    "You have to authorize in order to download shopping cart.";
pub(crate) const EMPTY_CART: &str = "You do not have a shopping cart on your account.";

#[derive(Debug, Error)]
pub(crate) enum ShoppingListError {
    #[error("{}", AUTHORIZATION_REQUIRED)]
    AuthorizationRequired,
    #[error("{}", EMPTY_CART)]
    EmptyCart,
    #[error("could not write the shopping list file")]
    File(#[from] io::Error),
    #[error("could not read the shopping cart")]
    Store(color_eyre::Report),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

/// Sums amounts per (name, unit). Output is ordered by name, then unit.
pub(crate) fn aggregate(lines: impl IntoIterator<Item = CartIngredientLine>) -> Vec<ShoppingListItem> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();

    for line in lines {
        *totals
            .entry((line.name, line.measurement_unit))
            .or_default() += line.amount;
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), total_amount)| ShoppingListItem {
            name,
            measurement_unit,
            total_amount,
        })
        .collect()
}

pub(crate) fn render(items: &[ShoppingListItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "{} ({}) — {}\n",
                item.name, item.measurement_unit, item.total_amount
            )
        })
        .collect()
}

/// Writes `contents` to an anonymous temp file and rewinds it. The file is
/// removed by the OS once the last handle closes.
fn write_temp_file(contents: &str, dir: Option<&Path>) -> io::Result<File> {
    let mut file = match dir {
        Some(dir) => tempfile::tempfile_in(dir)?,
        None => tempfile::tempfile()?,
    };

    file.write_all(contents.as_bytes())?;
    file.flush()?;
    file.rewind()?;

    Ok(file)
}

/// Collects the cart, aggregates it and writes the result to a fresh temp file.
#[instrument(skip(store, user), fields(user_id = ?user.map(|u| u.user_id)), err)]
pub(crate) async fn build_for(
    store: &dyn Store,
    user: Option<&User>,
    dir: Option<PathBuf>,
) -> Result<File, ShoppingListError> {
    let user = user.ok_or(ShoppingListError::AuthorizationRequired)?;

    let cart_size = store
        .collection_size(RecipeCollection::ShoppingCart, user.user_id)
        .await
        .map_err(ShoppingListError::Store)?;
    if cart_size == 0 {
        return Err(ShoppingListError::EmptyCart);
    }

    let lines = store
        .cart_ingredient_lines(user.user_id)
        .await
        .map_err(ShoppingListError::Store)?;
    let items = aggregate(lines);
    tracing::debug!(recipes = cart_size, items = items.len(), "Aggregated shopping cart");

    let contents = render(&items);
    let file = tokio::task::spawn_blocking(move || write_temp_file(&contents, dir.as_deref()))
        .await
        .map_err(io::Error::other)??;

    Ok(file)
}
