//! Locations listing.
//!
//! Locations are reference data without their own page, so this goes to the
//! API directly instead of through a controller.

use anyhow::{Result, bail};
use assetdesk_core::auth::Page;
use assetdesk_core::controllers::TableView;
use assetdesk_core::models::Location;

use super::Context;
use crate::terminal::render_table;

pub async fn list(ctx: Context) -> Result<()> {
    if ctx.auth.guard(Page::Assets)?.is_some() {
        bail!("Not logged in. Run `assetdesk login` first.");
    }

    let locations: Vec<Location> = match ctx.api.get_json("/locations").await {
        Ok(locations) => locations,
        Err(e) if e.is_unauthorized() => {
            ctx.auth.handle_unauthorized()?;
            bail!("{e}");
        }
        Err(e) => return Err(e.into()),
    };

    let mut table = TableView::new("Locations", &["ID", "Address", "Type"]);
    for location in &locations {
        table.push(vec![
            location.id.to_string(),
            location.address.clone(),
            location.kind.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", render_table(&table));
    Ok(())
}
