//! Asset command handlers.

use anyhow::Result;
use assetdesk_core::auth::Page;
use assetdesk_core::controllers::assets::{AssetAction, AssetsController};
use assetdesk_core::models::Id;

use super::{Context, edits, run, run_form};
use crate::cli::AssetFields;

fn controller(ctx: &Context) -> AssetsController {
    AssetsController::new(ctx.currency())
}

pub async fn list(ctx: Context) -> Result<()> {
    let mut c = controller(&ctx);
    run(ctx.open(Page::Assets)?, &mut c, AssetAction::Load).await
}

pub async fn show(ctx: Context, id: Id) -> Result<()> {
    let mut c = controller(&ctx);
    run(ctx.open(Page::Assets)?, &mut c, AssetAction::Show(id)).await
}

pub async fn save(ctx: Context, id: Option<Id>, fields: &AssetFields) -> Result<()> {
    let edits = edits(&[
        ("name", fields.name.as_ref()),
        ("category", fields.category.as_ref()),
        ("acquisition_date", fields.acquired.as_ref()),
        ("cost", fields.cost.as_ref()),
        ("status_id", fields.status.as_ref()),
        ("current_location_id", fields.location.as_ref()),
        ("department_id", fields.department.as_ref()),
    ]);
    let mut c = controller(&ctx);
    run_form(
        ctx.open(Page::Assets)?,
        &mut c,
        AssetAction::OpenForm(id),
        edits,
        AssetAction::Submit,
        AssetsController::form_open,
    )
    .await
}

pub async fn delete(ctx: Context, id: Id) -> Result<()> {
    let mut c = controller(&ctx);
    run(ctx.open(Page::Assets)?, &mut c, AssetAction::Delete(id)).await
}

pub async fn history(ctx: Context, id: Id) -> Result<()> {
    let mut c = controller(&ctx);
    run(ctx.open(Page::Assets)?, &mut c, AssetAction::History(id)).await
}

pub async fn statuses(ctx: Context) -> Result<()> {
    let mut c = controller(&ctx);
    run(ctx.open(Page::Assets)?, &mut c, AssetAction::Statuses).await
}
