//! Transfer command handlers.

use anyhow::Result;
use assetdesk_core::auth::Page;
use assetdesk_core::controllers::transfers::{TransferAction, TransferFilter, TransfersController};
use assetdesk_core::models::Id;

use super::{Context, edits, run, run_form};
use crate::cli::TransferFields;

pub async fn list(ctx: Context, filter: TransferFilter) -> Result<()> {
    let rt = ctx.open(Page::Transfers)?;
    run(rt, &mut TransfersController::new(), TransferAction::Load(filter)).await
}

pub async fn show(ctx: Context, id: Id) -> Result<()> {
    let rt = ctx.open(Page::Transfers)?;
    run(rt, &mut TransfersController::new(), TransferAction::Show(id)).await
}

pub async fn create(ctx: Context, fields: &TransferFields) -> Result<()> {
    let edits = edits(&[
        ("asset_id", fields.asset.as_ref()),
        ("employee_id", fields.employee.as_ref()),
        ("from_location_id", fields.from.as_ref()),
        ("to_location_id", fields.to.as_ref()),
        ("transfer_date", fields.date.as_ref()),
        ("notes", fields.notes.as_ref()),
    ]);
    run_form(
        ctx.open(Page::Transfers)?,
        &mut TransfersController::new(),
        TransferAction::OpenForm,
        edits,
        TransferAction::Submit,
        TransfersController::form_open,
    )
    .await
}

pub async fn recent(ctx: Context, limit: usize) -> Result<()> {
    let rt = ctx.open(Page::Transfers)?;
    run(rt, &mut TransfersController::new(), TransferAction::Recent(limit)).await
}
