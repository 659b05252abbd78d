//! Department command handlers.

use anyhow::Result;
use assetdesk_core::auth::Page;
use assetdesk_core::controllers::departments::{DepartmentAction, DepartmentsController};
use assetdesk_core::models::Id;

use super::{Context, edits, run, run_form};
use crate::cli::DepartmentFields;

pub async fn list(ctx: Context) -> Result<()> {
    let rt = ctx.open(Page::Departments)?;
    run(rt, &mut DepartmentsController::new(), DepartmentAction::Load).await
}

pub async fn show(ctx: Context, id: Id) -> Result<()> {
    let rt = ctx.open(Page::Departments)?;
    run(rt, &mut DepartmentsController::new(), DepartmentAction::Show(id)).await
}

pub async fn save(ctx: Context, id: Option<Id>, fields: &DepartmentFields) -> Result<()> {
    let edits = edits(&[
        ("name", fields.name.as_ref()),
        ("location", fields.location.as_ref()),
        ("head_id", fields.head.as_ref()),
    ]);
    run_form(
        ctx.open(Page::Departments)?,
        &mut DepartmentsController::new(),
        DepartmentAction::OpenForm(id),
        edits,
        DepartmentAction::Submit,
        DepartmentsController::form_open,
    )
    .await
}

pub async fn delete(ctx: Context, id: Id) -> Result<()> {
    let rt = ctx.open(Page::Departments)?;
    run(rt, &mut DepartmentsController::new(), DepartmentAction::Delete(id)).await
}

pub async fn members(ctx: Context, id: Id) -> Result<()> {
    let rt = ctx.open(Page::DepartmentEmployees)?;
    run(rt, &mut DepartmentsController::new(), DepartmentAction::Members(id)).await
}
