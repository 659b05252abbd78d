//! Employee command handlers.

use anyhow::Result;
use assetdesk_core::auth::Page;
use assetdesk_core::controllers::employees::{EmployeeAction, EmployeesController};
use assetdesk_core::models::Id;

use super::{Context, edits, read_stdin_line, run, run_form};
use crate::cli::EmployeeFields;

pub async fn list(ctx: Context) -> Result<()> {
    let rt = ctx.open(Page::Employees)?;
    run(rt, &mut EmployeesController::new(), EmployeeAction::Load).await
}

pub async fn show(ctx: Context, id: Id) -> Result<()> {
    let rt = ctx.open(Page::Employees)?;
    run(rt, &mut EmployeesController::new(), EmployeeAction::Show(id)).await
}

pub async fn save(ctx: Context, id: Option<Id>, fields: &EmployeeFields) -> Result<()> {
    let password = if fields.password_stdin {
        Some(read_stdin_line()?)
    } else {
        None
    };
    let edits = edits(&[
        ("full_name", fields.full_name.as_ref()),
        ("position", fields.position.as_ref()),
        ("email", fields.email.as_ref()),
        ("role", fields.role.as_ref()),
        ("department_id", fields.department.as_ref()),
        ("password", password.as_ref()),
    ]);
    run_form(
        ctx.open(Page::Employees)?,
        &mut EmployeesController::new(),
        EmployeeAction::OpenForm(id),
        edits,
        EmployeeAction::Submit,
        EmployeesController::form_open,
    )
    .await
}

pub async fn delete(ctx: Context, id: Id) -> Result<()> {
    let rt = ctx.open(Page::Employees)?;
    run(rt, &mut EmployeesController::new(), EmployeeAction::Delete(id)).await
}
