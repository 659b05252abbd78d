//! Report command handlers.

use anyhow::Result;
use assetdesk_core::auth::Page;
use assetdesk_core::controllers::reports::{ReportAction, ReportsController};

use super::{Context, run};

async fn report(ctx: Context, action: ReportAction) -> Result<()> {
    let mut c = ReportsController::new(ctx.currency());
    run(ctx.open(Page::Reports)?, &mut c, action).await
}

pub async fn status(ctx: Context) -> Result<()> {
    report(ctx, ReportAction::Status).await
}

pub async fn departments(ctx: Context) -> Result<()> {
    report(ctx, ReportAction::DepartmentCosts).await
}

pub async fn transfers(ctx: Context, from: Option<String>, to: Option<String>) -> Result<()> {
    report(ctx, ReportAction::Transfers { from, to }).await
}

pub async fn inventory(ctx: Context) -> Result<()> {
    report(ctx, ReportAction::Inventory).await
}
