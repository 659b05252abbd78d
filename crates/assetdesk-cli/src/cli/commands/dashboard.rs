//! Dashboard command handler.

use anyhow::Result;
use assetdesk_core::auth::Page;
use assetdesk_core::controllers::dashboard::{DashboardAction, DashboardController};

use super::{Context, run};

pub async fn show(ctx: Context) -> Result<()> {
    let rt = ctx.open(Page::Dashboard)?;
    run(rt, &mut DashboardController::new(), DashboardAction::Load).await
}
