//! Landing page: headline counts and the latest transfers.

use serde_json::Value;

use super::transfers::{sort_recent, transfer_table};
use super::{Controller, DetailView, Effect, Replies, View};
use crate::api::ApiCall;
use crate::models::Transfer;

/// Transfers shown on the dashboard.
pub const DASHBOARD_RECENT: usize = 5;

#[derive(Debug)]
pub enum DashboardAction {
    Load,
    Loaded(Replies),
}

#[derive(Debug, Default)]
pub struct DashboardController;

impl DashboardController {
    pub fn new() -> Self {
        Self
    }
}

impl Controller for DashboardController {
    type Action = DashboardAction;

    fn update(&mut self, action: DashboardAction) -> Vec<Effect<DashboardAction>> {
        match action {
            DashboardAction::Load => vec![Effect::request_all(
                vec![
                    ApiCall::get("/assets"),
                    ApiCall::get("/employees"),
                    ApiCall::get("/departments"),
                    ApiCall::get("/transfers"),
                ],
                DashboardAction::Loaded,
            )],
            DashboardAction::Loaded(mut replies) => {
                let assets = replies.take::<Vec<Value>>();
                let employees = replies.take::<Vec<Value>>();
                let departments = replies.take::<Vec<Value>>();
                let transfers = replies.take::<Vec<Transfer>>();

                let (assets, employees, departments) = match (assets, employees, departments) {
                    (Ok(a), Ok(e), Ok(d)) => (a.len(), e.len(), d.len()),
                    (Err(e), ..) | (_, Err(e), _) | (.., Err(e)) => {
                        return vec![Effect::Alert(e.message)];
                    }
                };

                let mut effects = vec![Effect::Render(View::Detail(
                    DetailView::new("Dashboard")
                        .field("Assets", assets.to_string())
                        .field("Employees", employees.to_string())
                        .field("Departments", departments.to_string()),
                ))];

                // Counts stay useful when the transfer list is unavailable.
                match transfers {
                    Ok(mut transfers) => {
                        sort_recent(&mut transfers);
                        transfers.truncate(DASHBOARD_RECENT);
                        effects.push(Effect::Render(View::Table(transfer_table(
                            "Recent transfers",
                            &transfers,
                        ))));
                    }
                    Err(e) => effects.push(Effect::Log(format!(
                        "Failed to load recent transfers: {}",
                        e.message
                    ))),
                }
                effects
            }
        }
    }
}
