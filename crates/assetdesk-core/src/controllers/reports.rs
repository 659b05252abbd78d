//! Aggregate reports.
//!
//! Status, department-cost and transfer reports come from the server. The
//! inventory summary is computed locally from the asset and transfer lists.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::transfers::sort_recent;
use super::{
    ChartSeries, Clock, Controller, DetailView, Effect, Replies, TableView, View, display_date,
    money, name_or_id, or_unassigned, utc_clock,
};
use crate::api::{self, ApiCall, ApiError, ApiResult};
use crate::models::{Asset, AssetsByStatusRow, DepartmentCostRow, Transfer};

/// Days covered by the transfer report when no range is given.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Recent transfers listed in the inventory summary.
pub const INVENTORY_RECENT: usize = 5;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive date range of the transfer report, as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    pub from: String,
    pub to: String,
}

#[derive(Debug)]
pub enum ReportAction {
    Status,
    StatusLoaded(Replies),
    DepartmentCosts,
    DepartmentCostsLoaded(Replies),
    /// Both bounds are needed; otherwise the last 30 days are used.
    Transfers {
        from: Option<String>,
        to: Option<String>,
    },
    TransfersLoaded(Replies),
    Inventory,
    InventoryLoaded(Replies),
}

/// Locally computed inventory overview.
#[derive(Debug, Clone, PartialEq)]
pub struct InventorySummary {
    pub total_assets: usize,
    pub total_value: f64,
    pub by_status: BTreeMap<String, usize>,
    pub by_location: BTreeMap<String, usize>,
    pub by_department: BTreeMap<String, usize>,
    pub recent_transfers: Vec<Transfer>,
}

impl InventorySummary {
    pub fn compute(assets: &[Asset], mut transfers: Vec<Transfer>, recent: usize) -> Self {
        let mut by_status = BTreeMap::new();
        let mut by_location = BTreeMap::new();
        let mut by_department = BTreeMap::new();
        for asset in assets {
            *by_status
                .entry(name_or_id(asset.status.as_deref(), asset.status_id))
                .or_default() += 1;
            *by_location
                .entry(name_or_id(asset.location.as_deref(), asset.current_location_id))
                .or_default() += 1;
            *by_department
                .entry(or_unassigned(asset.department.as_deref()))
                .or_default() += 1;
        }

        sort_recent(&mut transfers);
        transfers.truncate(recent);

        Self {
            total_assets: assets.len(),
            total_value: assets.iter().fold(0.0, |total, a| total + a.cost),
            by_status,
            by_location,
            by_department,
            recent_transfers: transfers,
        }
    }
}

/// Accepts a bare array or an object wrapping the rows under `key`.
fn report_rows<T: DeserializeOwned>(value: Value, key: &str) -> ApiResult<Vec<T>> {
    match value {
        Value::Array(_) => api::decode(value),
        Value::Object(mut map) => match map.remove(key) {
            Some(rows) => api::decode(rows),
            None => Err(ApiError::decode(format!("Report is missing `{key}`"))),
        },
        Value::Null => Ok(Vec::new()),
        other => Err(ApiError::decode(format!("Unexpected report shape: {other}"))),
    }
}

fn distribution_chart(title: &str, data: &BTreeMap<String, usize>) -> ChartSeries {
    ChartSeries {
        title: title.to_string(),
        label: "Assets".to_string(),
        labels: data.keys().cloned().collect(),
        values: data.values().map(|v| *v as f64).collect(),
    }
}

#[derive(Debug)]
pub struct ReportsController {
    currency: String,
    clock: Clock,
    window: Option<DateWindow>,
}

impl ReportsController {
    pub fn new(currency: impl Into<String>) -> Self {
        Self::with_clock(currency, utc_clock)
    }

    pub fn with_clock(currency: impl Into<String>, clock: Clock) -> Self {
        Self {
            currency: currency.into(),
            clock,
            window: None,
        }
    }

    /// Range used by the last transfer report request.
    pub fn window(&self) -> Option<&DateWindow> {
        self.window.as_ref()
    }

    fn resolve_window(&self, from: Option<String>, to: Option<String>) -> DateWindow {
        let supplied = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        if let (Some(from), Some(to)) = (supplied(from), supplied(to)) {
            return DateWindow { from, to };
        }
        let today = (self.clock)().date();
        DateWindow {
            from: (today - Duration::days(DEFAULT_WINDOW_DAYS))
                .format(DATE_FORMAT)
                .to_string(),
            to: today.format(DATE_FORMAT).to_string(),
        }
    }

    fn status_views(&self, rows: &[AssetsByStatusRow]) -> Vec<Effect<ReportAction>> {
        let mut table = TableView::new("Assets by status", &["Status", "Count", "Total cost"]);
        for row in rows {
            table.push(vec![
                row.status.clone(),
                row.count.to_string(),
                money(row.total_cost, &self.currency),
            ]);
        }
        let chart = ChartSeries {
            title: "Assets by status".to_string(),
            label: "Asset count".to_string(),
            labels: rows.iter().map(|r| r.status.clone()).collect(),
            values: rows.iter().map(|r| r.count as f64).collect(),
        };
        vec![
            Effect::Render(View::Table(table)),
            Effect::Render(View::Chart(chart)),
        ]
    }

    fn department_views(&self, rows: &[DepartmentCostRow]) -> Vec<Effect<ReportAction>> {
        let mut table = TableView::new(
            "Department costs",
            &["Department", "Assets", "Total cost", "Average cost"],
        );
        for row in rows {
            table.push(vec![
                row.department.clone(),
                row.count.to_string(),
                money(row.total_cost, &self.currency),
                money(row.average_cost, &self.currency),
            ]);
        }
        let chart = ChartSeries {
            title: "Department costs".to_string(),
            label: "Total cost".to_string(),
            labels: rows.iter().map(|r| r.department.clone()).collect(),
            values: rows.iter().map(|r| r.total_cost).collect(),
        };
        vec![
            Effect::Render(View::Table(table)),
            Effect::Render(View::Chart(chart)),
        ]
    }

    fn transfer_views(&self, transfers: &[Transfer]) -> Vec<Effect<ReportAction>> {
        let title = self.window.as_ref().map_or_else(
            || "Transfers".to_string(),
            |w| format!("Transfers {} .. {}", w.from, w.to),
        );
        let mut table = TableView::new(title, &["Date", "Asset", "From", "To", "Employee"]);
        for t in transfers {
            table.push(vec![
                display_date(&t.transfer_date),
                name_or_id(t.asset_name.as_deref(), t.asset_id),
                name_or_id(t.from_location.as_deref(), t.from_location_id),
                name_or_id(t.to_location.as_deref(), t.to_location_id),
                name_or_id(t.employee_name.as_deref(), t.employee_id),
            ]);
        }
        vec![Effect::Render(View::Table(table))]
    }

    fn inventory_views(&self, summary: &InventorySummary) -> Vec<Effect<ReportAction>> {
        let generated = (self.clock)().format("%Y-%m-%d %H:%M").to_string();
        let overview = DetailView::new("Inventory")
            .field("Total assets", summary.total_assets.to_string())
            .field("Total value", money(summary.total_value, &self.currency))
            .field("Generated (UTC)", generated);

        let mut recent = TableView::new("Recent transfers", &["Date", "Asset", "From", "To"]);
        for t in &summary.recent_transfers {
            recent.push(vec![
                display_date(&t.transfer_date),
                name_or_id(t.asset_name.as_deref(), t.asset_id),
                name_or_id(t.from_location.as_deref(), t.from_location_id),
                name_or_id(t.to_location.as_deref(), t.to_location_id),
            ]);
        }

        vec![
            Effect::Render(View::Detail(overview)),
            Effect::Render(View::Chart(distribution_chart("By status", &summary.by_status))),
            Effect::Render(View::Chart(distribution_chart(
                "By location",
                &summary.by_location,
            ))),
            Effect::Render(View::Chart(distribution_chart(
                "By department",
                &summary.by_department,
            ))),
            Effect::Render(View::Table(recent)),
        ]
    }
}

impl Controller for ReportsController {
    type Action = ReportAction;

    fn update(&mut self, action: ReportAction) -> Vec<Effect<ReportAction>> {
        match action {
            ReportAction::Status => vec![Effect::request(
                ApiCall::get("/reports/assets-by-status"),
                ReportAction::StatusLoaded,
            )],
            ReportAction::StatusLoaded(mut replies) => {
                match replies
                    .take::<Value>()
                    .and_then(|v| report_rows::<AssetsByStatusRow>(v, "assets_by_status"))
                {
                    Ok(rows) => self.status_views(&rows),
                    Err(e) => vec![Effect::Alert(e.message)],
                }
            }

            ReportAction::DepartmentCosts => vec![Effect::request(
                ApiCall::get("/reports/department-costs"),
                ReportAction::DepartmentCostsLoaded,
            )],
            ReportAction::DepartmentCostsLoaded(mut replies) => {
                match replies
                    .take::<Value>()
                    .and_then(|v| report_rows::<DepartmentCostRow>(v, "department_costs"))
                {
                    Ok(rows) => self.department_views(&rows),
                    Err(e) => vec![Effect::Alert(e.message)],
                }
            }

            ReportAction::Transfers { from, to } => {
                let window = self.resolve_window(from, to);
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("from", &window.from)
                    .append_pair("to", &window.to)
                    .finish();
                self.window = Some(window);
                vec![Effect::request(
                    ApiCall::get(format!("/reports/transfers?{query}")),
                    ReportAction::TransfersLoaded,
                )]
            }
            ReportAction::TransfersLoaded(mut replies) => {
                match replies
                    .take::<Value>()
                    .and_then(|v| report_rows::<Transfer>(v, "transfers"))
                {
                    Ok(rows) => self.transfer_views(&rows),
                    Err(e) => vec![Effect::Alert(e.message)],
                }
            }

            ReportAction::Inventory => vec![Effect::request_all(
                vec![ApiCall::get("/assets"), ApiCall::get("/transfers")],
                ReportAction::InventoryLoaded,
            )],
            ReportAction::InventoryLoaded(mut replies) => {
                let assets = replies.take::<Vec<Asset>>();
                let transfers = replies.take::<Vec<Transfer>>();
                match (assets, transfers) {
                    (Ok(assets), Ok(transfers)) => {
                        let summary =
                            InventorySummary::compute(&assets, transfers, INVENTORY_RECENT);
                        self.inventory_views(&summary)
                    }
                    (Err(e), _) | (_, Err(e)) => vec![Effect::Alert(e.message)],
                }
            }
        }
    }
}
