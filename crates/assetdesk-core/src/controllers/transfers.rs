//! Transfer list with client-side filters, detail and the move form.

use std::cmp::Reverse;

use chrono::NaiveDate;
use serde_json::Value;

use super::{
    Clock, Controller, DetailView, Effect, FieldEdits, FormField, FormView, Replies,
    SelectOption, TableView, View, display_datetime, name_or_id, required_message, saved_notice,
    system_clock,
};
use crate::api::ApiCall;
use crate::models::{Asset, Employee, Id, Location, Transfer, TransferDraft};

/// Format of the default transfer date.
pub const FORM_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Filters applied to the fetched transfer list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferFilter {
    pub asset_id: Option<Id>,
    pub employee_id: Option<Id>,
    /// Matches either end of the move.
    pub location_id: Option<Id>,
    /// Matches the calendar day of the transfer.
    pub date: Option<NaiveDate>,
}

impl TransferFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, transfer: &Transfer) -> bool {
        self.asset_id.is_none_or(|id| transfer.asset_id == id)
            && self.employee_id.is_none_or(|id| transfer.employee_id == id)
            && self.location_id.is_none_or(|id| {
                transfer.from_location_id == id || transfer.to_location_id == id
            })
            && self
                .date
                .is_none_or(|day| transfer.timestamp().is_some_and(|ts| ts.date() == day))
    }
}

/// Newest first; unparseable dates sort last.
pub fn sort_recent(transfers: &mut [Transfer]) {
    transfers.sort_by_key(|t| Reverse(t.timestamp()));
}

/// Transfer table shared by the list, recent and report views.
pub(crate) fn transfer_table(title: impl Into<String>, transfers: &[Transfer]) -> TableView {
    let mut table = TableView::new(title, &["ID", "Asset", "Employee", "From", "To", "Date"]);
    for t in transfers {
        table.push(vec![
            t.id.to_string(),
            name_or_id(t.asset_name.as_deref(), t.asset_id),
            name_or_id(t.employee_name.as_deref(), t.employee_id),
            name_or_id(t.from_location.as_deref(), t.from_location_id),
            name_or_id(t.to_location.as_deref(), t.to_location_id),
            display_datetime(&t.transfer_date),
        ]);
    }
    table
}

#[derive(Debug)]
pub enum TransferAction {
    /// Lists all transfers matching the filter.
    Load(TransferFilter),
    /// Lists the newest `n` transfers.
    Recent(usize),
    Loaded(Replies),
    Show(Id),
    Shown(Replies),
    OpenForm,
    FormLoaded(Replies),
    Submit(FieldEdits),
    Saved(Replies),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListMode {
    Filtered,
    Recent(usize),
}

#[derive(Debug)]
pub struct TransfersController {
    clock: Clock,
    filter: TransferFilter,
    mode: ListMode,
    form: Option<FormView>,
}

impl Default for TransfersController {
    fn default() -> Self {
        Self::new()
    }
}

impl TransfersController {
    pub fn new() -> Self {
        Self::with_clock(system_clock)
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            filter: TransferFilter::default(),
            mode: ListMode::Filtered,
            form: None,
        }
    }

    pub fn filter(&self) -> &TransferFilter {
        &self.filter
    }

    pub fn form_open(&self) -> bool {
        self.form.is_some()
    }

    fn fetch() -> Effect<TransferAction> {
        Effect::request(ApiCall::get("/transfers"), TransferAction::Loaded)
    }

    fn loaded(&self, mut transfers: Vec<Transfer>) -> View {
        match self.mode {
            ListMode::Filtered => {
                transfers.retain(|t| self.filter.matches(t));
                let title = if self.filter.is_empty() {
                    "Transfers"
                } else {
                    "Transfers (filtered)"
                };
                View::Table(transfer_table(title, &transfers))
            }
            ListMode::Recent(limit) => {
                sort_recent(&mut transfers);
                transfers.truncate(limit);
                View::Table(transfer_table("Recent transfers", &transfers))
            }
        }
    }

    fn build_form(&self, assets: &[Asset], employees: &[Employee], locations: &[Location]) -> FormView {
        let asset_options = assets
            .iter()
            .map(|a| SelectOption::new(a.id, &a.name))
            .collect();
        let employee_options = employees
            .iter()
            .map(|e| SelectOption::new(e.id, &e.full_name))
            .collect();
        let location_options: Vec<_> = locations
            .iter()
            .map(|l| SelectOption::new(l.id, &l.address))
            .collect();
        let now = (self.clock)().format(FORM_DATE_FORMAT).to_string();

        FormView::new(
            "New transfer",
            vec![
                FormField::select("asset_id", "Asset", None, true, asset_options),
                FormField::select("employee_id", "Employee", None, true, employee_options),
                FormField::select(
                    "from_location_id",
                    "From",
                    None,
                    true,
                    location_options.clone(),
                ),
                FormField::select("to_location_id", "To", None, true, location_options),
                FormField::text("transfer_date", "Date", now, true),
                FormField::text("notes", "Notes", "", false),
            ],
        )
    }

    fn draft(view: &FormView) -> Result<TransferDraft, String> {
        let missing = view.missing_required();
        if !missing.is_empty() {
            return Err(required_message(&missing));
        }

        let from_location_id = view.id_value("from_location_id")?.unwrap_or_default();
        let to_location_id = view.id_value("to_location_id")?.unwrap_or_default();
        if from_location_id == to_location_id {
            return Err("Source and destination locations must differ".to_string());
        }

        Ok(TransferDraft {
            asset_id: view.id_value("asset_id")?.unwrap_or_default(),
            employee_id: view.id_value("employee_id")?.unwrap_or_default(),
            from_location_id,
            to_location_id,
            transfer_date: view.value("transfer_date").trim().to_string(),
            notes: view.value("notes").to_string(),
        })
    }

    fn submit(&mut self, edits: &FieldEdits) -> Vec<Effect<TransferAction>> {
        let Some(form) = self.form.as_mut() else {
            return vec![Effect::Alert("No transfer form is open".to_string())];
        };
        if let Err(msg) = form.apply(edits) {
            return vec![Effect::Alert(msg)];
        }
        let draft = match Self::draft(form) {
            Ok(draft) => draft,
            Err(msg) => return vec![Effect::Alert(msg)],
        };
        match serde_json::to_value(&draft) {
            Ok(body) => vec![Effect::request(
                ApiCall::post("/transfers", body),
                TransferAction::Saved,
            )],
            Err(e) => vec![Effect::Log(format!("Failed to encode transfer: {e}"))],
        }
    }
}

impl Controller for TransfersController {
    type Action = TransferAction;

    fn update(&mut self, action: TransferAction) -> Vec<Effect<TransferAction>> {
        match action {
            TransferAction::Load(filter) => {
                self.filter = filter;
                self.mode = ListMode::Filtered;
                vec![Self::fetch()]
            }
            TransferAction::Recent(limit) => {
                self.mode = ListMode::Recent(limit);
                vec![Self::fetch()]
            }
            TransferAction::Loaded(mut replies) => match replies.take::<Vec<Transfer>>() {
                Ok(transfers) => vec![Effect::Render(self.loaded(transfers))],
                Err(e) => vec![Effect::Alert(e.message)],
            },

            TransferAction::Show(id) => vec![Effect::request(
                ApiCall::get(format!("/transfers/{id}")),
                TransferAction::Shown,
            )],
            TransferAction::Shown(mut replies) => match replies.take::<Transfer>() {
                Ok(t) => {
                    let notes = t
                        .notes
                        .as_deref()
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                        .unwrap_or("none");
                    vec![Effect::Render(View::Detail(
                        DetailView::new(format!("Transfer #{}", t.id))
                            .field("Asset", name_or_id(t.asset_name.as_deref(), t.asset_id))
                            .field(
                                "Employee",
                                name_or_id(t.employee_name.as_deref(), t.employee_id),
                            )
                            .field(
                                "From",
                                name_or_id(t.from_location.as_deref(), t.from_location_id),
                            )
                            .field("To", name_or_id(t.to_location.as_deref(), t.to_location_id))
                            .field("Date", display_datetime(&t.transfer_date))
                            .field("Notes", notes),
                    ))]
                }
                Err(e) => vec![Effect::Alert(e.message)],
            },

            TransferAction::OpenForm => {
                self.form = None;
                vec![Effect::request_all(
                    vec![
                        ApiCall::get("/assets"),
                        ApiCall::get("/employees"),
                        ApiCall::get("/locations"),
                    ],
                    TransferAction::FormLoaded,
                )]
            }
            TransferAction::FormLoaded(mut replies) => {
                let assets = replies.take::<Vec<Asset>>();
                let employees = replies.take::<Vec<Employee>>();
                let locations = replies.take::<Vec<Location>>();
                match (assets, employees, locations) {
                    (Ok(assets), Ok(employees), Ok(locations)) => {
                        let view = self.build_form(&assets, &employees, &locations);
                        self.form = Some(view.clone());
                        vec![Effect::Render(View::Form(view))]
                    }
                    (Err(e), ..) | (_, Err(e), _) | (.., Err(e)) => vec![Effect::Alert(e.message)],
                }
            }
            TransferAction::Submit(edits) => self.submit(&edits),
            TransferAction::Saved(mut replies) => match replies.take::<Value>() {
                Ok(reply) => {
                    self.form = None;
                    self.mode = ListMode::Filtered;
                    vec![
                        Effect::CloseForm,
                        Effect::Render(View::Notice(saved_notice("Transfer", &reply))),
                        Self::fetch(),
                    ]
                }
                Err(e) => vec![Effect::Alert(e.message)],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use serde_json::json;

    use super::super::testing::*;
    use super::*;

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    fn transfers_json() -> Value {
        json!([
            {"id": 1, "asset_id": 3, "asset_name": "Laptop", "employee_id": 4, "employee_name": "Ann",
             "from_location_id": 1, "from_location": "HQ", "to_location_id": 2, "to_location": "Depot",
             "transfer_date": "2024-05-01T09:30:00Z"},
            {"id": 2, "asset_id": 5, "asset_name": "Desk", "employee_id": 6, "employee_name": "Bo",
             "from_location_id": 2, "from_location": "Depot", "to_location_id": 3, "to_location": "Lab",
             "transfer_date": "2024-06-10T08:00:00Z", "notes": "urgent"},
            {"id": 3, "asset_id": 3, "asset_name": "Laptop", "employee_id": 6, "employee_name": "Bo",
             "from_location_id": 2, "from_location": "Depot", "to_location_id": 1, "to_location": "HQ",
             "transfer_date": "2024-05-20T12:00:00Z"}
        ])
    }

    fn open_form(c: &mut TransfersController) -> FormView {
        let effects = c.update(TransferAction::OpenForm);
        let effects = c.update(respond(
            effects,
            vec![
                Ok(json!([{"id": 3, "name": "Laptop", "category": "IT", "status_id": 1,
                           "current_location_id": 1}])),
                Ok(json!([{"id": 4, "full_name": "Ann", "email": "a@x"}])),
                Ok(json!([{"id": 1, "address": "HQ"}, {"id": 2, "address": "Depot"}])),
            ],
        ));
        form(&effects).clone()
    }

    #[test]
    fn test_form_defaults_date_to_now() {
        let mut c = TransfersController::with_clock(fixed_clock);
        let form = open_form(&mut c);
        assert_eq!(form.value("transfer_date"), "2024-06-15T14:05");
    }

    #[test]
    fn test_equal_locations_rejected_without_request() {
        let mut c = TransfersController::with_clock(fixed_clock);
        open_form(&mut c);

        let effects = c.update(TransferAction::Submit(edits(&[
            ("asset_id", "3"),
            ("employee_id", "4"),
            ("from_location_id", "1"),
            ("to_location_id", "1"),
        ])));
        assert!(calls(&effects).is_empty());
        assert_eq!(
            alerts(&effects),
            vec!["Source and destination locations must differ"]
        );
        assert!(c.form_open());
    }

    #[test]
    fn test_create_posts_and_reloads() {
        let mut c = TransfersController::with_clock(fixed_clock);
        open_form(&mut c);

        let effects = c.update(TransferAction::Submit(edits(&[
            ("asset_id", "3"),
            ("employee_id", "4"),
            ("from_location_id", "1"),
            ("to_location_id", "2"),
            ("notes", "moving"),
        ])));
        let call = calls(&effects)[0].clone();
        assert_eq!(call.path, "/transfers");
        assert_eq!(
            call.body.unwrap(),
            json!({
                "asset_id": 3, "employee_id": 4, "from_location_id": 1, "to_location_id": 2,
                "transfer_date": "2024-06-15T14:05", "notes": "moving"
            })
        );

        let effects = c.update(respond(effects, vec![Ok(json!({"id": 10}))]));
        assert!(closes_form(&effects));
        assert_eq!(calls(&effects)[0].path, "/transfers");
    }

    #[test]
    fn test_filters_applied_client_side() {
        let mut c = TransfersController::new();
        let filter = TransferFilter {
            location_id: Some(1),
            ..TransferFilter::default()
        };
        let effects = c.update(TransferAction::Load(filter));
        assert_eq!(calls(&effects)[0].path, "/transfers");

        let effects = c.update(respond(effects, vec![Ok(transfers_json())]));
        let ids: Vec<_> = tables(&effects)[0].rows.iter().map(|r| r[0].clone()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let filter = TransferFilter {
            asset_id: Some(3),
            date: NaiveDate::from_ymd_opt(2024, 5, 20),
            ..TransferFilter::default()
        };
        let effects = c.update(TransferAction::Load(filter));
        let effects = c.update(respond(effects, vec![Ok(transfers_json())]));
        let ids: Vec<_> = tables(&effects)[0].rows.iter().map(|r| r[0].clone()).collect();
        assert_eq!(ids, vec!["3"]);
    }

    #[test]
    fn test_recent_sorted_newest_first() {
        let mut c = TransfersController::new();
        let effects = c.update(TransferAction::Recent(2));
        let effects = c.update(respond(effects, vec![Ok(transfers_json())]));
        let table = tables(&effects)[0];
        assert_eq!(table.title, "Recent transfers");
        let ids: Vec<_> = table.rows.iter().map(|r| r[0].clone()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_detail_notes_default_to_none() {
        let mut c = TransfersController::new();
        let effects = c.update(TransferAction::Show(1));
        let transfer = transfers_json()[0].clone();
        let effects = c.update(respond(effects, vec![Ok(transfer)]));
        let detail = detail(&effects);
        assert_eq!(
            detail.fields.last().unwrap(),
            &("Notes".to_string(), "none".to_string())
        );
    }
}
