//! Asset list, detail, form and transfer history.

use serde_json::Value;

use super::{
    Controller, DetailView, Effect, FieldEdits, FormField, FormView, Replies, SelectOption,
    TableView, View, money, name_or_id, or_unassigned, required_message, saved_notice,
};
use crate::api::ApiCall;
use crate::models::{Asset, AssetDraft, AssetStatus, Department, Id, Location, Transfer};

#[derive(Debug)]
pub enum AssetAction {
    Load,
    Loaded(Replies),
    Show(Id),
    Shown(Replies),
    Delete(Id),
    DeleteConfirmed(Id),
    Deleted(Replies),
    /// Opens the create form (`None`) or the edit form for an asset.
    OpenForm(Option<Id>),
    FormLoaded(Replies),
    Submit(FieldEdits),
    Saved(Replies),
    History(Id),
    HistoryLoaded(Replies),
    Statuses,
    StatusesLoaded(Replies),
}

#[derive(Debug)]
struct OpenForm {
    editing: Option<Id>,
    view: FormView,
}

#[derive(Debug)]
pub struct AssetsController {
    currency: String,
    pending_form: Option<Id>,
    form: Option<OpenForm>,
    history_for: Option<Id>,
}

impl AssetsController {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            pending_form: None,
            form: None,
            history_for: None,
        }
    }

    pub fn form_open(&self) -> bool {
        self.form.is_some()
    }

    fn reload() -> Effect<AssetAction> {
        Effect::request(ApiCall::get("/assets"), AssetAction::Loaded)
    }

    fn render_list(assets: &[Asset]) -> View {
        let mut table = TableView::new(
            "Assets",
            &["ID", "Name", "Category", "Status", "Location", "Department"],
        );
        for asset in assets {
            table.push(vec![
                asset.id.to_string(),
                asset.name.clone(),
                asset.category.clone(),
                name_or_id(asset.status.as_deref(), asset.status_id),
                name_or_id(asset.location.as_deref(), asset.current_location_id),
                or_unassigned(asset.department.as_deref()),
            ]);
        }
        View::Table(table)
    }

    fn render_detail(&self, asset: &Asset) -> View {
        View::Detail(
            DetailView::new(format!("Asset #{}", asset.id))
                .field("Name", &asset.name)
                .field("Category", &asset.category)
                .field("Acquired", &asset.acquisition_date)
                .field("Cost", money(asset.cost, &self.currency))
                .field("Status", name_or_id(asset.status.as_deref(), asset.status_id))
                .field(
                    "Location",
                    name_or_id(asset.location.as_deref(), asset.current_location_id),
                )
                .field("Department", or_unassigned(asset.department.as_deref())),
        )
    }

    fn build_form(
        editing: Option<&Asset>,
        statuses: &[AssetStatus],
        locations: &[Location],
        departments: &[Department],
    ) -> FormView {
        let title = editing.map_or_else(
            || "New asset".to_string(),
            |a| format!("Edit asset #{}", a.id),
        );
        let status_options = statuses
            .iter()
            .map(|s| SelectOption::new(s.id, &s.name))
            .collect();
        let location_options = locations
            .iter()
            .map(|l| SelectOption::new(l.id, &l.address))
            .collect();
        let department_options = std::iter::once(SelectOption::none())
            .chain(departments.iter().map(|d| SelectOption::new(d.id, &d.name)))
            .collect();

        FormView::new(
            title,
            vec![
                FormField::text("name", "Name", editing.map_or("", |a| a.name.as_str()), true),
                FormField::text(
                    "category",
                    "Category",
                    editing.map_or("", |a| a.category.as_str()),
                    true,
                ),
                FormField::text(
                    "acquisition_date",
                    "Acquisition date",
                    editing.map_or("", |a| a.acquisition_date.as_str()),
                    true,
                ),
                FormField::text(
                    "cost",
                    "Cost",
                    editing.map_or_else(String::new, |a| a.cost.to_string()),
                    true,
                ),
                FormField::select(
                    "status_id",
                    "Status",
                    editing.map(|a| a.status_id),
                    true,
                    status_options,
                ),
                FormField::select(
                    "current_location_id",
                    "Location",
                    editing.map(|a| a.current_location_id),
                    true,
                    location_options,
                ),
                FormField::select(
                    "department_id",
                    "Department",
                    editing.and_then(|a| a.department_id),
                    false,
                    department_options,
                ),
            ],
        )
    }

    fn form_loaded(&mut self, mut replies: Replies) -> Vec<Effect<AssetAction>> {
        let editing = self.pending_form.take();
        let statuses = replies.take::<Vec<AssetStatus>>();
        let locations = replies.take::<Vec<Location>>();
        let departments = replies.take::<Vec<Department>>();
        let asset = match editing {
            Some(_) => replies.take::<Asset>().map(Some),
            None => Ok(None),
        };

        match (statuses, locations, departments, asset) {
            (Ok(statuses), Ok(locations), Ok(departments), Ok(asset)) => {
                let view = Self::build_form(asset.as_ref(), &statuses, &locations, &departments);
                self.form = Some(OpenForm {
                    editing,
                    view: view.clone(),
                });
                vec![Effect::Render(View::Form(view))]
            }
            (Err(e), ..) | (_, Err(e), ..) | (_, _, Err(e), _) | (.., Err(e)) => {
                vec![Effect::Alert(e.message)]
            }
        }
    }

    fn draft(view: &FormView) -> Result<AssetDraft, String> {
        let missing = view.missing_required();
        if !missing.is_empty() {
            return Err(required_message(&missing));
        }

        let cost_raw = view.value("cost").trim();
        let cost: f64 = match cost_raw.parse::<f64>() {
            Ok(cost) if cost.is_finite() && cost >= 0.0 => cost,
            _ => return Err(format!("Cost must be a non-negative number: {cost_raw}")),
        };

        Ok(AssetDraft {
            name: view.value("name").trim().to_string(),
            category: view.value("category").trim().to_string(),
            acquisition_date: view.value("acquisition_date").trim().to_string(),
            cost,
            status_id: view.id_value("status_id")?.unwrap_or_default(),
            current_location_id: view.id_value("current_location_id")?.unwrap_or_default(),
            department_id: view.id_value("department_id")?,
        })
    }

    fn submit(&mut self, edits: &FieldEdits) -> Vec<Effect<AssetAction>> {
        let Some(form) = self.form.as_mut() else {
            return vec![Effect::Alert("No asset form is open".to_string())];
        };
        if let Err(msg) = form.view.apply(edits) {
            return vec![Effect::Alert(msg)];
        }
        let draft = match Self::draft(&form.view) {
            Ok(draft) => draft,
            Err(msg) => return vec![Effect::Alert(msg)],
        };
        let body = match serde_json::to_value(&draft) {
            Ok(body) => body,
            Err(e) => return vec![Effect::Log(format!("Failed to encode asset: {e}"))],
        };

        let call = match form.editing {
            Some(id) => ApiCall::put(format!("/assets/{id}"), body),
            None => ApiCall::post("/assets", body),
        };
        vec![Effect::request(call, AssetAction::Saved)]
    }
}

impl Controller for AssetsController {
    type Action = AssetAction;

    fn update(&mut self, action: AssetAction) -> Vec<Effect<AssetAction>> {
        match action {
            AssetAction::Load => vec![Self::reload()],
            AssetAction::Loaded(mut replies) => match replies.take::<Vec<Asset>>() {
                Ok(assets) => vec![Effect::Render(Self::render_list(&assets))],
                Err(e) => vec![Effect::Alert(e.message)],
            },

            AssetAction::Show(id) => vec![Effect::request(
                ApiCall::get(format!("/assets/{id}")),
                AssetAction::Shown,
            )],
            AssetAction::Shown(mut replies) => match replies.take::<Asset>() {
                Ok(asset) => vec![Effect::Render(self.render_detail(&asset))],
                Err(e) => vec![Effect::Alert(e.message)],
            },

            AssetAction::Delete(id) => vec![Effect::Confirm {
                prompt: format!("Delete asset #{id}?"),
                then: AssetAction::DeleteConfirmed(id),
            }],
            AssetAction::DeleteConfirmed(id) => vec![Effect::request(
                ApiCall::delete(format!("/assets/{id}")),
                AssetAction::Deleted,
            )],
            AssetAction::Deleted(mut replies) => match replies.take_unit() {
                Ok(()) => vec![
                    Effect::Render(View::Notice("Asset deleted".to_string())),
                    Self::reload(),
                ],
                Err(e) => vec![Effect::Alert(e.message)],
            },

            AssetAction::OpenForm(id) => {
                self.pending_form = id;
                self.form = None;
                let mut calls = vec![
                    ApiCall::get("/assets/statuses"),
                    ApiCall::get("/locations"),
                    ApiCall::get("/departments"),
                ];
                if let Some(id) = id {
                    calls.push(ApiCall::get(format!("/assets/{id}")));
                }
                vec![Effect::request_all(calls, AssetAction::FormLoaded)]
            }
            AssetAction::FormLoaded(replies) => self.form_loaded(replies),
            AssetAction::Submit(edits) => self.submit(&edits),
            AssetAction::Saved(mut replies) => match replies.take::<Value>() {
                Ok(reply) => {
                    self.form = None;
                    vec![
                        Effect::CloseForm,
                        Effect::Render(View::Notice(saved_notice("Asset", &reply))),
                        Self::reload(),
                    ]
                }
                Err(e) => vec![Effect::Alert(e.message)],
            },

            AssetAction::History(id) => {
                self.history_for = Some(id);
                vec![Effect::request(
                    ApiCall::get(format!("/assets/{id}/transfers")),
                    AssetAction::HistoryLoaded,
                )]
            }
            AssetAction::HistoryLoaded(mut replies) => match replies.take::<Vec<Transfer>>() {
                Ok(transfers) => {
                    let title = self.history_for.take().map_or_else(
                        || "Transfer history".to_string(),
                        |id| format!("Transfer history of asset #{id}"),
                    );
                    let mut table = TableView::new(title, &["ID", "Date", "From", "To", "Employee"]);
                    for t in &transfers {
                        table.push(vec![
                            t.id.to_string(),
                            super::display_datetime(&t.transfer_date),
                            name_or_id(t.from_location.as_deref(), t.from_location_id),
                            name_or_id(t.to_location.as_deref(), t.to_location_id),
                            name_or_id(t.employee_name.as_deref(), t.employee_id),
                        ]);
                    }
                    vec![Effect::Render(View::Table(table))]
                }
                Err(e) => vec![Effect::Alert(e.message)],
            },

            AssetAction::Statuses => vec![Effect::request(
                ApiCall::get("/assets/statuses"),
                AssetAction::StatusesLoaded,
            )],
            AssetAction::StatusesLoaded(mut replies) => match replies.take::<Vec<AssetStatus>>() {
                Ok(statuses) => {
                    let mut table = TableView::new("Asset statuses", &["ID", "Name"]);
                    for s in statuses {
                        table.push(vec![s.id.to_string(), s.name]);
                    }
                    vec![Effect::Render(View::Table(table))]
                }
                Err(e) => vec![Effect::Alert(e.message)],
            },
        }
    }
}
