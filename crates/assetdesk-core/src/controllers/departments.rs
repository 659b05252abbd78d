//! Departments, their heads and members.

use serde_json::Value;

use super::employees::employee_table;
use super::{
    Controller, DetailView, Effect, FieldEdits, FormField, FormView, Replies, SelectOption,
    TableView, View, or_unassigned, required_message, saved_notice,
};
use crate::api::ApiCall;
use crate::auth::Page;
use crate::models::{Department, DepartmentDraft, Employee, Id};

#[derive(Debug)]
pub enum DepartmentAction {
    Load,
    Loaded(Replies),
    Show(Id),
    Shown(Replies),
    Delete(Id),
    DeleteConfirmed(Id),
    Deleted(Replies),
    OpenForm(Option<Id>),
    FormLoaded(Replies),
    Submit(FieldEdits),
    Saved(Replies),
    Members(Id),
    MembersLoaded(Replies),
}

#[derive(Debug)]
struct OpenForm {
    editing: Option<Id>,
    view: FormView,
}

#[derive(Debug, Default)]
pub struct DepartmentsController {
    pending_form: Option<Id>,
    form: Option<OpenForm>,
    members_of: Option<Id>,
}

/// Head candidate label, e.g. `Ann Lee (Clerk)`.
fn head_label(employee: &Employee) -> String {
    if employee.position.trim().is_empty() {
        employee.full_name.clone()
    } else {
        format!("{} ({})", employee.full_name, employee.position)
    }
}

impl DepartmentsController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form_open(&self) -> bool {
        self.form.is_some()
    }

    fn reload() -> Effect<DepartmentAction> {
        Effect::request(ApiCall::get("/departments"), DepartmentAction::Loaded)
    }

    fn build_form(editing: Option<&Department>, employees: &[Employee]) -> FormView {
        let title = editing.map_or_else(
            || "New department".to_string(),
            |d| format!("Edit department #{}", d.id),
        );
        let head_options = std::iter::once(SelectOption::none())
            .chain(employees.iter().map(|e| SelectOption::new(e.id, head_label(e))))
            .collect();

        FormView::new(
            title,
            vec![
                FormField::text("name", "Name", editing.map_or("", |d| d.name.as_str()), true),
                FormField::text(
                    "location",
                    "Location",
                    editing.map_or("", |d| d.location.as_str()),
                    true,
                ),
                FormField::select(
                    "head_id",
                    "Head",
                    editing.and_then(|d| d.head_id),
                    false,
                    head_options,
                ),
            ],
        )
    }

    fn form_loaded(&mut self, mut replies: Replies) -> Vec<Effect<DepartmentAction>> {
        let editing = self.pending_form.take();
        let employees = replies.take::<Vec<Employee>>();
        let department = match editing {
            Some(_) => replies.take::<Department>().map(Some),
            None => Ok(None),
        };

        match (employees, department) {
            (Ok(employees), Ok(department)) => {
                let view = Self::build_form(department.as_ref(), &employees);
                self.form = Some(OpenForm {
                    editing,
                    view: view.clone(),
                });
                vec![Effect::Render(View::Form(view))]
            }
            (Err(e), _) | (_, Err(e)) => vec![Effect::Alert(e.message)],
        }
    }

    fn submit(&mut self, edits: &FieldEdits) -> Vec<Effect<DepartmentAction>> {
        let Some(form) = self.form.as_mut() else {
            return vec![Effect::Alert("No department form is open".to_string())];
        };
        if let Err(msg) = form.view.apply(edits) {
            return vec![Effect::Alert(msg)];
        }
        let missing = form.view.missing_required();
        if !missing.is_empty() {
            return vec![Effect::Alert(required_message(&missing))];
        }
        let head_id = match form.view.id_value("head_id") {
            Ok(head_id) => head_id,
            Err(msg) => return vec![Effect::Alert(msg)],
        };
        let draft = DepartmentDraft {
            name: form.view.value("name").trim().to_string(),
            location: form.view.value("location").trim().to_string(),
            head_id,
        };
        let body = match serde_json::to_value(&draft) {
            Ok(body) => body,
            Err(e) => return vec![Effect::Log(format!("Failed to encode department: {e}"))],
        };

        let call = match form.editing {
            Some(id) => ApiCall::put(format!("/departments/{id}"), body),
            None => ApiCall::post("/departments", body),
        };
        vec![Effect::request(call, DepartmentAction::Saved)]
    }
}

impl Controller for DepartmentsController {
    type Action = DepartmentAction;

    fn update(&mut self, action: DepartmentAction) -> Vec<Effect<DepartmentAction>> {
        match action {
            DepartmentAction::Load => vec![Self::reload()],
            DepartmentAction::Loaded(mut replies) => match replies.take::<Vec<Department>>() {
                Ok(departments) => {
                    let mut table = TableView::new("Departments", &["ID", "Name", "Location", "Head"]);
                    for d in departments {
                        table.push(vec![
                            d.id.to_string(),
                            d.name,
                            d.location,
                            or_unassigned(d.head_name.as_deref()),
                        ]);
                    }
                    vec![Effect::Render(View::Table(table))]
                }
                Err(e) => vec![Effect::Alert(e.message)],
            },

            DepartmentAction::Show(id) => vec![Effect::request(
                ApiCall::get(format!("/departments/{id}")),
                DepartmentAction::Shown,
            )],
            DepartmentAction::Shown(mut replies) => match replies.take::<Department>() {
                Ok(d) => vec![Effect::Render(View::Detail(
                    DetailView::new(format!("Department #{}", d.id))
                        .field("Name", &d.name)
                        .field("Location", &d.location)
                        .field("Head", or_unassigned(d.head_name.as_deref())),
                ))],
                Err(e) => vec![Effect::Alert(e.message)],
            },

            DepartmentAction::Delete(id) => vec![Effect::Confirm {
                prompt: format!("Delete department #{id}?"),
                then: DepartmentAction::DeleteConfirmed(id),
            }],
            DepartmentAction::DeleteConfirmed(id) => vec![Effect::request(
                ApiCall::delete(format!("/departments/{id}")),
                DepartmentAction::Deleted,
            )],
            DepartmentAction::Deleted(mut replies) => match replies.take_unit() {
                Ok(()) => vec![
                    Effect::Render(View::Notice("Department deleted".to_string())),
                    Self::reload(),
                ],
                Err(e) => vec![Effect::Alert(e.message)],
            },

            DepartmentAction::OpenForm(id) => {
                self.pending_form = id;
                self.form = None;
                let mut calls = vec![ApiCall::get("/employees")];
                if let Some(id) = id {
                    calls.push(ApiCall::get(format!("/departments/{id}")));
                }
                vec![Effect::request_all(calls, DepartmentAction::FormLoaded)]
            }
            DepartmentAction::FormLoaded(replies) => self.form_loaded(replies),
            DepartmentAction::Submit(edits) => self.submit(&edits),
            DepartmentAction::Saved(mut replies) => match replies.take::<Value>() {
                Ok(reply) => {
                    self.form = None;
                    vec![
                        Effect::CloseForm,
                        Effect::Render(View::Notice(saved_notice("Department", &reply))),
                        Self::reload(),
                    ]
                }
                Err(e) => vec![Effect::Alert(e.message)],
            },

            DepartmentAction::Members(id) => {
                self.members_of = Some(id);
                vec![
                    Effect::Navigate(Page::DepartmentEmployees),
                    Effect::request(
                        ApiCall::get(format!("/departments/{id}/employees")),
                        DepartmentAction::MembersLoaded,
                    ),
                ]
            }
            DepartmentAction::MembersLoaded(mut replies) => match replies.take::<Vec<Employee>>() {
                Ok(employees) => {
                    let title = self.members_of.take().map_or_else(
                        || "Department employees".to_string(),
                        |id| format!("Employees of department #{id}"),
                    );
                    vec![Effect::Render(View::Table(employee_table(title, &employees)))]
                }
                Err(e) => vec![Effect::Alert(e.message)],
            },
        }
    }
}
