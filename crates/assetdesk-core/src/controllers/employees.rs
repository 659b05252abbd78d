//! Employee list, detail and form.

use serde_json::Value;

use super::{
    Controller, DetailView, Effect, FieldEdits, FormField, FormView, Replies, SelectOption,
    TableView, View, or_unassigned, required_message, saved_notice,
};
use crate::api::ApiCall;
use crate::auth::DEFAULT_ROLE;
use crate::models::{Department, Employee, EmployeeDraft, Id};

#[derive(Debug)]
pub enum EmployeeAction {
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
}

#[derive(Debug)]
struct OpenForm {
    editing: Option<Id>,
    view: FormView,
}

#[derive(Debug, Default)]
pub struct EmployeesController {
    pending_form: Option<Id>,
    form: Option<OpenForm>,
}

/// Employee table used by both the employee list and department members.
pub(crate) fn employee_table(title: impl Into<String>, employees: &[Employee]) -> TableView {
    let mut table = TableView::new(
        title,
        &["ID", "Full name", "Position", "Email", "Role", "Department"],
    );
    for e in employees {
        table.push(vec![
            e.id.to_string(),
            e.full_name.clone(),
            e.position.clone(),
            e.email.clone(),
            e.role.clone(),
            or_unassigned(e.department.as_deref()),
        ]);
    }
    table
}

impl EmployeesController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form_open(&self) -> bool {
        self.form.is_some()
    }

    fn reload() -> Effect<EmployeeAction> {
        Effect::request(ApiCall::get("/employees"), EmployeeAction::Loaded)
    }

    fn build_form(editing: Option<&Employee>, departments: &[Department]) -> FormView {
        let title = editing.map_or_else(
            || "New employee".to_string(),
            |e| format!("Edit employee #{}", e.id),
        );
        let department_options = std::iter::once(SelectOption::none())
            .chain(departments.iter().map(|d| SelectOption::new(d.id, &d.name)))
            .collect();

        FormView::new(
            title,
            vec![
                FormField::text(
                    "full_name",
                    "Full name",
                    editing.map_or("", |e| e.full_name.as_str()),
                    true,
                ),
                FormField::text(
                    "position",
                    "Position",
                    editing.map_or("", |e| e.position.as_str()),
                    false,
                ),
                FormField::text("email", "Email", editing.map_or("", |e| e.email.as_str()), true),
                FormField::text(
                    "role",
                    "Role",
                    editing.map_or(DEFAULT_ROLE, |e| e.role.as_str()),
                    false,
                ),
                FormField::select(
                    "department_id",
                    "Department",
                    editing.and_then(|e| e.department_id),
                    false,
                    department_options,
                ),
                // Only a new employee must set a password.
                FormField::secret("password", "Password", editing.is_none()),
            ],
        )
    }

    fn form_loaded(&mut self, mut replies: Replies) -> Vec<Effect<EmployeeAction>> {
        let editing = self.pending_form.take();
        let departments = replies.take::<Vec<Department>>();
        let employee = match editing {
            Some(_) => replies.take::<Employee>().map(Some),
            None => Ok(None),
        };

        match (departments, employee) {
            (Ok(departments), Ok(employee)) => {
                let view = Self::build_form(employee.as_ref(), &departments);
                self.form = Some(OpenForm {
                    editing,
                    view: view.clone(),
                });
                vec![Effect::Render(View::Form(view))]
            }
            (Err(e), _) | (_, Err(e)) => vec![Effect::Alert(e.message)],
        }
    }

    fn draft(view: &FormView) -> Result<EmployeeDraft, String> {
        let missing = view.missing_required();
        if !missing.is_empty() {
            return Err(required_message(&missing));
        }

        let role = view.value("role").trim();
        let password = view.value("password");
        Ok(EmployeeDraft {
            full_name: view.value("full_name").trim().to_string(),
            position: view.value("position").trim().to_string(),
            email: view.value("email").trim().to_string(),
            role: if role.is_empty() { DEFAULT_ROLE } else { role }.to_string(),
            department_id: view.id_value("department_id")?,
            password: (!password.is_empty()).then(|| password.to_string()),
        })
    }

    fn submit(&mut self, edits: &FieldEdits) -> Vec<Effect<EmployeeAction>> {
        let Some(form) = self.form.as_mut() else {
            return vec![Effect::Alert("No employee form is open".to_string())];
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
            Err(e) => return vec![Effect::Log(format!("Failed to encode employee: {e}"))],
        };

        let call = match form.editing {
            Some(id) => ApiCall::put(format!("/employees/{id}"), body),
            None => ApiCall::post("/employees", body),
        };
        vec![Effect::request(call, EmployeeAction::Saved)]
    }
}

impl Controller for EmployeesController {
    type Action = EmployeeAction;

    fn update(&mut self, action: EmployeeAction) -> Vec<Effect<EmployeeAction>> {
        match action {
            EmployeeAction::Load => vec![Self::reload()],
            EmployeeAction::Loaded(mut replies) => match replies.take::<Vec<Employee>>() {
                Ok(employees) => vec![Effect::Render(View::Table(employee_table(
                    "Employees",
                    &employees,
                )))],
                Err(e) => vec![Effect::Alert(e.message)],
            },

            EmployeeAction::Show(id) => vec![Effect::request(
                ApiCall::get(format!("/employees/{id}")),
                EmployeeAction::Shown,
            )],
            EmployeeAction::Shown(mut replies) => match replies.take::<Employee>() {
                Ok(e) => vec![Effect::Render(View::Detail(
                    DetailView::new(format!("Employee #{}", e.id))
                        .field("Full name", &e.full_name)
                        .field("Position", &e.position)
                        .field("Email", &e.email)
                        .field("Role", &e.role)
                        .field("Department", or_unassigned(e.department.as_deref())),
                ))],
                Err(e) => vec![Effect::Alert(e.message)],
            },

            EmployeeAction::Delete(id) => vec![Effect::Confirm {
                prompt: format!("Delete employee #{id}?"),
                then: EmployeeAction::DeleteConfirmed(id),
            }],
            EmployeeAction::DeleteConfirmed(id) => vec![Effect::request(
                ApiCall::delete(format!("/employees/{id}")),
                EmployeeAction::Deleted,
            )],
            EmployeeAction::Deleted(mut replies) => match replies.take_unit() {
                Ok(()) => vec![
                    Effect::Render(View::Notice("Employee deleted".to_string())),
                    Self::reload(),
                ],
                Err(e) => vec![Effect::Alert(e.message)],
            },

            EmployeeAction::OpenForm(id) => {
                self.pending_form = id;
                self.form = None;
                let mut calls = vec![ApiCall::get("/departments")];
                if let Some(id) = id {
                    calls.push(ApiCall::get(format!("/employees/{id}")));
                }
                vec![Effect::request_all(calls, EmployeeAction::FormLoaded)]
            }
            EmployeeAction::FormLoaded(replies) => self.form_loaded(replies),
            EmployeeAction::Submit(edits) => self.submit(&edits),
            EmployeeAction::Saved(mut replies) => match replies.take::<Value>() {
                Ok(reply) => {
                    self.form = None;
                    vec![
                        Effect::CloseForm,
                        Effect::Render(View::Notice(saved_notice("Employee", &reply))),
                        Self::reload(),
                    ]
                }
                Err(e) => vec![Effect::Alert(e.message)],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use super::super::testing::*;
    use super::*;

    fn employee_json() -> Value {
        json!({
            "id": 4, "full_name": "Ann Lee", "position": "Clerk",
            "email": "ann@example.com", "role": "admin",
            "department_id": 7, "department": "IT"
        })
    }

    fn open_create_form(c: &mut EmployeesController) {
        let effects = c.update(EmployeeAction::OpenForm(None));
        c.update(respond(effects, vec![Ok(json!([{"id": 7, "name": "IT"}]))]));
    }

    #[test]
    fn test_list_rows() {
        let mut c = EmployeesController::new();
        let effects = c.update(EmployeeAction::Load);
        let effects = c.update(respond(effects, vec![Ok(json!([employee_json()]))]));
        assert_eq!(
            tables(&effects)[0].rows[0],
            vec!["4", "Ann Lee", "Clerk", "ann@example.com", "admin", "IT"]
        );
    }

    #[test]
    fn test_password_required_for_new_employee() {
        let mut c = EmployeesController::new();
        open_create_form(&mut c);

        let effects = c.update(EmployeeAction::Submit(edits(&[
            ("full_name", "Bo Chen"),
            ("email", "bo@example.com"),
        ])));
        assert!(calls(&effects).is_empty());
        assert_eq!(alerts(&effects), vec!["Required fields are missing: password"]);
    }

    #[test]
    fn test_create_sends_password_and_default_role() {
        let mut c = EmployeesController::new();
        open_create_form(&mut c);

        let effects = c.update(EmployeeAction::Submit(edits(&[
            ("full_name", "Bo Chen"),
            ("email", "bo@example.com"),
            ("password", "secret"),
            ("department_id", "7"),
        ])));
        let call = calls(&effects)[0].clone();
        assert_eq!(call.method, Method::POST);
        assert_eq!(call.path, "/employees");
        let body = call.body.unwrap();
        assert_eq!(body["password"], "secret");
        assert_eq!(body["role"], "employee");
        assert_eq!(body["department_id"], 7);
    }

    #[test]
    fn test_update_omits_blank_password() {
        let mut c = EmployeesController::new();
        let effects = c.update(EmployeeAction::OpenForm(Some(4)));
        assert_eq!(calls(&effects).len(), 2);
        let effects = c.update(respond(
            effects,
            vec![Ok(json!([{"id": 7, "name": "IT"}])), Ok(employee_json())],
        ));
        assert_eq!(form(&effects).value("role"), "admin");

        let effects = c.update(EmployeeAction::Submit(edits(&[("position", "Lead")])));
        let call = calls(&effects)[0].clone();
        assert_eq!(call.method, Method::PUT);
        assert_eq!(call.path, "/employees/4");
        let body = call.body.unwrap();
        assert!(body.get("password").is_none());
        assert_eq!(body["position"], "Lead");

        let effects = c.update(respond(effects, vec![Ok(Value::Null)]));
        assert!(closes_form(&effects));
        assert_eq!(calls(&effects)[0].path, "/employees");
    }

    #[test]
    fn test_delete_flow_surfaces_server_error() {
        let mut c = EmployeesController::new();
        let (_, then) = confirm(c.update(EmployeeAction::Delete(4)));
        let effects = c.update(then);
        assert_eq!(calls(&effects)[0].path, "/employees/4");

        let effects = c.update(respond(
            effects,
            vec![Err(crate::api::ApiError::http_status(
                409,
                r#"{"error":"employee has transfers"}"#,
            ))],
        ));
        assert_eq!(alerts(&effects), vec!["employee has transfers"]);
        assert!(calls(&effects).is_empty());
    }

    #[test]
    fn test_password_sent_as_typed() {
        let mut c = EmployeesController::new();
        open_create_form(&mut c);

        let effects = c.update(EmployeeAction::Submit(edits(&[
            ("full_name", "  Bo Chen "),
            ("email", "bo@example.com"),
            ("password", "  pass phrase  "),
        ])));
        let body = calls(&effects)[0].clone().body.unwrap();
        assert_eq!(body["password"], "  pass phrase  ");
        assert_eq!(body["full_name"], "Bo Chen");
    }
}
