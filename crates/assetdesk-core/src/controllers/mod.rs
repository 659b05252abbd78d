//! Screen workflows as pure state machines.
//!
//! A controller owns the state of one screen. `update` takes an action,
//! mutates state and returns effects; it never performs I/O. The
//! [`Runtime`](crate::runtime::Runtime) executes the effects and feeds
//! request results back in as new actions.

use std::collections::VecDeque;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{self, ApiCall, ApiError, ApiResult};
use crate::auth::Page;
use crate::models::Id;

pub mod assets;
pub mod dashboard;
pub mod departments;
pub mod employees;
pub mod reports;
pub mod transfers;

/// Label used wherever an optional reference is empty.
pub const UNASSIGNED: &str = "Unassigned";

/// Source of the current local time, swappable in tests.
pub type Clock = fn() -> NaiveDateTime;

pub fn system_clock() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Current UTC time; report date windows are expressed in UTC days.
pub fn utc_clock() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// Field values typed by the user, applied over a loaded form by name.
pub type FieldEdits = Vec<(String, String)>;

/// A screen state machine.
pub trait Controller {
    type Action;

    fn update(&mut self, action: Self::Action) -> Vec<Effect<Self::Action>>;
}

/// Work a controller asks the runtime to perform.
#[derive(Debug)]
pub enum Effect<A> {
    /// Issue the calls concurrently; results come back in call order.
    Request {
        calls: Vec<ApiCall>,
        then: fn(Replies) -> A,
    },
    Render(View),
    /// Blocking, user-visible error.
    Alert(String),
    /// Diagnostic only.
    Log(String),
    /// Dispatch `then` only if the user agrees.
    Confirm { prompt: String, then: A },
    Navigate(Page),
    CloseForm,
}

impl<A> Effect<A> {
    pub fn request(call: ApiCall, then: fn(Replies) -> A) -> Self {
        Effect::Request {
            calls: vec![call],
            then,
        }
    }

    pub fn request_all(calls: Vec<ApiCall>, then: fn(Replies) -> A) -> Self {
        Effect::Request { calls, then }
    }
}

/// Results of one `Effect::Request`, consumed front to back.
#[derive(Debug)]
pub struct Replies {
    results: VecDeque<ApiResult<Value>>,
}

impl Replies {
    pub fn new(results: Vec<ApiResult<Value>>) -> Self {
        Self {
            results: results.into(),
        }
    }

    /// Decodes the next result.
    pub fn take<T: DeserializeOwned>(&mut self) -> ApiResult<T> {
        let value = self
            .results
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::decode("Missing response")))?;
        api::decode(value)
    }

    /// Consumes the next result, discarding a successful body.
    pub fn take_unit(&mut self) -> ApiResult<()> {
        self.results
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::decode("Missing response")))
            .map(drop)
    }

    pub fn first_unauthorized(&self) -> Option<&ApiError> {
        self.results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .find(|e| e.is_unauthorized())
    }
}

/// Something to show the user.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Table(TableView),
    Detail(DetailView),
    Form(FormView),
    Chart(ChartSeries),
    Notice(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            title: title.into(),
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub title: String,
    pub fields: Vec<(String, String)>,
}

impl DetailView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, label: &str, value: impl Into<String>) -> Self {
        self.fields.push((label.to_string(), value.into()));
        self
    }
}

/// A create/edit form with its reference dropdowns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub title: String,
    pub fields: Vec<FormField>,
}

impl FormView {
    pub fn new(title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            title: title.into(),
            fields,
        }
    }

    /// Current value of `name`, empty when the field does not exist.
    pub fn value(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map_or("", |f| f.value.as_str())
    }

    /// Parsed id from a select field; `None` when blank.
    pub fn id_value(&self, name: &str) -> Result<Option<Id>, String> {
        let raw = self.value(name).trim();
        if raw.is_empty() {
            return Ok(None);
        }
        match raw.parse() {
            Ok(id) => Ok(Some(id)),
            Err(_) => Err(format!("Invalid value for {name}: {raw}")),
        }
    }

    /// Applies user edits, rejecting unknown fields and choices outside a
    /// dropdown's options.
    pub fn apply(&mut self, edits: &[(String, String)]) -> Result<(), String> {
        for (name, value) in edits {
            let field = self
                .fields
                .iter_mut()
                .find(|f| &f.name == name)
                .ok_or_else(|| format!("Unknown field: {name}"))?;
            let value = if field.secret {
                value.as_str()
            } else {
                value.trim()
            };
            if !field.options.is_empty()
                && !value.is_empty()
                && !field.options.iter().any(|o| o.value == value)
            {
                return Err(format!("Invalid choice for {}: {value}", field.label));
            }
            field.value = value.to_string();
        }
        Ok(())
    }

    /// Names of required fields left blank.
    pub fn missing_required(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required && !present(&f.value))
            .map(|f| f.name.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub value: String,
    pub required: bool,
    /// Kept exactly as typed (passwords).
    pub secret: bool,
    /// Non-empty for dropdowns.
    pub options: Vec<SelectOption>,
}

impl FormField {
    pub fn text(name: &str, label: &str, value: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: value.into(),
            required,
            secret: false,
            options: Vec::new(),
        }
    }

    /// Text field whose value is never trimmed.
    pub fn secret(name: &str, label: &str, required: bool) -> Self {
        Self {
            secret: true,
            ..Self::text(name, label, "", required)
        }
    }

    pub fn select(
        name: &str,
        label: &str,
        value: Option<Id>,
        required: bool,
        options: Vec<SelectOption>,
    ) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: value.map(|v| v.to_string()).unwrap_or_default(),
            required,
            secret: false,
            options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: Id, label: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            label: label.into(),
        }
    }

    /// The empty choice for optional references.
    pub fn none() -> Self {
        Self {
            value: String::new(),
            label: UNASSIGNED.to_string(),
        }
    }
}

/// Chart-ready label/value pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub title: String,
    pub label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Whether a field holds something after trimming.
pub(crate) fn present(value: &str) -> bool {
    !value.trim().is_empty()
}

pub(crate) fn required_message(missing: &[&str]) -> String {
    format!("Required fields are missing: {}", missing.join(", "))
}

pub(crate) fn or_unassigned(value: Option<&str>) -> String {
    value
        .filter(|v| present(v))
        .map_or_else(|| UNASSIGNED.to_string(), str::to_string)
}

/// Joined display name, or the raw id when the server did not join it.
pub(crate) fn name_or_id(name: Option<&str>, id: Id) -> String {
    name.filter(|n| present(n))
        .map_or_else(|| format!("#{id}"), str::to_string)
}

/// Notice for a successful save; create endpoints answer with `{id}`.
pub(crate) fn saved_notice(entity: &str, reply: &Value) -> String {
    match reply.get("id").and_then(Value::as_i64) {
        Some(id) => format!("{entity} #{id} created"),
        None => format!("{entity} saved"),
    }
}

/// Formats an amount the way report tables show it.
pub fn money(amount: f64, currency: &str) -> String {
    format!("{amount:.2} {currency}")
}

/// Date part of a server timestamp, or the raw text when unparseable.
pub(crate) fn display_date(raw: &str) -> String {
    crate::models::parse_timestamp(raw)
        .map_or_else(|| raw.to_string(), |dt| dt.format("%Y-%m-%d").to_string())
}

/// Date and time of a server timestamp, or the raw text when unparseable.
pub(crate) fn display_datetime(raw: &str) -> String {
    crate::models::parse_timestamp(raw).map_or_else(
        || raw.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
    )
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::Location;

    #[test]
    fn test_replies_decode_in_order() {
        let mut replies = Replies::new(vec![
            Ok(json!([{"id": 1, "address": "HQ"}])),
            Err(ApiError::http_status(500, r#"{"error":"down"}"#)),
        ]);

        let locations: Vec<Location> = replies.take().unwrap();
        assert_eq!(locations[0].address, "HQ");

        let err = replies.take::<Vec<Location>>().unwrap_err();
        assert_eq!(err.message, "down");

        assert!(replies.take_unit().is_err());
    }

    fn sample_form() -> FormView {
        FormView::new(
            "New asset",
            vec![
                FormField::text("name", "Name", "Laptop", true),
                FormField::text("category", "Category", "", true),
                FormField::select(
                    "status_id",
                    "Status",
                    None,
                    true,
                    vec![SelectOption::new(1, "In Use"), SelectOption::new(2, "Broken")],
                ),
            ],
        )
    }

    #[test]
    fn test_form_missing_required_lists_blank_names() {
        let form = sample_form();
        let missing = form.missing_required();
        assert_eq!(missing, vec!["category", "status_id"]);
        assert_eq!(
            required_message(&missing),
            "Required fields are missing: category, status_id"
        );
    }

    #[test]
    fn test_form_apply_edits() {
        let mut form = sample_form();
        form.apply(&[
            ("category".to_string(), " IT ".to_string()),
            ("status_id".to_string(), "2".to_string()),
        ])
        .unwrap();
        assert_eq!(form.value("category"), "IT");
        assert_eq!(form.id_value("status_id").unwrap(), Some(2));
        assert!(form.missing_required().is_empty());
    }

    #[test]
    fn test_form_apply_rejects_unknown_field_and_choice() {
        let mut form = sample_form();
        let err = form
            .apply(&[("colour".to_string(), "red".to_string())])
            .unwrap_err();
        assert_eq!(err, "Unknown field: colour");

        let err = form
            .apply(&[("status_id".to_string(), "9".to_string())])
            .unwrap_err();
        assert_eq!(err, "Invalid choice for Status: 9");
    }

    #[test]
    fn test_or_unassigned() {
        assert_eq!(or_unassigned(None), UNASSIGNED);
        assert_eq!(or_unassigned(Some("")), UNASSIGNED);
        assert_eq!(or_unassigned(Some("IT")), "IT");
    }

    #[test]
    fn test_name_or_id() {
        assert_eq!(name_or_id(Some("HQ"), 3), "HQ");
        assert_eq!(name_or_id(None, 3), "#3");
    }

    #[test]
    fn test_saved_notice() {
        assert_eq!(saved_notice("Asset", &json!({"id": 4})), "Asset #4 created");
        assert_eq!(saved_notice("Asset", &Value::Null), "Asset saved");
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1000.0, "₽"), "1000.00 ₽");
        assert_eq!(money(0.5, "$"), "0.50 $");
    }

    #[test]
    fn test_display_dates() {
        assert_eq!(display_date("2024-05-01T09:30:00Z"), "2024-05-01");
        assert_eq!(display_datetime("2024-05-01T09:30:00Z"), "2024-05-01 09:30");
        assert_eq!(display_date("n/a"), "n/a");
    }

    #[test]
    fn test_apply_trims_text_but_not_secrets() {
        let mut form = FormView::new(
            "New employee",
            vec![
                FormField::text("email", "Email", "", true),
                FormField::secret("password", "Password", true),
            ],
        );
        form.apply(&[
            ("email".to_string(), " bo@example.com ".to_string()),
            ("password".to_string(), " pw ".to_string()),
        ])
        .unwrap();
        assert_eq!(form.value("email"), "bo@example.com");
        assert_eq!(form.value("password"), " pw ");
    }
}
