//! Login, logout, registration and the page guard.
//!
//! The auth controller is the only writer of the session store.

use reqwest::Method;

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::config::Config;
use crate::models::{Created, Credentials, Employee, EmployeeDraft, LoginResponse};
use crate::session::SharedSession;

/// Screens of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Login,
    Register,
    Dashboard,
    Assets,
    Employees,
    Departments,
    DepartmentEmployees,
    Transfers,
    Reports,
}

impl Page {
    /// Where an authenticated user lands.
    pub const DEFAULT: Page = Page::Dashboard;

    /// Pages reachable without a session.
    pub fn is_public(self) -> bool {
        matches!(self, Page::Login | Page::Register)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Page::Login => "login",
            Page::Register => "register",
            Page::Dashboard => "dashboard",
            Page::Assets => "assets",
            Page::Employees => "employees",
            Page::Departments => "departments",
            Page::DepartmentEmployees => "department employees",
            Page::Transfers => "transfers",
            Page::Reports => "reports",
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub employee: Option<Employee>,
    pub expires_at: Option<String>,
    pub redirect: Page,
}

/// Role given to self-registered employees when none is chosen.
pub const DEFAULT_ROLE: &str = "employee";

pub struct AuthController {
    session: SharedSession,
    login_path: String,
    register_path: String,
    logout_on_unauthorized: bool,
}

impl AuthController {
    pub fn new(session: SharedSession, config: &Config) -> Self {
        Self {
            session,
            login_path: config.login_path.clone(),
            register_path: config.register_path.clone(),
            logout_on_unauthorized: config.logout_on_unauthorized,
        }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn is_authenticated(&self) -> anyhow::Result<bool> {
        Ok(self.session.get()?.is_some())
    }

    /// Decides where a visit to `page` must be redirected, if anywhere.
    ///
    /// Without a session every private page leads to `Login`; with one,
    /// `Login` and `Register` lead to the default page.
    pub fn guard(&self, page: Page) -> anyhow::Result<Option<Page>> {
        let authenticated = self.is_authenticated()?;
        Ok(match (authenticated, page.is_public()) {
            (false, false) => Some(Page::Login),
            (true, true) => Some(Page::DEFAULT),
            _ => None,
        })
    }

    /// Authenticates and stores the returned token.
    ///
    /// Nothing is stored when the server rejects the credentials.
    pub async fn login(
        &self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> ApiResult<LoginOutcome> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::validation("Email and password are required"));
        }

        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = api
            .send_json(Method::POST, &self.login_path, &credentials)
            .await?;

        if response.token.trim().is_empty() {
            return Err(ApiError::decode("Login response did not include a token"));
        }

        self.session
            .set(&response.token)
            .map_err(|e| ApiError::storage(&e))?;
        tracing::info!(email, "logged in");

        Ok(LoginOutcome {
            employee: response.employee,
            expires_at: response.expires_at,
            redirect: Page::DEFAULT,
        })
    }

    /// Registers a new employee account and points the user at `Login`.
    pub async fn register(&self, api: &ApiClient, draft: &EmployeeDraft) -> ApiResult<Page> {
        let mut draft = draft.clone();
        if draft.role.trim().is_empty() {
            draft.role = DEFAULT_ROLE.to_string();
        }

        let mut missing = Vec::new();
        if draft.full_name.trim().is_empty() {
            missing.push("full_name");
        }
        if draft.email.trim().is_empty() {
            missing.push("email");
        }
        if draft.password.as_deref().is_none_or(str::is_empty) {
            missing.push("password");
        }
        if !missing.is_empty() {
            return Err(ApiError::validation(crate::controllers::required_message(
                &missing,
            )));
        }

        let created: serde_json::Value = api
            .send_json(Method::POST, &self.register_path, &draft)
            .await?;
        if let Ok(Created { id }) = serde_json::from_value::<Created>(created) {
            tracing::info!(id, "registered employee");
        }

        Ok(Page::Login)
    }

    /// Clears the session. Always lands on `Login`.
    pub fn logout(&self) -> anyhow::Result<Page> {
        let had_token = self.session.clear()?;
        tracing::info!(had_token, "logged out");
        Ok(Page::Login)
    }

    /// Reaction to a 401 from any API call.
    ///
    /// Returns the redirect when the session was dropped.
    pub fn handle_unauthorized(&self) -> anyhow::Result<Option<Page>> {
        if !self.logout_on_unauthorized {
            return Ok(None);
        }
        tracing::warn!("server rejected the session token");
        self.logout().map(Some)
    }
}
