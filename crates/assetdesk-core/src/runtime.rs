//! Effect interpreter.
//!
//! Controllers describe work as [`Effect`]s; the runtime performs it. API
//! calls of one `Request` run concurrently and their results are fed back
//! to the controller in call order. Presentation is delegated to a [`Ui`].

use std::collections::VecDeque;

use anyhow::Result;
use futures_util::future::join_all;

use crate::api::{ApiCall, ApiClient};
use crate::auth::{AuthController, Page};
use crate::controllers::{Controller, Effect, Replies, View};

/// Presentation surface driven by the runtime.
pub trait Ui {
    fn render(&mut self, view: &View);

    /// Blocking, user-visible error.
    fn alert(&mut self, message: &str);

    /// Asks a yes/no question.
    fn confirm(&mut self, prompt: &str) -> bool;

    fn navigate(&mut self, page: Page);

    fn close_form(&mut self);
}

pub struct Runtime<U> {
    api: ApiClient,
    auth: AuthController,
    ui: U,
}

impl<U: Ui> Runtime<U> {
    pub fn new(api: ApiClient, auth: AuthController, ui: U) -> Self {
        Self { api, auth, ui }
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn into_ui(self) -> U {
        self.ui
    }

    /// Feeds `action` to `controller` and runs effects until none remain.
    ///
    /// Effects produced while handling an effect run before the ones queued
    /// after it. A 401 reply ends the dispatch after the session is dropped.
    ///
    /// # Errors
    /// Only session storage failures; API errors are the controller's to
    /// report.
    pub async fn dispatch<C: Controller>(
        &mut self,
        controller: &mut C,
        action: C::Action,
    ) -> Result<()> {
        let mut pending: VecDeque<Effect<C::Action>> = controller.update(action).into();

        while let Some(effect) = pending.pop_front() {
            let next = match effect {
                Effect::Request { calls, then } => {
                    let replies = self.execute(&calls).await;
                    if let Some(err) = replies.first_unauthorized() {
                        let message = err.message.clone();
                        if let Some(page) = self.auth.handle_unauthorized()? {
                            self.ui.alert(&message);
                            self.ui.navigate(page);
                            return Ok(());
                        }
                    }
                    Some(then(replies))
                }
                Effect::Render(view) => {
                    self.ui.render(&view);
                    None
                }
                Effect::Alert(message) => {
                    self.ui.alert(&message);
                    None
                }
                Effect::Log(message) => {
                    tracing::warn!("{message}");
                    None
                }
                Effect::Confirm { prompt, then } => {
                    if self.ui.confirm(&prompt) {
                        Some(then)
                    } else {
                        tracing::debug!(prompt, "declined");
                        None
                    }
                }
                Effect::Navigate(page) => {
                    self.ui.navigate(page);
                    None
                }
                Effect::CloseForm => {
                    self.ui.close_form();
                    None
                }
            };

            if let Some(action) = next {
                for effect in controller.update(action).into_iter().rev() {
                    pending.push_front(effect);
                }
            }
        }

        Ok(())
    }

    async fn execute(&self, calls: &[ApiCall]) -> Replies {
        let results = join_all(calls.iter().map(|call| self.api.call(call))).await;
        Replies::new(results)
    }
}
