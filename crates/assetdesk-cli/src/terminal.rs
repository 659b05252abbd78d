//! Terminal presentation of controller views.
//!
//! Views go to stdout; prompts, hints and the error summary go to stderr.
//! Alerts are collected and turned into the command's error by
//! [`TerminalUi::finish`].

use std::io::{self, BufRead, Write};

use anyhow::{Result, anyhow};
use assetdesk_core::auth::Page;
use assetdesk_core::controllers::{ChartSeries, DetailView, FormView, TableView, View};
use assetdesk_core::runtime::Ui;
use comfy_table::{ContentArrangement, Table};

const BAR_WIDTH: usize = 40;

#[derive(Debug, Default)]
pub struct TerminalUi {
    assume_yes: bool,
    show_forms: bool,
    alerts: Vec<String>,
}

impl TerminalUi {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            ..Self::default()
        }
    }

    /// Forms are only printed when the user is browsing them.
    pub fn set_show_forms(&mut self, show: bool) {
        self.show_forms = show;
    }

    /// Fails with the collected alerts, if any.
    pub fn finish(self) -> Result<()> {
        if self.alerts.is_empty() {
            Ok(())
        } else {
            Err(anyhow!(self.alerts.join("\n")))
        }
    }
}

pub fn render_table(view: &TableView) -> String {
    if view.rows.is_empty() {
        return format!("{}\nNo records found.", view.title);
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(&view.headers);
    for row in &view.rows {
        table.add_row(row);
    }
    format!("{}\n{table}", view.title)
}

pub fn render_detail(view: &DetailView) -> String {
    let width = view.fields.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    let mut out = view.title.clone();
    for (label, value) in &view.fields {
        out.push_str(&format!("\n  {label:<width$}  {value}"));
    }
    out
}

pub fn render_form(view: &FormView) -> String {
    let mut out = view.title.clone();
    for field in &view.fields {
        let marker = if field.required { " *" } else { "" };
        out.push_str(&format!(
            "\n  {} ({}){marker}: {}",
            field.label, field.name, field.value
        ));
        for option in &field.options {
            let value = if option.value.is_empty() {
                "\"\""
            } else {
                option.value.as_str()
            };
            out.push_str(&format!("\n      {value} = {}", option.label));
        }
    }
    out
}

/// Horizontal bar chart scaled to the largest value.
pub fn render_chart(chart: &ChartSeries) -> String {
    let label_width = chart.labels.iter().map(String::len).max().unwrap_or(0);
    let max = chart.values.iter().copied().fold(0.0_f64, f64::max);
    let mut out = format!("{} ({})", chart.title, chart.label);
    for (label, value) in chart.labels.iter().zip(&chart.values) {
        let len = if max > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "\n  {label:<label_width$} | {} {value}",
            "#".repeat(len)
        ));
    }
    out
}

/// Writes `prompt [y/N]` and reads one answer; anything but y/yes declines.
pub fn ask_yes_no(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> bool {
    if let Err(e) = write!(output, "{prompt} [y/N] ").and_then(|()| output.flush()) {
        tracing::debug!(error = %e, "failed to write confirmation prompt");
    }

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read confirmation");
            false
        }
    }
}

impl Ui for TerminalUi {
    fn render(&mut self, view: &View) {
        match view {
            View::Table(table) => println!("{}\n", render_table(table)),
            View::Detail(detail) => println!("{}\n", render_detail(detail)),
            View::Form(form) => {
                if self.show_forms {
                    println!("{}", render_form(form));
                    println!("\nPass field values as options to submit (* = required).");
                }
            }
            View::Chart(chart) => println!("{}\n", render_chart(chart)),
            View::Notice(notice) => println!("{notice}"),
        }
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        ask_yes_no(prompt, &mut io::stdin().lock(), &mut io::stderr())
    }

    fn navigate(&mut self, page: Page) {
        match page {
            Page::Login => eprintln!("Session ended. Run `assetdesk login` to sign in again."),
            other => tracing::debug!(page = other.display_name(), "navigate"),
        }
    }

    fn close_form(&mut self) {
        tracing::debug!("form closed");
    }
}
