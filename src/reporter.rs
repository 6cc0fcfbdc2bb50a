//! Presentation of pipeline progress.
//!
//! The pipeline talks to a [`Reporter`] only; it never prints on its own.

use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Stream, Style};

pub trait Reporter: Send + Sync {
    /// A step started.
    fn start(&self, message: &str);
    /// The running step finished.
    fn succeed(&self, message: &str);
    /// The running step failed.
    fn fail(&self, message: &str);
    /// A message from inside a step, shown only on verbose runs.
    fn info(&self, message: &str);
    /// The whole run finished successfully.
    fn done(&self, message: &str);
    /// The whole run failed. `diagnostics` holds the full error when verbose.
    fn failed(&self, message: &str, diagnostics: Option<&str>);
}

fn plain_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Spinner based reporter for interactive terminals.
pub struct TerminalReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalReporter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn finish(&self, symbol: &str, message: String) {
        let line = format!("{symbol} {message}");
        match self.take_spinner() {
            Some(spinner) if !spinner.is_hidden() => {
                spinner.set_style(plain_style());
                spinner.finish_with_message(line);
            }
            Some(spinner) => {
                spinner.finish_and_clear();
                println!("{line}");
            }
            None => println!("{line}"),
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TerminalReporter {
    fn start(&self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));

        // Not a terminal: no animation, so say what is going on once.
        if spinner.is_hidden() {
            println!("- {message}");
        }

        if let Some(previous) = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(spinner)
        {
            previous.finish_and_clear();
        }
    }

    fn succeed(&self, message: &str) {
        let symbol = "✔".if_supports_color(Stream::Stdout, |s| s.green()).to_string();
        let message = message
            .if_supports_color(Stream::Stdout, |s| s.green())
            .to_string();
        self.finish(&symbol, message);
    }

    fn fail(&self, message: &str) {
        let symbol = "✖".if_supports_color(Stream::Stdout, |s| s.red()).to_string();
        let message = message
            .if_supports_color(Stream::Stdout, |s| s.red())
            .to_string();
        self.finish(&symbol, message);
    }

    fn info(&self, message: &str) {
        let spinner = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        match spinner.as_ref() {
            Some(spinner) if !spinner.is_hidden() => spinner.println(message),
            _ => println!("{message}"),
        }
    }

    fn done(&self, message: &str) {
        println!(
            "{}",
            message.if_supports_color(Stream::Stdout, |s| s.green())
        );
    }

    fn failed(&self, message: &str, diagnostics: Option<&str>) {
        println!(
            "{}",
            message.if_supports_color(Stream::Stdout, |s| s.style(Style::new().red()))
        );
        if let Some(diagnostics) = diagnostics {
            eprintln!("{diagnostics}");
        }
    }
}

/// Everything a [`RecordingReporter`] saw, in order.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start(String),
    Succeed(String),
    Fail(String),
    Info(String),
    Done(String),
    Failed(String, Option<String>),
}

/// Reporter that stores events instead of printing them.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

#[cfg(test)]
impl RecordingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn start(&self, message: &str) {
        self.push(Event::Start(message.to_string()));
    }

    fn succeed(&self, message: &str) {
        self.push(Event::Succeed(message.to_string()));
    }

    fn fail(&self, message: &str) {
        self.push(Event::Fail(message.to_string()));
    }

    fn info(&self, message: &str) {
        self.push(Event::Info(message.to_string()));
    }

    fn done(&self, message: &str) {
        self.push(Event::Done(message.to_string()));
    }

    fn failed(&self, message: &str, diagnostics: Option<&str>) {
        self.push(Event::Failed(
            message.to_string(),
            diagnostics.map(str::to_string),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_reporter_keeps_order() {
        let reporter = RecordingReporter::new();
        reporter.start("a");
        reporter.info("b");
        reporter.succeed("c");
        reporter.failed("d", Some("e"));

        assert_eq!(
            reporter.events(),
            vec![
                Event::Start("a".into()),
                Event::Info("b".into()),
                Event::Succeed("c".into()),
                Event::Failed("d".into(), Some("e".into())),
            ]
        );
    }
}
