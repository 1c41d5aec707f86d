//! Event rendering: colored status lines for humans, JSON lines for
//! machine consumers filling the GUI role.

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;
use sh2ai_core::PatchEvent;

#[derive(Serialize)]
struct StatusLine<'a> {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    event: &'a PatchEvent,
    message: String,
    success: bool,
    enabled_count: u64,
}

pub struct StatusPrinter {
    json: bool,
    enabled_count: u64,
}

impl StatusPrinter {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            enabled_count: 0,
        }
    }

    /// Monotonic count of successful patches this session.
    pub fn enabled_count(&self) -> u64 {
        self.enabled_count
    }

    pub fn print(&mut self, event: &PatchEvent) {
        if matches!(event, PatchEvent::Patched) {
            self.enabled_count += 1;
        }

        if self.json {
            self.print_json(event);
        } else {
            self.print_human(event);
        }
    }

    fn print_json(&self, event: &PatchEvent) {
        let line = StatusLine {
            timestamp: Utc::now(),
            event,
            message: event.message(),
            success: event.is_success(),
            enabled_count: self.enabled_count,
        };
        match serde_json::to_string(&line) {
            Ok(text) => println!("{text}"),
            Err(e) => tracing::error!("failed to encode status line: {e}"),
        }
    }

    fn print_human(&self, event: &PatchEvent) {
        let message = event.message();
        match event {
            PatchEvent::Patched => {
                println!("{} ({} times)", message.green(), self.enabled_count);
            }
            _ if event.is_success() => println!("{}", message.green()),
            _ => println!("{}", message.red()),
        }
    }
}
