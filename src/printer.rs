//! Notification channels.
//!
//! Components never print directly. They report through a [`Notifier`] so the
//! binary decides what reaches the console and tests can record what was said.

use std::fmt;

use crate::{config::Config, failure, skipped, warning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrintChannel {
    Warnings,
    Errors,
    ApiErrors,
    Skips,
}

impl fmt::Display for PrintChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrintChannel::Warnings => "WARNINGS",
            PrintChannel::Errors => "ERRORS",
            PrintChannel::ApiErrors => "API_ERRORS",
            PrintChannel::Skips => "SKIPS",
        };
        f.write_str(name)
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, channel: PrintChannel, message: &str);
}

/// Console notifier with per-channel toggles.
#[derive(Debug, Clone)]
pub struct Printer {
    warnings: bool,
    errors: bool,
    api_errors: bool,
    skips: bool,
}

impl Printer {
    pub fn new(config: &Config) -> Self {
        Printer {
            warnings: config.print_warnings,
            errors: config.print_errors,
            api_errors: config.print_api_errors,
            skips: config.print_skips,
        }
    }

    pub fn is_enabled(&self, channel: PrintChannel) -> bool {
        match channel {
            PrintChannel::Warnings => self.warnings,
            PrintChannel::Errors => self.errors,
            PrintChannel::ApiErrors => self.api_errors,
            PrintChannel::Skips => self.skips,
        }
    }
}

impl Default for Printer {
    fn default() -> Self {
        Printer {
            warnings: true,
            errors: true,
            api_errors: true,
            skips: true,
        }
    }
}

impl Notifier for Printer {
    fn notify(&self, channel: PrintChannel, message: &str) {
        if !self.is_enabled(channel) {
            return;
        }

        match channel {
            PrintChannel::Warnings => warning!("{}", message),
            PrintChannel::Errors | PrintChannel::ApiErrors => failure!("{}", message),
            PrintChannel::Skips => skipped!("{}", message),
        }
    }
}
