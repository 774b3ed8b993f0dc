//! Spotify Catalog Download Orchestrator Library
//!
//! This library provides the pieces needed to walk Spotify albums and artist
//! discographies and hand every resolved track to a download backend. It
//! authenticates a session, keeps a short-lived bearer token fresh, pages
//! through catalog endpoints and retries transient failures along the way.
//!
//! # Modules
//!
//! - `cli` - Command-line operations wiring the components together
//! - `config` - Configuration management and environment variables
//! - `context` - Run-scoped state shared by all components
//! - `error` - Error types for every failure domain
//! - `management` - Token cache, download archive and manifest persistence
//! - `printer` - Notification channels for warnings, errors and skips
//! - `spotify` - Spotify Web API access layer
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use sporldl::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> sporldl::Res<()> {
//!     config::load_env().await?;
//!     // Use CLI functions...
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod management;
pub mod printer;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern at the application boundary
/// using a boxed dynamic error trait object. Library components return their
/// own error enums from [`error`], which all convert into this type with `?`.
///
/// # Type Parameters
///
/// - `T` - The success type returned on successful operations
///
/// # Example
///
/// ```
/// use sporldl::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Example
///
/// ```
/// info!("Resolving album {}", album_id);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Logged in as {}", name);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Used for unrecoverable errors
/// that require immediate program termination. Library code never calls it;
/// recoverable failures go through [`failure!`] instead.
///
/// # Example
///
/// ```
/// error!("Failed to log in: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints an error message with a red exclamation mark and keeps running.
///
/// Same output as [`error!`] but without terminating the program, for
/// failures that only affect a single item of a larger run.
///
/// # Example
///
/// ```
/// failure!("Track {} could not be stored: {}", track_id, e);
/// ```
#[macro_export]
macro_rules! failure {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues or important notices that don't require program termination.
///
/// # Example
///
/// ```
/// warning!("Spotify API error (try {}), retrying", attempt);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a skip notice with a dimmed arrow.
///
/// # Example
///
/// ```
/// skipped!("Skipping track {} (already downloaded)", track_id);
/// ```
#[macro_export]
macro_rules! skipped {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", ">".dimmed().bold(), std::format_args!($($arg)*));
  })
}
