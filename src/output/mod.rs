//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Resolution and provider trace rendering
//! - A spinner while resolving

pub mod console;
pub mod progress;

pub use console::{
    format_size, print_diagnostics, print_error, print_info, print_providers, print_resolution,
    print_success, print_warning,
};
pub use progress::create_spinner;
