//! Console output utilities.

use console::style;

use crate::media::{MediaResult, PickerItem, ResolutionResult};
use crate::resolve::Diagnostics;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print a resolution result in human-readable form.
pub fn print_resolution(result: &ResolutionResult) {
    match result {
        ResolutionResult::Success(media) => print_media(media),
        ResolutionResult::Picker { items } => print_picker(items),
        ResolutionResult::Failure { message } => print_error(message),
    }
}

fn print_media(media: &MediaResult) {
    print_success(&media.title);
    println!();
    println!("  URL:      {}", style(&media.primary_url).underlined());
    println!("  Filename: {}", media.filename);
    if let Some(author) = &media.author {
        println!("  Author:   {}", author);
    }
    if let Some(thumbnail) = &media.thumbnail {
        println!("  Thumb:    {}", style(thumbnail).dim());
    }

    println!();
    println!("{}", style("Variants:").bold());
    for variant in &media.variants {
        let size = variant
            .size_bytes
            .map(|bytes| format!(" ({})", format_size(bytes)))
            .unwrap_or_default();
        println!("  {}{}", style(&variant.label).cyan(), style(size).dim());
        println!("    {}", variant.url);
    }
}

fn print_picker(items: &[PickerItem]) {
    print_success(&format!("Post contains {} items", items.len()));
    println!();
    for item in items {
        println!("  {}", style(&item.label).cyan());
        println!("    {}", item.url);
    }
}

/// Print the notes collected by each provider, in order.
pub fn print_diagnostics(diagnostics: &Diagnostics) {
    println!();
    println!("{}", style("Provider trace:").bold());
    if diagnostics.is_empty() {
        println!("  {}", style("(nothing recorded)").dim());
        return;
    }

    for entry in diagnostics.entries() {
        println!("  {} {}", style(format!("[{}]", entry.source)).yellow(), entry.message);
    }
}

/// Print provider names in chain order, marking disabled ones.
pub fn print_providers(names: &[&str], disabled: &[String]) {
    println!("{}", style("Providers (in order):").bold());
    for (index, name) in names.iter().enumerate() {
        let off = disabled.iter().any(|d| d.eq_ignore_ascii_case(name));
        if off {
            println!("  {:>2}. {} {}", index + 1, style(name).dim(), style("(disabled)").dim());
        } else {
            println!("  {:>2}. {}", index + 1, style(name).green());
        }
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
