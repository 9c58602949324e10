//! Pure formatting functions for CLI output.
//!
//! Functions here only print; all version computation happens elsewhere.

use console::style;

use crate::domain::Version;
use crate::parser::ParseResult;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a status message with a yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display the commit analysis for a branch.
///
/// Shows up to 10 parsed commits with their bump classification; parse
/// errors are listed as skipped.
pub fn display_commit_analysis(results: &[ParseResult], branch_name: &str) {
    println!(
        "\n{}",
        style(format!("Unreleased commits on branch '{}'", branch_name)).bold()
    );

    for result in results.iter().take(10) {
        match result {
            Ok(parsed) => println!(
                "  {} {} {}",
                style(parsed.short_id()).dim(),
                style(format!("[{}]", parsed.bump)).cyan(),
                parsed.descriptions.first().map(String::as_str).unwrap_or("")
            ),
            Err(error) => println!(
                "  {} {} {}",
                style(error.short_id()).dim(),
                style("[skipped]").yellow(),
                error.error
            ),
        }
    }

    if results.len() > 10 {
        println!("  ... and {} more commits", results.len() - 10);
    }
}

/// Display the computed version change (or the initial version).
pub fn display_next_version(last_version: Option<&Version>, next_version: &Version) {
    match last_version {
        Some(last) => {
            println!("\n{}", style("Next version:").bold());
            println!("  From: {}", style(last).red());
            println!("  To:   {}", style(next_version).green());
        }
        None => {
            println!("\n{}", style("Initial version:").bold());
            println!("  New version: {}", style(next_version).green());
        }
    }
}
