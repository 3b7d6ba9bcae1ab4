//! Defaults command - prints the bundled default content tree.

use sitecms::content::{DEFAULT_CONTENT_VERSION, default_content};

use crate::cli::DefaultsArgs;

/// Run the defaults command
pub fn run(args: &DefaultsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let tree = default_content();
    let json = if args.compact {
        serde_json::to_string(&tree)?
    } else {
        serde_json::to_string_pretty(&tree)?
    };
    tracing::debug!(version = DEFAULT_CONTENT_VERSION, "Printing default content");
    println!("{json}");
    Ok(())
}
