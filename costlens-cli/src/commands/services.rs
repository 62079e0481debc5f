//! Services command - list built-in services.

use anyhow::Result;
use costlens_services::ServiceRegistry;
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the services command.
pub fn run(cli: &Cli) -> Result<()> {
    info!("Listing services");

    let registry = ServiceRegistry::with_builtin();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            println!("{}", formatter.format_services_header());
            println!("{}", "─".repeat(90));

            for plugin in registry.all() {
                println!("{}", formatter.format_service_line(plugin));
            }

            println!();
            println!("Total: {} services", registry.len());
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let plugins: Vec<_> = registry.all().collect();
            println!("{}", formatter.format_services(&plugins)?);
        }
    }

    Ok(())
}
