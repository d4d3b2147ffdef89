use std::path::Path;

use keel_core::export::{build_export_bundle, render_export, ExportFormat};

use crate::commands::common::AppContext;
use crate::error::CliError;

pub fn run_export(
    context: &AppContext,
    format: crate::cli::ExportFormat,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let owner = context.owner();
    let research: Vec<_> = context.load_research(&owner).into_values().collect();
    let todos: Vec<_> = context.load_todos(&owner).into_values().collect();

    let format = match format {
        crate::cli::ExportFormat::Json => ExportFormat::Json,
        crate::cli::ExportFormat::Markdown => ExportFormat::Markdown,
    };
    let bundle = build_export_bundle(&research, &todos);
    let rendered = render_export(&bundle, format)?;

    if let Some(path) = output {
        std::fs::write(path, &rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}
