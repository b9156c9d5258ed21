use crate::{
    cli::{OutputFormat, ToolsCommand},
    config,
    handlers::verify::resolve_root,
    tool_management::{ToolStatusReport, ToolStatusReporter},
};
use std::io::{self, Write};
use std::path::Path;

pub fn handle_tools(command: ToolsCommand, config_path: Option<&Path>) -> crate::Result<()> {
    match command {
        ToolsCommand::Status { path, format } => handle_tools_status(&path, format, config_path),
    }
}

fn handle_tools_status(
    path: &Path,
    format: OutputFormat,
    config_path: Option<&Path>,
) -> crate::Result<()> {
    let root = resolve_root(path)?;
    let config = config::load_config(config_path, &root)?;
    let report = ToolStatusReporter::new().generate_report(&config);

    match format {
        OutputFormat::Human => report.print_console_report()?,
        OutputFormat::Json => display_status_json(&report, &mut io::stdout().lock())?,
    }
    Ok(())
}

fn display_status_json(report: &ToolStatusReport, out: &mut impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report).map_err(io::Error::other)?;
    writeln!(out)
}
