//! Argument definitions and command execution.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use valuefmt::{
    render_with_variable, FilterKind, FormattedValue, FormatterConfig, ValueFormatter,
    DEFAULT_VARIABLE,
};

/// Render attribute values through placeholder filter templates.
#[derive(Debug, Parser)]
#[command(name = "valuefmt", version, about)]
pub struct Cli {
    /// Log filter decisions and config loading to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render a template against a value.
    Render {
        /// Template text, e.g. "{{value|toUpper}}".
        template: String,
        /// The substitution value, or "-" to read it from stdin.
        value: String,
        /// Placeholder variable name.
        #[arg(long = "var", default_value = DEFAULT_VARIABLE)]
        variable: String,
        /// Print a JSON object instead of plain text.
        #[arg(long)]
        json: bool,
    },

    /// Format an attribute value using a config file.
    Format {
        /// YAML or JSON formatter config.
        #[arg(short, long)]
        config: PathBuf,
        attribute: String,
        /// The attribute value, or "-" to read it from stdin.
        value: String,
        #[arg(long)]
        json: bool,
    },

    /// Validate every template in a config file.
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },

    /// List supported filter names.
    Filters,
}

#[derive(Serialize)]
struct FormatOutput<'a> {
    attribute: &'a str,
    #[serde(flatten)]
    value: &'a FormattedValue,
    mime: &'static str,
}

/// Executes `command`, writing results to `out`. `stdin` is read only when a
/// value is given as `-`.
pub fn run(command: Command, stdin: impl Read, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Render {
            template,
            value,
            variable,
            json,
        } => {
            let value = read_value(value, stdin)?;
            let result = render_with_variable(&template, &value, &variable);
            if json {
                serde_json::to_writer(&mut *out, &result)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{}", result.text)?;
            }
        }

        Command::Format {
            config,
            attribute,
            value,
            json,
        } => {
            let value = read_value(value, stdin)?;
            let formatter = ValueFormatter::from_config(load_config(&config)?);
            let formatted = formatter.format(&attribute, &value);
            if json {
                let output = FormatOutput {
                    attribute: &attribute,
                    value: &formatted,
                    mime: formatted.content_type.mime(),
                };
                serde_json::to_writer(&mut *out, &output)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{}", formatted.text)?;
            }
        }

        Command::Check { config } => {
            let loaded = load_config(&config)?;
            loaded
                .validate()
                .with_context(|| format!("{} failed validation", config.display()))?;
            writeln!(
                out,
                "{}: {} template(s) ok",
                config.display(),
                loaded.templates.len()
            )?;
        }

        Command::Filters => {
            for kind in FilterKind::ALL {
                if let Some(name) = kind.name() {
                    let params = kind.required_params();
                    let plural = if params == 1 { "" } else { "s" };
                    writeln!(out, "{name} ({params} param{plural})")?;
                }
            }
        }
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<FormatterConfig> {
    FormatterConfig::from_path(path)
        .with_context(|| format!("failed to load formatter config {}", path.display()))
}

fn read_value(value: String, mut stdin: impl Read) -> Result<String> {
    if value != "-" {
        return Ok(value);
    }
    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .context("failed to read value from stdin")?;
    let trimmed = buffer.strip_suffix('\n').unwrap_or(&buffer);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    debug!(bytes = trimmed.len(), "read value from stdin");
    Ok(trimmed.to_string())
}
