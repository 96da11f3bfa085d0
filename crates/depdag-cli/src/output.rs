//! Output layer shared by the report and error paths.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / hidden `--json` flag
//! 2. `DEPDAG_FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. `[report] output` in the project config
//! 4. `output` in the user config
//! 5. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.
//!
//! Unknown values at any layer fall through to the next one.

use clap::ValueEnum;
use depdag_core::GraphError;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<14} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, aligned labels).
    Pretty,
    /// Line-oriented plain text for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some(Self::Pretty),
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Every input to output mode resolution, separated from I/O for testability.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeSources<'a> {
    pub format_flag: Option<OutputMode>,
    pub json_flag: bool,
    pub format_env: Option<&'a str>,
    pub project: Option<&'a str>,
    pub user: Option<&'a str>,
    pub is_tty: bool,
}

fn resolve_output_mode_inner(sources: ModeSources<'_>) -> OutputMode {
    if let Some(mode) = sources.format_flag {
        return mode;
    }

    if sources.json_flag {
        return OutputMode::Json;
    }

    if let Some(mode) = [sources.format_env, sources.project, sources.user]
        .into_iter()
        .flatten()
        .find_map(OutputMode::parse)
    {
        return mode;
    }

    if sources.is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from flags, environment, config and TTY state.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    project: Option<&str>,
    user: Option<&str>,
) -> OutputMode {
    let env_val = std::env::var("DEPDAG_FORMAT").ok();
    resolve_output_mode_inner(ModeSources {
        format_flag,
        json_flag,
        format_env: env_val.as_deref(),
        project,
        user,
        is_tty: io::stdout().is_terminal(),
    })
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E1001").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }
}

impl From<&GraphError> for CliError {
    fn from(err: &GraphError) -> Self {
        let code = err.code();
        Self {
            message: format!("{}: {err}", code.message()),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

/// Convert any failure into a [`CliError`], keeping the code of a
/// [`GraphError`] anywhere in the chain.
impl From<&anyhow::Error> for CliError {
    fn from(err: &anyhow::Error) -> Self {
        err.chain()
            .find_map(|cause| cause.downcast_ref::<GraphError>())
            .map_or_else(|| Self::new(format!("{err:#}")), Self::from)
    }
}

/// Write an error in the requested format.
pub fn write_error(w: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *w, &wrapper)?;
            writeln!(w)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match error.error_code {
                Some(ref code) => writeln!(w, "error[{code}]: {}", error.message)?,
                None => writeln!(w, "error: {}", error.message)?,
            }
            if let Some(ref suggestion) = error.suggestion {
                writeln!(w, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources() -> ModeSources<'static> {
        ModeSources::default()
    }

    // ── resolve_output_mode_inner ───────────────────────────────────────────

    #[test]
    fn format_flag_wins_over_everything() {
        let mode = resolve_output_mode_inner(ModeSources {
            format_flag: Some(OutputMode::Text),
            json_flag: true,
            format_env: Some("pretty"),
            project: Some("json"),
            is_tty: true,
            ..sources()
        });
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn json_flag_beats_env_and_config() {
        let mode = resolve_output_mode_inner(ModeSources {
            json_flag: true,
            format_env: Some("text"),
            ..sources()
        });
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn env_beats_project_config() {
        let mode = resolve_output_mode_inner(ModeSources {
            format_env: Some("JSON"),
            project: Some("pretty"),
            ..sources()
        });
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn project_config_beats_user_config() {
        let mode = resolve_output_mode_inner(ModeSources {
            project: Some("text"),
            user: Some("json"),
            is_tty: true,
            ..sources()
        });
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn unknown_values_fall_through() {
        let mode = resolve_output_mode_inner(ModeSources {
            format_env: Some("yaml"),
            project: Some("fancy"),
            user: Some("json"),
            ..sources()
        });
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn tty_default_is_pretty_pipe_default_is_text() {
        let tty = resolve_output_mode_inner(ModeSources {
            is_tty: true,
            ..sources()
        });
        assert_eq!(tty, OutputMode::Pretty);
        assert_eq!(resolve_output_mode_inner(sources()), OutputMode::Text);
    }

    // ── errors ──────────────────────────────────────────────────────────────

    #[test]
    fn graph_error_keeps_code_and_hint() {
        let err = GraphError::SourceOutOfRange {
            node: 9,
            node_count: 3,
        };
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E1001"));
        assert!(cli.message.contains("source node 9"));
        assert!(cli.suggestion.is_some());
    }

    #[test]
    fn graph_error_is_found_behind_context() {
        let err = anyhow::Error::new(GraphError::DistanceOverflow { from: 0, to: 1 })
            .context("analysis failed");
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E3001"));
    }

    #[test]
    fn plain_error_has_no_code() {
        let err = anyhow::anyhow!("boom").context("Failed to read input file x.json");
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code, None);
        assert!(cli.message.contains("boom"));
        assert!(cli.message.contains("x.json"));
    }

    #[test]
    fn json_error_is_wrapped() {
        let mut buf = Vec::new();
        let err = CliError::new("bad thing");
        write_error(&mut buf, OutputMode::Json, &err).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["error"]["message"], "bad thing");
        assert!(value["error"].get("error_code").is_none());
    }

    #[test]
    fn text_error_includes_code_and_suggestion() {
        let mut buf = Vec::new();
        let err = CliError::from(&GraphError::NodeOutOfRange {
            edge: 0,
            from: 0,
            to: 4,
            node_count: 2,
        });
        write_error(&mut buf, OutputMode::Text, &err).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("error[E1001]:"));
        assert!(text.contains("suggestion:"));
    }
}
