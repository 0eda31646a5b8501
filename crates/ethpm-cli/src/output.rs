use std::io::{self, IsTerminal, Write};
use std::sync::OnceLock;

use ethpm_core::ConformError;
use serde::Serialize;
use serde_json::json;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

static JSON_MODE: OnceLock<bool> = OnceLock::new();

pub fn init(json: bool) {
    let _ = JSON_MODE.set(json);
}

pub fn is_json() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}

pub fn eprintln_line(msg: &str) {
    let _ = writeln!(io::stderr(), "{msg}");
}

pub fn stdout() -> StandardStream {
    let choice = if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// `PASS  subject` or `FAIL  subject`, colored on a terminal.
pub fn status_line(ok: bool, subject: &str) -> io::Result<()> {
    let (label, color) = if ok {
        ("PASS", Color::Green)
    } else {
        ("FAIL", Color::Red)
    };
    let mut out = stdout();
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{label}")?;
    out.reset()?;
    writeln!(out, "  {subject}")
}

pub fn detail_line(msg: &str) -> io::Result<()> {
    writeln!(io::stdout(), "      {msg}")
}

/// Report a fatal error on stderr.
pub fn error(err: &anyhow::Error) {
    if is_json() {
        let code = err
            .downcast_ref::<ConformError>()
            .map(ConformError::code)
            .unwrap_or("error");
        let body = json!({"error": {"code": code, "message": format!("{err:#}")}});
        eprintln_line(&body.to_string());
    } else {
        eprintln_line(&format!("error: {err:#}"));
    }
}
