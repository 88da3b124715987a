//! User-facing console messages.
//!
//! Prefixed lines go to stdout (info, ok) or stderr (warn, error); the prefix
//! is colored only when the stream is a terminal. `print_user` writes a bare
//! line for results that scripts read.

use owo_colors::OwoColorize;

#[derive(Clone, Copy)]
enum Kind {
    Info,
    Ok,
    Warn,
    Error,
}

impl Kind {
    fn label(self) -> &'static str {
        match self {
            Kind::Info => "info:",
            Kind::Ok => "ok:",
            Kind::Warn => "warn:",
            Kind::Error => "error:",
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Kind::Warn | Kind::Error)
    }
}

fn emit(kind: Kind, msg: &str) {
    let stream = if kind.to_stderr() {
        atty::Stream::Stderr
    } else {
        atty::Stream::Stdout
    };
    let prefix = if atty::is(stream) {
        let label = kind.label();
        match kind {
            Kind::Info => label.cyan().bold().to_string(),
            Kind::Ok => label.green().bold().to_string(),
            Kind::Warn => label.yellow().bold().to_string(),
            Kind::Error => label.red().bold().to_string(),
        }
    } else {
        kind.label().to_string()
    };
    if kind.to_stderr() {
        eprintln!("{prefix} {msg}");
    } else {
        println!("{prefix} {msg}");
    }
}

pub fn print_info(msg: &str) {
    emit(Kind::Info, msg);
}

pub fn print_success(msg: &str) {
    emit(Kind::Ok, msg);
}

pub fn print_warn(msg: &str) {
    emit(Kind::Warn, msg);
}

pub fn print_error(msg: &str) {
    emit(Kind::Error, msg);
}

/// Plain line, no prefix.
pub fn print_user(msg: &str) {
    println!("{msg}");
}
