//! Command-line surface and dispatch.
//!
//! The dispatcher is a single parse → validate → execute → report
//! pipeline. Input and output streams are injected so tests can drive
//! every command with string buffers.

use std::io::{BufRead, Write};

use clap::{ArgAction, Parser, Subcommand};

use crate::{
    backend::AudioBackend,
    control,
    error::{Error, Result},
    session::{self, AudioSession},
};

#[derive(Debug, Parser)]
#[command(
    name = "appvol",
    about = "Control per-application audio volumes and mute from the command line",
    version
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List all active audio sessions
    List,
    /// Pick a session interactively and set its volume
    Select,
    /// Print an application's volume and mute state
    Get { name: String },
    /// Set an application's volume (0-100 or 0.0-1.0)
    Set { name: String, value: String },
    /// Toggle an application's mute state
    Toggle { name: String },
}

/// Execute one command against the backend, writing human-readable
/// results to `out`. `input` is only consulted by `select`.
pub fn run(
    command: &Command,
    backend: &mut dyn AudioBackend,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::List => {
            let sessions = control::list_sessions(backend)?;
            for line in render_sessions(&sessions, false) {
                writeln!(out, "{line}")?;
            }
        }
        Command::Select => {
            let sessions = control::list_sessions(backend)?;
            if sessions.is_empty() {
                writeln!(out, "No audio sessions found.")?;
                return Ok(());
            }
            for line in render_sessions(&sessions, true) {
                writeln!(out, "{line}")?;
            }
            let pos = prompt(input, out, "Select a session by position: ")?;
            let value = prompt(input, out, "Select desired volume 0-100: ")?;
            let session = select_session(&sessions, &pos)?;
            let applied = control::set_volume(backend, session, &value)?;
            report_volume(out, session, applied)?;
        }
        Command::Get { name } => {
            let sessions = control::list_sessions(backend)?;
            let mut session = find(name, &sessions)?.clone();
            session.volume = control::volume(backend, session.id)?;
            session.muted = backend.muted(session.id)?;
            writeln!(out, "{}", render_session(&session))?;
        }
        Command::Set { name, value } => {
            let sessions = control::list_sessions(backend)?;
            let session = find(name, &sessions)?;
            let applied = control::set_volume(backend, session, value)?;
            report_volume(out, session, applied)?;
        }
        Command::Toggle { name } => {
            let sessions = control::list_sessions(backend)?;
            let session = find(name, &sessions)?;
            let muted = control::toggle_mute(backend, session)?;
            let state = if muted { "muted" } else { "unmuted" };
            writeln!(out, "{} is now {}.", session.process_name, state)?;
        }
    }
    Ok(())
}

fn find<'a>(name: &str, sessions: &'a [AudioSession]) -> Result<&'a AudioSession> {
    session::find(name, sessions).ok_or_else(|| Error::NotFound(name.trim().to_string()))
}

/// Resolve a typed position against the listed snapshot. Pure; the
/// prompting happens at the edge.
fn select_session<'a>(sessions: &'a [AudioSession], input: &str) -> Result<&'a AudioSession> {
    let invalid = || Error::InvalidSelection(input.trim().to_string());
    let pos: usize = input.trim().parse().map_err(|_| invalid())?;
    sessions.get(pos).ok_or_else(invalid)
}

fn render_session(s: &AudioSession) -> String {
    let mut line = format!("{}: {:.0}%", s.process_name, s.volume * 100.0);
    if s.muted {
        line.push_str(" (muted)");
    }
    line
}

fn render_sessions(sessions: &[AudioSession], with_pos: bool) -> Vec<String> {
    sessions
        .iter()
        .enumerate()
        .map(|(i, s)| {
            if with_pos {
                format!("{i} - {}", render_session(s))
            } else {
                render_session(s)
            }
        })
        .collect()
}

fn report_volume(out: &mut dyn Write, session: &AudioSession, applied: f32) -> Result<()> {
    writeln!(
        out,
        "Volume of {} set to {:.0}%",
        session.process_name,
        applied * 100.0
    )?;
    Ok(())
}

fn prompt(input: &mut dyn BufRead, out: &mut dyn Write, text: &str) -> Result<String> {
    write!(out, "{text}")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
