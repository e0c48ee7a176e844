//! Replay a signal script against a fresh session.
//!
//! One command per line:
//!
//! ```text
//! interact          # start the countdown
//! tick 0.5          # advance by 0.5 time units
//! ticks 20 0.25     # 20 ticks of 0.25
//! success           # delivery matched
//! fail              # delivery rejected
//! pause             # toggle pause
//! status            # print a snapshot
//! ```

use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use kitchenrush_core::{DeliveryOutcome, Session};

use super::{load_config, print_json, print_summary, printing_session};

#[derive(Args)]
pub struct PlayArgs {
    /// Script file, or `-` for stdin
    pub script: PathBuf,
    /// Config file to use instead of the user config
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    Interact,
    Tick(f64),
    Ticks { count: u32, delta: f64 },
    Success,
    Fail,
    Pause,
    Status,
}

fn parse_delta(raw: Option<&str>, line_no: usize) -> Result<f64, String> {
    let raw = raw.ok_or_else(|| format!("line {line_no}: missing tick delta"))?;
    raw.parse::<f64>()
        .map_err(|_| format!("line {line_no}: invalid tick delta '{raw}'"))
}

pub fn parse_script(input: &str) -> Result<Vec<ScriptCommand>, String> {
    let mut commands = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let mut words = line.split_whitespace();
        let command = match words.next() {
            Some("interact") => ScriptCommand::Interact,
            Some("tick") => ScriptCommand::Tick(parse_delta(words.next(), line_no)?),
            Some("ticks") => {
                let raw = words
                    .next()
                    .ok_or_else(|| format!("line {line_no}: missing tick count"))?;
                let count = raw
                    .parse::<u32>()
                    .map_err(|_| format!("line {line_no}: invalid tick count '{raw}'"))?;
                let delta = parse_delta(words.next(), line_no)?;
                ScriptCommand::Ticks { count, delta }
            }
            Some("success") => ScriptCommand::Success,
            Some("fail") => ScriptCommand::Fail,
            Some("pause") => ScriptCommand::Pause,
            Some("status") => ScriptCommand::Status,
            Some(other) => return Err(format!("line {line_no}: unknown command '{other}'")),
            None => continue,
        };

        if let Some(extra) = words.next() {
            return Err(format!("line {line_no}: unexpected argument '{extra}'"));
        }
        commands.push(command);
    }
    Ok(commands)
}

fn tick(session: &mut Session, delta: f64) -> Result<(), Box<dyn std::error::Error>> {
    let scaled = delta * session.timer().time_scale();
    session.tick(scaled)?;
    Ok(())
}

pub fn execute(
    session: &mut Session,
    commands: &[ScriptCommand],
) -> Result<(), Box<dyn std::error::Error>> {
    for command in commands {
        match command {
            ScriptCommand::Interact => {
                session.interact();
            }
            ScriptCommand::Tick(delta) => tick(session, *delta)?,
            ScriptCommand::Ticks { count, delta } => {
                for _ in 0..*count {
                    tick(session, *delta)?;
                }
            }
            ScriptCommand::Success => session.deliver(DeliveryOutcome::Success),
            ScriptCommand::Fail => session.deliver(DeliveryOutcome::Failure),
            ScriptCommand::Pause => {
                session.toggle_pause();
            }
            ScriptCommand::Status => print_json(&session.snapshot())?,
        }
    }
    Ok(())
}

pub fn run(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let input = if args.script.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&args.script)?
    };
    let commands = parse_script(&input)?;
    tracing::info!(commands = commands.len(), "replaying script");

    let config = load_config(args.config.as_deref())?;
    let mut session = printing_session(&config)?;
    execute(&mut session, &commands)?;

    if session.is_over() {
        print_summary(&session.summary())?;
    }
    Ok(())
}
