use std::path::PathBuf;

use clap::Args;
use kitchenrush_core::{DeliveryOutcome, Session};

use super::{load_config, print_summary, printing_session};

#[derive(Args)]
pub struct SimulateArgs {
    /// Fixed tick length
    #[arg(long, default_value = "0.1")]
    pub tick: f64,
    /// Deliver a matching recipe every N units of play time
    #[arg(long)]
    pub success_every: Option<f64>,
    /// Deliver a wrong recipe every N units of play time
    #[arg(long)]
    pub fail_every: Option<f64>,
    /// Give up after this many ticks
    #[arg(long, default_value = "100000")]
    pub max_ticks: u64,
    /// Config file to use instead of the user config
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Fires an outcome each time `every` units of play time accumulate.
#[derive(Debug)]
struct Cadence {
    outcome: DeliveryOutcome,
    every: f64,
    accumulated: f64,
}

impl Cadence {
    fn new(outcome: DeliveryOutcome, every: Option<f64>) -> Result<Option<Self>, String> {
        match every {
            None => Ok(None),
            Some(every) if every.is_finite() && every > 0.0 => Ok(Some(Self {
                outcome,
                every,
                accumulated: 0.0,
            })),
            Some(every) => Err(format!("delivery interval must be > 0, got {every}")),
        }
    }

    fn step(&mut self, delta: f64, session: &mut Session) {
        self.accumulated += delta;
        while self.accumulated >= self.every {
            self.accumulated -= self.every;
            session.deliver(self.outcome);
        }
    }
}

/// Interact, then tick until the round ends or `args.max_ticks` is reached.
/// Returns the number of ticks run.
pub fn simulate(
    session: &mut Session,
    args: &SimulateArgs,
) -> Result<u64, Box<dyn std::error::Error>> {
    if !args.tick.is_finite() || args.tick <= 0.0 {
        return Err(format!("tick must be > 0, got {}", args.tick).into());
    }
    let mut cadences: Vec<Cadence> = [
        Cadence::new(DeliveryOutcome::Success, args.success_every)?,
        Cadence::new(DeliveryOutcome::Failure, args.fail_every)?,
    ]
    .into_iter()
    .flatten()
    .collect();

    session.interact();
    let mut ticks = 0;
    while !session.is_over() && ticks < args.max_ticks {
        session.tick(args.tick)?;
        ticks += 1;
        if session.is_playing() {
            for cadence in cadences.iter_mut() {
                cadence.step(args.tick, session);
            }
        }
    }

    if !session.is_over() {
        tracing::warn!(ticks, "tick limit reached before the round ended");
    }
    Ok(ticks)
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args.config.as_deref())?;
    let mut session = printing_session(&config)?;
    let ticks = simulate(&mut session, &args)?;
    tracing::info!(ticks, "simulation finished");
    print_summary(&session.summary())?;
    Ok(())
}
