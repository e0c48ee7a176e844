//! Delivery scoring feedback loop.
//!
//! Recipe matching happens upstream; this module only sees its binary
//! outcome and turns it into a fixed bonus or penalty on the session clock.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DeliveryConfig;
use crate::error::Result;
use crate::timer::SessionTimer;

/// Terminal result of handing a plate to the delivery counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Success,
    Failure,
}

/// Translates delivery outcomes into timer mutations and counts successes.
///
/// Not deduplicating: call exactly once per upstream outcome.
#[derive(Debug, Clone, Default)]
pub struct DeliveryScoreBridge {
    config: DeliveryConfig,
    successful_deliveries: u32,
}

impl DeliveryScoreBridge {
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: DeliveryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            successful_deliveries: 0,
        })
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    pub fn successful_deliveries(&self) -> u32 {
        self.successful_deliveries
    }

    pub fn on_delivery_success(&mut self, timer: &mut SessionTimer) {
        self.successful_deliveries = self.successful_deliveries.saturating_add(1);
        debug!(total = self.successful_deliveries, "delivery succeeded");
        timer.add_bonus(self.config.success_bonus);
    }

    pub fn on_delivery_failure(&mut self, timer: &mut SessionTimer) {
        debug!("delivery failed");
        timer.apply_penalty(self.config.failure_penalty);
    }

    pub fn record(&mut self, outcome: DeliveryOutcome, timer: &mut SessionTimer) {
        match outcome {
            DeliveryOutcome::Success => self.on_delivery_success(timer),
            DeliveryOutcome::Failure => self.on_delivery_failure(timer),
        }
    }
}
