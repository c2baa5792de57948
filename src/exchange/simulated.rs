// src/exchange/simulated.rs
use crate::domain::errors::ScheduleResult;
use crate::domain::models::{CoinBalance, PriceChange};
use crate::exchange::client::BalanceFeed;
use async_trait::async_trait;
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tokio::time::Duration;

/// In-process balance feed that nudges rates around the last known value
pub struct SimulatedExchange {
    max_rate_drift: Decimal,
    latency: Duration,
}

impl SimulatedExchange {
    /// `max_rate_drift` is a fraction, e.g. `0.01` for ±1%
    pub fn new(max_rate_drift: Decimal, latency: Duration) -> Self {
        Self {
            max_rate_drift: max_rate_drift.abs(),
            latency,
        }
    }

    fn perturb(&self, current: &[CoinBalance]) -> Vec<CoinBalance> {
        let mut rng = rand::thread_rng();

        current
            .iter()
            .map(|coin| {
                let unit = Decimal::from_f64(rng.gen_range(-1.0..=1.0)).unwrap_or(Decimal::ZERO);
                let drift = unit * self.max_rate_drift;
                let percentage = Decimal::from_f64(rng.gen_range(0.0..3.0))
                    .unwrap_or(Decimal::ZERO)
                    .round_dp(2);

                CoinBalance {
                    current_rate: (coin.current_rate * (Decimal::ONE + drift)).round_dp(8),
                    change: PriceChange {
                        percentage,
                        is_positive: rng.gen_bool(0.7),
                    },
                    ..coin.clone()
                }
            })
            .collect()
    }
}

#[async_trait]
impl BalanceFeed for SimulatedExchange {
    async fn refresh(&self, current: &[CoinBalance]) -> ScheduleResult<Vec<CoinBalance>> {
        log::debug!("Simulating balance refresh for {} coins", current.len());
        tokio::time::sleep(self.latency).await;
        Ok(self.perturb(current))
    }
}
