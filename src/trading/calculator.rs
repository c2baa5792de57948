// src/trading/calculator.rs
use crate::domain::errors::{ValidationIssue, ValidationResult};
use crate::domain::models::CoinBalance;
use crate::format::validate_number_in_range;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Tolerances applied when validating an exchange
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    /// Amounts above `excess_coin * excess_guidance_factor` get an advisory warning
    pub excess_guidance_factor: Decimal,

    /// Manual rates must stay within `market_rate * (1 ± rate_tolerance)`
    pub rate_tolerance: Decimal,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            excess_guidance_factor: dec!(1.2),
            rate_tolerance: dec!(0.2),
        }
    }
}

impl ValidationPolicy {
    pub fn is_valid(&self) -> bool {
        self.excess_guidance_factor > Decimal::ZERO
            && self.rate_tolerance >= Decimal::ZERO
            && self.rate_tolerance < Decimal::ONE
    }
}

/// Stateless exchange arithmetic and field validation
#[derive(Debug, Clone)]
pub struct ExchangeCalculator {
    policy: ValidationPolicy,
    /// Currency market rates are quoted in, used in rate messages
    quote_currency: String,
}

impl Default for ExchangeCalculator {
    fn default() -> Self {
        Self::new(ValidationPolicy::default())
    }
}

impl ExchangeCalculator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self {
            policy,
            quote_currency: "USD".to_string(),
        }
    }

    pub fn with_quote_currency(mut self, currency: impl Into<String>) -> Self {
        self.quote_currency = currency.into();
        self
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn quote_currency(&self) -> &str {
        &self.quote_currency
    }

    /// Excess coin for a raw capital entry. Anything that is not a non-negative number yields zero.
    pub fn compute_excess(&self, balance: Decimal, capital: &str) -> Decimal {
        match parse_decimal_input(capital) {
            Some(capital) => self.excess_over_capital(balance, capital),
            None => Decimal::ZERO,
        }
    }

    /// `max(0, balance - capital)`, zero for a negative capital
    pub fn excess_over_capital(&self, balance: Decimal, capital: Decimal) -> Decimal {
        if capital.is_sign_negative() && !capital.is_zero() {
            return Decimal::ZERO;
        }
        (balance - capital).max(Decimal::ZERO)
    }

    /// Check a trade amount against the coin's holdings.
    ///
    /// Exceeding the balance is reported ahead of exceeding the excess guidance.
    pub fn validate_amount(&self, amount: Decimal, coin: &CoinBalance) -> ValidationResult {
        if amount > coin.balance {
            return Err(ValidationIssue::ExceedsBalance {
                coin: coin.coin_type,
                balance: coin.balance,
            });
        }

        if amount > coin.excess_coin * self.policy.excess_guidance_factor {
            return Err(ValidationIssue::ExceedsExcessGuidance {
                coin: coin.coin_type,
                excess_coin: coin.excess_coin,
            });
        }

        Ok(())
    }

    /// Check a manual rate against the inclusive tolerance band around the market rate
    pub fn validate_rate(&self, manual_rate: Decimal, market_rate: Decimal) -> ValidationResult {
        let (low, high) = self.rate_band(market_rate);
        if validate_number_in_range(manual_rate, low, high) {
            Ok(())
        } else {
            Err(ValidationIssue::RateOutOfBand {
                market_rate,
                tolerance_percent: (self.policy.rate_tolerance * dec!(100)).normalize(),
                quote_currency: self.quote_currency.clone(),
            })
        }
    }

    /// Lowest and highest acceptable manual rate
    pub fn rate_band(&self, market_rate: Decimal) -> (Decimal, Decimal) {
        (
            market_rate * (Decimal::ONE - self.policy.rate_tolerance),
            market_rate * (Decimal::ONE + self.policy.rate_tolerance),
        )
    }

    /// Value of a trade in the ledger currency
    pub fn compute_settlement_value(
        &self,
        amount: Decimal,
        rate: Decimal,
        conversion_factor: Decimal,
    ) -> Decimal {
        amount * rate * conversion_factor
    }
}

/// Parse a user-entered number, tolerating surrounding whitespace and thousands separators
pub fn parse_decimal_input(input: &str) -> Option<Decimal> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }

    cleaned
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}
