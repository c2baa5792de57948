// src/main.rs
use coin_desk::config::Config;
use coin_desk::desk::seed::{initial_balances, sample_transactions};
use coin_desk::desk::ExchangeDesk;
use coin_desk::domain::errors::AppResult;
use coin_desk::domain::models::{CoinType, Platform};
use coin_desk::exchange::SimulatedExchange;
use coin_desk::format::{format_coin_amount, format_currency, format_timestamp};
use coin_desk::schedule::{RefreshScheduler, ShiftClock, ShiftTimer};
use coin_desk::trading::ExchangeFormController;

use std::sync::Arc;
use tokio::signal::ctrl_c;
use tokio::time::Duration;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting coin_desk v{}", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Ledger currency {}, 1 {} = {} {}",
        config.desk.ledger_currency,
        config.desk.quote_currency,
        config.desk.conversion_factor,
        config.desk.ledger_currency
    );

    let calculator = config.calculator()?;
    let desk = Arc::new(ExchangeDesk::new(
        calculator.clone(),
        config.desk_settings(),
        initial_balances(),
        sample_transactions(),
    ));

    // Start the operator shift clock
    let shift = ShiftTimer::start(ShiftClock::default());

    // Balance refresh
    let feed = Arc::new(SimulatedExchange::new(
        config.refresh.max_rate_drift,
        Duration::from_millis(200),
    ));
    let mut scheduler = RefreshScheduler::new(desk.clone(), feed);
    log::info!("Refresh interval: {}", config.refresh.interval);
    if let Err(e) = scheduler.select(config.refresh.interval).await {
        log::error!("Initial refresh failed: {}", e);
    }

    log_balances(&desk, &config);

    // Sell the BTC excess into USDT through the exchange form
    let balances = desk.balances();
    if let Some(btc) = balances.iter().find(|b| b.coin_type == CoinType::Btc) {
        let mut form = ExchangeFormController::open(btc, balances.clone(), calculator);
        form.set_to_coin(CoinType::Usdt)?;

        for (field, message) in form.error_messages() {
            log::warn!("{}: {}", field, message);
        }
        if let Some(value) = form.settlement_preview(desk.conversion_factor()) {
            log::info!(
                "Selling {} for about {}",
                format_coin_amount(form.form().amount, CoinType::Btc),
                format_currency(value, &config.desk.ledger_currency)
            );
        }

        match form.submit(desk.as_ref()).await {
            Ok(submitted) => log::info!("Exchange submitted: {:?}", submitted),
            Err(e) => log::error!("Exchange not submitted: {}", e),
        }
    }

    log_balances(&desk, &config);
    log_transactions(&desk, &config, config.desk.default_platform);

    log::info!("Desk is running. Press Ctrl+C to stop.");
    let mut status = tokio::time::interval(Duration::from_secs(60));
    status.tick().await;

    loop {
        tokio::select! {
            _ = status.tick() => {
                log::info!("Shift time: {}", shift.snapshot().display());
                log_balances(&desk, &config);
            }
            result = ctrl_c() => {
                result?;
                break;
            }
        }
    }

    // Shutdown
    log::info!("Shutting down...");
    scheduler.cancel();
    let worked = shift
        .clock()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clock_out();
    log::info!("Shift closed after {} seconds. Goodbye!", worked.as_secs());

    Ok(())
}

fn log_balances(desk: &ExchangeDesk, config: &Config) {
    log::info!("=== Coin Balances ===");
    for coin in desk.balances() {
        log::info!(
            "{}: {} @ {} ({}{}%), excess {}",
            coin.coin_type,
            format_coin_amount(coin.balance, coin.coin_type),
            format_currency(coin.current_rate, &config.desk.quote_currency),
            if coin.change.is_positive { "+" } else { "-" },
            coin.change.percentage,
            format_coin_amount(coin.excess_coin, coin.coin_type)
        );
    }
    log::info!(
        "Total: {}",
        format_currency(desk.total_value(), &config.desk.quote_currency)
    );
}

fn log_transactions(desk: &ExchangeDesk, config: &Config, platform: Platform) {
    log::info!("=== Transactions ({}) ===", platform);
    for tx in desk.transactions_for(platform) {
        log::info!(
            "#{} {} {} {} {} {} {}",
            tx.id,
            format_timestamp(&tx.timestamp),
            tx.platform,
            tx.kind,
            format_coin_amount(tx.amount, tx.coin),
            format_currency(tx.value, &config.desk.ledger_currency),
            tx.status
        );
    }
}
