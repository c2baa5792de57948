// tests/exchange_flow.rs
// End-to-end exchange through the form controller and the desk

use coin_desk::desk::seed::{initial_balances, sample_transactions};
use coin_desk::desk::{DeskSettings, ExchangeDesk};
use coin_desk::domain::errors::FormError;
use coin_desk::domain::models::{CoinType, Platform, TransactionType};
use coin_desk::trading::{ExchangeCalculator, ExchangeFormController, FormField, FormPhase};
use rust_decimal_macros::dec;
use std::time::Duration;

fn desk() -> ExchangeDesk {
    ExchangeDesk::new(
        ExchangeCalculator::default(),
        DeskSettings {
            execution_latency: Duration::from_millis(10),
            ..DeskSettings::default()
        },
        initial_balances(),
        sample_transactions(),
    )
}

fn open(desk: &ExchangeDesk, coin: CoinType) -> ExchangeFormController {
    let balances = desk.balances();
    let selected = balances
        .iter()
        .find(|b| b.coin_type == coin)
        .cloned()
        .expect("seeded coin");
    ExchangeFormController::open(&selected, balances, desk.calculator())
}

#[tokio::test]
async fn test_sell_btc_for_usdt_at_market_rate() {
    let desk = desk();
    let mut form = open(&desk, CoinType::Btc);
    form.set_to_coin(CoinType::Usdt).unwrap();
    form.set_amount(dec!(0.05)).unwrap();

    assert_eq!(form.settlement_preview(desk.conversion_factor()), Some(dec!(3125000)));
    form.submit(&desk).await.unwrap();
    assert_eq!(form.phase(), FormPhase::Closed);

    let btc = desk
        .balances()
        .into_iter()
        .find(|b| b.coin_type == CoinType::Btc)
        .unwrap();
    assert_eq!(btc.balance, dec!(0.40));
    assert_eq!(btc.excess_coin, dec!(0.15));

    let binance = desk.transactions_for(Platform::Binance);
    assert_eq!(binance.len(), 3);
    assert_eq!(binance[0].kind, TransactionType::Sell);
    assert_eq!(binance[0].value, dec!(3125000));
}

#[tokio::test]
async fn test_advisory_amount_executes_but_overdraw_does_not() {
    let desk = desk();
    let mut form = open(&desk, CoinType::Btc);
    form.set_to_coin(CoinType::Eth).unwrap();

    form.set_amount(dec!(0.5)).unwrap();
    assert_eq!(form.submit(&desk).await, Err(FormError::InvalidForm));
    assert_eq!(desk.transactions().len(), 5);

    form.set_amount(dec!(0.3)).unwrap();
    assert!(form.issue(FormField::Amount).is_some());
    form.submit(&desk).await.unwrap();

    assert_eq!(desk.transactions().len(), 6);
    let btc = desk
        .balances()
        .into_iter()
        .find(|b| b.coin_type == CoinType::Btc)
        .unwrap();
    assert_eq!(btc.balance, dec!(0.15));
    assert_eq!(btc.excess_coin, dec!(0));
}

#[tokio::test]
async fn test_manual_rate_out_of_band_blocks_until_fixed() {
    let desk = desk();
    let mut form = open(&desk, CoinType::Eth);
    form.set_to_coin(CoinType::Usdt).unwrap();
    form.set_use_market_rate(false).unwrap();
    form.set_manual_rate(dec!(2000)).unwrap();

    assert_eq!(form.submit(&desk).await, Err(FormError::InvalidForm));

    form.set_manual_rate(dec!(3500)).unwrap();
    form.set_amount(dec!(1)).unwrap();
    form.submit(&desk).await.unwrap();

    // 1 ETH * 3500 * 1000
    assert_eq!(desk.transactions()[0].value, dec!(3500000));
}

#[tokio::test]
async fn test_failed_execution_leaves_desk_untouched() {
    let desk = desk();
    let mut form = open(&desk, CoinType::Usdt);
    form.set_to_coin(CoinType::Btc).unwrap();
    form.set_amount(dec!(100)).unwrap();

    // the desk loses the coin before the form is submitted
    let empty = ExchangeDesk::new(
        ExchangeCalculator::default(),
        DeskSettings::default(),
        Vec::new(),
        Vec::new(),
    );
    let result = form.submit(&empty).await;
    assert!(matches!(result, Err(FormError::Execution(_))));
    assert_eq!(form.phase(), FormPhase::Editing);
    assert_eq!(form.form().amount, dec!(100));

    form.submit(&desk).await.unwrap();
    assert_eq!(desk.transactions()[0].coin, CoinType::Usdt);
}
