// src/trading/form.rs
use crate::domain::errors::{ExecutionResult, FormError, FormResult, ValidationIssue};
use crate::domain::models::{CoinBalance, CoinType, ExchangeFormData};
use crate::exchange::client::TradeExecutor;
use crate::trading::calculator::{parse_decimal_input, ExchangeCalculator};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

/// Form fields that can carry a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    Amount,
    ManualRate,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Amount => "amount",
            FormField::ManualRate => "manualRate",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// No field carries an issue
    Editing,
    /// At least one field carries an issue; advisory ones still allow submission
    Validating,
    /// A trade is in flight; edits and further submits are refused
    Submitting,
    Closed,
}

/// State machine behind the exchange modal.
///
/// Every edit re-runs the calculator synchronously. Submission is split into
/// [`begin_submit`](Self::begin_submit) and [`finish_submit`](Self::finish_submit) so the
/// in-flight flag stays observable between the two.
pub struct ExchangeFormController {
    calculator: ExchangeCalculator,
    balances: Vec<CoinBalance>,
    form: ExchangeFormData,
    issues: BTreeMap<FormField, ValidationIssue>,
    phase: FormPhase,
}

impl ExchangeFormController {
    /// Create an empty form over the given balances
    pub fn new(balances: Vec<CoinBalance>, calculator: ExchangeCalculator) -> Self {
        Self {
            calculator,
            balances,
            form: ExchangeFormData::default(),
            issues: BTreeMap::new(),
            phase: FormPhase::Editing,
        }
    }

    /// Open the form for `selected`, defaulting the amount to its excess coin
    pub fn open(
        selected: &CoinBalance,
        balances: Vec<CoinBalance>,
        calculator: ExchangeCalculator,
    ) -> Self {
        let mut controller = Self::new(balances, calculator);
        if !controller.balances.iter().any(|b| b.coin_type == selected.coin_type) {
            controller.balances.push(selected.clone());
        }

        controller.form.from_coin = Some(selected.coin_type);
        controller.form.amount = selected.excess_coin;
        controller.form.manual_rate = selected.current_rate;
        controller.revalidate();
        controller
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn form(&self) -> &ExchangeFormData {
        &self.form
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    pub fn issues(&self) -> &BTreeMap<FormField, ValidationIssue> {
        &self.issues
    }

    pub fn issue(&self, field: FormField) -> Option<&ValidationIssue> {
        self.issues.get(&field)
    }

    /// Human-readable messages keyed by field name
    pub fn error_messages(&self) -> BTreeMap<&'static str, String> {
        self.issues
            .iter()
            .map(|(field, issue)| (field.as_str(), issue.to_string()))
            .collect()
    }

    /// Balance of the coin being exchanged
    pub fn from_coin_data(&self) -> Option<&CoinBalance> {
        let coin = self.form.from_coin?;
        self.balances.iter().find(|b| b.coin_type == coin)
    }

    /// Coins the user may exchange into
    pub fn to_coin_candidates(&self) -> Vec<CoinType> {
        self.balances
            .iter()
            .map(|b| b.coin_type)
            .filter(|coin| Some(*coin) != self.form.from_coin)
            .collect()
    }

    pub fn set_from_coin(&mut self, coin: CoinType) -> FormResult<()> {
        self.ensure_editable()?;
        let rate = self.current_rate_of(coin).ok_or(FormError::UnknownCoin(coin))?;

        self.form.from_coin = Some(coin);
        if self.form.to_coin == Some(coin) {
            self.form.to_coin = None;
        }
        if self.form.use_market_rate {
            self.form.manual_rate = rate;
        }

        self.revalidate();
        Ok(())
    }

    pub fn set_to_coin(&mut self, coin: CoinType) -> FormResult<()> {
        self.ensure_editable()?;
        if self.form.from_coin == Some(coin) {
            return Err(FormError::SelfExchange(coin));
        }
        if self.current_rate_of(coin).is_none() {
            return Err(FormError::UnknownCoin(coin));
        }

        self.form.to_coin = Some(coin);
        self.revalidate();
        Ok(())
    }

    pub fn set_amount(&mut self, amount: Decimal) -> FormResult<()> {
        self.ensure_editable()?;
        self.form.amount = amount;
        self.revalidate();
        Ok(())
    }

    /// Set the amount from raw text; unparsable input counts as zero
    pub fn set_amount_input(&mut self, input: &str) -> FormResult<()> {
        self.set_amount(parse_decimal_input(input).unwrap_or(Decimal::ZERO))
    }

    pub fn set_manual_rate(&mut self, rate: Decimal) -> FormResult<()> {
        self.ensure_editable()?;
        self.form.manual_rate = rate;
        self.revalidate();
        Ok(())
    }

    pub fn set_manual_rate_input(&mut self, input: &str) -> FormResult<()> {
        self.set_manual_rate(parse_decimal_input(input).unwrap_or(Decimal::ZERO))
    }

    /// Toggle between market and manual rate.
    ///
    /// Turning market rate on discards the manual entry in favour of the current market rate.
    /// Turning it off keeps whatever rate is already entered.
    pub fn set_use_market_rate(&mut self, use_market_rate: bool) -> FormResult<()> {
        self.ensure_editable()?;
        let market_rate = self.from_coin_data().map(|b| b.current_rate);

        if use_market_rate {
            if let Some(rate) = market_rate {
                self.form.manual_rate = rate;
            }
        } else if self.form.manual_rate.is_zero() {
            if let Some(rate) = market_rate {
                self.form.manual_rate = rate;
            }
        }

        self.form.use_market_rate = use_market_rate;
        self.revalidate();
        Ok(())
    }

    /// Swap in refreshed balances while the form is open
    pub fn update_balances(&mut self, balances: Vec<CoinBalance>) {
        self.balances = balances;
        if self.form.use_market_rate {
            if let Some(rate) = self.from_coin_data().map(|b| b.current_rate) {
                self.form.manual_rate = rate;
            }
        }
        if matches!(self.phase, FormPhase::Editing | FormPhase::Validating) {
            self.revalidate();
        }
    }

    /// Rate the trade would execute at
    pub fn effective_rate(&self) -> Option<Decimal> {
        if self.form.use_market_rate {
            self.from_coin_data().map(|b| b.current_rate)
        } else {
            Some(self.form.manual_rate)
        }
    }

    /// Settlement value of the current form in the ledger currency
    pub fn settlement_preview(&self, conversion_factor: Decimal) -> Option<Decimal> {
        let rate = self.effective_rate()?;
        Some(
            self.calculator
                .compute_settlement_value(self.form.amount, rate, conversion_factor),
        )
    }

    pub fn has_blocking_issues(&self) -> bool {
        self.issues.values().any(|issue| issue.is_blocking())
    }

    /// Whether the submit action is available
    pub fn is_valid(&self) -> bool {
        self.form.from_coin.is_some()
            && self.form.to_coin.is_some()
            && self.form.amount > Decimal::ZERO
            && !self.has_blocking_issues()
    }

    /// Enter the submitting phase and hand out the form snapshot to execute
    pub fn begin_submit(&mut self) -> FormResult<ExchangeFormData> {
        match self.phase {
            FormPhase::Closed => return Err(FormError::Closed),
            FormPhase::Submitting => {
                log::warn!("Ignoring submit while a trade is in flight");
                return Err(FormError::AlreadySubmitting);
            }
            FormPhase::Editing | FormPhase::Validating => {}
        }

        if !self.is_valid() {
            return Err(FormError::InvalidForm);
        }

        self.phase = FormPhase::Submitting;
        Ok(self.form.clone())
    }

    /// Settle an in-flight submission with the executor's outcome
    pub fn finish_submit(&mut self, result: ExecutionResult<()>) -> FormResult<()> {
        if self.phase != FormPhase::Submitting {
            return Err(FormError::NotSubmitting);
        }

        match result {
            Ok(()) => {
                log::info!(
                    "Trade executed: {} {} -> {}",
                    self.form.amount,
                    self.form.from_coin.map(|c| c.as_str()).unwrap_or("-"),
                    self.form.to_coin.map(|c| c.as_str()).unwrap_or("-"),
                );
                self.close();
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to execute trade: {}", e);
                self.phase = FormPhase::Editing;
                self.revalidate();
                Err(FormError::Execution(e))
            }
        }
    }

    /// Validate, execute through `executor` and close on success.
    ///
    /// If the returned future is dropped before the executor answers, the form goes back to
    /// editing with its values intact.
    pub async fn submit(&mut self, executor: &dyn TradeExecutor) -> FormResult<ExchangeFormData> {
        let form = self.begin_submit()?;
        let in_flight = InFlight { controller: self };
        let result = executor.execute_trade(&form).await;
        in_flight.controller.finish_submit(result)?;
        Ok(form)
    }

    /// Discard the form
    pub fn close(&mut self) {
        self.form = ExchangeFormData::default();
        self.issues.clear();
        self.phase = FormPhase::Closed;
    }

    fn ensure_editable(&self) -> FormResult<()> {
        match self.phase {
            FormPhase::Closed => Err(FormError::Closed),
            FormPhase::Submitting => Err(FormError::AlreadySubmitting),
            FormPhase::Editing | FormPhase::Validating => Ok(()),
        }
    }

    fn current_rate_of(&self, coin: CoinType) -> Option<Decimal> {
        self.balances
            .iter()
            .find(|b| b.coin_type == coin)
            .map(|b| b.current_rate)
    }

    fn revalidate(&mut self) {
        let mut issues = BTreeMap::new();

        if let Some(coin) = self.from_coin_data() {
            if self.form.amount > Decimal::ZERO {
                if let Err(issue) = self.calculator.validate_amount(self.form.amount, coin) {
                    if !issue.is_blocking() {
                        log::debug!("Advisory on amount: {}", issue);
                    }
                    issues.insert(FormField::Amount, issue);
                }
            }

            if !self.form.use_market_rate {
                if let Err(issue) = self
                    .calculator
                    .validate_rate(self.form.manual_rate, coin.current_rate)
                {
                    issues.insert(FormField::ManualRate, issue);
                }
            }
        }

        self.phase = if issues.is_empty() {
            FormPhase::Editing
        } else {
            FormPhase::Validating
        };
        self.issues = issues;
    }
}

// Releases the in-flight gate when a submission is abandoned mid-await
struct InFlight<'a> {
    controller: &'a mut ExchangeFormController,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.controller.phase == FormPhase::Submitting {
            log::warn!("Trade submission abandoned before the executor answered");
            self.controller.revalidate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ExecutionError;
    use crate::domain::models::PriceChange;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct MockExecutor {
        fail_with: Option<ExecutionError>,
        calls: Mutex<Vec<ExchangeFormData>>,
    }

    impl MockExecutor {
        fn ok() -> Self {
            Self { fail_with: None, calls: Mutex::new(Vec::new()) }
        }

        fn failing(error: ExecutionError) -> Self {
            Self { fail_with: Some(error), calls: Mutex::new(Vec::new()) }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TradeExecutor for MockExecutor {
        async fn execute_trade(&self, form: &ExchangeFormData) -> ExecutionResult<()> {
            self.calls.lock().unwrap().push(form.clone());
            match &self.fail_with {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    fn balances() -> Vec<CoinBalance> {
        vec![
            CoinBalance::new(
                CoinType::Btc,
                dec!(0.45),
                dec!(62500),
                dec!(0.2),
                PriceChange { percentage: dec!(2.3), is_positive: true },
            ),
            CoinBalance::new(
                CoinType::Usdt,
                dec!(1250.75),
                dec!(1.0),
                dec!(500),
                PriceChange { percentage: dec!(0.01), is_positive: true },
            ),
            CoinBalance::new(
                CoinType::Eth,
                dec!(3.2),
                dec!(3450),
                dec!(1.5),
                PriceChange { percentage: dec!(1.2), is_positive: false },
            ),
        ]
    }

    fn open_btc() -> ExchangeFormController {
        let balances = balances();
        ExchangeFormController::open(&balances[0], balances.clone(), ExchangeCalculator::default())
    }

    #[test]
    fn test_open_defaults_from_selected_coin() {
        let controller = open_btc();
        let form = controller.form();
        assert_eq!(form.from_coin, Some(CoinType::Btc));
        assert_eq!(form.to_coin, None);
        assert_eq!(form.amount, dec!(0.2));
        assert_eq!(form.manual_rate, dec!(62500));
        assert!(form.use_market_rate);
        assert!(controller.issues().is_empty());
        assert_eq!(controller.phase(), FormPhase::Editing);
        // no target coin yet
        assert!(!controller.is_valid());
    }

    #[test]
    fn test_to_coin_excludes_from_coin() {
        let mut controller = open_btc();
        assert_eq!(controller.to_coin_candidates(), vec![CoinType::Usdt, CoinType::Eth]);
        assert_eq!(
            controller.set_to_coin(CoinType::Btc),
            Err(FormError::SelfExchange(CoinType::Btc))
        );

        controller.set_to_coin(CoinType::Usdt).unwrap();
        controller.set_from_coin(CoinType::Usdt).unwrap();
        assert_eq!(controller.form().to_coin, None);
        assert_eq!(controller.form().manual_rate, dec!(1.0));
    }

    #[test]
    fn test_advisory_amount_stays_submittable() {
        let mut controller = open_btc();
        controller.set_to_coin(CoinType::Usdt).unwrap();

        controller.set_amount(dec!(0.3)).unwrap();
        let issue = controller.issue(FormField::Amount).unwrap();
        assert!(matches!(issue, ValidationIssue::ExceedsExcessGuidance { .. }));
        assert!(controller.error_messages().contains_key("amount"));
        assert!(controller.is_valid());

        controller.set_amount(dec!(0.5)).unwrap();
        assert!(matches!(
            controller.issue(FormField::Amount),
            Some(ValidationIssue::ExceedsBalance { .. })
        ));
        assert!(!controller.is_valid());
        assert_eq!(controller.begin_submit(), Err(FormError::InvalidForm));

        controller.set_amount(dec!(0.1)).unwrap();
        assert!(controller.issues().is_empty());
        assert!(controller.is_valid());
    }

    #[test]
    fn test_zero_amount_is_invalid() {
        let mut controller = open_btc();
        controller.set_to_coin(CoinType::Eth).unwrap();
        controller.set_amount_input("abc").unwrap();
        assert_eq!(controller.form().amount, Decimal::ZERO);
        assert!(controller.issues().is_empty());
        assert!(!controller.is_valid());
    }

    #[test]
    fn test_manual_rate_band() {
        let mut controller = open_btc();
        controller.set_to_coin(CoinType::Usdt).unwrap();
        controller.set_use_market_rate(false).unwrap();

        // switching to manual keeps the seeded market rate
        assert_eq!(controller.form().manual_rate, dec!(62500));
        assert!(controller.issue(FormField::ManualRate).is_none());

        controller.set_manual_rate(dec!(49999)).unwrap();
        assert!(matches!(
            controller.issue(FormField::ManualRate),
            Some(ValidationIssue::RateOutOfBand { .. })
        ));
        assert!(!controller.is_valid());

        controller.set_manual_rate_input("50000").unwrap();
        assert!(controller.issue(FormField::ManualRate).is_none());
        assert!(controller.is_valid());
        assert_eq!(controller.effective_rate(), Some(dec!(50000)));
    }

    #[test]
    fn test_amount_and_rate_issues_are_independent() {
        let mut controller = open_btc();
        controller.set_use_market_rate(false).unwrap();
        controller.set_manual_rate(dec!(80000)).unwrap();
        controller.set_amount(dec!(0.5)).unwrap();

        let messages = controller.error_messages();
        assert_eq!(messages.len(), 2);
        assert!(messages.contains_key("amount"));
        assert!(messages.contains_key("manualRate"));
    }

    #[test]
    fn test_market_rate_toggle_resets_manual_entry() {
        let mut controller = open_btc();
        controller.set_use_market_rate(false).unwrap();
        controller.set_manual_rate(dec!(90000)).unwrap();
        assert!(controller.issue(FormField::ManualRate).is_some());

        controller.set_use_market_rate(true).unwrap();
        assert_eq!(controller.form().manual_rate, dec!(62500));
        assert!(controller.issue(FormField::ManualRate).is_none());
    }

    #[test]
    fn test_switching_to_manual_keeps_entered_rate() {
        let balances = balances();
        let mut controller = ExchangeFormController::new(balances, ExchangeCalculator::default());
        controller.set_from_coin(CoinType::Btc).unwrap();
        // entered while still in market mode
        controller.set_manual_rate(dec!(60000)).unwrap();
        assert!(controller.form().use_market_rate);

        controller.set_use_market_rate(false).unwrap();
        assert!(!controller.form().use_market_rate);
        assert_eq!(controller.form().manual_rate, dec!(60000));
        assert_eq!(controller.effective_rate(), Some(dec!(60000)));
        assert!(controller.issue(FormField::ManualRate).is_none());
    }

    #[test]
    fn test_switching_to_manual_seeds_empty_rate() {
        let mut controller = open_btc();
        controller.set_manual_rate(Decimal::ZERO).unwrap();
        assert!(controller.form().use_market_rate);

        controller.set_use_market_rate(false).unwrap();
        assert_eq!(controller.form().manual_rate, dec!(62500));
        assert!(controller.issue(FormField::ManualRate).is_none());
    }

    #[test]
    fn test_settlement_preview() {
        let mut controller = open_btc();
        controller.set_amount(dec!(0.05)).unwrap();
        assert_eq!(controller.settlement_preview(dec!(1000)), Some(dec!(3125000)));

        controller.set_use_market_rate(false).unwrap();
        controller.set_manual_rate(dec!(60000)).unwrap();
        assert_eq!(controller.settlement_preview(dec!(1000)), Some(dec!(3000000)));
    }

    #[test]
    fn test_resubmit_while_in_flight_is_rejected() {
        let mut controller = open_btc();
        controller.set_to_coin(CoinType::Usdt).unwrap();

        let form = controller.begin_submit().unwrap();
        assert_eq!(form.amount, dec!(0.2));
        assert!(controller.is_submitting());

        assert_eq!(controller.begin_submit(), Err(FormError::AlreadySubmitting));
        assert_eq!(controller.set_amount(dec!(0.1)), Err(FormError::AlreadySubmitting));

        controller.finish_submit(Ok(())).unwrap();
        assert_eq!(controller.phase(), FormPhase::Closed);
    }

    #[test]
    fn test_finish_without_submit_is_refused() {
        let mut controller = open_btc();
        controller.set_to_coin(CoinType::Usdt).unwrap();

        assert_eq!(controller.finish_submit(Ok(())), Err(FormError::NotSubmitting));
        assert_eq!(controller.phase(), FormPhase::Editing);
        assert_eq!(controller.form().amount, dec!(0.2));
    }

    #[test]
    fn test_phase_follows_field_issues() {
        let mut controller = open_btc();
        controller.set_to_coin(CoinType::Usdt).unwrap();
        assert_eq!(controller.phase(), FormPhase::Editing);

        controller.set_amount(dec!(0.3)).unwrap();
        assert_eq!(controller.phase(), FormPhase::Validating);
        // advisory only, still submittable from here
        assert!(controller.is_valid());

        controller.set_amount(dec!(0.1)).unwrap();
        assert_eq!(controller.phase(), FormPhase::Editing);
    }

    #[tokio::test]
    async fn test_successful_submit_closes_form() {
        let executor = MockExecutor::ok();
        let mut controller = open_btc();
        controller.set_to_coin(CoinType::Eth).unwrap();

        let submitted = controller.submit(&executor).await.unwrap();
        assert_eq!(submitted.from_coin, Some(CoinType::Btc));
        assert_eq!(submitted.to_coin, Some(CoinType::Eth));
        assert_eq!(executor.call_count(), 1);

        assert_eq!(controller.phase(), FormPhase::Closed);
        assert_eq!(controller.form(), &ExchangeFormData::default());
        assert_eq!(controller.submit(&executor).await, Err(FormError::Closed));
        assert_eq!(executor.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_submit_returns_to_editing() {
        let executor = MockExecutor::failing(ExecutionError::Unavailable("offline".to_string()));
        let mut controller = open_btc();
        controller.set_to_coin(CoinType::Eth).unwrap();
        controller.set_amount(dec!(0.15)).unwrap();

        let result = controller.submit(&executor).await;
        assert!(matches!(result, Err(FormError::Execution(ExecutionError::Unavailable(_)))));

        assert_eq!(controller.phase(), FormPhase::Editing);
        assert_eq!(controller.form().amount, dec!(0.15));
        assert_eq!(controller.form().to_coin, Some(CoinType::Eth));
        assert!(controller.is_valid());
    }

    struct SlowExecutor;

    #[async_trait]
    impl TradeExecutor for SlowExecutor {
        async fn execute_trade(&self, _form: &ExchangeFormData) -> ExecutionResult<()> {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_submit_returns_to_editing() {
        let mut controller = open_btc();
        controller.set_to_coin(CoinType::Eth).unwrap();

        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            controller.submit(&SlowExecutor),
        )
        .await;
        assert!(outcome.is_err());

        assert!(!controller.is_submitting());
        assert_eq!(controller.phase(), FormPhase::Editing);
        assert_eq!(controller.form().to_coin, Some(CoinType::Eth));
        controller.set_amount(dec!(0.1)).unwrap();

        let executor = MockExecutor::ok();
        controller.submit(&executor).await.unwrap();
        assert_eq!(executor.call_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_executor() {
        let executor = MockExecutor::ok();
        let mut controller = open_btc();
        controller.set_to_coin(CoinType::Eth).unwrap();
        controller.set_amount(dec!(1)).unwrap();

        assert_eq!(controller.submit(&executor).await, Err(FormError::InvalidForm));
        assert_eq!(executor.call_count(), 0);
    }

    #[test]
    fn test_update_balances_revalidates() {
        let mut controller = open_btc();
        controller.set_amount(dec!(0.4)).unwrap();
        assert!(controller.issue(FormField::Amount).is_some());

        let mut refreshed = balances();
        refreshed[0].balance = dec!(2);
        refreshed[0].excess_coin = dec!(1);
        refreshed[0].current_rate = dec!(63000);
        controller.update_balances(refreshed);

        assert!(controller.issue(FormField::Amount).is_none());
        assert_eq!(controller.form().manual_rate, dec!(63000));
    }
}
