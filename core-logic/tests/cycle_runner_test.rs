use async_trait::async_trait;
use core_logic::{
    parse_cycle_count, Account, AccountPool, AccountSelection, Amount, AmountRange, ConfigError,
    CoreError, CycleRunner, CycleTemplate, DelayRange, OperationClient, OperationError,
    RandomSource, RunConfig, Sleeper, Step, WalletError, WorkerRunner,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
struct MockOp {
    label: &'static str,
    amount: Option<u64>,
}

#[derive(Default)]
struct MockClient {
    submitted: Mutex<Vec<(usize, MockOp)>>,
    confirmed: AtomicUsize,
    fail_submits: HashSet<usize>,
    hang_confirm: bool,
}

impl MockClient {
    fn failing_on(submits: &[usize]) -> Self {
        Self {
            fail_submits: submits.iter().copied().collect(),
            ..Default::default()
        }
    }

    fn submitted(&self) -> Vec<(usize, MockOp)> {
        self.submitted.lock().unwrap().clone()
    }

    fn stakes(&self) -> Vec<(usize, Option<u64>)> {
        self.submitted()
            .into_iter()
            .filter(|(_, op)| op.label == "stake")
            .map(|(account, op)| (account, op.amount))
            .collect()
    }
}

#[async_trait]
impl OperationClient for MockClient {
    type Signer = ();
    type Operation = MockOp;
    type Pending = usize;

    async fn submit(
        &self,
        account: &Account<()>,
        operation: &MockOp,
    ) -> Result<usize, OperationError> {
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push((account.index, operation.clone()));
        let ordinal = submitted.len();
        if self.fail_submits.contains(&ordinal) {
            return Err(OperationError::Submit {
                reason: "insufficient funds".to_string(),
            });
        }
        Ok(ordinal)
    }

    async fn confirm(&self, pending: &usize) -> Result<String, OperationError> {
        if self.hang_confirm {
            std::future::pending::<()>().await;
        }
        self.confirmed.fetch_add(1, Ordering::SeqCst);
        Ok(self.tx_hash(pending))
    }

    fn tx_hash(&self, pending: &usize) -> String {
        format!("0x{:04x}", pending)
    }
}

/// stake, optional settle, optional unstake
struct StakeTemplate {
    settle: bool,
    unstake: bool,
}

impl StakeTemplate {
    fn stake_only() -> Self {
        Self {
            settle: false,
            unstake: false,
        }
    }

    fn stake_unstake() -> Self {
        Self {
            settle: false,
            unstake: true,
        }
    }
}

impl CycleTemplate<MockClient> for StakeTemplate {
    fn name(&self) -> &str {
        "MockStake"
    }

    fn requires_amount(&self) -> bool {
        true
    }

    fn build(
        &self,
        _account: &Account<()>,
        amount: Option<Amount>,
    ) -> Result<Vec<Step<MockOp>>, OperationError> {
        let amount = amount.map(|a| a.units());
        let mut steps = vec![Step::submit(
            "stake",
            MockOp {
                label: "stake",
                amount,
            },
        )];
        if self.settle {
            steps.push(Step::Settle);
        }
        if self.unstake {
            steps.push(Step::submit(
                "unstake",
                MockOp {
                    label: "unstake",
                    amount,
                },
            ));
        }
        Ok(steps)
    }
}

struct BrokenTemplate;

impl CycleTemplate<MockClient> for BrokenTemplate {
    fn name(&self) -> &str {
        "Broken"
    }

    fn requires_amount(&self) -> bool {
        false
    }

    fn build(
        &self,
        _account: &Account<()>,
        amount: Option<Amount>,
    ) -> Result<Vec<Step<MockOp>>, OperationError> {
        assert!(amount.is_none());
        Err(OperationError::Build {
            label: "broken".to_string(),
            reason: "cannot encode".to_string(),
        })
    }
}

#[derive(Default)]
struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Replays fixed sequences, wrapping around.
struct ScriptedRandom {
    amounts: Vec<u64>,
    delays: Vec<u64>,
    indices: Vec<usize>,
    amount_pos: AtomicUsize,
    delay_pos: AtomicUsize,
    index_pos: AtomicUsize,
}

impl ScriptedRandom {
    fn new(amounts: &[u64], delays: &[u64], indices: &[usize]) -> Self {
        Self {
            amounts: amounts.to_vec(),
            delays: delays.to_vec(),
            indices: indices.to_vec(),
            amount_pos: AtomicUsize::new(0),
            delay_pos: AtomicUsize::new(0),
            index_pos: AtomicUsize::new(0),
        }
    }

    fn next<T: Copy>(values: &[T], pos: &AtomicUsize) -> T {
        let i = pos.fetch_add(1, Ordering::SeqCst);
        values[i % values.len()]
    }
}

impl RandomSource for ScriptedRandom {
    fn amount(&self, _range: &AmountRange) -> Amount {
        Amount::from_units(Self::next(&self.amounts, &self.amount_pos))
    }

    fn delay(&self, _range: &DelayRange) -> Duration {
        Duration::from_secs(Self::next(&self.delays, &self.delay_pos))
    }

    fn index(&self, _len: usize) -> usize {
        Self::next(&self.indices, &self.index_pos)
    }
}

fn pool(size: usize) -> Arc<AccountPool<()>> {
    let accounts = (0..size)
        .map(|index| Account {
            index,
            address: format!("0xacc{}", index),
            signer: (),
        })
        .collect();
    Arc::new(AccountPool::new(accounts).unwrap())
}

fn scripted() -> Arc<ScriptedRandom> {
    Arc::new(ScriptedRandom::new(
        &[100, 250, 499, 321],
        &[60, 120, 180],
        &[0],
    ))
}

fn runner<T: CycleTemplate<MockClient>>(
    client: &Arc<MockClient>,
    accounts: usize,
    template: T,
    sleeper: &Arc<RecordingSleeper>,
) -> CycleRunner<MockClient, T> {
    CycleRunner::new(client.clone(), pool(accounts), Arc::new(template))
        .with_random(scripted())
        .with_sleeper(sleeper.clone())
}

fn config(cycles: u32) -> RunConfig {
    RunConfig::new(cycles)
        .with_amount(AmountRange::new(0.01, 0.05))
        .with_delay(DelayRange::new(60, 180))
}

#[tokio::test]
async fn test_three_cycles_all_succeed() {
    let client = Arc::new(MockClient::default());
    let sleeper = Arc::new(RecordingSleeper::default());
    let runner = runner(&client, 1, StakeTemplate::stake_only(), &sleeper);

    let summary = runner
        .run(&config(3), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(client.submitted().len(), 3);
    assert_eq!(client.confirmed.load(Ordering::SeqCst), 3);
    assert_eq!(sleeper.sleeps().len(), 2);
    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.submitted, 3);
    assert_eq!(summary.confirmed, 3);
    assert_eq!(summary.delays, 2);
    assert!(!summary.cancelled);
}

#[tokio::test]
async fn test_sleeps_between_cycles_only() {
    for cycles in 1..=6u32 {
        let client = Arc::new(MockClient::default());
        let sleeper = Arc::new(RecordingSleeper::default());
        let runner = runner(&client, 2, StakeTemplate::stake_only(), &sleeper);

        let summary = runner
            .run(&config(cycles), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.attempted, cycles as u64);
        assert_eq!(sleeper.sleeps().len(), cycles as usize - 1);
    }
}

#[tokio::test]
async fn test_failed_cycle_does_not_stop_run_or_shift_draws() {
    // Baseline run without failures.
    let clean = Arc::new(MockClient::default());
    let clean_sleeper = Arc::new(RecordingSleeper::default());
    runner(&clean, 2, StakeTemplate::stake_unstake(), &clean_sleeper)
        .run(&config(3), CancellationToken::new())
        .await
        .unwrap();

    // Submission #3 is the stake of cycle 2.
    let client = Arc::new(MockClient::failing_on(&[3]));
    let sleeper = Arc::new(RecordingSleeper::default());
    let summary = runner(&client, 2, StakeTemplate::stake_unstake(), &sleeper)
        .run(&config(3), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);

    // Cycle 2's unstake is abandoned, cycle 3 still runs.
    let labels: Vec<&str> = client.submitted().iter().map(|(_, op)| op.label).collect();
    assert_eq!(labels, vec!["stake", "unstake", "stake", "stake", "unstake"]);

    // Same accounts, amounts and delays as the clean run.
    assert_eq!(client.stakes(), clean.stakes());
    assert_eq!(sleeper.sleeps(), clean_sleeper.sleeps());
}

#[tokio::test]
async fn test_invalid_cycle_input_submits_nothing() {
    for input in ["abc", "-3", "0"] {
        let err = parse_cycle_count(input, None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInput { .. }), "{}", input);
    }

    let client = Arc::new(MockClient::default());
    let sleeper = Arc::new(RecordingSleeper::default());
    let err = runner(&client, 1, StakeTemplate::stake_only(), &sleeper)
        .run(&config(0), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Config(ConfigError::InvalidInput { .. })
    ));
    assert!(client.submitted().is_empty());
}

#[tokio::test]
async fn test_confirmation_timeout_is_reported_and_skipped() {
    let client = Arc::new(MockClient {
        hang_confirm: true,
        ..Default::default()
    });
    let sleeper = Arc::new(RecordingSleeper::default());
    let cfg = config(2).with_confirmation_timeout(Duration::from_millis(30));

    let summary = runner(&client, 1, StakeTemplate::stake_unstake(), &sleeper)
        .run(&cfg, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.failed, 2);
    assert_eq!(summary.confirmed, 0);
    // Only the stake of each cycle is sent; its confirmation never arrives.
    assert_eq!(client.submitted().len(), 2);
    assert_eq!(sleeper.sleeps().len(), 1);
}

#[tokio::test]
async fn test_each_selection_covers_every_account() {
    let client = Arc::new(MockClient::default());
    let sleeper = Arc::new(RecordingSleeper::default());
    let summary = runner(&client, 3, StakeTemplate::stake_unstake(), &sleeper)
        .with_selection(AccountSelection::Each)
        .run(&config(2), CancellationToken::new())
        .await
        .unwrap();

    let accounts: Vec<usize> = client.stakes().iter().map(|(a, _)| *a).collect();
    assert_eq!(accounts, vec![0, 1, 2, 0, 1, 2]);
    assert_eq!(summary.confirmed, 12);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(sleeper.sleeps().len(), 1);
}

#[tokio::test]
async fn test_each_selection_isolates_accounts_within_cycle() {
    // Submission #1 is account 0's stake; account 1 still runs.
    let client = Arc::new(MockClient::failing_on(&[1]));
    let sleeper = Arc::new(RecordingSleeper::default());
    let summary = runner(&client, 2, StakeTemplate::stake_unstake(), &sleeper)
        .with_selection(AccountSelection::Each)
        .run(&config(1), CancellationToken::new())
        .await
        .unwrap();

    let sent: Vec<(usize, &str)> = client
        .submitted()
        .iter()
        .map(|(a, op)| (*a, op.label))
        .collect();
    assert_eq!(sent, vec![(0, "stake"), (1, "stake"), (1, "unstake")]);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn test_round_robin_selection() {
    let client = Arc::new(MockClient::default());
    let sleeper = Arc::new(RecordingSleeper::default());
    runner(&client, 2, StakeTemplate::stake_only(), &sleeper)
        .with_selection(AccountSelection::RoundRobin)
        .run(&config(3), CancellationToken::new())
        .await
        .unwrap();

    let accounts: Vec<usize> = client.stakes().iter().map(|(a, _)| *a).collect();
    assert_eq!(accounts, vec![0, 1, 0]);
}

#[tokio::test]
async fn test_random_selection_uses_source() {
    let client = Arc::new(MockClient::default());
    let sleeper = Arc::new(RecordingSleeper::default());
    CycleRunner::new(client.clone(), pool(3), Arc::new(StakeTemplate::stake_only()))
        .with_selection(AccountSelection::Random)
        .with_random(Arc::new(ScriptedRandom::new(&[100], &[60], &[2, 0, 1])))
        .with_sleeper(sleeper.clone())
        .run(&config(3), CancellationToken::new())
        .await
        .unwrap();

    let accounts: Vec<usize> = client.stakes().iter().map(|(a, _)| *a).collect();
    assert_eq!(accounts, vec![2, 0, 1]);
}

#[tokio::test]
async fn test_fixed_selection_out_of_range_is_fatal() {
    let client = Arc::new(MockClient::default());
    let sleeper = Arc::new(RecordingSleeper::default());
    let err = runner(&client, 2, StakeTemplate::stake_only(), &sleeper)
        .with_selection(AccountSelection::Fixed(5))
        .run(&config(2), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Wallet(WalletError::NotFound { index: 5, total: 2 })
    ));
    assert!(client.submitted().is_empty());
}

#[tokio::test]
async fn test_fixed_interval_replaces_random_delay() {
    let client = Arc::new(MockClient::default());
    let sleeper = Arc::new(RecordingSleeper::default());
    runner(&client, 1, StakeTemplate::stake_only(), &sleeper)
        .run(
            &config(3).with_interval_hours(Some(2)),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(7200); 2]);
}

#[tokio::test]
async fn test_settle_step_pauses_inside_cycle() {
    let client = Arc::new(MockClient::default());
    let sleeper = Arc::new(RecordingSleeper::default());
    let template = StakeTemplate {
        settle: true,
        unstake: true,
    };
    let summary = runner(&client, 1, template, &sleeper)
        .run(&config(2), CancellationToken::new())
        .await
        .unwrap();

    // settle, inter-cycle, settle
    assert_eq!(
        sleeper.sleeps(),
        vec![
            Duration::from_secs(60),
            Duration::from_secs(120),
            Duration::from_secs(180)
        ]
    );
    assert_eq!(summary.delays, 1);
    assert_eq!(summary.confirmed, 4);

    // Unstake reuses the stake amount.
    let amounts: Vec<Option<u64>> = client.submitted().iter().map(|(_, op)| op.amount).collect();
    assert_eq!(amounts, vec![Some(100), Some(100), Some(250), Some(250)]);
}

#[tokio::test]
async fn test_build_failure_abandons_cycle() {
    let client = Arc::new(MockClient::default());
    let sleeper = Arc::new(RecordingSleeper::default());
    let summary = runner(&client, 1, BrokenTemplate, &sleeper)
        .run(&config(2), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.failed, 2);
    assert!(client.submitted().is_empty());
    assert_eq!(sleeper.sleeps().len(), 1);
}

#[tokio::test]
async fn test_cancelled_token_stops_before_first_cycle() {
    let client = Arc::new(MockClient::default());
    let sleeper = Arc::new(RecordingSleeper::default());
    let token = CancellationToken::new();
    token.cancel();

    let summary = runner(&client, 1, StakeTemplate::stake_only(), &sleeper)
        .run(&config(3), token)
        .await
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.attempted, 0);
    assert!(client.submitted().is_empty());
}

#[tokio::test]
async fn test_concurrent_runners_are_independent() {
    let client = Arc::new(MockClient::failing_on(&[1]));
    let sleeper = Arc::new(RecordingSleeper::default());
    let accounts = pool(3);

    let runners = (0..3)
        .map(|index| {
            CycleRunner::new(
                client.clone(),
                accounts.clone(),
                Arc::new(StakeTemplate::stake_only()),
            )
            .with_selection(AccountSelection::Fixed(index))
            .with_random(scripted())
            .with_sleeper(sleeper.clone())
        })
        .collect();

    let total = WorkerRunner::run_concurrent(runners, config(2)).await.unwrap();

    assert_eq!(total.attempted, 6);
    assert_eq!(total.failed, 1);
    assert_eq!(total.succeeded, 5);
    assert_eq!(sleeper.sleeps().len(), 3);

    let mut per_account = [0usize; 3];
    for (account, _) in client.stakes() {
        per_account[account] += 1;
    }
    assert_eq!(per_account, [2, 2, 2]);
}

/// Stakes like `StakeTemplate` but blows up for one account.
struct PanicsOnAccount(usize);

impl CycleTemplate<MockClient> for PanicsOnAccount {
    fn name(&self) -> &str {
        "PanicsOnAccount"
    }

    fn requires_amount(&self) -> bool {
        true
    }

    fn build(
        &self,
        account: &Account<()>,
        amount: Option<Amount>,
    ) -> Result<Vec<Step<MockOp>>, OperationError> {
        if account.index == self.0 {
            panic!("template bug for account {}", account.index);
        }
        StakeTemplate::stake_only().build(account, amount)
    }
}

#[tokio::test]
async fn test_panicked_worker_counts_as_failed_cycles() {
    let client = Arc::new(MockClient::default());
    let accounts = pool(3);
    let template = Arc::new(PanicsOnAccount(1));

    let runners = (0..3)
        .map(|index| {
            CycleRunner::new(client.clone(), accounts.clone(), template.clone())
                .with_selection(AccountSelection::Fixed(index))
                .with_random(scripted())
                .with_sleeper(Arc::new(RecordingSleeper::default()))
        })
        .collect();

    let total = WorkerRunner::run_concurrent(runners, config(2)).await.unwrap();

    assert_eq!(total.attempted, 6);
    assert_eq!(total.succeeded, 4);
    assert_eq!(total.failed, 2);
    assert_eq!(client.stakes().len(), 4);
}

#[tokio::test]
async fn test_worker_that_refuses_to_start_counts_as_failed_cycles() {
    let client = Arc::new(MockClient::default());
    let accounts = pool(2);

    let runners = [0, 5]
        .into_iter()
        .map(|index| {
            CycleRunner::new(
                client.clone(),
                accounts.clone(),
                Arc::new(StakeTemplate::stake_only()),
            )
            .with_selection(AccountSelection::Fixed(index))
            .with_random(scripted())
            .with_sleeper(Arc::new(RecordingSleeper::default()))
        })
        .collect();

    let total = WorkerRunner::run_concurrent(runners, config(3)).await.unwrap();

    assert_eq!(total.attempted, 6);
    assert_eq!(total.succeeded, 3);
    assert_eq!(total.failed, 3);
}
