use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use points_ledger::store::{LedgerStore, OwnerLedger};
use points_ledger::{NewTransaction, Points, balance, spend};

/// Generates deposits for one user, one per minute.
///
/// Pattern (repeating over `num_payers` payers):
/// 1. Deposit 100
/// 2. Deposit 50
/// 3. Adjustment -30
///
/// Every payer's net stays positive.
pub struct DepositGenerator {
    start: DateTime<Utc>,
    num_payers: u32,
    remaining: u32,
    step: u32,
}

impl DepositGenerator {
    pub fn new(num_payers: u32, count: u32) -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            num_payers,
            remaining: count,
            step: 0,
        }
    }
}

impl Iterator for DepositGenerator {
    type Item = NewTransaction;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let round = self.step / 3;
        let payer = format!("PAYER-{}", round % self.num_payers);
        let points = match self.step % 3 {
            0 => 100,
            1 => 50,
            _ => -30,
        };
        let timestamp = self.start + Duration::minutes(i64::from(self.step));
        self.step += 1;

        Some(NewTransaction::new(payer, points).at(timestamp))
    }
}

fn ledger_with(num_payers: u32, count: u32) -> OwnerLedger {
    let store = LedgerStore::new();
    let mut ledger = OwnerLedger::new("bench");
    for deposit in DepositGenerator::new(num_payers, count) {
        store.insert(&mut ledger, deposit).unwrap();
    }
    ledger
}

fn bench_balances(c: &mut Criterion) {
    let mut group = c.benchmark_group("balances");

    for count in [1_000u32, 10_000, 100_000] {
        let ledger = ledger_with(50, count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &ledger, |b, ledger| {
            b.iter(|| black_box(balance::payer_balances(ledger)));
        });
    }

    group.finish();
}

fn bench_spend(c: &mut Criterion) {
    let mut group = c.benchmark_group("spend");

    for count in [1_000u32, 10_000, 100_000] {
        let ledger = ledger_with(50, count);
        let half = Points::new(balance::total_balance(&ledger).get() / 2);
        group.bench_with_input(BenchmarkId::new("half_balance", count), &half, |b, &half| {
            b.iter_batched(
                || ledger_with(50, count),
                |mut ledger| black_box(spend::spend(&mut ledger, half)),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_many_small_spends(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_small_spends");
    group.sample_size(10);

    group.bench_function("10k_ledger_1k_spends", |b| {
        b.iter_batched(
            || ledger_with(50, 10_000),
            |mut ledger| {
                for _ in 0..1_000 {
                    let _ = black_box(spend::spend(&mut ledger, Points::new(10)));
                }
                ledger
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_balances, bench_spend, bench_many_small_spends);
criterion_main!(benches);
