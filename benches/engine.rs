use chrono::{DateTime, Utc};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use coda_bank::engine::{self, AccountState};
use coda_bank::store::MemoryStore;
use coda_bank::{Amount, Ledger, Operation, Session};

/// Generates operation sequences for benchmarking.
///
/// Pattern (repeating):
/// 1. Deposit 100
/// 2. Withdrawal 30
/// 3. Transfer 50 to savings
/// 4. Transfer 20 from savings
///
/// Every `invalid_every`th operation is replaced by a fractional deposit,
/// which the engine rejects.
pub struct OpGenerator {
    remaining: u32,
    step: u32,
    invalid_every: u32,
}

impl OpGenerator {
    pub fn new(count: u32, invalid_every: u32) -> Self {
        Self {
            remaining: count,
            step: 0,
            invalid_every,
        }
    }
}

impl Iterator for OpGenerator {
    type Item = Operation;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.step += 1;

        if self.invalid_every > 0 && self.step % self.invalid_every == 0 {
            return Some(Operation::Deposit(Amount::from_float(2.5)));
        }

        let op = match self.step % 4 {
            1 => Operation::Deposit(Amount::from_whole(100)),
            2 => Operation::Withdrawal(Amount::from_whole(30)),
            3 => Operation::TransferToSavings(Amount::from_whole(50)),
            _ => Operation::TransferFromSavings(Amount::from_whole(20)),
        };
        Some(op)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

impl ExactSizeIterator for OpGenerator {}

fn now() -> DateTime<Utc> {
    Utc::now()
}

fn bench_engine_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_apply");

    for count in [10_000u32, 100_000, 1_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let at = now();
            b.iter(|| {
                let mut state = AccountState::default();
                for op in OpGenerator::new(count, 0) {
                    state = black_box(engine::apply(&state, op, at)).state;
                }
                state
            });
        });
    }

    group.finish();
}

fn bench_with_rejections(c: &mut Criterion) {
    let mut group = c.benchmark_group("with_rejections");

    // one operation in ten is rejected for a fractional amount
    group.bench_function("100k_reject_10pct", |b| {
        let at = now();
        b.iter(|| {
            let mut state = AccountState::default();
            for op in OpGenerator::new(100_000, 10) {
                state = black_box(engine::apply(&state, op, at)).state;
            }
            state
        });
    });

    group.finish();
}

fn bench_ledger(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger");

    group.bench_function("append_100k_then_last_10", |b| {
        let at = now();
        b.iter(|| {
            let mut state = AccountState::default();
            let mut ledger = Ledger::new();
            for op in OpGenerator::new(100_000, 0) {
                let applied = engine::apply(&state, op, at);
                state = applied.state;
                ledger.append(applied.record);
            }
            black_box(ledger.last_n(10).len())
        });
    });

    group.finish();
}

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    group.sample_size(10);

    let runtime = tokio::runtime::Runtime::new().expect("failed to build runtime");

    // every operation rewrites the whole ledger document
    for count in [100u32, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                runtime.block_on(async {
                    let mut session = Session::open(MemoryStore::new()).await.unwrap();
                    let ops = tokio_stream::iter(OpGenerator::new(count, 10));
                    black_box(session.run(ops).await.unwrap())
                })
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_engine_apply,
    bench_with_rejections,
    bench_ledger,
    bench_session,
);

criterion_main!(benches);
