use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{NaiveDate, TimeZone, Utc};
use floatbook_core::{Money, TransactionId};
use floatbook_ledger::{
    compute_agent_balances, compute_daily_stats, reconcile, Agent, Channel, LiquiditySnapshot,
    Transaction, TransactionCategory, TransactionKind, TransactionSubject,
};

/// A log spread over 30 days, round-robin across agents and channels.
fn synthetic_log(agents: &[Agent], rows: usize) -> Vec<Transaction> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

    (0..rows)
        .map(|i| {
            let (kind, category) = if i % 3 == 0 {
                (TransactionKind::Return, TransactionCategory::Payment)
            } else {
                (TransactionKind::Issue, TransactionCategory::Issue)
            };
            Transaction {
                id: TransactionId::new(),
                subject: TransactionSubject::Agent(agents[i % agents.len()].id.clone()),
                kind,
                category,
                amount: Money::from_minor(((i * 7_919) % 500_000) as i64),
                method: Channel::ALL[i % Channel::ALL.len()].into(),
                date: start + chrono::Days::new((i % 30) as u64),
                timestamp,
                note: String::new(),
                performed_by: String::new(),
            }
        })
        .collect()
}

fn bench_full_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_recompute");
    let agents: Vec<Agent> = (0..50)
        .map(|i| Agent::register(format!("agent-{i}"), "", "").unwrap())
        .collect();
    let as_of = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap();
    let snapshot = LiquiditySnapshot::default();

    for rows in [1_000usize, 10_000, 100_000] {
        let log = synthetic_log(&agents, rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &log, |b, log| {
            b.iter(|| {
                let balances = compute_agent_balances(black_box(&agents), black_box(log), as_of);
                let stats = compute_daily_stats(&balances, log, as_of);
                black_box(reconcile(&snapshot, &stats))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_full_recompute);
criterion_main!(benches);
