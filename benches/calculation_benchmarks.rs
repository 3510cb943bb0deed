//! Performance benchmarks for the Leave Entitlement Engine.
//!
//! Exercises the hot paths: working-day counting over ranges of various
//! lengths and full request validation through the service.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use leave_engine::calculation::{count_working_days, south_african_holidays};
use leave_engine::config::LeavePolicy;
use leave_engine::models::{Employee, LeaveCategory, Role};
use leave_engine::service::{CreateLeaveRequest, LeaveService};
use leave_engine::store::{InMemoryStore, LeaveStore};

fn make_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn bench_working_days(c: &mut Criterion) {
    let holidays = south_african_holidays(2025);

    let mut group = c.benchmark_group("working_days");
    for (label, start, end) in [
        ("one_week", "2025-06-02", "2025-06-06"),
        ("one_month", "2025-06-01", "2025-06-30"),
        ("full_year", "2025-01-01", "2025-12-31"),
    ] {
        let start = make_date(start);
        let end = make_date(end);
        let days = (end - start).num_days() as u64 + 1;
        group.throughput(Throughput::Elements(days));
        group.bench_with_input(BenchmarkId::from_parameter(label), &(start, end), |b, &(s, e)| {
            b.iter(|| count_working_days(black_box(s), black_box(e), black_box(&holidays)))
        });
    }
    group.finish();
}

fn bench_request_validation(c: &mut Criterion) {
    let policy = LeavePolicy::default();
    let store = Arc::new(InMemoryStore::with_policy(&policy));
    let service = LeaveService::new(store.clone(), policy).with_today(make_date("2025-10-01"));

    for year in 2024..=2026 {
        service.holidays(year).unwrap();
    }

    let worker = Employee {
        id: Uuid::new_v4(),
        full_name: "Bench Worker".to_string(),
        email: "bench@example.com".to_string(),
        department: None,
        role: Role::Employee,
        start_date: make_date("2023-01-01"),
        end_date: None,
        work_days_per_week: 5,
        last_forfeiture_processed_at: None,
    };
    service.register_employee(worker.clone()).unwrap();
    service.run_monthly_accrual(make_date("2025-10-01")).unwrap();

    let annual_id = store
        .leave_types()
        .unwrap()
        .into_iter()
        .find(|t| t.category == LeaveCategory::Annual)
        .unwrap()
        .id;

    let input = CreateLeaveRequest {
        employee_id: worker.id,
        leave_type_id: annual_id,
        start_date: make_date("2025-11-03"),
        end_date: make_date("2025-11-07"),
        half_day: false,
        half_day_period: None,
        reason: None,
        frl_reason: None,
    };

    c.bench_function("validate_leave_request", |b| {
        b.iter(|| service.validate_leave_request(black_box(&input)))
    });
}

criterion_group!(benches, bench_working_days, bench_request_validation);
criterion_main!(benches);
