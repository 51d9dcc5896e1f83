#![forbid(unsafe_code)]

mod support;

use support::{Fixture, cat, name};
use tally_storage::{CreateCounterRequest, MutationOutcome, SqliteStore};

#[test]
fn increments_from_absent_count_up_from_one() {
    let fx = Fixture::new();
    let orders = cat("orders");

    assert!(fx.store.lookup(&orders).expect("lookup").is_none());
    for _ in 0..7 {
        fx.store.increment(&orders);
    }

    let counter = fx.store.lookup(&orders).expect("lookup").expect("counter exists");
    assert_eq!(counter.name.as_str(), "orders::total");
    assert_eq!(counter.value, 7);
    assert!(counter.created_at_ms <= counter.updated_at_ms);
}

#[test]
fn first_increment_reports_creation() {
    let fx = Fixture::new();
    let users = cat("users");

    assert_eq!(
        fx.store.try_increment(&users).expect("increment"),
        MutationOutcome::Created
    );
    assert_eq!(
        fx.store.try_increment(&users).expect("increment"),
        MutationOutcome::Updated
    );
}

#[test]
fn created_at_is_fixed_after_creation() {
    let fx = Fixture::new();
    let users = cat("users");
    fx.store.increment(&users);
    let created = fx.store.lookup(&users).expect("lookup").expect("counter");

    std::thread::sleep(std::time::Duration::from_millis(5));
    fx.store.increment(&users);
    fx.store.decrement(&users);
    let after = fx.store.lookup(&users).expect("lookup").expect("counter");

    assert_eq!(after.id, created.id);
    assert_eq!(after.created_at_ms, created.created_at_ms);
    assert!(after.updated_at_ms > created.updated_at_ms);
}

#[test]
fn decrement_stops_at_one() {
    let mut fx = Fixture::new();
    let orders = cat("orders");
    fx.store
        .create_counter(CreateCounterRequest {
            name: name("orders::total"),
            value: 5,
            context: None,
        })
        .expect("create counter");

    for _ in 0..4 {
        assert_eq!(
            fx.store.try_decrement(&orders).expect("decrement"),
            MutationOutcome::Updated
        );
    }
    assert_eq!(fx.store.lookup(&orders).expect("lookup").expect("counter").value, 1);

    assert_eq!(
        fx.store.try_decrement(&orders).expect("decrement"),
        MutationOutcome::Skipped
    );
    fx.store.decrement(&orders);
    assert_eq!(fx.store.lookup(&orders).expect("lookup").expect("counter").value, 1);
}

#[test]
fn decrement_never_creates_a_counter() {
    let fx = Fixture::new();
    let ghosts = cat("ghosts");

    assert_eq!(
        fx.store.try_decrement(&ghosts).expect("decrement"),
        MutationOutcome::Skipped
    );
    fx.store.decrement(&ghosts);
    assert!(fx.store.lookup(&ghosts).expect("lookup").is_none());
}

#[test]
fn counters_category_is_never_tracked() {
    let fx = Fixture::new();
    let counters = cat("counters");

    assert_eq!(
        fx.store.try_increment(&counters).expect("increment"),
        MutationOutcome::Skipped
    );
    fx.store.increment(&counters);
    fx.store.decrement(&counters);
    assert!(fx.store.lookup(&counters).expect("lookup").is_none());
    assert!(
        fx.store
            .list_counters(Default::default())
            .expect("list")
            .is_empty()
    );
}

#[test]
fn mutation_failures_are_swallowed() {
    let fx = Fixture::new();
    let orders = cat("orders");
    fx.app_conn()
        .execute_batch("DROP TABLE counters;")
        .expect("drop counters table");

    assert!(fx.store.try_increment(&orders).is_err());
    fx.store.increment(&orders);
    fx.store.decrement(&orders);
    assert!(fx.store.lookup(&orders).is_err(), "reads still surface errors");
}

#[test]
fn concurrent_first_increments_do_not_lose_updates() {
    let fx = Fixture::new();
    let dir = fx.dir.path().to_path_buf();
    let config = fx.store.config().clone();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dir = dir.clone();
            let config = config.clone();
            std::thread::spawn(move || {
                let store = SqliteStore::open_with(&dir, config).expect("open store");
                let orders = cat("orders");
                for _ in 0..25 {
                    store.try_increment(&orders).expect("increment");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker thread");
    }

    let counter = fx.store.lookup(&cat("orders")).expect("lookup").expect("counter");
    assert_eq!(counter.value, 100);
}
