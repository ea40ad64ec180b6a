//! Timer-driven scenarios
//!
//! Pledges settled from other threads after a delay, the way a host
//! scheduler would settle them. Delays are short; every wait is bounded.

use parking_lot::Mutex;
use pledge::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const BOUND: Duration = Duration::from_secs(5);

/// A pledge settled with `outcome` by a timer thread after `ms` milliseconds
fn after<T: Send + Clone + 'static>(ms: u64, outcome: Outcome<T, String>) -> Pledge<T, String> {
    let (pledge, resolver) = PledgeBuilder::new()
        .label(format!("timer-{ms}ms"))
        .pending();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(ms));
        match outcome {
            Outcome::Fulfilled(value) => resolver.fulfill(value),
            Outcome::Rejected(reason) => resolver.reject(reason),
        }
    });
    pledge
}

#[test]
fn test_chained_greetings_end_in_nested_pledge() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let p: Pledge<String, String> = Pledge::new(|r| {
        r.fulfill("hello".to_string());
        Ok(())
    });

    let log = Arc::clone(&seen);
    let log2 = Arc::clone(&seen);
    let log3 = Arc::clone(&seen);
    let done = p
        .then(move |res| {
            log.lock().push(res);
            Ok("world".to_string())
        })
        .then(move |res| {
            log2.lock().push(res);
            Ok("1332".to_string())
        })
        .and_then(move |res| {
            log3.lock().push(res);
            Ok(after(10, Outcome::Fulfilled("545454".to_string())).into())
        })
        .catch(|err| Ok(format!("caught: {err}")));

    assert_eq!(done.wait_timeout(BOUND).unwrap(), Outcome::Fulfilled("545454".to_string()));
    assert_eq!(*seen.lock(), vec!["hello", "world", "1332"]);
}

#[test]
fn test_all_waits_for_slowest_and_keeps_order() {
    let a = after(40, Outcome::Fulfilled(1));
    let b = after(20, Outcome::Fulfilled(2));
    let every = all([a, b]);

    assert_eq!(every.wait_timeout(BOUND).unwrap(), Outcome::Fulfilled(vec![1, 2]));
}

#[test]
fn test_all_of_two_timers() {
    let every = all([
        after(10, Outcome::Fulfilled("100ms".to_string())),
        after(20, Outcome::Fulfilled("200ms".to_string())),
    ]);
    assert_eq!(
        every.wait_timeout(BOUND).unwrap(),
        Outcome::Fulfilled(vec!["100ms".to_string(), "200ms".to_string()])
    );
}

#[test]
fn test_race_of_three_timers_takes_fastest() {
    let winner = race([
        after(10, Outcome::Fulfilled("100ms".to_string())),
        after(200, Outcome::Fulfilled("200ms".to_string())),
        after(300, Outcome::Rejected("reject".to_string())),
    ]);
    assert_eq!(
        winner.wait_timeout(BOUND).unwrap(),
        Outcome::Fulfilled("100ms".to_string())
    );
}

#[test]
fn test_all_fails_fast_on_timer_rejection() {
    let (slow, _never) = Pledge::<i32, String>::pending();
    let every = all([slow, after(10, Outcome::Rejected("timer failed".to_string()))]);
    assert_eq!(
        every.wait_timeout(BOUND).unwrap(),
        Outcome::Rejected("timer failed".to_string())
    );
}

#[test]
fn test_wait_timeout_on_slow_timer() {
    let slow = after(500, Outcome::Fulfilled(0_u8));
    let err = slow.wait_timeout(Duration::from_millis(10)).unwrap_err();
    assert!(err.is_timeout());
}
