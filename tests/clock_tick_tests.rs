//! Tick clock tests

use console_hal::clock::{wrap_sub, TickClock};

#[test]
fn test_n_increments_advance_by_n() {
    let clock = TickClock::starting_at(100);
    let before = clock.now();

    for _ in 0..250 {
        clock.increment();
    }

    assert_eq!(wrap_sub(clock.now(), before), 250);
}

#[test]
fn test_n_increments_across_wraparound() {
    for start in [u32::MAX, u32::MAX - 3, u32::MAX - 99] {
        let clock = TickClock::starting_at(start);
        let before = clock.now();

        for _ in 0..100 {
            clock.increment();
        }

        assert_eq!(wrap_sub(clock.now(), before), 100, "start = {}", start);
        assert!(clock.now() < before, "counter should have wrapped");
    }
}

#[test]
fn test_wrap_sub_plain_case() {
    assert_eq!(wrap_sub(10, 3), 7);
    assert_eq!(wrap_sub(3, 3), 0);
}

#[test]
fn test_wrap_sub_wrapped_case() {
    assert_eq!(wrap_sub(2, u32::MAX), 3);
}

#[test]
fn test_elapsed_since() {
    let clock = TickClock::new();
    let start = clock.now();
    clock.increment();
    clock.increment();
    assert_eq!(clock.elapsed_since(start), 2);
}
