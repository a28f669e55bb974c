use bsweep_exp::{RepeatCounts, RepeatPolicy, RepeatScheduler};
use proptest::prelude::*;

proptest! {
    #[test]
    fn counts_never_drop_below_the_floor(
        floor in 1u32..32,
        extra in 0u32..200,
        decrement in 0u32..20,
    ) {
        let policy = RepeatPolicy { initial: floor + extra, floor, decrement };
        let scheduler = RepeatScheduler::new(&policy);
        let mut previous = policy.initial;
        for _ in 0..256 {
            let next = scheduler.next_repeat_count(previous);
            prop_assert!(next >= floor);
            prop_assert!(next <= previous);
            if previous > floor && previous - floor >= decrement {
                prop_assert_eq!(next, previous - decrement);
            }
            previous = next;
        }
    }

    #[test]
    fn counts_stabilize_at_the_floor(floor in 1u32..16, extra in 0u32..64, decrement in 1u32..8) {
        let policy = RepeatPolicy { initial: floor + extra, floor, decrement };
        let counts: Vec<_> = RepeatCounts::new(&policy).take(128).collect();
        prop_assert_eq!(*counts.last().expect("counts"), floor);
        for pair in counts.windows(2) {
            prop_assert!(pair[1] <= pair[0]);
        }
    }
}

#[test]
fn siphash_schedule_decays_to_floor() {
    let policy = RepeatPolicy {
        initial: 32,
        floor: 8,
        decrement: 2,
    };
    let counts: Vec<_> = RepeatCounts::new(&policy).take(14).collect();
    assert_eq!(
        counts,
        vec![30, 28, 26, 24, 22, 20, 18, 16, 14, 12, 10, 8, 8, 8]
    );
}

#[test]
fn decrement_is_clamped_to_the_floor() {
    let scheduler = RepeatScheduler::new(&RepeatPolicy {
        initial: 10,
        floor: 8,
        decrement: 4,
    });
    assert_eq!(scheduler.next_repeat_count(10), 8);
    assert_eq!(scheduler.next_repeat_count(8), 8);
}

#[test]
fn zero_decrement_keeps_the_count() {
    let scheduler = RepeatScheduler::new(&RepeatPolicy {
        initial: 5,
        floor: 1,
        decrement: 0,
    });
    assert_eq!(scheduler.next_repeat_count(5), 5);
}
