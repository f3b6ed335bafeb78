//! Right-of-way queue tests

use crossroad_sim::simulation::{ActivationArbiter, Approach, SimError};

use Approach::{East, North, South, West};

#[test]
fn test_empty_queue_grants_immediately() {
    let mut arbiter = ActivationArbiter::new();
    assert!(arbiter.request_activation(West));
    assert_eq!(arbiter.head(), Some(West));
    assert_eq!(arbiter.len(), 1);
}

#[test]
fn test_head_is_granted_again() {
    let mut arbiter = ActivationArbiter::new();
    assert!(arbiter.request_activation(North));
    assert!(arbiter.request_activation(North));
    assert_eq!(arbiter.len(), 1);
}

#[test]
fn test_waiting_approach_is_queued_once() {
    let mut arbiter = ActivationArbiter::new();
    assert!(arbiter.request_activation(North));
    assert!(!arbiter.request_activation(South));
    assert!(!arbiter.request_activation(South));
    assert!(!arbiter.request_activation(South));
    assert_eq!(arbiter.queued().collect::<Vec<_>>(), vec![North, South]);
}

#[test]
fn test_grants_follow_request_order() {
    let mut arbiter = ActivationArbiter::new();
    let order = [East, North, West, South];
    for approach in order {
        arbiter.request_activation(approach);
    }

    let mut granted = Vec::new();
    while let Some(head) = arbiter.head() {
        // Everyone keeps asking; only the head gets through
        for approach in order {
            let ok = arbiter.request_activation(approach);
            assert_eq!(ok, approach == head);
        }
        granted.push(head);
        arbiter
            .release_head(head)
            .expect("head should be able to release");
        if granted.len() == order.len() {
            break;
        }
    }
    assert_eq!(granted, order.to_vec());
}

#[test]
fn test_late_request_waits_for_everyone_ahead() {
    let mut arbiter = ActivationArbiter::new();
    for approach in [North, West, South] {
        arbiter.request_activation(approach);
    }
    assert!(!arbiter.request_activation(East));

    let mut cycles_waited = 0;
    while arbiter.head() != Some(East) {
        let head = arbiter.head().expect("queue should not drain before East");
        arbiter.release_head(head).expect("head release");
        // The released approach immediately asks again
        arbiter.request_activation(head);
        cycles_waited += 1;
    }
    assert_eq!(cycles_waited, 3);
    assert!(arbiter.request_activation(East));
}

#[test]
fn test_release_by_non_head_is_an_error() {
    let mut arbiter = ActivationArbiter::new();
    arbiter.request_activation(North);
    arbiter.request_activation(West);

    let err = arbiter.release_head(West).unwrap_err();
    assert!(matches!(
        err,
        SimError::ArbiterOrder {
            expected: Some(North),
            got: West
        }
    ));
    assert_eq!(arbiter.head(), Some(North));

    let mut empty = ActivationArbiter::new();
    assert!(matches!(
        empty.release_head(South),
        Err(SimError::ArbiterOrder { expected: None, .. })
    ));
}
