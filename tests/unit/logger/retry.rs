use super::*;

#[test]
fn default_schedule_is_200_then_400() {
    let p = RetryPolicy::default();
    assert_eq!(
        p.schedule(),
        vec![Duration::from_millis(200), Duration::from_millis(400)]
    );
}

#[test]
fn delays_strictly_increase() {
    let p = RetryPolicy {
        max_attempts: 8,
        ..RetryPolicy::default()
    };
    let s = p.schedule();
    assert_eq!(s.len(), 7);
    assert!(s.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn huge_attempt_counts_saturate_instead_of_overflowing() {
    let p = RetryPolicy::default();
    assert_eq!(p.delay_after(200), Duration::from_millis(u64::MAX));
}

#[test]
fn validation() {
    assert!(RetryPolicy::default().validate().is_ok());
    for bad in [
        RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        },
        RetryPolicy {
            base_backoff_ms: 0,
            ..RetryPolicy::default()
        },
        RetryPolicy {
            backoff_multiplier: 1,
            ..RetryPolicy::default()
        },
    ] {
        assert!(matches!(bad.validate(), Err(CertError::Config(_))));
    }
}
