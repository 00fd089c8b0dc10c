use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::Instant;

use super::*;
use crate::composition::request::CertificateRequest;

/// Pops one scripted outcome per call and records when each call happened.
#[derive(Default)]
struct ScriptedStore {
    outcomes: Mutex<VecDeque<bool>>,
    calls: Mutex<Vec<Instant>>,
}

impl ScriptedStore {
    fn new(outcomes: &[bool]) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.iter().copied().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TabularStore for ScriptedStore {
    async fn append_row(&self, _row: &[String; 3]) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(Instant::now());
        match self.outcomes.lock().unwrap().pop_front() {
            Some(true) => Ok(()),
            _ => anyhow::bail!("503 backend unavailable"),
        }
    }
}

fn entry() -> LogEntry {
    LogEntry::now(&CertificateRequest::new("Vespa Club X", "Malang").unwrap())
}

#[tokio::test(start_paused = true)]
async fn first_success_is_acked_immediately() {
    let store = ScriptedStore::new(&[true]);
    let logger = RecordLogger::new(store.clone(), RetryPolicy::default());
    assert_eq!(logger.append(&entry()).await.unwrap(), Ack { attempts: 1 });
    assert_eq!(store.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn success_on_second_attempt_stops_retrying() {
    let store = ScriptedStore::new(&[false, true, true]);
    let logger = RecordLogger::new(store.clone(), RetryPolicy::default());

    assert_eq!(logger.append(&entry()).await.unwrap(), Ack { attempts: 2 });
    let calls = store.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1] - calls[0], Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_max_attempts_with_growing_delays() {
    let store = ScriptedStore::new(&[false, false, false, true]);
    let logger = RecordLogger::new(store.clone(), RetryPolicy::default());

    let err = logger.append(&entry()).await.unwrap_err();
    assert_eq!(err.attempts, 3);
    assert!(err.to_string().contains("503 backend unavailable"));

    let calls = store.calls();
    assert_eq!(calls.len(), 3);
    let gaps: Vec<Duration> = calls.windows(2).map(|w| w[1] - w[0]).collect();
    assert_eq!(
        gaps,
        vec![Duration::from_millis(200), Duration::from_millis(400)]
    );
    assert!(gaps[1] > gaps[0]);
}

#[tokio::test(start_paused = true)]
async fn custom_policy_bounds_attempts() {
    let store = ScriptedStore::new(&[]);
    let policy = RetryPolicy {
        max_attempts: 5,
        base_backoff_ms: 10,
        backoff_multiplier: 3,
    };
    let logger = RecordLogger::new(store.clone(), policy);
    let err = logger.append(&entry()).await.unwrap_err();
    assert_eq!(err.attempts, 5);

    let calls = store.calls();
    let gaps: Vec<u128> = calls.windows(2).map(|w| (w[1] - w[0]).as_millis()).collect();
    assert_eq!(gaps, vec![10, 30, 90, 270]);
}
