#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tiger_five::error::RemoteError;
use tiger_five::remote::RemoteService;
use tiger_five::{MistakeCounters, RoundInput};
use tokio::sync::Semaphore;

pub fn round_input(
    date: &str,
    course: &str,
    total_score: i32,
    counters: [u32; 5],
    bad_drives: u32,
) -> RoundInput {
    let [double_bogey, bogey_par5, three_putts, bogey_inside150, missed_saves] = counters;
    RoundInput {
        date: date.to_string(),
        course: course.to_string(),
        total_score: Some(total_score),
        counters: MistakeCounters::new(
            double_bogey,
            bogey_par5,
            three_putts,
            bogey_inside150,
            missed_saves,
        ),
        bad_drives,
    }
}

pub fn pebble() -> RoundInput {
    round_input("2024-01-01", "Pebble", 80, [1, 0, 2, 1, 0], 3)
}

#[derive(Debug, Clone)]
pub struct SeenCall {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
}

/// Scripted analytics service: answers `{"ok": true}` unless the endpoint contains one of
/// `failing`, in which case it returns a network error. With a gate, every call waits for a permit.
#[derive(Default)]
pub struct FakeRemote {
    pub calls: Mutex<Vec<SeenCall>>,
    pub failing: Vec<String>,
    pub gate: Option<Arc<Semaphore>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(patterns: &[&str]) -> Self {
        Self {
            failing: patterns.iter().map(|p| (*p).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn seen(&self) -> Vec<SeenCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.seen().into_iter().map(|c| c.endpoint).collect()
    }
}

#[async_trait]
impl RemoteService for FakeRemote {
    async fn call(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, RemoteError> {
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| RemoteError::Network(e.to_string()))?;
            permit.forget();
        }
        self.calls.lock().expect("calls lock").push(SeenCall {
            method,
            endpoint: endpoint.to_string(),
            body: body.cloned(),
        });
        if self.failing.iter().any(|p| endpoint.contains(p.as_str())) {
            return Err(RemoteError::Network(format!("connection refused: {endpoint}")));
        }
        Ok(json!({ "ok": true }))
    }
}
