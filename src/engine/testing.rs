use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::Engine;
use crate::db::{InMemoryDriverPool, InMemoryRideStore};
use crate::entities::{Coordinates, Driver, Vehicle};
use crate::error::{upstream_error, Error};
use crate::external::CompletionService;

#[derive(Clone)]
pub enum Reply {
    Answer(String),
    Empty,
    Unavailable,
}

pub struct StubCompletions {
    reply: Reply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubCompletions {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionService for StubCompletions {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<Option<String>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        // let concurrent bookings interleave the way a network call would
        tokio::task::yield_now().await;

        match &self.reply {
            Reply::Answer(text) => Ok(Some(text.clone())),
            Reply::Empty => Ok(None),
            Reply::Unavailable => Err(upstream_error()),
        }
    }
}

pub fn engine_with(drivers: Vec<Driver>, reply: Reply) -> (Engine, Arc<StubCompletions>) {
    let completions = Arc::new(StubCompletions {
        reply,
        calls: AtomicUsize::new(0),
        prompts: Mutex::new(Vec::new()),
    });

    let engine = Engine::new(
        Arc::new(InMemoryDriverPool::new(drivers)),
        Arc::new(InMemoryRideStore::new()),
        completions.clone(),
    )
    .unwrap();

    (engine, completions)
}

pub fn fleet(size: usize) -> Vec<Driver> {
    (0..size)
        .map(|i| {
            Driver::new(
                format!("driver-{}", i),
                format!("Driver {}", i),
                4.5,
                Vehicle::new("sedan", "Toyota Prius", &format!("PLT-{}", i), "White"),
                Coordinates { lat: 0.0, lng: 0.0 },
            )
        })
        .collect()
}
