//! Dispatcher that records what it was asked to invalidate

use cache_invalidation::{InvalidationDispatcher, Namespace};
use std::sync::Mutex;

#[derive(Default)]
pub struct RecordingDispatcher {
    dispatched: Mutex<Vec<(&'static str, Vec<Namespace>)>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatched(&self) -> Vec<(&'static str, Vec<Namespace>)> {
        self.dispatched.lock().unwrap().clone()
    }

    pub fn origins(&self) -> Vec<&'static str> {
        self.dispatched().into_iter().map(|(op, _)| op).collect()
    }

    pub fn count(&self) -> usize {
        self.dispatched.lock().unwrap().len()
    }
}

impl InvalidationDispatcher for RecordingDispatcher {
    fn dispatch(&self, origin: &'static str, namespaces: &[Namespace]) {
        self.dispatched
            .lock()
            .unwrap()
            .push((origin, namespaces.to_vec()));
    }
}
