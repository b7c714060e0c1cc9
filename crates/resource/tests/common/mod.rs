#![allow(dead_code)]

use reclaim_resource::Releasable;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Counts every call the wrapper makes into a resource
#[derive(Default)]
pub struct Calls {
    pub closes: AtomicUsize,
    pub disposes: AtomicUsize,
}

impl Calls {
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn disposes(&self) -> usize {
        self.disposes.load(Ordering::SeqCst)
    }
}

/// In-memory resource that records writes and release calls
pub struct MemoryResource {
    pub calls: Arc<Calls>,
    pub sink: Arc<Mutex<Vec<u8>>>,
}

impl MemoryResource {
    pub fn new(calls: &Arc<Calls>) -> Self {
        Self {
            calls: Arc::clone(calls),
            sink: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.sink.lock().unwrap().extend_from_slice(bytes);
    }
}

impl Releasable for MemoryResource {
    fn close(&mut self) -> io::Result<()> {
        self.calls.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn dispose_owned(&mut self) -> io::Result<()> {
        self.calls.disposes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn label(&self) -> String {
        "memory resource".to_string()
    }
}
