// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted event source.
//!
//! Each call to `watch` consumes the next script entry: either a connection
//! failure or a stream. Streams are fed through a [`StreamHandle`]; dropping
//! the handle ends the stream. Once the script is exhausted, `watch` returns
//! a stream that syncs immediately and never yields.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};

use accessbot_core::error::WatchError;
use accessbot_core::traits::{EventSource, EventStream};
use accessbot_core::types::{Event, WatchFilter};

use crate::lock;

/// How a scripted stream answers `wait_init`.
#[derive(Debug)]
pub enum InitBehavior {
    /// Syncs immediately.
    Ready,
    /// Never syncs.
    Hang,
    /// Fails with the given error.
    Fail(WatchError),
}

enum Script {
    Fail(WatchError),
    Stream {
        init: InitBehavior,
        events: mpsc::UnboundedReceiver<Result<Event, WatchError>>,
    },
}

/// Feeds a scripted stream.
#[derive(Clone)]
pub struct StreamHandle {
    tx: mpsc::UnboundedSender<Result<Event, WatchError>>,
}

impl StreamHandle {
    /// Queues an event.
    pub fn send(&self, event: Event) {
        let _ = self.tx.send(Ok(event));
    }

    /// Queues a stream error.
    pub fn fail(&self, err: WatchError) {
        let _ = self.tx.send(Err(err));
    }
}

#[derive(Default)]
struct Shared {
    scripts: Mutex<VecDeque<Script>>,
    filters: Mutex<Vec<WatchFilter>>,
    idle: Mutex<Vec<mpsc::UnboundedSender<Result<Event, WatchError>>>>,
    connects: AtomicUsize,
    closes: AtomicUsize,
    connected: Notify,
}

/// An [`EventSource`] driven entirely by the test.
#[derive(Clone, Default)]
pub struct ScriptedEventSource {
    shared: Arc<Shared>,
}

impl ScriptedEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `watch` call fails with `err`.
    pub fn push_failure(&self, err: WatchError) {
        lock(&self.shared.scripts).push_back(Script::Fail(err));
    }

    /// The next `watch` call returns a stream that syncs immediately.
    pub fn push_stream(&self) -> StreamHandle {
        self.push_stream_with_init(InitBehavior::Ready)
    }

    /// The next `watch` call returns a stream with the given init behaviour.
    pub fn push_stream_with_init(&self, init: InitBehavior) -> StreamHandle {
        let (tx, events) = mpsc::unbounded_channel();
        lock(&self.shared.scripts).push_back(Script::Stream { init, events });
        StreamHandle { tx }
    }

    /// Number of `watch` calls so far.
    pub fn connect_count(&self) -> usize {
        self.shared.connects.load(Ordering::SeqCst)
    }

    /// Number of streams closed by the consumer.
    pub fn close_count(&self) -> usize {
        self.shared.closes.load(Ordering::SeqCst)
    }

    /// Filters passed to every `watch` call, in order.
    pub fn filters(&self) -> Vec<WatchFilter> {
        lock(&self.shared.filters).clone()
    }

    /// Waits until `watch` has been called at least `count` times.
    pub async fn wait_for_connects(&self, count: usize) {
        loop {
            let notified = self.shared.connected.notified();
            if self.connect_count() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl EventSource for ScriptedEventSource {
    async fn watch(&self, filter: &WatchFilter) -> Result<Box<dyn EventStream>, WatchError> {
        lock(&self.shared.filters).push(filter.clone());
        let script = lock(&self.shared.scripts).pop_front();
        self.shared.connects.fetch_add(1, Ordering::SeqCst);
        self.shared.connected.notify_waiters();

        let (init, events) = match script {
            Some(Script::Fail(err)) => return Err(err),
            Some(Script::Stream { init, events }) => (init, events),
            None => {
                let (tx, events) = mpsc::unbounded_channel();
                lock(&self.shared.idle).push(tx);
                (InitBehavior::Ready, events)
            }
        };

        Ok(Box::new(ScriptedStream {
            init: Some(init),
            events,
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct ScriptedStream {
    init: Option<InitBehavior>,
    events: mpsc::UnboundedReceiver<Result<Event, WatchError>>,
    shared: Arc<Shared>,
}

#[async_trait]
impl EventStream for ScriptedStream {
    async fn wait_init(&mut self) -> Result<(), WatchError> {
        match self.init.take() {
            Some(InitBehavior::Ready) | None => Ok(()),
            Some(InitBehavior::Hang) => std::future::pending().await,
            Some(InitBehavior::Fail(err)) => Err(err),
        }
    }

    async fn next_event(&mut self) -> Result<Event, WatchError> {
        match self.events.recv().await {
            Some(item) => item,
            None => Err(WatchError::Closed),
        }
    }

    async fn close(&mut self) {
        self.events.close();
        self.shared.closes.fetch_add(1, Ordering::SeqCst);
    }
}
