use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::{BridgeError, BridgeResult};

/// Deferred action executed once on the render thread against its state.
pub type WorkItem<S> = Box<dyn FnOnce(&mut S) -> BridgeResult<()> + Send + 'static>;

/// State owned by the render thread.
///
/// Built on the worker by the `init` closure given to [`RenderThread::start`] and
/// dropped on the worker when it exits, so nothing inside it ever crosses threads.
pub trait WorkerState: 'static {
    /// Called on the worker after an item reported [`BridgeError::ContextLost`].
    fn context_lost(&mut self, err: &BridgeError) {
        let _ = err;
    }
}

/// How the queue is treated when the executor stops.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StopMode {
    /// Run everything already queued, then exit.
    Drain,
    /// Drop pending items; only the in-flight item completes.
    Discard,
}

struct Queue<S> {
    items: VecDeque<WorkItem<S>>,
    accepting: bool,
}

struct Shared<S> {
    queue: Mutex<Queue<S>>,
    available: Condvar,
}

/// Cloneable, enqueue-only handle to a [`RenderThread`].
pub struct RenderHandle<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for RenderHandle<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S> fmt::Debug for RenderHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.shared.queue.lock();
        f.debug_struct("RenderHandle")
            .field("pending", &queue.items.len())
            .field("accepting", &queue.accepting)
            .finish()
    }
}

impl<S> RenderHandle<S> {
    /// Appends `item` to the queue. Never blocks on the worker.
    pub fn enqueue<F>(&self, item: F) -> BridgeResult<()>
    where
        F: FnOnce(&mut S) -> BridgeResult<()> + Send + 'static,
    {
        {
            let mut queue = self.shared.queue.lock();
            if !queue.accepting {
                return Err(BridgeError::ExecutorStopped);
            }
            queue.items.push_back(Box::new(item));
        }

        self.shared.available.notify_one();
        Ok(())
    }

    /// Number of items waiting to run.
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().items.len()
    }

    /// Blocks for up to `timeout` until the queue is non-empty or a stop was
    /// requested. Returns `true` if either happened.
    ///
    /// Meant for the worker itself, to pace work without holding up the queue.
    pub fn wait_for_work(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut queue = self.shared.queue.lock();
        loop {
            if !queue.items.is_empty() || !queue.accepting {
                return true;
            }
            if self.shared.available.wait_until(&mut queue, deadline).timed_out() {
                return !queue.items.is_empty() || !queue.accepting;
            }
        }
    }

    /// Stops accepting work without waiting for the worker.
    pub fn request_stop(&self, mode: StopMode) {
        let discarded = {
            let mut queue = self.shared.queue.lock();
            queue.accepting = false;
            match mode {
                StopMode::Drain => VecDeque::new(),
                StopMode::Discard => std::mem::take(&mut queue.items),
            }
        };

        if !discarded.is_empty() {
            log::debug!("discarding {} pending render work items", discarded.len());
        }
        // Dropped outside the lock: captured values may run arbitrary `Drop` code.
        drop(discarded);

        self.shared.available.notify_all();
    }
}

/// Owner of the render thread.
///
/// Items run strictly in arrival order, one at a time, to completion. A failing
/// or panicking item is logged and the queue keeps draining.
pub struct RenderThread<S> {
    handle: RenderHandle<S>,
    name: String,
    worker_id: ThreadId,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl<S> fmt::Debug for RenderThread<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderThread")
            .field("name", &self.name)
            .field("handle", &self.handle)
            .finish()
    }
}

impl<S: WorkerState> RenderThread<S> {
    /// Spawns the worker and builds its state there.
    pub fn start<F>(name: impl Into<String>, init: F) -> BridgeResult<Self>
    where
        F: FnOnce(RenderHandle<S>) -> S + Send + 'static,
    {
        let name = name.into();
        let handle = RenderHandle {
            shared: Arc::new(Shared {
                queue: Mutex::new(Queue {
                    items: VecDeque::new(),
                    accepting: true,
                }),
                available: Condvar::new(),
            }),
        };

        let worker_handle = handle.clone();
        let join = thread::Builder::new().name(name.clone()).spawn(move || {
            let shared = Arc::clone(&worker_handle.shared);
            let state = init(worker_handle);
            run_worker(&shared, state);
        })?;

        log::debug!("render thread '{name}' started");

        Ok(Self {
            handle,
            name,
            worker_id: join.thread().id(),
            join: Mutex::new(Some(join)),
        })
    }
}

impl<S> RenderThread<S> {
    pub fn handle(&self) -> RenderHandle<S> {
        self.handle.clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// See [`RenderHandle::enqueue`].
    pub fn enqueue<F>(&self, item: F) -> BridgeResult<()>
    where
        F: FnOnce(&mut S) -> BridgeResult<()> + Send + 'static,
    {
        self.handle.enqueue(item)
    }

    /// Returns `true` when called from the worker thread.
    pub fn is_render_thread(&self) -> bool {
        thread::current().id() == self.worker_id
    }

    /// See [`RenderHandle::request_stop`].
    pub fn request_stop(&self, mode: StopMode) {
        self.handle.request_stop(mode);
    }

    /// Stops accepting work and waits for the worker to exit.
    ///
    /// Must not be called from the worker itself.
    pub fn stop(&self, mode: StopMode) -> BridgeResult<()> {
        if self.is_render_thread() {
            return Err(BridgeError::StopFromRenderThread);
        }

        self.handle.request_stop(mode);

        if let Some(join) = self.join.lock().take() {
            if join.join().is_err() {
                log::error!("render thread '{}' terminated abnormally", self.name);
            } else {
                log::debug!("render thread '{}' stopped", self.name);
            }
        }

        Ok(())
    }
}

impl<S> Drop for RenderThread<S> {
    fn drop(&mut self) {
        if self.is_render_thread() {
            self.handle.request_stop(StopMode::Drain);
            return;
        }
        let _ = self.stop(StopMode::Drain);
    }
}

fn run_worker<S: WorkerState>(shared: &Shared<S>, mut state: S) {
    loop {
        let item = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(item) = queue.items.pop_front() {
                    break item;
                }
                if !queue.accepting {
                    return;
                }
                shared.available.wait(&mut queue);
            }
        };

        match panic::catch_unwind(AssertUnwindSafe(|| item(&mut state))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) if err.is_context_lost() => {
                log::error!("{err}");
                if let Err(payload) =
                    panic::catch_unwind(AssertUnwindSafe(|| state.context_lost(&err)))
                {
                    log::error!(
                        "context loss handler panicked: {}",
                        panic_message(payload.as_ref())
                    );
                }
            }
            Ok(Err(err)) => log::warn!("{err}"),
            Err(payload) => {
                log::error!("work item panicked: {}", panic_message(payload.as_ref()));
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
