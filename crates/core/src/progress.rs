use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const FILL_MESSAGE: &str = "filling density grid";

#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    Start {
        total: usize,
    },
    Advance {
        current: usize,
        total: usize,
        message: &'static str,
    },
    Finish {
        total: usize,
    },
}

impl ProgressEvent {
    pub fn fraction(&self) -> f32 {
        match self {
            Self::Start { .. } => 0.0,
            Self::Advance { current, total, .. } => {
                if *total == 0 {
                    1.0
                } else {
                    (*current as f32 / *total as f32).clamp(0.0, 1.0)
                }
            }
            Self::Finish { .. } => 1.0,
        }
    }
}

/// One-way progress channel polled between slices.
pub trait ProgressSink {
    fn report(&self, event: ProgressEvent);

    fn should_stop(&self) -> bool {
        false
    }
}

impl ProgressSink for () {
    fn report(&self, _event: ProgressEvent) {}
}

impl<S: ProgressSink + ?Sized> ProgressSink for &S {
    fn report(&self, event: ProgressEvent) {
        (**self).report(event);
    }

    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }
}

pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Callback plus cancellation flag, cloneable across threads.
#[derive(Clone, Default)]
pub struct TaskContext {
    callback: Option<ProgressCallback>,
    cancel: Option<CancelToken>,
}

impl TaskContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(mut self, callback: impl Fn(ProgressEvent) + Send + Sync + 'static) -> Self {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("callback", &self.callback.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl ProgressSink for TaskContext {
    fn report(&self, event: ProgressEvent) {
        if let Some(callback) = self.callback.as_ref() {
            (callback)(event);
        }
    }

    fn should_stop(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
