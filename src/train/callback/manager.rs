//! Callback manager for dispatching events to multiple callbacks

use std::path::Path;

use super::traits::{CallbackContext, TrainerCallback};
use crate::train::trainer::{EvalResult, TrainerState};

/// Manages multiple callbacks and dispatches events in registration order
#[derive(Default)]
pub struct CallbackManager {
    callbacks: Vec<Box<dyn TrainerCallback>>,
}

impl CallbackManager {
    /// Create new callback manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a callback
    pub fn add<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    /// Check if no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Get number of callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Names of the registered callbacks
    pub fn names(&self) -> Vec<&'static str> {
        self.callbacks.iter().map(|cb| cb.name()).collect()
    }

    pub fn on_train_begin(&mut self, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_train_begin(ctx);
        }
    }

    pub fn on_state_change(&mut self, from: TrainerState, to: TrainerState, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_state_change(from, to, ctx);
        }
    }

    pub fn on_step_end(&mut self, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_step_end(ctx);
        }
    }

    pub fn on_checkpoint(&mut self, path: &Path, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_checkpoint(path, ctx);
        }
    }

    pub fn on_evaluation_end(&mut self, result: &EvalResult, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_evaluation_end(result, ctx);
        }
    }

    pub fn on_train_end(&mut self, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_train_end(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::callback::ProgressCallback;
    use std::sync::{Arc, Mutex};

    struct Recorder {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl TrainerCallback for Recorder {
        fn on_step_end(&mut self, ctx: &CallbackContext) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.tag, ctx.iteration));
        }

        fn on_train_end(&mut self, _ctx: &CallbackContext) {
            self.log.lock().unwrap().push(format!("{}:end", self.tag));
        }

        fn name(&self) -> &'static str {
            "Recorder"
        }
    }

    #[test]
    fn test_callback_manager_len_and_empty() {
        let mut manager = CallbackManager::new();
        assert!(manager.is_empty());
        assert_eq!(manager.len(), 0);

        manager.add(ProgressCallback::new(10));
        assert!(!manager.is_empty());
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.names(), vec!["ProgressCallback"]);
    }

    #[test]
    fn test_callback_manager_dispatch_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut manager = CallbackManager::new();
        manager.add(Recorder {
            tag: "a",
            log: log.clone(),
        });
        manager.add(Recorder {
            tag: "b",
            log: log.clone(),
        });

        let ctx = CallbackContext {
            iteration: 3,
            ..Default::default()
        };
        manager.on_step_end(&ctx);
        manager.on_train_end(&ctx);

        assert_eq!(*log.lock().unwrap(), vec!["a:3", "b:3", "a:end", "b:end"]);
    }
}
