//! Composite progress notifier — delegates to multiple notifiers.
//!
//! Used to fan events out to the console reporter and the JSONL event log
//! at the same time.

use super::progress::{ProgressNotifier, WorkflowEvent};

/// A progress notifier that delegates to multiple inner notifiers.
///
/// Uses borrowed references so both owned and borrowed notifiers can be
/// composed without wrapper types.
pub struct CompositeProgressNotifier<'a> {
    delegates: Vec<&'a dyn ProgressNotifier>,
}

impl<'a> CompositeProgressNotifier<'a> {
    pub fn new(delegates: Vec<&'a dyn ProgressNotifier>) -> Self {
        Self { delegates }
    }
}

impl ProgressNotifier for CompositeProgressNotifier<'_> {
    fn on_event(&self, event: &WorkflowEvent) {
        for delegate in &self.delegates {
            delegate.on_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        names: Mutex<Vec<&'static str>>,
    }

    impl ProgressNotifier for Recorder {
        fn on_event(&self, event: &WorkflowEvent) {
            self.names.lock().unwrap().push(event.name());
        }
    }

    #[test]
    fn test_delegates_to_all() {
        let a = Recorder::default();
        let b = Recorder::default();
        let composite = CompositeProgressNotifier::new(vec![&a, &b]);
        composite.on_event(&WorkflowEvent::PhaseStarted {
            phase: "ux".to_string(),
            agent_count: 1,
        });
        assert_eq!(*a.names.lock().unwrap(), vec!["phase-started"]);
        assert_eq!(*b.names.lock().unwrap(), vec!["phase-started"]);
    }
}
