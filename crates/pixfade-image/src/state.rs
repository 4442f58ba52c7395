//! Load state machine
//!
//! One machine per rendered image:
//!
//! ```text
//! Idle ──eager / visible──▶ Requested ──Loaded──▶ Loaded
//!                                     └─Errored─▶ Errored
//! ```
//!
//! Completion of the image fetch arrives as a [`LoadOutcome`] through a
//! single-slot inbox. The host reports it with a [`LoadHandle`]; the
//! machine only drains the inbox while `Requested`, so an outcome can
//! never jump over the request. After [`LoadMachine::unmount`] the inbox
//! is closed and late outcomes are discarded. Once [`LoadMachine::settle`]
//! has started, the inbox also closes when the last handle is dropped.

use serde::{Deserialize, Serialize};
use smol::channel::{self, Receiver, Sender, TrySendError, WeakSender};

/// Fetch policy for the main image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    Eager,
    #[default]
    Lazy,
}

impl LoadPolicy {
    /// Value of the `loading` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadPolicy::Eager => "eager",
            LoadPolicy::Lazy => "lazy",
        }
    }

    /// Read back a `loading` attribute; anything but `eager` is lazy
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("eager") => LoadPolicy::Eager,
            _ => LoadPolicy::Lazy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadState {
    /// Not requested; request attributes are withheld
    Idle,
    Requested,
    Loaded,
    Errored,
}

impl LoadState {
    /// State a freshly mounted image starts in
    pub fn initial(policy: LoadPolicy) -> Self {
        match policy {
            LoadPolicy::Eager => LoadState::Requested,
            LoadPolicy::Lazy => LoadState::Idle,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Loaded | LoadState::Errored)
    }

    /// Request in flight
    #[inline]
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Requested)
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded)
    }
}

/// Resolution of the main image fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOutcome {
    Loaded,
    Errored,
}

impl From<LoadOutcome> for LoadState {
    fn from(outcome: LoadOutcome) -> Self {
        match outcome {
            LoadOutcome::Loaded => LoadState::Loaded,
            LoadOutcome::Errored => LoadState::Errored,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: LoadState,
    pub to: LoadState,
}

/// Host side of the inbox
#[derive(Debug, Clone)]
pub struct LoadHandle {
    /// `None` when handed out after the inbox had closed
    tx: Option<Sender<LoadOutcome>>,
}

impl LoadHandle {
    /// Report the fetch result. Returns `false` when it was discarded:
    /// the image is unmounted, the inbox closed, or an outcome is
    /// already waiting.
    pub fn complete(&self, outcome: LoadOutcome) -> bool {
        let Some(tx) = &self.tx else {
            tracing::debug!(?outcome, "Inbox closed, discarding outcome");
            return false;
        };
        match tx.try_send(outcome) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                tracing::debug!(?dropped, "Inbox already holds an outcome, dropping");
                false
            }
            Err(TrySendError::Closed(dropped)) => {
                tracing::debug!(?dropped, "Image unmounted, discarding outcome");
                false
            }
        }
    }

    /// No outcome can be delivered through this handle any more
    pub fn is_closed(&self) -> bool {
        self.tx.as_ref().is_none_or(Sender::is_closed)
    }
}

/// Per-image load state machine
#[derive(Debug)]
pub struct LoadMachine {
    state: LoadState,
    policy: LoadPolicy,
    is_visible: bool,
    mounted: bool,
    /// Dropped when `settle` starts so the inbox can close
    tx: Option<Sender<LoadOutcome>>,
    weak_tx: WeakSender<LoadOutcome>,
    rx: Receiver<LoadOutcome>,
}

impl LoadMachine {
    /// Mount a machine. Eager images start `Requested`.
    pub fn new(policy: LoadPolicy) -> Self {
        let (tx, rx) = channel::bounded(1);
        let weak_tx = tx.downgrade();
        let state = LoadState::initial(policy);
        tracing::debug!(policy = policy.as_str(), ?state, "Load machine mounted");
        Self {
            state,
            policy,
            is_visible: false,
            mounted: true,
            tx: Some(tx),
            weak_tx,
            rx,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Handle through which the host reports the fetch result
    ///
    /// After `settle` has started, handles are only available while
    /// another one is still alive.
    pub fn handle(&self) -> LoadHandle {
        LoadHandle {
            tx: self.tx.clone().or_else(|| self.weak_tx.upgrade()),
        }
    }

    /// Whether a visibility signal could still change anything
    pub fn wants_visibility(&self) -> bool {
        self.mounted && self.state == LoadState::Idle
    }

    /// Start the request regardless of visibility
    pub fn request(&mut self) -> Option<Transition> {
        if !self.mounted || self.state != LoadState::Idle {
            return None;
        }
        self.transition(LoadState::Requested)
    }

    /// Feed the visibility signal
    pub fn set_visible(&mut self, visible: bool) -> Option<Transition> {
        if !self.mounted {
            return None;
        }
        self.is_visible = visible;
        if visible && self.state == LoadState::Idle {
            return self.transition(LoadState::Requested);
        }
        None
    }

    /// Apply a waiting outcome, if any
    pub fn pump(&mut self) -> Option<Transition> {
        if !self.mounted || self.state != LoadState::Requested {
            return None;
        }
        let outcome = self.rx.try_recv().ok()?;
        self.transition(outcome.into())
    }

    /// Wait for the outcome of an in-flight request
    ///
    /// Returns `None` immediately unless `Requested`, and `None` once every
    /// handle is dropped without reporting.
    pub async fn settle(&mut self) -> Option<Transition> {
        if !self.mounted || self.state != LoadState::Requested {
            return None;
        }
        self.tx = None;
        let outcome = self.rx.recv().await.ok()?;
        self.transition(outcome.into())
    }

    /// Tear down. Later outcomes are discarded.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.rx.close();
        tracing::debug!(state = ?self.state, "Load machine unmounted");
    }

    fn transition(&mut self, to: LoadState) -> Option<Transition> {
        let from = self.state;
        if from.is_terminal() || from == to {
            return None;
        }
        self.state = to;
        tracing::debug!(?from, ?to, "Load state transition");
        Some(Transition { from, to })
    }
}

impl Drop for LoadMachine {
    fn drop(&mut self) {
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eager_starts_requested() {
        let machine = LoadMachine::new(LoadPolicy::Eager);
        assert_eq!(machine.state(), LoadState::Requested);
        assert!(machine.is_loading());
        assert!(!machine.wants_visibility());
    }

    #[test]
    fn test_lazy_waits_for_visibility() {
        let mut machine = LoadMachine::new(LoadPolicy::Lazy);
        assert_eq!(machine.state(), LoadState::Idle);
        assert!(machine.wants_visibility());

        assert_eq!(machine.set_visible(false), None);
        assert_eq!(
            machine.set_visible(true),
            Some(Transition {
                from: LoadState::Idle,
                to: LoadState::Requested
            })
        );
        assert!(machine.is_visible());
        assert!(!machine.wants_visibility());
        assert_eq!(machine.set_visible(true), None);
    }

    #[test]
    fn test_load_success() {
        let mut machine = LoadMachine::new(LoadPolicy::Eager);
        assert!(machine.handle().complete(LoadOutcome::Loaded));
        let t = machine.pump().unwrap();
        assert_eq!(t.to, LoadState::Loaded);
        assert!(machine.is_loaded());
    }

    #[test]
    fn test_load_failure_is_terminal() {
        let mut machine = LoadMachine::new(LoadPolicy::Eager);
        let handle = machine.handle();
        handle.complete(LoadOutcome::Errored);
        assert_eq!(machine.pump().map(|t| t.to), Some(LoadState::Errored));

        assert!(handle.complete(LoadOutcome::Loaded));
        assert_eq!(machine.pump(), None);
        assert_eq!(machine.set_visible(true), None);
        assert_eq!(machine.state(), LoadState::Errored);
    }

    #[test]
    fn test_outcome_waits_while_idle() {
        let mut machine = LoadMachine::new(LoadPolicy::Lazy);
        machine.handle().complete(LoadOutcome::Loaded);

        // Never skip Requested
        assert_eq!(machine.pump(), None);
        assert_eq!(machine.state(), LoadState::Idle);

        machine.set_visible(true);
        assert_eq!(machine.state(), LoadState::Requested);
        assert_eq!(machine.pump().map(|t| t.to), Some(LoadState::Loaded));
    }

    #[test]
    fn test_single_slot_inbox() {
        let machine = LoadMachine::new(LoadPolicy::Eager);
        let handle = machine.handle();
        assert!(handle.complete(LoadOutcome::Loaded));
        assert!(!handle.complete(LoadOutcome::Errored));
    }

    #[test]
    fn test_unmount_discards_late_outcome() {
        let mut machine = LoadMachine::new(LoadPolicy::Eager);
        let handle = machine.handle();
        machine.unmount();

        assert!(handle.is_closed());
        assert!(!handle.complete(LoadOutcome::Loaded));
        assert_eq!(machine.pump(), None);
        assert_eq!(machine.state(), LoadState::Requested);
        assert!(!machine.wants_visibility());
    }

    #[test]
    fn test_request_skips_visibility() {
        let mut machine = LoadMachine::new(LoadPolicy::Lazy);
        assert_eq!(machine.request().map(|t| t.to), Some(LoadState::Requested));
        assert_eq!(machine.request(), None);
    }

    #[test]
    fn test_settle_waits_for_outcome() {
        let mut machine = LoadMachine::new(LoadPolicy::Eager);
        let handle = machine.handle();

        let transition = smol::block_on(async {
            smol::spawn(async move {
                handle.complete(LoadOutcome::Loaded);
            })
            .detach();
            machine.settle().await
        });

        assert_eq!(transition.map(|t| t.to), Some(LoadState::Loaded));
    }

    #[test]
    fn test_settle_without_handles_resolves() {
        let mut machine = LoadMachine::new(LoadPolicy::Eager);
        assert_eq!(smol::block_on(machine.settle()), None);
        assert_eq!(machine.state(), LoadState::Requested);

        // Nobody is left to report
        let late = machine.handle();
        assert!(late.is_closed());
        assert!(!late.complete(LoadOutcome::Loaded));
    }

    #[test]
    fn test_settle_resolves_when_handle_dropped() {
        let mut machine = LoadMachine::new(LoadPolicy::Eager);
        let handle = machine.handle();

        let transition = smol::block_on(async {
            smol::spawn(async move {
                smol::Timer::after(std::time::Duration::from_millis(10)).await;
                drop(handle);
            })
            .detach();
            machine.settle().await
        });

        assert_eq!(transition, None);
        assert_eq!(machine.state(), LoadState::Requested);
    }

    #[test]
    fn test_handles_share_inbox_after_settle_started() {
        let mut machine = LoadMachine::new(LoadPolicy::Eager);
        let first = machine.handle();
        let second = machine.handle();

        let transition = smol::block_on(async {
            smol::spawn(async move {
                drop(first);
                second.complete(LoadOutcome::Loaded);
            })
            .detach();
            machine.settle().await
        });

        assert_eq!(transition.map(|t| t.to), Some(LoadState::Loaded));
    }

    #[test]
    fn test_policy_from_attr() {
        assert_eq!(LoadPolicy::from_attr(Some("eager")), LoadPolicy::Eager);
        assert_eq!(LoadPolicy::from_attr(Some("EAGER")), LoadPolicy::Eager);
        assert_eq!(LoadPolicy::from_attr(Some("lazy")), LoadPolicy::Lazy);
        assert_eq!(LoadPolicy::from_attr(None), LoadPolicy::Lazy);
    }
}
