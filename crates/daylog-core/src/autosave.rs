//! Debounced, single-flight autosave controller.
//!
//! Sits between an editing surface and the [`Store`]. Edits call
//! [`Autosave::mark_dirty`], which arms (or re-arms) a debounce timer; when
//! the timer fires, the controller runs one collect-and-persist cycle. At
//! most one save is ever in flight; edits that land during an in-flight
//! save coalesce into exactly one follow-up cycle, so the latest field
//! values are never silently dropped.
//!
//! The controller is an explicit state machine. [`transition`] is the pure
//! part; the async methods drive it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::{debug, warn};

use crate::error::Result;
use crate::record::{DailyLog, LogDraft};
use crate::storage::Store;

/// Store handle shared between the controller and its owner.
pub type SharedStore = Arc<AsyncMutex<Store>>;

/// Default debounce between the last edit and the save it triggers.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(600);

/// The editing surface the controller collects from.
///
/// Implemented by the UI collaborator; the controller never inspects form
/// state directly. Values in the snapshot are already validated at the
/// surface (blank numerics arrive absent, not zero).
pub trait DraftSource: Send + Sync + 'static {
    /// The date currently being edited.
    fn active_date(&self) -> String;
    /// The current field values.
    fn snapshot(&self) -> LogDraft;
}

/// Controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    /// Nothing pending, nothing in flight.
    Idle,
    /// The debounce timer is armed.
    Scheduled,
    /// A save cycle is in flight.
    Saving,
    /// A save cycle is in flight and edits arrived behind it.
    SavingWithPendingRetry,
}

/// Events the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveEvent {
    Dirty,
    TimerFired,
    SaveCompleted,
}

/// What the driver must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    ArmTimer,
    BeginSave,
}

/// The pure transition function of the autosave state machine.
pub(crate) fn transition(state: SaveState, event: SaveEvent) -> (SaveState, Action) {
    use SaveEvent::*;
    use SaveState::*;
    match (state, event) {
        // A new edit always (re-)arms the debounce timer.
        (Idle, Dirty) | (Scheduled, Dirty) => (Scheduled, Action::ArmTimer),
        (Saving, Dirty) => (Saving, Action::ArmTimer),
        (SavingWithPendingRetry, Dirty) => (SavingWithPendingRetry, Action::ArmTimer),

        (Scheduled, TimerFired) => (Saving, Action::BeginSave),
        // A timer can legitimately fire from Idle: the edit that armed it
        // was followed by a save that completed first (an explicit flush,
        // or a cycle that started before the edit). The edit still gets
        // its save. Timers superseded by a later re-arm never reach the
        // state machine at all.
        (Idle, TimerFired) => (Saving, Action::BeginSave),
        // A timer landing mid-save coalesces into one pending retry.
        (Saving, TimerFired) => (SavingWithPendingRetry, Action::None),
        (SavingWithPendingRetry, TimerFired) => (SavingWithPendingRetry, Action::None),

        (Saving, SaveCompleted) => (Idle, Action::None),
        // Edits arrived behind the save: run once more, immediately.
        (SavingWithPendingRetry, SaveCompleted) => (Saving, Action::BeginSave),
        (Idle, SaveCompleted) | (Scheduled, SaveCompleted) => (state, Action::None),
    }
}

/// Save status broadcast to the editing surface for acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
}

/// Debounced single-flight autosave over a shared [`Store`].
#[derive(Clone)]
pub struct Autosave {
    store: SharedStore,
    source: Arc<dyn DraftSource>,
    state: Arc<Mutex<SaveState>>,
    hydrating: Arc<AtomicBool>,
    epoch: Arc<AtomicU64>,
    debounce: Duration,
    status_tx: watch::Sender<SaveStatus>,
}

impl Autosave {
    pub fn new(store: SharedStore, source: Arc<dyn DraftSource>, debounce: Duration) -> Self {
        let (status_tx, _) = watch::channel(SaveStatus::Idle);
        Autosave {
            store,
            source,
            state: Arc::new(Mutex::new(SaveState::Idle)),
            hydrating: Arc::new(AtomicBool::new(false)),
            epoch: Arc::new(AtomicU64::new(0)),
            debounce,
            status_tx,
        }
    }

    /// Subscribe to save acknowledgements.
    pub fn status(&self) -> watch::Receiver<SaveStatus> {
        self.status_tx.subscribe()
    }

    pub fn state(&self) -> SaveState {
        *self.lock_state()
    }

    /// Mark the start of populating the surface from storage. Edits fired
    /// by the population itself must not look like user edits.
    pub fn begin_hydration(&self) {
        self.hydrating.store(true, Ordering::SeqCst);
    }

    /// Mark the end of hydration; subsequent edits are user edits again.
    pub fn end_hydration(&self) {
        self.hydrating.store(false, Ordering::SeqCst);
    }

    /// Record an edit: arm or re-arm the debounce timer.
    pub fn mark_dirty(&self) {
        if self.hydrating.load(Ordering::SeqCst) {
            return;
        }
        self.apply(SaveEvent::Dirty);
        // Re-arming invalidates any earlier timer: only the task holding
        // the latest token is allowed to fire.
        let token = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(this.debounce).await;
            if this.epoch.load(Ordering::SeqCst) != token {
                return;
            }
            this.timer_fired().await;
        });
    }

    /// Run a save cycle right now, bypassing the debounce (explicit save
    /// button). Coalesces with an in-flight cycle like a timer expiry.
    pub async fn flush(&self) {
        self.timer_fired().await;
    }

    async fn timer_fired(&self) {
        if self.hydrating.load(Ordering::SeqCst) {
            // Population in progress; drop the trigger entirely.
            *self.lock_state() = SaveState::Idle;
            return;
        }
        if self.apply(SaveEvent::TimerFired) == Action::BeginSave {
            self.save_loop().await;
        }
    }

    async fn save_loop(&self) {
        loop {
            let _ = self.status_tx.send(SaveStatus::Saving);
            match self.save_cycle().await {
                Ok(true) => {
                    let _ = self.status_tx.send(SaveStatus::Saved);
                }
                Ok(false) => {
                    let _ = self.status_tx.send(SaveStatus::Idle);
                }
                Err(err) => {
                    // Not fatal: the dirty state stays unresolved and a
                    // later edit or explicit save retries.
                    warn!(error = %err, "autosave failed");
                    let _ = self.status_tx.send(SaveStatus::Idle);
                }
            }
            if self.apply(SaveEvent::SaveCompleted) != Action::BeginSave {
                break;
            }
            debug!("edits arrived during save, running one follow-up cycle");
        }
    }

    /// One collect-and-persist cycle. Returns whether a write happened.
    async fn save_cycle(&self) -> Result<bool> {
        let date = self.source.active_date();
        let draft = self.source.snapshot();

        let mut store = self.store.lock().await;
        let existing = store.get(&date).await?;
        let is_new = existing.is_none();
        let merged = draft.apply(existing.unwrap_or_else(|| DailyLog::empty(&date)));

        // Opening the app on a new date must not create a junk row.
        if is_new && merged.is_empty() {
            return Ok(false);
        }

        store.put(&merged).await?;
        Ok(true)
    }

    fn apply(&self, event: SaveEvent) -> Action {
        let mut state = self.lock_state();
        let (next, action) = transition(*state, event);
        *state = next;
        action
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SaveState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Action::*;
    use SaveEvent::*;
    use SaveState::*;

    #[test]
    fn dirty_always_arms_the_timer() {
        assert_eq!(transition(Idle, Dirty), (Scheduled, ArmTimer));
        assert_eq!(transition(Scheduled, Dirty), (Scheduled, ArmTimer));
        assert_eq!(transition(Saving, Dirty), (Saving, ArmTimer));
        assert_eq!(
            transition(SavingWithPendingRetry, Dirty),
            (SavingWithPendingRetry, ArmTimer)
        );
    }

    #[test]
    fn timer_begins_a_save_unless_one_is_in_flight() {
        assert_eq!(transition(Scheduled, TimerFired), (Saving, BeginSave));
        assert_eq!(transition(Idle, TimerFired), (Saving, BeginSave));
        assert_eq!(transition(Saving, TimerFired), (SavingWithPendingRetry, None));
        assert_eq!(
            transition(SavingWithPendingRetry, TimerFired),
            (SavingWithPendingRetry, None)
        );
    }

    #[test]
    fn completion_retriggers_exactly_when_a_retry_is_pending() {
        assert_eq!(transition(Saving, SaveCompleted), (Idle, None));
        assert_eq!(
            transition(SavingWithPendingRetry, SaveCompleted),
            (Saving, BeginSave)
        );
    }

    #[test]
    fn pending_retry_does_not_stack() {
        // However many timers land mid-save, completion yields exactly one
        // follow-up cycle.
        let (state, _) = transition(Saving, TimerFired);
        let (state, _) = transition(state, TimerFired);
        let (state, _) = transition(state, TimerFired);
        assert_eq!(state, SavingWithPendingRetry);
        let (state, action) = transition(state, SaveCompleted);
        assert_eq!((state, action), (Saving, BeginSave));
        let (state, action) = transition(state, SaveCompleted);
        assert_eq!((state, action), (Idle, None));
    }
}
