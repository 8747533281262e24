use std::sync::{Arc, Mutex};
use std::time::Duration;

use daylog_core::autosave::{Autosave, DraftSource, SaveState, SharedStore};
use daylog_core::record::LogDraft;
use daylog_core::storage::{Store, StoreConfig};
use tempfile::tempdir;
use tokio::sync::Mutex as AsyncMutex;

const DEBOUNCE: Duration = Duration::from_millis(600);

/// Stand-in for the editing surface: a date and a mutable draft.
struct TestForm {
    date: Mutex<String>,
    draft: Mutex<LogDraft>,
}

impl TestForm {
    fn new(date: &str) -> Arc<Self> {
        Arc::new(TestForm {
            date: Mutex::new(date.to_string()),
            draft: Mutex::new(LogDraft::default()),
        })
    }

    fn set_weight(&self, value: Option<f64>) {
        let mut draft = self.draft.lock().expect("draft lock");
        match value {
            Some(v) => draft.measurements.insert("weight".to_string(), v),
            None => draft.measurements.remove("weight"),
        };
    }

    fn set_supplement(&self, id: &str, taken: bool) {
        self.draft.lock().expect("draft lock").supplements.insert(id.to_string(), taken);
    }
}

impl DraftSource for TestForm {
    fn active_date(&self) -> String {
        self.date.lock().expect("date lock").clone()
    }

    fn snapshot(&self) -> LogDraft {
        self.draft.lock().expect("draft lock").clone()
    }
}

async fn open_shared(dir: &std::path::Path) -> SharedStore {
    let store = Store::open(StoreConfig::new(dir)).await.expect("store should open");
    Arc::new(AsyncMutex::new(store))
}

async fn wait_until_idle(autosave: &Autosave) {
    for _ in 0..1000 {
        if autosave.state() == SaveState::Idle {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("autosave never returned to idle");
}

#[tokio::test(start_paused = true)]
async fn test_debounced_edit_is_persisted() {
    let dir = tempdir().expect("tempdir");
    let store = open_shared(dir.path()).await;
    let form = TestForm::new("2024-03-05");
    let autosave = Autosave::new(store.clone(), form.clone(), DEBOUNCE);

    form.set_weight(Some(70.5));
    autosave.mark_dirty();

    // Nothing is written before the debounce expires.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(store.lock().await.get("2024-03-05").await.expect("get").is_none());

    tokio::time::sleep(Duration::from_millis(600)).await;
    wait_until_idle(&autosave).await;

    let stored = store.lock().await.get("2024-03-05").await.expect("get").expect("saved");
    assert_eq!(stored.weight, Some(70.5));
}

#[tokio::test(start_paused = true)]
async fn test_rapid_edits_collapse_into_one_write() {
    let dir = tempdir().expect("tempdir");
    let store = open_shared(dir.path()).await;
    let form = TestForm::new("2024-03-05");
    let autosave = Autosave::new(store.clone(), form.clone(), DEBOUNCE);

    // Edits inside the debounce window keep re-arming the timer.
    form.set_weight(Some(69.0));
    autosave.mark_dirty();
    tokio::time::sleep(Duration::from_millis(200)).await;
    form.set_weight(Some(70.0));
    autosave.mark_dirty();
    tokio::time::sleep(Duration::from_millis(200)).await;
    form.set_weight(Some(70.5));
    autosave.mark_dirty();

    tokio::time::sleep(Duration::from_millis(700)).await;
    wait_until_idle(&autosave).await;

    let stored = store.lock().await.get("2024-03-05").await.expect("get").expect("saved");
    assert_eq!(stored.weight, Some(70.5));
}

#[tokio::test(start_paused = true)]
async fn test_edit_during_inflight_save_coalesces_and_loses_nothing() {
    let dir = tempdir().expect("tempdir");
    let store = open_shared(dir.path()).await;
    let form = TestForm::new("2024-03-05");
    let autosave = Autosave::new(store.clone(), form.clone(), DEBOUNCE);

    form.set_weight(Some(70.0));
    autosave.mark_dirty();

    // Hold the store lock so the triggered save blocks in flight.
    let guard = store.lock().await;
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(autosave.state(), SaveState::Saving);

    // Edits landing behind the in-flight save.
    form.set_weight(Some(70.5));
    form.set_supplement("vitamin_d3", true);
    autosave.mark_dirty();
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(autosave.state(), SaveState::SavingWithPendingRetry);

    drop(guard);
    wait_until_idle(&autosave).await;

    // The follow-up cycle wrote the latest values.
    let stored = store.lock().await.get("2024-03-05").await.expect("get").expect("saved");
    assert_eq!(stored.weight, Some(70.5));
    assert_eq!(stored.supplements.get("vitamin_d3"), Some(&true));
}

#[tokio::test(start_paused = true)]
async fn test_edit_whose_save_completes_early_is_still_written() {
    let dir = tempdir().expect("tempdir");
    let store = open_shared(dir.path()).await;
    let form = TestForm::new("2024-03-05");
    let autosave = Autosave::new(store.clone(), form.clone(), DEBOUNCE);

    form.set_weight(Some(70.0));
    autosave.mark_dirty();

    let guard = store.lock().await;
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(autosave.state(), SaveState::Saving);

    // Edit while the save is in flight, then let the save finish before
    // the new debounce expires. The later timer must still write.
    form.set_weight(Some(70.5));
    autosave.mark_dirty();
    drop(guard);

    tokio::time::sleep(Duration::from_millis(700)).await;
    wait_until_idle(&autosave).await;

    let stored = store.lock().await.get("2024-03-05").await.expect("get").expect("saved");
    assert_eq!(stored.weight, Some(70.5));
}

#[tokio::test(start_paused = true)]
async fn test_empty_new_record_is_not_persisted() {
    let dir = tempdir().expect("tempdir");
    let store = open_shared(dir.path()).await;
    let form = TestForm::new("2024-03-05");
    let autosave = Autosave::new(store.clone(), form.clone(), DEBOUNCE);

    // An untouched form on a fresh date: the cycle runs but writes nothing.
    autosave.mark_dirty();
    tokio::time::sleep(Duration::from_millis(700)).await;
    wait_until_idle(&autosave).await;

    assert!(store.lock().await.list_all().await.expect("list").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_existing_record_can_be_saved_back_to_empty() {
    let dir = tempdir().expect("tempdir");
    let store = open_shared(dir.path()).await;
    let form = TestForm::new("2024-03-05");
    let autosave = Autosave::new(store.clone(), form.clone(), DEBOUNCE);

    form.set_weight(Some(70.5));
    autosave.mark_dirty();
    tokio::time::sleep(Duration::from_millis(700)).await;
    wait_until_idle(&autosave).await;

    // Clearing the only value on an already-stored record still writes:
    // suppression applies only to records that were never stored.
    form.set_weight(None);
    autosave.mark_dirty();
    tokio::time::sleep(Duration::from_millis(700)).await;
    wait_until_idle(&autosave).await;

    let stored = store.lock().await.get("2024-03-05").await.expect("get").expect("stored");
    assert_eq!(stored.weight, None);
}

#[tokio::test(start_paused = true)]
async fn test_hydration_suppresses_autosave() {
    let dir = tempdir().expect("tempdir");
    let store = open_shared(dir.path()).await;
    let form = TestForm::new("2024-03-05");
    let autosave = Autosave::new(store.clone(), form.clone(), DEBOUNCE);

    autosave.begin_hydration();
    form.set_weight(Some(70.5));
    autosave.mark_dirty();
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(store.lock().await.list_all().await.expect("list").is_empty());
    autosave.end_hydration();

    // A real edit after hydration saves normally.
    autosave.mark_dirty();
    tokio::time::sleep(Duration::from_millis(700)).await;
    wait_until_idle(&autosave).await;
    assert_eq!(store.lock().await.list_all().await.expect("list").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_flush_saves_without_waiting_for_the_debounce() {
    let dir = tempdir().expect("tempdir");
    let store = open_shared(dir.path()).await;
    let form = TestForm::new("2024-03-05");
    let autosave = Autosave::new(store.clone(), form.clone(), DEBOUNCE);

    form.set_weight(Some(70.5));
    autosave.flush().await;
    wait_until_idle(&autosave).await;

    let stored = store.lock().await.get("2024-03-05").await.expect("get").expect("saved");
    assert_eq!(stored.weight, Some(70.5));
}
