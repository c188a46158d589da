//! # Integration Tests for Dialectic Store
//!
//! Both stores exercised against real directories and databases, and
//! wired into a running orchestrator as its persister.

use std::fs::{self, File};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use dialectic_core::{
    Argument, ArgumentKind, DebateConfig, DebateOrchestrator, DebateState, Debater,
    IterationRecord, ScriptedDebater, ScriptedJudge, ScriptedVote,
};
use tempfile::TempDir;
use uuid::Uuid;

use crate::{DirectoryStore, SledStore, StoreError};

// =============================================================================
// Helper Functions
// =============================================================================

const ROSTER: [&str; 4] = ["Optimist", "Skeptic", "Visionary", "Critic"];

fn roster() -> Vec<String> {
    ROSTER.iter().map(|s| s.to_string()).collect()
}

fn make_state(question: &str) -> DebateState {
    let mut state = DebateState::new(question, roster(), DebateConfig::default()).unwrap();
    let arguments = ROSTER
        .iter()
        .map(|name| Argument::new(*name, format!("{} speaks.", name), 0, ArgumentKind::General))
        .collect();
    state
        .push_iteration(IterationRecord::new(0, arguments))
        .unwrap();
    state
}

fn json_files(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".json"))
        .collect();
    names.sort();
    names
}

fn age_file(path: &std::path::Path, seconds: u64) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(seconds))
        .unwrap();
}

// =============================================================================
// Directory Store Tests
// =============================================================================

#[test]
fn test_directory_save_and_load() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path());
    let state = make_state("Should museums be free?");

    let path = store.save(&state).unwrap();
    let name = path.file_name().unwrap().to_string_lossy().into_owned();

    assert!(name.ends_with("_Should_museums_be_free.json"));
    assert_eq!(name.len(), "YYYYmmdd_HHMMSS_".len() + "Should_museums_be_free.json".len());

    let by_name = store.load(&name).unwrap();
    let by_path = store.load(&path).unwrap();
    assert_eq!(by_name, state);
    assert_eq!(by_path, state);
}

#[test]
fn test_directory_created_on_first_save() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("archive").join("debates");
    let store = DirectoryStore::new(&nested);

    store.save(&make_state("Is tea better than coffee?")).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn test_resave_overwrites_same_file() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path());
    let mut state = make_state("Should museums be free?");

    let first = store.save(&state).unwrap();
    state.finalize(Some("Free entry wins.".to_string()));
    let second = store.save(&state).unwrap();

    assert_eq!(first, second);
    assert_eq!(json_files(&dir).len(), 1);
    assert!(store.load(&second).unwrap().is_finalized());
}

#[test]
fn test_name_collision_gets_suffix() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path());
    let state = make_state("Should museums be free?");
    let mut twin = state.clone();
    twin.id = Uuid::new_v4();

    let first = store.save(&state).unwrap();
    let second = store.save(&twin).unwrap();

    assert_ne!(first, second);
    assert!(second.to_string_lossy().ends_with("_2.json"));
    assert_eq!(store.load(&first).unwrap().id, state.id);
    assert_eq!(store.load(&second).unwrap().id, twin.id);

    assert_eq!(store.path_for(&state), first);
    assert_eq!(store.path_for(&twin), second);
    assert_ne!(
        second.file_name().unwrap().to_string_lossy(),
        DirectoryStore::file_name_for(&twin)
    );
}

#[test]
fn test_explicit_title_used_for_file_name() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path());
    let state = make_state("Should museums be free?").with_title("Museums: Free/Paid");

    let path = store.save(&state).unwrap();
    assert!(path.to_string_lossy().ends_with("_Museums-_Free-Paid.json"));
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path());

    let result = store.load("nope.json");
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[test]
fn test_load_rejects_inconsistent_record() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path());
    let mut state = make_state("Should museums be free?");
    state.participants = vec!["Optimist".to_string(), "Optimist".to_string()];

    let path = dir.path().join("broken.json");
    fs::write(&path, serde_json::to_string(&state).unwrap()).unwrap();

    let result = store.load(&path);
    assert!(matches!(result, Err(StoreError::InvalidState(_))));
}

#[test]
fn test_list_most_recent_first_with_limit() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path());

    let old = store.save(&make_state("Oldest question?")).unwrap();
    let mid = store.save(&make_state("Middle question?")).unwrap();
    let new = store.save(&make_state("Newest question?")).unwrap();
    age_file(&old, 300);
    age_file(&mid, 200);
    age_file(&new, 100);

    let all = store.list(None).unwrap();
    let titles: Vec<&str> = all.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Newest question", "Middle question", "Oldest question"]);
    assert_eq!(all[0].path.as_deref(), Some(new.as_path()));

    let limited = store.list(Some(2)).unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[1].title, "Middle question");
}

#[test]
fn test_list_skips_unreadable_files() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path());
    store.save(&make_state("Readable?")).unwrap();
    fs::write(dir.path().join("garbage.json"), "not json at all").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let summaries = store.list(None).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].title, "Readable");
    assert_eq!(summaries[0].iterations, 1);
}

#[test]
fn test_list_missing_directory_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path().join("never-created"));
    assert!(store.list(None).unwrap().is_empty());
}

// =============================================================================
// Sled Store Tests
// =============================================================================

#[test]
fn test_sled_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("debates.db");
    let state = make_state("Should museums be free?");

    {
        let store = SledStore::open(&db_path).unwrap();
        store.save(&state).unwrap();
        store.flush().unwrap();
    }

    let store = SledStore::open(&db_path).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.load(&state.id).unwrap(), Some(state));
}

#[test]
fn test_sled_list_summaries() {
    let store = SledStore::temporary().unwrap();
    let mut finished = make_state("Finished?");
    finished.finalize(Some("Done.".to_string()));
    store.save(&finished).unwrap();
    store.save(&make_state("Open?")).unwrap();

    let summaries = store.list().unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries.iter().filter(|s| s.has_verdict).count(), 1);
    assert!(summaries.iter().all(|s| s.path.is_none()));
}

// =============================================================================
// End-to-End Tests
// =============================================================================

fn converging_panel() -> Vec<Arc<dyn Debater>> {
    let favourite: Vec<String> = ["Critic", "Optimist", "Skeptic", "Visionary"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    ROSTER
        .iter()
        .map(|name| {
            Arc::new(
                ScriptedDebater::new(*name)
                    .with_default_vote(ScriptedVote::Ranking(favourite.clone())),
            ) as Arc<dyn Debater>
        })
        .collect()
}

#[tokio::test]
async fn test_orchestrator_persists_to_directory() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(DirectoryStore::new(dir.path()));

    let mut orchestrator = DebateOrchestrator::new(DebateConfig::default(), converging_panel())
        .unwrap()
        .with_title("Museum Funding")
        .with_judge(Arc::new(ScriptedJudge::new()))
        .with_persister(store.clone());

    let outcome = orchestrator.run("Should museums be free?").await.unwrap();
    assert_eq!(outcome.persistence_failures, 0);
    assert_eq!(outcome.winner(), Some("Critic"));

    // One file, rewritten after every round
    let files = json_files(&dir);
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("_Museum_Funding.json"));

    let saved = store.load(&files[0]).unwrap();
    assert_eq!(saved, outcome.state);
    assert_eq!(saved.winner(), Some("Critic"));
}

#[tokio::test]
async fn test_orchestrator_persists_to_sled() {
    let store = Arc::new(SledStore::temporary().unwrap());

    let mut orchestrator = DebateOrchestrator::new(DebateConfig::default(), converging_panel())
        .unwrap()
        .with_persister(store.clone());

    let outcome = orchestrator.run("Should museums be free?").await.unwrap();

    let saved = store.load(&outcome.state.id).unwrap().unwrap();
    assert_eq!(saved, outcome.state);
    assert_eq!(store.len(), 1);
}
