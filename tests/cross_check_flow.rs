// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! End-to-end flows wired through the public API: session round-trips and
//! the extract-then-apply path, using fake agent scripts instead of real
//! agent CLIs.

use std::path::PathBuf;
use std::time::Duration;

use vigil::apply::{extract, Applicator, ChangeKind, ConfirmPrompt, Confirmation};
use vigil::providers::{dispatch, Provider, ProviderKind, SessionStats};
use vigil::session::{Role, SessionStore};

struct AlwaysYes;

impl ConfirmPrompt for AlwaysYes {
    fn ask(&mut self, _question: &str) -> Confirmation {
        Confirmation::Yes
    }
}

#[test]
fn session_survives_a_store_restart() {
    let temp = tempfile::tempdir().unwrap();

    let id = {
        let mut store = SessionStore::new(temp.path());
        let id = store.create_session("rust", "/work").unwrap();
        store
            .add_context(Role::User, "what does the dispatcher do", "analyze")
            .unwrap();
        store
            .add_context(Role::Assistant, "it fans prompts out to agents", "analyze")
            .unwrap();
        id
    };

    // A brand-new store over the same directory resumes via the pointer.
    let mut store = SessionStore::new(temp.path());
    store.load_latest().unwrap();

    let session = store.current().unwrap();
    assert_eq!(session.metadata.id, id);
    assert_eq!(session.context_history.len(), 2);
    assert_eq!(session.metadata.total_commands, 1);

    let prefix = store.context_prefix();
    assert!(prefix.contains("[Previous conversation]"));
    assert!(prefix.contains("[user] what does the dispatcher do"));
    assert!(prefix.contains("--- New request below ---"));
}

#[test]
fn extracted_changes_apply_with_backups() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(temp.path().join("src")).unwrap();
    std::fs::write(temp.path().join("src/lib.rs"), "pub fn old() {}").unwrap();

    // Typical agent answer: prose, one change for an existing file, one
    // hallucinated path, one plain code example.
    let response = "\
Here is what I would change.

```rust:src/lib.rs
pub fn renamed() {}
```

```rust:src/does_not_exist.rs
pub fn ghost() {}
```

```rust
let example = 1;
```
";

    let changes = extract(response, temp.path());
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, ChangeKind::Modify);
    assert_eq!(changes[0].path, PathBuf::from("src/lib.rs"));

    let mut applicator = Applicator::new(temp.path());
    let (applied, skipped) = applicator.apply_with_confirmation(&changes, &mut AlwaysYes);
    assert_eq!((applied, skipped), (1, 0));

    assert_eq!(
        std::fs::read_to_string(temp.path().join("src/lib.rs")).unwrap(),
        "pub fn renamed() {}"
    );

    // Original content preserved in exactly one backup.
    let backups: Vec<_> = std::fs::read_dir(temp.path().join(".vigil/backups"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(
        std::fs::read_to_string(&backups[0]).unwrap(),
        "pub fn old() {}"
    );
}

#[tokio::test]
async fn dispatch_results_feed_a_session_turn() {
    let temp = tempfile::tempdir().unwrap();

    let providers = vec![Provider {
        kind: ProviderKind::Claude,
        command: "echo".to_string(),
        enabled: true,
        available: true,
        role: ProviderKind::Claude.role(),
    }];
    let mut stats = SessionStats::new();

    let results = dispatch(
        "summarize the build",
        &providers,
        false,
        Duration::from_secs(10),
        &mut stats,
    )
    .await;
    let answer = vigil::synthesize(&results);
    assert!(answer.contains("summarize the build"));

    let mut store = SessionStore::new(temp.path());
    store.create_session("unknown", "/work").unwrap();
    store
        .add_context(Role::User, "summarize the build", "analyze")
        .unwrap();
    store.add_context(Role::Assistant, &answer, "analyze").unwrap();

    assert!(store.current().unwrap().total_tokens() > 0);
    assert_eq!(stats.calls_for("claude"), 1);
}
