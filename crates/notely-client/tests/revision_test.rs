//! RevisionRequest submission protocol.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::{note, FakeStore};
use notely_client::{RevisionRequest, RevisionStatus};
use notely_core::{Error, NoteStore};

#[tokio::test]
async fn test_blank_input_is_ignored() {
    let store = Arc::new(FakeStore::with_notes(vec![note(1, "A", "B", "")]));
    let request = RevisionRequest::new(1).with_input("   ");

    let status = request.submit(store.as_ref()).await.unwrap();
    assert_eq!(status, RevisionStatus::Ignored);
    assert!(store.calls().is_empty());
    assert!(store.note(1).unwrap().ai_history.is_empty());
}

#[tokio::test]
async fn test_submit_sends_input_as_typed_and_clears_on_success() {
    let store = Arc::new(FakeStore::with_notes(vec![note(1, "A", "B", "")]));
    let request = RevisionRequest::new(1).with_input("  shorter please  ");

    let status = request.submit(store.as_ref()).await.unwrap();
    assert!(matches!(status, RevisionStatus::Submitted(_)));
    assert_eq!(
        store.calls(),
        vec!["append_structured_entry", "generate_revision"]
    );
    assert_eq!(store.note(1).unwrap().ai_history[0].text, "  shorter please  ");
    assert!(request.input().is_empty());
    assert!(!request.is_loading());
}

#[tokio::test]
async fn test_failure_keeps_input() {
    let store = Arc::new(FakeStore::new());
    let request = RevisionRequest::new(404).with_input("fix grammar");

    let err = request.submit(store.as_ref()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(request.input(), "fix grammar");
    assert!(!request.is_loading());
    assert_eq!(store.call_count("generate_revision"), 0);
}

#[tokio::test]
async fn test_second_submit_while_loading_is_busy() {
    let store = Arc::new(FakeStore::with_notes(vec![note(1, "A", "B", "")]));
    store.gated.store(true, Ordering::SeqCst);
    let request = RevisionRequest::new(1).with_input("fix grammar");

    let (first, second) = tokio::join!(request.submit(store.as_ref()), async {
        tokio::task::yield_now().await;
        assert!(request.is_loading());
        let status = request.submit(store.as_ref()).await;
        store.gate.notify_one();
        status
    });

    assert!(matches!(first.unwrap(), RevisionStatus::Submitted(_)));
    assert_eq!(second.unwrap(), RevisionStatus::Busy);
    assert_eq!(store.call_count("generate_revision"), 1);
    assert_eq!(store.full_history(1).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_cancelled_submit_releases_loading() {
    let store = Arc::new(FakeStore::with_notes(vec![note(1, "A", "B", "")]));
    store.gated.store(true, Ordering::SeqCst);
    let request = RevisionRequest::new(1).with_input("fix grammar");

    let cancelled =
        tokio::time::timeout(Duration::from_millis(20), request.submit(store.as_ref())).await;
    assert!(cancelled.is_err());
    assert!(!request.is_loading());
    assert_eq!(request.input(), "fix grammar");

    store.gated.store(false, Ordering::SeqCst);
    let status = request.submit(store.as_ref()).await.unwrap();
    assert!(matches!(status, RevisionStatus::Submitted(_)));
    assert_eq!(store.call_count("generate_revision"), 1);
}
