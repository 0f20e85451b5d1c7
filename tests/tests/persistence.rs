//! Reopening graphs over an existing store.

use pretty_assertions::assert_eq;
use vgraph_tests::prelude::*;

// ========== TEST: reopen_rebuilds_chain_and_dirty_flag ==========
#[tokio::test]
async fn test_reopen_rebuilds_chain_and_dirty_flag() {
    init_tracing();

    // GIVEN a store holding two commits and a pending change
    let store = shared_store();
    let (first, second, pending) = {
        let mut graph = open(store.clone(), "family").await.unwrap();
        let first = commit(&mut graph, "one").await;
        let id = graph.add_node("Person").await.unwrap().id().to_string();
        let second = commit(&mut graph, "two").await;
        graph
            .get_node(&id)
            .await
            .unwrap()
            .set_property("given", "Ada")
            .await
            .unwrap();
        (first, second, id)
    };

    // WHEN the store is opened again
    let mut graph = open(store.clone(), "family").await.unwrap();

    // THEN the history and the pending change are recovered
    assert_eq!(graph.get_commits(None, None).await.unwrap(), vec![first, second.clone()]);
    let info = graph.info().unwrap();
    assert_eq!(info.commit.as_deref(), Some(second.id()));
    assert!(!info.clean);
    assert_eq!(
        graph.get_node(&pending).await.unwrap().status().await.unwrap(),
        Status::Updated
    );

    // AND the reopened graph keeps extending the same chain
    let third = commit(&mut graph, "three").await;
    expect_commit(&third, |c| c.updated(1).prev(Some(second.id())));
    assert_eq!(root_incoming_count(&store).await, 1);
}

// ========== TEST: reopen_with_other_repo_fails ==========
#[tokio::test]
async fn test_reopen_with_other_repo_fails() {
    init_tracing();
    let store = shared_store();
    open(store.clone(), "family").await.unwrap();

    let result = open(store.clone(), "census").await;

    assert_eq!(result.err(), Some(VGraphError::RepoMismatch));
    assert!(open(store, "family").await.is_ok());
}

// ========== TEST: config_is_validated ==========
#[tokio::test]
async fn test_config_is_validated() {
    assert_eq!(
        VGraphConfig::new("").err(),
        Some(VGraphError::Validation(ValidationError::InvalidRepo))
    );
    assert_eq!(
        VGraphConfig::new("r".repeat(256)).err(),
        Some(VGraphError::Validation(ValidationError::InvalidRepo))
    );

    let config = VGraphConfig::from_json(r#"{"repo": "family", "checkPatchOrigs": false}"#).unwrap();
    assert_eq!(config, VGraphConfig::new("family").unwrap().with_patch_orig_check(false));
}

// ========== TEST: reopen_with_other_version_fails ==========
#[tokio::test]
async fn test_reopen_with_other_version_fails() {
    init_tracing();
    let store = shared_store();
    open(store.clone(), "family").await.unwrap();

    // GIVEN a root written by another model version
    set_root_property(&store, "_specVersion", PropertyValue::from(99)).await;

    // THEN the store is refused
    let result = open(store.clone(), "family").await;
    assert_eq!(result.err(), Some(VGraphError::VersionMismatch));
}

// ========== TEST: broken_chain_blocks_history_operations ==========
#[tokio::test]
async fn test_broken_chain_blocks_history_operations() {
    init_tracing();

    // GIVEN a committed graph whose root gains a second chain edge
    let store = shared_store();
    let mut graph = open(store.clone(), "family").await.unwrap();
    let first = commit(&mut graph, "one").await;
    link_into_root(&store).await;
    assert_eq!(root_incoming_count(&store).await, 2);

    // THEN every operation that walks the chain refuses to run
    let broken = Some(VGraphError::InvalidState("Multiple Commit Edges".to_string()));
    assert_eq!(graph.commit(AUTHOR, EMAIL, "two").await.err(), broken);
    assert_eq!(graph.undo(first.id()).await.err(), broken);

    let header = CommitHeader::new("census", AUTHOR, EMAIL, "remote")
        .with_prev(Some(first.id().to_string()));
    let remote = Commit::new(header, vec![], vec![]).unwrap();
    assert_eq!(graph.patch(&remote).await.err(), broken);

    // AND the chain is left as it was
    assert_eq!(graph.info().unwrap().commit.as_deref(), Some(first.id()));
    assert_eq!(root_incoming_count(&store).await, 2);

    // AND the store cannot be reopened
    assert_eq!(open(store, "family").await.err(), broken);
}
