//! Durability and concurrency behavior of the persisted collection.

mod common;

use common::init_logging;
use std::sync::Arc;
use tempfile::TempDir;

use gitpress::services::locator::RepoLocator;
use gitpress::services::store::ProjectStore;
use gitpress::types::project::{CommitInfo, Project, ProjectKind};

fn project(name: &str) -> Project {
    let locator = RepoLocator::parse("https://github.com/acme/widget").unwrap();
    Project::new(&locator, ProjectKind::Plugin, name, "main")
}

fn commit(sha: &str) -> CommitInfo {
    CommitInfo {
        sha: sha.to_string(),
        message: format!("commit {sha}"),
        author: "Ada".to_string(),
        timestamp: None,
    }
}

#[tokio::test]
async fn concurrent_updates_to_different_projects_both_survive() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("projects.json");

    let store = Arc::new(ProjectStore::open(&path).unwrap());
    let a = store.insert(project("alpha")).await.unwrap();
    let b = store.insert(project("beta")).await.unwrap();

    // Two syncs finishing at the same time: with the naive
    // load-all/save-all pattern one of these writes would vanish.
    let (store_a, store_b) = (Arc::clone(&store), Arc::clone(&store));
    let (id_a, id_b) = (a.id.clone(), b.id.clone());
    let task_a =
        tokio::spawn(async move { store_a.record_deployment(&id_a, &commit("aaa111")).await });
    let task_b =
        tokio::spawn(async move { store_b.record_deployment(&id_b, &commit("bbb222")).await });

    task_a.await.unwrap().unwrap();
    task_b.await.unwrap().unwrap();

    // Both updates are present in the persisted file, not just one.
    let reopened = ProjectStore::open(&path).unwrap();
    assert_eq!(
        reopened.get_deployed_commit(&a.id).await.unwrap().as_deref(),
        Some("aaa111")
    );
    assert_eq!(
        reopened.get_deployed_commit(&b.id).await.unwrap().as_deref(),
        Some("bbb222")
    );
}

#[tokio::test]
async fn many_interleaved_records_never_lose_a_project() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("projects.json");

    let store = Arc::new(ProjectStore::open(&path).unwrap());
    let mut ids = Vec::new();
    for i in 0..4 {
        let p = store.insert(project(&format!("plugin-{i}"))).await.unwrap();
        ids.push(p.id);
    }

    let mut tasks = Vec::new();
    for id in &ids {
        for round in 0..5 {
            let store = Arc::clone(&store);
            let id = id.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .record_deployment(&id, &commit(&format!("{id}-{round}")))
                    .await
            }));
        }
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let reopened = ProjectStore::open(&path).unwrap();
    assert_eq!(reopened.list().await.len(), 4);
    for id in &ids {
        assert_eq!(reopened.get_history(id).await.unwrap().len(), 5);
    }
}

#[tokio::test]
async fn deployment_state_round_trips_through_disk() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("projects.json");

    let store = ProjectStore::open(&path).unwrap();
    let p = store.insert(project("gamma")).await.unwrap();
    store.record_deployment(&p.id, &commit("cafe01")).await.unwrap();

    let reopened = ProjectStore::open(&path).unwrap();
    let loaded = reopened.get(&p.id).await.unwrap();
    assert_eq!(loaded.deployed_commit.as_deref(), Some("cafe01"));
    assert_eq!(loaded.history.len(), 1);
    assert_eq!(loaded.history[0].message, "commit cafe01");
}

#[tokio::test]
async fn corrupt_store_file_is_an_error_not_data_loss() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("projects.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(ProjectStore::open(&path).is_err());
}
