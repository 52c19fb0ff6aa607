//! End-to-end pipeline coverage against the stub GitHub host.

mod common;

use common::{commit_json, init_logging, repo_zip, StubGithub, StubResponse};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use gitpress::services::github::GithubClient;
use gitpress::services::locator::RepoLocator;
use gitpress::services::store::ProjectStore;
use gitpress::services::sync::SyncService;
use gitpress::types::project::{Project, ProjectKind};

struct Harness {
    service: SyncService,
    store: Arc<ProjectStore>,
    project_id: String,
    content_dir: PathBuf,
    scratch_dir: PathBuf,
    _root: TempDir,
}

async fn harness(routes: HashMap<String, StubResponse>, kind: ProjectKind) -> Harness {
    init_logging();

    let stub = StubGithub::start(routes).await;
    let root = TempDir::new().unwrap();
    let content_dir = root.path().join("wp-content");
    let scratch_dir = root.path().join("scratch");
    fs::create_dir_all(&scratch_dir).unwrap();

    let store = Arc::new(ProjectStore::open(root.path().join("projects.json")).unwrap());
    let locator = RepoLocator::parse("https://github.com/acme/widget").unwrap();
    let project = store
        .insert(Project::new(&locator, kind, "widget", "main"))
        .await
        .unwrap();

    let client =
        GithubClient::with_base_urls(stub.base_url.as_str(), stub.base_url.as_str(), None).unwrap();
    let service =
        SyncService::new(client, Arc::clone(&store), &content_dir).with_work_dir(&scratch_dir);

    Harness {
        service,
        store,
        project_id: project.id,
        content_dir,
        scratch_dir,
        _root: root,
    }
}

fn branch_routes(sha: &str) -> HashMap<String, StubResponse> {
    let mut routes = HashMap::new();
    routes.insert(
        "/repos/acme/widget/commits/main".to_string(),
        StubResponse::json(commit_json(sha, "Ship the widget")),
    );
    routes.insert(
        "/acme/widget/archive/refs/heads/main.zip".to_string(),
        StubResponse::zip(repo_zip(
            "widget-main",
            &[("style.css", "body {}"), ("inc/functions.php", "<?php")],
        )),
    );
    routes
}

fn dir_entry_count(dir: &Path) -> usize {
    match fs::read_dir(dir) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

#[tokio::test]
async fn sync_deploys_branch_tip_and_records_it() {
    let h = harness(branch_routes("c1c1c1c1"), ProjectKind::Theme).await;

    let outcome = h.service.sync_project(&h.project_id).await.unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.sha.as_deref(), Some("c1c1c1c1"));

    let target = h.content_dir.join("themes/widget");
    assert_eq!(outcome.target_dir.as_deref(), Some(target.to_str().unwrap()));
    assert_eq!(fs::read_to_string(target.join("style.css")).unwrap(), "body {}");
    assert_eq!(
        fs::read_to_string(target.join("inc/functions.php")).unwrap(),
        "<?php"
    );

    let project = h.store.get(&h.project_id).await.unwrap();
    assert_eq!(project.deployed_commit.as_deref(), Some("c1c1c1c1"));
    assert!(project.last_sync.is_some());
    assert_eq!(project.history.len(), 1);
    assert_eq!(project.history[0].sha, "c1c1c1c1");
    assert_eq!(project.history[0].message, "Ship the widget");

    // Both the archive temp file and the workspace were released.
    assert_eq!(dir_entry_count(&h.scratch_dir), 0);
}

#[tokio::test]
async fn sync_replaces_stale_files_and_keeps_a_backup() {
    let h = harness(branch_routes("c2c2c2c2"), ProjectKind::Plugin).await;

    let target = h.content_dir.join("plugins/widget");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("legacy.txt"), "left over from before").unwrap();

    let outcome = h.service.sync_project(&h.project_id).await.unwrap();

    assert!(outcome.success);
    assert!(!target.join("legacy.txt").exists());
    assert!(target.join("style.css").exists());

    let backup = PathBuf::from(outcome.backup.unwrap());
    assert!(backup.join("legacy.txt").exists());
}

#[tokio::test]
async fn syncing_twice_is_idempotent_and_appends_duplicate_record() {
    let h = harness(branch_routes("c3c3c3c3"), ProjectKind::Theme).await;

    h.service.sync_project(&h.project_id).await.unwrap();
    let second = h.service.sync_project(&h.project_id).await.unwrap();

    assert!(second.success);
    let target = h.content_dir.join("themes/widget");
    assert_eq!(fs::read_to_string(target.join("style.css")).unwrap(), "body {}");

    let history = h.store.get_history(&h.project_id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].sha, "c3c3c3c3");
    assert_eq!(history[1].sha, "c3c3c3c3");
}

#[tokio::test]
async fn restore_to_synced_commit_reproduces_the_tree() {
    let sha = "d4d4d4d4";
    let mut routes = branch_routes(sha);
    routes.insert(
        format!("/repos/acme/widget/commits/{sha}"),
        StubResponse::json(commit_json(sha, "Ship the widget")),
    );
    routes.insert(
        format!("/acme/widget/archive/{sha}.zip"),
        StubResponse::zip(repo_zip(
            &format!("widget-{sha}"),
            &[("style.css", "body {}"), ("inc/functions.php", "<?php")],
        )),
    );
    let h = harness(routes, ProjectKind::Theme).await;

    h.service.sync_project(&h.project_id).await.unwrap();
    let target = h.content_dir.join("themes/widget");
    let first_css = fs::read_to_string(target.join("style.css")).unwrap();

    let outcome = h.service.restore_commit(&h.project_id, sha).await.unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.sha.as_deref(), Some(sha));
    assert_eq!(fs::read_to_string(target.join("style.css")).unwrap(), first_css);
    assert!(target.join("inc/functions.php").exists());

    let project = h.store.get(&h.project_id).await.unwrap();
    assert_eq!(project.deployed_commit.as_deref(), Some(sha));
    assert_eq!(project.history.len(), 2);
}

#[tokio::test]
async fn failed_archive_fetch_leaves_no_trace() {
    // Commit metadata resolves, but the archive endpoint 404s.
    let mut routes = HashMap::new();
    routes.insert(
        "/repos/acme/widget/commits/main".to_string(),
        StubResponse::json(commit_json("e5e5e5e5", "unreachable archive")),
    );
    let h = harness(routes, ProjectKind::Theme).await;

    let result = h.service.sync_project(&h.project_id).await;
    assert!(result.is_err());

    // No temp archive or workspace remains.
    assert_eq!(dir_entry_count(&h.scratch_dir), 0);
    // Deployment state is untouched.
    let project = h.store.get(&h.project_id).await.unwrap();
    assert!(project.deployed_commit.is_none());
    assert!(project.history.is_empty());
    assert!(!h.content_dir.join("themes/widget").exists());
}

#[tokio::test]
async fn corrupt_archive_fails_and_cleans_up() {
    let mut routes = HashMap::new();
    routes.insert(
        "/repos/acme/widget/commits/main".to_string(),
        StubResponse::json(commit_json("f6f6f6f6", "bad archive")),
    );
    routes.insert(
        "/acme/widget/archive/refs/heads/main.zip".to_string(),
        StubResponse::zip(b"this is not a zip".to_vec()),
    );
    let h = harness(routes, ProjectKind::Theme).await;

    let result = h.service.sync_project(&h.project_id).await;
    assert!(result.is_err());

    assert_eq!(dir_entry_count(&h.scratch_dir), 0);
    assert!(h.store.get_history(&h.project_id).await.unwrap().is_empty());
}
