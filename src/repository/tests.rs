//! Repository Integration Tests
//!
//! SqliteTodoRepository and the hierarchy operations against an in-memory
//! SQLite database.

use crate::domain::DomainError;
use crate::repository::{init_db, SqliteTodoRepository, TodoHierarchyOperations, TodoRepository};
use std::path::PathBuf;

async fn setup_test_db() -> SqliteTodoRepository {
    // Use in-memory database for tests
    let db_state = init_db(&PathBuf::from(":memory:"))
        .await
        .expect("Failed to init test DB");
    SqliteTodoRepository::new(db_state.connection())
}

/// a -> (b -> d), c ; returns ids in that order
async fn seed_tree(repo: &SqliteTodoRepository, owner: &str) -> [String; 4] {
    let a = repo.create_todo(owner, "A", None).await.unwrap().id;
    let b = repo.create_todo(owner, "B", Some(&a)).await.unwrap().id;
    let c = repo.create_todo(owner, "C", Some(&a)).await.unwrap().id;
    let d = repo.create_todo(owner, "D", Some(&b)).await.unwrap().id;
    [a, b, c, d]
}

async fn is_completed(repo: &SqliteTodoRepository, id: &str) -> bool {
    repo.find_todo("u1", id).await.unwrap().unwrap().completed
}

#[tokio::test]
async fn test_create_todo() {
    let repo = setup_test_db().await;

    let created = repo.create_todo("u1", "Test todo", None).await.expect("Failed to create");

    assert!(!created.id.is_empty());
    assert_eq!(created.title, "Test todo");
    assert!(!created.completed);
    assert!(created.is_root());
    assert!(created.created_at.is_some());
}

#[tokio::test]
async fn test_create_child_requires_existing_parent() {
    let repo = setup_test_db().await;

    let err = repo.create_todo("u1", "Orphan", Some("nope")).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));

    let parent = repo.create_todo("u1", "Parent", None).await.unwrap();
    let child = repo.create_todo("u1", "Child", Some(&parent.id)).await.unwrap();
    assert_eq!(child.parent_id, Some(parent.id));
}

#[tokio::test]
async fn test_list_is_newest_first_and_owner_scoped() {
    let repo = setup_test_db().await;

    repo.create_todo("u1", "First", None).await.unwrap();
    repo.create_todo("u2", "Other user", None).await.unwrap();
    repo.create_todo("u1", "Second", None).await.unwrap();

    let titles: Vec<String> = repo
        .list_todos("u1")
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["Second", "First"]);
}

#[tokio::test]
async fn test_other_owner_cannot_touch_todo() {
    let repo = setup_test_db().await;
    let todo = repo.create_todo("u1", "Mine", None).await.unwrap();

    assert!(repo.find_todo("u2", &todo.id).await.unwrap().is_none());
    assert!(matches!(
        repo.set_completed("u2", &todo.id, true).await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(repo.delete_todo("u2", &todo.id).await, Err(DomainError::NotFound(_))));
    assert!(matches!(
        repo.create_todo("u2", "Sneaky child", Some(&todo.id)).await,
        Err(DomainError::NotFound(_))
    ));

    assert!(repo.find_todo("u1", &todo.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_set_completed() {
    let repo = setup_test_db().await;
    let todo = repo.create_todo("u1", "Toggle me", None).await.unwrap();

    let updated = repo.set_completed("u1", &todo.id, true).await.unwrap();
    assert!(updated.completed);

    let found = repo.find_todo("u1", &todo.id).await.unwrap().unwrap();
    assert!(found.completed);
}

#[tokio::test]
async fn test_store_refuses_deleting_parent_first() {
    let repo = setup_test_db().await;
    let [a, b, _, d] = seed_tree(&repo, "u1").await;

    assert!(matches!(repo.delete_todo("u1", &b).await, Err(DomainError::Conflict(_))));

    repo.delete_todo("u1", &d).await.unwrap();
    repo.delete_todo("u1", &b).await.unwrap();
    assert!(repo.find_todo("u1", &b).await.unwrap().is_none());
    assert!(repo.find_todo("u1", &a).await.unwrap().is_some());
}

#[tokio::test]
async fn test_tree_from_store() {
    let repo = setup_test_db().await;
    let [a, b, c, d] = seed_tree(&repo, "u1").await;

    let tree = repo.get_tree("u1").await.unwrap();

    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].id(), a);
    // Listing is newest first, so the later sibling comes first
    let children: Vec<&str> = tree[0].children.iter().map(|n| n.id()).collect();
    assert_eq!(children, vec![c.as_str(), b.as_str()]);
    assert_eq!(tree[0].children[1].children[0].id(), d);
}

#[tokio::test]
async fn test_complete_cascade_in_store() {
    let repo = setup_test_db().await;
    let [a, b, c, d] = seed_tree(&repo, "u1").await;

    let report = repo.set_completed_cascade("u1", &b, true).await.unwrap();
    assert_eq!(report.succeeded, 2);

    assert!(is_completed(&repo, &b).await);
    assert!(is_completed(&repo, &d).await);
    assert!(!is_completed(&repo, &a).await);
    assert!(!is_completed(&repo, &c).await);

    repo.set_completed_cascade("u1", &b, false).await.unwrap();
    assert!(!is_completed(&repo, &b).await);
    assert!(is_completed(&repo, &d).await);
}

#[tokio::test]
async fn test_delete_cascade_in_store() {
    let repo = setup_test_db().await;
    let [a, _, _, _] = seed_tree(&repo, "u1").await;
    repo.create_todo("u1", "Unrelated", None).await.unwrap();

    let report = repo.delete_cascade("u1", &a).await.unwrap();

    assert_eq!(report.attempted, 4);
    assert!(report.is_complete());
    let left: Vec<String> = repo.list_todos("u1").await.unwrap().into_iter().map(|t| t.title).collect();
    assert_eq!(left, vec!["Unrelated"]);
}

#[tokio::test]
async fn test_closed_database_fails_cleanly() {
    let db_state = init_db(&PathBuf::from(":memory:")).await.unwrap();
    let repo = SqliteTodoRepository::new(db_state.connection());
    db_state.close().await;

    assert!(matches!(repo.list_todos("u1").await, Err(DomainError::Internal(_))));
}
