use board_api::{
    models::{NewBoardPost, UpdateBoardPost},
    repo::{inmem::InMemRepo, BoardPostRepo, RepoError},
};
use std::sync::Arc;

fn new_post(title: &str) -> NewBoardPost {
    NewBoardPost { title: title.into(), content: "body".into(), author: "bob".into() }
}

#[tokio::test]
async fn create_assigns_ids_and_rejects_duplicate_title() {
    let r = InMemRepo::new();

    // starts empty
    assert!(r.list_posts().await.unwrap().is_empty());

    let a = r.create_post(new_post("Hello")).await.unwrap();
    let b = r.create_post(new_post("Other")).await.unwrap();
    assert!(a.id > 0);
    assert!(b.id > a.id);
    assert_eq!(a.view_count, None);
    assert_eq!(a.created_at, a.updated_at);
    assert!(a.deleted_at.is_none());

    // duplicate title → conflict
    let err = r.create_post(new_post("Hello")).await.unwrap_err();
    assert_eq!(err, RepoError::Conflict);
    assert_eq!(r.list_posts().await.unwrap().len(), 2);
}

#[tokio::test]
async fn update_overwrites_title_and_content_only() {
    let r = InMemRepo::new();
    let p = r.create_post(new_post("Hello")).await.unwrap();

    let upd = r
        .update_post(p.id, UpdateBoardPost { title: "Hi".into(), content: "new".into() })
        .await
        .unwrap();
    assert_eq!(upd.title, "Hi");
    assert_eq!(upd.content, "new");
    assert_eq!(upd.author, p.author);
    assert_eq!(upd.created_at, p.created_at);
    assert_eq!(upd.updated_at, p.updated_at);

    let err = r
        .update_post(999, UpdateBoardPost { title: "x".into(), content: "y".into() })
        .await
        .unwrap_err();
    assert_eq!(err, RepoError::NotFound);
}

#[tokio::test]
async fn update_may_reuse_an_existing_title() {
    let r = InMemRepo::new();
    r.create_post(new_post("First")).await.unwrap();
    let second = r.create_post(new_post("Second")).await.unwrap();
    let upd = r
        .update_post(second.id, UpdateBoardPost { title: "First".into(), content: "c".into() })
        .await
        .unwrap();
    assert_eq!(upd.title, "First");
}

#[tokio::test]
async fn lookups_delete_and_ordering() {
    let r = InMemRepo::new();
    let a = r.create_post(new_post("a")).await.unwrap();
    let b = r.create_post(new_post("b")).await.unwrap();
    let c = r.create_post(new_post("c")).await.unwrap();

    assert_eq!(r.find_by_id(b.id).await.unwrap(), Some(b.clone()));
    assert_eq!(r.find_by_title("c").await.unwrap().map(|p| p.id), Some(c.id));
    assert!(r.find_by_title("zzz").await.unwrap().is_none());

    let removed = r.delete_post(b.id).await.unwrap();
    assert_eq!(removed, b);
    assert!(r.find_by_id(b.id).await.unwrap().is_none());
    assert_eq!(r.delete_post(b.id).await.unwrap_err(), RepoError::NotFound);

    let ids: Vec<_> = r.list_posts().await.unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![a.id, c.id]);

    // ids are never reused after a delete
    let d = r.create_post(new_post("b")).await.unwrap();
    assert!(d.id > c.id);
}

#[tokio::test]
async fn concurrent_creates_with_same_title_yield_one_post() {
    let r = Arc::new(InMemRepo::new());
    let mut handles = Vec::new();
    for _ in 0..16 {
        let r = r.clone();
        handles.push(tokio::spawn(async move { r.create_post(new_post("race")).await }));
    }
    let mut ok = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) => assert_eq!(e, RepoError::Conflict),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(r.list_posts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn snapshot_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let (kept, dropped) = {
        let r = InMemRepo::with_snapshot_dir(dir.path());
        let kept = r.create_post(new_post("kept")).await.unwrap();
        let dropped = r.create_post(new_post("dropped")).await.unwrap();
        r.delete_post(dropped.id).await.unwrap();
        (kept, dropped)
    };

    let reopened = InMemRepo::with_snapshot_dir(dir.path());
    assert_eq!(reopened.find_by_id(kept.id).await.unwrap(), Some(kept.clone()));
    assert!(reopened.find_by_id(dropped.id).await.unwrap().is_none());

    // id counter is restored too
    let next = reopened.create_post(new_post("next")).await.unwrap();
    assert!(next.id > dropped.id);
}

#[tokio::test]
async fn corrupt_snapshot_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("state.json"), b"{not json").unwrap();
    let r = InMemRepo::with_snapshot_dir(dir.path());
    assert!(r.list_posts().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_fails_when_snapshot_cannot_be_written() {
    // snapshot "dir" is a regular file, so state.json can never be created
    let file = tempfile::NamedTempFile::new().unwrap();
    let r = InMemRepo::with_snapshot_dir(file.path());

    let err = r.create_post(new_post("Hello")).await.unwrap_err();
    assert!(matches!(err, RepoError::Internal(_)));
    assert!(r.list_posts().await.unwrap().is_empty());
    assert!(r.find_by_title("Hello").await.unwrap().is_none());
}

#[tokio::test]
async fn failed_snapshot_rolls_back_update_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let r = InMemRepo::with_snapshot_dir(dir.path());
    let p = r.create_post(new_post("Hello")).await.unwrap();

    // a directory in place of the snapshot file makes every write fail
    let snapshot = dir.path().join(board_api::repo::inmem::SNAPSHOT_FILE);
    std::fs::remove_file(&snapshot).unwrap();
    std::fs::create_dir(&snapshot).unwrap();

    let err = r
        .update_post(p.id, UpdateBoardPost { title: "Hi".into(), content: "new".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Internal(_)));
    assert_eq!(r.find_by_id(p.id).await.unwrap(), Some(p.clone()));

    let err = r.delete_post(p.id).await.unwrap_err();
    assert!(matches!(err, RepoError::Internal(_)));
    assert_eq!(r.find_by_id(p.id).await.unwrap(), Some(p.clone()));

    assert!(r.create_post(new_post("Other")).await.is_err());

    // the failed create did not burn an id
    std::fs::remove_dir(&snapshot).unwrap();
    let next = r.create_post(new_post("Other")).await.unwrap();
    assert_eq!(next.id, p.id + 1);
}
