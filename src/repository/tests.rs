//! Repository Integration Tests
//!
//! Tests for the tag and tag item repositories with an in-memory SQLite database.

#[cfg(test)]
mod tests {
    use crate::domain::{
        DomainError, Tag, TagItemRecord, TagItemVariant, FAVORITES_TAG_ID, PINNED_TAG_ID,
    };
    use crate::repository::{
        init_db, open_db, DbState, Repository, StoreChange, TagItemPositioningOperations,
        TagPromotionOperations,
    };
    use std::path::PathBuf;
    use tokio::sync::broadcast::error::TryRecvError;

    async fn setup_test_db() -> DbState {
        // Use in-memory database for tests
        let db_path = PathBuf::from(":memory:");
        init_db(&db_path).await.expect("Failed to init test DB")
    }

    async fn create_tag(db: &DbState, name: &str) -> u32 {
        db.tag_repo()
            .create(&Tag::new(0, name.to_string()))
            .await
            .expect("Failed to create tag")
            .id
    }

    fn app(key: &str) -> TagItemVariant {
        TagItemVariant::App {
            catalog_key: key.to_string(),
        }
    }

    #[tokio::test]
    async fn test_reserved_tags_provisioned() {
        let db = setup_test_db().await;

        let tags = db.tag_repo().list().await.expect("List failed");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0], Tag::new(FAVORITES_TAG_ID, "Favorites".to_string()));
        assert_eq!(tags[1], Tag::new(PINNED_TAG_ID, "Pinned".to_string()));
    }

    #[tokio::test]
    async fn test_custom_reserved_names() {
        let db = open_db(&PathBuf::from(":memory:"), "Stars", "Dock")
            .await
            .expect("Failed to init test DB");

        let pinned = db.tag_repo().find_by_id(PINNED_TAG_ID).await.unwrap().unwrap();
        assert_eq!(pinned.name, "Dock");
    }

    #[tokio::test]
    async fn test_tag_crud() {
        let db = setup_test_db().await;
        let repo = db.tag_repo();

        let created = repo.create(&Tag::new(0, "Work".to_string())).await.expect("Create failed");
        assert!(created.id > PINNED_TAG_ID);

        let found = repo.find_by_id(created.id).await.expect("Find failed");
        assert_eq!(found, Some(created.clone()));

        let renamed = repo
            .update(&Tag::new(created.id, "Office".to_string()))
            .await
            .expect("Update failed");
        assert_eq!(renamed.name, "Office");

        repo.delete(created.id).await.expect("Delete failed");
        assert!(repo.find_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_tag_errors() {
        let db = setup_test_db().await;
        let repo = db.tag_repo();

        let update = repo.update(&Tag::new(404, "Nope".to_string())).await;
        assert!(matches!(update, Err(DomainError::NotFound(_))));

        let delete = repo.delete(404).await;
        assert!(matches!(delete, Err(DomainError::NotFound(_))));

        assert_eq!(
            repo.require(404).await,
            Err(DomainError::NotFound("Tag 404 not found".to_string()))
        );
        assert_eq!(repo.require(FAVORITES_TAG_ID).await.unwrap().name, "Favorites");
    }

    #[tokio::test]
    async fn test_reserved_tags_cannot_be_deleted() {
        let db = setup_test_db().await;

        let result = db.tag_repo().delete(FAVORITES_TAG_ID).await;
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert!(db.tag_repo().find_by_id(FAVORITES_TAG_ID).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_tag_cascades_records_but_not_references() {
        let db = setup_test_db().await;
        let items = db.tag_item_repo();
        let games = create_tag(&db, "Games").await;

        items
            .insert_all(&[
                TagItemRecord::app_ref(games, 0, "com.chess"),
                TagItemRecord::tag_ref(FAVORITES_TAG_ID, 0, games),
            ])
            .await
            .unwrap();

        db.tag_repo().delete(games).await.expect("Delete failed");

        assert!(items.items_for_tag(games).await.unwrap().is_empty());
        // The reference from Favorites now dangles
        let favorites = items.items_for_tag(FAVORITES_TAG_ID).await.unwrap();
        assert_eq!(favorites, vec![TagItemRecord::tag_ref(FAVORITES_TAG_ID, 0, games)]);
    }

    #[tokio::test]
    async fn test_insert_latest_write_wins() {
        let db = setup_test_db().await;
        let items = db.tag_item_repo();

        items.insert(&TagItemRecord::app_ref(PINNED_TAG_ID, 0, "com.a")).await.unwrap();
        items
            .insert(&TagItemRecord::shortcut_ref(PINNED_TAG_ID, 0, "com.b", "s1").with_label("B"))
            .await
            .unwrap();

        let stored = items.items_for_tag(PINNED_TAG_ID).await.unwrap();
        assert_eq!(
            stored,
            vec![TagItemRecord::shortcut_ref(PINNED_TAG_ID, 0, "com.b", "s1").with_label("B")]
        );
    }

    #[tokio::test]
    async fn test_insert_into_missing_tag_conflicts() {
        let db = setup_test_db().await;

        let result = db
            .tag_item_repo()
            .insert(&TagItemRecord::app_ref(404, 0, "com.a"))
            .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_exact_record_only() {
        let db = setup_test_db().await;
        let items = db.tag_item_repo();
        items
            .insert_all(&[
                TagItemRecord::app_ref(PINNED_TAG_ID, 0, "com.a"),
                TagItemRecord::app_ref(PINNED_TAG_ID, 1, "com.b"),
            ])
            .await
            .unwrap();

        // Same slot, different item: ignored
        items.delete(&TagItemRecord::app_ref(PINNED_TAG_ID, 0, "com.b")).await.unwrap();
        assert_eq!(items.items_for_tag(PINNED_TAG_ID).await.unwrap().len(), 2);

        items.delete(&TagItemRecord::app_ref(PINNED_TAG_ID, 0, "com.a")).await.unwrap();
        let remaining = items.items_for_tag(PINNED_TAG_ID).await.unwrap();
        assert_eq!(remaining, vec![TagItemRecord::app_ref(PINNED_TAG_ID, 1, "com.b")]);
    }

    #[tokio::test]
    async fn test_reorder_renumbers_and_is_idempotent() {
        let db = setup_test_db().await;
        let items = db.tag_item_repo();
        let tag = create_tag(&db, "Tools").await;

        // Sparse orders on purpose
        items
            .insert_all(&[
                TagItemRecord::app_ref(tag, 3, "com.a"),
                TagItemRecord::app_ref(tag, 7, "com.b"),
                TagItemRecord::tag_ref(tag, 9, tag),
            ])
            .await
            .unwrap();

        let mut list = items.items_for_tag(tag).await.unwrap();
        list.reverse();
        items.reorder(tag, &list).await.expect("Reorder failed");

        let stored = items.items_for_tag(tag).await.unwrap();
        let expected: Vec<TagItemRecord> = list
            .iter()
            .enumerate()
            .map(|(index, record)| TagItemRecord {
                order: index as i32,
                ..record.clone()
            })
            .collect();
        assert_eq!(stored, expected);

        let mut rx = db.subscribe();
        items.reorder(tag, &stored).await.expect("Reorder failed");
        assert_eq!(items.items_for_tag(tag).await.unwrap(), expected);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_move_item() {
        let db = setup_test_db().await;
        let items = db.tag_item_repo();
        items
            .insert_all(&[
                TagItemRecord::app_ref(PINNED_TAG_ID, 0, "com.a"),
                TagItemRecord::app_ref(PINNED_TAG_ID, 1, "com.b"),
                TagItemRecord::app_ref(PINNED_TAG_ID, 2, "com.c"),
            ])
            .await
            .unwrap();

        items.move_item(PINNED_TAG_ID, 2, 0).await.expect("Move failed");
        let keys: Vec<TagItemVariant> = items
            .items_for_tag(PINNED_TAG_ID)
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.variant)
            .collect();
        assert_eq!(keys, vec![app("com.c"), app("com.a"), app("com.b")]);

        let result = items.move_item(PINNED_TAG_ID, 0, 3).await;
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_append_and_remove_and_compact() {
        let db = setup_test_db().await;
        let items = db.tag_item_repo();

        for key in ["com.a", "com.b", "com.c"] {
            items
                .append(&TagItemRecord::app_ref(FAVORITES_TAG_ID, 0, key))
                .await
                .expect("Append failed");
        }
        let stored = items.items_for_tag(FAVORITES_TAG_ID).await.unwrap();
        assert_eq!(
            stored.iter().map(|r| r.order).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        items.remove_and_compact(&stored[1]).await.expect("Remove failed");
        let compacted = items.items_for_tag(FAVORITES_TAG_ID).await.unwrap();
        assert_eq!(
            compacted,
            vec![
                TagItemRecord::app_ref(FAVORITES_TAG_ID, 0, "com.a"),
                TagItemRecord::app_ref(FAVORITES_TAG_ID, 1, "com.c"),
            ]
        );

        let appended = items
            .append(&TagItemRecord::app_ref(FAVORITES_TAG_ID, 42, "com.d"))
            .await
            .unwrap();
        assert_eq!(appended.order, 2);
    }

    #[tokio::test]
    async fn test_toggle_in_tag_adds_then_removes() {
        let db = setup_test_db().await;
        let repo = db.tag_item_repo();
        repo.insert_all(&[
            TagItemRecord::app_ref(FAVORITES_TAG_ID, 0, "com.a"),
            TagItemRecord::app_ref(FAVORITES_TAG_ID, 1, "com.b"),
        ])
        .await
        .unwrap();

        assert!(repo.toggle_in_tag(FAVORITES_TAG_ID, &app("com.c")).await.unwrap());
        let items = repo.items_for_tag(FAVORITES_TAG_ID).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2], TagItemRecord::app_ref(FAVORITES_TAG_ID, 2, "com.c"));

        // Removing from the middle closes the gap
        assert!(!repo.toggle_in_tag(FAVORITES_TAG_ID, &app("com.a")).await.unwrap());
        let orders: Vec<(i32, TagItemVariant)> = repo
            .items_for_tag(FAVORITES_TAG_ID)
            .await
            .unwrap()
            .into_iter()
            .map(|record| (record.order, record.variant))
            .collect();
        assert_eq!(orders, vec![(0, app("com.b")), (1, app("com.c"))]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_toggles_never_duplicate() {
        let db = setup_test_db().await;

        let mut tasks = Vec::new();
        for _ in 0..9 {
            let repo = db.tag_item_repo();
            tasks.push(tokio::spawn(async move {
                repo.toggle_in_tag(FAVORITES_TAG_ID, &app("com.mail")).await
            }));
        }
        let mut added = 0;
        for task in tasks {
            if task.await.unwrap().unwrap() {
                added += 1;
            }
        }

        // Serialized toggles alternate, so an odd count leaves exactly one record
        assert_eq!(added, 5);
        let items = db.tag_item_repo().items_for_tag(FAVORITES_TAG_ID).await.unwrap();
        assert_eq!(items, vec![TagItemRecord::app_ref(FAVORITES_TAG_ID, 0, "com.mail")]);
    }

    #[tokio::test]
    async fn test_promote_preserves_parent_count() {
        let db = setup_test_db().await;
        let items = db.tag_item_repo();
        let tag = create_tag(&db, "Social").await;

        items
            .insert_all(&[
                TagItemRecord::app_ref(tag, 0, "com.chat"),
                TagItemRecord::app_ref(tag, 1, "com.mail").with_label("Work mail"),
                TagItemRecord::app_ref(tag, 2, "com.photos"),
            ])
            .await
            .unwrap();

        let record = TagItemRecord::app_ref(tag, 1, "com.mail").with_label("Work mail");
        let extras = vec![
            TagItemVariant::Shortcut {
                package: "com.mail".into(),
                shortcut_id: "compose".into(),
            },
            TagItemVariant::Shortcut {
                package: "com.mail".into(),
                shortcut_id: "inbox".into(),
            },
        ];
        let new_tag = items
            .promote_to_tag(&record, "Mail", &extras)
            .await
            .expect("Promote failed");

        let parent = items.items_for_tag(tag).await.unwrap();
        assert_eq!(parent.len(), 3);
        assert_eq!(
            parent[1],
            TagItemRecord::tag_ref(tag, 1, new_tag).with_label("Work mail")
        );

        let members = items.items_for_tag(new_tag).await.unwrap();
        assert_eq!(members.len(), 1 + extras.len());
        assert_eq!(members[0].variant, app("com.mail"));
        assert_eq!(members[0].order, 0);
        assert_eq!(members[2].variant, extras[1]);

        let created = db.tag_repo().find_by_id(new_tag).await.unwrap().unwrap();
        assert_eq!(created.name, "Mail");
    }

    #[tokio::test]
    async fn test_promote_tag_ref_returns_target() {
        let db = setup_test_db().await;
        let items = db.tag_item_repo();
        let before = db.tag_repo().list().await.unwrap().len();

        let record = TagItemRecord::tag_ref(FAVORITES_TAG_ID, 0, PINNED_TAG_ID);
        let target = items.promote_to_tag(&record, "Ignored", &[]).await.unwrap();

        assert_eq!(target, PINNED_TAG_ID);
        assert_eq!(db.tag_repo().list().await.unwrap().len(), before);
    }

    #[tokio::test]
    async fn test_promote_stale_record_conflicts() {
        let db = setup_test_db().await;
        let items = db.tag_item_repo();
        items
            .insert(&TagItemRecord::app_ref(PINNED_TAG_ID, 0, "com.a"))
            .await
            .unwrap();

        let stale = TagItemRecord::app_ref(PINNED_TAG_ID, 0, "com.gone");
        let result = items.promote_to_tag(&stale, "Gone", &[]).await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));

        // Nothing was written
        assert_eq!(db.tag_repo().list().await.unwrap().len(), 2);
        assert_eq!(
            items.items_for_tag(PINNED_TAG_ID).await.unwrap(),
            vec![TagItemRecord::app_ref(PINNED_TAG_ID, 0, "com.a")]
        );
    }

    #[tokio::test]
    async fn test_distinct_referenced_packages() {
        let db = setup_test_db().await;
        db.tag_item_repo()
            .insert_all(&[
                TagItemRecord::app_ref(FAVORITES_TAG_ID, 0, "com.a/.Main"),
                TagItemRecord::shortcut_ref(FAVORITES_TAG_ID, 1, "com.b", "s1"),
                TagItemRecord::tag_ref(FAVORITES_TAG_ID, 2, PINNED_TAG_ID),
                TagItemRecord::app_ref(PINNED_TAG_ID, 0, "com.a"),
            ])
            .await
            .unwrap();

        let packages = db.tag_item_repo().distinct_referenced_packages().await.unwrap();
        assert_eq!(
            packages.into_iter().collect::<Vec<_>>(),
            vec!["com.a".to_string(), "com.b".to_string()]
        );
    }

    #[tokio::test]
    async fn test_snapshot_is_ordered() {
        let db = setup_test_db().await;
        let tag = create_tag(&db, "Loop").await;
        db.tag_item_repo()
            .insert_all(&[
                TagItemRecord::tag_ref(tag, 1, tag),
                TagItemRecord::app_ref(tag, 0, "com.a"),
            ])
            .await
            .unwrap();

        let snapshot = db.tag_item_repo().snapshot().await.unwrap();
        assert_eq!(snapshot.tags.len(), 3);
        assert_eq!(snapshot.tag(tag).unwrap().name, "Loop");
        let orders: Vec<i32> = snapshot.items_for_tag(tag).iter().map(|r| r.order).collect();
        assert_eq!(orders, vec![0, 1]);
        assert!(snapshot.items_for_tag(FAVORITES_TAG_ID).is_empty());
    }

    #[tokio::test]
    async fn test_change_notifications() {
        let db = setup_test_db().await;
        let mut rx = db.subscribe();

        let tag = create_tag(&db, "Work").await;
        assert_eq!(rx.try_recv().unwrap(), StoreChange { tag_ids: vec![tag] });

        db.tag_item_repo()
            .insert_all(&[
                TagItemRecord::app_ref(tag, 0, "com.a"),
                TagItemRecord::app_ref(tag, 1, "com.b"),
                TagItemRecord::app_ref(FAVORITES_TAG_ID, 0, "com.a"),
            ])
            .await
            .unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            StoreChange {
                tag_ids: vec![FAVORITES_TAG_ID, tag]
            }
        );

        // Deleting a record that is not stored publishes nothing
        db.tag_item_repo()
            .delete(&TagItemRecord::app_ref(tag, 5, "com.z"))
            .await
            .unwrap();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let unopened = DbState::new();
        let result = unopened.tag_repo().list().await;
        assert!(matches!(result, Err(DomainError::Unavailable(_))));

        let db = setup_test_db().await;
        db.close().await;
        let result = db.tag_item_repo().items_for_tag(FAVORITES_TAG_ID).await;
        assert!(matches!(result, Err(DomainError::Unavailable(_))));
        let result = db
            .tag_item_repo()
            .append(&TagItemRecord::app_ref(FAVORITES_TAG_ID, 0, "com.a"))
            .await;
        assert!(matches!(result, Err(DomainError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_legacy_tables_are_migrated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");

        {
            let conn = rusqlite::Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE tags (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL);
                 INSERT INTO tags (id, name) VALUES (5, 'Work');
                 CREATE TABLE tagged_apps (packageName TEXT NOT NULL, tagId INTEGER NOT NULL);
                 INSERT INTO tagged_apps VALUES ('com.a', 5), ('com.b', 5), ('com.c', 1), ('com.x', 99);
                 CREATE TABLE tagged_shortcuts (
                     packageName TEXT NOT NULL, shortcutId TEXT NOT NULL,
                     tagId INTEGER NOT NULL, label TEXT
                 );
                 INSERT INTO tagged_shortcuts VALUES ('com.a', 'compose', 5, 'Compose');",
            )
            .unwrap();
        }

        let db = init_db(&path).await.expect("Failed to open legacy DB");
        let items = db.tag_item_repo();

        assert_eq!(
            items.items_for_tag(5).await.unwrap(),
            vec![
                TagItemRecord::app_ref(5, 0, "com.a"),
                TagItemRecord::app_ref(5, 1, "com.b"),
                TagItemRecord::shortcut_ref(5, 2, "com.a", "compose").with_label("Compose"),
            ]
        );
        assert_eq!(
            items.items_for_tag(FAVORITES_TAG_ID).await.unwrap(),
            vec![TagItemRecord::app_ref(FAVORITES_TAG_ID, 0, "com.c")]
        );
        assert!(items.items_for_tag(99).await.unwrap().is_empty());

        let legacy_left: i64 = {
            let guard = db.conn.lock().await;
            guard
                .as_ref()
                .unwrap()
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE name IN ('tagged_apps', 'tagged_shortcuts')",
                    [],
                    |row| row.get(0),
                )
                .unwrap()
        };
        assert_eq!(legacy_left, 0);

        // Reopening is a no-op
        db.close().await;
        let reopened = init_db(&path).await.unwrap();
        assert_eq!(reopened.tag_item_repo().items_for_tag(5).await.unwrap().len(), 3);
    }
}
