#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use uuid::Uuid;

    use campus_core::domain::{ContentType, PageRequest, PostFilter, StorageClass};
    use campus_core::ports::{EngagementRepository, PostRepository, StoryRepository};

    use crate::database::entity::enums::{DbContentType, DbStorageClass};
    use crate::database::entity::{post, post_comment};
    use crate::database::{PostgresPostRepository, PostgresStoryRepository};

    fn post_model(id: Uuid) -> post::Model {
        let now = Utc::now();
        post::Model {
            id,
            created_by: Uuid::new_v4(),
            club_id: None,
            house_id: None,
            content_type: DbContentType::Image,
            image_url: Some("https://cdn.campus.edu/posts/a.jpg".to_owned()),
            video_url: None,
            thumbnail_url: None,
            duration_seconds: None,
            description: "Welcome week".to_owned(),
            hashtags: vec!["welcome".to_owned()],
            created_at: now.into(),
            updated_at: now.into(),
            deleted_at: None,
            archived_at: None,
            storage_class: DbStorageClass::Standard,
            like_count: 3,
            comment_count: 1,
            share_count: 0,
            view_count: 10,
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_find_post_maps_row() {
        let post_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_model(post_id)]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let post = repo.find_post(post_id).await.unwrap().unwrap();

        assert_eq!(post.id, post_id);
        assert_eq!(post.content_type, ContentType::Image);
        assert_eq!(post.storage_class, StorageClass::Standard);
        assert_eq!(post.hashtags, vec!["welcome".to_string()]);
        assert_eq!(post.media.image_url.as_deref(), Some("https://cdn.campus.edu/posts/a.jpg"));
        assert_eq!(post.like_count, 3);
    }

    #[tokio::test]
    async fn test_list_posts_returns_total() {
        let count_row = BTreeMap::from([("num_items", Value::BigInt(Some(41)))]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row]])
            .append_query_results([vec![post_model(Uuid::new_v4()), post_model(Uuid::new_v4())]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let (posts, total) = repo
            .list_posts(&PostFilter::default(), PageRequest::new(Some(3), Some(20)))
            .await
            .unwrap();

        assert_eq!(total, 41);
        assert_eq!(posts.len(), 2);
    }

    #[tokio::test]
    async fn test_toggle_like_inserts_when_absent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0), exec(1), exec(1)])
            .into_connection();

        let repo = PostgresPostRepository::new(db.clone());
        let liked = repo
            .toggle_post_like(Uuid::new_v4(), Uuid::new_v4(), Utc::now())
            .await
            .unwrap();

        assert!(liked);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("ON CONFLICT"));
        assert!(log.contains("like_count"));
    }

    #[tokio::test]
    async fn test_toggle_like_removes_when_present() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(1)])
            .into_connection();

        let repo = PostgresPostRepository::new(db.clone());
        let liked = repo
            .toggle_post_like(Uuid::new_v4(), Uuid::new_v4(), Utc::now())
            .await
            .unwrap();

        assert!(!liked);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("GREATEST"));
    }

    #[tokio::test]
    async fn test_concurrent_like_insert_is_treated_as_liked() {
        // Delete finds nothing, insert hits the unique pair and does nothing.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0), exec(0)])
            .into_connection();

        let repo = PostgresPostRepository::new(db.clone());
        let liked = repo
            .toggle_post_like(Uuid::new_v4(), Uuid::new_v4(), Utc::now())
            .await
            .unwrap();

        assert!(liked);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(!log.contains("like_count"));
    }

    #[tokio::test]
    async fn test_mark_archived_missing_post_is_false() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        assert!(!repo.mark_archived(Uuid::new_v4(), Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_archival_candidates_carry_age() {
        let now = Utc::now();
        let mut old = post_model(Uuid::new_v4());
        old.created_at = (now - Duration::days(75)).into();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![old.clone()]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let candidates = repo.archival_candidates(now).await.unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].post_id, old.id);
        assert_eq!(candidates[0].age_days, 75);
    }

    #[tokio::test]
    async fn test_soft_delete_comment_already_deleted() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post_comment::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        assert!(!repo.soft_delete_comment(Uuid::new_v4(), Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_story_view_not_counted() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .into_connection();

        let repo = PostgresStoryRepository::new(db.clone());
        let first = repo
            .record_story_view(Uuid::new_v4(), Uuid::new_v4(), Utc::now())
            .await
            .unwrap();

        assert!(!first);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(!log.contains("view_count"));
    }
}
