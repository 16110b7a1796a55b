#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    use crate::common::{ClientError, Validator};
    use crate::todos::models::*;
    use crate::todos::repository::TodoRepository;
    use crate::todos::validators::TodoInputValidator;
    use crate::todos::TodoManager;

    const PNG_BYTES: [u8; 16] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ];

    fn todo(id: i64, title: &str, status: TodoStatus) -> Todo {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Todo {
            id,
            user_id: 1,
            title: title.to_string(),
            description: format!("{} description", title),
            status,
            image_path: None,
            image_id: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[derive(Default)]
    struct FakeServer {
        todos: Vec<Todo>,
        next_id: i64,
        fail_next: bool,
        get_all_calls: usize,
        mutation_calls: usize,
    }

    #[derive(Clone, Default)]
    struct FakeTodoRepo {
        server: Arc<Mutex<FakeServer>>,
    }

    impl FakeTodoRepo {
        fn seeded(todos: Vec<Todo>) -> Self {
            let next_id = todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
            let repo = Self::default();
            {
                let mut server = repo.server.lock().unwrap();
                server.todos = todos;
                server.next_id = next_id;
            }
            repo
        }

        fn fail_next(&self) {
            self.server.lock().unwrap().fail_next = true;
        }

        fn take_failure(server: &mut FakeServer) -> Result<(), ClientError> {
            if server.fail_next {
                server.fail_next = false;
                return Err(ClientError::Api {
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    body: "database unavailable".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TodoRepository for FakeTodoRepo {
        async fn get_all(&self) -> Result<Vec<Todo>, ClientError> {
            let mut server = self.server.lock().unwrap();
            server.get_all_calls += 1;
            Self::take_failure(&mut server)?;
            Ok(server.todos.clone())
        }

        async fn get_by_id(&self, id: i64) -> Result<Todo, ClientError> {
            let server = self.server.lock().unwrap();
            server
                .todos
                .iter()
                .find(|t| t.id == id)
                .cloned()
                .ok_or_else(|| ClientError::NotFound("Todo not found".to_string()))
        }

        async fn create(&self, input: &TodoInput) -> Result<Todo, ClientError> {
            let mut server = self.server.lock().unwrap();
            server.mutation_calls += 1;
            Self::take_failure(&mut server)?;
            let id = server.next_id.max(1);
            server.next_id = id + 1;
            let mut created = todo(id, &input.title, input.status);
            created.description = input.description.clone();
            if input.image.is_some() {
                created.image_path = Some(format!("images/{}", id));
            }
            server.todos.insert(0, created.clone());
            Ok(created)
        }

        async fn update(&self, id: i64, input: &TodoInput) -> Result<Todo, ClientError> {
            let mut server = self.server.lock().unwrap();
            server.mutation_calls += 1;
            Self::take_failure(&mut server)?;
            let slot = server
                .todos
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| ClientError::NotFound("Todo not found".to_string()))?;
            slot.title = input.title.clone();
            slot.description = input.description.clone();
            slot.status = input.status;
            slot.updated_at = slot.updated_at + chrono::Duration::minutes(5);
            Ok(slot.clone())
        }

        async fn delete(&self, id: i64) -> Result<(), ClientError> {
            let mut server = self.server.lock().unwrap();
            server.mutation_calls += 1;
            Self::take_failure(&mut server)?;
            let before = server.todos.len();
            server.todos.retain(|t| t.id != id);
            if server.todos.len() == before {
                return Err(ClientError::NotFound("Todo not found".to_string()));
            }
            Ok(())
        }

        async fn fetch_image(&self, image_path: &str) -> Result<Bytes, ClientError> {
            if image_path.starts_with("images/") {
                Ok(Bytes::from_static(&PNG_BYTES))
            } else {
                Err(ClientError::NotFound("Image not found".to_string()))
            }
        }

        fn image_url(&self, image_path: &str) -> String {
            format!("http://api.test/{}", image_path)
        }
    }

    fn seeded_manager() -> (TodoManager<FakeTodoRepo>, FakeTodoRepo) {
        let repo = FakeTodoRepo::seeded(vec![
            todo(3, "Write report", TodoStatus::InProgress),
            todo(2, "Call plumber", TodoStatus::Pending),
            todo(1, "Renew passport", TodoStatus::Done),
        ]);
        (TodoManager::new(repo.clone()), repo)
    }

    // ------------------------------------------------------------------
    // Models
    // ------------------------------------------------------------------

    #[test]
    fn test_status_parsing_and_serialization() {
        assert_eq!("pending".parse::<TodoStatus>().unwrap(), TodoStatus::Pending);
        assert_eq!(
            "In Progress".parse::<TodoStatus>().unwrap(),
            TodoStatus::InProgress
        );
        assert_eq!("in-progress".parse::<TodoStatus>().unwrap(), TodoStatus::InProgress);
        assert_eq!("DONE".parse::<TodoStatus>().unwrap(), TodoStatus::Done);
        assert!("archived".parse::<TodoStatus>().is_err());

        assert_eq!(
            serde_json::to_string(&TodoStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(TodoStatus::InProgress.label(), "in progress");
        assert_eq!(TodoStatus::default(), TodoStatus::Pending);
    }

    #[test]
    fn test_todo_deserializes_backend_payload() {
        let json = r#"{
            "id": 12,
            "user_id": 4,
            "title": "Buy milk",
            "description": "2%",
            "status": "pending",
            "created_at": "2024-05-01T12:00:00.123456Z",
            "updated_at": "2024-05-01T12:00:00+07:00"
        }"#;
        let todo: Todo = serde_json::from_str(json).unwrap();
        assert_eq!(todo.id, 12);
        assert_eq!(todo.status, TodoStatus::Pending);
        assert!(todo.image_path.is_none());
        assert!(todo.attached_image().is_none());

        let with_image: Todo = serde_json::from_str(
            r#"{"id":1,"user_id":1,"title":"t","status":"done","image_path":"images/9",
                "created_at":"2024-05-01T12:00:00Z","updated_at":"2024-05-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(with_image.description, "");
        assert_eq!(with_image.attached_image().as_deref(), Some("images/9"));
    }

    #[test]
    fn test_unknown_status_is_tolerated_but_not_submitted() {
        let todos: Vec<Todo> = serde_json::from_str(
            r#"[{"id":7,"user_id":1,"title":"Old","status":"archived",
                 "created_at":"2024-05-01T12:00:00Z","updated_at":"2024-05-01T12:00:00Z"},
                {"id":8,"user_id":1,"title":"New","status":"done",
                 "created_at":"2024-05-01T12:00:00Z","updated_at":"2024-05-01T12:00:00Z"}]"#,
        )
        .unwrap();
        assert_eq!(todos[0].status, TodoStatus::Unknown);
        assert_eq!(todos[1].status, TodoStatus::Done);

        assert!("unknown".parse::<TodoStatus>().is_err());

        let result = TodoInputValidator.validate(&TodoInput::from_todo(&todos[0]));
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "status");
    }

    #[test]
    fn test_image_upload_detects_type() {
        let image = ImageUpload::new("cat.png", PNG_BYTES.to_vec()).unwrap();
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.file_name, "cat.png");

        assert!(ImageUpload::new("notes.txt", b"just some text".to_vec()).is_err());
        assert!(ImageUpload::new("empty.png", Vec::new()).is_err());
    }

    #[test]
    fn test_todo_input_validator() {
        let validator = TodoInputValidator;

        let valid = TodoInput::new("Buy milk", "", TodoStatus::Pending);
        assert!(validator.validate(&valid).is_valid);

        let blank = TodoInput::new("   ", "desc", TodoStatus::Done);
        let result = validator.validate(&blank);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "title");

        let mut bad_image = valid.clone();
        bad_image.image = Some(ImageUpload {
            file_name: "x.bin".to_string(),
            content_type: "application/octet-stream".to_string(),
            data: vec![1, 2, 3],
        });
        assert!(!validator.validate(&bad_image).is_valid);
    }

    // ------------------------------------------------------------------
    // Manager
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_fresh_manager_is_empty_until_fetch() {
        let (mut manager, _) = seeded_manager();
        assert!(manager.is_empty());

        let todos = manager.fetch_all().await.unwrap();
        assert_eq!(todos.len(), 3);
        assert_eq!(todos[0].id, 3);
    }

    #[tokio::test]
    async fn test_create_prepends_and_round_trips() {
        let (mut manager, repo) = seeded_manager();
        manager.fetch_all().await.unwrap();
        let before = manager.len();

        let created = manager
            .create(TodoInput::new("Buy milk", "2%", TodoStatus::Pending))
            .await
            .unwrap();

        assert!(created.id > 0);
        assert_eq!(manager.len(), before + 1);
        assert_eq!(manager.todos()[0], created);

        let calls_before = repo.server.lock().unwrap().get_all_calls;
        let fetched = manager.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.title, "Buy milk");
        assert_eq!(fetched.description, "2%");
        assert_eq!(fetched.status, TodoStatus::Pending);
        assert_eq!(
            repo.server.lock().unwrap().get_all_calls,
            calls_before,
            "cached todo should not trigger a refetch"
        );
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title_without_server_call() {
        let (mut manager, repo) = seeded_manager();

        let err = manager
            .create(TodoInput::new("", "no title", TodoStatus::Pending))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(repo.server.lock().unwrap().mutation_calls, 0);
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_refetches_on_miss() {
        let (mut manager, repo) = seeded_manager();

        let found = manager.get_by_id(2).await.unwrap();
        assert_eq!(found.title, "Call plumber");
        assert_eq!(repo.server.lock().unwrap().get_all_calls, 1);
        assert_eq!(manager.len(), 3, "refetch should refresh the cache");

        let err = manager.get_by_id(404).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(repo.server.lock().unwrap().get_all_calls, 2);
    }

    #[tokio::test]
    async fn test_update_only_touches_target() {
        let (mut manager, _) = seeded_manager();
        manager.fetch_all().await.unwrap();
        let before = manager.todos().to_vec();

        let updated = manager
            .update(2, TodoInput::new("Call plumber", "re: leak", TodoStatus::Done))
            .await
            .unwrap();

        assert_eq!(updated.status, TodoStatus::Done);
        let after = manager.todos();
        assert_eq!(after.len(), before.len());
        assert_eq!(after[1], updated, "position should be preserved");
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
    }

    #[tokio::test]
    async fn test_failed_mutations_leave_cache_unchanged() {
        let (mut manager, repo) = seeded_manager();
        manager.fetch_all().await.unwrap();
        let before = manager.todos().to_vec();

        repo.fail_next();
        let err = manager
            .update(3, TodoInput::new("Changed", "", TodoStatus::Done))
            .await
            .unwrap_err();
        assert_eq!(
            err.status(),
            Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR)
        );
        assert_eq!(manager.todos(), before.as_slice());

        repo.fail_next();
        assert!(manager
            .create(TodoInput::new("New", "", TodoStatus::Pending))
            .await
            .is_err());
        assert_eq!(manager.todos(), before.as_slice());

        repo.fail_next();
        assert!(manager.delete(1).await.is_err());
        assert_eq!(manager.todos(), before.as_slice());
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one() {
        let (mut manager, _) = seeded_manager();
        manager.fetch_all().await.unwrap();

        manager.delete(2).await.unwrap();
        assert_eq!(manager.len(), 2);
        assert!(manager.todos().iter().all(|t| t.id != 2));

        let err = manager.delete(2).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(manager.len(), 2);
    }

    #[tokio::test]
    async fn test_image_url_and_download() {
        let (mut manager, _) = seeded_manager();
        let image = ImageUpload::new("cat.png", PNG_BYTES.to_vec()).unwrap();

        let created = manager
            .create(TodoInput::new("Feed cat", "", TodoStatus::Pending).with_image(image))
            .await
            .unwrap();

        let url = manager.image_url(&created).unwrap();
        assert_eq!(url, format!("http://api.test/images/{}", created.id));

        let bytes = manager.fetch_image(&created).await.unwrap().unwrap();
        assert_eq!(&bytes[..], &PNG_BYTES[..]);

        let plain = todo(50, "No image", TodoStatus::Pending);
        assert!(manager.image_url(&plain).is_none());
        assert!(manager.fetch_image(&plain).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_image_id_from_list_response() {
        let listed: Vec<Todo> = serde_json::from_str(
            r#"[{"id":5,"user_id":1,"title":"Feed cat","description":"","status":"pending",
                 "image_id":"abc123",
                 "created_at":"2024-05-01T12:00:00Z","updated_at":"2024-05-01T12:00:00Z"}]"#,
        )
        .unwrap();
        assert!(listed[0].image_path.is_none());
        assert_eq!(listed[0].attached_image().as_deref(), Some("images/abc123"));

        let mut manager = TodoManager::new(FakeTodoRepo::seeded(listed));
        manager.fetch_all().await.unwrap();
        let todo = manager.get_by_id(5).await.unwrap();

        assert_eq!(
            manager.image_url(&todo).as_deref(),
            Some("http://api.test/images/abc123")
        );
        let bytes = manager.fetch_image(&todo).await.unwrap().unwrap();
        assert_eq!(&bytes[..], &PNG_BYTES[..]);
    }

    #[tokio::test]
    async fn test_fetch_all_survives_unknown_status() {
        let mut odd = todo(9, "Legacy", TodoStatus::Pending);
        odd.status = serde_json::from_str("\"archived\"").unwrap();
        let mut manager = TodoManager::new(FakeTodoRepo::seeded(vec![
            odd,
            todo(1, "Renew passport", TodoStatus::Done),
        ]));

        let todos = manager.fetch_all().await.unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].status, TodoStatus::Unknown);
    }
}
