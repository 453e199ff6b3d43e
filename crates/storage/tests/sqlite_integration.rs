use chrono::Duration;
use onboarding_core::model::{ChatMessage, ChatSession, Sender, Stage, Task};
use onboarding_core::time::fixed_now;
use sqlx::Row;
use storage::repository::{ChatHistoryRepository, Storage, TaskRepository};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn session(id: &str, offset_days: i64, texts: &[&str]) -> ChatSession {
    let at = fixed_now() + Duration::days(offset_days);
    let mut session = ChatSession::new(id, at);
    for (i, text) in texts.iter().enumerate() {
        let sender = if i % 2 == 0 { Sender::User } else { Sender::System };
        let stamp = at + Duration::minutes(i64::try_from(i).unwrap());
        session
            .messages
            .push(ChatMessage::new(format!("{id}-{i}"), *text, sender, stamp));
        session.last_message_at = stamp;
    }
    session
}

#[tokio::test]
async fn task_lists_round_trip_and_overwrite() {
    let repo = connect("memdb_tasks").await;
    assert!(repo.load_tasks(Stage::FirstDay).await.unwrap().is_none());

    let tasks = vec![
        Task::pending(1, "Receber crachá").with_completed(true),
        Task::pending(2, "Configurar email corporativo"),
    ];
    repo.save_tasks(Stage::FirstDay, &tasks).await.unwrap();
    assert_eq!(
        repo.load_tasks(Stage::FirstDay).await.unwrap(),
        Some(tasks.clone())
    );

    let updated: Vec<Task> = tasks
        .into_iter()
        .map(|task| task.with_completed(true))
        .collect();
    repo.save_tasks(Stage::FirstDay, &updated).await.unwrap();
    assert_eq!(
        repo.load_tasks(Stage::FirstDay).await.unwrap(),
        Some(updated)
    );
    assert!(repo.load_tasks(Stage::FirstMonth).await.unwrap().is_none());
}

#[tokio::test]
async fn clearing_tasks_by_stage_and_all() {
    let repo = connect("memdb_clear_tasks").await;
    for stage in Stage::ALL {
        repo.save_tasks(stage, &[Task::pending(1, "x")]).await.unwrap();
    }

    repo.clear_tasks(Some(Stage::FirstWeek)).await.unwrap();
    assert!(repo.load_tasks(Stage::FirstWeek).await.unwrap().is_none());
    assert!(repo.load_tasks(Stage::FirstDay).await.unwrap().is_some());

    repo.clear_tasks(None).await.unwrap();
    for stage in Stage::ALL {
        assert!(repo.load_tasks(stage).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn legacy_task_rows_are_readable() {
    let repo = connect("memdb_legacy").await;
    sqlx::query("INSERT INTO task_progress (stage, tasks, updated_at) VALUES (?1, ?2, ?3)")
        .bind("primeiraSemana")
        .bind(r#"[{"id":1,"descricao":"Conhecer a equipe","concluida":true},{"id":2,"descricao":"Ler o manual"}]"#)
        .bind(fixed_now())
        .execute(repo.pool())
        .await
        .unwrap();

    let tasks = repo.load_tasks(Stage::FirstWeek).await.unwrap().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].description, "Conhecer a equipe");
    assert!(tasks[0].completed);
    assert!(!tasks[1].completed);
}

#[tokio::test]
async fn stage_rows_use_storage_keys() {
    let repo = connect("memdb_keys").await;
    repo.save_tasks(Stage::FirstMonth, &[Task::pending(1, "x")])
        .await
        .unwrap();

    let row = sqlx::query("SELECT stage FROM task_progress")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    let key: String = row.try_get("stage").unwrap();
    assert_eq!(key, "primeiroMes");
}

#[tokio::test]
async fn chat_sessions_round_trip_with_message_order() {
    let repo = connect("memdb_chat").await;
    let older = session("2023-11-14", 0, &["Como acesso o VPN?", "Resposta", "Obrigado"]);
    let newer = session("2023-11-15", 1, &["Onde fica o RH?", "Resposta"]);

    repo.save_sessions(&[older.clone(), newer.clone()])
        .await
        .unwrap();
    let loaded = repo.load_sessions().await.unwrap();

    assert_eq!(loaded, vec![newer, older]);
}

#[tokio::test]
async fn saving_sessions_replaces_history() {
    let repo = connect("memdb_chat_replace").await;
    repo.save_sessions(&[session("2023-11-14", 0, &["a", "b"])])
        .await
        .unwrap();
    let replacement = session("2023-11-16", 2, &["c"]);
    repo.save_sessions(std::slice::from_ref(&replacement))
        .await
        .unwrap();

    assert_eq!(repo.load_sessions().await.unwrap(), vec![replacement]);

    let orphaned = sqlx::query("SELECT COUNT(*) AS n FROM chat_messages WHERE session_id = ?1")
        .bind("2023-11-14")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    let n: i64 = orphaned.try_get("n").unwrap();
    assert_eq!(n, 0);
}

#[tokio::test]
async fn empty_sessions_and_clear() {
    let repo = connect("memdb_chat_clear").await;
    let empty = ChatSession::new("2023-11-14", fixed_now());
    repo.save_sessions(std::slice::from_ref(&empty)).await.unwrap();
    assert_eq!(repo.load_sessions().await.unwrap(), vec![empty]);

    repo.clear_sessions().await.unwrap();
    assert!(repo.load_sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    let row = sqlx::query("SELECT COUNT(*) AS n FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    let n: i64 = row.try_get("n").unwrap();
    assert_eq!(n, 1);
}

#[tokio::test]
async fn deleting_a_session_removes_its_messages() {
    let repo = connect("memdb_cascade").await;
    repo.save_sessions(&[session("2023-11-14", 0, &["a", "b"])])
        .await
        .unwrap();

    sqlx::query("DELETE FROM chat_sessions WHERE id = ?1")
        .bind("2023-11-14")
        .execute(repo.pool())
        .await
        .unwrap();

    let row = sqlx::query("SELECT COUNT(*) AS n FROM chat_messages")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    let n: i64 = row.try_get("n").unwrap();
    assert_eq!(n, 0);
}

#[tokio::test]
async fn storage_opens_migrated_database() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("open storage");
    storage
        .tasks
        .save_tasks(Stage::FirstDay, &[Task::pending(1, "x")])
        .await
        .unwrap();
    assert!(storage.tasks.load_tasks(Stage::FirstDay).await.unwrap().is_some());
    assert!(storage.chat_history.load_sessions().await.unwrap().is_empty());
}
