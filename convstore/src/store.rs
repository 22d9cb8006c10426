//! SQLite-backed Conversation Store Façade (§4.7).
//!
//! Grounded in `loom::user_message::SqliteUserMessageStore` (rusqlite,
//! `spawn_blocking` for blocking calls, one table keyed by thread id) and
//! `loom_workspace::Store` (workspace/thread metadata table design), merged into one
//! façade over `conversations` + `messages` tables. Mutations run under a per-conversation
//! `tokio::sync::Mutex` (§5: "mutated only through the Façade, which performs
//! read-modify-write under a per-conversation mutex; list order is preserved").

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rusqlite::{params, Connection};
use tokio::sync::Mutex;

use core_types::{
    extract_branch, extract_repo_name, normalize_url, BoundRepository, Conversation,
    ConversationId, Message, Mode, Role,
};

use crate::error::ConvStoreError;

/// Conversation Store Façade (§4.7): `create`, `get`, `get_with_messages`,
/// `append_message`, `list_active`, `close`.
pub struct ConversationStore {
    db_path: PathBuf,
    locks: DashMap<ConversationId, Arc<Mutex<()>>>,
}

impl ConversationStore {
    /// Opens (creating if absent) the SQLite database at `path` and ensures its schema.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ConvStoreError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = Connection::open(&db_path).map_err(|e| ConvStoreError::Storage(e.to_string()))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                repo_url TEXT,
                repo_name TEXT,
                repo_branch TEXT,
                mode TEXT NOT NULL,
                active INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                last_activity TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                conversation_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_messages_conversation_id ON messages(conversation_id);
            "#,
        )
        .map_err(|e| ConvStoreError::Storage(e.to_string()))?;
        Ok(Self {
            db_path,
            locks: DashMap::new(),
        })
    }

    fn lock_for(&self, id: &str) -> Arc<Mutex<()>> {
        Arc::clone(
            self.locks
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    fn open_conn(&self) -> Result<Connection, ConvStoreError> {
        Connection::open(&self.db_path).map_err(|e| ConvStoreError::Storage(e.to_string()))
    }

    /// Creates a conversation bound to `repo_url` (normalized per §4.4), acknowledging
    /// synchronously (§4.9).
    pub async fn create(
        &self,
        id: impl Into<String>,
        user_id: impl Into<String>,
        repo_url: Option<String>,
        branch: Option<String>,
        mode: Mode,
    ) -> Result<Conversation, ConvStoreError> {
        let id = id.into();
        let user_id = user_id.into();
        let now = Utc::now();
        let repository = repo_url.map(|url| {
            let normalized = normalize_url(&url);
            let name = extract_repo_name(&normalized);
            let branch = branch.unwrap_or_else(|| extract_branch(&url));
            BoundRepository {
                url: normalized,
                name,
                branch,
            }
        });
        let conversation = Conversation::new(id, user_id, repository, mode, now);

        let db_path = self.db_path.clone();
        let row = conversation.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path).map_err(|e| ConvStoreError::Storage(e.to_string()))?;
            insert_conversation(&conn, &row)
        })
        .await
        .map_err(|e| ConvStoreError::Storage(e.to_string()))??;

        Ok(conversation)
    }

    /// Loads conversation metadata without messages.
    pub async fn get(&self, id: &str) -> Result<Conversation, ConvStoreError> {
        let db_path = self.db_path.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path).map_err(|e| ConvStoreError::Storage(e.to_string()))?;
            select_conversation(&conn, &id)
        })
        .await
        .map_err(|e| ConvStoreError::Storage(e.to_string()))?
    }

    /// Loads conversation metadata plus its full, ordered message history.
    pub async fn get_with_messages(&self, id: &str) -> Result<Conversation, ConvStoreError> {
        let mut conversation = self.get(id).await?;
        let db_path = self.db_path.clone();
        let conv_id = id.to_string();
        let messages = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path).map_err(|e| ConvStoreError::Storage(e.to_string()))?;
            select_messages(&conn, &conv_id)
        })
        .await
        .map_err(|e| ConvStoreError::Storage(e.to_string()))??;
        conversation.messages = messages;
        Ok(conversation)
    }

    /// Appends a message, refusing if the conversation is closed (§3 invariant); updates
    /// `last_activity` (§4.7). Serialized per conversation (§5).
    pub async fn append_message(
        &self,
        id: &str,
        role: Role,
        content: impl Into<String>,
    ) -> Result<Message, ConvStoreError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let mut conversation = self.get(id).await?;
        let now = Utc::now();
        conversation.append_message(role, content, now)?;
        let message = conversation.messages.last().unwrap().clone();

        let db_path = self.db_path.clone();
        let conv_id = id.to_string();
        let last_activity = conversation.last_activity;
        let message_row = message.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path).map_err(|e| ConvStoreError::Storage(e.to_string()))?;
            insert_message(&conn, &conv_id, &message_row)?;
            touch_last_activity(&conn, &conv_id, last_activity)
        })
        .await
        .map_err(|e| ConvStoreError::Storage(e.to_string()))??;

        Ok(message)
    }

    /// Lists active conversations for `user_id`, metadata only.
    pub async fn list_active(&self, user_id: &str) -> Result<Vec<Conversation>, ConvStoreError> {
        let db_path = self.db_path.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path).map_err(|e| ConvStoreError::Storage(e.to_string()))?;
            select_active_for_user(&conn, &user_id)
        })
        .await
        .map_err(|e| ConvStoreError::Storage(e.to_string()))?
    }

    /// Closes a conversation (§4.7, §4.9 `DELETE`). Serialized per conversation (§5).
    pub async fn close(&self, id: &str) -> Result<(), ConvStoreError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        // Confirms existence so callers get `NotFound` rather than a silent no-op.
        self.get(id).await?;

        let db_path = self.db_path.clone();
        let conv_id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path).map_err(|e| ConvStoreError::Storage(e.to_string()))?;
            conn.execute(
                "UPDATE conversations SET active = 0 WHERE id = ?1",
                params![conv_id],
            )
            .map_err(|e| ConvStoreError::Storage(e.to_string()))?;
            Ok::<(), ConvStoreError>(())
        })
        .await
        .map_err(|e| ConvStoreError::Storage(e.to_string()))??;
        Ok(())
    }
}

fn insert_conversation(conn: &Connection, conversation: &Conversation) -> Result<(), ConvStoreError> {
    let (repo_url, repo_name, repo_branch) = match &conversation.repository {
        Some(r) => (Some(r.url.clone()), Some(r.name.clone()), Some(r.branch.clone())),
        None => (None, None, None),
    };
    conn.execute(
        "INSERT INTO conversations (id, user_id, repo_url, repo_name, repo_branch, mode, active, created_at, last_activity)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            conversation.id,
            conversation.user_id,
            repo_url,
            repo_name,
            repo_branch,
            mode_to_str(conversation.mode),
            conversation.active as i64,
            conversation.created_at.to_rfc3339(),
            conversation.last_activity.to_rfc3339(),
        ],
    )
    .map_err(|e| ConvStoreError::Storage(e.to_string()))?;
    Ok(())
}

fn select_conversation(conn: &Connection, id: &str) -> Result<Conversation, ConvStoreError> {
    conn.query_row(
        "SELECT id, user_id, repo_url, repo_name, repo_branch, mode, active, created_at, last_activity
         FROM conversations WHERE id = ?1",
        params![id],
        |row| {
            let repo_url: Option<String> = row.get(2)?;
            let repo_name: Option<String> = row.get(3)?;
            let repo_branch: Option<String> = row.get(4)?;
            let mode: String = row.get(5)?;
            let active: i64 = row.get(6)?;
            let created_at: String = row.get(7)?;
            let last_activity: String = row.get(8)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                repo_url,
                repo_name,
                repo_branch,
                mode,
                active != 0,
                created_at,
                last_activity,
            ))
        },
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => ConvStoreError::NotFound(id.to_string()),
        other => ConvStoreError::Storage(other.to_string()),
    })
    .map(
        |(cid, user_id, repo_url, repo_name, repo_branch, mode, active, created_at, last_activity)| {
            let repository = match (repo_url, repo_name, repo_branch) {
                (Some(url), Some(name), Some(branch)) => Some(BoundRepository { url, name, branch }),
                _ => None,
            };
            Conversation {
                id: cid,
                user_id,
                repository,
                mode: Mode::from_str(&mode).unwrap_or_default(),
                active,
                created_at: parse_rfc3339(&created_at),
                last_activity: parse_rfc3339(&last_activity),
                messages: Vec::new(),
            }
        },
    )
}

fn select_active_for_user(conn: &Connection, user_id: &str) -> Result<Vec<Conversation>, ConvStoreError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, user_id, repo_url, repo_name, repo_branch, mode, active, created_at, last_activity
             FROM conversations WHERE user_id = ?1 AND active = 1 ORDER BY last_activity DESC",
        )
        .map_err(|e| ConvStoreError::Storage(e.to_string()))?;
    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, i64>(6)? != 0,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
            ))
        })
        .map_err(|e| ConvStoreError::Storage(e.to_string()))?;
    let mut out = Vec::new();
    for row in rows {
        let (cid, user_id, repo_url, repo_name, repo_branch, mode, active, created_at, last_activity) =
            row.map_err(|e| ConvStoreError::Storage(e.to_string()))?;
        let repository = match (repo_url, repo_name, repo_branch) {
            (Some(url), Some(name), Some(branch)) => Some(BoundRepository { url, name, branch }),
            _ => None,
        };
        out.push(Conversation {
            id: cid,
            user_id,
            repository,
            mode: Mode::from_str(&mode).unwrap_or_default(),
            active,
            created_at: parse_rfc3339(&created_at),
            last_activity: parse_rfc3339(&last_activity),
            messages: Vec::new(),
        });
    }
    Ok(out)
}

fn select_messages(conn: &Connection, conversation_id: &str) -> Result<Vec<Message>, ConvStoreError> {
    let mut stmt = conn
        .prepare(
            "SELECT role, content, timestamp FROM messages WHERE conversation_id = ?1 ORDER BY id ASC",
        )
        .map_err(|e| ConvStoreError::Storage(e.to_string()))?;
    let rows = stmt
        .query_map(params![conversation_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .map_err(|e| ConvStoreError::Storage(e.to_string()))?;
    let mut out = Vec::new();
    for row in rows {
        let (role, content, timestamp) = row.map_err(|e| ConvStoreError::Storage(e.to_string()))?;
        out.push(Message::new(role_from_str(&role), content, parse_rfc3339(&timestamp)));
    }
    Ok(out)
}

fn insert_message(conn: &Connection, conversation_id: &str, message: &Message) -> Result<(), ConvStoreError> {
    conn.execute(
        "INSERT INTO messages (conversation_id, role, content, timestamp) VALUES (?1, ?2, ?3, ?4)",
        params![
            conversation_id,
            role_to_str(message.role),
            message.content,
            message.timestamp.to_rfc3339(),
        ],
    )
    .map_err(|e| ConvStoreError::Storage(e.to_string()))?;
    Ok(())
}

fn touch_last_activity(
    conn: &Connection,
    conversation_id: &str,
    last_activity: DateTime<Utc>,
) -> Result<(), ConvStoreError> {
    conn.execute(
        "UPDATE conversations SET last_activity = ?1 WHERE id = ?2",
        params![last_activity.to_rfc3339(), conversation_id],
    )
    .map_err(|e| ConvStoreError::Storage(e.to_string()))?;
    Ok(())
}

fn mode_to_str(mode: Mode) -> &'static str {
    match mode {
        Mode::Explore => "explore",
        Mode::Debug => "debug",
        Mode::Implement => "implement",
        Mode::Review => "review",
    }
}

fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn role_from_str(s: &str) -> Role {
    match s {
        "assistant" => Role::Assistant,
        _ => Role::User,
    }
}

fn parse_rfc3339(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    async fn store() -> ConversationStore {
        let file = NamedTempFile::new().unwrap();
        ConversationStore::new(file.path()).unwrap()
    }

    #[tokio::test]
    async fn create_then_get_round_trips_normalized_url() {
        let store = store().await;
        store
            .create(
                "c1",
                "u1",
                Some("https://github.com/acme/pay/tree/main".to_string()),
                None,
                Mode::Explore,
            )
            .await
            .unwrap();
        let conv = store.get("c1").await.unwrap();
        assert_eq!(conv.repository.unwrap().url, "https://github.com/acme/pay");
    }

    #[tokio::test]
    async fn append_message_persists_and_orders() {
        let store = store().await;
        store.create("c1", "u1", None, None, Mode::Explore).await.unwrap();
        store.append_message("c1", Role::User, "hi").await.unwrap();
        store
            .append_message("c1", Role::Assistant, "hello")
            .await
            .unwrap();
        let conv = store.get_with_messages("c1").await.unwrap();
        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[0].content, "hi");
        assert_eq!(conv.messages[1].content, "hello");
    }

    #[tokio::test]
    async fn closed_conversation_rejects_append() {
        let store = store().await;
        store.create("c1", "u1", None, None, Mode::Explore).await.unwrap();
        store.close("c1").await.unwrap();
        let err = store.append_message("c1", Role::User, "hi").await.unwrap_err();
        assert!(matches!(err, ConvStoreError::Closed(_)));
    }

    #[tokio::test]
    async fn unknown_conversation_is_not_found() {
        let store = store().await;
        let err = store.get("missing").await.unwrap_err();
        assert!(matches!(err, ConvStoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_active_excludes_closed() {
        let store = store().await;
        store.create("c1", "u1", None, None, Mode::Explore).await.unwrap();
        store.create("c2", "u1", None, None, Mode::Explore).await.unwrap();
        store.close("c2").await.unwrap();
        let active = store.list_active("u1").await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "c1");
    }
}
