pub mod entities;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteArguments, SqliteConnection, SqlitePool, SqliteRow};
use sqlx::{Column, Connection, Row, Sqlite, TypeInfo, ValueRef};
use tracing::debug;

use crate::error::QueryError;
use chrono::Utc;

use crate::util::from_unix;
use entities::{
    ChannelRecord, ColumnSchema, GuildRecord, MessageRecord, StoredMessage, TableSchema, UserRecord,
};

pub const MAX_QUERY_ROWS: usize = 100;

lazy_static! {
    static ref NAMED_PARAMETER: Regex = Regex::new(r"[:@$]([A-Za-z_][A-Za-z0-9_]*)").unwrap();
}

type AdHocQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Named value for a parameter of an ad-hoc query.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SqlParameter {
    pub name: String,
    pub value: Value,
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePool::connect(database_url).await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        Self::setup_tables(&pool).await?;
        Ok(Database { pool })
    }

    async fn setup_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS guilds (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                created_on INTEGER NOT NULL,
                modified_on INTEGER
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS channels (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                guild_id INTEGER NOT NULL REFERENCES guilds(id),
                created_on INTEGER NOT NULL,
                modified_on INTEGER
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL,
                discriminator INTEGER,
                created_on INTEGER NOT NULL,
                modified_on INTEGER
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS guild_users (
                guild_id INTEGER NOT NULL REFERENCES guilds(id),
                user_id INTEGER NOT NULL REFERENCES users(id),
                created_on INTEGER NOT NULL,
                PRIMARY KEY (guild_id, user_id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS channel_users (
                channel_id INTEGER NOT NULL REFERENCES channels(id),
                user_id INTEGER NOT NULL REFERENCES users(id),
                created_on INTEGER NOT NULL,
                PRIMARY KEY (channel_id, user_id)
            )
            "#,
            // referenced messages may predate the bot, so no foreign key there
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY,
                content TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                is_edited INTEGER NOT NULL DEFAULT 0,
                edited_timestamp INTEGER,
                author_id INTEGER NOT NULL REFERENCES users(id),
                channel_id INTEGER NOT NULL REFERENCES channels(id),
                referenced_message_id INTEGER,
                created_on INTEGER NOT NULL,
                modified_on INTEGER
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_messages_timestamp ON messages (timestamp)",
            "CREATE INDEX IF NOT EXISTS idx_messages_channel ON messages (channel_id)",
        ];

        for statement in statements {
            sqlx::query(statement).execute(pool).await?;
        }

        Ok(())
    }

    /// Stores a message together with everything it hangs off, in one transaction.
    /// A message id seen before is left untouched. Rows get `created_on` when
    /// inserted and `modified_on` when an upsert updates them.
    pub async fn add_with_dependencies(
        &self,
        guild: &GuildRecord,
        channel: &ChannelRecord,
        user: &UserRecord,
        message: &MessageRecord,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO guilds (id, name, created_on) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, modified_on = ?3",
        )
        .bind(guild.id as i64)
        .bind(&guild.name)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO channels (id, name, guild_id, created_on) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name,
                                           guild_id = excluded.guild_id,
                                           modified_on = ?4",
        )
        .bind(channel.id as i64)
        .bind(&channel.name)
        .bind(channel.guild_id as i64)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO users (id, username, discriminator, created_on) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET username = excluded.username,
                                           discriminator = excluded.discriminator,
                                           modified_on = ?4",
        )
        .bind(user.id as i64)
        .bind(&user.username)
        .bind(user.discriminator.map(i64::from))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT OR IGNORE INTO guild_users (guild_id, user_id, created_on) VALUES (?, ?, ?)")
            .bind(guild.id as i64)
            .bind(user.id as i64)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT OR IGNORE INTO channel_users (channel_id, user_id, created_on) VALUES (?, ?, ?)")
            .bind(channel.id as i64)
            .bind(user.id as i64)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO messages
                (id, content, timestamp, is_edited, edited_timestamp, author_id, channel_id,
                 referenced_message_id, created_on)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(message.id as i64)
        .bind(&message.content)
        .bind(message.timestamp.timestamp())
        .bind(message.is_edited())
        .bind(message.edited_timestamp.map(|t| t.timestamp()))
        .bind(message.author_id as i64)
        .bind(message.channel_id as i64)
        .bind(message.referenced_message_id.map(|id| id as i64))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        if inserted.rows_affected() == 0 {
            debug!("Message {} was already stored", message.id);
        }

        Ok(())
    }

    pub async fn first_messages(&self, count: u32) -> Result<Vec<StoredMessage>, sqlx::Error> {
        self.ordered_messages("ASC", count).await
    }

    /// Newest first.
    pub async fn last_messages(&self, count: u32) -> Result<Vec<StoredMessage>, sqlx::Error> {
        self.ordered_messages("DESC", count).await
    }

    async fn ordered_messages(&self, order: &str, count: u32) -> Result<Vec<StoredMessage>, sqlx::Error> {
        let query = format!(
            "SELECT m.id, m.content, m.timestamp, m.author_id, u.username
             FROM messages m JOIN users u ON u.id = m.author_id
             ORDER BY m.timestamp {order}, m.id {order}
             LIMIT ?"
        );

        let rows = sqlx::query(&query)
            .bind(i64::from(count))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(stored_message).collect())
    }

    /// Messages containing `needle`, oldest first. A blank needle matches nothing.
    pub async fn matching_messages(&self, needle: &str) -> Result<Vec<StoredMessage>, sqlx::Error> {
        let needle = needle.trim();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            "SELECT m.id, m.content, m.timestamp, m.author_id, u.username
             FROM messages m JOIN users u ON u.id = m.author_id
             WHERE m.content LIKE '%' || ? || '%'
             ORDER BY m.timestamp ASC, m.id ASC",
        )
        .bind(needle)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(stored_message).collect())
    }

    pub async fn schema(&self) -> Result<Vec<TableSchema>, sqlx::Error> {
        let tables = sqlx::query(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut schema = Vec::with_capacity(tables.len());
        for table in tables {
            let name: String = table.get("name");
            let columns = sqlx::query(&format!("PRAGMA table_info(\"{name}\")"))
                .fetch_all(&self.pool)
                .await?
                .iter()
                .map(|column| ColumnSchema {
                    name: column.get("name"),
                    data_type: column.get("type"),
                    nullable: column.get::<i64, _>("notnull") == 0,
                    primary_key: column.get::<i64, _>("pk") > 0,
                })
                .collect();

            schema.push(TableSchema { name, columns });
        }

        Ok(schema)
    }

    /// Runs a single read-only statement and returns up to [`MAX_QUERY_ROWS`]
    /// rows as JSON objects. The connection is switched to `query_only` for the
    /// duration and nothing the statement does is committed.
    pub async fn execute_read_only(
        &self,
        query: &str,
        parameters: &[SqlParameter],
    ) -> Result<Vec<Map<String, Value>>, QueryError> {
        let statement = validate_read_only(query)?;
        let (numbered, names) = number_parameters(statement);

        let mut bound = sqlx::query(&numbered);
        for name in names {
            let value = parameters
                .iter()
                .find(|p| p.name.trim_start_matches([':', '@', '$']) == name)
                .map(|p| p.value.clone())
                .ok_or_else(|| QueryError::MissingParameter(name.clone()))?;

            bound = match value {
                Value::Null => bound.bind(None::<String>),
                Value::Bool(b) => bound.bind(b),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => bound.bind(i),
                    None => bound.bind(n.as_f64().unwrap_or_default()),
                },
                Value::String(s) => bound.bind(s),
                other => bound.bind(other.to_string()),
            };
        }

        let mut conn = self.pool.acquire().await?;
        sqlx::query("PRAGMA query_only = ON").execute(&mut *conn).await?;
        let rows = fetch_rolled_back(&mut conn, bound).await;
        sqlx::query("PRAGMA query_only = OFF").execute(&mut *conn).await?;

        Ok(rows?.iter().take(MAX_QUERY_ROWS).map(row_to_json).collect())
    }
}

async fn fetch_rolled_back(conn: &mut SqliteConnection, query: AdHocQuery<'_>) -> Result<Vec<SqliteRow>, sqlx::Error> {
    let mut tx = conn.begin().await?;
    let rows = query.fetch_all(&mut *tx).await?;
    tx.rollback().await?;
    Ok(rows)
}

fn stored_message(row: &SqliteRow) -> StoredMessage {
    StoredMessage {
        id: row.get::<i64, _>("id") as u64,
        content: row.get("content"),
        timestamp: from_unix(row.get("timestamp")),
        author_id: row.get::<i64, _>("author_id") as u64,
        username: row.get("username"),
    }
}

fn row_to_json(row: &SqliteRow) -> Map<String, Value> {
    let mut object = Map::new();

    for column in row.columns() {
        let index = column.ordinal();
        let value = match row.try_get_raw(index) {
            Ok(raw) if raw.is_null() => Value::Null,
            Ok(raw) => match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => row.try_get::<i64, _>(index).map(Value::from).unwrap_or(Value::Null),
                "REAL" => row.try_get::<f64, _>(index).map(Value::from).unwrap_or(Value::Null),
                "BLOB" => row
                    .try_get::<Vec<u8>, _>(index)
                    .map(|bytes| Value::from(format!("<{} bytes>", bytes.len())))
                    .unwrap_or(Value::Null),
                _ => row
                    .try_get::<String, _>(index)
                    .map(Value::from)
                    .or_else(|_| row.try_get::<i64, _>(index).map(Value::from))
                    .or_else(|_| row.try_get::<f64, _>(index).map(Value::from))
                    .unwrap_or(Value::Null),
            },
            Err(_) => Value::Null,
        };

        object.insert(column.name().to_string(), value);
    }

    object
}

/// Copy of `query` with the contents of quoted literals and identifiers
/// blanked out. Byte offsets are unchanged.
fn mask_quoted(query: &str) -> String {
    let mut masked = String::with_capacity(query.len());
    let mut quote: Option<char> = None;

    for c in query.chars() {
        match quote {
            Some(q) if c == q => {
                quote = None;
                masked.push(c);
            }
            Some(_) => masked.extend(std::iter::repeat(' ').take(c.len_utf8())),
            None => {
                if matches!(c, '\'' | '"' | '`') {
                    quote = Some(c);
                }
                masked.push(c);
            }
        }
    }

    masked
}

/// Accepts exactly one `SELECT`, `WITH` or `PRAGMA` statement (a trailing `;` is fine)
/// and returns it without the terminator. Writes hidden inside a `SELECT` or
/// `WITH` are stopped by SQLite itself, see [`Database::execute_read_only`].
pub fn validate_read_only(query: &str) -> Result<&str, QueryError> {
    let statement = query.trim().trim_end_matches(';').trim_end();
    let masked = mask_quoted(statement);

    if statement.is_empty() || masked.contains(';') {
        return Err(QueryError::NotReadOnly);
    }

    let keyword = statement
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();

    let read_only = match keyword.as_str() {
        "SELECT" | "WITH" => true,
        "PRAGMA" => !masked.contains('='),
        _ => false,
    };

    if read_only {
        Ok(statement)
    } else {
        Err(QueryError::NotReadOnly)
    }
}

/// Rewrites `:name`, `@name` and `$name` placeholders outside quotes to `?N`,
/// numbering distinct names by first appearance. Returns the rewritten
/// statement and the names in binding order.
pub fn number_parameters(statement: &str) -> (String, Vec<String>) {
    let masked = mask_quoted(statement);
    let mut names: Vec<String> = Vec::new();
    let mut numbered = String::with_capacity(statement.len());
    let mut copied = 0;

    for capture in NAMED_PARAMETER.captures_iter(&masked) {
        let Some(placeholder) = capture.get(0) else {
            continue;
        };
        let name = &capture[1];

        let index = match names.iter().position(|n| n == name) {
            Some(position) => position + 1,
            None => {
                names.push(name.to_string());
                names.len()
            }
        };

        numbered.push_str(&statement[copied..placeholder.start()]);
        numbered.push_str(&format!("?{index}"));
        copied = placeholder.end();
    }
    numbered.push_str(&statement[copied..]);

    (numbered, names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_db() -> Database {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        Database::from_pool(pool).await.unwrap()
    }

    fn guild() -> GuildRecord {
        GuildRecord { id: 1, name: "guild".into() }
    }

    fn channel() -> ChannelRecord {
        ChannelRecord { id: 10, name: "general".into(), guild_id: 1 }
    }

    fn user(id: u64, name: &str) -> UserRecord {
        UserRecord { id, username: name.into(), discriminator: None }
    }

    fn message(id: u64, author_id: u64, content: &str, secs: i64) -> MessageRecord {
        MessageRecord {
            id,
            content: content.into(),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            edited_timestamp: None,
            author_id,
            channel_id: 10,
            referenced_message_id: None,
        }
    }

    async fn seeded() -> Database {
        let db = memory_db().await;
        let alice = user(100, "alice");
        let bob = user(200, "bob");

        db.add_with_dependencies(&guild(), &channel(), &alice, &message(1, 100, "hello there", 1_000))
            .await
            .unwrap();
        db.add_with_dependencies(&guild(), &channel(), &bob, &message(2, 200, "general kenobi", 2_000))
            .await
            .unwrap();
        db.add_with_dependencies(&guild(), &channel(), &alice, &message(3, 100, "hello again", 3_000))
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn first_and_last_messages_are_ordered_by_time() {
        let db = seeded().await;

        let first = db.first_messages(2).await.unwrap();
        assert_eq!(first.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(first[1].username, "bob");

        let last = db.last_messages(2).await.unwrap();
        assert_eq!(last.iter().map(|m| m.id).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[tokio::test]
    async fn duplicate_messages_are_ignored_and_users_updated() {
        let db = seeded().await;

        let renamed = user(100, "alicia");
        db.add_with_dependencies(&guild(), &channel(), &renamed, &message(1, 100, "changed", 1_000))
            .await
            .unwrap();

        let first = db.first_messages(1).await.unwrap();
        assert_eq!(first[0].content, "hello there");
        assert_eq!(first[0].username, "alicia");
        assert_eq!(db.last_messages(10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn upserts_stamp_modified_on() {
        let db = memory_db().await;
        let alice = user(100, "alice");
        db.add_with_dependencies(&guild(), &channel(), &alice, &message(1, 100, "hello", 1_000))
            .await
            .unwrap();

        let (created, modified): (i64, Option<i64>) =
            sqlx::query_as("SELECT created_on, modified_on FROM users WHERE id = 100")
                .fetch_one(&db.pool)
                .await
                .unwrap();
        assert!(created > 0);
        assert_eq!(modified, None);

        db.add_with_dependencies(&guild(), &channel(), &user(100, "alicia"), &message(2, 100, "again", 2_000))
            .await
            .unwrap();

        for table in ["guilds", "channels", "users"] {
            let (again, modified): (i64, Option<i64>) =
                sqlx::query_as(&format!("SELECT created_on, modified_on FROM {table} LIMIT 1"))
                    .fetch_one(&db.pool)
                    .await
                    .unwrap();
            assert_eq!(again, created, "{table}");
            assert!(modified.is_some_and(|m| m >= created), "{table}");
        }

        let (message_created, message_modified): (i64, Option<i64>) =
            sqlx::query_as("SELECT created_on, modified_on FROM messages WHERE id = 2")
                .fetch_one(&db.pool)
                .await
                .unwrap();
        assert!(message_created >= created);
        assert_eq!(message_modified, None);
    }

    #[tokio::test]
    async fn referenced_message_may_be_unknown() {
        let db = memory_db().await;
        let mut reply = message(5, 100, "replying", 10);
        reply.referenced_message_id = Some(999);

        db.add_with_dependencies(&guild(), &channel(), &user(100, "alice"), &reply)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn finds_messages_by_substring() {
        let db = seeded().await;

        let found = db.matching_messages("hello").await.unwrap();
        assert_eq!(found.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 3]);
        assert!(db.matching_messages("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn schema_lists_tables_and_columns() {
        let db = memory_db().await;
        let schema = db.schema().await.unwrap();

        let names: Vec<_> = schema.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["channel_users", "channels", "guild_users", "guilds", "messages", "users"]);

        let messages = schema.iter().find(|t| t.name == "messages").unwrap();
        let id = messages.columns.iter().find(|c| c.name == "id").unwrap();
        assert!(id.primary_key);
        let edited = messages.columns.iter().find(|c| c.name == "edited_timestamp").unwrap();
        assert!(edited.nullable);

        for table in ["guilds", "channels", "users", "messages"] {
            let columns = &schema.iter().find(|t| t.name == table).unwrap().columns;
            assert!(columns.iter().any(|c| c.name == "created_on" && !c.nullable), "{table}");
            assert!(columns.iter().any(|c| c.name == "modified_on" && c.nullable), "{table}");
        }
    }

    #[tokio::test]
    async fn executes_parameterized_select() {
        let db = seeded().await;
        let params = vec![
            SqlParameter { name: "@author".into(), value: Value::from(100) },
            SqlParameter { name: "needle".into(), value: Value::from("%again%") },
        ];

        let rows = db
            .execute_read_only(
                "SELECT id, content FROM messages WHERE author_id = @author AND content LIKE @needle;",
                &params,
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], Value::from(3));
        assert_eq!(rows[0]["content"], Value::from("hello again"));
    }

    #[tokio::test]
    async fn missing_parameter_is_reported() {
        let db = seeded().await;
        let err = db
            .execute_read_only("SELECT * FROM users WHERE id = :id", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::MissingParameter(name) if name == "id"));
    }

    #[tokio::test]
    async fn reused_parameter_binds_once() {
        let db = seeded().await;
        let params = vec![SqlParameter { name: "a".into(), value: Value::from(41) }];

        let rows = db
            .execute_read_only("SELECT @a + 1 AS n, @a AS a", &params)
            .await
            .unwrap();

        assert_eq!(rows[0]["n"], Value::from(42));
        assert_eq!(rows[0]["a"], Value::from(41));
    }

    #[tokio::test]
    async fn literals_and_function_names_are_not_mistaken_for_writes() {
        let db = seeded().await;

        let rows = db
            .execute_read_only("SELECT replace('ab', 'a', 'c') AS r, 'x@y.com' = 'x@y.com' AS same", &[])
            .await
            .unwrap();
        assert_eq!(rows[0]["r"], Value::from("cb"));
        assert_eq!(rows[0]["same"], Value::from(1));

        let rows = db
            .execute_read_only("SELECT id FROM messages WHERE content LIKE '%update%'", &[])
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn write_statements_are_rejected() {
        let db = seeded().await;
        let err = db.execute_read_only("DELETE FROM messages", &[]).await.unwrap_err();
        assert!(matches!(err, QueryError::NotReadOnly));

        let err = db
            .execute_read_only("WITH x AS (SELECT 1) DELETE FROM messages", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::Sql(_)));

        assert_eq!(db.last_messages(10).await.unwrap().len(), 3);

        // the connection is writable again afterwards
        db.add_with_dependencies(&guild(), &channel(), &user(100, "alice"), &message(4, 100, "still here", 4_000))
            .await
            .unwrap();
        assert_eq!(db.last_messages(10).await.unwrap().len(), 4);
    }

    #[test]
    fn read_only_validation() {
        assert_eq!(validate_read_only(" select 1 ; ").unwrap(), "select 1");
        assert!(validate_read_only("PRAGMA table_info(users)").is_ok());
        assert!(validate_read_only("WITH x AS (SELECT 1) SELECT * FROM x").is_ok());

        assert!(validate_read_only("SELECT 1; DROP TABLE users").is_err());
        assert!(validate_read_only("PRAGMA foreign_keys = OFF").is_err());
        assert!(validate_read_only("SELECT 'a;b'").is_ok());
        assert!(validate_read_only("UPDATE users SET username = 'x'").is_err());
        assert!(validate_read_only("").is_err());
    }

    #[test]
    fn parameters_are_numbered_by_first_appearance() {
        let (numbered, names) = number_parameters("SELECT * FROM t WHERE a = @b OR c = :a OR d = @b OR e = $z");
        assert_eq!(numbered, "SELECT * FROM t WHERE a = ?1 OR c = ?2 OR d = ?1 OR e = ?3");
        assert_eq!(names, vec!["b", "a", "z"]);
    }

    #[test]
    fn quoted_text_keeps_its_placeholders() {
        let (numbered, names) = number_parameters("SELECT '12:30', \"@col\", 'x@y.com' WHERE id = :id");
        assert_eq!(numbered, "SELECT '12:30', \"@col\", 'x@y.com' WHERE id = ?1");
        assert_eq!(names, vec!["id"]);
    }
}
