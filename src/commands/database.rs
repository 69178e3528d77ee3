use anyhow::Result;

use super::Reply;
use crate::storage::entities::TableSchema;
use crate::storage::Database;

pub fn schema_block(schema: &[TableSchema]) -> Result<String> {
    Ok(format!("```json\n{}\n```", serde_json::to_string_pretty(schema)?))
}

/// `db get <what>`. Only the schema can be fetched.
pub async fn run(database: &Database, args: &[String]) -> Result<Reply> {
    match args.first().map(|a| a.to_lowercase()).as_deref() {
        Some("schema") => {
            let schema = database.schema().await?;
            Ok(Reply::Text(schema_block(&schema)?))
        }
        _ => Ok(Reply::text("Unknown argument for sub-command \"get\"")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn database() -> Database {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        Database::from_pool(pool).await.unwrap()
    }

    #[tokio::test]
    async fn schema_is_a_json_code_block() {
        let db = database().await;

        let Reply::Text(text) = run(&db, &["schema".to_string()]).await.unwrap() else {
            panic!("expected text");
        };
        assert!(text.starts_with("```json\n["));
        assert!(text.ends_with("]\n```"));
        assert!(text.contains("\"messages\""));
    }

    #[tokio::test]
    async fn other_arguments_are_rejected() {
        let db = database().await;

        let Reply::Text(text) = run(&db, &["tables".to_string()]).await.unwrap() else {
            panic!("expected text");
        };
        assert_eq!(text, "Unknown argument for sub-command \"get\"");
    }
}
