use bm_core::{Article, ArticlePatch, ArticleStats, Error, NewArticle, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        url TEXT UNIQUE NOT NULL,
        content TEXT,
        author TEXT,
        published_date TEXT,
        scraped_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    // Add future migrations here
];

/// Single-table article store. Cloning shares the underlying pool; each
/// operation acquires a connection for its own scope and releases it.
#[derive(Clone)]
pub struct ArticleStore {
    pool: SqlitePool,
}

impl ArticleStore {
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Database(format!("Failed to connect to database: {}", e)))?;

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// In-memory store for tests. A :memory: database exists per connection,
    /// so the pool is pinned to a single connection.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| Error::Database(format!("Failed to open in-memory database: {}", e)))?;

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }
        Ok(())
    }

    /// Insert or fully replace the row with this url. A replaced article
    /// gets a fresh id and scraped_at.
    pub async fn upsert(&self, article: &NewArticle) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO articles (title, url, content, author, published_date)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.title)
        .bind(&article.url)
        .bind(&article.content)
        .bind(&article.author)
        .bind(&article.published_date)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to store article: {}", e)))?;

        Ok(())
    }

    /// Plain insert; an existing url is a conflict, not a replace.
    pub async fn create(&self, article: &NewArticle) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO articles (title, url, content, author, published_date)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.title)
        .bind(&article.url)
        .bind(&article.content)
        .bind(&article.author)
        .bind(&article.published_date)
        .execute(&self.pool)
        .await
        .map_err(map_constraint_err)?;

        Ok(result.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> Result<Article> {
        let row = sqlx::query("SELECT * FROM articles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to fetch article: {}", e)))?;

        row.map(|r| row_to_article(&r)).ok_or(Error::NotFound)
    }

    /// Newest first. `offset` only applies when a limit is given.
    pub async fn list(&self, limit: Option<i64>, offset: i64) -> Result<Vec<Article>> {
        let rows = match limit {
            Some(limit) => {
                sqlx::query("SELECT * FROM articles ORDER BY id DESC LIMIT ? OFFSET ?")
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT * FROM articles ORDER BY id DESC")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| Error::Database(format!("Failed to list articles: {}", e)))?;

        Ok(rows.iter().map(row_to_article).collect())
    }

    /// Write only the supplied fields; the rest keep their current values.
    pub async fn update(&self, id: i64, patch: &ArticlePatch) -> Result<()> {
        if patch.is_empty() {
            return Err(Error::Validation("No valid fields to update".to_string()));
        }

        let result = sqlx::query(
            r#"
            UPDATE articles SET
                title = COALESCE(?, title),
                url = COALESCE(?, url),
                content = COALESCE(?, content),
                author = COALESCE(?, author),
                published_date = COALESCE(?, published_date)
            WHERE id = ?
            "#,
        )
        .bind(&patch.title)
        .bind(&patch.url)
        .bind(&patch.content)
        .bind(&patch.author)
        .bind(&patch.published_date)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_constraint_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to delete article: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    pub async fn stats(&self) -> Result<ArticleStats> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to count articles: {}", e)))?;

        let (with_content,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM articles WHERE content IS NOT NULL AND content != ''",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to count articles: {}", e)))?;

        Ok(ArticleStats {
            total_articles: total,
            articles_with_content: with_content,
            articles_without_content: total - with_content,
        })
    }
}

fn map_constraint_err(e: sqlx::Error) -> Error {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::Conflict("Article with this URL already exists".to_string())
        }
        _ => Error::Database(e.to_string()),
    }
}

fn row_to_article(row: &SqliteRow) -> Article {
    Article {
        id: row.get("id"),
        title: row.get("title"),
        url: row.get("url"),
        content: row.get::<Option<String>, _>("content").unwrap_or_default(),
        author: row.get::<Option<String>, _>("author").unwrap_or_default(),
        published_date: row
            .get::<Option<String>, _>("published_date")
            .unwrap_or_default(),
        scraped_at: row.get::<Option<String>, _>("scraped_at").unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample(url: &str, title: &str) -> NewArticle {
        NewArticle {
            title: title.to_string(),
            url: url.to_string(),
            content: String::new(),
            author: String::new(),
            published_date: String::new(),
        }
    }

    #[tokio::test]
    async fn test_open_on_disk() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let store = ArticleStore::open(&db_path).await.unwrap();
        store.upsert(&sample("http://example.com/a", "A")).await.unwrap();
        assert_eq!(store.list(None, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_by_url() {
        let store = ArticleStore::open_in_memory().await.unwrap();

        let mut article = sample("http://example.com/post", "First title");
        article.content = "old content".to_string();
        store.upsert(&article).await.unwrap();

        article.content = "new content".to_string();
        store.upsert(&article).await.unwrap();

        let articles = store.list(None, 0).await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].content, "new content");
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_limits() {
        let store = ArticleStore::open_in_memory().await.unwrap();
        for i in 1..=5 {
            store
                .create(&sample(&format!("http://example.com/{}", i), &format!("Article {}", i)))
                .await
                .unwrap();
        }

        let all = store.list(None, 0).await.unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].title, "Article 5");
        assert_eq!(all[4].title, "Article 1");

        let newest_two = store.list(Some(2), 0).await.unwrap();
        assert_eq!(newest_two.len(), 2);
        assert_eq!(newest_two[0].title, "Article 5");
        assert_eq!(newest_two[1].title, "Article 4");

        let offset = store.list(Some(2), 2).await.unwrap();
        assert_eq!(offset[0].title, "Article 3");
    }

    #[tokio::test]
    async fn test_create_duplicate_url_is_conflict() {
        let store = ArticleStore::open_in_memory().await.unwrap();
        store.create(&sample("http://example.com/dup", "One")).await.unwrap();

        let err = store
            .create(&sample("http://example.com/dup", "Two"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(store.list(None, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_patches_only_given_fields() {
        let store = ArticleStore::open_in_memory().await.unwrap();
        let mut article = sample("http://example.com/p", "Original");
        article.author = "Someone".to_string();
        let id = store.create(&article).await.unwrap();

        let patch = ArticlePatch {
            title: Some("Updated".to_string()),
            ..Default::default()
        };
        store.update(id, &patch).await.unwrap();

        let updated = store.get(id).await.unwrap();
        assert_eq!(updated.title, "Updated");
        assert_eq!(updated.author, "Someone");
        assert_eq!(updated.url, "http://example.com/p");
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let store = ArticleStore::open_in_memory().await.unwrap();
        let patch = ArticlePatch {
            title: Some("Anything".to_string()),
            ..Default::default()
        };
        let err = store.update(42, &patch).await.unwrap_err();
        assert!(matches!(err, Error::NotFound));
        assert!(store.list(None, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_empty_patch_is_validation_error() {
        let store = ArticleStore::open_in_memory().await.unwrap();
        let id = store.create(&sample("http://example.com/q", "Q")).await.unwrap();

        let err = store.update(id, &ArticlePatch::default()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_url_collision_is_conflict() {
        let store = ArticleStore::open_in_memory().await.unwrap();
        store.create(&sample("http://example.com/a", "A")).await.unwrap();
        let id_b = store.create(&sample("http://example.com/b", "B")).await.unwrap();

        let patch = ArticlePatch {
            url: Some("http://example.com/a".to_string()),
            ..Default::default()
        };
        let err = store.update(id_b, &patch).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = ArticleStore::open_in_memory().await.unwrap();
        let id = store.create(&sample("http://example.com/d", "D")).await.unwrap();

        store.delete(id).await.unwrap();
        assert!(matches!(store.get(id).await.unwrap_err(), Error::NotFound));
        assert!(matches!(store.delete(id).await.unwrap_err(), Error::NotFound));
    }

    #[tokio::test]
    async fn test_stats_counts_content() {
        let store = ArticleStore::open_in_memory().await.unwrap();
        let mut with_content = sample("http://example.com/full", "Full");
        with_content.content = "body text".to_string();
        store.create(&with_content).await.unwrap();
        store.create(&sample("http://example.com/empty", "Empty")).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_articles, 2);
        assert_eq!(stats.articles_with_content, 1);
        assert_eq!(stats.articles_without_content, 1);
    }
}
