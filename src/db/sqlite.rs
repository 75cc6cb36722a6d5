use rusqlite::{params, OptionalExtension, TransactionBehavior};
use log::debug;
use super::entities::*;
use super::mappers::map_article;
use super::{helpers, not_found, slug_conflict, ArticleStore, Pool, StoreError, StoreResult};

const ARTICLE_FIELDS: &str =
  "id, title, slug, meta_description, image_url, content, date, author";

// Slug uniqueness is the index's job, two connections
// racing on the same slug get a constraint violation
// which becomes a Conflict.
const SCHEMA: &str = "
  CREATE TABLE IF NOT EXISTS articles (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    slug TEXT NOT NULL,
    meta_description TEXT NOT NULL,
    image_url TEXT NOT NULL,
    content TEXT NOT NULL,
    date INTEGER NOT NULL,
    author TEXT NOT NULL
  );
  CREATE UNIQUE INDEX IF NOT EXISTS articles_slug_idx ON articles (slug);
";

/**
 * SQLite store through the same r2d2 pool as always.
 * Dates are saved as UNIX timestamps in seconds.
 */
pub struct SqliteStore {
  pool: Pool,
  default_author: String
}

impl SqliteStore {

  pub fn open(pool: Pool, default_author: &str) -> StoreResult<Self> {
    let conn = pool.get()?;
    conn.execute_batch(SCHEMA)?;
    Ok(Self {
      pool,
      default_author: default_author.to_string()
    })
  }

  fn select_one(&self, where_clause: &str, value: &str) -> StoreResult<Option<Article>> {
    let conn = self.pool.get()?;
    let mut stmt = conn.prepare(&format!(
      "SELECT {} FROM articles WHERE {} = ?",
      ARTICLE_FIELDS,
      where_clause
    ))?;
    let article = stmt.query_row(params![value], map_article).optional()?;
    Ok(article)
  }

  fn insert(&self, article: Article) -> StoreResult<Article> {
    let conn = self.pool.get()?;
    conn.execute(
      &format!(
        "INSERT INTO articles ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        ARTICLE_FIELDS
      ),
      params![
        article.id,
        article.title,
        article.slug,
        article.meta_description,
        article.image_url,
        article.content,
        article.date.timestamp(),
        article.author
      ]
    ).map_err(|e| match StoreError::from(e) {
      // The index doesn't tell us which value collided.
      StoreError::Conflict(_) => slug_conflict(&article.slug),
      other => other
    })?;
    debug!("Inserted article {} ({})", article.id, article.slug);
    Ok(article)
  }

}

impl ArticleStore for SqliteStore {

  fn list(&self) -> StoreResult<Vec<Article>> {
    let conn = self.pool.get()?;
    // rowid keeps insertion order for articles sharing
    // the same date.
    let mut stmt = conn.prepare(&format!(
      "SELECT {} FROM articles ORDER BY date DESC, rowid ASC",
      ARTICLE_FIELDS
    ))?;
    let articles = stmt.query_map([], map_article)?
      .collect::<Result<Vec<Article>, rusqlite::Error>>()?;
    Ok(articles)
  }

  fn get(&self, id_or_slug: &str) -> StoreResult<Article> {
    match self.select_one("id", id_or_slug)? {
      Some(article) => Ok(article),
      None => self.select_one("slug", id_or_slug)?
        .ok_or_else(|| not_found(id_or_slug))
    }
  }

  fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Article>> {
    self.select_one("slug", slug)
  }

  fn create(&self, new_article: NewArticle) -> StoreResult<Article> {
    let article = helpers::build_article(new_article, &self.default_author)?;
    self.insert(article)
  }

  fn update(&self, id: &str, update: ArticleUpdate) -> StoreResult<Article> {
    let mut conn = self.pool.get()?;
    // Immediate so that the read and the write below can't
    // interleave with another writer.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current = tx.query_row(
      &format!("SELECT {} FROM articles WHERE id = ?", ARTICLE_FIELDS),
      params![id],
      map_article
    ).optional()?
      .ok_or_else(|| not_found(id))?;
    let merged = helpers::merge_update(&current, update)?;
    tx.execute(
      "UPDATE articles SET title = ?, slug = ?, meta_description = ?, \
        image_url = ?, content = ?, date = ?, author = ? WHERE id = ?",
      params![
        merged.title,
        merged.slug,
        merged.meta_description,
        merged.image_url,
        merged.content,
        merged.date.timestamp(),
        merged.author,
        merged.id
      ]
    ).map_err(|e| match StoreError::from(e) {
      StoreError::Conflict(_) => slug_conflict(&merged.slug),
      other => other
    })?;
    tx.commit()?;
    Ok(merged)
  }

  fn delete(&self, id_or_slug: &str) -> StoreResult<()> {
    let conn = self.pool.get()?;
    let mut deleted = conn.execute(
      "DELETE FROM articles WHERE id = ?",
      params![id_or_slug]
    )?;
    if deleted == 0 {
      deleted = conn.execute(
        "DELETE FROM articles WHERE slug = ?",
        params![id_or_slug]
      )?;
    }
    match deleted {
      0 => Err(not_found(id_or_slug)),
      _ => Ok(())
    }
  }

  fn import(&self, article: Article) -> StoreResult<Article> {
    let article = helpers::check_complete(article)?;
    if self.select_one("id", &article.id)?.is_some() {
      return Err(StoreError::Conflict(format!("Article id {} already exists", article.id)));
    }
    self.insert(article)
  }

}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::contract_tests;
  use r2d2_sqlite::SqliteConnectionManager;
  use std::env::temp_dir;
  use std::path::PathBuf;
  use std::sync::Arc;
  use uuid::Uuid;

  // Not using an in-memory database because every pooled
  // connection would get its own.
  fn temp_path() -> PathBuf {
    temp_dir().join(format!("tolly-articles-{}.db", Uuid::new_v4()))
  }

  fn store_at(path: &PathBuf) -> SqliteStore {
    let pool = Pool::new(SqliteConnectionManager::file(path)).unwrap();
    SqliteStore::open(pool, "WeAreWe Team").unwrap()
  }

  fn store() -> SqliteStore {
    store_at(&temp_path())
  }

  #[test]
  fn create_then_get() {
    contract_tests::create_then_get(&store());
  }

  #[test]
  fn duplicate_slug_conflicts() {
    contract_tests::duplicate_slug_conflicts(&store());
  }

  #[test]
  fn missing_fields_rejected() {
    contract_tests::missing_fields_rejected(&store());
  }

  #[test]
  fn update_rederives_slug() {
    contract_tests::update_rederives_slug(&store());
  }

  #[test]
  fn update_conflict_leaves_record() {
    contract_tests::update_conflict_leaves_record(&store());
  }

  #[test]
  fn update_own_slug_is_fine() {
    contract_tests::update_own_slug_is_fine(&store());
  }

  #[test]
  fn update_missing_is_not_found() {
    contract_tests::update_missing_is_not_found(&store());
  }

  #[test]
  fn delete_then_get() {
    contract_tests::delete_then_get(&store());
  }

  #[test]
  fn list_newest_first() {
    contract_tests::list_newest_first(&store());
  }

  #[test]
  fn import_keeps_id() {
    contract_tests::import_keeps_id(&store());
  }

  #[test]
  fn subsecond_dates_round_trip() {
    contract_tests::subsecond_dates_round_trip(&store());
  }

  #[test]
  fn concurrent_creates_one_wins() {
    contract_tests::concurrent_creates_one_wins(Arc::new(store()));
  }

  #[test]
  fn schema_survives_reopen() {
    let path = temp_path();
    let created = store_at(&path)
      .create(contract_tests::new_article("Hello World"))
      .unwrap();
    let reopened = store_at(&path);
    assert_eq!(created, reopened.get("hello-world").unwrap());
    std::fs::remove_file(&path).unwrap();
  }
}
