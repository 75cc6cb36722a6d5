use derive_more::Display;
use eyre::WrapErr;
use color_eyre::Result;
use log::info;
use r2d2_sqlite::SqliteConnectionManager;
use crate::config::{Config, StoreBackend};
pub mod entities;
pub mod helpers;
mod mappers;
mod records;
mod memory;
mod file;
mod sqlite;
mod cache;
use entities::*;
pub use memory::MemoryStore;
pub use file::JsonFileStore;
pub use sqlite::SqliteStore;
pub use cache::CachedStore;

// Type alias to make function signatures much clearer:
pub type Pool = r2d2::Pool<SqliteConnectionManager>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// Storage details stay in the String and in the logs,
// the web layer decides what the client gets to see.
#[derive(Debug, Display, PartialEq)]
pub enum StoreError {
  #[display(fmt = "Missing or empty fields: {}", "_0.join(\", \")")]
  Validation(Vec<String>),
  #[display(fmt = "Not found: {}", _0)]
  NotFound(String),
  #[display(fmt = "Conflict: {}", _0)]
  Conflict(String),
  #[display(fmt = "Storage error: {}", _0)]
  Storage(String)
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
  fn from(error: std::io::Error) -> Self {
    StoreError::Storage(error.to_string())
  }
}

impl From<serde_json::Error> for StoreError {
  fn from(error: serde_json::Error) -> Self {
    StoreError::Storage(error.to_string())
  }
}

impl From<r2d2::Error> for StoreError {
  fn from(error: r2d2::Error) -> Self {
    StoreError::Storage(error.to_string())
  }
}

// The unique index on the slug is what keeps two
// concurrent writers from sharing a slug, so its
// violation is a conflict and not a storage failure.
impl From<rusqlite::Error> for StoreError {
  fn from(error: rusqlite::Error) -> Self {
    match error {
      rusqlite::Error::SqliteFailure(ref e, _)
        if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        StoreError::Conflict(String::from("Slug or id already exists")),
      _ => StoreError::Storage(error.to_string())
    }
  }
}

pub fn slug_conflict(slug: &str) -> StoreError {
  StoreError::Conflict(format!("An article with slug \"{}\" already exists", slug))
}

pub fn not_found(key: &str) -> StoreError {
  StoreError::NotFound(format!("No article for \"{}\"", key))
}

/**
 * The one place that gets to read and write articles.
 * Every backing store (memory, JSON file, SQLite) sits
 * behind this and enforces the same invariants: required
 * fields present, unique slug, immutable id.
 */
pub trait ArticleStore: Send + Sync {
  /// All articles, newest first. Ties keep insertion order.
  fn list(&self) -> StoreResult<Vec<Article>>;

  /// Lookup by id, falling back to the slug.
  fn get(&self, id_or_slug: &str) -> StoreResult<Article>;

  fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Article>>;

  fn create(&self, new_article: NewArticle) -> StoreResult<Article>;

  fn update(&self, id: &str, update: ArticleUpdate) -> StoreResult<Article>;

  fn delete(&self, id_or_slug: &str) -> StoreResult<()>;

  /// Inserts a complete record as-is (id and date included).
  /// Only the data transform uses this.
  fn import(&self, article: Article) -> StoreResult<Article>;
}

pub fn open_backend(
  backend: StoreBackend,
  config: &Config
) -> Result<Box<dyn ArticleStore>> {
  let author = config.default_author.clone();
  let store: Box<dyn ArticleStore> = match backend {
    StoreBackend::Memory => Box::new(MemoryStore::new(&author)),
    StoreBackend::File => Box::new(
      JsonFileStore::open(&config.articles_file_path, &author)
        .with_context(|| format!(
          "Opening article file {}",
          config.articles_file_path
        ))?
    ),
    StoreBackend::Sqlite => {
      let manager = SqliteConnectionManager::file(&config.db_path);
      let pool = Pool::new(manager)
        .context("Database connection failed")?;
      Box::new(
        SqliteStore::open(pool, &author)
          .context("Creating the articles schema")?
      )
    }
  };
  info!("Using the {} article store", backend);
  Ok(store)
}

// Same as open_backend but with the list cache in front
// when it's enabled.
pub fn open_store(config: &Config) -> Result<Box<dyn ArticleStore>> {
  let store = open_backend(config.store_backend, config)?;
  if config.list_cache_ttl > 0 {
    info!("Article list cached for {} seconds", config.list_cache_ttl);
    Ok(Box::new(CachedStore::new(store, config.list_cache_ttl)))
  } else {
    Ok(store)
  }
}

// Shared test scenarios, every adapter runs them.
#[cfg(test)]
pub mod contract_tests {
  use super::*;
  use std::sync::Arc;
  use std::thread;

  pub fn new_article(title: &str) -> NewArticle {
    NewArticle {
      title: Some(title.to_string()),
      meta_description: Some("d".to_string()),
      image_url: Some("http://x/y.png".to_string()),
      content: Some("<p>hi</p>".to_string()),
      ..Default::default()
    }
  }

  pub fn create_then_get(store: &dyn ArticleStore) {
    let created = store.create(new_article("Hello World")).unwrap();
    assert_eq!("hello-world", created.slug);
    assert_eq!("Hello World", created.title);
    assert_eq!("d", created.meta_description);
    assert_eq!("http://x/y.png", created.image_url);
    assert_eq!("<p>hi</p>", created.content);
    assert_eq!("WeAreWe Team", created.author);
    assert_eq!(created, store.get(&created.id).unwrap());
    assert_eq!(created, store.get("hello-world").unwrap());
    assert_eq!(Some(created.clone()), store.find_by_slug("hello-world").unwrap());
    assert_eq!(None, store.find_by_slug("nope").unwrap());
  }

  pub fn duplicate_slug_conflicts(store: &dyn ArticleStore) {
    store.create(new_article("Hello World")).unwrap();
    match store.create(new_article("hello   world!")) {
      Err(StoreError::Conflict(_)) => (),
      other => panic!("Expected a conflict, got {:?}", other)
    }
    assert_eq!(1, store.list().unwrap().len());
  }

  pub fn missing_fields_rejected(store: &dyn ArticleStore) {
    let mut sut = new_article("Hello World");
    sut.content = None;
    match store.create(sut) {
      Err(StoreError::Validation(fields)) => assert_eq!(vec!["content"], fields),
      other => panic!("Expected a validation error, got {:?}", other)
    }
    assert!(store.list().unwrap().is_empty());
  }

  pub fn update_rederives_slug(store: &dyn ArticleStore) {
    let created = store.create(new_article("Hello World")).unwrap();
    let updated = store.update(
      &created.id,
      ArticleUpdate {
        title: Some("Café à Paris!".to_string()),
        ..Default::default()
      }
    ).unwrap();
    assert_eq!("cafe-a-paris", updated.slug);
    assert_eq!(created.id, updated.id);
    assert_eq!(updated, store.get(&created.id).unwrap());
    assert!(matches!(store.get("hello-world"), Err(StoreError::NotFound(_))));
  }

  pub fn update_conflict_leaves_record(store: &dyn ArticleStore) {
    store.create(new_article("First")).unwrap();
    let second = store.create(new_article("Second")).unwrap();
    let result = store.update(
      &second.id,
      ArticleUpdate {
        title: Some("FIRST".to_string()),
        content: Some("<p>changed</p>".to_string()),
        ..Default::default()
      }
    );
    assert!(matches!(result, Err(StoreError::Conflict(_))));
    assert_eq!(second, store.get(&second.id).unwrap());
  }

  pub fn update_own_slug_is_fine(store: &dyn ArticleStore) {
    let created = store.create(new_article("Hello World")).unwrap();
    let updated = store.update(
      &created.id,
      ArticleUpdate {
        slug: Some("hello-world".to_string()),
        meta_description: Some("new description".to_string()),
        ..Default::default()
      }
    ).unwrap();
    assert_eq!("hello-world", updated.slug);
    assert_eq!("new description", updated.meta_description);
  }

  pub fn update_missing_is_not_found(store: &dyn ArticleStore) {
    let result = store.update("nope", ArticleUpdate::default());
    assert!(matches!(result, Err(StoreError::NotFound(_))));
  }

  pub fn delete_then_get(store: &dyn ArticleStore) {
    let first = store.create(new_article("First")).unwrap();
    let second = store.create(new_article("Second")).unwrap();
    store.delete(&first.id).unwrap();
    assert!(matches!(store.get(&first.id), Err(StoreError::NotFound(_))));
    store.delete("second").unwrap();
    assert!(matches!(store.get(&second.id), Err(StoreError::NotFound(_))));
    assert!(matches!(store.delete(&first.id), Err(StoreError::NotFound(_))));
    assert!(store.list().unwrap().is_empty());
  }

  pub fn list_newest_first(store: &dyn ArticleStore) {
    let old_date = crate::utils::time_utils::timestamp_to_date(1_600_000_000);
    let mut old = new_article("Old one");
    old.date = old_date;
    store.create(old).unwrap();
    store.create(new_article("Recent A")).unwrap();
    let mut tied = new_article("Old two");
    tied.date = old_date;
    store.create(tied).unwrap();
    let titles: Vec<String> = store.list().unwrap()
      .into_iter()
      .map(|a| a.title)
      .collect();
    assert_eq!(vec!["Recent A", "Old one", "Old two"], titles);
  }

  pub fn import_keeps_id(store: &dyn ArticleStore) {
    let article = helpers::build_article(new_article("Imported"), "Someone").unwrap();
    let imported = store.import(article.clone()).unwrap();
    assert_eq!(article, imported);
    assert_eq!(article, store.get(&article.id).unwrap());
    assert!(matches!(store.import(article), Err(StoreError::Conflict(_))));
  }

  // SQLite only keeps seconds, every store has to agree.
  pub fn subsecond_dates_round_trip(store: &dyn ArticleStore) {
    let mut sut = new_article("Hello World");
    sut.date = Some("2024-01-15T10:00:00.500Z".parse().unwrap());
    let created = store.create(sut).unwrap();
    assert_eq!(
      "2024-01-15T10:00:00Z",
      crate::utils::time_utils::date_to_string(
        &created.date,
        crate::utils::time_utils::DateFormat::Rfc3339
      )
    );
    assert_eq!(created, store.get(&created.id).unwrap());

    let updated = store.update(
      &created.id,
      ArticleUpdate {
        date: Some("2024-02-01T08:30:00.250Z".parse().unwrap()),
        ..Default::default()
      }
    ).unwrap();
    assert_eq!(updated, store.get(&created.id).unwrap());

    let mut imported = helpers::build_article(new_article("Imported"), "Someone").unwrap();
    imported.date = "2024-03-01T00:00:00.999Z".parse().unwrap();
    let imported = store.import(imported).unwrap();
    assert_eq!(0, imported.date.timestamp_subsec_nanos());
    assert_eq!(imported, store.get(&imported.id).unwrap());
  }

  pub fn concurrent_creates_one_wins(store: Arc<dyn ArticleStore>) {
    let handles: Vec<_> = (0..8).map(|i| {
      let store = Arc::clone(&store);
      thread::spawn(move || {
        // Different titles, same slug.
        let title = if i % 2 == 0 { "Same Title" } else { "same-title!" };
        store.create(new_article(title))
      })
    }).collect();
    let results: Vec<StoreResult<Article>> = handles
      .into_iter()
      .map(|h| h.join().unwrap())
      .collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results.iter()
      .filter(|r| matches!(r, Err(StoreError::Conflict(_))))
      .count();
    assert_eq!(1, successes);
    assert_eq!(7, conflicts);
    assert_eq!(1, store.list().unwrap().len());
  }
}
