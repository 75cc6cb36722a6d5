use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use log::{debug, error};
use super::entities::*;
use super::{ArticleStore, StoreResult};
use crate::utils::time_utils::current_timestamp;

struct CachedList {
  fetched_at: i64,
  articles: Vec<Article>
}

/**
 * Read-through cache for the article list with a fixed
 * expiry. Writes going through this wrapper throw the
 * cached list away, so it can only be stale with respect
 * to writes made behind its back (another process on the
 * same file or database), and for at most ttl seconds.
 */
pub struct CachedStore {
  inner: Box<dyn ArticleStore>,
  ttl: i64,
  cached: RwLock<Option<CachedList>>,
  // Bumped by every write. A list fetched while a write
  // happened isn't cached.
  generation: AtomicU64
}

impl CachedStore {

  pub fn new(inner: Box<dyn ArticleStore>, ttl_seconds: u64) -> Self {
    Self {
      inner,
      ttl: i64::try_from(ttl_seconds).unwrap_or(i64::MAX),
      cached: RwLock::new(None),
      generation: AtomicU64::new(0)
    }
  }

  fn fresh_list(&self) -> Option<Vec<Article>> {
    match self.cached.read() {
      Ok(cached) => cached.as_ref()
        .filter(|c| current_timestamp() - c.fetched_at < self.ttl)
        .map(|c| c.articles.clone()),
      Err(e) => {
        error!("Could not get a read handle on the list cache - {}", e);
        None
      }
    }
  }

  fn invalidate(&self) {
    self.generation.fetch_add(1, Ordering::SeqCst);
    match self.cached.write() {
      Ok(mut cached) => *cached = None,
      Err(e) => error!("Could not get a write handle on the list cache - {}", e)
    }
  }

  // Runs a write on the inner store and drops the cache
  // if it worked.
  fn write<T>(&self, result: StoreResult<T>) -> StoreResult<T> {
    if result.is_ok() {
      self.invalidate();
    }
    result
  }

}

impl ArticleStore for CachedStore {

  fn list(&self) -> StoreResult<Vec<Article>> {
    if let Some(articles) = self.fresh_list() {
      debug!("Article list served from cache");
      return Ok(articles);
    }
    let generation = self.generation.load(Ordering::SeqCst);
    let articles = self.inner.list()?;
    if let Ok(mut cached) = self.cached.write() {
      if self.generation.load(Ordering::SeqCst) == generation {
        *cached = Some(CachedList {
          fetched_at: current_timestamp(),
          articles: articles.clone()
        });
      }
    }
    Ok(articles)
  }

  fn get(&self, id_or_slug: &str) -> StoreResult<Article> {
    self.inner.get(id_or_slug)
  }

  fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Article>> {
    self.inner.find_by_slug(slug)
  }

  fn create(&self, new_article: NewArticle) -> StoreResult<Article> {
    self.write(self.inner.create(new_article))
  }

  fn update(&self, id: &str, update: ArticleUpdate) -> StoreResult<Article> {
    self.write(self.inner.update(id, update))
  }

  fn delete(&self, id_or_slug: &str) -> StoreResult<()> {
    self.write(self.inner.delete(id_or_slug))
  }

  fn import(&self, article: Article) -> StoreResult<Article> {
    self.write(self.inner.import(article))
  }

}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::contract_tests::{self, new_article};
  use crate::db::MemoryStore;
  use std::sync::{Arc, Mutex};

  #[test]
  fn writes_invalidate_the_list() {
    let sut = CachedStore::new(Box::new(MemoryStore::new("WeAreWe Team")), 3600);
    assert!(sut.list().unwrap().is_empty());
    let created = sut.create(new_article("Hello World")).unwrap();
    assert_eq!(vec![created.clone()], sut.list().unwrap());
    sut.delete(&created.id).unwrap();
    assert!(sut.list().unwrap().is_empty());
  }

  // Counts list() calls reaching the inner store.
  struct CountingStore {
    inner: MemoryStore,
    list_calls: Arc<Mutex<usize>>
  }

  impl ArticleStore for CountingStore {
    fn list(&self) -> StoreResult<Vec<Article>> {
      *self.list_calls.lock().unwrap() += 1;
      self.inner.list()
    }
    fn get(&self, id_or_slug: &str) -> StoreResult<Article> {
      self.inner.get(id_or_slug)
    }
    fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Article>> {
      self.inner.find_by_slug(slug)
    }
    fn create(&self, new_article: NewArticle) -> StoreResult<Article> {
      self.inner.create(new_article)
    }
    fn update(&self, id: &str, update: ArticleUpdate) -> StoreResult<Article> {
      self.inner.update(id, update)
    }
    fn delete(&self, id_or_slug: &str) -> StoreResult<()> {
      self.inner.delete(id_or_slug)
    }
    fn import(&self, article: Article) -> StoreResult<Article> {
      self.inner.import(article)
    }
  }

  #[test]
  fn repeated_lists_hit_the_cache() {
    let list_calls = Arc::new(Mutex::new(0));
    let sut = CachedStore::new(
      Box::new(CountingStore {
        inner: MemoryStore::new("WeAreWe Team"),
        list_calls: Arc::clone(&list_calls)
      }),
      3600
    );
    sut.create(new_article("Hello World")).unwrap();
    sut.list().unwrap();
    sut.list().unwrap();
    sut.list().unwrap();
    assert_eq!(1, *list_calls.lock().unwrap());
    // A failed write keeps the cache:
    assert!(sut.create(new_article("Hello World")).is_err());
    sut.list().unwrap();
    assert_eq!(1, *list_calls.lock().unwrap());
    sut.create(new_article("Second")).unwrap();
    assert_eq!(2, sut.list().unwrap().len());
    assert_eq!(2, *list_calls.lock().unwrap());
  }

  #[test]
  fn cached_store_keeps_the_contract() {
    let sut = CachedStore::new(Box::new(MemoryStore::new("WeAreWe Team")), 3600);
    contract_tests::update_conflict_leaves_record(&sut);
  }

  #[test]
  fn subsecond_dates_round_trip() {
    let sut = CachedStore::new(Box::new(MemoryStore::new("WeAreWe Team")), 3600);
    contract_tests::subsecond_dates_round_trip(&sut);
  }

  #[test]
  fn concurrent_creates_one_wins() {
    let sut = CachedStore::new(Box::new(MemoryStore::new("WeAreWe Team")), 3600);
    contract_tests::concurrent_creates_one_wins(Arc::new(sut));
  }
}
