use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use log::error;
use super::entities::*;
use super::{helpers, records, ArticleStore, StoreError, StoreResult};

/**
 * In-process store, nothing survives a restart.
 * The write lock covers the whole check-then-write of
 * every mutation.
 */
pub struct MemoryStore {
  articles: RwLock<Vec<Article>>,
  default_author: String
}

fn poisoned() -> StoreError {
  error!("The memory store lock is poisoned - SHOULD NEVER HAPPEN");
  StoreError::Storage(String::from("Article store lock poisoned"))
}

impl MemoryStore {

  pub fn new(default_author: &str) -> Self {
    Self {
      articles: RwLock::new(Vec::new()),
      default_author: default_author.to_string()
    }
  }

  fn read(&self) -> StoreResult<RwLockReadGuard<'_, Vec<Article>>> {
    self.articles.read().map_err(|_| poisoned())
  }

  fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Vec<Article>>> {
    self.articles.write().map_err(|_| poisoned())
  }

}

impl ArticleStore for MemoryStore {

  fn list(&self) -> StoreResult<Vec<Article>> {
    Ok(records::sorted(&self.read()?))
  }

  fn get(&self, id_or_slug: &str) -> StoreResult<Article> {
    records::find(&self.read()?, id_or_slug)
      .cloned()
      .ok_or_else(|| super::not_found(id_or_slug))
  }

  fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Article>> {
    Ok(records::find_by_slug(&self.read()?, slug).cloned())
  }

  fn create(&self, new_article: NewArticle) -> StoreResult<Article> {
    // Validation doesn't need the lock.
    let article = helpers::build_article(new_article, &self.default_author)?;
    records::insert(&mut *self.write()?, article)
  }

  fn update(&self, id: &str, update: ArticleUpdate) -> StoreResult<Article> {
    records::update(&mut *self.write()?, id, update)
  }

  fn delete(&self, id_or_slug: &str) -> StoreResult<()> {
    records::remove(&mut *self.write()?, id_or_slug).map(|_| ())
  }

  fn import(&self, article: Article) -> StoreResult<Article> {
    let article = helpers::check_complete(article)?;
    records::insert(&mut *self.write()?, article)
  }

}
