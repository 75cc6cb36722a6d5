use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use log::{debug, error, info};
use super::entities::*;
use super::{helpers, records, ArticleStore, StoreError, StoreResult};

/**
 * Articles as a single JSON array in one file. The whole
 * file is rewritten on every mutation, first in a temp
 * file that is then renamed over the real one so a crash
 * can't leave half an array behind.
 * The in-memory copy only changes once the file write
 * went through.
 */
pub struct JsonFileStore {
  path: PathBuf,
  articles: Mutex<Vec<Article>>,
  default_author: String
}

impl JsonFileStore {

  // A missing file is just an empty store, it gets created
  // on the first write. A file we can't parse is an error
  // though, I don't want to overwrite somebody's articles.
  // Same for a hand-edited file breaking the invariants
  // (blank fields, two records sharing an id or a slug).
  pub fn open<P: AsRef<Path>>(path: P, default_author: &str) -> StoreResult<Self> {
    let path = path.as_ref().to_path_buf();
    let loaded: Vec<Article> = if path.exists() {
      let contents = fs::read_to_string(&path)?;
      if contents.trim().is_empty() {
        Vec::new()
      } else {
        serde_json::from_str(&contents)?
      }
    } else {
      Vec::new()
    };
    let mut articles: Vec<Article> = Vec::with_capacity(loaded.len());
    for article in loaded {
      let id = article.id.clone();
      helpers::check_complete(article)
        .and_then(|a| records::insert(&mut articles, a))
        .map_err(|e| {
          error!("Article {} in {:?} is invalid - {}", id, path, e);
          e
        })?;
    }
    info!("Loaded {} articles from {:?}", articles.len(), path);
    Ok(Self {
      path,
      articles: Mutex::new(articles),
      default_author: default_author.to_string()
    })
  }

  fn lock(&self) -> StoreResult<MutexGuard<'_, Vec<Article>>> {
    self.articles.lock().map_err(|_| {
      error!("The file store lock is poisoned - SHOULD NEVER HAPPEN");
      StoreError::Storage(String::from("Article store lock poisoned"))
    })
  }

  fn persist(&self, articles: &[Article]) -> StoreResult<()> {
    let mut tmp_path = self.path.clone().into_os_string();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);
    let json = serde_json::to_string_pretty(articles)?;
    fs::write(&tmp_path, json)
      .and_then(|_| fs::rename(&tmp_path, &self.path))
      .map_err(|e| {
        error!("Could not write articles to {:?} - {}", self.path, e);
        StoreError::from(e)
      })?;
    debug!("Saved {} articles to {:?}", articles.len(), self.path);
    Ok(())
  }

  // Runs a mutation on a copy of the records, saves the copy
  // and only then swaps it in. The lock is held throughout.
  fn mutate<T, F>(&self, operation: F) -> StoreResult<T>
    where F: FnOnce(&mut Vec<Article>) -> StoreResult<T>
  {
    let mut guard = self.lock()?;
    let mut copy = guard.clone();
    let result = operation(&mut copy)?;
    self.persist(&copy)?;
    *guard = copy;
    Ok(result)
  }

}

impl ArticleStore for JsonFileStore {

  fn list(&self) -> StoreResult<Vec<Article>> {
    Ok(records::sorted(&self.lock()?))
  }

  fn get(&self, id_or_slug: &str) -> StoreResult<Article> {
    records::find(&self.lock()?, id_or_slug)
      .cloned()
      .ok_or_else(|| super::not_found(id_or_slug))
  }

  fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Article>> {
    Ok(records::find_by_slug(&self.lock()?, slug).cloned())
  }

  fn create(&self, new_article: NewArticle) -> StoreResult<Article> {
    let article = helpers::build_article(new_article, &self.default_author)?;
    self.mutate(|articles| records::insert(articles, article))
  }

  fn update(&self, id: &str, update: ArticleUpdate) -> StoreResult<Article> {
    self.mutate(|articles| records::update(articles, id, update))
  }

  fn delete(&self, id_or_slug: &str) -> StoreResult<()> {
    self.mutate(|articles| records::remove(articles, id_or_slug).map(|_| ()))
  }

  fn import(&self, article: Article) -> StoreResult<Article> {
    let article = helpers::check_complete(article)?;
    self.mutate(|articles| records::insert(articles, article))
  }

}
