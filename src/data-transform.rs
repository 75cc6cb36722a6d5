#![allow(dead_code)]
mod config;
mod db;
mod utils;

use std::env;
use color_eyre::Result;
use eyre::{eyre, WrapErr};
use dotenv::dotenv;
use log::{info, warn};
use getopts::Options;
use crate::config::{Config, StoreBackend};
use crate::db::{ArticleStore, StoreError, StoreResult};

// Copy pasted this from getopts doc.
fn print_usage(program: &str, opts: Options) {
  let brief = format!("Usage: {} -f BACKEND -t BACKEND [options]", program);
  print!("{}", opts.usage(&brief));
}

#[derive(Debug, Default, PartialEq)]
struct CopySummary {
  copied: usize,
  skipped: usize
}

/**
 * Copies every article from one store to the other, ids
 * and dates included. Oldest first so that a store keeping
 * insertion order for equal dates ends up in the same
 * order. Articles the destination already has (same id or
 * same slug) are skipped, anything else stops the copy.
 */
fn copy_articles(
  from: &dyn ArticleStore,
  to: &dyn ArticleStore
) -> StoreResult<CopySummary> {
  let mut summary = CopySummary::default();
  let mut articles = from.list()?;
  articles.reverse();
  for article in articles {
    let id = article.id.clone();
    match to.import(article) {
      Ok(_) => summary.copied += 1,
      Err(StoreError::Conflict(message)) => {
        warn!("Skipping article {} - {}", id, message);
        summary.skipped += 1;
      },
      Err(e) => return Err(e)
    }
  }
  Ok(summary)
}

// A memory store dies with the process, copying from or to
// one would silently do nothing.
fn backend_option(value: Option<String>, name: &str) -> Result<StoreBackend> {
  let backend: StoreBackend = value
    .ok_or_else(|| eyre!("Missing the {} backend", name))?
    .parse()?;
  if backend == StoreBackend::Memory {
    return Err(eyre!("The {} backend has to be file or sqlite, not {}", name, backend));
  }
  Ok(backend)
}

/**
 * Binary meant to move the articles between backends,
 * e.g. from the JSON file to SQLite.
 */
fn main() -> Result<()> {
  dotenv().ok();
  if env::var("RUST_LOG").is_err() {
    env::set_var("RUST_LOG", "info");
  }
  env_logger::init();
  color_eyre::install()?;

  let args: Vec<String> = env::args().collect();
  let program = args[0].clone();
  let mut opts = Options::new();
  opts.optopt("f", "from", "Backend to read articles from", "file|sqlite");
  opts.optopt("t", "to", "Backend to copy articles to", "file|sqlite");
  opts.optflag("h", "help", "Program usage");
  let opt_matches = opts.parse(&args[1..])?;
  if opt_matches.opt_present("h")
    || !(opt_matches.opt_present("f") && opt_matches.opt_present("t")) {
    print_usage(&program, opts);
    return Ok(());
  }

  let from = backend_option(opt_matches.opt_str("f"), "source")?;
  let to = backend_option(opt_matches.opt_str("t"), "destination")?;
  if from == to {
    return Err(eyre!("Source and destination are both {}", from));
  }

  let config = Config::from_env()?;
  let source = db::open_backend(from, &config)?;
  let destination = db::open_backend(to, &config)?;

  info!("Copying articles from {} to {}...", from, to);
  let summary = copy_articles(source.as_ref(), destination.as_ref())
    .wrap_err("Copying articles")?;
  info!(
    "Done - {} articles copied, {} skipped",
    summary.copied,
    summary.skipped
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::contract_tests::new_article;
  use crate::db::MemoryStore;
  use crate::utils::time_utils;

  #[test]
  fn copies_everything_oldest_first() {
    let from = MemoryStore::new("WeAreWe Team");
    let mut older = new_article("Older");
    older.date = time_utils::timestamp_to_date(1600000000);
    let older = from.create(older).unwrap();
    let newer = from.create(new_article("Newer")).unwrap();
    let to = MemoryStore::new("WeAreWe Team");

    let summary = copy_articles(&from, &to).unwrap();

    assert_eq!(CopySummary { copied: 2, skipped: 0 }, summary);
    assert_eq!(vec![newer, older.clone()], to.list().unwrap());
    assert_eq!(older, to.get(&older.id).unwrap());
  }

  #[test]
  fn existing_articles_are_skipped() {
    let from = MemoryStore::new("WeAreWe Team");
    let article = from.create(new_article("Hello World")).unwrap();
    let to = MemoryStore::new("WeAreWe Team");
    to.import(article).unwrap();
    to.create(new_article("Other")).unwrap();
    from.create(new_article("Other")).unwrap();

    let summary = copy_articles(&from, &to).unwrap();

    assert_eq!(CopySummary { copied: 0, skipped: 2 }, summary);
    assert_eq!(2, to.list().unwrap().len());
  }

  #[test]
  fn backend_names() {
    assert_eq!(
      StoreBackend::Sqlite,
      backend_option(Some("db".to_string()), "source").unwrap()
    );
    assert!(backend_option(None, "source").is_err());
    assert!(backend_option(Some("mongo".to_string()), "source").is_err());
    assert!(backend_option(Some("memory".to_string()), "source").is_err());
    assert!(backend_option(Some("memory".to_string()), "destination").is_err());
  }
}
