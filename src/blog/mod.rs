/*
 * Blog listing: every article gets a category and a few
 * tags computed on the fly (nothing is persisted), then
 * the list is filtered and cut into pages.
 */

pub mod classifier;
use crate::db::entities::Article;
pub use classifier::{Category, Tag, determine_category, generate_tags};

pub const ARTICLES_PER_PAGE: usize = 9;
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug)]
pub struct ClassifiedArticle {
  pub article: Article,
  pub category: Category,
  pub tags: Vec<Tag>
}

impl From<Article> for ClassifiedArticle {
  fn from(article: Article) -> Self {
    Self {
      category: determine_category(&article),
      tags: generate_tags(&article),
      article
    }
  }
}

#[derive(Debug)]
pub struct BlogPage {
  pub page: usize,
  pub total_pages: usize,
  pub total_articles: usize,
  pub articles: Vec<ClassifiedArticle>
}

// Search is a case-insensitive "contains" on the title, the
// meta description or any of the tag labels.
fn matches_search(classified: &ClassifiedArticle, term: &str) -> bool {
  term.is_empty()
    || classified.article.title.to_lowercase().contains(term)
    || classified.article.meta_description.to_lowercase().contains(term)
    || classified.tags.iter().any(|t| t.label.contains(term))
}

fn matches_category(classified: &ClassifiedArticle, category_id: &str) -> bool {
  category_id == ALL_CATEGORIES || classified.category.id() == category_id
}

pub fn filter(
  articles: Vec<Article>,
  search: Option<&str>,
  category_id: Option<&str>
) -> Vec<ClassifiedArticle> {
  let term = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
  let category_id = category_id
    .map(|c| c.trim().to_lowercase())
    .filter(|c| !c.is_empty())
    .unwrap_or_else(|| ALL_CATEGORIES.to_string());
  articles.into_iter()
    .map(ClassifiedArticle::from)
    .filter(|c| matches_search(c, &term) && matches_category(c, &category_id))
    .collect()
}

// Pages start at 1. Asking for a page past the end gives
// None, except that an empty list still has a page 1.
pub fn paginate(articles: Vec<ClassifiedArticle>, page: usize) -> Option<BlogPage> {
  let page = page.max(1);
  let total_articles = articles.len();
  let total_pages = (total_articles + ARTICLES_PER_PAGE - 1) / ARTICLES_PER_PAGE;
  if page > total_pages.max(1) {
    return None;
  }
  let articles = articles.into_iter()
    .skip((page - 1) * ARTICLES_PER_PAGE)
    .take(ARTICLES_PER_PAGE)
    .collect();
  Some(BlogPage {
    page,
    total_pages,
    total_articles,
    articles
  })
}
