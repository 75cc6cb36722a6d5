use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use derive_more::Display;
use chrono::{DateTime, Utc};
use crate::blog::{BlogPage, Category, ClassifiedArticle, Tag};
use crate::config::SiteInfo;
use crate::db::entities::*;
use crate::utils::{
  serde_utils,
  text_utils,
  time_utils::{self, DateFormat}
};
use super::helpers;

// Entities become DTOs through From, same as always.
// Nothing ever goes the other way except for the
// request body.

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDto {
  pub id: String,
  pub title: String,
  pub slug: String,
  pub meta_description: String,
  pub image_url: String,
  pub content: String,
  pub date: String,
  pub author: String,
  pub read_time: String
}

pub fn read_time(content: &str) -> String {
  format!("{} min", text_utils::read_time_minutes(content))
}

impl From<Article> for ArticleDto {
  fn from(article: Article) -> Self {
    Self {
      read_time: read_time(&article.content),
      date: time_utils::date_to_string(&article.date, DateFormat::Rfc3339),
      id: article.id,
      title: article.title,
      slug: article.slug,
      meta_description: article.meta_description,
      image_url: article.image_url,
      content: article.content,
      author: article.author
    }
  }
}

// Request body for both POST and PUT. Every field is
// optional here, the store decides what's missing.
// The slug is called "url" in the admin forms.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArticleBody {
  pub title: Option<String>,
  pub url: Option<String>,
  pub meta_description: Option<String>,
  pub image_url: Option<String>,
  pub content: Option<String>,
  pub date: Option<DateTime<Utc>>,
  pub author: Option<String>
}

impl From<ArticleBody> for NewArticle {
  fn from(body: ArticleBody) -> Self {
    Self {
      title: body.title,
      slug: serde_utils::empty_string_to_none(body.url),
      meta_description: body.meta_description,
      image_url: body.image_url,
      content: body.content,
      date: body.date,
      author: serde_utils::empty_string_to_none(body.author)
    }
  }
}

// Blank strings have to reach the store on update, they're
// how it knows someone tried to empty a required field.
impl From<ArticleBody> for ArticleUpdate {
  fn from(body: ArticleBody) -> Self {
    Self {
      title: body.title,
      slug: body.url,
      meta_description: body.meta_description,
      image_url: body.image_url,
      content: body.content,
      date: body.date,
      author: serde_utils::empty_string_to_none(body.author)
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ArticlesQuery {
  pub slug: Option<String>
}

#[derive(Debug, Deserialize)]
pub struct BlogQuery {
  pub search: Option<String>,
  pub category: Option<String>,
  pub page: Option<usize>
}

// What the blog listing shows: no content, but a
// category and tags.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogArticleDto {
  pub id: String,
  pub title: String,
  pub slug: String,
  pub meta_description: String,
  pub image_url: String,
  pub date: String,
  pub author: String,
  pub read_time: String,
  pub category: String,
  pub tags: Vec<Tag>
}

impl From<ClassifiedArticle> for BlogArticleDto {
  fn from(classified: ClassifiedArticle) -> Self {
    let article = classified.article;
    Self {
      read_time: read_time(&article.content),
      date: time_utils::date_to_string(&article.date, DateFormat::Rfc3339),
      id: article.id,
      title: article.title,
      slug: article.slug,
      meta_description: article.meta_description,
      image_url: article.image_url,
      author: article.author,
      category: classified.category.to_string(),
      tags: classified.tags
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPageDto {
  pub page: usize,
  pub total_pages: usize,
  pub total_articles: usize,
  pub articles: Vec<BlogArticleDto>
}

impl From<BlogPage> for BlogPageDto {
  fn from(page: BlogPage) -> Self {
    Self {
      page: page.page,
      total_pages: page.total_pages,
      total_articles: page.total_articles,
      articles: page.articles.into_iter().map(Into::into).collect()
    }
  }
}

#[derive(Debug, Serialize)]
pub struct CategoryDto {
  pub id: &'static str,
  pub label: String
}

impl From<Category> for CategoryDto {
  fn from(category: Category) -> Self {
    Self {
      id: category.id(),
      label: category.to_string()
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonStatus {
  pub status: String,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fields: Option<Vec<String>>
}

#[derive(Debug, Display)]
pub enum JsonStatusType {
  #[display(fmt = "success")]
  Success,
  #[display(fmt = "error")]
  Error
}

impl JsonStatus {
  pub fn new(status: JsonStatusType, message: &str) -> Self {
    Self {
      status: status.to_string(),
      message: String::from(message),
      fields: None
    }
  }
}

// Following structs are given to the template engine
// to render the sitemap.
#[derive(Debug, Serialize)]
pub struct SitemapEntry {
  pub loc: String,
  pub lastmod: String,
  pub changefreq: &'static str,
  pub priority: &'static str
}

#[derive(Debug, Serialize)]
pub struct SitemapData {
  pub entries: Vec<SitemapEntry>
}

// Pages of the front-end that aren't articles, with
// their priority.
const STATIC_PAGES: [(&str, &str); 4] = [
  ("/", "1.0"),
  ("/blog", "0.8"),
  ("/social-hooks", "0.9"),
  ("/strategy", "0.9")
];

impl SitemapData {
  pub fn new(site_info: &SiteInfo, articles: Vec<Article>) -> Self {
    let today = time_utils::date_to_string(&time_utils::now(), DateFormat::USCompact);
    let mut entries: Vec<SitemapEntry> = STATIC_PAGES.iter()
      .map(|(path, priority)| SitemapEntry {
        loc: format!("{}{}", site_info.root, path),
        lastmod: today.clone(),
        changefreq: "weekly",
        priority
      })
      .collect();
    entries.extend(articles.into_iter().map(|a| SitemapEntry {
      loc: helpers::generate_article_url(&site_info.root, &a.slug),
      lastmod: time_utils::date_to_string(&a.date, DateFormat::USCompact),
      changefreq: "weekly",
      priority: "0.8"
    }));
    Self { entries }
  }
}

#[derive(Debug, Serialize)]
pub struct RobotsData<'a> {
  pub root: &'a str
}

// JSON-LD documents are free-form enough that the json!
// macro reads better than a pile of structs.
pub fn organization_jsonld(site_info: &SiteInfo) -> Value {
  json!({
    "@context": "https://schema.org",
    "@type": "Organization",
    "name": site_info.name,
    "description": site_info.description,
    "url": site_info.root,
    "logo": site_info.logo_url,
    "address": {
      "@type": "PostalAddress",
      "addressCountry": "FR"
    },
    "sameAs": [site_info.instagram_url],
    "contactPoint": {
      "@type": "ContactPoint",
      "email": site_info.contact_email,
      "contactType": "customer service"
    }
  })
}

pub fn article_jsonld(site_info: &SiteInfo, article: &Article) -> Value {
  json!({
    "@context": "https://schema.org",
    "@type": "BlogPosting",
    "headline": article.title,
    "description": article.meta_description,
    "image": article.image_url,
    "datePublished": time_utils::date_to_string(&article.date, DateFormat::Rfc3339),
    "author": {
      "@type": "Organization",
      "name": article.author
    },
    "publisher": {
      "@type": "Organization",
      "name": site_info.name,
      "logo": {
        "@type": "ImageObject",
        "url": site_info.logo_url
      }
    },
    "mainEntityOfPage": {
      "@type": "WebPage",
      "@id": helpers::generate_article_url(&site_info.root, &article.slug)
    }
  })
}
