use actix_web::{
  http::header,
  web,
  HttpResponse,
  Result
};
use log::{error, info};
use handlebars::Handlebars;
use crate::blog::{self, Category};
use crate::db::entities::*;
use super::dtos::*;
use super::error::{Error, map_store_error};
use super::AppState;
use super::helpers::AdminAccess;

// Module with all the API handler functions. The store
// calls are synchronous and quick, they run right in
// the handlers.

const SITEMAP_CACHE_CONTROL: &str =
  "public, max-age=86400, stale-while-revalidate=3600";
const ALL_CATEGORIES_LABEL: &str = "Tous les articles";

pub async fn index() -> HttpResponse {
  HttpResponse::Ok().json(JsonStatus::new(JsonStatusType::Success, "Nothing here"))
}

// Default response when no route matched the request:
pub async fn not_found() -> Result<HttpResponse, Error> {
  Err(Error::NotFound(String::from("Endpoint doesn't exist")))
}

// The optional slug query is an exact match, and gives
// a list with zero or one article.
pub async fn articles(
  app_state: web::Data<AppState>,
  query: web::Query<ArticlesQuery>
) -> Result<HttpResponse, Error> {
  let articles: Vec<Article> = match &query.slug {
    Some(slug) => app_state.store.find_by_slug(slug)
      .map_err(map_store_error)?
      .into_iter()
      .collect(),
    None => app_state.store.list().map_err(map_store_error)?
  };
  let article_dtos: Vec<ArticleDto> =
    articles.into_iter().map(Into::into).collect();
  Ok(HttpResponse::Ok().json(article_dtos))
}

// Path variables have to be in a tuple.
pub async fn article(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  let id_or_slug = path.into_inner().0;
  let article = app_state.store.get(&id_or_slug)
    .map_err(map_store_error)?;
  Ok(HttpResponse::Ok().json(ArticleDto::from(article)))
}

// AdminAccess goes first in the write handlers so the
// credentials are checked before the body is parsed.
pub async fn create_article(
  _admin: AdminAccess,
  app_state: web::Data<AppState>,
  body: web::Json<ArticleBody>
) -> Result<HttpResponse, Error> {
  let article = app_state.store.create(body.into_inner().into())
    .map_err(map_store_error)?;
  info!("Created article {} ({})", article.id, article.slug);
  Ok(HttpResponse::Created().json(ArticleDto::from(article)))
}

pub async fn update_article(
  _admin: AdminAccess,
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>,
  body: web::Json<ArticleBody>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  let article = app_state.store.update(&id, body.into_inner().into())
    .map_err(map_store_error)?;
  info!("Updated article {} ({})", article.id, article.slug);
  Ok(HttpResponse::Ok().json(ArticleDto::from(article)))
}

pub async fn delete_article(
  _admin: AdminAccess,
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  let id_or_slug = path.into_inner().0;
  app_state.store.delete(&id_or_slug)
    .map_err(map_store_error)?;
  info!("Deleted article {}", id_or_slug);
  Ok(HttpResponse::NoContent().finish())
}

// Classification happens on every call, the article
// list itself comes from the (possibly cached) store.
pub async fn blog(
  app_state: web::Data<AppState>,
  query: web::Query<BlogQuery>
) -> Result<HttpResponse, Error> {
  let articles = app_state.store.list().map_err(map_store_error)?;
  let classified = blog::filter(
    articles,
    query.search.as_deref(),
    query.category.as_deref()
  );
  match blog::paginate(classified, query.page.unwrap_or(1)) {
    Some(page) => Ok(HttpResponse::Ok().json(BlogPageDto::from(page))),
    None => Err(Error::NotFound("Page does not exist".to_string()))
  }
}

pub async fn blog_categories() -> HttpResponse {
  let mut categories = vec![CategoryDto {
    id: blog::ALL_CATEGORIES,
    label: ALL_CATEGORIES_LABEL.to_string()
  }];
  categories.extend(Category::scored().into_iter().map(CategoryDto::from));
  HttpResponse::Ok().json(categories)
}

fn render<T: serde::Serialize>(
  hb: &Handlebars<'static>,
  template: &str,
  data: &T
) -> Result<String, Error> {
  hb.render(template, data)
    .map_err(|e| {
      error!("A template engine error occured when rendering {}: {}", template, e);
      Error::InternalServerError("Template engine error".to_string())
    })
}

pub async fn sitemap(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'static>>
) -> Result<HttpResponse, Error> {
  let articles = app_state.store.list().map_err(map_store_error)?;
  let data = SitemapData::new(&app_state.site_info, articles);
  let body = render(&hb, "sitemap", &data)?;
  Ok(
    HttpResponse::Ok()
      .content_type("application/xml")
      .insert_header((header::CACHE_CONTROL, SITEMAP_CACHE_CONTROL))
      .body(body)
  )
}

pub async fn robots(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'static>>
) -> Result<HttpResponse, Error> {
  let body = render(
    &hb,
    "robots",
    &RobotsData { root: &app_state.site_info.root }
  )?;
  Ok(
    HttpResponse::Ok()
      .content_type("text/plain")
      .body(body)
  )
}

pub async fn organization_jsonld(
  app_state: web::Data<AppState>
) -> HttpResponse {
  HttpResponse::Ok()
    .content_type("application/ld+json")
    .json(super::dtos::organization_jsonld(&app_state.site_info))
}

pub async fn article_jsonld(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  let id_or_slug = path.into_inner().0;
  let article = app_state.store.get(&id_or_slug)
    .map_err(map_store_error)?;
  Ok(
    HttpResponse::Ok()
      .content_type("application/ld+json")
      .json(super::dtos::article_jsonld(&app_state.site_info, &article))
  )
}
