use actix_web::{middleware, web, App, HttpServer};
use actix_cors::Cors;
use color_eyre::Result;
use eyre::WrapErr;
use log::{debug, info, warn};
use handlebars::Handlebars;
// I think we have to add crate here because
// of the other crate named "config" that we
// use as a dependency.
use crate::config::{AdminCredentials, Config, SiteInfo};
use crate::db::{self, ArticleStore};
use error::Error;
mod handlers;
mod dtos;
mod error;
mod helpers;

// Declare app state struct:
pub struct AppState {
  pub store: Box<dyn ArticleStore>,
  pub site_info: SiteInfo,
  pub admin: Option<AdminCredentials>
}

// The templates are small enough to live in the binary,
// which means no templates directory to deploy.
pub fn templates() -> Result<Handlebars<'static>> {
  let mut handlebars = Handlebars::new();
  handlebars.register_template_string(
    "sitemap",
    include_str!("../../templates/sitemap.xml.hbs")
  ).context("Registering the sitemap template")?;
  handlebars.register_template_string(
    "robots",
    include_str!("../../templates/robots.txt.hbs")
  ).context("Registering the robots template")?;
  Ok(handlebars)
}

// Function to start the server.
// Has to be async because there should be a .await at the end.
pub async fn run() -> Result<()> {
  let config = Config::from_env()?;
  debug!("Current config: {:?}", config);

  let store = db::open_store(&config)?;
  let admin = config.admin_credentials();
  if admin.is_none() {
    warn!("No admin credentials configured, article writes are open to everyone");
  }

  let handlebars_ref = web::Data::new(templates()?);

  // Got to save these for later because we'll be
  // destroying "config" by moving it into app_state as
  // another struct called SiteInfo.
  let bind_address = config.bind_address.clone();
  let cors_origin = config.cors_origin.clone();

  let app_state = web::Data::new(
    AppState {
      store,
      admin,
      site_info: config.into()
    }
  );

  info!("Starting server on {}", bind_address);
  HttpServer::new(move|| {
    // Cors has to be built per worker.
    let cors = match &cors_origin {
      Some(origin) => Cors::default()
        .allowed_origin(origin)
        .allow_any_method()
        .allow_any_header()
        .max_age(3600),
      None => Cors::default()
    };
    App::new()
      .app_data(app_state.clone())
      .app_data(handlebars_ref.clone())
      .wrap(middleware::Condition::new(cors_origin.is_some(), cors))
      .wrap(middleware::Logger::default())
      .configure(endpoints_config)
      .default_service(web::route().to(handlers::not_found))
  })
  .bind(&bind_address)
  .with_context(|| format!("Binding to {}", bind_address))?
  .run()
  .await
  .context("Start Actix web server")
}

// Route configuration, the extractor configs are in
// there too so the tests get the same 400 responses.
pub fn endpoints_config(cfg: &mut web::ServiceConfig) {
  cfg.app_data(web::JsonConfig::default().error_handler(|err, _| {
      Error::BadRequest(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|_, _| {
      Error::BadRequest("Invalid path arguments".to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|_, _| {
      Error::BadRequest("Invalid query string arguments".to_string()).into()
    }))
    .route("/", web::get().to(handlers::index))
    .route("/robots.txt", web::get().to(handlers::robots))
    .service(
      web::scope("/api")
        .service(
          web::resource("/articles")
            .route(web::get().to(handlers::articles))
            .route(web::post().to(handlers::create_article))
        )
        .service(
          web::resource("/articles/{id_or_slug}")
            .route(web::get().to(handlers::article))
            .route(web::put().to(handlers::update_article))
            .route(web::delete().to(handlers::delete_article))
        )
        .route("/articles/{id_or_slug}/jsonld", web::get().to(handlers::article_jsonld))
        .route("/jsonld", web::get().to(handlers::organization_jsonld))
        .route("/blog", web::get().to(handlers::blog))
        .route("/blog/categories", web::get().to(handlers::blog_categories))
        .route("/sitemap", web::get().to(handlers::sitemap))
        .route("/robots", web::get().to(handlers::robots))
    );
}
