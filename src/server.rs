use actix_files::Files;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::info;
use std::sync::Arc;
use tera::Tera;

use crate::config::Config;
use crate::handlers;
use crate::services::{Annotator, GeminiProvider, KeywordProvider};

pub async fn run(config: Config) -> std::io::Result<()> {
    let host = config.host.clone();
    let port = config.port;

    print_banner(&host, port);
    info!(
        "Server running at http://{}:{}/ (model: {}, variant: {:?})",
        host, port, config.model, config.variant
    );

    let tera = Tera::new("templates/**/*").expect("Failed to initialize Tera templates");

    let provider: Arc<dyn KeywordProvider> = Arc::new(GeminiProvider::new(
        config.api_key.clone(),
        config.model.clone(),
    ));
    let annotator = Annotator::new(provider, config.variant);
    let annotator = web::Data::new(annotator);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(annotator.clone())
            .configure(configure_routes)
    })
    .bind((host, port))?
    .run()
    .await
}

fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/annotate", web::post().to(handlers::annotate))
        .route("/healthz", web::get().to(|| async { "OK" }))
        .service(Files::new("/static", "static"));
}

fn print_banner(host: &str, port: u16) {
    let banner = r#"
 _____                     _ _   _
|_   _|_ _  __ _ ___ _ __ (_) |_| |__
  | |/ _` |/ _` / __| '_ \| | __| '_ \
  | | (_| | (_| \__ \ | | | | |_| | | |
  |_|\__,_|\__, |___/_| |_|_|\__|_| |_|
           |___/
"#;
    println!("{}", banner);
    println!("         Tagsmith server started at: http://{}:{}\n", host, port);
}
