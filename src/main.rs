use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use vietqr_server::api;
use vietqr_server::config::Config;
use vietqr_server::VietQrService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load config: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    let service = web::Data::new(VietQrService::new(config.vietqr.clone()));

    let host = config.server.host.clone();
    let port = config.server.port;

    log::info!("Server starting on http://{}:{}", host, port);
    log::info!(
        "Assets: {} (template {}, QR {} px, logo ratio {})",
        config.vietqr.assets_dir.display(),
        config.vietqr.template,
        config.vietqr.qr_size,
        config.vietqr.logo_ratio
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);
        App::new()
            .app_data(service.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(api::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
