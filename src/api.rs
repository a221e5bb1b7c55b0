use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use crate::error::VietQrError;
use crate::vietqr::{VietQrQuery, VietQrResponse, VietQrService};

#[derive(Serialize)]
struct ServerInfo {
    message: String,
    status: String,
    version: String,
    endpoints: Vec<String>,
}

// Service info
async fn index() -> Result<HttpResponse> {
    let info = ServerInfo {
        message: "VietQR generator".to_string(),
        status: "running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: vec!["/vietqr".to_string(), "/api/vietqr".to_string()],
    };
    Ok(HttpResponse::Ok().json(info))
}

// PNG image
async fn vietqr_png(
    service: web::Data<VietQrService>,
    query: web::Query<VietQrQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let service = service.into_inner();

    match web::block(move || service.generate_from_query(query)).await {
        Ok(Ok(generated)) => {
            log::info!("VietQR generated, payload {}", generated.payload);
            Ok(HttpResponse::Ok()
                .content_type("image/png")
                .body(generated.png))
        }
        Ok(Err(e)) => Ok(error_response(&e)),
        Err(e) => {
            log::error!("VietQR worker failed: {}", e);
            Ok(HttpResponse::InternalServerError().json(failure(e.to_string())))
        }
    }
}

// JSON with payload and data URL
async fn vietqr_json(
    service: web::Data<VietQrService>,
    query: web::Query<VietQrQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let service = service.into_inner();

    match web::block(move || service.generate_data(query)).await {
        Ok(Ok(data)) => {
            log::info!("VietQR generated, payload {}", data.payload);
            Ok(HttpResponse::Ok().json(VietQrResponse {
                success: true,
                data: Some(data),
                error: None,
            }))
        }
        Ok(Err(e)) => Ok(error_response(&e)),
        Err(e) => {
            log::error!("VietQR worker failed: {}", e);
            Ok(HttpResponse::InternalServerError().json(failure(e.to_string())))
        }
    }
}

fn failure(error: String) -> VietQrResponse {
    VietQrResponse {
        success: false,
        data: None,
        error: Some(error),
    }
}

fn error_response(e: &VietQrError) -> HttpResponse {
    if e.is_client_error() {
        log::warn!("Rejected VietQR request: {}", e);
        HttpResponse::BadRequest().json(failure(e.to_string()))
    } else {
        log::error!("VietQR generation failed: {}", e);
        HttpResponse::InternalServerError().json(failure(e.to_string()))
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/vietqr", web::get().to(vietqr_png))
        .service(web::scope("/api").route("/vietqr", web::get().to(vietqr_json)));
}
