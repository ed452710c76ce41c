//! Serveur HTTP (actix-web)
//!
//! - `POST /analyze` : `{"polygon": <géométrie GeoJSON>}` → surface par catégorie
//! - `GET /dataset` : métadonnées du jeu chargé
//!
//! Toutes les réponses portent `Access-Control-Allow-Origin: *`.

use std::time::Instant;

use actix_web::http::header;
use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;
use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use crate::analysis::Analyzer;
use crate::config::Config;
use crate::error::AnalysisError;
use crate::report::DatasetInfo;

/// En-têtes CORS ajoutés à chaque réponse
pub fn cors() -> DefaultHeaders {
    DefaultHeaders::new().add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
}

/// Déclare les routes du service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/analyze")
            .route(web::post().to(analyze))
            .route(web::method(Method::OPTIONS).to(preflight)),
    )
    .service(
        web::resource("/dataset")
            .route(web::get().to(dataset))
            .route(web::method(Method::OPTIONS).to(preflight)),
    );
}

/// Démarre le serveur et bloque jusqu'à son arrêt
pub async fn run(config: &Config, analyzer: Analyzer) -> Result<()> {
    let data = web::Data::new(analyzer);
    let max_body = config.max_body;

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .app_data(web::PayloadConfig::new(max_body))
            .wrap(cors())
            .configure(configure)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    let (host, port) = config.bind_address();
    let server = server
        .bind((host.as_str(), port))
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    info!(host = %host, port = port, workers = ?config.workers, max_body = max_body, "Listening");
    server.run().await.context("HTTP server failed")
}

async fn analyze(
    state: web::Data<Analyzer>,
    body: Result<web::Bytes, actix_web::Error>,
) -> Result<HttpResponse, AnalysisError> {
    let started = Instant::now();
    let body = body.map_err(|e| AnalysisError::Validation(e.to_string()))?;
    let polygon = extract_polygon(&body)?;

    let analyzer = state.into_inner();
    let summary = web::block(move || analyzer.analyze_geojson(&polygon))
        .await
        .map_err(|e| AnalysisError::Internal(e.to_string()))??;

    info!(
        categories = summary.len(),
        total = summary.total(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Analysis done"
    );
    Ok(HttpResponse::Ok().json(&summary))
}

async fn dataset(state: web::Data<Analyzer>) -> HttpResponse {
    HttpResponse::Ok().json(DatasetInfo::from_analyzer(&state))
}

async fn preflight() -> HttpResponse {
    HttpResponse::NoContent()
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
        .insert_header((header::ACCESS_CONTROL_MAX_AGE, "86400"))
        .finish()
}

/// Extrait la valeur `polygon` du corps ; tout autre corps est refusé
fn extract_polygon(body: &[u8]) -> Result<Value, AnalysisError> {
    let mut request: Value =
        serde_json::from_slice(body).map_err(|_| AnalysisError::missing_polygon())?;

    match request.get_mut("polygon").map(Value::take) {
        None | Some(Value::Null) => Err(AnalysisError::missing_polygon()),
        Some(polygon) => Ok(polygon),
    }
}
