//! Erreurs du chemin d'analyse et leur traduction HTTP

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Message renvoyé quand la requête ne contient pas de polygone
pub const MISSING_POLYGON: &str = "Ingen polygon mottatt";

/// Erreurs possibles lors d'une analyse
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Corps de requête absent ou inexploitable
    #[error("{0}")]
    Validation(String),

    /// `polygon` n'est pas un Polygon / MultiPolygon GeoJSON valide
    #[error("{0}")]
    Geometry(String),

    /// Coordonnées non géographiques ou échec du moteur de projection
    #[error("{0}")]
    Projection(String),

    /// Échec interne (pool de threads, etc.)
    #[error("{0}")]
    Internal(String),
}

impl AnalysisError {
    pub fn missing_polygon() -> Self {
        Self::Validation(MISSING_POLYGON.to_string())
    }

    /// Nom court de la catégorie, pour les logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Geometry(_) => "geometry",
            Self::Projection(_) => "projection",
            Self::Internal(_) => "internal",
        }
    }
}

/// Corps JSON d'une réponse d'erreur
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ResponseError for AnalysisError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Geometry(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Projection(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(kind = self.kind(), status = status.as_u16(), error = %message, "Analysis failed");
        } else {
            warn!(kind = self.kind(), status = status.as_u16(), error = %message, "Request rejected");
        }

        HttpResponse::build(status).json(ErrorBody { error: &message })
    }
}
