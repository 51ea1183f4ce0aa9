//! HTTP API for enrollment and identification.
//!
//! API endpoints:
//! - GET    /api/health                  - service liveness
//! - GET    /api/db/status               - store connectivity and counts
//! - GET    /api/people                  - all people, newest first
//! - POST   /api/people                  - register a person
//! - GET    /api/people/{id}             - person with descriptor vectors
//! - DELETE /api/people/{id}             - delete a person (cascade)
//! - POST   /api/people/{id}/descriptors - enroll a descriptor
//! - POST   /api/recognize               - identify a probe descriptor
//! - GET    /public/uploads/*            - uploaded images

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use facewhiz_faceid::{FaceIdError, Gallery, NewPerson, Person};

use crate::config::ServiceConfig;
use crate::images;

/// Shared handler state.
#[derive(Clone)]
struct AppState {
    gallery: Arc<Gallery>,
    cfg: Arc<ServiceConfig>,
}

/// Start the HTTP server and block until it exits.
pub async fn serve(cfg: ServiceConfig, gallery: Gallery) -> anyhow::Result<()> {
    let addr = cfg.socket_addr()?;
    let cors = cors_layer(&cfg)?;
    let uploads_dir = cfg.uploads_dir.clone();
    let state = AppState {
        gallery: Arc::new(gallery),
        cfg: Arc::new(cfg),
    };

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/db/status", get(db_status))
        .route("/api/people", get(list_people).post(register_person))
        .route("/api/people/{id}", get(get_person).delete(delete_person))
        .route("/api/people/{id}/descriptors", post(enroll_descriptor))
        .route("/api/recognize", post(recognize))
        .nest_service("/public/uploads", ServeDir::new(uploads_dir))
        .layer(cors)
        .with_state(state);

    tracing::info!("facewhiz backend running on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn cors_layer(cfg: &ServiceConfig) -> anyhow::Result<CorsLayer> {
    let origins = cfg
        .allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}

/// Maps core errors onto HTTP status codes.
struct ApiError(FaceIdError);

impl From<FaceIdError> for ApiError {
    fn from(err: FaceIdError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            FaceIdError::Validation(_) | FaceIdError::DimensionMismatch { .. } => {
                StatusCode::BAD_REQUEST
            }
            FaceIdError::NotFound(_) => StatusCode::NOT_FOUND,
            FaceIdError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {}", self.0);
        }
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "ok": true,
        "service": "facewhiz-backend",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn db_status(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let (people, descriptors) = state.gallery.counts()?;
    Ok(Json(serde_json::json!({
        "connected": true,
        "peopleCount": people,
        "descriptorsCount": descriptors,
        "databasePath": state.cfg.db_path().display().to_string(),
    })))
}

async fn list_people(State(state): State<AppState>) -> Result<Json<Vec<Person>>, ApiError> {
    Ok(Json(state.gallery.people()?))
}

/// Person registration payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    department: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    image_base64: Option<String>,
    #[serde(default)]
    descriptor: Option<Vec<f32>>,
}

async fn register_person(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let image_url = req
        .image_base64
        .as_deref()
        .and_then(|data| images::save_data_url(&state.cfg.uploads_dir, data, None));

    let person = state.gallery.register(NewPerson {
        name: req.name,
        email: req.email,
        phone: req.phone,
        department: req.department,
        role: req.role,
        image_url,
    })?;

    // The initial capture is best-effort: an invalid descriptor skips
    // enrollment without failing the registration.
    if let Some(vector) = req.descriptor {
        match state.gallery.enroll(&person.id, vector) {
            Ok(descriptor_id) => {
                tracing::debug!("enrolled initial descriptor {descriptor_id} for {}", person.id)
            }
            Err(err) => tracing::debug!("initial descriptor skipped: {err}"),
        }
    }

    Ok((StatusCode::CREATED, Json(person)))
}

/// Person plus its raw descriptor vectors.
#[derive(Debug, Serialize)]
struct PersonDetail {
    #[serde(flatten)]
    person: Person,
    descriptors: Vec<Vec<f32>>,
}

async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PersonDetail>, ApiError> {
    let person = state
        .gallery
        .person(&id)?
        .ok_or(FaceIdError::NotFound(id.clone()))?;
    let descriptors = state
        .gallery
        .descriptors_for(&id)?
        .into_iter()
        .map(|d| d.vector)
        .collect();

    Ok(Json(PersonDetail { person, descriptors }))
}

async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.gallery.delete_person(&id)?;
    tracing::info!("deleted person {id}");
    Ok(Json(serde_json::json!({
        "ok": true,
        "message": "Person deleted successfully",
    })))
}

/// Descriptor enrollment payload.
#[derive(Debug, Deserialize)]
struct EnrollRequest {
    descriptor: Vec<f32>,
}

async fn enroll_descriptor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EnrollRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let descriptor_id = state.gallery.enroll(&id, req.descriptor)?;
    tracing::debug!("enrolled descriptor {descriptor_id} for {id}");
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "ok": true }))))
}

/// Identification payload; the threshold falls back to the configured default.
#[derive(Debug, Deserialize)]
struct RecognizeRequest {
    descriptor: Vec<f32>,
    #[serde(default)]
    threshold: Option<f32>,
}

/// Identification response. `distance` and `confidence` are present only on
/// a match; "no match" carries neither.
#[derive(Debug, Serialize)]
struct RecognizeResponse {
    #[serde(rename = "match")]
    matched: Option<Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f32>,
    threshold: f32,
}

async fn recognize(
    State(state): State<AppState>,
    Json(req): Json<RecognizeRequest>,
) -> Result<Json<RecognizeResponse>, ApiError> {
    let threshold = req.threshold.unwrap_or(state.cfg.default_threshold);
    let hit = state.gallery.identify(&req.descriptor, threshold)?;

    // The winning person record can vanish between the snapshot and this
    // lookup; report no match in that case.
    let resolved = match hit {
        Some(m) => state.gallery.person(&m.person_id)?.map(|person| (m, person)),
        None => None,
    };

    let resp = match resolved {
        Some((m, person)) => {
            tracing::info!(
                "match: {} distance={:.4} threshold={threshold}",
                person.name,
                m.distance
            );
            RecognizeResponse {
                matched: Some(person),
                distance: Some(m.distance),
                confidence: Some(m.confidence),
                threshold,
            }
        }
        None => {
            tracing::info!("no match (threshold={threshold})");
            RecognizeResponse {
                matched: None,
                distance: None,
                confidence: None,
                threshold,
            }
        }
    };
    Ok(Json(resp))
}
