use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use lifeline_model::{
    LoginRequest, NewRescuer, Rescuer, RescuerId, RescuerLocation, RescuerStatus, RescuerUpdate,
};

use crate::{
    api_types::ApiResponse,
    errors::{AppError, AppResult},
    AppState,
};

/// Collected multipart fields for register/update. Text parts are profile
/// fields; the optional `image` part carries raw bytes.
#[derive(Debug, Default)]
struct RescuerForm {
    name: Option<String>,
    badge_id: Option<String>,
    callsign: Option<String>,
    phone: Option<String>,
    password: Option<String>,
    image: Option<Vec<u8>>,
}

async fn read_rescuer_form(mut multipart: Multipart) -> AppResult<RescuerForm> {
    let mut form = RescuerForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("malformed multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => form.name = Some(read_text(field).await?),
            "badge_id" => form.badge_id = Some(read_text(field).await?),
            "callsign" => form.callsign = Some(read_text(field).await?),
            "phone" => form.phone = Some(read_text(field).await?),
            "password" => form.password = Some(read_text(field).await?),
            "image" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::bad_request(format!("unreadable image part: {}", e)))?;
                if !bytes.is_empty() {
                    form.image = Some(bytes.to_vec());
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::bad_request(format!("unreadable form field: {}", e)))
}

fn required(value: Option<String>, name: &str) -> AppResult<String> {
    value.ok_or_else(|| AppError::bad_request(format!("missing field: {}", name)))
}

/// POST /api/rescuers — register a rescuer (multipart, optional image).
pub async fn register_rescuer_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Rescuer>>)> {
    let form = read_rescuer_form(multipart).await?;

    let rescuer = state
        .dispatch
        .register_rescuer(NewRescuer {
            name: required(form.name, "name")?,
            badge_id: required(form.badge_id, "badge_id")?,
            callsign: required(form.callsign, "callsign")?,
            phone: required(form.phone, "phone")?,
            password: required(form.password, "password")?,
            image: form.image,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(rescuer))))
}

/// GET /api/rescuers — list on-duty rescuers.
pub async fn list_rescuers_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Rescuer>>>> {
    let rescuers = state.dispatch.list_on_duty().await?;
    Ok(Json(ApiResponse::success(rescuers)))
}

/// GET /api/rescuers/locations — on-duty rescuers with a known position.
pub async fn list_locations_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Rescuer>>>> {
    let rescuers = state.dispatch.list_located().await?;
    Ok(Json(ApiResponse::success(rescuers)))
}

/// GET /api/rescuers/image/:id — raw profile image bytes.
///
/// Content type is fixed to image/jpeg; the store round-trips whatever
/// bytes were uploaded.
pub async fn rescuer_image_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let bytes = state.dispatch.rescuer_image(RescuerId(id)).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("image/jpeg"),
    );
    Ok((headers, bytes).into_response())
}

/// PUT /api/rescuers/:id — partial update, optional new image.
pub async fn update_rescuer_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Rescuer>>> {
    let form = read_rescuer_form(multipart).await?;

    let rescuer = state
        .dispatch
        .update_rescuer(
            RescuerId(id),
            RescuerUpdate {
                name: form.name,
                badge_id: form.badge_id,
                callsign: form.callsign,
                phone: form.phone,
                image: form.image,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(rescuer)))
}

/// DELETE /api/rescuers/:id — hard delete.
pub async fn delete_rescuer_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.dispatch.delete_rescuer(RescuerId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/rescuer/login — authenticate by badge, force status available.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<Rescuer>>> {
    let rescuer = state
        .dispatch
        .login(&request.badge_id, &request.password)
        .await?;

    Ok(Json(ApiResponse::success(rescuer)))
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    #[serde(rename = "rescuerId")]
    pub rescuer_id: RescuerId,
}

/// POST /api/rescuer/logout — force status off-duty.
pub async fn logout_handler(
    State(state): State<AppState>,
    Json(request): Json<LogoutRequest>,
) -> AppResult<StatusCode> {
    state.dispatch.logout(request.rescuer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct LocationAck {
    pub status: RescuerStatus,
}

/// POST /api/rescuer/location — update coordinates, derive status.
pub async fn report_location_handler(
    State(state): State<AppState>,
    Json(request): Json<RescuerLocation>,
) -> AppResult<Json<ApiResponse<LocationAck>>> {
    let status = state
        .dispatch
        .report_location(request.rescuer_id, request.lat, request.lon)
        .await?;

    Ok(Json(ApiResponse::success(LocationAck { status })))
}
