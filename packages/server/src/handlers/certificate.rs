use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::issuance::{IssueRequest, verify::verify_code};
use crate::models::certificate::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/certificates",
    tag = "Certificates",
    operation_id = "issueCertificate",
    summary = "Issue a certificate for a completed course",
    description = "Renders the certificate document, uploads it to the object store and persists the record. Invoked by the course-completion subsystem. Requires `certificate:issue` permission.",
    request_body = IssueCertificateRequest,
    responses(
        (status = 201, description = "Certificate issued", body = CertificateResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 502, description = "Object store unavailable (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = payload.user_id, course_id = payload.course_id))]
pub async fn issue_certificate(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<IssueCertificateRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("certificate:issue")?;
    validate_issue_certificate(&payload)?;

    let model = state
        .issuance
        .issue(IssueRequest {
            user_id: payload.user_id,
            course_id: payload.course_id,
            user_name: payload.user_name.trim().to_string(),
            course_title: payload.course_title.trim().to_string(),
            final_score: payload.final_score,
            expires_at: payload.expires_at,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CertificateResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/certificates/verify/{code}",
    tag = "Certificates",
    operation_id = "verifyCertificate",
    summary = "Verify a certificate by its public code",
    description = "Public, unauthenticated check. Distinguishes valid, revoked, expired and unknown codes; all four outcomes are 200 responses.",
    params(("code" = String, Path, description = "Verification code printed on the certificate")),
    responses(
        (status = 200, description = "Verification outcome", body = VerifyResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn verify_certificate(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<VerifyResponse>, AppError> {
    let outcome = verify_code(state.repo.as_ref(), code.trim()).await?;
    Ok(Json(VerifyResponse::from(outcome)))
}

#[utoipa::path(
    get,
    path = "/certificates/mine",
    tag = "Certificates",
    operation_id = "listMyCertificates",
    summary = "List the authenticated learner's certificates",
    description = "Returns the caller's certificates ordered by completion date, most recent first. Revoked certificates are included and flagged.",
    responses(
        (status = 200, description = "The caller's certificates", body = Vec<CertificateResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_my_certificates(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CertificateResponse>>, AppError> {
    let models = state.repo.find_by_owner(auth_user.user_id).await?;
    Ok(Json(
        models.into_iter().map(CertificateResponse::from).collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/certificates/{certificate_id}/revoke",
    tag = "Certificates",
    operation_id = "revokeCertificate",
    summary = "Revoke an issued certificate",
    description = "Marks the certificate revoked with a reason. Requires `certificate:revoke` permission. Revocation is permanent; a second call returns 409 ALREADY_REVOKED and leaves the original revocation untouched.",
    params(("certificate_id" = String, Path, description = "Certificate identifier, e.g. CERT-20260829143055-7KQ2XN")),
    request_body = RevokeCertificateRequest,
    responses(
        (status = 200, description = "Certificate revoked", body = CertificateResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Certificate not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already revoked (ALREADY_REVOKED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(certificate_id = %certificate_id))]
pub async fn revoke_certificate(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(certificate_id): Path<String>,
    AppJson(payload): AppJson<RevokeCertificateRequest>,
) -> Result<Json<CertificateResponse>, AppError> {
    auth_user.require_permission("certificate:revoke")?;
    validate_revoke_certificate(&payload)?;

    let model = state
        .repo
        .revoke(&certificate_id, payload.reason.trim())
        .await?;

    Ok(Json(model.into()))
}
