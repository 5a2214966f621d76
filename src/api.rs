// Church Roster - REST API with Axum
// JSON surface over the roster; HTML rendering lives elsewhere.

use crate::entities::attendance::{attendances_for_ministry, record_attendance};
use crate::entities::church::{create_church, get_church, list_churches};
use crate::entities::member::{
    create_member, delete_member, get_member, list_members, search_members, today, update_member,
};
use crate::entities::ministry::{
    add_charge, create_ministry, get_ministry, ministries_by_church, ministry_members,
};
use crate::db::parse_date;
use crate::entities::{AttendanceForm, ChurchForm, Gender, Member, MemberForm, MinistryForm};
use crate::error::RosterError;
use crate::pagination::{Page, PageRequest};
use crate::reports::{by_gender, by_range};
use crate::status::{statuses_for_select, MemberStatus};
use crate::validation::{validate_member, ValidationError};
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Path, Query, Request, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use rusqlite::Connection;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    per_page: u32,
}

impl AppState {
    pub fn new(conn: Connection, per_page: u32) -> Self {
        AppState {
            db: Arc::new(Mutex::new(conn)),
            per_page,
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db.lock().map_err(|_| {
            tracing::error!("database mutex poisoned");
            ApiError::Internal
        })
    }
}

// ============================================================================
// Response envelopes
// ============================================================================

/// API Response wrapper; `data` on success, `error` on failure
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorDetail>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<ValidationError>,
}

#[derive(Debug)]
pub enum ApiError {
    Roster(RosterError),
    /// Body that is not JSON, or not shaped like the expected object
    InvalidBody { status: StatusCode, message: String },
    Internal,
}

impl From<RosterError> for ApiError {
    fn from(err: RosterError) -> Self {
        ApiError::Roster(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            ApiError::Roster(RosterError::Validation(errors)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_FAILED",
                "The submitted fields are invalid".to_string(),
                errors,
            ),
            ApiError::Roster(err @ RosterError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string(), Vec::new())
            }
            ApiError::Roster(err) => {
                tracing::error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    Vec::new(),
                )
            }
            ApiError::InvalidBody { status, message } => (status, "INVALID_BODY", message, Vec::new()),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                Vec::new(),
            ),
        };

        let body: ApiResponse<()> = ApiResponse {
            success: false,
            data: None,
            error: Some(ErrorDetail {
                code,
                message,
                fields,
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// `Json` whose rejection answers in the `ApiResponse` envelope
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// Member plus the derived values screens display
#[derive(Serialize)]
pub struct MemberResponse {
    #[serde(flatten)]
    member: Member,
    full_name: String,
    semi_full_name: String,
    status_name: &'static str,
    country_name: String,
    age: Option<u32>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            full_name: member.full_name(),
            semi_full_name: member.semi_full_name(),
            status_name: member.status_name(),
            country_name: member.country_name(),
            age: member.age(today()),
            member,
        }
    }
}

#[derive(Serialize)]
struct StatusOption {
    label: &'static str,
    code: &'static str,
}

// ============================================================================
// Query parameters
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct IndexParams {
    name: Option<String>,
    page: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportScope {
    church_id: Option<String>,
}

/// Member fields as submitted. Status, gender and birth date arrive as raw
/// strings so an unparsable value is reported against its field.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MemberPayload {
    first_name: String,
    last_name: String,
    address: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    birth_date: Option<String>,
    gender: Option<String>,
    status: Option<String>,
    church_id: Option<String>,
    country: Option<String>,
    charge_ids: Vec<String>,
}

impl MemberPayload {
    fn into_form(self) -> Result<MemberForm, RosterError> {
        let mut errors = Vec::new();

        let birth_date = match self.birth_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    errors.push(ValidationError::new("Member", "birth_date", "is not a YYYY-MM-DD date"));
                }
                parsed
            }
        };

        let gender = match self.gender.as_deref().map(str::trim) {
            None | Some("") => Gender::default(),
            Some(code) => Gender::from_code(code).unwrap_or_else(|| {
                errors.push(ValidationError::new("Member", "gender", "is not recognized"));
                Gender::default()
            }),
        };

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => MemberStatus::default(),
            Some(code) => MemberStatus::from_code(code).unwrap_or_else(|| {
                errors.push(ValidationError::new("Member", "status", "is not a known status"));
                MemberStatus::default()
            }),
        };

        let form = MemberForm {
            first_name: self.first_name,
            last_name: self.last_name,
            address: self.address,
            email: self.email,
            phone: self.phone,
            birth_date,
            gender,
            status,
            church_id: self.church_id,
            country: self.country,
            charge_ids: self.charge_ids,
        };

        if errors.is_empty() {
            return Ok(form);
        }
        if let Err(more) = validate_member(&form) {
            errors.extend(more);
        }
        Err(RosterError::Validation(errors))
    }
}

#[derive(Debug, Deserialize)]
pub struct ChargeForm {
    #[serde(default)]
    name: String,
}

type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    ApiResponse::ok("OK")
}

/// GET /api/statuses - (label, code) pairs for a select control
async fn get_statuses() -> impl IntoResponse {
    let statuses: Vec<StatusOption> = statuses_for_select()
        .into_iter()
        .map(|(label, code)| StatusOption { label, code })
        .collect();

    ApiResponse::ok(statuses)
}

/// GET /api/members?name=&page= - Page of members, or a redirect to the
/// only member matching `name`
async fn index_members(
    State(state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> ApiResult<Response> {
    let conn = state.conn()?;
    let request = PageRequest::new(params.page, state.per_page);

    let page: Page<Member> = match params.name.as_deref().filter(|n| !n.trim().is_empty()) {
        Some(name) => {
            let mut found = search_members(&conn, name)?;
            if found.len() == 1 {
                let member = found.remove(0);
                return Ok(Redirect::to(&format!("/api/members/{}", member.id)).into_response());
            }
            Page::from_items(found, request)
        }
        None => list_members(&conn, request)?,
    };

    Ok(ApiResponse::ok(page.map(MemberResponse::from)).into_response())
}

/// POST /api/members
async fn create_member_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<MemberPayload>,
) -> ApiResult<Response> {
    let form = payload.into_form()?;
    let conn = state.conn()?;
    let member = create_member(&conn, &form)?;

    Ok((StatusCode::CREATED, ApiResponse::ok(MemberResponse::from(member))).into_response())
}

/// GET /api/members/:id
async fn show_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<MemberResponse>>> {
    let conn = state.conn()?;
    let member = get_member(&conn, &id)?.ok_or_else(|| RosterError::not_found("member", &id))?;

    Ok(ApiResponse::ok(member.into()))
}

/// PUT /api/members/:id
async fn update_member_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<MemberPayload>,
) -> ApiResult<Json<ApiResponse<MemberResponse>>> {
    let form = payload.into_form()?;
    let conn = state.conn()?;
    let member = update_member(&conn, &id, &form)?;

    Ok(ApiResponse::ok(member.into()))
}

/// DELETE /api/members/:id
async fn destroy_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<&'static str>>> {
    let conn = state.conn()?;
    delete_member(&conn, &id)?;

    Ok(ApiResponse::ok("Member was successfully destroyed."))
}

/// GET /api/reports/ages
async fn age_report(
    State(state): State<AppState>,
    Query(scope): Query<ReportScope>,
) -> ApiResult<impl IntoResponse> {
    let conn = state.conn()?;
    let buckets = by_range(&conn, scope.church_id.as_deref(), today())?;

    Ok(ApiResponse::ok(buckets))
}

/// GET /api/reports/genders
async fn gender_report(
    State(state): State<AppState>,
    Query(scope): Query<ReportScope>,
) -> ApiResult<impl IntoResponse> {
    let conn = state.conn()?;
    let buckets = by_gender(&conn, scope.church_id.as_deref())?;

    Ok(ApiResponse::ok(buckets))
}

/// GET /api/churches
async fn index_churches(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let conn = state.conn()?;
    Ok(ApiResponse::ok(list_churches(&conn)?))
}

/// POST /api/churches
async fn create_church_handler(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<ChurchForm>,
) -> ApiResult<impl IntoResponse> {
    let conn = state.conn()?;
    let church = create_church(&conn, &form)?;

    Ok((StatusCode::CREATED, ApiResponse::ok(church)))
}

/// GET /api/churches/:id/ministries
async fn church_ministries(
    State(state): State<AppState>,
    Path(church_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let conn = state.conn()?;
    if get_church(&conn, &church_id)?.is_none() {
        return Err(RosterError::not_found("church", &church_id).into());
    }

    Ok(ApiResponse::ok(ministries_by_church(&conn, &church_id)?))
}

/// POST /api/ministries
async fn create_ministry_handler(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<MinistryForm>,
) -> ApiResult<impl IntoResponse> {
    let conn = state.conn()?;
    let ministry = create_ministry(&conn, &form)?;

    Ok((StatusCode::CREATED, ApiResponse::ok(ministry)))
}

/// GET /api/ministries/:id
async fn show_ministry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let conn = state.conn()?;
    let ministry = get_ministry(&conn, &id)?.ok_or_else(|| RosterError::not_found("ministry", &id))?;

    Ok(ApiResponse::ok(ministry))
}

/// GET /api/ministries/:id/members
async fn show_ministry_members(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let conn = state.conn()?;
    if get_ministry(&conn, &id)?.is_none() {
        return Err(RosterError::not_found("ministry", &id).into());
    }

    let members: Vec<MemberResponse> = ministry_members(&conn, &id)?
        .into_iter()
        .map(MemberResponse::from)
        .collect();

    Ok(ApiResponse::ok(members))
}

/// POST /api/ministries/:id/charges
async fn create_charge(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(form): ApiJson<ChargeForm>,
) -> ApiResult<impl IntoResponse> {
    let conn = state.conn()?;
    let charge = add_charge(&conn, &id, &form.name)?;

    Ok((StatusCode::CREATED, ApiResponse::ok(charge)))
}

/// GET /api/ministries/:id/attendances
async fn index_attendances(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let conn = state.conn()?;
    if get_ministry(&conn, &id)?.is_none() {
        return Err(RosterError::not_found("ministry", &id).into());
    }

    Ok(ApiResponse::ok(attendances_for_ministry(&conn, &id)?))
}

/// POST /api/ministries/:id/attendances
async fn create_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(form): ApiJson<AttendanceForm>,
) -> ApiResult<impl IntoResponse> {
    let conn = state.conn()?;
    let attendance = record_attendance(&conn, &id, &form)?;

    Ok((StatusCode::CREATED, ApiResponse::ok(attendance)))
}

// ============================================================================
// Router
// ============================================================================

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/statuses", get(get_statuses))
        .route("/members", get(index_members).post(create_member_handler))
        .route(
            "/members/:id",
            get(show_member)
                .put(update_member_handler)
                .delete(destroy_member),
        )
        .route("/reports/ages", get(age_report))
        .route("/reports/genders", get(gender_report))
        .route("/churches", get(index_churches).post(create_church_handler))
        .route("/churches/:id/ministries", get(church_ministries))
        .route("/ministries", axum::routing::post(create_ministry_handler))
        .route("/ministries/:id", get(show_ministry))
        .route("/ministries/:id/members", get(show_ministry_members))
        .route("/ministries/:id/charges", axum::routing::post(create_charge))
        .route(
            "/ministries/:id/attendances",
            get(index_attendances).post(create_attendance),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
