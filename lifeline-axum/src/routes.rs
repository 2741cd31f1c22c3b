use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};

use lifeline::Lifeline;
use lifeline_core::{
    NewHelpRequest, RepositoryProvider, RequestId, UserId,
    services::{ProfileUpdate, RequestUpdate, UserUpdate},
};

use crate::{
    error::{ApiError, Result},
    extractors::{AdminUser, AuthUser, OptionalAuthUser},
    middleware::{AppState, auth_middleware},
    types::*,
};

pub fn create_router<R>(lifeline: Arc<Lifeline<R>>) -> Router
where
    R: RepositoryProvider + 'static,
{
    let state = AppState { lifeline };

    let user_routes = Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/profile", get(get_profile_handler).put(update_profile_handler))
        .route("/volunteers", get(list_volunteers_handler))
        .route("/", get(list_users_handler))
        .route(
            "/{id}",
            put(admin_update_user_handler).delete(delete_user_handler),
        );

    let request_routes = Router::new()
        .route("/", post(create_request_handler).get(list_requests_handler))
        .route("/user/{user_id}", get(list_requests_by_user_handler))
        .route(
            "/{id}",
            get(get_request_handler)
                .put(update_request_handler)
                .delete(delete_request_handler),
        )
        .route("/{id}/status", put(update_status_handler));

    let admin_routes = Router::new().route("/dashboard", get(dashboard_handler));

    Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/requests", request_routes)
        .nest("/api/admin", admin_routes)
        .route("/api/health", get(health_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<R>,
        ))
        .with_state(state)
}

async fn health_handler<R>(State(state): State<AppState<R>>) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state.lifeline.health_check().await?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

// ----------------------------------------------------------------------
// Users
// ----------------------------------------------------------------------

async fn register_handler<R>(
    State(state): State<AppState<R>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let success = state
        .lifeline
        .register(
            &payload.name,
            &payload.email,
            &payload.password,
            payload.phone,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::from(success))))
}

async fn login_handler<R>(
    State(state): State<AppState<R>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let success = state
        .lifeline
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse::from(success)))
}

async fn get_profile_handler(AuthUser(user): AuthUser) -> Result<impl IntoResponse> {
    Ok(Json(UserResponse { user }))
}

async fn update_profile_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    if let (Some(current), Some(new)) = (&payload.current_password, &payload.new_password) {
        state.lifeline.change_password(&user.id, current, new).await?;
    }

    let user = state
        .lifeline
        .update_profile(
            &user.id,
            ProfileUpdate {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
            },
        )
        .await?;

    Ok(Json(UserResponse { user }))
}

async fn list_users_handler<R>(
    State(state): State<AppState<R>>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let users = state.lifeline.list_users().await?;
    Ok(Json(users))
}

async fn list_volunteers_handler<R>(
    State(state): State<AppState<R>>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let volunteers = state.lifeline.list_volunteers().await?;
    Ok(Json(volunteers))
}

async fn admin_update_user_handler<R>(
    State(state): State<AppState<R>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let user = state
        .lifeline
        .update_user(
            &UserId::new(&id),
            UserUpdate {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                role: payload.role,
                status: payload.status,
            },
        )
        .await?;

    Ok(Json(user))
}

async fn delete_user_handler<R>(
    State(state): State<AppState<R>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state.lifeline.delete_user(&UserId::new(&id)).await?;

    Ok(Json(MessageResponse {
        message: "User removed successfully".to_string(),
    }))
}

// ----------------------------------------------------------------------
// Help requests
// ----------------------------------------------------------------------

async fn create_request_handler<R>(
    State(state): State<AppState<R>>,
    OptionalAuthUser(user): OptionalAuthUser,
    Json(payload): Json<CreateHelpRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    // An explicit submitter id wins; otherwise attribute to the session.
    let user_id = payload
        .user_id
        .map(|id| UserId::new(&id))
        .or(user.map(|u| u.id));

    let new_request = NewHelpRequest::builder()
        .name(payload.name)
        .email(payload.email)
        .phone(payload.phone)
        .address(payload.address)
        .notes(payload.notes)
        .user_id(user_id)
        .build()?;

    let request = state.lifeline.create_request(new_request).await?;

    Ok((StatusCode::CREATED, Json(request)))
}

async fn list_requests_handler<R>(
    State(state): State<AppState<R>>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let requests = state.lifeline.list_requests().await?;
    Ok(Json(requests))
}

async fn get_request_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let request = state
        .lifeline
        .get_request(&RequestId::new(&id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))?;

    Ok(Json(request))
}

async fn list_requests_by_user_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(_user): AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let requests = state
        .lifeline
        .list_requests_by_user(&UserId::new(&user_id))
        .await?;

    Ok(Json(requests))
}

async fn update_request_handler<R>(
    State(state): State<AppState<R>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateHelpRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let request = state
        .lifeline
        .update_request(
            &RequestId::new(&id),
            RequestUpdate {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                address: payload.address,
                notes: payload.notes,
                status: payload.status,
                assigned_to: payload.assigned_to.map(|id| UserId::new(&id)),
            },
        )
        .await?;

    Ok(Json(request))
}

async fn update_status_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let request = state
        .lifeline
        .update_request_status(&RequestId::new(&id), &payload.status)
        .await?;

    Ok(Json(request))
}

async fn delete_request_handler<R>(
    State(state): State<AppState<R>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state.lifeline.delete_request(&RequestId::new(&id)).await?;

    Ok(Json(MessageResponse {
        message: "Request removed".to_string(),
    }))
}

// ----------------------------------------------------------------------
// Admin
// ----------------------------------------------------------------------

async fn dashboard_handler<R>(
    State(state): State<AppState<R>>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let summary = state.lifeline.dashboard().await?;
    Ok(Json(DashboardResponse { summary }))
}
