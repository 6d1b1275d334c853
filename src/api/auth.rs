use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::auth::{AuthResponse, Login, Signup, UserProfile};
use crate::domain::auth_session::AuthSession;
use crate::domain::user::User;
use crate::error::Result;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

pub async fn signup(State(state): State<AppState>, Json(payload): Json<Signup>) -> Result<impl IntoResponse> {
    let (session, user) =
        state.account_service.signup(payload.name, payload.email, payload.phone, payload.password).await?;

    Ok((StatusCode::CREATED, Json(map_session(session, user))))
}

pub async fn login(State(state): State<AppState>, Json(payload): Json<Login>) -> Result<impl IntoResponse> {
    let (session, user) = state.account_service.login(payload.email, payload.password).await?;

    Ok(Json(map_session(session, user)))
}

pub async fn me(auth_user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let user = state.account_service.current_user(auth_user.user_id).await?;

    Ok(Json(UserProfile::from(user)))
}

fn map_session(session: AuthSession, user: User) -> AuthResponse {
    AuthResponse { token: session.token, expires_at: session.expires_at, user: UserProfile::from(user) }
}
