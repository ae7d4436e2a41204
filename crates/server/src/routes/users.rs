//! User endpoints.

use axum::{Json, extract::State, http::StatusCode};
use orderdesk_core::{FieldErrors, UserId};
use serde::{Deserialize, Serialize};

use super::MessageResponse;
use super::extract::{JsonBody, PathParams};
use crate::db::{RepositoryError, UserRepository};
use crate::error::Result;
use crate::models::{NewUser, User};
use crate::state::AppState;

/// Body of `POST /users` and `PUT /users/{user_id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UserRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
}

impl UserRequest {
    fn validate(self) -> std::result::Result<NewUser, FieldErrors> {
        NewUser::validate(self.name, self.address, self.email)
    }
}

/// Wire representation of a user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub address: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            address: user.address,
            email: user.email.into_inner(),
        }
    }
}

/// `GET /users`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// `GET /users/{user_id}`
pub async fn show(
    State(state): State<AppState>,
    PathParams(id): PathParams<UserId>,
) -> Result<Json<UserResponse>> {
    let user = UserRepository::new(state.pool()).get(id).await?;
    Ok(Json(user.into()))
}

/// `POST /users`
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let new_user = body.validate()?;
    let user = UserRepository::new(state.pool()).create(&new_user).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `PUT /users/{user_id}`
///
/// Full replace: all three fields are required.
pub async fn update(
    State(state): State<AppState>,
    PathParams(id): PathParams<UserId>,
    JsonBody(body): JsonBody<UserRequest>,
) -> Result<Json<UserResponse>> {
    let repo = UserRepository::new(state.pool());
    // An unknown user is reported before any problem with the body.
    if !repo.exists(id).await? {
        return Err(RepositoryError::user_not_found(id).into());
    }
    let new_user = body.validate()?;
    let user = repo.update(id, &new_user).await?;
    Ok(Json(user.into()))
}

/// `DELETE /users/{user_id}`
pub async fn destroy(
    State(state): State<AppState>,
    PathParams(id): PathParams<UserId>,
) -> Result<Json<MessageResponse>> {
    UserRepository::new(state.pool()).delete(id).await?;
    Ok(Json(MessageResponse::new("User deleted")))
}
