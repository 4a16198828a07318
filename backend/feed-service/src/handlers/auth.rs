/// Signup and login endpoints.
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::security::{jwt::JwtKeys, password};

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "a valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 5, message = "password must be at least 5 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub email: String,
    #[validate(length(min = 5, message = "password must be at least 5 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignupResponse {
    message: String,
    user_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    user_id: Uuid,
}

/// Register a new account
/// POST /auth/signup
pub async fn signup(
    pool: web::Data<PgPool>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse> {
    let mut req = body.into_inner();
    req.email = normalize_email(&req.email);
    req.validate()?;

    if user_repo::email_exists(&pool, &req.email).await? {
        return Err(AppError::Conflict("email address already in use".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;
    let user = user_repo::create_user(&pool, &req.email, &req.name, &password_hash).await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(HttpResponse::Created().json(SignupResponse {
        message: "User created successfully".to_string(),
        user_id: user.id,
    }))
}

/// Exchange credentials for a JWT
/// POST /auth/login
pub async fn login(
    pool: web::Data<PgPool>,
    keys: web::Data<JwtKeys>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let mut req = body.into_inner();
    req.email = normalize_email(&req.email);
    req.validate()?;

    let user = user_repo::find_by_email(&pool, &req.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid email or password".to_string()))?;

    password::verify_password(&req.password, &user.password_hash)?;

    let token = keys.issue(user.id, &user.email)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user_id: user.id,
    }))
}

/// Emails are stored and compared lowercased with surrounding
/// whitespace stripped.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
