use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit,
    db::DbPool,
    dto::auth::{Claims, LoginRequest, LoginResponse, SignupRequest},
    error::{AppError, AppResult},
    middleware::auth::jwt_secret,
    models::{Role, User},
    response::{ApiResponse, Meta},
};

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    phone: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            role: Role::from_db(&row.role),
            created_at: row.created_at,
        }
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn signup_user(pool: &DbPool, payload: SignupRequest) -> AppResult<ApiResponse<User>> {
    let SignupRequest {
        name,
        email,
        password,
        phone,
        role,
    } = payload;

    let email = email.trim().to_lowercase();
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    if !email.contains('@') {
        return Err(AppError::BadRequest("email is invalid".into()));
    }
    if password.len() < 6 {
        return Err(AppError::BadRequest(
            "password must be at least 6 characters".into(),
        ));
    }
    let role = role.unwrap_or(Role::Client);
    if role == Role::Admin {
        return Err(AppError::BadRequest("admin accounts cannot self-register".into()));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await?;

    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let password_hash = hash_password(&password)?;

    let row: UserRow = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, phone, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, email, password_hash, phone, role, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name.trim())
    .bind(email.as_str())
    .bind(password_hash)
    .bind(phone)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;
    let user = User::from(row);

    audit::record(
        pool,
        Some(user.id),
        "user_signup",
        "users",
        serde_json::json!({ "user_id": user.id, "role": user.role }),
    )
    .await;
    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user registered");

    Ok(ApiResponse::success("User created", user, None))
}

pub async fn login_user(
    pool: &DbPool,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();
    let row: Option<UserRow> = sqlx::query_as(
        "SELECT id, name, email, password_hash, phone, role, created_at FROM users WHERE email = $1",
    )
    .bind(email.as_str())
    .fetch_optional(pool)
    .await?;

    let row = match row {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&row.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let user = User::from(row);
    let token = issue_token(&user)?;

    audit::record(
        pool,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {}", token),
            user,
        },
        Some(Meta::empty()),
    ))
}

fn issue_token(user: &User) -> AppResult<String> {
    let secret = jwt_secret()?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.as_str().to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}
