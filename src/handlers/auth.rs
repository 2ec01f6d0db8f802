use askama::Template;
use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use crate::{
    database::Database,
    errors::ServiceError,
    handlers::redirect_with_notice,
    middleware::{get_current_user, SESSION_COOKIE},
    models::User,
    utils::{hash_password, verify_password},
};

const SESSION_HOURS: i64 = 24;
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    error: String,
    notice: String,
}

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterTemplate {
    error: String,
    name: String,
    email: String,
}

#[derive(Template)]
#[template(path = "profile.html")]
struct ProfileTemplate {
    user_name: String,
    email: String,
    error: String,
    notice: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    confirm: String,
}

#[derive(Deserialize)]
pub struct PasswordForm {
    #[serde(default)]
    new_password: String,
    #[serde(default)]
    confirm: String,
}

#[derive(Deserialize)]
pub struct NoticeParams {
    notice: Option<String>,
}

pub async fn login_page(Query(params): Query<NoticeParams>) -> Result<Html<String>, ServiceError> {
    let template = LoginTemplate {
        error: String::new(),
        notice: params.notice.unwrap_or_default(),
    };
    Ok(Html(template.render()?))
}

pub async fn register_page() -> Result<Html<String>, ServiceError> {
    let template = RegisterTemplate {
        error: String::new(),
        name: String::new(),
        email: String::new(),
    };
    Ok(Html(template.render()?))
}

pub async fn login(
    State(db): State<Database>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response, ServiceError> {
    let email = form.email.trim().to_lowercase();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?1")
        .bind(&email)
        .fetch_optional(&db)
        .await?;

    let authenticated = user
        .as_ref()
        .map(|user| verify_password(&form.password, &user.password_hash).unwrap_or(false))
        .unwrap_or(false);
    let Some(user) = user.filter(|_| authenticated) else {
        let template = LoginTemplate {
            error: "E-mail ou senha inválidos.".to_string(),
            notice: String::new(),
        };
        return Ok((StatusCode::UNAUTHORIZED, Html(template.render()?)).into_response());
    };

    let session_id = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::hours(SESSION_HOURS);
    sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES (?1, ?2, ?3)")
        .bind(&session_id)
        .bind(user.id)
        .bind(expires_at)
        .execute(&db)
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::hours(SESSION_HOURS))
        .build();
    cookies.add(cookie);

    Ok(Redirect::to("/dashboard").into_response())
}

pub async fn logout(State(db): State<Database>, cookies: Cookies) -> Result<Redirect, ServiceError> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        sqlx::query("DELETE FROM sessions WHERE id = ?1")
            .bind(cookie.value())
            .execute(&db)
            .await?;
    }
    cookies.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());

    Ok(redirect_with_notice("/login", "Você saiu do sistema."))
}

pub async fn register(
    State(db): State<Database>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, ServiceError> {
    let name = form.name.trim().to_string();
    let email = form.email.trim().to_lowercase();

    let rerender = |error: &str| -> Result<Response, ServiceError> {
        let template = RegisterTemplate {
            error: error.to_string(),
            name: name.clone(),
            email: email.clone(),
        };
        Ok((StatusCode::BAD_REQUEST, Html(template.render()?)).into_response())
    };

    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        return rerender("Preencha todos os campos.");
    }
    if form.password != form.confirm {
        return rerender("As senhas não conferem.");
    }
    if form.password.len() < MIN_PASSWORD_LEN {
        return rerender("A senha deve ter pelo menos 6 caracteres.");
    }

    let password_hash = hash_password(&form.password)
        .map_err(|_| ServiceError::InvalidInput("could not hash password".to_string()))?;

    let result = sqlx::query(
        "INSERT INTO users (name, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(&name)
    .bind(&email)
    .bind(&password_hash)
    .bind(Utc::now())
    .execute(&db)
    .await
    .map_err(ServiceError::from);

    match result {
        Ok(_) => Ok(redirect_with_notice("/login", "Conta criada! Faça login.").into_response()),
        Err(ServiceError::AlreadyExists(_)) => {
            rerender("Já existe uma conta com esse e-mail.")
        }
        Err(err) => Err(err),
    }
}

pub async fn profile_page(
    State(db): State<Database>,
    cookies: Cookies,
    Query(params): Query<NoticeParams>,
) -> Result<Response, ServiceError> {
    let Some(current_user) = get_current_user(cookies, &db).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let template = ProfileTemplate {
        user_name: current_user.name,
        email: current_user.email,
        error: String::new(),
        notice: params.notice.unwrap_or_default(),
    };
    Ok(Html(template.render()?).into_response())
}

pub async fn change_password(
    State(db): State<Database>,
    cookies: Cookies,
    Form(form): Form<PasswordForm>,
) -> Result<Response, ServiceError> {
    let Some(current_user) = get_current_user(cookies, &db).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let rerender = |error: &str| -> Result<Response, ServiceError> {
        let template = ProfileTemplate {
            user_name: current_user.name.clone(),
            email: current_user.email.clone(),
            error: error.to_string(),
            notice: String::new(),
        };
        Ok((StatusCode::BAD_REQUEST, Html(template.render()?)).into_response())
    };

    let new_password = form.new_password.trim();
    if new_password.is_empty() || form.confirm.trim().is_empty() {
        return rerender("Preencha os dois campos de senha.");
    }
    if new_password != form.confirm.trim() {
        return rerender("As senhas não conferem.");
    }
    if new_password.len() < MIN_PASSWORD_LEN {
        return rerender("A senha deve ter pelo menos 6 caracteres.");
    }

    let password_hash = hash_password(new_password)
        .map_err(|_| ServiceError::InvalidInput("could not hash password".to_string()))?;
    sqlx::query("UPDATE users SET password_hash = ?1 WHERE id = ?2")
        .bind(&password_hash)
        .bind(current_user.id)
        .execute(&db)
        .await?;

    Ok(redirect_with_notice("/profile", "Senha atualizada com sucesso.").into_response())
}
