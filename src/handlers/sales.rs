use askama::Template;
use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::{
    database::Database,
    errors::ServiceError,
    filters,
    handlers::redirect_with_notice,
    handlers::stock::picker_products,
    middleware::get_current_user,
    models::{ProductDisplay, SaleDisplay},
    store::{QueryService, StockEngine},
};

#[derive(Template)]
#[template(path = "sales.html")]
struct SalesTemplate {
    user_name: String,
    sales: Vec<SaleDisplay>,
    total_items: i64,
    total_value_cents: i64,
    d1: String,
    d2: String,
    notice: String,
}

#[derive(Template)]
#[template(path = "sale_form.html")]
struct SaleFormTemplate {
    user_name: String,
    products: Vec<ProductDisplay>,
    error: String,
}

#[derive(Deserialize)]
pub struct SalesParams {
    d1: Option<String>,
    d2: Option<String>,
    notice: Option<String>,
}

#[derive(Deserialize)]
pub struct SaleForm {
    #[serde(default)]
    product_id: String,
    #[serde(default)]
    quantity: String,
}

/// Parses a `YYYY-MM-DD` query value; blank or malformed input means no bound.
pub(crate) fn parse_date_param(value: Option<&str>) -> Option<NaiveDate> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

pub async fn sales_list(
    State(db): State<Database>,
    cookies: Cookies,
    Query(params): Query<SalesParams>,
) -> Result<Response, ServiceError> {
    let Some(current_user) = get_current_user(cookies, &db).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let date_from = parse_date_param(params.d1.as_deref());
    let date_to = parse_date_param(params.d2.as_deref());

    let queries = QueryService::new(db);
    let (sales, totals) = queries.sales_report(date_from, date_to).await?;

    let template = SalesTemplate {
        user_name: current_user.name,
        sales: sales.into_iter().map(SaleDisplay::from).collect(),
        total_items: totals.items,
        total_value_cents: totals.value_cents,
        d1: params.d1.unwrap_or_default(),
        d2: params.d2.unwrap_or_default(),
        notice: params.notice.unwrap_or_default(),
    };
    Ok(Html(template.render()?).into_response())
}

pub async fn sale_form(
    State(db): State<Database>,
    cookies: Cookies,
) -> Result<Response, ServiceError> {
    let Some(current_user) = get_current_user(cookies, &db).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let template = SaleFormTemplate {
        user_name: current_user.name,
        products: picker_products(&db).await?,
        error: String::new(),
    };
    Ok(Html(template.render()?).into_response())
}

pub async fn create_sale(
    State(db): State<Database>,
    cookies: Cookies,
    Form(form): Form<SaleForm>,
) -> Result<Response, ServiceError> {
    let Some(current_user) = get_current_user(cookies, &db).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let product_id: i64 = match form.product_id.trim().parse() {
        Ok(id) => id,
        Err(_) => {
            return rerender(&db, current_user.name, "Selecione um produto.").await;
        }
    };
    let quantity: i64 = form.quantity.trim().parse().unwrap_or(0);

    let engine = StockEngine::new(db.clone());
    match engine.record_sale(product_id, quantity).await {
        Ok(_) => Ok(
            redirect_with_notice("/sales", "Venda registrada e estoque atualizado!")
                .into_response(),
        ),
        Err(ServiceError::InvalidInput(_)) => {
            rerender(&db, current_user.name, "Informe a quantidade.").await
        }
        Err(ServiceError::NotFound(_)) => {
            rerender(&db, current_user.name, "Produto não encontrado.").await
        }
        Err(ServiceError::InsufficientStock(name)) => {
            let message = format!("Estoque insuficiente de '{}'.", name);
            rerender(&db, current_user.name, &message).await
        }
        Err(ServiceError::Unavailable(_)) => {
            rerender(&db, current_user.name, "Sistema ocupado, tente novamente.").await
        }
        Err(err) => Err(err),
    }
}

async fn rerender(db: &Database, user_name: String, error: &str) -> Result<Response, ServiceError> {
    let template = SaleFormTemplate {
        user_name,
        products: picker_products(db).await?,
        error: error.to_string(),
    };
    Ok((StatusCode::BAD_REQUEST, Html(template.render()?)).into_response())
}
