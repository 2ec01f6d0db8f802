use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::{
    database::Database,
    errors::ServiceError,
    filters,
    handlers::sales::parse_date_param,
    middleware::get_current_user,
    store::{LowStockProduct, QueryService},
};

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    user_name: String,
    product_count: i64,
    total_stock_units: i64,
    total_stock_value_cents: i64,
    sales_items: i64,
    sales_value_cents: i64,
    low_stock: Vec<LowStockProduct>,
    d1: String,
    d2: String,
}

#[derive(Deserialize)]
pub struct DashboardParams {
    d1: Option<String>,
    d2: Option<String>,
}

pub async fn dashboard(
    State(db): State<Database>,
    cookies: Cookies,
    Query(params): Query<DashboardParams>,
) -> Result<Response, ServiceError> {
    let Some(current_user) = get_current_user(cookies, &db).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let date_from = parse_date_param(params.d1.as_deref());
    let date_to = parse_date_param(params.d2.as_deref());

    let queries = QueryService::new(db);
    let data = queries.dashboard(date_from, date_to).await?;

    let template = DashboardTemplate {
        user_name: current_user.name,
        product_count: data.product_count,
        total_stock_units: data.total_stock_units,
        total_stock_value_cents: data.total_stock_value_cents,
        sales_items: data.sales_in_range.items,
        sales_value_cents: data.sales_in_range.value_cents,
        low_stock: data.low_stock,
        d1: params.d1.unwrap_or_default(),
        d2: params.d2.unwrap_or_default(),
    };
    Ok(Html(template.render()?).into_response())
}
