use askama::Template;
use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::{
    database::Database,
    errors::ServiceError,
    handlers::redirect_with_notice,
    middleware::get_current_user,
    models::ProductDisplay,
    money,
    store::{CatalogStore, ProductFilter, ProductOrder, ReceiveStock, StockEngine},
};

#[derive(Template)]
#[template(path = "stock_form.html")]
struct StockFormTemplate {
    user_name: String,
    products: Vec<ProductDisplay>,
    error: String,
    notice: String,
}

#[derive(Deserialize)]
pub struct NoticeParams {
    notice: Option<String>,
}

#[derive(Deserialize)]
pub struct EntryForm {
    #[serde(default)]
    product_id: String,
    #[serde(default)]
    quantity: String,
    #[serde(default)]
    unit_cost: String,
    #[serde(default)]
    note: String,
}

pub async fn entry_form(
    State(db): State<Database>,
    cookies: Cookies,
    Query(params): Query<NoticeParams>,
) -> Result<Response, ServiceError> {
    let Some(current_user) = get_current_user(cookies, &db).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let template = StockFormTemplate {
        user_name: current_user.name,
        products: picker_products(&db).await?,
        error: String::new(),
        notice: params.notice.unwrap_or_default(),
    };
    Ok(Html(template.render()?).into_response())
}

pub async fn create_entry(
    State(db): State<Database>,
    cookies: Cookies,
    Form(form): Form<EntryForm>,
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
    let unit_cost_cents = match money::parse_optional_cost(&form.unit_cost) {
        Ok(cost) => cost,
        Err(_) => {
            return rerender(&db, current_user.name, "Custo unitário inválido.").await;
        }
    };

    let engine = StockEngine::new(db.clone());
    let input = ReceiveStock {
        product_id,
        quantity,
        unit_cost_cents,
        note: if form.note.trim().is_empty() {
            None
        } else {
            Some(form.note.trim().to_string())
        },
    };

    match engine.receive_stock(input).await {
        Ok(receipt) => Ok(redirect_with_notice(
            &format!("/products/{}", receipt.product_id),
            "Entrada registrada e estoque atualizado!",
        )
        .into_response()),
        Err(ServiceError::InvalidInput(_)) => {
            rerender(&db, current_user.name, "Informe uma quantidade válida.").await
        }
        Err(ServiceError::NotFound(_)) => {
            rerender(&db, current_user.name, "Produto não encontrado.").await
        }
        Err(ServiceError::Unavailable(_)) => {
            rerender(&db, current_user.name, "Sistema ocupado, tente novamente.").await
        }
        Err(err) => Err(err),
    }
}

async fn rerender(db: &Database, user_name: String, error: &str) -> Result<Response, ServiceError> {
    let template = StockFormTemplate {
        user_name,
        products: picker_products(db).await?,
        error: error.to_string(),
        notice: String::new(),
    };
    Ok((StatusCode::BAD_REQUEST, Html(template.render()?)).into_response())
}

/// Products ordered by name for the selection dropdowns.
pub(crate) async fn picker_products(db: &Database) -> Result<Vec<ProductDisplay>, ServiceError> {
    let catalog = CatalogStore::new(db.clone());
    let products = catalog
        .list(&ProductFilter::default(), ProductOrder::NameAsc)
        .await?;
    Ok(products.into_iter().map(ProductDisplay::from).collect())
}
