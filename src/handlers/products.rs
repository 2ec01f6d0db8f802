use askama::Template;
use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::{
    database::Database,
    errors::ServiceError,
    filters,
    handlers::redirect_with_notice,
    middleware::get_current_user,
    models::{ProductDisplay, ProductInput},
    money,
    store::{CatalogStore, ProductFilter, ProductOrder, QueryService},
};

#[derive(Template)]
#[template(path = "products.html")]
struct ProductsTemplate {
    user_name: String,
    products: Vec<ProductDisplay>,
    varieties: Vec<String>,
    regions: Vec<String>,
    q: String,
    variety_f: String,
    region_f: String,
    order: String,
    notice: String,
}

#[derive(Template)]
#[template(path = "product_form.html")]
struct ProductFormTemplate {
    user_name: String,
    title: String,
    action: String,
    error: String,
    name: String,
    variety: String,
    vintage: String,
    region: String,
    description: String,
    image_url: String,
    price: String,
}

#[derive(Template)]
#[template(path = "product_detail.html")]
struct ProductDetailTemplate {
    user_name: String,
    product: ProductDisplay,
    quantity_sold: i64,
    value_sold_cents: i64,
    quantity_received: i64,
    notice: String,
}

#[derive(Deserialize)]
pub struct ListParams {
    q: Option<String>,
    variety: Option<String>,
    region: Option<String>,
    order: Option<String>,
    notice: Option<String>,
}

#[derive(Deserialize)]
pub struct NoticeParams {
    notice: Option<String>,
}

#[derive(Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    variety: String,
    #[serde(default)]
    vintage: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image_url: String,
    #[serde(default)]
    price: String,
}

impl ProductForm {
    fn into_input(self) -> Result<ProductInput, ServiceError> {
        Ok(ProductInput {
            name: self.name.trim().to_string(),
            variety: opt(self.variety),
            vintage: opt(self.vintage),
            region: opt(self.region),
            description: opt(self.description),
            image_url: opt(self.image_url),
            unit_price_cents: money::parse_price(&self.price)?,
        })
    }
}

fn opt(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub async fn products_list(
    State(db): State<Database>,
    cookies: Cookies,
    Query(params): Query<ListParams>,
) -> Result<Response, ServiceError> {
    let Some(current_user) = get_current_user(cookies, &db).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let catalog = CatalogStore::new(db);
    let order = ProductOrder::from_param(params.order.as_deref().unwrap_or_default());
    let filter = ProductFilter {
        search: params.q.clone(),
        variety: params.variety.clone(),
        region: params.region.clone(),
    };

    let products = catalog.list(&filter, order).await?;
    let varieties = catalog.distinct_varieties().await?;
    let regions = catalog.distinct_regions().await?;

    let template = ProductsTemplate {
        user_name: current_user.name,
        products: products.into_iter().map(ProductDisplay::from).collect(),
        varieties,
        regions,
        q: params.q.unwrap_or_default(),
        variety_f: params.variety.unwrap_or_default(),
        region_f: params.region.unwrap_or_default(),
        order: order.as_param().to_string(),
        notice: params.notice.unwrap_or_default(),
    };
    Ok(Html(template.render()?).into_response())
}

pub async fn product_form(
    State(db): State<Database>,
    cookies: Cookies,
) -> Result<Response, ServiceError> {
    let Some(current_user) = get_current_user(cookies, &db).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let template = blank_form(current_user.name);
    Ok(Html(template.render()?).into_response())
}

pub async fn create_product(
    State(db): State<Database>,
    cookies: Cookies,
    Form(form): Form<ProductForm>,
) -> Result<Response, ServiceError> {
    let Some(current_user) = get_current_user(cookies, &db).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let filled = filled_form(current_user.name, &form, "/products", "Novo vinho");
    let input = match form.into_input() {
        Ok(input) => input,
        Err(ServiceError::InvalidInput(msg)) => {
            return rerender_form(filled, &msg);
        }
        Err(err) => return Err(err),
    };

    let catalog = CatalogStore::new(db);
    match catalog.create(input).await {
        Ok(product) => Ok(redirect_with_notice(
            "/products",
            &format!("Vinho \"{}\" cadastrado!", product.name),
        )
        .into_response()),
        Err(ServiceError::InvalidInput(msg)) => rerender_form(filled, &msg),
        Err(err) => Err(err),
    }
}

pub async fn edit_form(
    State(db): State<Database>,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Response, ServiceError> {
    let Some(current_user) = get_current_user(cookies, &db).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let catalog = CatalogStore::new(db);
    let product = match catalog.get(id).await {
        Ok(product) => product,
        Err(ServiceError::NotFound(_)) => {
            return Ok(redirect_with_notice("/products", "Vinho não encontrado.").into_response());
        }
        Err(err) => return Err(err),
    };

    let display = ProductDisplay::from(product);
    let template = ProductFormTemplate {
        user_name: current_user.name,
        title: "Editar vinho".to_string(),
        action: format!("/products/{}", id),
        error: String::new(),
        name: display.name,
        variety: display.variety,
        vintage: display.vintage,
        region: display.region,
        description: display.description,
        image_url: display.image_url,
        price: format_price_field(display.unit_price_cents),
    };
    Ok(Html(template.render()?).into_response())
}

pub async fn update_product(
    State(db): State<Database>,
    cookies: Cookies,
    Path(id): Path<i64>,
    Form(form): Form<ProductForm>,
) -> Result<Response, ServiceError> {
    let Some(current_user) = get_current_user(cookies, &db).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let filled = filled_form(
        current_user.name,
        &form,
        &format!("/products/{}", id),
        "Editar vinho",
    );
    let input = match form.into_input() {
        Ok(input) => input,
        Err(ServiceError::InvalidInput(msg)) => {
            return rerender_form(filled, &msg);
        }
        Err(err) => return Err(err),
    };

    let catalog = CatalogStore::new(db);
    match catalog.update(id, input).await {
        Ok(product) => Ok(redirect_with_notice(
            "/products",
            &format!("Vinho \"{}\" atualizado!", product.name),
        )
        .into_response()),
        Err(ServiceError::NotFound(_)) => {
            Ok(redirect_with_notice("/products", "Vinho não encontrado.").into_response())
        }
        Err(ServiceError::InvalidInput(msg)) => rerender_form(filled, &msg),
        Err(err) => Err(err),
    }
}

pub async fn delete_product(
    State(db): State<Database>,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Response, ServiceError> {
    if get_current_user(cookies, &db).await.is_none() {
        return Ok(Redirect::to("/login").into_response());
    }

    let catalog = CatalogStore::new(db);
    let notice = match catalog.delete(id).await {
        Ok(name) => format!("Vinho \"{}\" removido.", name),
        Err(ServiceError::NotFound(_)) => "Vinho não encontrado.".to_string(),
        Err(ServiceError::Conflict(_)) => {
            "Este vinho tem movimentações de estoque e não pode ser removido.".to_string()
        }
        Err(err) => return Err(err),
    };
    Ok(redirect_with_notice("/products", &notice).into_response())
}

pub async fn product_detail(
    State(db): State<Database>,
    cookies: Cookies,
    Path(id): Path<i64>,
    Query(params): Query<NoticeParams>,
) -> Result<Response, ServiceError> {
    let Some(current_user) = get_current_user(cookies, &db).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let catalog = CatalogStore::new(db.clone());
    let queries = QueryService::new(db);

    let product = match catalog.get(id).await {
        Ok(product) => product,
        Err(ServiceError::NotFound(_)) => {
            return Ok(redirect_with_notice("/products", "Vinho não encontrado.").into_response());
        }
        Err(err) => return Err(err),
    };
    let summary = queries.product_summary(id).await?;

    let template = ProductDetailTemplate {
        user_name: current_user.name,
        product: ProductDisplay::from(product),
        quantity_sold: summary.quantity_sold,
        value_sold_cents: summary.value_sold_cents,
        quantity_received: summary.quantity_received,
        notice: params.notice.unwrap_or_default(),
    };
    Ok(Html(template.render()?).into_response())
}

fn blank_form(user_name: String) -> ProductFormTemplate {
    ProductFormTemplate {
        user_name,
        title: "Novo vinho".to_string(),
        action: "/products".to_string(),
        error: String::new(),
        name: String::new(),
        variety: String::new(),
        vintage: String::new(),
        region: String::new(),
        description: String::new(),
        image_url: String::new(),
        price: String::new(),
    }
}

fn filled_form(
    user_name: String,
    form: &ProductForm,
    action: &str,
    title: &str,
) -> ProductFormTemplate {
    ProductFormTemplate {
        user_name,
        title: title.to_string(),
        action: action.to_string(),
        error: String::new(),
        name: form.name.clone(),
        variety: form.variety.clone(),
        vintage: form.vintage.clone(),
        region: form.region.clone(),
        description: form.description.clone(),
        image_url: form.image_url.clone(),
        price: form.price.clone(),
    }
}

fn rerender_form(mut template: ProductFormTemplate, error: &str) -> Result<Response, ServiceError> {
    template.error = error.to_string();
    Ok((StatusCode::BAD_REQUEST, Html(template.render()?)).into_response())
}

/// Prefills the price field in the comma form the rest of the UI uses.
fn format_price_field(cents: i64) -> String {
    money::format_brl(cents)
        .trim_start_matches("R$ ")
        .to_string()
}
