//! Category management page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::instrument;

use storekeep_core::{CategorySummary, ProductListing};

use crate::api::CatalogApi;
use crate::error::Result;
use crate::session::{LoaderError, ServerSideResult, SessionCookie, can_ssr_auth};
use crate::state::AppState;
use crate::toast::Toast;

/// Query string of `GET /category`.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub category_id: Option<String>,
}

/// New category form data.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
}

/// Category page template.
#[derive(Template, WebTemplate)]
#[template(path = "category.html")]
pub struct CategoryTemplate {
    pub toast: Option<Toast>,
    pub name: String,
    pub categories: Vec<CategorySummary>,
    pub selected: Option<CategorySummary>,
    pub products: Vec<ProductListing>,
}

impl CategoryTemplate {
    /// Load the category list and, if one is selected, its products.
    async fn load(
        api: &dyn CatalogApi,
        token: &str,
        category_id: Option<&str>,
    ) -> std::result::Result<Self, LoaderError> {
        let categories = api.list_categories(token).await?;

        let (selected, products) = match category_id {
            Some(id) => {
                let products = api.products_by_category(token, id).await?;
                let selected = categories.iter().find(|c| c.id.as_str() == id).cloned();
                (selected, products)
            }
            None => (None, Vec::new()),
        };

        Ok(Self {
            toast: None,
            name: String::new(),
            categories,
            selected,
            products,
        })
    }
}

/// Display categories, optionally with one category's products.
#[instrument(skip(state, jar))]
pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CategoryQuery>,
) -> Result<(SessionCookie, ServerSideResult<CategoryTemplate>)> {
    let page = can_ssr_auth(&jar, move |ctx| async move {
        CategoryTemplate::load(state.catalog(), &ctx.token, query.category_id.as_deref()).await
    })
    .await?;
    Ok(page)
}

/// Handle new category submission. A blank name makes no backend call.
#[instrument(skip(state, jar, form))]
pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CategoryForm>,
) -> Result<(SessionCookie, ServerSideResult<CategoryTemplate>)> {
    let page = can_ssr_auth(&jar, move |ctx| async move {
        let name = form.name.trim();
        let (toast, keep_name) = if name.is_empty() {
            (Some(Toast::CategoryNameRequired), false)
        } else {
            let key = format!("category:{}", ctx.token);
            let created = state
                .slots()
                .run(&key, state.catalog().create_category(&ctx.token, name))
                .await;
            match created {
                Some(Ok(category)) => {
                    tracing::info!(category_id = %category.id, "category created");
                    (Some(Toast::CategoryCreated), false)
                }
                Some(Err(e)) if e.is_unauthorized() => return Err(e.into()),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "category creation failed");
                    (Some(Toast::CategoryError), true)
                }
                None => (None, true),
            }
        };

        let mut page = CategoryTemplate::load(state.catalog(), &ctx.token, None).await?;
        page.toast = toast;
        if keep_name {
            page.name = form.name.clone();
        }
        Ok(page)
    })
    .await?;
    Ok(page)
}
