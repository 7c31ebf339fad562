//! Product registration page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Multipart, State};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;

use crate::api::ImageUpload;
use crate::error::{AppError, Result};
use crate::forms::ProductForm;
use crate::session::{ServerSideResult, SessionCookie, can_ssr_auth};
use crate::state::AppState;
use crate::toast::Toast;

/// Product page template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub toast: Option<Toast>,
    pub form: ProductForm,
}

/// Fields posted by the product form.
#[derive(Debug, Default)]
struct ProductInput {
    name: String,
    description: String,
    price: String,
    category: Option<usize>,
    preview: Option<String>,
    file: Option<ImageUpload>,
}

impl ProductInput {
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut input = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let field_name = field.name().unwrap_or_default().to_owned();
            if field_name == "file" {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let content_type = field.content_type().unwrap_or_default().to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                // An untouched file input still sends an empty part
                if !bytes.is_empty() {
                    input.file = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                continue;
            }

            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            match field_name.as_str() {
                "name" => input.name = text,
                "description" => input.description = text,
                "price" => input.price = text,
                "category" => input.category = text.parse().ok(),
                "preview" => input.preview = Some(text).filter(|p| !p.is_empty()),
                _ => {}
            }
        }

        Ok(input)
    }

    /// Replay the posted fields onto a freshly loaded form.
    fn apply(self, form: &mut ProductForm) {
        form.name = self.name;
        form.description = self.description;
        form.price = self.price;
        if let Some(index) = self.category {
            form.select_category(index);
        }
        if let Some(preview) = self.preview {
            form.restore_preview(&preview);
        }
        form.handle_file(self.file);
    }
}

/// Display the empty product form.
#[instrument(skip(state, jar))]
pub async fn new_product(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(SessionCookie, ServerSideResult<ProductTemplate>)> {
    let page = can_ssr_auth(&jar, move |ctx| async move {
        let categories = state.catalog().list_categories(&ctx.token).await?;
        Ok(ProductTemplate {
            toast: None,
            form: ProductForm::new(categories),
        })
    })
    .await?;
    Ok(page)
}

/// Handle product form submission.
#[instrument(skip(state, jar, multipart))]
pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<(SessionCookie, ServerSideResult<ProductTemplate>)> {
    let input = ProductInput::read(multipart).await?;

    let page = can_ssr_auth(&jar, move |ctx| async move {
        let categories = state.catalog().list_categories(&ctx.token).await?;
        let mut form = ProductForm::new(categories);
        input.apply(&mut form);

        let key = format!("product:{}", ctx.token);
        // A rejected token surfaces as a loader error so the guard signs out
        let toast = state
            .slots()
            .run(&key, form.submit(state.catalog(), &ctx.token))
            .await
            .transpose()?;

        Ok(ProductTemplate { toast, form })
    })
    .await?;
    Ok(page)
}
