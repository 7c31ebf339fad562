//! Product creation.

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
};
use tracing::instrument;

use storekeep_core::{CategoryId, Price, ProductId, ProductListing};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::Product;
use crate::state::AppState;

/// Raw multipart fields of `POST /product`.
#[derive(Debug, Default)]
struct ProductUpload {
    name: Option<String>,
    description: Option<String>,
    price: Option<String>,
    category_id: Option<String>,
    file: Option<(String, Bytes)>,
}

impl ProductUpload {
    async fn read(multipart: &mut Multipart) -> Result<Self> {
        let mut upload = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let field_name = field.name().unwrap_or_default().to_owned();
            if field_name == "file" {
                let content_type = field.content_type().unwrap_or_default().to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                upload.file = Some((content_type, bytes));
                continue;
            }

            let slot = match field_name.as_str() {
                "name" => &mut upload.name,
                "description" => &mut upload.description,
                "price" => &mut upload.price,
                "category_id" => &mut upload.category_id,
                _ => continue,
            };
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            *slot = Some(text);
        }

        Ok(upload)
    }
}

/// Take a text field, rejecting missing or blank values.
fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing field: {field}")))
}

/// Create a product from a multipart form with a banner image.
#[instrument(skip(state, multipart), fields(user_id = %user_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ProductListing>)> {
    let upload = ProductUpload::read(&mut multipart).await?;

    let name = required(upload.name, "name")?;
    let description = required(upload.description, "description")?;
    let price = Price::parse(&required(upload.price, "price")?)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let category_id = CategoryId::new(required(upload.category_id, "category_id")?);
    let (content_type, bytes) = upload
        .file
        .ok_or_else(|| AppError::BadRequest("Missing field: file".to_string()))?;

    let banner = state.uploads().save(&content_type, &bytes).await?;

    let product = Product {
        id: ProductId::generate(),
        name,
        description,
        price,
        banner,
        category_id,
    };

    match ProductRepository::new(state.pool()).create(&product).await {
        Ok(listing) => {
            tracing::info!(product_id = %listing.id, "product created");
            Ok((StatusCode::CREATED, Json(listing)))
        }
        Err(e) => {
            // The row never landed; drop the orphaned banner
            if let Err(io) = tokio::fs::remove_file(state.uploads().dir().join(&product.banner)).await {
                tracing::warn!(error = %io, banner = %product.banner, "failed to remove banner");
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required(Some("  pizza ".into()), "name").unwrap(), "pizza");
    }

    #[test]
    fn test_required_rejects_blank_and_missing() {
        assert!(matches!(
            required(Some("   ".into()), "name"),
            Err(AppError::BadRequest(msg)) if msg == "Missing field: name"
        ));
        assert!(required(None, "price").is_err());
    }
}
