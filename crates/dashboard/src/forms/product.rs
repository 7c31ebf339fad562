//! Product registration form.
//!
//! Holds what the staff member has typed and picked, validates completeness
//! and submits the product to the backend as multipart data.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use storekeep_core::CategorySummary;

use crate::api::{ApiError, CatalogApi, ImageUpload, NewProduct};
use crate::toast::Toast;

/// Content types accepted for the banner image.
const ACCEPTED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// When the text fields and image are cleared after a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClearPolicy {
    /// After every submission that reached the network step.
    #[default]
    Always,
    /// Only after the backend accepted the product.
    OnSuccess,
}

/// State of the product registration page.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    avatar_url: String,
    image: Option<ImageUpload>,
    categories: Vec<CategorySummary>,
    category_selected: usize,
    clear_policy: ClearPolicy,
}

impl ProductForm {
    /// Empty form over the loaded categories, first category selected.
    #[must_use]
    pub fn new(categories: Vec<CategorySummary>) -> Self {
        Self {
            categories,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_clear_policy(mut self, policy: ClearPolicy) -> Self {
        self.clear_policy = policy;
        self
    }

    /// Take a chosen file. Anything but JPEG/PNG (or an empty pick) is
    /// ignored and the previous image stays.
    pub fn handle_file(&mut self, upload: Option<ImageUpload>) {
        let Some(upload) = upload else { return };
        if upload.bytes.is_empty() || !ACCEPTED_IMAGE_TYPES.contains(&upload.content_type.as_str()) {
            tracing::debug!(content_type = %upload.content_type, "ignoring unsupported file");
            return;
        }

        self.avatar_url = format!(
            "data:{};base64,{}",
            upload.content_type,
            STANDARD.encode(&upload.bytes)
        );
        self.image = Some(upload);
    }

    /// Restore a previously chosen image from its `data:` preview URL.
    ///
    /// The page round-trips the preview so a failed validation doesn't lose
    /// the image. Malformed or unsupported URLs are ignored.
    pub fn restore_preview(&mut self, data_url: &str) {
        let Some((content_type, bytes)) = parse_data_url(data_url) else {
            return;
        };
        let extension = if content_type == "image/png" { "png" } else { "jpg" };
        self.handle_file(Some(ImageUpload {
            file_name: format!("banner.{extension}"),
            content_type,
            bytes,
        }));
    }

    /// Choose which category the product is filed under. Out-of-range
    /// indexes are ignored.
    pub fn select_category(&mut self, index: usize) {
        if index < self.categories.len() {
            self.category_selected = index;
        }
    }

    #[must_use]
    pub fn avatar_url(&self) -> &str {
        &self.avatar_url
    }

    #[must_use]
    pub const fn image(&self) -> Option<&ImageUpload> {
        self.image.as_ref()
    }

    #[must_use]
    pub fn categories(&self) -> &[CategorySummary] {
        &self.categories
    }

    #[must_use]
    pub const fn category_selected(&self) -> usize {
        self.category_selected
    }

    /// Name, description, price and image are all present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty()
            && !self.description.is_empty()
            && !self.price.is_empty()
            && self.image.is_some()
    }

    /// Validate and send the product.
    ///
    /// An incomplete form makes no call and keeps every field. Otherwise the
    /// fields are cleared per the [`ClearPolicy`]; the category selection is
    /// never reset.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the backend rejects the token,
    /// leaving the form untouched. Every other failure is a
    /// [`Toast::ProductError`].
    pub async fn submit(&mut self, api: &dyn CatalogApi, token: &str) -> Result<Toast, ApiError> {
        if !self.is_complete() {
            return Ok(Toast::FillAllFields);
        }

        let succeeded = self.send(api, token).await?;
        if succeeded || self.clear_policy == ClearPolicy::Always {
            self.clear();
        }

        Ok(if succeeded {
            Toast::ProductCreated
        } else {
            Toast::ProductError
        })
    }

    async fn send(&self, api: &dyn CatalogApi, token: &str) -> Result<bool, ApiError> {
        let Some(category) = self.categories.get(self.category_selected) else {
            tracing::warn!("no category to file the product under");
            return Ok(false);
        };
        let Some(image) = self.image.clone() else {
            return Ok(false);
        };

        let product = NewProduct {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price.clone(),
            category_id: category.id.to_string(),
            image,
        };

        match api.create_product(token, product).await {
            Ok(listing) => {
                tracing::info!(product_id = %listing.id, "product registered");
                Ok(true)
            }
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "product registration failed");
                Ok(false)
            }
        }
    }

    fn clear(&mut self) {
        self.name.clear();
        self.price.clear();
        self.description.clear();
        self.avatar_url.clear();
        self.image = None;
    }
}

/// Split `data:<type>;base64,<payload>` into its type and bytes.
fn parse_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (content_type, payload) = rest.split_once(";base64,")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((content_type.to_owned(), bytes))
}
