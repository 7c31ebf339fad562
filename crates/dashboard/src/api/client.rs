//! reqwest implementation of the backend API traits.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, multipart};
use serde::de::DeserializeOwned;
use url::Url;

use storekeep_core::{
    CategorySummary, CreateCategoryRequest, CreateUserRequest, ErrorBody, ProductListing,
    SessionGrant, SessionRequest, UserProfile,
};

use super::{ApiError, CatalogApi, NewProduct, SessionApi};

/// HTTP client for the Storekeep REST backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: &Url) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A JSON `POST` on behalf of the browser at `client_ip`.
    fn credential_post<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
        client_ip: Option<IpAddr>,
    ) -> RequestBuilder {
        let request = self.client.post(self.url(path)).json(body);
        match client_ip {
            Some(ip) => request.header("x-forwarded-for", ip.to_string()),
            None => request,
        }
    }

    /// Send a request and decode a JSON success body.
    ///
    /// 401 maps to `ApiError::Unauthorized`; other failures carry the
    /// backend's `{"error": ..}` message when it sent one.
    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.canonical_reason().unwrap_or_default().to_owned(),
            };
            tracing::debug!(status = status.as_u16(), %message, "backend error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl SessionApi for ApiClient {
    async fn create_session(
        &self,
        email: &str,
        password: &str,
        client_ip: Option<IpAddr>,
    ) -> Result<SessionGrant, ApiError> {
        let body = SessionRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        Self::send(self.credential_post("/session", &body, client_ip)).await
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        client_ip: Option<IpAddr>,
    ) -> Result<UserProfile, ApiError> {
        let body = CreateUserRequest {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        };
        Self::send(self.credential_post("/users", &body, client_ip)).await
    }

    async fn me(&self, token: &str) -> Result<UserProfile, ApiError> {
        Self::send(self.client.get(self.url("/me")).bearer_auth(token)).await
    }
}

#[async_trait]
impl CatalogApi for ApiClient {
    async fn list_categories(&self, token: &str) -> Result<Vec<CategorySummary>, ApiError> {
        Self::send(self.client.get(self.url("/category")).bearer_auth(token)).await
    }

    async fn create_category(&self, token: &str, name: &str) -> Result<CategorySummary, ApiError> {
        let body = CreateCategoryRequest {
            name: name.to_owned(),
        };
        Self::send(
            self.client
                .post(self.url("/category"))
                .bearer_auth(token)
                .json(&body),
        )
        .await
    }

    async fn products_by_category(
        &self,
        token: &str,
        category_id: &str,
    ) -> Result<Vec<ProductListing>, ApiError> {
        let url = self.url(&format!(
            "/category/product?category_id={}",
            urlencoding::encode(category_id)
        ));
        Self::send(self.client.get(url).bearer_auth(token)).await
    }

    async fn create_product(
        &self,
        token: &str,
        product: NewProduct,
    ) -> Result<ProductListing, ApiError> {
        let file = multipart::Part::bytes(product.image.bytes)
            .file_name(product.image.file_name)
            .mime_str(&product.image.content_type)?;

        let form = multipart::Form::new()
            .text("name", product.name)
            .text("description", product.description)
            .text("price", product.price)
            .text("category_id", product.category_id)
            .part("file", file);

        Self::send(
            self.client
                .post(self.url("/product"))
                .bearer_auth(token)
                .multipart(form),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new(&Url::parse("http://localhost:3333/").unwrap()).unwrap();
        assert_eq!(client.url("/session"), "http://localhost:3333/session");
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let client = ApiClient::new(&Url::parse("https://api.example.com/v1").unwrap()).unwrap();
        assert_eq!(client.url("/me"), "https://api.example.com/v1/me");
    }

    #[test]
    fn test_credential_post_forwards_browser_address() {
        let client = ApiClient::new(&Url::parse("http://localhost:3333").unwrap()).unwrap();
        let body = SessionRequest {
            email: "a@b.co".into(),
            password: "secret1".into(),
        };

        let request = client
            .credential_post("/session", &body, Some("203.0.113.9".parse().unwrap()))
            .build()
            .unwrap();
        assert_eq!(request.headers()["x-forwarded-for"], "203.0.113.9");

        let request = client.credential_post("/session", &body, None).build().unwrap();
        assert!(request.headers().get("x-forwarded-for").is_none());
    }

    #[test]
    fn test_unauthorized_detection() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(
            !ApiError::Status {
                status: 500,
                message: "boom".into()
            }
            .is_unauthorized()
        );
    }
}
