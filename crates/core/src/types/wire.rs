//! Request and response bodies exchanged between the dashboard and the API.

use serde::{Deserialize, Serialize};

use super::{CategoryId, Email, Price, ProductId, UserId};

/// Name of the cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "@nextauth.token";

/// Session cookie lifetime in seconds (30 days).
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 30;

/// `POST /session` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub email: String,
    pub password: String,
}

/// `POST /session` response: the signed-in user and their bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGrant {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub token: String,
}

/// `POST /users` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Public user identity, as returned by `GET /me` and `POST /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// `POST /category` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// A category as listed by `GET /category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
}

/// The product projection returned by product endpoints.
///
/// Exactly the six catalog fields; timestamps never leave the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListing {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub banner: String,
    pub category_id: CategoryId,
}

/// JSON error body returned by the API for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_lasts_thirty_days() {
        assert_eq!(SESSION_MAX_AGE_SECS, 2_592_000);
    }

    #[test]
    fn test_product_listing_has_six_fields() {
        let listing = ProductListing {
            id: ProductId::new("p1"),
            name: "Margherita".to_string(),
            description: "Tomato, mozzarella, basil".to_string(),
            price: Price::parse("39.90").unwrap(),
            banner: "a1b2-margherita.png".to_string(),
            category_id: CategoryId::new("c1"),
        };

        let value = serde_json::to_value(&listing).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            ["banner", "category_id", "description", "id", "name", "price"]
        );
    }

    #[test]
    fn test_session_grant_from_json() {
        let grant: SessionGrant = serde_json::from_str(
            r#"{"id":"u1","name":"Ana","email":"ana@example.com","token":"t.sig"}"#,
        )
        .unwrap();
        assert_eq!(grant.id.as_str(), "u1");
        assert_eq!(grant.email.as_str(), "ana@example.com");
    }
}
