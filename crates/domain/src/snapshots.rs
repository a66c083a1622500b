//! Read-only projections of entities owned by the user and product services.
//!
//! Decoding is strict: unknown fields and missing required fields are errors,
//! never zero values. Fields the remote contracts do not always send are `Option`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserSnapshot {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductSnapshot {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_snapshot_decodes_contract_body() {
        let body = json!({
            "id": 2,
            "name": "Jane Smith",
            "email": "jane@example.com",
            "created_at": "2024-03-01T10:00:00Z"
        });

        let user: UserSnapshot = serde_json::from_value(body).unwrap();
        assert_eq!(user.id, 2);
        assert_eq!(user.email, "jane@example.com");
        assert!(user.created_at.is_some());
        assert!(user.updated_at.is_none());
    }

    #[test]
    fn test_user_snapshot_missing_email_is_rejected() {
        let body = json!({ "id": 2, "name": "Jane Smith" });
        assert!(serde_json::from_value::<UserSnapshot>(body).is_err());
    }

    #[test]
    fn test_user_snapshot_unknown_field_is_rejected() {
        let body = json!({ "id": 2, "name": "Jane", "email": "j@x.com", "role": "admin" });
        assert!(serde_json::from_value::<UserSnapshot>(body).is_err());
    }

    #[test]
    fn test_product_snapshot_without_description() {
        let body = json!({ "id": 1, "name": "Widget", "price": 9.99, "category": "Tools" });

        let product: ProductSnapshot = serde_json::from_value(body).unwrap();
        assert_eq!(product.price, 9.99);
        assert_eq!(product.description, None);
    }

    #[test]
    fn test_product_snapshot_wrong_price_type_is_rejected() {
        let body = json!({ "id": 1, "name": "Widget", "price": "cheap", "category": "Tools" });
        assert!(serde_json::from_value::<ProductSnapshot>(body).is_err());
    }
}
