//! HTTP implementation of [`ShopApi`].
//!
//! | Operation | Method | Path |
//! |---|---|---|
//! | fetch products | GET | `/products.json` |
//! | create product | POST | `/products.json?auth=<token>` |
//! | update product | PATCH | `/products/<id>.json?auth=<token>` |
//! | delete product | DELETE | `/products/<id>.json?auth=<token>` |
//! | fetch orders | GET | `/orders/<userId>.json?auth=<token>` |
//! | place order | POST | `/orders/<userId>.json?auth=<token>` |

use super::wire::{self, Collection, Created, OrderRecord, ProductPatch, ProductRecord};
use super::{ApiError, ApiFuture, ShopApi};
use crate::money::Money;
use crate::types::{CartLine, Order, OrderId, Product, ProductDraft, ProductEdit, ProductId, Session};
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// Document store client over HTTP
#[derive(Clone, Debug)]
pub struct HttpShopApi {
    client: Client,
    base_url: String,
}

impl HttpShopApi {
    /// Create a client for the store at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest` client
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Base URL requests are issued against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn authed(request: RequestBuilder, session: &Session) -> RequestBuilder {
        request.query(&[("auth", session.token.as_str())])
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Document store rejected request");
            Err(ApiError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::send(request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl ShopApi for HttpShopApi {
    fn fetch_products(&self) -> ApiFuture<'_, Vec<Product>> {
        Box::pin(async move {
            let request = self.client.get(self.url("products.json"));
            let collection: Collection<ProductRecord> = Self::send_json(request).await?;
            Ok(wire::products_from(collection))
        })
    }

    fn create_product<'a>(
        &'a self,
        session: &'a Session,
        draft: &'a ProductDraft,
    ) -> ApiFuture<'a, ProductId> {
        Box::pin(async move {
            let body = ProductRecord::from_draft(draft, &session.user_id);
            let request = Self::authed(self.client.post(self.url("products.json")), session).json(&body);
            let created: Created = Self::send_json(request).await?;
            Ok(ProductId::new(created.name))
        })
    }

    fn update_product<'a>(
        &'a self,
        session: &'a Session,
        id: &'a ProductId,
        edit: &'a ProductEdit,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let url = self.url(&format!("products/{id}.json"));
            let request = Self::authed(self.client.patch(url), session).json(&ProductPatch::from(edit));
            Self::send(request).await?;
            Ok(())
        })
    }

    fn delete_product<'a>(&'a self, session: &'a Session, id: &'a ProductId) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let url = self.url(&format!("products/{id}.json"));
            Self::send(Self::authed(self.client.delete(url), session)).await?;
            Ok(())
        })
    }

    fn fetch_orders<'a>(&'a self, session: &'a Session) -> ApiFuture<'a, Vec<Order>> {
        Box::pin(async move {
            let url = self.url(&format!("orders/{}.json", session.user_id));
            let collection: Collection<OrderRecord> =
                Self::send_json(Self::authed(self.client.get(url), session)).await?;
            Ok(wire::orders_from(collection))
        })
    }

    fn place_order<'a>(
        &'a self,
        session: &'a Session,
        lines: &'a [CartLine],
        total: Money,
        placed_at: DateTime<Utc>,
    ) -> ApiFuture<'a, OrderId> {
        Box::pin(async move {
            let url = self.url(&format!("orders/{}.json", session.user_id));
            let body = OrderRecord::new(lines, total, placed_at);
            let request = Self::authed(self.client.post(url), session).json(&body);
            let created: Created = Self::send_json(request).await?;
            Ok(OrderId::new(created.name))
        })
    }
}
