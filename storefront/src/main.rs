//! Storefront demo.
//!
//! With `SHOPFRONT_API_URL` set, fetches the live catalog from that document
//! store and prints it. Without it, walks through a scripted session against
//! an in-memory backend.
//!
//! # Usage
//!
//! ```bash
//! # Scripted walkthrough
//! cargo run --bin shopfront-demo
//!
//! # Live catalog
//! SHOPFRONT_API_URL=https://shop.example.firebaseio.com cargo run --bin shopfront-demo
//! ```

use anyhow::Context;
use chrono::{Duration as ChronoDuration, Utc};
use shopfront::{
    Money, MockShopApi, Product, ProductDraft, ProductEdit, ProductId, Session, Shop, ShopConfig,
    ShopEnvironment, UserId,
};
use shopfront_core::environment::SystemClock;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopfront=debug,shopfront_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if std::env::var_os(shopfront::config::API_URL_VAR).is_some() {
        let config = ShopConfig::from_env().context("reading storefront configuration")?;
        live_catalog(&config).await
    } else {
        info!("{} not set, using the in-memory backend", shopfront::config::API_URL_VAR);
        walkthrough().await
    }
}

async fn live_catalog(config: &ShopConfig) -> anyhow::Result<()> {
    info!(base_url = %config.base_url, "Fetching catalog");
    let shop = Shop::connect(config);
    shop.fetch_products().await.context("fetching products")?;

    for product in shop.catalog().await {
        println!("{:<24} {:>10}  {}", product.id.as_str(), product.price.to_string(), product.title);
    }

    shop.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}

fn seed() -> Vec<Product> {
    let product = |id: &str, owner: &str, title: &str, cents: i64| Product {
        id: ProductId::from(id),
        owner_id: UserId::from(owner),
        title: title.to_string(),
        image_url: format!("https://img.example/{id}.png"),
        description: format!("A fine {}", title.to_lowercase()),
        price: Money::from_cents(cents),
    };

    vec![
        product("p1", "u2", "Red Shirt", 2999),
        product("p2", "u1", "Blue Carpet", 9999),
        product("p3", "u2", "Coffee Mug", 899),
    ]
}

async fn walkthrough() -> anyhow::Result<()> {
    let api = MockShopApi::with_products(seed());
    let shop = Shop::new(ShopEnvironment::new(Arc::new(api.clone()), Arc::new(SystemClock)));

    shop.fetch_products().await?;
    info!(products = shop.catalog().await.len(), "Catalog loaded");

    let session = Session::new(UserId::from("u1"), "demo-token", Utc::now() + ChronoDuration::hours(1));
    shop.sign_in(session).await?;
    info!(owned = shop.owned_products().await.len(), "Signed in as u1");

    // Browse and fill the cart
    for id in ["p1", "p1", "p3"] {
        if let Some(product) = shop.product(&ProductId::from(id)).await {
            shop.add_to_cart(product).await?;
        }
    }
    shop.remove_from_cart(&ProductId::from("p1")).await?;
    let cart = shop.cart().await;
    for line in cart.lines() {
        println!("{:>3} x {:<16} {:>10}", line.quantity, line.title, line.sum.to_string());
    }
    println!("{:>32}", cart.total().to_string());

    // Manage owned products
    let id = shop
        .create_product(ProductDraft {
            title: "Green Lamp".to_string(),
            description: "Lights up the desk".to_string(),
            image_url: "https://img.example/lamp.png".to_string(),
            price: Money::from_cents(4550),
        })
        .await?;
    shop.update_product(
        id.clone(),
        ProductEdit {
            title: "Green Desk Lamp".to_string(),
            description: "Lights up the desk".to_string(),
            image_url: "https://img.example/lamp.png".to_string(),
        },
    )
    .await?;
    info!(%id, owned = shop.owned_products().await.len(), "Created and renamed a product");

    if let Err(error) = shop
        .create_product(ProductDraft {
            title: String::new(),
            description: "no".to_string(),
            image_url: String::new(),
            price: Money::zero(),
        })
        .await
    {
        info!(%error, "Invalid draft refused");
    }

    // Checkout
    let order = shop.checkout().await?;
    info!(order_id = %order.id, total = %order.total, "Order placed");
    shop.fetch_orders().await?;
    info!(orders = shop.orders().await.len(), cart_empty = shop.cart().await.is_empty(), "Ledger refreshed");

    shop.sign_out().await?;
    info!(backend_calls = api.calls().len(), "Signed out");

    shop.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}
