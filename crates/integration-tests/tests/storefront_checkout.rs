//! Integration tests for the storefront cart and checkout.

use angohost_core::Table;
use angohost_integration_tests::{TestContext, location};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_checkout_places_order_and_empties_cart() {
    let ctx = TestContext::start().await;
    ctx.seed_catalogue().await;
    let user = ctx.add_user("ana@exemplo.ao", "customer").await;
    let client = ctx.client();

    let resp = client
        .post(format!("{}/cart/domain", ctx.storefront_url))
        .form(&[("domain", "loja.ao"), ("years", "2")])
        .send()
        .await
        .expect("add domain");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let body = client
        .get(format!("{}/cart", ctx.storefront_url))
        .send()
        .await
        .expect("cart page")
        .text()
        .await
        .expect("cart body");
    assert!(body.contains("loja.ao"));
    assert!(body.contains("39.800,00 Kz"));

    let resp = ctx.storefront_sign_in(&client, "ana@exemplo.ao", "/checkout").await;
    assert_eq!(location(&resp), "/checkout");

    let resp = client
        .post(format!("{}/checkout", ctx.storefront_url))
        .form(&[("payment_method", "Transferência bancária")])
        .send()
        .await
        .expect("submit order");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let confirmation = location(&resp);
    assert!(confirmation.starts_with("/checkout/confirmation/ORD-"));

    let orders = ctx.baas.rows(Table::Orders).await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["user_id"], json!(user));
    assert_eq!(orders[0]["status"], "pending");
    assert_eq!(orders[0]["payment_method"], "Transferência bancária");
    assert_eq!(orders[0]["items"][0]["domain"], "loja.ao");

    let body = client
        .get(format!("{}{confirmation}", ctx.storefront_url))
        .send()
        .await
        .expect("confirmation page")
        .text()
        .await
        .expect("confirmation body");
    assert!(body.contains("IBAN AO06"));

    let body = client
        .get(format!("{}/cart", ctx.storefront_url))
        .send()
        .await
        .expect("cart page")
        .text()
        .await
        .expect("cart body");
    assert!(body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_anonymous_checkout_redirects_to_login_without_writing() {
    let ctx = TestContext::start().await;
    ctx.seed_catalogue().await;
    let client = ctx.client();

    client
        .post(format!("{}/cart/domain", ctx.storefront_url))
        .form(&[("domain", "loja.ao"), ("years", "1")])
        .send()
        .await
        .expect("add domain");

    let resp = client
        .post(format!("{}/checkout", ctx.storefront_url))
        .form(&[("payment_method", "Transferência bancária")])
        .send()
        .await
        .expect("submit order");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location(&resp).starts_with("/auth/login"));
    assert!(ctx.baas.rows(Table::Orders).await.is_empty());
    assert_eq!(ctx.baas.writes(), 0);
}

#[tokio::test]
async fn test_checkout_with_empty_cart_writes_nothing() {
    let ctx = TestContext::start().await;
    ctx.seed_catalogue().await;
    ctx.add_user("ana@exemplo.ao", "customer").await;
    let client = ctx.client();
    ctx.storefront_sign_in(&client, "ana@exemplo.ao", "/").await;

    let resp = client
        .post(format!("{}/checkout", ctx.storefront_url))
        .form(&[("payment_method", "Transferência bancária")])
        .send()
        .await
        .expect("submit order");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(ctx.baas.rows(Table::Orders).await.is_empty());

    let body = client
        .get(format!("{}{}", ctx.storefront_url, location(&resp)))
        .send()
        .await
        .expect("follow redirect")
        .text()
        .await
        .expect("body");
    assert!(body.contains("Your cart is empty"));
}
