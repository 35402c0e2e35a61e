//! Changes made in one app, as seen from the other.

use std::time::Duration;

use angohost_core::Table;
use angohost_integration_tests::{TestContext, location};
use reqwest::StatusCode;

/// Sign `client` in as a customer and place an order for `loja.ao`.
async fn place_order(ctx: &TestContext, client: &reqwest::Client) -> String {
    client
        .post(format!("{}/cart/domain", ctx.storefront_url))
        .form(&[("domain", "loja.ao"), ("years", "1")])
        .send()
        .await
        .expect("add domain");
    ctx.storefront_sign_in(client, "ana@exemplo.ao", "/checkout").await;
    let resp = client
        .post(format!("{}/checkout", ctx.storefront_url))
        .form(&[("payment_method", "Transferência bancária")])
        .send()
        .await
        .expect("submit order");
    let confirmation = location(&resp);
    confirmation
        .rsplit('/')
        .next()
        .expect("order number in confirmation URL")
        .to_string()
}

#[tokio::test]
async fn test_finance_invoices_a_storefront_order() {
    let ctx = TestContext::start().await;
    ctx.seed_catalogue().await;
    ctx.add_user("ana@exemplo.ao", "customer").await;
    ctx.add_user("finance@angohost.ao", "finance").await;

    let shopper = ctx.client();
    let order_number = place_order(&ctx, &shopper).await;
    assert!(order_number.starts_with("ORD-"));

    let finance = ctx.client();
    ctx.admin_sign_in(&finance, "finance@angohost.ao").await;
    let body = finance
        .get(format!("{}/orders?status=pending", ctx.admin_url))
        .send()
        .await
        .expect("orders page")
        .text()
        .await
        .expect("orders body");
    assert!(body.contains(&order_number));
    assert!(body.contains("19.900,00 Kz"));

    let order_id = ctx.baas.rows(Table::Orders).await[0]["id"]
        .as_str()
        .expect("order id")
        .to_string();
    let resp = finance
        .post(format!("{}/orders/{order_id}/invoice", ctx.admin_url))
        .send()
        .await
        .expect("create invoice");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.expect("body").contains("created"));

    let invoices = ctx.baas.rows(Table::Invoices).await;
    assert_eq!(invoices.len(), 1);
    let invoice_number = invoices[0]["invoice_number"]
        .as_str()
        .expect("invoice number")
        .to_string();

    let body = shopper
        .get(format!("{}/account/invoices", ctx.storefront_url))
        .send()
        .await
        .expect("account invoices")
        .text()
        .await
        .expect("invoices body");
    assert!(body.contains(&invoice_number));
}

#[tokio::test]
async fn test_open_orders_page_is_told_to_refresh() {
    let ctx = TestContext::start().await;
    ctx.seed_catalogue().await;
    ctx.add_user("ana@exemplo.ao", "customer").await;
    ctx.add_user("finance@angohost.ao", "finance").await;

    let finance = ctx.client();
    ctx.admin_sign_in(&finance, "finance@angohost.ao").await;
    let mut live = finance
        .get(format!("{}/live", ctx.admin_url))
        .send()
        .await
        .expect("live stream");
    assert_eq!(live.status(), StatusCode::OK);

    let shopper = ctx.client();
    place_order(&ctx, &shopper).await;

    let received = tokio::time::timeout(Duration::from_secs(5), async {
        let mut seen = String::new();
        while let Ok(Some(chunk)) = live.chunk().await {
            seen.push_str(&String::from_utf8_lossy(&chunk));
            if seen.contains("event: refresh\ndata: orders") {
                return true;
            }
        }
        false
    })
    .await;
    assert!(matches!(received, Ok(true)));
}
