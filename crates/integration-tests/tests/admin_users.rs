//! Integration tests for back-office sign-in and user management.

use angohost_core::Table;
use angohost_integration_tests::{TestContext, location};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_admin_signs_in_and_lists_users() {
    let ctx = TestContext::start().await;
    ctx.add_user("admin@angohost.ao", "admin").await;
    ctx.add_user("cliente@exemplo.ao", "customer").await;
    let client = ctx.client();

    let resp = ctx.admin_sign_in(&client, "admin@angohost.ao").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let resp = client
        .get(format!("{}/users", ctx.admin_url))
        .send()
        .await
        .expect("users page");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("users body");
    assert!(body.contains("cliente@exemplo.ao"));
    assert!(body.contains("data-live-table=\"profiles\""));

    let resp = client
        .get(format!("{}/users?role=customer", ctx.admin_url))
        .send()
        .await
        .expect("filtered users page");
    let body = resp.text().await.expect("users body");
    assert!(body.contains("cliente@exemplo.ao"));
    assert!(!body.contains("<td>admin@angohost.ao</td>"));
}

#[tokio::test]
async fn test_deactivated_customer_is_locked_out_of_storefront() {
    let ctx = TestContext::start().await;
    ctx.add_user("admin@angohost.ao", "admin").await;
    let customer = ctx.add_user("cliente@exemplo.ao", "customer").await;
    let admin = ctx.client();
    ctx.admin_sign_in(&admin, "admin@angohost.ao").await;

    let resp = admin
        .post(format!("{}/users/{customer}/toggle-active", ctx.admin_url))
        .send()
        .await
        .expect("toggle active");
    assert_eq!(resp.status(), StatusCode::OK);

    let shopper = ctx.client();
    let resp = ctx.storefront_sign_in(&shopper, "cliente@exemplo.ao", "/account").await;
    assert!(location(&resp).starts_with("/auth/login"));

    admin
        .post(format!("{}/users/{customer}/toggle-active", ctx.admin_url))
        .send()
        .await
        .expect("toggle active again");
    let profile = ctx
        .baas
        .rows(Table::Profiles)
        .await
        .into_iter()
        .find(|row| row["id"] == json!(customer))
        .expect("customer profile");
    assert_eq!(profile["is_active"], json!(true));

    let resp = ctx.storefront_sign_in(&shopper, "cliente@exemplo.ao", "/account").await;
    assert_eq!(location(&resp), "/account");
}

#[tokio::test]
async fn test_promoted_customer_reaches_back_office() {
    let ctx = TestContext::start().await;
    ctx.add_user("admin@angohost.ao", "admin").await;
    let customer = ctx.add_user("novo@angohost.ao", "customer").await;

    let newcomer = ctx.client();
    let resp = ctx.admin_sign_in(&newcomer, "novo@angohost.ao").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.expect("body").contains("no back-office access"));

    let admin = ctx.client();
    ctx.admin_sign_in(&admin, "admin@angohost.ao").await;
    let resp = admin
        .post(format!("{}/users/{customer}/role", ctx.admin_url))
        .form(&[("role", "support")])
        .send()
        .await
        .expect("set role");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx.admin_sign_in(&newcomer, "novo@angohost.ao").await;
    assert_eq!(location(&resp), "/");
    let resp = newcomer
        .get(format!("{}/tickets", ctx.admin_url))
        .send()
        .await
        .expect("tickets page");
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = newcomer
        .get(format!("{}/invoices", ctx.admin_url))
        .send()
        .await
        .expect("invoices page");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_deleting_user_removes_identity_and_rows() {
    let ctx = TestContext::start().await;
    ctx.add_user("admin@angohost.ao", "admin").await;
    let customer = ctx.add_user("saida@exemplo.ao", "customer").await;
    ctx.baas
        .seed(
            Table::Tickets,
            [json!({"user_id": customer, "subject": "Cancelar conta", "status": "open", "priority": "low"})],
        )
        .await;
    let admin = ctx.client();
    ctx.admin_sign_in(&admin, "admin@angohost.ao").await;

    let resp = admin
        .post(format!("{}/users/{customer}/delete", ctx.admin_url))
        .send()
        .await
        .expect("delete user");
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(ctx.baas.rows(Table::Tickets).await.is_empty());
    assert!(
        !ctx.baas
            .rows(Table::Profiles)
            .await
            .iter()
            .any(|row| row["id"] == json!(customer))
    );

    let shopper = ctx.client();
    let resp = ctx.storefront_sign_in(&shopper, "saida@exemplo.ao", "/account").await;
    assert!(location(&resp).starts_with("/auth/login"));
}
