//! Form-driven writes through the authenticated gateway.

#![allow(clippy::unwrap_used)]

use serde_json::{Value, json};
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use asrama_integration_tests::{TestContext, admin_token};
use asrama_token_admin::forms::{AdminForm, FormError, MasterDataForm, TokenPriceForm};
use asrama_token_core::{AdminId, MasterDataId};

async fn signed_in() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.client.session().login_from_token(&admin_token()).unwrap();
    ctx
}

fn admin_json(id: i32, avatar: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": "Siti Rahma",
        "email": "siti@unair.ac.id",
        "avatar": avatar,
        "role": "operator",
        "createdAt": "2024-01-10T08:00:00Z",
        "status": "active",
        "updatedAt": "2024-01-10T08:00:00Z"
    })
}

#[tokio::test]
async fn test_new_operator_with_avatar_uploads_first() {
    let ctx = signed_in().await;
    Mock::given(method("POST"))
        .and(path("/api/files/image"))
        .and(body_string_contains("name=\"image\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "url": "/uploads/images/siti.png",
            "filename": "siti.png"
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/admins"))
        .and(body_json(json!({
            "name": "Siti Rahma",
            "email": "siti@unair.ac.id",
            "role": "operator",
            "password": "rahasia123",
            "avatar": "/uploads/images/siti.png"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(admin_json(9, Some("/uploads/images/siti.png"))),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let avatar = ctx.state_dir.path().join("siti.png");
    std::fs::write(&avatar, b"\x89PNG").unwrap();

    let mut form = AdminForm::create();
    form.name = "Siti Rahma".to_string();
    form.email = "siti@unair.ac.id".to_string();
    form.password = "rahasia123".to_string().into();
    form.avatar_file = Some(avatar);

    let admin = form.submit(&ctx.client).await.unwrap();
    assert_eq!(admin.id, AdminId::new(9));
    assert_eq!(
        ctx.client.asset_url(admin.avatar.as_deref().unwrap()),
        format!("{}/uploads/images/siti.png", ctx.server.uri())
    );
}

#[tokio::test]
async fn test_editing_admin_without_password_keeps_it() {
    let ctx = signed_in().await;
    Mock::given(method("PUT"))
        .and(path("/api/admins/9"))
        .and(body_json(json!({
            "name": "Siti R.",
            "email": "siti@unair.ac.id",
            "role": "operator"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(admin_json(9, None)))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let existing = serde_json::from_value(admin_json(9, None)).unwrap();
    let mut form = AdminForm::edit(&existing);
    form.name = "Siti R.".to_string();
    form.submit(&ctx.client).await.unwrap();
}

#[tokio::test]
async fn test_master_data_round_trip() {
    let ctx = signed_in().await;
    Mock::given(method("GET"))
        .and(path("/api/master-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 1, "harga_per_kwh": 1352, "biaya_admin_persen": 2},
                {"id": 4, "harga_per_kwh": 1444.7, "biaya_admin_persen": 2.5}
            ]
        })))
        .mount(&ctx.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/master-data/4"))
        .and(body_json(json!({"harga_per_kwh": 1500.5, "biaya_admin_persen": 3.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 4, "harga_per_kwh": 1500.5, "biaya_admin_persen": 3}
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/master-data/4"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let current = ctx.client.current_master_data().await.unwrap();
    let mut form = MasterDataForm::new(current);
    assert_eq!(form.current().unwrap().id, MasterDataId::new(4));

    form.harga_per_kwh = "1500,5".to_string();
    form.biaya_admin_persen = "3".to_string();
    form.save(&ctx.client).await.unwrap();

    form.delete(&ctx.client).await.unwrap();
    assert!(form.current().is_none());
    assert!(matches!(
        form.delete(&ctx.client).await,
        Err(FormError::NothingToDelete)
    ));
}

#[tokio::test]
async fn test_invalid_token_price_never_reaches_backend() {
    let ctx = signed_in().await;
    Mock::given(method("POST"))
        .and(path("/api/token-prices"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let mut form = TokenPriceForm::create();
    form.amount = "-5000".to_string();
    form.kwh = "3".to_string();
    assert!(matches!(
        form.submit(&ctx.client).await,
        Err(FormError::NotPositive("amount"))
    ));
}

#[tokio::test]
async fn test_backend_validation_message_reaches_the_form() {
    let ctx = signed_in().await;
    Mock::given(method("POST"))
        .and(path("/api/token-prices"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({ "message": "Nominal sudah ada" })),
        )
        .mount(&ctx.server)
        .await;

    let mut form = TokenPriceForm::create();
    form.amount = "20000".to_string();
    form.kwh = "13,4".to_string();
    let Err(FormError::Api(err)) = form.submit(&ctx.client).await else {
        panic!("expected a backend error");
    };
    assert_eq!(err.user_message(), "Nominal sudah ada");
    assert!(ctx.client.session().is_authenticated());
}
