// HTTP tests for debt, installment preview and transaction endpoints

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::{test, App};
use fintrack::core::AuthEvent;
use fintrack::middleware::API_KEY_HEADER;
use helpers::*;
use serde_json::{json, Value};

#[actix_web::test]
async fn test_health_is_public() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_api_requires_valid_key() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let req = test::TestRequest::get().uri("/api/debts").to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();
    assert_eq!(err.error_response().status(), 401);

    let req = test::TestRequest::get()
        .uri("/api/debts")
        .insert_header((API_KEY_HEADER, "not-a-key"))
        .to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();
    assert_eq!(err.error_response().status(), 401);
}

#[actix_web::test]
async fn test_known_key_is_cached_after_first_request() {
    let ctx = TestContext::new();
    let (_, key) = ctx.register_user("Dewi").await;
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    for _ in 0..3 {
        let req = test::TestRequest::get()
            .uri("/api/debts")
            .insert_header((API_KEY_HEADER, key.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }

    assert_eq!(ctx.users.lookups(), 1);
}

#[actix_web::test]
async fn test_create_and_list_debts() {
    let ctx = TestContext::new();
    let (_, key) = ctx.register_user("Budi").await;
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let req = test::TestRequest::post()
        .uri("/api/debts")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .set_json(TestDataFactory::debt_payload("1000000", 3, "2024-01-31", "Phone"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["debt_ids"].as_array().map(Vec::len), Some(3));
    assert_eq!(created["debts"][0]["amount"], "333333");
    assert_eq!(created["debts"][2]["amount"], "333334");
    assert_eq!(created["debts"][1]["due_date"], "2024-02-29");
    assert_eq!(created["debts"][2]["note"], "Phone, Debt payment, 3/3");

    let req = test::TestRequest::get()
        .uri("/api/debts?as_of=2024-02-15")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed["total_unpaid"], "1000000");
    assert_eq!(listed["debts"][0]["status"], "overdue");
    assert_eq!(listed["debts"][1]["status"], "upcoming");
}

#[actix_web::test]
async fn test_invalid_tenor_returns_400() {
    let ctx = TestContext::new();
    let (_, key) = ctx.register_user("Sari").await;
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let req = test::TestRequest::post()
        .uri("/api/debts")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .set_json(TestDataFactory::debt_payload("1000", 0, "2024-01-01", "x"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], 400);
    assert_eq!(ctx.debts.count(), 0);
}

#[actix_web::test]
async fn test_malformed_body_returns_400() {
    let ctx = TestContext::new();
    let (_, key) = ctx.register_user("Sari").await;
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let req = test::TestRequest::post()
        .uri("/api/debts")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .set_json(json!({ "total_amount": "1000" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_pay_and_delete_debt() {
    let ctx = TestContext::new();
    let (_, key) = ctx.register_user("Andi").await;
    let (_, other_key) = ctx.register_user("Rina").await;
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let req = test::TestRequest::post()
        .uri("/api/debts")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .set_json(TestDataFactory::debt_payload("200000", 2, "2024-07-01", "Bed"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["debt_ids"][0].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/debts/{}/pay", id))
        .insert_header((API_KEY_HEADER, other_key.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    let req = test::TestRequest::post()
        .uri(&format!("/api/debts/{}/pay", id))
        .insert_header((API_KEY_HEADER, key.as_str()))
        .to_request();
    let paid: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(paid["paid"], true);
    assert_eq!(paid["status"], "paid");

    let req = test::TestRequest::post()
        .uri(&format!("/api/debts/{}/pay", id))
        .insert_header((API_KEY_HEADER, key.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/debts/{}", id))
        .insert_header((API_KEY_HEADER, key.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);
    assert_eq!(ctx.debts.count(), 1);
}

#[actix_web::test]
async fn test_upcoming_and_due_this_month() {
    let ctx = TestContext::new();
    let (_, key) = ctx.register_user("Tono").await;
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let req = test::TestRequest::post()
        .uri("/api/debts")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .set_json(TestDataFactory::debt_payload("600000", 6, "2024-01-10", "Oven"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    let req = test::TestRequest::get()
        .uri("/api/debts/upcoming?as_of=2024-02-11&limit=2")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .to_request();
    let upcoming: Value = test::call_and_read_body_json(&app, req).await;
    let due: Vec<&str> = upcoming["debts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["due_date"].as_str().unwrap())
        .collect();
    assert_eq!(due, vec!["2024-03-10", "2024-04-10"]);

    let req = test::TestRequest::get()
        .uri("/api/debts/due-this-month?as_of=2024-05-01")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .to_request();
    let this_month: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(this_month["debts"].as_array().map(Vec::len), Some(1));
    assert_eq!(this_month["total_unpaid"], "100000");
}

#[actix_web::test]
async fn test_installment_preview_does_not_persist() {
    let ctx = TestContext::new();
    let (_, key) = ctx.register_user("Lina").await;
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let req = test::TestRequest::post()
        .uri("/api/installments/preview")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .set_json(json!({
            "total_amount": "100",
            "tenor": 3,
            "start_date": "2024-01-31",
            "note": "Course",
            "currency": "USD"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["currency"], "USD");
    assert_eq!(body["installments"].as_array().map(Vec::len), Some(3));
    assert_eq!(ctx.debts.count(), 0);
}

#[actix_web::test]
async fn test_record_and_list_transactions() {
    let ctx = TestContext::new();
    let (_, key) = ctx.register_user("Eko").await;
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let req = test::TestRequest::post()
        .uri("/api/incomes")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .set_json(json!({ "amount": "5000000", "category": "salary", "date": "2024-03-01T08:00:00" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    let req = test::TestRequest::post()
        .uri("/api/expenses")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .set_json(json!({ "amount": "75000", "category": "food", "date": "2024-03-02T12:00:00" }))
        .to_request();
    let expense: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(expense["kind"], "expense");

    let req = test::TestRequest::get()
        .uri("/api/transactions?kind=expense")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(history["transactions"].as_array().map(Vec::len), Some(1));
    assert!(history.get("next_offset").is_none());

    let id = expense["id"].as_str().unwrap();
    let req = test::TestRequest::delete()
        .uri(&format!("/api/transactions/{}", id))
        .insert_header((API_KEY_HEADER, key.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);
    assert_eq!(ctx.transactions.count(), 1);
}

#[actix_web::test]
async fn test_monthly_income_and_expense_listings() {
    let ctx = TestContext::new();
    let (_, key) = ctx.register_user("Fitri").await;
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    for (uri, body) in [
        ("/api/incomes", json!({ "amount": "4000000", "category": "salary", "date": "2024-02-01T09:00:00" })),
        ("/api/incomes", json!({ "amount": "250000", "date": "2024-02-20T09:00:00" })),
        ("/api/incomes", json!({ "amount": "4000000", "category": "salary", "date": "2024-03-01T09:00:00" })),
        ("/api/expenses", json!({ "amount": "90000", "category": "food", "date": "2024-02-29T19:00:00" })),
    ] {
        let req = test::TestRequest::post()
            .uri(uri)
            .insert_header((API_KEY_HEADER, key.as_str()))
            .set_json(body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);
    }

    let req = test::TestRequest::get()
        .uri("/api/incomes?month=2024-02-15")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .to_request();
    let incomes: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(incomes["month_start"], "2024-02-01");
    let rows = incomes["transactions"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["amount"], "250000");
    assert!(rows.iter().all(|r| r["kind"] == "income"));

    let req = test::TestRequest::get()
        .uri("/api/expenses?month=2024-02-01")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .to_request();
    let expenses: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(expenses["transactions"].as_array().map(Vec::len), Some(1));

    let req = test::TestRequest::get()
        .uri("/api/incomes?month=not-a-date")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_web::test]
async fn test_revoked_key_is_rejected() {
    let ctx = TestContext::new();
    let (user_id, key) = ctx.register_user("Gita").await;
    let mut events = ctx.store.subscribe();
    let app = test::init_service(App::new().configure(ctx.configure())).await;

    let req = test::TestRequest::get()
        .uri("/api/debts")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = test::TestRequest::delete()
        .uri("/api/keys/current")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);

    let req = test::TestRequest::get()
        .uri("/api/debts")
        .insert_header((API_KEY_HEADER, key.as_str()))
        .to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();
    assert_eq!(err.error_response().status(), 401);

    let mut signed_out = false;
    while let Ok(event) = events.try_recv() {
        signed_out |= event == AuthEvent::SignedOut { user_id: user_id.clone() };
    }
    assert!(signed_out);
}
