//! End-to-end tests for the pet HTTP API against an in-memory store.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use pet_registry::api::{create_router, AppState};
use pet_registry::store::PetStore;

async fn test_app() -> Router {
    test_app_with_page_size(10).await
}

async fn test_app_with_page_size(page_size: u32) -> Router {
    let state = AppState {
        store: PetStore::open_in_memory().await.unwrap(),
        page_size,
        prometheus: None,
    };
    create_router(state)
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn rex() -> Value {
    json!({
        "name": "Rex",
        "age": 3,
        "weight": 12.5,
        "sex": "Male",
        "group": { "scientific_name": "Canis lupus familiaris", "name": "dog" },
        "traits": [{ "name": "Fluffy" }, { "name": "playful" }]
    })
}

async fn create_pet(app: &Router, body: &Value) -> Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/pets", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await
}

#[tokio::test]
async fn create_returns_nested_pet() {
    let app = test_app().await;

    let pet = create_pet(&app, &rex()).await;

    assert!(pet["id"].is_i64());
    assert_eq!(pet["name"], "Rex");
    assert_eq!(pet["age"], 3);
    assert_eq!(pet["weight"], 12.5);
    assert_eq!(pet["sex"], "Male");
    assert_eq!(pet["group"]["scientific_name"], "Canis lupus familiaris");
    assert_eq!(pet["group"]["name"], "dog");
    assert_eq!(pet["traits"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn sex_defaults_to_not_informed() {
    let app = test_app().await;

    let mut body = rex();
    body.as_object_mut().unwrap().remove("sex");
    let pet = create_pet(&app, &body).await;

    assert_eq!(pet["sex"], "Not Informed");
}

#[tokio::test]
async fn duplicate_trait_names_in_one_request_create_one_row() {
    let app = test_app().await;

    let mut body = rex();
    body["traits"] = json!([{ "name": "Fluffy" }, { "name": "FLUFFY" }]);
    let pet = create_pet(&app, &body).await;

    let traits = pet["traits"].as_array().unwrap();
    assert_eq!(traits.len(), 1);
    // First spelling wins.
    assert_eq!(traits[0]["name"], "Fluffy");
}

#[tokio::test]
async fn existing_group_is_reused() {
    let app = test_app().await;

    let first = create_pet(&app, &rex()).await;

    let mut body = rex();
    body["name"] = json!("Bella");
    // Different display name; an existing group keeps its fields.
    body["group"] = json!({ "scientific_name": "Canis lupus familiaris", "name": "wolf" });
    let second = create_pet(&app, &body).await;

    assert_eq!(first["group"]["id"], second["group"]["id"]);
    assert_eq!(second["group"]["name"], "dog");
}

#[tokio::test]
async fn create_with_missing_fields_returns_field_errors() {
    let app = test_app().await;

    let response = app
        .oneshot(json_request("POST", "/pets", &json!({ "name": "Rex" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors = response_json(response).await;
    for field in ["age", "weight", "group", "traits"] {
        assert_eq!(errors[field][0], "This field is required.", "{field}");
    }
}

#[tokio::test]
async fn retrieve_unknown_pet_returns_404_detail() {
    let app = test_app().await;

    let response = app.oneshot(get_request("/pets/999")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_json(response).await, json!({ "detail": "Not found." }));
}

#[tokio::test]
async fn retrieve_returns_created_pet() {
    let app = test_app().await;

    let pet = create_pet(&app, &rex()).await;
    let uri = format!("/pets/{}", pet["id"]);

    let response = app.oneshot(get_request(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, pet);
}

#[tokio::test]
async fn delete_twice_returns_204_then_404() {
    let app = test_app().await;

    let pet = create_pet(&app, &rex()).await;
    let uri = format!("/pets/{}", pet["id"]);

    let first = app.clone().oneshot(delete_request(&uri)).await.unwrap();
    assert_eq!(first.status(), StatusCode::NO_CONTENT);
    let bytes = axum::body::to_bytes(first.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());

    let second = app.oneshot(delete_request(&uri)).await.unwrap();
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_keeps_group_and_traits_in_store() {
    let app = test_app().await;

    let pet = create_pet(&app, &rex()).await;
    let uri = format!("/pets/{}", pet["id"]);
    let response = app.clone().oneshot(delete_request(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // A new pet referencing the same natural keys reuses the old rows:
    // same group id, and the trait keeps its originally stored case.
    let mut body = rex();
    body["traits"] = json!([{ "name": "FLUFFY" }]);
    let replacement = create_pet(&app, &body).await;

    assert_eq!(replacement["group"]["id"], pet["group"]["id"]);
    assert_eq!(replacement["traits"][0]["name"], "Fluffy");
    assert_eq!(replacement["traits"][0]["id"], pet["traits"][0]["id"]);
}

#[tokio::test]
async fn patch_replaces_full_trait_set() {
    let app = test_app().await;

    let pet = create_pet(&app, &rex()).await;
    let uri = format!("/pets/{}", pet["id"]);

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &uri,
            &json!({ "traits": [{ "name": "calm" }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = response_json(response).await;
    let traits = updated["traits"].as_array().unwrap();
    assert_eq!(traits.len(), 1);
    assert_eq!(traits[0]["name"], "calm");

    // Detached traits stay in the store: a later reference by any case
    // resolves to the original row.
    let mut body = rex();
    body["traits"] = json!([{ "name": "fluffy" }]);
    let other = create_pet(&app, &body).await;
    assert_eq!(other["traits"][0]["name"], "Fluffy");
}

#[tokio::test]
async fn patch_scalar_fields_only_touches_supplied_ones() {
    let app = test_app().await;

    let pet = create_pet(&app, &rex()).await;
    let uri = format!("/pets/{}", pet["id"]);

    let response = app
        .clone()
        .oneshot(json_request("PATCH", &uri, &json!({ "age": 4 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = response_json(response).await;
    assert_eq!(updated["age"], 4);
    assert_eq!(updated["name"], "Rex");
    assert_eq!(updated["sex"], "Male");
    assert_eq!(updated["traits"], pet["traits"]);
}

#[tokio::test]
async fn patch_reassigns_group() {
    let app = test_app().await;

    let pet = create_pet(&app, &rex()).await;
    let uri = format!("/pets/{}", pet["id"]);

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &uri,
            &json!({ "group": { "scientific_name": "Felis catus", "name": "cat" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = response_json(response).await;
    assert_eq!(updated["group"]["scientific_name"], "Felis catus");
    assert_ne!(updated["group"]["id"], pet["group"]["id"]);
}

#[tokio::test]
async fn patch_invalid_sex_returns_400_and_leaves_record_unchanged() {
    let app = test_app().await;

    let pet = create_pet(&app, &rex()).await;
    let uri = format!("/pets/{}", pet["id"]);

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &uri,
            &json!({ "sex": "Robot", "age": 99 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors = response_json(response).await;
    assert_eq!(errors["sex"][0], "\"Robot\" is not a valid choice.");

    // Nothing was written, not even the valid age field.
    let current = app.oneshot(get_request(&uri)).await.unwrap();
    let current = response_json(current).await;
    assert_eq!(current["sex"], "Male");
    assert_eq!(current["age"], 3);
}

#[tokio::test]
async fn patch_unknown_pet_returns_404() {
    let app = test_app().await;

    let response = app
        .oneshot(json_request("PATCH", "/pets/999", &json!({ "age": 4 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn trait_filter_is_case_insensitive() {
    let app = test_app().await;

    create_pet(&app, &rex()).await;
    let mut plain = rex();
    plain["name"] = json!("Bella");
    plain["traits"] = json!([]);
    create_pet(&app, &plain).await;

    let lower = app
        .clone()
        .oneshot(get_request("/pets?trait=fluffy"))
        .await
        .unwrap();
    assert_eq!(lower.status(), StatusCode::OK);
    let lower = response_json(lower).await;

    let upper = app
        .clone()
        .oneshot(get_request("/pets?trait=FLUFFY"))
        .await
        .unwrap();
    let upper = response_json(upper).await;

    assert_eq!(lower, upper);
    assert_eq!(lower["count"], 1);
    assert_eq!(lower["results"][0]["name"], "Rex");

    let unfiltered = app.oneshot(get_request("/pets")).await.unwrap();
    let unfiltered = response_json(unfiltered).await;
    assert_eq!(unfiltered["count"], 2);
}

#[tokio::test]
async fn list_paginates_in_id_order() {
    let app = test_app_with_page_size(2).await;

    for name in ["Rex", "Bella", "Milo"] {
        let mut body = rex();
        body["name"] = json!(name);
        create_pet(&app, &body).await;
    }

    let first = app.clone().oneshot(get_request("/pets?page=1")).await.unwrap();
    let first = response_json(first).await;
    assert_eq!(first["count"], 3);
    assert_eq!(first["previous"], Value::Null);
    assert_eq!(first["next"], 2);
    assert_eq!(first["results"].as_array().unwrap().len(), 2);
    assert_eq!(first["results"][0]["name"], "Rex");
    assert_eq!(first["results"][1]["name"], "Bella");

    let second = app.clone().oneshot(get_request("/pets?page=2")).await.unwrap();
    let second = response_json(second).await;
    assert_eq!(second["previous"], 1);
    assert_eq!(second["next"], Value::Null);
    assert_eq!(second["results"][0]["name"], "Milo");

    let past_end = app.oneshot(get_request("/pets?page=3")).await.unwrap();
    assert_eq!(past_end.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response_json(past_end).await,
        json!({ "detail": "Invalid page." })
    );
}

#[tokio::test]
async fn bad_page_numbers_return_invalid_page() {
    let app = test_app().await;

    for uri in ["/pets?page=0", "/pets?page=abc"] {
        let response = app.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(
            response_json(response).await,
            json!({ "detail": "Invalid page." }),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn empty_list_is_a_valid_first_page() {
    let app = test_app().await;

    let response = app.oneshot(get_request("/pets")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = response_json(response).await;
    assert_eq!(page["count"], 0);
    assert_eq!(page["next"], Value::Null);
    assert_eq!(page["previous"], Value::Null);
    assert_eq!(page["results"], json!([]));
}
