use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, LocalDocumentStore};
use server::{ServerState, router};

const BOUNDARY: &str = "pharmalink-test-boundary";
const LICENSE: &[u8] = b"%PDF-1.4";

async fn app() -> (Router, DatabaseConnection, tempfile::TempDir) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let uploads = tempfile::tempdir().unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .documents(Arc::new(LocalDocumentStore::new(
            uploads.path(),
            "/uploads",
        )))
        .build()
        .await
        .unwrap();
    let state = ServerState {
        engine: Arc::new(engine),
    };
    (router(state), db, uploads)
}

async fn count(db: &DatabaseConnection, table: &str) -> i64 {
    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

fn patient_payload() -> Value {
    json!({
        "email": "a@x.com",
        "username": "abc",
        "password": "pw123456",
        "confirmPassword": "pw123456",
        "phone": "555-0100",
        "fullName": "A B",
        "dateOfBirth": "1990-01-01",
        "gender": "male",
        "streetAddress": "1 Main St",
        "city": "Springfield",
        "stateProvince": "IL",
        "postalCode": "62701",
        "country": "US"
    })
}

fn pharmacy_form(document: Option<(&str, &[u8])>) -> Request<Body> {
    pharmacy_form_with(&[], document)
}

fn pharmacy_form_with(
    extra: &[(&str, &str)],
    document: Option<(&str, &[u8])>,
) -> Request<Body> {
    let fields = [
        ("name", "Corner Pharmacy"),
        ("email", "corner@pharmacy.com"),
        ("username", "corner"),
        ("password", "secret-pass"),
        ("confirmPassword", "secret-pass"),
        ("licenseNumber", "LIC-42"),
        ("phone", "555-0199"),
        ("streetAddress", "2 Main St"),
        ("city", "Springfield"),
        ("stateProvince", "IL"),
        ("postalCode", "62701"),
        ("country", "US"),
    ];

    let mut body = Vec::new();
    for &(name, value) in fields.iter().chain(extra) {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = document {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"licenseDocument\"; \
                 filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/signup/pharmacy")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn register_pharmacy(app: &Router) -> String {
    let (status, body) = send(app, pharmacy_form(Some(("license.pdf", LICENSE)))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["pharmacy"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn patient_signup_then_duplicate_conflicts() {
    let (app, db, _uploads) = app().await;

    let (status, body) = send(&app, post_json("/signup/patient", &patient_payload())).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["role"], "PATIENT");
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["profile"]["fullName"], "A B");
    assert!(body["user"].get("passwordHash").is_none());

    let (status, body) = send(&app, post_json("/signup/patient", &patient_payload())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("email"));

    assert_eq!(count(&db, "accounts").await, 1);
}

#[tokio::test]
async fn invalid_patient_signup_reports_details() {
    let (app, db, _uploads) = app().await;

    let mut payload = patient_payload();
    payload["fullName"] = json!("   ");
    payload["confirmPassword"] = json!("something-else");

    let (status, body) = send(&app, post_json("/signup/patient", &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"fullName"));
    assert!(fields.contains(&"confirmPassword"));

    assert_eq!(count(&db, "accounts").await, 0);
    assert_eq!(count(&db, "patient_profiles").await, 0);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let (app, _db, _uploads) = app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/signup/patient")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\":"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn pharmacy_signup_with_document() {
    let (app, db, uploads) = app().await;

    let (status, body) = send(&app, pharmacy_form(Some(("license.pdf", LICENSE)))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["pharmacy"]["verified"], false);
    assert_eq!(body["pharmacy"]["licenseNumber"], "LIC-42");
    assert_eq!(body["pharmacy"]["username"], "corner");
    assert!(body["message"].is_string());

    assert_eq!(count(&db, "pharmacies").await, 1);
    assert_eq!(std::fs::read_dir(uploads.path()).unwrap().count(), 1);

    let (status, _) = send(&app, pharmacy_form(Some(("license.pdf", LICENSE)))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn pharmacy_signup_without_document_is_rejected() {
    let (app, db, _uploads) = app().await;

    let (status, body) = send(&app, pharmacy_form(None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "License document is required");

    let (status, _) = send(&app, pharmacy_form(Some(("license.pdf", &[][..])))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(count(&db, "pharmacies").await, 0);
}

#[tokio::test]
async fn pharmacy_signup_rejects_foreign_role() {
    let (app, db, uploads) = app().await;
    let document = Some(("license.pdf", LICENSE));

    for role in ["ADMIN", "PATIENT"] {
        let (status, body) = send(&app, pharmacy_form_with(&[("role", role)], document)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["details"][0]["field"], "role");
    }
    assert_eq!(count(&db, "pharmacies").await, 0);
    assert_eq!(std::fs::read_dir(uploads.path()).unwrap().count(), 0);

    let (status, body) = send(&app, pharmacy_form_with(&[("role", "PHARMACY")], document)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
}

#[tokio::test]
async fn geolocation_upsert_keeps_one_location() {
    let (app, db, _uploads) = app().await;
    let pharmacy_id = register_pharmacy(&app).await;

    let (status, first) = send(
        &app,
        post_json(
            "/pharmacy/geolocation",
            &json!({"latitude": 12.5, "longitude": 77.6, "pharmacyId": pharmacy_id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    assert_eq!(first["latitude"], 12.5);
    assert_eq!(first["longitude"], 77.6);
    assert_eq!(first["pharmacyId"], pharmacy_id.as_str());

    let (status, second) = send(
        &app,
        post_json(
            "/pharmacy/geolocation",
            &json!({"latitude": 13.0, "longitude": 78.0, "pharmacyId": pharmacy_id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["latitude"], 13.0);
    assert_eq!(second["longitude"], 78.0);
    assert_eq!(count(&db, "geo_locations").await, 1);

    let (status, fetched) = send(&app, get(&format!("/pharmacy/{pharmacy_id}/geolocation"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], first["id"]);

    let (status, listing) = send(&app, get("/pharmacies")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing[0]["id"], pharmacy_id.as_str());
    assert_eq!(listing[0]["location"]["latitude"], 13.0);
}

#[tokio::test]
async fn geolocation_for_unknown_pharmacy_is_not_found() {
    let (app, _db, _uploads) = app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/pharmacy/geolocation",
            &json!({
                "latitude": 12.5,
                "longitude": 77.6,
                "pharmacyId": "00000000-0000-4000-8000-000000000000"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, get("/pharmacy/not-a-pharmacy/geolocation")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn geolocation_missing_member_is_bad_request() {
    let (app, _db, _uploads) = app().await;
    let pharmacy_id = register_pharmacy(&app).await;

    let (status, body) = send(
        &app,
        post_json(
            "/pharmacy/geolocation",
            &json!({"longitude": 77.6, "pharmacyId": pharmacy_id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "latitude");
}

#[tokio::test]
async fn me_requires_valid_credentials() {
    let (app, _db, _uploads) = app().await;
    send(&app, post_json("/signup/patient", &patient_payload())).await;

    let request = Request::builder()
        .uri("/me")
        .header(header::AUTHORIZATION, basic("abc", "pw123456"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "abc");
    assert_eq!(body["role"], "PATIENT");

    let request = Request::builder()
        .uri("/me")
        .header(header::AUTHORIZATION, basic("abc", "wrong-password"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn pharmacy_authenticates_with_role_header() {
    let (app, _db, _uploads) = app().await;
    let pharmacy_id = register_pharmacy(&app).await;

    let request = Request::builder()
        .uri("/me")
        .header(header::AUTHORIZATION, basic("corner", "secret-pass"))
        .header("x-role", "PHARMACY")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], pharmacy_id.as_str());
    assert_eq!(body["role"], "PHARMACY");

    // Pharmacies have no patient profile.
    let request = Request::builder()
        .uri("/patient/profile")
        .header(header::AUTHORIZATION, basic("corner", "secret-pass"))
        .header("x-role", "PHARMACY")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn patient_reads_own_profile() {
    let (app, _db, _uploads) = app().await;
    send(&app, post_json("/signup/patient", &patient_payload())).await;

    let request = Request::builder()
        .uri("/patient/profile")
        .header(header::AUTHORIZATION, basic("abc", "pw123456"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fullName"], "A B");
    assert_eq!(body["dateOfBirth"], "1990-01-01");
    assert_eq!(body["gender"], "male");
    assert!(body["medicalConditions"].is_null());
}
