//! End-to-end blood request lifecycle over the HTTP surface.

#[path = "support/http.rs"]
mod http_support;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use http_support::{Harness, authorised, call_json, init_app};
use lifelink::domain::RequestEvent;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

async fn post<S>(app: &S, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    call_json(app, authorised(TestRequest::post().uri(path), token).set_json(body)).await
}

async fn get<S>(app: &S, path: &str, token: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    call_json(app, authorised(TestRequest::get().uri(path), Some(token))).await
}

/// Register an account and return `(user id, bearer token)`.
async fn sign_up<S>(app: &S, mut registration: Value) -> (String, String)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    registration["password"] = json!("s3cret-pass");
    let email = registration["email"].clone();
    let (status, body) = post(app, "/api/auth/register", None, registration).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let user_id = body["userId"].as_str().expect("user id").to_owned();

    let (status, body) = post(
        app,
        "/api/auth/login",
        None,
        json!({"email": email, "password": "s3cret-pass"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let token = body["token"].as_str().expect("token").to_owned();
    (user_id, token)
}

fn hospital(email: &str, city: &str) -> Value {
    json!({
        "name": "Sassoon General",
        "email": email,
        "role": "hospital",
        "city": city,
        "hospitalName": "Sassoon General",
        "contactNumber": "020-2612-8000",
    })
}

fn donor(email: &str, city: &str, blood_group: &str) -> Value {
    json!({
        "name": "Asha",
        "email": email,
        "role": "donor",
        "city": city,
        "bloodGroup": blood_group,
    })
}

fn ids(listing: &Value) -> Vec<String> {
    listing["requests"]
        .as_array()
        .expect("requests array")
        .iter()
        .map(|request| request["id"].as_str().expect("id").to_owned())
        .collect()
}

#[rstest]
#[actix_web::test]
async fn request_lifecycle_between_hospital_and_donor(harness: Harness) {
    let app = init_app(&harness).await;
    let mut events = harness.hub.subscribe();
    let (_hospital_id, hospital_token) = sign_up(&app, hospital("h@pune.example", "pune")).await;
    let (donor_id, donor_token) = sign_up(&app, donor("d@pune.example", "pune", "B+")).await;

    let (status, created) = post(
        &app,
        "/api/requests/create",
        Some(&hospital_token),
        json!({"bloodGroup": "B+", "urgency": "high"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let request_id = created["requestId"].as_str().expect("request id").to_owned();
    assert!(matches!(
        events.try_recv().expect("new request event"),
        RequestEvent::NewRequest { .. }
    ));

    let (_, own) = get(&app, "/api/requests/list?role=hospital", &hospital_token).await;
    let stored = &own["requests"][0];
    assert_eq!(stored["id"], request_id.as_str());
    assert_eq!(stored["status"], "active");
    assert_eq!(stored["city"], "pune");
    assert_eq!(stored["bloodGroup"], "B+");
    assert_eq!(stored["urgency"], "high");
    assert_eq!(stored["quantity"], 1);

    let (status, matching) = get(&app, "/api/requests/list?role=donor", &donor_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&matching), vec![request_id.clone()]);
    assert_eq!(matching["requests"][0]["responded"], false);

    let body = json!({"requestId": request_id});
    let (status, first) =
        post(&app, "/api/requests/respond", Some(&donor_token), body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["alreadyResponded"], false);
    let (_, second) = post(&app, "/api/requests/respond", Some(&donor_token), body.clone()).await;
    assert_eq!(second["alreadyResponded"], true);
    assert_eq!(second["message"], "Already responded");

    let (status, responders) =
        post(&app, "/api/requests/responders", Some(&hospital_token), body).await;
    assert_eq!(status, StatusCode::OK);
    let responders = responders["responders"].as_array().expect("responders");
    assert_eq!(responders.len(), 1);
    assert_eq!(responders[0]["donor"]["id"], donor_id.as_str());
    assert_eq!(responders[0]["donor"]["bloodGroup"], "B+");

    let (status, rejected) = post(
        &app,
        "/api/requests/status",
        Some(&hospital_token),
        json!({"requestId": request_id, "status": "deleted"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected["message"], "Invalid status");

    let (status, updated) = post(
        &app,
        "/api/requests/status",
        Some(&hospital_token),
        json!({"requestId": request_id, "status": "fulfilled"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "fulfilled");

    let (_, after) = get(&app, "/api/requests/list?role=donor", &donor_token).await;
    assert!(ids(&after).is_empty());

    let (_, history) = get(&app, "/api/history/donor", &donor_token).await;
    assert_eq!(history["history"][0]["id"], request_id.as_str());
    assert_eq!(history["history"][0]["status"], "fulfilled");
}

#[rstest]
#[actix_web::test]
async fn city_and_blood_group_are_normalised_before_matching(harness: Harness) {
    let app = init_app(&harness).await;
    let (_, hospital_token) = sign_up(&app, hospital("h@mumbai.example", " Mumbai ")).await;
    let (_, donor_token) = sign_up(&app, donor("d@nashik.example", "nashik", "A+")).await;

    let (status, created) = post(
        &app,
        "/api/requests/create",
        Some(&hospital_token),
        json!({"bloodGroup": "o+"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let request_id = created["requestId"].as_str().expect("request id").to_owned();

    let (_, own) = get(&app, "/api/requests/list?role=hospital", &hospital_token).await;
    assert_eq!(own["requests"][0]["city"], "mumbai");
    assert_eq!(own["requests"][0]["bloodGroup"], "O+");

    let (_, matching) = get(
        &app,
        "/api/requests/list?role=donor&city=MUMBAI&bloodGroup=o%2B",
        &donor_token,
    )
    .await;
    assert_eq!(ids(&matching), vec![request_id]);

    let (_, own_profile) = get(&app, "/api/requests/list?role=donor", &donor_token).await;
    assert!(ids(&own_profile).is_empty());
}

#[rstest]
#[actix_web::test]
async fn responses_carry_trace_identifiers(harness: Harness) {
    let app = init_app(&harness).await;

    let res = actix_web::test::call_service(
        &app,
        TestRequest::get().uri("/api/requests/list").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let header = res
        .headers()
        .get("trace-id")
        .expect("trace id header")
        .to_str()
        .expect("ascii")
        .to_owned();
    let body: Value = actix_web::test::read_body_json(res).await;
    assert_eq!(body["traceId"], header.as_str());
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn health_probes_report_ready(harness: Harness) {
    let app = init_app(&harness).await;
    for path in ["/health/ready", "/health/live"] {
        let res =
            actix_web::test::call_service(&app, TestRequest::get().uri(path).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK, "{path}");
    }
}
