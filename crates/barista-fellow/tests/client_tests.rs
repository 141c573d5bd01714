//! HTTP-level tests for the brewer cloud client, against a mock server.

use serde_json::json;
use wiremock::matchers::{body_json_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use barista_fellow::{CoffeeProfile, FellowClient, FellowError};

fn profile_body(title: &str) -> serde_json::Value {
    json!({
        "profileType": 0,
        "title": title,
        "ratio": 16.0,
        "bloomEnabled": true,
        "bloomRatio": 2.5,
        "bloomDuration": 30,
        "bloomTemperature": 93.5,
        "ssPulsesEnabled": true,
        "ssPulseCount": 2,
        "ssPulseTime": 25,
        "ssPulseTemperatures": [95.0, 92.5],
        "batchPulsesEnabled": true,
        "batchPulseCount": 1,
        "batchPulseTime": 20,
        "batchPulseTemperatures": [92.0]
    })
}

fn stored_body(id: &str, title: &str) -> serde_json::Value {
    let mut body = profile_body(title);
    body["id"] = json!(id);
    body["lastUsedTime"] = json!(1736000000000i64);
    body
}

async fn logged_in_client(server: &MockServer) -> FellowClient {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "token-abc",
            "refreshToken": "refresh-abc",
            "userId": "user-1"
        })))
        .mount(server)
        .await;

    let client = FellowClient::with_base_url(server.uri());
    client.login("user@example.com", "hunter2").await.unwrap();
    client
}

#[tokio::test]
async fn login_stores_session_and_sends_bearer_token() {
    let server = MockServer::start().await;
    let client = logged_in_client(&server).await;
    assert!(client.is_authenticated().await);

    Mock::given(method("GET"))
        .and(path("/profiles"))
        .and(header("Authorization", "Bearer token-abc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([stored_body("p-1", "Morning")])),
        )
        .mount(&server)
        .await;

    let profiles = client.get_profiles().await.unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].id, "p-1");
    assert_eq!(profiles[0].profile.title, "Morning");
}

#[tokio::test]
async fn login_failure_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "email or password is incorrect"
        })))
        .mount(&server)
        .await;

    let client = FellowClient::with_base_url(server.uri());
    let err = client.login("user@example.com", "wrong").await.unwrap_err();
    assert!(matches!(err, FellowError::Auth(_)));
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn unauthenticated_calls_fail_without_network() {
    let server = MockServer::start().await;
    let client = FellowClient::with_base_url(server.uri());
    let err = client.get_profiles().await.unwrap_err();
    assert!(matches!(err, FellowError::Auth(_)));
}

#[tokio::test]
async fn create_profile_validates_before_sending() {
    let server = MockServer::start().await;
    let client = logged_in_client(&server).await;

    let mut profile: CoffeeProfile = serde_json::from_value(profile_body("Too Strong")).unwrap();
    profile.ratio = 12.0;

    // No /profiles mock is mounted: a request would fail loudly.
    let err = client.create_profile(&profile).await.unwrap_err();
    assert!(matches!(err, FellowError::InvalidProfile(_)));
}

#[tokio::test]
async fn create_profile_maps_limit_conflict() {
    let server = MockServer::start().await;
    let client = logged_in_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/profiles"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "profile limit reached for device"
        })))
        .mount(&server)
        .await;

    let profile: CoffeeProfile = serde_json::from_value(profile_body("Slot 15")).unwrap();
    let err = client.create_profile(&profile).await.unwrap_err();
    assert!(matches!(err, FellowError::ProfileLimit));
}

#[tokio::test]
async fn parse_brewlink_fetches_shared_profile() {
    let server = MockServer::start().await;
    let client = FellowClient::with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/shared/a1b2c3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body("Shared Gesha")))
        .mount(&server)
        .await;

    let profile = client
        .parse_brewlink("https://fellow.co/p/a1b2c3")
        .await
        .unwrap();
    assert_eq!(profile.title, "Shared Gesha");
}

#[tokio::test]
async fn parse_brewlink_rejects_unknown_slug() {
    let server = MockServer::start().await;
    let client = FellowClient::with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/shared/zzzz99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.parse_brewlink("zzzz99").await.unwrap_err();
    assert!(matches!(err, FellowError::InvalidBrewLink(_)));
}

#[tokio::test]
async fn device_config_is_cached_until_remote_refresh() {
    let server = MockServer::start().await;
    let client = logged_in_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/device/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "displayClock24hrMode": true,
            "deviceTimezone": "EST5EDT"
        })))
        .expect(2)
        .mount(&server)
        .await;

    // First call fetches; second serves the cache; remote refresh fetches again.
    let first = client.get_device_config(false).await.unwrap();
    assert_eq!(first["deviceTimezone"], "EST5EDT");
    let cached = client.get_device_config(false).await.unwrap();
    assert_eq!(cached, first);
    client.get_device_config(true).await.unwrap();
}

#[tokio::test]
async fn adjust_setting_patches_and_invalidates_cache() {
    let server = MockServer::start().await;
    let client = logged_in_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/device/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "displayClock24hrMode": true
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/device/config"))
        .and(body_json_string(r#"{"displayClock24hrMode":false}"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    client.get_device_config(false).await.unwrap();
    client
        .adjust_setting("displayClock24hrMode", &json!(false))
        .await
        .unwrap();
    // Cache was dropped, so this refetches.
    client.get_device_config(false).await.unwrap();
}

#[tokio::test]
async fn generate_share_link_expands_slug() {
    let server = MockServer::start().await;
    let client = logged_in_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/profiles/p-1/share"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"link": "a1b2c3"})))
        .mount(&server)
        .await;

    let link = client.generate_share_link("p-1").await.unwrap();
    assert_eq!(link, "https://fellow.co/p/a1b2c3");
}
