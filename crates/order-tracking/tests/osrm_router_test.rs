//! Integration tests for `OsrmRouter` using wiremock HTTP mocks.

use order_tracking::model::Coordinate;
use order_tracking::route::{OsrmRouter, RoutingError, RoutingProvider};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORIGIN: Coordinate = Coordinate::new(19.78, -70.68);
const DESTINATION: Coordinate = Coordinate::new(19.79, -70.69);
const ROUTE_PATH: &str = "/route/v1/driving/-70.68,19.78;-70.69,19.79";

fn test_router(base_url: &str, timeout: Duration) -> OsrmRouter {
    OsrmRouter::with_base_url(base_url, "driving", timeout).expect("client construction should not fail")
}

#[tokio::test]
async fn test_route_returns_parsed_leg() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "code": "Ok",
        "routes": [{
            "duration": 312.4,
            "distance": 1843.2,
            "geometry": {
                "type": "LineString",
                "coordinates": [[-70.68, 19.78], [-70.685, 19.785], [-70.69, 19.79]]
            }
        }],
        "waypoints": []
    });

    Mock::given(method("GET"))
        .and(path(ROUTE_PATH))
        .and(query_param("overview", "full"))
        .and(query_param("geometries", "geojson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let router = test_router(&server.uri(), Duration::from_secs(5));
    let leg = router.route(ORIGIN, DESTINATION).await.expect("should parse route");

    assert_eq!(leg.duration, Duration::from_secs_f64(312.4));
    assert_eq!(leg.distance_meters, 1843.2);
    assert_eq!(
        leg.path,
        vec![ORIGIN, Coordinate::new(19.785, -70.685), DESTINATION]
    );
}

#[tokio::test]
async fn test_no_route_code_is_reported_even_with_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ROUTE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": "NoRoute",
            "message": "Impossible route between points"
        })))
        .mount(&server)
        .await;

    let router = test_router(&server.uri(), Duration::from_secs(5));
    let err = router.route(ORIGIN, DESTINATION).await.unwrap_err();

    match err {
        RoutingError::NoRoute(detail) => assert!(detail.starts_with("NoRoute"), "{detail}"),
        other => panic!("expected NoRoute, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_route_list_is_no_route() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "Ok",
            "routes": []
        })))
        .mount(&server)
        .await;

    let router = test_router(&server.uri(), Duration::from_secs(5));
    let result = router.route(ORIGIN, DESTINATION).await;
    assert!(matches!(result, Err(RoutingError::NoRoute(_))), "got: {result:?}");
}

#[tokio::test]
async fn test_non_json_body_is_bad_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let router = test_router(&server.uri(), Duration::from_secs(5));
    let result = router.route(ORIGIN, DESTINATION).await;
    match result {
        Err(RoutingError::BadResponse(msg)) => assert!(msg.contains("502"), "{msg}"),
        other => panic!("expected BadResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "code": "Ok", "routes": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let router = test_router(&server.uri(), Duration::from_millis(200));
    let result = router.route(ORIGIN, DESTINATION).await;
    assert!(matches!(result, Err(RoutingError::Timeout(_))), "got: {result:?}");
}

#[tokio::test]
async fn test_base_url_with_path_prefix_is_preserved() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/osrm{ROUTE_PATH}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "Ok",
            "routes": [{ "duration": 60.0, "distance": 500.0, "geometry": { "coordinates": [] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let router = test_router(&format!("{}/osrm/", server.uri()), Duration::from_secs(5));
    let leg = router.route(ORIGIN, DESTINATION).await.unwrap();
    assert_eq!(leg.duration, Duration::from_secs(60));
    assert!(leg.path.is_empty());
}
