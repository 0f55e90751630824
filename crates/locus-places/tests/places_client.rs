//! Integration tests for `PlacesClient` using wiremock HTTP mocks.

use locus_places::{
    GeocodeQuery, LatLng, PlacesClient, PlacesClientConfig, PlacesError, RetryPolicy,
    TextSearchQuery,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> PlacesClient {
    let config = PlacesClientConfig {
        places_base_url: format!("{}/v1", server.uri()),
        geocode_url: format!("{}/v4alpha/geocode/destinations", server.uri()),
        retry: RetryPolicy::immediate(3),
        ..PlacesClientConfig::new("test-key")
    };
    PlacesClient::new(config).expect("client construction should not fail")
}

fn chapel_query() -> TextSearchQuery {
    TextSearchQuery {
        name: "Grace Chapel".to_owned(),
        city: "Indianapolis".to_owned(),
        state: "IN".to_owned(),
        country: "USA".to_owned(),
    }
}

#[tokio::test]
async fn text_search_sends_query_and_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/places:searchText"))
        .and(header("X-Goog-Api-Key", "test-key"))
        .and(headers(
            "X-Goog-FieldMask",
            vec![
                "places.id",
                "places.displayName",
                "places.formattedAddress",
                "places.location",
            ],
        ))
        .and(body_json(json!({"textQuery": "Grace Chapel, Indianapolis, IN, USA"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "places": [{
                "id": "place-1",
                "displayName": {"text": "Grace Chapel"},
                "formattedAddress": "630 W 28th St, Indianapolis, IN 46208, USA",
                "location": {"latitude": 39.81, "longitude": -86.17}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = test_client(&server)
        .text_search(&chapel_query())
        .await
        .expect("text search should succeed");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].place_id.as_deref(), Some("place-1"));
    assert_eq!(results[0].display_name, "Grace Chapel");
}

#[tokio::test]
async fn autocomplete_includes_location_bias_when_coordinates_given() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/places:autocomplete"))
        .and(body_partial_json(json!({
            "input": "Grace Chapel",
            "locationBias": {"circle": {"radius": 50000.0}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "suggestions": [{
                "placePrediction": {
                    "placeId": "place-1",
                    "structuredFormat": {
                        "mainText": {"text": "Grace Chapel"},
                        "secondaryText": {"text": "630 W 28th St, Indianapolis, IN, USA"}
                    }
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let suggestions = test_client(&server)
        .autocomplete(
            "Grace Chapel",
            Some(LatLng {
                latitude: 39.81,
                longitude: -86.17,
            }),
        )
        .await
        .expect("autocomplete should succeed");

    assert_eq!(suggestions.len(), 1);
    assert_eq!(
        suggestions[0].secondary_text,
        "630 W 28th St, Indianapolis, IN, USA"
    );
}

#[tokio::test]
async fn rate_limited_request_is_attempted_exactly_three_times() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/places:searchText"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .text_search(&chapel_query())
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            PlacesError::RateLimited {
                operation: "text_search",
                attempts: 3
            }
        ),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn rate_limited_autocomplete_gives_up_after_three_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/places:autocomplete"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .autocomplete("Grace Chapel", None)
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            PlacesError::RateLimited {
                operation: "autocomplete",
                attempts: 3
            }
        ),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn rate_limited_geocode_gives_up_after_three_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v4alpha/geocode/destinations"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .geocode(&GeocodeQuery::PlaceId("place-1".to_owned()))
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            PlacesError::RateLimited {
                operation: "geocode",
                attempts: 3
            }
        ),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn rate_limit_then_success_recovers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v4alpha/geocode/destinations"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v4alpha/geocode/destinations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "destinations": [{"primary": {"place": "places/place-1"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_client(&server)
        .geocode(&GeocodeQuery::PlaceId("place-1".to_owned()))
        .await
        .expect("second attempt should succeed");

    assert_eq!(response.destinations.len(), 1);
}

#[tokio::test]
async fn bad_request_is_treated_as_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/places:searchText"))
        .respond_with(ResponseTemplate::new(400).set_body_string("INVALID_ARGUMENT"))
        .expect(1)
        .mount(&server)
        .await;

    let results = test_client(&server)
        .text_search(&chapel_query())
        .await
        .expect("HTTP 400 should not be an error");

    assert!(results.is_empty());
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v4alpha/geocode/destinations"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .geocode(&GeocodeQuery::Coordinate(LatLng {
            latitude: 1.0,
            longitude: 2.0,
        }))
        .await
        .unwrap_err();

    match err {
        PlacesError::Upstream {
            operation,
            status,
            body,
        } => {
            assert_eq!(operation, "geocode");
            assert_eq!(status, 500);
            assert_eq!(body, "backend unavailable");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/places:autocomplete"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .autocomplete("Grace Chapel", None)
        .await
        .unwrap_err();

    assert!(matches!(err, PlacesError::Deserialize { .. }));
}

#[tokio::test]
async fn geocode_by_address_posts_formatted_query() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v4alpha/geocode/destinations"))
        .and(header("X-Goog-Api-Key", "test-key"))
        .and(headers(
            "X-Goog-FieldMask",
            vec![
                "destinations.primary.place",
                "destinations.primary.location",
                "destinations.primary.formattedAddress",
                "destinations.primary.structureType",
                "destinations.primary.displayPolygon",
                "destinations.containingPlaces",
            ],
        ))
        .and(body_json(json!({
            "addressQuery": {"addressQuery": "630 W 28th St, Indianapolis, IN 46208, USA"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"destinations": []})))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_client(&server)
        .geocode(&GeocodeQuery::Address {
            street: "630 W 28th St".to_owned(),
            city: "Indianapolis".to_owned(),
            state: "IN".to_owned(),
            postal_code: "46208".to_owned(),
            country: "USA".to_owned(),
        })
        .await
        .expect("geocode should succeed");

    assert!(response.destinations.is_empty());
}
