//! End-to-end resolution against wiremock-backed places endpoints.

use locus_core::{
    CandidateEntity, MatchMethod, Outline, OutlineSource, Resolution, UnresolvedReason,
};
use locus_places::{PlacesClient, PlacesClientConfig, RetryPolicy};
use locus_resolver::{ResolveOptions, Resolver};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver_for(server: &MockServer, options: ResolveOptions) -> Resolver<PlacesClient> {
    let config = PlacesClientConfig {
        places_base_url: format!("{}/v1", server.uri()),
        geocode_url: format!("{}/v4alpha/geocode/destinations", server.uri()),
        retry: RetryPolicy::immediate(3),
        ..PlacesClientConfig::new("test-key")
    };
    let client = PlacesClient::new(config).expect("client construction should not fail");
    Resolver::new(client, options)
}

fn chapel() -> CandidateEntity {
    CandidateEntity {
        id: 7,
        name: "Grace Chapel".to_owned(),
        street: "630 W 28th St".to_owned(),
        city: "Indianapolis".to_owned(),
        state: "IN".to_owned(),
        country: "USA".to_owned(),
        postal_code: "46208".to_owned(),
        latitude: None,
        longitude: None,
    }
}

fn geocode_body() -> serde_json::Value {
    json!({
        "destinations": [{
            "primary": {
                "place": "places/place-1",
                "location": {"latitude": 39.8105, "longitude": -86.1705},
                "formattedAddress": "630 W 28th St, Indianapolis, IN 46208, USA",
                "structureType": "POINT"
            },
            "containingPlaces": [{
                "structureType": "GROUNDS",
                "containingPlaces": [{
                    "structureType": "BUILDING",
                    "displayPolygon": {
                        "type": "Polygon",
                        "coordinates": [[
                            [-86.171, 39.81], [-86.17, 39.81], [-86.17, 39.811], [-86.171, 39.81]
                        ]]
                    }
                }]
            }]
        }]
    })
}

#[tokio::test]
async fn autocomplete_match_resolves_with_outline() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/places:autocomplete"))
        .and(body_json(json!({"input": "Grace Chapel"})))
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
    Mock::given(method("POST"))
        .and(path("/v4alpha/geocode/destinations"))
        .and(body_json(json!({"place": "places/place-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocode_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/places:searchText"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"places": []})))
        .expect(0)
        .mount(&server)
        .await;

    let resolution = resolver_for(&server, ResolveOptions::default())
        .resolve(&chapel())
        .await;

    let Resolution::Resolved(location) = resolution else {
        panic!("expected resolved, got {resolution:?}");
    };
    assert_eq!(location.match_method, MatchMethod::Autocomplete);
    assert_eq!(
        location.formatted_address,
        "630 W 28th St, Indianapolis, IN 46208, USA"
    );
    assert_eq!(
        location.outlines,
        vec![Outline::Wkt(
            "POLYGON ((-86.171 39.81, -86.17 39.81, -86.17 39.811, -86.171 39.81))".to_owned()
        )]
    );
}

#[tokio::test]
async fn rate_limited_text_search_is_reported_as_failed_after_three_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/places:searchText"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let options = ResolveOptions {
        autocomplete_enabled: false,
        ..ResolveOptions::default()
    };
    let resolution = resolver_for(&server, options).resolve(&chapel()).await;

    assert!(resolution.is_failed(), "unexpected {resolution:?}");
    assert_eq!(resolution.entity_id(), 7);
}

#[tokio::test]
async fn bad_request_on_text_search_leaves_entity_unresolved() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/places:searchText"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let options = ResolveOptions {
        autocomplete_enabled: false,
        ..ResolveOptions::default()
    };
    let resolution = resolver_for(&server, options).resolve(&chapel()).await;

    assert_eq!(
        resolution,
        Resolution::Unresolved {
            entity_id: 7,
            reason: UnresolvedReason::NoSearchResults
        }
    );
}

#[tokio::test]
async fn outlines_by_address_finds_nested_building() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v4alpha/geocode/destinations"))
        .and(body_json(json!({
            "addressQuery": {"addressQuery": "630 W 28th St, Indianapolis, IN 46208, USA"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocode_body()))
        .expect(1)
        .mount(&server)
        .await;

    let set = resolver_for(&server, ResolveOptions::default())
        .outlines_only(&chapel(), OutlineSource::Address)
        .await
        .expect("outline lookup should succeed");

    assert_eq!(set.outlines.len(), 1);
}
