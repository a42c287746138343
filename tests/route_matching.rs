use url::Url;
use weather_provider::contract::CONTENT_AUTHORITY;
use weather_provider::{ContentKind, ContentUris, ProviderError, Resource, Route};

fn uris() -> ContentUris {
    ContentUris::new(CONTENT_AUTHORITY).unwrap()
}

fn resolve(uri: &str) -> Result<Route, ProviderError> {
    Route::resolve(&Url::parse(uri).unwrap(), CONTENT_AUTHORITY)
}

#[test]
fn test_bare_collections() {
    assert_eq!(Route::resolve(&uris().weather(), CONTENT_AUTHORITY).unwrap(), Route::Weather);
    assert_eq!(Route::resolve(&uris().location(), CONTENT_AUTHORITY).unwrap(), Route::Location);
}

#[test]
fn test_location_setting_without_start_date() {
    let route = Route::resolve(&uris().weather_for_location("94043"), CONTENT_AUTHORITY).unwrap();
    assert_eq!(
        route,
        Route::WeatherWithLocation {
            location_setting: "94043".to_string(),
            start_date: None,
        }
    );
}

#[test]
fn test_location_setting_with_start_date() {
    let uri = uris().weather_for_location_with_start_date("94043", "2014-07-05");
    assert_eq!(
        uri.as_str(),
        "content://ar.com.guzik.sunshine.app/weather/94043?date=2014-07-05"
    );
    let route = Route::resolve(&uri, CONTENT_AUTHORITY).unwrap();
    assert_eq!(
        route,
        Route::WeatherWithLocation {
            location_setting: "94043".to_string(),
            start_date: Some("2014-07-05".to_string()),
        }
    );
}

#[test]
fn test_two_segments_win_over_one() {
    let route = resolve("content://ar.com.guzik.sunshine.app/weather/94043/20140705").unwrap();
    assert_eq!(
        route,
        Route::WeatherWithLocationAndDate {
            location_setting: "94043".to_string(),
            date: "20140705".to_string(),
        }
    );

    // a start date does not change the exact-date shape
    let route =
        resolve("content://ar.com.guzik.sunshine.app/weather/94043/20140705?date=20140101")
            .unwrap();
    assert!(matches!(route, Route::WeatherWithLocationAndDate { .. }));
}

#[test]
fn test_location_id() {
    assert_eq!(
        Route::resolve(&uris().location_with_id(7), CONTENT_AUTHORITY).unwrap(),
        Route::LocationId(7)
    );
}

#[test]
fn test_segments_are_percent_decoded() {
    let uri = uris().weather_for_location_and_date("Mountain View, CA", "2014-07-05");
    assert_eq!(
        uri.as_str(),
        "content://ar.com.guzik.sunshine.app/weather/Mountain%20View,%20CA/2014-07-05"
    );
    assert_eq!(
        Route::resolve(&uri, CONTENT_AUTHORITY).unwrap(),
        Route::WeatherWithLocationAndDate {
            location_setting: "Mountain View, CA".to_string(),
            date: "2014-07-05".to_string(),
        }
    );

    let uri = uris().weather_for_location("a/b");
    assert_eq!(
        Route::resolve(&uri, CONTENT_AUTHORITY).unwrap(),
        Route::WeatherWithLocation {
            location_setting: "a/b".to_string(),
            start_date: None,
        }
    );
}

#[test]
fn test_trailing_slash_is_ignored() {
    assert_eq!(resolve("content://ar.com.guzik.sunshine.app/location/").unwrap(), Route::Location);
}

#[test]
fn test_unknown_shapes_are_unsupported() {
    for uri in [
        "content://ar.com.guzik.sunshine.app",
        "content://ar.com.guzik.sunshine.app/forecast",
        "content://ar.com.guzik.sunshine.app/forecast/94043",
        "content://ar.com.guzik.sunshine.app/weather/94043/20140705/extra",
        "content://ar.com.guzik.sunshine.app/location/7/extra",
        "content://ar.com.guzik.sunshine.app/location/abc",
        "content://ar.com.guzik.sunshine.app/location/-3",
        "content://ar.com.guzik.sunshine.app/location/99999999999999999999",
        "content://com.example.other/weather",
        "https://ar.com.guzik.sunshine.app/weather",
        "content://u:p@ar.com.guzik.sunshine.app/weather",
        "content://u@ar.com.guzik.sunshine.app/weather",
        "content://ar.com.guzik.sunshine.app:9/weather",
    ] {
        match resolve(uri) {
            Err(ProviderError::UnsupportedRequest(reported)) => {
                assert_eq!(reported, uri_string(uri))
            }
            other => panic!("{uri} resolved to {other:?}"),
        }
    }
}

fn uri_string(uri: &str) -> String {
    Url::parse(uri).unwrap().to_string()
}

#[test]
fn test_content_types() {
    let authority = CONTENT_AUTHORITY;
    let weather = resolve("content://ar.com.guzik.sunshine.app/weather").unwrap();
    assert_eq!(weather.content_type(authority).kind, ContentKind::Collection);
    assert_eq!(
        weather.content_type(authority).to_string(),
        "vnd.android.cursor.dir/ar.com.guzik.sunshine.app/weather"
    );

    let by_setting = resolve("content://ar.com.guzik.sunshine.app/weather/94043").unwrap();
    assert_eq!(by_setting.content_type(authority).kind, ContentKind::Item);

    let by_date = resolve("content://ar.com.guzik.sunshine.app/weather/94043/20140705").unwrap();
    assert_eq!(by_date.content_type(authority).kind, ContentKind::Item);

    let location = resolve("content://ar.com.guzik.sunshine.app/location").unwrap();
    assert_eq!(
        location.content_type(authority).to_string(),
        "vnd.android.cursor.dir/ar.com.guzik.sunshine.app/location"
    );

    let location_id = resolve("content://ar.com.guzik.sunshine.app/location/7").unwrap();
    assert_eq!(
        location_id.content_type(authority).to_string(),
        "vnd.android.cursor.item/ar.com.guzik.sunshine.app/location"
    );
    assert_eq!(location_id.resource(), Resource::Location);
}

#[test]
fn test_custom_authority() {
    let uris = ContentUris::new("com.example.weather").unwrap();
    assert_eq!(uris.authority(), "com.example.weather");
    assert_eq!(
        Route::resolve(&uris.location_with_id(3), "com.example.weather").unwrap(),
        Route::LocationId(3)
    );
    assert!(Route::resolve(&uris.location_with_id(3), CONTENT_AUTHORITY).is_err());
}
