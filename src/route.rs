//! Resolution of a resource URI into one of the five supported shapes.
//!
//! The URI is parsed into a resource name plus its remaining path segments and
//! matched on segment count, so `weather/{setting}/{date}` can never be taken
//! for `weather/{setting}` or `weather` whatever order the arms are written in.

use crate::contract::{ContentKind, ContentType, Resource, CONTENT_SCHEME, START_DATE_PARAM};
use crate::error::{ProviderError, Result};
use percent_encoding::percent_decode_str;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `weather`
    Weather,
    /// `weather/{setting}`, optionally bounded below by `?date={start}`
    WeatherWithLocation {
        location_setting: String,
        start_date: Option<String>,
    },
    /// `weather/{setting}/{date}`
    WeatherWithLocationAndDate {
        location_setting: String,
        date: String,
    },
    /// `location`
    Location,
    /// `location/{id}`
    LocationId(i64),
}

impl Route {
    /// Match `uri` against the shapes served under `authority`.
    pub fn resolve(uri: &Url, authority: &str) -> Result<Self> {
        let unsupported = || ProviderError::UnsupportedRequest(uri.to_string());

        if !has_authority(uri, authority) {
            return Err(unsupported());
        }
        let segments = path_segments(uri).ok_or_else(unsupported)?;
        let (resource, rest) = segments.split_first().ok_or_else(unsupported)?;

        let route = match (Resource::from_path(resource), rest) {
            (Some(Resource::Weather), []) => Route::Weather,
            (Some(Resource::Weather), [location_setting]) => Route::WeatherWithLocation {
                location_setting: location_setting.clone(),
                start_date: start_date(uri),
            },
            (Some(Resource::Weather), [location_setting, date]) => {
                Route::WeatherWithLocationAndDate {
                    location_setting: location_setting.clone(),
                    date: date.clone(),
                }
            }
            (Some(Resource::Location), []) => Route::Location,
            (Some(Resource::Location), [id]) => {
                Route::LocationId(parse_id(id).ok_or_else(unsupported)?)
            }
            _ => return Err(unsupported()),
        };
        Ok(route)
    }

    pub fn resource(&self) -> Resource {
        match self {
            Route::Weather
            | Route::WeatherWithLocation { .. }
            | Route::WeatherWithLocationAndDate { .. } => Resource::Weather,
            Route::Location | Route::LocationId(_) => Resource::Location,
        }
    }

    /// Bare table routes are the only ones that accept writes.
    pub fn is_collection(&self) -> bool {
        matches!(self, Route::Weather | Route::Location)
    }

    pub fn content_type(&self, authority: &str) -> ContentType {
        let kind = match self {
            Route::Weather | Route::Location => ContentKind::Collection,
            Route::WeatherWithLocation { .. }
            | Route::WeatherWithLocationAndDate { .. }
            | Route::LocationId(_) => ContentKind::Item,
        };
        ContentType {
            kind,
            authority: authority.to_string(),
            resource: self.resource(),
        }
    }
}

/// Exactly `content://{authority}`: no user info, no port.
fn has_authority(uri: &Url, authority: &str) -> bool {
    uri.scheme() == CONTENT_SCHEME
        && uri.host_str() == Some(authority)
        && uri.username().is_empty()
        && uri.password().is_none()
        && uri.port().is_none()
}

/// Decoded, non-empty path segments.
fn path_segments(uri: &Url) -> Option<Vec<String>> {
    uri.path_segments()?
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            percent_decode_str(segment)
                .decode_utf8()
                .ok()
                .map(|decoded| decoded.into_owned())
        })
        .collect()
}

fn start_date(uri: &Url) -> Option<String> {
    uri.query_pairs()
        .find(|(key, _)| key == START_DATE_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Ids are plain decimal digits; signs and anything else do not match.
fn parse_id(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
