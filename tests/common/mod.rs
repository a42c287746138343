#![allow(dead_code)]

use std::sync::Mutex;

use url::Url;
use weather_provider::operation::{CreateOperation, ReadOperation};
use weather_provider::{
    Backend, ColumnValues, LocationEntry, ObserverRegistry, ProviderConfig, RowSet,
    SqliteBackend, WeatherEntry, WeatherProvider,
};

pub type SqliteProvider = WeatherProvider<SqliteBackend, ObserverRegistry>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// Provider over a fresh in-memory database
pub fn sqlite_provider() -> anyhow::Result<SqliteProvider> {
    init_logger();
    let backend = SqliteBackend::open_in_memory()?;
    Ok(WeatherProvider::new(
        ProviderConfig::default(),
        backend,
        ObserverRegistry::new(),
    )?)
}

/// Backend double that records every call and never touches a database.
#[derive(Default)]
pub struct RecordingBackend {
    pub reads: Mutex<Vec<ReadOperation>>,
    pub writes: Mutex<Vec<CreateOperation>>,
    pub next_id: i64,
}

impl RecordingBackend {
    pub fn returning_id(next_id: i64) -> Self {
        Self {
            next_id,
            ..Self::default()
        }
    }

    pub fn reads(&self) -> Vec<ReadOperation> {
        self.reads.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<CreateOperation> {
        self.writes.lock().unwrap().clone()
    }
}

impl Backend for RecordingBackend {
    fn query(&self, operation: &ReadOperation) -> weather_provider::Result<RowSet> {
        self.reads.lock().unwrap().push(operation.clone());
        Ok(RowSet::default())
    }

    fn insert(&self, operation: &CreateOperation) -> weather_provider::Result<i64> {
        self.writes.lock().unwrap().push(operation.clone());
        Ok(self.next_id)
    }
}

pub fn recording_provider(next_id: i64) -> WeatherProvider<RecordingBackend, ObserverRegistry> {
    init_logger();
    WeatherProvider::new(
        ProviderConfig::default(),
        RecordingBackend::returning_id(next_id),
        ObserverRegistry::new(),
    )
    .unwrap()
}

pub fn location_values(setting: &str, city: &str, lat: f64, long: f64) -> ColumnValues {
    ColumnValues::new()
        .with_value(LocationEntry::COLUMN_LOCATION_SETTING, setting)
        .with_value(LocationEntry::COLUMN_POSTAL_CODE, setting)
        .with_value(LocationEntry::COLUMN_CITY_NAME, city)
        .with_value(LocationEntry::COLUMN_COORD_LAT, lat)
        .with_value(LocationEntry::COLUMN_COORD_LONG, long)
}

pub fn weather_values(location_id: i64, date: &str, description: &str) -> ColumnValues {
    ColumnValues::new()
        .with_value(WeatherEntry::COLUMN_LOC_KEY, location_id)
        .with_value(WeatherEntry::COLUMN_DATETEXT, date)
        .with_value(WeatherEntry::COLUMN_SHORT_DESC, description)
        .with_value(WeatherEntry::COLUMN_WEATHER_ID, 321)
        .with_value(WeatherEntry::COLUMN_MIN_TEMP, 65.0)
        .with_value(WeatherEntry::COLUMN_MAX_TEMP, 75.0)
        .with_value(WeatherEntry::COLUMN_HUMIDITY, 1.2)
        .with_value(WeatherEntry::COLUMN_PRESSURE, 1.3)
        .with_value(WeatherEntry::COLUMN_WIND_SPEED, 5.5)
        .with_value(WeatherEntry::COLUMN_DEGREES, 1.1)
}

/// Row id carried by a URI minted on insert.
pub fn id_of(uri: &Url) -> i64 {
    uri.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|id| id.parse().ok())
        .expect("uri ends in a row id")
}

pub struct Seeded {
    pub mountain_view: i64,
    pub london: i64,
}

pub const MOUNTAIN_VIEW: &str = "94043";
pub const LONDON: &str = "london,uk";

/// Two locations; three days for Mountain View and one for London.
pub fn seed<B: Backend>(provider: &WeatherProvider<B, ObserverRegistry>) -> anyhow::Result<Seeded> {
    let location = provider.uris().location();
    let weather = provider.uris().weather();

    let mountain_view = id_of(&provider.insert(
        &location,
        location_values(MOUNTAIN_VIEW, "Mountain View", 37.4056, -122.0775),
    )?);
    let london = id_of(&provider.insert(
        &location,
        location_values(LONDON, "London", 51.5072, -0.1276),
    )?);

    for (date, description) in [
        ("2014-07-04", "Clear"),
        ("2014-07-05", "Clouds"),
        ("2014-07-06", "Rain"),
    ] {
        provider.insert(&weather, weather_values(mountain_view, date, description))?;
    }
    provider.insert(&weather, weather_values(london, "2014-07-05", "Fog"))?;

    Ok(Seeded {
        mountain_view,
        london,
    })
}
