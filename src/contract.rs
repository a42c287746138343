//! Names shared by the provider and its callers: authority, resource paths,
//! tables, columns and content types.

use crate::error::Result;
use crate::schema::{
    ColumnConstraint, ColumnDefinition, ConflictResolution, DataType, ForeignKey,
    IndexDefinition, Schema, TableDefinition, UniqueConstraint,
};
use std::fmt;
use url::Url;

pub const CONTENT_SCHEME: &str = "content";
pub const CONTENT_AUTHORITY: &str = "ar.com.guzik.sunshine.app";

pub const PATH_WEATHER: &str = "weather";
pub const PATH_LOCATION: &str = "location";

/// Query parameter carrying the inclusive lower date bound on `weather/{setting}`.
pub const START_DATE_PARAM: &str = "date";

/// Dates are stored as text and compared lexicographically.
pub const DATE_FORMAT: &str = "yyyy-MM-dd";

/// Column shared by every table as its row id.
pub const COLUMN_ID: &str = "_id";

pub struct LocationEntry;

impl LocationEntry {
    pub const TABLE_NAME: &'static str = "location";

    pub const COLUMN_POSTAL_CODE: &'static str = "postal_code";
    /// Caller-facing lookup key, distinct from the postal code.
    pub const COLUMN_LOCATION_SETTING: &'static str = "location_setting";
    pub const COLUMN_CITY_NAME: &'static str = "city_name";
    pub const COLUMN_COORD_LAT: &'static str = "coord_lat";
    pub const COLUMN_COORD_LONG: &'static str = "coord_long";

    pub fn table() -> TableDefinition {
        TableDefinition::new(Self::TABLE_NAME)
            .column(
                ColumnDefinition::new(COLUMN_ID, DataType::Integer)
                    .constraint(ColumnConstraint::PrimaryKey)
                    .constraint(ColumnConstraint::AutoIncrement),
            )
            .column(ColumnDefinition::new(Self::COLUMN_POSTAL_CODE, DataType::Text))
            .column(
                ColumnDefinition::new(Self::COLUMN_LOCATION_SETTING, DataType::Text)
                    .constraint(ColumnConstraint::NotNull),
            )
            .column(
                ColumnDefinition::new(Self::COLUMN_CITY_NAME, DataType::Text)
                    .constraint(ColumnConstraint::NotNull),
            )
            .column(
                ColumnDefinition::new(Self::COLUMN_COORD_LAT, DataType::Real)
                    .constraint(ColumnConstraint::NotNull),
            )
            .column(
                ColumnDefinition::new(Self::COLUMN_COORD_LONG, DataType::Real)
                    .constraint(ColumnConstraint::NotNull),
            )
            .unique(
                UniqueConstraint::new(&[Self::COLUMN_LOCATION_SETTING])
                    .on_conflict(ConflictResolution::Ignore),
            )
    }
}

pub struct WeatherEntry;

impl WeatherEntry {
    pub const TABLE_NAME: &'static str = "weather";

    /// Foreign key into the location table.
    pub const COLUMN_LOC_KEY: &'static str = "location_key";
    /// Stored as text, see [`DATE_FORMAT`].
    pub const COLUMN_DATETEXT: &'static str = "datetext";
    pub const COLUMN_SHORT_DESC: &'static str = "short_desc";
    pub const COLUMN_WEATHER_ID: &'static str = "weather_id";
    pub const COLUMN_MIN_TEMP: &'static str = "min";
    pub const COLUMN_MAX_TEMP: &'static str = "max";
    pub const COLUMN_HUMIDITY: &'static str = "humidity";
    pub const COLUMN_PRESSURE: &'static str = "pressure";
    pub const COLUMN_WIND_SPEED: &'static str = "wind";
    pub const COLUMN_DEGREES: &'static str = "degrees";

    pub fn table() -> TableDefinition {
        let measurements = [
            (Self::COLUMN_SHORT_DESC, DataType::Text),
            (Self::COLUMN_WEATHER_ID, DataType::Integer),
            (Self::COLUMN_MIN_TEMP, DataType::Real),
            (Self::COLUMN_MAX_TEMP, DataType::Real),
            (Self::COLUMN_HUMIDITY, DataType::Real),
            (Self::COLUMN_PRESSURE, DataType::Real),
            (Self::COLUMN_WIND_SPEED, DataType::Real),
            (Self::COLUMN_DEGREES, DataType::Real),
        ];
        let table = TableDefinition::new(Self::TABLE_NAME)
            .column(
                ColumnDefinition::new(COLUMN_ID, DataType::Integer)
                    .constraint(ColumnConstraint::PrimaryKey)
                    .constraint(ColumnConstraint::AutoIncrement),
            )
            .column(
                ColumnDefinition::new(Self::COLUMN_LOC_KEY, DataType::Integer)
                    .constraint(ColumnConstraint::NotNull),
            )
            .column(
                ColumnDefinition::new(Self::COLUMN_DATETEXT, DataType::Text)
                    .constraint(ColumnConstraint::NotNull),
            );
        measurements
            .into_iter()
            .fold(table, |table, (name, data_type)| {
                table.column(ColumnDefinition::new(name, data_type))
            })
            .foreign_key(ForeignKey::new(
                Self::COLUMN_LOC_KEY,
                LocationEntry::TABLE_NAME,
                COLUMN_ID,
            ))
            // one reading per location and day; a newer one replaces it
            .unique(
                UniqueConstraint::new(&[Self::COLUMN_DATETEXT, Self::COLUMN_LOC_KEY])
                    .on_conflict(ConflictResolution::Replace),
            )
            .index(IndexDefinition::new(
                "idx_weather_location_key",
                &[Self::COLUMN_LOC_KEY],
            ))
    }
}

/// The location and weather tables, in creation order.
pub fn weather_schema() -> Schema {
    Schema::new()
        .add_table(LocationEntry::table())
        .add_table(WeatherEntry::table())
}

/// The two resources addressable under the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Weather,
    Location,
}

impl Resource {
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            PATH_WEATHER => Some(Resource::Weather),
            PATH_LOCATION => Some(Resource::Location),
            _ => None,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Resource::Weather => PATH_WEATHER,
            Resource::Location => PATH_LOCATION,
        }
    }

    pub fn table_name(self) -> &'static str {
        match self {
            Resource::Weather => WeatherEntry::TABLE_NAME,
            Resource::Location => LocationEntry::TABLE_NAME,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Collection,
    Item,
}

/// MIME-style type telling a caller whether a URI yields many rows or one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    pub kind: ContentKind,
    pub authority: String,
    pub resource: Resource,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            ContentKind::Collection => "vnd.android.cursor.dir",
            ContentKind::Item => "vnd.android.cursor.item",
        };
        write!(f, "{prefix}/{}/{}", self.authority, self.resource.path())
    }
}

/// Builds the URIs callers use to address resources under one authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUris {
    base: Url,
}

impl ContentUris {
    pub fn new(authority: &str) -> Result<Self> {
        let base = Url::parse(&format!("{CONTENT_SCHEME}://{authority}"))?;
        Ok(Self { base })
    }

    pub fn authority(&self) -> &str {
        self.base.host_str().unwrap_or_default()
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `content://authority` always has an authority, so it can be a base
        if let Ok(mut path) = url.path_segments_mut() {
            path.clear().extend(segments);
        }
        url
    }

    pub fn collection(&self, resource: Resource) -> Url {
        self.with_segments(&[resource.path()])
    }

    pub fn weather(&self) -> Url {
        self.collection(Resource::Weather)
    }

    pub fn location(&self) -> Url {
        self.collection(Resource::Location)
    }

    /// Collection URI with the row id appended.
    pub fn with_appended_id(&self, resource: Resource, id: i64) -> Url {
        self.with_segments(&[resource.path(), &id.to_string()])
    }

    pub fn location_with_id(&self, id: i64) -> Url {
        self.with_appended_id(Resource::Location, id)
    }

    pub fn weather_with_id(&self, id: i64) -> Url {
        self.with_appended_id(Resource::Weather, id)
    }

    pub fn weather_for_location(&self, location_setting: &str) -> Url {
        self.with_segments(&[PATH_WEATHER, location_setting])
    }

    pub fn weather_for_location_with_start_date(
        &self,
        location_setting: &str,
        start_date: &str,
    ) -> Url {
        let mut url = self.weather_for_location(location_setting);
        url.query_pairs_mut().append_pair(START_DATE_PARAM, start_date);
        url
    }

    pub fn weather_for_location_and_date(&self, location_setting: &str, date: &str) -> Url {
        self.with_segments(&[PATH_WEATHER, location_setting, date])
    }
}
