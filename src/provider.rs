//! URI-addressed access to the location and weather tables.
//!
//! `WeatherProvider` resolves each URI to a [`Route`] and turns the route into
//! a single backend call:
//!
//! | URI                          | Read                                                      |
//! |------------------------------|-----------------------------------------------------------|
//! | `weather`                    | weather table, caller filter                              |
//! | `weather/{setting}`          | weather ⋈ location, setting (and `?date=` lower bound)    |
//! | `weather/{setting}/{date}`   | weather ⋈ location, setting and exact date                |
//! | `location`                   | location table, caller filter                             |
//! | `location/{id}`              | location row with that id                                 |

use crate::contract::{
    ContentType, ContentUris, LocationEntry, WeatherEntry, COLUMN_ID, CONTENT_AUTHORITY,
};
use crate::error::{ProviderError, Result};
use crate::notify::ChangeNotifier;
use crate::operation::{
    ColumnValues, CreateOperation, Query, QueryOperator, ReadOperation, RowSet, Selection,
    TableSource,
};
use crate::route::Route;
use crate::sqlite::Backend;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Authority every served URI must carry.
    pub authority: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            authority: CONTENT_AUTHORITY.to_string(),
        }
    }
}

/// Optional parts of a read, as supplied by the caller.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct QueryArgs {
    /// Columns to return; `None` returns every column.
    pub projection: Option<Vec<String>>,
    /// Filter applied on the bare `weather` and `location` routes.
    pub selection: Option<Selection>,
    /// Raw `ORDER BY` expression.
    pub sort_order: Option<String>,
}

impl QueryArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projection(mut self, columns: &[&str]) -> Self {
        self.projection = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn sort_order(mut self, sort_order: &str) -> Self {
        self.sort_order = Some(sort_order.to_string());
        self
    }
}

pub struct WeatherProvider<B, N> {
    backend: B,
    notifier: N,
    uris: ContentUris,
}

impl<B: Backend, N: ChangeNotifier> WeatherProvider<B, N> {
    pub fn new(config: ProviderConfig, backend: B, notifier: N) -> Result<Self> {
        let uris = ContentUris::new(&config.authority)?;
        Ok(Self {
            backend,
            notifier,
            uris,
        })
    }

    pub fn uris(&self) -> &ContentUris {
        &self.uris
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Hand the backend back so the caller can close it.
    pub fn into_backend(self) -> B {
        self.backend
    }

    fn resolve(&self, uri: &Url) -> Result<Route> {
        Route::resolve(uri, self.uris.authority())
    }

    /// Read the rows `uri` addresses and register `uri` for change notification.
    ///
    /// Unknown URIs fail with [`ProviderError::UnsupportedRequest`] before the
    /// backend is touched.
    pub fn query(&self, uri: &Url, args: QueryArgs) -> Result<RowSet> {
        log::debug!("query {uri}");
        let route = self.resolve(uri)?;
        let operation = self.read_operation(&route, args);
        let rows = self.backend.query(&operation)?;
        self.notifier.register(uri);
        Ok(rows)
    }

    /// Stop delivering change events for a `uri` read earlier.
    pub fn release(&self, uri: &Url) {
        self.notifier.unregister(uri);
    }

    fn read_operation(&self, route: &Route, args: QueryArgs) -> ReadOperation {
        let QueryArgs {
            projection,
            selection,
            sort_order,
        } = args;

        let (source, query, selection) = match route {
            Route::Weather => (
                TableSource::table(WeatherEntry::TABLE_NAME),
                Query::new(),
                selection,
            ),
            Route::Location => (
                TableSource::table(LocationEntry::TABLE_NAME),
                Query::new(),
                selection,
            ),
            Route::WeatherWithLocation {
                location_setting,
                start_date,
            } => {
                let mut query = by_location_setting(location_setting);
                if let Some(start_date) = start_date {
                    query = query.with_condition(
                        &weather_column(WeatherEntry::COLUMN_DATETEXT),
                        QueryOperator::GreaterThanOrEqual(start_date.as_str().into()),
                    );
                }
                (weather_with_location(), query, ignored(route, selection))
            }
            Route::WeatherWithLocationAndDate {
                location_setting,
                date,
            } => {
                let query = by_location_setting(location_setting).with_condition(
                    &weather_column(WeatherEntry::COLUMN_DATETEXT),
                    QueryOperator::Equal(date.as_str().into()),
                );
                (weather_with_location(), query, ignored(route, selection))
            }
            Route::LocationId(id) => (
                TableSource::table(LocationEntry::TABLE_NAME),
                Query::new().with_condition(COLUMN_ID, QueryOperator::Equal((*id).into())),
                ignored(route, selection),
            ),
        };

        ReadOperation::new(source)
            .with_fields(projection)
            .with_query(query)
            .with_selection(selection)
            .with_order_by(sort_order)
    }

    /// Content type of the rows `uri` yields.
    pub fn get_type(&self, uri: &Url) -> Result<ContentType> {
        let route = self.resolve(uri)?;
        Ok(route.content_type(self.uris.authority()))
    }

    /// Insert one row into the collection `uri` names and return the new row's URI.
    ///
    /// Only `weather` and `location` accept writes. A non-positive id from the
    /// backend fails with [`ProviderError::WriteRejected`].
    pub fn insert(&self, uri: &Url, values: ColumnValues) -> Result<Url> {
        log::debug!("insert {uri}");
        let route = self.resolve(uri)?;
        if !route.is_collection() {
            return Err(ProviderError::UnsupportedRequest(uri.to_string()));
        }
        let resource = route.resource();

        let id = self
            .backend
            .insert(&CreateOperation::new(resource.table_name(), values))?;
        if id <= 0 {
            log::warn!("backend rejected row for {uri} (id {id})");
            return Err(ProviderError::WriteRejected(uri.to_string()));
        }

        let inserted = self.uris.with_appended_id(resource, id);
        self.notifier.notify_change(uri);
        Ok(inserted)
    }

    /// Not supported: always reports zero rows changed and writes nothing.
    pub fn update(
        &self,
        _uri: &Url,
        _values: ColumnValues,
        _selection: Option<Selection>,
    ) -> Result<usize> {
        Ok(0)
    }

    /// Not supported: always reports zero rows removed and deletes nothing.
    pub fn delete(&self, _uri: &Url, _selection: Option<Selection>) -> Result<usize> {
        Ok(0)
    }
}

fn weather_with_location() -> TableSource {
    TableSource::InnerJoin {
        left: WeatherEntry::TABLE_NAME.to_string(),
        right: LocationEntry::TABLE_NAME.to_string(),
        left_column: WeatherEntry::COLUMN_LOC_KEY.to_string(),
        right_column: COLUMN_ID.to_string(),
    }
}

fn weather_column(column: &str) -> String {
    format!("{}.{column}", WeatherEntry::TABLE_NAME)
}

fn by_location_setting(location_setting: &str) -> Query {
    Query::new().with_condition(
        &format!(
            "{}.{}",
            LocationEntry::TABLE_NAME,
            LocationEntry::COLUMN_LOCATION_SETTING
        ),
        QueryOperator::Equal(location_setting.into()),
    )
}

/// Shaped routes carry their own filter; a caller filter is dropped.
fn ignored(route: &Route, selection: Option<Selection>) -> Option<Selection> {
    if selection.is_some() {
        log::warn!("ignoring caller selection on {:?}", route);
    }
    None
}
