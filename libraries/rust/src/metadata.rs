//! Reference data: currencies, identifiers, attributes, data columns and
//! classification sectors.

use crate::error::Error;
use crate::params::{OneOrMany, Parameters};
use crate::table::Table;
use crate::transport::{fetch, Interface, Request};
use crate::views::{flatten_classifications, CLASSIFICATION_CODE};
use tracing::info;

const CURRENCIES_PATH: &str = "metadata/currencies";

const IDENTIFIERS_PATH: &str = "metadata/identifiers";

const ATTRIBUTES_PATH: &str = "metadata/attributes";

const DATA_COLUMNS_PATH: &str = "metadata/data-columns";

const CLASSIFICATION_SECTORS_PATH: &str = "metadata/classification-sectors";

pub const DEFAULT_CLASSIFICATION_CODE: &str = "MAJOR_ASSET_CLASS";

/// Optional filters for [`get_attributes`]. Empty strings and lists are
/// treated as absent.
#[derive(Debug, Clone, Default)]
pub struct AttributesQuery {
    pub include_portfolio_attributes: Option<bool>,
    /// e.g. "All"
    pub data_owner_type: Option<String>,
    /// e.g. ["Price", "CashRate", "Classification"]
    pub attribute_types: Option<OneOrMany>,
    /// e.g. ["Sector", "Identifier", "Money", "Number", "Date"]
    pub attribute_data_types: Option<OneOrMany>,
}

impl AttributesQuery {
    fn parameters(&self) -> Parameters {
        Parameters::new()
            .flag("portfolioAttributes", self.include_portfolio_attributes)
            .text(
                "dataOwnerType",
                self.data_owner_type.as_deref().filter(|value| !value.is_empty()),
            )
            .list(
                "attributeTypes",
                self.attribute_types.as_ref().filter(|values| !values.is_empty()),
            )
            .list(
                "attributeDataTypes",
                self.attribute_data_types
                    .as_ref()
                    .filter(|values| !values.is_empty()),
            )
    }
}

pub async fn get_currencies(client: &dyn Interface) -> Result<Table, Error> {
    let payload = fetch(client, Request::get(CURRENCIES_PATH)).await?;
    Table::from_records_at(&payload, "currencies")
}

/// Identifier types available for tickers.
pub async fn get_identifiers(client: &dyn Interface) -> Result<Table, Error> {
    let payload = fetch(client, Request::get(IDENTIFIERS_PATH)).await?;
    Table::from_records_at(&payload, "identifiers")
}

pub async fn get_attributes(client: &dyn Interface, query: &AttributesQuery) -> Result<Table, Error> {
    let request = Request::get(ATTRIBUTES_PATH).query_parameters(query.parameters().into_vec());

    let payload = fetch(client, request).await?;
    let attributes = Table::from_records_at(&payload, "attributes")?;

    info!("Received {} attributes", attributes.height());

    Ok(attributes)
}

/// Data columns usable as inputs to analytics requests.
pub async fn get_data_columns(client: &dyn Interface) -> Result<Table, Error> {
    let payload = fetch(client, Request::get(DATA_COLUMNS_PATH)).await?;
    Table::from_records_at(&payload, "dataColumns")
}

/// Sectors of each requested classification, indexed by classification code.
/// `None` requests [`DEFAULT_CLASSIFICATION_CODE`].
pub async fn get_classification_sectors(
    client: &dyn Interface,
    classification_codes: Option<OneOrMany>,
) -> Result<Table, Error> {
    let classification_codes = classification_codes
        .unwrap_or_else(|| OneOrMany::from(DEFAULT_CLASSIFICATION_CODE));

    let parameters = Parameters::new().list(
        "classificationCodes",
        Some(&classification_codes).filter(|codes| !codes.is_empty()),
    );

    let request = Request::get(CLASSIFICATION_SECTORS_PATH).query_parameters(parameters.into_vec());

    let payload = fetch(client, request).await?;
    let sectors = payload
        .get("classificationSectors")
        .ok_or_else(|| Error::Other("Payload has no classificationSectors key".to_string()))?;

    flatten_classifications(sectors, CLASSIFICATION_CODE, "sectors")
}
