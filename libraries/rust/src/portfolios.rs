//! Portfolio headers, holdings statement headers and portfolio search.

use crate::error::Error;
use crate::params::{OneOrMany, Parameters};
use crate::table::Table;
use crate::transport::{fetch, Interface, Request};
use crate::views::{multi_view, Composite, Transform};
use chrono::NaiveDate;
use tracing::info;

const PORTFOLIOS_PATH: &str = "portfolios";

const SEARCH_PATH: &str = "portfolios/search";

const DATE_FORMAT: &str = "%Y-%m-%d";

multi_view! {
    /// Portfolios returned by [`get_portfolios`].
    ///
    /// `headers` is indexed by `portfolioId`; `statements` carries one row per
    /// holdings statement header with a `portfolioHeader.portfolioId` column.
    pub struct Portfolios {
        headers => "headers": Transform::Composite(Composite::PortfolioHeaders),
        statements => "statements": Transform::Composite(Composite::PortfolioStatements),
        bulk_statuses => "bulkStatuses": Transform::Records,
    }
}

/// Options for [`search`]. Every field is sent when present.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// e.g. "FundedPortfolio", "WatchList"
    pub portfolio_types: Option<OneOrMany>,
    pub query: Option<String>,
    pub query_field: Option<String>,
    pub query_condition: Option<String>,
    /// "CurrentUser", "OtherUsers"
    pub user_sources: Option<OneOrMany>,
    pub sort: Option<String>,
    pub maximum_count: Option<u32>,
    pub include_default_benchmark_header: Option<bool>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        SearchQuery {
            portfolio_types: None,
            query: None,
            query_field: None,
            query_condition: None,
            user_sources: None,
            sort: None,
            maximum_count: None,
            include_default_benchmark_header: Some(true),
        }
    }
}

impl SearchQuery {
    fn parameters(&self) -> Parameters {
        Parameters::new()
            .list("portfolioTypes", self.portfolio_types.as_ref())
            .text("query", self.query.as_deref())
            .text("queryField", self.query_field.as_deref())
            .text("queryCondition", self.query_condition.as_deref())
            .list("userSources", self.user_sources.as_ref())
            .text("sort", self.sort.as_deref())
            .number("maximumCount", self.maximum_count)
            .flag(
                "includeDefaultBenchmarkHeader",
                self.include_default_benchmark_header,
            )
    }
}

/// Options for [`get_portfolios`]. The flags default to `true`.
#[derive(Debug, Clone)]
pub struct PortfoliosQuery {
    pub ids: OneOrMany,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub include_portfolio_level_attributes: Option<bool>,
    pub include_default_benchmark_header: Option<bool>,
    pub include_carve_out_base_portfolio_header: Option<bool>,
    pub traverse_composite_positions: Option<bool>,
}

impl PortfoliosQuery {
    pub fn new<T: Into<OneOrMany>>(ids: T) -> Self {
        PortfoliosQuery {
            ids: ids.into(),
            start_date: None,
            end_date: None,
            include_portfolio_level_attributes: Some(true),
            include_default_benchmark_header: Some(true),
            include_carve_out_base_portfolio_header: Some(true),
            traverse_composite_positions: Some(true),
        }
    }

    pub fn date_range(mut self, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self.end_date = Some(end_date);
        self
    }

    fn parameters(&self) -> Parameters {
        let start_date = self.start_date.map(|date| date.format(DATE_FORMAT).to_string());
        let end_date = self.end_date.map(|date| date.format(DATE_FORMAT).to_string());

        Parameters::new()
            .list("ids", Some(&self.ids))
            .text("startDate", start_date.as_deref())
            .text("endDate", end_date.as_deref())
            .flag(
                "includePortfolioLevelAttributes",
                self.include_portfolio_level_attributes,
            )
            .flag(
                "includeDefaultBenchmarkHeader",
                self.include_default_benchmark_header,
            )
            .flag(
                "includeCarveOutBasePortfolioHeader",
                self.include_carve_out_base_portfolio_header,
            )
            .flag(
                "traverseCompositePositions",
                self.traverse_composite_positions,
            )
    }
}

/// Portfolio headers matching the search options.
pub async fn search(client: &dyn Interface, query: &SearchQuery) -> Result<Table, Error> {
    let request = Request::get(SEARCH_PATH).query_parameters(query.parameters().into_vec());

    let payload = fetch(client, request).await?;
    let headers = Table::from_records_at(&payload, "portfolioHeaders")?;

    info!("Search matched {} portfolios", headers.height());

    Ok(headers)
}

/// Portfolios by id over an optional date range.
pub async fn get_portfolios(
    client: &dyn Interface,
    query: &PortfoliosQuery,
) -> Result<Portfolios, Error> {
    if query.ids.is_empty() {
        return Err(Error::Other("At least one portfolio id is required".to_string()));
    }

    let request = Request::get(PORTFOLIOS_PATH).query_parameters(query.parameters().into_vec());

    let payload = fetch(client, request).await?;

    Ok(Portfolios::new(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{failure, success, Method, MockInterface};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn portfolios_payload() -> Value {
        json!({
            "portfolios": [
                {
                    "portfolioHeader": {"portfolioId": "SAMPLE_US", "name": "US Growth", "currency": "USD"},
                    "holdingsStatementHeaders": [
                        {"holdingsDate": "2024-01-31", "status": "Completed"},
                        {"holdingsDate": "2024-02-29", "status": "Completed"}
                    ]
                },
                {
                    "portfolioHeader": {"portfolioId": "SAMPLE_EU", "name": "EU Value", "currency": "EUR"},
                    "holdingsStatementHeaders": []
                }
            ],
            "bulkStatuses": [{"id": "SAMPLE_US", "status": "Success"}]
        })
    }

    #[test]
    fn test_search_query_defaults() {
        let parameters = SearchQuery::default().parameters();

        assert_eq!(
            parameters.into_vec(),
            vec![(
                "includeDefaultBenchmarkHeader".to_string(),
                "true".to_string()
            )]
        );
    }

    #[test]
    fn test_portfolios_query_parameters() {
        let query = PortfoliosQuery::new(["SAMPLE_US", "SAMPLE_EU"]).date_range(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        );

        let parameters = query.parameters();

        assert_eq!(parameters.get("ids"), Some("SAMPLE_US,SAMPLE_EU"));
        assert_eq!(parameters.get("startDate"), Some("2024-01-01"));
        assert_eq!(parameters.get("endDate"), Some("2024-03-31"));
        assert_eq!(parameters.get("traverseCompositePositions"), Some("true"));
    }

    #[test]
    fn test_portfolios_query_single_id() {
        let single = PortfoliosQuery::new("SAMPLE_US").parameters();
        let list = PortfoliosQuery::new(vec!["SAMPLE_US".to_string()]).parameters();

        assert_eq!(single, list);
    }

    #[tokio::test]
    async fn test_search() {
        let mut client = MockInterface::new();
        client
            .expect_submit()
            .withf(|request| {
                request.method == Method::Get
                    && request.path == "portfolios/search"
                    && request.query_parameters
                        == vec![
                            ("portfolioTypes".to_string(), "FundedPortfolio".to_string()),
                            ("query".to_string(), "SAMPLE".to_string()),
                            ("maximumCount".to_string(), "10".to_string()),
                            (
                                "includeDefaultBenchmarkHeader".to_string(),
                                "false".to_string(),
                            ),
                        ]
            })
            .times(1)
            .returning(|_| {
                Ok(success(json!({
                    "portfolioHeaders": [
                        {"portfolioId": "SAMPLE_US", "portfolioType": "FundedPortfolio"}
                    ]
                })))
            });

        let query = SearchQuery {
            portfolio_types: Some(OneOrMany::from("FundedPortfolio")),
            query: Some("SAMPLE".to_string()),
            maximum_count: Some(10),
            include_default_benchmark_header: Some(false),
            ..Default::default()
        };

        let headers = search(&client, &query).await.unwrap();

        assert_eq!(headers.height(), 1);
        assert_eq!(headers.get(0, "portfolioId"), Some(json!("SAMPLE_US")));
    }

    #[tokio::test]
    async fn test_get_portfolios() {
        let mut client = MockInterface::new();
        client
            .expect_submit()
            .withf(|request| request.path == "portfolios" && request.body.is_none())
            .times(1)
            .returning(|_| Ok(success(portfolios_payload())));

        let portfolios = get_portfolios(&client, &PortfoliosQuery::new("SAMPLE_US,SAMPLE_EU"))
            .await
            .unwrap();

        let headers = portfolios.headers();
        assert_eq!(headers.columns(), &["name", "currency"]);
        assert_eq!(
            headers.index().unwrap().values,
            vec![json!("SAMPLE_US"), json!("SAMPLE_EU")]
        );

        let statements = portfolios.statements();
        assert_eq!(statements.height(), 2);
        assert_eq!(
            statements.column("portfolioHeader.portfolioId").unwrap(),
            vec![json!("SAMPLE_US"), json!("SAMPLE_US")]
        );

        assert_eq!(portfolios.bulk_statuses().height(), 1);
        assert!(Arc::ptr_eq(&portfolios.headers(), &headers));
        assert!(portfolios.view("portfolios").is_empty());
    }

    #[tokio::test]
    async fn test_get_portfolios_without_bulk_statuses() {
        let mut client = MockInterface::new();
        client
            .expect_submit()
            .times(1)
            .returning(|_| Ok(success(json!({"portfolios": []}))));

        let portfolios = get_portfolios(&client, &PortfoliosQuery::new("SAMPLE_US"))
            .await
            .unwrap();

        assert!(portfolios.bulk_statuses().is_empty());
        assert!(portfolios.headers().is_empty());
        assert!(portfolios.statements().is_empty());
    }

    #[tokio::test]
    async fn test_get_portfolios_requires_ids() {
        let client = MockInterface::new();

        let result = get_portfolios(&client, &PortfoliosQuery::new(Vec::<String>::new())).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_portfolios_failure() {
        let mut client = MockInterface::new();
        client
            .expect_submit()
            .times(1)
            .returning(|_| Ok(failure(404, "Not Found", "")));

        let error = get_portfolios(&client, &PortfoliosQuery::new("MISSING"))
            .await
            .unwrap_err();

        assert!(error.to_string().contains("404"));
        assert!(error.to_string().contains("Not Found"));
    }
}
