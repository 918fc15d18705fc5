use crate::error::Error;
use crate::transport::{fetch, Interface, Request};
use crate::views::{multi_view, Transform};
use serde_json::Value;

const RETURN_STATISTICS_PATH: &str = "portfolio-analytics/return-statistics";

multi_view! {
    /// Modern portfolio theory statistics for one or more portfolios.
    pub struct Returns {
        portfolios => "portfolios": Transform::Records,
        mpt_statistics_data => "mptStatisticsData": Transform::Records,
        audit_summaries => "auditSummaries": Transform::Records,
        audit_holdings_details => "auditHoldingsDetails": Transform::Records,
        audit_security_details => "auditSecurityDetails": Transform::Records,
        audit_contributor_ric_details => "auditContributorRICDetails": Transform::Records,
    }
}

pub async fn get_return_statistics(client: &dyn Interface, request: Value) -> Result<Returns, Error> {
    let payload = fetch(client, Request::post(RETURN_STATISTICS_PATH, request)).await?;
    Ok(Returns::new(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{success, Method, MockInterface};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_return_statistics() {
        let mut client = MockInterface::new();
        client
            .expect_submit()
            .withf(|request| {
                request.method == Method::Post
                    && request.path == "portfolio-analytics/return-statistics"
                    && request.body.is_some()
            })
            .times(1)
            .returning(|_| {
                Ok(success(json!({
                    "portfolios": [{"portfolioId": "SAMPLE_US"}],
                    "mptStatisticsData": [
                        {"portfolioId": "SAMPLE_US", "statistic": "SharpeRatio", "value": 1.12},
                        {"portfolioId": "SAMPLE_US", "statistic": "Beta", "value": 0.94}
                    ]
                })))
            });

        let returns = get_return_statistics(&client, json!({"portfolios": [{"id": "SAMPLE_US"}]}))
            .await
            .unwrap();

        let statistics = returns.mpt_statistics_data();
        assert_eq!(statistics.height(), 2);
        assert_eq!(statistics.get(1, "statistic"), Some(json!("Beta")));
        assert!(Arc::ptr_eq(&statistics, &returns.view("mptStatisticsData")));
        assert!(returns.audit_summaries().is_empty());
        assert_eq!(returns.raw_payload()["portfolios"][0]["portfolioId"], json!("SAMPLE_US"));
    }
}
