use crate::error::Error;
use crate::transport::{fetch, Interface, Request};
use crate::views::{multi_view, Transform, CLASSIFICATION_CODE};
use serde_json::Value;
use tracing::info;

const PERFORMANCE_ATTRIBUTION_PATH: &str = "portfolio-analytics/performance-attribution";

multi_view! {
    /// Attribution analysis of a portfolio against a benchmark.
    pub struct Performance {
        portfolios => "portfolios": Transform::Records,
        long_short_break_down => "longShortBreakDown": Transform::Records,
        classifications => "classifications": Transform::Classifications {
            code: CLASSIFICATION_CODE,
            nested: "classificationData",
        },
        securities => "securities": Transform::Records,
        daily_cumulative => "dailyCumulative": Transform::Records,
        audit_summaries => "auditSummaries": Transform::Records,
        audit_security_details => "auditSecurityDetails": Transform::Records,
        audit_holdings_details => "auditHoldingsDetails": Transform::Records,
        audit_contributor_ric_details => "auditContributorRICDetails": Transform::Records,
        audit_transaction_details => "auditTransactionDetails": Transform::Records,
    }
}

pub async fn get_performance_attribution(
    client: &dyn Interface,
    request: Value,
) -> Result<Performance, Error> {
    let payload = fetch(client, Request::post(PERFORMANCE_ATTRIBUTION_PATH, request)).await?;

    info!("Received performance attribution");

    Ok(Performance::new(payload))
}
