use crate::error::Error;
use crate::transport::{fetch, Interface, Request};
use crate::views::{multi_view, Transform};
use serde_json::Value;
use tracing::info;

const HOLDINGS_STATEMENTS_PATH: &str = "portfolio-analytics/{portfolioId}/holdings-statements";

multi_view! {
    /// Holdings statements of one portfolio.
    pub struct Holdings {
        holdings_summaries => "holdingsSummaries": Transform::Records,
        holdings_details => "holdingsDetails": Transform::Records,
        bulk_statuses => "bulkStatuses": Transform::Records,
        audit_security_details => "auditSecurityDetails": Transform::Records,
        audit_summaries => "auditSummaries": Transform::Records,
        audit_contributor_ric_details => "auditContributorRICDetails": Transform::Records,
    }
}

/// Holdings statements by date for `portfolio_id`.
pub async fn get_holdings_statements(
    client: &dyn Interface,
    portfolio_id: &str,
    request: Value,
) -> Result<Holdings, Error> {
    let request = Request::post(HOLDINGS_STATEMENTS_PATH, request)
        .path_parameter("portfolioId", portfolio_id);

    let payload = fetch(client, request).await?;

    info!("Received holdings statements for {}", portfolio_id);

    Ok(Holdings::new(payload))
}
