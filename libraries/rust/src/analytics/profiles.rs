use crate::error::Error;
use crate::transport::{fetch, Interface, Request};
use crate::views::{multi_view, Transform, CLASSIFICATION_CODE};
use serde_json::Value;
use tracing::info;

const PROFILES_PATH: &str = "portfolio-analytics/profiles";

multi_view! {
    /// Profile analysis of one or more portfolios. `classifications` is
    /// indexed by classification code.
    pub struct Profiles {
        portfolios => "portfolios": Transform::Records,
        profile_attributes => "profileAttributes": Transform::Records,
        long_short_break_down => "longShortBreakDown": Transform::Records,
        classifications => "classifications": Transform::Classifications {
            code: CLASSIFICATION_CODE,
            nested: "classificationData",
        },
        securities => "securities": Transform::Records,
        portfolio_centric_composition_summaries => "portfolioCentricCompositionSummaries": Transform::Records,
        portfolio_relative_composition_summaries => "portfolioRelativeCompositionSummaries": Transform::Records,
        breakpoints => "breakpoints": Transform::Records,
        audit_summaries => "auditSummaries": Transform::Records,
        audit_security_details => "auditSecurityDetails": Transform::Records,
        audit_holdings_details => "auditHoldingsDetails": Transform::Records,
        audit_contributor_ric_details => "auditContributorRICDetails": Transform::Records,
    }
}

pub async fn get_profiles(client: &dyn Interface, request: Value) -> Result<Profiles, Error> {
    let payload = fetch(client, Request::post(PROFILES_PATH, request)).await?;

    info!("Received profile analysis");

    Ok(Profiles::new(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{success, MockInterface};
    use serde_json::json;

    #[tokio::test]
    async fn test_get_profiles() {
        let mut client = MockInterface::new();
        client
            .expect_submit()
            .withf(|request| request.path == "portfolio-analytics/profiles")
            .times(1)
            .returning(|_| {
                Ok(success(json!({
                    "portfolios": [{"portfolioId": "SAMPLE_US"}],
                    "classifications": [
                        {
                            "classificationCode": "GICS_SECTOR",
                            "classificationData": [
                                {"sector": "Information Technology", "weight": {"portfolio": 0.31, "benchmark": 0.28}},
                                {"sector": "Health Care", "weight": {"portfolio": 0.12, "benchmark": 0.13}}
                            ]
                        },
                        {
                            "classificationCode": "COUNTRY",
                            "classificationData": [
                                {"sector": "United States", "weight": {"portfolio": 1.0, "benchmark": 1.0}}
                            ]
                        }
                    ]
                })))
            });

        let profiles = get_profiles(&client, json!({"portfolios": [{"id": "SAMPLE_US"}]}))
            .await
            .unwrap();

        let classifications = profiles.classifications();
        assert_eq!(
            classifications.columns(),
            &["sector", "weight.portfolio", "weight.benchmark"]
        );
        assert_eq!(
            classifications.index().unwrap().values,
            vec![json!("GICS_SECTOR"), json!("GICS_SECTOR"), json!("COUNTRY")]
        );
        assert_eq!(classifications.select(&json!("COUNTRY")).unwrap().height(), 1);
        assert_eq!(profiles.portfolios().height(), 1);
        assert!(profiles.breakpoints().is_empty());
    }
}
