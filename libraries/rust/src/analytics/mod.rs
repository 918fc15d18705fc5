//! Portfolio analytics. These operations compute results on the server and do
//! not modify portfolio data; each takes the request body documented by the
//! API as JSON.

pub mod holdings;
pub mod performance;
pub mod profiles;
pub mod returns;

pub use holdings::{get_holdings_statements, Holdings};
pub use performance::{get_performance_attribution, Performance};
pub use profiles::{get_profiles, Profiles};
pub use returns::{get_return_statistics, Returns};
