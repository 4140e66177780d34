//! Query parameters for report exports.

use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ReportQuery {
    /// Days to cover, clamped to the configured export maximum. Non-numeric values use the
    /// default.
    pub days: Option<String>,
}
