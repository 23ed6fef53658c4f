use serde::Serialize;
use utoipa::ToSchema;

/// One admin dashboard figure. Kept as an ordered list of name/value pairs
/// so the client renders them as received.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatisticItem {
    pub name: &'static str,
    pub value: i64,
}
