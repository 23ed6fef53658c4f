use crate::{
    dto::statistics::StatisticItem,
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::ApiResponse,
    state::AppState,
};

/// Admin dashboard figures, in display order. Raw sqlx here: plain
/// aggregates do not need the ORM.
pub async fn get_main(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Vec<StatisticItem>>> {
    ensure_admin(user)?;

    let (orders,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(&state.pool)
        .await?;
    let (reviews,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews")
        .fetch_one(&state.pool)
        .await?;
    let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&state.pool)
        .await?;
    let (total_amount,): (i64,) =
        sqlx::query_as("SELECT COALESCE(SUM(total), 0)::int8 FROM orders")
            .fetch_one(&state.pool)
            .await?;

    let items = vec![
        StatisticItem {
            name: "Orders",
            value: orders,
        },
        StatisticItem {
            name: "Reviews",
            value: reviews,
        },
        StatisticItem {
            name: "Users",
            value: users,
        },
        StatisticItem {
            name: "Total amount",
            value: total_amount,
        },
    ];

    Ok(ApiResponse::success("Statistics", items, None))
}
