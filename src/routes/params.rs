use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    Newest,
    Oldest,
    LowPrice,
    HighPrice,
}

/// Catalog filter set. `ratings` is a `|`-separated list of star values;
/// unparseable entries are ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub search_term: Option<String>,
    pub ratings: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub category_id: Option<Uuid>,
    pub sort: Option<ProductSort>,
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn pagination_defaults_and_clamps() {
        let (page, per_page, offset) = Pagination {
            page: None,
            per_page: None,
        }
        .normalize();
        assert_eq!((page, per_page, offset), (1, 20, 0));

        let (page, per_page, offset) = Pagination {
            page: Some(3),
            per_page: Some(500),
        }
        .normalize();
        assert_eq!((page, per_page, offset), (3, 100, 200));

        let (page, _, offset) = Pagination {
            page: Some(-2),
            per_page: Some(10),
        }
        .normalize();
        assert_eq!((page, offset), (1, 0));
    }
}
