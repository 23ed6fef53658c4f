use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::products::{ProductList, ProductPayload, ProductVariantList, VariantPayload},
    entity::{
        Categories, OrderItems, ProductVariants, Products, Reviews,
        categories::Column as CategoryCol,
        order_items::Column as OrderItemCol,
        product_variants::{ActiveModel as VariantActive, Column as VariantCol, Model as VariantModel},
        products::{self, ActiveModel, Column, Model as ProductModel},
        reviews::Column as ReviewCol,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Product, ProductVariant},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSort},
    slug::generate_slug,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, per_page, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    let mut finder = Products::find();

    if let Some(search) = query.search_term.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        // The category name participates in the match, so join it in.
        finder = finder.join(JoinType::LeftJoin, products::Relation::Categories.def());
        condition = condition.add(
            Condition::any()
                .add(Expr::col((Products, Column::Name)).ilike(pattern.clone()))
                .add(Expr::col((Products, Column::Description)).ilike(pattern.clone()))
                .add(Expr::col((Categories, CategoryCol::Name)).ilike(pattern)),
        );
    }

    if let Some(ratings_raw) = query.ratings.as_ref().filter(|s| !s.is_empty()) {
        let ratings: Vec<i32> = ratings_raw
            .split('|')
            .filter_map(|r| r.trim().parse().ok())
            .collect();
        if !ratings.is_empty() {
            let reviewed = Query::select()
                .column(ReviewCol::ProductId)
                .from(Reviews)
                .and_where(ReviewCol::Rating.is_in(ratings))
                .to_owned();
            condition = condition.add(Column::Id.in_subquery(reviewed));
        }
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }
    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }

    let mut finder = finder.filter(condition);
    finder = match query.sort.unwrap_or(ProductSort::Newest) {
        ProductSort::Newest => finder.order_by_desc(Column::CreatedAt),
        ProductSort::Oldest => finder.order_by_asc(Column::CreatedAt),
        ProductSort::LowPrice => finder.order_by_asc(Column::Price),
        ProductSort::HighPrice => finder.order_by_desc(Column::Price),
    };

    let length = finder.clone().count(&state.orm).await? as i64;

    let products = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, per_page, length);
    Ok(ApiResponse::success(
        "Products",
        ProductList { products, length },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Product",
        product_from_entity(product),
        None,
    ))
}

pub async fn get_product_by_slug(state: &AppState, slug: &str) -> AppResult<ApiResponse<Product>> {
    let product = Products::find()
        .filter(Column::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Product",
        product_from_entity(product),
        None,
    ))
}

pub async fn get_products_by_category(
    state: &AppState,
    category_slug: &str,
) -> AppResult<ApiResponse<ProductList>> {
    let category = Categories::find()
        .filter(CategoryCol::Slug.eq(category_slug))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let products: Vec<Product> = Products::find()
        .filter(Column::CategoryId.eq(category.id))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    if products.is_empty() {
        return Err(AppError::NotFound);
    }

    let length = products.len() as i64;
    Ok(ApiResponse::success(
        "Products",
        ProductList { products, length },
        None,
    ))
}

/// Products in the same category, newest first, excluding the product
/// itself.
pub async fn get_similar_products(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<ProductList>> {
    let current = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let products: Vec<Product> = Products::find()
        .filter(Column::CategoryId.eq(current.category_id))
        .filter(Column::Id.ne(current.id))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let length = products.len() as i64;
    Ok(ApiResponse::success(
        "Similar products",
        ProductList { products, length },
        None,
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: ProductPayload,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    if payload.price <= 0 {
        return Err(AppError::BadRequest("Price must be positive".into()));
    }

    Categories::find_by_id(payload.category_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let slug = generate_slug(&payload.name);
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        slug: Set(slug),
        description: Set(payload.description),
        price: Set(payload.price),
        images: Set(payload.images),
        images_info: Set(Vec::new()),
        info: Set(payload.info),
        remains: Set(payload.remains),
        category_id: Set(payload.category_id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ProductPayload,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    if payload.price <= 0 {
        return Err(AppError::BadRequest("Price must be positive".into()));
    }

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Categories::find_by_id(payload.category_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    active.slug = Set(generate_slug(&payload.name));
    active.name = Set(payload.name);
    active.description = Set(payload.description);
    active.price = Set(payload.price);
    active.info = Set(payload.info);
    active.remains = Set(payload.remains);
    active.category_id = Set(payload.category_id);
    if !payload.images.is_empty() {
        active.images = Set(payload.images);
    }
    let product = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Product updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Reviews and order items referencing the product are removed in the same
/// transaction, so no orphan rows survive the delete.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;

    Products::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    Reviews::delete_many()
        .filter(ReviewCol::ProductId.eq(id))
        .exec(&txn)
        .await?;
    OrderItems::delete_many()
        .filter(OrderItemCol::ProductId.eq(id))
        .exec(&txn)
        .await?;
    Products::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Product deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

// variants

pub async fn list_variants(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<ProductVariantList>> {
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = ProductVariants::find()
        .filter(VariantCol::ProductId.eq(product_id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(variant_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Variants",
        ProductVariantList { items },
        None,
    ))
}

pub async fn create_variant(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: VariantPayload,
) -> AppResult<ApiResponse<ProductVariant>> {
    ensure_admin(user)?;

    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let variant = VariantActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        color: Set(payload.color),
        kind: Set(payload.kind),
        images: Set(payload.images),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Variant created",
        variant_from_entity(variant),
        Some(Meta::empty()),
    ))
}

pub async fn update_variant(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    variant_id: Uuid,
    payload: VariantPayload,
) -> AppResult<ApiResponse<ProductVariant>> {
    ensure_admin(user)?;

    let existing = find_variant(state, product_id, variant_id).await?;

    let mut active: VariantActive = existing.into();
    active.color = Set(payload.color);
    active.kind = Set(payload.kind);
    if !payload.images.is_empty() {
        active.images = Set(payload.images);
    }
    let variant = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Variant updated",
        variant_from_entity(variant),
        Some(Meta::empty()),
    ))
}

pub async fn rename_variant(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    variant_id: Uuid,
    color: String,
) -> AppResult<ApiResponse<ProductVariant>> {
    ensure_admin(user)?;

    let existing = find_variant(state, product_id, variant_id).await?;

    let mut active: VariantActive = existing.into();
    active.color = Set(color);
    let variant = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Variant renamed",
        variant_from_entity(variant),
        Some(Meta::empty()),
    ))
}

pub async fn update_variant_images(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    variant_id: Uuid,
    images: Vec<String>,
) -> AppResult<ApiResponse<ProductVariant>> {
    ensure_admin(user)?;

    let existing = find_variant(state, product_id, variant_id).await?;

    let mut active: VariantActive = existing.into();
    active.images = Set(images);
    let variant = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Variant images updated",
        variant_from_entity(variant),
        Some(Meta::empty()),
    ))
}

pub async fn delete_variant(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    variant_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = ProductVariants::delete_many()
        .filter(VariantCol::Id.eq(variant_id))
        .filter(VariantCol::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Variant deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn find_variant(
    state: &AppState,
    product_id: Uuid,
    variant_id: Uuid,
) -> AppResult<VariantModel> {
    ProductVariants::find_by_id(variant_id)
        .filter(VariantCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        slug: model.slug,
        description: model.description,
        price: model.price,
        images: model.images,
        images_info: model.images_info,
        info: model.info,
        remains: model.remains,
        category_id: model.category_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn variant_from_entity(model: VariantModel) -> ProductVariant {
    ProductVariant {
        id: model.id,
        product_id: model.product_id,
        color: model.color,
        kind: model.kind,
        images: model.images,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
