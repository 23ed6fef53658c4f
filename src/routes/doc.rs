use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
            RefreshRequest, RegisterRequest, ResetPasswordRequest, UserSummary,
        },
        categories::CategoryList,
        orders::{
            CheckoutSessionResponse, OrderItemRequest, OrderItemWithProduct, OrderList,
            OrderWithItems, PlaceOrderRequest, ProductSummary,
        },
        products::{ProductList, ProductVariantList},
        reviews::{AverageRating, LeaveReviewResponse, ReviewList},
        setups::{SetupList, SetupProductList},
        statistics::StatisticItem,
        users::{FavoriteToggle, Profile, UpdateProfileRequest, UserList},
    },
    models::{Category, Order, OrderItem, Product, ProductVariant, Review, Setup, User},
    response::{ApiResponse, Meta},
    routes::{
        auth, categories, health, orders, params, products, reviews, setups, statistics, users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::refresh_tokens,
        auth::change_password,
        auth::forgot_password,
        auth::reset_password,
        categories::list_categories,
        categories::get_category,
        categories::get_category_by_slug,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        setups::list_setups,
        setups::get_setup,
        setups::create_setup,
        setups::update_setup,
        setups::delete_setup,
        setups::attach_product,
        setups::list_setup_products,
        products::list_products,
        products::get_product,
        products::get_product_by_slug,
        products::get_products_by_category,
        products::get_similar_products,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::list_variants,
        products::create_variant,
        products::update_variant,
        products::rename_variant,
        products::update_variant_images,
        products::delete_variant,
        reviews::list_reviews,
        reviews::leave_review,
        reviews::average_by_product,
        orders::place_order,
        orders::list_all_orders,
        orders::list_my_orders,
        orders::stripe_webhook,
        users::get_profile,
        users::update_profile,
        users::toggle_favorite,
        users::list_users,
        users::delete_user,
        statistics::get_main,
    ),
    components(
        schemas(
            User,
            Category,
            Setup,
            Product,
            ProductVariant,
            Review,
            Order,
            OrderItem,
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            ChangePasswordRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            UserSummary,
            AuthResponse,
            CategoryList,
            SetupList,
            SetupProductList,
            ProductList,
            ProductVariantList,
            products::RenameVariantRequest,
            ReviewList,
            LeaveReviewResponse,
            AverageRating,
            PlaceOrderRequest,
            OrderItemRequest,
            CheckoutSessionResponse,
            ProductSummary,
            OrderItemWithProduct,
            OrderWithItems,
            OrderList,
            Profile,
            UpdateProfileRequest,
            FavoriteToggle,
            UserList,
            StatisticItem,
            params::Pagination,
            params::ProductQuery,
            health::HealthData,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderList>,
            ApiResponse<AuthResponse>,
            ApiResponse<Profile>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and password flows"),
        (name = "Categories", description = "Category catalog"),
        (name = "Setups", description = "Curated setups and their products"),
        (name = "Products", description = "Product catalog and variants"),
        (name = "Reviews", description = "Product reviews"),
        (name = "Orders", description = "Checkout and payment reconciliation"),
        (name = "Users", description = "Profiles, favorites and administration"),
        (name = "Statistics", description = "Admin dashboard figures"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
