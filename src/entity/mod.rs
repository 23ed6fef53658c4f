pub mod categories;
pub mod favorites;
pub mod order_items;
pub mod orders;
pub mod product_variants;
pub mod products;
pub mod reviews;
pub mod setup_products;
pub mod setups;
pub mod users;
pub mod webhook_events;

pub use categories::Entity as Categories;
pub use favorites::Entity as Favorites;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_variants::Entity as ProductVariants;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use setup_products::Entity as SetupProducts;
pub use setups::Entity as Setups;
pub use users::Entity as Users;
pub use webhook_events::Entity as WebhookEvents;
