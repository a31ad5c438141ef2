pub mod addresses;
pub mod audit_logs;
pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod colour_inventory;
pub mod colours;
pub mod countries;
pub mod coupons;
pub mod customers;
pub mod order_items;
pub mod orders;
pub mod otps;
pub mod product_images;
pub mod product_reviews;
pub mod products;
pub mod review_images;
pub mod sellers;
pub mod size_inventory;
pub mod sizes;
pub mod users;

pub use addresses::Entity as Addresses;
pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use categories::Entity as Categories;
pub use colour_inventory::Entity as ColourInventory;
pub use colours::Entity as Colours;
pub use countries::Entity as Countries;
pub use coupons::Entity as Coupons;
pub use customers::Entity as Customers;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use otps::Entity as Otps;
pub use product_images::Entity as ProductImages;
pub use product_reviews::Entity as ProductReviews;
pub use products::Entity as Products;
pub use review_images::Entity as ReviewImages;
pub use sellers::Entity as Sellers;
pub use size_inventory::Entity as SizeInventory;
pub use sizes::Entity as Sizes;
pub use users::Entity as Users;
