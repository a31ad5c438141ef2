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
        addresses::{AddressList, CreateAddressRequest},
        auth::{
            LoginRequest, LoginResponse, ProfileResponse, RegisterRequest, RequestOtpRequest,
            VerifyOtpRequest,
        },
        cart::{AddToCartRequest, CartItemView, CartView, UpdateCartItemRequest},
        catalog::{
            CategoryList, ColourList, CountryList, CreateCategoryRequest, CreateColourRequest,
            CreateCountryRequest, CreateSizeRequest, SizeList,
        },
        coupons::{CouponList, CreateCouponRequest},
        orders::{CheckoutRequest, OrderList, OrderWithItems, PayOrderRequest},
        products::{
            ColourStock, ColourVariantRequest, CreateProductRequest, ProductDetail, ProductList,
            SizeStock, SizeVariantRequest, UpdateProductRequest,
        },
        reviews::{CreateReviewRequest, ReviewList},
    },
    models::{
        Address, CartItem, Category, Colour, Country, Coupon, Customer, Order, OrderItem,
        Product, ProductReview, Seller, Size, User,
    },
    response::{ApiResponse, Meta},
    routes::{addresses, admin, auth, cart, catalog, coupons, health, orders, params, products},
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
        auth::request_otp,
        auth::verify_otp,
        auth::me,
        auth::delete_customer,
        auth::delete_seller,
        catalog::list_categories,
        catalog::create_category,
        catalog::list_sizes,
        catalog::create_size,
        catalog::list_colours,
        catalog::create_colour,
        catalog::list_countries,
        catalog::create_country,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::list_reviews,
        products::create_review,
        coupons::list_coupons,
        coupons::create_coupon,
        coupons::get_coupon,
        coupons::delete_coupon,
        cart::cart_view,
        cart::add_to_cart,
        cart::update_item,
        cart::remove_from_cart,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        orders::pay_order,
        addresses::list_addresses,
        addresses::create_address,
        addresses::delete_address,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_shipping_status,
        admin::list_all_products,
        admin::list_low_stock,
        admin::clear_inventory
    ),
    components(
        schemas(
            User,
            Customer,
            Seller,
            Category,
            Size,
            Colour,
            Country,
            Product,
            ProductReview,
            Coupon,
            CartItem,
            Order,
            OrderItem,
            Address,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            RequestOtpRequest,
            VerifyOtpRequest,
            ProfileResponse,
            CreateCategoryRequest,
            CategoryList,
            CreateSizeRequest,
            SizeList,
            CreateColourRequest,
            ColourList,
            CreateCountryRequest,
            CountryList,
            CreateProductRequest,
            UpdateProductRequest,
            SizeVariantRequest,
            ColourVariantRequest,
            ProductList,
            SizeStock,
            ColourStock,
            ProductDetail,
            CreateReviewRequest,
            ReviewList,
            CreateCouponRequest,
            CouponList,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartItemView,
            CartView,
            CheckoutRequest,
            PayOrderRequest,
            OrderWithItems,
            OrderList,
            CreateAddressRequest,
            AddressList,
            admin::UpdateShippingStatusRequest,
            admin::LowStockQuery,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<ProductDetail>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<CartView>,
            ApiResponse<CouponList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Account registration, login and verification"),
        (name = "Catalog", description = "Categories, sizes, colours and countries"),
        (name = "Products", description = "Product and review endpoints"),
        (name = "Coupons", description = "Coupon code endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Addresses", description = "Shipping address endpoints"),
        (name = "Admin", description = "Operator endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
