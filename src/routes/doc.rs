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
        auth::{AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest},
        dashboard::AdminStats,
        ratings::SubmitRatingRequest,
        stores::{
            AdminStoreList, AdminStoreQuery, AdminStoreView, CreateStoreRequest, OwnerRatingList,
            OwnerRatingView, StoreAverage, UserStoreList, UserStoreQuery, UserStoreView,
        },
        users::{CreateUserRequest, UserDetail, UserList, UserListQuery},
    },
    models::{Rating, Role, Store, User},
    response::{ApiResponse, Meta},
    routes::{auth, dashboard, health, ratings, stores, users},
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
        auth::change_password,
        users::create_user,
        users::list_users,
        users::get_user,
        stores::create_store,
        stores::list_stores,
        stores::list_stores_admin,
        stores::my_store_ratings,
        stores::my_store_average,
        ratings::submit_rating,
        dashboard::admin_stats
    ),
    components(
        schemas(
            Role,
            User,
            Store,
            Rating,
            RegisterRequest,
            LoginRequest,
            ChangePasswordRequest,
            AuthResponse,
            CreateUserRequest,
            UserListQuery,
            UserList,
            UserDetail,
            CreateStoreRequest,
            AdminStoreQuery,
            UserStoreQuery,
            AdminStoreView,
            UserStoreView,
            OwnerRatingView,
            AdminStoreList,
            UserStoreList,
            OwnerRatingList,
            StoreAverage,
            SubmitRatingRequest,
            AdminStats,
            Meta,
            ApiResponse<AuthResponse>,
            ApiResponse<UserStoreList>,
            ApiResponse<AdminStoreList>,
            ApiResponse<Rating>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and password endpoints"),
        (name = "Users", description = "Admin user management"),
        (name = "Stores", description = "Store listings and owner views"),
        (name = "Ratings", description = "Rating submission"),
        (name = "Dashboard", description = "Admin dashboard"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
