#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tower::ServiceExt;

use tableside_api::{
    auth::{session_cookie, AuthService, SessionUser},
    config::AppConfig,
    db,
    entities::{area, category, product, setting, user_login},
    events::EventBus,
    services::AppServices,
    AppState,
};

/// Helper harness for spinning up an application backed by an in-memory
/// SQLite database. One connection keeps the database alive and isolated
/// per test.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub admin: SessionUser,
    pub staff: SessionUser,
    pub other_staff: SessionUser,
    admin_cookie: String,
    staff_cookie: String,
    other_staff_cookie: String,
}

/// Seeded area ids, in creation order.
pub struct SeededAreas {
    pub ids: Vec<i64>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let event_bus = EventBus::new();
        let auth_service = Arc::new(AuthService::new(
            &cfg.jwt_secret,
            Duration::from_secs(cfg.session_ttl_secs as u64),
        ));

        let services = AppServices::new(db_arc.clone(), event_bus.clone());

        let state = AppState {
            db: db_arc.clone(),
            config: cfg.clone(),
            event_bus,
            auth: auth_service.clone(),
            services,
        };

        let admin_model = seed_user(&db_arc, &auth_service, "admin", "admin-pass", true).await;
        let staff_model = seed_user(&db_arc, &auth_service, "maria", "staff-pass", false).await;
        let other_model = seed_user(&db_arc, &auth_service, "sam", "staff-pass", false).await;

        let admin = SessionUser::from(&admin_model);
        let staff = SessionUser::from(&staff_model);
        let other_staff = SessionUser::from(&other_model);

        let admin_cookie = cookie_for(&auth_service, &admin_model);
        let staff_cookie = cookie_for(&auth_service, &staff_model);
        let other_staff_cookie = cookie_for(&auth_service, &other_model);

        let auth_for_layer = auth_service.clone();
        let router = Router::new()
            .route("/health", get(tableside_api::health_check))
            .nest("/api", tableside_api::api_routes())
            .layer(axum::middleware::from_fn_with_state(
                auth_for_layer,
                |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
                 mut req: Request<Body>,
                 next: axum::middleware::Next| async move {
                    req.extensions_mut().insert(auth);
                    next.run(req).await
                },
            ))
            .with_state(state.clone());

        Self {
            router,
            state,
            admin,
            staff,
            other_staff,
            admin_cookie,
            staff_cookie,
            other_staff_cookie,
        }
    }

    /// Insert the standard charge configuration: 10% service charge,
    /// 150 fixed delivery fee.
    pub async fn seed_settings(&self) {
        setting::ActiveModel {
            percentage_service_charges: Set(Decimal::from(10)),
            fix_delivery_charges: Set(Decimal::from(150)),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed settings");
    }

    /// Create `count` empty tables, returning their ids.
    pub async fn seed_areas(&self, count: usize) -> SeededAreas {
        let mut ids = Vec::with_capacity(count);
        for n in 1..=count {
            let row = area::ActiveModel {
                name: Set(format!("Table {}", n)),
                remarks: Set(None),
                is_active: Set(false),
                ..Default::default()
            }
            .insert(&*self.state.db)
            .await
            .expect("seed area");
            ids.push(row.id);
        }
        SeededAreas { ids }
    }

    /// Seed one category with two products.
    pub async fn seed_menu(&self) -> (i64, Vec<product::Model>) {
        let burgers = category::ActiveModel {
            name: Set("Burgers".to_string()),
            image: Set(None),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed category");

        let mut products = Vec::new();
        for (code, name, price) in [
            ("BRG-01", "Classic Burger", Decimal::from(450)),
            ("BRG-02", "Double Burger", Decimal::from(650)),
        ] {
            let row = product::ActiveModel {
                item_code: Set(code.to_string()),
                item_name: Set(name.to_string()),
                sale_price: Set(price),
                qty_balance: Set(Decimal::from(100)),
                category_id: Set(Some(burgers.id)),
                is_active: Set(true),
                ..Default::default()
            }
            .insert(&*self.state.db)
            .await
            .expect("seed product");
            products.push(row);
        }

        (burgers.id, products)
    }

    #[allow(dead_code)]
    pub fn admin_cookie(&self) -> &str {
        &self.admin_cookie
    }

    #[allow(dead_code)]
    pub fn staff_cookie(&self) -> &str {
        &self.staff_cookie
    }

    #[allow(dead_code)]
    pub fn other_staff_cookie(&self) -> &str {
        &self.other_staff_cookie
    }

    /// Send a request against the router with an optional session cookie.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body_json: Option<Value>,
        cookie: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }

        let body = if let Some(json) = body_json {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn request_as_admin(
        &self,
        method: Method,
        uri: &str,
        body_json: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body_json, Some(&self.admin_cookie))
            .await
    }

    pub async fn request_as_staff(
        &self,
        method: Method,
        uri: &str,
        body_json: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body_json, Some(&self.staff_cookie))
            .await
    }
}

async fn seed_user(
    db: &Arc<tableside_api::db::DbPool>,
    auth: &AuthService,
    name: &str,
    password: &str,
    is_admin: bool,
) -> user_login::Model {
    user_login::ActiveModel {
        name: Set(name.to_string()),
        password_hash: Set(auth.hash_password(password).expect("hash password")),
        is_admin: Set(is_admin),
        ..Default::default()
    }
    .insert(&**db)
    .await
    .expect("seed user")
}

fn cookie_for(auth: &AuthService, user: &user_login::Model) -> String {
    let token = auth.issue_session(user).expect("issue session");
    // Only the name=value pair goes back in a request Cookie header.
    session_cookie(&token, Duration::from_secs(3600))
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

/// Decode a response body as JSON.
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Parse a Decimal that may be serialized as either string or number.
pub fn decimal_from(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("expected decimal-ish value, got {other:?}"),
    }
}
