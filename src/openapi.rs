use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tableside API",
        version = "0.3.0",
        description = r#"
# Tableside Point-of-Sale API

Backend for restaurant staff terminals: order lifecycle management, table
tracking, menu lookups, and real-time notifications.

## Authentication

Log in via `POST /api/auth/login`; the session is carried in an http-only
cookie and lasts one shift (8 hours). All other endpoints require it.

## Real-time events

`GET /api/notifications/stream` is a `text/event-stream` of named events
(`ORDER_CREATED`, `ORDER_UPDATED`, `ORDER_CLOSED`) with JSON payloads and
comment heartbeats every 30 seconds.

## Error Handling

Failures use a consistent shape with appropriate HTTP status codes:

```json
{
  "error": "Conflict",
  "message": "Order 17 is already closed",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Orders", description = "Order lifecycle endpoints"),
        (name = "Sales", description = "Sales history and bulk operations"),
        (name = "Tables", description = "Table grid snapshot"),
        (name = "Catalog", description = "Menu lookups"),
        (name = "Settings", description = "Charge configuration"),
        (name = "Notifications", description = "Real-time event stream"),
        (name = "Auth", description = "Session management")
    ),
    paths(
        // Orders
        crate::handlers::orders::submit_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::close_order,

        // Sales
        crate::handlers::sales::list_sales,
        crate::handlers::sales::bulk_close,

        // Tables
        crate::handlers::tables::list_tables,

        // Catalog
        crate::handlers::catalog::list_categories,
        crate::handlers::catalog::list_products,
        crate::handlers::catalog::list_products_by_category,

        // Settings
        crate::handlers::settings::get_settings,

        // Notifications
        crate::handlers::notifications::stream,

        // Auth
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::auth::logout,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,

            // Order types
            crate::handlers::orders::SubmitOrderRequest,
            crate::handlers::orders::SubmitOrderItem,
            crate::handlers::orders::SubmitOrderResponse,
            crate::handlers::orders::SaleResponse,
            crate::handlers::orders::OrderItemResponse,
            crate::handlers::orders::OrderDetailsResponse,
            crate::services::orders::OrderType,

            // Sales types
            crate::handlers::sales::BulkCloseRequest,
            crate::handlers::sales::BulkCloseResponse,

            // Table types
            crate::services::tables::TableStatus,

            // Catalog types
            crate::handlers::catalog::CategoryResponse,
            crate::handlers::catalog::ProductResponse,

            // Settings types
            crate::services::settings::ChargeSettings,

            // Auth types
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::UserResponse,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_core_paths() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string(&openapi).unwrap();
        assert!(json.contains("Tableside API"));
        assert!(json.contains("/api/orders"));
        assert!(json.contains("/api/notifications/stream"));
    }
}
