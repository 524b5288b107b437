use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use nesting_core::{
    group_identical_bars, restock, withdraw_plan, BarGroup, BarResult, OptimizationRequest,
    OptimizationResult, Optimizer, OptimizerError, StockItem,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const OPENAPI_SPEC: &str = include_str!("../../../openapi.yaml");
const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Bar Nesting API Docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            SwaggerUIBundle({
                url: '/openapi.yaml',
                dom_id: '#swagger-ui',
                presets: [SwaggerUIBundle.presets.apis],
                layout: 'BaseLayout',
            });
        };
    </script>
</body>
</html>"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Bar Nesting API");

    let addr = std::env::var("NESTING_API_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let app = router();

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on http://{}", addr);
    info!("Try: curl http://{}/api/health", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/optimize", post(optimize))
        .route("/api/bars/grouped", post(grouped_bars))
        .route("/api/restock", post(restock_inventory))
        .route("/api/withdraw", post(withdraw_inventory))
        .route("/openapi.yaml", get(serve_openapi_spec))
        .route("/docs", get(serve_swagger_ui))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "bar-nesting-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Main optimization endpoint.
///
/// The engine is CPU bound, so each run goes to the blocking pool with its own
/// copy of the stock snapshot and comes back as one complete result.
async fn optimize(
    Json(request): Json<OptimizationRequest>,
) -> Result<Json<OptimizationResult>, AppError> {
    info!(
        "Received optimization request with {} requests and {} stock items",
        request.requests.len(),
        request.stock.len()
    );

    let optimizer = Optimizer::new(request)?;
    let result = tokio::task::spawn_blocking(move || optimizer.optimize())
        .await
        .map_err(|e| anyhow::anyhow!("optimization worker failed: {}", e))??;

    info!(
        "Optimization complete: {} bars, {} to buy, {} not fit",
        result.totals.total_bars_used,
        result.totals.bars_purchased,
        result.items_not_fit.len()
    );

    Ok(Json(result))
}

/// Groups identical bars for work orders
async fn grouped_bars(Json(result): Json<OptimizationResult>) -> Json<Vec<BarGroup>> {
    info!("Grouping {} bars", result.bars.len());
    Json(group_identical_bars(&result.bars))
}

#[derive(Debug, Deserialize)]
struct RestockRequest {
    plan_id: String,
    result: OptimizationResult,
}

/// Inventory after a plan: consumed bars removed, offcuts added
async fn restock_inventory(
    Json(request): Json<RestockRequest>,
) -> Result<Json<Vec<StockItem>>, AppError> {
    if request.plan_id.trim().is_empty() {
        return Err(OptimizerError::InvalidInput("plan_id must not be empty".to_string()).into());
    }

    let RestockRequest { plan_id, result } = request;
    info!("Restocking offcuts of plan {}", plan_id);

    Ok(Json(restock(result.remaining_stock, &result.bars, &plan_id)))
}

#[derive(Debug, Deserialize)]
struct WithdrawRequest {
    plan_id: String,
    stock: Vec<StockItem>,
    /// Bars of the plan being rolled back
    bars: Vec<BarResult>,
}

/// Inventory with a plan rolled back: its offcuts removed, its bars returned
async fn withdraw_inventory(Json(request): Json<WithdrawRequest>) -> Json<Vec<StockItem>> {
    info!("Rolling back plan {}", request.plan_id);
    Json(withdraw_plan(request.stock, &request.bars, &request.plan_id))
}

/// Application error type
struct AppError(anyhow::Error);

impl From<OptimizerError> for AppError {
    fn from(err: OptimizerError) -> Self {
        AppError(err.into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request error: {}", self.0);

        let status = if self.0.downcast_ref::<OptimizerError>().is_some() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (
            status,
            Json(json!({
                "error": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

async fn serve_openapi_spec() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "application/yaml")],
        OPENAPI_SPEC,
    )
}

async fn serve_swagger_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn post_json(uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn job() -> serde_json::Value {
        json!({
            "requests": [
                { "id": "req-1", "material": "Perfil", "length": 6000, "quantity": 1 },
                { "id": "plate", "material": "Chapa", "length": 788, "quantity": 3, "skip_optimization": true }
            ],
            "stock": [
                { "id": "stock-1", "material": "Perfil", "length": 6300, "quantity": 1 }
            ],
            "settings": { "standard_bar_lengths": { "Perfil": 6000 } }
        })
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_optimize_returns_plan() {
        let (status, body) = post_json("/api/optimize", job()).await;
        assert_eq!(status, StatusCode::OK);

        let result: OptimizationResult = serde_json::from_value(body).unwrap();
        assert_eq!(result.bars.len(), 1);
        assert_eq!(result.bars[0].waste, 300);
        assert_eq!(result.purchase_list.len(), 1);
        assert!(result.purchase_list[0].pre_cut);
        assert_eq!(result.remaining_stock[0].quantity, 0);
    }

    #[tokio::test]
    async fn test_invalid_settings_are_bad_request() {
        let mut body = job();
        body["settings"]["default_standard_length"] = json!(0);

        let (status, body) = post_json("/api/optimize", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("Invalid settings"));
    }

    #[tokio::test]
    async fn test_grouped_bars_and_restock() {
        let (_, plan) = post_json(
            "/api/optimize",
            json!({
                "requests": [{ "id": "r", "material": "Tubo", "length": 2000, "quantity": 5 }]
            }),
        )
        .await;

        let (status, groups) = post_json("/api/bars/grouped", plan.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(groups.as_array().unwrap().len(), 2);

        let (status, stock) = post_json(
            "/api/restock",
            json!({ "plan_id": "p1", "result": plan }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let stock: Vec<StockItem> = serde_json::from_value(stock).unwrap();
        // Two bars of 2000+2000 keep 1997 each, the last bar keeps 4000
        assert_eq!(stock.len(), 2);
        assert_eq!((stock[0].length, stock[0].quantity), (1997, 2));
        assert_eq!((stock[1].length, stock[1].quantity), (4000, 1));

        let (status, rolled_back) = post_json(
            "/api/withdraw",
            json!({ "plan_id": "p1", "stock": stock, "bars": plan["bars"] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(rolled_back.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_withdraw_returns_consumed_stock() {
        let (_, plan) = post_json("/api/optimize", job()).await;
        let (_, stock) = post_json(
            "/api/restock",
            json!({ "plan_id": "p2", "result": plan.clone() }),
        )
        .await;
        assert!(stock.as_array().unwrap().is_empty());

        let (status, rolled_back) = post_json(
            "/api/withdraw",
            json!({ "plan_id": "p2", "stock": stock, "bars": plan["bars"] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rolled_back: Vec<StockItem> = serde_json::from_value(rolled_back).unwrap();
        assert_eq!(rolled_back.len(), 1);
        assert_eq!(rolled_back[0].id, "stock-1");
        assert_eq!((rolled_back[0].length, rolled_back[0].quantity), (6300, 1));
    }
}
