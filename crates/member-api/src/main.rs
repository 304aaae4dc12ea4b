//! 멤버십 백엔드 API 서버.
//!
//! 설정 로드 → 토큰 코덱 구성 → DB 연결 → 초기 데이터 시딩 → 라우터
//! 구성 순서로 시작합니다. 서명 비밀 키가 없거나 잘못된 경우, DB에
//! 연결할 수 없는 경우 시작 자체가 실패합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use member_api::openapi::swagger_ui_router;
use member_api::repository::PgMemberStore;
use member_api::routes::create_router;
use member_api::state::AppState;
use member_api::{auth::TokenCodec, bootstrap};
use member_core::{init_logging, AppConfig};

/// CORS 미들웨어 구성.
///
/// `CORS_ORIGINS` 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
            axum::http::header::COOKIE,
        ])
        .allow_credentials(std::env::var("CORS_ORIGINS").is_ok())
        .max_age(Duration::from_secs(3600))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // 설정 로드 - 서명 비밀 키가 없거나 짧으면 여기서 실패합니다
    let config = AppConfig::load_default().context("설정 로드 실패")?;

    init_logging(&config.logging).map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {e}"))?;

    info!("Starting Member API server...");

    // 토큰 코덱 구성 (프로세스 전역 불변)
    let codec = TokenCodec::new(&config.auth).context("토큰 코덱 초기화 실패")?;

    // 데이터베이스 연결
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .connect(&config.database.url)
        .await
        .context("데이터베이스 연결 실패")?;
    info!("Connected to PostgreSQL");

    let store = Arc::new(PgMemberStore::new(pool));

    // 역할/관리자 초기 데이터 시딩
    if config.bootstrap.enabled {
        bootstrap::seed(&store, &config.bootstrap)
            .await
            .context("초기 데이터 시딩 실패")?;
    }

    let state = Arc::new(AppState::new(store, codec, config.cookie.clone()));
    info!(version = %state.version, "Application state initialized");

    // 라우터 구성
    let app: Router = create_router(state)
        .merge(swagger_ui_router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors_layer());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("서버 주소가 유효하지 않습니다. server.host / server.port 설정을 확인하세요.")?;

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 서버를 종료합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
