//! 미들웨어까지 포함한 전체 애플리케이션 구성.

use axum::extract::Request;
use axum::http::{header, HeaderValue, Method};
use axum::{Router, ServiceExt};
use defi_core::ServerConfig;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::routes::create_api_router;
use crate::state::AppState;

/// CORS 레이어 생성.
///
/// 허용 origin 목록이 없으면 모든 origin을 허용합니다 (`Access-Control-Allow-Origin: *`).
/// 메서드는 `GET`, `OPTIONS`, 헤더는 `Content-Type`만 허용합니다.
pub fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let allow_origin = match origins {
        Some(origins) if !origins.is_empty() => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("cors_origins contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// 라우터 생성.
///
/// `static_dir`이 설정되어 있으면 `GET /`에서 `index.html`을 제공합니다.
pub fn create_router(state: Arc<AppState>, server: &ServerConfig) -> Router {
    let mut router = create_api_router();

    if let Some(dir) = &server.static_dir {
        let index = Path::new(dir).join("index.html");
        info!(path = %index.display(), "정적 index 제공");
        router = router.route_service("/", ServeFile::new(index));
    }

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(server.cors_origins.as_deref()))
}

/// 후행 슬래시를 제거한 뒤 라우팅하는 전체 서비스.
///
/// 경로 정규화는 라우팅 전에 일어나야 하므로 라우터 바깥을 감쌉니다.
pub fn create_app(state: Arc<AppState>, server: &ServerConfig) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(create_router(state, server))
}

/// 리스너에서 요청을 처리하다가 `shutdown`이 완료되면 멈춥니다.
///
/// 종료 신호 이후 새 연결은 받지 않고, 진행 중인 요청이 끝날 때까지 기다린 뒤 반환합니다.
pub async fn serve<F>(
    listener: TcpListener,
    app: NormalizePath<Router>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown)
        .await
}
