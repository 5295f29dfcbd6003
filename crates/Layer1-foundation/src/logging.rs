//! Logging - tracing-subscriber 초기화
//!
//! 라이브러리 자체는 `tracing` 매크로만 사용하고, 구독자 설치는 호스트가
//! 결정한다. 이 헬퍼는 호스트와 테스트를 위한 기본 구성을 제공한다.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 로그 타겟 (레지스트리 경고)
pub const REGISTRY_TARGET: &str = "optreg::registry";

/// 전역 구독자 설치
///
/// `RUST_LOG` 가 설정되어 있으면 그것을 우선 사용하고, 아니면 `default_level`.
/// 이미 설치된 구독자가 있으면 false 를 반환한다.
pub fn init(default_level: &str) -> bool {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true).compact())
        .try_init()
        .is_ok()
}
