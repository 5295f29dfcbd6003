//! 전역 Registry
//!
//! 프로세스 전체에서 공유하는 레지스트리와 편의 함수.
//! 테스트나 격리가 필요한 호스트는 `Registry::new()` 로 직접 만들어 쓴다.

use super::dynamic::Registry;
use super::entry::{ProblemSpec, Registration};
use super::maker::{MakeOptions, ProblemHandle};
use optreg_foundation::{RegistryConfig, Result};
use std::sync::{Arc, OnceLock};
use tracing::warn;

static GLOBAL_REGISTRY: OnceLock<Registry> = OnceLock::new();

fn configured_registry() -> Registry {
    match RegistryConfig::load().and_then(|config| Registry::from_config(&config)) {
        Ok(registry) => registry,
        Err(e) => {
            warn!("Failed to load registry config, starting without plugins: {}", e);
            Registry::new()
        }
    }
}

/// 전역 레지스트리 초기화
///
/// 이미 초기화되어 있으면 기존 레지스트리를 반환하고 `registry` 는 버린다.
pub fn init_global(registry: Registry) -> &'static Registry {
    GLOBAL_REGISTRY.get_or_init(|| registry)
}

/// 전역 레지스트리 가져오기 (처음 호출 시 설정 파일로 구성)
pub fn global() -> &'static Registry {
    GLOBAL_REGISTRY.get_or_init(configured_registry)
}

/// 전역 레지스트리에 등록 (편의 함수)
pub fn register(registration: Registration) -> Result<()> {
    global().register(registration)
}

/// 전역 레지스트리에서 생성 (편의 함수)
pub fn make(id: &str, options: MakeOptions) -> Result<ProblemHandle> {
    global().make(id, options)
}

/// 전역 레지스트리에서 명세 조회 (편의 함수)
pub fn spec(id: &str) -> Result<Arc<ProblemSpec>> {
    global().spec(id)
}

/// 전역 레지스트리의 모든 명세 (ID 순)
pub fn registry() -> Vec<Arc<ProblemSpec>> {
    global().specs()
}
