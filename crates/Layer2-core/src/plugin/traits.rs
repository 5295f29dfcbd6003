//! Plugin traits - 모듈과 네임스페이스 로더 인터페이스

use crate::problem::{ProblemFactory, WrapperFactory};
use crate::registry::Registrar;
use optreg_foundation::Result;
use std::fmt;
use std::sync::Arc;

/// 인자 없이 호출되어 등록을 수행하는 함수 (매니페스트의 `module:function`)
pub type LoaderFn = Arc<dyn Fn(&Registrar<'_>) -> Result<()> + Send + Sync>;

// ============================================================================
// Attr - 모듈 속성
// ============================================================================

/// 모듈이 노출하는 속성
#[derive(Clone)]
pub enum Attr {
    /// 문제 생성자
    Factory(Arc<dyn ProblemFactory>),

    /// 래퍼 생성자
    Wrapper(Arc<dyn WrapperFactory>),

    /// 등록 함수
    Loader(LoaderFn),
}

impl Attr {
    /// 속성 종류 이름
    pub fn kind(&self) -> &'static str {
        match self {
            Attr::Factory(_) => "problem constructor",
            Attr::Wrapper(_) => "wrapper constructor",
            Attr::Loader(_) => "function",
        }
    }
}

impl fmt::Debug for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attr({})", self.kind())
    }
}

// ============================================================================
// Module Trait - import 단위
// ============================================================================

/// 호스트가 제공하는 import 단위
///
/// `import()` 는 모듈 캐시에 의해 최대 한 번만 호출된다.
/// 여기서 register() 를 호출하는 것이 일반적인 사용법이다.
pub trait Module: Send + Sync {
    /// 모듈 이름 (예: "acc_problems.steer")
    fn name(&self) -> &str;

    /// import 부수효과 (등록 등)
    fn import(&self, _registrar: &Registrar<'_>) -> Result<()> {
        Ok(())
    }

    /// 속성 조회
    fn attr(&self, name: &str) -> Option<Attr>;

    /// 노출된 속성 이름 목록 (에러 힌트용)
    fn attr_names(&self) -> Vec<String> {
        Vec::new()
    }
}

// ============================================================================
// NamespaceLoader Trait - 네임스페이스 지연 로드
// ============================================================================

/// 네임스페이스를 처음 사용할 때 호출되는 로더
///
/// 레지스트리는 네임스페이스당 최대 한 번만 `load()` 를 호출하고,
/// 결과 (실패 포함) 를 캐시한다. 전달되는 registrar 는 해당 네임스페이스로
/// 한정되어 있다.
pub trait NamespaceLoader: Send + Sync {
    fn load(&self, namespace: &str, registrar: &Registrar<'_>) -> Result<()>;
}

/// 아무것도 로드하지 않는 로더 (모든 네임스페이스가 비어 있음)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLoader;

impl NamespaceLoader for NoopLoader {
    fn load(&self, _namespace: &str, _registrar: &Registrar<'_>) -> Result<()> {
        Ok(())
    }
}
