//! Registrar - 네임스페이스 범위가 지정된 등록 핸들

use super::dynamic::Registry;
use super::entry::{ProblemSpec, Registration};
use super::id::RegistryId;
use optreg_foundation::{Error, Result};
use std::sync::Arc;

/// 등록 핸들
///
/// 플러그인 로드 중에는 로드 중인 네임스페이스로 범위가 고정된다:
/// 네임스페이스 없는 ID 에는 자동으로 붙이고, 다른 네임스페이스는 거부한다.
/// 범위 없는 핸들 (`Registry::register` 포함) 도 현재 스레드가 네임스페이스를
/// 로드하는 중이면 같은 규칙을 따른다.
#[derive(Clone, Copy)]
pub struct Registrar<'a> {
    registry: &'a Registry,
    namespace: Option<&'a str>,
}

impl<'a> Registrar<'a> {
    pub(crate) fn new(registry: &'a Registry, namespace: Option<&'a str>) -> Self {
        Self {
            registry,
            namespace,
        }
    }

    /// 범위로 지정된 네임스페이스
    pub fn namespace(&self) -> Option<&'a str> {
        self.namespace
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// 문제 등록
    pub fn register(&self, registration: Registration) -> Result<()> {
        self.register_spec(registration).map(|_| ())
    }

    /// 문제 등록 후 저장된 명세 반환
    pub fn register_spec(&self, registration: Registration) -> Result<Arc<ProblemSpec>> {
        let parsed = RegistryId::parse(&registration.id)?;

        let namespace = match (parsed.namespace(), registration.namespace.as_deref()) {
            (Some(in_id), Some(given)) if in_id != given => {
                return Err(Error::NamespaceMismatch {
                    id: parsed.to_string(),
                    expected: given.to_string(),
                });
            }
            (Some(in_id), _) => Some(in_id.to_string()),
            (None, given) => given.map(String::from),
        };

        let scope = match self.namespace {
            Some(scope) => Some(scope.to_string()),
            None => self.registry.loading_namespace(),
        };

        let namespace = match (namespace, scope) {
            (Some(ns), Some(scope)) if ns != scope => {
                return Err(Error::NamespaceMismatch {
                    id: parsed.with_namespace(Some(&ns)).to_string(),
                    expected: scope,
                });
            }
            (None, Some(scope)) => Some(scope),
            (ns, _) => ns,
        };

        let id = parsed.with_namespace(namespace.as_deref());
        if let Some(ns) = id.namespace() {
            // 플러그인 항목이 먼저 등록되어야 충돌 검사가 정확하다
            self.registry.ensure_loaded(ns)?;
        }

        self.registry.insert_spec(registration.into_spec(id))
    }
}

impl std::fmt::Debug for Registrar<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registrar")
            .field("namespace", &self.namespace)
            .finish()
    }
}
