//! Module Table - 모듈 저장소 및 import 캐시

use super::entry_point::{EntryPoint, Resolvable};
use super::once::{OnceSlots, SlotOutcome};
use super::traits::Module;
use crate::registry::Registrar;
use optreg_foundation::{Error, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// 모듈 테이블 - 호스트가 설치한 모듈과 import 상태 관리
pub struct ModuleTable {
    /// 모듈 저장소 (이름 -> 모듈)
    modules: RwLock<BTreeMap<String, Arc<dyn Module>>>,

    /// import 캐시 (실패한 import 는 재시도 가능)
    imports: OnceSlots,
}

impl ModuleTable {
    /// 새 테이블 생성
    pub fn new() -> Self {
        Self {
            modules: RwLock::new(BTreeMap::new()),
            imports: OnceSlots::retrying_failures(),
        }
    }

    /// 모듈 추가 (같은 이름이 있으면 교체)
    pub fn add(&self, module: Arc<dyn Module>) -> Option<Arc<dyn Module>> {
        let name = module.name().to_string();
        let previous = self.modules.write().insert(name.clone(), module);
        if previous.is_some() {
            warn!("Module '{}' was already installed and has been replaced", name);
        } else {
            debug!("Installed module: {}", name);
        }
        previous
    }

    /// 모듈 조회
    pub fn get(&self, name: &str) -> Option<Arc<dyn Module>> {
        self.modules.read().get(name).cloned()
    }

    /// 모듈 존재 여부
    pub fn contains(&self, name: &str) -> bool {
        self.modules.read().contains_key(name)
    }

    /// 설치된 모듈 이름 목록 (정렬됨)
    pub fn names(&self) -> Vec<String> {
        self.modules.read().keys().cloned().collect()
    }

    /// import 완료 여부
    pub fn is_imported(&self, name: &str) -> bool {
        self.imports.is_done(name)
    }

    /// 모듈 import (최대 한 번)
    ///
    /// 이미 import 된 모듈은 즉시 반환한다. import 부수효과의 등록은
    /// 전달된 registrar 의 네임스페이스 범위를 따른다.
    pub fn import(&self, name: &str, registrar: &Registrar<'_>) -> Result<Arc<dyn Module>> {
        let module = self
            .get(name)
            .ok_or_else(|| Error::import(name, format!("No module named '{}'", name)))?;

        match self.imports.run(name, || module.import(registrar)) {
            Ok(SlotOutcome::Ran) => debug!("Imported module: {}", name),
            Ok(_) => {}
            Err(err) => {
                let reason = err.to_string();
                return Err(Arc::try_unwrap(err).unwrap_or_else(|_| Error::import(name, reason)));
            }
        }

        Ok(module)
    }

    /// entry point 해석
    ///
    /// - Direct: 그대로 반환
    /// - Indirect: 모듈 import 후 속성을 찾아 T 로 변환
    pub fn resolve<T>(&self, entry_point: &EntryPoint<T>, registrar: &Registrar<'_>) -> Result<Arc<T>>
    where
        T: Resolvable + ?Sized,
    {
        match entry_point {
            EntryPoint::Direct(value) => Ok(Arc::clone(value)),
            EntryPoint::Indirect { module, attr } => {
                let loaded = self.import(module, registrar)?;
                let found = loaded.attr(attr).ok_or_else(|| Error::EntryPointAttribute {
                    module: module.clone(),
                    attr: attr.clone(),
                    hint: crate::registry::suggest(attr, loaded.attr_names())
                        .map(|s| format!("Did you mean: `{}`?", s)),
                })?;
                let kind = found.kind();
                T::from_attr(found).ok_or_else(|| Error::EntryPointAttribute {
                    module: module.clone(),
                    attr: attr.clone(),
                    hint: Some(format!("expected a {}, found a {}", T::KIND, kind)),
                })
            }
        }
    }

    /// import 캐시 초기화 (모듈은 유지)
    pub fn reset_imports(&self) {
        self.imports.clear();
    }
}

impl Default for ModuleTable {
    fn default() -> Self {
        Self::new()
    }
}
