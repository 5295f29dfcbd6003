//! Registry - 명세 저장소, 네임스페이스 로드 상태, 모듈 테이블을 묶은 상태 객체

use super::entry::{ProblemSpec, Registration};
use super::id::RegistryId;
use super::registrar::Registrar;
use super::store::SpecStore;
use super::version;
use crate::plugin::{ManifestLoader, ModuleTable, NamespaceLoader, NoopLoader, OnceSlots, SlotOutcome};
use optreg_foundation::logging::REGISTRY_TARGET;
use optreg_foundation::{Error, RegistryConfig, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use tracing::{debug, info, warn};

/// 문제 레지스트리
///
/// Interior Mutability 패턴으로 `&self` 만으로 등록/조회/생성이 가능하다.
pub struct Registry {
    /// 명세 저장소
    specs: RwLock<SpecStore>,

    /// 호스트가 설치한 모듈 (import 단위)
    modules: ModuleTable,

    /// 네임스페이스 로더
    loader: RwLock<Arc<dyn NamespaceLoader>>,

    /// 네임스페이스별 로드 상태 (실패도 캐시)
    namespaces: OnceSlots,

    /// 스레드별로 지금 로드 중인 네임스페이스 (중첩 로드는 스택)
    loading: Mutex<HashMap<ThreadId, Vec<String>>>,

    /// 같은 ID 재등록 시 경고 여부
    warn_on_overwrite: bool,
}

impl Registry {
    /// 빈 레지스트리 생성 (모든 네임스페이스가 비어 있는 로더)
    pub fn new() -> Self {
        Self::with_loader(NoopLoader)
    }

    /// 로더를 지정해서 생성
    pub fn with_loader(loader: impl NamespaceLoader + 'static) -> Self {
        Self {
            specs: RwLock::new(SpecStore::new()),
            modules: ModuleTable::new(),
            loader: RwLock::new(Arc::new(loader)),
            namespaces: OnceSlots::caching_failures(),
            loading: Mutex::new(HashMap::new()),
            warn_on_overwrite: true,
        }
    }

    /// 설정의 플러그인 매니페스트로 생성
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let loader = ManifestLoader::from_config(config)?;
        debug!(
            "Registry configured with {} plugin namespace(s)",
            loader.manifest().len()
        );
        Ok(Self::with_loader(loader).with_warn_on_overwrite(config.warn_on_overwrite))
    }

    /// 빌더 패턴: 재등록 경고 설정
    pub fn with_warn_on_overwrite(mut self, enabled: bool) -> Self {
        self.warn_on_overwrite = enabled;
        self
    }

    /// 로더 교체 (이미 로드된 네임스페이스에는 영향 없음)
    pub fn set_loader(&self, loader: impl NamespaceLoader + 'static) {
        *self.loader.write() = Arc::new(loader);
    }

    /// 모듈 테이블
    pub fn modules(&self) -> &ModuleTable {
        &self.modules
    }

    // ========================================================================
    // 등록
    // ========================================================================

    /// 범위 없는 등록 핸들
    pub fn registrar(&self) -> Registrar<'_> {
        Registrar::new(self, None)
    }

    /// 네임스페이스로 범위가 지정된 등록 핸들
    pub fn namespace<'a>(&'a self, namespace: &'a str) -> Registrar<'a> {
        Registrar::new(self, Some(namespace))
    }

    /// 문제 등록
    pub fn register(&self, registration: Registration) -> Result<()> {
        self.registrar().register(registration)
    }

    pub(crate) fn insert_spec(&self, spec: ProblemSpec) -> Result<Arc<ProblemSpec>> {
        let id = spec.id.clone();
        let mut specs = self.specs.write();

        if specs.insert(spec)?.is_some() {
            if self.warn_on_overwrite {
                warn!(target: REGISTRY_TARGET, "Overriding problem {} already in registry.", id);
            }
        } else {
            debug!("Registered problem: {}", id);
        }

        specs
            .get(&id)
            .ok_or_else(|| Error::Internal(format!("'{}' vanished right after insert", id)))
    }

    // ========================================================================
    // 네임스페이스 로드
    // ========================================================================

    /// 네임스페이스를 최대 한 번 로드
    ///
    /// 동시에 호출한 다른 스레드는 첫 로드가 끝날 때까지 기다리고,
    /// 로드 중인 스레드의 재진입 호출은 즉시 반환한다.
    /// 실패한 로드는 캐시되어 이후 호출마다 같은 원인으로 실패한다.
    pub fn ensure_loaded(&self, namespace: &str) -> Result<()> {
        let loader = Arc::clone(&*self.loader.read());
        let registrar = Registrar::new(self, Some(namespace));

        let outcome = self.namespaces.run(namespace, || {
            let _scope = LoadingScope::enter(self, namespace);
            loader.load(namespace, &registrar)
        });

        match outcome {
            Ok(SlotOutcome::Ran) => {
                debug!("Namespace '{}' loaded", namespace);
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(source) => Err(Error::PluginLoad {
                namespace: namespace.to_string(),
                source,
            }),
        }
    }

    /// 현재 스레드가 로드 중인 가장 안쪽 네임스페이스
    ///
    /// 범위 없는 등록도 로드 중에는 이 네임스페이스로 범위가 고정된다.
    pub(crate) fn loading_namespace(&self) -> Option<String> {
        self.loading
            .lock()
            .get(&thread::current().id())
            .and_then(|stack| stack.last().cloned())
    }

    /// 로드가 끝난 (실패 포함) 네임스페이스 목록
    pub fn loaded_namespaces(&self) -> Vec<String> {
        self.namespaces.settled_keys()
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// ID 문자열을 구체적인 ID 로 해석 (필요하면 네임스페이스 로드)
    pub fn resolve(&self, raw: &str) -> Result<RegistryId> {
        let id = RegistryId::parse(raw)?;
        if let Some(namespace) = id.namespace() {
            self.ensure_loaded(namespace)?;
        }
        version::resolve(&self.specs.read(), &id)
    }

    /// 명세 조회 (생성하지 않음)
    pub fn spec(&self, raw: &str) -> Result<Arc<ProblemSpec>> {
        let id = self.resolve(raw)?;
        self.specs
            .read()
            .get(&id)
            .ok_or_else(|| Error::unregistered(id.to_string(), None))
    }

    /// 모든 명세의 스냅샷 (ID 순)
    pub fn specs(&self) -> Vec<Arc<ProblemSpec>> {
        self.specs.read().iter().cloned().collect()
    }

    /// 모든 ID (정렬됨)
    pub fn ids(&self) -> Vec<RegistryId> {
        self.specs.read().iter().map(|spec| spec.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.read().is_empty()
    }

    /// 네임스페이스별로 묶어 열 단위로 정렬한 목록
    pub fn pretty_print(&self, num_cols: usize, exclude_namespaces: &[&str]) -> String {
        let num_cols = num_cols.max(1);
        let mut groups: BTreeMap<Option<String>, Vec<String>> = BTreeMap::new();
        for id in self.ids() {
            if id.namespace().is_some_and(|ns| exclude_namespaces.contains(&ns)) {
                continue;
            }
            groups.entry(id.namespace.clone()).or_default().push(id.to_string());
        }

        let width = groups.values().flatten().map(String::len).max().unwrap_or(0);
        let mut out = String::new();
        for (namespace, ids) in &groups {
            let _ = writeln!(out, "===== {} =====", namespace.as_deref().unwrap_or("default"));
            for row in ids.chunks(num_cols) {
                let cells: Vec<String> = row.iter().map(|id| format!("{:<width$}", id)).collect();
                let _ = writeln!(out, "{}", cells.join(" ").trim_end());
            }
        }
        out
    }

    // ========================================================================
    // 초기화
    // ========================================================================

    /// 모든 명세, 네임스페이스 로드 상태, import 캐시 초기화
    ///
    /// 설치된 모듈과 로더는 유지되므로 이후 사용 시 다시 로드된다.
    pub fn reset(&self) {
        self.specs.write().clear();
        self.namespaces.clear();
        self.modules.reset_imports();
        info!("Registry reset");
    }
}

/// 로드 중 표시 (패닉에도 스택에서 제거)
struct LoadingScope<'a> {
    registry: &'a Registry,
    thread: ThreadId,
}

impl<'a> LoadingScope<'a> {
    fn enter(registry: &'a Registry, namespace: &str) -> Self {
        let thread = thread::current().id();
        registry
            .loading
            .lock()
            .entry(thread)
            .or_default()
            .push(namespace.to_string());
        Self { registry, thread }
    }
}

impl Drop for LoadingScope<'_> {
    fn drop(&mut self) {
        let mut loading = self.registry.loading.lock();
        if let Some(stack) = loading.get_mut(&self.thread) {
            stack.pop();
            if stack.is_empty() {
                loading.remove(&self.thread);
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("specs", &self.len())
            .field("modules", &self.modules.names())
            .field("loaded_namespaces", &self.loaded_namespaces())
            .finish()
    }
}
