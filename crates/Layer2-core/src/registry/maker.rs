//! Maker - 조회 -> entry point 해석 -> 생성 -> 래퍼 적용
//!
//! 래퍼는 안쪽부터 다음 순서로 적용된다:
//!
//! ```text
//! RenderCollection( 등록된 래퍼들( Autoreset( TimeLimit( OrderEnforcing( PassiveChecker( base ))))))
//! ```

use super::dynamic::Registry;
use super::entry::ProblemSpec;
use crate::problem::{
    Autoreset, Kwargs, Metadata, OrderEnforcing, PassiveChecker, Problem, RenderCollection,
    TimeLimit, WrapperFactory,
};
use optreg_foundation::{Error, Result};
use serde_json::Value;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::debug;

/// 렌더 모드 "목록" 접미사 (예: `rgb_array_list`)
const LIST_SUFFIX: &str = "_list";

// ============================================================================
// MakeOptions
// ============================================================================

/// make() 호출 옵션
#[derive(Debug, Clone)]
pub struct MakeOptions {
    /// 요청한 렌더 모드
    pub render_mode: Option<String>,

    /// None 이면 명세 값 사용
    pub disable_env_checker: Option<bool>,

    /// None 이면 명세 값 사용
    pub order_enforce: Option<bool>,

    pub autoreset: bool,

    /// 명세에 선언된 래퍼 적용 여부
    pub apply_wrappers: bool,

    /// 명세의 max_episode_steps 덮어쓰기
    pub max_episode_steps: Option<u32>,

    /// 생성자 키워드 인자 (명세 값보다 우선)
    pub kwargs: Kwargs,
}

impl Default for MakeOptions {
    fn default() -> Self {
        Self {
            render_mode: None,
            disable_env_checker: None,
            order_enforce: None,
            autoreset: false,
            apply_wrappers: true,
            max_episode_steps: None,
            kwargs: Kwargs::new(),
        }
    }
}

impl MakeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_render_mode(mut self, mode: impl Into<String>) -> Self {
        self.render_mode = Some(mode.into());
        self
    }

    pub fn with_disable_env_checker(mut self, disabled: bool) -> Self {
        self.disable_env_checker = Some(disabled);
        self
    }

    pub fn with_order_enforce(mut self, enabled: bool) -> Self {
        self.order_enforce = Some(enabled);
        self
    }

    pub fn with_autoreset(mut self, enabled: bool) -> Self {
        self.autoreset = enabled;
        self
    }

    /// 명세의 래퍼를 적용하지 않음
    pub fn without_wrappers(mut self) -> Self {
        self.apply_wrappers = false;
        self
    }

    pub fn with_max_episode_steps(mut self, steps: u32) -> Self {
        self.max_episode_steps = Some(steps);
        self
    }

    /// 빌더 패턴: 생성자 키워드 인자 추가
    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    pub fn with_kwargs(mut self, kwargs: Kwargs) -> Self {
        self.kwargs.extend(kwargs);
        self
    }
}

// ============================================================================
// Render mode negotiation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum RenderPlan {
    /// 렌더 모드 없음
    Off,

    /// 요청한 모드 그대로
    Direct(String),

    /// 단수 모드로 생성한 뒤 RenderCollection 으로 감쌈
    Collect { base: String, requested: String },
}

impl RenderPlan {
    /// 생성자에 넘길 모드
    fn construct_mode(&self) -> Option<&str> {
        match self {
            RenderPlan::Off => None,
            RenderPlan::Direct(mode) => Some(mode.as_str()),
            RenderPlan::Collect { base, .. } => Some(base.as_str()),
        }
    }
}

fn negotiate(id: &str, requested: Option<&str>, metadata: &Metadata) -> Result<RenderPlan> {
    let Some(mode) = requested else {
        return Ok(RenderPlan::Off);
    };

    if metadata.supports(mode) {
        return Ok(RenderPlan::Direct(mode.to_string()));
    }

    if let Some(base) = mode.strip_suffix(LIST_SUFFIX) {
        if metadata.supports(base) {
            debug!("Render mode '{}' emulated by collecting '{}' frames", mode, base);
            return Ok(RenderPlan::Collect {
                base: base.to_string(),
                requested: mode.to_string(),
            });
        }
    }

    Err(Error::UnsupportedRenderMode {
        id: id.to_string(),
        mode: mode.to_string(),
        supported: metadata.render_modes.clone(),
    })
}

// ============================================================================
// ProblemHandle - make() 결과
// ============================================================================

/// 생성된 문제와 그 출처 명세
///
/// `Deref` 로 가장 바깥 래퍼에 직접 접근할 수 있다.
pub struct ProblemHandle {
    spec: Arc<ProblemSpec>,
    problem: Box<dyn Problem>,
}

impl ProblemHandle {
    /// 생성에 사용된 명세 (병합된 kwargs 포함)
    pub fn spec(&self) -> &ProblemSpec {
        &self.spec
    }

    /// 해석된 레지스트리 ID
    pub fn id(&self) -> String {
        self.spec.id.to_string()
    }

    pub fn into_inner(self) -> Box<dyn Problem> {
        self.problem
    }
}

impl Deref for ProblemHandle {
    type Target = dyn Problem;

    fn deref(&self) -> &Self::Target {
        self.problem.as_ref()
    }
}

impl DerefMut for ProblemHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.problem.as_mut()
    }
}

impl std::fmt::Debug for ProblemHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProblemHandle")
            .field("id", &self.spec.id.to_string())
            .field("stack", &self.problem.wrapper_stack())
            .finish()
    }
}

// ============================================================================
// Registry::make
// ============================================================================

impl Registry {
    /// 등록된 문제 생성
    ///
    /// `module:id` 형식이면 먼저 `module` 을 import 해서 등록 부수효과를 실행한다.
    /// ID 자체에도 `:` 가 들어갈 수 있으므로, 접두사가 설치된 모듈이 아니고
    /// 전체 문자열이 등록된 ID 로 해석되면 접두사로 보지 않는다.
    /// 실패해도 공유 상태는 바뀌지 않는다 (네임스페이스 최초 로드 제외).
    pub fn make(&self, id: &str, options: MakeOptions) -> Result<ProblemHandle> {
        let registrar = self.registrar();

        let id = match id.split_once(':') {
            Some((module, rest)) if self.modules().contains(module) || self.spec(id).is_err() => {
                self.modules().import(module, &registrar)?;
                rest
            }
            _ => id,
        };

        let spec = self.spec(id)?;
        let factory = self.modules().resolve(&spec.entry_point, &registrar)?;

        // 래퍼 해석은 생성보다 먼저
        let mut wrappers: Vec<(Arc<dyn WrapperFactory>, &Kwargs)> = Vec::new();
        if options.apply_wrappers {
            for descriptor in &spec.wrappers {
                let wrapper = self.modules().resolve(&descriptor.entry_point, &registrar)?;
                wrappers.push((wrapper, &descriptor.kwargs));
            }
        }

        let mut kwargs = spec.kwargs.clone();
        kwargs.extend(options.kwargs);

        let plan = negotiate(&spec.id.to_string(), options.render_mode.as_deref(), &factory.metadata())?;
        let mut problem = factory.create(plan.construct_mode(), &kwargs)?;

        let disable_env_checker = options.disable_env_checker.unwrap_or(spec.disable_env_checker);
        let order_enforce = options.order_enforce.unwrap_or(spec.order_enforce);
        let max_episode_steps = options.max_episode_steps.or(spec.max_episode_steps);

        if !disable_env_checker {
            problem = Box::new(PassiveChecker::new(problem));
        }
        if order_enforce {
            problem = Box::new(OrderEnforcing::new(problem));
        }
        if let Some(steps) = max_episode_steps {
            problem = Box::new(TimeLimit::new(problem, steps));
        }
        if options.autoreset {
            problem = Box::new(Autoreset::new(problem));
        }
        for (wrapper, wrapper_kwargs) in wrappers {
            problem = wrapper.wrap(problem, wrapper_kwargs)?;
        }
        if let RenderPlan::Collect { requested, .. } = plan {
            problem = Box::new(RenderCollection::new(problem, requested));
        }

        debug!("Made {}: {:?}", spec.id, problem.wrapper_stack());

        let resolved = ProblemSpec {
            kwargs,
            max_episode_steps,
            order_enforce,
            disable_env_checker,
            ..(*spec).clone()
        };

        Ok(ProblemHandle {
            spec: Arc::new(resolved),
            problem,
        })
    }
}
