//! Registry Entry - 등록 요청과 저장된 문제 명세

use super::id::RegistryId;
use crate::plugin::{EntryPoint, ProblemEntryPoint, WrapperEntryPoint};
use crate::problem::Kwargs;
use optreg_foundation::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write as _;

// ============================================================================
// WrapperSpec - 래퍼 기술자
// ============================================================================

/// 생성 후 적용할 래퍼 하나
#[derive(Debug, Clone)]
pub struct WrapperSpec {
    /// 표시 이름
    pub name: String,

    /// 래퍼 생성자
    pub entry_point: WrapperEntryPoint,

    /// 래퍼 키워드 인자
    pub kwargs: Kwargs,
}

impl WrapperSpec {
    pub fn new(name: impl Into<String>, entry_point: impl Into<WrapperEntryPoint>) -> Self {
        Self {
            name: name.into(),
            entry_point: entry_point.into(),
            kwargs: Kwargs::new(),
        }
    }

    /// 빌더 패턴: 키워드 인자 추가
    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// ProblemSpec - 저장된 명세
// ============================================================================

/// 하나의 레지스트리 ID 에 대한 등록 기록
#[derive(Debug, Clone)]
pub struct ProblemSpec {
    pub id: RegistryId,
    pub entry_point: ProblemEntryPoint,

    /// 생성 시 적용할 키워드 인자
    pub kwargs: Kwargs,

    /// 안쪽부터 적용되는 래퍼 목록
    pub wrappers: Vec<WrapperSpec>,

    pub max_episode_steps: Option<u32>,
    pub reward_threshold: Option<f64>,
    pub nondeterministic: bool,
    pub order_enforce: bool,
    pub disable_env_checker: bool,
}

/// JSON 직렬화용 기록 (간접 entry point 만 표현 가능)
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpecRecord {
    id: RegistryId,
    entry_point: String,
    #[serde(default)]
    kwargs: Kwargs,
    #[serde(default)]
    wrappers: Vec<WrapperRecord>,
    #[serde(default)]
    max_episode_steps: Option<u32>,
    #[serde(default)]
    reward_threshold: Option<f64>,
    #[serde(default)]
    nondeterministic: bool,
    #[serde(default = "default_true")]
    order_enforce: bool,
    #[serde(default)]
    disable_env_checker: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WrapperRecord {
    name: String,
    entry_point: String,
    #[serde(default)]
    kwargs: Kwargs,
}

fn default_true() -> bool {
    true
}

fn indirect_only<T: ?Sized>(id: &RegistryId, entry_point: &EntryPoint<T>) -> Result<String> {
    if entry_point.is_indirect() {
        Ok(entry_point.to_string())
    } else {
        Err(Error::InvalidArgument(format!(
            "'{}' uses a direct entry point, which cannot be serialized",
            id
        )))
    }
}

impl ProblemSpec {
    /// 명세를 JSON 문자열로 변환
    ///
    /// entry point (래퍼 포함) 가 모두 `module:attr` 형태여야 한다.
    pub fn to_json(&self) -> Result<String> {
        let wrappers = self
            .wrappers
            .iter()
            .map(|w| {
                Ok(WrapperRecord {
                    name: w.name.clone(),
                    entry_point: indirect_only(&self.id, &w.entry_point)?,
                    kwargs: w.kwargs.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let record = SpecRecord {
            id: self.id.clone(),
            entry_point: indirect_only(&self.id, &self.entry_point)?,
            kwargs: self.kwargs.clone(),
            wrappers,
            max_episode_steps: self.max_episode_steps,
            reward_threshold: self.reward_threshold,
            nondeterministic: self.nondeterministic,
            order_enforce: self.order_enforce,
            disable_env_checker: self.disable_env_checker,
        };
        Ok(serde_json::to_string(&record)?)
    }

    /// JSON 문자열에서 명세 복원
    pub fn from_json(json: &str) -> Result<Self> {
        let record: SpecRecord = serde_json::from_str(json)?;
        Ok(Self {
            id: record.id,
            entry_point: EntryPoint::indirect(&record.entry_point),
            kwargs: record.kwargs,
            wrappers: record
                .wrappers
                .into_iter()
                .map(|w| WrapperSpec {
                    name: w.name,
                    entry_point: EntryPoint::indirect(&w.entry_point),
                    kwargs: w.kwargs,
                })
                .collect(),
            max_episode_steps: record.max_episode_steps,
            reward_threshold: record.reward_threshold,
            nondeterministic: record.nondeterministic,
            order_enforce: record.order_enforce,
            disable_env_checker: record.disable_env_checker,
        })
    }

    /// 사람이 읽기 위한 요약
    ///
    /// `print_all` 이 false 면 기본값과 다른 필드만 출력한다.
    pub fn pprint(&self, include_entry_points: bool, print_all: bool) -> String {
        let mut out = format!("id={}", self.id);
        if include_entry_points {
            let _ = write!(out, "\nentry_point={}", self.entry_point);
        }

        if print_all || self.reward_threshold.is_some() {
            let value = self.reward_threshold.map_or("None".to_string(), |v| v.to_string());
            let _ = write!(out, "\nreward_threshold={}", value);
        }
        if print_all || self.nondeterministic {
            let _ = write!(out, "\nnondeterministic={}", self.nondeterministic);
        }
        if print_all || self.max_episode_steps.is_some() {
            let value = self.max_episode_steps.map_or("None".to_string(), |v| v.to_string());
            let _ = write!(out, "\nmax_episode_steps={}", value);
        }
        if print_all || !self.order_enforce {
            let _ = write!(out, "\norder_enforce={}", self.order_enforce);
        }
        if print_all || self.disable_env_checker {
            let _ = write!(out, "\ndisable_env_checker={}", self.disable_env_checker);
        }
        if print_all || !self.kwargs.is_empty() {
            let _ = write!(out, "\nkwargs={}", Value::Object(self.kwargs.clone()));
        }
        if print_all || !self.wrappers.is_empty() {
            let names: Vec<&str> = self.wrappers.iter().map(|w| w.name.as_str()).collect();
            let _ = write!(out, "\nwrappers=[{}]", names.join(", "));
        }

        out
    }
}

// ============================================================================
// Registration - register() 입력
// ============================================================================

/// 등록 요청 빌더
#[derive(Debug, Clone)]
pub struct Registration {
    pub(crate) id: String,
    pub(crate) namespace: Option<String>,
    entry_point: ProblemEntryPoint,
    kwargs: Kwargs,
    wrappers: Vec<WrapperSpec>,
    max_episode_steps: Option<u32>,
    reward_threshold: Option<f64>,
    nondeterministic: bool,
    order_enforce: bool,
    disable_env_checker: bool,
}

impl Registration {
    /// 새 등록 요청
    ///
    /// entry point 는 `Arc<dyn ProblemFactory>` 또는 `"module:attr"` 문자열.
    pub fn new(id: impl Into<String>, entry_point: impl Into<ProblemEntryPoint>) -> Self {
        Self {
            id: id.into(),
            namespace: None,
            entry_point: entry_point.into(),
            kwargs: Kwargs::new(),
            wrappers: Vec::new(),
            max_episode_steps: None,
            reward_threshold: None,
            nondeterministic: false,
            order_enforce: true,
            disable_env_checker: false,
        }
    }

    /// 원본 ID 문자열
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 빌더 패턴: 키워드 인자 추가
    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    /// 빌더 패턴: 키워드 인자 일괄 추가
    pub fn with_kwargs(mut self, kwargs: Kwargs) -> Self {
        self.kwargs.extend(kwargs);
        self
    }

    /// 빌더 패턴: 래퍼 추가 (앞에 추가한 것이 안쪽)
    pub fn with_wrapper(mut self, wrapper: WrapperSpec) -> Self {
        self.wrappers.push(wrapper);
        self
    }

    pub fn with_max_episode_steps(mut self, steps: u32) -> Self {
        self.max_episode_steps = Some(steps);
        self
    }

    pub fn with_reward_threshold(mut self, threshold: f64) -> Self {
        self.reward_threshold = Some(threshold);
        self
    }

    pub fn nondeterministic(mut self) -> Self {
        self.nondeterministic = true;
        self
    }

    pub fn with_order_enforce(mut self, enabled: bool) -> Self {
        self.order_enforce = enabled;
        self
    }

    pub fn with_disable_env_checker(mut self, disabled: bool) -> Self {
        self.disable_env_checker = disabled;
        self
    }

    /// 빌더 패턴: 네임스페이스 지정 (ID 에 네임스페이스가 없을 때)
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub(crate) fn into_spec(self, id: RegistryId) -> ProblemSpec {
        ProblemSpec {
            id,
            entry_point: self.entry_point,
            kwargs: self.kwargs,
            wrappers: self.wrappers,
            max_episode_steps: self.max_episode_steps,
            reward_threshold: self.reward_threshold,
            nondeterministic: self.nondeterministic,
            order_enforce: self.order_enforce,
            disable_env_checker: self.disable_env_checker,
        }
    }
}
