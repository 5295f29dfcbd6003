//! Problem traits - 최적화 문제 경계 인터페이스
//!
//! 레지스트리가 생성/래핑하는 객체가 구현해야 하는 최소한의 계약.
//! 실제 최적화 알고리즘이나 렌더링 구현은 이 크레이트의 범위 밖이다.

use optreg_foundation::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

/// 생성자/래퍼 키워드 인자
pub type Kwargs = serde_json::Map<String, Value>;

// ============================================================================
// Metadata - 문제가 선언하는 기능 집합
// ============================================================================

/// 문제 메타데이터 (지원 렌더 모드 등)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// 지원하는 렌더 모드
    #[serde(default)]
    pub render_modes: Vec<String>,

    /// 렌더 FPS (선택)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_fps: Option<u32>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// 빌더 패턴: 렌더 모드 설정
    pub fn with_render_modes<I, S>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.render_modes = modes.into_iter().map(Into::into).collect();
        self
    }

    /// 빌더 패턴: FPS 설정
    pub fn with_render_fps(mut self, fps: u32) -> Self {
        self.render_fps = Some(fps);
        self
    }

    /// 렌더 모드 지원 여부
    pub fn supports(&self, mode: &str) -> bool {
        self.render_modes.iter().any(|m| m == mode)
    }
}

// ============================================================================
// Step - step() 결과
// ============================================================================

/// 한 스텝의 결과
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub observation: Value,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    pub info: Kwargs,
}

impl Step {
    pub fn new(observation: Value, reward: f64) -> Self {
        Self {
            observation,
            reward,
            terminated: false,
            truncated: false,
            info: Kwargs::new(),
        }
    }

    pub fn terminated(mut self) -> Self {
        self.terminated = true;
        self
    }

    /// 에피소드 종료 여부 (terminated 또는 truncated)
    pub fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

// ============================================================================
// Problem Trait
// ============================================================================

/// 레지스트리로 생성되는 최적화 문제
///
/// 기본 구현은 "지원하지 않음" 을 반환한다. 단일 최적화 문제는
/// reset/step 없이 render/close 만 구현해도 된다.
pub trait Problem: Any + Send {
    /// 선언된 메타데이터
    fn metadata(&self) -> &Metadata;

    /// 생성 시 선택된 렌더 모드
    fn render_mode(&self) -> Option<&str> {
        None
    }

    /// 에피소드 시작
    fn reset(&mut self, _seed: Option<u64>) -> Result<Value> {
        Err(Error::NotSupported("reset".into()))
    }

    /// 한 스텝 진행
    fn step(&mut self, _action: &Value) -> Result<Step> {
        Err(Error::NotSupported("step".into()))
    }

    /// 현재 상태 렌더링
    fn render(&mut self) -> Result<Option<Value>> {
        Ok(None)
    }

    /// 리소스 정리
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// 래퍼인 경우 감싸고 있는 객체
    fn inner(&self) -> Option<&(dyn Problem + 'static)> {
        None
    }

    /// 구체 타입 이름 (디버깅용)
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// 타입 캐스팅을 위한 헬퍼 (다운캐스팅 지원)
    fn as_any(&self) -> &dyn Any;
}

impl dyn Problem {
    /// 모든 래퍼를 벗겨낸 가장 안쪽 객체
    pub fn unwrapped(&self) -> &(dyn Problem + 'static) {
        let mut current: &(dyn Problem + 'static) = self;
        while let Some(inner) = current.inner() {
            current = inner;
        }
        current
    }

    /// 이 객체를 구체 타입으로 다운캐스팅
    pub fn downcast_ref<T: Problem>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// 래퍼 체인을 따라 내려가며 첫 번째 T 를 찾음
    pub fn find<T: Problem>(&self) -> Option<&T> {
        let mut current: Option<&(dyn Problem + 'static)> = Some(self);
        while let Some(p) = current {
            if let Some(found) = p.as_any().downcast_ref::<T>() {
                return Some(found);
            }
            current = p.inner();
        }
        None
    }

    /// 바깥쪽부터 안쪽까지의 타입 이름
    pub fn wrapper_stack(&self) -> Vec<&'static str> {
        let mut names = vec![self.type_name()];
        let mut current = self.inner();
        while let Some(p) = current {
            names.push(p.type_name());
            current = p.inner();
        }
        names
    }
}

// ============================================================================
// ProblemFactory - 생성 가능한 문제 (entry point 대상)
// ============================================================================

/// 문제 생성자
pub trait ProblemFactory: Send + Sync {
    /// 생성될 문제의 메타데이터 (렌더 모드 협상에 사용)
    fn metadata(&self) -> Metadata {
        Metadata::default()
    }

    /// 문제 인스턴스 생성
    fn create(&self, render_mode: Option<&str>, kwargs: &Kwargs) -> Result<Box<dyn Problem>>;
}

/// 클로저 기반 생성자
pub struct FnFactory<F> {
    metadata: Metadata,
    create: F,
}

impl<F> ProblemFactory for FnFactory<F>
where
    F: Fn(Option<&str>, &Kwargs) -> Result<Box<dyn Problem>> + Send + Sync,
{
    fn metadata(&self) -> Metadata {
        self.metadata.clone()
    }

    fn create(&self, render_mode: Option<&str>, kwargs: &Kwargs) -> Result<Box<dyn Problem>> {
        (self.create)(render_mode, kwargs)
    }
}

/// 클로저로 생성자 만들기
pub fn factory<F>(metadata: Metadata, create: F) -> Arc<dyn ProblemFactory>
where
    F: Fn(Option<&str>, &Kwargs) -> Result<Box<dyn Problem>> + Send + Sync + 'static,
{
    Arc::new(FnFactory { metadata, create })
}

// ============================================================================
// WrapperFactory - 생성된 문제를 감싸는 래퍼
// ============================================================================

/// 래퍼 생성자
pub trait WrapperFactory: Send + Sync {
    fn wrap(&self, inner: Box<dyn Problem>, kwargs: &Kwargs) -> Result<Box<dyn Problem>>;
}

impl<F> WrapperFactory for F
where
    F: Fn(Box<dyn Problem>, &Kwargs) -> Result<Box<dyn Problem>> + Send + Sync,
{
    fn wrap(&self, inner: Box<dyn Problem>, kwargs: &Kwargs) -> Result<Box<dyn Problem>> {
        self(inner, kwargs)
    }
}

/// 클로저로 래퍼 생성자 만들기
pub fn wrapper<F>(wrap: F) -> Arc<dyn WrapperFactory>
where
    F: Fn(Box<dyn Problem>, &Kwargs) -> Result<Box<dyn Problem>> + Send + Sync + 'static,
{
    Arc::new(wrap)
}
