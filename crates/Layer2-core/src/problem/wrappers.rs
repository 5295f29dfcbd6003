//! Built-in wrappers - make() 가 자동으로 적용하는 래퍼
//!
//! 적용 순서 (안쪽부터):
//! PassiveChecker -> OrderEnforcing -> TimeLimit -> Autoreset
//! -> (등록 시 지정한 래퍼들) -> RenderCollection

use super::traits::{Metadata, Problem, Step};
use optreg_foundation::{Error, Result};
use serde_json::Value;
use std::any::Any;
use tracing::warn;

// ============================================================================
// PassiveChecker - 경고만 하는 검사기
// ============================================================================

/// 선언된 메타데이터와 실제 동작이 어긋나면 경고만 출력하는 래퍼
pub struct PassiveChecker {
    inner: Box<dyn Problem>,
    checked_step: bool,
}

impl PassiveChecker {
    pub fn new(inner: Box<dyn Problem>) -> Self {
        let metadata = inner.metadata();
        if let Some(mode) = inner.render_mode() {
            if !metadata.supports(mode) {
                warn!(
                    "{} was created with render mode '{}' which its metadata does not declare",
                    inner.type_name(),
                    mode
                );
            }
        }
        Self {
            inner,
            checked_step: false,
        }
    }
}

impl Problem for PassiveChecker {
    fn metadata(&self) -> &Metadata {
        self.inner.metadata()
    }

    fn render_mode(&self) -> Option<&str> {
        self.inner.render_mode()
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<Value> {
        self.inner.reset(seed)
    }

    fn step(&mut self, action: &Value) -> Result<Step> {
        let step = self.inner.step(action)?;
        if !self.checked_step {
            self.checked_step = true;
            if !step.reward.is_finite() {
                warn!("{} returned a non-finite reward: {}", self.inner.type_name(), step.reward);
            }
        }
        Ok(step)
    }

    fn render(&mut self) -> Result<Option<Value>> {
        self.inner.render()
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }

    fn inner(&self) -> Option<&(dyn Problem + 'static)> {
        Some(self.inner.as_ref())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// OrderEnforcing - reset() 전에 step()/render() 금지
// ============================================================================

/// reset() 호출 전 step()/render() 를 에러로 처리하는 래퍼
pub struct OrderEnforcing {
    inner: Box<dyn Problem>,
    has_reset: bool,
}

impl OrderEnforcing {
    pub fn new(inner: Box<dyn Problem>) -> Self {
        Self {
            inner,
            has_reset: false,
        }
    }

    pub fn has_reset(&self) -> bool {
        self.has_reset
    }
}

impl Problem for OrderEnforcing {
    fn metadata(&self) -> &Metadata {
        self.inner.metadata()
    }

    fn render_mode(&self) -> Option<&str> {
        self.inner.render_mode()
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<Value> {
        let observation = self.inner.reset(seed)?;
        self.has_reset = true;
        Ok(observation)
    }

    fn step(&mut self, action: &Value) -> Result<Step> {
        if !self.has_reset {
            return Err(Error::OrderViolation("cannot call step() before reset()".into()));
        }
        self.inner.step(action)
    }

    fn render(&mut self) -> Result<Option<Value>> {
        if !self.has_reset {
            return Err(Error::OrderViolation("cannot call render() before reset()".into()));
        }
        self.inner.render()
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }

    fn inner(&self) -> Option<&(dyn Problem + 'static)> {
        Some(self.inner.as_ref())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// TimeLimit - 스텝 수 제한
// ============================================================================

/// max_episode_steps 에 도달하면 truncated 를 세우는 래퍼
pub struct TimeLimit {
    inner: Box<dyn Problem>,
    max_episode_steps: u32,
    elapsed_steps: u32,
}

impl TimeLimit {
    pub fn new(inner: Box<dyn Problem>, max_episode_steps: u32) -> Self {
        Self {
            inner,
            max_episode_steps,
            elapsed_steps: 0,
        }
    }

    pub fn max_episode_steps(&self) -> u32 {
        self.max_episode_steps
    }

    pub fn elapsed_steps(&self) -> u32 {
        self.elapsed_steps
    }
}

impl Problem for TimeLimit {
    fn metadata(&self) -> &Metadata {
        self.inner.metadata()
    }

    fn render_mode(&self) -> Option<&str> {
        self.inner.render_mode()
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<Value> {
        self.elapsed_steps = 0;
        self.inner.reset(seed)
    }

    fn step(&mut self, action: &Value) -> Result<Step> {
        let mut step = self.inner.step(action)?;
        self.elapsed_steps += 1;
        if self.elapsed_steps >= self.max_episode_steps {
            step.truncated = true;
        }
        Ok(step)
    }

    fn render(&mut self) -> Result<Option<Value>> {
        self.inner.render()
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }

    fn inner(&self) -> Option<&(dyn Problem + 'static)> {
        Some(self.inner.as_ref())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Autoreset - 에피소드 종료 시 자동 reset
// ============================================================================

/// 종료된 스텝 직후 reset() 을 호출하고 마지막 관측값을 info 에 남기는 래퍼
pub struct Autoreset {
    inner: Box<dyn Problem>,
}

impl Autoreset {
    /// info 에 남기는 마지막 관측값 키
    pub const FINAL_OBSERVATION: &'static str = "final_observation";

    pub fn new(inner: Box<dyn Problem>) -> Self {
        Self { inner }
    }
}

impl Problem for Autoreset {
    fn metadata(&self) -> &Metadata {
        self.inner.metadata()
    }

    fn render_mode(&self) -> Option<&str> {
        self.inner.render_mode()
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<Value> {
        self.inner.reset(seed)
    }

    fn step(&mut self, action: &Value) -> Result<Step> {
        let mut step = self.inner.step(action)?;
        if step.is_done() {
            let observation = self.inner.reset(None)?;
            let last = std::mem::replace(&mut step.observation, observation);
            step.info.insert(Self::FINAL_OBSERVATION.to_string(), last);
        }
        Ok(step)
    }

    fn render(&mut self) -> Result<Option<Value>> {
        self.inner.render()
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }

    fn inner(&self) -> Option<&(dyn Problem + 'static)> {
        Some(self.inner.as_ref())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// RenderCollection - "*_list" 렌더 모드 지원
// ============================================================================

/// 매 reset/step 마다 프레임을 모아두고 render() 에서 한꺼번에 반환하는 래퍼
pub struct RenderCollection {
    inner: Box<dyn Problem>,
    render_mode: String,
    frames: Vec<Value>,
}

impl RenderCollection {
    pub fn new(inner: Box<dyn Problem>, render_mode: impl Into<String>) -> Self {
        Self {
            inner,
            render_mode: render_mode.into(),
            frames: Vec::new(),
        }
    }

    fn collect_frame(&mut self) -> Result<()> {
        if let Some(frame) = self.inner.render()? {
            self.frames.push(frame);
        }
        Ok(())
    }
}

impl Problem for RenderCollection {
    fn metadata(&self) -> &Metadata {
        self.inner.metadata()
    }

    fn render_mode(&self) -> Option<&str> {
        Some(self.render_mode.as_str())
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<Value> {
        let observation = self.inner.reset(seed)?;
        self.frames.clear();
        self.collect_frame()?;
        Ok(observation)
    }

    fn step(&mut self, action: &Value) -> Result<Step> {
        let step = self.inner.step(action)?;
        self.collect_frame()?;
        Ok(step)
    }

    fn render(&mut self) -> Result<Option<Value>> {
        Ok(Some(Value::Array(std::mem::take(&mut self.frames))))
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }

    fn inner(&self) -> Option<&(dyn Problem + 'static)> {
        Some(self.inner.as_ref())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
