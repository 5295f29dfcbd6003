//! # Problem Registry
//!
//! 레지스트리 ID 로 문제를 등록하고, 지연 로드된 플러그인에서 찾아 생성한다.
//!
//! ## 개요
//!
//! - `[namespace/]name[-vVERSION]` 형식의 ID (`RegistryId`)
//! - 버전 생략 시 가장 높은 버전 선택 (숫자 비교)
//! - 네임스페이스는 처음 사용될 때 최대 한 번 로드 (실패도 캐시)
//! - `module:attr` entry point 는 make() 시점에 해석
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Registry                            │
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │  RwLock<SpecStore>  (BTreeMap<RegistryId, ProblemSpec>) ││
//! │  │  ┌──────────────┬──────────────┬──────────────┐         ││
//! │  │  │ acc/Steer-v1 │ acc/Steer-v2 │ toy/Bowl     │  ...    ││
//! │  │  └──────────────┴──────────────┴──────────────┘         ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │        ▲ register()                 │ spec() / make()       │
//! │  ┌─────┴──────────┐      ┌──────────▼──────────────────┐    │
//! │  │   Registrar    │      │ ensure_loaded -> resolve    │    │
//! │  │ (ns scope)     │◀─────│ -> entry point -> create    │    │
//! │  └────────────────┘      │ -> wrappers                 │    │
//! │                          └─────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 사용 예시
//!
//! ```ignore
//! use optreg_core::registry::{MakeOptions, Registration, Registry};
//!
//! let registry = Registry::new();
//! registry.register(
//!     Registration::new("acc/Steer-v1", steer_factory).with_kwarg("x", 1),
//! )?;
//!
//! // 버전 생략 -> 최신 버전, 인자 덮어쓰기
//! let problem = registry.make("acc/Steer", MakeOptions::new().with_kwarg("x", 2))?;
//! assert_eq!(problem.id(), "acc/Steer-v1");
//! ```

mod dynamic;
mod entry;
mod global;
mod id;
mod maker;
mod registrar;
mod store;
mod version;

#[cfg(test)]
mod testing;

pub use dynamic::Registry;
pub use entry::{ProblemSpec, Registration, WrapperSpec};
pub use global::{global, init_global, make, register, registry, spec};
pub use id::RegistryId;
pub use maker::{MakeOptions, ProblemHandle};
pub use registrar::Registrar;
pub use store::SpecStore;
pub use version::resolve as resolve_version;

pub(crate) use version::suggest;
