//! optreg-core: Problem Registry for optreg
//!
//! Layer2 - 문제 등록/조회/생성 레이어
//!
//! # 주요 모듈
//!
//! - `registry`: 레지스트리 ID, 명세 저장소, 버전 해석, make()
//! - `plugin`: 모듈 테이블, entry point 해석, 네임스페이스 지연 로드
//! - `problem`: 생성되는 문제의 경계 인터페이스와 기본 래퍼
//!
//! # 사용 예시
//!
//! ```ignore
//! use optreg_core::{factory, MakeOptions, Metadata, Registration, Registry};
//!
//! let registry = Registry::new();
//! registry.register(
//!     Registration::new("acc/Steer-v1", factory(Metadata::new(), |_mode, kwargs| {
//!         Ok(Box::new(Steer::from_kwargs(kwargs)?) as Box<dyn Problem>)
//!     }))
//!     .with_max_episode_steps(200),
//! )?;
//!
//! let mut problem = registry.make("acc/Steer", MakeOptions::new())?;
//! problem.reset(Some(0))?;
//!
//! // 전역 레지스트리 (설정 파일의 플러그인 매니페스트 사용)
//! let spec = optreg_core::spec("acc/Steer-v1")?;
//! ```

// Core modules
pub mod plugin;
pub mod problem;
pub mod registry;

// Re-exports: Registry
pub use registry::{
    global, init_global, make, register, registry, spec, MakeOptions, ProblemHandle, ProblemSpec,
    Registrar, Registration, Registry, RegistryId, SpecStore, WrapperSpec,
};

// Re-exports: Plugin
pub use plugin::{
    Attr, EntryPoint, ManifestEntry, ManifestLoader, Module, ModuleTable, NamespaceLoader,
    NoopLoader, PluginManifest, ProblemEntryPoint, StaticModule, WrapperEntryPoint,
};

// Re-exports: Problem
pub use problem::{
    factory, wrapper, Kwargs, Metadata, Problem, ProblemFactory, Step, WrapperFactory,
};

// Re-exports: Foundation
pub use optreg_foundation::{Error, RegistryConfig, Result, PLUGIN_GROUP};
