//! # Plugin System
//!
//! 네임스페이스 단위의 지연 플러그인 로드와 entry point 해석
//!
//! ## 개요
//!
//! 문제 구현은 호스트가 모두 미리 import 하지 않아도 된다:
//! - 호스트는 `Module` 을 `ModuleTable` 에 설치만 해 둔다
//! - 네임스페이스가 처음 사용될 때 `NamespaceLoader` 가 매니페스트 항목을 실행
//! - `module:attr` entry point 는 make() 시점에 import 후 해석
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Registry                             │
//! │  ┌──────────────────────┐   ┌────────────────────────────┐ │
//! │  │   NamespaceLoader    │   │        ModuleTable         │ │
//! │  │  (ManifestLoader)    │──▶│  ┌──────────┬──────────┐   │ │
//! │  │  ns -> module[:fn]   │   │  │ Module A │ Module B │   │ │
//! │  └──────────────────────┘   │  └──────────┴──────────┘   │ │
//! │            │                │   import 캐시 (OnceSlots)  │ │
//! │            ▼                └────────────────────────────┘ │
//! │  ┌──────────────────────┐                                  │
//! │  │ Registrar (ns scope) │──▶ register() ──▶ SpecStore      │
//! │  └──────────────────────┘                                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 예시
//!
//! ```ignore
//! let module = StaticModule::new("acc_problems")
//!     .with_factory("SteerProblem", steer_factory)
//!     .with_loader("register_all", |registrar| {
//!         registrar.register(Registration::new("Steer-v1", "acc_problems:SteerProblem"))
//!     });
//!
//! let manifest = PluginManifest::new()
//!     .with_entry("acc", ManifestEntry::new("acc_problems").with_function("register_all"));
//!
//! let registry = Registry::with_loader(ManifestLoader::new(manifest));
//! registry.modules().add(Arc::new(module));
//! let problem = registry.make("acc/Steer", MakeOptions::new())?;
//! ```

mod discovery;
mod entry_point;
mod manifest;
mod module;
mod once;
mod registry;
mod traits;

pub use discovery::ManifestLoader;
pub use entry_point::{EntryPoint, ProblemEntryPoint, Resolvable, WrapperEntryPoint};
pub use manifest::{ManifestEntry, PluginManifest};
pub use module::StaticModule;
pub use registry::ModuleTable;
pub use traits::{Attr, LoaderFn, Module, NamespaceLoader, NoopLoader};

pub(crate) use once::{OnceSlots, SlotOutcome};
