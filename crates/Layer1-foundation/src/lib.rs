//! # optreg-foundation
//!
//! Foundation layer for optreg:
//! - Error: 레지스트리 에러 분류 (MalformedId, RegistrationConflict, ...)
//! - Config: 플러그인 매니페스트 및 레지스트리 설정 (RegistryConfig)
//! - Storage: JsonStore (글로벌/프로젝트 설정 파일)
//! - Logging: tracing-subscriber 초기화
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  optreg-core (Registry, make, register)                 │
//! │                     │                                   │
//! │                     ▼                                   │
//! │  optreg-foundation                                      │
//! │   ├── Error / Result                                    │
//! │   ├── RegistryConfig ── JsonStore (global + project)    │
//! │   └── logging::init                                     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{RegistryConfig, PLUGIN_GROUP, REGISTRY_CONFIG_FILE};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::{ConfigLayer, JsonStore};
