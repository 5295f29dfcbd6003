//! Config - 레지스트리 설정 관리
//!
//! - `registry.rs` - RegistryConfig (플러그인 매니페스트, 로그 레벨)

mod registry;

pub use registry::{RegistryConfig, PLUGIN_GROUP, REGISTRY_CONFIG_FILE};
