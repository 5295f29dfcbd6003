//! Registry Config - 레지스트리 통합 설정
//!
//! 플러그인 매니페스트 (namespace -> `module[:function]`) 를 entry point
//! 그룹 단위로 선언한다. 설치된 패키지가 제공하는 문제 구현을
//! 호스트가 직접 import 하지 않고도 찾을 수 있게 해준다.
//!
//! ```json
//! {
//!   "version": 1,
//!   "entryPoints": {
//!     "optreg.problems": {
//!       "acc": "acc_problems:register",
//!       "sps": "sps_problems"
//!     }
//!   },
//!   "logLevel": "debug"
//! }
//! ```

use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 설정 파일명
pub const REGISTRY_CONFIG_FILE: &str = "registry.json";

/// 문제 플러그인 매니페스트 그룹 이름
pub const PLUGIN_GROUP: &str = "optreg.problems";

fn default_version() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// 레지스트리 설정
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    /// 버전 (마이그레이션용)
    #[serde(default = "default_version")]
    pub version: u32,

    /// entry point 그룹 -> (이름 -> 값)
    #[serde(default)]
    pub entry_points: BTreeMap<String, BTreeMap<String, String>>,

    /// 기본 로그 레벨 (RUST_LOG 가 우선)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// 같은 ID 재등록 시 경고 출력 여부
    #[serde(default = "default_true")]
    pub warn_on_overwrite: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            entry_points: BTreeMap::new(),
            log_level: None,
            warn_on_overwrite: true,
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let mut layers = Vec::new();
        if let Ok(global) = JsonStore::global() {
            layers.push(global);
        }
        if let Ok(project) = JsonStore::current_project() {
            layers.push(project);
        }
        Self::load_layers(&layers)
    }

    /// 여러 계층을 순서대로 병합 (뒤의 계층이 우선)
    ///
    /// 어느 한 계층이라도 파싱에 실패하면 그 계층 이름과 함께 에러를 반환한다.
    pub fn load_layers(layers: &[JsonStore]) -> Result<Self> {
        let mut config = Self::new();
        for store in layers {
            if let Some(layer_config) = store.read_config::<RegistryConfig>()? {
                config.merge(layer_config);
            }
        }
        Ok(config)
    }

    /// 특정 저장소에서 로드 (없으면 기본값)
    pub fn load_from(store: &JsonStore) -> Result<Self> {
        Ok(store.read_config::<RegistryConfig>()?.unwrap_or_default())
    }

    /// 특정 저장소에 저장
    pub fn save_to(&self, store: &JsonStore) -> Result<()> {
        store.write_config(self)
    }

    /// 다른 설정 병합 (other 가 우선, entry point 는 키 단위 병합)
    pub fn merge(&mut self, other: RegistryConfig) {
        self.version = other.version;
        for (group, entries) in other.entry_points {
            self.entry_points.entry(group).or_default().extend(entries);
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        self.warn_on_overwrite = other.warn_on_overwrite;
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// 특정 그룹의 entry point 목록
    pub fn group(&self, group: &str) -> BTreeMap<String, String> {
        self.entry_points.get(group).cloned().unwrap_or_default()
    }

    /// 문제 플러그인 매니페스트 (PLUGIN_GROUP)
    pub fn plugins(&self) -> BTreeMap<String, String> {
        self.group(PLUGIN_GROUP)
    }

    /// 빌더 패턴: 플러그인 추가
    pub fn with_plugin(mut self, namespace: impl Into<String>, value: impl Into<String>) -> Self {
        self.entry_points
            .entry(PLUGIN_GROUP.to_string())
            .or_default()
            .insert(namespace.into(), value.into());
        self
    }

    /// 로그 레벨 (기본 "info")
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}
