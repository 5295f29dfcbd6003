//! Plugin Manifest - 네임스페이스 -> 모듈 매핑 선언

use optreg_foundation::{Error, RegistryConfig, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ManifestEntry - `module` 또는 `module:function`
// ============================================================================

/// 매니페스트 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ManifestEntry {
    /// import 할 모듈
    pub module: String,

    /// import 후 인자 없이 호출할 함수 (선택)
    pub function: Option<String>,
}

impl ManifestEntry {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            function: None,
        }
    }

    /// 빌더 패턴: 호출할 함수 설정
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// `module` 또는 `module:function` 파싱
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        let (module, function) = match value.split_once(':') {
            Some((module, function)) => (module.trim(), Some(function.trim())),
            None => (value, None),
        };

        if module.is_empty() {
            return Err(Error::Config(format!(
                "Plugin entry '{}' does not name a module",
                value
            )));
        }
        if function.is_some_and(str::is_empty) {
            return Err(Error::Config(format!(
                "Plugin entry '{}' has an empty function name",
                value
            )));
        }

        Ok(Self {
            module: module.to_string(),
            function: function.map(str::to_string),
        })
    }
}

impl FromStr for ManifestEntry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ManifestEntry {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ManifestEntry> for String {
    fn from(entry: ManifestEntry) -> Self {
        entry.to_string()
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.function {
            Some(function) => write!(f, "{}:{}", self.module, function),
            None => write!(f, "{}", self.module),
        }
    }
}

// ============================================================================
// PluginManifest - 플러그인 그룹 전체
// ============================================================================

/// 네임스페이스별 매니페스트 항목 모음
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl PluginManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정의 플러그인 그룹에서 생성
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let mut manifest = Self::new();
        for (namespace, value) in config.plugins() {
            manifest.entries.insert(namespace, ManifestEntry::parse(&value)?);
        }
        Ok(manifest)
    }

    /// 빌더 패턴: 항목 추가
    pub fn with_entry(mut self, namespace: impl Into<String>, entry: ManifestEntry) -> Self {
        self.insert(namespace, entry);
        self
    }

    /// 항목 추가 (같은 네임스페이스는 교체)
    pub fn insert(&mut self, namespace: impl Into<String>, entry: ManifestEntry) -> Option<ManifestEntry> {
        self.entries.insert(namespace.into(), entry)
    }

    pub fn get(&self, namespace: &str) -> Option<&ManifestEntry> {
        self.entries.get(namespace)
    }

    /// 선언된 네임스페이스 목록 (정렬됨)
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
