//! 레지스트리 설정 파일 (`registry.json`) 저장소
//!
//! 설정은 계층별 디렉토리에 하나씩 존재한다:
//! - global: `<config_dir>/optreg/registry.json`
//! - project: `<root>/.optreg/registry.json`
//! - explicit: 호출자가 지정한 디렉토리
//!
//! 파싱 실패 시 어느 계층의 어느 파일이 문제인지 에러 메시지에 담는다.

use crate::config::REGISTRY_CONFIG_FILE;
use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// 프로젝트 설정 디렉토리 이름
pub const PROJECT_DIR: &str = ".optreg";

/// 설정 계층 (뒤에 오는 계층이 우선)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigLayer {
    Global,
    Project,
    Explicit,
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigLayer::Global => "global",
            ConfigLayer::Project => "project",
            ConfigLayer::Explicit => "explicit",
        };
        f.write_str(name)
    }
}

/// 한 계층의 레지스트리 설정 파일 저장소
#[derive(Debug, Clone)]
pub struct JsonStore {
    base_dir: PathBuf,
    layer: ConfigLayer,
}

impl JsonStore {
    /// 지정한 디렉토리 (explicit 계층)
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            layer: ConfigLayer::Explicit,
        }
    }

    /// 글로벌 설정 (~/.config/optreg/)
    pub fn global() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Cannot find config directory".to_string()))?
            .join("optreg");
        Ok(Self {
            base_dir: dir,
            layer: ConfigLayer::Global,
        })
    }

    /// 프로젝트 설정 (<root>/.optreg/)
    pub fn project(root: impl AsRef<Path>) -> Self {
        Self {
            base_dir: root.as_ref().join(PROJECT_DIR),
            layer: ConfigLayer::Project,
        }
    }

    /// 현재 디렉토리 프로젝트 설정
    pub fn current_project() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| Error::Config(format!("Cannot get current directory: {}", e)))?;
        Ok(Self::project(cwd))
    }

    pub fn layer(&self) -> ConfigLayer {
        self.layer
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `registry.json` 경로
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(REGISTRY_CONFIG_FILE)
    }

    /// 설정 읽기 (파일이 없으면 None)
    pub fn read_config<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let path = self.config_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::Config(format!(
                    "Failed to read {} registry config {}: {}",
                    self.layer,
                    path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&content).map(Some).map_err(|e| {
            Error::Config(format!(
                "Failed to parse {} registry config {} (line {}, column {}): {}",
                self.layer,
                path.display(),
                e.line(),
                e.column(),
                e
            ))
        })
    }

    /// 설정 쓰기
    ///
    /// 임시 파일에 먼저 쓰고 rename 한다. 중간에 실패해도 기존 파일은 그대로다.
    pub fn write_config<T: Serialize>(&self, config: &T) -> Result<()> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| Error::Config(format!("Failed to create {}: {}", self.base_dir.display(), e)))?;

        let path = self.config_path();
        let staging = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("Failed to serialize registry config: {}", e)))?;

        std::fs::write(&staging, content)
            .and_then(|()| std::fs::rename(&staging, &path))
            .map_err(|e| {
                Error::Config(format!(
                    "Failed to write {} registry config {}: {}",
                    self.layer,
                    path.display(),
                    e
                ))
            })
    }
}
