//! Plugin Discovery - 매니페스트 기반 네임스페이스 로더
//!
//! 네임스페이스가 처음 필요해지면 매니페스트에서 항목을 찾아
//! 모듈을 import 하고, 함수가 지정되어 있으면 인자 없이 호출한다.

use super::manifest::{ManifestEntry, PluginManifest};
use super::traits::{Attr, NamespaceLoader};
use crate::registry::Registrar;
use optreg_foundation::{Error, RegistryConfig, Result};
use tracing::{debug, info};

/// 매니페스트를 따라 네임스페이스를 로드하는 기본 로더
#[derive(Debug, Clone, Default)]
pub struct ManifestLoader {
    manifest: PluginManifest,
}

impl ManifestLoader {
    pub fn new(manifest: PluginManifest) -> Self {
        Self { manifest }
    }

    /// 설정의 플러그인 그룹으로 생성
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        Ok(Self::new(PluginManifest::from_config(config)?))
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn run_entry(&self, entry: &ManifestEntry, registrar: &Registrar<'_>) -> Result<()> {
        let modules = registrar.registry().modules();
        let module = modules.import(&entry.module, registrar)?;

        let Some(function) = &entry.function else {
            return Ok(());
        };

        match module.attr(function) {
            Some(Attr::Loader(call)) => call(registrar),
            Some(other) => Err(Error::EntryPointAttribute {
                module: entry.module.clone(),
                attr: function.clone(),
                hint: Some(format!("expected a function, found a {}", other.kind())),
            }),
            None => Err(Error::attribute(&entry.module, function)),
        }
    }
}

impl NamespaceLoader for ManifestLoader {
    fn load(&self, namespace: &str, registrar: &Registrar<'_>) -> Result<()> {
        let Some(entry) = self.manifest.get(namespace) else {
            debug!("No plugin declared for namespace '{}'", namespace);
            return Ok(());
        };

        info!("Loading plugin for namespace '{}' from {}", namespace, entry);
        self.run_entry(entry, registrar)
    }
}
