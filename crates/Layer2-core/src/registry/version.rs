//! Version Resolver - 버전 생략 시 최신 버전 선택

use super::id::RegistryId;
use super::store::SpecStore;
use optreg_foundation::logging::REGISTRY_TARGET;
use optreg_foundation::{Error, Result};
use tracing::warn;

/// 후보 중 가장 비슷한 이름 (편집 거리 3 이하)
pub(crate) fn suggest<I, S>(target: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .map(|c| (strsim::levenshtein(target, c.as_ref()), c.as_ref().to_string()))
        .filter(|(distance, candidate)| *distance <= 3 && *distance < target.len().max(candidate.len()))
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

/// 등록되지 않은 ID 에 대한 안내 문구
fn missing_hint(store: &SpecStore, id: &RegistryId) -> Option<String> {
    let namespace = id.namespace();

    if let Some(ns) = namespace {
        if !store.namespaces().contains(ns) {
            let hint = match suggest(ns, store.namespaces()) {
                Some(close) => format!("Namespace `{}` not found. Did you mean: `{}`?", ns, close),
                None => format!("Namespace `{}` not found.", ns),
            };
            return Some(hint);
        }
    }

    let family = store.versions(namespace, &id.name);
    if family.is_empty() {
        let scope = namespace.map_or("the default namespace".to_string(), |ns| format!("namespace `{}`", ns));
        return Some(match suggest(&id.name, store.names(namespace)) {
            Some(close) => format!("`{}` not found in {}. Did you mean: `{}`?", id.name, scope, close),
            None => format!("`{}` not found in {}.", id.name, scope),
        });
    }

    let versions: Vec<String> = family.iter().map(|s| s.id.to_string()).collect();
    Some(format!("Available versions: [{}]", versions.join(", ")))
}

/// ID 를 저장소의 구체적인 ID 로 해석
///
/// - 버전 명시: 그대로 존재 여부만 확인
/// - 버전 생략: 버전 없는 단일 항목 또는 가장 높은 버전 (숫자 비교)
pub fn resolve(store: &SpecStore, id: &RegistryId) -> Result<RegistryId> {
    let family = store.versions(id.namespace(), &id.name);

    if let Some(version) = id.version {
        if !store.contains(id) {
            return Err(Error::unregistered(id.to_string(), missing_hint(store, id)));
        }

        let latest = family.iter().filter_map(|s| s.id.version).max();
        if let Some(latest) = latest.filter(|latest| *latest > version) {
            warn!(
                target: REGISTRY_TARGET,
                "The problem {} is out of date. You should consider upgrading to version `v{}`.",
                id,
                latest
            );
        }
        return Ok(id.clone());
    }

    if family.is_empty() {
        return Err(Error::unregistered(id.to_string(), missing_hint(store, id)));
    }

    let unversioned = family.iter().any(|s| s.id.version.is_none());
    let latest = family.iter().filter_map(|s| s.id.version).max();

    match (unversioned, latest) {
        (true, None) => Ok(id.with_version(None)),
        (false, Some(latest)) => Ok(id.with_version(Some(latest))),
        (true, Some(_)) => Err(Error::AmbiguousVersion { id: id.to_string() }),
        (false, None) => Err(Error::unregistered(id.to_string(), None)),
    }
}
