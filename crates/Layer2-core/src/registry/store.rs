//! Spec Store - RegistryId -> ProblemSpec 저장소

use super::entry::ProblemSpec;
use super::id::RegistryId;
use optreg_foundation::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use std::sync::Arc;

/// 명세 저장소
///
/// BTreeMap 이라 순회 순서가 저장 상태에 대해 항상 같다.
#[derive(Debug, Default, Clone)]
pub struct SpecStore {
    specs: BTreeMap<RegistryId, Arc<ProblemSpec>>,
}

/// 같은 (namespace, name) 의 모든 버전을 덮는 키 구간
fn family(namespace: Option<&str>, name: &str) -> RangeInclusive<RegistryId> {
    RegistryId::new(namespace, name, None)..=RegistryId::new(namespace, name, Some(u64::MAX))
}

impl SpecStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 명세 저장
    ///
    /// 같은 ID 가 있으면 교체하고 이전 명세를 반환한다.
    /// 버전 있는 항목과 버전 없는 항목이 섞이면 실패한다.
    pub fn insert(&mut self, spec: ProblemSpec) -> Result<Option<Arc<ProblemSpec>>> {
        let id = spec.id.clone();
        let siblings = self.versions(id.namespace(), &id.name);

        match id.version {
            Some(_) => {
                if siblings.iter().any(|s| s.id.version.is_none()) {
                    return Err(Error::conflict(
                        id.to_string(),
                        format!(
                            "an unversioned problem `{}` is already registered; \
                             versioned and unversioned ids cannot coexist",
                            id.base()
                        ),
                    ));
                }
            }
            None => {
                if let Some(versioned) = siblings.iter().find(|s| s.id.version.is_some()) {
                    return Err(Error::conflict(
                        id.to_string(),
                        format!(
                            "versioned problem `{}` is already registered; \
                             versioned and unversioned ids cannot coexist",
                            versioned.id
                        ),
                    ));
                }
            }
        }

        Ok(self.specs.insert(id, Arc::new(spec)))
    }

    /// 정확한 ID 조회
    pub fn get(&self, id: &RegistryId) -> Option<Arc<ProblemSpec>> {
        self.specs.get(id).cloned()
    }

    pub fn contains(&self, id: &RegistryId) -> bool {
        self.specs.contains_key(id)
    }

    /// (namespace, name) 의 모든 항목 (버전 없음이 먼저, 이후 버전 오름차순)
    pub fn versions(&self, namespace: Option<&str>, name: &str) -> Vec<Arc<ProblemSpec>> {
        self.specs
            .range(family(namespace, name))
            .map(|(_, spec)| Arc::clone(spec))
            .collect()
    }

    /// 네임스페이스의 모든 명세 (ID 순)
    pub fn all_in_namespace(&self, namespace: Option<&str>) -> Vec<Arc<ProblemSpec>> {
        self.specs
            .iter()
            .filter(|(id, _)| id.namespace() == namespace)
            .map(|(_, spec)| Arc::clone(spec))
            .collect()
    }

    /// 등록된 네임스페이스 (네임스페이스 없는 항목 제외)
    pub fn namespaces(&self) -> BTreeSet<String> {
        self.specs.keys().filter_map(|id| id.namespace.clone()).collect()
    }

    /// 네임스페이스 안의 이름들
    pub fn names(&self, namespace: Option<&str>) -> BTreeSet<String> {
        self.specs
            .keys()
            .filter(|id| id.namespace() == namespace)
            .map(|id| id.name.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ProblemSpec>> {
        self.specs.values()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn clear(&mut self) {
        self.specs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registration;

    fn spec(raw: &str) -> ProblemSpec {
        Registration::new(raw, "acc_problems:Steer").into_spec(RegistryId::parse(raw).unwrap())
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = SpecStore::new();
        assert!(store.insert(spec("acc/Steer-v1")).unwrap().is_none());

        let id = RegistryId::parse("acc/Steer-v1").unwrap();
        assert_eq!(store.get(&id).unwrap().id, id);
        assert!(store.get(&RegistryId::parse("acc/Steer-v2").unwrap()).is_none());
    }

    #[test]
    fn test_identical_id_replaces() {
        let mut store = SpecStore::new();
        store.insert(spec("acc/Steer-v1")).unwrap();
        let previous = store.insert(spec("acc/Steer-v1")).unwrap();

        assert!(previous.is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_versioned_unversioned_conflict() {
        let mut store = SpecStore::new();
        store.insert(spec("acc/Steer")).unwrap();
        assert!(matches!(
            store.insert(spec("acc/Steer-v1")),
            Err(Error::RegistrationConflict { .. })
        ));

        let mut store = SpecStore::new();
        store.insert(spec("acc/Steer-v1")).unwrap();
        assert!(matches!(
            store.insert(spec("acc/Steer")),
            Err(Error::RegistrationConflict { .. })
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_versions_are_scoped_to_family() {
        let mut store = SpecStore::new();
        for raw in ["acc/Steer-v2", "acc/Steer-v10", "acc/Steer-v1", "acc/Steerx-v3", "Steer-v4", "toy/Steer-v5"] {
            store.insert(spec(raw)).unwrap();
        }

        let versions: Vec<Option<u64>> = store
            .versions(Some("acc"), "Steer")
            .iter()
            .map(|s| s.id.version)
            .collect();
        assert_eq!(versions, vec![Some(1), Some(2), Some(10)]);

        assert_eq!(store.all_in_namespace(Some("acc")).len(), 4);
        assert_eq!(store.all_in_namespace(None).len(), 1);
        assert_eq!(
            store.namespaces().into_iter().collect::<Vec<_>>(),
            vec!["acc".to_string(), "toy".to_string()]
        );
        assert!(store.names(Some("acc")).contains("Steerx"));
    }
}
