//! Static Module - 빌더로 구성하는 모듈

use super::traits::{Attr, LoaderFn, Module};
use crate::problem::{ProblemFactory, WrapperFactory};
use crate::registry::Registrar;
use optreg_foundation::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

/// 속성 테이블과 선택적 import 훅으로 이루어진 모듈
pub struct StaticModule {
    name: String,
    attrs: BTreeMap<String, Attr>,
    on_import: Option<LoaderFn>,
}

impl StaticModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: BTreeMap::new(),
            on_import: None,
        }
    }

    /// 빌더 패턴: 문제 생성자 속성 추가
    pub fn with_factory(mut self, name: impl Into<String>, factory: Arc<dyn ProblemFactory>) -> Self {
        self.attrs.insert(name.into(), Attr::Factory(factory));
        self
    }

    /// 빌더 패턴: 래퍼 생성자 속성 추가
    pub fn with_wrapper(mut self, name: impl Into<String>, wrapper: Arc<dyn WrapperFactory>) -> Self {
        self.attrs.insert(name.into(), Attr::Wrapper(wrapper));
        self
    }

    /// 빌더 패턴: 등록 함수 속성 추가
    pub fn with_loader<F>(mut self, name: impl Into<String>, loader: F) -> Self
    where
        F: Fn(&Registrar<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.attrs.insert(name.into(), Attr::Loader(Arc::new(loader)));
        self
    }

    /// 빌더 패턴: import 부수효과 설정
    pub fn on_import<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Registrar<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.on_import = Some(Arc::new(hook));
        self
    }
}

impl Module for StaticModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn import(&self, registrar: &Registrar<'_>) -> Result<()> {
        match &self.on_import {
            Some(hook) => hook(registrar),
            None => Ok(()),
        }
    }

    fn attr(&self, name: &str) -> Option<Attr> {
        self.attrs.get(name).cloned()
    }

    fn attr_names(&self) -> Vec<String> {
        self.attrs.keys().cloned().collect()
    }
}
