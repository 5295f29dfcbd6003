//! Entry Point - 직접 참조 또는 `module:attr` 간접 참조
//!
//! 간접 참조는 등록 시점이 아니라 make()/spec() 시점에 해석된다.

use super::traits::Attr;
use crate::problem::{ProblemFactory, WrapperFactory};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// EntryPoint<T>
// ============================================================================

/// 생성 가능한 객체에 대한 참조
pub enum EntryPoint<T: ?Sized> {
    /// 이미 생성 가능한 객체
    Direct(Arc<T>),

    /// 모듈 import 후 속성을 찾아야 하는 참조
    Indirect { module: String, attr: String },
}

/// 문제 생성자 entry point
pub type ProblemEntryPoint = EntryPoint<dyn ProblemFactory>;

/// 래퍼 생성자 entry point
pub type WrapperEntryPoint = EntryPoint<dyn WrapperFactory>;

impl<T: ?Sized> EntryPoint<T> {
    /// `module:attr` 문자열로부터 생성
    ///
    /// `:` 가 없으면 속성 이름이 비어 있게 되고, 해석 시점에 실패한다.
    pub fn indirect(reference: &str) -> Self {
        let (module, attr) = reference.split_once(':').unwrap_or((reference, ""));
        Self::Indirect {
            module: module.to_string(),
            attr: attr.to_string(),
        }
    }

    pub fn is_indirect(&self) -> bool {
        matches!(self, Self::Indirect { .. })
    }

    /// 간접 참조의 모듈 이름
    pub fn module(&self) -> Option<&str> {
        match self {
            Self::Direct(_) => None,
            Self::Indirect { module, .. } => Some(module),
        }
    }
}

impl<T: ?Sized> Clone for EntryPoint<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Direct(value) => Self::Direct(Arc::clone(value)),
            Self::Indirect { module, attr } => Self::Indirect {
                module: module.clone(),
                attr: attr.clone(),
            },
        }
    }
}

impl<T: ?Sized> fmt::Display for EntryPoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => write!(f, "<direct>"),
            Self::Indirect { module, attr } => write!(f, "{}:{}", module, attr),
        }
    }
}

impl<T: ?Sized> fmt::Debug for EntryPoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("Direct(..)"),
            Self::Indirect { module, attr } => f
                .debug_struct("Indirect")
                .field("module", module)
                .field("attr", attr)
                .finish(),
        }
    }
}

impl<T: ?Sized> From<&str> for EntryPoint<T> {
    fn from(reference: &str) -> Self {
        Self::indirect(reference)
    }
}

impl<T: ?Sized> From<String> for EntryPoint<T> {
    fn from(reference: String) -> Self {
        Self::indirect(&reference)
    }
}

impl<T: ?Sized> From<Arc<T>> for EntryPoint<T> {
    fn from(value: Arc<T>) -> Self {
        Self::Direct(value)
    }
}

// ============================================================================
// Resolvable - 모듈 속성에서 꺼낼 수 있는 타입
// ============================================================================

/// 모듈 속성 (`Attr`) 으로부터 얻을 수 있는 대상
pub trait Resolvable: Send + Sync {
    /// 에러 메시지용 종류 이름
    const KIND: &'static str;

    fn from_attr(attr: Attr) -> Option<Arc<Self>>;
}

impl Resolvable for dyn ProblemFactory {
    const KIND: &'static str = "problem constructor";

    fn from_attr(attr: Attr) -> Option<Arc<Self>> {
        match attr {
            Attr::Factory(factory) => Some(factory),
            _ => None,
        }
    }
}

impl Resolvable for dyn WrapperFactory {
    const KIND: &'static str = "wrapper constructor";

    fn from_attr(attr: Attr) -> Option<Arc<Self>> {
        match attr {
            Attr::Wrapper(wrapper) => Some(wrapper),
            _ => None,
        }
    }
}
