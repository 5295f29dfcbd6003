//! # Problem
//!
//! 레지스트리가 생성하는 최적화 문제의 경계 인터페이스와 기본 래퍼
//!
//! - `traits.rs` - Problem, ProblemFactory, WrapperFactory, Metadata
//! - `wrappers.rs` - make() 가 적용하는 내장 래퍼

mod traits;
mod wrappers;

pub use traits::{
    factory, wrapper, FnFactory, Kwargs, Metadata, Problem, ProblemFactory, Step, WrapperFactory,
};
pub use wrappers::{Autoreset, OrderEnforcing, PassiveChecker, RenderCollection, TimeLimit};
