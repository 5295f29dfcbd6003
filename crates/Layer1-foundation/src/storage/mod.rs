//! Storage module for optreg
//!
//! - `json`: JSON - 레지스트리 설정 파일 저장/로드

mod json;

// JSON Storage (범용)
pub use json::{ConfigLayer, JsonStore, PROJECT_DIR};
