//! Error types for optreg
//!
//! 레지스트리의 모든 에러를 중앙에서 관리

use std::sync::Arc;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// optreg 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // ID 문법 관련
    // ========================================================================
    #[error("Malformed registry id '{id}': {reason}")]
    MalformedId { id: String, reason: String },

    // ========================================================================
    // 등록 관련
    // ========================================================================
    #[error("Registration conflict for '{id}': {reason}")]
    RegistrationConflict { id: String, reason: String },

    #[error("Namespace mismatch: '{id}' registered while loading namespace '{expected}'")]
    NamespaceMismatch { id: String, expected: String },

    // ========================================================================
    // 조회 관련
    // ========================================================================
    #[error("No registered problem with id '{id}'{}", format_hint(.hint))]
    UnregisteredId { id: String, hint: Option<String> },

    #[error("Ambiguous version for '{id}': both versioned and unversioned entries exist")]
    AmbiguousVersion { id: String },

    // ========================================================================
    // 플러그인 로드 관련
    // ========================================================================
    #[error("Plugin for namespace '{namespace}' failed to load: {source}")]
    PluginLoad {
        namespace: String,
        #[source]
        source: Arc<Error>,
    },

    // ========================================================================
    // Entry point 관련
    // ========================================================================
    #[error("Cannot import module '{module}': {reason}")]
    EntryPointImport { module: String, reason: String },

    #[error("Module '{module}' has no attribute '{attr}'{}", format_hint(.hint))]
    EntryPointAttribute {
        module: String,
        attr: String,
        hint: Option<String>,
    },

    // ========================================================================
    // 생성/실행 관련
    // ========================================================================
    #[error("Unsupported render mode '{mode}' for '{id}', supported modes: [{}]", .supported.join(", "))]
    UnsupportedRenderMode {
        id: String,
        mode: String,
        supported: Vec<String>,
    },

    #[error("Call order violated: {0}")]
    OrderViolation(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 문제 생성자/래퍼가 발생시킨 에러 (변형 없이 전달)
    #[error(transparent)]
    Problem(#[from] anyhow::Error),

    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_hint(hint: &Option<String>) -> String {
    match hint {
        Some(h) => format!(". {}", h),
        None => String::new(),
    }
}

impl Error {
    /// 재시도 가능한 에러인지 확인
    ///
    /// 레지스트리 에러는 재시도해도 결과가 같으므로 항상 false.
    /// 실패한 플러그인 로드도 캐시되어 다시 시도하지 않는다.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::Interrupted | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }

    /// 사용자에게 보여줄 수 있는 에러인지 확인
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::MalformedId { .. }
                | Error::RegistrationConflict { .. }
                | Error::UnregisteredId { .. }
                | Error::NamespaceMismatch { .. }
                | Error::UnsupportedRenderMode { .. }
                | Error::InvalidArgument(_)
        )
    }

    /// 캐시된 플러그인 로드 실패라면 원인 에러를 반환
    pub fn load_cause(&self) -> Option<&Error> {
        match self {
            Error::PluginLoad { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }

    /// MalformedId 에러 생성 헬퍼
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedId {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// RegistrationConflict 에러 생성 헬퍼
    pub fn conflict(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::RegistrationConflict {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// UnregisteredId 에러 생성 헬퍼
    pub fn unregistered(id: impl Into<String>, hint: Option<String>) -> Self {
        Error::UnregisteredId {
            id: id.into(),
            hint,
        }
    }

    /// EntryPointImport 에러 생성 헬퍼
    pub fn import(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::EntryPointImport {
            module: module.into(),
            reason: reason.into(),
        }
    }

    /// EntryPointAttribute 에러 생성 헬퍼
    pub fn attribute(module: impl Into<String>, attr: impl Into<String>) -> Self {
        Error::EntryPointAttribute {
            module: module.into(),
            attr: attr.into(),
            hint: None,
        }
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
