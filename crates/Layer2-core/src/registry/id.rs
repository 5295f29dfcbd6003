//! Registry ID - `[namespace/]name[-vVERSION]` 문법
//!
//! VERSION 은 앞자리 0 이 없는 음이 아닌 정수이며 `u64` 범위까지 허용한다.

use optreg_foundation::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

static ID_PATTERN: OnceLock<Regex> = OnceLock::new();

fn id_pattern() -> &'static Regex {
    ID_PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?:(?P<namespace>[\w:.-]+)/)?(?P<name>[\w:.-]+?)(?:-v(?P<version>0|[1-9][0-9]*))?$",
        )
        .expect("registry id pattern is valid")
    })
}

/// 레지스트리 식별자
///
/// 필드 순서대로 정렬되므로 같은 (namespace, name) 의 항목은
/// BTreeMap 에서 연속된 구간을 이룬다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistryId {
    pub namespace: Option<String>,
    pub name: String,
    pub version: Option<u64>,
}

impl RegistryId {
    /// 검증 없이 생성 (파싱 가능한 ID 인지는 호출자 책임)
    pub fn new(namespace: Option<&str>, name: impl Into<String>, version: Option<u64>) -> Self {
        Self {
            namespace: namespace.map(String::from),
            name: name.into(),
            version,
        }
    }

    /// 문자열 파싱
    pub fn parse(raw: &str) -> Result<Self> {
        let caps = id_pattern().captures(raw).ok_or_else(|| {
            Error::malformed(
                raw,
                "expected `[namespace/]name[-vVERSION]` using word characters, ':', '-' or '.'",
            )
        })?;

        let namespace = caps.name("namespace").map(|m| m.as_str().to_string());
        let name = caps["name"].to_string();
        let version = match caps.name("version") {
            Some(m) => Some(
                m.as_str()
                    .parse::<u64>()
                    .map_err(|e| Error::malformed(raw, format!("version must fit in 64 bits (max {}): {}", u64::MAX, e)))?,
            ),
            None => None,
        };

        // 정규식이 버전을 잡지 못한 `-v...` 꼬리는 잘못된 버전 표기
        if version.is_none() {
            if let Some((_, last)) = name.rsplit_once('-') {
                if let Some(rest) = last.strip_prefix('v') {
                    if rest.is_empty() || rest.starts_with(|c: char| c.is_ascii_digit()) {
                        return Err(Error::malformed(
                            raw,
                            format!(
                                "version suffix `-{}` must be a non-negative integer without leading zeros",
                                last
                            ),
                        ));
                    }
                }
            }
        }

        Ok(Self {
            namespace,
            name,
            version,
        })
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// 버전만 바꾼 ID
    pub fn with_version(&self, version: Option<u64>) -> Self {
        Self {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            version,
        }
    }

    /// 네임스페이스만 바꾼 ID
    pub fn with_namespace(&self, namespace: Option<&str>) -> Self {
        Self {
            namespace: namespace.map(String::from),
            name: self.name.clone(),
            version: self.version,
        }
    }

    /// 버전을 뺀 `namespace/name`
    pub fn base(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}/{}", ns, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{}/", ns)?;
        }
        write!(f, "{}", self.name)?;
        if let Some(version) = self.version {
            write!(f, "-v{}", version)?;
        }
        Ok(())
    }
}

impl FromStr for RegistryId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RegistryId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<RegistryId> for String {
    fn from(id: RegistryId) -> Self {
        id.to_string()
    }
}
