use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlatformEnv {
    Test,
    Live,
}

impl PlatformEnv {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformEnv::Test => "test",
            PlatformEnv::Live => "live",
        }
    }
}

impl FromStr for PlatformEnv {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(PlatformEnv::Test),
            "live" => Ok(PlatformEnv::Live),
            other => anyhow::bail!("unknown platform env {other:?}"),
        }
    }
}

/// Tenant and deployment stage under which credentials and data are partitioned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct PlatformScope {
    pub platform_id: String,
    pub env: PlatformEnv,
}

impl PlatformScope {
    pub fn new(platform_id: impl Into<String>, env: PlatformEnv) -> Self {
        Self {
            platform_id: platform_id.into(),
            env,
        }
    }

    /// Parses a public platform id such as `e12_live`. Returns `None` when malformed.
    pub fn parse_public_id(public_id: &str) -> Option<Self> {
        let rest = public_id.strip_prefix('e')?;
        let (id, env) = rest.split_once('_')?;
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let env = env.parse().ok()?;
        Some(Self::new(id, env))
    }

    pub fn public_id(&self) -> String {
        format!("e{}_{}", self.platform_id, self.env.as_str())
    }

    pub fn is_live(&self) -> bool {
        self.env == PlatformEnv::Live
    }
}

impl fmt::Display for PlatformScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.public_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_public_ids() {
        let scope = PlatformScope::parse_public_id("e12_live").unwrap();
        assert_eq!(scope.platform_id, "12");
        assert_eq!(scope.env, PlatformEnv::Live);
        assert_eq!(scope.public_id(), "e12_live");

        let test = PlatformScope::parse_public_id("e1_test").unwrap();
        assert!(!test.is_live());
    }

    #[test]
    fn rejects_malformed_public_ids() {
        for bad in ["", "e", "12_live", "e_live", "eab_live", "e1_prod", "e1live", "E1_live"] {
            assert!(PlatformScope::parse_public_id(bad).is_none(), "{bad}");
        }
    }
}
