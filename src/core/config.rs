use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::simd::VectorWidth;

/// Environment variable that overrides `simd.policy`.
pub const ENV_SIMD: &str = "MSGPACK_D_SIMD";

/// File name looked up in the current directory by
/// [`CodecConfig::load_with_overrides`].
pub const LOCAL_CONFIG: &str = "msgpack-d.toml";

/// Errors raised while loading or parsing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown SIMD policy '{0}' (expected auto, scalar, 128, 256 or 512)")]
    InvalidPolicy(String),
}

/// Which vector width the codec may use.
///
/// `Auto` takes whatever the CPU supports; an explicit width is an upper
/// bound and is clamped to the detected width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum SimdPolicy {
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "scalar")]
    Scalar,
    #[serde(rename = "128")]
    V128,
    #[serde(rename = "256")]
    V256,
    #[serde(rename = "512")]
    V512,
}

impl SimdPolicy {
    /// Requested upper bound, or `None` for `Auto`.
    pub fn max_width(self) -> Option<VectorWidth> {
        match self {
            SimdPolicy::Auto => None,
            SimdPolicy::Scalar => Some(VectorWidth::Scalar),
            SimdPolicy::V128 => Some(VectorWidth::V128),
            SimdPolicy::V256 => Some(VectorWidth::V256),
            SimdPolicy::V512 => Some(VectorWidth::V512),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SimdPolicy::Auto => "auto",
            SimdPolicy::Scalar => "scalar",
            SimdPolicy::V128 => "128",
            SimdPolicy::V256 => "256",
            SimdPolicy::V512 => "512",
        }
    }
}

impl FromStr for SimdPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(SimdPolicy::Auto),
            "scalar" | "none" | "off" => Ok(SimdPolicy::Scalar),
            "128" | "sse" | "ssse3" | "neon" => Ok(SimdPolicy::V128),
            "256" | "avx2" => Ok(SimdPolicy::V256),
            "512" | "avx512" => Ok(SimdPolicy::V512),
            other => Err(ConfigError::InvalidPolicy(other.to_string())),
        }
    }
}

impl std::fmt::Display for SimdPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[simd]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimdSettings {
    pub policy: SimdPolicy,
    /// Arrays shorter than this are encoded entirely scalar.
    pub min_elements: usize,
    /// Peel a scalar prefix so vector loads start on a register boundary.
    pub align_body: bool,
}

impl Default for SimdSettings {
    fn default() -> Self {
        Self {
            policy: SimdPolicy::Auto,
            min_elements: crate::simd::SimdStrategy::DEFAULT_MIN_ELEMENTS,
            align_body: true,
        }
    }
}

/// `[cancellation]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CancellationSettings {
    /// Elements encoded between cancellation checks in the vector body.
    pub poll_interval: usize,
}

impl Default for CancellationSettings {
    fn default() -> Self {
        Self {
            poll_interval: crate::simd::SimdStrategy::DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Codec configuration loaded from TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CodecConfig {
    pub simd: SimdSettings,
    pub cancellation: CancellationSettings,
}

impl CodecConfig {
    /// Parses configuration from TOML content. Missing keys keep their
    /// defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads the built-in configuration from the embedded default.toml.
    pub fn load_default() -> Result<Self, ConfigError> {
        let content = include_str!("../../config/default.toml");
        Self::from_toml(content)
    }

    /// Loads configuration from a custom file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&read_file(path)?)
    }

    /// Loads configuration with user overrides layered on the built-in
    /// defaults.
    ///
    /// Searches in priority order:
    /// 1. Built-in config (from the embedded default.toml)
    /// 2. User config (~/.config/msgpack-d/config.toml)
    /// 3. Local config (./msgpack-d.toml in the current directory)
    /// 4. The `MSGPACK_D_SIMD` environment variable
    ///
    /// Later sources only replace the keys they set. A file that cannot be
    /// read or parsed is skipped with a warning.
    pub fn load_with_overrides() -> Result<Self, ConfigError> {
        let mut merged: toml::Table =
            toml::from_str(include_str!("../../config/default.toml"))?;

        let mut sources = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            sources.push(config_dir.join("msgpack-d").join("config.toml"));
        }
        sources.push(PathBuf::from(LOCAL_CONFIG));

        for path in sources.iter().filter(|p| p.exists()) {
            match read_file(path).and_then(|c| Ok(toml::from_str::<toml::Table>(&c)?)) {
                Ok(overlay) => {
                    tracing::debug!(path = %path.display(), "applying config overrides");
                    merge_tables(&mut merged, overlay);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                }
            }
        }

        let mut config: CodecConfig = toml::Value::Table(merged).try_into()?;
        config.apply_env(std::env::var(ENV_SIMD).ok().as_deref());
        Ok(config)
    }

    /// Applies an `MSGPACK_D_SIMD` value, warning on an unknown policy.
    pub fn apply_env(&mut self, simd: Option<&str>) {
        let Some(value) = simd else {
            return;
        };
        match value.parse() {
            Ok(policy) => self.simd.policy = policy,
            Err(e) => tracing::warn!(variable = ENV_SIMD, error = %e, "ignoring environment override"),
        }
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Recursively overlays `overlay` onto `base`: nested tables merge, any
/// other value replaces.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_config() {
        let config = CodecConfig::load_default().unwrap();
        assert_eq!(config, CodecConfig::default());
        assert_eq!(config.simd.policy, SimdPolicy::Auto);
        assert_eq!(config.simd.min_elements, 32);
        assert!(config.simd.align_body);
        assert_eq!(config.cancellation.poll_interval, 1024);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CodecConfig::from_toml("[simd]\npolicy = \"256\"\n").unwrap();
        assert_eq!(config.simd.policy, SimdPolicy::V256);
        assert_eq!(config.simd.min_elements, 32);
        assert_eq!(config.cancellation, CancellationSettings::default());
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let err = CodecConfig::from_toml("[simd]\npolicy = \"1024\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(matches!(
            "avx1024".parse::<SimdPolicy>(),
            Err(ConfigError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn test_policy_parse_aliases() {
        assert_eq!("AVX2".parse::<SimdPolicy>().unwrap(), SimdPolicy::V256);
        assert_eq!(" scalar ".parse::<SimdPolicy>().unwrap(), SimdPolicy::Scalar);
        assert_eq!("neon".parse::<SimdPolicy>().unwrap(), SimdPolicy::V128);
        for policy in [
            SimdPolicy::Auto,
            SimdPolicy::Scalar,
            SimdPolicy::V128,
            SimdPolicy::V256,
            SimdPolicy::V512,
        ] {
            assert_eq!(policy.as_str().parse::<SimdPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn test_max_width() {
        assert_eq!(SimdPolicy::Auto.max_width(), None);
        assert_eq!(SimdPolicy::Scalar.max_width(), Some(VectorWidth::Scalar));
        assert_eq!(SimdPolicy::V512.max_width(), Some(VectorWidth::V512));
    }

    #[test]
    fn test_merge_tables_is_deep() {
        let mut base: toml::Table =
            toml::from_str(include_str!("../../config/default.toml")).unwrap();
        let overlay: toml::Table = toml::from_str("[simd]\nmin_elements = 8\n").unwrap();
        merge_tables(&mut base, overlay);

        let config: CodecConfig = toml::Value::Table(base).try_into().unwrap();
        assert_eq!(config.simd.min_elements, 8);
        assert_eq!(config.simd.policy, SimdPolicy::Auto);
        assert!(config.simd.align_body);
    }

    #[test]
    fn test_env_override() {
        let mut config = CodecConfig::default();
        config.apply_env(Some("128"));
        assert_eq!(config.simd.policy, SimdPolicy::V128);

        config.apply_env(Some("bogus"));
        assert_eq!(config.simd.policy, SimdPolicy::V128);

        config.apply_env(None);
        assert_eq!(config.simd.policy, SimdPolicy::V128);
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("msgpack-d-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[cancellation]\npoll_interval = 64\n").unwrap();

        let config = CodecConfig::load_from_file(&path).unwrap();
        assert_eq!(config.cancellation.poll_interval, 64);

        std::fs::remove_dir_all(&dir).unwrap();
        assert!(matches!(
            CodecConfig::load_from_file(&path),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_serializes_to_toml() {
        let text = toml::to_string(&CodecConfig::default()).unwrap();
        assert!(text.contains("policy = \"auto\""));
        assert_eq!(CodecConfig::from_toml(&text).unwrap(), CodecConfig::default());
    }
}
