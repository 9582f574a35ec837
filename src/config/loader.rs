//! 配置加载器实现
//!
//! 提供TOML配置文件解析、环境变量替换和默认路径查找功能

use crate::config::types::{validate_config, Config};
use crate::error::{ConfigError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};

/// 当前目录下的配置文件名
const LOCAL_CONFIG_FILE: &str = "students.toml";

/// 配置加载器trait，定义配置加载接口
pub trait ConfigLoader {
    /// 从文件加载配置
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回
    /// * `Result<Config>` - 加载的配置或错误
    fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Config>;

    /// 从字符串加载配置
    fn load_from_string(&self, content: &str) -> Result<Config>;

    /// 验证配置
    fn validate(&self, config: &Config) -> Result<()>;
}

/// TOML配置加载器实现
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl TomlConfigLoader {
    /// 创建新的TOML配置加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否启用 `${VAR}` 环境变量替换
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 替换字符串中的环境变量
    fn substitute_env_vars(&self, content: &str) -> Result<String> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        // 匹配 ${VAR_NAME} 格式的环境变量
        let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| ConfigError::ParseError(format!("正则表达式错误: {e}")))?;

        let mut result = content.to_string();

        for captures in env_var_regex.captures_iter(content) {
            let full_match = &captures[0];
            let var_name = &captures[1];

            let value = std::env::var(var_name).map_err(|_| ConfigError::EnvVarError {
                var: var_name.to_string(),
            })?;
            result = result.replace(full_match, &value);
        }

        Ok(result)
    }

    /// 解析TOML内容
    fn parse_toml(&self, content: &str) -> Result<Config> {
        let processed_content = self.substitute_env_vars(content)?;

        let config: Config = toml::from_str(&processed_content)
            .map_err(|e| ConfigError::ParseError(format!("TOML解析失败: {e}")))?;

        Ok(config)
    }
}

impl Default for TomlConfigLoader {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConfigLoader for TomlConfigLoader {
    fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ParseError(format!("读取文件失败: {e}")))?;

        let config = self.parse_toml(&content)?;
        self.validate(&config)?;

        Ok(config)
    }

    fn load_from_string(&self, content: &str) -> Result<Config> {
        let config = self.parse_toml(content)?;
        self.validate(&config)?;

        Ok(config)
    }

    fn validate(&self, config: &Config) -> Result<()> {
        validate_config(config).map_err(|e| ConfigError::ValidationError(e).into())
    }
}

/// 获取默认配置文件路径
///
/// Linux: `~/.config/students/config.toml`，
/// macOS: `~/Library/Application Support/students/config.toml`，
/// Windows: `%APPDATA%\students\config.toml`
pub fn get_default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|config_dir| config_dir.join("students").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
}

/// 获取默认数据库文件路径
pub fn get_default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|data_dir| data_dir.join("students").join("students.db"))
        .unwrap_or_else(|| PathBuf::from("students.db"))
}

/// 查找存在的配置文件：先当前目录，再用户配置目录
fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    let default_path = get_default_config_path();
    default_path.exists().then_some(default_path)
}

/// 确定要加载的配置文件
///
/// 显式指定的路径原样返回（是否存在由加载时检查）；
/// 未指定时查找默认位置，都不存在返回 `None`。
pub fn locate_config(explicit_path: Option<&Path>) -> Option<PathBuf> {
    explicit_path
        .map(Path::to_path_buf)
        .or_else(find_config_file)
}

/// 加载配置
///
/// 路径必须存在；`None` 表示没有配置文件，使用默认配置。
/// 此时日志系统尚未初始化，调用方负责记录加载结果。
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => TomlConfigLoader::default().load_from_file(path),
        None => Ok(Config::default()),
    }
}

/// 确定数据库连接字符串
///
/// 优先级：命令行 `--db` > 配置文件 `database.url` > 默认数据库路径
pub fn resolve_database_url(cli_db: Option<&str>, config: &Config) -> String {
    if let Some(db) = cli_db {
        return db.to_string();
    }

    if let Some(ref url) = config.database.url {
        return url.clone();
    }

    get_default_database_path().to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TEST_CONFIG_TOML: &str = r#"
[database]
url = "/var/lib/students/students.db"

[logging]
level = "info"
json_format = true

[logging.modules]
"students::storage" = "debug"

[defaults]
group = "101"
"#;

    const TEST_CONFIG_WITH_ENV_VARS: &str = r#"
[database]
url = "${STUDENTS_TEST_DATA_DIR}/students.db"

[defaults]
group = "${STUDENTS_TEST_GROUP}"
"#;

    #[test]
    fn test_toml_parsing() {
        let loader = TomlConfigLoader::new(false);
        let config = loader.load_from_string(TEST_CONFIG_TOML).unwrap();

        assert_eq!(
            config.database.url.as_deref(),
            Some("/var/lib/students/students.db")
        );
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.json_format);
        assert_eq!(
            config.logging.modules.get("students::storage").map(String::as_str),
            Some("debug")
        );
        assert_eq!(config.defaults.group.as_deref(), Some("101"));
    }

    #[test]
    fn test_invalid_module_log_level_rejected() {
        let loader = TomlConfigLoader::new(false);
        let result = loader.load_from_string("[logging.modules]\nrusqlite = \"trace\"\n");

        assert!(result.is_err());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let loader = TomlConfigLoader::new(false);
        let config = loader.load_from_string("").unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let loader = TomlConfigLoader::new(false);
        let result = loader.load_from_string("[logging]\nlevel = \"loud\"\n");

        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_env_var_substitution() {
        env::set_var("STUDENTS_TEST_DATA_DIR", "/tmp/students-data");
        env::set_var("STUDENTS_TEST_GROUP", "202");

        let loader = TomlConfigLoader::new(true);
        let config = loader.load_from_string(TEST_CONFIG_WITH_ENV_VARS).unwrap();

        assert_eq!(
            config.database.url.as_deref(),
            Some("/tmp/students-data/students.db")
        );
        assert_eq!(config.defaults.group.as_deref(), Some("202"));

        env::remove_var("STUDENTS_TEST_DATA_DIR");
        env::remove_var("STUDENTS_TEST_GROUP");
    }

    #[test]
    #[serial]
    fn test_env_var_substitution_missing_var() {
        env::remove_var("STUDENTS_TEST_MISSING_VAR");
        let content = "[database]\nurl = \"${STUDENTS_TEST_MISSING_VAR}\"\n";

        let loader = TomlConfigLoader::new(true);
        let result = loader.load_from_string(content);

        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("STUDENTS_TEST_MISSING_VAR"));
        }
    }

    #[test]
    fn test_substitute_env_vars_disabled() {
        let loader = TomlConfigLoader::new(false);
        let content = "test ${VAR} content";
        let result = loader.substitute_env_vars(content).unwrap();
        assert_eq!(result, content);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(TEST_CONFIG_TOML.as_bytes()).unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.defaults.group.as_deref(), Some("101"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = load_config(Some(Path::new("/nonexistent/students.toml")));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("/nonexistent/students.toml"));
    }

    #[test]
    fn test_locate_config_prefers_explicit_path() {
        let explicit = Path::new("/nonexistent/students.toml");
        assert_eq!(locate_config(Some(explicit)), Some(explicit.to_path_buf()));
    }

    #[test]
    fn test_load_config_without_file_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), Config::default());
    }

    #[test]
    fn test_resolve_database_url_precedence() {
        let mut config = Config::default();
        config.database.url = Some("from-config.db".to_string());

        assert_eq!(resolve_database_url(Some(":memory:"), &config), ":memory:");
        assert_eq!(resolve_database_url(None, &config), "from-config.db");

        let fallback = resolve_database_url(None, &Config::default());
        assert!(fallback.ends_with("students.db"));
    }

    #[test]
    fn test_get_default_config_path() {
        let path = get_default_config_path();
        assert!(path.to_string_lossy().contains("students"));
        assert!(path.to_string_lossy().ends_with(".toml"));
    }
}
