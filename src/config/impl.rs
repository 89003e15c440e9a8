use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 默认允许上传的 MIME 类型
const DEFAULT_ALLOWED_TYPES: &[&str] = &[
    "application/pdf",
    "application/zip",
    "application/x-zip-compressed",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "image/png",
    "image/jpeg",
    "text/plain",
];

impl AppConfig {
    /// 内置默认值，保证没有配置文件时也能启动
    fn with_defaults(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        builder
            .set_default("app.system_name", "Assignment Portal")?
            .set_default("app.environment", "development")?
            .set_default("app.log_level", "info")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.unix_socket_path", "")?
            .set_default("server.workers", 0)?
            .set_default("server.max_workers", 8)?
            .set_default("server.timeouts.client_request", 5000)?
            .set_default("server.timeouts.client_disconnect", 1000)?
            .set_default("server.timeouts.keep_alive", 30)?
            .set_default("server.limits.max_payload_size", 12 * 1024 * 1024)?
            .set_default("database.url", "sqlite://portal.db?mode=rwc")?
            .set_default("database.name", "")?
            .set_default("database.pool_size", 10)?
            .set_default("database.timeout", 30)?
            .set_default("session.ttl", 7 * 24 * 3600)?
            .set_default("password_reset.code_ttl", 600)?
            .set_default("password_reset.token_ttl", 1800)?
            .set_default("password_reset.max_attempts", 5)?
            .set_default("argon2.memory_cost", 19456)?
            .set_default("argon2.time_cost", 2)?
            .set_default("argon2.parallelism", 1)?
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .set_default("cors.max_age", 3600)?
            .set_default("upload.backend", "database")?
            .set_default("upload.dir", "uploads")?
            .set_default("upload.max_size", 10 * 1024 * 1024)?
            .set_default(
                "upload.allowed_types",
                DEFAULT_ALLOWED_TYPES
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>(),
            )?
            .set_default("mail.smtp_host", "")?
            .set_default("mail.smtp_port", 587)?
            .set_default("mail.smtp_username", "")?
            .set_default("mail.smtp_password", "")?
            .set_default("mail.smtp_tls", true)?
            .set_default("mail.from_address", "no-reply@localhost")?
            .set_default("mail.from_name", "Assignment Portal")
    }

    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::with_defaults(Config::builder())?
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖，如 PORTAL__SESSION__TTL
            .add_source(
                Environment::with_prefix("PORTAL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        // 支持从常用环境变量加载
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option(
                "server.port",
                std::env::var("SERVER_PORT")
                    .or_else(|_| std::env::var("PORT"))
                    .ok(),
            )?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("database.name", std::env::var("DATABASE_NAME").ok())?
            .set_override_option("session.ttl", std::env::var("SESSION_TTL").ok())?
            .set_override_option("upload.backend", std::env::var("FILE_STORAGE").ok())?
            .set_override_option("upload.dir", std::env::var("UPLOAD_DIR").ok())?
            .set_override_option("mail.smtp_host", std::env::var("SMTP_HOST").ok())?
            .set_override_option("mail.smtp_port", std::env::var("SMTP_PORT").ok())?
            .set_override_option("mail.smtp_username", std::env::var("SMTP_USER").ok())?
            .set_override_option("mail.smtp_password", std::env::var("SMTP_PASS").ok())?
            .set_override_option("mail.from_address", std::env::var("MAIL_FROM").ok())?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        // 处理工作线程数
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers);
        }

        if app_config.session.ttl <= 0 {
            return Err(ConfigError::Message(
                "session.ttl must be a positive number of seconds".to_string(),
            ));
        }

        Ok(app_config)
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }

    /// 是否配置了 SMTP
    pub fn mail_enabled(&self) -> bool {
        !self.mail.smtp_host.trim().is_empty()
    }

    /// 数据库连接 URL，服务器型数据库的 URL 缺少库名时追加 database.name
    pub fn database_url(&self) -> String {
        append_database_name(&self.database.url, &self.database.name)
    }
}

fn append_database_name(url: &str, name: &str) -> String {
    let name = name.trim();
    let is_server_url = ["postgres://", "postgresql://", "mysql://", "mariadb://"]
        .iter()
        .any(|scheme| url.starts_with(scheme));
    if name.is_empty() || !is_server_url {
        return url.to_string();
    }

    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (url, None),
    };
    // scheme://host[:port] 之后没有路径或路径为空时才追加
    let after_scheme = base.split_once("://").map(|(_, rest)| rest).unwrap_or(base);
    let has_path = after_scheme
        .split_once('/')
        .map(|(_, path)| !path.is_empty())
        .unwrap_or(false);
    if has_path {
        return url.to_string();
    }

    let base = base.trim_end_matches('/');
    match query {
        Some(q) => format!("{base}/{name}?{q}"),
        None => format!("{base}/{name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_database_name() {
        assert_eq!(
            append_database_name("postgres://u:p@localhost:5432", "portal"),
            "postgres://u:p@localhost:5432/portal"
        );
        assert_eq!(
            append_database_name("postgres://u:p@localhost:5432/", "portal"),
            "postgres://u:p@localhost:5432/portal"
        );
        assert_eq!(
            append_database_name("mysql://localhost/school", "portal"),
            "mysql://localhost/school"
        );
        assert_eq!(
            append_database_name("postgres://localhost?sslmode=disable", "portal"),
            "postgres://localhost/portal?sslmode=disable"
        );
        assert_eq!(
            append_database_name("sqlite://portal.db?mode=rwc", "portal"),
            "sqlite://portal.db?mode=rwc"
        );
        assert_eq!(
            append_database_name("postgres://localhost", ""),
            "postgres://localhost"
        );
    }

    #[test]
    fn test_defaults_deserialize() {
        let config: AppConfig = AppConfig::with_defaults(Config::builder())
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .expect("defaults should form a complete configuration");
        assert_eq!(config.session.ttl, 7 * 24 * 3600);
        assert_eq!(config.password_reset.max_attempts, 5);
        assert_eq!(config.upload.backend, "database");
        assert!(
            config
                .upload
                .allowed_types
                .iter()
                .any(|t| t == "application/pdf")
        );
        assert!(config.mail.smtp_host.is_empty());
    }
}
