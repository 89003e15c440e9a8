use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub password_reset: PasswordResetConfig,
    pub argon2: Argon2Config,
    pub cors: CorsConfig,
    pub upload: UploadConfig,
    pub mail: MailConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub unix_socket_path: String,
    pub workers: usize,
    pub max_workers: usize,
    pub timeouts: TimeoutConfig,
    pub limits: LimitConfig,
}

/// 超时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub client_request: u64,
    pub client_disconnect: u64,
    pub keep_alive: u64,
}

/// 限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    pub max_payload_size: usize,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,  // 数据库连接 URL（从 scheme 自动推断类型）
    pub name: String, // 数据库名，URL 未包含库名时追加
    pub pool_size: u32,
    pub timeout: u64, // 连接超时 (秒)
}

/// 会话配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub ttl: i64, // 会话有效期 (秒)
}

/// 密码重置配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetConfig {
    pub code_ttl: i64,  // 验证码有效期 (秒)
    pub token_ttl: i64, // 重置令牌有效期 (秒)
    pub max_attempts: i32,
}

/// Argon2 参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argon2Config {
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub max_age: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub backend: String,            // 文件存储后端: database / local
    pub dir: String,                // local 后端的上传目录
    pub max_size: usize,            // 单文件最大字节数
    pub allowed_types: Vec<String>, // 允许的 MIME 类型
}

/// 邮件配置，smtp_host 为空时不发送邮件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    pub smtp_password: String,
    pub smtp_tls: bool,
    pub from_address: String,
    pub from_name: String,
}
