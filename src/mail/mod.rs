//! 邮件发送
//!
//! 目前只有一种邮件：找回密码验证码。配置了 `mail.smtp_host` 时通过 SMTP 发送，
//! 否则退化为只写日志的实现。

mod smtp;

pub use smtp::SmtpMailer;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::Result;

#[async_trait]
pub trait Mailer: Send + Sync {
    /// 发送找回密码验证码
    async fn send_reset_code(
        &self,
        to: &str,
        name: &str,
        code: &str,
        ttl_minutes: i64,
    ) -> Result<()>;
}

/// 未配置 SMTP 时使用，只记录日志
pub struct LogMailer {
    reveal_code: bool,
}

impl LogMailer {
    /// `reveal_code` 为 true 时日志中包含验证码本身，仅用于开发环境
    pub fn new(reveal_code: bool) -> Self {
        Self { reveal_code }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_reset_code(
        &self,
        to: &str,
        _name: &str,
        code: &str,
        ttl_minutes: i64,
    ) -> Result<()> {
        if self.reveal_code {
            info!(
                "Password reset code for {}: {} (valid for {} minutes)",
                to, code, ttl_minutes
            );
        } else {
            info!("Password reset code issued for {} (mail delivery disabled)", to);
        }
        Ok(())
    }
}

/// 根据配置选择邮件实现
pub fn create_mailer(config: &AppConfig) -> Result<Arc<dyn Mailer>> {
    if config.mail_enabled() {
        let mailer = SmtpMailer::new(&config.mail)?;
        info!(
            "SMTP mailer configured: {}:{}",
            config.mail.smtp_host, config.mail.smtp_port
        );
        Ok(Arc::new(mailer))
    } else {
        warn!("SMTP is not configured, password reset codes will only be logged");
        Ok(Arc::new(LogMailer::new(config.is_development())))
    }
}

/// 记录所有发送请求，测试中用来读取验证码
#[cfg(test)]
#[derive(Default)]
pub struct RecordingMailer {
    sent: std::sync::Mutex<Vec<SentMail>>,
    fail: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub code: String,
}

#[cfg(test)]
impl RecordingMailer {
    /// 之后的发送全部失败
    pub fn fail_all(&self) {
        self.fail.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn last_code_for(&self, to: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|m| m.to == to)
            .map(|m| m.code)
    }
}

#[cfg(test)]
#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_reset_code(
        &self,
        to: &str,
        _name: &str,
        code: &str,
        _ttl_minutes: i64,
    ) -> Result<()> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(crate::errors::PortalError::mail("SMTP unavailable"));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentMail {
                to: to.to_string(),
                code: code.to_string(),
            });
        }
        Ok(())
    }
}
