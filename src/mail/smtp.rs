use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::info;

use super::Mailer;
use crate::config::MailConfig;
use crate::errors::Result;

/// SMTP 邮件发送
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let from: Mailbox =
            format!("{} <{}>", config.from_name, config.from_address).parse()?;

        let builder = if config.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        }
        .port(config.smtp_port);

        let builder = if config.smtp_username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
        };

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_reset_code(
        &self,
        to: &str,
        name: &str,
        code: &str,
        ttl_minutes: i64,
    ) -> Result<()> {
        let to_mailbox: Mailbox = to.parse()?;
        let subject = "Your password reset code";

        let email = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(render_text(name, code, ttl_minutes)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(render_html(name, code, ttl_minutes)),
                    ),
            )?;

        self.transport.send(email).await?;

        info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

fn render_text(name: &str, code: &str, ttl_minutes: i64) -> String {
    format!(
        "Hello {name},\n\n\
         Your password reset code is: {code}\n\n\
         The code expires in {ttl_minutes} minutes. If you did not request a reset, \
         you can ignore this email.\n"
    )
}

fn render_html(name: &str, code: &str, ttl_minutes: i64) -> String {
    let name = html_escape(name);
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Password reset</title></head>
<body style="font-family: Arial, sans-serif; color: #374151;">
  <p>Hello {name},</p>
  <p>Your password reset code is:</p>
  <p style="font-size: 28px; font-weight: 600; letter-spacing: 6px;">{code}</p>
  <p>The code expires in {ttl_minutes} minutes. If you did not request a reset, you can ignore this email.</p>
</body>
</html>"#
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_code() {
        let text = render_text("Ann", "123456", 10);
        assert!(text.contains("123456"));
        assert!(text.contains("10 minutes"));

        let html = render_html("<Ann>", "654321", 10);
        assert!(html.contains("654321"));
        assert!(html.contains("&lt;Ann&gt;"));
    }
}
