//! Outgoing mail over SMTP.
//!
//! Misconfiguration never blocks startup: with incomplete credentials or an
//! unusable relay the mailer is built in a degraded state and sending fails
//! at send time instead.
use crate::configuration::MailSettings;
use anyhow::Context;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;

const RESET_SUBJECT: &str = "Recuperación de contraseña";

const FALLBACK_RESET_TEXT: &str =
    "Para restablecer tu contraseña visita: {{ reset_url }}";
const FALLBACK_RESET_HTML: &str =
    r#"<p>Para restablecer tu contraseña, <a href="{{ reset_url }}">haz clic aquí</a>.</p>"#;

pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    sender: Option<Mailbox>,
    reset_text: String,
    reset_html: String,
}

impl Mailer {
    /// Builds the mailer from the mail settings and the resolved template
    /// directory. Infallible: every problem is logged and degrades.
    pub fn new(settings: &MailSettings, template_dir: &Path) -> Self {
        if settings.username.is_none() || settings.password.is_none() {
            tracing::warn!(
                "mail configuration is incomplete (MAIL_USERNAME or MAIL_PASSWORD missing); \
                 outgoing mail will fail at send time"
            );
        }

        let transport = match build_transport(settings) {
            Ok(transport) => Some(transport),
            Err(e) => {
                tracing::warn!(
                    error.cause_chain = ?e,
                    "failed to build the SMTP transport; outgoing mail is disabled"
                );
                None
            }
        };

        let sender = settings.sender().and_then(|raw| match raw.parse() {
            Ok(mailbox) => Some(mailbox),
            Err(e) => {
                tracing::warn!(
                    sender = %raw,
                    error = %e,
                    "configured sender is not a valid address; outgoing mail is disabled"
                );
                None
            }
        });

        Self {
            transport,
            sender,
            reset_text: load_template(template_dir, "reset_password.txt", FALLBACK_RESET_TEXT),
            reset_html: load_template(template_dir, "reset_password.html", FALLBACK_RESET_HTML),
        }
    }

    pub async fn send_password_reset(
        &self,
        recipient: &str,
        reset_url: &str,
    ) -> Result<(), anyhow::Error> {
        let (text, html) = self.render_reset(reset_url);
        self.send_email(recipient, RESET_SUBJECT, &html, &text).await
    }

    pub async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), anyhow::Error> {
        let transport = self
            .transport
            .as_ref()
            .context("the SMTP transport is not configured")?;
        let sender = self
            .sender
            .as_ref()
            .context("no sender address is configured")?;

        let message = Message::builder()
            .from(sender.clone())
            .to(recipient
                .parse()
                .context("recipient is not a valid address")?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                text_content.to_string(),
                html_content.to_string(),
            ))
            .context("Failed to assemble the email")?;

        transport
            .send(message)
            .await
            .context("Failed to send email over SMTP")?;

        Ok(())
    }

    fn render_reset(&self, reset_url: &str) -> (String, String) {
        (
            self.reset_text.replace("{{ reset_url }}", reset_url),
            self.reset_html.replace("{{ reset_url }}", reset_url),
        )
    }
}

fn build_transport(
    settings: &MailSettings,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, anyhow::Error> {
    // SSL flag wins over TLS, matching the config defaults (465/implicit TLS).
    // Connections are opened per send; building the transport never touches
    // the async runtime.
    let mut builder = if settings.use_ssl() {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.server)
            .context("Failed to set up the TLS relay")?
    } else if settings.use_tls() {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)
            .context("Failed to set up the STARTTLS relay")?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.server)
    };

    builder = builder.port(settings.port());

    if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
        builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
    }

    Ok(builder.build())
}

fn load_template(dir: &Path, name: &str, fallback: &str) -> String {
    match std::fs::read_to_string(dir.join(name)) {
        Ok(template) => template,
        Err(e) => {
            tracing::warn!(
                template = name,
                error = %e,
                "could not read mail template, using the built-in fallback"
            );
            fallback.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Mailer;
    use crate::configuration::MailSettings;
    use std::path::Path;

    fn settings() -> MailSettings {
        MailSettings {
            server: "smtp.gmail.com".to_string(),
            port: "465".to_string(),
            use_tls: "false".to_string(),
            use_ssl: "true".to_string(),
            username: None,
            password: None,
            default_sender: None,
        }
    }

    // Plain #[test]: construction must work outside any async runtime.
    #[test]
    fn missing_credentials_do_not_prevent_construction() {
        let mailer = Mailer::new(&settings(), Path::new("/nonexistent"));
        assert!(mailer.sender.is_none());
        assert!(mailer.transport.is_some());
    }

    #[actix_web::test]
    async fn sending_without_a_sender_fails_at_send_time() {
        let mailer = Mailer::new(&settings(), Path::new("/nonexistent"));

        let outcome = mailer
            .send_password_reset("usuario@example.com", "http://localhost/reset")
            .await;

        assert!(outcome.is_err());
    }

    #[test]
    fn reset_templates_interpolate_the_url() {
        let mailer = Mailer::new(&settings(), Path::new("/nonexistent"));

        let (text, html) = mailer.render_reset("http://localhost/reset?token=abc");

        assert!(text.contains("http://localhost/reset?token=abc"));
        assert!(html.contains("http://localhost/reset?token=abc"));
    }

    #[test]
    fn bundled_templates_are_used_when_present() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
        let mailer = Mailer::new(&settings(), &dir);

        let (text, _) = mailer.render_reset("http://localhost/reset");
        assert!(text.contains("Recibimos una solicitud"));
    }
}
