//! Email notification service.
//!
//! Notifications go out through one of two configured provider slots.
//! Transactional mail prefers the transactional slot and falls back to the
//! marketing slot when today's quota is used up. Marketing mail never falls
//! back. Usage is counted per provider and UTC day in the database.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use taiwanstay_common::config::{EmailProviderKind, EmailProviderSettings, EmailSettings};
use taiwanstay_common::{AppError, AppResult};
use taiwanstay_db::repositories::EmailUsageRepository;

/// Which provider slot a message is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailCategory {
    Transactional,
    Marketing,
}

/// Email notification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmailNotificationType {
    /// New account
    Welcome,
    /// A volunteer applied to a host's opportunity
    ApplicationReceived,
    /// An application moved to a new status
    ApplicationStatusChanged,
    /// Opportunity went live
    OpportunityApproved,
    /// Opportunity was rejected in review
    OpportunityRejected,
    /// Opportunity was suspended by an admin
    OpportunityAdminPaused,
    /// Newsletter
    Newsletter,
}

impl EmailNotificationType {
    #[must_use]
    pub const fn category(&self) -> EmailCategory {
        match self {
            Self::Newsletter => EmailCategory::Marketing,
            _ => EmailCategory::Transactional,
        }
    }
}

impl std::fmt::Display for EmailNotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Welcome => "welcome",
            Self::ApplicationReceived => "application_received",
            Self::ApplicationStatusChanged => "application_status_changed",
            Self::OpportunityApproved => "opportunity_approved",
            Self::OpportunityRejected => "opportunity_rejected",
            Self::OpportunityAdminPaused => "opportunity_admin_paused",
            Self::Newsletter => "newsletter",
        };
        f.write_str(s)
    }
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Template variables for emails.
#[derive(Debug, Clone, Default)]
pub struct EmailTemplateVars {
    /// Recipient's display name
    pub user_name: Option<String>,
    /// Opportunity title
    pub opportunity_title: Option<String>,
    /// Applicant's display name
    pub applicant_name: Option<String>,
    /// New status label
    pub status: Option<String>,
    /// Reason or note attached to a status change
    pub reason: Option<String>,
    /// Link into the site
    pub action_url: Option<String>,
    /// Newsletter body (plain text)
    pub body: Option<String>,
}

/// Email delivery result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDeliveryResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

/// Sends a rendered message through one provider.
#[async_trait::async_trait]
pub trait EmailTransport: Send + Sync {
    async fn deliver(
        &self,
        slot: &EmailProviderSettings,
        settings: &EmailSettings,
        message: &EmailMessage,
    ) -> AppResult<EmailDeliveryResult>;
}

/// `SendGrid` and Mailgun HTTP APIs.
pub struct HttpEmailTransport {
    http_client: reqwest::Client,
}

impl HttpEmailTransport {
    #[must_use]
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    async fn send_sendgrid(
        &self,
        slot: &EmailProviderSettings,
        settings: &EmailSettings,
        message: &EmailMessage,
    ) -> AppResult<EmailDeliveryResult> {
        let mut body = serde_json::json!({
            "personalizations": [{
                "to": [{"email": message.to}]
            }],
            "from": {
                "email": settings.from_address,
                "name": settings.from_name
            },
            "subject": message.subject,
            "content": [
                {"type": "text/plain", "value": message.text_body},
                {"type": "text/html", "value": message.html_body}
            ]
        });
        if let Some(reply_to) = &settings.reply_to {
            body["reply_to"] = serde_json::json!({ "email": reply_to });
        }

        let response = self
            .http_client
            .post("https://api.sendgrid.com/v3/mail/send")
            .bearer_auth(&slot.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("SendGrid request failed: {e}")))?;

        if response.status().is_success() {
            let message_id = response
                .headers()
                .get("X-Message-Id")
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            Ok(EmailDeliveryResult {
                success: true,
                message_id,
                error: None,
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Ok(EmailDeliveryResult {
                success: false,
                message_id: None,
                error: Some(error_text),
            })
        }
    }

    async fn send_mailgun(
        &self,
        slot: &EmailProviderSettings,
        settings: &EmailSettings,
        message: &EmailMessage,
    ) -> AppResult<EmailDeliveryResult> {
        let domain = slot
            .domain
            .as_deref()
            .ok_or_else(|| AppError::Config("Mailgun slot has no domain".to_string()))?;
        let base_url = if slot.eu_region {
            "https://api.eu.mailgun.net"
        } else {
            "https://api.mailgun.net"
        };

        let mut form_params = vec![
            (
                "from",
                format!("{} <{}>", settings.from_name, settings.from_address),
            ),
            ("to", message.to.clone()),
            ("subject", message.subject.clone()),
            ("text", message.text_body.clone()),
            ("html", message.html_body.clone()),
        ];
        if let Some(reply_to) = &settings.reply_to {
            form_params.push(("h:Reply-To", reply_to.clone()));
        }

        let response = self
            .http_client
            .post(format!("{base_url}/v3/{domain}/messages"))
            .basic_auth("api", Some(&slot.api_key))
            .form(&form_params)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Mailgun request failed: {e}")))?;

        if response.status().is_success() {
            #[derive(Deserialize)]
            struct MailgunResponse {
                id: Option<String>,
            }
            let result: MailgunResponse = response
                .json()
                .await
                .unwrap_or(MailgunResponse { id: None });
            Ok(EmailDeliveryResult {
                success: true,
                message_id: result.id,
                error: None,
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Ok(EmailDeliveryResult {
                success: false,
                message_id: None,
                error: Some(error_text),
            })
        }
    }
}

#[async_trait::async_trait]
impl EmailTransport for HttpEmailTransport {
    async fn deliver(
        &self,
        slot: &EmailProviderSettings,
        settings: &EmailSettings,
        message: &EmailMessage,
    ) -> AppResult<EmailDeliveryResult> {
        match slot.provider {
            EmailProviderKind::Sendgrid => self.send_sendgrid(slot, settings, message).await,
            EmailProviderKind::Mailgun => self.send_mailgun(slot, settings, message).await,
        }
    }
}

const fn provider_name(kind: EmailProviderKind) -> &'static str {
    match kind {
        EmailProviderKind::Sendgrid => "sendgrid",
        EmailProviderKind::Mailgun => "mailgun",
    }
}

/// Outcome of a newsletter run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterReport {
    pub sent: usize,
    pub failed: usize,
    /// Not attempted because the marketing quota ran out
    pub skipped: usize,
}

/// Email service.
#[derive(Clone)]
pub struct EmailService {
    settings: Option<Arc<EmailSettings>>,
    usage_repo: EmailUsageRepository,
    transport: Arc<dyn EmailTransport>,
    site_url: String,
}

impl EmailService {
    /// Create an email service backed by the provider HTTP APIs.
    #[must_use]
    pub fn new(
        settings: Option<EmailSettings>,
        usage_repo: EmailUsageRepository,
        site_url: String,
    ) -> Self {
        Self::with_transport(
            settings,
            usage_repo,
            site_url,
            Arc::new(HttpEmailTransport::new(reqwest::Client::new())),
        )
    }

    #[must_use]
    pub fn with_transport(
        settings: Option<EmailSettings>,
        usage_repo: EmailUsageRepository,
        site_url: String,
        transport: Arc<dyn EmailTransport>,
    ) -> Self {
        Self {
            settings: settings.map(Arc::new),
            usage_repo,
            transport,
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    /// Check if email service is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.settings.is_some()
    }

    /// Render and send a notification.
    pub async fn send_notification(
        &self,
        notification_type: EmailNotificationType,
        to: &str,
        vars: &EmailTemplateVars,
    ) -> AppResult<EmailDeliveryResult> {
        let settings = self
            .settings
            .as_ref()
            .ok_or_else(|| AppError::Config("Email service not configured".to_string()))?;

        let message = self.render(notification_type, to, vars);
        let slot = self.pick_slot(settings, notification_type.category()).await?;

        let result = self.transport.deliver(slot, settings, &message).await?;

        if result.success {
            let provider = provider_name(slot.provider);
            self.usage_repo
                .increment(provider, Utc::now().date_naive())
                .await?;
            info!(
                kind = %notification_type,
                provider = provider,
                "Email sent"
            );
        }

        Ok(result)
    }

    /// Send a notification, logging instead of failing.
    pub async fn notify(
        &self,
        notification_type: EmailNotificationType,
        to: &str,
        vars: EmailTemplateVars,
    ) {
        if !self.is_enabled() {
            debug!(kind = %notification_type, "Email disabled, skipping");
            return;
        }

        match self.send_notification(notification_type, to, &vars).await {
            Ok(result) if result.success => {}
            Ok(result) => {
                warn!(kind = %notification_type, error = ?result.error, "Email provider refused message");
            }
            Err(e) => {
                warn!(kind = %notification_type, error = %e, "Failed to send email");
            }
        }
    }

    /// Send the newsletter to each recipient in order.
    ///
    /// Marketing mail has no fallback slot, so the run stops at the first
    /// recipient refused for quota and the rest are reported as skipped.
    pub async fn send_newsletter(
        &self,
        recipients: &[String],
        body: &str,
    ) -> AppResult<NewsletterReport> {
        if !self.is_enabled() {
            return Err(AppError::Config("Email service not configured".to_string()));
        }

        let vars = EmailTemplateVars {
            body: Some(body.to_string()),
            ..Default::default()
        };
        let mut report = NewsletterReport::default();

        for (index, to) in recipients.iter().enumerate() {
            match self
                .send_notification(EmailNotificationType::Newsletter, to, &vars)
                .await
            {
                Ok(result) if result.success => report.sent += 1,
                Ok(result) => {
                    warn!(error = ?result.error, "Provider refused newsletter");
                    report.failed += 1;
                }
                Err(AppError::RateLimited(reason)) => {
                    report.skipped = recipients.len() - index;
                    warn!(reason = %reason, skipped = report.skipped, "Marketing quota used up");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to send newsletter");
                    report.failed += 1;
                }
            }
        }

        info!(
            sent = report.sent,
            failed = report.failed,
            skipped = report.skipped,
            "Newsletter run finished"
        );
        Ok(report)
    }

    async fn has_capacity(&self, slot: &EmailProviderSettings) -> AppResult<bool> {
        let used = self
            .usage_repo
            .count_for(provider_name(slot.provider), Utc::now().date_naive())
            .await?;
        Ok(i64::from(used) < i64::from(slot.daily_limit))
    }

    async fn pick_slot<'a>(
        &self,
        settings: &'a EmailSettings,
        category: EmailCategory,
    ) -> AppResult<&'a EmailProviderSettings> {
        let (primary, fallback) = match category {
            EmailCategory::Transactional => (&settings.transactional, Some(&settings.marketing)),
            EmailCategory::Marketing => (&settings.marketing, None),
        };

        if self.has_capacity(primary).await? {
            return Ok(primary);
        }

        if let Some(fallback) = fallback {
            if self.has_capacity(fallback).await? {
                debug!(
                    provider = provider_name(fallback.provider),
                    "Primary email slot exhausted, using fallback"
                );
                return Ok(fallback);
            }
        }

        Err(AppError::RateLimited(
            "Daily email limit reached".to_string(),
        ))
    }

    fn render(
        &self,
        notification_type: EmailNotificationType,
        to: &str,
        vars: &EmailTemplateVars,
    ) -> EmailMessage {
        let name = vars.user_name.as_deref().unwrap_or("there");
        let title = vars.opportunity_title.as_deref().unwrap_or("your opportunity");
        let url = vars
            .action_url
            .clone()
            .unwrap_or_else(|| self.site_url.clone());

        let (subject, text, html) = match notification_type {
            EmailNotificationType::Welcome => (
                "Welcome to TaiwanStay!".to_string(),
                format!(
                    "Hi {name}!\n\nWelcome to TaiwanStay. Find your first work exchange: {url}"
                ),
                format!(
                    "<p>Hi {}!</p><p>Welcome to <strong>TaiwanStay</strong>.</p>\
                     <p><a href=\"{}\">Find your first work exchange</a></p>",
                    escape_html(name),
                    url
                ),
            ),
            EmailNotificationType::ApplicationReceived => {
                let applicant = vars.applicant_name.as_deref().unwrap_or("A volunteer");
                (
                    format!("New application for {title}"),
                    format!("Hi {name},\n\n{applicant} applied to {title}.\n\nReview it: {url}"),
                    format!(
                        "<p>Hi {},</p><p><strong>{}</strong> applied to {}.</p>\
                         <p><a href=\"{}\">Review the application</a></p>",
                        escape_html(name),
                        escape_html(applicant),
                        escape_html(title),
                        url
                    ),
                )
            }
            EmailNotificationType::ApplicationStatusChanged => {
                let status = vars.status.as_deref().unwrap_or("updated");
                let note = vars
                    .reason
                    .as_deref()
                    .map(|r| format!("\n\nNote: {r}"))
                    .unwrap_or_default();
                (
                    format!("Your application for {title} is now {status}"),
                    format!(
                        "Hi {name},\n\nYour application for {title} is now {status}.{note}\n\nDetails: {url}"
                    ),
                    format!(
                        "<p>Hi {},</p><p>Your application for {} is now <strong>{}</strong>.</p>{}\
                         <p><a href=\"{}\">View details</a></p>",
                        escape_html(name),
                        escape_html(title),
                        escape_html(status),
                        vars.reason
                            .as_deref()
                            .map(|r| format!("<blockquote>{}</blockquote>", escape_html(r)))
                            .unwrap_or_default(),
                        url
                    ),
                )
            }
            EmailNotificationType::OpportunityApproved => (
                format!("{title} is now live"),
                format!("Hi {name},\n\n{title} was approved and is visible to volunteers.\n\n{url}"),
                format!(
                    "<p>Hi {},</p><p><strong>{}</strong> was approved and is visible to volunteers.</p>\
                     <p><a href=\"{}\">View listing</a></p>",
                    escape_html(name),
                    escape_html(title),
                    url
                ),
            ),
            EmailNotificationType::OpportunityRejected
            | EmailNotificationType::OpportunityAdminPaused => {
                let (subject, verb) =
                    if notification_type == EmailNotificationType::OpportunityRejected {
                        (format!("{title} was not approved"), "was not approved")
                    } else {
                        (format!("{title} has been suspended"), "has been suspended")
                    };
                let reason = vars.reason.as_deref().unwrap_or("No reason given");
                (
                    subject,
                    format!("Hi {name},\n\n{title} {verb}.\n\nReason: {reason}\n\n{url}"),
                    format!(
                        "<p>Hi {},</p><p><strong>{}</strong> {}.</p>\
                         <blockquote>{}</blockquote><p><a href=\"{}\">Edit listing</a></p>",
                        escape_html(name),
                        escape_html(title),
                        verb,
                        escape_html(reason),
                        url
                    ),
                )
            }
            EmailNotificationType::Newsletter => {
                let body = vars.body.as_deref().unwrap_or_default();
                (
                    "News from TaiwanStay".to_string(),
                    body.to_string(),
                    format!("<p>{}</p>", escape_html(body).replace('\n', "<br>")),
                )
            }
        };

        EmailMessage {
            to: to.to_string(),
            subject,
            text_body: text,
            html_body: self.wrap_html(&html),
        }
    }

    /// Wrap HTML content in a basic email template.
    fn wrap_html(&self, content: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
        a {{ color: #2f7d4a; }}
        blockquote {{ margin: 10px 0; padding: 10px 20px; border-left: 4px solid #e9ecef; background: #f8f9fa; }}
    </style>
</head>
<body>
    {}
    <hr style="margin-top: 40px; border: none; border-top: 1px solid #e9ecef;">
    <p style="font-size: 12px; color: #6c757d;">
        Sent by <a href="{}">TaiwanStay</a>.
    </p>
</body>
</html>"#,
            content, self.site_url
        )
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Mutex;
    use taiwanstay_db::entities::email_usage;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<(EmailProviderKind, String)>>,
    }

    #[async_trait::async_trait]
    impl EmailTransport for RecordingTransport {
        async fn deliver(
            &self,
            slot: &EmailProviderSettings,
            _settings: &EmailSettings,
            message: &EmailMessage,
        ) -> AppResult<EmailDeliveryResult> {
            self.sent
                .lock()
                .unwrap()
                .push((slot.provider, message.subject.clone()));
            Ok(EmailDeliveryResult {
                success: true,
                message_id: Some("m1".to_string()),
                error: None,
            })
        }
    }

    fn settings() -> EmailSettings {
        EmailSettings {
            from_address: "noreply@taiwanstay.example".to_string(),
            from_name: "TaiwanStay".to_string(),
            reply_to: None,
            transactional: EmailProviderSettings {
                provider: EmailProviderKind::Sendgrid,
                api_key: "sg".to_string(),
                domain: None,
                eu_region: false,
                daily_limit: 100,
            },
            marketing: EmailProviderSettings {
                provider: EmailProviderKind::Mailgun,
                api_key: "mg".to_string(),
                domain: Some("mg.taiwanstay.example".to_string()),
                eu_region: false,
                daily_limit: 300,
            },
        }
    }

    fn usage(provider: &str, count: i32) -> email_usage::Model {
        let day = Utc::now().date_naive();
        email_usage::Model {
            id: email_usage::usage_key(provider, day),
            provider: provider.to_string(),
            day,
            count,
            updated_at: Utc::now().into(),
        }
    }

    fn service(db: MockDatabase, transport: Arc<RecordingTransport>) -> EmailService {
        let repo = EmailUsageRepository::new(Arc::new(db.into_connection()));
        EmailService::with_transport(
            Some(settings()),
            repo,
            "https://taiwanstay.example/".to_string(),
            transport,
        )
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            EmailNotificationType::Newsletter.category(),
            EmailCategory::Marketing
        );
        assert_eq!(
            EmailNotificationType::OpportunityRejected.category(),
            EmailCategory::Transactional
        );
    }

    #[tokio::test]
    async fn test_transactional_uses_primary_slot() {
        let transport = Arc::new(RecordingTransport::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[usage("sendgrid", 5)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);

        let svc = service(db, transport.clone());
        let result = svc
            .send_notification(
                EmailNotificationType::Welcome,
                "vol@example.com",
                &EmailTemplateVars::default(),
            )
            .await
            .unwrap();

        assert!(result.success);
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[0].0, EmailProviderKind::Sendgrid);
    }

    #[tokio::test]
    async fn test_transactional_falls_back_when_exhausted() {
        let transport = Arc::new(RecordingTransport::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[usage("sendgrid", 100)]])
            .append_query_results([Vec::<email_usage::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);

        let svc = service(db, transport.clone());
        svc.send_notification(
            EmailNotificationType::OpportunityApproved,
            "host@example.com",
            &EmailTemplateVars::default(),
        )
        .await
        .unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[0].0, EmailProviderKind::Mailgun);
    }

    #[tokio::test]
    async fn test_marketing_does_not_fall_back() {
        let transport = Arc::new(RecordingTransport::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[usage("mailgun", 300)]]);

        let svc = service(db, transport.clone());
        let result = svc
            .send_notification(
                EmailNotificationType::Newsletter,
                "vol@example.com",
                &EmailTemplateVars::default(),
            )
            .await;

        assert!(matches!(result, Err(AppError::RateLimited(_))));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_newsletter_stops_when_quota_runs_out() {
        let transport = Arc::new(RecordingTransport::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[usage("mailgun", 299)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([[usage("mailgun", 300)]]);

        let svc = service(db, transport.clone());
        let recipients = vec![
            "a@example.com".to_string(),
            "b@example.com".to_string(),
            "c@example.com".to_string(),
        ];
        let report = svc.send_newsletter(&recipients, "Spring harvest season").await.unwrap();

        assert_eq!(
            report,
            NewsletterReport {
                sent: 1,
                failed: 0,
                skipped: 2,
            }
        );
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, EmailProviderKind::Mailgun);
    }

    #[tokio::test]
    async fn test_notify_without_settings_is_noop() {
        let repo = EmailUsageRepository::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));
        let svc = EmailService::new(None, repo, "https://taiwanstay.example".to_string());
        svc.notify(
            EmailNotificationType::Welcome,
            "vol@example.com",
            EmailTemplateVars::default(),
        )
        .await;
        assert!(!svc.is_enabled());
    }

    #[test]
    fn test_rejection_email_escapes_reason() {
        let repo = EmailUsageRepository::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));
        let svc = EmailService::new(Some(settings()), repo, "https://taiwanstay.example".into());
        let message = svc.render(
            EmailNotificationType::OpportunityRejected,
            "host@example.com",
            &EmailTemplateVars {
                opportunity_title: Some("Tea harvest".to_string()),
                reason: Some("<b>No photos</b>".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(message.subject, "Tea harvest was not approved");
        assert!(message.html_body.contains("&lt;b&gt;No photos"));
        assert!(message.text_body.contains("Reason: <b>No photos</b>"));
    }
}
