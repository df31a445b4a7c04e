use crate::utils::error::{RentalError, Result};
use crate::utils::validation::{
    validate_email, validate_non_empty_string, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Back-office settings document, stored as TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemSettings {
    #[serde(default)]
    pub company: CompanySettings,
    #[serde(default)]
    pub payment: PaymentSettings,
    #[serde(default)]
    pub email: EmailSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub security: SecuritySettings,
    #[serde(default)]
    pub general: GeneralSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanySettings {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub inn: String,
    pub kpp: String,
    pub ogrn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl Default for CompanySettings {
    fn default() -> Self {
        Self {
            name: "ООО «АвтоПрокат»".to_string(),
            address: "г. Москва, ул. Автомобильная, д. 10".to_string(),
            phone: "+7 (495) 123-45-67".to_string(),
            email: "info@autorent.ru".to_string(),
            website: "https://autorent.ru".to_string(),
            inn: "7712345678".to_string(),
            kpp: "771201001".to_string(),
            ogrn: "1157746123456".to_string(),
            logo: Some("/logo.svg".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSettings {
    pub bank_name: String,
    pub bik: String,
    pub account: String,
    pub correspondent_account: String,
    /// Percent.
    pub vat: u32,
    pub currency: String,
    pub allow_online_payments: bool,
    pub payment_methods: Vec<String>,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            bank_name: "ПАО Сбербанк".to_string(),
            bik: "044525225".to_string(),
            account: "40702810123450000123".to_string(),
            correspondent_account: "30101810400000000225".to_string(),
            vat: 20,
            currency: "RUB".to_string(),
            allow_online_payments: true,
            payment_methods: vec!["card".to_string(), "cash".to_string(), "bank_transfer".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub smtp_server: String,
    pub smtp_port: u32,
    pub smtp_user: String,
    pub smtp_password: String,
    pub sender_name: String,
    pub sender_email: String,
    pub email_signature: String,
    pub send_booking_confirmations: bool,
    pub send_payment_receipts: bool,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.yandex.ru".to_string(),
            smtp_port: 465,
            smtp_user: "no-reply@autorent.ru".to_string(),
            smtp_password: "password".to_string(),
            sender_name: "АвтоПрокат".to_string(),
            sender_email: "no-reply@autorent.ru".to_string(),
            email_signature: "С уважением,\nКоманда АвтоПрокат\n+7 (495) 123-45-67".to_string(),
            send_booking_confirmations: true,
            send_payment_receipts: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub admin_emails_for_new_bookings: Vec<String>,
    pub send_booking_reminders: bool,
    pub reminder_hours: u32,
    pub new_booking_sound: bool,
    pub desktop_notifications: bool,
    pub telegram_bot_enabled: bool,
    pub telegram_chat_id: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            admin_emails_for_new_bookings: vec![
                "admin@autorent.ru".to_string(),
                "manager@autorent.ru".to_string(),
            ],
            send_booking_reminders: true,
            reminder_hours: 24,
            new_booking_sound: true,
            desktop_notifications: true,
            telegram_bot_enabled: false,
            telegram_chat_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    pub password_min_length: u32,
    pub require_special_chars: bool,
    /// Minutes.
    pub session_timeout: u32,
    pub failed_login_attempts: u32,
    pub two_factor_auth_enabled: bool,
    pub allowed_ip_addresses: Vec<String>,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            password_min_length: 8,
            require_special_chars: true,
            session_timeout: 60,
            failed_login_attempts: 5,
            two_factor_auth_enabled: false,
            allowed_ip_addresses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub language: String,
    pub date_format: String,
    pub time_format: String,
    pub timezone: String,
    pub maintenance_mode: bool,
    pub debug_mode: bool,
    pub analytics_id: String,
    pub default_page_size: u32,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            language: "ru".to_string(),
            date_format: "DD.MM.YYYY".to_string(),
            time_format: "24h".to_string(),
            timezone: "Europe/Moscow".to_string(),
            maintenance_mode: false,
            debug_mode: false,
            analytics_id: String::new(),
            default_page_size: 20,
        }
    }
}

impl SystemSettings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| RentalError::ConfigValidationError {
            field: "settings".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RentalError::ConfigError {
            message: format!("Failed to serialize settings: {}", e),
        })
    }

    /// Validates, then writes the document; parent directories are created.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.validate()?;
        let content = self.to_toml_string()?;
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&path, content)?;
        tracing::info!("💾 Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}

impl Validate for SystemSettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("company.name", &self.company.name)?;
        validate_email("company.email", &self.company.email)?;
        if !self.company.website.is_empty() {
            validate_url("company.website", &self.company.website)?;
        }

        validate_range("payment.vat", self.payment.vat, 0, 100)?;
        validate_non_empty_string("payment.currency", &self.payment.currency)?;

        validate_non_empty_string("email.smtp_server", &self.email.smtp_server)?;
        validate_range("email.smtp_port", self.email.smtp_port, 1, 65535)?;
        validate_email("email.sender_email", &self.email.sender_email)?;

        for address in &self.notifications.admin_emails_for_new_bookings {
            validate_email("notifications.admin_emails_for_new_bookings", address)?;
        }
        if self.notifications.telegram_bot_enabled && self.notifications.telegram_chat_id.trim().is_empty() {
            return Err(RentalError::MissingConfigError {
                field: "notifications.telegram_chat_id".to_string(),
            });
        }

        validate_range("security.password_min_length", self.security.password_min_length, 6, 128)?;
        validate_range("security.session_timeout", self.security.session_timeout, 1, 24 * 60)?;

        validate_range("general.default_page_size", self.general.default_page_size, 1, 200)?;

        Ok(())
    }
}
