//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "Kaizen Focus".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_api_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_api_port() -> u16 {
    3000
}

pub fn default_db_path() -> String {
    "~/.kaizen/data/kaizen.db".to_string()
}

pub fn default_query_timeout_secs() -> u64 {
    10
}

pub fn default_mailer_provider() -> String {
    "resend".to_string()
}

pub fn default_resend_base_url() -> String {
    "https://api.resend.com".to_string()
}

pub fn default_from_address() -> String {
    "Kaizen Focus <onboarding@resend.dev>".to_string()
}

pub fn default_app_url() -> String {
    "https://kaizen-focus.lovable.app".to_string()
}

pub fn default_mailer_timeout_secs() -> u64 {
    15
}

pub fn default_concurrency() -> usize {
    1
}
