use crate::location::OutlineFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub google_api_key: String,
    pub env: Environment,
    pub log_level: String,
    pub places_base_url: String,
    pub geocode_url: String,
    pub request_timeout_secs: u64,
    pub retry_max_attempts: u32,
    pub retry_initial_wait_secs: u64,
    pub retry_max_wait_secs: u64,
    pub location_bias_radius_m: f64,
    pub enable_autocomplete: bool,
    pub autocomplete_name_threshold: f64,
    pub autocomplete_address_threshold: f64,
    pub text_search_threshold: f64,
    pub extract_outlines: bool,
    pub outline_format: OutlineFormat,
    pub max_concurrent_entities: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("google_api_key", &"[redacted]")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("places_base_url", &self.places_base_url)
            .field("geocode_url", &self.geocode_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("retry_max_attempts", &self.retry_max_attempts)
            .field("retry_initial_wait_secs", &self.retry_initial_wait_secs)
            .field("retry_max_wait_secs", &self.retry_max_wait_secs)
            .field("location_bias_radius_m", &self.location_bias_radius_m)
            .field("enable_autocomplete", &self.enable_autocomplete)
            .field(
                "autocomplete_name_threshold",
                &self.autocomplete_name_threshold,
            )
            .field(
                "autocomplete_address_threshold",
                &self.autocomplete_address_threshold,
            )
            .field("text_search_threshold", &self.text_search_threshold)
            .field("extract_outlines", &self.extract_outlines)
            .field("outline_format", &self.outline_format)
            .field("max_concurrent_entities", &self.max_concurrent_entities)
            .finish()
    }
}
