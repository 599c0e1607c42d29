use std::env;

use chrono::Weekday;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub settings: PlatformSettings,
}

/// Platform-wide booking parameters, loaded once at startup.
#[derive(Debug, Clone)]
pub struct PlatformSettings {
    pub tax_percent: i64,
    pub service_fee: i64,
    pub platform_fee_percent: i64,
    pub hold_ttl_minutes: i64,
    pub weekend_days: Vec<Weekday>,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            tax_percent: 10,
            service_fee: 0,
            platform_fee_percent: 15,
            hold_ttl_minutes: 15,
            weekend_days: vec![Weekday::Sat, Weekday::Sun],
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        let defaults = PlatformSettings::default();
        let settings = PlatformSettings {
            tax_percent: env_i64("TAX_PERCENT", defaults.tax_percent),
            service_fee: env_i64("SERVICE_FEE", defaults.service_fee),
            platform_fee_percent: env_i64("PLATFORM_FEE_PERCENT", defaults.platform_fee_percent),
            hold_ttl_minutes: env_i64("HOLD_TTL_MINUTES", defaults.hold_ttl_minutes),
            weekend_days: env::var("WEEKEND_DAYS")
                .ok()
                .map(|raw| parse_weekend_days(&raw))
                .unwrap_or(defaults.weekend_days),
        };

        Ok(Self {
            port,
            database_url,
            host,
            settings,
        })
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}

fn parse_weekend_days(raw: &str) -> Vec<Weekday> {
    let days: Vec<Weekday> = raw
        .split(',')
        .filter_map(|part| match part.trim().to_lowercase().as_str() {
            "mon" => Some(Weekday::Mon),
            "tue" => Some(Weekday::Tue),
            "wed" => Some(Weekday::Wed),
            "thu" => Some(Weekday::Thu),
            "fri" => Some(Weekday::Fri),
            "sat" => Some(Weekday::Sat),
            "sun" => Some(Weekday::Sun),
            _ => None,
        })
        .collect();
    if days.is_empty() {
        vec![Weekday::Sat, Weekday::Sun]
    } else {
        days
    }
}
