use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: String,
    pub business_hours_file: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let business_hours_file = env::var("BUSINESS_HOURS_FILE")
            .unwrap_or_else(|_| "business_hours.json".to_string());

        Ok(Self {
            bind_addr,
            business_hours_file,
        })
    }
}
