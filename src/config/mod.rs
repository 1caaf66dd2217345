pub mod schema;

pub use schema::{Config, GatewayConfig};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reexported_config_default_is_constructible() {
        let config = Config::default();

        assert!(!config.gateway.host.is_empty());
        assert!(config.gateway.port > 0);
    }
}
