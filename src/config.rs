use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Postgres connection. Without it entities are kept in memory only.
    pub database: Option<DatabaseConfig>,
    pub chain: ChainConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChainConfig {
    pub name: String,
    pub chain_id: u64,
    pub rpc_http: String,
    pub start_block: Option<u64>,
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Token contract addresses whose Transfer events are indexed.
    pub tokens: Vec<String>,
}

fn default_batch_size() -> u64 {
    100
}

fn default_poll_interval_ms() -> u64 {
    2000
}

impl Config {
    pub fn load(path: &str) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read config file '{}': {}", path, e))?;
        Self::parse(&content)
            .map_err(|e| eyre::eyre!("Invalid config file '{}': {}", path, e))
    }

    pub fn parse(content: &str) -> eyre::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> eyre::Result<()> {
        let chain = &self.chain;
        if chain.tokens.is_empty() {
            return Err(eyre::eyre!(
                "Chain '{}' must have at least one token configured",
                chain.name
            ));
        }
        if chain.batch_size == 0 {
            return Err(eyre::eyre!("Chain '{}' batch_size must be positive", chain.name));
        }
        for token in &chain.tokens {
            let hex_part = token.strip_prefix("0x").unwrap_or_default();
            if hex_part.len() != 40 || hex::decode(hex_part).is_err() {
                return Err(eyre::eyre!(
                    "Invalid token address '{}' on chain '{}'",
                    token,
                    chain.name
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_config(tokens: Vec<&str>) -> ChainConfig {
        ChainConfig {
            name: "test".to_string(),
            chain_id: 1,
            rpc_http: "http://localhost:8545".to_string(),
            start_block: None,
            batch_size: 100,
            poll_interval_ms: 2000,
            tokens: tokens.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
[database]
url = "postgres://localhost/test"
max_connections = 5

[chain]
name = "zrc"
chain_id = 1
rpc_http = "http://localhost:8545"
start_block = 1000
tokens = ["0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"]
"#;

        let config = Config::parse(toml_str).unwrap();
        assert_eq!(config.database.unwrap().max_connections, 5);
        assert_eq!(config.chain.name, "zrc");
        assert_eq!(config.chain.chain_id, 1);
        assert_eq!(config.chain.start_block, Some(1000));
        assert_eq!(config.chain.tokens.len(), 1);
        assert_eq!(config.chain.batch_size, 100); // default
        assert_eq!(config.chain.poll_interval_ms, 2000); // default
    }

    #[test]
    fn test_database_is_optional() {
        let toml_str = r#"
[chain]
name = "local"
chain_id = 31337
rpc_http = "http://localhost:8545"
tokens = ["0xa16081f360e3847006db660bae1c6d1b2e17ec2a"]
"#;

        let config = Config::parse(toml_str).unwrap();
        assert!(config.database.is_none());
        assert_eq!(config.chain.start_block, None);
    }

    #[test]
    fn test_validate_empty_tokens() {
        let config = Config {
            database: None,
            chain: chain_config(vec![]),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_address() {
        for bad in ["not-an-address", "0x1234", "0xzz16081f360e3847006db660bae1c6d1b2e17ec2a"] {
            let config = Config {
                database: None,
                chain: chain_config(vec![bad]),
            };
            assert!(config.validate().is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn test_validate_zero_batch_size() {
        let mut chain = chain_config(vec!["0xa16081f360e3847006db660bae1c6d1b2e17ec2a"]);
        chain.batch_size = 0;
        let config = Config {
            database: None,
            chain,
        };
        assert!(config.validate().is_err());
    }
}
