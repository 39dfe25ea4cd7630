pub mod mock_apq_server;

use apq_chain::{ChainConfig, GraphQLClient};

pub fn client_for(endpoint: &str, config: ChainConfig) -> GraphQLClient {
    let config = ChainConfig {
        endpoint: endpoint.to_string(),
        request_timeout_secs: 5,
        ..config
    };
    GraphQLClient::new(config).expect("client config is valid")
}
