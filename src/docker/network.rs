use std::net::Ipv4Addr;

use bollard::{
    models::{EndpointIpamConfig, EndpointSettings},
    network::ConnectNetworkOptions,
};
use tracing::{event, Level};

use crate::TaskError;

use super::Docker;

impl Docker {
    pub(super) async fn connect_with_static_ip(
        &self,
        network: &str,
        container_id: &str,
        ipv4: Ipv4Addr,
    ) -> Result<(), TaskError> {
        let opts = ConnectNetworkOptions {
            container: container_id,
            endpoint_config: EndpointSettings {
                ipam_config: Some(EndpointIpamConfig {
                    ipv4_address: Some(ipv4.to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        };

        event!(
            Level::DEBUG,
            "adding to network: {}, container: {}, address: {}",
            network,
            container_id,
            ipv4
        );

        self.client
            .connect_network(network, opts)
            .await
            .map_err(|e| {
                TaskError::Daemon(format!(
                    "failed to connect container to network `{}`: {}",
                    network, e
                ))
            })
    }
}
