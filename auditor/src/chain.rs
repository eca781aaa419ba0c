use std::{future::Future, marker::PhantomData};

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::Provider,
    transports::Transport,
};

use tracing::debug;

use crate::{bindings::Gateway, error::BoxError};

/// Binds a gateway address to a callable contract handle.
pub trait GatewayResolver {
    type Handle: NonceReader;

    fn resolve(&self, gateway: &str) -> impl Future<Output = Result<Self::Handle, BoxError>>;
}

/// Read-only access to the gateway's `nonces` accessor.
pub trait NonceReader {
    fn nonce(&self, owner: &str) -> impl Future<Output = Result<U256, BoxError>>;
}

pub struct ChainClient<P, T> {
    provider: P,
    _phantom: PhantomData<T>,
}

impl<P, T> ChainClient<P, T>
where
    P: Provider<T, Ethereum> + Clone,
    T: Transport + Clone,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            _phantom: PhantomData,
        }
    }
}

impl<P, T> GatewayResolver for ChainClient<P, T>
where
    P: Provider<T, Ethereum> + Clone,
    T: Transport + Clone,
{
    type Handle = GatewayHandle<P, T>;

    async fn resolve(&self, gateway: &str) -> Result<Self::Handle, BoxError> {
        let address: Address = gateway.parse()?;
        let code = self.provider.get_code_at(address).await?;
        if code.is_empty() {
            return Err(format!("no contract deployed at {address}").into());
        }

        debug!(%address, code_size = code.len(), "resolved gateway");
        Ok(GatewayHandle {
            instance: Gateway::new(address, self.provider.clone()),
        })
    }
}

pub struct GatewayHandle<P, T> {
    instance: Gateway::GatewayInstance<T, P>,
}

impl<P, T> NonceReader for GatewayHandle<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    async fn nonce(&self, owner: &str) -> Result<U256, BoxError> {
        let owner: Address = owner.parse()?;
        Ok(self.instance.nonces(owner).call().await?._0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{
        hex::FromHexError,
        node_bindings::Anvil,
        providers::{ProviderBuilder, RootProvider},
        transports::http::{
            reqwest::{Client, Url},
            Http,
        },
    };

    // Nothing listens here; requests to it would fail with a transport error.
    fn offline_provider() -> RootProvider<Http<Client>> {
        let url: Url = "http://127.0.0.1:9".parse().unwrap();
        ProviderBuilder::new().on_http(url)
    }

    #[tokio::test]
    async fn unparsable_gateway_fails_to_resolve() {
        let client = ChainClient::new(offline_provider());

        let err = match client.resolve("not-an-address").await {
            Ok(_) => panic!("resolved an invalid gateway address"),
            Err(e) => e,
        };

        assert!(err.downcast_ref::<FromHexError>().is_some(), "{err}");
    }

    #[tokio::test]
    async fn unparsable_candidate_fails_its_query() {
        let gateway = GatewayHandle {
            instance: Gateway::new(Address::ZERO, offline_provider()),
        };

        let err = gateway.nonce("0xnot-hex").await.unwrap_err();

        assert!(err.downcast_ref::<FromHexError>().is_some(), "{err}");
    }

    #[tokio::test]
    #[ignore = "spawns a local anvil node"]
    async fn address_without_code_fails_to_resolve() -> eyre::Result<()> {
        let anvil = Anvil::new().try_spawn()?;
        let provider = ProviderBuilder::new().on_http(anvil.endpoint_url());
        let client = ChainClient::new(provider);

        let err = match client.resolve(&Address::ZERO.to_string()).await {
            Ok(_) => panic!("resolved an address with no code"),
            Err(e) => e,
        };

        assert!(err.to_string().contains("no contract deployed"), "{err}");
        Ok(())
    }
}
