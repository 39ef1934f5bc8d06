use crate::Result;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use typed_builder::TypedBuilder;

const REDIS_PORT: u16 = 6379;

#[derive(Debug, Clone, TypedBuilder)]
pub struct RedisConfig {
    #[builder(default = "8.6.0".to_string(), setter(into))]
    tag: String,
    /// Starts the server with `--requirepass` when set.
    #[builder(default, setter(strip_option, into))]
    password: Option<String>,
}

/// A single disposable Redis server.
pub struct RedisServer {
    container: ContainerAsync<GenericImage>,
    config: RedisConfig,
}

impl RedisServer {
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let image = GenericImage::new("redis", config.tag.as_str())
            .with_exposed_port(REDIS_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"));

        let container = match config.password.as_deref() {
            Some(password) => {
                image
                    .with_cmd(["redis-server", "--requirepass", password])
                    .start()
                    .await?
            }
            None => image.start().await?,
        };

        Ok(Self { container, config })
    }

    pub async fn host(&self) -> Result<String> {
        let host = self.container.get_host().await?.to_string();

        Ok(match host.as_str() {
            "localhost" => String::from("127.0.0.1"),
            _ => host,
        })
    }

    pub async fn port(&self) -> Result<u16> {
        Ok(self.container.get_host_port_ipv4(REDIS_PORT).await?)
    }

    pub fn password(&self) -> Option<&str> {
        self.config.password.as_deref()
    }

    /// Opens a plain multiplexed connection, authenticating if needed.
    pub async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        let host = self.host().await?;
        let port = self.port().await?;
        let url = match self.password() {
            Some(password) => format!("redis://:{password}@{host}:{port}/"),
            None => format!("redis://{host}:{port}/"),
        };

        let client = redis::Client::open(url.as_str())?;
        Ok(client.get_multiplexed_async_connection().await?)
    }
}
