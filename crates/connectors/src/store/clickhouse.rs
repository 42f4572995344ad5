use crate::store::{PreparedBatch, StoreConnection, StoreConnector, StoreError};
use async_trait::async_trait;
use ::clickhouse::{Client, insert::Insert};
use model::{core::schema::TableSchema, records::row::PerformanceRow};
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct ClickHouseOptions {
    /// `host:port` of the HTTP interface, or a full `http(s)://` URL.
    pub addr: String,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl ClickHouseOptions {
    pub fn url(&self) -> String {
        if self.addr.starts_with("http://") || self.addr.starts_with("https://") {
            self.addr.clone()
        } else {
            format!("http://{}", self.addr)
        }
    }

    fn client(&self) -> Client {
        let client = Client::default()
            .with_url(self.url())
            .with_database(&self.database)
            .with_user(&self.user);

        if self.password.is_empty() {
            client
        } else {
            client.with_password(&self.password)
        }
    }
}

/// Opens one HTTP client per connection so workers do not share a connection pool.
#[derive(Debug, Clone)]
pub struct ClickHouseConnector {
    options: ClickHouseOptions,
}

impl ClickHouseConnector {
    pub fn new(options: ClickHouseOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl StoreConnector for ClickHouseConnector {
    fn endpoint(&self) -> String {
        format!("{}/{}", self.options.url(), self.options.database)
    }

    async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        debug!(endpoint = %self.endpoint(), user = %self.options.user, "Opening ClickHouse connection");
        Ok(Box::new(ClickHouseConnection {
            client: self.options.client(),
            endpoint: self.endpoint(),
        }))
    }
}

pub struct ClickHouseConnection {
    client: Client,
    endpoint: String,
}

#[async_trait]
impl StoreConnection for ClickHouseConnection {
    async fn ping(&self) -> Result<(), StoreError> {
        info!(endpoint = %self.endpoint, "Pinging ClickHouse");

        self.client
            .query("SELECT 1")
            .execute()
            .await
            .map_err(|e| {
                error!(endpoint = %self.endpoint, error = %e, "ClickHouse ping failed");
                StoreError::Unreachable {
                    endpoint: self.endpoint.clone(),
                    reason: e.to_string(),
                }
            })?;

        info!(endpoint = %self.endpoint, "ClickHouse ping succeeded");
        Ok(())
    }

    async fn prepare_batch(
        &self,
        table: &TableSchema,
    ) -> Result<Box<dyn PreparedBatch>, StoreError> {
        debug!(statement = %table.insert_statement(), "Preparing ClickHouse insert");
        let insert = self.client.insert::<PerformanceRow>(&table.name)?;
        Ok(Box::new(ClickHouseBatch {
            table: table.name.clone(),
            insert: Some(insert),
            rows: 0,
        }))
    }
}

struct ClickHouseBatch {
    table: String,
    insert: Option<Insert<PerformanceRow>>,
    rows: usize,
}

#[async_trait]
impl PreparedBatch for ClickHouseBatch {
    async fn append(&mut self, row: &PerformanceRow) -> Result<(), StoreError> {
        let insert = self
            .insert
            .as_mut()
            .ok_or_else(|| StoreError::BatchConsumed(self.table.clone()))?;
        insert.write(row).await?;
        self.rows += 1;
        Ok(())
    }

    async fn send(&mut self) -> Result<usize, StoreError> {
        let insert = self
            .insert
            .take()
            .ok_or_else(|| StoreError::BatchConsumed(self.table.clone()))?;
        insert.end().await?;
        Ok(self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(addr: &str) -> ClickHouseOptions {
        ClickHouseOptions {
            addr: addr.to_string(),
            database: "default".into(),
            user: "default".into(),
            password: String::new(),
        }
    }

    #[test]
    fn test_url_adds_scheme_to_bare_address() {
        assert_eq!(options("localhost:8123").url(), "http://localhost:8123");
        assert_eq!(
            options("https://ch.example.com:8443").url(),
            "https://ch.example.com:8443"
        );
    }

    #[test]
    fn test_endpoint_includes_database() {
        let connector = ClickHouseConnector::new(options("localhost:8123"));
        assert_eq!(connector.endpoint(), "http://localhost:8123/default");
    }
}
