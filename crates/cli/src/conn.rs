use crate::{commands::StoreArgs, error::CliError};
use connectors::store::{
    StoreConnection, StoreConnector,
    clickhouse::{ClickHouseConnector, ClickHouseOptions},
};
use tracing::{error, info};

/// Opens a connection to the destination and pings it.
pub async fn test_conn(args: StoreArgs) -> Result<(), CliError> {
    let connector = ClickHouseConnector::new(ClickHouseOptions {
        addr: args.addr,
        database: args.database,
        user: args.user,
        password: args.password,
    });
    let endpoint = connector.endpoint();
    info!(endpoint = %endpoint, "Pinging ClickHouse");

    let connection = connector.connect().await?;
    connection.ping().await.map_err(|e| {
        error!(endpoint = %endpoint, error = %e, "ClickHouse ping failed");
        e
    })?;

    info!(endpoint = %endpoint, "ClickHouse ping succeeded");
    Ok(())
}
