use connectors::store::{clickhouse::ClickHouseOptions, memory::MemoryStore};
use engine_config::settings::validated::ValidatedSettings;
use engine_core::connectors::{destination::Destination, source::Source};
use model::core::schema::TableSchema;

pub fn create_source(settings: &ValidatedSettings) -> Source {
    Source::csv(settings.file_name(), settings.delimiter())
}

/// ClickHouse destination, or a row-counting memory store for dry runs.
pub fn create_destination(settings: &ValidatedSettings) -> Destination {
    let table = TableSchema::performance(settings.table());

    if settings.dry_run() {
        return Destination::memory(MemoryStore::counting(), table);
    }

    let store = settings.store();
    Destination::clickhouse(
        ClickHouseOptions {
            addr: store.addr.clone(),
            database: store.database.clone(),
            user: store.user.clone(),
            password: store.password.clone(),
        },
        table,
    )
}
