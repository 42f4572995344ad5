#[cfg(test)]
mod tests {
    use crate::{
        error::IngestError,
        execution::executor::{run, run_with},
    };
    use connectors::{file::csv::error::FileError, store::memory::MemoryStore};
    use engine_config::settings::{
        IngestSettings, error::SettingsError, validated::ValidatedSettings,
    };
    use engine_core::connectors::destination::Destination;
    use engine_processing::error::{ConsumerError, ProducerError};
    use model::{
        core::schema::TableSchema,
        records::coercion::{CoercionError, CoercionPolicy},
    };
    use std::{
        collections::{BTreeMap, HashSet},
        io::Write,
        path::Path,
        time::Duration,
    };
    use tempfile::NamedTempFile;
    use tokio_util::sync::CancellationToken;

    const HEADER: &str = "quadkey,tile,tile_x,tile_y,avg_d_kbps,avg_u_kbps,avg_lat_ms,avg_lat_down_ms,avg_lat_up_ms,tests,devices";

    fn line(i: usize) -> String {
        format!(
            "0231{i},\"POLYGON((-160.02 70.64, -160.01 70.64))\",-160.0{},70.6,{i},{},{},{},{},{},{}",
            i % 10,
            i * 2,
            i % 100,
            i % 90,
            i % 80,
            i % 7 + 1,
            i % 3 + 1
        )
    }

    fn input(records: usize) -> NamedTempFile {
        let lines: Vec<String> = (0..records).map(line).collect();
        input_from(&lines)
    }

    fn input_from(lines: &[String]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for l in lines {
            writeln!(file, "{l}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn settings(path: &Path, batch_size: usize, num_workers: usize) -> ValidatedSettings {
        IngestSettings {
            batch_size,
            num_workers,
            file_name: path.to_path_buf(),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    fn destination(store: &MemoryStore) -> Destination {
        Destination::memory(store.clone(), TableSchema::performance("performance"))
    }

    /// Committed batch sizes keyed by the connection that sent them.
    fn batches_by_connection(store: &MemoryStore) -> BTreeMap<usize, Vec<usize>> {
        let mut by_conn: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for batch in store.committed() {
            by_conn.entry(batch.connection).or_default().push(batch.row_count);
        }
        by_conn
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_workers_commit_every_record_once() {
        let file = input(25_000);
        let store = MemoryStore::new();

        let report = run_with(
            settings(file.path(), 10_000, 2),
            destination(&store),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(report.rows_committed(), 25_000);
        assert_eq!(report.metrics.records_read, 25_000);
        assert_eq!(store.committed_rows(), 25_000);

        let keys: HashSet<String> = store
            .committed()
            .iter()
            .flat_map(|b| b.rows.iter().map(|r| r.quad_key.clone()))
            .collect();
        assert_eq!(keys.len(), 25_000);

        for (conn, sizes) in batches_by_connection(&store) {
            let rows: usize = sizes.iter().sum();
            assert!(sizes.iter().all(|&s| s <= 10_000), "connection {conn}: {sizes:?}");
            assert!(sizes.iter().filter(|&&s| s < 10_000).count() <= 1);
            assert_eq!(sizes.len(), rows.div_ceil(10_000));
        }

        assert_eq!(report.workers.len(), 2);
        let per_worker: u64 = report.workers.iter().map(|w| w.rows).sum();
        assert_eq!(per_worker, 25_000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_batch_sizes_hold_across_worker_counts() {
        for (records, batch_size, workers) in [(1, 1, 3), (17, 4, 3), (100, 7, 5), (64, 64, 2)] {
            let file = input(records);
            let store = MemoryStore::new();

            let report = run_with(
                settings(file.path(), batch_size, workers),
                destination(&store),
                CancellationToken::new(),
            )
            .await
            .unwrap();

            assert_eq!(report.rows_committed(), records as u64);
            for sizes in batches_by_connection(&store).values() {
                let rows: usize = sizes.iter().sum();
                assert!(sizes.iter().all(|&s| s >= 1 && s <= batch_size));
                assert_eq!(sizes.len(), rows.div_ceil(batch_size));
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_single_worker_preserves_input_order_and_values() {
        let file = input(250);
        let store = MemoryStore::new();

        run_with(
            settings(file.path(), 100, 1),
            destination(&store),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        let rows: Vec<_> = store
            .committed()
            .into_iter()
            .flat_map(|b| b.rows)
            .collect();
        assert_eq!(rows.len(), 250);

        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.quad_key, format!("0231{i}"));
            assert_eq!(row.tile_wkt, "POLYGON((-160.02 70.64, -160.01 70.64))");
            assert_eq!(row.tile_x, format!("-160.0{}", i % 10).parse::<f32>().unwrap());
            assert_eq!(row.tile_y, 70.6);
            assert_eq!(row.download_speed_kbps, i as u32);
            assert_eq!(row.upload_speed_kbps, (i * 2) as u32);
            assert_eq!(row.tests, (i % 7 + 1) as u32);
            assert_eq!(row.devices, (i % 3 + 1) as u16);
        }

        let sizes: Vec<usize> = store.committed().iter().map(|b| b.row_count).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
    }

    #[tokio::test]
    async fn test_header_only_input_commits_nothing() {
        let file = input(0);
        let store = MemoryStore::new();

        let report = run_with(
            settings(file.path(), 10, 3),
            destination(&store),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(report.rows_committed(), 0);
        assert_eq!(store.batches_prepared(), 0);
        assert!(report.workers.iter().all(|w| w.batches == 0));
    }

    #[tokio::test]
    async fn test_missing_file_aborts_before_any_batch() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();

        let err = run_with(
            settings(&dir.path().join("absent.csv"), 10, 2),
            destination(&store),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, IngestError::Source(FileError::NotFound(_))));
        assert_eq!(store.batches_prepared(), 0);
        // Only the reachability check connected
        assert_eq!(store.connections_opened(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_store_aborts_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new().unreachable();

        // The input is missing too; the store check must fail first
        let err = run_with(
            settings(&dir.path().join("absent.csv"), 10, 2),
            destination(&store),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, IngestError::Unreachable(_)));
        assert_eq!(store.connections_opened(), 1);
        assert_eq!(store.batches_prepared(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_decode_error_fails_run_without_final_flush() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for i in 0..40 {
            if i == 20 {
                // Not valid UTF-8
                file.write_all(b"0231\xff\xfe,POLYGON EMPTY,0,0,0,0,0,0,0,0,0\n").unwrap();
            }
            writeln!(file, "{}", line(i)).unwrap();
        }
        file.flush().unwrap();
        let store = MemoryStore::new();

        let err = run_with(
            settings(file.path(), 1_000, 2),
            destination(&store),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

        match err {
            IngestError::Producer(ProducerError::Decode(FileError::Decode { line, .. })) => {
                assert_eq!(line, 22)
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.committed().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_commit_failure_fails_run() {
        let file = input(200);
        let store = MemoryStore::new().fail_on_send(2);

        let err = run_with(
            settings(file.path(), 10, 2),
            destination(&store),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            IngestError::Worker {
                source: ConsumerError::Commit { .. },
                ..
            }
        ));
        assert!(store.committed_rows() < 200);
    }

    #[tokio::test]
    async fn test_cancelled_run_reports_cancellation() {
        let file = input(50);
        let store = MemoryStore::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = run_with(settings(file.path(), 10, 2), destination(&store), cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::Cancelled));
        assert!(store.committed().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_during_run_stops_without_final_flush() {
        let file = input(1_000);
        let store = MemoryStore::new().with_send_delay(Duration::from_millis(20));
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run_with(
            settings(file.path(), 2, 1),
            destination(&store),
            cancel.clone(),
        ));

        // The producer is parked on the full channel while the worker commits
        while store.committed_rows() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(10), handle)
            .await
            .expect("run did not stop after cancellation")
            .unwrap();

        assert!(matches!(result, Err(IngestError::Cancelled)));
        assert!(store.committed_rows() < 1_000);
        assert!(store.committed().iter().all(|b| b.row_count == 2));
    }

    #[tokio::test]
    async fn test_zero_sizes_are_rejected() {
        let err = run(
            IngestSettings {
                batch_size: 0,
                dry_run: true,
                ..Default::default()
            },
            CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            IngestError::Settings(SettingsError::InvalidBatchSize(0))
        ));

        let err = run(
            IngestSettings {
                num_workers: 0,
                dry_run: true,
                ..Default::default()
            },
            CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            IngestError::Settings(SettingsError::InvalidWorkerCount(0))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dry_run_counts_rows() {
        let file = input(123);

        let report = run(
            IngestSettings {
                batch_size: 50,
                num_workers: 3,
                file_name: file.path().to_path_buf(),
                dry_run: true,
                ..Default::default()
            },
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.destination, "memory://");
        assert_eq!(report.rows_committed(), 123);
    }

    /// Ten records, the fifth of which has only nine fields.
    fn input_with_short_record() -> NamedTempFile {
        let mut lines: Vec<String> = (0..10).map(line).collect();
        lines[4] = "02314,POLYGON EMPTY,-160.04,70.6,4,8,4,4,4".to_string();
        input_from(&lines)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_short_record_fails_run_by_default() {
        let file = input_with_short_record();
        let store = MemoryStore::new();

        let err = run_with_policy(&file, &store, CoercionPolicy::Fail)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IngestError::Worker {
                source: ConsumerError::Coercion(CoercionError::FieldCount {
                    line: 6,
                    expected: 11,
                    found: 9
                }),
                ..
            }
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_short_record_skip_policy_drops_record() {
        let file = input_with_short_record();
        let store = MemoryStore::new();

        let report = run_with_policy(&file, &store, CoercionPolicy::Skip)
            .await
            .unwrap();

        assert_eq!(report.rows_committed(), 9);
        assert_eq!(report.metrics.rows_skipped, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_short_record_zero_policy_defaults_missing_fields() {
        let file = input_with_short_record();
        let store = MemoryStore::new();

        let report = run_with_policy(&file, &store, CoercionPolicy::Zero)
            .await
            .unwrap();

        assert_eq!(report.rows_committed(), 10);
        assert_eq!(report.metrics.fields_defaulted, 2);

        let row = store
            .committed()
            .into_iter()
            .flat_map(|b| b.rows)
            .find(|r| r.quad_key == "02314")
            .unwrap();
        assert_eq!(row.upload_latency_ms, 4);
        assert_eq!(row.tests, 0);
        assert_eq!(row.devices, 0);
    }

    fn input_with_bad_latency() -> NamedTempFile {
        let mut lines: Vec<String> = (0..10).map(line).collect();
        lines[4] = "02314,POLYGON EMPTY,-160.04,70.6,4,8,slow,4,4,5,2".to_string();
        input_from(&lines)
    }

    async fn run_with_policy(
        file: &NamedTempFile,
        store: &MemoryStore,
        policy: CoercionPolicy,
    ) -> Result<engine_config::report::summary::SummaryReport, IngestError> {
        let mut settings = settings(file.path(), 4, 1);
        settings.on_invalid = policy;
        run_with(settings, destination(store), CancellationToken::new()).await
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_invalid_field_fails_run_by_default() {
        let file = input_with_bad_latency();
        let store = MemoryStore::new();

        let err = run_with_policy(&file, &store, CoercionPolicy::Fail)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IngestError::Worker {
                source: ConsumerError::Coercion(CoercionError::InvalidField { line: 6, .. }),
                ..
            }
        ));
        // The first full batch was committed before the bad record
        assert_eq!(store.committed_rows(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_invalid_field_skip_policy_drops_record() {
        let file = input_with_bad_latency();
        let store = MemoryStore::new();

        let report = run_with_policy(&file, &store, CoercionPolicy::Skip)
            .await
            .unwrap();

        assert_eq!(report.rows_committed(), 9);
        assert_eq!(report.metrics.rows_skipped, 1);
        assert!(
            !store
                .committed()
                .iter()
                .flat_map(|b| b.rows.iter())
                .any(|r| r.quad_key == "02314")
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_invalid_field_zero_policy_defaults_field() {
        let file = input_with_bad_latency();
        let store = MemoryStore::new();

        let report = run_with_policy(&file, &store, CoercionPolicy::Zero)
            .await
            .unwrap();

        assert_eq!(report.rows_committed(), 10);
        assert_eq!(report.metrics.fields_defaulted, 1);

        let row = store
            .committed()
            .into_iter()
            .flat_map(|b| b.rows)
            .find(|r| r.quad_key == "02314")
            .unwrap();
        assert_eq!(row.latency_ms, 0);
        assert_eq!(row.download_speed_kbps, 4);
    }
}
