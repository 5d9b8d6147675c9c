//! tests/api/helpers.rs
use mini_mapreduce::driver::Driver;
use mini_mapreduce::pipeline::StageService;
use mini_mapreduce::run_id::SeededRunIds;
use mini_mapreduce::service::WordCountClient;
use mini_mapreduce::startup::Application;
use mini_mapreduce::storage::{InMemoryStorage, ObjectStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tarpc::client::Config;
use tarpc::tokio_serde::formats::Json;

pub const BUCKET: &str = "books";
pub const RUN_ID_SEED: u64 = 6650;

pub fn test_data_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("data");
    path
}

pub struct TestApp {
    pub application: Application,
    pub storage: InMemoryStorage,
}

impl TestApp {
    pub async fn put_source(&self, key: &str, text: &str) -> String {
        self.storage
            .put(BUCKET, key, text.as_bytes())
            .await
            .expect("Failed to store source text");
        format!("s3://{BUCKET}/{key}")
    }

    pub async fn driver(&self) -> Driver {
        Driver::connect(self.application.address(), Duration::from_secs(10))
            .await
            .expect("Failed to connect driver")
    }

    pub async fn client(&self) -> WordCountClient {
        let mut transport =
            tarpc::serde_transport::tcp::connect(self.application.address(), Json::default);
        transport.config_mut().max_frame_length(usize::MAX);
        WordCountClient::new(
            Config::default(),
            transport.await.expect("Failed to connect client"),
        )
        .spawn()
    }
}

pub async fn spawn_app() -> TestApp {
    let storage = InMemoryStorage::new();
    let stages = StageService::new(
        Arc::new(storage.clone()),
        Arc::new(SeededRunIds::new(RUN_ID_SEED)),
        256,
    );
    let application = Application::serve("127.0.0.1:0".parse().unwrap(), stages)
        .await
        .expect("Failed to start application");
    TestApp {
        application,
        storage,
    }
}
