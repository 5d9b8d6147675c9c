//! src/service.rs
use crate::error::StageFailure;
use crate::pipeline::{
    MapRequest, MapResponse, ReduceRequest, ReduceResponse, SplitRequest, SplitResponse,
    StageService,
};
use tarpc::context;

#[tarpc::service]
pub trait WordCount {
    async fn split(request: SplitRequest) -> Result<SplitResponse, StageFailure>;

    async fn map(request: MapRequest) -> Result<MapResponse, StageFailure>;

    async fn reduce(request: ReduceRequest) -> Result<ReduceResponse, StageFailure>;

    async fn health() -> bool;
}

#[derive(Clone)]
pub struct WordCountServer {
    stages: StageService,
}

impl WordCountServer {
    pub fn new(stages: StageService) -> Self {
        Self { stages }
    }
}

fn report<T>(stage: &str, result: Result<T, crate::error::PipelineError>) -> Result<T, StageFailure> {
    result.map_err(|e| {
        tracing::error!(stage, kind = %e.kind(), error.cause_chain = ?e, "Stage failed");
        StageFailure::from(e)
    })
}

impl WordCount for WordCountServer {
    async fn split(
        self,
        _: context::Context,
        request: SplitRequest,
    ) -> Result<SplitResponse, StageFailure> {
        report("split", self.stages.split(request).await)
    }

    async fn map(self, _: context::Context, request: MapRequest) -> Result<MapResponse, StageFailure> {
        report("map", self.stages.map(request).await)
    }

    async fn reduce(
        self,
        _: context::Context,
        request: ReduceRequest,
    ) -> Result<ReduceResponse, StageFailure> {
        report("reduce", self.stages.reduce(request).await)
    }

    async fn health(self, _: context::Context) -> bool {
        true
    }
}
