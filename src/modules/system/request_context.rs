use std::future::Future;

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: String,
}

tokio::task_local! {
    static CURRENT: RequestContext;
}

pub async fn with_request_context<F, T>(ctx: RequestContext, fut: F) -> T
where
    F: Future<Output = T>,
{
    CURRENT.scope(ctx, fut).await
}

/// Request id of the current task, if it runs inside a request.
pub fn current_request_id() -> Option<String> {
    CURRENT.try_with(|ctx| ctx.request_id.clone()).ok()
}
