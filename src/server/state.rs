use axum::extract::FromRef;

use crate::mutations::{NotificationRouter, ResultReporter, ViewCounter};
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedNotificationRouter = Arc<NotificationRouter>;
pub type GuardedViewCounter = Arc<ViewCounter>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub notification_router: GuardedNotificationRouter,
    pub view_counter: GuardedViewCounter,
    pub reporter: ResultReporter,
    pub version: String,
}

impl FromRef<ServerState> for GuardedNotificationRouter {
    fn from_ref(input: &ServerState) -> Self {
        input.notification_router.clone()
    }
}

impl FromRef<ServerState> for GuardedViewCounter {
    fn from_ref(input: &ServerState) -> Self {
        input.view_counter.clone()
    }
}

impl FromRef<ServerState> for ResultReporter {
    fn from_ref(input: &ServerState) -> Self {
        input.reporter.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
