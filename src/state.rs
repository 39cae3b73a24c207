use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::events::InProcessEventBus;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub bus: Arc<InProcessEventBus>,
    pub config: Arc<Config>,
}
