use std::sync::Arc;

use serde::Serialize;

use crate::hours_store::HoursStore;
use crate::schedule::service::ScheduleService;

#[derive(Clone)]
pub struct AppState {
    pub schedule: Arc<ScheduleService>,
    pub hours_store: Arc<dyn HoursStore>,
}

/* -------------------------
   Shared response envelopes
--------------------------*/

#[derive(Debug, Serialize)]
pub struct ApiOk<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub data: OkData,
}

#[derive(Debug, Serialize)]
pub struct OkData {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self {
            data: OkData { ok: true },
        }
    }
}
