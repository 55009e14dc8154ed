use std::sync::Arc;

use crate::application::inventory::InventoryService;
use crate::application::ponds::PondService;
use crate::application::readings::ReadingService;
use crate::cache::CacheInvalidator;

#[derive(Clone)]
pub struct ApiState {
    pub inventory: InventoryService,
    pub ponds: PondService,
    pub readings: ReadingService,
    pub invalidator: Arc<CacheInvalidator>,
}
