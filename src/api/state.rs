use crate::core::lookup::LookupService;
use crate::domain::ports::Repository;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub lookup: LookupService,
}

impl AppState {
    pub fn new(lookup: LookupService) -> Self {
        Self { lookup }
    }

    pub fn store(&self) -> &dyn Repository {
        self.lookup.store()
    }
}
