use std::{fmt, sync::Arc};

use crate::DataAccess;

/// Per-request execution context handed to every resolver.
///
/// It only carries a handle to the data-access collaborator. Resolvers read it, they never write to it,
/// so a single instance can be shared by all the fields of a request.
#[derive(Clone)]
pub struct Context {
    data_access: Arc<dyn DataAccess>,
}

impl Context {
    pub fn new(data_access: impl DataAccess + 'static) -> Self {
        Self {
            data_access: Arc::new(data_access),
        }
    }

    pub fn from_shared(data_access: Arc<dyn DataAccess>) -> Self {
        Self { data_access }
    }

    pub fn data_access(&self) -> &dyn DataAccess {
        self.data_access.as_ref()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}
