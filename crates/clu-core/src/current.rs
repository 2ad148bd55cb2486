//! The current command queue.
//!
//! Programs that drive a single queue can register it here once and later
//! ask for it, or for its context and device, without threading the handles
//! around.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::QueueApi;
use crate::error::{CluError, Result};
use crate::types::{ContextId, DeviceId, QueueId};

const GET_COMMAND_QUEUE_INFO: &str = "clGetCommandQueueInfo";

/// A queue together with the context and device it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueBinding {
    /// The queue.
    pub queue: QueueId,
    /// Context the queue was created in.
    pub context: ContextId,
    /// Device the queue submits to.
    pub device: DeviceId,
}

impl QueueBinding {
    /// Resolve the context and device of `queue`.
    ///
    /// # Errors
    ///
    /// Returns the driver's status as [`CluError::Api`].
    pub fn resolve<A: QueueApi + ?Sized>(api: &A, queue: QueueId) -> Result<Self> {
        let context = api
            .queue_context(queue)
            .map_err(|status| CluError::api(GET_COMMAND_QUEUE_INFO, status))?;
        let device = api
            .queue_device(queue)
            .map_err(|status| CluError::api(GET_COMMAND_QUEUE_INFO, status))?;
        Ok(Self {
            queue,
            context,
            device,
        })
    }
}

/// Holder of the current queue binding.
#[derive(Debug, Default)]
pub struct CurrentQueue {
    binding: RwLock<Option<QueueBinding>>,
}

impl CurrentQueue {
    /// Nothing current.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `queue` current and return the previous binding.
    ///
    /// The queue is resolved before anything changes, so on error the
    /// previous binding stays current.
    ///
    /// # Errors
    ///
    /// Returns the driver's status if the queue cannot be resolved.
    pub fn set<A: QueueApi + ?Sized>(&self, api: &A, queue: QueueId) -> Result<Option<QueueBinding>> {
        let binding = QueueBinding::resolve(api, queue)?;
        debug!(%queue, context = %binding.context, device = %binding.device, "current queue set");
        Ok(self.binding.write().replace(binding))
    }

    /// Forget the current queue, returning it.
    pub fn clear(&self) -> Option<QueueBinding> {
        self.binding.write().take()
    }

    /// The current binding.
    ///
    /// # Errors
    ///
    /// [`CluError::NoCurrentQueue`] if none is set.
    pub fn binding(&self) -> Result<QueueBinding> {
        (*self.binding.read()).ok_or(CluError::NoCurrentQueue)
    }

    /// The current queue.
    ///
    /// # Errors
    ///
    /// [`CluError::NoCurrentQueue`] if none is set.
    pub fn queue(&self) -> Result<QueueId> {
        self.binding().map(|binding| binding.queue)
    }

    /// Context of the current queue.
    ///
    /// # Errors
    ///
    /// [`CluError::NoCurrentQueue`] if none is set.
    pub fn context(&self) -> Result<ContextId> {
        self.binding().map(|binding| binding.context)
    }

    /// Device of the current queue.
    ///
    /// # Errors
    ///
    /// [`CluError::NoCurrentQueue`] if none is set.
    pub fn device(&self) -> Result<DeviceId> {
        self.binding().map(|binding| binding.device)
    }
}
