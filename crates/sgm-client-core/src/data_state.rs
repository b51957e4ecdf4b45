use futures::channel::oneshot;
use sgm_shared::errors::ClientError;
use tracing::error;

#[derive(Debug)]
pub struct AwaitingType<T>(pub oneshot::Receiver<Result<T, ClientError>>);

/// Data fetched once and then kept, polled from the event loop
#[derive(Debug, Default)]
pub enum DataState<T> {
    #[default]
    None,
    AwaitingResponse(AwaitingType<T>),
    Present(T),
    Failed(ClientError),
}

impl<T> AwaitingType<T> {
    /// Returns the outcome if the request has finished
    ///
    /// A dropped sender is reported as a network failure
    pub fn try_take(&mut self) -> Option<Result<T, ClientError>> {
        match self.0.try_recv() {
            Ok(recv_opt) => recv_opt,
            Err(e) => {
                let err_msg = format!("Error receiving on channel. Error: {e:?}");
                error!(err_msg, "Error receiving on channel");
                Some(Err(ClientError::NetworkFailure(err_msg)))
            }
        }
    }
}

impl<T> DataState<T> {
    /// Starts the fetch if nothing has been requested yet, otherwise checks if
    /// the response has arrived
    ///
    /// Does nothing once the data is present or the request failed. Use
    /// [`Self::retry`] to try again after a failure.
    pub fn get<F>(&mut self, fetch_fn: F)
    where
        F: FnOnce() -> AwaitingType<T>,
    {
        match self {
            DataState::None => {
                let rx = fetch_fn();
                *self = DataState::AwaitingResponse(rx);
            }
            DataState::AwaitingResponse(_) => self.poll(),
            DataState::Present(_) | DataState::Failed(_) => {}
        }
    }

    /// Moves to [`Present`] or [`Failed`] if the response has arrived
    ///
    /// [`Present`]: DataState::Present
    /// [`Failed`]: DataState::Failed
    pub fn poll(&mut self) {
        let DataState::AwaitingResponse(rx) = self else {
            return;
        };
        if let Some(outcome) = rx.try_take() {
            *self = match outcome {
                Ok(data) => DataState::Present(data),
                Err(e) => {
                    error!(?e, "Error response received instead of the data");
                    DataState::Failed(e)
                }
            };
        }
    }

    /// Discards a failure so that the next [`Self::get`] fetches again
    pub fn retry(&mut self) {
        if self.is_failed() {
            *self = DataState::None;
        }
    }

    pub fn present(&self) -> Option<&T> {
        match self {
            DataState::Present(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            DataState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Returns `true` if the data state is [`Present`].
    ///
    /// [`Present`]: DataState::Present
    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(..))
    }

    /// Returns `true` if the data state is [`None`].
    ///
    /// [`None`]: DataState::None
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns `true` if the data state is [`AwaitingResponse`].
    ///
    /// [`AwaitingResponse`]: DataState::AwaitingResponse
    #[must_use]
    pub fn is_awaiting_response(&self) -> bool {
        matches!(self, Self::AwaitingResponse(..))
    }

    /// Returns `true` if the data state is [`Failed`].
    ///
    /// [`Failed`]: DataState::Failed
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(..))
    }
}
