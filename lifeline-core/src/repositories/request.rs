use async_trait::async_trait;

use crate::{
    Error,
    request::{HelpRequest, NewHelpRequest, RequestId, RequestStatus},
    user::UserId,
};

/// Repository for help-request data.
#[async_trait]
pub trait RequestRepository: Send + Sync + 'static {
    /// Create a new help request with status `pending`.
    async fn create(&self, request: NewHelpRequest) -> Result<HelpRequest, Error>;

    /// Find a request by id.
    async fn find_by_id(&self, id: &RequestId) -> Result<Option<HelpRequest>, Error>;

    /// Replace a stored request with the given record.
    ///
    /// The caller owns read-modify-write consistency; concurrent updates to
    /// the same record are last-writer-wins.
    async fn update(&self, request: &HelpRequest) -> Result<HelpRequest, Error>;

    /// Delete a request by id.
    async fn delete(&self, id: &RequestId) -> Result<(), Error>;

    /// List all requests, newest first.
    async fn list(&self) -> Result<Vec<HelpRequest>, Error>;

    /// List the requests submitted by a given account, newest first.
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<HelpRequest>, Error>;

    /// Count all requests.
    async fn count(&self) -> Result<u64, Error>;

    /// Count requests currently in the given status.
    async fn count_by_status(&self, status: RequestStatus) -> Result<u64, Error>;
}
