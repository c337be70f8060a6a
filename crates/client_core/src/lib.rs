use async_trait::async_trait;
use shared::{
    domain::{Contact, ContactId, NewContact},
    protocol::{PageRequest, PageResult},
};

pub mod controller;
pub mod error;
pub mod events;
pub mod form;
pub mod transport;
pub mod view;

pub use controller::{DirectoryController, DirectoryState, LoadOutcome};
pub use error::ClientError;
pub use form::{CreationForm, SubmitOutcome};
pub use transport::HttpContactBackend;

/// The four REST calls the directory makes.
#[async_trait]
pub trait ContactBackend: Send + Sync {
    async fn list_contacts(&self, request: &PageRequest) -> Result<PageResult, ClientError>;
    async fn get_contact(&self, id: ContactId) -> Result<Contact, ClientError>;
    async fn create_contact(&self, contact: &NewContact) -> Result<Contact, ClientError>;
    async fn delete_contact(&self, id: ContactId) -> Result<(), ClientError>;
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod transport_tests;
