//! Directory state controller: owns paging, search and result state and
//! orchestrates backend calls.
//!
//! Every page load takes a sequence number when it is issued. Only the
//! response to the most recently issued load may touch the visible state, so
//! an older search that answers late cannot overwrite a newer one.

use std::{collections::VecDeque, sync::Arc};

use shared::{
    domain::{Contact, ContactId, NewContact},
    protocol::PageRequest,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{error::ClientError, events::Notification, ContactBackend};

pub const CONTACT_ADDED_MESSAGE: &str = "Contact added successfully";
pub const CONTACT_DELETED_MESSAGE: &str = "Contact deleted successfully";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryState {
    pub current_page: u32,
    pub page_size: u32,
    pub search_text: String,
    pub items: Vec<Contact>,
    pub total: u64,
    pub loading: bool,
    pub error: Option<String>,
}

impl DirectoryState {
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            search_text: String::new(),
            items: Vec::new(),
            total: 0,
            loading: false,
            error: None,
        }
    }

    fn query(&self) -> Option<&str> {
        if self.search_text.is_empty() {
            None
        } else {
            Some(&self.search_text)
        }
    }
}

/// What happened to a page load once its response arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed(ClientError),
    /// A newer load was issued before this one answered; its response was dropped.
    Superseded,
}

struct Inner {
    state: DirectoryState,
    latest_seq: u64,
    notifications: VecDeque<Notification>,
}

impl Inner {
    fn issue(&mut self) -> u64 {
        self.latest_seq += 1;
        self.state.loading = true;
        self.latest_seq
    }

    fn current_request(&self) -> PageRequest {
        let state = &self.state;
        PageRequest::new(state.current_page, state.page_size, state.query())
    }
}

pub struct DirectoryController {
    backend: Arc<dyn ContactBackend>,
    inner: Mutex<Inner>,
}

impl DirectoryController {
    pub fn new(backend: Arc<dyn ContactBackend>, page_size: u32) -> Self {
        Self {
            backend,
            inner: Mutex::new(Inner {
                state: DirectoryState::new(page_size),
                latest_seq: 0,
                notifications: VecDeque::new(),
            }),
        }
    }

    pub async fn snapshot(&self) -> DirectoryState {
        self.inner.lock().await.state.clone()
    }

    pub async fn drain_notifications(&self) -> Vec<Notification> {
        self.inner.lock().await.notifications.drain(..).collect()
    }

    pub async fn load(&self, page: u32, page_size: u32, query: Option<&str>) -> LoadOutcome {
        let request = PageRequest::new(page, page_size, query);
        let seq = self.inner.lock().await.issue();
        self.fetch_page(seq, request).await
    }

    /// Runs a load whose sequence number was taken in the same critical
    /// section as the state change that triggered it.
    async fn fetch_page(&self, seq: u64, request: PageRequest) -> LoadOutcome {
        debug!(
            seq,
            page = request.page,
            page_size = request.page_size,
            query = request.query.as_deref().unwrap_or(""),
            "loading contacts"
        );

        let result = self.backend.list_contacts(&request).await;

        let mut inner = self.inner.lock().await;
        if seq != inner.latest_seq {
            debug!(seq, latest = inner.latest_seq, "discarding stale page response");
            return LoadOutcome::Superseded;
        }
        inner.state.loading = false;

        match result {
            Ok(mut page) => {
                let limit = request.page_size as usize;
                if page.items.len() > limit {
                    warn!(
                        received = page.items.len(),
                        page_size = request.page_size,
                        "backend returned more items than requested; truncating"
                    );
                    page.items.truncate(limit);
                }
                let state = &mut inner.state;
                state.total = page.total.max(page.items.len() as u64);
                state.items = page.items;
                state.current_page = request.page;
                state.page_size = request.page_size;
                state.error = None;
                LoadOutcome::Loaded
            }
            Err(err) => {
                let message = err.message();
                warn!(seq, error = %message, "failed to load contacts");
                inner.state.error = Some(message.clone());
                inner
                    .notifications
                    .push_back(Notification::failure(&err, message));
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Starts a new search from page 1.
    pub async fn search(&self, text: &str) -> LoadOutcome {
        let (seq, request) = {
            let mut inner = self.inner.lock().await;
            inner.state.search_text = text.trim().to_string();
            inner.state.current_page = 1;
            let request = inner.current_request();
            (inner.issue(), request)
        };
        self.fetch_page(seq, request).await
    }

    pub async fn change_page(&self, page: u32, page_size: u32) -> LoadOutcome {
        let (seq, request) = {
            let mut inner = self.inner.lock().await;
            inner.state.current_page = page.max(1);
            inner.state.page_size = page_size.max(1);
            let request = inner.current_request();
            (inner.issue(), request)
        };
        self.fetch_page(seq, request).await
    }

    pub async fn reload(&self) -> LoadOutcome {
        let (seq, request) = {
            let mut inner = self.inner.lock().await;
            let request = inner.current_request();
            (inner.issue(), request)
        };
        self.fetch_page(seq, request).await
    }

    /// Deletes a contact, stepping back a page when it was the last one shown
    /// on a page past the first.
    pub async fn remove(&self, id: ContactId) -> Result<LoadOutcome, ClientError> {
        if let Err(err) = self.backend.delete_contact(id).await {
            let message = format!("Error deleting contact: {}", err.message());
            warn!(contact_id = %id, error = %message, "delete failed");
            self.inner
                .lock()
                .await
                .notifications
                .push_back(Notification::failure(&err, message));
            return Err(err);
        }

        let (seq, request) = {
            let mut inner = self.inner.lock().await;
            inner
                .notifications
                .push_back(Notification::success(CONTACT_DELETED_MESSAGE));
            let state = &mut inner.state;
            if state.current_page > 1 && state.items.len() <= 1 {
                state.current_page -= 1;
            }
            let request = inner.current_request();
            (inner.issue(), request)
        };
        info!(contact_id = %id, page = request.page, "contact deleted");
        Ok(self.fetch_page(seq, request).await)
    }

    /// The new contact lands wherever the backend's ordering puts it, which may
    /// not be the page currently shown.
    pub async fn refresh_after_create(&self) -> LoadOutcome {
        self.reload().await
    }

    pub async fn create(&self, contact: &NewContact) -> Result<Contact, ClientError> {
        let created = self.backend.create_contact(contact).await?;
        info!(contact_id = %created.id, "contact created");
        self.inner
            .lock()
            .await
            .notifications
            .push_back(Notification::success(CONTACT_ADDED_MESSAGE));
        Ok(created)
    }

    pub async fn fetch_contact(&self, id: ContactId) -> Result<Contact, ClientError> {
        self.backend.get_contact(id).await
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
