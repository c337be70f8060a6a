//! In-memory [`ContactBackend`] used by controller, form and view tests.

use std::collections::HashMap;

use async_trait::async_trait;
use shared::{
    domain::{Contact, ContactId, NewContact},
    error::{ApiError, ErrorCode},
    protocol::{PageRequest, PageResult},
};
use tokio::sync::{oneshot, Mutex};

use crate::{error::ClientError, ContactBackend};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(PageRequest),
    Get(ContactId),
    Create(NewContact),
    Delete(ContactId),
}

pub struct FakeBackend {
    contacts: Mutex<Vec<Contact>>,
    next_id: Mutex<i64>,
    calls: Mutex<Vec<Call>>,
    fail_list: Mutex<Option<ClientError>>,
    fail_create: Mutex<Option<ClientError>>,
    fail_delete: Mutex<Option<ClientError>>,
    held_queries: Mutex<HashMap<String, oneshot::Receiver<()>>>,
}

impl Default for FakeBackend {
    /// Empty directory; the first created contact gets id 1.
    fn default() -> Self {
        Self {
            contacts: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
            calls: Mutex::new(Vec::new()),
            fail_list: Mutex::new(None),
            fail_create: Mutex::new(None),
            fail_delete: Mutex::new(None),
            held_queries: Mutex::new(HashMap::new()),
        }
    }
}

pub fn contact(id: i64, name: &str) -> Contact {
    Contact {
        id: ContactId(id),
        name: name.to_string(),
        description: format!("{name} works here"),
        photo_url: format!("https://cdn.example.com/{id}.png"),
    }
}

pub fn not_found() -> ClientError {
    ClientError::Backend(ApiError::new(ErrorCode::NotFound, 404, "404 Not Found"))
}

impl FakeBackend {
    pub fn with_contacts(contacts: Vec<Contact>) -> Self {
        let next_id = contacts.iter().map(|c| c.id.0).max().unwrap_or(0) + 1;
        Self {
            contacts: Mutex::new(contacts),
            next_id: Mutex::new(next_id),
            ..Self::default()
        }
    }

    pub fn numbered(count: i64) -> Self {
        Self::with_contacts((1..=count).map(|id| contact(id, &format!("person-{id}"))).collect())
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    pub async fn list_calls(&self) -> Vec<PageRequest> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                Call::List(req) => Some(req.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn fail_list_with(&self, err: Option<ClientError>) {
        *self.fail_list.lock().await = err;
    }

    pub async fn fail_create_with(&self, err: ClientError) {
        *self.fail_create.lock().await = Some(err);
    }

    pub async fn fail_delete_with(&self, err: ClientError) {
        *self.fail_delete.lock().await = Some(err);
    }

    /// Holds list responses for `query` until the returned sender fires.
    pub async fn hold_query(&self, query: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.held_queries.lock().await.insert(query.to_string(), rx);
        tx
    }
}

fn matches_query(contact: &Contact, query: &str) -> bool {
    let query = query.to_lowercase();
    contact.name.to_lowercase().contains(&query)
        || contact.description.to_lowercase().contains(&query)
}

#[async_trait]
impl ContactBackend for FakeBackend {
    async fn list_contacts(&self, request: &PageRequest) -> Result<PageResult, ClientError> {
        self.calls.lock().await.push(Call::List(request.clone()));

        let gate = match &request.query {
            Some(query) => self.held_queries.lock().await.remove(query),
            None => None,
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if let Some(err) = self.fail_list.lock().await.clone() {
            return Err(err);
        }

        let contacts = self.contacts.lock().await;
        let filtered: Vec<Contact> = contacts
            .iter()
            .filter(|c| {
                request
                    .query
                    .as_deref()
                    .map_or(true, |query| matches_query(c, query))
            })
            .cloned()
            .collect();
        let start = ((request.page - 1) * request.page_size) as usize;
        let items = filtered
            .iter()
            .skip(start)
            .take(request.page_size as usize)
            .cloned()
            .collect();
        Ok(PageResult::new(items, filtered.len() as u64))
    }

    async fn get_contact(&self, id: ContactId) -> Result<Contact, ClientError> {
        self.calls.lock().await.push(Call::Get(id));
        self.contacts
            .lock()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_contact(&self, new_contact: &NewContact) -> Result<Contact, ClientError> {
        self.calls.lock().await.push(Call::Create(new_contact.clone()));
        if let Some(err) = self.fail_create.lock().await.clone() {
            return Err(err);
        }
        let mut next_id = self.next_id.lock().await;
        let created = Contact {
            id: ContactId(*next_id),
            name: new_contact.name.clone(),
            description: new_contact.description.clone(),
            photo_url: new_contact.photo_url.clone(),
        };
        *next_id += 1;
        self.contacts.lock().await.push(created.clone());
        Ok(created)
    }

    async fn delete_contact(&self, id: ContactId) -> Result<(), ClientError> {
        self.calls.lock().await.push(Call::Delete(id));
        if let Some(err) = self.fail_delete.lock().await.clone() {
            return Err(err);
        }
        let mut contacts = self.contacts.lock().await;
        let before = contacts.len();
        contacts.retain(|c| c.id != id);
        if contacts.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}
