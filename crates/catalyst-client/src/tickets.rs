//! Ticket endpoints

use catalyst_api::{Ticket, TicketDraft};
use serde_json::Value;

use crate::{ApiClient, ClientResult};

#[derive(Clone)]
pub struct TicketService {
    client: ApiClient,
}

impl TicketService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn statuses(&self) -> ClientResult<Vec<String>> {
        self.client.get("tickets/statuses").await
    }

    pub async fn all(&self) -> ClientResult<Vec<Ticket>> {
        self.client.get("tickets").await
    }

    pub async fn create(&self, draft: &TicketDraft) -> ClientResult<Ticket> {
        self.client.post("tickets", draft).await
    }

    pub async fn update(&self, code: &str, draft: &TicketDraft) -> ClientResult<Ticket> {
        self.client.put(&format!("tickets/{}", code), draft).await
    }

    pub async fn by_code(&self, code: &str) -> ClientResult<Ticket> {
        self.client.get(&format!("tickets/by-code/{}", code)).await
    }

    /// Choices for the ticket form's dropdown fields, keyed by field name
    pub async fn dropdown_options(&self, id: &str) -> ClientResult<Value> {
        self.client
            .get(&format!("tickets/{}/dropdown-options", id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Method, MockTransport, RecordingNotifier};
    use catalyst_api::CurrentUser;
    use catalyst_config::SessionSettings;
    use catalyst_core::{lock_guard, SessionGrant, SessionGuard};
    use catalyst_store::SqliteStore;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (TicketService, MockTransport, Arc<RecordingNotifier>) {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let guard = SessionGuard::new(SessionSettings::default(), store).into_shared();
        lock_guard(&guard)
            .unwrap()
            .login(
                SessionGrant {
                    access_token: "t".into(),
                    refresh_token: None,
                    user: CurrentUser {
                        id: 1,
                        username: "admin".into(),
                        email: None,
                        role: "ADMIN".into(),
                    },
                },
                catalyst_util::now(),
            )
            .unwrap();

        let mock = MockTransport::new();
        let notifier = Arc::new(RecordingNotifier::new());
        let client = ApiClient::new("http://localhost:8080/api", Arc::new(mock.clone()), guard)
            .with_notifier(notifier.clone());
        (TicketService::new(client), mock, notifier)
    }

    #[tokio::test]
    async fn test_create_ticket() {
        let (tickets, mock, notifier) = setup();
        mock.respond(
            Method::Post,
            "tickets",
            201,
            json!({"code": "SUP-12", "title": "Printer on fire", "status": "BACKLOG"}),
        );

        let draft = TicketDraft {
            title: Some("Printer on fire".into()),
            status: Some("BACKLOG".into()),
            ..Default::default()
        };
        let ticket = tickets.create(&draft).await.unwrap();
        assert_eq!(ticket.code, "SUP-12");
        assert_eq!(
            mock.last_request().unwrap().body,
            Some(json!({"title": "Printer on fire", "status": "BACKLOG"}))
        );
        assert_eq!(notifier.notifications()[0].message, "Created successfully");
    }

    #[tokio::test]
    async fn test_by_code_and_update() {
        let (tickets, mock, _) = setup();
        mock.respond(
            Method::Get,
            "tickets/by-code/SUP-12",
            200,
            json!({"code": "SUP-12", "title": "Printer", "status": "TO_DO", "assignee": {"username": "jdoe"}}),
        );
        mock.respond(
            Method::Put,
            "tickets/SUP-12",
            200,
            json!({"code": "SUP-12", "title": "Printer", "status": "DONE"}),
        );

        let ticket = tickets.by_code("SUP-12").await.unwrap();
        assert_eq!(
            ticket.assignee.map(|a| a.username).as_deref(),
            Some("jdoe")
        );

        let draft = TicketDraft {
            status: Some("DONE".into()),
            ..Default::default()
        };
        assert_eq!(tickets.update("SUP-12", &draft).await.unwrap().status, "DONE");
    }

    #[tokio::test]
    async fn test_dropdown_options() {
        let (tickets, mock, _) = setup();
        mock.respond(
            Method::Get,
            "tickets/SUP-12/dropdown-options",
            200,
            json!({"assignee": [{"username": "jdoe"}]}),
        );

        let options = tickets.dropdown_options("SUP-12").await.unwrap();
        assert_eq!(options["assignee"][0]["username"], "jdoe");
    }
}
