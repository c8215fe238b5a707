//! Customer endpoints

use catalyst_api::{Customer, CustomerUpdate, NewCustomer};

use crate::{ApiClient, ClientResult};

#[derive(Clone)]
pub struct CustomerService {
    client: ApiClient,
}

impl CustomerService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn by_id(&self, id: i64) -> ClientResult<Customer> {
        self.client.get(&format!("customers/by-id/{}", id)).await
    }

    pub async fn all(&self) -> ClientResult<Vec<Customer>> {
        self.client.get("customers").await
    }

    pub async fn types(&self) -> ClientResult<Vec<String>> {
        self.client.get("customers/types").await
    }

    pub async fn create(&self, customer: &NewCustomer) -> ClientResult<Customer> {
        self.client.post("customers", customer).await
    }

    pub async fn update(&self, update: &CustomerUpdate) -> ClientResult<Customer> {
        self.client
            .put(&format!("customers/{}", update.id), update)
            .await
    }
}
