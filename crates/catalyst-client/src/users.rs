//! User endpoints

use catalyst_api::{NewUser, User, UserUpdate};

use crate::{ApiClient, ClientResult};

#[derive(Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn by_username(&self, username: &str) -> ClientResult<User> {
        self.client
            .get(&format!("users/by-username/{}", username))
            .await
    }

    pub async fn all(&self) -> ClientResult<Vec<User>> {
        self.client.get("users").await
    }

    pub async fn active(&self) -> ClientResult<Vec<User>> {
        self.client.get("users/active").await
    }

    pub async fn roles(&self) -> ClientResult<Vec<String>> {
        self.client.get("users/roles").await
    }

    pub async fn create(&self, user: &NewUser) -> ClientResult<User> {
        self.client.post("users", user).await
    }

    pub async fn update(&self, update: &UserUpdate) -> ClientResult<User> {
        self.client
            .put(&format!("users/{}", update.username), update)
            .await
    }
}
