//! User service client (external collaborator)

use serde::{Deserialize, Serialize};

use super::ClientConfig;
use crate::error::Result;
use crate::proto::common::Page;
use crate::proto::users as pb;
use crate::rpc::RpcClient;
use crate::types::PageRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_in: i64,
    pub user: Option<User>,
}

pub struct UserClient {
    rpc: RpcClient,
}

impl UserClient {
    pub fn new(config: ClientConfig) -> Self {
        let rpc = RpcClient::new(config.address, config.connect_timeout)
            .with_call_timeout(config.call_timeout);
        Self { rpc }
    }

    pub async fn close(&self) {
        self.rpc.close().await;
    }

    pub async fn health_check(&self) -> Result<bool> {
        Ok(self.rpc.health_check().await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let request = pb::LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: pb::LoginResponse = self.rpc.call(pb::methods::LOGIN, &request).await?;
        Ok(LoginOutcome {
            token: response.token,
            expires_in: response.expires_in,
            user: response.user.map(user_from_proto),
        })
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<User> {
        let request = pb::RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        let user: pb::User = self.rpc.call(pb::methods::REGISTER, &request).await?;
        Ok(user_from_proto(user))
    }

    /// Admin-driven creation with an explicit role.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: &str,
    ) -> Result<User> {
        let request = pb::CreateUserRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            role: role.to_string(),
        };
        let user: pb::User = self.rpc.call(pb::methods::CREATE_USER, &request).await?;
        Ok(user_from_proto(user))
    }

    pub async fn get_user(&self, id: &str) -> Result<User> {
        let request = pb::GetUserRequest { id: id.to_string() };
        let user: pb::User = self.rpc.call(pb::methods::GET_USER, &request).await?;
        Ok(user_from_proto(user))
    }

    pub async fn list_users(&self, page: &PageRequest) -> Result<(Vec<User>, i64)> {
        let request = pb::ListUsersRequest {
            page: Some(Page {
                page: page.page,
                page_size: page.page_size,
                sort_by: page.sort_by.clone(),
                sort_asc: false,
            }),
        };
        let response: pb::ListUsersResponse =
            self.rpc.call(pb::methods::LIST_USERS, &request).await?;
        Ok((
            response.users.into_iter().map(user_from_proto).collect(),
            response.total,
        ))
    }

    pub async fn update_user(
        &self,
        id: &str,
        name: Option<&str>,
        role: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<User> {
        let request = pb::UpdateUserRequest {
            id: id.to_string(),
            name: name.map(str::to_string),
            role: role.map(str::to_string),
            is_active,
        };
        let user: pb::User = self.rpc.call(pb::methods::UPDATE_USER, &request).await?;
        Ok(user_from_proto(user))
    }

    pub async fn delete_user(&self, id: &str) -> Result<()> {
        let request = pb::DeleteUserRequest { id: id.to_string() };
        let _: crate::proto::common::Empty =
            self.rpc.call(pb::methods::DELETE_USER, &request).await?;
        Ok(())
    }
}

fn user_from_proto(user: pb::User) -> User {
    User {
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
        is_active: user.is_active,
        created_at: user.created_at,
    }
}
