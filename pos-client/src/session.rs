//! 会话协调器
//!
//! 维护 {user, current_tenant, current_location, tenants, locations}，
//! 对接远程认证服务。所有远程失败都是非致命的：要么按固定的演示账号
//! 阶梯重试，要么整体降级为离线演示会话 ([`access_demo`])。
//!
//! 连接模式只存在于 [`SourceSwitch`] 一处，协调器和各 store 共享同一个
//! 句柄。
//!
//! [`access_demo`]: SessionCoordinator::access_demo

use std::sync::Arc;

use serde_json::json;
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

use shared::auth::AuthUser;
use shared::error::{PosError, PosResult};
use shared::models::{
    Location, LocationCreate, StaffCreate, StaffRole, StaffTenant, Tenant, TenantCreate,
    TenantPlan,
};

use crate::config::Config;
use crate::http::RestClient;
use crate::source::{ConnectionMode, RemoteSource, SourceSwitch};

/// 演示账号阶梯：按顺序尝试的已知登录
const DEMO_CREDENTIALS: &[(&str, &str)] = &[
    ("demo@restaurant.com", "demo123456"),
    ("demo@example.com", "demo123456"),
    ("test@restaurant.com", "test123456"),
];

const DEMO_TENANT_NAME: &str = "Demo Restaurant";
const DEMO_LOCATION_NAME: &str = "Main Location";

/// Session state snapshot
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub user: Option<AuthUser>,
    pub tenants: Vec<StaffTenant>,
    pub locations: Vec<Location>,
    pub current_tenant: Option<StaffTenant>,
    pub current_location: Option<Location>,
    /// Unix timestamp the access token expires at, when known
    pub session_expires_at: Option<u64>,
}

/// A synthesized offline-demo identity
#[derive(Debug, Clone)]
pub struct DemoIdentity {
    pub user: AuthUser,
    pub tenant: Tenant,
    pub location: Location,
}

#[derive(Debug, Validate)]
struct Credentials {
    #[validate(email)]
    email: String,
    #[validate(length(min = 8))]
    password: String,
}

/// Auth/session coordinator
pub struct SessionCoordinator {
    client: Arc<RestClient>,
    switch: Arc<SourceSwitch>,
    state: RwLock<SessionState>,
}

impl SessionCoordinator {
    /// Create a coordinator starting live against the configured backend
    pub fn new(config: &Config) -> Self {
        let client = Arc::new(RestClient::new(config));
        let remote = Arc::new(RemoteSource::new(client.clone(), config));
        Self {
            client,
            switch: SourceSwitch::live(remote),
            state: RwLock::new(SessionState::default()),
        }
    }

    /// The shared source switch, handed to every store
    pub fn switch(&self) -> Arc<SourceSwitch> {
        self.switch.clone()
    }

    /// Current connection mode
    pub fn mode(&self) -> ConnectionMode {
        self.switch.mode()
    }

    /// Snapshot of the session state
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Restore a session from the backend if one exists
    ///
    /// No error is fatal; failures are logged and swallowed.
    pub async fn initialize(&self) {
        match self.client.current_user().await {
            Ok(user) => {
                tracing::info!(email = %user.email, "restored session");
                self.state.write().await.user = Some(user.clone());
                if let Err(err) = self.load_associations(&user).await {
                    tracing::warn!(error = %err, "failed to load tenant associations");
                }
            }
            Err(PosError::Unauthorized) => {
                tracing::debug!("no session to restore");
            }
            Err(err) => {
                tracing::warn!(error = %err, "session restore failed");
            }
        }
    }

    /// Sign in with email/password
    ///
    /// On failure the backend's message is returned verbatim for display.
    pub async fn sign_in(&self, email: &str, password: &str) -> PosResult<AuthUser> {
        let session = self.client.sign_in(email, password).await?;

        let expires_at = session
            .expires_at
            .or_else(|| parse_jwt_exp(&session.access_token));
        {
            let mut state = self.state.write().await;
            state.user = Some(session.user.clone());
            state.session_expires_at = expires_at;
        }

        if let Err(err) = self.load_associations(&session.user).await {
            // 没有员工记录时补齐演示工作区，再试一次
            tracing::warn!(error = %err, "no staff associations, provisioning demo workspace");
            self.provision_demo_workspace(&session.user).await?;
            self.load_associations(&session.user).await?;
        }

        Ok(session.user)
    }

    /// Sign up a new account
    pub async fn sign_up(&self, email: &str, password: &str) -> PosResult<AuthUser> {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
        .validate()
        .map_err(|e| PosError::validation(e.to_string()))?;

        let session = self.client.sign_up(email, password).await?;
        Ok(session.user)
    }

    /// Try the fixed ladder of known demo logins
    pub async fn sign_in_demo(&self) -> PosResult<AuthUser> {
        let mut last_err = PosError::Unauthorized;
        for (email, password) in DEMO_CREDENTIALS {
            match self.sign_in(email, password).await {
                Ok(user) => return Ok(user),
                Err(err) => {
                    tracing::debug!(%email, error = %err, "demo credential rejected");
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }

    /// Enter offline demo mode without any network call
    ///
    /// Synthesizes a fresh user/tenant/location triple and switches the
    /// session to the in-memory source. Each call yields new identifiers.
    pub async fn access_demo(&self) -> DemoIdentity {
        let now = chrono::Utc::now();
        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email: "demo@offline.local".to_string(),
        };
        let tenant = Tenant {
            id: Uuid::new_v4().to_string(),
            name: DEMO_TENANT_NAME.to_string(),
            plan: TenantPlan::Pro,
            settings: json!({}),
            created_at: now,
            updated_at: now,
        };
        let location = Location {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant.id.clone(),
            name: DEMO_LOCATION_NAME.to_string(),
            address: demo_address(),
        };
        let membership = StaffTenant {
            tenant_id: tenant.id.clone(),
            role: StaffRole::Admin,
            permissions: vec!["full_access".to_string()],
            tenant: tenant.clone(),
        };

        self.switch.degrade();

        let mut state = self.state.write().await;
        state.user = Some(user.clone());
        state.tenants = vec![membership.clone()];
        state.locations = vec![location.clone()];
        state.current_tenant = Some(membership);
        state.current_location = Some(location.clone());
        state.session_expires_at = None;

        tracing::info!(tenant = %tenant.id, "entered offline demo mode");
        DemoIdentity { user, tenant, location }
    }

    /// Select a tenant from the loaded associations and load its locations
    pub async fn select_tenant(&self, tenant_id: &str) -> PosResult<()> {
        let membership = {
            let state = self.state.read().await;
            state
                .tenants
                .iter()
                .find(|m| m.tenant_id == tenant_id)
                .cloned()
                .ok_or_else(|| PosError::not_found(format!("Tenant {tenant_id}")))?
        };

        let locations = if self.switch.mode().is_offline() {
            // 离线模式下合成而不是拉取
            vec![Location {
                id: Uuid::new_v4().to_string(),
                tenant_id: tenant_id.to_string(),
                name: DEMO_LOCATION_NAME.to_string(),
                address: demo_address(),
            }]
        } else {
            match self.switch.current().list_locations(tenant_id).await {
                Ok(locations) => locations,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to load locations");
                    Vec::new()
                }
            }
        };

        let mut state = self.state.write().await;
        state.current_tenant = Some(membership);
        state.locations = locations;
        state.current_location = None;
        Ok(())
    }

    /// Select a location from the loaded list (pure local)
    pub async fn select_location(&self, location_id: &str) -> PosResult<()> {
        let mut state = self.state.write().await;
        let location = state
            .locations
            .iter()
            .find(|l| l.id == location_id)
            .cloned()
            .ok_or_else(|| PosError::not_found(format!("Location {location_id}")))?;
        state.current_location = Some(location);
        Ok(())
    }

    /// Clear all session state; remote sign-out only when live
    pub async fn sign_out(&self) {
        if !self.switch.mode().is_offline() {
            if let Err(err) = self.client.sign_out().await {
                tracing::warn!(error = %err, "remote sign-out failed");
            }
        }
        self.client.clear_token();
        *self.state.write().await = SessionState::default();
    }

    /// Load the user's staff/tenant associations through the active source
    async fn load_associations(&self, user: &AuthUser) -> PosResult<()> {
        let memberships = self
            .switch
            .current()
            .list_staff_tenants(&user.id)
            .await?;
        if memberships.is_empty() {
            return Err(PosError::not_found("Staff record"));
        }
        self.state.write().await.tenants = memberships;
        Ok(())
    }

    /// Create the demo tenant, staff row, and location for a fresh account
    async fn provision_demo_workspace(&self, user: &AuthUser) -> PosResult<()> {
        let source = self.switch.current();

        let tenant = source
            .create_tenant(TenantCreate {
                name: DEMO_TENANT_NAME.to_string(),
                plan: Some(TenantPlan::Pro),
                settings: Some(json!({})),
            })
            .await?;

        source
            .create_staff(StaffCreate {
                tenant_id: tenant.id.clone(),
                user_id: user.id.clone(),
                email: user.email.clone(),
                role: StaffRole::Admin,
                permissions: vec!["full_access".to_string()],
                is_active: true,
            })
            .await?;

        source
            .create_location(LocationCreate {
                tenant_id: tenant.id,
                name: DEMO_LOCATION_NAME.to_string(),
                address: Some(demo_address()),
            })
            .await?;

        Ok(())
    }
}

fn demo_address() -> serde_json::Value {
    json!({
        "street": "123 Main St",
        "city": "Demo City",
        "state": "DC",
        "zip": "12345",
    })
}

/// 从 JWT token 中解析过期时间 (Unix timestamp)
fn parse_jwt_exp(token: &str) -> Option<u64> {
    // JWT 格式: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    let payload_bytes = URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    let payload: serde_json::Value = serde_json::from_slice(&payload_bytes).ok()?;
    payload.get("exp")?.as_u64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator() -> SessionCoordinator {
        // Backend URL points nowhere; these tests never touch the network
        SessionCoordinator::new(&Config::with_overrides("http://127.0.0.1:1", "anon"))
    }

    #[tokio::test]
    async fn access_demo_synthesizes_a_full_identity() {
        let session = coordinator();
        let identity = session.access_demo().await;

        assert_eq!(identity.tenant.name, "Demo Restaurant");
        assert_eq!(identity.location.tenant_id, identity.tenant.id);
        assert!(session.mode().is_offline());

        let state = session.state().await;
        assert_eq!(state.user.unwrap().id, identity.user.id);
        assert_eq!(state.current_tenant.unwrap().tenant_id, identity.tenant.id);
        assert_eq!(state.current_location.unwrap().id, identity.location.id);
    }

    #[tokio::test]
    async fn access_demo_twice_yields_distinct_triples() {
        let session = coordinator();
        let first = session.access_demo().await;
        let second = session.access_demo().await;

        assert_ne!(first.user.id, second.user.id);
        assert_ne!(first.tenant.id, second.tenant.id);
        assert_ne!(first.location.id, second.location.id);
        // structurally identical
        assert_eq!(first.tenant.name, second.tenant.name);
        assert_eq!(first.location.name, second.location.name);
    }

    #[tokio::test]
    async fn select_tenant_offline_synthesizes_locations() {
        let session = coordinator();
        let identity = session.access_demo().await;

        session.select_tenant(&identity.tenant.id).await.unwrap();
        let state = session.state().await;
        assert_eq!(state.locations.len(), 1);
        assert_eq!(state.locations[0].name, "Main Location");
        // re-selecting resets the location choice
        assert!(state.current_location.is_none());

        let location_id = state.locations[0].id.clone();
        session.select_location(&location_id).await.unwrap();
        assert_eq!(session.state().await.current_location.unwrap().id, location_id);
    }

    #[tokio::test]
    async fn select_unknown_tenant_is_rejected() {
        let session = coordinator();
        session.access_demo().await;
        let err = session.select_tenant("nope").await.unwrap_err();
        assert!(matches!(err, PosError::NotFound { .. }));
    }

    #[tokio::test]
    async fn sign_out_clears_state() {
        let session = coordinator();
        session.access_demo().await;
        session.sign_out().await;

        let state = session.state().await;
        assert!(state.user.is_none());
        assert!(state.tenants.is_empty());
        assert!(state.current_tenant.is_none());
    }

    #[test]
    fn jwt_exp_parses_from_payload() {
        // header/payload base64url without padding, garbage signature
        use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"u1","exp":1735689600}"#);
        let token = format!("{header}.{payload}.sig");

        assert_eq!(parse_jwt_exp(&token), Some(1735689600));
        assert_eq!(parse_jwt_exp("not-a-jwt"), None);
    }

    #[test]
    fn credentials_validation_rejects_bad_input() {
        let creds = |email: &str, password: &str| Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        assert!(creds("not-an-email", "longenough").validate().is_err());
        assert!(creds("a@b.com", "short").validate().is_err());
        assert!(creds("a@b.com", "longenough").validate().is_ok());
    }
}
