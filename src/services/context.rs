use crate::{
    db::dao::DaoContext,
    services::auth_service::{AuthService, FlowSettings},
    state::AppState,
};

#[derive(Clone)]
pub struct ServiceContext<'a> {
    state: &'a AppState,
    daos: DaoContext,
}

impl<'a> ServiceContext<'a> {
    pub fn from_state(state: &'a AppState) -> Self {
        Self {
            state,
            daos: DaoContext::new(&state.db),
        }
    }

    pub fn auth(&self) -> AuthService {
        let auth = &self.state.config.auth;
        AuthService::new(
            self.daos.user(),
            self.daos.one_time_code(),
            self.daos.activity_event(),
            self.state.issuer.clone(),
            self.state.notifier.clone(),
            self.state.push.clone(),
            FlowSettings {
                clients: self.state.config.clients.clone(),
                mfa_code_ttl_secs: auth.mfa_code_ttl_secs,
                mfa_max_attempts: auth.mfa_max_attempts,
                federation_secret: auth.federation_secret.clone(),
            },
        )
    }
}
