// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login, restore and logout over an injected session store.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use super::auth_state::AuthState;
use super::store::{load_json, save_json, SessionSlot, SessionStore, StorageError};
use crate::directory::DirectoryCache;
use crate::site_config::SiteConfigCache;
use crate::token::{TokenClaims, TokenError, TokenVerifier};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("Session storage failed: {0}")]
    Storage(#[from] StorageError),
    /// Log out before presenting another code
    #[error("A session is already active")]
    AlreadyAuthenticated,
}

/// One client session: the verified identity plus the caches it unlocks.
pub struct Session {
    store: Arc<dyn SessionStore>,
    verifier: TokenVerifier,
    claims: Option<TokenClaims>,
    directory: Arc<DirectoryCache>,
    site_config: Arc<SiteConfigCache>,
}

impl Session {
    /// Rebuild the session persisted in `store`.
    ///
    /// The stored token is verified again; a token that no longer verifies
    /// (or a payload without its token) wipes every slot.
    pub fn restore(store: Arc<dyn SessionStore>, verifier: TokenVerifier) -> Result<Self, SessionError> {
        let claims = match load_json::<String>(store.as_ref(), SessionSlot::Jwt) {
            Ok(Some(token)) => match verifier.verify(&token) {
                Ok(claims) => Some(claims),
                Err(e) => {
                    warn!(reason = e.error_code(), "Stored token no longer verifies, wiping session");
                    store.clear()?;
                    None
                }
            },
            Ok(None) => {
                match store.get(SessionSlot::AuthInfo) {
                    Ok(None) => {}
                    Ok(Some(_)) => {
                        warn!("Identity payload stored without its token, wiping session");
                        store.clear()?;
                    }
                    Err(e) => {
                        warn!(error = %e, "Unreadable identity payload, wiping session");
                        store.clear()?;
                    }
                }
                None
            }
            Err(e) => {
                warn!(error = %e, "Unreadable stored token, wiping session");
                store.clear()?;
                None
            }
        };

        let directory = Arc::new(DirectoryCache::load(store.clone()));
        let site_config = Arc::new(SiteConfigCache::load(store.clone()));
        let session = Self {
            store,
            verifier,
            claims,
            directory,
            site_config,
        };
        info!(state = ?session.state(), "Session restored");
        Ok(session)
    }

    /// Verify a scanned code and start a session with it.
    pub fn login(&mut self, code: &str) -> Result<AuthState, SessionError> {
        if self.state().is_authenticated() {
            return Err(SessionError::AlreadyAuthenticated);
        }

        let claims = self.verifier.verify(code)?;
        self.store.set(SessionSlot::Jwt, Value::String(code.to_string()))?;
        save_json(self.store.as_ref(), SessionSlot::AuthInfo, &claims)?;

        let state = AuthState::derive(Some(&claims));
        info!(subject = %claims.sub, ?state, "Logged in");
        self.claims = Some(claims);
        Ok(state)
    }

    /// Wipe everything: token, payload, directory and site config.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.store.clear()?;
        self.claims = None;
        self.directory.forget();
        self.site_config.forget();
        info!("Logged out");
        Ok(())
    }

    pub fn state(&self) -> AuthState {
        AuthState::derive(self.claims.as_ref())
    }

    pub fn claims(&self) -> Option<&TokenClaims> {
        self.claims.as_ref()
    }

    /// Token text to present as a bearer to backend services.
    pub fn token(&self) -> Result<Option<String>, SessionError> {
        if self.claims.is_none() {
            return Ok(None);
        }
        Ok(load_json(self.store.as_ref(), SessionSlot::Jwt)?)
    }

    pub fn directory(&self) -> &Arc<DirectoryCache> {
        &self.directory
    }

    pub fn site_config(&self) -> &Arc<SiteConfigCache> {
        &self.site_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{FileSessionStore, MemorySessionStore, SessionPaths};
    use crate::token::fixtures::{test_signing_key, test_verifying_key};
    use crate::token::{issue, Role};
    use serde_json::json;
    use tempfile::TempDir;

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(test_verifying_key())
    }

    fn claims(role: Role) -> TokenClaims {
        TokenClaims {
            sub: "7".to_string(),
            role,
            name: "Jane Doe".to_string(),
            bld: "C".to_string(),
            unit: "101".to_string(),
            ic: 1,
            iss: "J.Smith-3".to_string(),
        }
    }

    fn code(role: Role) -> String {
        issue(&claims(role), &test_signing_key()).unwrap()
    }

    fn fresh() -> (Arc<dyn SessionStore>, Session) {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let session = Session::restore(store.clone(), verifier()).unwrap();
        (store, session)
    }

    #[test]
    fn issued_resident_code_logs_in_as_resident() {
        let (_store, mut session) = fresh();
        assert_eq!(session.state(), AuthState::Unauthenticated);

        assert_eq!(session.login(&code(Role::Resident)).unwrap(), AuthState::Resident);
        assert_eq!(session.claims().map(|c| c.name.as_str()), Some("Jane Doe"));
    }

    #[test]
    fn bad_code_leaves_session_unauthenticated() {
        let (store, mut session) = fresh();
        assert!(matches!(
            session.login("not-a-jwt"),
            Err(SessionError::Token(TokenError::MalformedToken))
        ));
        assert_eq!(session.state(), AuthState::Unauthenticated);
        assert!(store.get(SessionSlot::Jwt).unwrap().is_none());
    }

    #[test]
    fn unknown_role_verifies_but_grants_nothing() {
        let (_store, mut session) = fresh();
        let state = session.login(&code(Role::Unknown("admin".to_string()))).unwrap();
        assert_eq!(state, AuthState::Unauthenticated);
    }

    #[test]
    fn second_login_requires_logout() {
        let (_store, mut session) = fresh();
        session.login(&code(Role::Resident)).unwrap();
        assert!(matches!(
            session.login(&code(Role::Staff)),
            Err(SessionError::AlreadyAuthenticated)
        ));

        session.logout().unwrap();
        assert_eq!(session.login(&code(Role::Staff)).unwrap(), AuthState::Staff);
    }

    #[test]
    fn logout_wipes_every_slot_and_the_directory() {
        let (store, mut session) = fresh();
        session.login(&code(Role::Staff)).unwrap();
        session.directory().upsert("C", "101", "Jane Doe", "7").unwrap();
        store.set(SessionSlot::SiteConfig, json!({"buildings": []})).unwrap();

        session.logout().unwrap();

        assert_eq!(session.state(), AuthState::Unauthenticated);
        assert!(session.directory().snapshot().is_empty());
        assert!(session.site_config().current().is_none());
        for slot in SessionSlot::ALL {
            assert!(store.get(slot).unwrap().is_none(), "{slot} survived logout");
        }
    }

    #[test]
    fn restore_brings_back_a_verified_session() {
        let dir = TempDir::new().unwrap();
        let open = || -> Arc<dyn SessionStore> {
            Arc::new(FileSessionStore::open(SessionPaths::new(dir.path())).unwrap())
        };

        let mut session = Session::restore(open(), verifier()).unwrap();
        let token = code(Role::Staff);
        session.login(&token).unwrap();
        session.directory().upsert("C", "101", "Jane Doe", "7").unwrap();
        drop(session);

        let restored = Session::restore(open(), verifier()).unwrap();
        assert_eq!(restored.state(), AuthState::Staff);
        assert_eq!(restored.token().unwrap(), Some(token));
        assert_eq!(restored.directory().lookup("C", "101").len(), 1);
    }

    #[test]
    fn restore_wipes_a_token_that_no_longer_verifies() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let mut tampered = code(Role::Staff);
        tampered.insert(40, 'x');
        store.set(SessionSlot::Jwt, json!(tampered)).unwrap();
        store.set(SessionSlot::AuthInfo, json!({"role": "staff"})).unwrap();
        store.set(SessionSlot::ResidentDirectory, json!({"C": {"101": [["Jane Doe", "7"]]}})).unwrap();

        let session = Session::restore(store.clone(), verifier()).unwrap();
        assert_eq!(session.state(), AuthState::Unauthenticated);
        assert!(session.directory().snapshot().is_empty());
        for slot in SessionSlot::ALL {
            assert!(store.get(slot).unwrap().is_none());
        }
    }

    #[test]
    fn restore_wipes_an_orphan_payload() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        store.set(SessionSlot::AuthInfo, json!({"role": "staff"})).unwrap();

        let session = Session::restore(store.clone(), verifier()).unwrap();
        assert_eq!(session.state(), AuthState::Unauthenticated);
        assert!(store.get(SessionSlot::AuthInfo).unwrap().is_none());
    }

    #[test]
    fn restore_wipes_an_unreadable_payload() {
        let dir = TempDir::new().unwrap();
        let paths = SessionPaths::new(dir.path());
        let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::open(paths.clone()).unwrap());
        std::fs::write(paths.slot(SessionSlot::AuthInfo), "{not json").unwrap();

        let session = Session::restore(store.clone(), verifier()).unwrap();
        assert_eq!(session.state(), AuthState::Unauthenticated);
        assert!(store.get(SessionSlot::AuthInfo).unwrap().is_none());
    }
}
