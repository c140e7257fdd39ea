use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    store::{self, User},
    Backend,
};

/// Identity screen: collects a display name and obtains an anonymous identity.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SignIn {
    pub name: String,
    pub loading: bool,
    pub alerts: Vec<String>,
}

impl SignIn {
    /// Returns the signed-in user. A blank name is rejected before any
    /// request is made. Backend failures are logged and end the attempt
    /// without an alert.
    pub async fn submit(&mut self, backend: &Backend) -> Option<User> {
        if self.name.trim().is_empty() {
            self.alerts.push("Please enter a name".to_string());
            return None;
        }

        self.loading = true;
        let result = self.sign_in(backend).await;
        self.loading = false;

        match result {
            Ok(user) => {
                info!(uid = %user.uid, name = %user.name, "signed in");
                Some(user)
            }
            Err(err) => {
                error!(error = %err, "Error signing in anonymously");
                None
            }
        }
    }

    async fn sign_in(&self, backend: &Backend) -> store::Result<User> {
        let uid = backend.auth.sign_in_anonymously().await?;
        let user = User {
            uid,
            name: self.name.clone(),
        };
        backend.store.put_user(&user).await?;
        Ok(user)
    }
}
