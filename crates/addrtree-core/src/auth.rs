// ── Token acquisition policy ──

use addrtree_api::{AccessToken, TokenCredential};
use tracing::{debug, info, warn};

use crate::error::CoreError;

/// Silent first; if that errors or yields nothing, sign in interactively and
/// try silently once more.
pub async fn acquire_token<C>(credential: &C, scopes: &[String]) -> Result<AccessToken, CoreError>
where
    C: TokenCredential,
{
    match credential.get_token(scopes).await {
        Ok(Some(token)) => return Ok(token),
        Ok(None) => debug!("no cached token, signing in interactively"),
        Err(e) => warn!(error = %e, "silent token acquisition failed, signing in interactively"),
    }

    credential.login(scopes).await?;
    info!("interactive sign-in succeeded");

    credential
        .get_token(scopes)
        .await?
        .ok_or_else(|| CoreError::AuthenticationFailed {
            message: "no access token available after sign-in".into(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use addrtree_api::Error;

    use super::*;

    /// Yields a token only after a successful `login`.
    struct Scripted {
        silent_error: bool,
        login_ok: bool,
        logins: AtomicUsize,
        silent_calls: AtomicUsize,
    }

    impl Scripted {
        fn new(silent_error: bool, login_ok: bool) -> Self {
            Self {
                silent_error,
                login_ok,
                logins: AtomicUsize::new(0),
                silent_calls: AtomicUsize::new(0),
            }
        }
    }

    impl TokenCredential for Scripted {
        async fn get_token(&self, _scopes: &[String]) -> Result<Option<AccessToken>, Error> {
            let call = self.silent_calls.fetch_add(1, Ordering::SeqCst);
            if self.logins.load(Ordering::SeqCst) > 0 {
                return Ok(Some(AccessToken::new("after-login", None)));
            }
            if self.silent_error && call == 0 {
                return Err(Error::Authentication {
                    message: "interaction_required".into(),
                });
            }
            Ok(None)
        }

        async fn login(&self, _scopes: &[String]) -> Result<(), Error> {
            if self.login_ok {
                self.logins.fetch_add(1, Ordering::SeqCst);
                Ok(())
            } else {
                Err(Error::Authentication {
                    message: "user cancelled".into(),
                })
            }
        }
    }

    #[tokio::test]
    async fn silent_hit_skips_login() {
        let cred = addrtree_api::StaticTokenCredential::new(&"tok".to_string().into());
        let token = acquire_token(&cred, &[]).await.unwrap();
        assert_eq!(token.secret(), "tok");
    }

    #[tokio::test]
    async fn silent_error_falls_back_to_login() {
        let cred = Scripted::new(true, true);
        let token = acquire_token(&cred, &[]).await.unwrap();
        assert_eq!(token.secret(), "after-login");
        assert_eq!(cred.logins.load(Ordering::SeqCst), 1);
        assert_eq!(cred.silent_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_login_is_authentication_error() {
        let cred = Scripted::new(false, false);
        let err = acquire_token(&cred, &[]).await.unwrap_err();
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }
}
