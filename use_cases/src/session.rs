use entities::locations::OwnerId;
#[cfg(test)]
use mockall::automock;

/// The identity collaborator: who is signed in. Sign-in itself happens elsewhere.
#[cfg_attr(test, automock)]
pub trait Session: Send + Sync {
    fn user_id(&self) -> OwnerId;

    fn email(&self) -> String;
}
